use std::collections::VecDeque;
use std::time::Duration;

use crate::board::{Board, Slot};
use crate::normalize;

/// Knobs the coordinator needs. The binary maps these from its app config.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub slots: usize,
    pub wake_phrase: String,
    /// Spoken when the wake phrase opens the listening window.
    pub acknowledgement: String,
    /// Spoken when fresh options land on the board.
    pub ready_message: String,
    /// Shown and spoken when a query fails.
    pub failure_message: String,
    /// Pause before scanning resumes after a query round-trip.
    pub settle_delay: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            slots: 9,
            wake_phrase: "hey brady".into(),
            acknowledgement: "Yes? I am listening.".into(),
            ready_message: "Here are some options.".into(),
            failure_message: "Sorry, I could not get options. Please ask me again.".into(),
            settle_delay: Duration::from_millis(2000),
        }
    }
}

/// One queued piece of scan speech. `slot` records which board position the
/// text belongs to, so the cursor advances from the right place when the
/// utterance finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    pub slot: usize,
}

/// What the driver must do next. The coordinator never performs I/O itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Speak a scan utterance; call [`Coordinator::utterance_finished`]
    /// with its slot when playback ends.
    Speak(Utterance),
    /// Speak feedback not tied to a slot (acknowledgement, announcements).
    Say(String),
    /// Move the visible highlight.
    Highlight(usize),
    /// The listening window is open; the next transcript is the question.
    Listen,
    /// Send a question to the backend; call `results_ready` or
    /// `query_failed` with the outcome.
    Query(String),
    /// Show text in the results panel.
    ShowMessage(String),
    /// Sleep, then call [`Coordinator::resume`].
    ResumeAfter(Duration),
}

/// The scan/speak coordinator.
///
/// Owns the board, the cursor, and the utterance queue. Scanning advances
/// on utterance completions only — there is no timer; the cadence is the
/// speech itself. At most one utterance is in flight, and completions are
/// the sole trigger for starting the next one.
pub struct Coordinator {
    config: ScanConfig,
    board: Board,
    cursor: usize,
    scanning: bool,
    listening: bool,
    generating: bool,
    speaking: bool,
    queue: VecDeque<Utterance>,
    /// Board as it looked before the last query, restored after the user
    /// acts on a result.
    snapshot: Option<Vec<Slot>>,
    /// Last spoken question, verbatim. Only used to build the
    /// "Something Else" follow-up.
    last_question: Option<String>,
    /// Last raw backend body, uncleaned, for the exclusion clause.
    last_raw: Option<String>,
}

impl Coordinator {
    pub fn new(config: ScanConfig) -> Self {
        let board = Board::new(config.slots);
        Self {
            config,
            board,
            cursor: 0,
            scanning: false,
            listening: false,
            generating: false,
            speaking: false,
            queue: VecDeque::new(),
            snapshot: None,
            last_question: None,
            last_raw: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn pending_utterances(&self) -> usize {
        self.queue.len()
    }

    /// Seed the board with the default options, e.g. at startup.
    pub fn seed<I>(&mut self, labels: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.board.fill(labels);
        self.cursor = 0;
        self.snapshot = None;
    }

    /// Begin scanning from the current cursor position.
    pub fn start(&mut self) -> Vec<Effect> {
        if self.scanning || self.listening || self.generating {
            return Vec::new();
        }
        self.scanning = true;
        self.queue_cursor_utterance()
    }

    /// Stop scanning. Pending utterances are dropped; one already speaking
    /// plays out (there is no interrupt primitive) but triggers nothing
    /// further.
    pub fn stop(&mut self) {
        self.queue.clear();
        self.speaking = false;
        self.scanning = false;
    }

    /// An utterance for `slot` finished playing. Advances the cursor and,
    /// when scanning is still active, produces the next utterance — this
    /// chain is what makes the scan self-advancing.
    pub fn utterance_finished(&mut self, slot: usize) -> Vec<Effect> {
        self.speaking = false;
        self.cursor = (slot + 1) % self.board.len();

        let drained = self.drain_queue();
        if !drained.is_empty() {
            return drained;
        }
        if self.scanning {
            return self.queue_cursor_utterance();
        }
        Vec::new()
    }

    /// A transcript arrived from the recognizer.
    pub fn hear(&mut self, transcript: &str) -> Vec<Effect> {
        if self.generating {
            // A query is already in flight; stray speech must not re-trigger.
            return Vec::new();
        }

        if self.listening {
            let question = transcript.trim();
            if question.is_empty() {
                return Vec::new();
            }
            self.listening = false;
            self.last_question = Some(question.to_string());
            self.generating = true;
            return vec![Effect::Query(question.to_string())];
        }

        if transcript
            .to_lowercase()
            .contains(&self.config.wake_phrase.to_lowercase())
        {
            return self.enter_listening();
        }

        Vec::new()
    }

    /// The backend replied. Rebuilds the board and schedules the restart.
    pub fn results_ready(&mut self, raw: &str) -> Vec<Effect> {
        self.generating = false;
        if self.snapshot.is_none() {
            self.snapshot = Some(self.board.snapshot());
        }
        self.last_raw = Some(raw.to_string());

        let lines = normalize::clean_lines(raw);
        self.board.fill(lines.iter().cloned());
        self.cursor = 0;

        vec![
            Effect::ShowMessage(lines.join("\n")),
            Effect::Say(self.config.ready_message.clone()),
            Effect::ResumeAfter(self.config.settle_delay),
        ]
    }

    /// The backend failed. Shows the fallback and schedules the restart so
    /// the user is never left stranded; no retry — the wake phrase is the
    /// retry.
    pub fn query_failed(&mut self) -> Vec<Effect> {
        self.generating = false;
        vec![
            Effect::ShowMessage(self.config.failure_message.clone()),
            Effect::Say(self.config.failure_message.clone()),
            Effect::ResumeAfter(self.config.settle_delay),
        ]
    }

    /// The settle delay elapsed; restart scanning unless the user moved on.
    pub fn resume(&mut self) -> Vec<Effect> {
        if self.listening || self.generating {
            return Vec::new();
        }
        self.scanning = true;
        self.queue_cursor_utterance()
    }

    /// The user selected a slot (switch press on the highlight, or a direct
    /// pick).
    pub fn select(&mut self, slot: usize) -> Vec<Effect> {
        let Some(selected) = self.board.slot(slot).cloned() else {
            return Vec::new();
        };
        match selected {
            Slot::Regular(text) => {
                self.stop();
                if let Some(snap) = self.snapshot.take() {
                    self.board.restore(snap);
                }
                self.cursor = 0;
                vec![Effect::Say(text)]
            }
            Slot::RequeryExcluding => match (self.last_question.clone(), self.last_raw.clone()) {
                (Some(question), Some(raw)) => {
                    self.stop();
                    let follow_up = format!("{question} excluding these items: {raw}");
                    self.generating = true;
                    vec![Effect::Query(follow_up)]
                }
                // Nothing to exclude yet; fall back to asking again.
                _ => self.enter_listening(),
            },
            Slot::RecaptureQuery => self.enter_listening(),
            Slot::Blank => Vec::new(),
        }
    }

    /// Wake transition. Ordering is load-bearing: clear the queue and the
    /// in-flight flag first, then stop scanning, then open the window — no
    /// auto-advance utterance may fire after this.
    fn enter_listening(&mut self) -> Vec<Effect> {
        self.queue.clear();
        self.speaking = false;
        self.scanning = false;
        self.listening = true;
        vec![
            Effect::Say(self.config.acknowledgement.clone()),
            Effect::Listen,
        ]
    }

    /// Queue speech for the slot under the cursor, stepping silently over
    /// blanks. The control slots guarantee something is always speakable.
    fn queue_cursor_utterance(&mut self) -> Vec<Effect> {
        let len = self.board.len();
        for _ in 0..len {
            match self.board.speech_text(self.cursor) {
                Some(text) => {
                    self.queue.push_back(Utterance {
                        text,
                        slot: self.cursor,
                    });
                    return self.drain_queue();
                }
                None => self.cursor = (self.cursor + 1) % len,
            }
        }
        Vec::new()
    }

    /// Start the next queued utterance unless one is already in flight.
    fn drain_queue(&mut self) -> Vec<Effect> {
        if self.speaking {
            return Vec::new();
        }
        let Some(utterance) = self.queue.pop_front() else {
            return Vec::new();
        };
        self.speaking = true;
        vec![
            Effect::Highlight(utterance.slot),
            Effect::Speak(utterance),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ScanConfig {
        ScanConfig {
            slots: 5,
            ..ScanConfig::default()
        }
    }

    fn seeded() -> Coordinator {
        let mut c = Coordinator::new(config());
        c.seed(["Water", "Snack", "Outside"]);
        c
    }

    /// Drive the scan loop: execute the single Speak effect, report it
    /// finished, return the slot that was spoken.
    fn speak_and_finish(c: &mut Coordinator, effects: Vec<Effect>) -> (usize, Vec<Effect>) {
        let utterance = effects
            .iter()
            .find_map(|e| match e {
                Effect::Speak(u) => Some(u.clone()),
                _ => None,
            })
            .expect("expected a Speak effect");
        let next = c.utterance_finished(utterance.slot);
        (utterance.slot, next)
    }

    #[test]
    fn start_speaks_the_first_slot() {
        let mut c = seeded();
        let effects = c.start();
        assert_eq!(effects[0], Effect::Highlight(0));
        assert_eq!(
            effects[1],
            Effect::Speak(Utterance {
                text: "Water".into(),
                slot: 0
            })
        );
    }

    #[test]
    fn cursor_wraps_after_full_cycle() {
        // 5 slots, 3 regular + 2 controls, no blanks: after 5 completions
        // the cursor is back where it started.
        let mut c = seeded();
        let mut effects = c.start();
        let start_cursor = 0;
        for _ in 0..5 {
            let (_, next) = speak_and_finish(&mut c, effects);
            effects = next;
        }
        assert_eq!(c.cursor(), start_cursor);
        assert!(c.is_scanning());
    }

    #[test]
    fn scan_order_includes_controls_and_skips_blanks() {
        let mut c = Coordinator::new(ScanConfig {
            slots: 6,
            ..ScanConfig::default()
        });
        c.seed(["One", "Two"]); // slots 2..4 blank on a 6-board
        let mut spoken = Vec::new();
        let mut effects = c.start();
        for _ in 0..4 {
            let utterance = effects
                .iter()
                .find_map(|e| match e {
                    Effect::Speak(u) => Some(u.clone()),
                    _ => None,
                })
                .unwrap();
            spoken.push(utterance.text.clone());
            effects = c.utterance_finished(utterance.slot);
        }
        assert_eq!(
            spoken,
            vec!["One", "Two", "Something Else", "Please ask me again"]
        );
    }

    #[test]
    fn wake_phrase_clears_queue_stops_scanning_opens_listening() {
        let mut c = seeded();
        let _ = c.start();

        let effects = c.hear("I said hey brady just now");
        assert_eq!(c.pending_utterances(), 0);
        assert!(!c.is_scanning());
        assert!(c.is_listening());
        assert!(effects.contains(&Effect::Listen));
        assert!(matches!(&effects[0], Effect::Say(_)));

        // The utterance that was mid-flight eventually finishes; nothing
        // further may fire.
        let after = c.utterance_finished(0);
        assert!(after.is_empty());
    }

    #[test]
    fn wake_phrase_match_is_case_insensitive_substring() {
        let mut c = seeded();
        let _ = c.start();
        assert!(!c.hear("well HEY BRADY can you help").is_empty());

        let mut c2 = seeded();
        let _ = c2.start();
        assert!(c2.hear("completely unrelated chatter").is_empty());
        assert!(c2.is_scanning());
    }

    #[test]
    fn listening_transcript_becomes_a_query() {
        let mut c = seeded();
        let _ = c.start();
        let _ = c.hear("hey brady");
        let effects = c.hear("what should I eat");
        assert_eq!(effects, vec![Effect::Query("what should I eat".into())]);
        assert!(!c.is_listening());
    }

    #[test]
    fn empty_transcript_keeps_the_window_open() {
        let mut c = seeded();
        let _ = c.hear("hey brady");
        assert!(c.hear("   ").is_empty());
        assert!(c.is_listening());
    }

    #[test]
    fn transcripts_are_ignored_while_generating() {
        let mut c = seeded();
        let _ = c.hear("hey brady");
        let _ = c.hear("what should I eat");
        assert!(c.hear("hey brady").is_empty());
        assert!(!c.is_listening());
    }

    #[test]
    fn results_lay_out_and_schedule_resume() {
        let mut c = seeded();
        let _ = c.hear("hey brady");
        let _ = c.hear("what should I eat");

        let raw = r#"1. "Pizza"\n2. \"Tacos\"\n3. Salad"#;
        let effects = c.results_ready(raw);

        assert_eq!(c.board().slot(0), Some(&Slot::Regular("Pizza".into())));
        assert_eq!(c.board().slot(1), Some(&Slot::Regular("Tacos".into())));
        assert_eq!(c.board().slot(2), Some(&Slot::Regular("Salad".into())));
        assert_eq!(c.board().slot(3), Some(&Slot::RequeryExcluding));
        assert_eq!(c.board().slot(4), Some(&Slot::RecaptureQuery));

        assert_eq!(effects[0], Effect::ShowMessage("Pizza\nTacos\nSalad".into()));
        assert!(matches!(effects[1], Effect::Say(_)));
        assert_eq!(
            effects[2],
            Effect::ResumeAfter(Duration::from_millis(2000))
        );

        // Not scanning until the settle delay elapses.
        assert!(!c.is_scanning());
        let resumed = c.resume();
        assert!(c.is_scanning());
        assert_eq!(resumed[0], Effect::Highlight(0));
    }

    #[test]
    fn query_failure_shows_fallback_and_resumes() {
        let mut c = seeded();
        let _ = c.hear("hey brady");
        let _ = c.hear("what should I eat");

        let effects = c.query_failed();
        let Effect::ShowMessage(msg) = &effects[0] else {
            panic!("expected ShowMessage first");
        };
        assert_eq!(msg, &c.config.failure_message);
        assert!(matches!(effects[2], Effect::ResumeAfter(_)));

        let resumed = c.resume();
        assert!(c.is_scanning());
        assert!(!resumed.is_empty());
    }

    #[test]
    fn something_else_builds_the_exclusion_follow_up() {
        let mut c = seeded();
        let _ = c.hear("hey brady");
        let _ = c.hear("what should I eat");
        let raw = "1. Pizza\n2. Tacos";
        let _ = c.results_ready(raw);
        let _ = c.resume();

        // Slot 3 is RequeryExcluding on a 5-board.
        let effects = c.select(3);
        assert_eq!(
            effects,
            vec![Effect::Query(
                "what should I eat excluding these items: 1. Pizza\n2. Tacos".into()
            )]
        );
        assert!(!c.is_scanning());
    }

    #[test]
    fn something_else_without_history_reopens_listening() {
        let mut c = seeded();
        let _ = c.start();
        let effects = c.select(3);
        assert!(effects.contains(&Effect::Listen));
        assert!(c.is_listening());
    }

    #[test]
    fn ask_again_reopens_listening() {
        let mut c = seeded();
        let _ = c.start();
        let effects = c.select(4);
        assert!(effects.contains(&Effect::Listen));
        assert!(c.is_listening());
        assert!(!c.is_scanning());
    }

    #[test]
    fn selecting_a_result_speaks_it_and_restores_the_snapshot() {
        let mut c = seeded();
        let _ = c.hear("hey brady");
        let _ = c.hear("what should I eat");
        let _ = c.results_ready("1. Pizza");
        let _ = c.resume();

        let effects = c.select(0);
        assert_eq!(effects, vec![Effect::Say("Pizza".into())]);
        assert!(!c.is_scanning());
        // Pre-query board is back for the next cycle.
        assert_eq!(c.board().slot(0), Some(&Slot::Regular("Water".into())));
        assert_eq!(c.board().slot(1), Some(&Slot::Regular("Snack".into())));
        assert_eq!(c.cursor(), 0);
    }

    #[test]
    fn selecting_blank_or_out_of_range_does_nothing() {
        let mut c = Coordinator::new(ScanConfig {
            slots: 6,
            ..ScanConfig::default()
        });
        c.seed(["Only"]);
        assert!(c.select(2).is_empty());
        assert!(c.select(99).is_empty());
    }

    #[test]
    fn resume_yields_to_a_reopened_listening_window() {
        let mut c = seeded();
        let _ = c.hear("hey brady");
        let _ = c.hear("anything");
        let _ = c.results_ready("1. A");
        // Before the settle delay fires, the user asks again via control.
        let _ = c.select(4);
        assert!(c.resume().is_empty());
        assert!(c.is_listening());
        assert!(!c.is_scanning());
    }

    #[test]
    fn at_most_one_utterance_in_flight() {
        let mut c = seeded();
        let effects = c.start();
        assert_eq!(
            effects
                .iter()
                .filter(|e| matches!(e, Effect::Speak(_)))
                .count(),
            1
        );
        // Starting again while speaking adds nothing.
        assert!(c.start().is_empty());
    }
}
