use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use brady_core::interfaces::{OptionGenerator, ScanUiEvent, Synthesizer};
use brady_scan::{Coordinator, Effect, Slot};

use crate::session_log::SessionLog;

/// Everything that can wake the run loop up. Transcripts come from the
/// listener thread, the rest are completions of effects the loop started
/// or commands typed at the terminal.
pub enum Msg {
    Transcript(String),
    UtteranceDone(usize),
    QueryOutcome(Result<String>),
    Resume,
    /// Select a slot; `None` means the slot under the highlight.
    Select(Option<usize>),
    Start,
    Stop,
    Quit,
}

/// Parse a line typed at the terminal. Empty line = switch press on the
/// current highlight; a number picks a slot directly.
pub fn parse_command(line: &str) -> Option<Msg> {
    let line = line.trim();
    match line {
        "" => Some(Msg::Select(None)),
        "s" | "start" => Some(Msg::Start),
        "x" | "stop" => Some(Msg::Stop),
        "q" | "quit" => Some(Msg::Quit),
        _ => line.parse::<usize>().ok().map(|n| Msg::Select(Some(n))),
    }
}

/// The run loop: drives the coordinator, executes its effects, and feeds
/// completions back in. Single consumer — ordering comes from the channel,
/// not from locks.
pub struct Session {
    coordinator: Coordinator,
    generator: Arc<dyn OptionGenerator>,
    synth: Arc<dyn Synthesizer>,
    log: Option<SessionLog>,
    tx: mpsc::UnboundedSender<Msg>,
    rx: mpsc::UnboundedReceiver<Msg>,
}

impl Session {
    pub fn new(
        coordinator: Coordinator,
        generator: Arc<dyn OptionGenerator>,
        synth: Arc<dyn Synthesizer>,
        log: Option<SessionLog>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            coordinator,
            generator,
            synth,
            log,
            tx,
            rx,
        }
    }

    /// Handle for the listener bridge and the terminal reader.
    pub fn sender(&self) -> mpsc::UnboundedSender<Msg> {
        self.tx.clone()
    }

    pub async fn run(mut self) -> Result<()> {
        let effects = self.coordinator.start();
        self.execute(effects);

        while let Some(msg) = self.rx.recv().await {
            let effects = match msg {
                Msg::Transcript(text) => self.handle_transcript(&text),
                Msg::UtteranceDone(slot) => self.coordinator.utterance_finished(slot),
                Msg::QueryOutcome(Ok(raw)) => {
                    let effects = self.coordinator.results_ready(&raw);
                    let labels: Vec<String> = self
                        .coordinator
                        .board()
                        .slots()
                        .iter()
                        .filter_map(|s| match s {
                            Slot::Regular(text) => Some(text.clone()),
                            _ => None,
                        })
                        .collect();
                    self.emit(ScanUiEvent::OptionsReady(labels));
                    effects
                }
                Msg::QueryOutcome(Err(e)) => {
                    tracing::warn!("Backend query failed: {e}");
                    self.emit(ScanUiEvent::BackendFailed(e.to_string()));
                    self.coordinator.query_failed()
                }
                Msg::Resume => self.coordinator.resume(),
                Msg::Select(slot) => {
                    let slot = slot.unwrap_or_else(|| self.coordinator.cursor());
                    let selected = match self.coordinator.board().slot(slot) {
                        Some(Slot::Regular(text)) => Some(text.clone()),
                        _ => None,
                    };
                    if let Some(text) = selected {
                        self.emit(ScanUiEvent::SelectionMade(text));
                    }
                    self.coordinator.select(slot)
                }
                Msg::Start => self.coordinator.start(),
                Msg::Stop => {
                    self.coordinator.stop();
                    Vec::new()
                }
                Msg::Quit => break,
            };
            self.execute(effects);
        }

        Ok(())
    }

    fn handle_transcript(&mut self, text: &str) -> Vec<Effect> {
        tracing::debug!("Heard: {text}");
        let was_listening = self.coordinator.is_listening();
        let effects = self.coordinator.hear(text);

        if !was_listening && self.coordinator.is_listening() {
            self.emit(ScanUiEvent::WakeDetected);
            self.emit(ScanUiEvent::ListeningStarted);
        } else if was_listening && !self.coordinator.is_listening() {
            self.emit(ScanUiEvent::ListeningStopped);
            self.emit(ScanUiEvent::QuestionCaptured(text.trim().to_string()));
        }
        effects
    }

    fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Speak(utterance) => {
                    self.emit(ScanUiEvent::Speaking(utterance.text.clone()));
                    let synth = self.synth.clone();
                    let tx = self.tx.clone();
                    tokio::task::spawn_blocking(move || {
                        if let Err(e) = synth.speak(&utterance.text) {
                            tracing::warn!("TTS failed: {e}");
                        }
                        // Completion or failure both advance the cadence;
                        // a broken voice must not freeze the scan.
                        let _ = tx.send(Msg::UtteranceDone(utterance.slot));
                    });
                }
                Effect::Say(text) => {
                    self.emit(ScanUiEvent::Speaking(text.clone()));
                    let synth = self.synth.clone();
                    tokio::task::spawn_blocking(move || {
                        if let Err(e) = synth.speak(&text) {
                            tracing::warn!("TTS failed: {e}");
                        }
                    });
                }
                Effect::Highlight(slot) => {
                    self.emit(ScanUiEvent::Highlight(slot));
                    if let Some(label) = self.coordinator.board().slot(slot).map(|s| s.label()) {
                        println!("> [{slot}] {label}");
                    }
                }
                Effect::Listen => {
                    println!("(listening…)");
                }
                Effect::Query(question) => {
                    let generator = self.generator.clone();
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let outcome = generator.generate(&question).await;
                        let _ = tx.send(Msg::QueryOutcome(outcome));
                    });
                }
                Effect::ShowMessage(text) => {
                    println!("--------");
                    println!("{text}");
                    println!("--------");
                }
                Effect::ResumeAfter(delay) => {
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = tx.send(Msg::Resume);
                    });
                }
            }
        }
    }

    fn emit(&mut self, event: ScanUiEvent) {
        tracing::info!(?event, "scan event");
        if let Some(log) = &mut self.log {
            log.record_event(&event);
        }
    }
}
