use std::fmt;

/// Smallest board that still has a regular slot ahead of the two control slots.
pub const MIN_SLOTS: usize = 3;

/// One position on the option board.
///
/// The two control slots are their own variants rather than magic strings,
/// so selection dispatches on type, not on label comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// A selectable phrase.
    Regular(String),
    /// An unused position. Keeps slot order stable; never spoken.
    Blank,
    /// Re-query the backend, excluding everything it already offered.
    RequeryExcluding,
    /// Re-open the listening window for a fresh question.
    RecaptureQuery,
}

impl Slot {
    /// User-facing label, as shown on the board.
    pub fn label(&self) -> &str {
        match self {
            Slot::Regular(text) => text,
            Slot::Blank => "",
            Slot::RequeryExcluding => "Something Else",
            Slot::RecaptureQuery => "Please ask me again",
        }
    }

    /// Text spoken when the scan cursor lands here. Blanks are silent.
    pub fn speech_text(&self) -> Option<&str> {
        match self {
            Slot::Blank => None,
            other => Some(other.label()),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Slot::Blank)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fixed-size ordered slot sequence. Order is the scan sequence.
///
/// Invariant: the last two slots are always `RequeryExcluding` then
/// `RecaptureQuery`; everything before them is `Regular` or `Blank`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    slots: Vec<Slot>,
}

impl Board {
    /// All-blank board of `size` slots (clamped up to [`MIN_SLOTS`])
    /// with the control slots in the trailing positions.
    pub fn new(size: usize) -> Self {
        let size = size.max(MIN_SLOTS);
        let mut board = Self {
            slots: vec![Slot::Blank; size],
        };
        board.assert_controls();
        board
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of positions available for regular options.
    pub fn regular_capacity(&self) -> usize {
        self.slots.len() - 2
    }

    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Text spoken for the slot at `index`, if any.
    pub fn speech_text(&self, index: usize) -> Option<String> {
        self.slots
            .get(index)
            .and_then(|s| s.speech_text())
            .map(str::to_string)
    }

    /// Replace the regular region wholesale: `texts` fill the leading slots,
    /// the remainder goes blank, excess entries are dropped. The control
    /// slots are re-asserted unconditionally.
    pub fn fill<I>(&mut self, texts: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let capacity = self.regular_capacity();
        let mut texts = texts.into_iter().map(Into::into);
        for i in 0..capacity {
            self.slots[i] = match texts.next() {
                Some(t) if !t.trim().is_empty() => Slot::Regular(t),
                _ => Slot::Blank,
            };
        }
        self.assert_controls();
    }

    /// Snapshot the full slot sequence.
    pub fn snapshot(&self) -> Vec<Slot> {
        self.slots.clone()
    }

    /// Restore a snapshot taken from this board. The control-slot invariant
    /// is re-asserted in case the snapshot predates a resize.
    pub fn restore(&mut self, snapshot: Vec<Slot>) {
        let size = self.slots.len();
        self.slots = snapshot;
        self.slots.resize(size, Slot::Blank);
        self.assert_controls();
    }

    fn assert_controls(&mut self) {
        let n = self.slots.len();
        self.slots[n - 2] = Slot::RequeryExcluding;
        self.slots[n - 1] = Slot::RecaptureQuery;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_board_has_trailing_controls() {
        let board = Board::new(9);
        assert_eq!(board.len(), 9);
        assert_eq!(board.slot(7), Some(&Slot::RequeryExcluding));
        assert_eq!(board.slot(8), Some(&Slot::RecaptureQuery));
        assert!(board.slots()[..7].iter().all(Slot::is_blank));
    }

    #[test]
    fn undersized_board_clamps_to_minimum() {
        let board = Board::new(1);
        assert_eq!(board.len(), MIN_SLOTS);
        assert_eq!(board.regular_capacity(), 1);
    }

    #[test]
    fn fill_lays_out_results_blanks_and_controls() {
        // K = 3 results on an M = 9 board: slots [0,3) filled, [3,7) blank,
        // controls always in the last two positions.
        let mut board = Board::new(9);
        board.fill(["Pizza", "Tacos", "Salad"]);
        assert_eq!(board.slot(0), Some(&Slot::Regular("Pizza".into())));
        assert_eq!(board.slot(1), Some(&Slot::Regular("Tacos".into())));
        assert_eq!(board.slot(2), Some(&Slot::Regular("Salad".into())));
        for i in 3..7 {
            assert!(board.slot(i).unwrap().is_blank(), "slot {i} should be blank");
        }
        assert_eq!(board.slot(7), Some(&Slot::RequeryExcluding));
        assert_eq!(board.slot(8), Some(&Slot::RecaptureQuery));
    }

    #[test]
    fn fill_truncates_excess_results() {
        let mut board = Board::new(4);
        board.fill(["a", "b", "c", "d", "e"]);
        assert_eq!(board.slot(0), Some(&Slot::Regular("a".into())));
        assert_eq!(board.slot(1), Some(&Slot::Regular("b".into())));
        assert_eq!(board.slot(2), Some(&Slot::RequeryExcluding));
        assert_eq!(board.slot(3), Some(&Slot::RecaptureQuery));
    }

    #[test]
    fn fill_with_nothing_blanks_the_regular_region() {
        let mut board = Board::new(5);
        board.fill(["x", "y", "z"]);
        board.fill(Vec::<String>::new());
        assert!(board.slots()[..3].iter().all(Slot::is_blank));
        assert_eq!(board.slot(3), Some(&Slot::RequeryExcluding));
    }

    #[test]
    fn whitespace_only_text_becomes_blank() {
        let mut board = Board::new(5);
        board.fill(["ok", "   ", "fine"]);
        assert_eq!(board.slot(0), Some(&Slot::Regular("ok".into())));
        assert!(board.slot(1).unwrap().is_blank());
        assert_eq!(board.slot(2), Some(&Slot::Regular("fine".into())));
    }

    #[test]
    fn snapshot_restore_round_trip() {
        let mut board = Board::new(6);
        board.fill(["before one", "before two"]);
        let snap = board.snapshot();

        board.fill(["after"]);
        assert_eq!(board.slot(0), Some(&Slot::Regular("after".into())));

        board.restore(snap);
        assert_eq!(board.slot(0), Some(&Slot::Regular("before one".into())));
        assert_eq!(board.slot(1), Some(&Slot::Regular("before two".into())));
        assert_eq!(board.slot(4), Some(&Slot::RequeryExcluding));
        assert_eq!(board.slot(5), Some(&Slot::RecaptureQuery));
    }

    #[test]
    fn control_labels_match_the_board_buttons() {
        assert_eq!(Slot::RequeryExcluding.label(), "Something Else");
        assert_eq!(Slot::RecaptureQuery.label(), "Please ask me again");
        assert_eq!(Slot::Blank.speech_text(), None);
        assert_eq!(
            Slot::Regular("Water please".into()).speech_text(),
            Some("Water please")
        );
    }
}
