//! Scan/speak coordination for the option board.
//!
//! Pure state: no audio, no HTTP, no clocks. The coordinator returns
//! [`Effect`]s describing what should happen next; the run loop in the
//! binary executes them and feeds completions back in.

pub mod board;
pub mod coordinator;
pub mod normalize;

pub use board::{Board, Slot, MIN_SLOTS};
pub use coordinator::{Coordinator, Effect, ScanConfig, Utterance};
