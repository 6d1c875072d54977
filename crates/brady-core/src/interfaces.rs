//! Cross-crate interface definitions.
//!
//! The scan coordinator, the voice stack, and the backend client only meet
//! through these contracts, so each side stays testable on its own.

use async_trait::async_trait;

/// Produces option text for a spoken question.
/// Implemented by the backend client; the run loop calls it once per query.
#[async_trait]
pub trait OptionGenerator: Send + Sync {
    /// Returns the raw response body for the given question.
    /// The caller normalizes it before trusting it.
    async fn generate(&self, question: &str) -> anyhow::Result<String>;
}

/// Speaks text aloud. `speak` blocks until playback finishes — completion
/// of the call is the utterance-completion signal the scan cadence runs on.
pub trait Synthesizer: Send + Sync {
    fn speak(&self, text: &str) -> anyhow::Result<()>;
}

/// Events from the scan pipeline to whatever front end is watching.
#[derive(Debug, Clone)]
pub enum ScanUiEvent {
    WakeDetected,
    ListeningStarted,
    ListeningStopped,
    QuestionCaptured(String),
    OptionsReady(Vec<String>),
    Highlight(usize),
    Speaking(String),
    SelectionMade(String),
    BackendFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_ui_event_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<ScanUiEvent>();
    }

    #[test]
    fn scan_ui_event_clone() {
        let event = ScanUiEvent::QuestionCaptured("what should I eat".into());
        let cloned = event.clone();
        if let ScanUiEvent::QuestionCaptured(text) = cloned {
            assert_eq!(text, "what should I eat");
        } else {
            panic!("Clone should preserve variant");
        }
    }
}
