use thiserror::Error;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("Audio device error: {0}")]
    Device(String),

    #[error("Capture error: {0}")]
    Capture(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type VoiceResult<T> = Result<T, VoiceError>;
