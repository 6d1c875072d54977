#[cfg(feature = "voice-stt")]
mod inner {
    use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

    use crate::error::{VoiceError, VoiceResult};

    /// Speech-to-text engine using whisper.cpp.
    pub struct SttEngine {
        ctx: WhisperContext,
    }

    impl SttEngine {
        /// Load a whisper GGML model file.
        pub fn new(model_path: &str) -> VoiceResult<Self> {
            let ctx =
                WhisperContext::new_with_params(model_path, WhisperContextParameters::default())
                    .map_err(|e| {
                        VoiceError::Transcription(format!("Failed to load whisper model: {e:?}"))
                    })?;
            tracing::info!("Whisper STT model loaded from {model_path}");
            Ok(Self { ctx })
        }

        /// Transcribe f32 mono 16kHz audio samples to text.
        pub fn transcribe(&self, samples: &[f32]) -> VoiceResult<String> {
            let mut state = self.ctx.create_state().map_err(|e| {
                VoiceError::Transcription(format!("Failed to create whisper state: {e:?}"))
            })?;

            let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
            params.set_language(Some("en"));
            params.set_no_timestamps(true);

            state
                .full(params, samples)
                .map_err(|e| VoiceError::Transcription(format!("Transcription failed: {e:?}")))?;

            let mut text = String::new();
            let n_segments = state.full_n_segments();
            for i in 0..n_segments {
                if let Some(segment) = state.get_segment(i) {
                    text.push_str(&segment.to_string());
                }
            }

            Ok(text.trim().to_string())
        }
    }
}

#[cfg(feature = "voice-stt")]
pub use inner::SttEngine;

/// Stub transcriber when whisper is not compiled in. Produces empty
/// transcripts, so the board scans but never hears the wake phrase.
#[cfg(not(feature = "voice-stt"))]
pub struct SttEngine;

#[cfg(not(feature = "voice-stt"))]
impl SttEngine {
    pub fn new(_model_path: &str) -> crate::error::VoiceResult<Self> {
        tracing::warn!(
            "Speech recognition disabled (built without 'voice-stt' feature). \
             Wake phrase and spoken questions will not be heard."
        );
        Ok(Self)
    }

    pub fn transcribe(&self, _samples: &[f32]) -> crate::error::VoiceResult<String> {
        Ok(String::new())
    }
}
