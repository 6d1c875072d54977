//! Optional wake-word acceleration.
//!
//! Wake detection is textual: the coordinator matches the phrase inside
//! transcripts, which works with any recognizer output. A rustpotter model
//! can additionally arm the listener at frame latency, ahead of the
//! transcription round-trip; when it fires, the listener forwards the wake
//! phrase as a synthetic transcript.

#[cfg(feature = "wake-word")]
mod inner {
    use rustpotter::{Rustpotter, RustpotterConfig, SampleFormat};

    use crate::error::{VoiceError, VoiceResult};

    /// Frame-level wake word detector backed by rustpotter.
    pub struct WakeWordDetector {
        detector: Rustpotter,
    }

    impl WakeWordDetector {
        pub fn new(model_path: &str, sample_rate: usize) -> VoiceResult<Self> {
            let mut config = RustpotterConfig::default();
            config.fmt.sample_rate = sample_rate;
            config.fmt.channels = 1;
            config.fmt.sample_format = SampleFormat::F32;
            config.detector.threshold = 0.4;

            let mut detector = Rustpotter::new(&config)
                .map_err(|e| VoiceError::Config(format!("Wake detector: {e}")))?;
            detector
                .add_wakeword_from_file("brady", model_path)
                .map_err(|e| VoiceError::Config(format!("Wake word model: {e}")))?;

            tracing::info!("Wake word detector loaded from {model_path}");
            Ok(Self { detector })
        }

        pub fn samples_per_frame(&self) -> usize {
            self.detector.get_samples_per_frame()
        }

        pub fn process(&mut self, samples: &[f32]) -> bool {
            self.detector.process_f32(samples).is_some()
        }
    }
}

#[cfg(feature = "wake-word")]
pub use inner::WakeWordDetector;

/// Inert detector when rustpotter is not compiled in; the textual
/// wake-phrase match carries the whole load.
#[cfg(not(feature = "wake-word"))]
pub struct WakeWordDetector;

#[cfg(not(feature = "wake-word"))]
impl WakeWordDetector {
    pub fn new(_model_path: &str, _sample_rate: usize) -> crate::error::VoiceResult<Self> {
        tracing::debug!("Wake word model disabled (built without 'wake-word' feature)");
        Ok(Self)
    }

    pub fn samples_per_frame(&self) -> usize {
        // ~100ms at 16kHz
        1600
    }

    pub fn process(&mut self, _samples: &[f32]) -> bool {
        false
    }
}
