use std::io::Write;
use std::process::{Command, Stdio};

use brady_core::interfaces::Synthesizer;

use crate::error::{VoiceError, VoiceResult};

/// Text-to-speech via Piper as a subprocess, piped into `aplay`.
///
/// `speak` blocks until playback finishes. That is deliberate: the scan
/// cadence advances on utterance completion, and the subprocess exiting is
/// the completion signal. There is no interrupt — an utterance that has
/// started always plays out; stopping the scan only prevents the next one.
pub struct PiperTts {
    piper_binary: String,
    model_path: String,
    config_path: String,
}

impl PiperTts {
    pub fn new(piper_binary: &str, model_path: &str, config_path: &str) -> Self {
        Self {
            piper_binary: piper_binary.to_string(),
            model_path: model_path.to_string(),
            config_path: config_path.to_string(),
        }
    }

    /// Speak the given text. Blocks until playback finishes.
    pub fn say(&self, text: &str) -> VoiceResult<()> {
        if text.is_empty() {
            return Ok(());
        }

        tracing::debug!("TTS speaking: {text}");

        // piper --model X --config Y --output-raw | aplay -r 22050 -f S16_LE -c 1
        let mut piper = Command::new(&self.piper_binary)
            .args([
                "--model",
                &self.model_path,
                "--config",
                &self.config_path,
                "--output-raw",
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| VoiceError::Playback(format!("Failed to spawn piper: {e}")))?;

        if let Some(mut stdin) = piper.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .map_err(|e| VoiceError::Playback(format!("Failed to write to piper: {e}")))?;
            // stdin is dropped here, closing the pipe
        }

        let piper_stdout = piper
            .stdout
            .take()
            .ok_or_else(|| VoiceError::Playback("No piper stdout".into()))?;

        let aplay = Command::new("aplay")
            .args(["-r", "22050", "-f", "S16_LE", "-c", "1", "-q"])
            .stdin(piper_stdout)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| VoiceError::Playback(format!("Failed to spawn aplay: {e}")))?;

        let _ = piper.wait();
        let _ = aplay.wait_with_output();

        Ok(())
    }
}

impl Synthesizer for PiperTts {
    fn speak(&self, text: &str) -> anyhow::Result<()> {
        Ok(self.say(text)?)
    }
}
