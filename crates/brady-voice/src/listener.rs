use std::path::Path;
use std::thread::JoinHandle;

use ringbuf::traits::*;
use tokio::sync::mpsc;

use crate::capture::AudioCapture;
use crate::error::{VoiceError, VoiceResult};
use crate::stt::SttEngine;
use crate::wake::WakeWordDetector;

const TARGET_SAMPLE_RATE: u32 = 16000;
/// Frame energy below this counts as silence.
const ENERGY_THRESHOLD: f32 = 0.001;
/// Segments shorter than this are treated as noise, not speech.
const MIN_SEGMENT_SECS: f32 = 0.25;

#[derive(Debug, Clone)]
pub struct ListenerConfig {
    pub input_device: Option<String>,
    pub whisper_model: String,
    /// Seconds of silence that end a captured utterance.
    pub silence_secs: f32,
    /// Hard cap on a single captured utterance.
    pub max_utterance_secs: f32,
    /// Optional rustpotter model path; when it fires, the wake phrase is
    /// forwarded as a synthetic transcript.
    pub wake_word_model: Option<String>,
    pub wake_phrase: String,
}

/// Continuous recognition loop on a dedicated thread.
///
/// Reads frames, segments speech with an energy gate, transcribes finished
/// segments, and sends each transcript over the channel. Errors are logged
/// and the loop keeps going — recognition is always-listening and never
/// fatal. The loop ends only when the receiving side goes away.
pub struct Listener;

impl Listener {
    /// Spawn the listener thread. Returns the handle for cleanup.
    pub fn spawn(
        config: ListenerConfig,
        transcript_tx: mpsc::UnboundedSender<String>,
    ) -> VoiceResult<JoinHandle<()>> {
        if cfg!(feature = "voice-stt") && !Path::new(&config.whisper_model).exists() {
            return Err(VoiceError::Config(format!(
                "Whisper model not found: {}",
                config.whisper_model
            )));
        }

        let handle = std::thread::Builder::new()
            .name("brady-listener".into())
            .spawn(move || {
                if let Err(e) = run_listener(config, transcript_tx) {
                    tracing::error!("Listener error: {e}");
                }
            })
            .map_err(|e| VoiceError::Capture(format!("Failed to spawn listener: {e}")))?;

        Ok(handle)
    }
}

fn run_listener(
    config: ListenerConfig,
    transcript_tx: mpsc::UnboundedSender<String>,
) -> VoiceResult<()> {
    let (_capture, mut audio_cons, actual_rate) =
        AudioCapture::start(config.input_device.as_deref(), TARGET_SAMPLE_RATE)?;
    tracing::info!("Audio capture started at {actual_rate}Hz");

    let stt = SttEngine::new(&config.whisper_model)?;

    let mut wake_detector = match &config.wake_word_model {
        Some(path) => Some(WakeWordDetector::new(path, actual_rate as usize)?),
        None => None,
    };

    // 100ms frames
    let frame_size = (actual_rate / 10) as usize;
    let mut frame_buf = vec![0.0f32; frame_size];
    let mut segmenter = SpeechSegmenter::new(
        actual_rate,
        frame_size,
        config.silence_secs,
        config.max_utterance_secs,
    );

    tracing::info!("Listener running (frame_size={frame_size})");

    loop {
        let read = audio_cons.pop_slice(&mut frame_buf);
        if read < frame_size {
            // Not enough data yet, sleep briefly
            std::thread::sleep(std::time::Duration::from_millis(50));
            continue;
        }

        if let Some(detector) = wake_detector.as_mut() {
            if detector.process(&frame_buf) {
                tracing::info!("Wake word model fired");
                if transcript_tx.send(config.wake_phrase.clone()).is_err() {
                    break;
                }
            }
        }

        let Some(segment) = segmenter.push(&frame_buf) else {
            continue;
        };

        tracing::debug!(
            "Segment complete: {} samples ({:.1}s)",
            segment.len(),
            segment.len() as f32 / actual_rate as f32
        );

        match stt.transcribe(&segment) {
            Ok(text) if !text.is_empty() => {
                tracing::info!("Transcription: {text}");
                if transcript_tx.send(text).is_err() {
                    break;
                }
            }
            Ok(_) => {
                tracing::debug!("Empty transcription, ignoring");
            }
            Err(e) => {
                tracing::error!("Transcription error: {e}");
            }
        }
    }

    tracing::info!("Listener stopped (receiver gone)");
    Ok(())
}

/// Energy-gated speech segmenter.
///
/// Opens a segment on the first voiced frame, closes it after the
/// configured run of silence or at the max length, and discards segments
/// too short to be words.
struct SpeechSegmenter {
    buf: Vec<f32>,
    in_speech: bool,
    silence_frames: u32,
    silence_limit: u32,
    max_samples: usize,
    min_samples: usize,
}

impl SpeechSegmenter {
    fn new(sample_rate: u32, frame_size: usize, silence_secs: f32, max_utterance_secs: f32) -> Self {
        let silence_limit =
            ((sample_rate as f32 * silence_secs) / frame_size as f32).max(1.0) as u32;
        Self {
            buf: Vec::new(),
            in_speech: false,
            silence_frames: 0,
            silence_limit,
            max_samples: (sample_rate as f32 * max_utterance_secs) as usize,
            min_samples: (sample_rate as f32 * MIN_SEGMENT_SECS) as usize,
        }
    }

    /// Feed one frame; returns a finished segment when one closes.
    fn push(&mut self, frame: &[f32]) -> Option<Vec<f32>> {
        let energy: f32 = frame.iter().map(|s| s * s).sum::<f32>() / frame.len() as f32;
        let voiced = energy >= ENERGY_THRESHOLD;

        if !self.in_speech {
            if voiced {
                self.in_speech = true;
                self.silence_frames = 0;
                self.buf.extend_from_slice(frame);
            }
            return None;
        }

        self.buf.extend_from_slice(frame);
        if voiced {
            self.silence_frames = 0;
        } else {
            self.silence_frames += 1;
        }

        if self.silence_frames >= self.silence_limit || self.buf.len() >= self.max_samples {
            let segment = std::mem::take(&mut self.buf);
            self.in_speech = false;
            self.silence_frames = 0;
            if segment.len() >= self.min_samples {
                return Some(segment);
            }
        }
        None
    }
}
