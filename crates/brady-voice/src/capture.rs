use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::{traits::*, HeapRb};

use crate::error::{VoiceError, VoiceResult};

/// Microphone capture into a lock-free ring buffer of f32 mono samples.
///
/// The board's audio device is admin-selectable: a configured device name
/// is matched against the host's input devices, with the system default as
/// the fallback.
pub struct AudioCapture {
    _stream: cpal::Stream,
}

/// Ring buffer consumer type for reading captured audio.
pub type AudioConsumer = ringbuf::HeapCons<f32>;

impl AudioCapture {
    /// Start capturing. Returns the capture handle, a consumer for reading
    /// samples, and the actual sample rate in use.
    ///
    /// The ring buffer holds ~30s of audio at the target rate.
    pub fn start(
        device_name: Option<&str>,
        target_sample_rate: u32,
    ) -> VoiceResult<(Self, AudioConsumer, u32)> {
        let device = pick_device(device_name)?;

        if let Ok(desc) = device.description() {
            tracing::info!("Audio input device: {:?}", desc);
        }

        let config = find_config(&device, target_sample_rate)?;
        let actual_rate = config.sample_rate();
        let channels = config.channels() as usize;

        tracing::info!(
            "Audio config: {}Hz, {} channels, {:?}",
            actual_rate,
            channels,
            config.sample_format()
        );

        let rb = HeapRb::<f32>::new(target_sample_rate as usize * 30);
        let (mut prod, cons) = rb.split();

        let stream = device
            .build_input_stream(
                &config.into(),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if channels == 1 {
                        prod.push_slice(data);
                    } else {
                        for chunk in data.chunks(channels) {
                            let _ = prod.try_push(chunk[0]);
                        }
                    }
                },
                |err| {
                    tracing::error!("Audio capture error: {err}");
                },
                None,
            )
            .map_err(|e| VoiceError::Capture(format!("Failed to build input stream: {e}")))?;

        stream
            .play()
            .map_err(|e| VoiceError::Capture(format!("Failed to start capture: {e}")))?;

        Ok((Self { _stream: stream }, cons, actual_rate))
    }
}

/// Resolve the configured device name, falling back to the system default.
/// An unknown name is a warning, not an error — the board must keep working
/// after a USB microphone disappears.
fn pick_device(device_name: Option<&str>) -> VoiceResult<cpal::Device> {
    let host = cpal::default_host();

    if let Some(wanted) = device_name {
        let devices = host
            .input_devices()
            .map_err(|e| VoiceError::Device(format!("Failed to enumerate inputs: {e}")))?;
        for device in devices {
            let desc = device
                .description()
                .map(|d| format!("{d:?}"))
                .unwrap_or_default();
            if desc.contains(wanted) {
                tracing::info!("Using configured input device: {desc}");
                return Ok(device);
            }
        }
        tracing::warn!("Input device '{wanted}' not found, using default");
    }

    host.default_input_device()
        .ok_or_else(|| VoiceError::Device("No audio input device available".into()))
}

/// List the host's input devices, for the admin CLI.
pub fn list_input_devices() -> VoiceResult<Vec<String>> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| VoiceError::Device(format!("Failed to enumerate inputs: {e}")))?;

    Ok(devices
        .filter_map(|d| d.description().ok().map(|desc| format!("{desc:?}")))
        .collect())
}

fn find_config(
    device: &cpal::Device,
    target_rate: u32,
) -> VoiceResult<cpal::SupportedStreamConfig> {
    let configs = device
        .supported_input_configs()
        .map_err(|e| VoiceError::Device(format!("Failed to query input configs: {e}")))?;

    let mut best: Option<cpal::SupportedStreamConfigRange> = None;
    for cfg in configs {
        if cfg.sample_format() == cpal::SampleFormat::F32
            && cfg.min_sample_rate() <= target_rate
            && cfg.max_sample_rate() >= target_rate
        {
            if cfg.channels() == 1 {
                return Ok(cfg.with_sample_rate(target_rate));
            }
            best = Some(cfg);
        }
    }

    if let Some(cfg) = best {
        return Ok(cfg.with_sample_rate(target_rate));
    }

    device
        .default_input_config()
        .map_err(|e| VoiceError::Device(format!("No supported input config: {e}")))
}
