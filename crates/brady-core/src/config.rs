use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
}

/// Option board layout.
#[derive(Debug, Clone, Deserialize)]
pub struct BoardConfig {
    /// Total number of slots, including the two trailing control slots.
    #[serde(default = "default_slots")]
    pub slots: usize,
    /// Local seed document used when the backend is unreachable at startup.
    #[serde(default = "default_options_file")]
    pub options_file: String,
}

fn default_slots() -> usize {
    9
}
fn default_options_file() -> String {
    "config/options.json".into()
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            slots: default_slots(),
            options_file: default_options_file(),
        }
    }
}

/// Text-generation backend.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout. A hung backend degrades like a failed one.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Pause before scanning resumes after a round-trip, so the
    /// ready/failure announcement can finish.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_failure_message")]
    pub failure_message: String,
}

fn default_base_url() -> String {
    "http://127.0.0.1:3000".into()
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_settle_delay_ms() -> u64 {
    2000
}
fn default_failure_message() -> String {
    "Sorry, I could not get options. Please ask me again.".into()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            settle_delay_ms: default_settle_delay_ms(),
            failure_message: default_failure_message(),
        }
    }
}

/// Microphone, speech recognition, and speech output.
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceConfig {
    #[serde(default = "default_voice_enabled")]
    pub enabled: bool,
    /// Input device name; None picks the system default.
    #[serde(default)]
    pub input_device: Option<String>,
    #[serde(default = "default_wake_phrase")]
    pub wake_phrase: String,
    /// Spoken when the wake phrase opens a listening window.
    #[serde(default = "default_acknowledgement")]
    pub acknowledgement: String,
    /// Spoken when fresh options land on the board.
    #[serde(default = "default_ready_message")]
    pub ready_message: String,
    #[serde(default = "default_whisper_model")]
    pub whisper_model: String,
    #[serde(default = "default_piper_binary")]
    pub piper_binary: String,
    #[serde(default)]
    pub piper_model: String,
    #[serde(default)]
    pub piper_config: String,
    /// Seconds of silence that end a captured utterance.
    #[serde(default = "default_silence_secs")]
    pub silence_secs: f32,
    /// Hard cap on a single captured utterance.
    #[serde(default = "default_max_utterance_secs")]
    pub max_utterance_secs: f32,
    /// Optional rustpotter model for low-latency wake detection.
    #[serde(default)]
    pub wake_word_model: Option<String>,
}

fn default_voice_enabled() -> bool {
    true
}
fn default_wake_phrase() -> String {
    "hey brady".into()
}
fn default_acknowledgement() -> String {
    "Yes? I am listening.".into()
}
fn default_ready_message() -> String {
    "Here are some options.".into()
}
fn default_whisper_model() -> String {
    "models/ggml-base.en.bin".into()
}
fn default_piper_binary() -> String {
    "piper".into()
}
fn default_silence_secs() -> f32 {
    2.0
}
fn default_max_utterance_secs() -> f32 {
    30.0
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: default_voice_enabled(),
            input_device: None,
            wake_phrase: default_wake_phrase(),
            acknowledgement: default_acknowledgement(),
            ready_message: default_ready_message(),
            whisper_model: default_whisper_model(),
            piper_binary: default_piper_binary(),
            piper_model: String::new(),
            piper_config: String::new(),
            silence_secs: default_silence_secs(),
            max_utterance_secs: default_max_utterance_secs(),
            wake_word_model: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            backend: BackendConfig::default(),
            voice: VoiceConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config with fallback chain: explicit path → ./config/default.toml → hardcoded defaults.
    pub fn load_or_default(explicit_path: Option<&Path>) -> Self {
        if let Some(path) = explicit_path {
            match Self::load(path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {e}", path.display());
                }
            }
        }

        let default_path = Path::new("config/default.toml");
        if default_path.exists() {
            match Self::load(default_path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    tracing::warn!("Failed to load default config: {e}");
                }
            }
        }

        tracing::info!("Using hardcoded default configuration");
        Self::default()
    }
}
