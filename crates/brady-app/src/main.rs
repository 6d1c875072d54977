mod cli;
mod session;
mod session_log;

use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use brady_core::config::AppConfig;
use brady_core::lifecycle;
use brady_llm::{client, BackendClient};
use brady_scan::{Board, Coordinator, ScanConfig};
use brady_voice::{Listener, ListenerConfig, PiperTts};

use cli::{Cli, Commands};
use session::{Msg, Session};
use session_log::SessionLog;

fn scan_config(config: &AppConfig) -> ScanConfig {
    ScanConfig {
        slots: config.board.slots,
        wake_phrase: config.voice.wake_phrase.clone(),
        acknowledgement: config.voice.acknowledgement.clone(),
        ready_message: config.voice.ready_message.clone(),
        failure_message: config.backend.failure_message.clone(),
        settle_delay: Duration::from_millis(config.backend.settle_delay_ms),
    }
}

fn backend_client(config: &AppConfig) -> Result<BackendClient> {
    Ok(BackendClient::new(
        &config.backend.base_url,
        Duration::from_secs(config.backend.request_timeout_secs),
    )?)
}

fn tts(config: &AppConfig) -> PiperTts {
    PiperTts::new(
        &config.voice.piper_binary,
        &config.voice.piper_model,
        &config.voice.piper_config,
    )
}

/// Seed labels: backend first, local file when it is unreachable.
async fn seed_labels(config: &AppConfig, backend: &BackendClient) -> Vec<String> {
    match backend.fetch_seed_options().await {
        Ok(entries) => {
            tracing::info!("Seeded {} options from backend", entries.len());
            return entries.into_iter().map(|e| e.option).collect();
        }
        Err(e) => {
            tracing::warn!("Backend seed unavailable: {e}");
        }
    }

    let path = std::path::Path::new(&config.board.options_file);
    match client::load_seed_file(path) {
        Ok(entries) => {
            tracing::info!("Seeded {} options from {}", entries.len(), path.display());
            entries.into_iter().map(|e| e.option).collect()
        }
        Err(e) => {
            tracing::warn!("Seed file unavailable: {e}");
            Vec::new()
        }
    }
}

async fn run_board(config: AppConfig) -> Result<()> {
    lifecycle::log_startup();

    let backend = Arc::new(backend_client(&config)?);
    let synth = Arc::new(tts(&config));

    let mut coordinator = Coordinator::new(scan_config(&config));
    coordinator.seed(seed_labels(&config, &backend).await);

    let log = match SessionLog::open(&SessionLog::default_dir()) {
        Ok(log) => Some(log),
        Err(e) => {
            tracing::warn!("Session log unavailable: {e}");
            None
        }
    };

    let session = Session::new(coordinator, backend, synth, log);
    let tx = session.sender();

    // Listener thread → transcript bridge
    if config.voice.enabled {
        let (transcript_tx, mut transcript_rx) = tokio::sync::mpsc::unbounded_channel();
        let listener_config = ListenerConfig {
            input_device: config.voice.input_device.clone(),
            whisper_model: config.voice.whisper_model.clone(),
            silence_secs: config.voice.silence_secs,
            max_utterance_secs: config.voice.max_utterance_secs,
            wake_word_model: config.voice.wake_word_model.clone(),
            wake_phrase: config.voice.wake_phrase.clone(),
        };
        match Listener::spawn(listener_config, transcript_tx) {
            Ok(_handle) => {
                tracing::info!("Listener started");
                let tx = tx.clone();
                tokio::spawn(async move {
                    while let Some(text) = transcript_rx.recv().await {
                        if tx.send(Msg::Transcript(text)).is_err() {
                            break;
                        }
                    }
                });
            }
            Err(e) => {
                tracing::warn!("Listener unavailable: {e}");
            }
        }
    } else {
        tracing::info!("Voice disabled in config");
    }

    // Terminal input: Enter = switch press, numbers pick slots, q quits.
    {
        let tx = tx.clone();
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if let Some(msg) = session::parse_command(&line) {
                    if tx.send(msg).is_err() {
                        break;
                    }
                }
            }
            let _ = tx.send(Msg::Quit);
        });
    }

    session.run().await?;
    lifecycle::log_shutdown();
    Ok(())
}

fn print_board(board: &Board) {
    for (i, slot) in board.slots().iter().enumerate() {
        println!("[{i}] {}", slot.label());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    lifecycle::init_tracing();

    let cli = Cli::parse();
    let config = AppConfig::load_or_default(cli.config.as_deref());

    match cli.command {
        Commands::Run => run_board(config).await?,

        Commands::Ask { question } => {
            let backend = backend_client(&config)?;
            let raw = backend.generate_options(&question).await?;
            let lines = brady_scan::normalize::clean_lines(&raw);
            let mut board = Board::new(config.board.slots);
            board.fill(lines);
            print_board(&board);
        }

        Commands::Say { text } => {
            tts(&config).say(&text)?;
        }

        Commands::Devices => {
            let devices = brady_voice::list_input_devices()?;
            if devices.is_empty() {
                println!("(no input devices)");
            }
            for name in devices {
                println!("{name}");
            }
        }

        Commands::Board => {
            let path = std::path::Path::new(&config.board.options_file);
            let entries = client::load_seed_file(path)?;
            let mut board = Board::new(config.board.slots);
            board.fill(entries.into_iter().map(|e| e.option));
            print_board(&board);
        }
    }

    Ok(())
}
