use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "brady", about = "Brady — a scanning communication board you can talk to")]
pub struct Cli {
    /// Path to config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the scanning board: speak options, listen for the wake phrase
    Run,

    /// One-shot question to the backend; prints the resulting board
    Ask {
        #[arg(long)]
        question: String,
    },

    /// Speak a phrase through the configured TTS voice
    Say {
        #[arg(long)]
        text: String,
    },

    /// List audio input devices
    Devices,

    /// Print the seeded board in scan order
    Board,
}
