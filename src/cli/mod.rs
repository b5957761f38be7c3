//! CLI Module
//!
//! Command-line interface for CrabVoice using Clap v4.

mod commands;

pub use commands::load_config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use crate::speech::{TtsModel, Voice};

/// CrabVoice - Self-Hosted OpenAI Speech Playground
#[derive(Parser, Debug)]
#[command(name = "crabvoice")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug mode (creates log files in .crabvoice/logs/)
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the web playground (default)
    Serve {
        /// Bind address (overrides config)
        #[arg(short, long)]
        bind: Option<String>,

        /// Port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Transcribe an audio file and print the transcript
    Transcribe {
        /// Audio file: flac, mp3, mp4, mpeg, mpga, m4a, ogg, wav or webm (25MB max)
        file: PathBuf,
    },

    /// Synthesize speech from text
    Speak {
        /// Text to speak (truncated at 4096 characters)
        text: String,

        /// Voice preset
        #[arg(short, long, value_enum, default_value_t = Voice::Alloy)]
        voice: Voice,

        /// TTS model tier
        #[arg(short, long, value_enum, default_value_t = TtsModel::Tts1)]
        model: TtsModel,

        /// Write the synthesized clip to a file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show configuration
    Config,
}

/// Main CLI entry point. The caller loads the config up front (it also feeds
/// the logging setup) and hands it in here.
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command.unwrap_or(Commands::Serve {
        bind: None,
        port: None,
    }) {
        Commands::Serve { bind, port } => commands::cmd_serve(config, bind, port).await,
        Commands::Transcribe { file } => commands::cmd_transcribe(&config, &file).await,
        Commands::Speak {
            text,
            voice,
            model,
            output,
        } => commands::cmd_speak(&config, text, voice, model, output.as_deref()).await,
        Commands::Config => commands::cmd_config(&config),
    }
}
