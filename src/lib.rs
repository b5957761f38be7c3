//! CrabVoice - Self-Hosted OpenAI Speech Playground
//!
//! A small web application (plus one-shot CLI commands) for the OpenAI audio
//! endpoints: upload an audio file for Whisper transcription, or type text and
//! hear it spoken while the synthesis response is still streaming.
//!
//! ## Features
//!
//! - **Transcription:** Whisper speech-to-text for uploaded audio files (25MB limit)
//! - **Speech:** streaming text-to-speech with progressive in-browser playback
//! - **Bring Your Own Key:** the API key is pass-through only, never persisted
//! - **CLI Mode:** `transcribe` and `speak` subcommands for scripting
//!
//! ## Quick Start
//!
//! ```bash
//! # Run the web playground on http://127.0.0.1:8787
//! crabvoice serve
//!
//! # One-shot transcription
//! crabvoice transcribe recording.mp3
//!
//! # One-shot speech synthesis
//! crabvoice speak "Hello world" --voice alloy --output hello.mp3
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod playback;
pub mod server;
pub mod speech;
pub mod utils;

// Re-export commonly used types
pub use error::SpeechError;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
