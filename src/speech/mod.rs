//! Speech Module
//!
//! Request/response adapters around the OpenAI audio endpoints:
//! speech-to-text (Whisper transcriptions) and streaming text-to-speech.

pub mod client;
pub mod synthesize;
pub mod transcribe;
pub mod types;

pub use client::SpeechClient;
pub use types::{ApiCredential, AudioUpload, SpeechRequest, TtsModel, Voice};
