//! Error types shared by the speech adapters, the web server, and the CLI.

use thiserror::Error;

/// Errors produced while talking to the remote speech endpoints or while
/// validating input locally before any network call is made.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// No API key was supplied (neither per-request nor via configuration).
    #[error("No OpenAI API key provided. Enter your API key to continue.")]
    MissingCredential,

    /// Upload rejected locally; the remote API enforces the same cap.
    #[error("File size exceeds 25MB limit ({size} bytes). Please upload a smaller file.")]
    UploadTooLarge { size: usize },

    /// Upload rejected locally because the file extension is not an accepted
    /// audio container format.
    #[error("Unsupported audio format '{extension}'. Accepted: {accepted}")]
    UnsupportedFormat { extension: String, accepted: String },

    /// The remote API answered with a non-success status. The body is
    /// surfaced verbatim to the user, no retry.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure (connect, timeout, TLS, mid-stream drop).
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The transcription response body was not the expected JSON shape.
    #[error("Failed to parse transcription response: {0}")]
    InvalidResponse(String),

    /// Playback sink refused an instruction or the bridge was misused.
    #[error("Playback error: {0}")]
    Playback(String),
}

impl SpeechError {
    /// HTTP status the web layer should answer with for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            SpeechError::MissingCredential => 401,
            SpeechError::UploadTooLarge { .. } => 413,
            SpeechError::UnsupportedFormat { .. } => 415,
            SpeechError::Api { status, .. } => *status,
            SpeechError::Transport(_) => 502,
            SpeechError::InvalidResponse(_) => 502,
            SpeechError::Playback(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, SpeechError>;
