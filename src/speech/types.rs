//! Domain types for the speech adapters: credentials, upload validation,
//! model and voice enumerations, and the synthesis request tuple.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SpeechError};
use crate::utils::truncate_chars;

/// OpenAI's upload cap for the transcription endpoint.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Input text cap for the speech endpoint.
pub const MAX_INPUT_CHARS: usize = 4096;

/// Fixed read size when consuming a streamed synthesis response.
pub const STREAM_CHUNK_SIZE: usize = 4096;

/// Only Whisper is available for transcription.
pub const TRANSCRIBE_MODEL: &str = "whisper-1";

/// Audio container formats the transcription endpoint accepts.
pub const ACCEPTED_EXTENSIONS: &[&str] = &[
    "flac", "mp3", "mp4", "mpeg", "mpga", "m4a", "ogg", "wav", "webm",
];

/// Bearer secret authorizing calls to the remote API.
///
/// Held only in memory for the duration of one interaction and passed
/// explicitly into each adapter call. The `Debug` impl redacts the value so
/// the key can never leak through logs.
#[derive(Clone)]
pub struct ApiCredential(String);

impl ApiCredential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiCredential([REDACTED])")
    }
}

/// An uploaded audio file, validated locally before any network call.
#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl AudioUpload {
    /// Build an upload, rejecting oversized payloads and unsupported
    /// container formats without touching the network.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let file_name = file_name.into();

        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(SpeechError::UploadTooLarge { size: bytes.len() });
        }

        let extension = file_name
            .rsplit('.')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(SpeechError::UnsupportedFormat {
                extension,
                accepted: ACCEPTED_EXTENSIONS.join(", "),
            });
        }

        Ok(Self { file_name, bytes })
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Text-to-speech model tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum TtsModel {
    #[serde(rename = "tts-1")]
    #[value(name = "tts-1")]
    Tts1,
    #[serde(rename = "tts-1-hd")]
    #[value(name = "tts-1-hd")]
    Tts1Hd,
}

impl TtsModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TtsModel::Tts1 => "tts-1",
            TtsModel::Tts1Hd => "tts-1-hd",
        }
    }

    /// Human-readable label shown in the model selector.
    pub fn label(&self) -> &'static str {
        match self {
            TtsModel::Tts1 => "tts-1: low latency, lower quality, more static",
            TtsModel::Tts1Hd => "tts-1-hd: slower, higher quality",
        }
    }

    pub fn all() -> &'static [TtsModel] {
        &[TtsModel::Tts1, TtsModel::Tts1Hd]
    }
}

impl fmt::Display for TtsModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TtsModel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "tts-1" => Ok(TtsModel::Tts1),
            "tts-1-hd" => Ok(TtsModel::Tts1Hd),
            other => Err(format!("Unknown TTS model: {other}")),
        }
    }
}

/// Voice preset for speech synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    Alloy,
    Echo,
    Fable,
    Onyx,
    Nova,
    Shimmer,
}

impl Voice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Echo => "echo",
            Voice::Fable => "fable",
            Voice::Onyx => "onyx",
            Voice::Nova => "nova",
            Voice::Shimmer => "shimmer",
        }
    }

    pub fn all() -> &'static [Voice] {
        &[
            Voice::Alloy,
            Voice::Echo,
            Voice::Fable,
            Voice::Onyx,
            Voice::Nova,
            Voice::Shimmer,
        ]
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Voice {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "alloy" => Ok(Voice::Alloy),
            "echo" => Ok(Voice::Echo),
            "fable" => Ok(Voice::Fable),
            "onyx" => Ok(Voice::Onyx),
            "nova" => Ok(Voice::Nova),
            "shimmer" => Ok(Voice::Shimmer),
            other => Err(format!("Unknown voice: {other}")),
        }
    }
}

/// Immutable parameters for one synthesis call.
///
/// Input longer than [`MAX_INPUT_CHARS`] is truncated on construction,
/// matching the hard cap the input form enforces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub model: TtsModel,
    pub voice: Voice,
    pub input: String,
}

impl SpeechRequest {
    pub fn new(model: TtsModel, voice: Voice, input: impl Into<String>) -> Self {
        let input = input.into();
        let input = if input.chars().count() > MAX_INPUT_CHARS {
            tracing::warn!(
                "Synthesis input truncated from {} to {} characters",
                input.chars().count(),
                MAX_INPUT_CHARS
            );
            truncate_chars(&input, MAX_INPUT_CHARS).to_string()
        } else {
            input
        };

        Self { model, voice, input }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_within_limit_accepted() {
        let upload = AudioUpload::new("clip.mp3", vec![0u8; 1024]).unwrap();
        assert_eq!(upload.file_name, "clip.mp3");
        assert_eq!(upload.size(), 1024);
    }

    #[test]
    fn test_upload_at_exact_limit_accepted() {
        let upload = AudioUpload::new("clip.wav", vec![0u8; MAX_UPLOAD_BYTES]);
        assert!(upload.is_ok());
    }

    #[test]
    fn test_upload_over_limit_rejected() {
        let result = AudioUpload::new("clip.wav", vec![0u8; MAX_UPLOAD_BYTES + 1]);
        match result {
            Err(SpeechError::UploadTooLarge { size }) => {
                assert_eq!(size, MAX_UPLOAD_BYTES + 1);
            }
            other => panic!("expected UploadTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_upload_unknown_extension_rejected() {
        let result = AudioUpload::new("document.pdf", vec![0u8; 10]);
        assert!(matches!(result, Err(SpeechError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_upload_extension_case_insensitive() {
        assert!(AudioUpload::new("CLIP.MP3", vec![0u8; 10]).is_ok());
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let cred = ApiCredential::new("sk-very-secret");
        let debug = format!("{:?}", cred);
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_tts_model_round_trip() {
        for model in TtsModel::all() {
            assert_eq!(model.as_str().parse::<TtsModel>().unwrap(), *model);
        }
    }

    #[test]
    fn test_tts_model_serde_names() {
        assert_eq!(serde_json::to_string(&TtsModel::Tts1).unwrap(), "\"tts-1\"");
        assert_eq!(
            serde_json::to_string(&TtsModel::Tts1Hd).unwrap(),
            "\"tts-1-hd\""
        );
    }

    #[test]
    fn test_voice_round_trip() {
        for voice in Voice::all() {
            assert_eq!(voice.as_str().parse::<Voice>().unwrap(), *voice);
        }
        assert_eq!(Voice::all().len(), 6);
    }

    #[test]
    fn test_voice_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Voice::Alloy).unwrap(), "\"alloy\"");
        let v: Voice = serde_json::from_str("\"shimmer\"").unwrap();
        assert_eq!(v, Voice::Shimmer);
    }

    #[test]
    fn test_speech_request_short_input_unchanged() {
        let req = SpeechRequest::new(TtsModel::Tts1, Voice::Alloy, "Hello world");
        assert_eq!(req.input, "Hello world");
    }

    #[test]
    fn test_speech_request_long_input_truncated() {
        let long = "x".repeat(MAX_INPUT_CHARS + 500);
        let req = SpeechRequest::new(TtsModel::Tts1, Voice::Nova, long);
        assert_eq!(req.input.chars().count(), MAX_INPUT_CHARS);
    }

    #[test]
    fn test_speech_request_truncation_counts_chars_not_bytes() {
        // Multibyte input: 4096 chars of a 3-byte codepoint
        let long = "█".repeat(MAX_INPUT_CHARS + 10);
        let req = SpeechRequest::new(TtsModel::Tts1Hd, Voice::Echo, long);
        assert_eq!(req.input.chars().count(), MAX_INPUT_CHARS);
    }
}
