//! Transcription adapter: forwards an uploaded audio file to the Whisper
//! endpoint and returns the transcript text. No retry; oversized uploads are
//! rejected locally before any network call.

use serde::Deserialize;

use crate::error::{Result, SpeechError};
use crate::speech::client::SpeechClient;
use crate::speech::types::{ApiCredential, AudioUpload, MAX_UPLOAD_BYTES, TRANSCRIBE_MODEL};

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// MIME type for the multipart file part, from the file extension.
fn mime_for(file_name: &str) -> &'static str {
    match file_name.rsplit('.').next().map(str::to_ascii_lowercase).as_deref() {
        Some("flac") => "audio/flac",
        Some("mp3" | "mpga") => "audio/mpeg",
        Some("mp4") => "audio/mp4",
        Some("mpeg") => "video/mpeg",
        Some("m4a") => "audio/mp4",
        Some("ogg") => "audio/ogg",
        Some("wav") => "audio/wav",
        Some("webm") => "audio/webm",
        _ => "application/octet-stream",
    }
}

impl SpeechClient {
    /// Transcribe an uploaded audio file with Whisper.
    ///
    /// The upload bytes are forwarded unmodified. Transport and service
    /// errors are surfaced verbatim to the caller.
    pub async fn transcribe(
        &self,
        credential: &ApiCredential,
        upload: AudioUpload,
    ) -> Result<String> {
        let api_key = self.require_credential(credential)?;

        // Enforced again here so the guard holds no matter how the upload
        // was constructed.
        if upload.size() > MAX_UPLOAD_BYTES {
            return Err(SpeechError::UploadTooLarge { size: upload.size() });
        }

        tracing::info!(
            "Transcribing '{}' ({} bytes) with {}",
            upload.file_name,
            upload.size(),
            TRANSCRIBE_MODEL
        );

        let mime = mime_for(&upload.file_name);
        let file_part = reqwest::multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(mime)?;

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", TRANSCRIBE_MODEL)
            .text("response_format", "json");

        let response = self
            .client
            .post(self.endpoint("audio/transcriptions"))
            .header("Authorization", format!("Bearer {}", api_key))
            .timeout(self.timeout())
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let body = response.text().await?;
        let result: TranscriptionResponse = serde_json::from_str(&body)
            .map_err(|e| SpeechError::InvalidResponse(format!("{e}: {body}")))?;

        tracing::info!("Transcription complete: {} chars", result.text.len());
        Ok(result.text)
    }
}
