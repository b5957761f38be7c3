//! Speech synthesis adapter: streams audio bytes from the TTS endpoint into
//! a playback bridge, 4096 bytes at a time. No retry; errors propagate.

use bytes::BytesMut;
use futures::StreamExt;
use serde_json::json;

use crate::error::Result;
use crate::playback::{PlaybackBridge, PlaybackSink};
use crate::speech::client::SpeechClient;
use crate::speech::types::{ApiCredential, SpeechRequest, STREAM_CHUNK_SIZE};

impl SpeechClient {
    /// Synthesize speech, relaying the streamed response through `sink` as
    /// the bytes arrive. Returns the complete clip once the stream ends.
    pub async fn synthesize<S: PlaybackSink>(
        &self,
        credential: &ApiCredential,
        request: &SpeechRequest,
        sink: S,
    ) -> Result<Vec<u8>> {
        let api_key = self.require_credential(credential)?;

        tracing::info!(
            "Synthesizing {} chars (model={}, voice={})",
            request.input.chars().count(),
            request.model,
            request.voice
        );

        let body = json!({
            "model": request.model,
            "voice": request.voice,
            "input": request.input,
        });

        let response = self
            .client
            .post(self.endpoint("audio/speech"))
            .header("Authorization", format!("Bearer {}", api_key))
            .timeout(self.timeout())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let mut bridge = PlaybackBridge::new(sink);
        let mut stream = response.bytes_stream();
        let mut pending = BytesMut::new();

        // The network hands us arbitrarily sized pieces; the bridge always
        // sees fixed 4096-byte reads plus one final partial chunk.
        while let Some(piece) = stream.next().await {
            pending.extend_from_slice(&piece?);
            while pending.len() >= STREAM_CHUNK_SIZE {
                let chunk = pending.split_to(STREAM_CHUNK_SIZE);
                bridge.push(&chunk)?;
            }
        }
        if !pending.is_empty() {
            bridge.push(&pending)?;
        }

        Ok(bridge.finish())
    }
}
