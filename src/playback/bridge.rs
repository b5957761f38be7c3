//! Streaming playback bridge.
//!
//! Accumulates streamed audio bytes and, after every chunk, re-encodes the
//! entire accumulated buffer to base64 and emits one playback instruction
//! carrying the full cumulative payload. The sink reloads the clip from
//! scratch each time, so playback restarts from position zero on every chunk.
//! That restart is intentional: it trades smooth streaming for simplicity and
//! is acceptable for short-form speech output. True incremental playback
//! would append only the new chunk to a growing media-source buffer instead.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpeechError};

/// Media type of the synthesized audio fed to the data URI.
pub const MEDIA_TYPE: &str = "audio/mp3";

/// One playback instruction for the audio sink.
///
/// Carries the base64 encoding of every byte received so far. The sink is
/// expected to set its source to this payload, pause, reset the playback
/// position to the start, then play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackInstruction {
    /// Cumulative standard-base64 encoding of the full buffer.
    pub base64: String,
}

impl PlaybackInstruction {
    /// Data URI suitable for an `<audio>` element's `src` attribute.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", MEDIA_TYPE, self.base64)
    }

    /// Decode back to the raw audio bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        BASE64_STANDARD
            .decode(&self.base64)
            .map_err(|e| SpeechError::Playback(format!("Invalid base64 payload: {e}")))
    }
}

/// Observer seam between the bridge and whatever renders the audio.
///
/// Implementations: the web layer pushes instructions down a streaming HTTP
/// response; the CLI logs progress and keeps the final clip.
pub trait PlaybackSink {
    fn play(&mut self, instruction: PlaybackInstruction) -> Result<()>;
}

impl<S: PlaybackSink + ?Sized> PlaybackSink for &mut S {
    fn play(&mut self, instruction: PlaybackInstruction) -> Result<()> {
        (**self).play(instruction)
    }
}

/// Lifecycle of one synthesis response. There is no transition back to
/// `Idle` except via a fresh request, and no cancellation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Idle,
    Streaming,
    Complete,
}

/// Accumulates streamed chunks and drives a [`PlaybackSink`].
pub struct PlaybackBridge<S: PlaybackSink> {
    buffer: Vec<u8>,
    state: BridgeState,
    sink: S,
    emitted: usize,
}

impl<S: PlaybackSink> PlaybackBridge<S> {
    pub fn new(sink: S) -> Self {
        Self {
            buffer: Vec::new(),
            state: BridgeState::Idle,
            sink,
            emitted: 0,
        }
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    /// Number of playback instructions emitted so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Total bytes accumulated so far.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Append one chunk, re-encode the whole buffer, and emit a playback
    /// instruction if the encoding is non-empty.
    pub fn push(&mut self, chunk: &[u8]) -> Result<()> {
        if self.state == BridgeState::Complete {
            return Err(SpeechError::Playback(
                "Bridge already completed; start a fresh request".to_string(),
            ));
        }
        self.state = BridgeState::Streaming;

        self.buffer.extend_from_slice(chunk);

        // The whole accumulated buffer is re-encoded, not just the new chunk.
        let encoded = BASE64_STANDARD.encode(&self.buffer);
        if !encoded.is_empty() {
            self.emitted += 1;
            tracing::trace!(
                "Playback instruction {}: {} bytes buffered, {} base64 chars",
                self.emitted,
                self.buffer.len(),
                encoded.len()
            );
            self.sink.play(PlaybackInstruction { base64: encoded })?;
        }

        Ok(())
    }

    /// Mark the stream complete and release the accumulated audio.
    pub fn finish(mut self) -> Vec<u8> {
        self.state = BridgeState::Complete;
        tracing::debug!(
            "Playback stream complete: {} bytes in {} instruction(s)",
            self.buffer.len(),
            self.emitted
        );
        std::mem::take(&mut self.buffer)
    }
}
