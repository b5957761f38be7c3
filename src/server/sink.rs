//! Playback sink that relays instructions down a streaming HTTP response as
//! newline-delimited JSON, one line per instruction.

use bytes::Bytes;
use futures::channel::mpsc::UnboundedSender;
use serde_json::json;

use crate::error::{Result, SpeechError};
use crate::playback::{PlaybackInstruction, PlaybackSink};

pub struct ChannelSink {
    tx: UnboundedSender<Bytes>,
}

impl ChannelSink {
    pub fn new(tx: UnboundedSender<Bytes>) -> Self {
        Self { tx }
    }

    /// Send a terminal error line so the browser can show the failure.
    pub fn send_error(tx: &UnboundedSender<Bytes>, message: &str) {
        let line = format!("{}\n", json!({ "error": message }));
        let _ = tx.unbounded_send(Bytes::from(line));
    }
}

impl PlaybackSink for ChannelSink {
    fn play(&mut self, instruction: PlaybackInstruction) -> Result<()> {
        let line = format!("{}\n", json!({ "src": instruction.data_uri() }));
        self.tx
            .unbounded_send(Bytes::from(line))
            .map_err(|_| SpeechError::Playback("Client disconnected".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_play_writes_one_json_line() {
        let (tx, mut rx) = futures::channel::mpsc::unbounded();
        let mut sink = ChannelSink::new(tx);

        sink.play(PlaybackInstruction {
            base64: "aGVsbG8=".to_string(),
        })
        .unwrap();

        let line = rx.next().await.unwrap();
        let text = String::from_utf8(line.to_vec()).unwrap();
        assert!(text.ends_with('\n'));
        let parsed: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(
            parsed["src"].as_str().unwrap(),
            "data:audio/mp3;base64,aGVsbG8="
        );
    }

    #[tokio::test]
    async fn test_play_after_disconnect_errors() {
        let (tx, rx) = futures::channel::mpsc::unbounded();
        drop(rx);
        let mut sink = ChannelSink::new(tx);

        let result = sink.play(PlaybackInstruction {
            base64: "eA==".to_string(),
        });
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_error_line_shape() {
        let (tx, mut rx) = futures::channel::mpsc::unbounded();
        ChannelSink::send_error(&tx, "something broke");

        let line = rx.next().await.unwrap();
        let parsed: serde_json::Value =
            serde_json::from_str(std::str::from_utf8(&line).unwrap().trim()).unwrap();
        assert_eq!(parsed["error"].as_str().unwrap(), "something broke");
    }
}
