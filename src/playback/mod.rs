//! Playback Module
//!
//! Bridges a streamed binary audio response into playback instructions for a
//! browser-hosted audio element.

mod bridge;

pub use bridge::{BridgeState, PlaybackBridge, PlaybackInstruction, PlaybackSink};
