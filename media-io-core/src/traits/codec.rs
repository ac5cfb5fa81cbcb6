use std::time::Duration;

use crossbeam_channel::Sender;

use crate::models::format::FormatDescriptor;
use crate::models::sample_buffer::SampleBuffer;
use crate::models::state::CodecRole;
use crate::unit::UnitCommand;

/// A compressed frame produced by the encode path, handed to the
/// downstream consumer (network packetizer or muxer).
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedPayload {
    pub data: Vec<u8>,
    pub timestamp: Duration,
    /// Whether the payload can start a decode (key frame / config frame).
    pub is_sync: bool,
}

/// Raw planar output of the decode path: one byte vector per channel.
///
/// The byte size of the first channel governs the empty-payload rule: a
/// block whose first channel is empty is dropped, not forwarded, and is
/// not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSampleBlock {
    pub channels: Vec<Vec<u8>>,
}

impl RawSampleBlock {
    pub fn new(channels: Vec<Vec<u8>>) -> Self {
        Self { channels }
    }

    pub fn byte_size(&self) -> usize {
        self.channels.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.byte_size() == 0
    }
}

/// Notifications a codec emits while running.
#[derive(Debug, Clone)]
pub enum CodecEvent {
    /// The effective output format is known or has changed. The encoder may
    /// only learn its true output format after seeing the first buffer, so
    /// this can arrive at any point after start.
    FormatChanged(FormatDescriptor),

    /// A compressed payload is ready for the encoding delegate.
    Encoded(EncodedPayload),

    /// A decoded block is ready for playback reconstruction.
    Decoded {
        block: RawSampleBlock,
        timestamp: Duration,
    },
}

/// Routes codec notifications onto the owning unit's execution context.
///
/// Handed to the codec at start. Events sent after the unit has shut down
/// are dropped silently.
#[derive(Clone)]
pub struct CodecEventSender {
    sender: Sender<UnitCommand>,
}

impl CodecEventSender {
    pub(crate) fn new(sender: Sender<UnitCommand>) -> Self {
        Self { sender }
    }

    pub fn send(&self, event: CodecEvent) {
        let _ = self.sender.send(UnitCommand::CodecEvent(event));
    }
}

/// The encode/decode transform, treated as a black box.
///
/// The unit drives start/stop and feeds raw buffers to `encode`; the codec
/// reports format changes and produced output asynchronously through the
/// event sender it was started with.
pub trait Codec: Send {
    /// Start the codec in `role`, delivering notifications via `events`.
    fn start(&mut self, role: CodecRole, events: CodecEventSender);

    /// Stop the codec and drop its event sender. Idempotent.
    fn stop(&mut self);

    /// Feed one raw buffer to the encode path. Ignored when not running
    /// in the encode role.
    fn encode(&mut self, buffer: SampleBuffer);

    /// Discard internal state accumulated for the current input (called on
    /// device swaps, where the effective input format may change).
    fn invalidate(&mut self) {}
}

/// Consumer of compressed frames produced while encoding.
pub trait EncodedFrameSink: Send + Sync {
    fn on_encoded(&self, payload: EncodedPayload);
}
