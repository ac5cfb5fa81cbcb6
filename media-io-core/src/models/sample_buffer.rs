use std::time::Duration;

use super::format::FormatDescriptor;
use crate::processing::pcm;

/// An immutable, timestamped block of raw media samples plus its format
/// descriptor.
///
/// Audio buffers carry one plane per channel (planar layout); video buffers
/// carry one plane per pixel-format plane. A buffer is produced by a capture
/// stream (or injected directly by a caller), consumed by exactly one
/// pipeline traversal, and cloned before being handed to recorder, codec, or
/// effects so consumers can never race on shared backing storage.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    timestamp: Duration,
    format: FormatDescriptor,
    planes: Vec<Vec<u8>>,
}

impl SampleBuffer {
    pub fn new(timestamp: Duration, format: FormatDescriptor, planes: Vec<Vec<u8>>) -> Self {
        Self {
            timestamp,
            format,
            planes,
        }
    }

    /// Build a planar audio buffer from `f32` channel data.
    pub fn from_f32_planes(
        timestamp: Duration,
        format: FormatDescriptor,
        channels: &[Vec<f32>],
    ) -> Self {
        let planes = channels
            .iter()
            .map(|channel| pcm::f32_to_le_bytes(channel))
            .collect();
        Self::new(timestamp, format, planes)
    }

    /// Reconstruct a buffer from planar channel bytes, as produced by the
    /// decode path. Each channel's backing bytes are copied verbatim.
    pub fn from_planar_bytes(
        timestamp: Duration,
        format: FormatDescriptor,
        channels: &[Vec<u8>],
    ) -> Self {
        Self::new(timestamp, format, channels.to_vec())
    }

    pub fn timestamp(&self) -> Duration {
        self.timestamp
    }

    pub fn format(&self) -> &FormatDescriptor {
        &self.format
    }

    pub fn planes(&self) -> &[Vec<u8>] {
        &self.planes
    }

    /// Byte size of the first plane. Zero for a plane-less buffer.
    pub fn byte_size(&self) -> usize {
        self.planes.first().map(|p| p.len()).unwrap_or(0)
    }

    /// Number of whole frames in the first plane.
    pub fn frames(&self) -> usize {
        pcm::frame_count(self.byte_size(), self.format.bytes_per_frame())
    }

    /// Decode the first plane as `f32` samples. Audio-only convenience.
    pub fn plane_as_f32(&self, index: usize) -> Vec<f32> {
        self.planes
            .get(index)
            .map(|p| pcm::le_bytes_to_f32(p))
            .unwrap_or_default()
    }

    /// Whether every plane is all zero bytes.
    pub fn is_silent(&self) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.iter().all(|&b| b == 0))
    }

    /// The silence-equivalent of this buffer: identical timestamp, format,
    /// plane count, and plane lengths, with all sample content zeroed.
    ///
    /// Muting replaces content rather than dropping buffers so downstream
    /// recorders and muxers keep seeing contiguous timestamps.
    pub fn silenced(&self) -> Self {
        let planes = self.planes.iter().map(|plane| vec![0u8; plane.len()]).collect();
        Self {
            timestamp: self.timestamp,
            format: self.format.clone(),
            planes,
        }
    }
}
