use serde::{Deserialize, Serialize};

/// Kind of media a unit, buffer, or device carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Audio,
    Video,
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Audio => write!(f, "audio"),
            Self::Video => write!(f, "video"),
        }
    }
}

/// Pixel layout of a video plane set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    Bgra,
    Nv12,
    I420,
}

impl PixelFormat {
    /// Number of planes this layout splits a frame into.
    pub fn plane_count(&self) -> usize {
        match self {
            Self::Bgra => 1,
            Self::Nv12 => 2,
            Self::I420 => 3,
        }
    }
}

/// Describes the encoding of a sample buffer's payload.
///
/// A unit caches the descriptor the codec reports and swaps it atomically
/// whenever a format-change notification carries a *different* value;
/// repeated identical descriptors are deduplicated so the render graph is
/// reconnected exactly once per distinct format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FormatDescriptor {
    Audio {
        sample_rate: f64,
        channels: u16,
        bits_per_sample: u16,
    },
    Video {
        width: u32,
        height: u32,
        pixel_format: PixelFormat,
    },
}

impl FormatDescriptor {
    /// Convenience constructor for planar PCM audio.
    pub fn audio(sample_rate: f64, channels: u16, bits_per_sample: u16) -> Self {
        Self::Audio {
            sample_rate,
            channels,
            bits_per_sample,
        }
    }

    pub fn video(width: u32, height: u32, pixel_format: PixelFormat) -> Self {
        Self::Video {
            width,
            height,
            pixel_format,
        }
    }

    pub fn media_type(&self) -> MediaType {
        match self {
            Self::Audio { .. } => MediaType::Audio,
            Self::Video { .. } => MediaType::Video,
        }
    }

    /// Bytes occupied by one frame within a single plane.
    ///
    /// Audio planes are planar (one channel per plane), so a frame is a
    /// single sample. Video planes use the luma-plane stride.
    pub fn bytes_per_frame(&self) -> usize {
        match self {
            Self::Audio {
                bits_per_sample, ..
            } => (*bits_per_sample as usize) / 8,
            Self::Video { width, .. } => (*width as usize) * 4,
        }
    }

    /// Number of planes a buffer of this format carries.
    pub fn plane_count(&self) -> usize {
        match self {
            Self::Audio { channels, .. } => *channels as usize,
            Self::Video { pixel_format, .. } => pixel_format.plane_count(),
        }
    }
}

/// Opaque identity of a playback node inside a render engine.
///
/// Nodes are minted by the mixer (it owns the playback graph endpoints) and
/// handed to units, which attach, connect, and detach them but never look
/// inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderNode(u64);

impl RenderNode {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_frame_math() {
        let desc = FormatDescriptor::audio(48000.0, 2, 32);
        assert_eq!(desc.bytes_per_frame(), 4);
        assert_eq!(desc.plane_count(), 2);
        assert_eq!(desc.media_type(), MediaType::Audio);
    }

    #[test]
    fn descriptor_equality_drives_dedup() {
        let a = FormatDescriptor::audio(44100.0, 1, 16);
        let b = FormatDescriptor::audio(44100.0, 1, 16);
        let c = FormatDescriptor::audio(48000.0, 1, 16);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn descriptor_serializes_with_type_tag() {
        let desc = FormatDescriptor::video(1280, 720, PixelFormat::Nv12);
        let json = serde_json::to_value(&desc).unwrap();
        assert_eq!(json["type"], "video");
        assert_eq!(json["pixel_format"], "nv12");
    }
}
