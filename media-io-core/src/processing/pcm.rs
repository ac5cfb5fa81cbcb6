//! Pure-math helpers for sample plane manipulation.
//!
//! All operations work on byte or `f32` slices with no platform
//! dependencies. Used by the mute policy, decode reconstruction, effects,
//! and the loopback signal generators.

/// Convert `f32` samples to their little-endian byte representation.
pub fn f32_to_le_bytes(samples: &[f32]) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * 4);
    for &sample in samples {
        data.extend_from_slice(&sample.to_le_bytes());
    }
    data
}

/// Reinterpret a little-endian byte plane as `f32` samples.
///
/// Trailing bytes that do not form a whole sample are ignored.
pub fn le_bytes_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Apply a linear gain to an `f32` sample plane in place.
pub fn apply_gain(samples: &mut [f32], gain: f32) {
    for sample in samples.iter_mut() {
        *sample *= gain;
    }
}

/// Scale an `f32` byte plane by `gain`, returning a new plane of identical
/// length.
pub fn scale_plane(bytes: &[u8], gain: f32) -> Vec<u8> {
    let mut samples = le_bytes_to_f32(bytes);
    apply_gain(&mut samples, gain);
    f32_to_le_bytes(&samples)
}

/// Number of whole frames a plane of `byte_len` bytes holds.
pub fn frame_count(byte_len: usize, bytes_per_frame: usize) -> usize {
    if bytes_per_frame == 0 {
        return 0;
    }
    byte_len / bytes_per_frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn byte_conversion_round_trip() {
        let samples = vec![0.0f32, 0.5, -0.25, 1.0];
        let bytes = f32_to_le_bytes(&samples);
        assert_eq!(bytes.len(), 16);
        assert_eq!(le_bytes_to_f32(&bytes), samples);
    }

    #[test]
    fn partial_trailing_bytes_ignored() {
        let mut bytes = f32_to_le_bytes(&[1.0f32]);
        bytes.push(0xff);
        assert_eq!(le_bytes_to_f32(&bytes), vec![1.0f32]);
    }

    #[test]
    fn gain_scales_samples() {
        let mut samples = vec![0.5f32, -0.5, 1.0];
        apply_gain(&mut samples, 0.5);
        assert_relative_eq!(samples[0], 0.25);
        assert_relative_eq!(samples[1], -0.25);
        assert_relative_eq!(samples[2], 0.5);
    }

    #[test]
    fn zero_gain_silences_plane() {
        let bytes = f32_to_le_bytes(&[0.7f32, -0.3, 0.9]);
        let silenced = scale_plane(&bytes, 0.0);
        assert_eq!(silenced.len(), bytes.len());
        assert!(le_bytes_to_f32(&silenced).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn frame_math() {
        assert_eq!(frame_count(1024, 4), 256);
        assert_eq!(frame_count(1023, 4), 255);
        assert_eq!(frame_count(1024, 0), 0);
    }
}
