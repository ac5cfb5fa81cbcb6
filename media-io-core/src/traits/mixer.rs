use std::time::Duration;

use crate::models::format::{MediaType, RenderNode};
use crate::models::sample_buffer::SampleBuffer;

/// Contract with the mixer collaborator.
///
/// The mixer synchronizes audio and video units, fans decoded output out to
/// the render engine, and owns cross-stream ordering. All methods are
/// non-blocking and best-effort; the mixer owns its own synchronization.
pub trait MediaMixer: Send + Sync {
    /// Admission gate. Must be called before a captured buffer enters the
    /// pipeline proper; a `false` verdict (synchronization or backpressure
    /// policy) drops the buffer silently.
    fn use_sample_buffer(&self, buffer: &SampleBuffer, media_type: MediaType) -> bool;

    /// Hand a reconstructed decoded buffer to the synchronized playback
    /// queue.
    fn enqueue_decoded(&self, buffer: SampleBuffer, timestamp: Duration);

    /// Notify the optional external observer of decoded output. Called
    /// before the buffer is enqueued for playback.
    fn notify_observer(&self, buffer: &SampleBuffer, timestamp: Duration);

    /// The playback node the mixer exposes for this media kind, if any.
    /// Units attach this node to the render engine while decoding.
    fn playback_node(&self, media_type: MediaType) -> Option<RenderNode>;
}
