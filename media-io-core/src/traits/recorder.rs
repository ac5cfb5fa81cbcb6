use crate::models::error::SinkError;
use crate::models::format::MediaType;
use crate::models::sample_buffer::SampleBuffer;

/// Contract with the recorder collaborator.
///
/// Persists raw buffers to a container file. Calls are best-effort from the
/// pipeline's point of view: a failure is logged by the caller and never
/// blocks or fails buffer processing.
pub trait RecorderSink: Send + Sync {
    fn append(&self, buffer: SampleBuffer, media_type: MediaType) -> Result<(), SinkError>;
}
