use crate::models::sample_buffer::SampleBuffer;

/// A pure buffer transform applied on the capture path.
///
/// Effects run in registration order, each receiving the previous effect's
/// output. Implementations must be side-effect free with respect to the
/// pipeline: the same input always yields the same output.
pub trait Effect: Send + Sync {
    /// Human-readable name for logs.
    fn name(&self) -> &str {
        "effect"
    }

    fn apply(&self, buffer: SampleBuffer) -> SampleBuffer;
}
