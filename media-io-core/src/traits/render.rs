use crate::models::error::ConfigurationError;
use crate::models::format::{FormatDescriptor, RenderNode};

/// Contract with the playback graph that turns decoded buffers into
/// audible or visible output.
///
/// Every call is fallible (device busy, format mismatch) and every failure
/// is non-fatal: the caller logs it and keeps the pipeline running in a
/// degraded, silent playback state.
pub trait RenderEngine: Send + Sync {
    fn attach_node(&self, node: RenderNode) -> Result<(), ConfigurationError>;

    fn detach_node(&self, node: RenderNode) -> Result<(), ConfigurationError>;

    /// Connect `node` into the graph with the given format. Called again
    /// whenever the effective format changes.
    fn connect(&self, node: RenderNode, format: &FormatDescriptor)
        -> Result<(), ConfigurationError>;

    fn start(&self) -> Result<(), ConfigurationError>;

    fn is_running(&self) -> bool;
}
