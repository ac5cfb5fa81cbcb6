use std::sync::Arc;

use crate::traits::codec::EncodedFrameSink;
use crate::traits::render::RenderEngine;

/// Encoding capability of a media unit.
///
/// Starting while already encoding only re-assigns the delegate; the codec
/// is not restarted.
pub trait UnitEncoding {
    fn start_encoding(&self, delegate: Arc<dyn EncodedFrameSink>);

    /// Stop encoding and detach the delegate. After this returns, no
    /// buffer reaches the torn-down delegate.
    fn stop_encoding(&self);
}

/// Decoding capability of a media unit.
///
/// A unit switching from the encode role tears the previous role's wiring
/// down completely before establishing decode, and vice versa, so buffers
/// are never delivered twice.
pub trait UnitDecoding {
    fn start_decoding(&self, engine: Arc<dyn RenderEngine>);

    /// Stop decoding, detach the delegate, and tear down the render-engine
    /// node that was attached for playback.
    fn stop_decoding(&self);
}
