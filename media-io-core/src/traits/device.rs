use crossbeam_channel::Sender;

use crate::models::config::VideoOrientation;
use crate::models::error::AttachError;
use crate::models::format::MediaType;
use crate::models::sample_buffer::SampleBuffer;
use crate::unit::UnitCommand;

/// Handle delivering captured buffers into a unit's ingestion queue.
///
/// Handed to a capture stream at attach time so that buffer delivery always
/// lands on the owning unit's execution context, never on the capture
/// thread's. Cheap to clone.
#[derive(Clone)]
pub struct BufferTarget {
    sender: Sender<UnitCommand>,
}

impl BufferTarget {
    pub(crate) fn new(sender: Sender<UnitCommand>) -> Self {
        Self { sender }
    }

    /// Deliver a captured buffer. A delivery to a unit that has shut down
    /// is dropped silently.
    pub fn deliver(&self, buffer: SampleBuffer) {
        let _ = self.sender.send(UnitCommand::CaptureOutput(buffer));
    }
}

/// A physical (or synthetic) capture device.
///
/// Opening constructs the platform stream; it can fail when the device is
/// busy or permission is denied, in which case the caller's prior state
/// must remain untouched.
pub trait CaptureDevice: Send + Sync {
    /// Stable identifier used in logs and error messages.
    fn id(&self) -> &str;

    fn media_type(&self) -> MediaType;

    /// Open the device for streaming.
    fn open(&self) -> Result<Box<dyn CaptureStream>, AttachError>;
}

/// A live capture stream produced by [`CaptureDevice::open`].
///
/// Owned exclusively by the session once attached; replaced, never mutated
/// in place. Dropping the stream releases the underlying device.
pub trait CaptureStream: Send {
    /// Redirect buffer delivery at `target`; `None` stops delivery.
    ///
    /// Implementations must guarantee that once this returns with `None`,
    /// the previous target is never invoked again, even for a buffer that
    /// was mid-capture when the call was made.
    fn set_target(&mut self, target: Option<BufferTarget>);

    /// Apply a capture orientation. Returns `false` if the stream does not
    /// support the requested orientation; the session skips it rather than
    /// failing the configuration.
    fn apply_orientation(&mut self, orientation: VideoOrientation) -> bool {
        let _ = orientation;
        false
    }

    /// Apply a capture frame rate. Returns `false` if unsupported.
    fn apply_frame_rate(&mut self, frame_rate: f64) -> bool {
        let _ = frame_rate;
        false
    }
}
