use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::models::config::{SessionConfiguration, SessionPreset, VideoOrientation};
use crate::models::format::MediaType;
use crate::traits::device::{CaptureDevice, CaptureStream};

/// Slot an input occupies within the session.
///
/// At most one input per slot: one audio input, and one or two video inputs
/// when a second camera is attached for picture-in-picture capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InputSlot {
    Audio,
    PrimaryVideo,
    SecondaryVideo,
}

impl InputSlot {
    pub fn media_type(&self) -> MediaType {
        match self {
            Self::Audio => MediaType::Audio,
            Self::PrimaryVideo | Self::SecondaryVideo => MediaType::Video,
        }
    }
}

/// A device attached to the session: the device handle plus its live
/// capture stream.
///
/// Owned exclusively by the session once attached. Attaching a new device
/// to the same slot always detaches the previous input first; inputs are
/// replaced, never mutated in place.
pub struct DeviceInput {
    id: String,
    device: Arc<dyn CaptureDevice>,
    stream: Box<dyn CaptureStream>,
}

impl DeviceInput {
    pub fn new(device: Arc<dyn CaptureDevice>, stream: Box<dyn CaptureStream>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            device,
            stream,
        }
    }

    /// Session-unique identifier for log correlation.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn device(&self) -> &Arc<dyn CaptureDevice> {
        &self.device
    }

    pub fn stream_mut(&mut self) -> &mut dyn CaptureStream {
        self.stream.as_mut()
    }
}

struct SessionInner {
    inputs: BTreeMap<InputSlot, DeviceInput>,
    config: SessionConfiguration,
}

/// Process-wide-per-stream state representing the hardware capture session.
///
/// Holds the active device inputs and the session-wide configuration. Every
/// mutation goes through a [`ConfigurationTransaction`]; the transaction
/// guard holds the session lock for its whole lifetime, so two transactions
/// can never overlap on the same session.
pub struct CaptureSession {
    inner: Mutex<SessionInner>,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SessionInner {
                inputs: BTreeMap::new(),
                config: SessionConfiguration::default(),
            }),
        }
    }

    /// Open a configuration transaction. Commits when the guard drops.
    ///
    /// This is the only operation that may briefly block buffer delivery;
    /// keep the bracket as narrow as possible.
    pub fn begin_configuration(&self) -> ConfigurationTransaction<'_> {
        let inner = self.inner.lock();
        log::trace!("capture session: begin configuration");
        ConfigurationTransaction { inner }
    }

    /// Whether a slot currently holds an input.
    pub fn has_input(&self, slot: InputSlot) -> bool {
        self.inner.lock().inputs.contains_key(&slot)
    }

    /// Number of attached inputs across all slots.
    pub fn input_count(&self) -> usize {
        self.inner.lock().inputs.len()
    }

    /// Snapshot of the session-wide configuration.
    pub fn configuration(&self) -> SessionConfiguration {
        self.inner.lock().config.clone()
    }
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII begin/commit bracket for session mutations.
///
/// All input, orientation, frame-rate, and preset changes happen through
/// this guard; dropping it commits. Configuration values that change are
/// re-applied to every active stream, skipping streams that do not support
/// the requested value.
pub struct ConfigurationTransaction<'a> {
    inner: MutexGuard<'a, SessionInner>,
}

impl ConfigurationTransaction<'_> {
    /// Insert an input, returning whatever previously occupied the slot.
    ///
    /// Callers detach the previous input's delivery target before inserting
    /// a replacement, so a displaced input returned here is already silent.
    pub fn insert_input(&mut self, slot: InputSlot, input: DeviceInput) -> Option<DeviceInput> {
        log::debug!(
            "capture session: attach input {} ({}) to {:?}",
            input.id(),
            input.device().id(),
            slot
        );
        self.inner.inputs.insert(slot, input)
    }

    /// Remove and return the input in `slot`, if any.
    pub fn remove_input(&mut self, slot: InputSlot) -> Option<DeviceInput> {
        let removed = self.inner.inputs.remove(&slot);
        if let Some(ref input) = removed {
            log::debug!("capture session: detach input {} from {:?}", input.id(), slot);
        }
        removed
    }

    pub fn has_input(&self, slot: InputSlot) -> bool {
        self.inner.inputs.contains_key(&slot)
    }

    pub fn orientation(&self) -> VideoOrientation {
        self.inner.config.orientation
    }

    pub fn frame_rate(&self) -> f64 {
        self.inner.config.frame_rate
    }

    pub fn preset(&self) -> SessionPreset {
        self.inner.config.preset
    }

    /// Store the orientation and re-apply it to every active video stream.
    /// Streams that do not support it are skipped, not failed.
    pub fn set_orientation(&mut self, orientation: VideoOrientation) {
        self.inner.config.orientation = orientation;
        let inner = &mut *self.inner;
        for (slot, input) in inner.inputs.iter_mut() {
            if slot.media_type() != MediaType::Video {
                continue;
            }
            if !input.stream.apply_orientation(orientation) {
                log::debug!(
                    "capture session: input {} skipped orientation {:?}",
                    input.id,
                    orientation
                );
            }
        }
    }

    /// Store the frame rate and re-apply it to every active stream. An
    /// out-of-bounds rate is rejected, keeping the previous value.
    pub fn set_frame_rate(&mut self, frame_rate: f64) {
        let mut config = self.inner.config.clone();
        config.frame_rate = frame_rate;
        if let Err(error) = config.validate() {
            log::warn!("capture session: {}", error);
            return;
        }
        self.inner.config = config;
        let inner = &mut *self.inner;
        for input in inner.inputs.values_mut() {
            if !input.stream.apply_frame_rate(frame_rate) {
                log::debug!(
                    "capture session: input {} skipped frame rate {}",
                    input.id,
                    frame_rate
                );
            }
        }
    }

    pub fn set_preset(&mut self, preset: SessionPreset) {
        self.inner.config.preset = preset;
    }

    /// Commit explicitly. Equivalent to dropping the guard.
    pub fn commit(self) {}
}

impl Drop for ConfigurationTransaction<'_> {
    fn drop(&mut self) {
        log::trace!("capture session: commit configuration");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::VideoOrientation;
    use crate::models::error::AttachError;
    use crate::traits::device::BufferTarget;

    struct StubStream {
        supports_orientation: bool,
    }

    impl CaptureStream for StubStream {
        fn set_target(&mut self, _target: Option<BufferTarget>) {}

        fn apply_orientation(&mut self, _orientation: VideoOrientation) -> bool {
            self.supports_orientation
        }
    }

    struct StubDevice {
        media_type: MediaType,
        supports_orientation: bool,
    }

    impl CaptureDevice for StubDevice {
        fn id(&self) -> &str {
            "stub"
        }

        fn media_type(&self) -> MediaType {
            self.media_type
        }

        fn open(&self) -> Result<Box<dyn CaptureStream>, AttachError> {
            Ok(Box::new(StubStream {
                supports_orientation: self.supports_orientation,
            }))
        }
    }

    fn attach(session: &CaptureSession, slot: InputSlot, supports_orientation: bool) {
        let device: Arc<dyn CaptureDevice> = Arc::new(StubDevice {
            media_type: slot.media_type(),
            supports_orientation,
        });
        let stream = device.open().unwrap();
        let input = DeviceInput::new(Arc::clone(&device), stream);
        session.begin_configuration().insert_input(slot, input);
    }

    #[test]
    fn one_input_per_slot() {
        let session = CaptureSession::new();
        attach(&session, InputSlot::Audio, false);
        attach(&session, InputSlot::Audio, false);

        assert_eq!(session.input_count(), 1);
        assert!(session.has_input(InputSlot::Audio));
        assert!(!session.has_input(InputSlot::PrimaryVideo));
    }

    #[test]
    fn audio_and_two_video_inputs_coexist() {
        let session = CaptureSession::new();
        attach(&session, InputSlot::Audio, false);
        attach(&session, InputSlot::PrimaryVideo, true);
        attach(&session, InputSlot::SecondaryVideo, true);

        assert_eq!(session.input_count(), 3);
    }

    #[test]
    fn remove_returns_the_input() {
        let session = CaptureSession::new();
        attach(&session, InputSlot::PrimaryVideo, true);

        let mut txn = session.begin_configuration();
        assert!(txn.remove_input(InputSlot::PrimaryVideo).is_some());
        assert!(txn.remove_input(InputSlot::PrimaryVideo).is_none());
        txn.commit();

        assert_eq!(session.input_count(), 0);
    }

    #[test]
    fn orientation_skips_unsupported_streams() {
        let session = CaptureSession::new();
        attach(&session, InputSlot::PrimaryVideo, true);
        attach(&session, InputSlot::SecondaryVideo, false);

        // Must not fail even though the secondary stream rejects it.
        let mut txn = session.begin_configuration();
        txn.set_orientation(VideoOrientation::Portrait);
        txn.commit();

        assert_eq!(
            session.configuration().orientation,
            VideoOrientation::Portrait
        );
    }

    #[test]
    fn out_of_bounds_frame_rate_keeps_previous_value() {
        let session = CaptureSession::new();

        let mut txn = session.begin_configuration();
        txn.set_frame_rate(60.0);
        txn.set_frame_rate(-5.0);
        txn.set_frame_rate(500.0);
        txn.commit();

        assert_eq!(session.configuration().frame_rate, 60.0);
    }

    #[test]
    fn orientation_not_applied_to_audio_streams() {
        let session = CaptureSession::new();
        attach(&session, InputSlot::Audio, true);

        let mut txn = session.begin_configuration();
        txn.set_orientation(VideoOrientation::LandscapeLeft);
        txn.commit();

        assert_eq!(
            session.configuration().orientation,
            VideoOrientation::LandscapeLeft
        );
    }
}
