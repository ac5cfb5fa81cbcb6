use media_io_core::models::error::AttachError;
use media_io_core::models::format::MediaType;
use media_io_core::traits::device::{CaptureDevice, CaptureStream};

/// A device whose open always fails with a configured error.
///
/// Stands in for a busy or permission-restricted device so attach failure
/// paths can be exercised without hardware.
pub struct UnavailableDevice {
    id: String,
    media_type: MediaType,
    error: AttachError,
}

impl UnavailableDevice {
    pub fn new(id: impl Into<String>, media_type: MediaType, error: AttachError) -> Self {
        Self {
            id: id.into(),
            media_type,
            error,
        }
    }

    pub fn busy(id: impl Into<String>, media_type: MediaType) -> Self {
        let id = id.into();
        let error = AttachError::DeviceBusy(id.clone());
        Self::new(id, media_type, error)
    }

    pub fn permission_denied(id: impl Into<String>, media_type: MediaType) -> Self {
        let id = id.into();
        let error = AttachError::PermissionDenied(id.clone());
        Self::new(id, media_type, error)
    }
}

impl CaptureDevice for UnavailableDevice {
    fn id(&self) -> &str {
        &self.id
    }

    fn media_type(&self) -> MediaType {
        self.media_type
    }

    fn open(&self) -> Result<Box<dyn CaptureStream>, AttachError> {
        Err(self.error.clone())
    }
}
