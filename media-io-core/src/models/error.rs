use thiserror::Error;

/// Errors raised while attaching or detaching a capture device.
///
/// Attach is the one user-requested action whose failure is surfaced to the
/// caller. The session is left exactly as it was before the attempt: the
/// new device is opened before the old input is touched, so a failed open
/// never produces a partial attach.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttachError {
    #[error("permission denied for device {0}")]
    PermissionDenied(String),

    #[error("device busy: {0}")]
    DeviceBusy(String),

    #[error("device not available: {0}")]
    NotAvailable(String),

    #[error("device {0} cannot produce {1}")]
    MediaTypeMismatch(String, String),
}

/// Errors raised while (re)configuring the render graph after a format
/// change, or while starting the render engine.
///
/// These are logged and recovered on the spot: the pipeline keeps running
/// in a degraded (silent) playback state until the next successful format
/// notification. They never terminate a live stream.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("render node attach failed: {0}")]
    NodeAttach(String),

    #[error("render node detach failed: {0}")]
    NodeDetach(String),

    #[error("render graph connect failed: {0}")]
    GraphConnect(String),

    #[error("render engine start failed: {0}")]
    EngineStart(String),
}

/// Error returned by a recorder sink when it cannot persist a buffer.
///
/// The pipeline swallows and logs these; a recording hiccup must not stall
/// or fail live capture.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("recorder sink failed: {0}")]
pub struct SinkError(pub String);
