//! # media-io-loopback
//!
//! Software loopback capture backend for `media-io-core`.
//!
//! Provides synthetic signal devices that implement the core's
//! `CaptureDevice`/`CaptureStream` traits without touching any OS capture
//! API: an audio generator (silence or sine), a solid-color video
//! generator, and an always-failing device for attach-error paths. Each
//! open stream runs its own named producer thread and honors the
//! no-delivery-after-detach guarantee by delivering under the same lock
//! `set_target` takes.

pub mod synthetic;
pub mod unavailable;

pub use synthetic::{SyntheticAudioDevice, SyntheticVideoDevice, Waveform};
pub use unavailable::UnavailableDevice;
