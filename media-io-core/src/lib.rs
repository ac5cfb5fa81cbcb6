//! # media-io-core
//!
//! Platform-agnostic media I/O core library.
//!
//! Provides the per-media-kind capture → process → encode/decode pipeline
//! unit, transactional capture-session management, the effect registry, and
//! the contracts for external collaborators (mixer, codec, recorder, render
//! engine). Capture backends implement the `CaptureDevice`/`CaptureStream`
//! traits and plug into a `MediaUnit`; `media-io-loopback` ships a software
//! backend with synthetic signal devices.
//!
//! ## Architecture
//!
//! ```text
//! media-io-core (this crate)
//! ├── traits/       ← CaptureDevice, Codec, MediaMixer, RecorderSink, RenderEngine, Effect
//! ├── models/       ← SampleBuffer, FormatDescriptor, UnitState, errors, configuration
//! ├── processing/   ← pure-math PCM plane helpers
//! ├── session/      ← CaptureSession + configuration transactions
//! └── unit/         ← MediaUnit worker, codec adapter, effect registry
//! ```
//!
//! ## Concurrency model
//!
//! Each `MediaUnit` owns one dedicated worker thread; every mutation of
//! unit state is a message on that worker's queue. Capture streams and the
//! codec deliver into the same queue, so buffer processing never overlaps
//! with configuration changes and no locks are needed inside the unit. The
//! capture session's configuration transaction is the only cross-unit
//! critical section.

pub mod models;
pub mod processing;
pub mod session;
pub mod traits;
pub mod unit;

// Re-export key types at crate root for convenience.
pub use models::config::{SessionConfiguration, SessionPreset, VideoOrientation};
pub use models::error::{AttachError, ConfigurationError, SinkError};
pub use models::format::{FormatDescriptor, MediaType, PixelFormat, RenderNode};
pub use models::sample_buffer::SampleBuffer;
pub use models::state::{CodecRole, UnitState};
pub use session::{CaptureSession, DeviceInput, InputSlot};
pub use traits::codec::{Codec, CodecEvent, CodecEventSender, EncodedFrameSink, EncodedPayload, RawSampleBlock};
pub use traits::device::{BufferTarget, CaptureDevice, CaptureStream};
pub use traits::effect::Effect;
pub use traits::mixer::MediaMixer;
pub use traits::recorder::RecorderSink;
pub use traits::render::RenderEngine;
pub use traits::unit::{UnitDecoding, UnitEncoding};
pub use unit::{AttachErrorHandler, EffectRegistry, MediaUnit};
