use std::ops::ControlFlow;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, unbounded, Sender};

use crate::models::config::{SessionPreset, VideoOrientation};
use crate::models::error::AttachError;
use crate::models::format::MediaType;
use crate::models::sample_buffer::SampleBuffer;
use crate::models::state::UnitState;
use crate::session::{CaptureSession, DeviceInput, InputSlot};
use crate::traits::codec::{Codec, CodecEvent, CodecEventSender, EncodedFrameSink};
use crate::traits::device::{BufferTarget, CaptureDevice};
use crate::traits::effect::Effect;
use crate::traits::mixer::MediaMixer;
use crate::traits::recorder::RecorderSink;
use crate::traits::render::RenderEngine;
use crate::traits::unit::{UnitDecoding, UnitEncoding};
use crate::unit::codec_adapter::CodecAdapter;
use crate::unit::effects::EffectRegistry;

/// Callback invoked when an asynchronous attach request fails.
pub type AttachErrorHandler = Box<dyn FnOnce(AttachError) + Send + 'static>;

/// Messages processed on the unit's dedicated execution context.
pub(crate) enum UnitCommand {
    CaptureOutput(SampleBuffer),
    Append(SampleBuffer),
    Attach {
        slot: InputSlot,
        device: Option<Arc<dyn CaptureDevice>>,
        on_error: Option<AttachErrorHandler>,
    },
    SetMuted(bool),
    SetOrientation(VideoOrientation),
    SetFrameRate(f64),
    SetPreset(SessionPreset),
    RegisterEffect {
        effect: Arc<dyn Effect>,
        reply: Sender<bool>,
    },
    UnregisterEffect {
        effect: Arc<dyn Effect>,
        reply: Sender<bool>,
    },
    StartEncoding {
        delegate: Arc<dyn EncodedFrameSink>,
        reply: Sender<()>,
    },
    StopEncoding {
        reply: Sender<()>,
    },
    StartDecoding {
        engine: Arc<dyn RenderEngine>,
        reply: Sender<()>,
    },
    StopDecoding {
        reply: Sender<()>,
    },
    CodecEvent(CodecEvent),
    QueryState {
        reply: Sender<UnitState>,
    },
    QueryMuted {
        reply: Sender<bool>,
    },
    Flush {
        reply: Sender<()>,
    },
    Shutdown,
}

/// The per-media-kind capture → process → encode/decode pipeline component.
///
/// All mutable unit state (current device input, cached format descriptor,
/// mute flag, effect set, codec state) lives on one dedicated worker thread
/// fed by a command queue, so buffer delivery can never overlap with a
/// configuration change. Capture streams and the codec deliver into the
/// same queue.
///
/// Attach, buffer injection, and setting mute are asynchronous for the
/// caller; effect registration and encode/decode lifecycle calls are
/// blocking round-trips, so once `stop_encoding` or `stop_decoding`
/// returns, no further buffer reaches the torn-down delegate.
pub struct MediaUnit {
    media_type: MediaType,
    sender: Sender<UnitCommand>,
    worker: Option<thread::JoinHandle<()>>,
}

impl MediaUnit {
    pub fn new(
        media_type: MediaType,
        session: Arc<CaptureSession>,
        codec: Box<dyn Codec>,
        mixer: Arc<dyn MediaMixer>,
        recorder: Arc<dyn RecorderSink>,
    ) -> Self {
        let (sender, receiver) = unbounded();

        let adapter = CodecAdapter::new(
            codec,
            CodecEventSender::new(sender.clone()),
            Arc::clone(&mixer),
            media_type,
        );
        let mut core = UnitCore {
            media_type,
            primary_slot: match media_type {
                MediaType::Audio => InputSlot::Audio,
                MediaType::Video => InputSlot::PrimaryVideo,
            },
            session,
            mixer,
            recorder,
            adapter,
            effects: EffectRegistry::new(),
            muted: false,
            target: BufferTarget::new(sender.clone()),
        };

        let worker = thread::Builder::new()
            .name(format!("media-unit-{}", media_type))
            .spawn(move || {
                while let Ok(command) = receiver.recv() {
                    if core.handle(command).is_break() {
                        break;
                    }
                }
            })
            .expect("failed to spawn media unit worker");

        Self {
            media_type,
            sender,
            worker: Some(worker),
        }
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    /// Attach a capture device, or pass `None` to fully release the capture
    /// path. Dispatched onto the unit's execution context; a failure leaves
    /// the session unchanged and is reported through `on_error`.
    pub fn attach_device(
        &self,
        device: Option<Arc<dyn CaptureDevice>>,
        on_error: Option<AttachErrorHandler>,
    ) {
        let slot = match self.media_type {
            MediaType::Audio => InputSlot::Audio,
            MediaType::Video => InputSlot::PrimaryVideo,
        };
        let _ = self.sender.send(UnitCommand::Attach {
            slot,
            device,
            on_error,
        });
    }

    /// Attach a second camera for picture-in-picture capture. Video units
    /// only; an audio unit logs and ignores the request.
    pub fn attach_secondary_device(
        &self,
        device: Option<Arc<dyn CaptureDevice>>,
        on_error: Option<AttachErrorHandler>,
    ) {
        if self.media_type != MediaType::Video {
            log::warn!("secondary capture is video-only, ignoring");
            return;
        }
        let _ = self.sender.send(UnitCommand::Attach {
            slot: InputSlot::SecondaryVideo,
            device,
            on_error,
        });
    }

    /// Inject a buffer directly, bypassing the capture path and its
    /// admission gate. Cannot be mixed with an attached device on the same
    /// unit.
    pub fn append_sample_buffer(&self, buffer: SampleBuffer) {
        let _ = self.sender.send(UnitCommand::Append(buffer));
    }

    /// Mute or unmute. Muted buffers are replaced with silence of identical
    /// shape and timing, never dropped.
    pub fn set_muted(&self, muted: bool) {
        let _ = self.sender.send(UnitCommand::SetMuted(muted));
    }

    pub fn is_muted(&self) -> bool {
        self.round_trip(|reply| UnitCommand::QueryMuted { reply })
            .unwrap_or(false)
    }

    pub fn set_orientation(&self, orientation: VideoOrientation) {
        let _ = self.sender.send(UnitCommand::SetOrientation(orientation));
    }

    pub fn set_frame_rate(&self, frame_rate: f64) {
        let _ = self.sender.send(UnitCommand::SetFrameRate(frame_rate));
    }

    pub fn set_preset(&self, preset: SessionPreset) {
        let _ = self.sender.send(UnitCommand::SetPreset(preset));
    }

    /// Register an effect. Blocks until the unit's execution context has
    /// applied the change, so the verdict is definite: `true` if newly
    /// inserted, `false` if already present. Takes effect on the next
    /// buffer, not retroactively.
    pub fn register_effect(&self, effect: Arc<dyn Effect>) -> bool {
        self.round_trip(|reply| UnitCommand::RegisterEffect { effect, reply })
            .unwrap_or(false)
    }

    /// Unregister an effect. Returns `true` if an entry was removed.
    pub fn unregister_effect(&self, effect: Arc<dyn Effect>) -> bool {
        self.round_trip(|reply| UnitCommand::UnregisterEffect { effect, reply })
            .unwrap_or(false)
    }

    pub fn state(&self) -> UnitState {
        self.round_trip(|reply| UnitCommand::QueryState { reply })
            .unwrap_or(UnitState::Idle)
    }

    /// Block until every operation submitted before this call has been
    /// processed.
    pub fn flush(&self) {
        let _ = self.round_trip(|reply| UnitCommand::Flush { reply });
    }

    fn round_trip<T>(&self, build: impl FnOnce(Sender<T>) -> UnitCommand) -> Option<T> {
        let (reply, response) = bounded(1);
        if self.sender.send(build(reply)).is_err() {
            return None;
        }
        response.recv().ok()
    }
}

impl UnitEncoding for MediaUnit {
    fn start_encoding(&self, delegate: Arc<dyn EncodedFrameSink>) {
        let _ = self.round_trip(|reply| UnitCommand::StartEncoding { delegate, reply });
    }

    fn stop_encoding(&self) {
        let _ = self.round_trip(|reply| UnitCommand::StopEncoding { reply });
    }
}

impl UnitDecoding for MediaUnit {
    fn start_decoding(&self, engine: Arc<dyn RenderEngine>) {
        let _ = self.round_trip(|reply| UnitCommand::StartDecoding { engine, reply });
    }

    fn stop_decoding(&self) {
        let _ = self.round_trip(|reply| UnitCommand::StopDecoding { reply });
    }
}

impl Drop for MediaUnit {
    fn drop(&mut self) {
        let _ = self.sender.send(UnitCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Unit state confined to the worker thread.
struct UnitCore {
    media_type: MediaType,
    primary_slot: InputSlot,
    session: Arc<CaptureSession>,
    mixer: Arc<dyn MediaMixer>,
    recorder: Arc<dyn RecorderSink>,
    adapter: CodecAdapter,
    effects: EffectRegistry,
    muted: bool,
    target: BufferTarget,
}

impl UnitCore {
    fn handle(&mut self, command: UnitCommand) -> ControlFlow<()> {
        match command {
            UnitCommand::CaptureOutput(buffer) => {
                if self.mixer.use_sample_buffer(&buffer, self.media_type) {
                    self.append(buffer);
                }
            }
            UnitCommand::Append(buffer) => self.append(buffer),
            UnitCommand::Attach {
                slot,
                device,
                on_error,
            } => {
                if let Err(error) = self.attach(slot, device) {
                    log::error!("{} unit: attach failed: {}", self.media_type, error);
                    if let Some(on_error) = on_error {
                        on_error(error);
                    }
                }
            }
            UnitCommand::SetMuted(muted) => self.muted = muted,
            UnitCommand::SetOrientation(orientation) => {
                let mut txn = self.session.begin_configuration();
                txn.set_orientation(orientation);
            }
            UnitCommand::SetFrameRate(frame_rate) => {
                let mut txn = self.session.begin_configuration();
                txn.set_frame_rate(frame_rate);
            }
            UnitCommand::SetPreset(preset) => {
                let mut txn = self.session.begin_configuration();
                txn.set_preset(preset);
            }
            UnitCommand::RegisterEffect { effect, reply } => {
                let _ = reply.send(self.effects.register(effect));
            }
            UnitCommand::UnregisterEffect { effect, reply } => {
                let _ = reply.send(self.effects.unregister(&effect));
            }
            UnitCommand::StartEncoding { delegate, reply } => {
                self.adapter.start_encoding(delegate);
                let _ = reply.send(());
            }
            UnitCommand::StopEncoding { reply } => {
                self.adapter.stop_encoding();
                let _ = reply.send(());
            }
            UnitCommand::StartDecoding { engine, reply } => {
                self.adapter.start_decoding(engine);
                let _ = reply.send(());
            }
            UnitCommand::StopDecoding { reply } => {
                self.adapter.stop_decoding();
                let _ = reply.send(());
            }
            UnitCommand::CodecEvent(event) => self.adapter.handle_event(event),
            UnitCommand::QueryState { reply } => {
                let _ = reply.send(self.adapter.state());
            }
            UnitCommand::QueryMuted { reply } => {
                let _ = reply.send(self.muted);
            }
            UnitCommand::Flush { reply } => {
                let _ = reply.send(());
            }
            UnitCommand::Shutdown => {
                self.release();
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// The ingestion pipeline: mute policy, effect chain, recorder copy,
    /// codec encode.
    fn append(&mut self, buffer: SampleBuffer) {
        let buffer = if self.muted { buffer.silenced() } else { buffer };
        let buffer = self.effects.apply(buffer);
        if let Err(error) = self.recorder.append(buffer.clone(), self.media_type) {
            log::warn!("{} unit: {}", self.media_type, error);
        }
        self.adapter.encode(buffer);
    }

    fn attach(
        &mut self,
        slot: InputSlot,
        device: Option<Arc<dyn CaptureDevice>>,
    ) -> Result<(), AttachError> {
        if let Some(ref device) = device {
            if device.media_type() != slot.media_type() {
                return Err(AttachError::MediaTypeMismatch(
                    device.id().to_string(),
                    slot.media_type().to_string(),
                ));
            }
        }

        let mut txn = self.session.begin_configuration();
        self.adapter.invalidate();

        let Some(device) = device else {
            if let Some(mut old) = txn.remove_input(slot) {
                old.stream_mut().set_target(None);
            }
            return Ok(());
        };

        // Open the new device before touching the old input, so a failed
        // open leaves the session exactly as it was.
        let mut stream = device.open()?;

        // Old callback teardown happens-before the new input lands.
        if let Some(mut old) = txn.remove_input(slot) {
            old.stream_mut().set_target(None);
        }

        if slot.media_type() == MediaType::Video {
            if !stream.apply_orientation(txn.orientation()) {
                log::debug!("{} unit: new stream skipped orientation", self.media_type);
            }
        }
        if !stream.apply_frame_rate(txn.frame_rate()) {
            log::debug!("{} unit: new stream skipped frame rate", self.media_type);
        }
        stream.set_target(Some(self.target.clone()));
        txn.insert_input(slot, DeviceInput::new(device, stream));
        Ok(())
    }

    /// Shutdown path: release session inputs and stop whatever role is
    /// active so a dropped unit never leaves a live stream pointed at a
    /// dead queue.
    fn release(&mut self) {
        let mut txn = self.session.begin_configuration();
        for slot in [self.primary_slot, InputSlot::SecondaryVideo] {
            if slot.media_type() != self.media_type {
                continue;
            }
            if let Some(mut old) = txn.remove_input(slot) {
                old.stream_mut().set_target(None);
            }
        }
        drop(txn);
        self.adapter.stop();
    }
}
