use std::sync::Arc;

use crate::models::format::{FormatDescriptor, MediaType, RenderNode};
use crate::models::sample_buffer::SampleBuffer;
use crate::models::state::{CodecRole, UnitState};
use crate::traits::codec::{Codec, CodecEvent, CodecEventSender, EncodedFrameSink, RawSampleBlock};
use crate::traits::mixer::MediaMixer;
use crate::traits::render::RenderEngine;

/// Drives the codec start/stop state machine and reconciles format changes
/// with the render engine.
///
/// Runs entirely on the owning unit's execution context: codec events are
/// routed back through the unit queue, so `handle_event` never races with
/// `start_*`/`stop_*`.
pub(crate) struct CodecAdapter {
    codec: Box<dyn Codec>,
    events: CodecEventSender,
    mixer: Arc<dyn MediaMixer>,
    media_type: MediaType,
    state: UnitState,
    format: Option<FormatDescriptor>,
    delegate: Option<Arc<dyn EncodedFrameSink>>,
    render: Option<(Arc<dyn RenderEngine>, RenderNode)>,
}

impl CodecAdapter {
    pub fn new(
        codec: Box<dyn Codec>,
        events: CodecEventSender,
        mixer: Arc<dyn MediaMixer>,
        media_type: MediaType,
    ) -> Self {
        Self {
            codec,
            events,
            mixer,
            media_type,
            state: UnitState::Idle,
            format: None,
            delegate: None,
            render: None,
        }
    }

    pub fn state(&self) -> UnitState {
        self.state
    }

    pub fn format(&self) -> Option<&FormatDescriptor> {
        self.format.as_ref()
    }

    /// Discard codec state and the cached descriptor. Called on device
    /// swaps: the next format notification must reconcile from scratch
    /// even if the descriptor value happens to repeat.
    pub fn invalidate(&mut self) {
        self.codec.invalidate();
        self.format = None;
    }

    pub fn encode(&mut self, buffer: SampleBuffer) {
        self.codec.encode(buffer);
    }

    /// Start the encode role. If already encoding, only the delegate is
    /// re-assigned; if decoding, that role is torn down completely first.
    pub fn start_encoding(&mut self, delegate: Arc<dyn EncodedFrameSink>) {
        if self.state.is_encoding() {
            self.delegate = Some(delegate);
            return;
        }
        if self.state.is_decoding() {
            self.teardown_decoding();
        }
        self.delegate = Some(delegate);
        self.codec.start(CodecRole::Encode, self.events.clone());
        self.state = UnitState::Encoding;
        log::debug!("{} unit: encoding started", self.media_type);
    }

    pub fn stop_encoding(&mut self) {
        if !self.state.is_encoding() {
            return;
        }
        self.codec.stop();
        self.delegate = None;
        self.format = None;
        self.state = UnitState::Idle;
        log::debug!("{} unit: encoding stopped", self.media_type);
    }

    /// Start the decode role against `engine`. If already decoding, the
    /// playback node is re-bound to the new engine without restarting the
    /// codec; if encoding, that role is torn down completely first.
    pub fn start_decoding(&mut self, engine: Arc<dyn RenderEngine>) {
        if self.state.is_decoding() {
            self.detach_playback_node();
            self.attach_playback_node(engine);
            return;
        }
        if self.state.is_encoding() {
            self.stop_encoding();
        }
        self.attach_playback_node(engine);
        self.codec.start(CodecRole::Decode, self.events.clone());
        self.state = UnitState::Decoding;
        log::debug!("{} unit: decoding started", self.media_type);
    }

    pub fn stop_decoding(&mut self) {
        if !self.state.is_decoding() {
            return;
        }
        self.teardown_decoding();
        log::debug!("{} unit: decoding stopped", self.media_type);
    }

    /// Tear down whatever role is active. Used on shutdown.
    pub fn stop(&mut self) {
        match self.state {
            UnitState::Encoding => self.stop_encoding(),
            UnitState::Decoding => self.teardown_decoding(),
            UnitState::Idle => {}
        }
    }

    pub fn handle_event(&mut self, event: CodecEvent) {
        match event {
            CodecEvent::FormatChanged(descriptor) => self.on_format_changed(descriptor),
            CodecEvent::Encoded(payload) => {
                if let Some(ref delegate) = self.delegate {
                    delegate.on_encoded(payload);
                }
            }
            CodecEvent::Decoded { block, timestamp } => {
                self.on_decoded_output(block, timestamp);
            }
        }
    }

    fn on_format_changed(&mut self, descriptor: FormatDescriptor) {
        // One reconnect attempt per distinct descriptor value; repeated
        // identical notifications must not cause a reconnect storm.
        if self.format.as_ref() == Some(&descriptor) {
            return;
        }
        log::debug!("{} unit: format changed to {:?}", self.media_type, descriptor);
        self.format = Some(descriptor.clone());

        let Some((engine, node)) = self.render.as_ref() else {
            return;
        };
        if let Err(e) = engine.connect(*node, &descriptor) {
            log::warn!("{} unit: {}", self.media_type, e);
        }
        if !engine.is_running() {
            if let Err(e) = engine.start() {
                log::warn!("{} unit: {}", self.media_type, e);
            }
        }
    }

    fn on_decoded_output(&mut self, block: RawSampleBlock, timestamp: std::time::Duration) {
        if !self.state.is_decoding() {
            return;
        }
        // Zero-byte payloads are expected (encoder priming, flush) and are
        // dropped without touching the mixer sink.
        if block.is_empty() {
            return;
        }
        let Some(format) = self.format.clone() else {
            log::warn!(
                "{} unit: decoded output before any format notification, dropping",
                self.media_type
            );
            return;
        };
        let buffer = SampleBuffer::from_planar_bytes(timestamp, format, &block.channels);
        self.mixer.notify_observer(&buffer, timestamp);
        self.mixer.enqueue_decoded(buffer, timestamp);
    }

    fn attach_playback_node(&mut self, engine: Arc<dyn RenderEngine>) {
        let Some(node) = self.mixer.playback_node(self.media_type) else {
            log::debug!("{} unit: mixer exposes no playback node", self.media_type);
            return;
        };
        if let Err(e) = engine.attach_node(node) {
            log::warn!("{} unit: {}", self.media_type, e);
        }
        self.render = Some((engine, node));
    }

    fn detach_playback_node(&mut self) {
        if let Some((engine, node)) = self.render.take() {
            if let Err(e) = engine.detach_node(node) {
                log::warn!("{} unit: {}", self.media_type, e);
            }
        }
    }

    // The cached descriptor dies with the role: a restarted codec must
    // reconcile from scratch even when it re-reports the same format.
    fn teardown_decoding(&mut self) {
        self.detach_playback_node();
        self.codec.stop();
        self.delegate = None;
        self.format = None;
        self.state = UnitState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crossbeam_channel::unbounded;

    use super::*;
    use crate::models::error::ConfigurationError;

    #[derive(Default)]
    struct NullCodec {
        starts: usize,
        stops: usize,
    }

    impl Codec for NullCodec {
        fn start(&mut self, _role: CodecRole, _events: CodecEventSender) {
            self.starts += 1;
        }

        fn stop(&mut self) {
            self.stops += 1;
        }

        fn encode(&mut self, _buffer: SampleBuffer) {}
    }

    struct NoopSink;

    impl EncodedFrameSink for NoopSink {
        fn on_encoded(&self, _payload: crate::traits::codec::EncodedPayload) {}
    }

    #[derive(Default)]
    struct CountingMixer {
        enqueued: AtomicUsize,
        node: Option<RenderNode>,
    }

    impl MediaMixer for CountingMixer {
        fn use_sample_buffer(&self, _buffer: &SampleBuffer, _media_type: MediaType) -> bool {
            true
        }

        fn enqueue_decoded(&self, _buffer: SampleBuffer, _timestamp: Duration) {
            self.enqueued.fetch_add(1, Ordering::SeqCst);
        }

        fn notify_observer(&self, _buffer: &SampleBuffer, _timestamp: Duration) {}

        fn playback_node(&self, _media_type: MediaType) -> Option<RenderNode> {
            self.node
        }
    }

    #[derive(Default)]
    struct CountingEngine {
        connects: AtomicUsize,
        attaches: AtomicUsize,
        detaches: AtomicUsize,
        starts: AtomicUsize,
    }

    impl RenderEngine for CountingEngine {
        fn attach_node(&self, _node: RenderNode) -> Result<(), ConfigurationError> {
            self.attaches.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn detach_node(&self, _node: RenderNode) -> Result<(), ConfigurationError> {
            self.detaches.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn connect(
            &self,
            _node: RenderNode,
            _format: &FormatDescriptor,
        ) -> Result<(), ConfigurationError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn start(&self) -> Result<(), ConfigurationError> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn is_running(&self) -> bool {
            self.starts.load(Ordering::SeqCst) > 0
        }
    }

    fn adapter_with(mixer: Arc<CountingMixer>) -> CodecAdapter {
        let (tx, _rx) = unbounded();
        CodecAdapter::new(
            Box::new(NullCodec::default()),
            CodecEventSender::new(tx),
            mixer,
            MediaType::Audio,
        )
    }

    fn decoding_adapter(
        mixer: Arc<CountingMixer>,
        engine: Arc<CountingEngine>,
    ) -> CodecAdapter {
        let mut adapter = adapter_with(mixer);
        adapter.start_decoding(engine);
        adapter
    }

    #[test]
    fn repeated_identical_descriptor_connects_once() {
        let mixer = Arc::new(CountingMixer {
            node: Some(RenderNode::new(7)),
            ..Default::default()
        });
        let engine = Arc::new(CountingEngine::default());
        let mut adapter = decoding_adapter(Arc::clone(&mixer), Arc::clone(&engine));

        let desc = FormatDescriptor::audio(48000.0, 2, 32);
        for _ in 0..5 {
            adapter.handle_event(CodecEvent::FormatChanged(desc.clone()));
        }
        assert_eq!(engine.connects.load(Ordering::SeqCst), 1);

        // A genuinely different descriptor reconnects.
        adapter.handle_event(CodecEvent::FormatChanged(FormatDescriptor::audio(
            44100.0, 2, 32,
        )));
        assert_eq!(engine.connects.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn invalidate_forces_reconcile_on_repeat_descriptor() {
        let mixer = Arc::new(CountingMixer {
            node: Some(RenderNode::new(1)),
            ..Default::default()
        });
        let engine = Arc::new(CountingEngine::default());
        let mut adapter = decoding_adapter(Arc::clone(&mixer), Arc::clone(&engine));

        let desc = FormatDescriptor::audio(48000.0, 1, 32);
        adapter.handle_event(CodecEvent::FormatChanged(desc.clone()));
        adapter.invalidate();
        adapter.handle_event(CodecEvent::FormatChanged(desc));

        assert_eq!(engine.connects.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn engine_started_once_it_is_running() {
        let mixer = Arc::new(CountingMixer {
            node: Some(RenderNode::new(1)),
            ..Default::default()
        });
        let engine = Arc::new(CountingEngine::default());
        let mut adapter = decoding_adapter(Arc::clone(&mixer), Arc::clone(&engine));

        adapter.handle_event(CodecEvent::FormatChanged(FormatDescriptor::audio(
            48000.0, 1, 32,
        )));
        adapter.handle_event(CodecEvent::FormatChanged(FormatDescriptor::audio(
            44100.0, 1, 32,
        )));
        assert_eq!(engine.starts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_decoded_payload_never_reaches_mixer() {
        let mixer = Arc::new(CountingMixer {
            node: Some(RenderNode::new(1)),
            ..Default::default()
        });
        let engine = Arc::new(CountingEngine::default());
        let mut adapter = decoding_adapter(Arc::clone(&mixer), engine);

        adapter.handle_event(CodecEvent::FormatChanged(FormatDescriptor::audio(
            48000.0, 1, 32,
        )));
        adapter.handle_event(CodecEvent::Decoded {
            block: RawSampleBlock::default(),
            timestamp: Duration::ZERO,
        });
        adapter.handle_event(CodecEvent::Decoded {
            block: RawSampleBlock::new(vec![Vec::new()]),
            timestamp: Duration::ZERO,
        });
        assert_eq!(mixer.enqueued.load(Ordering::SeqCst), 0);

        adapter.handle_event(CodecEvent::Decoded {
            block: RawSampleBlock::new(vec![vec![0u8; 64]]),
            timestamp: Duration::from_millis(10),
        });
        assert_eq!(mixer.enqueued.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stop_decoding_detaches_node() {
        let mixer = Arc::new(CountingMixer {
            node: Some(RenderNode::new(3)),
            ..Default::default()
        });
        let engine = Arc::new(CountingEngine::default());
        let mut adapter = decoding_adapter(Arc::clone(&mixer), Arc::clone(&engine));

        adapter.stop_decoding();
        assert_eq!(engine.attaches.load(Ordering::SeqCst), 1);
        assert_eq!(engine.detaches.load(Ordering::SeqCst), 1);
        assert!(adapter.state().is_idle());
    }

    #[test]
    fn stop_start_round_trip_reconnects_the_render_graph() {
        let mixer = Arc::new(CountingMixer {
            node: Some(RenderNode::new(5)),
            ..Default::default()
        });
        let mut adapter = adapter_with(Arc::clone(&mixer));
        let desc = FormatDescriptor::audio(48000.0, 2, 32);

        let first = Arc::new(CountingEngine::default());
        adapter.start_decoding(Arc::clone(&first) as Arc<dyn RenderEngine>);
        adapter.handle_event(CodecEvent::FormatChanged(desc.clone()));
        assert_eq!(first.connects.load(Ordering::SeqCst), 1);

        adapter.stop_decoding();

        // A restarted unit on a fresh engine must wire up again even though
        // the codec re-reports the descriptor it reported before the stop.
        let second = Arc::new(CountingEngine::default());
        adapter.start_decoding(Arc::clone(&second) as Arc<dyn RenderEngine>);
        adapter.handle_event(CodecEvent::FormatChanged(desc.clone()));
        assert_eq!(second.connects.load(Ordering::SeqCst), 1);
        assert_eq!(second.starts.load(Ordering::SeqCst), 1);

        // The same holds coming out of the encode role.
        adapter.stop_decoding();
        adapter.start_encoding(Arc::new(NoopSink));
        adapter.handle_event(CodecEvent::FormatChanged(desc.clone()));
        adapter.stop_encoding();
        let third = Arc::new(CountingEngine::default());
        adapter.start_decoding(Arc::clone(&third) as Arc<dyn RenderEngine>);
        adapter.handle_event(CodecEvent::FormatChanged(desc));
        assert_eq!(third.connects.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn decoded_output_after_stop_is_dropped() {
        let mixer = Arc::new(CountingMixer {
            node: Some(RenderNode::new(3)),
            ..Default::default()
        });
        let engine = Arc::new(CountingEngine::default());
        let mut adapter = decoding_adapter(Arc::clone(&mixer), engine);

        adapter.handle_event(CodecEvent::FormatChanged(FormatDescriptor::audio(
            48000.0, 1, 32,
        )));
        adapter.stop_decoding();
        adapter.handle_event(CodecEvent::Decoded {
            block: RawSampleBlock::new(vec![vec![0u8; 64]]),
            timestamp: Duration::ZERO,
        });
        assert_eq!(mixer.enqueued.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn role_switch_tears_down_previous_role() {
        let mixer = Arc::new(CountingMixer {
            node: Some(RenderNode::new(3)),
            ..Default::default()
        });
        let engine = Arc::new(CountingEngine::default());
        let mut adapter = adapter_with(Arc::clone(&mixer));

        adapter.start_encoding(Arc::new(NoopSink));
        assert!(adapter.state().is_encoding());

        adapter.start_decoding(Arc::clone(&engine) as Arc<dyn RenderEngine>);
        assert!(adapter.state().is_decoding());
        assert_eq!(engine.attaches.load(Ordering::SeqCst), 1);

        adapter.start_encoding(Arc::new(NoopSink));
        assert!(adapter.state().is_encoding());
        // Switching back detached the playback node.
        assert_eq!(engine.detaches.load(Ordering::SeqCst), 1);
    }
}
