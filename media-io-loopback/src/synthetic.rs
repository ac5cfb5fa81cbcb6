//! Synthetic signal devices.
//!
//! Software stand-ins for hardware capture devices: a producer thread
//! generates buffers at a fixed cadence and delivers them to whatever
//! target the stream is currently wired to. Used by tests, demos, and any
//! environment without real capture hardware.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use media_io_core::models::config::VideoOrientation;
use media_io_core::models::error::AttachError;
use media_io_core::models::format::{FormatDescriptor, MediaType, PixelFormat};
use media_io_core::models::sample_buffer::SampleBuffer;
use media_io_core::processing::pcm;
use media_io_core::traits::device::{BufferTarget, CaptureDevice, CaptureStream};

/// Signal shape produced by a synthetic audio device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waveform {
    Silence,
    Sine { frequency: f64, amplitude: f32 },
}

/// A synthetic audio capture device producing planar f32 PCM buffers at a
/// fixed cadence with monotonically increasing timestamps.
pub struct SyntheticAudioDevice {
    id: String,
    sample_rate: f64,
    channels: u16,
    buffers_per_sec: u32,
    waveform: Waveform,
}

impl SyntheticAudioDevice {
    pub fn new(
        id: impl Into<String>,
        sample_rate: f64,
        channels: u16,
        buffers_per_sec: u32,
        waveform: Waveform,
    ) -> Self {
        Self {
            id: id.into(),
            sample_rate,
            channels,
            buffers_per_sec,
            waveform,
        }
    }

    /// A 48 kHz mono silence generator at `buffers_per_sec`.
    pub fn silence(id: impl Into<String>, buffers_per_sec: u32) -> Self {
        Self::new(id, 48000.0, 1, buffers_per_sec, Waveform::Silence)
    }

    /// A 48 kHz mono sine generator at `buffers_per_sec`.
    pub fn tone(id: impl Into<String>, buffers_per_sec: u32, frequency: f64) -> Self {
        Self::new(
            id,
            48000.0,
            1,
            buffers_per_sec,
            Waveform::Sine {
                frequency,
                amplitude: 0.5,
            },
        )
    }
}

impl CaptureDevice for SyntheticAudioDevice {
    fn id(&self) -> &str {
        &self.id
    }

    fn media_type(&self) -> MediaType {
        MediaType::Audio
    }

    fn open(&self) -> Result<Box<dyn CaptureStream>, AttachError> {
        let target: Arc<Mutex<Option<BufferTarget>>> = Arc::new(Mutex::new(None));
        let running = Arc::new(AtomicBool::new(true));

        let format = FormatDescriptor::audio(self.sample_rate, self.channels, 32);
        let frames_per_buffer = (self.sample_rate / self.buffers_per_sec as f64) as usize;
        let interval = Duration::from_secs_f64(1.0 / self.buffers_per_sec as f64);
        let waveform = self.waveform;
        let sample_rate = self.sample_rate;
        let channels = self.channels as usize;

        let producer = {
            let target = Arc::clone(&target);
            let running = Arc::clone(&running);
            thread::Builder::new()
                .name(format!("synthetic-audio-{}", self.id))
                .spawn(move || {
                    log::debug!("synthetic audio producer running");
                    let mut index: u64 = 0;
                    while running.load(Ordering::SeqCst) {
                        thread::sleep(interval);
                        if !running.load(Ordering::SeqCst) {
                            break;
                        }
                        let timestamp = interval.mul_f64(index as f64);
                        let first_frame = index as usize * frames_per_buffer;
                        let plane = render_plane(
                            waveform,
                            sample_rate,
                            first_frame,
                            frames_per_buffer,
                        );
                        let planes = vec![pcm::f32_to_le_bytes(&plane); channels];
                        let buffer = SampleBuffer::new(timestamp, format.clone(), planes);

                        // Delivery happens under the target lock so that a
                        // concurrent set_target(None) cannot return while a
                        // buffer is still on its way out.
                        let guard = target.lock();
                        if let Some(ref target) = *guard {
                            target.deliver(buffer);
                        }
                        drop(guard);
                        index += 1;
                    }
                })
                .expect("failed to spawn synthetic audio producer")
        };

        Ok(Box::new(SyntheticStream {
            target,
            running,
            producer: Some(producer),
        }))
    }
}

fn render_plane(
    waveform: Waveform,
    sample_rate: f64,
    first_frame: usize,
    frames: usize,
) -> Vec<f32> {
    match waveform {
        Waveform::Silence => vec![0.0; frames],
        Waveform::Sine {
            frequency,
            amplitude,
        } => (0..frames)
            .map(|i| {
                let t = (first_frame + i) as f64 / sample_rate;
                (2.0 * std::f64::consts::PI * frequency * t).sin() as f32 * amplitude
            })
            .collect(),
    }
}

/// A synthetic video capture device producing solid BGRA frames.
///
/// Supports orientation and frame-rate reconfiguration, so session
/// configuration changes are exercised end to end.
pub struct SyntheticVideoDevice {
    id: String,
    width: u32,
    height: u32,
    frame_rate: f64,
}

impl SyntheticVideoDevice {
    pub fn new(id: impl Into<String>, width: u32, height: u32, frame_rate: f64) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            frame_rate,
        }
    }
}

impl CaptureDevice for SyntheticVideoDevice {
    fn id(&self) -> &str {
        &self.id
    }

    fn media_type(&self) -> MediaType {
        MediaType::Video
    }

    fn open(&self) -> Result<Box<dyn CaptureStream>, AttachError> {
        let target: Arc<Mutex<Option<BufferTarget>>> = Arc::new(Mutex::new(None));
        let running = Arc::new(AtomicBool::new(true));
        let frame_rate = Arc::new(AtomicU64::new(self.frame_rate.to_bits()));

        let format = FormatDescriptor::video(self.width, self.height, PixelFormat::Bgra);
        let frame_bytes = (self.width * self.height * 4) as usize;

        let producer = {
            let target = Arc::clone(&target);
            let running = Arc::clone(&running);
            let frame_rate = Arc::clone(&frame_rate);
            thread::Builder::new()
                .name(format!("synthetic-video-{}", self.id))
                .spawn(move || {
                    log::debug!("synthetic video producer running");
                    let mut elapsed = Duration::ZERO;
                    while running.load(Ordering::SeqCst) {
                        let rate = f64::from_bits(frame_rate.load(Ordering::SeqCst));
                        let interval = Duration::from_secs_f64(1.0 / rate);
                        thread::sleep(interval);
                        if !running.load(Ordering::SeqCst) {
                            break;
                        }
                        elapsed += interval;
                        let buffer = SampleBuffer::new(
                            elapsed,
                            format.clone(),
                            vec![vec![0x80u8; frame_bytes]],
                        );
                        let guard = target.lock();
                        if let Some(ref target) = *guard {
                            target.deliver(buffer);
                        }
                        drop(guard);
                    }
                })
                .expect("failed to spawn synthetic video producer")
        };

        Ok(Box::new(SyntheticVideoStream {
            stream: SyntheticStream {
                target,
                running,
                producer: Some(producer),
            },
            frame_rate,
        }))
    }
}

/// Live stream of a synthetic audio device.
struct SyntheticStream {
    target: Arc<Mutex<Option<BufferTarget>>>,
    running: Arc<AtomicBool>,
    producer: Option<thread::JoinHandle<()>>,
}

impl CaptureStream for SyntheticStream {
    fn set_target(&mut self, target: Option<BufferTarget>) {
        *self.target.lock() = target;
    }
}

impl Drop for SyntheticStream {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(producer) = self.producer.take() {
            let _ = producer.join();
        }
        log::debug!("synthetic producer stopped");
    }
}

struct SyntheticVideoStream {
    stream: SyntheticStream,
    frame_rate: Arc<AtomicU64>,
}

impl CaptureStream for SyntheticVideoStream {
    fn set_target(&mut self, target: Option<BufferTarget>) {
        self.stream.set_target(target);
    }

    fn apply_orientation(&mut self, _orientation: VideoOrientation) -> bool {
        true
    }

    fn apply_frame_rate(&mut self, frame_rate: f64) -> bool {
        if frame_rate <= 0.0 {
            return false;
        }
        self.frame_rate.store(frame_rate.to_bits(), Ordering::SeqCst);
        true
    }
}
