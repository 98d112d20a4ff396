//! Mock infrastructure for testing
//!
//! Provides mock collaborators for every external service the session
//! drives, plus a shared event log so tests can assert call ordering
//! across components.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::os::fd::OwnedFd;
use std::sync::Arc;
use tokio::sync::broadcast;

use argon_core::caps::StaticProfiles;
use argon_core::capture::{
    AudioCapture, CameraHub, CameraRequest, MicrophoneHub, SurfaceHub, VideoCapture,
};
use argon_core::config::AudioSourceKind;
use argon_core::encode::{
    AudioEncoderSettings, CodecService, EncodedTrack, EncoderFlags, VideoEncoderSettings,
};
use argon_core::error::{ArgonError, Result};
use argon_core::output::{
    ContainerKind, ProgressListener, SessionMeta, Writer, WriterFactory,
};
use argon_core::session::MediaServices;
use argon_core::types::{AudioFormat, EncodedPacket, TrackKind, VideoFormat};
use argon_core::usage::{UsageAccounting, UsageFlags};

/// Shared ordered log of collaborator calls
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn contains(&self, prefix: &str) -> bool {
        self.position(prefix).is_some()
    }

    /// Index of the first event starting with `prefix`
    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.0.lock().iter().position(|e| e.starts_with(prefix))
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.0.lock().iter().filter(|e| e.starts_with(prefix)).count()
    }
}

/// Knobs for building a mock service bundle
pub struct HarnessOptions {
    pub camera_init_ok: bool,
    pub mic_init_ok: bool,
    pub codec_video_fails: bool,
    pub codec_audio_fails: bool,
    pub writer_start_fails: bool,
    pub writer_stop_fails: bool,
    pub metadata_in_buffers: bool,
    pub source_frame_rate: u32,
    pub amplitude: i32,
    pub profiles: StaticProfiles,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            camera_init_ok: true,
            mic_init_ok: true,
            codec_video_fails: false,
            codec_audio_fails: false,
            writer_start_fails: false,
            writer_stop_fails: false,
            metadata_in_buffers: false,
            source_frame_rate: 30,
            amplitude: 0,
            profiles: StaticProfiles::default(),
        }
    }
}

/// A mock service bundle plus the probes tests assert against
pub struct Harness {
    pub services: MediaServices,
    pub log: EventLog,
    pub usage: Arc<MockUsage>,
    pub last_meta: Arc<Mutex<Option<SessionMeta>>>,
}

/// Build a mock service bundle
pub fn harness(options: HarnessOptions) -> Harness {
    let log = EventLog::default();
    let usage = Arc::new(MockUsage::default());
    let last_meta = Arc::new(Mutex::new(None));

    let services = MediaServices {
        codec: Arc::new(MockCodecService {
            log: log.clone(),
            video_fails: options.codec_video_fails,
            audio_fails: options.codec_audio_fails,
        }),
        writers: Arc::new(MockWriterFactory {
            log: log.clone(),
            start_fails: options.writer_start_fails,
            stop_fails: options.writer_stop_fails,
            last_meta: last_meta.clone(),
        }),
        camera: Arc::new(MockCameraHub {
            log: log.clone(),
            init_ok: options.camera_init_ok,
            metadata_in_buffers: options.metadata_in_buffers,
            frame_rate: options.source_frame_rate,
        }),
        surface: Arc::new(MockSurfaceHub { log: log.clone() }),
        microphone: Arc::new(MockMicrophoneHub {
            log: log.clone(),
            init_ok: options.mic_init_ok,
            amplitude: options.amplitude,
        }),
        profiles: Arc::new(options.profiles),
        usage: usage.clone(),
    };

    Harness {
        services,
        log,
        usage,
        last_meta,
    }
}

/// Build a mock service bundle with default options
pub fn default_harness() -> Harness {
    harness(HarnessOptions::default())
}

pub struct MockVideoCapture {
    log: EventLog,
    format: VideoFormat,
    init_ok: bool,
    metadata_in_buffers: bool,
    time_lapse: bool,
}

impl VideoCapture for MockVideoCapture {
    fn init_check(&self) -> Result<()> {
        if self.init_ok {
            Ok(())
        } else {
            Err(ArgonError::no_init("mock video source"))
        }
    }

    fn video_format(&self) -> VideoFormat {
        self.format
    }

    fn metadata_in_buffers(&self) -> bool {
        self.metadata_in_buffers
    }

    fn stop(&self) -> Result<()> {
        self.log.push("video-source.stop");
        Ok(())
    }

    fn unblock_read(&self) {
        if self.time_lapse {
            self.log.push("time-lapse.unblock");
        }
    }
}

pub struct MockCameraHub {
    log: EventLog,
    init_ok: bool,
    metadata_in_buffers: bool,
    frame_rate: u32,
}

#[async_trait]
impl CameraHub for MockCameraHub {
    async fn open_camera(&self, request: CameraRequest) -> Result<Arc<dyn VideoCapture>> {
        self.log.push(format!(
            "camera.open id={} {}x{} fps={:?} time-lapse={}",
            request.camera_id,
            request.width,
            request.height,
            request.frame_rate,
            request.time_lapse_interval.is_some(),
        ));
        Ok(Arc::new(MockVideoCapture {
            log: self.log.clone(),
            format: VideoFormat {
                width: request.width,
                height: request.height,
                stride: request.width,
                slice_height: request.height,
                color_format: 21,
                frame_rate: request.frame_rate.unwrap_or(self.frame_rate),
            },
            init_ok: self.init_ok,
            metadata_in_buffers: self.metadata_in_buffers,
            time_lapse: request.time_lapse_interval.is_some(),
        }))
    }
}

pub struct MockSurfaceHub {
    log: EventLog,
}

#[async_trait]
impl SurfaceHub for MockSurfaceHub {
    async fn open_surface(&self, width: u32, height: u32) -> Result<Arc<dyn VideoCapture>> {
        self.log.push(format!("surface.open {}x{}", width, height));
        Ok(Arc::new(MockVideoCapture {
            log: self.log.clone(),
            format: VideoFormat {
                width,
                height,
                stride: width,
                slice_height: height,
                color_format: 21,
                frame_rate: 30,
            },
            init_ok: true,
            metadata_in_buffers: true,
            time_lapse: false,
        }))
    }
}

pub struct MockAudioCapture {
    log: EventLog,
    format: AudioFormat,
    init_ok: bool,
    amplitude: i32,
    packets: broadcast::Sender<Arc<EncodedPacket>>,
}

impl AudioCapture for MockAudioCapture {
    fn init_check(&self) -> Result<()> {
        if self.init_ok {
            Ok(())
        } else {
            Err(ArgonError::no_init("mock audio source"))
        }
    }

    fn audio_format(&self) -> AudioFormat {
        self.format
    }

    fn max_amplitude(&self) -> i32 {
        self.amplitude
    }

    fn stop(&self) -> Result<()> {
        self.log.push("audio-source.stop");
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<Arc<EncodedPacket>> {
        self.packets.subscribe()
    }
}

pub struct MockMicrophoneHub {
    log: EventLog,
    init_ok: bool,
    amplitude: i32,
}

#[async_trait]
impl MicrophoneHub for MockMicrophoneHub {
    async fn open_microphone(
        &self,
        kind: AudioSourceKind,
        sample_rate: u32,
        channels: u32,
    ) -> Result<Arc<dyn AudioCapture>> {
        self.log.push(format!(
            "mic.open kind={:?} rate={} channels={}",
            kind, sample_rate, channels
        ));
        let (packets, _) = broadcast::channel(16);
        Ok(Arc::new(MockAudioCapture {
            log: self.log.clone(),
            format: AudioFormat {
                sample_rate,
                channels,
                max_input_size: 4096,
            },
            init_ok: self.init_ok,
            amplitude: self.amplitude,
            packets,
        }))
    }
}

pub struct MockCodecService {
    log: EventLog,
    video_fails: bool,
    audio_fails: bool,
}

#[async_trait]
impl CodecService for MockCodecService {
    async fn create_audio_encoder(
        &self,
        settings: AudioEncoderSettings,
        _source: Arc<dyn AudioCapture>,
    ) -> Result<EncodedTrack> {
        self.log.push(format!(
            "codec.audio mime={} rate={} channels={} bps={}",
            settings.mime, settings.sample_rate, settings.channels, settings.bit_rate
        ));
        if self.audio_fails {
            return Err(ArgonError::unknown("mock audio codec rejected request"));
        }
        let (_tx, rx) = broadcast::channel(16);
        Ok(EncodedTrack::new(TrackKind::Audio, settings.mime, rx))
    }

    async fn create_video_encoder(
        &self,
        settings: VideoEncoderSettings,
        _source: Arc<dyn VideoCapture>,
        flags: EncoderFlags,
    ) -> Result<EncodedTrack> {
        self.log.push(format!(
            "codec.video mime={} {}x{} fps={} bps={} profile={:?} hw={} meta={} single={}",
            settings.mime,
            settings.width,
            settings.height,
            settings.frame_rate,
            settings.bit_rate,
            settings.profile,
            flags.hardware_only,
            flags.metadata_in_buffers,
            flags.single_buffer_in_flight,
        ));
        if self.video_fails {
            return Err(ArgonError::unknown("mock video codec rejected request"));
        }
        let (_tx, rx) = broadcast::channel(16);
        Ok(EncodedTrack::new(TrackKind::Video, settings.mime, rx))
    }
}

pub struct MockWriter {
    log: EventLog,
    start_fails: bool,
    stop_fails: bool,
    last_meta: Arc<Mutex<Option<SessionMeta>>>,
    tracks: Vec<EncodedTrack>,
}

#[async_trait]
impl Writer for MockWriter {
    fn add_track(&mut self, track: EncodedTrack) -> Result<()> {
        self.log
            .push(format!("writer.add {} mime={}", track.kind(), track.mime()));
        self.tracks.push(track);
        Ok(())
    }

    fn set_max_duration_us(&mut self, duration_us: u64) {
        self.log.push(format!("writer.max-duration {}", duration_us));
    }

    fn set_max_size_bytes(&mut self, bytes: u64) {
        self.log.push(format!("writer.max-size {}", bytes));
    }

    fn set_listener(&mut self, _listener: Arc<dyn ProgressListener>) {
        self.log.push("writer.listener");
    }

    async fn start(&mut self, meta: Option<&SessionMeta>) -> Result<()> {
        match meta {
            Some(meta) => {
                self.log.push("writer.start");
                *self.last_meta.lock() = Some(meta.clone());
            }
            None => self.log.push("writer.resume"),
        }
        if self.start_fails {
            return Err(ArgonError::unknown("mock writer failed to start"));
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.log.push("writer.pause");
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.log.push("writer.stop");
        if self.stop_fails {
            return Err(ArgonError::unknown("mock writer failed to stop"));
        }
        Ok(())
    }

    fn dump(&self, out: &mut dyn std::io::Write) -> std::io::Result<()> {
        writeln!(out, "   Mock writer: {} tracks", self.tracks.len())
    }
}

pub struct MockWriterFactory {
    log: EventLog,
    start_fails: bool,
    stop_fails: bool,
    last_meta: Arc<Mutex<Option<SessionMeta>>>,
}

impl WriterFactory for MockWriterFactory {
    fn create(&self, kind: ContainerKind, _fd: OwnedFd) -> Result<Box<dyn Writer>> {
        self.log.push(format!("factory.create {:?}", kind));
        Ok(Box::new(MockWriter {
            log: self.log.clone(),
            start_fails: self.start_fails,
            stop_fails: self.stop_fails,
            last_meta: self.last_meta.clone(),
            tracks: Vec::new(),
        }))
    }
}

/// Records every usage accounting notification
#[derive(Default)]
pub struct MockUsage {
    calls: Mutex<Vec<UsageFlags>>,
}

impl MockUsage {
    pub fn calls(&self) -> Vec<UsageFlags> {
        self.calls.lock().clone()
    }
}

impl UsageAccounting for MockUsage {
    fn add_usage(&self, flags: UsageFlags) {
        self.calls.lock().push(flags);
    }
}
