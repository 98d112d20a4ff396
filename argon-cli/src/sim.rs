//! Simulated device backends for dry runs
//!
//! Stands in for the platform capture, codec and writer services so the
//! session wiring can be exercised end to end without touching hardware.
//! Sources produce no frames; the dry run only proves that configuration,
//! negotiation, pipeline building and lifecycle sequencing hold together.

use async_trait::async_trait;
use std::os::fd::{AsFd, OwnedFd};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

use argon_core::caps::StaticProfiles;
use argon_core::capture::{
    AudioCapture, CameraHub, CameraRequest, MicrophoneHub, SurfaceHub, VideoCapture,
};
use argon_core::config::AudioSourceKind;
use argon_core::encode::{
    AudioEncoderSettings, CodecService, EncodedTrack, EncoderFlags, VideoEncoderSettings,
};
use argon_core::error::Result as ArgonResult;
use argon_core::output::{ContainerKind, ProgressListener, SessionMeta, Writer, WriterFactory};
use argon_core::session::{MediaServices, RecorderSession};
use argon_core::types::{AudioFormat, EncodedPacket, TrackKind, VideoFormat};
use argon_core::usage::NullUsageAccounting;
use argon_core::RecordingConfig;

/// Drive a full session lifecycle against simulated devices
pub async fn dry_run(config: RecordingConfig) -> anyhow::Result<()> {
    info!("Starting dry run against simulated devices");
    let mut session = RecorderSession::new(services());

    let sink = std::fs::OpenOptions::new().write(true).open("/dev/null")?;
    session.set_output_fd(sink.as_fd())?;
    *session.configure()? = config;

    session.start().await?;
    session.pause()?;
    session.start().await?;
    session.stop().await?;
    Ok(())
}

/// Build the simulated service bundle
pub fn services() -> MediaServices {
    MediaServices {
        codec: Arc::new(SimCodecService),
        writers: Arc::new(SimWriterFactory),
        camera: Arc::new(SimCameraHub),
        surface: Arc::new(SimSurfaceHub),
        microphone: Arc::new(SimMicrophoneHub),
        profiles: Arc::new(StaticProfiles::default()),
        usage: Arc::new(NullUsageAccounting),
    }
}

struct SimVideoSource {
    format: VideoFormat,
    metadata_in_buffers: bool,
}

impl VideoCapture for SimVideoSource {
    fn init_check(&self) -> ArgonResult<()> {
        Ok(())
    }

    fn video_format(&self) -> VideoFormat {
        self.format
    }

    fn metadata_in_buffers(&self) -> bool {
        self.metadata_in_buffers
    }

    fn stop(&self) -> ArgonResult<()> {
        debug!("Simulated video source stopped");
        Ok(())
    }

    fn unblock_read(&self) {
        debug!("Simulated video source unblocked");
    }
}

struct SimAudioSource {
    format: AudioFormat,
    packets: broadcast::Sender<Arc<EncodedPacket>>,
}

impl AudioCapture for SimAudioSource {
    fn init_check(&self) -> ArgonResult<()> {
        Ok(())
    }

    fn audio_format(&self) -> AudioFormat {
        self.format
    }

    fn max_amplitude(&self) -> i32 {
        0
    }

    fn stop(&self) -> ArgonResult<()> {
        debug!("Simulated audio source stopped");
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<Arc<EncodedPacket>> {
        self.packets.subscribe()
    }
}

struct SimCameraHub;

#[async_trait]
impl CameraHub for SimCameraHub {
    async fn open_camera(&self, request: CameraRequest) -> ArgonResult<Arc<dyn VideoCapture>> {
        info!(
            "Simulated camera {} opened at {}x{}",
            request.camera_id, request.width, request.height
        );
        Ok(Arc::new(SimVideoSource {
            format: VideoFormat {
                width: request.width,
                height: request.height,
                stride: request.width,
                slice_height: request.height,
                color_format: 21,
                frame_rate: request.frame_rate.unwrap_or(30),
            },
            metadata_in_buffers: false,
        }))
    }
}

struct SimSurfaceHub;

#[async_trait]
impl SurfaceHub for SimSurfaceHub {
    async fn open_surface(&self, width: u32, height: u32) -> ArgonResult<Arc<dyn VideoCapture>> {
        info!("Simulated surface opened at {}x{}", width, height);
        Ok(Arc::new(SimVideoSource {
            format: VideoFormat {
                width,
                height,
                stride: width,
                slice_height: height,
                color_format: 21,
                frame_rate: 30,
            },
            metadata_in_buffers: true,
        }))
    }
}

struct SimMicrophoneHub;

#[async_trait]
impl MicrophoneHub for SimMicrophoneHub {
    async fn open_microphone(
        &self,
        kind: AudioSourceKind,
        sample_rate: u32,
        channels: u32,
    ) -> ArgonResult<Arc<dyn AudioCapture>> {
        info!(
            "Simulated microphone opened: {:?} at {} Hz, {} channels",
            kind, sample_rate, channels
        );
        let (packets, _) = broadcast::channel(16);
        Ok(Arc::new(SimAudioSource {
            format: AudioFormat {
                sample_rate,
                channels,
                max_input_size: 4096,
            },
            packets,
        }))
    }
}

struct SimCodecService;

#[async_trait]
impl CodecService for SimCodecService {
    async fn create_audio_encoder(
        &self,
        settings: AudioEncoderSettings,
        _source: Arc<dyn AudioCapture>,
    ) -> ArgonResult<EncodedTrack> {
        info!("Simulated audio encoder created for {}", settings.mime);
        let (_tx, rx) = broadcast::channel(16);
        Ok(EncodedTrack::new(TrackKind::Audio, settings.mime, rx))
    }

    async fn create_video_encoder(
        &self,
        settings: VideoEncoderSettings,
        _source: Arc<dyn VideoCapture>,
        flags: EncoderFlags,
    ) -> ArgonResult<EncodedTrack> {
        info!(
            "Simulated video encoder created for {} ({}x{} @ {} fps, flags {:?})",
            settings.mime, settings.width, settings.height, settings.frame_rate, flags
        );
        let (_tx, rx) = broadcast::channel(16);
        Ok(EncodedTrack::new(TrackKind::Video, settings.mime, rx))
    }
}

struct SimWriter {
    kind: ContainerKind,
    tracks: Vec<EncodedTrack>,
    // Held so the duplicated descriptor stays open for the writer's lifetime
    _fd: OwnedFd,
}

#[async_trait]
impl Writer for SimWriter {
    fn add_track(&mut self, track: EncodedTrack) -> ArgonResult<()> {
        info!("Simulated writer received {} track", track.kind());
        self.tracks.push(track);
        Ok(())
    }

    fn set_max_duration_us(&mut self, duration_us: u64) {
        debug!("Simulated writer max duration: {} us", duration_us);
    }

    fn set_max_size_bytes(&mut self, bytes: u64) {
        debug!("Simulated writer max size: {} bytes", bytes);
    }

    fn set_listener(&mut self, _listener: Arc<dyn ProgressListener>) {}

    async fn start(&mut self, meta: Option<&SessionMeta>) -> ArgonResult<()> {
        match meta {
            Some(meta) => info!(
                "Simulated {:?} writer started ({} tracks, {} bps total)",
                self.kind,
                self.tracks.len(),
                meta.total_bit_rate
            ),
            None => info!("Simulated {:?} writer resumed", self.kind),
        }
        Ok(())
    }

    fn pause(&mut self) -> ArgonResult<()> {
        info!("Simulated {:?} writer paused", self.kind);
        Ok(())
    }

    async fn stop(&mut self) -> ArgonResult<()> {
        info!("Simulated {:?} writer stopped", self.kind);
        Ok(())
    }

    fn dump(&self, out: &mut dyn std::io::Write) -> std::io::Result<()> {
        writeln!(out, "   Simulated {:?} writer: {} tracks", self.kind, self.tracks.len())
    }
}

struct SimWriterFactory;

impl WriterFactory for SimWriterFactory {
    fn create(&self, kind: ContainerKind, fd: OwnedFd) -> ArgonResult<Box<dyn Writer>> {
        Ok(Box::new(SimWriter {
            kind,
            tracks: Vec::new(),
            _fd: fd,
        }))
    }
}
