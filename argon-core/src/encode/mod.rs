//! Encoder pipeline building
//!
//! Maps the recording configuration plus the capture source's reported
//! format into codec service requests, producing the encoded track handles
//! the output writers consume.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::warn;

use crate::caps::negotiate_audio;
use crate::capture::{AudioCapture, VideoCapture};
use crate::config::{AudioEncoderKind, RecordingConfig};
use crate::error::{ArgonError, Result, ResultExt};
use crate::session::MediaServices;
use crate::types::{EncodedPacket, TrackKind};

/// Codec service request for wrapping an audio capture source
#[derive(Debug, Clone)]
pub struct AudioEncoderSettings {
    pub mime: &'static str,
    pub max_input_size: u32,
    pub channels: u32,
    pub sample_rate: u32,
    pub bit_rate: u32,
    pub time_scale: Option<u32>,
}

/// Codec service request for wrapping a video capture source
#[derive(Debug, Clone)]
pub struct VideoEncoderSettings {
    pub mime: &'static str,
    pub bit_rate: u32,
    pub frame_rate: u32,
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub slice_height: u32,
    pub color_format: u32,
    pub i_frames_interval: i32,
    pub profile: Option<i32>,
    pub level: Option<i32>,
    pub time_scale: Option<u32>,
}

/// Encoder instantiation flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncoderFlags {
    /// Only hardware codecs may serve this request
    pub hardware_only: bool,
    /// Input buffers carry metadata references, not pixel data
    pub metadata_in_buffers: bool,
    /// Submit one input buffer at a time; trades throughput for faster
    /// turnaround on slow capture cadences
    pub single_buffer_in_flight: bool,
}

/// External codec service
///
/// Consumes a capture source and emits the compressed elementary stream.
/// Requests block on the service's IPC round-trip with no built-in timeout.
#[async_trait]
pub trait CodecService: Send + Sync {
    async fn create_audio_encoder(
        &self,
        settings: AudioEncoderSettings,
        source: Arc<dyn AudioCapture>,
    ) -> Result<EncodedTrack>;

    async fn create_video_encoder(
        &self,
        settings: VideoEncoderSettings,
        source: Arc<dyn VideoCapture>,
        flags: EncoderFlags,
    ) -> Result<EncodedTrack>;
}

/// One encoded elementary stream, ready to hand to a writer
pub struct EncodedTrack {
    kind: TrackKind,
    mime: &'static str,
    packets: broadcast::Receiver<Arc<EncodedPacket>>,
    /// Keeps a passthrough source alive for raw tracks
    _source: Option<Arc<dyn AudioCapture>>,
}

impl EncodedTrack {
    /// Wrap a packet subscription produced by the codec service
    pub fn new(
        kind: TrackKind,
        mime: &'static str,
        packets: broadcast::Receiver<Arc<EncodedPacket>>,
    ) -> Self {
        Self {
            kind,
            mime,
            packets,
            _source: None,
        }
    }

    /// Pass an uncompressed audio source straight through to the writer
    pub fn raw_audio(source: Arc<dyn AudioCapture>) -> Self {
        Self {
            kind: TrackKind::Audio,
            mime: crate::types::mime::AUDIO_RAW,
            packets: source.subscribe(),
            _source: Some(source),
        }
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn mime(&self) -> &'static str {
        self.mime
    }

    /// A fresh subscription starting at the current stream position
    pub fn resubscribe(&self) -> broadcast::Receiver<Arc<EncodedPacket>> {
        self.packets.resubscribe()
    }

    /// Consume the track, yielding its packet subscription
    pub fn into_packets(self) -> broadcast::Receiver<Arc<EncodedPacket>> {
        self.packets
    }
}

impl std::fmt::Debug for EncodedTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedTrack")
            .field("kind", &self.kind)
            .field("mime", &self.mime)
            .finish()
    }
}

/// An audio track plus the capture source behind it
///
/// The session keeps the source handle for amplitude queries after the
/// track itself has moved into the writer.
pub struct AudioTrack {
    pub track: EncodedTrack,
    pub source: Arc<dyn AudioCapture>,
}

/// Build the audio track: open the microphone, negotiate capabilities and
/// wrap the source with the configured audio codec
///
/// Raw PCM bypasses capability negotiation and the codec service entirely;
/// the capture source feeds the writer unmodified.
pub async fn build_audio_track(
    config: &mut RecordingConfig,
    services: &MediaServices,
) -> Result<AudioTrack> {
    let kind = config
        .audio_source
        .ok_or_else(|| ArgonError::invalid_operation("No audio source configured"))?
        .resolve();
    let encoder = config.audio_encoder.resolve();

    if encoder != AudioEncoderKind::Pcm {
        negotiate_audio(config, services.profiles.as_ref());
    }

    let source = services
        .microphone
        .open_microphone(kind, config.sample_rate, config.audio_channels)
        .await
        .context("Audio source acquisition failed")?;
    source
        .init_check()
        .map_err(|e| ArgonError::unknown(format!("Audio source is not initialized: {}", e)))?;

    if encoder == AudioEncoderKind::Pcm {
        return Ok(AudioTrack {
            track: EncodedTrack::raw_audio(source.clone()),
            source,
        });
    }

    let settings = AudioEncoderSettings {
        mime: encoder.mime(),
        max_input_size: source.audio_format().max_input_size,
        channels: config.audio_channels,
        sample_rate: config.sample_rate,
        bit_rate: config.audio_bit_rate,
        time_scale: config.audio_time_scale,
    };
    let track = services
        .codec
        .create_audio_encoder(settings, source.clone())
        .await
        .map_err(|e| ArgonError::unknown(format!("Failed to create the audio encoder: {}", e)))?;

    Ok(AudioTrack { track, source })
}

/// Build the video track: wrap an acquired capture source with the
/// configured video codec
///
/// The source's reported format overrides the requested geometry; the
/// encoder must consume buffers exactly as the driver lays them out. If the
/// codec service rejects the request, the capture source is stopped before
/// the error is returned so the camera lock is never held needlessly.
pub async fn build_video_track(
    config: &RecordingConfig,
    source: Arc<dyn VideoCapture>,
    services: &MediaServices,
) -> Result<EncodedTrack> {
    let encoder = config.video_encoder.resolve();
    let format = source.video_format();

    let settings = VideoEncoderSettings {
        mime: encoder.mime(),
        bit_rate: config.video_bit_rate,
        frame_rate: config
            .frame_rate
            .expect("frame rate resolved during source acquisition"),
        width: format.width,
        height: format.height,
        stride: format.stride,
        slice_height: format.slice_height,
        color_format: format.color_format,
        i_frames_interval: config.i_frames_interval,
        profile: config.video_profile,
        level: config.video_level,
        time_scale: config.video_time_scale,
    };

    let mut flags = EncoderFlags::default();
    if source.metadata_in_buffers() {
        warn!("Video source stores metadata in buffers, requesting a hardware codec");
        flags.hardware_only = true;
        flags.metadata_in_buffers = true;
    }
    if config.time_lapse {
        // Keeps encoder output responsive against the slow capture cadence.
        flags.single_buffer_in_flight = true;
    }

    match services
        .codec
        .create_video_encoder(settings, source.clone(), flags)
        .await
    {
        Ok(track) => Ok(track),
        Err(e) => {
            warn!("Failed to create the video encoder: {}", e);
            // Release the camera's lock before surfacing the failure.
            if let Err(stop_err) = source.stop() {
                warn!("Video source stop after encoder failure: {}", stop_err);
            }
            Err(ArgonError::unknown(format!(
                "Failed to create the video encoder: {}",
                e
            )))
        }
    }
}
