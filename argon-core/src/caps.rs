//! Encoder capability profiles and parameter negotiation
//!
//! Requested bitrates, frame geometry, frame rates and audio parameters are
//! clamped (never rejected) against the device's capability profile at the
//! moment recording starts. Clamping is skipped for time-lapse capture: the
//! slow capture cadence leaves the encoder enough headroom regardless of
//! the nominal parameters.

use tracing::{debug, info, warn};

use crate::config::{
    AudioEncoderKind, OutputFormat, RecordingConfig, VideoEncoderKind, video_profiles,
};

/// Closed legal range for one negotiated parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamRange {
    pub min: u32,
    pub max: u32,
}

impl ParamRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Pull a value to the nearest bound if outside the range
    pub fn clamp(&self, value: u32) -> u32 {
        value.clamp(self.min, self.max)
    }
}

/// Capability limits for one video encoder
#[derive(Debug, Clone, Copy)]
pub struct VideoEncoderCaps {
    pub bit_rate: ParamRange,
    pub frame_rate: ParamRange,
    pub width: ParamRange,
    pub height: ParamRange,
}

/// Capability limits for one audio encoder
#[derive(Debug, Clone, Copy)]
pub struct AudioEncoderCaps {
    pub bit_rate: ParamRange,
    pub sample_rate: ParamRange,
    pub channels: ParamRange,
}

/// The full parameter tuple of a device camcorder quality tier
///
/// When a start request matches the camera's low tier exactly, the session
/// is assumed to target constrained consumers and the AVC encoder is forced
/// to the baseline profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityTier {
    pub duration_us: u64,
    pub output_format: OutputFormat,
    pub video_encoder: VideoEncoderKind,
    pub video_bit_rate: u32,
    pub frame_rate: u32,
    pub width: u32,
    pub height: u32,
    pub audio_encoder: AudioEncoderKind,
    pub audio_bit_rate: u32,
    pub sample_rate: u32,
    pub channels: u32,
}

/// Read-only source of device and encoder capability limits
pub trait CapabilityProfiles: Send + Sync {
    /// Limits for a video encoder kind
    fn video_caps(&self, encoder: VideoEncoderKind) -> VideoEncoderCaps;

    /// Limits for an audio encoder kind
    fn audio_caps(&self, encoder: AudioEncoderKind) -> AudioEncoderCaps;

    /// Recording start-time offset for a camera, in milliseconds
    fn start_time_offset_ms(&self, camera_id: u32) -> Option<u32>;

    /// The low camcorder quality tier for a camera, if the device defines one
    fn low_quality_tier(&self, camera_id: u32) -> Option<QualityTier>;
}

/// Table-backed capability profile set
///
/// Stands in for a per-device profile database; the defaults follow common
/// handset encoder limits.
#[derive(Debug, Clone)]
pub struct StaticProfiles {
    pub h263: VideoEncoderCaps,
    pub mpeg4: VideoEncoderCaps,
    pub avc: VideoEncoderCaps,
    pub amr_nb: AudioEncoderCaps,
    pub amr_wb: AudioEncoderCaps,
    pub aac: AudioEncoderCaps,
    pub start_time_offset_ms: Option<u32>,
    pub low_tier: Option<QualityTier>,
}

impl Default for StaticProfiles {
    fn default() -> Self {
        Self {
            h263: VideoEncoderCaps {
                bit_rate: ParamRange::new(64_000, 2_000_000),
                frame_rate: ParamRange::new(15, 30),
                width: ParamRange::new(176, 720),
                height: ParamRange::new(144, 480),
            },
            mpeg4: VideoEncoderCaps {
                bit_rate: ParamRange::new(64_000, 8_000_000),
                frame_rate: ParamRange::new(15, 30),
                width: ParamRange::new(176, 1280),
                height: ParamRange::new(144, 720),
            },
            avc: VideoEncoderCaps {
                bit_rate: ParamRange::new(64_000, 17_000_000),
                frame_rate: ParamRange::new(15, 30),
                width: ParamRange::new(176, 1920),
                height: ParamRange::new(144, 1080),
            },
            amr_nb: AudioEncoderCaps {
                bit_rate: ParamRange::new(4_750, 12_200),
                sample_rate: ParamRange::new(8_000, 8_000),
                channels: ParamRange::new(1, 1),
            },
            amr_wb: AudioEncoderCaps {
                bit_rate: ParamRange::new(6_600, 23_850),
                sample_rate: ParamRange::new(16_000, 16_000),
                channels: ParamRange::new(1, 1),
            },
            aac: AudioEncoderCaps {
                bit_rate: ParamRange::new(8_000, 96_000),
                sample_rate: ParamRange::new(8_000, 48_000),
                channels: ParamRange::new(1, 2),
            },
            start_time_offset_ms: None,
            low_tier: None,
        }
    }
}

impl CapabilityProfiles for StaticProfiles {
    fn video_caps(&self, encoder: VideoEncoderKind) -> VideoEncoderCaps {
        match encoder.resolve() {
            VideoEncoderKind::H263 => self.h263,
            VideoEncoderKind::Mpeg4Sp => self.mpeg4,
            VideoEncoderKind::Avc => self.avc,
            VideoEncoderKind::Default => unreachable!("resolved above"),
        }
    }

    fn audio_caps(&self, encoder: AudioEncoderKind) -> AudioEncoderCaps {
        match encoder.resolve() {
            AudioEncoderKind::AmrNb => self.amr_nb,
            AudioEncoderKind::AmrWb => self.amr_wb,
            // PCM passthrough is never negotiated; AAC limits are the widest.
            AudioEncoderKind::Aac | AudioEncoderKind::Pcm => self.aac,
            AudioEncoderKind::Default => unreachable!("resolved above"),
        }
    }

    fn start_time_offset_ms(&self, _camera_id: u32) -> Option<u32> {
        self.start_time_offset_ms
    }

    fn low_quality_tier(&self, _camera_id: u32) -> Option<QualityTier> {
        self.low_tier
    }
}

fn clamp_param(name: &str, value: u32, range: ParamRange) -> u32 {
    let clamped = range.clamp(value);
    if clamped != value {
        warn!(
            "Intended {} ({}) is out of range and will be set to ({})",
            name, value, clamped
        );
    }
    clamped
}

/// Clamp the video parameters against the encoder's capability profile
///
/// Never fails; out-of-range values are pulled to the nearest bound with a
/// warning. Skipped entirely while time-lapse capture is enabled.
pub fn negotiate_video(config: &mut RecordingConfig, profiles: &dyn CapabilityProfiles) {
    if config.time_lapse {
        debug!("Time-lapse capture enabled, skipping video capability clamping");
        return;
    }

    let caps = profiles.video_caps(config.video_encoder);
    config.video_bit_rate = clamp_param("video encoding bit rate", config.video_bit_rate, caps.bit_rate);
    if let Some(rate) = config.frame_rate {
        config.frame_rate = Some(clamp_param("video frame rate", rate, caps.frame_rate));
    }
    config.video_width = clamp_param("video frame width", config.video_width, caps.width);
    config.video_height = clamp_param("video frame height", config.video_height, caps.height);

    apply_default_profile_if_necessary(config, profiles);
}

/// Clamp the audio parameters against the encoder's capability profile
pub fn negotiate_audio(config: &mut RecordingConfig, profiles: &dyn CapabilityProfiles) {
    let caps = profiles.audio_caps(config.audio_encoder);
    config.audio_bit_rate = clamp_param("audio encoding bit rate", config.audio_bit_rate, caps.bit_rate);
    config.sample_rate = clamp_param("audio sample rate", config.sample_rate, caps.sample_rate);
    config.audio_channels = clamp_param("number of audio channels", config.audio_channels, caps.channels);
}

/// Force the AVC baseline profile when the request matches the camera's low
/// quality tier exactly
///
/// Interoperability rule for messaging-sized recordings, not a capability
/// constraint: constrained decoders on the receiving side only handle
/// baseline streams.
fn apply_default_profile_if_necessary(
    config: &mut RecordingConfig,
    profiles: &dyn CapabilityProfiles,
) {
    let Some(tier) = profiles.low_quality_tier(config.camera_id) else {
        return;
    };

    let matches_tier = tier.duration_us == config.max_file_duration_us
        && tier.output_format == config.output_format
        && tier.video_encoder == config.video_encoder
        && tier.video_bit_rate == config.video_bit_rate
        && Some(tier.frame_rate) == config.frame_rate
        && tier.width == config.video_width
        && tier.height == config.video_height
        && tier.audio_encoder == config.audio_encoder
        && tier.audio_bit_rate == config.audio_bit_rate
        && tier.sample_rate == config.sample_rate
        && tier.channels == config.audio_channels;

    if matches_tier && config.video_encoder == VideoEncoderKind::Avc {
        info!("Forcing AVC baseline profile for low quality tier recording");
        config.video_profile = Some(video_profiles::AVC_BASELINE);
    }
}
