//! Recording configuration for Argon
//!
//! Provides the source/encoder/format kind enums, the flat
//! [`RecordingConfig`] parameter store, and its validated setters.
//!
//! Every setter is atomic: it either stores the value and returns `Ok`, or
//! leaves the configuration unchanged and fails with
//! [`ArgonError::InvalidArgument`].

mod file;
mod params;

pub use file::{sample_config, ConfigFile};
pub use params::apply_parameters;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ArgonError, Result};
use crate::types::mime;

/// Audio capture source kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AudioSourceKind {
    /// Let the orchestrator pick (resolves to the microphone)
    #[default]
    Default,
    /// Device microphone
    Mic,
    /// Microphone tuned for camcorder use
    Camcorder,
    /// Microphone tuned for speech recognition
    VoiceRecognition,
    /// Microphone tuned for voice communication
    VoiceCommunication,
}

impl AudioSourceKind {
    /// Resolve the `Default` alias to its concrete kind
    pub fn resolve(self) -> Self {
        match self {
            Self::Default => Self::Mic,
            other => other,
        }
    }
}

impl std::str::FromStr for AudioSourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "mic" | "microphone" => Ok(Self::Mic),
            "camcorder" => Ok(Self::Camcorder),
            "voice-recognition" => Ok(Self::VoiceRecognition),
            "voice-communication" => Ok(Self::VoiceCommunication),
            _ => Err(format!("Unknown audio source: {}", s)),
        }
    }
}

/// Video capture source kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VideoSourceKind {
    /// Let the orchestrator pick (resolves to the camera)
    #[default]
    Default,
    /// Camera bound to the configured camera id
    Camera,
    /// Producer-buffer surface filled by the client
    Surface,
}

impl VideoSourceKind {
    /// Resolve the `Default` alias to its concrete kind
    pub fn resolve(self) -> Self {
        match self {
            Self::Default => Self::Camera,
            other => other,
        }
    }
}

impl std::str::FromStr for VideoSourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "camera" => Ok(Self::Camera),
            "surface" => Ok(Self::Surface),
            _ => Err(format!("Unknown video source: {}", s)),
        }
    }
}

/// Output container / stream format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Let the orchestrator pick (resolves to 3GPP)
    Default,
    /// 3GPP container file
    #[default]
    ThreeGpp,
    /// MPEG-4 container file
    Mpeg4,
    /// Raw AMR narrowband elementary stream
    AmrNb,
    /// Raw AMR wideband elementary stream
    AmrWb,
    /// Raw AAC elementary stream, ADIF framing (recognized but not implemented)
    AacAdif,
    /// Raw AAC elementary stream, ADTS framing
    AacAdts,
    /// RTP packet stream over a connected socket
    Rtp,
    /// MPEG-2 transport stream mux
    MpegTs,
}

impl OutputFormat {
    /// Resolve the `Default` alias to its concrete kind
    pub fn resolve(self) -> Self {
        match self {
            Self::Default => Self::ThreeGpp,
            other => other,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Default => "default",
            Self::ThreeGpp => "3gpp",
            Self::Mpeg4 => "mp4",
            Self::AmrNb => "amr-nb",
            Self::AmrWb => "amr-wb",
            Self::AacAdif => "aac-adif",
            Self::AacAdts => "aac-adts",
            Self::Rtp => "rtp",
            Self::MpegTs => "mpeg2ts",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "3gpp" | "3gp" => Ok(Self::ThreeGpp),
            "mp4" | "mpeg4" => Ok(Self::Mpeg4),
            "amr-nb" => Ok(Self::AmrNb),
            "amr-wb" => Ok(Self::AmrWb),
            "aac-adif" => Ok(Self::AacAdif),
            "aac-adts" => Ok(Self::AacAdts),
            "rtp" => Ok(Self::Rtp),
            "mpeg2ts" | "ts" => Ok(Self::MpegTs),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Audio encoder kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AudioEncoderKind {
    /// Let the orchestrator pick (resolves to AMR-NB)
    #[default]
    Default,
    /// AMR narrowband
    AmrNb,
    /// AMR wideband
    AmrWb,
    /// AAC low complexity
    Aac,
    /// Raw PCM passthrough, no codec involved
    Pcm,
}

impl AudioEncoderKind {
    /// Resolve the `Default` alias to its concrete kind
    pub fn resolve(self) -> Self {
        match self {
            Self::Default => Self::AmrNb,
            other => other,
        }
    }

    /// MIME identifier handed to the codec service
    pub fn mime(self) -> &'static str {
        match self.resolve() {
            Self::AmrNb => mime::AUDIO_AMR_NB,
            Self::AmrWb => mime::AUDIO_AMR_WB,
            Self::Aac => mime::AUDIO_AAC,
            Self::Pcm => mime::AUDIO_RAW,
            Self::Default => unreachable!("resolved above"),
        }
    }
}

impl std::str::FromStr for AudioEncoderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "amr-nb" => Ok(Self::AmrNb),
            "amr-wb" => Ok(Self::AmrWb),
            "aac" => Ok(Self::Aac),
            "pcm" | "raw" => Ok(Self::Pcm),
            _ => Err(format!("Unknown audio encoder: {}", s)),
        }
    }
}

/// Video encoder kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum VideoEncoderKind {
    /// Let the orchestrator pick (resolves to H.263)
    #[default]
    Default,
    /// H.263
    H263,
    /// MPEG-4 simple profile
    Mpeg4Sp,
    /// H.264 / AVC
    Avc,
}

impl VideoEncoderKind {
    /// Resolve the `Default` alias to its concrete kind
    pub fn resolve(self) -> Self {
        match self {
            Self::Default => Self::H263,
            other => other,
        }
    }

    /// MIME identifier handed to the codec service
    ///
    /// Total over the enum: an out-of-range encoder kind cannot be stored
    /// through the validated setters, so there is no recoverable error arm.
    pub fn mime(self) -> &'static str {
        match self.resolve() {
            Self::H263 => mime::VIDEO_H263,
            Self::Mpeg4Sp => mime::VIDEO_MPEG4,
            Self::Avc => mime::VIDEO_AVC,
            Self::Default => unreachable!("resolved above"),
        }
    }
}

impl std::str::FromStr for VideoEncoderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "h263" => Ok(Self::H263),
            "mpeg4-sp" | "mpeg4" => Ok(Self::Mpeg4Sp),
            "avc" | "h264" => Ok(Self::Avc),
            _ => Err(format!("Unknown video encoder: {}", s)),
        }
    }
}

/// Video encoder profile codes understood by the codec service
pub mod video_profiles {
    /// AVC baseline, forced for low-end interoperability recordings
    pub const AVC_BASELINE: i32 = 0x01;
}

/// Complete recording configuration
///
/// The flat parameter store for one recording session. All mutation goes
/// through the validated setters; `None` is the explicit "unset" sentinel
/// for every optional parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordingConfig {
    /// Audio source kind; `None` records no audio track
    pub audio_source: Option<AudioSourceKind>,
    /// Video source kind; `None` records no video track
    pub video_source: Option<VideoSourceKind>,
    /// Output container / stream format
    pub output_format: OutputFormat,
    /// Audio encoder kind
    pub audio_encoder: AudioEncoderKind,
    /// Video encoder kind
    pub video_encoder: VideoEncoderKind,
    /// Video frame width in pixels
    pub video_width: u32,
    /// Video frame height in pixels
    pub video_height: u32,
    /// Video frame rate in fps; `None` adopts the source's rate at start
    pub frame_rate: Option<u32>,
    /// Video bitrate in bits per second
    pub video_bit_rate: u32,
    /// Audio sample rate in Hz
    pub sample_rate: u32,
    /// Number of audio channels
    pub audio_channels: u32,
    /// Audio bitrate in bits per second
    pub audio_bit_rate: u32,
    /// Seconds between I-frames; 0 = all I-frames, negative = first only
    pub i_frames_interval: i32,
    /// Clockwise rotation hint in degrees, normalized to [0, 360)
    pub rotation_degrees: u32,
    /// Max file duration in microseconds; 0 disables the limit
    pub max_file_duration_us: u64,
    /// Max file size in bytes; 0 disables the limit
    pub max_file_size_bytes: u64,
    /// Audio/video interleave duration in microseconds (container output)
    pub interleave_duration_us: Option<u32>,
    /// Movie time scale in ticks per second
    pub movie_time_scale: Option<u32>,
    /// Audio track time scale in ticks per second
    pub audio_time_scale: Option<u32>,
    /// Video track time scale in ticks per second
    pub video_time_scale: Option<u32>,
    /// Longitude in degrees x10000
    pub longitude_x10000: Option<i64>,
    /// Latitude in degrees x10000
    pub latitude_x10000: Option<i64>,
    /// Camera id for camera video sources
    pub camera_id: u32,
    /// Whether time-lapse capture is enabled
    pub time_lapse: bool,
    /// Microseconds between time-lapse frame captures
    pub time_lapse_interval_us: Option<u64>,
    /// Video encoder profile code; `None` lets the codec pick
    pub video_profile: Option<i32>,
    /// Video encoder level code; `None` lets the codec pick
    pub video_level: Option<i32>,
    /// Use 64-bit offsets in the container file
    pub use_64bit_offset: bool,
    /// Progress notification interval in microseconds
    pub track_interval_us: Option<u64>,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            audio_source: None,
            video_source: None,
            output_format: OutputFormat::ThreeGpp,
            audio_encoder: AudioEncoderKind::AmrNb,
            video_encoder: VideoEncoderKind::H263,
            video_width: 176,
            video_height: 144,
            frame_rate: None,
            video_bit_rate: 192_000,
            sample_rate: 8_000,
            audio_channels: 1,
            audio_bit_rate: 12_200,
            i_frames_interval: 1,
            rotation_degrees: 0,
            max_file_duration_us: 0,
            max_file_size_bytes: 0,
            interleave_duration_us: None,
            movie_time_scale: None,
            audio_time_scale: None,
            video_time_scale: None,
            longitude_x10000: None,
            latitude_x10000: None,
            camera_id: 0,
            time_lapse: false,
            time_lapse_interval_us: None,
            video_profile: None,
            video_level: None,
            use_64bit_offset: false,
            track_interval_us: None,
        }
    }
}

impl RecordingConfig {
    /// Create a configuration with documented defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore every parameter to its documented default
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether an audio track is configured
    pub fn has_audio(&self) -> bool {
        self.audio_source.is_some()
    }

    /// Whether a video track is configured
    pub fn has_video(&self) -> bool {
        self.video_source.is_some()
    }

    /// Geo tag, present only when both coordinates were set
    pub fn geo_tag(&self) -> Option<crate::types::GeoTag> {
        match (self.latitude_x10000, self.longitude_x10000) {
            (Some(lat), Some(lon)) => Some(crate::types::GeoTag {
                latitude_x10000: lat,
                longitude_x10000: lon,
            }),
            _ => None,
        }
    }

    /// Set the audio source kind
    pub fn set_audio_source(&mut self, kind: AudioSourceKind) -> Result<()> {
        self.audio_source = Some(kind.resolve());
        Ok(())
    }

    /// Set the video source kind
    pub fn set_video_source(&mut self, kind: VideoSourceKind) -> Result<()> {
        self.video_source = Some(kind.resolve());
        Ok(())
    }

    /// Set the output format
    pub fn set_output_format(&mut self, format: OutputFormat) -> Result<()> {
        self.output_format = format.resolve();
        Ok(())
    }

    /// Set the audio encoder kind
    pub fn set_audio_encoder(&mut self, encoder: AudioEncoderKind) -> Result<()> {
        self.audio_encoder = encoder.resolve();
        Ok(())
    }

    /// Set the video encoder kind
    pub fn set_video_encoder(&mut self, encoder: VideoEncoderKind) -> Result<()> {
        self.video_encoder = encoder.resolve();
        Ok(())
    }

    /// Set the video frame size
    pub fn set_video_size(&mut self, width: i32, height: i32) -> Result<()> {
        if width <= 0 || height <= 0 {
            return Err(ArgonError::invalid_argument(format!(
                "Invalid video size: {}x{}",
                width, height
            )));
        }
        // The capability negotiator clamps against encoder limits at start.
        self.video_width = width as u32;
        self.video_height = height as u32;
        Ok(())
    }

    /// Set the video frame rate; -1 means "adopt the source's rate at start"
    pub fn set_frame_rate(&mut self, fps: i32) -> Result<()> {
        if fps == -1 {
            self.frame_rate = None;
            return Ok(());
        }
        if fps <= 0 || fps > 120 {
            return Err(ArgonError::invalid_argument(format!(
                "Invalid video frame rate: {}",
                fps
            )));
        }
        self.frame_rate = Some(fps as u32);
        Ok(())
    }

    /// Set the video bitrate in bits per second
    ///
    /// The effective bitrate may still differ after capability clamping.
    pub fn set_video_bit_rate(&mut self, bit_rate: i32) -> Result<()> {
        if bit_rate <= 0 {
            return Err(ArgonError::invalid_argument(format!(
                "Invalid video encoding bit rate: {}",
                bit_rate
            )));
        }
        self.video_bit_rate = bit_rate as u32;
        Ok(())
    }

    /// Set the audio sample rate in Hz
    pub fn set_sample_rate(&mut self, sample_rate: i32) -> Result<()> {
        if sample_rate <= 0 {
            return Err(ArgonError::invalid_argument(format!(
                "Invalid audio sampling rate: {}",
                sample_rate
            )));
        }
        self.sample_rate = sample_rate as u32;
        Ok(())
    }

    /// Set the number of audio channels
    pub fn set_audio_channels(&mut self, channels: i32) -> Result<()> {
        if !(1..=2).contains(&channels) {
            return Err(ArgonError::invalid_argument(format!(
                "Invalid number of audio channels: {}",
                channels
            )));
        }
        self.audio_channels = channels as u32;
        Ok(())
    }

    /// Set the audio bitrate in bits per second
    pub fn set_audio_bit_rate(&mut self, bit_rate: i32) -> Result<()> {
        if bit_rate <= 0 {
            return Err(ArgonError::invalid_argument(format!(
                "Invalid audio encoding bit rate: {}",
                bit_rate
            )));
        }
        self.audio_bit_rate = bit_rate as u32;
        Ok(())
    }

    /// Set the rotation hint; clockwise, multiples of 90 only
    pub fn set_rotation(&mut self, degrees: i32) -> Result<()> {
        if degrees < 0 || degrees % 90 != 0 {
            return Err(ArgonError::invalid_argument(format!(
                "Unsupported video rotation angle: {}",
                degrees
            )));
        }
        self.rotation_degrees = (degrees % 360) as u32;
        Ok(())
    }

    /// Set the maximum file duration in microseconds
    ///
    /// Zero or negative disables the limit; durations of 100 ms or less are
    /// rejected; durations up to 15 s are accepted but too short for the
    /// writer to respect reliably.
    pub fn set_max_file_duration_us(&mut self, duration_us: i64) -> Result<()> {
        if duration_us <= 0 {
            warn!(
                "Max file duration is not positive: {} us, disabling duration limit",
                duration_us
            );
            self.max_file_duration_us = 0;
            return Ok(());
        }
        if duration_us <= 100_000 {
            return Err(ArgonError::invalid_argument(format!(
                "Max file duration is too short: {} us",
                duration_us
            )));
        }
        if duration_us <= 15_000_000 {
            warn!("Target duration ({} us) too short to be respected", duration_us);
        }
        self.max_file_duration_us = duration_us as u64;
        Ok(())
    }

    /// Set the maximum file size in bytes
    ///
    /// Zero or negative disables the limit; sizes of 1 KiB or less are
    /// rejected; sizes up to 100 KiB are accepted but too small to respect.
    pub fn set_max_file_size_bytes(&mut self, bytes: i64) -> Result<()> {
        if bytes <= 0 {
            warn!(
                "Max file size is not positive: {} bytes, disabling file size limit",
                bytes
            );
            self.max_file_size_bytes = 0;
            return Ok(());
        }
        if bytes <= 1024 {
            return Err(ArgonError::invalid_argument(format!(
                "Max file size is too small: {} bytes",
                bytes
            )));
        }
        if bytes <= 100 * 1024 {
            warn!("Target file size ({} bytes) is too small to be respected", bytes);
        }
        self.max_file_size_bytes = bytes as u64;
        Ok(())
    }

    /// Set the audio/video interleave duration in microseconds
    ///
    /// Below 500 ms the metadata overhead dominates the saved content; above
    /// 10 s the writer has to buffer too much output before flushing.
    pub fn set_interleave_duration_us(&mut self, duration_us: i32) -> Result<()> {
        if duration_us <= 500_000 || duration_us >= 10_000_000 {
            return Err(ArgonError::invalid_argument(format!(
                "Audio/video interleave duration out of range: {} us",
                duration_us
            )));
        }
        self.interleave_duration_us = Some(duration_us as u32);
        Ok(())
    }

    /// Set the I-frame spacing in seconds
    ///
    /// Negative: only the first frame is an I-frame. Zero: all frames are
    /// I-frames. Positive: seconds between neighboring I-frames.
    pub fn set_i_frames_interval(&mut self, seconds: i32) -> Result<()> {
        self.i_frames_interval = seconds;
        Ok(())
    }

    /// Set the movie time scale in ticks per second
    pub fn set_movie_time_scale(&mut self, time_scale: i32) -> Result<()> {
        // Same range as the audio time scale, which is the wider of the two.
        if !(600..=96_000).contains(&time_scale) {
            return Err(ArgonError::invalid_argument(format!(
                "Time scale ({}) for movie is out of range [600, 96000]",
                time_scale
            )));
        }
        self.movie_time_scale = Some(time_scale as u32);
        Ok(())
    }

    /// Set the audio track time scale in ticks per second
    pub fn set_audio_time_scale(&mut self, time_scale: i32) -> Result<()> {
        // 96000 Hz is the highest sample rate AAC supports.
        if !(600..=96_000).contains(&time_scale) {
            return Err(ArgonError::invalid_argument(format!(
                "Time scale ({}) for audio is out of range [600, 96000]",
                time_scale
            )));
        }
        self.audio_time_scale = Some(time_scale as u32);
        Ok(())
    }

    /// Set the video track time scale in ticks per second
    pub fn set_video_time_scale(&mut self, time_scale: i32) -> Result<()> {
        // 60000 gives every frame of a 60 fps video 1000 ticks.
        if !(600..=60_000).contains(&time_scale) {
            return Err(ArgonError::invalid_argument(format!(
                "Time scale ({}) for video is out of range [600, 60000]",
                time_scale
            )));
        }
        self.video_time_scale = Some(time_scale as u32);
        Ok(())
    }

    /// Set the geo tag longitude in degrees x10000
    pub fn set_geo_longitude(&mut self, longitude_x10000: i64) -> Result<()> {
        if !(-1_800_000..=1_800_000).contains(&longitude_x10000) {
            return Err(ArgonError::invalid_argument(format!(
                "Longitude ({}) out of range",
                longitude_x10000
            )));
        }
        self.longitude_x10000 = Some(longitude_x10000);
        Ok(())
    }

    /// Set the geo tag latitude in degrees x10000
    pub fn set_geo_latitude(&mut self, latitude_x10000: i64) -> Result<()> {
        if !(-900_000..=900_000).contains(&latitude_x10000) {
            return Err(ArgonError::invalid_argument(format!(
                "Latitude ({}) out of range",
                latitude_x10000
            )));
        }
        self.latitude_x10000 = Some(latitude_x10000);
        Ok(())
    }

    /// Set the camera id used for camera video sources
    pub fn set_camera_id(&mut self, camera_id: i32) -> Result<()> {
        if camera_id < 0 {
            return Err(ArgonError::invalid_argument(format!(
                "Invalid camera id: {}",
                camera_id
            )));
        }
        self.camera_id = camera_id as u32;
        Ok(())
    }

    /// Enable or disable time-lapse capture
    pub fn set_time_lapse_enabled(&mut self, enabled: bool) -> Result<()> {
        self.time_lapse = enabled;
        Ok(())
    }

    /// Set the time between time-lapse frame captures in microseconds
    pub fn set_time_lapse_interval_us(&mut self, interval_us: i64) -> Result<()> {
        // Not allowing more than a day between frames.
        if interval_us <= 0 || interval_us > 86_400_000_000 {
            return Err(ArgonError::invalid_argument(format!(
                "Time between time-lapse frame captures ({}) is out of range (0, 1 day]",
                interval_us
            )));
        }
        self.time_lapse_interval_us = Some(interval_us as u64);
        Ok(())
    }

    /// Set the video encoder profile code; -1 clears it
    ///
    /// Accepted as-is; the codec service validates the code when the
    /// encoder is loaded.
    pub fn set_video_profile(&mut self, profile: i32) -> Result<()> {
        self.video_profile = (profile != -1).then_some(profile);
        Ok(())
    }

    /// Set the video encoder level code; -1 clears it
    pub fn set_video_level(&mut self, level: i32) -> Result<()> {
        self.video_level = (level != -1).then_some(level);
        Ok(())
    }

    /// Use 64-bit file offsets in container output
    pub fn set_use_64bit_offset(&mut self, use_64bit: bool) -> Result<()> {
        self.use_64bit_offset = use_64bit;
        Ok(())
    }

    /// Set the track progress notification interval in microseconds
    pub fn set_track_interval_us(&mut self, interval_us: i64) -> Result<()> {
        if interval_us < 20_000 {
            return Err(ArgonError::invalid_argument(format!(
                "Tracking time duration too short: {} us",
                interval_us
            )));
        }
        self.track_interval_us = Some(interval_us as u64);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RecordingConfig::default();
        assert_eq!(config.output_format, OutputFormat::ThreeGpp);
        assert_eq!(config.audio_encoder, AudioEncoderKind::AmrNb);
        assert_eq!(config.video_encoder, VideoEncoderKind::H263);
        assert_eq!((config.video_width, config.video_height), (176, 144));
        assert_eq!(config.frame_rate, None);
        assert_eq!(config.video_bit_rate, 192_000);
        assert_eq!(config.sample_rate, 8_000);
        assert_eq!(config.audio_channels, 1);
        assert_eq!(config.audio_bit_rate, 12_200);
        assert!(!config.has_audio());
        assert!(!config.has_video());
    }

    #[test]
    fn test_default_kinds_resolve() {
        let mut config = RecordingConfig::default();
        config.set_audio_source(AudioSourceKind::Default).unwrap();
        config.set_video_source(VideoSourceKind::Default).unwrap();
        config.set_output_format(OutputFormat::Default).unwrap();
        config.set_audio_encoder(AudioEncoderKind::Default).unwrap();
        config.set_video_encoder(VideoEncoderKind::Default).unwrap();

        assert_eq!(config.audio_source, Some(AudioSourceKind::Mic));
        assert_eq!(config.video_source, Some(VideoSourceKind::Camera));
        assert_eq!(config.output_format, OutputFormat::ThreeGpp);
        assert_eq!(config.audio_encoder, AudioEncoderKind::AmrNb);
        assert_eq!(config.video_encoder, VideoEncoderKind::H263);
    }

    #[test]
    fn test_rotation_validation() {
        let mut config = RecordingConfig::default();
        for degrees in [0, 90, 180, 270, 360, 450] {
            config.set_rotation(degrees).unwrap();
            assert_eq!(config.rotation_degrees, (degrees % 360) as u32);
        }
        assert!(config.set_rotation(-90).is_err());
        assert!(config.set_rotation(45).is_err());
        // Failed setter leaves the stored value untouched.
        assert_eq!(config.rotation_degrees, 90);
    }

    #[test]
    fn test_frame_rate_sentinel() {
        let mut config = RecordingConfig::default();
        config.set_frame_rate(30).unwrap();
        assert_eq!(config.frame_rate, Some(30));
        config.set_frame_rate(-1).unwrap();
        assert_eq!(config.frame_rate, None);
        assert!(config.set_frame_rate(0).is_err());
        assert!(config.set_frame_rate(121).is_err());
    }

    #[test]
    fn test_geo_validation() {
        let mut config = RecordingConfig::default();
        config.set_geo_longitude(1_800_000).unwrap();
        config.set_geo_latitude(-900_000).unwrap();
        assert!(config.geo_tag().is_some());
        assert!(config.set_geo_longitude(1_800_001).is_err());
        assert!(config.set_geo_latitude(900_001).is_err());
    }

    #[test]
    fn test_geo_tag_requires_both() {
        let mut config = RecordingConfig::default();
        config.set_geo_latitude(123).unwrap();
        assert!(config.geo_tag().is_none());
    }

    #[test]
    fn test_channel_count() {
        let mut config = RecordingConfig::default();
        config.set_audio_channels(2).unwrap();
        assert_eq!(config.audio_channels, 2);
        assert!(config.set_audio_channels(0).is_err());
        assert!(config.set_audio_channels(3).is_err());
    }

    #[test]
    fn test_profile_sentinel() {
        let mut config = RecordingConfig::default();
        config.set_video_profile(8).unwrap();
        assert_eq!(config.video_profile, Some(8));
        config.set_video_profile(-1).unwrap();
        assert_eq!(config.video_profile, None);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut config = RecordingConfig::default();
        config.set_video_size(1920, 1080).unwrap();
        config.set_audio_source(AudioSourceKind::Mic).unwrap();
        config.reset();
        assert_eq!(config, RecordingConfig::default());
    }
}
