//! Configuration file loading and merging
//!
//! Loads user defaults from `~/.config/argon/config.toml` and applies them
//! to a [`RecordingConfig`] through the validated setters, so an on-disk
//! value outside its legal range fails the same way a bad API call does.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::config::{
    AudioEncoderKind, AudioSourceKind, OutputFormat, RecordingConfig, VideoEncoderKind,
    VideoSourceKind,
};
use crate::error::{ArgonError, Result};

/// Configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Output defaults
    #[serde(default)]
    pub output: OutputSettings,

    /// Audio track defaults
    #[serde(default)]
    pub audio: AudioSettings,

    /// Video track defaults
    #[serde(default)]
    pub video: VideoSettings,

    /// Recording limits
    #[serde(default)]
    pub limits: LimitSettings,
}

/// Output defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Output format (3gpp, mp4, amr-nb, amr-wb, aac-adts, rtp, mpeg2ts)
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: default_format(),
        }
    }
}

/// Audio track defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSettings {
    /// Record an audio track
    #[serde(default)]
    pub enabled: bool,

    /// Audio source (mic, camcorder, voice-recognition, voice-communication)
    #[serde(default = "default_audio_source")]
    pub source: String,

    /// Audio encoder (amr-nb, amr-wb, aac, pcm)
    #[serde(default = "default_audio_encoder")]
    pub encoder: String,

    /// Sample rate in Hz (0 = encoder default)
    #[serde(default)]
    pub sample_rate: u32,

    /// Channel count (0 = encoder default)
    #[serde(default)]
    pub channels: u32,

    /// Bitrate in bits per second (0 = encoder default)
    #[serde(default)]
    pub bit_rate: u32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            source: default_audio_source(),
            encoder: default_audio_encoder(),
            sample_rate: 0,
            channels: 0,
            bit_rate: 0,
        }
    }
}

/// Video track defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSettings {
    /// Record a video track
    #[serde(default)]
    pub enabled: bool,

    /// Video source (camera, surface)
    #[serde(default = "default_video_source")]
    pub source: String,

    /// Video encoder (h263, mpeg4-sp, avc)
    #[serde(default = "default_video_encoder")]
    pub encoder: String,

    /// Frame width in pixels (0 = recorder default)
    #[serde(default)]
    pub width: u32,

    /// Frame height in pixels (0 = recorder default)
    #[serde(default)]
    pub height: u32,

    /// Frame rate in fps (0 = adopt the source's rate)
    #[serde(default)]
    pub frame_rate: u32,

    /// Bitrate in bits per second (0 = recorder default)
    #[serde(default)]
    pub bit_rate: u32,

    /// Camera id for camera sources
    #[serde(default)]
    pub camera_id: u32,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            source: default_video_source(),
            encoder: default_video_encoder(),
            width: 0,
            height: 0,
            frame_rate: 0,
            bit_rate: 0,
            camera_id: 0,
        }
    }
}

/// Recording limits
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LimitSettings {
    /// Maximum duration in milliseconds (0 = unlimited)
    #[serde(default)]
    pub max_duration_ms: u64,

    /// Maximum file size in bytes (0 = unlimited)
    #[serde(default)]
    pub max_filesize_bytes: u64,
}

fn default_format() -> String {
    "3gpp".to_string()
}

fn default_audio_source() -> String {
    "mic".to_string()
}

fn default_audio_encoder() -> String {
    "amr-nb".to_string()
}

fn default_video_source() -> String {
    "camera".to_string()
}

fn default_video_encoder() -> String {
    "h263".to_string()
}

impl ConfigFile {
    /// Default configuration file path (`~/.config/argon/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("argon").join("config.toml"))
    }

    /// Load from the default path, falling back to defaults if absent
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(path),
            None => {
                warn!("Could not determine config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from a specific path, falling back to defaults if absent
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path)?;
        toml::from_str(&contents)
            .map_err(|e| ArgonError::invalid_argument(format!("Failed to parse {:?}: {}", path, e)))
    }

    /// Save to a specific path, creating parent directories
    pub fn save_to(&self, path: PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ArgonError::unknown(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(&path, contents)?;
        Ok(())
    }

    /// Build a [`RecordingConfig`] from the file's defaults
    ///
    /// Values of 0 keep the recorder's documented defaults; everything else
    /// goes through the validated setters.
    pub fn to_recording_config(&self) -> Result<RecordingConfig> {
        let mut config = RecordingConfig::default();

        config.set_output_format(parse_kind::<OutputFormat>("output.format", &self.output.format)?)?;

        if self.audio.enabled {
            config.set_audio_source(parse_kind::<AudioSourceKind>(
                "audio.source",
                &self.audio.source,
            )?)?;
            config.set_audio_encoder(parse_kind::<AudioEncoderKind>(
                "audio.encoder",
                &self.audio.encoder,
            )?)?;
            if self.audio.sample_rate != 0 {
                config.set_sample_rate(self.audio.sample_rate as i32)?;
            }
            if self.audio.channels != 0 {
                config.set_audio_channels(self.audio.channels as i32)?;
            }
            if self.audio.bit_rate != 0 {
                config.set_audio_bit_rate(self.audio.bit_rate as i32)?;
            }
        }

        if self.video.enabled {
            config.set_video_source(parse_kind::<VideoSourceKind>(
                "video.source",
                &self.video.source,
            )?)?;
            config.set_video_encoder(parse_kind::<VideoEncoderKind>(
                "video.encoder",
                &self.video.encoder,
            )?)?;
            if self.video.width != 0 || self.video.height != 0 {
                config.set_video_size(self.video.width as i32, self.video.height as i32)?;
            }
            if self.video.frame_rate != 0 {
                config.set_frame_rate(self.video.frame_rate as i32)?;
            }
            if self.video.bit_rate != 0 {
                config.set_video_bit_rate(self.video.bit_rate as i32)?;
            }
            config.set_camera_id(self.video.camera_id as i32)?;
        }

        if self.limits.max_duration_ms != 0 {
            config.set_max_file_duration_us((self.limits.max_duration_ms * 1000) as i64)?;
        }
        if self.limits.max_filesize_bytes != 0 {
            config.set_max_file_size_bytes(self.limits.max_filesize_bytes as i64)?;
        }

        Ok(config)
    }
}

fn parse_kind<T: std::str::FromStr<Err = String>>(field: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|e| ArgonError::invalid_argument(format!("{}: {}", field, e)))
}

/// Generate a commented sample configuration
pub fn sample_config() -> String {
    r#"# Argon recording configuration
# Location: ~/.config/argon/config.toml

[output]
# Output format: 3gpp, mp4, amr-nb, amr-wb, aac-adts, rtp, mpeg2ts
format = "3gpp"

[audio]
# Record an audio track
enabled = false
# Audio source: mic, camcorder, voice-recognition, voice-communication
source = "mic"
# Audio encoder: amr-nb, amr-wb, aac, pcm
encoder = "amr-nb"
# Sample rate in Hz (0 = encoder default)
sample_rate = 0
# Channels: 1 or 2 (0 = encoder default)
channels = 0
# Bitrate in bits per second (0 = encoder default)
bit_rate = 0

[video]
# Record a video track
enabled = false
# Video source: camera, surface
source = "camera"
# Video encoder: h263, mpeg4-sp, avc
encoder = "h263"
# Frame size in pixels (0 = recorder default, 176x144)
width = 0
height = 0
# Frame rate in fps (0 = adopt the camera's current rate)
frame_rate = 0
# Bitrate in bits per second (0 = recorder default)
bit_rate = 0
# Camera to record from
camera_id = 0

[limits]
# Maximum recording duration in milliseconds (0 = unlimited)
max_duration_ms = 0
# Maximum output size in bytes (0 = unlimited)
max_filesize_bytes = 0
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_config_parses() {
        let file: ConfigFile = toml::from_str(&sample_config()).expect("sample should parse");
        assert_eq!(file.output.format, "3gpp");
        assert!(!file.audio.enabled);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let file: ConfigFile = toml::from_str("").expect("empty config should parse");
        assert_eq!(file.output.format, "3gpp");
        assert_eq!(file.video.encoder, "h263");
    }

    #[test]
    fn test_to_recording_config() {
        let file: ConfigFile = toml::from_str(
            r#"
            [output]
            format = "mp4"

            [video]
            enabled = true
            encoder = "avc"
            width = 1280
            height = 720
            frame_rate = 30
            "#,
        )
        .unwrap();

        let config = file.to_recording_config().unwrap();
        assert_eq!(config.output_format, OutputFormat::Mpeg4);
        assert_eq!(config.video_encoder, VideoEncoderKind::Avc);
        assert_eq!((config.video_width, config.video_height), (1280, 720));
        assert_eq!(config.frame_rate, Some(30));
        assert!(!config.has_audio());
    }

    #[test]
    fn test_invalid_kind_fails() {
        let file: ConfigFile = toml::from_str(
            r#"
            [output]
            format = "wav"
            "#,
        )
        .unwrap();
        assert!(file.to_recording_config().is_err());
    }
}
