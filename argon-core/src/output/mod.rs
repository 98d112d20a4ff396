//! Output writer interfaces and strategy selection
//!
//! One writer variant exists per output format: container file, raw voice
//! or AAC elementary stream, RTP packet stream, transport-stream mux. The
//! [`OutputStrategy`] union picks the variant once from the configured
//! format and declares, per variant, which track combination and encoder
//! kinds it accepts, so a start request can be rejected before any capture
//! source is acquired.

use async_trait::async_trait;
use std::os::fd::OwnedFd;
use std::sync::Arc;

use crate::config::{AudioEncoderKind, OutputFormat, RecordingConfig, VideoEncoderKind};
use crate::encode::EncodedTrack;
use crate::error::{ArgonError, Result};
use crate::types::GeoTag;

/// Writer progress notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// The configured maximum file duration was reached
    MaxDurationReached,
    /// The configured maximum file size was reached
    MaxFileSizeReached,
    /// Periodic track progress, position in microseconds
    TrackTime(i64),
}

/// Receives writer progress notifications
pub trait ProgressListener: Send + Sync {
    fn on_event(&self, event: ProgressEvent);
}

/// Session metadata handed to the writer at start
///
/// Container writers consume the full record; elementary stream and RTP
/// writers ignore the container-only fields.
#[derive(Debug, Clone, Default)]
pub struct SessionMeta {
    /// Recording start time in microseconds since the epoch
    pub start_time_us: i64,
    /// The configured output format
    pub output_format: OutputFormat,
    /// Sum of the bitrates of all added tracks
    pub total_bit_rate: u32,
    /// Use 64-bit offsets in the container file
    pub use_64bit_offset: bool,
    /// Movie time scale in ticks per second
    pub movie_time_scale: Option<u32>,
    /// Progress notification interval in microseconds
    pub track_interval_us: Option<u64>,
    /// Clockwise orientation hint in degrees
    pub rotation_degrees: u32,
    /// Audio/video interleave duration in microseconds
    pub interleave_duration_us: Option<u32>,
    /// Geo tag, present when both coordinates were configured
    pub geo: Option<GeoTag>,
    /// Device start-time offset for this camera, in milliseconds
    pub start_time_offset_ms: Option<u32>,
}

/// An active container or stream sink
///
/// Owns every track added to it. Lifecycle: constructed, tracks added,
/// started, (paused/resumed)*, stopped, dropped. Never reused across
/// sessions.
#[async_trait]
pub trait Writer: Send {
    /// Hand an encoded track to the writer
    fn add_track(&mut self, track: EncodedTrack) -> Result<()>;

    /// Limit the output duration; 0 disables the limit
    fn set_max_duration_us(&mut self, duration_us: u64);

    /// Limit the output size; 0 disables the limit
    fn set_max_size_bytes(&mut self, bytes: u64);

    /// Register the progress listener
    fn set_listener(&mut self, listener: Arc<dyn ProgressListener>);

    /// Start writing; `None` resumes after a pause
    async fn start(&mut self, meta: Option<&SessionMeta>) -> Result<()>;

    /// Pause writing without tearing the sink down
    fn pause(&mut self) -> Result<()>;

    /// Stop writing and finalize the output
    async fn stop(&mut self) -> Result<()>;

    /// Append writer-internal diagnostics to a textual report
    fn dump(&self, out: &mut dyn std::io::Write) -> std::io::Result<()>;
}

/// Concrete writer variant to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// MPEG-4 family container (3GPP and MP4)
    Mpeg4,
    /// Raw AMR narrowband stream with file header
    AmrNb,
    /// Raw AMR wideband stream with file header
    AmrWb,
    /// Raw AAC stream, ADTS framing
    AacAdts,
    /// RTP packetizer over a connected socket
    Rtp,
    /// MPEG-2 transport stream mux
    MpegTs,
}

/// Constructs writer implementations against an output descriptor
///
/// The factory receives its own duplicate of the session's descriptor and
/// the writer closes it when dropped.
pub trait WriterFactory: Send + Sync {
    fn create(&self, kind: ContainerKind, fd: OwnedFd) -> Result<Box<dyn Writer>>;
}

/// Whether a strategy accepts, requires or forbids a track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Forbidden,
    Optional,
    Required,
}

/// The track combination a strategy accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackShape {
    pub audio: Requirement,
    pub video: Requirement,
    /// Exactly one of audio/video must be present, never both or neither
    pub exactly_one: bool,
}

/// Output pipeline variant, selected once per start request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStrategy {
    /// MPEG-4 family container file
    Container,
    /// Raw narrowband voice stream
    AmrNb,
    /// Raw wideband voice stream
    AmrWb,
    /// Raw AAC elementary stream
    AacAdts,
    /// RTP packet stream
    Rtp,
    /// Transport-stream mux
    MpegTs,
}

impl OutputStrategy {
    /// Pick the strategy for an output format
    pub fn select(format: OutputFormat) -> Result<Self> {
        match format.resolve() {
            OutputFormat::ThreeGpp | OutputFormat::Mpeg4 => Ok(Self::Container),
            OutputFormat::AmrNb => Ok(Self::AmrNb),
            OutputFormat::AmrWb => Ok(Self::AmrWb),
            OutputFormat::AacAdts => Ok(Self::AacAdts),
            OutputFormat::AacAdif => Err(ArgonError::unsupported(
                "AAC ADIF framing is not supported, use ADTS",
            )),
            OutputFormat::Rtp => Ok(Self::Rtp),
            OutputFormat::MpegTs => Ok(Self::MpegTs),
            OutputFormat::Default => unreachable!("resolved above"),
        }
    }

    /// The writer variant this strategy drives
    pub fn container_kind(&self) -> ContainerKind {
        match self {
            Self::Container => ContainerKind::Mpeg4,
            Self::AmrNb => ContainerKind::AmrNb,
            Self::AmrWb => ContainerKind::AmrWb,
            Self::AacAdts => ContainerKind::AacAdts,
            Self::Rtp => ContainerKind::Rtp,
            Self::MpegTs => ContainerKind::MpegTs,
        }
    }

    /// The track combination this strategy accepts
    pub fn track_shape(&self) -> TrackShape {
        match self {
            Self::Container | Self::MpegTs => TrackShape {
                audio: Requirement::Optional,
                video: Requirement::Optional,
                exactly_one: false,
            },
            Self::AmrNb | Self::AmrWb | Self::AacAdts => TrackShape {
                audio: Requirement::Required,
                video: Requirement::Forbidden,
                exactly_one: false,
            },
            Self::Rtp => TrackShape {
                audio: Requirement::Optional,
                video: Requirement::Optional,
                exactly_one: true,
            },
        }
    }

    /// Validate the configured tracks and encoders against this strategy
    ///
    /// Runs before any capture source is acquired. Shape violations fail
    /// with `InvalidArgument`; encoder kinds the variant cannot serialize
    /// fail with `Unsupported`.
    pub fn check(&self, config: &RecordingConfig) -> Result<()> {
        self.check_shape(config.has_audio(), config.has_video())?;

        match self {
            Self::Container | Self::Rtp => Ok(()),
            Self::AmrNb => check_amr(config, AudioEncoderKind::AmrNb),
            Self::AmrWb => check_amr(config, AudioEncoderKind::AmrWb),
            Self::AacAdts => {
                if config.audio_encoder.resolve() != AudioEncoderKind::Aac {
                    return Err(ArgonError::unsupported(format!(
                        "AAC output requires the AAC encoder, got {:?}",
                        config.audio_encoder
                    )));
                }
                Ok(())
            }
            Self::MpegTs => {
                if config.has_audio() && config.audio_encoder.resolve() != AudioEncoderKind::Aac {
                    return Err(ArgonError::unsupported(
                        "Transport stream output requires an AAC audio encoder",
                    ));
                }
                if config.has_video() && config.video_encoder.resolve() != VideoEncoderKind::Avc {
                    return Err(ArgonError::unsupported(
                        "Transport stream output requires an AVC video encoder",
                    ));
                }
                Ok(())
            }
        }
    }

    fn check_shape(&self, has_audio: bool, has_video: bool) -> Result<()> {
        let shape = self.track_shape();
        if shape.exactly_one && has_audio == has_video {
            return Err(ArgonError::invalid_argument(format!(
                "{:?} output must have exactly one source",
                self
            )));
        }
        check_track("audio", shape.audio, has_audio)?;
        check_track("video", shape.video, has_video)?;
        Ok(())
    }
}

fn check_track(name: &str, requirement: Requirement, present: bool) -> Result<()> {
    match requirement {
        Requirement::Required if !present => Err(ArgonError::invalid_argument(format!(
            "Output format requires an {} source",
            name
        ))),
        Requirement::Forbidden if present => Err(ArgonError::invalid_argument(format!(
            "Output format does not take a {} source",
            name
        ))),
        _ => Ok(()),
    }
}

fn check_amr(config: &RecordingConfig, expected: AudioEncoderKind) -> Result<()> {
    if config.audio_encoder.resolve() != expected {
        return Err(ArgonError::invalid_argument(format!(
            "Invalid encoder {:?} used for {:?} recording",
            config.audio_encoder, expected
        )));
    }
    if config.audio_channels != 1 {
        return Err(ArgonError::invalid_argument(format!(
            "Invalid number of audio channels {} used for voice recording",
            config.audio_channels
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AudioSourceKind;
    use crate::config::VideoSourceKind;

    fn config(audio: bool, video: bool) -> RecordingConfig {
        let mut config = RecordingConfig::default();
        if audio {
            config.set_audio_source(AudioSourceKind::Mic).unwrap();
        }
        if video {
            config.set_video_source(VideoSourceKind::Camera).unwrap();
        }
        config
    }

    #[test]
    fn test_select_maps_formats() {
        assert_eq!(
            OutputStrategy::select(OutputFormat::Default).unwrap(),
            OutputStrategy::Container
        );
        assert_eq!(
            OutputStrategy::select(OutputFormat::Mpeg4).unwrap(),
            OutputStrategy::Container
        );
        assert_eq!(
            OutputStrategy::select(OutputFormat::Rtp).unwrap(),
            OutputStrategy::Rtp
        );
        assert!(matches!(
            OutputStrategy::select(OutputFormat::AacAdif),
            Err(ArgonError::Unsupported(_))
        ));
    }

    #[test]
    fn test_track_shape_table() {
        // (strategy, audio, video, accepted)
        let table = [
            (OutputStrategy::Container, false, false, true),
            (OutputStrategy::Container, true, true, true),
            (OutputStrategy::AmrNb, true, false, true),
            (OutputStrategy::AmrNb, false, false, false),
            (OutputStrategy::AmrNb, true, true, false),
            (OutputStrategy::AacAdts, true, false, true),
            (OutputStrategy::AacAdts, false, true, false),
            (OutputStrategy::Rtp, true, false, true),
            (OutputStrategy::Rtp, false, true, true),
            (OutputStrategy::Rtp, true, true, false),
            (OutputStrategy::Rtp, false, false, false),
            (OutputStrategy::MpegTs, true, true, true),
            (OutputStrategy::MpegTs, false, false, true),
        ];
        for (strategy, audio, video, accepted) in table {
            assert_eq!(
                strategy.check_shape(audio, video).is_ok(),
                accepted,
                "{:?} audio={} video={}",
                strategy,
                audio,
                video
            );
        }
    }

    #[test]
    fn test_amr_requires_matching_encoder() {
        let mut cfg = config(true, false);
        cfg.set_audio_encoder(AudioEncoderKind::AmrWb).unwrap();
        assert!(OutputStrategy::AmrNb.check(&cfg).is_err());
        assert!(OutputStrategy::AmrWb.check(&cfg).is_ok());
    }

    #[test]
    fn test_amr_requires_mono() {
        let mut cfg = config(true, false);
        cfg.set_audio_channels(2).unwrap();
        assert!(matches!(
            OutputStrategy::AmrNb.check(&cfg),
            Err(ArgonError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_aac_requires_aac_encoder() {
        let cfg = config(true, false);
        assert!(matches!(
            OutputStrategy::AacAdts.check(&cfg),
            Err(ArgonError::Unsupported(_))
        ));
    }

    #[test]
    fn test_mpeg_ts_encoder_constraints() {
        let mut cfg = config(true, true);
        cfg.set_audio_encoder(AudioEncoderKind::Aac).unwrap();
        cfg.set_video_encoder(VideoEncoderKind::Avc).unwrap();
        assert!(OutputStrategy::MpegTs.check(&cfg).is_ok());

        cfg.set_video_encoder(VideoEncoderKind::H263).unwrap();
        assert!(matches!(
            OutputStrategy::MpegTs.check(&cfg),
            Err(ArgonError::Unsupported(_))
        ));
    }
}
