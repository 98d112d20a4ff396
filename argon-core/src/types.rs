//! Core types for Argon
//!
//! These types represent the fundamental data structures shared between the
//! session orchestrator, the capture sources, the encoder pipeline and the
//! output writers.

use bytes::Bytes;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global handle counter for unique session IDs
static HANDLE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque handle for a recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(u64);

impl Handle {
    /// Create a new unique handle
    pub fn new() -> Self {
        Self(HANDLE_COUNTER.fetch_add(1, Ordering::SeqCst))
    }

    /// Get the raw handle value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Session({})", self.0)
    }
}

/// Recording session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Session created, all parameters at their defaults
    Idle,
    /// At least one parameter was set since the last reset
    Configured,
    /// Writer active and running
    Recording,
    /// Writer active but paused
    Paused,
    /// Writer torn down, output descriptor released
    Stopped,
}

/// Which elementary stream a track carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Audio,
    Video,
}

impl std::fmt::Display for TrackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackKind::Audio => write!(f, "audio"),
            TrackKind::Video => write!(f, "video"),
        }
    }
}

/// MIME identifiers used when talking to the codec service
pub mod mime {
    pub const AUDIO_AMR_NB: &str = "audio/3gpp";
    pub const AUDIO_AMR_WB: &str = "audio/amr-wb";
    pub const AUDIO_AAC: &str = "audio/mp4a-latm";
    pub const AUDIO_RAW: &str = "audio/raw";
    pub const VIDEO_H263: &str = "video/3gpp";
    pub const VIDEO_MPEG4: &str = "video/mp4v-es";
    pub const VIDEO_AVC: &str = "video/avc";
}

/// Video format reported back by a capture source
///
/// Width/height may differ from the requested size after the driver rounds
/// to its supported geometry; stride and slice height describe the actual
/// buffer layout the encoder must consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoFormat {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Row stride in pixels
    pub stride: u32,
    /// Slice height in pixels
    pub slice_height: u32,
    /// Driver color format code
    pub color_format: u32,
    /// Frames per second currently produced by the source
    pub frame_rate: u32,
}

/// Audio format reported back by a capture source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels (1=mono, 2=stereo)
    pub channels: u32,
    /// Largest buffer the source will hand out, in bytes
    pub max_input_size: u32,
}

/// One buffer of an elementary stream
///
/// Raw PCM passthrough tracks carry uncompressed sample data in the same
/// envelope; writers only see bytes and timestamps.
#[derive(Debug, Clone)]
pub struct EncodedPacket {
    /// Payload bytes
    pub data: Bytes,
    /// Presentation timestamp in microseconds
    pub pts_us: i64,
    /// Whether this packet starts a sync point
    pub keyframe: bool,
}

/// Geo tag attached to container output, fixed point degrees x10000
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoTag {
    pub latitude_x10000: i64,
    pub longitude_x10000: i64,
}
