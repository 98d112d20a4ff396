//! Capture source interfaces and acquisition
//!
//! This module handles:
//! - The collaborator traits for audio and video capture sources
//! - Opening the right video source for the configured source kind
//! - Frame rate read-back when the client left the rate unspecified

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::caps::negotiate_video;
use crate::config::{RecordingConfig, VideoSourceKind};
use crate::error::{ArgonError, Result, ResultExt};
use crate::session::MediaServices;
use crate::types::{AudioFormat, EncodedPacket, VideoFormat};

/// A raw video frame producer
///
/// Sources are shared handles: the encoder pipeline keeps one reference for
/// the encode chain while the session keeps another for teardown signals.
pub trait VideoCapture: Send + Sync {
    /// Whether the source came up ready to produce frames
    fn init_check(&self) -> Result<()>;

    /// The format the source actually produces
    fn video_format(&self) -> VideoFormat;

    /// Whether buffers carry indirect metadata references instead of pixels
    fn metadata_in_buffers(&self) -> bool;

    /// Stop producing frames and release the underlying device
    fn stop(&self) -> Result<()>;

    /// Unblock a throttled read loop before writer shutdown
    ///
    /// Only meaningful for time-lapse sources; the default is a no-op.
    fn unblock_read(&self) {}
}

/// A raw audio frame producer
pub trait AudioCapture: Send + Sync {
    /// Whether the source came up ready to produce frames
    fn init_check(&self) -> Result<()>;

    /// The format the source actually produces
    fn audio_format(&self) -> AudioFormat;

    /// Peak amplitude seen since the last call
    fn max_amplitude(&self) -> i32;

    /// Stop producing frames and release the underlying device
    fn stop(&self) -> Result<()>;

    /// Subscribe to the source's raw sample buffers
    ///
    /// Only the raw PCM passthrough path consumes this directly; encoded
    /// tracks read from the codec service instead.
    fn subscribe(&self) -> broadcast::Receiver<Arc<EncodedPacket>>;
}

/// Camera open request
#[derive(Debug, Clone, Copy)]
pub struct CameraRequest {
    pub camera_id: u32,
    pub width: u32,
    pub height: u32,
    /// Requested rate; `None` leaves the camera at its current rate
    pub frame_rate: Option<u32>,
    /// `Some` opens the time-lapse variant throttled to this interval
    pub time_lapse_interval: Option<Duration>,
}

/// Opens camera-backed video sources
#[async_trait]
pub trait CameraHub: Send + Sync {
    async fn open_camera(&self, request: CameraRequest) -> Result<Arc<dyn VideoCapture>>;
}

/// Opens producer-buffer surface sources
#[async_trait]
pub trait SurfaceHub: Send + Sync {
    async fn open_surface(&self, width: u32, height: u32) -> Result<Arc<dyn VideoCapture>>;
}

/// Opens microphone-backed audio sources
#[async_trait]
pub trait MicrophoneHub: Send + Sync {
    async fn open_microphone(
        &self,
        kind: crate::config::AudioSourceKind,
        sample_rate: u32,
        channels: u32,
    ) -> Result<Arc<dyn AudioCapture>>;
}

/// A video source ready for the encoder pipeline
pub struct AcquiredVideo {
    pub source: Arc<dyn VideoCapture>,
    /// Set when the source is the throttled time-lapse variant
    pub time_lapse: bool,
}

/// Acquire and initialize the video source for the configured kind
///
/// Camera sources are capability-negotiated first; surface sources are not
/// (no camera profile applies to client-fed buffers). After acquisition an
/// unset frame rate is replaced with the rate the source reports.
pub async fn acquire_video_source(
    config: &mut RecordingConfig,
    services: &MediaServices,
) -> Result<AcquiredVideo> {
    let kind = config
        .video_source
        .ok_or_else(|| ArgonError::invalid_operation("No video source configured"))?
        .resolve();

    let acquired = match kind {
        VideoSourceKind::Camera => {
            negotiate_video(config, services.profiles.as_ref());

            let time_lapse_interval = if config.time_lapse {
                let interval_us = config.time_lapse_interval_us.ok_or_else(|| {
                    ArgonError::invalid_argument(
                        "Time-lapse capture enabled without a frame capture interval",
                    )
                })?;
                Some(Duration::from_micros(interval_us))
            } else {
                None
            };

            let request = CameraRequest {
                camera_id: config.camera_id,
                width: config.video_width,
                height: config.video_height,
                frame_rate: config.frame_rate,
                time_lapse_interval,
            };
            debug!("Opening camera source: {:?}", request);
            let source = services
                .camera
                .open_camera(request)
                .await
                .context("Camera source acquisition failed")?;
            source
                .init_check()
                .map_err(|e| ArgonError::no_init(format!("Camera source not initialized: {}", e)))?;

            AcquiredVideo {
                source,
                time_lapse: config.time_lapse,
            }
        }
        VideoSourceKind::Surface => {
            debug!(
                "Opening surface source: {}x{}",
                config.video_width, config.video_height
            );
            let source = services
                .surface
                .open_surface(config.video_width, config.video_height)
                .await
                .context("Surface source acquisition failed")?;
            source
                .init_check()
                .map_err(|e| ArgonError::no_init(format!("Surface source not initialized: {}", e)))?;

            AcquiredVideo {
                source,
                time_lapse: false,
            }
        }
        VideoSourceKind::Default => unreachable!("resolved above"),
    };

    if config.frame_rate.is_none() {
        let rate = acquired.source.video_format().frame_rate;
        info!(
            "Frame rate is not explicitly set, using the current frame rate ({} fps)",
            rate
        );
        config.frame_rate = Some(rate);
    }
    // A source that cannot report any frame rate violates the capture
    // contract; this is not a recoverable configuration error.
    assert!(
        config.frame_rate.is_some_and(|rate| rate > 0),
        "no frame rate could be determined for the video source"
    );

    Ok(acquired)
}
