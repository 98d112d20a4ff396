//! Recording session orchestration
//!
//! Owns the configuration, selects the output strategy, wires capture
//! sources through the codec service into the chosen writer, and drives the
//! start/pause/stop/reset lifecycle with guaranteed teardown on failure.
//!
//! The session is single-threaded from the caller's perspective: every
//! public operation takes `&mut self`, runs to completion before returning,
//! and is never reentrant. Frame processing happens on workers owned by the
//! codec service and the writer; the session only starts and stops them.

use std::io;
use std::os::fd::{BorrowedFd, OwnedFd};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

use crate::caps::CapabilityProfiles;
use crate::capture::{
    acquire_video_source, AudioCapture, CameraHub, MicrophoneHub, SurfaceHub, VideoCapture,
};
use crate::config::{apply_parameters, RecordingConfig};
use crate::encode::{build_audio_track, build_video_track, CodecService};
use crate::error::{ArgonError, Result};
use crate::output::{
    ContainerKind, OutputStrategy, ProgressListener, SessionMeta, Writer, WriterFactory,
};
use crate::types::{Handle, SessionState};
use crate::usage::{UsageAccounting, UsageFlags};

/// The external collaborators a session drives
#[derive(Clone)]
pub struct MediaServices {
    pub codec: Arc<dyn CodecService>,
    pub writers: Arc<dyn WriterFactory>,
    pub camera: Arc<dyn CameraHub>,
    pub surface: Arc<dyn SurfaceHub>,
    pub microphone: Arc<dyn MicrophoneHub>,
    pub profiles: Arc<dyn CapabilityProfiles>,
    pub usage: Arc<dyn UsageAccounting>,
}

/// One recording session
///
/// Lifecycle: `Idle --configure--> Configured --start--> Recording
/// --pause--> Paused --start--> Recording`; `Recording|Paused --stop-->
/// Stopped --reset--> Idle`. A writer exists exactly while the state is
/// Recording or Paused.
pub struct RecorderSession {
    /// Session handle
    handle: Handle,
    /// The parameter store
    config: RecordingConfig,
    /// External collaborators
    services: MediaServices,
    /// Lifecycle state
    state: SessionState,
    /// The active writer, present only while recording or paused
    writer: Option<Box<dyn Writer>>,
    /// Duplicated output descriptor, owned until stop/reset
    output_fd: Option<OwnedFd>,
    /// Progress listener handed to writers
    listener: Option<Arc<dyn ProgressListener>>,
    /// Active audio capture source, kept for amplitude queries
    audio_source: Option<Arc<dyn AudioCapture>>,
    /// Active time-lapse source, kept for the pre-stop unblock signal
    time_lapse_source: Option<Arc<dyn VideoCapture>>,
    /// Whether a codec-started usage notification is outstanding
    started: bool,
}

impl RecorderSession {
    /// Create an idle session against the given collaborators
    pub fn new(services: MediaServices) -> Self {
        let handle = Handle::new();
        debug!("Creating recorder {}", handle);
        Self {
            handle,
            config: RecordingConfig::default(),
            services,
            state: SessionState::Idle,
            writer: None,
            output_fd: None,
            listener: None,
            audio_source: None,
            time_lapse_source: None,
            started: false,
        }
    }

    /// Get the session handle
    pub fn handle(&self) -> Handle {
        self.handle
    }

    /// Get the current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Read the current configuration
    pub fn config(&self) -> &RecordingConfig {
        &self.config
    }

    /// Mutate the configuration through its validated setters
    ///
    /// Rejected with `InvalidOperation` while a writer is active; the
    /// parameter set must not change under a running pipeline.
    pub fn configure(&mut self) -> Result<&mut RecordingConfig> {
        if self.writer.is_some() {
            return Err(ArgonError::invalid_operation(
                "Cannot change parameters while recording is active",
            ));
        }
        if self.state == SessionState::Idle {
            self.state = SessionState::Configured;
        }
        Ok(&mut self.config)
    }

    /// Apply a semicolon-separated `key=value` parameter list
    ///
    /// The batch is not transactional; see
    /// [`apply_parameters`](crate::config::apply_parameters).
    pub fn set_parameters(&mut self, params: &str) -> Result<()> {
        let config = self.configure()?;
        apply_parameters(config, params)
    }

    /// Duplicate and take ownership of the output descriptor
    ///
    /// The duplicate is closed exactly once, on stop, reset or drop. A
    /// previously set descriptor is closed on replacement.
    pub fn set_output_fd(&mut self, fd: BorrowedFd<'_>) -> Result<()> {
        if self.writer.is_some() {
            return Err(ArgonError::invalid_operation(
                "Cannot change the output descriptor while recording is active",
            ));
        }
        let owned = fd.try_clone_to_owned()?;
        if self.output_fd.replace(owned).is_some() {
            debug!("Replacing previously set output descriptor");
        }
        Ok(())
    }

    /// Register the progress listener passed on to writers
    pub fn set_listener(&mut self, listener: Arc<dyn ProgressListener>) {
        self.listener = Some(listener);
    }

    /// Finish configuration; kept for API symmetry, always succeeds
    pub fn prepare(&mut self) -> Result<()> {
        Ok(())
    }

    /// Peak amplitude of the active audio source since the last call
    pub fn max_amplitude(&self) -> i32 {
        self.audio_source
            .as_ref()
            .map(|source| source.max_amplitude())
            .unwrap_or(0)
    }

    /// Start recording, or resume a paused session
    ///
    /// Blocks on codec service and writer initialization; these are IPC
    /// round-trips with no built-in timeout. On failure no partial writer
    /// stays referenced and every source acquired during the attempt has
    /// been released.
    pub async fn start(&mut self) -> Result<()> {
        if self.state == SessionState::Paused {
            return self.resume().await;
        }
        if self.output_fd.is_none() {
            return Err(ArgonError::invalid_operation("Output descriptor not set"));
        }
        if self.writer.is_some() {
            return Err(ArgonError::unknown("Recording already started"));
        }

        let strategy = OutputStrategy::select(self.config.output_format)?;
        // Track shape and encoder constraints are checked before any
        // capture source is acquired.
        strategy.check(&self.config)?;
        info!(
            "Starting {} as {:?}: {:?}",
            self.handle, strategy, self.config
        );

        match self.start_with_strategy(strategy).await {
            Ok(writer) => {
                self.writer = Some(writer);
                self.state = SessionState::Recording;
                if !self.started {
                    self.started = true;
                    self.services
                        .usage
                        .add_usage(UsageFlags::CODEC_STARTED | self.track_flags());
                }
                Ok(())
            }
            Err(e) => {
                warn!("Start failed for {}: {}", self.handle, e);
                self.audio_source = None;
                self.time_lapse_source = None;
                Err(e)
            }
        }
    }

    /// Pause the active writer
    pub fn pause(&mut self) -> Result<()> {
        debug!("pause");
        let Some(writer) = self.writer.as_mut() else {
            return Err(ArgonError::unknown("Pause called with no active writer"));
        };
        writer.pause()?;
        self.state = SessionState::Paused;
        if self.started {
            self.started = false;
            let flags = self.track_flags();
            self.services.usage.add_usage(flags);
        }
        Ok(())
    }

    /// Stop the session and release the output descriptor
    ///
    /// The descriptor is released and the writer reference cleared even
    /// when the writer's stop reports a failure; the failure is returned
    /// but never blocks resource release.
    pub async fn stop(&mut self) -> Result<()> {
        debug!("stop");
        let mut result = Ok(());

        // A throttled time-lapse read loop must be unblocked before the
        // writer flushes, or shutdown deadlocks on a pending frame read.
        if let Some(source) = self.time_lapse_source.take() {
            source.unblock_read();
        }

        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.stop().await {
                warn!("Writer stop failed: {}", e);
                result = Err(e);
            }
            self.state = SessionState::Stopped;
        }

        if self.output_fd.take().is_some() {
            debug!("Output descriptor released");
        }
        self.audio_source = None;

        if self.started {
            self.started = false;
            let flags = self.track_flags();
            self.services.usage.add_usage(flags);
        }

        result
    }

    /// Stop if needed and restore every parameter to its default
    ///
    /// Callable from any state; a writer-stop failure is logged but does
    /// not fail the reset.
    pub async fn reset(&mut self) -> Result<()> {
        debug!("reset");
        if let Err(e) = self.stop().await {
            warn!("Stop during reset reported: {}", e);
        }
        self.config.reset();
        self.listener = None;
        self.state = SessionState::Idle;
        Ok(())
    }

    /// Write a textual report of the configuration and writer diagnostics
    pub fn dump(&self, out: &mut dyn io::Write) -> io::Result<()> {
        match &self.writer {
            Some(writer) => writer.dump(out)?,
            None => writeln!(out, "   No file writer")?,
        }
        writeln!(out, "   Recorder: {}", self.handle)?;
        writeln!(out, "   Output descriptor set: {}", self.output_fd.is_some())?;
        writeln!(out, "     File format: {}", self.config.output_format)?;
        writeln!(out, "     Max file size (bytes): {}", self.config.max_file_size_bytes)?;
        writeln!(out, "     Max file duration (us): {}", self.config.max_file_duration_us)?;
        writeln!(
            out,
            "     File offset length (bits): {}",
            if self.config.use_64bit_offset { 64 } else { 32 }
        )?;
        writeln!(
            out,
            "     Interleave duration (us): {}",
            self.config.interleave_duration_us.unwrap_or(0)
        )?;
        writeln!(out, "   Audio")?;
        writeln!(out, "     Source: {:?}", self.config.audio_source)?;
        writeln!(out, "     Encoder: {:?}", self.config.audio_encoder)?;
        writeln!(out, "     Bit rate (bps): {}", self.config.audio_bit_rate)?;
        writeln!(out, "     Sampling rate (hz): {}", self.config.sample_rate)?;
        writeln!(out, "     Number of channels: {}", self.config.audio_channels)?;
        writeln!(out, "     Max amplitude: {}", self.max_amplitude())?;
        writeln!(out, "   Video")?;
        writeln!(out, "     Source: {:?}", self.config.video_source)?;
        writeln!(out, "     Camera Id: {}", self.config.camera_id)?;
        writeln!(out, "     Encoder: {:?}", self.config.video_encoder)?;
        writeln!(out, "     Encoder profile: {:?}", self.config.video_profile)?;
        writeln!(out, "     Encoder level: {:?}", self.config.video_level)?;
        writeln!(out, "     I frames interval (s): {}", self.config.i_frames_interval)?;
        writeln!(
            out,
            "     Frame size (pixels): {}x{}",
            self.config.video_width, self.config.video_height
        )?;
        writeln!(out, "     Frame rate (fps): {:?}", self.config.frame_rate)?;
        writeln!(out, "     Bit rate (bps): {}", self.config.video_bit_rate)?;
        Ok(())
    }

    async fn resume(&mut self) -> Result<()> {
        debug!("resume");
        let writer = self.writer.as_mut().expect("paused session has a writer");
        writer.start(None).await?;
        self.state = SessionState::Recording;
        if !self.started {
            self.started = true;
            self.services
                .usage
                .add_usage(UsageFlags::CODEC_STARTED | self.track_flags());
        }
        Ok(())
    }

    async fn start_with_strategy(&mut self, strategy: OutputStrategy) -> Result<Box<dyn Writer>> {
        match strategy {
            OutputStrategy::Container => self.start_container().await,
            OutputStrategy::AmrNb | OutputStrategy::AmrWb | OutputStrategy::AacAdts => {
                self.start_audio_stream(strategy).await
            }
            OutputStrategy::Rtp => self.start_rtp().await,
            OutputStrategy::MpegTs => self.start_mpeg_ts().await,
        }
    }

    async fn start_container(&mut self) -> Result<Box<dyn Writer>> {
        let mut writer = self
            .services
            .writers
            .create(ContainerKind::Mpeg4, self.writer_fd()?)?;
        let mut total_bit_rate = 0;

        if self.config.has_video() {
            let acquired = acquire_video_source(&mut self.config, &self.services).await?;
            if acquired.time_lapse {
                self.time_lapse_source = Some(acquired.source.clone());
            }
            let track = build_video_track(&self.config, acquired.source, &self.services).await?;
            writer.add_track(track)?;
            total_bit_rate += self.config.video_bit_rate;
        }

        // Audio goes in after video so camcorder files do not open on the
        // handling noise captured while the camera spins up. Time-lapse
        // recordings carry no audio track at all.
        if !self.config.time_lapse && self.config.has_audio() {
            let audio = build_audio_track(&mut self.config, &self.services).await?;
            self.audio_source = Some(audio.source.clone());
            writer.add_track(audio.track)?;
            total_bit_rate += self.config.audio_bit_rate;
        }

        self.apply_limits(&mut *writer);
        self.apply_listener(&mut *writer);
        let meta = self.container_meta(total_bit_rate);
        writer.start(Some(&meta)).await?;
        Ok(writer)
    }

    async fn start_audio_stream(&mut self, strategy: OutputStrategy) -> Result<Box<dyn Writer>> {
        let mut writer = self
            .services
            .writers
            .create(strategy.container_kind(), self.writer_fd()?)?;

        let audio = build_audio_track(&mut self.config, &self.services).await?;
        self.audio_source = Some(audio.source.clone());
        writer.add_track(audio.track)?;

        self.apply_limits(&mut *writer);
        self.apply_listener(&mut *writer);
        let meta = self.stream_meta(self.config.audio_bit_rate);
        writer.start(Some(&meta)).await?;
        Ok(writer)
    }

    async fn start_rtp(&mut self) -> Result<Box<dyn Writer>> {
        let mut writer = self
            .services
            .writers
            .create(ContainerKind::Rtp, self.writer_fd()?)?;

        let (track, bit_rate) = if self.config.has_audio() {
            let audio = build_audio_track(&mut self.config, &self.services).await?;
            self.audio_source = Some(audio.source.clone());
            (audio.track, self.config.audio_bit_rate)
        } else {
            let acquired = acquire_video_source(&mut self.config, &self.services).await?;
            if acquired.time_lapse {
                self.time_lapse_source = Some(acquired.source.clone());
            }
            let track = build_video_track(&self.config, acquired.source, &self.services).await?;
            (track, self.config.video_bit_rate)
        };
        writer.add_track(track)?;

        self.apply_listener(&mut *writer);
        let meta = self.stream_meta(bit_rate);
        writer.start(Some(&meta)).await?;
        Ok(writer)
    }

    async fn start_mpeg_ts(&mut self) -> Result<Box<dyn Writer>> {
        let mut writer = self
            .services
            .writers
            .create(ContainerKind::MpegTs, self.writer_fd()?)?;
        let mut total_bit_rate = 0;

        if self.config.has_audio() {
            let audio = build_audio_track(&mut self.config, &self.services).await?;
            self.audio_source = Some(audio.source.clone());
            writer.add_track(audio.track)?;
            total_bit_rate += self.config.audio_bit_rate;
        }

        if self.config.has_video() {
            let acquired = acquire_video_source(&mut self.config, &self.services).await?;
            if acquired.time_lapse {
                self.time_lapse_source = Some(acquired.source.clone());
            }
            let track = build_video_track(&self.config, acquired.source, &self.services).await?;
            writer.add_track(track)?;
            total_bit_rate += self.config.video_bit_rate;
        }

        self.apply_limits(&mut *writer);
        let meta = self.stream_meta(total_bit_rate);
        writer.start(Some(&meta)).await?;
        Ok(writer)
    }

    /// Duplicate the output descriptor for a writer
    fn writer_fd(&self) -> Result<OwnedFd> {
        let fd = self
            .output_fd
            .as_ref()
            .ok_or_else(|| ArgonError::invalid_operation("Output descriptor not set"))?;
        Ok(fd.try_clone()?)
    }

    fn apply_limits(&self, writer: &mut dyn Writer) {
        if self.config.max_file_duration_us != 0 {
            writer.set_max_duration_us(self.config.max_file_duration_us);
        }
        if self.config.max_file_size_bytes != 0 {
            writer.set_max_size_bytes(self.config.max_file_size_bytes);
        }
    }

    fn apply_listener(&self, writer: &mut dyn Writer) {
        if let Some(listener) = &self.listener {
            writer.set_listener(listener.clone());
        }
    }

    fn container_meta(&self, total_bit_rate: u32) -> SessionMeta {
        SessionMeta {
            start_time_us: now_us(),
            output_format: self.config.output_format,
            total_bit_rate,
            use_64bit_offset: self.config.use_64bit_offset,
            movie_time_scale: self.config.movie_time_scale,
            track_interval_us: self.config.track_interval_us,
            rotation_degrees: self.config.rotation_degrees,
            interleave_duration_us: self.config.interleave_duration_us,
            geo: self.config.geo_tag(),
            start_time_offset_ms: self
                .services
                .profiles
                .start_time_offset_ms(self.config.camera_id),
        }
    }

    fn stream_meta(&self, total_bit_rate: u32) -> SessionMeta {
        SessionMeta {
            start_time_us: now_us(),
            output_format: self.config.output_format,
            total_bit_rate,
            ..SessionMeta::default()
        }
    }

    fn track_flags(&self) -> UsageFlags {
        let mut flags = UsageFlags::NONE;
        if self.config.has_audio() {
            flags = flags | UsageFlags::AUDIO_TRACK;
        }
        if self.config.has_video() {
            flags = flags | UsageFlags::VIDEO_TRACK;
        }
        flags
    }
}

fn now_us() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_micros() as i64)
        .unwrap_or(0)
}
