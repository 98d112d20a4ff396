//! Check command - validate a configuration and preview negotiation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use argon_core::caps::{negotiate_audio, negotiate_video, StaticProfiles};
use argon_core::config::{
    apply_parameters, AudioEncoderKind, ConfigFile, RecordingConfig, VideoSourceKind,
};
use argon_core::output::OutputStrategy;

use crate::sim;

/// Arguments for the check command
#[derive(Args)]
pub struct CheckArgs {
    /// Configuration file to check (default: ~/.config/argon/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Extra parameters as "key1=value1;key2=value2"
    #[arg(short, long)]
    pub params: Option<String>,

    /// Print the negotiated configuration as JSON
    #[arg(long)]
    pub json: bool,

    /// Drive the full session lifecycle against simulated devices
    #[arg(long)]
    pub dry_run: bool,
}

/// Validate the configuration and preview what negotiation would change
pub async fn check(args: CheckArgs) -> Result<()> {
    let file = match args.config {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    let mut config = file
        .to_recording_config()
        .context("Configuration file rejected")?;

    if let Some(params) = &args.params {
        apply_parameters(&mut config, params).context("Parameter string rejected")?;
    }

    let strategy = OutputStrategy::select(config.output_format)?;
    strategy.check(&config)?;

    let requested = config.clone();
    let profiles = StaticProfiles::default();
    if config.video_source.map(VideoSourceKind::resolve) == Some(VideoSourceKind::Camera) {
        negotiate_video(&mut config, &profiles);
    }
    if config.has_audio() && config.audio_encoder.resolve() != AudioEncoderKind::Pcm {
        negotiate_audio(&mut config, &profiles);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        println!("Configuration OK");
        println!("  Strategy:    {:?} (writer: {:?})", strategy, strategy.container_kind());
        println!(
            "  Tracks:      audio={} video={}",
            config.has_audio(),
            config.has_video()
        );
        print_negotiation(&requested, &config);
    }

    if args.dry_run {
        sim::dry_run(config).await?;
        println!("Dry run OK: session started, paused, resumed and stopped cleanly");
    }

    Ok(())
}

fn print_negotiation(requested: &RecordingConfig, negotiated: &RecordingConfig) {
    let mut changes = Vec::new();
    if requested.video_bit_rate != negotiated.video_bit_rate {
        changes.push(format!(
            "video bit rate {} -> {}",
            requested.video_bit_rate, negotiated.video_bit_rate
        ));
    }
    if requested.frame_rate != negotiated.frame_rate {
        changes.push(format!(
            "frame rate {:?} -> {:?}",
            requested.frame_rate, negotiated.frame_rate
        ));
    }
    if (requested.video_width, requested.video_height)
        != (negotiated.video_width, negotiated.video_height)
    {
        changes.push(format!(
            "frame size {}x{} -> {}x{}",
            requested.video_width,
            requested.video_height,
            negotiated.video_width,
            negotiated.video_height
        ));
    }
    if requested.audio_bit_rate != negotiated.audio_bit_rate {
        changes.push(format!(
            "audio bit rate {} -> {}",
            requested.audio_bit_rate, negotiated.audio_bit_rate
        ));
    }
    if requested.sample_rate != negotiated.sample_rate {
        changes.push(format!(
            "sample rate {} -> {}",
            requested.sample_rate, negotiated.sample_rate
        ));
    }
    if requested.audio_channels != negotiated.audio_channels {
        changes.push(format!(
            "channels {} -> {}",
            requested.audio_channels, negotiated.audio_channels
        ));
    }

    if changes.is_empty() {
        println!("  Negotiation: all requested parameters are within device limits");
    } else {
        println!("  Negotiation would clamp:");
        for change in changes {
            println!("    - {}", change);
        }
    }
}
