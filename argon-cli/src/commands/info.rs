//! Info command - show supported formats, encoders and constraints

use anyhow::Result;

use argon_core::caps::{CapabilityProfiles, StaticProfiles};
use argon_core::config::{AudioEncoderKind, OutputFormat, VideoEncoderKind};
use argon_core::output::{OutputStrategy, Requirement};

/// Show supported output formats, encoders and their constraints
pub async fn info() -> Result<()> {
    println!("Argon - Recording Capabilities\n");

    println!("Output formats:");
    let formats = [
        OutputFormat::ThreeGpp,
        OutputFormat::Mpeg4,
        OutputFormat::AmrNb,
        OutputFormat::AmrWb,
        OutputFormat::AacAdts,
        OutputFormat::Rtp,
        OutputFormat::MpegTs,
    ];
    for format in formats {
        let strategy = match OutputStrategy::select(format) {
            Ok(strategy) => strategy,
            Err(e) => {
                println!("  {:<10} unavailable: {}", format.to_string(), e);
                continue;
            }
        };
        let shape = strategy.track_shape();
        let tracks = if shape.exactly_one {
            "exactly one of audio/video".to_string()
        } else {
            format!(
                "audio: {}, video: {}",
                requirement_name(shape.audio),
                requirement_name(shape.video)
            )
        };
        println!("  {:<10} {:?} writer; {}", format.to_string(), strategy.container_kind(), tracks);
    }

    println!();
    let profiles = StaticProfiles::default();

    println!("Video encoders:");
    for encoder in [
        VideoEncoderKind::H263,
        VideoEncoderKind::Mpeg4Sp,
        VideoEncoderKind::Avc,
    ] {
        let caps = profiles.video_caps(encoder);
        println!(
            "  {:<10} {}x{} to {}x{}, {}-{} fps, {}-{} bps",
            format!("{:?}", encoder),
            caps.width.min,
            caps.height.min,
            caps.width.max,
            caps.height.max,
            caps.frame_rate.min,
            caps.frame_rate.max,
            caps.bit_rate.min,
            caps.bit_rate.max,
        );
    }

    println!();
    println!("Audio encoders:");
    for encoder in [
        AudioEncoderKind::AmrNb,
        AudioEncoderKind::AmrWb,
        AudioEncoderKind::Aac,
    ] {
        let caps = profiles.audio_caps(encoder);
        println!(
            "  {:<10} {}-{} Hz, {}-{} channels, {}-{} bps",
            format!("{:?}", encoder),
            caps.sample_rate.min,
            caps.sample_rate.max,
            caps.channels.min,
            caps.channels.max,
            caps.bit_rate.min,
            caps.bit_rate.max,
        );
    }
    println!("  {:<10} raw passthrough, no negotiation", "Pcm");

    Ok(())
}

fn requirement_name(requirement: Requirement) -> &'static str {
    match requirement {
        Requirement::Forbidden => "no",
        Requirement::Optional => "optional",
        Requirement::Required => "required",
    }
}
