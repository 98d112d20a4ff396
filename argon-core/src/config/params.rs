//! Generic textual parameter surface
//!
//! Parses `key1=value1;key2=value2;...` strings and routes each key to the
//! corresponding typed setter on [`RecordingConfig`].
//!
//! The batch is not transactional: parsing stops at the first invalid entry
//! and the whole call fails, but entries applied before the failure stay
//! applied. This matches the long-documented behavior of the textual
//! surface; callers needing all-or-nothing semantics must validate first.

use tracing::{debug, error};

use crate::config::RecordingConfig;
use crate::error::{ArgonError, Result};

/// Apply a semicolon-separated `key=value` parameter list
pub fn apply_parameters(config: &mut RecordingConfig, params: &str) -> Result<()> {
    debug!("apply_parameters: {}", params);
    for entry in params.split(';') {
        let Some((key, value)) = entry.split_once('=') else {
            error!("Parameters \"{}\" miss a value", params);
            return Err(ArgonError::invalid_argument(format!(
                "Parameter entry \"{}\" has no value",
                entry
            )));
        };
        let key = key.trim();
        if key.is_empty() {
            error!("Parameters \"{}\" contain an empty key", params);
            return Err(ArgonError::invalid_argument(
                "Parameter list contains an empty key",
            ));
        }
        apply_parameter(config, key, value)?;
    }
    Ok(())
}

/// Apply a single `key=value` parameter
pub fn apply_parameter(config: &mut RecordingConfig, key: &str, value: &str) -> Result<()> {
    debug!("apply_parameter: key ({}) => value ({})", key, value);
    match key {
        "max-duration" => {
            let ms = parse_i64(key, value)?;
            config.set_max_file_duration_us(ms.saturating_mul(1000))
        }
        "max-filesize" => config.set_max_file_size_bytes(parse_i64(key, value)?),
        "interleave-duration-us" => config.set_interleave_duration_us(parse_i32(key, value)?),
        "param-movie-time-scale" => config.set_movie_time_scale(parse_i32(key, value)?),
        "param-use-64bit-offset" => config.set_use_64bit_offset(parse_i32(key, value)? != 0),
        "param-geotag-longitude" => config.set_geo_longitude(parse_i64(key, value)?),
        "param-geotag-latitude" => config.set_geo_latitude(parse_i64(key, value)?),
        "param-track-time-status" => config.set_track_interval_us(parse_i64(key, value)?),
        "audio-param-sampling-rate" => config.set_sample_rate(parse_i32(key, value)?),
        "audio-param-number-of-channels" => config.set_audio_channels(parse_i32(key, value)?),
        "audio-param-encoding-bitrate" => config.set_audio_bit_rate(parse_i32(key, value)?),
        "audio-param-time-scale" => config.set_audio_time_scale(parse_i32(key, value)?),
        "video-param-encoding-bitrate" => config.set_video_bit_rate(parse_i32(key, value)?),
        "video-param-rotation-angle-degrees" => config.set_rotation(parse_i32(key, value)?),
        "video-param-i-frames-interval" => config.set_i_frames_interval(parse_i32(key, value)?),
        "video-param-encoder-profile" => config.set_video_profile(parse_i32(key, value)?),
        "video-param-encoder-level" => config.set_video_level(parse_i32(key, value)?),
        "video-param-camera-id" => config.set_camera_id(parse_i32(key, value)?),
        "video-param-time-scale" => config.set_video_time_scale(parse_i32(key, value)?),
        "time-lapse-enable" => match parse_i32(key, value)? {
            0 => config.set_time_lapse_enabled(false),
            1 => config.set_time_lapse_enabled(true),
            other => Err(ArgonError::invalid_argument(format!(
                "Invalid time-lapse-enable value: {}",
                other
            ))),
        },
        "time-between-time-lapse-frame-capture" => {
            let ms = parse_i64(key, value)?;
            config.set_time_lapse_interval_us(ms.saturating_mul(1000))
        }
        _ => {
            error!("apply_parameter: failed to find key {}", key);
            Err(ArgonError::invalid_argument(format!(
                "Unknown parameter key: {}",
                key
            )))
        }
    }
}

/// Parse an int64 literal optionally surrounded by whitespace
fn parse_i64(key: &str, value: &str) -> Result<i64> {
    value.trim().parse().map_err(|_| {
        ArgonError::invalid_argument(format!("Invalid value for {}: \"{}\"", key, value))
    })
}

/// Parse an int32 literal, additionally bounded to [0, 0x007FFFFFFF]
fn parse_i32(key: &str, value: &str) -> Result<i32> {
    let wide = parse_i64(key, value)?;
    if !(0..=0x7FFF_FFFF).contains(&wide) {
        return Err(ArgonError::invalid_argument(format!(
            "Value for {} out of range: {}",
            key, wide
        )));
    }
    Ok(wide as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_parameter() {
        let mut config = RecordingConfig::default();
        apply_parameters(&mut config, "max-duration=5000").unwrap();
        assert_eq!(config.max_file_duration_us, 5_000_000);
    }

    #[test]
    fn test_multiple_parameters() {
        let mut config = RecordingConfig::default();
        apply_parameters(
            &mut config,
            "video-param-encoding-bitrate=500000;audio-param-sampling-rate=44100",
        )
        .unwrap();
        assert_eq!(config.video_bit_rate, 500_000);
        assert_eq!(config.sample_rate, 44_100);
    }

    #[test]
    fn test_key_whitespace_is_trimmed() {
        let mut config = RecordingConfig::default();
        apply_parameters(&mut config, " max-filesize =2048").unwrap();
        assert_eq!(config.max_file_size_bytes, 2048);
    }

    #[test]
    fn test_value_whitespace_is_tolerated() {
        let mut config = RecordingConfig::default();
        apply_parameters(&mut config, "max-filesize= 2048 ").unwrap();
        assert_eq!(config.max_file_size_bytes, 2048);
    }

    #[test]
    fn test_missing_equals_fails() {
        let mut config = RecordingConfig::default();
        assert!(apply_parameters(&mut config, "max-duration").is_err());
        assert!(apply_parameters(&mut config, "").is_err());
    }

    #[test]
    fn test_trailing_semicolon_fails() {
        let mut config = RecordingConfig::default();
        assert!(apply_parameters(&mut config, "max-duration=5000;").is_err());
        // The entry before the dangling separator was still applied.
        assert_eq!(config.max_file_duration_us, 5_000_000);
    }

    #[test]
    fn test_empty_key_fails() {
        let mut config = RecordingConfig::default();
        assert!(apply_parameters(&mut config, "=5000").is_err());
        assert!(apply_parameters(&mut config, "  =5000").is_err());
    }

    #[test]
    fn test_unknown_key_fails() {
        let mut config = RecordingConfig::default();
        assert!(apply_parameters(&mut config, "no-such-key=1").is_err());
    }

    #[test]
    fn test_batch_is_not_transactional() {
        let mut config = RecordingConfig::default();
        // 500 bytes is under the 1 KiB floor, so the batch fails, but the
        // earlier max-duration entry stays applied.
        let result = apply_parameters(&mut config, "max-duration=5000;max-filesize=500");
        assert!(result.is_err());
        assert_eq!(config.max_file_duration_us, 5_000_000);
        assert_eq!(config.max_file_size_bytes, 0);
    }

    #[test]
    fn test_i32_range_enforced() {
        let mut config = RecordingConfig::default();
        // Fits an i64 but exceeds the 32-bit parameter range.
        assert!(apply_parameters(&mut config, "video-param-encoding-bitrate=2147483648").is_err());
        assert!(apply_parameters(&mut config, "video-param-camera-id=-1").is_err());
    }

    #[test]
    fn test_non_numeric_value_fails() {
        let mut config = RecordingConfig::default();
        assert!(apply_parameters(&mut config, "max-duration=abc").is_err());
        assert!(apply_parameters(&mut config, "max-duration=12abc").is_err());
    }

    #[test]
    fn test_time_lapse_keys() {
        let mut config = RecordingConfig::default();
        apply_parameters(
            &mut config,
            "time-lapse-enable=1;time-between-time-lapse-frame-capture=2000",
        )
        .unwrap();
        assert!(config.time_lapse);
        assert_eq!(config.time_lapse_interval_us, Some(2_000_000));
        assert!(apply_parameters(&mut config, "time-lapse-enable=2").is_err());
    }
}
