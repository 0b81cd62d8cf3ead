use serde::{Deserialize, Serialize};
use std::{fmt, fs::File, io, io::BufReader, path::Path};

use crate::pitch::PLATE_DISTANCE_FT;

/// default target plane: the tip of home plate
pub const TARGET_PLANE_Z: f64 = -PLATE_DISTANCE_FT;
/// real flights last ~0.38-0.5s, this only catches pitches that never reach the plate
pub const MAX_FLIGHT_DURATION: f64 = 1.0;
pub const TRAIL_SAMPLE_INTERVAL: f64 = 0.01;
pub const TRAIL_RETENTION: f64 = 3.0;
pub const MAX_TRAIL_MARKERS: usize = 256;
pub const ARRIVAL_DISPLAY_WINDOW: f64 = 1.5;

/// Tunables of a [`PlaybackController`](crate::playback::PlaybackController).
/// Durations are in seconds. Missing keys fall back to the defaults above.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PlaybackConfig {
    pub target_plane_z: f64,
    pub max_flight_duration: f64,
    pub trail_sample_interval: f64,
    pub trail_retention: f64,
    pub max_trail_markers: usize,
    /// how long the ball stays on screen once it reached the plate
    pub arrival_display_window: f64,
    pub trail_visible: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            target_plane_z: TARGET_PLANE_Z,
            max_flight_duration: MAX_FLIGHT_DURATION,
            trail_sample_interval: TRAIL_SAMPLE_INTERVAL,
            trail_retention: TRAIL_RETENTION,
            max_trail_markers: MAX_TRAIL_MARKERS,
            arrival_display_window: ARRIVAL_DISPLAY_WINDOW,
            trail_visible: true,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "couldn't read playback config: {e}"),
            ConfigError::Parse(e) => write!(f, "invalid playback config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl PlaybackConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(ConfigError::Parse)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(ConfigError::Io)?;
        serde_json::from_reader(BufReader::new(file)).map_err(ConfigError::Parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config =
            PlaybackConfig::from_json_str(r#"{ "max_flight_duration": 0.6, "trail_visible": false }"#)
                .unwrap();
        assert_eq!(config.max_flight_duration, 0.6);
        assert!(!config.trail_visible);
        assert_eq!(config.target_plane_z, -60.5);
        assert_eq!(config.max_trail_markers, MAX_TRAIL_MARKERS);
    }

    #[test]
    fn malformed_config_is_a_parse_error() {
        assert!(matches!(
            PlaybackConfig::from_json_str(r#"{ "trail_retention": "long" }"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            PlaybackConfig::from_json_file("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
