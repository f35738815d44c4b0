use std::path::Path;
use std::time::Duration;

use ahash::AHashMap;
use padwire_input::{
    CalibrationProfile, ControllerInterface, RawStateSource, SlotIndex, DEFAULT_AXIS_SCALE,
    DEFAULT_DEADZONE,
};
use serde::Deserialize;
use thiserror::Error;

use crate::print_warning;

/// Config file looked up in the working directory when none is given.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "padwire.yaml";

const DEFAULT_POLL_INTERVAL_MS: u64 = 16;
const DEFAULT_CAPTURE_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("yaml deserialize error: {0}")]
    YamlDeserializeError(#[from] serde_yaml::Error),
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),
    #[error("invalid value: {0}")]
    InvalidValue(&'static str),
    #[error("path error: {0}")]
    PathError(#[from] std::io::Error),
}

/// Daemon settings.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Config {
    pub poll_interval: Duration,
    pub capture_timeout: Duration,
    pub calibration: AHashMap<SlotIndex, CalibrationProfile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            capture_timeout: Duration::from_millis(DEFAULT_CAPTURE_TIMEOUT_MS),
            calibration: AHashMap::new(),
        }
    }
}

impl Config {
    /// Load the config at `path`, or the default file if `path` is `None`.
    /// A missing default file yields the default config; a missing explicit
    /// file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let input = match path {
            Some(path) => std::fs::read_to_string(path)?,
            None => match std::fs::read_to_string(DEFAULT_CONFIG_FILE) {
                Ok(input) => input,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Ok(Self::default());
                }
                Err(e) => return Err(e.into()),
            },
        };
        parse_config(&input)
    }

    /// Push per-slot calibration into the interface. Slots the backend does
    /// not have are reported and skipped.
    pub fn apply<S: RawStateSource>(&self, interface: &mut ControllerInterface<S>) {
        let mut slots: Vec<_> = self.calibration.iter().collect();
        slots.sort_by_key(|(slot, _)| **slot);
        for (slot, profile) in slots {
            let result = interface
                .set_controller_axis_scale(*slot, profile.axis_scale)
                .and_then(|()| interface.set_controller_deadzone(*slot, profile.deadzone));
            if let Err(e) = result {
                print_warning!("calibration skipped: {e}");
            }
        }
    }
}

/// Parse a yaml config.
pub(crate) fn parse_config(input: &str) -> Result<Config, ConfigError> {
    let version = parse_version(input)?;
    match version {
        1 => {
            let config: ConfigV1 = serde_yaml::from_str(input)?;
            config.into_config()
        }
        _ => Err(ConfigError::UnsupportedVersion(version)),
    }
}

/// A config with a version.
#[derive(Debug, Clone, Deserialize)]
struct VersionedConfig {
    version: u8,
}

fn parse_version(input: &str) -> Result<u8, ConfigError> {
    let raw: VersionedConfig = serde_yaml::from_str(input)?;
    Ok(raw.version)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigV1 {
    #[allow(dead_code)]
    version: u8,
    #[serde(default = "default_poll_interval_ms")]
    poll_interval_ms: u64,
    #[serde(default = "default_capture_timeout_ms")]
    capture_timeout_ms: u64,
    #[serde(default)]
    calibration: AHashMap<SlotIndex, CalibrationV1>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CalibrationV1 {
    #[serde(default = "default_axis_scale")]
    axis_scale: f32,
    #[serde(default = "default_deadzone")]
    deadzone: f32,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_capture_timeout_ms() -> u64 {
    DEFAULT_CAPTURE_TIMEOUT_MS
}

fn default_axis_scale() -> f32 {
    DEFAULT_AXIS_SCALE
}

fn default_deadzone() -> f32 {
    DEFAULT_DEADZONE
}

impl ConfigV1 {
    fn into_config(self) -> Result<Config, ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue("poll_interval_ms must be positive"));
        }
        let calibration = self
            .calibration
            .into_iter()
            .map(|(slot, c)| (slot, CalibrationProfile::new(c.axis_scale, c.deadzone)))
            .collect();
        Ok(Config {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            capture_timeout: Duration::from_millis(self.capture_timeout_ms),
            calibration,
        })
    }
}

#[cfg(test)]
mod tests {
    use padwire_input::{Layout, MemorySource};

    use super::*;

    #[test]
    fn empty_v1_uses_defaults() {
        let config = parse_config("version: 1\n").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn full_v1() {
        let yaml = r#"
version: 1
poll_interval_ms: 8
capture_timeout_ms: 3000
calibration:
  0:
    axis_scale: 1.35
  2:
    axis_scale: 1.1
    deadzone: 0.15
"#;
        let config = parse_config(yaml).unwrap();
        assert_eq!(config.poll_interval, Duration::from_millis(8));
        assert_eq!(config.capture_timeout, Duration::from_secs(3));
        assert_eq!(
            config.calibration.get(&0),
            Some(&CalibrationProfile::new(1.35, DEFAULT_DEADZONE))
        );
        assert_eq!(
            config.calibration.get(&2),
            Some(&CalibrationProfile::new(1.1, 0.15))
        );
    }

    #[test]
    fn version_is_required() {
        assert!(matches!(
            parse_config("poll_interval_ms: 8\n"),
            Err(ConfigError::YamlDeserializeError(_))
        ));
    }

    #[test]
    fn unknown_version_is_rejected() {
        assert!(matches!(
            parse_config("version: 2\n"),
            Err(ConfigError::UnsupportedVersion(2))
        ));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(
            parse_config("version: 1\nbindings: []\n"),
            Err(ConfigError::YamlDeserializeError(_))
        ));
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        assert!(matches!(
            parse_config("version: 1\npoll_interval_ms: 0\n"),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let path = Path::new("/nonexistent/padwire/config.yaml");
        assert!(matches!(
            Config::load(Some(path)),
            Err(ConfigError::PathError(_))
        ));
    }

    #[test]
    fn apply_sets_known_slots_and_skips_others() {
        let config = parse_config(
            "version: 1\ncalibration:\n  1:\n    deadzone: 0.1\n  7:\n    axis_scale: 2.0\n",
        )
        .unwrap();
        let mut interface = ControllerInterface::new(MemorySource::new(Layout::standard(2)));
        config.apply(&mut interface);
        assert_eq!(
            interface.calibration(1),
            Some(&CalibrationProfile::new(DEFAULT_AXIS_SCALE, 0.1))
        );
        assert_eq!(interface.calibration(0), Some(&CalibrationProfile::default()));
    }
}
