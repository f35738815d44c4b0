use std::path::Path;

use ahash::AHashMap;
use padwire_input::{ControllerInterface, Layout, MemorySource, SlotIndex};
use serde::Deserialize;
use thiserror::Error;

use crate::config::Config;
use crate::names::{parse_axis, parse_button};
use crate::runner::{bind_all, Report};

#[derive(Debug, Error)]
pub(crate) enum ReplayError {
    #[error("yaml deserialize error: {0}")]
    YamlDeserializeError(#[from] serde_yaml::Error),
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),
    #[error("frame {frame}: unknown axis {name}")]
    UnknownAxis { frame: usize, name: String },
    #[error("frame {frame}: unknown button {name}")]
    UnknownButton { frame: usize, name: String },
    #[error("frame {frame}: slot {slot} is out of range")]
    InvalidSlot { frame: usize, slot: SlotIndex },
    #[error("controller error: {0}")]
    ControllerError(#[from] padwire_input::Error),
    #[error("path error: {0}")]
    PathError(#[from] std::io::Error),
}

/// A recorded sequence of controller states, one poll per frame.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Script {
    #[allow(dead_code)]
    version: u8,
    #[serde(default = "default_slots")]
    pub slots: usize,
    pub frames: Vec<Frame>,
}

/// Full state of one slot. Axes that are not listed are centered and
/// buttons that are not listed are released.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Frame {
    #[serde(default)]
    pub slot: SlotIndex,
    #[serde(default = "default_connected")]
    pub connected: bool,
    #[serde(default)]
    pub axes: AHashMap<String, f32>,
    #[serde(default)]
    pub buttons: Vec<String>,
}

fn default_slots() -> usize {
    1
}

fn default_connected() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct VersionedScript {
    version: u8,
}

impl Script {
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let input = std::fs::read_to_string(path)?;
        Self::parse(&input)
    }

    pub fn parse(input: &str) -> Result<Self, ReplayError> {
        let raw: VersionedScript = serde_yaml::from_str(input)?;
        match raw.version {
            1 => Ok(serde_yaml::from_str(input)?),
            version => Err(ReplayError::UnsupportedVersion(version)),
        }
    }
}

/// Feed `script` through an interface backed by memory, with every control
/// bound to `report`.
pub(crate) fn replay(script: &Script, config: &Config, report: &Report) -> Result<(), ReplayError> {
    let source = MemorySource::new(Layout::standard(script.slots));
    let handle = source.handle();
    let mut interface = ControllerInterface::new(source);
    config.apply(&mut interface);
    bind_all(&mut interface, report)?;
    interface.initialize()?;

    let layout = interface.layout();
    for (i, frame) in script.frames.iter().enumerate() {
        if frame.slot >= layout.slots {
            return Err(ReplayError::InvalidSlot {
                frame: i,
                slot: frame.slot,
            });
        }
        if !frame.connected {
            handle.disconnect(frame.slot);
            interface.poll_events();
            continue;
        }

        for axis in 0..layout.axes {
            handle.set_axis(frame.slot, axis, 0.0);
        }
        for (name, value) in &frame.axes {
            let axis = parse_axis(name).ok_or_else(|| ReplayError::UnknownAxis {
                frame: i,
                name: name.clone(),
            })?;
            handle.set_axis(frame.slot, axis, *value);
        }
        for button in 0..layout.buttons {
            handle.release(frame.slot, button);
        }
        for name in &frame.buttons {
            let button = parse_button(name).ok_or_else(|| ReplayError::UnknownButton {
                frame: i,
                name: name.clone(),
            })?;
            handle.press(frame.slot, button);
        }
        handle.connect(frame.slot);
        interface.poll_events();
    }

    interface.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn replay_collect(script: &Script, config: &Config) -> Result<Vec<String>, ReplayError> {
        let lines: Arc<Mutex<Vec<String>>> = Arc::default();
        let sink = lines.clone();
        let report: Report = Arc::new(move |line: String| sink.lock().unwrap().push(line));
        replay(script, config, &report)?;
        let lines = lines.lock().unwrap().clone();
        Ok(lines)
    }

    fn run(yaml: &str) -> Result<Vec<String>, ReplayError> {
        replay_collect(&Script::parse(yaml)?, &Config::default())
    }

    #[test]
    fn parses_defaults() {
        let script = Script::parse("version: 1\nframes:\n  - {}\n").unwrap();
        assert_eq!(script.slots, 1);
        assert_eq!(script.frames[0].slot, 0);
        assert!(script.frames[0].connected);
        assert!(script.frames[0].buttons.is_empty());
    }

    #[test]
    fn rejects_other_versions() {
        assert!(matches!(
            Script::parse("version: 3\nframes: []\n"),
            Err(ReplayError::UnsupportedVersion(3))
        ));
    }

    #[test]
    fn replays_deadzone_and_buttons() {
        let lines = run(r#"
version: 1
frames:
  - {}
  - axes: { LeftX: 0.1 }
  - axes: { LeftX: 0.3 }
    buttons: [A]
  - axes: { LeftX: 0.3 }
  - {}
"#)
        .unwrap();
        assert_eq!(
            lines,
            vec![
                "slot 0 connected",
                "slot 0 LeftX 0.300",
                "slot 0 A pressed",
                "slot 0 A released",
                "slot 0 LeftX 0.000",
            ]
        );
    }

    #[test]
    fn replays_axis_as_button() {
        let lines = run(r#"
version: 1
frames:
  - {}
  - axes: { RightX: -0.6 }
  - axes: { RightX: -0.6 }
  - axes: { RightX: -0.1 }
"#)
        .unwrap();
        assert_eq!(
            lines,
            vec![
                "slot 0 connected",
                "slot 0 RightX -0.600",
                "slot 0 RightX(-) pressed",
                "slot 0 RightX 0.000",
                "slot 0 RightX(-) released",
            ]
        );
    }

    #[test]
    fn reconnect_takes_a_fresh_baseline() {
        let lines = run(r#"
version: 1
slots: 2
frames:
  - slot: 1
  - slot: 1
    connected: false
  - slot: 1
    buttons: [Start]
  - slot: 1
"#)
        .unwrap();
        assert_eq!(
            lines,
            vec![
                "slot 1 connected",
                "slot 1 disconnected",
                "slot 1 connected",
                "slot 1 Start released",
            ]
        );
    }

    #[test]
    fn calibration_from_config_is_applied() {
        let script = Script::parse("version: 1\nframes:\n  - {}\n  - axes: { LeftY: 0.2 }\n").unwrap();
        let config = crate::config::parse_config(
            "version: 1\ncalibration:\n  0:\n    axis_scale: 2.0\n    deadzone: 0.1\n",
        )
        .unwrap();
        let lines = replay_collect(&script, &config).unwrap();
        assert_eq!(lines, vec!["slot 0 connected", "slot 0 LeftY 0.400"]);
    }

    #[test]
    fn unknown_names_and_slots_are_errors() {
        assert!(matches!(
            run("version: 1\nframes:\n  - buttons: [Turbo]\n"),
            Err(ReplayError::UnknownButton { frame: 0, .. })
        ));
        assert!(matches!(
            run("version: 1\nframes:\n  - axes: { Wheel: 1.0 }\n"),
            Err(ReplayError::UnknownAxis { frame: 0, .. })
        ));
        assert!(matches!(
            run("version: 1\nframes:\n  - slot: 4\n"),
            Err(ReplayError::InvalidSlot { frame: 0, slot: 4 })
        ));
    }
}
