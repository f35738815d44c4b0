use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Debug, Subcommand, PartialEq)]
pub(crate) enum Command {
    /// Poll controllers in the foreground and log every input.
    Run,
    /// Wait for the next significant input and print it.
    Capture,
    /// Rumble a controller for a while.
    Rumble {
        /// Controller slot
        #[arg(short, long, default_value_t = 0)]
        slot: usize,
        /// Motor strengths in [0.0, 1.0], one per motor
        #[arg(long, value_delimiter = ',', default_values_t = [0.5, 0.5])]
        strength: Vec<f32>,
        /// How long to rumble
        #[arg(short, long, default_value_t = 500)]
        duration_ms: u64,
    },
    /// Feed a recorded frame script through the interface.
    Replay {
        /// Path to the YAML frame script
        file: PathBuf,
    },
    /// List connected controllers.
    Devices,
}

/// Polls game controllers and routes their input to bound actions.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// Turn debugging information on
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Configuration file (defaults to padwire.yaml in the current directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// The command to run
    #[clap(subcommand)]
    pub command: Command,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rumble_defaults() {
        let cli = Cli::parse_from(["padwired", "rumble"]);
        assert_eq!(
            cli.command,
            Command::Rumble {
                slot: 0,
                strength: vec![0.5, 0.5],
                duration_ms: 500,
            }
        );
    }

    #[test]
    fn rumble_strength_list() {
        let cli = Cli::parse_from([
            "padwired", "-v", "rumble", "--slot", "2", "--strength", "1,0.25",
        ]);
        assert!(cli.verbose);
        let Command::Rumble { slot, strength, .. } = cli.command else {
            panic!("expected rumble");
        };
        assert_eq!(slot, 2);
        assert_eq!(strength, vec![1.0, 0.25]);
    }

    #[test]
    fn replay_takes_a_file() {
        let cli = Cli::parse_from(["padwired", "--config", "a.yaml", "replay", "frames.yaml"]);
        assert_eq!(cli.config, Some(PathBuf::from("a.yaml")));
        assert_eq!(
            cli.command,
            Command::Replay {
                file: PathBuf::from("frames.yaml")
            }
        );
    }
}
