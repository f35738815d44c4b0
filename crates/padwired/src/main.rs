mod cli;
mod config;
mod logging;
mod names;
mod replay;
mod runner;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use crossbeam_channel::{unbounded, Receiver};

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::replay::Script;
use crate::runner::Report;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logging::setup(cli.verbose, cli.no_color) {
        eprintln!("failed to set up logging: {e}");
        return ExitCode::FAILURE;
    }

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            print_error!("failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Handle Ctrl+C to exit cleanly
    let (stop_tx, stop_rx) = unbounded::<()>();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    }) {
        print_error!("failed to set Ctrl+C handler: {e}");
        return ExitCode::FAILURE;
    }

    match cli.command {
        Command::Replay { file } => run_replay(&file, &config),
        command => run_hardware(command, &config, stop_rx),
    }
}

fn run_replay(file: &std::path::Path, config: &Config) -> ExitCode {
    let script = match Script::load(file) {
        Ok(script) => script,
        Err(e) => {
            print_error!("failed to load {}: {e}", file.display());
            return ExitCode::FAILURE;
        }
    };
    let report: Report = Arc::new(|line: String| {
        print_info!("{line}");
    });
    match replay::replay(&script, config, &report) {
        Ok(()) => {
            print_info!("replayed {} frames", script.frames.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            print_error!("replay failed: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(feature = "sdl2-backend")]
fn run_hardware(command: Command, config: &Config, stop: Receiver<()>) -> ExitCode {
    use std::time::Duration;

    use padwire_input::Sdl2Source;

    use crate::runner::{Exit, Runner};

    let mut runner = match Runner::new(Sdl2Source::new(), config, stop) {
        Ok(runner) => runner,
        Err(e) => {
            print_error!("failed to start controller interface: {e}");
            return ExitCode::FAILURE;
        }
    };

    let code = match command {
        Command::Run => match runner.watch() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                print_error!("failed to bind controls: {e}");
                ExitCode::FAILURE
            }
        },
        Command::Capture => match runner.capture() {
            Exit::Finished(_) => ExitCode::SUCCESS,
            Exit::TimedOut => {
                print_warning!("no input received");
                ExitCode::FAILURE
            }
            Exit::Stopped => ExitCode::FAILURE,
        },
        Command::Rumble {
            slot,
            strength,
            duration_ms,
        } => {
            if runner.rumble(slot, &strength, Duration::from_millis(duration_ms)) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Command::Devices => {
            let devices = runner.interface().source().device_names();
            if devices.is_empty() {
                print_info!("no controllers connected");
            }
            for (slot, name) in devices {
                print_info!("slot {slot}: {name}");
            }
            ExitCode::SUCCESS
        }
        Command::Replay { .. } => ExitCode::SUCCESS,
    };
    runner.shutdown();
    code
}

#[cfg(not(feature = "sdl2-backend"))]
fn run_hardware(command: Command, _config: &Config, _stop: Receiver<()>) -> ExitCode {
    print_error!(
        "{command:?} needs controller hardware; rebuild padwired with the sdl2-backend feature"
    );
    ExitCode::FAILURE
}
