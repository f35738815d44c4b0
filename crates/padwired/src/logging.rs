use std::fmt;

use chrono::NaiveDateTime;
use colored::Colorize;
use fern::Dispatch;
use log::{Level, LevelFilter, SetLoggerError};

const TIME_FORMAT: &str = "%Y.%m.%d %H:%M:%S";

#[macro_export]
macro_rules! print_error {
    ($($arg:tt)*) => {
        log::error!(target: "padwired", $($arg)*)
    }
}

#[macro_export]
macro_rules! print_warning {
    ($($arg:tt)*) => {
        log::warn!(target: "padwired", $($arg)*)
    }
}

#[macro_export]
macro_rules! print_info {
    ($($arg:tt)*) => {
        log::info!(target: "padwired", $($arg)*)
    }
}

#[macro_export]
macro_rules! print_debug {
    ($($arg:tt)*) => {
        log::debug!(target: "padwired", $($arg)*)
    }
}

/// One output line. Records from other crates are tagged with the crate
/// they came from.
fn format_line(time: &NaiveDateTime, target: &str, message: &fmt::Arguments) -> String {
    let origin = target.split("::").next().unwrap_or(target);
    if origin == "padwired" {
        format!("[{}] {message}", time.format(TIME_FORMAT))
    } else {
        format!("[{}] {origin}: {message}", time.format(TIME_FORMAT))
    }
}

fn paint(level: Level, line: String) -> String {
    match level {
        Level::Error => line.bright_red().to_string(),
        Level::Warn => line.bright_yellow().to_string(),
        Level::Info => line,
        Level::Debug | Level::Trace => line.dimmed().to_string(),
    }
}

/// Install the logger. `padwired` and `padwire_input` log at the chosen
/// verbosity, everything else only warns.
pub(crate) fn setup(verbose: bool, no_color: bool) -> Result<(), SetLoggerError> {
    if no_color {
        colored::control::set_override(false);
    }
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    Dispatch::new()
        .format(|out, message, record| {
            let now = chrono::Local::now().naive_local();
            let line = format_line(&now, record.target(), message);
            out.finish(format_args!("{}", paint(record.level(), line)))
        })
        .level(LevelFilter::Warn)
        .level_for("padwired", log_level)
        .level_for("padwire_input", log_level)
        .chain(std::io::stdout())
        .apply()
}
