//! Logging for executables.
//!
//! Records go to stdout with coloured level tags and, optionally, to a plain
//! text log file in the session directory. Each line is prefixed by the
//! seconds elapsed since the session epoch, so log lines can be matched
//! against the archived simulation ticks.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::Colorize;
use log::{info, Level};
use std::fmt::Display;
use std::path::Path;
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Info messages must always be logged, but the level was set to `{0}`")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Could not open the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("A logger has already been set: {0}")]
    FernInitError(log::SetLoggerError),
}

/// Where a formatted line is written.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Sink {
    /// Coloured level tags
    Terminal,

    /// Plain text, no escape codes in the file
    File,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// Records are written to stdout and, if given, to `log_file_path`. Debug
/// and trace lines also name the module they came from.
///
/// `min_level` must let info messages through. Only one logger may be set
/// per process, a second call returns `FernInitError`.
pub fn logger_init(min_level: LevelFilter, log_file_path: Option<&Path>) -> Result<(), LoggerInitError> {
    if min_level < Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level));
    }

    let terminal = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}",
                format_line(Sink::Terminal, session::get_elapsed_seconds(), record.level(), record.target(), message)
            ))
        })
        .chain(std::io::stdout());

    let mut dispatch = fern::Dispatch::new().level(min_level).chain(terminal);

    if let Some(path) = log_file_path {
        let file = fern::log_file(path).map_err(LoggerInitError::LogFileInitError)?;

        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "{}",
                        format_line(Sink::File, session::get_elapsed_seconds(), record.level(), record.target(), message)
                    ))
                })
                .chain(file),
        );
    }

    dispatch.apply().map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    if let Some(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    Log level: {:?}", min_level);
    match log_file_path {
        Some(path) => info!("    Log file: {:?}", path),
        None => info!("    Log file: none, stdout only"),
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Build one log line.
fn format_line(sink: Sink, elapsed_s: f64, level: Level, target: &str, message: impl Display) -> String {
    if level > Level::Info {
        format!("[{:10.6} {}] {}: {}", elapsed_s, level_tag(sink, level), target, message)
    } else {
        format!("[{:10.6} {}] {}", elapsed_s, level_tag(sink, level), message)
    }
}

fn level_tag(sink: Sink, level: Level) -> String {
    let tag = match level {
        Level::Trace => "TRC",
        Level::Debug => "DBG",
        Level::Info => "INF",
        Level::Warn => "WRN",
        Level::Error => "ERR",
    };

    match (sink, level) {
        (Sink::File, _) => tag.to_string(),
        (Sink::Terminal, Level::Trace) => tag.dimmed().italic().to_string(),
        (Sink::Terminal, Level::Debug) => tag.dimmed().to_string(),
        (Sink::Terminal, Level::Info) => tag.normal().to_string(),
        (Sink::Terminal, Level::Warn) => tag.yellow().to_string(),
        (Sink::Terminal, Level::Error) => tag.red().bold().to_string(),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_file_lines() {
        assert_eq!(
            format_line(Sink::File, 1.5, Level::Info, "traj_lib::sim", "Simulating 101 ticks"),
            "[  1.500000 INF] Simulating 101 ticks"
        );
        assert_eq!(
            format_line(Sink::File, 0.02, Level::Warn, "traj_lib::loc", "Time went backwards"),
            "[  0.020000 WRN] Time went backwards"
        );

        // Debug and trace name their module
        assert_eq!(
            format_line(Sink::File, 12.0, Level::Debug, "traj_lib::loco_ctrl", 3),
            "[ 12.000000 DBG] traj_lib::loco_ctrl: 3"
        );
    }

    #[test]
    fn test_file_tags_are_plain() {
        for level in [Level::Trace, Level::Debug, Level::Info, Level::Warn, Level::Error].iter() {
            let tag = level_tag(Sink::File, *level);
            assert_eq!(tag.len(), 3);
            assert!(!tag.contains('\u{1b}'));
        }
    }

    #[test]
    fn test_terminal_tag_keeps_text() {
        for level in [Level::Trace, Level::Debug, Level::Info, Level::Warn, Level::Error].iter() {
            assert!(level_tag(Sink::Terminal, *level).contains(&level_tag(Sink::File, *level)));
        }
    }

    #[test]
    fn test_rejects_quiet_levels() {
        assert!(matches!(
            logger_init(LevelFilter::Warn, None),
            Err(LoggerInitError::InvalidMinLogLevel(LevelFilter::Warn))
        ));
        assert!(matches!(
            logger_init(LevelFilter::Off, None),
            Err(LoggerInitError::InvalidMinLogLevel(LevelFilter::Off))
        ));
    }
}
