//! Logging setup for survey runs.
//!
//! Surveys are driven from a terminal, so output stays on the compact fmt
//! layer without targets or source locations. Retry warnings and scan
//! degradations land at WARN, per-collection progress at DEBUG.

use crate::Result;

/// Initializes logging for a survey run.
///
/// `verbose` raises the level (0 = INFO, 1 = DEBUG, 2+ = TRACE); `quiet`
/// drops it to ERROR and wins over any verbosity.
///
/// # Errors
/// Returns error if a global subscriber is already installed.
pub fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(level_for(verbose, quiet))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|e| {
            crate::error::SurveyError::configuration(format!(
                "Failed to initialize logging: {}",
                e
            ))
        })?;

    Ok(())
}

fn level_for(verbose: u8, quiet: bool) -> tracing::Level {
    if quiet {
        return tracing::Level::ERROR;
    }
    match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}
