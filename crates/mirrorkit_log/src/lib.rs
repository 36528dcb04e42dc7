//! `mirrorkit_log`: process-wide `tracing` subscriber setup.
//!
//! Library crates only emit events; binding layers call [`init_logging`] once.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the level passed to [`init_logging`].
pub const C_ENV_LOG: &str = "MIRRORKIT_LOG";

#[derive(Debug, Error)]
pub enum LogInitError {
    /// Level/directive string could not be parsed.
    #[error("Invalid log directive `{directive}`: {message}")]
    InvalidDirective { directive: String, message: String },
    /// A global subscriber is already installed.
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Build the filter: `MIRRORKIT_LOG` when set, else `level`.
pub fn build_filter(level: &str) -> Result<EnvFilter, LogInitError> {
    let c_directive = std::env::var(C_ENV_LOG).unwrap_or_else(|_| level.to_string());
    EnvFilter::try_new(&c_directive).map_err(|e| LogInitError::InvalidDirective {
        directive: c_directive.clone(),
        message: e.to_string(),
    })
}

/// Install a compact fmt subscriber writing to stderr.
pub fn init_logging(level: &str) -> Result<(), LogInitError> {
    let env_filter = build_filter(level)?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|e| LogInitError::AlreadyInitialized(e.to_string()))
}
