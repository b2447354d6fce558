// src/logging.rs

//! Diagnostics go to STDERR through `tracing-subscriber`; stdout carries
//! nothing but command output.
//!
//! `--log-level` sets one level for everything. Without it, `QUICKCMD_LOG`
//! is read as an `EnvFilter` directive list, so both `debug` and
//! `quickcmd::exec=trace,warn` work. An unset or unparsable variable means
//! `warn`.

use anyhow::{anyhow, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "QUICKCMD_LOG";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let filter = filter_for(cli_level, env.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))
}

fn filter_for(cli_level: Option<LogLevel>, env: Option<&str>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::default().add_directive(level_filter(level).into());
    }

    match env.map(str::trim).filter(|s| !s.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives).unwrap_or_else(|e| {
            eprintln!("quickcmd: ignoring {LOG_ENV}={directives:?}: {e}");
            warn_only()
        }),
        None => warn_only(),
    }
}

fn warn_only() -> EnvFilter {
    EnvFilter::default().add_directive(LevelFilter::WARN.into())
}

fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_level_beats_the_environment() {
        let filter = filter_for(Some(LogLevel::Debug), Some("error"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn environment_accepts_per_module_directives() {
        let filter = filter_for(None, Some("quickcmd::exec=trace,warn"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));

        let filter = filter_for(None, Some(" INFO "));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn missing_or_broken_environment_means_warn() {
        for env in [None, Some(""), Some("quickcmd=loud")] {
            assert_eq!(
                filter_for(None, env).max_level_hint(),
                Some(LevelFilter::WARN),
                "{env:?}"
            );
        }
    }
}
