use super::DecompositionError;
use log::{Level, LevelFilter};
use std::fmt;

const TARGET: &str = "acd3d";

/// The verbosity knob of a decomposition.
///
/// Records below the configured level are dropped before they reach the `log`
/// facade; the others are forwarded with the `acd3d` target. No logger is ever
/// installed by this crate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Diagnostics {
    level: LevelFilter,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(LevelFilter::Info)
    }
}

impl Diagnostics {
    /// Diagnostics forwarding every record at `level` or more severe.
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }

    /// Diagnostics dropping every record.
    pub fn silent() -> Self {
        Self::new(LevelFilter::Off)
    }

    /// The configured level.
    pub fn level(&self) -> LevelFilter {
        self.level
    }

    #[inline]
    fn log(&self, level: Level, args: fmt::Arguments) {
        if level <= self.level {
            log::log!(target: TARGET, level, "{}", args);
        }
    }

    pub(crate) fn debug(&self, args: fmt::Arguments) {
        self.log(Level::Debug, args)
    }

    pub(crate) fn info(&self, args: fmt::Arguments) {
        self.log(Level::Info, args)
    }

    pub(crate) fn warn(&self, args: fmt::Arguments) {
        self.log(Level::Warn, args)
    }
}

/// Parses a log level name.
///
/// Accepts `off`, `debug`, `info`, `warn`, `warning`, `error`, `err` and
/// `critical`, ignoring case. `critical` maps to [`LevelFilter::Error`].
pub fn parse_log_level(level: &str) -> Result<LevelFilter, DecompositionError> {
    match level.to_ascii_lowercase().as_str() {
        "off" => Ok(LevelFilter::Off),
        "debug" => Ok(LevelFilter::Debug),
        "info" => Ok(LevelFilter::Info),
        "warn" | "warning" => Ok(LevelFilter::Warn),
        "error" | "err" | "critical" => Ok(LevelFilter::Error),
        _ => Err(DecompositionError::invalid_parameter(
            "log_level",
            format!("invalid log level `{level}`"),
        )),
    }
}
