use std::path::PathBuf;

use chrono::{DateTime, Utc};
use datewin_core::clock::{Clock, FixedClock, SystemClock};
use datewin_core::months::MonthOverflow;
use datewin_core::types::Timestamp;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Checker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// JSON rule table.
    pub rules_path: PathBuf,
    /// JSON array of record objects.
    pub records_path: PathBuf,
    /// Pinned evaluation instant; `None` reads the wall clock.
    pub now: Option<Timestamp>,
    /// Month-end policy for window arithmetic (default: `clamp`).
    pub overflow: MonthOverflow,
}

impl CheckConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var          | Default      |
    /// |------------------|--------------|
    /// | `RULES_PATH`     | (required)   |
    /// | `RECORDS_PATH`   | (required)   |
    /// | `VALIDATION_NOW` | wall clock   |
    /// | `MONTH_OVERFLOW` | `clamp`      |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`CheckConfig::from_env`] with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |var: &'static str| {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(var))
        };

        let rules_path = PathBuf::from(required("RULES_PATH")?);
        let records_path = PathBuf::from(required("RECORDS_PATH")?);

        let now = match lookup("VALIDATION_NOW").filter(|v| !v.trim().is_empty()) {
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(raw.trim())
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| ConfigError::Invalid {
                        var: "VALIDATION_NOW",
                        reason: e.to_string(),
                    })?,
            ),
            None => None,
        };

        let overflow = match lookup("MONTH_OVERFLOW").filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw.parse::<MonthOverflow>().map_err(|e: datewin_core::error::CoreError| {
                ConfigError::Invalid {
                    var: "MONTH_OVERFLOW",
                    reason: e.to_string(),
                }
            })?,
            None => MonthOverflow::default(),
        };

        Ok(Self {
            rules_path,
            records_path,
            now,
            overflow,
        })
    }

    /// The clock this configuration asks for.
    pub fn clock(&self) -> RunClock {
        match self.now {
            Some(ts) => RunClock::Fixed(FixedClock(ts)),
            None => RunClock::System(SystemClock),
        }
    }
}

/// Clock chosen at startup: pinned by `VALIDATION_NOW` or the wall clock.
#[derive(Debug, Clone, Copy)]
pub enum RunClock {
    System(SystemClock),
    Fixed(FixedClock),
}

impl Clock for RunClock {
    fn now(&self) -> Timestamp {
        match self {
            Self::System(c) => c.now(),
            Self::Fixed(c) => c.now(),
        }
    }
}
