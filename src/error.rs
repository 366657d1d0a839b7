//! Error types for configuration, input validation, and output writing.

use std::io;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use thiserror::Error;

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"battery.reserve"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Malformed input series, detected before a run starts.
#[derive(Debug, Error)]
pub enum InputError {
    #[error(
        "column length mismatch: {timestamps} timestamps, {production} production values, \
         {consumption} consumption values"
    )]
    LengthMismatch {
        timestamps: usize,
        production: usize,
        consumption: usize,
    },

    #[error("timestamps out of order at index {index}: {current} follows {previous}")]
    NonMonotonic {
        index: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },

    #[error("invalid {field} at index {index}: {value} (expected a finite value >= 0)")]
    InvalidValue {
        field: &'static str,
        index: usize,
        value: f64,
    },

    #[error("cannot read \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed CSV in \"{}\": {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("no files matching \"Export CSV *{interval}*.csv\" in \"{}\"", dir.display())]
    NoInputFiles { dir: PathBuf, interval: String },
}

/// Top-level error for a complete run.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Every violation found by scenario validation.
    #[error("invalid scenario:\n{}", bullet_list(.0))]
    InvalidConfig(Vec<ConfigError>),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("failed to write \"{}\": {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode JSON report: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<Vec<ConfigError>> for SimError {
    fn from(errors: Vec<ConfigError>) -> Self {
        Self::InvalidConfig(errors)
    }
}

fn bullet_list(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(|e| format!("  {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display_includes_field() {
        let e = ConfigError::new("battery.reserve", "must be in [0.0, 1.0]");
        assert_eq!(
            e.to_string(),
            "config error: battery.reserve: must be in [0.0, 1.0]"
        );
    }

    #[test]
    fn invalid_config_lists_every_violation() {
        let err = SimError::from(vec![
            ConfigError::new("a", "first"),
            ConfigError::new("b", "second"),
        ]);
        let text = err.to_string();
        assert!(text.contains("a: first"));
        assert!(text.contains("b: second"));
        assert_eq!(text.lines().count(), 3);
    }
}
