//! Structured error types for ormtour-core.
//!
//! Uses `thiserror` so library consumers get composable errors, while the
//! `ormtour` binary wraps them in `anyhow` for context.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for ormtour-core operations
#[derive(Error, Debug)]
pub enum TourError {
    /// Query, pool or transaction failure reported by sqlx
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration bookkeeping failure reported by sqlx
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Config file is not valid TOML for [`crate::TourConfig`]
    #[error("invalid config file {path:?}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Database URL with a scheme no engine handles
    #[error("unsupported database URL '{url}' (expected postgres://, mysql:// or sqlite:)")]
    UnsupportedUrl { url: String },

    /// Migration version that is not part of the embedded revisions
    #[error("unknown revision '{target}'")]
    UnknownRevision { target: String },

    /// Migration target that could not be parsed or resolved
    #[error("invalid migration target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    /// Upgrade/downgrade pointed the wrong way relative to the current revision
    #[error("destination {destination} is {relation} current revision {current}")]
    Destination {
        destination: String,
        current: String,
        relation: &'static str,
    },

    /// Configuration error
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// Blocking runtime could not be created or was misused
    #[error("runtime error: {reason}")]
    Runtime { reason: String },
}

/// Result type alias for ormtour-core operations
pub type Result<T> = std::result::Result<T, TourError>;

impl TourError {
    /// Create an unsupported URL error
    pub fn unsupported_url(url: impl Into<String>) -> Self {
        Self::UnsupportedUrl { url: url.into() }
    }

    /// Create an unknown revision error
    pub fn unknown_revision(target: impl Into<String>) -> Self {
        Self::UnknownRevision {
            target: target.into(),
        }
    }

    /// Create an invalid target error
    pub fn invalid_target(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Create a runtime error
    pub fn runtime(reason: impl Into<String>) -> Self {
        Self::Runtime {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TourError::unsupported_url("oracle://db");
        assert!(err.to_string().contains("oracle://db"));
        assert!(err.to_string().contains("unsupported"));

        let err = TourError::invalid_target("+x", "step is not a number");
        assert_eq!(
            err.to_string(),
            "invalid migration target '+x': step is not a number"
        );

        let err = TourError::Destination {
            destination: "base".into(),
            current: "20221027174237".into(),
            relation: "behind",
        };
        assert_eq!(
            err.to_string(),
            "destination base is behind current revision 20221027174237"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let tour_err: TourError = io_err.into();

        assert!(matches!(tour_err, TourError::Io { .. }));
    }

    #[test]
    fn test_sqlx_error_conversion() {
        let tour_err: TourError = sqlx::Error::RowNotFound.into();
        assert!(matches!(tour_err, TourError::Sqlx(_)));
    }
}
