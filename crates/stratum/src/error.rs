//! Error taxonomy for configuration lookup and validation.
//!
//! Every error names the view path it concerns, rendered in the same
//! dotted form views use for themselves, so a message like
//! `servers#0.port: must be a number, not str` points the user straight
//! at the offending entry.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while resolving or validating configuration values.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    /// No source provides a value at the requested path.
    #[error("{path} not found")]
    NotFound {
        /// Dotted path of the missing view.
        path: String,
    },

    /// A value exists but has the wrong type for the request.
    #[error("{path}: must be {expected}, not {actual}")]
    Type {
        /// Dotted path of the offending view.
        path: String,
        /// What was required, with its article ("a number", "a string").
        expected: String,
        /// Type name of what was actually found.
        actual: String,
    },

    /// A value has the right type but an unacceptable content.
    #[error("{path}: {message}")]
    Value {
        /// Dotted path of the offending view.
        path: String,
        /// What was wrong with the value.
        message: String,
    },

    /// A configuration file could not be read or parsed.
    #[error("configuration file {} could not be read: {message}", .file.display())]
    Read {
        /// The file that failed.
        file: PathBuf,
        /// Parser or I/O message.
        message: String,
        /// Line of a parse failure, when known.
        line: Option<usize>,
        /// Column of a parse failure, when known.
        col: Option<usize>,
    },

    /// A template is constructed in a way that can never validate.
    #[error("invalid template: {message}")]
    TemplateMisuse {
        /// What is wrong with the template itself.
        message: String,
    },
}

impl ConfigError {
    /// A not-found error for the view at `path`.
    pub fn not_found(path: impl Into<String>) -> Self {
        ConfigError::NotFound { path: path.into() }
    }

    /// A type error for the view at `path`. `expected` carries its own
    /// article ("a number"); `actual` is a bare type name ("str").
    pub fn type_error(
        path: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        ConfigError::Type {
            path: path.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// A value error for the view at `path`.
    pub fn value_error(path: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::Value {
            path: path.into(),
            message: message.into(),
        }
    }

    /// A template-misuse error.
    pub fn template_misuse(message: impl Into<String>) -> Self {
        ConfigError::TemplateMisuse {
            message: message.into(),
        }
    }

    pub(crate) fn read_yaml(file: PathBuf, err: stratum_yaml::Error) -> Self {
        ConfigError::Read {
            line: err.line(),
            col: err.col(),
            message: err.to_string(),
            file,
        }
    }

    pub(crate) fn read_io(file: PathBuf, err: std::io::Error) -> Self {
        ConfigError::Read {
            file,
            message: err.to_string(),
            line: None,
            col: None,
        }
    }
}
