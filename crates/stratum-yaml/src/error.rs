//! Parse errors with line/column context.

use thiserror::Error;

/// Result type alias for stratum-yaml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while adapting YAML text into a value tree.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    /// The text is not valid YAML.
    #[error("{message}")]
    Parse {
        /// Scanner message, including its own position rendering.
        message: String,
        /// 1-based line of the failure, when the scanner reports one.
        line: Option<usize>,
        /// 0-based column of the failure, when the scanner reports one.
        col: Option<usize>,
    },

    /// The document parsed but cannot be represented as a value tree
    /// (e.g. a mapping key that is itself a collection).
    #[error("invalid document structure: {message}")]
    InvalidStructure {
        /// What was wrong with the shape.
        message: String,
    },
}

impl Error {
    /// The line the error occurred on, if known.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Parse { line, .. } => *line,
            Error::InvalidStructure { .. } => None,
        }
    }

    /// The column the error occurred on, if known.
    pub fn col(&self) -> Option<usize> {
        match self {
            Error::Parse { col, .. } => *col,
            Error::InvalidStructure { .. } => None,
        }
    }
}

impl From<yaml_rust2::ScanError> for Error {
    fn from(err: yaml_rust2::ScanError) -> Self {
        let marker = *err.marker();
        Error::Parse {
            message: err.to_string(),
            line: Some(marker.line()),
            col: Some(marker.col()),
        }
    }
}
