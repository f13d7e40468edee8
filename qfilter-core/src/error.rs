//! Error types for qfilter operations.

use thiserror::Error;

/// Result type alias using qfilter's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building filters or rotating sequences.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid construction input (missing condition, blank raw filter, empty list).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A raw filter took part in a combination. Raw filters are terminal.
    #[error("raw filter can't be combined with other filters or conditions: {raw}")]
    FilterModificationForbidden { raw: String },

    /// Advancing the circular sequence would complete a full cycle.
    #[error("circle detected: position {position} was already visited")]
    CircleDetected { position: usize },

    /// Operation not valid for the current state.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Raw filter text could not be read as JSON.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// Client settings could not be loaded or failed validation.
    #[error("config error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::FilterModificationForbidden {
            raw: r#"{"must":[]}"#.to_string(),
        };
        assert_eq!(
            err.to_string(),
            r#"raw filter can't be combined with other filters or conditions: {"must":[]}"#
        );

        let err = Error::CircleDetected { position: 2 };
        assert_eq!(err.to_string(), "circle detected: position 2 was already visited");
    }
}
