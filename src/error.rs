//! Crate error type.
//!
//! The optimizer itself never fails on a well-formed instance: bad
//! assignments only lower fitness. Errors come from the edges of the
//! crate, namely configuration, instance construction and file I/O.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors raised outside the evolutionary loop.
#[derive(Debug, Error)]
pub enum Error {
    /// A run configuration parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The problem instance failed structural validation.
    #[error("invalid problem instance: {}", summarize(.0))]
    InvalidInstance(Vec<ValidationError>),

    /// Reading an input file or writing a report failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON input could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, Error>;

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_invalid_instance_message_lists_errors() {
        let err = Error::InvalidInstance(vec![
            ValidationError {
                kind: ValidationErrorKind::DimensionMismatch,
                message: "room capacities: expected 3 entries, found 2".into(),
            },
            ValidationError {
                kind: ValidationErrorKind::EmptyDimension,
                message: "instance has no time slots".into(),
            },
        ]);
        let msg = err.to_string();
        assert!(msg.contains("expected 3 entries"));
        assert!(msg.contains("no time slots"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
