use thiserror::Error;

/// A malformed telemetry log. Aborts the whole run; there is no
/// skip-and-continue mode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("parse error on 0-indexed row {row}: {message}")]
pub struct TraceParseError {
    /// 0-indexed row number within the CSV input.
    pub row: usize,
    pub message: String,
}

impl TraceParseError {
    pub fn new(row: usize, message: impl Into<String>) -> Self {
        Self {
            row,
            message: message.into(),
        }
    }
}
