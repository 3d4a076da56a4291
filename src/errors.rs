//! Error types for date extraction.
//!
//! Most failures here are expected: a token simply does not start a date.
//! Callers treat everything except [`DateError::InvalidCalendarValue`] as
//! "no date at this position".

use thiserror::Error;

/// Errors that can occur while parsing or resolving a date expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    /// No date fragment starts at this position.
    #[error("no date expression at this position")]
    NoMatch,

    /// The phrase was structurally valid but carries no usable value,
    /// e.g. a lone "last" with the sentinel offset.
    #[error("date expression rejected as ambiguous: {reason}")]
    AmbiguousRejected { reason: &'static str },

    /// Resolution produced a calendar value that does not exist.
    #[error("invalid calendar value {year:04}-{month:02}-{day:02}")]
    InvalidCalendarValue { year: i32, month: i32, day: i32 },

    /// The recognizer re-entered itself more than the configured depth.
    #[error("recursion limit exceeded at depth {depth}")]
    RecursionLimitExceeded { depth: usize },

    /// A referent arena could not be written or read back.
    #[error("referent store: {0}")]
    Store(String),
}

impl DateError {
    /// True for the variants a caller should treat as a silent skip.
    pub fn is_no_match(&self) -> bool {
        !matches!(
            self,
            DateError::InvalidCalendarValue { .. } | DateError::Store(_)
        )
    }
}

/// Result type for date operations.
pub type DateResult<T> = Result<T, DateError>;
