//! Error types for the RTF ingestion pipeline.
//!
//! Almost nothing in RTF is fatal: malformed escapes fall back to defaults,
//! unknown control words and destinations are ignored, and unbalanced braces
//! are repaired in place. The only condition that surfaces as an error is a
//! stream whose first structural token is not a group start, because there is
//! no document to recover.

use std::fmt;

/// Errors that can occur while ingesting an RTF stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RtfError {
    /// The input is empty or does not open with a `{` group.
    NotRtf(String),
}

impl fmt::Display for RtfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RtfError::NotRtf(msg) => write!(f, "not an RTF document: {}", msg),
        }
    }
}

impl std::error::Error for RtfError {}

/// Result alias used throughout the pipeline.
pub type ParseResult<T> = Result<T, RtfError>;
