//! Tanya error type.
//!
//! Nothing on the query path is fatal: `EmptyQuery` and
//! `SynthesisUnavailable` are caught by the answer pipeline, which always
//! falls through to the guaranteed fallback tier. Only `Knowledge` errors
//! at startup (an empty or unreadable FAQ document) abort the process.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TanyaError {
    #[error("Config error: {0}")]
    Config(String),

    /// Knowledge-base failure. Fatal at startup when zero records parse.
    #[error("Knowledge base error: {0}")]
    Knowledge(String),

    /// The normalized query has no usable tokens. The pipeline catches
    /// this and short-circuits to the fallback tier.
    #[error("Query has no usable tokens")]
    EmptyQuery,

    /// The external text-generation service failed, timed out, or returned
    /// nothing. Always recoverable by the next fallback tier.
    #[error("Synthesis unavailable: {0}")]
    SynthesisUnavailable(String),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TanyaError>;
