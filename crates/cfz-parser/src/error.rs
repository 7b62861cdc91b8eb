//! Error types for C parsing and extraction.

use crate::oracle::Diagnostic;

/// Errors that can occur while parsing C sources and extracting types.
#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    /// The oracle reported error-severity diagnostics. Extraction
    /// never returns partial maps on a parse failure.
    #[error("C source failed to parse: {}", summarize(.0))]
    ParseFailed(Vec<Diagnostic>),

    #[error("cannot read {path}: {source}")]
    ReadSource {
        path: String,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn summarize(diagnostics: &[Diagnostic]) -> String {
    let first = diagnostics
        .first()
        .map_or_else(|| "no diagnostics recorded".to_string(), ToString::to_string);
    if diagnostics.len() > 1 {
        format!("{first} (+{} more)", diagnostics.len() - 1)
    } else {
        first
    }
}
