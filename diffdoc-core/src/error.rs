//! Error types for diffdoc-core.
//!
//! Per-artifact processing never fails: decode problems are replaced, lexer
//! failures fall back to plain text and style misses use defaults. These
//! errors only surface while configuring an engine, or internally where a
//! failure is caught and turned into a fallback.

use thiserror::Error;

/// Result type alias for diffdoc-core operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while configuring or running the engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The configured text encoding label is not known.
    #[error("Unknown text encoding: {label}")]
    UnknownEncoding {
        /// Label as given in the configuration.
        label: String,
    },

    /// The configured alignment algorithm name is not known.
    #[error("Unknown alignment algorithm: {name}")]
    UnknownAlgorithm {
        /// Name as given in the configuration.
        name: String,
    },

    /// A lexer failed to tokenize a line.
    #[error("Tokenizer error in {lexer}: {message}")]
    Tokenize {
        /// Name of the lexer that failed.
        lexer: String,
        /// Description of the failure.
        message: String,
    },

    /// The rayon pool for batch processing could not be built.
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl EngineError {
    pub(crate) fn tokenize(lexer: &str, err: impl std::fmt::Display) -> Self {
        EngineError::Tokenize {
            lexer: lexer.to_string(),
            message: err.to_string(),
        }
    }
}
