//! Error types for repetiq-core.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),

    /// Configuration file not found after searching all locations.
    #[error("no configuration file found")]
    NotFound,
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading a lexicon table.
#[derive(Error, Debug)]
pub enum LexiconError {
    /// The lexicon file could not be opened or read.
    #[error("failed to read lexicon {path}")]
    Io {
        /// Path of the file that failed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file has no header row or the header lacks an `ortho` column.
    #[error("lexicon {path} has no usable header row")]
    MissingHeader {
        /// Path of the file that failed.
        path: Utf8PathBuf,
    },
}

/// Result type alias using [`LexiconError`].
pub type LexiconResult<T> = Result<T, LexiconError>;

/// Errors that can occur during repetition analysis.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The input text is empty or has no analyzable content.
    #[error("no analyzable text in input")]
    EmptyInput,

    /// A cluster parameter is outside its valid range.
    #[error("invalid {name}: {value} (must be >= {min})")]
    InvalidParameter {
        /// Parameter name as exposed to the caller.
        name: &'static str,
        /// The rejected value.
        value: usize,
        /// Lowest acceptable value.
        min: usize,
    },
}

/// Result type alias using [`AnalysisError`].
pub type AnalysisResult<T> = Result<T, AnalysisError>;
