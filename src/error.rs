use crate::directive::IncludeKind;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for flatinc operations
#[derive(Error, Debug)]
pub enum FlatincError {
    /// Root input file could not be opened for reading
    #[error("Cannot open input file {path}: {source}")]
    OpenInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Output file could not be opened for writing
    #[error("Cannot open output file {path}: {source}")]
    OpenOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Include directive that matched no search location
    #[error("unknown include file {include} at file {} at line {line}", .file.display())]
    UnresolvedInclude {
        include: String,
        kind: IncludeKind,
        file: PathBuf,
        line: usize,
    },

    /// Include nesting went past the configured limit
    #[error("Include depth limit of {limit} exceeded at file {} at line {line}", .file.display())]
    DepthExceeded {
        file: PathBuf,
        line: usize,
        limit: usize,
    },

    /// IO error while reading an input or writing the output
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Regex compilation error
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FlatincError>;
