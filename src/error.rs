// File: src/error.rs
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, DecypherError>;

/// Everything the engine can report back to its caller. None of these stop
/// the process on their own; the binary decides whether to halt or skip.
#[derive(Debug, Error)]
pub enum DecypherError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("malformed tally record on line {line}: {reason}")]
    MalformedTally { line: usize, reason: String },

    #[error("tally contains no n-gram counts")]
    EmptyTally,

    /// The tally loaded fine but is too small to score text with.
    #[error("tally total {total} is below the required minimum of {minimum}, please input a larger tally")]
    InsufficientTally { total: u64, minimum: u64 },

    #[error("ciphertext contains no letters to analyze")]
    NoCipherWords,

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
}

impl DecypherError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read { path: path.into(), source }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write { path: path.into(), source }
    }
}
