use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum YteError {
    /// Malformed document. During a folder scan the file is skipped.
    #[error("cannot parse {}: {message}", file.display())]
    Parse { file: PathBuf, message: String },

    #[error("path '{path}' cannot be resolved in {}", file.display())]
    PathResolution { file: PathBuf, path: String },

    #[error("I/O error on {}: {source}", file.display())]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The value at `path` is gone or no longer a string since the folder was loaded.
    #[error("'{path}' in {} changed on disk; reload the folder", file.display())]
    StaleData { file: PathBuf, path: String },

    #[error("search term is empty")]
    EmptySearchTerm,

    #[error("invalid search term: {0}")]
    InvalidSearchTerm(String),

    #[error("no active search match; use find next first")]
    NoActiveMatch,

    #[error("no folder loaded")]
    NoFolder,

    #[error("item index {0} out of range")]
    ItemOutOfRange(usize),

    #[error("config error: {0}")]
    Config(String),

    #[error("backup failed: {0}")]
    Backup(String),
}

impl YteError {
    pub(crate) fn io(file: impl Into<PathBuf>, source: std::io::Error) -> Self {
        YteError::Io {
            file: file.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, YteError>;
