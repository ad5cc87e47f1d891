use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported archive format")]
    UnsupportedFormat,

    #[error("archive is empty")]
    Empty,

    #[error("archive is corrupted: {0}")]
    Corrupted(String),

    #[error("entry path '{0}' is not a safe relative path")]
    InvalidPath(String),

    #[error("entry path '{0}' appears more than once")]
    DuplicateEntry(String),

    #[error("archive holds more than {limit} entries")]
    TooManyEntries { limit: usize },

    #[error("archive expands beyond {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("entry '{0}' not found")]
    EntryNotFound(String),

    #[error("entry '{path}' is not valid UTF-8")]
    NotUtf8 { path: String },

    #[error("entry '{path}' is not valid JSON: {source}")]
    Json {
        path:   String,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        match e {
            zip::result::ZipError::Io(io) => Self::Io(io),
            other => Self::Corrupted(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
