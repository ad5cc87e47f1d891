use thiserror::Error;

/// Failure of one export retrieval.
///
/// Every waiter of a retrieval receives a clone of the same value, so the
/// stage errors are carried as rendered messages.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RetrieveError {
    #[error("invalid resource key {0:?}")]
    InvalidKey(String),

    #[error("export info request failed: {0}")]
    Metadata(String),

    #[error("export download failed: {0}")]
    Transport(String),

    #[error("export archive could not be decoded: {0}")]
    Decode(String),

    #[error("retrieval ended without an outcome")]
    Abandoned,
}

impl RetrieveError {
    /// The collaborator's own message, without the stage prefix.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Metadata(m) | Self::Transport(m) | Self::Decode(m) => Some(m),
            Self::InvalidKey(_) | Self::Abandoned => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path:   std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        field:  &'static str,
        reason: &'static str,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

pub type Result<T, E = RetrieveError> = std::result::Result<T, E>;
