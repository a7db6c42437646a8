use std::error::Error as StdError;

use thiserror::Error;

/// Voicescript's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Voicescript's crate-wide error type.
///
/// The normalizer itself never fails; these variants cover the surfaces around it
/// (storage, recognizer capabilities, encoders and transcript files).
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    /// Input was well-formed but rejected by a domain rule.
    #[error("{0}")]
    Validation(String),

    #[error("document {0} not found")]
    NotFound(u64),

    /// The speech capability refused to start or stop (e.g. permission denied).
    #[error("recognizer error: {0}")]
    Recognizer(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a recognizer failure. Public so external capabilities can report errors.
    pub fn recognizer(message: impl Into<String>) -> Self {
        Self::Recognizer(message.into())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}
