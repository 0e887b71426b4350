use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

use crate::sequencer::NavError;
use crate::tags::TagField;

/// Tagwright's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Tagwright's crate-wide error type.
///
/// This is intentionally decoupled from `anyhow` so the library API stays typed. The audio
/// pipeline uses `anyhow` internally and is flattened into `Error::Message` at the boundary.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Navigation(#[from] NavError),

    #[error("no file at index {0}")]
    NoSuchFile(usize),

    /// A filename template references a field the file does not carry.
    #[error("field `{field}` is not set on {}", path.display())]
    FieldMissing { field: TagField, path: PathBuf },

    #[error("field `{field}` on {} is not a number: {value:?}", path.display())]
    NotANumber {
        field: TagField,
        value: String,
        path: PathBuf,
    },

    #[error("invalid filename template {template:?}: {reason}")]
    InvalidTemplate { template: String, reason: String },

    /// Writing tags back to disk failed. Files persisted before this one stay written.
    #[error("failed to write tags to {}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// True when the error chain holds an `io::ErrorKind::Interrupted`, which is how terminal
    /// prompts report Ctrl-C.
    pub fn is_interrupted(&self) -> bool {
        // `Other` is transparent, so its own `source()` would skip the boxed error itself.
        let mut current: Option<&(dyn StdError + 'static)> = match self {
            Error::Other(inner) => Some(inner.as_ref()),
            other => Some(other),
        };

        while let Some(err) = current {
            if err
                .downcast_ref::<std::io::Error>()
                .is_some_and(|io| io.kind() == std::io::ErrorKind::Interrupted)
            {
                return true;
            }
            current = err.source();
        }
        false
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

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<lofty::error::LoftyError> for Error {
    fn from(err: lofty::error::LoftyError) -> Self {
        Self::Other(Box::new(err))
    }
}
