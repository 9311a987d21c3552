use std::io;

use thiserror::Error;

use crate::confirm::ConfirmationToken;

/// Broad category of a [`PricingError`]. None of them is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The user has to resolve it (rename, or confirm an overwrite).
    ValidationRejected,
    NotFound,
    /// A stored payload could not be read back; defaults were used instead.
    PersistenceCorrupt,
    EstimationUnavailable,
    SpeechUnavailable,
    Storage,
}

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("project name must not be empty")]
    EmptyName,
    #[error("a project named `{name}` already exists")]
    DuplicateName {
        name: String,
        token: ConfirmationToken,
    },
    #[error("no project with id `{0}`")]
    NotFound(String),
    #[error("stored record `{key}` is unreadable: {reason}")]
    PersistenceCorrupt { key: String, reason: String },
    #[error("no suggestion available: {0}")]
    EstimationUnavailable(String),
    #[error("speech synthesis failed: {0}")]
    SpeechUnavailable(String),
    #[error("storage error: {0}")]
    Storage(#[from] io::Error),
}

impl PricingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyName | Self::DuplicateName { .. } => ErrorKind::ValidationRejected,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::PersistenceCorrupt { .. } => ErrorKind::PersistenceCorrupt,
            Self::EstimationUnavailable(_) => ErrorKind::EstimationUnavailable,
            Self::SpeechUnavailable(_) => ErrorKind::SpeechUnavailable,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }
}

pub type Result<T, E = PricingError> = std::result::Result<T, E>;
