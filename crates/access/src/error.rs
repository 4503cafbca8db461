use std::{io, path::PathBuf};

use thiserror::Error;

/// Why a rename or delete did not happen. The `Display` text is what the
/// user gets to see.
#[derive(Debug, Error)]
pub enum MutationError {
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("A file named {} already exists", path.display())]
    NameCollision { path: PathBuf },

    #[error("Invalid file name: {reason}")]
    InvalidName { reason: &'static str },

    #[error("The new name is the same as the current one")]
    Unchanged,

    #[error("{} is not in the media index", path.display())]
    IndexEntryMissing { path: PathBuf },

    #[error("No media index is available for indexed storage access")]
    IndexUnavailable,

    #[error("The media index refused to update {}", path.display())]
    IndexRejected { path: PathBuf },

    #[error("Copy of {} is incomplete ({actual} of {expected} bytes)", path.display())]
    SizeMismatch {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("Could not {op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        source: io::Error,
    },

    #[error("Media index error: {0:#}")]
    Index(#[from] anyhow::Error),
}

impl MutationError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        MutationError::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// Whether the failure comes from what the user asked for rather than
    /// from the storage layer.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            MutationError::NotFound { .. }
                | MutationError::NameCollision { .. }
                | MutationError::InvalidName { .. }
                | MutationError::Unchanged
        )
    }
}

pub type MutationResult<T> = Result<T, MutationError>;
