//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use study_core::model::CategoryError;
use study_core::pending::PendingTreeError;

/// Errors emitted by `CategoryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CategoryServiceError {
    #[error(transparent)]
    Category(#[from] CategoryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `CategoryPicker`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PickerError {
    #[error("no drafted categories to save")]
    NothingToSave,
    #[error(transparent)]
    Pending(#[from] PendingTreeError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
