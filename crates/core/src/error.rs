use thiserror::Error;

use crate::model::{CategoryError, ParseIdError};
use crate::pending::PendingTreeError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Category(#[from] CategoryError),
    #[error(transparent)]
    PendingTree(#[from] PendingTreeError),
    #[error(transparent)]
    ParseId(#[from] ParseIdError),
}
