#![forbid(unsafe_code)]

pub mod category_service;
pub mod commit;
pub mod error;
pub mod picker;

pub use category_service::CategoryService;
pub use commit::{CommitFailure, CommitReport, CreatedCategory, commit_all};
pub use error::{CategoryServiceError, PickerError};
pub use picker::{CategoryPicker, ChecklistRow, PendingRow};
