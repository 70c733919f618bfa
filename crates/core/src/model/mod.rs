mod category;
mod ids;

pub use category::{CategoryError, CategoryKind, CategoryName, CategoryNode};
pub use ids::{CategoryId, CategoryRef, ParseIdError, PendingId, PENDING_PREFIX};
