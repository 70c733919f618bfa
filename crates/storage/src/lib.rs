#![forbid(unsafe_code)]

pub mod http;
pub mod repository;

pub use http::{ApiConfig, HttpCategoryRepository};
pub use repository::{
    CategoryRepository, CategoryUpdate, InMemoryRepository, NewCategoryRecord, Storage,
    StorageError,
};
