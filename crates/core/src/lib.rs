#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod pending;
pub mod selection;
pub mod time;
pub mod tree;

pub use error::Error;
pub use time::Clock;
