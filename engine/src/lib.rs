pub mod app;
pub mod error;
mod pagination;
pub use pagination::{PageBounds, Pagination};
pub mod stream;
