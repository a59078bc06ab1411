//! Source and sink capabilities shared by every backend

pub mod factory;
pub mod traits;

pub use factory::{create_backend, create_log_store, Backend};
pub use traits::{CommitContext, ResultsSink, SeriesSource};
