//! CLI command implementations

pub mod build;
pub mod ingest;
pub mod status;
pub mod validate;
