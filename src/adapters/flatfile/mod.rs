//! Flat-file backend
//!
//! Reads a comma-separated source file and overwrites two comma-separated result
//! files per build. There is no checkpointing, so the backend always builds a single
//! job at the newest index.

pub mod format;
pub mod sink;
pub mod source;

pub use sink::{FlatFileSink, AGGREGATES_FILE, RESULTS_FILE};
pub use source::{parse_rows, FlatFileSource};
