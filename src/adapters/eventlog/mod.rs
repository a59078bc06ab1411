//! Event-log backend
//!
//! Each base stream name `s` maps to two streams: `s-source` holds ingested days and
//! checkpoint bookkeeping, `s-results` holds build markers and published results.
//!
//! - [`store`] - append-only log contract with expected-position appends
//! - [`memory`] / [`jsonl`] - in-memory and JSON-lines stores
//! - [`source`] - source replay and validation
//! - [`sink`] - the commit protocol
//! - [`published`] - typed read-back of the results stream

pub mod events;
pub mod ingest;
pub mod jsonl;
pub mod memory;
pub mod published;
pub mod sink;
pub mod source;
pub mod store;

pub use ingest::append_batch;
pub use jsonl::JsonlLogStore;
pub use memory::MemoryLogStore;
pub use published::{read_published, PublishedResults};
pub use sink::EventLogSink;
pub use source::EventLogSource;
pub use store::{ExpectedPosition, LogStore, NewEvent, RecordedEvent};
