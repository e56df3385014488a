//! MGNREGA district performance ingestion pipeline.
//!
//! Periodically pulls a paginated government open-data series (labor and
//! employment statistics keyed by state, fiscal year, and month) into a
//! queryable Postgres table. Two ingestion modes: idempotent historical
//! backfill (skip partitions that already hold data) and destructive
//! current-period refresh (delete-then-insert).
//!
//! Pipeline shape, per partition: mode check or purge → paginated fetch →
//! per-record normalization and fiscal date derivation → page-batched
//! insert. Tasks run on a worker pool behind an in-process queue with a
//! global rate ceiling and task-level retry with exponential backoff.

pub mod config;
pub mod events;
pub mod fetch;
pub mod fiscal;
pub mod jobs;
pub mod normalize;
pub mod queue;
pub mod retry;
pub mod storage;
pub mod task;
pub mod types;

pub use config::IngestConfig;
pub use events::{JobResult, TaskOutcome};
pub use fetch::{DataGovSource, RecordSource, PAGE_SIZE};
pub use jobs::JobPlan;
pub use queue::{IngestJob, JobQueue, QueueConfig};
pub use retry::BackoffPolicy;
pub use storage::{MemoryStore, PostgresStore, Store};
pub use types::{IngestMode, NormalizedRecord, Partition, RawRecord, StoredRecord};
