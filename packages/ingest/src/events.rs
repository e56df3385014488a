//! Progress and result types emitted by the pipeline.

use serde::Serialize;

use crate::types::{IngestMode, Partition};

/// Terminal outcome of one partition job.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// Backfill found the partition already populated; nothing was touched.
    Skipped,
    /// The partition was ingested to completion.
    Completed { inserted: u64, skipped: u64 },
    /// All retry attempts failed, or a non-retryable error occurred. The
    /// partition is left in whatever state the last attempt produced.
    Failed { error: String, attempts: u32 },
}

/// Result of one submitted job, delivered on the queue's outcome channel.
#[derive(Debug, Clone, Serialize)]
pub struct JobResult {
    pub partition: Partition,
    pub mode: IngestMode,
    pub outcome: TaskOutcome,
}
