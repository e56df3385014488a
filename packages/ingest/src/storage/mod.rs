//! Mode-aware persistence gateway.
//!
//! The store is the only shared mutable resource in the pipeline. All writes
//! are scoped to one partition: backfill checks `exists` and skips, refresh
//! calls `purge` (which commits before any insert of the same run), and each
//! fetched page is inserted and committed as its own batch so a
//! mid-pagination failure keeps the pages already written.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{NormalizedRecord, Partition, StoredRecord};

#[async_trait]
pub trait Store: Send + Sync {
    /// True iff at least one stored record matches the partition key.
    async fn exists(&self, key: &Partition) -> Result<bool>;

    /// Delete every stored record matching the partition key. Returns the
    /// number of rows removed. Durable once this returns.
    async fn purge(&self, key: &Partition) -> Result<u64>;

    /// Append one page's worth of normalized records, committed as a unit.
    async fn insert_batch(&self, records: &[NormalizedRecord]) -> Result<()>;

    /// All records for a district, newest report date first.
    async fn find_by_district(&self, district_name: &str) -> Result<Vec<StoredRecord>>;

    /// Total stored row count.
    async fn count(&self) -> Result<i64>;
}
