//! In-memory store implementation for testing and development.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;

use crate::storage::Store;
use crate::types::{NormalizedRecord, Partition, StoredRecord};

/// In-memory stand-in for the Postgres store. Data is lost on drop; useful
/// for tests and local development only.
#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<StoredRecord>>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn matches(row: &StoredRecord, key: &Partition) -> bool {
        row.state_name.as_deref() == Some(key.state_name.as_str())
            && row.fin_year.as_deref() == Some(key.fin_year.as_str())
            && row.month.as_deref() == Some(key.month.as_str())
    }

    /// Rows currently stored for one partition.
    pub fn partition_count(&self, key: &Partition) -> usize {
        self.rows
            .read()
            .unwrap()
            .iter()
            .filter(|r| Self::matches(r, key))
            .count()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn exists(&self, key: &Partition) -> Result<bool> {
        Ok(self
            .rows
            .read()
            .unwrap()
            .iter()
            .any(|r| Self::matches(r, key)))
    }

    async fn purge(&self, key: &Partition) -> Result<u64> {
        let mut rows = self.rows.write().unwrap();
        let before = rows.len();
        rows.retain(|r| !Self::matches(r, key));
        Ok((before - rows.len()) as u64)
    }

    async fn insert_batch(&self, records: &[NormalizedRecord]) -> Result<()> {
        let mut rows = self.rows.write().unwrap();
        for record in records {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            rows.push(StoredRecord::from_normalized(id, record.clone()));
        }
        Ok(())
    }

    async fn find_by_district(&self, district_name: &str) -> Result<Vec<StoredRecord>> {
        let mut found: Vec<StoredRecord> = self
            .rows
            .read()
            .unwrap()
            .iter()
            .filter(|r| r.district_name.as_deref() == Some(district_name))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.report_date.cmp(&a.report_date));
        Ok(found)
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.rows.read().unwrap().len() as i64)
    }
}
