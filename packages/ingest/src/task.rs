//! Per-partition ingestion task.
//!
//! One task owns the full lifecycle of one (state, fiscal year, month)
//! partition: mode check, optional purge, the page fetch loop, per-record
//! normalization and page-batched persistence. Network failures are retried
//! from the top of the task with exponential backoff; the purge-then-insert
//! sequence is repeatable, so a retried attempt redoes work but cannot
//! duplicate rows.

use thiserror::Error;
use tracing::{error, info, warn};

use datagov_client::ClientError;

use crate::events::TaskOutcome;
use crate::fetch::{RecordSource, PAGE_SIZE};
use crate::normalize::normalize;
use crate::retry::BackoffPolicy;
use crate::storage::Store;
use crate::types::{IngestMode, Partition};

#[derive(Debug, Error)]
pub enum TaskError {
    /// Upstream HTTP failure. Retryable classification comes from the client.
    #[error(transparent)]
    Fetch(#[from] ClientError),
    /// Store failure or other unexpected condition. Never retried.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Execute one ingestion attempt for a partition.
///
/// Backfill skips the partition outright when it is already populated;
/// refresh purges it first. Pages are fetched sequentially and each page is
/// committed before the next fetch, so a mid-pagination failure preserves
/// the pages already written.
pub async fn run_partition(
    source: &dyn RecordSource,
    store: &dyn Store,
    key: &Partition,
    mode: IngestMode,
) -> Result<TaskOutcome, TaskError> {
    match mode {
        IngestMode::Backfill => {
            if store.exists(key).await? {
                info!(partition = %key, "Skipping backfill, partition already populated");
                return Ok(TaskOutcome::Skipped);
            }
        }
        IngestMode::Refresh => {
            let purged = store.purge(key).await?;
            info!(partition = %key, purged, "Purged existing partition rows");
        }
    }

    let mut offset: u64 = 0;
    let mut total: u64 = 0;
    let mut inserted: u64 = 0;
    let mut skipped: u64 = 0;

    loop {
        let page = source.fetch_page(key, offset, PAGE_SIZE).await?;

        if offset == 0 {
            total = page.total;
            if total == 0 {
                info!(partition = %key, "No records found upstream");
                break;
            }
        }

        // An empty page before the reported total is an upstream
        // inconsistency; stop rather than loop forever.
        if page.is_empty() {
            warn!(partition = %key, offset, total, "Empty page before reported total");
            break;
        }

        let fetched = page.len() as u64;
        info!(partition = %key, offset, count = fetched, total, "Fetched page");

        let mut batch = Vec::with_capacity(page.records.len());
        for value in page.records {
            match normalize(value) {
                Ok(record) => batch.push(record),
                Err(reason) => {
                    skipped += 1;
                    warn!(partition = %key, %reason, "Skipping record");
                }
            }
        }

        store.insert_batch(&batch).await?;
        inserted += batch.len() as u64;
        info!(partition = %key, committed = batch.len(), "Committed page");

        offset += fetched;
        if offset >= total {
            break;
        }
    }

    info!(partition = %key, inserted, skipped, "Task complete");
    Ok(TaskOutcome::Completed { inserted, skipped })
}

/// Run a partition task under the retry policy.
///
/// Only transient fetch failures restart the task; store failures and
/// non-retryable API errors fail it immediately. Retries restart from the
/// beginning of the partition, not mid-page.
pub async fn run_with_retry(
    source: &dyn RecordSource,
    store: &dyn Store,
    key: &Partition,
    mode: IngestMode,
    policy: &BackoffPolicy,
) -> TaskOutcome {
    let mut attempt: u32 = 1;
    loop {
        info!(partition = %key, ?mode, attempt, "Starting ingestion task");
        match run_partition(source, store, key, mode).await {
            Ok(outcome) => return outcome,
            Err(TaskError::Fetch(e)) if e.is_retryable() => {
                match policy.delay_after(attempt) {
                    Some(delay) => {
                        warn!(
                            partition = %key,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "Transient fetch failure, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    None => {
                        error!(partition = %key, attempt, error = %e, "Retry attempts exhausted");
                        return TaskOutcome::Failed {
                            error: e.to_string(),
                            attempts: attempt,
                        };
                    }
                }
            }
            Err(e) => {
                // Non-retryable API errors and store failures end the task.
                // The partition may be left purged-but-unfilled; the next
                // refresh run repairs it.
                error!(partition = %key, attempt, error = %e, "Task failed");
                return TaskOutcome::Failed {
                    error: e.to_string(),
                    attempts: attempt,
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use datagov_client::RecordPage;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn record(state: &str, fin_year: &str, month: &str, district: &str) -> serde_json::Value {
        json!({
            "fin_year": fin_year,
            "month": month,
            "state_name": state,
            "district_name": district,
            "Wages": "12.5",
            "Total_No_of_Workers": "100",
        })
    }

    fn key() -> Partition {
        Partition::new("UTTAR PRADESH", "2023-2024", "June")
    }

    /// Serves slices of a fixed record set, optionally failing the first N
    /// calls with a retryable error.
    struct MockSource {
        records: Vec<serde_json::Value>,
        reported_total: u64,
        calls: AtomicU32,
        fail_first: AtomicU32,
    }

    impl MockSource {
        fn new(records: Vec<serde_json::Value>) -> Self {
            let total = records.len() as u64;
            Self {
                records,
                reported_total: total,
                calls: AtomicU32::new(0),
                fail_first: AtomicU32::new(0),
            }
        }

        fn with_reported_total(mut self, total: u64) -> Self {
            self.reported_total = total;
            self
        }

        fn failing_first(self, n: u32) -> Self {
            self.fail_first.store(n, Ordering::SeqCst);
            self
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RecordSource for MockSource {
        async fn fetch_page(
            &self,
            _key: &Partition,
            offset: u64,
            limit: u64,
        ) -> Result<RecordPage, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if self
                .fail_first
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(ClientError::Api {
                    status: 503,
                    message: "service unavailable".into(),
                });
            }

            let start = (offset as usize).min(self.records.len());
            let end = (start + limit as usize).min(self.records.len());
            Ok(RecordPage {
                total: self.reported_total,
                records: self.records[start..end].to_vec(),
            })
        }
    }

    #[tokio::test]
    async fn pagination_terminates_at_reported_total() {
        let records: Vec<_> = (0..2500)
            .map(|i| record("UTTAR PRADESH", "2023-2024", "June", &format!("D{i}")))
            .collect();
        let source = MockSource::new(records);
        let store = MemoryStore::new();

        let outcome = run_partition(&source, &store, &key(), IngestMode::Backfill)
            .await
            .unwrap();

        assert_eq!(source.calls(), 3);
        match outcome {
            TaskOutcome::Completed { inserted, skipped } => {
                assert_eq!(inserted, 2500);
                assert_eq!(skipped, 0);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(store.count().await.unwrap(), 2500);
    }

    #[tokio::test]
    async fn zero_total_completes_without_further_fetches() {
        let source = MockSource::new(vec![]);
        let store = MemoryStore::new();

        let outcome = run_partition(&source, &store, &key(), IngestMode::Refresh)
            .await
            .unwrap();

        assert_eq!(source.calls(), 1);
        assert!(matches!(
            outcome,
            TaskOutcome::Completed {
                inserted: 0,
                skipped: 0
            }
        ));
    }

    #[tokio::test]
    async fn empty_page_before_reported_total_terminates_early() {
        let records: Vec<_> = (0..1000)
            .map(|i| record("UTTAR PRADESH", "2023-2024", "June", &format!("D{i}")))
            .collect();
        // Upstream claims more rows than it can deliver.
        let source = MockSource::new(records).with_reported_total(2000);
        let store = MemoryStore::new();

        let outcome = run_partition(&source, &store, &key(), IngestMode::Backfill)
            .await
            .unwrap();

        assert_eq!(source.calls(), 2);
        assert!(matches!(
            outcome,
            TaskOutcome::Completed { inserted: 1000, .. }
        ));
    }

    #[tokio::test]
    async fn backfill_is_idempotent() {
        let records = vec![record("UTTAR PRADESH", "2023-2024", "June", "AGRA")];
        let source = MockSource::new(records);
        let store = MemoryStore::new();

        run_partition(&source, &store, &key(), IngestMode::Backfill)
            .await
            .unwrap();
        let count_after_first = store.count().await.unwrap();

        let outcome = run_partition(&source, &store, &key(), IngestMode::Backfill)
            .await
            .unwrap();

        assert!(matches!(outcome, TaskOutcome::Skipped));
        assert_eq!(store.count().await.unwrap(), count_after_first);
        // The skip short-circuits before any fetch.
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn refresh_fully_replaces_partition_data() {
        let store = MemoryStore::new();

        let first = MockSource::new(vec![
            record("UTTAR PRADESH", "2023-2024", "June", "AGRA"),
            record("UTTAR PRADESH", "2023-2024", "June", "MATHURA"),
        ]);
        run_partition(&first, &store, &key(), IngestMode::Refresh)
            .await
            .unwrap();

        let second = MockSource::new(vec![record(
            "UTTAR PRADESH",
            "2023-2024",
            "June",
            "LUCKNOW",
        )]);
        run_partition(&second, &store, &key(), IngestMode::Refresh)
            .await
            .unwrap();

        // Only the second run's rows survive.
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(store.find_by_district("AGRA").await.unwrap().is_empty());
        assert_eq!(store.find_by_district("LUCKNOW").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn purge_scope_is_partition_isolated() {
        let store = MemoryStore::new();

        let june = MockSource::new(vec![record("UTTAR PRADESH", "2023-2024", "June", "AGRA")]);
        run_partition(&june, &store, &key(), IngestMode::Refresh)
            .await
            .unwrap();

        let july_key = Partition::new("UTTAR PRADESH", "2023-2024", "July");
        let july = MockSource::new(vec![record("UTTAR PRADESH", "2023-2024", "July", "AGRA")]);
        run_partition(&july, &store, &july_key, IngestMode::Refresh)
            .await
            .unwrap();

        // Refreshing June again must not touch July's rows.
        let june_again = MockSource::new(vec![record("UTTAR PRADESH", "2023-2024", "June", "AGRA")]);
        run_partition(&june_again, &store, &key(), IngestMode::Refresh)
            .await
            .unwrap();

        assert_eq!(store.partition_count(&july_key), 1);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn invalid_records_are_skipped_not_fatal() {
        let mut bad_date = record("UTTAR PRADESH", "2023-2024", "June", "AGRA");
        bad_date["month"] = json!("Juneuary");
        let bad_shape = json!({"fin_year": 12345});

        let source = MockSource::new(vec![
            record("UTTAR PRADESH", "2023-2024", "June", "MATHURA"),
            bad_date,
            bad_shape,
        ]);
        let store = MemoryStore::new();

        let outcome = run_partition(&source, &store, &key(), IngestMode::Backfill)
            .await
            .unwrap();

        match outcome {
            TaskOutcome::Completed { inserted, skipped } => {
                assert_eq!(inserted, 1);
                assert_eq!(skipped, 2);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn transient_failures_retry_and_recover() {
        let records = vec![record("UTTAR PRADESH", "2023-2024", "June", "AGRA")];
        let source = MockSource::new(records).failing_first(2);
        let store = MemoryStore::new();
        let policy = BackoffPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(1),
            multiplier: 2.0,
        };

        let outcome =
            run_with_retry(&source, &store, &key(), IngestMode::Refresh, &policy).await;

        assert!(matches!(outcome, TaskOutcome::Completed { inserted: 1, .. }));
        // Two failed attempts plus the successful one.
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn retry_ceiling_surfaces_failure() {
        let source = MockSource::new(vec![]).failing_first(u32::MAX);
        let store = MemoryStore::new();
        let policy = BackoffPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            multiplier: 2.0,
        };

        let outcome =
            run_with_retry(&source, &store, &key(), IngestMode::Backfill, &policy).await;

        match outcome {
            TaskOutcome::Failed { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn non_retryable_error_fails_immediately() {
        struct Forbidden;

        #[async_trait]
        impl RecordSource for Forbidden {
            async fn fetch_page(
                &self,
                _key: &Partition,
                _offset: u64,
                _limit: u64,
            ) -> Result<RecordPage, ClientError> {
                Err(ClientError::Api {
                    status: 403,
                    message: "invalid api key".into(),
                })
            }
        }

        let store = MemoryStore::new();
        let policy = BackoffPolicy::default();

        let outcome =
            run_with_retry(&Forbidden, &store, &key(), IngestMode::Backfill, &policy).await;

        match outcome {
            TaskOutcome::Failed { attempts, .. } => assert_eq!(attempts, 1),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
