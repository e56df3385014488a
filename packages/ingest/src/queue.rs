//! In-process job queue and worker pool.
//!
//! The queue is the message-passing boundary between job enumeration and
//! task execution: callers only `submit` jobs and read results from the
//! outcome channel. Workers share a global rate limiter so the aggregate
//! task start rate respects the upstream API quota, and a per-partition
//! lease so two jobs for the same partition can never interleave their
//! purge/insert sequences.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::sync::{mpsc, Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::events::JobResult;
use crate::fetch::RecordSource;
use crate::retry::BackoffPolicy;
use crate::storage::Store;
use crate::task::run_with_retry;
use crate::types::{IngestMode, Partition};

/// One unit of submittable work.
#[derive(Debug, Clone)]
pub struct IngestJob {
    pub partition: Partition,
    pub mode: IngestMode,
}

#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub workers: usize,
    /// Global ceiling on task starts across all workers.
    pub tasks_per_minute: u32,
    pub backoff: BackoffPolicy,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            tasks_per_minute: 60,
            backoff: BackoffPolicy::default(),
        }
    }
}

/// Minimum-spacing rate limiter shared by all workers.
struct RateLimiter {
    interval: Duration,
    next_slot: Mutex<Instant>,
}

impl RateLimiter {
    fn per_minute(tasks: u32) -> Self {
        let tasks = tasks.max(1);
        Self {
            interval: Duration::from_secs(60) / tasks,
            next_slot: Mutex::new(Instant::now()),
        }
    }

    /// Wait for the next available start slot.
    async fn acquire(&self) {
        let slot = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = (*next).max(now);
            *next = slot + self.interval;
            slot
        };
        tokio::time::sleep_until(slot).await;
    }
}

/// Mutual exclusion keyed by partition tuple. Job enumeration should not
/// produce duplicate partitions, but the queue does not rely on that.
#[derive(Default)]
struct PartitionLeases {
    held: std::sync::Mutex<HashSet<Partition>>,
    freed: Notify,
}

impl PartitionLeases {
    async fn acquire(self: &Arc<Self>, key: &Partition) -> LeaseGuard {
        loop {
            // Register for wakeup before checking, so a release between the
            // check and the await is not missed.
            let freed = self.freed.notified();
            if self.held.lock().unwrap().insert(key.clone()) {
                return LeaseGuard {
                    leases: Arc::clone(self),
                    key: key.clone(),
                };
            }
            debug!(partition = %key, "Waiting for partition lease");
            freed.await;
        }
    }
}

struct LeaseGuard {
    leases: Arc<PartitionLeases>,
    key: Partition,
}

impl Drop for LeaseGuard {
    fn drop(&mut self) {
        self.leases.held.lock().unwrap().remove(&self.key);
        self.leases.freed.notify_waiters();
    }
}

/// Handle for submitting jobs to the worker pool.
pub struct JobQueue {
    tx: mpsc::UnboundedSender<IngestJob>,
    workers: Vec<JoinHandle<()>>,
}

impl JobQueue {
    /// Spawn the worker pool. Returns the queue handle and the channel on
    /// which every submitted job's result is delivered.
    pub fn start(
        source: Arc<dyn RecordSource>,
        store: Arc<dyn Store>,
        config: QueueConfig,
    ) -> (Self, mpsc::UnboundedReceiver<JobResult>) {
        let (tx, rx) = mpsc::unbounded_channel::<IngestJob>();
        let rx = Arc::new(Mutex::new(rx));
        let (result_tx, result_rx) = mpsc::unbounded_channel();

        let limiter = Arc::new(RateLimiter::per_minute(config.tasks_per_minute));
        let leases = Arc::new(PartitionLeases::default());

        let workers = (0..config.workers.max(1))
            .map(|worker_id| {
                let rx = Arc::clone(&rx);
                let source = Arc::clone(&source);
                let store = Arc::clone(&store);
                let limiter = Arc::clone(&limiter);
                let leases = Arc::clone(&leases);
                let backoff = config.backoff.clone();
                let result_tx = result_tx.clone();
                tokio::spawn(async move {
                    worker_loop(
                        worker_id, rx, source, store, limiter, leases, backoff, result_tx,
                    )
                    .await;
                })
            })
            .collect();

        (Self { tx, workers }, result_rx)
    }

    pub fn submit(&self, job: IngestJob) -> Result<()> {
        self.tx
            .send(job)
            .map_err(|_| anyhow!("job queue is shut down"))
    }

    /// Close the queue and wait for workers to drain the remaining jobs.
    pub async fn shutdown(self) {
        drop(self.tx);
        for handle in self.workers {
            let _ = handle.await;
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn worker_loop(
    worker_id: usize,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<IngestJob>>>,
    source: Arc<dyn RecordSource>,
    store: Arc<dyn Store>,
    limiter: Arc<RateLimiter>,
    leases: Arc<PartitionLeases>,
    backoff: BackoffPolicy,
    result_tx: mpsc::UnboundedSender<JobResult>,
) {
    loop {
        let job = { rx.lock().await.recv().await };
        let Some(job) = job else {
            debug!(worker_id, "Queue closed, worker exiting");
            break;
        };

        limiter.acquire().await;
        let _lease = leases.acquire(&job.partition).await;

        info!(worker_id, partition = %job.partition, mode = ?job.mode, "Worker picked up job");
        let outcome = run_with_retry(
            source.as_ref(),
            store.as_ref(),
            &job.partition,
            job.mode,
            &backoff,
        )
        .await;

        // Receiver may have been dropped if the caller only cares about
        // completion, not individual results.
        let _ = result_tx.send(JobResult {
            partition: job.partition,
            mode: job.mode,
            outcome,
        });
    }
}
