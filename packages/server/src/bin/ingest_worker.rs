// Ingestion worker: enumerates all partition jobs and runs them to
// completion on the in-process worker pool.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use datagov_client::DataGovClient;
use ingest::{
    DataGovSource, IngestConfig, JobPlan, JobQueue, PostgresStore, QueueConfig, TaskOutcome,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ingest=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = IngestConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(
        state = %config.state_name,
        years = config.fiscal_years.len(),
        workers = config.workers,
        "Starting ingestion worker"
    );

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let client = DataGovClient::new(config.api_key.clone(), config.resource_id.clone())
        .context("Failed to build API client")?;
    let source = Arc::new(DataGovSource::new(client));
    let store = Arc::new(PostgresStore::new(pool));

    let plan = JobPlan {
        state_name: config.state_name.clone(),
        fiscal_years: config.fiscal_years.clone(),
        current_fiscal_year: config.current_fiscal_year.clone(),
    };
    let jobs = plan.jobs();
    tracing::info!(count = jobs.len(), "Queueing ingestion jobs");

    let (queue, mut results) = JobQueue::start(
        source,
        store,
        QueueConfig {
            workers: config.workers,
            tasks_per_minute: config.tasks_per_minute,
            ..Default::default()
        },
    );
    for job in jobs {
        queue.submit(job)?;
    }

    let drain = tokio::spawn(async move {
        let (mut completed, mut skipped, mut failed) = (0u64, 0u64, 0u64);
        let mut inserted = 0u64;
        while let Some(result) = results.recv().await {
            match result.outcome {
                TaskOutcome::Completed { inserted: n, .. } => {
                    completed += 1;
                    inserted += n;
                }
                TaskOutcome::Skipped => skipped += 1,
                TaskOutcome::Failed { ref error, attempts } => {
                    failed += 1;
                    tracing::error!(
                        partition = %result.partition,
                        attempts,
                        error = %error,
                        "Job failed"
                    );
                }
            }
        }
        (completed, skipped, failed, inserted)
    });

    queue.shutdown().await;
    let (completed, skipped, failed, inserted) = drain.await?;
    tracing::info!(completed, skipped, failed, inserted, "Ingestion run finished");

    if failed > 0 {
        anyhow::bail!("{failed} jobs failed");
    }
    Ok(())
}
