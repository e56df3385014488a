use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Default data.gov.in resource: MGNREGA district-wise monthly performance.
const DEFAULT_RESOURCE_ID: &str = "ee03643a-ee4c-48c2-ac30-9f2ff26ab722";

/// Ingestion worker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub database_url: String,
    pub api_key: String,
    pub resource_id: String,
    pub state_name: String,
    pub fiscal_years: Vec<String>,
    pub current_fiscal_year: String,
    pub workers: usize,
    pub tasks_per_minute: u32,
}

impl IngestConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let current_fiscal_year =
            env::var("CURRENT_FINANCIAL_YEAR").unwrap_or_else(|_| "2024-2025".to_string());
        let fiscal_years = env::var("FINANCIAL_YEARS")
            .map(|v| {
                v.split(',')
                    .map(|y| y.trim().to_string())
                    .filter(|y| !y.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| {
                [
                    "2024-2025",
                    "2023-2024",
                    "2022-2023",
                    "2021-2022",
                    "2020-2021",
                    "2019-2020",
                    "2018-2019",
                ]
                .iter()
                .map(|y| y.to_string())
                .collect()
            });

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            api_key: env::var("DATA_GOV_API_KEY").context("DATA_GOV_API_KEY must be set")?,
            resource_id: env::var("DATA_GOV_RESOURCE_ID")
                .unwrap_or_else(|_| DEFAULT_RESOURCE_ID.to_string()),
            state_name: env::var("INGEST_STATE_NAME")
                .unwrap_or_else(|_| "UTTAR PRADESH".to_string()),
            fiscal_years,
            current_fiscal_year,
            workers: env::var("INGEST_WORKERS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .context("INGEST_WORKERS must be a valid number")?,
            tasks_per_minute: env::var("INGEST_TASKS_PER_MINUTE")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .context("INGEST_TASKS_PER_MINUTE must be a valid number")?,
        })
    }
}
