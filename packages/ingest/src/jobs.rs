//! Static job enumeration.
//!
//! Produces the full set of (state, fiscal year, month) partitions to
//! ingest. Every configured year gets all twelve months; the configured
//! current fiscal year runs in refresh mode (upstream data still mutates),
//! every other year is an idempotent backfill.

use crate::fiscal::MONTHS;
use crate::queue::IngestJob;
use crate::types::{IngestMode, Partition};

#[derive(Debug, Clone)]
pub struct JobPlan {
    pub state_name: String,
    pub fiscal_years: Vec<String>,
    pub current_fiscal_year: String,
}

impl JobPlan {
    pub fn jobs(&self) -> Vec<IngestJob> {
        let mut jobs = Vec::with_capacity(self.fiscal_years.len() * MONTHS.len());
        for year in &self.fiscal_years {
            let mode = if *year == self.current_fiscal_year {
                IngestMode::Refresh
            } else {
                IngestMode::Backfill
            };
            for month in MONTHS {
                jobs.push(IngestJob {
                    partition: Partition::new(&self.state_name, year, month),
                    mode,
                });
            }
        }
        jobs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_year_gets_twelve_months() {
        let plan = JobPlan {
            state_name: "UTTAR PRADESH".into(),
            fiscal_years: vec!["2024-2025".into(), "2023-2024".into()],
            current_fiscal_year: "2024-2025".into(),
        };

        let jobs = plan.jobs();
        assert_eq!(jobs.len(), 24);

        let refreshes = jobs
            .iter()
            .filter(|j| j.mode == IngestMode::Refresh)
            .count();
        assert_eq!(refreshes, 12);
        assert!(jobs
            .iter()
            .filter(|j| j.mode == IngestMode::Refresh)
            .all(|j| j.partition.fin_year == "2024-2025"));
    }
}
