use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;

use crate::storage::Store;
use crate::types::{NormalizedRecord, Partition, StoredRecord};

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn exists(&self, key: &Partition) -> Result<bool> {
        let row = sqlx::query(
            r#"
            SELECT 1 AS one
            FROM district_performance
            WHERE state_name = $1 AND fin_year = $2 AND month = $3
            LIMIT 1
            "#,
        )
        .bind(&key.state_name)
        .bind(&key.fin_year)
        .bind(&key.month)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to check partition existence")?;
        Ok(row.is_some())
    }

    async fn purge(&self, key: &Partition) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM district_performance
            WHERE state_name = $1 AND fin_year = $2 AND month = $3
            "#,
        )
        .bind(&key.state_name)
        .bind(&key.fin_year)
        .bind(&key.month)
        .execute(&self.pool)
        .await
        .context("Failed to purge partition")?;
        Ok(result.rows_affected())
    }

    async fn insert_batch(&self, records: &[NormalizedRecord]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for r in records {
            sqlx::query(
                r#"
                INSERT INTO district_performance (
                    fin_year, month, state_code, state_name, district_code,
                    district_name, report_date,
                    approved_labour_budget, average_wage_rate_per_day_per_person,
                    average_days_of_employment_provided_per_household,
                    differently_abled_persons_worked, material_and_skilled_wages,
                    number_of_completed_works, number_of_gps_with_nil_exp,
                    number_of_ongoing_works, persondays_of_central_liability_so_far,
                    sc_persondays, sc_workers_against_active_workers,
                    st_persondays, st_workers_against_active_workers,
                    total_adm_expenditure, total_exp, total_households_worked,
                    total_individuals_worked, total_no_of_active_job_cards,
                    total_no_of_active_workers,
                    total_no_of_hhs_completed_100_days_of_wage_employment,
                    total_no_of_jobcards_issued, total_no_of_workers,
                    total_no_of_works_takenup, wages, women_persondays,
                    percent_of_category_b_works,
                    percent_of_expenditure_on_agriculture_allied_works,
                    percent_of_nrm_expenditure,
                    percentage_payments_gererated_within_15_days, remarks
                ) VALUES (
                    $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24,
                    $25, $26, $27, $28, $29, $30, $31, $32, $33, $34, $35,
                    $36, $37
                )
                "#,
            )
            .bind(&r.fin_year)
            .bind(&r.month)
            .bind(&r.state_code)
            .bind(&r.state_name)
            .bind(&r.district_code)
            .bind(&r.district_name)
            .bind(r.report_date)
            .bind(r.approved_labour_budget)
            .bind(r.average_wage_rate_per_day_per_person)
            .bind(r.average_days_of_employment_provided_per_household)
            .bind(r.differently_abled_persons_worked)
            .bind(r.material_and_skilled_wages)
            .bind(r.number_of_completed_works)
            .bind(r.number_of_gps_with_nil_exp)
            .bind(r.number_of_ongoing_works)
            .bind(r.persondays_of_central_liability_so_far)
            .bind(r.sc_persondays)
            .bind(r.sc_workers_against_active_workers)
            .bind(r.st_persondays)
            .bind(r.st_workers_against_active_workers)
            .bind(r.total_adm_expenditure)
            .bind(r.total_exp)
            .bind(r.total_households_worked)
            .bind(r.total_individuals_worked)
            .bind(r.total_no_of_active_job_cards)
            .bind(r.total_no_of_active_workers)
            .bind(r.total_no_of_hhs_completed_100_days_of_wage_employment)
            .bind(r.total_no_of_jobcards_issued)
            .bind(r.total_no_of_workers)
            .bind(r.total_no_of_works_takenup)
            .bind(r.wages)
            .bind(r.women_persondays)
            .bind(r.percent_of_category_b_works)
            .bind(r.percent_of_expenditure_on_agriculture_allied_works)
            .bind(r.percent_of_nrm_expenditure)
            .bind(r.percentage_payments_gererated_within_15_days)
            .bind(&r.remarks)
            .execute(&mut *tx)
            .await
            .context("Failed to insert record")?;
        }

        tx.commit().await.context("Failed to commit page batch")?;
        Ok(())
    }

    async fn find_by_district(&self, district_name: &str) -> Result<Vec<StoredRecord>> {
        let records = sqlx::query_as::<_, StoredRecord>(
            r#"
            SELECT *
            FROM district_performance
            WHERE district_name = $1
            ORDER BY report_date DESC
            "#,
        )
        .bind(district_name)
        .fetch_all(&self.pool)
        .await
        .context("Failed to find records by district")?;
        Ok(records)
    }

    async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM district_performance")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count records")?;
        Ok(count.0)
    }
}
