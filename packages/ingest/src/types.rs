use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The unit of ingestion and of deletion scope: one state, one fiscal year,
/// one month.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Partition {
    pub state_name: String,
    /// Fiscal year label, e.g. "2024-2025".
    pub fin_year: String,
    /// Month name from the fixed upstream set, e.g. "March".
    pub month: String,
}

impl Partition {
    pub fn new(
        state_name: impl Into<String>,
        fin_year: impl Into<String>,
        month: impl Into<String>,
    ) -> Self {
        Self {
            state_name: state_name.into(),
            fin_year: fin_year.into(),
            month: month.into(),
        }
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}, {}", self.state_name, self.fin_year, self.month)
    }
}

/// How a partition is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestMode {
    /// Historical load: skip the partition entirely if any rows exist.
    Backfill,
    /// Current-period load: delete the partition's rows, then insert fresh.
    Refresh,
}

/// One upstream record as delivered by the API, after sentinel cleansing.
///
/// Every field is an optional string; the upstream serves "NA" or empty
/// strings for missing values and numbers as strings. Field names match the
/// upstream JSON keys exactly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    pub fin_year: Option<String>,
    pub month: Option<String>,
    pub state_code: Option<String>,
    pub state_name: Option<String>,
    pub district_code: Option<String>,
    pub district_name: Option<String>,

    #[serde(rename = "Approved_Labour_Budget")]
    pub approved_labour_budget: Option<String>,
    #[serde(rename = "Average_Wage_rate_per_day_per_person")]
    pub average_wage_rate_per_day_per_person: Option<String>,
    #[serde(rename = "Average_days_of_employment_provided_per_Household")]
    pub average_days_of_employment_provided_per_household: Option<String>,
    #[serde(rename = "Differently_abled_persons_worked")]
    pub differently_abled_persons_worked: Option<String>,
    #[serde(rename = "Material_and_skilled_Wages")]
    pub material_and_skilled_wages: Option<String>,
    #[serde(rename = "Number_of_Completed_Works")]
    pub number_of_completed_works: Option<String>,
    #[serde(rename = "Number_of_GPs_with_NIL_exp")]
    pub number_of_gps_with_nil_exp: Option<String>,
    #[serde(rename = "Number_of_Ongoing_Works")]
    pub number_of_ongoing_works: Option<String>,
    #[serde(rename = "Persondays_of_Central_Liability_so_far")]
    pub persondays_of_central_liability_so_far: Option<String>,
    #[serde(rename = "SC_persondays")]
    pub sc_persondays: Option<String>,
    #[serde(rename = "SC_workers_against_active_workers")]
    pub sc_workers_against_active_workers: Option<String>,
    #[serde(rename = "ST_persondays")]
    pub st_persondays: Option<String>,
    #[serde(rename = "ST_workers_against_active_workers")]
    pub st_workers_against_active_workers: Option<String>,
    #[serde(rename = "Total_Adm_Expenditure")]
    pub total_adm_expenditure: Option<String>,
    #[serde(rename = "Total_Exp")]
    pub total_exp: Option<String>,
    #[serde(rename = "Total_Households_Worked")]
    pub total_households_worked: Option<String>,
    #[serde(rename = "Total_Individuals_Worked")]
    pub total_individuals_worked: Option<String>,
    #[serde(rename = "Total_No_of_Active_Job_Cards")]
    pub total_no_of_active_job_cards: Option<String>,
    #[serde(rename = "Total_No_of_Active_Workers")]
    pub total_no_of_active_workers: Option<String>,
    #[serde(rename = "Total_No_of_HHs_completed_100_Days_of_Wage_Employment")]
    pub total_no_of_hhs_completed_100_days_of_wage_employment: Option<String>,
    #[serde(rename = "Total_No_of_JobCards_issued")]
    pub total_no_of_jobcards_issued: Option<String>,
    #[serde(rename = "Total_No_of_Workers")]
    pub total_no_of_workers: Option<String>,
    #[serde(rename = "Total_No_of_Works_Takenup")]
    pub total_no_of_works_takenup: Option<String>,
    #[serde(rename = "Wages")]
    pub wages: Option<String>,
    #[serde(rename = "Women_Persondays")]
    pub women_persondays: Option<String>,
    #[serde(rename = "percent_of_Category_B_Works")]
    pub percent_of_category_b_works: Option<String>,
    #[serde(rename = "percent_of_Expenditure_on_Agriculture_Allied_Works")]
    pub percent_of_expenditure_on_agriculture_allied_works: Option<String>,
    #[serde(rename = "percent_of_NRM_Expenditure")]
    pub percent_of_nrm_expenditure: Option<String>,
    pub percentage_payments_gererated_within_15_days: Option<String>,
    #[serde(rename = "Remarks")]
    pub remarks: Option<String>,
}

/// A validated, typed record ready for persistence.
///
/// `report_date` is mandatory here: a record whose fiscal date cannot be
/// resolved is skipped during normalization and never reaches the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub fin_year: Option<String>,
    pub month: Option<String>,
    pub state_code: Option<String>,
    pub state_name: Option<String>,
    pub district_code: Option<String>,
    pub district_name: Option<String>,
    pub report_date: NaiveDate,

    pub approved_labour_budget: Option<i64>,
    pub average_wage_rate_per_day_per_person: Option<f64>,
    pub average_days_of_employment_provided_per_household: Option<i64>,
    pub differently_abled_persons_worked: Option<i64>,
    pub material_and_skilled_wages: Option<f64>,
    pub number_of_completed_works: Option<i64>,
    pub number_of_gps_with_nil_exp: Option<i64>,
    pub number_of_ongoing_works: Option<i64>,
    pub persondays_of_central_liability_so_far: Option<i64>,
    pub sc_persondays: Option<i64>,
    pub sc_workers_against_active_workers: Option<i64>,
    pub st_persondays: Option<i64>,
    pub st_workers_against_active_workers: Option<i64>,
    pub total_adm_expenditure: Option<f64>,
    pub total_exp: Option<f64>,
    pub total_households_worked: Option<i64>,
    pub total_individuals_worked: Option<i64>,
    pub total_no_of_active_job_cards: Option<i64>,
    pub total_no_of_active_workers: Option<i64>,
    pub total_no_of_hhs_completed_100_days_of_wage_employment: Option<i64>,
    pub total_no_of_jobcards_issued: Option<i64>,
    pub total_no_of_workers: Option<i64>,
    pub total_no_of_works_takenup: Option<i64>,
    pub wages: Option<f64>,
    pub women_persondays: Option<i64>,
    pub percent_of_category_b_works: Option<f64>,
    pub percent_of_expenditure_on_agriculture_allied_works: Option<f64>,
    pub percent_of_nrm_expenditure: Option<f64>,
    pub percentage_payments_gererated_within_15_days: Option<f64>,
    pub remarks: Option<String>,
}

/// A persisted row: a normalized record plus its surrogate id.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StoredRecord {
    pub id: i64,
    pub fin_year: Option<String>,
    pub month: Option<String>,
    pub state_code: Option<String>,
    pub state_name: Option<String>,
    pub district_code: Option<String>,
    pub district_name: Option<String>,
    pub report_date: NaiveDate,

    pub approved_labour_budget: Option<i64>,
    pub average_wage_rate_per_day_per_person: Option<f64>,
    pub average_days_of_employment_provided_per_household: Option<i64>,
    pub differently_abled_persons_worked: Option<i64>,
    pub material_and_skilled_wages: Option<f64>,
    pub number_of_completed_works: Option<i64>,
    pub number_of_gps_with_nil_exp: Option<i64>,
    pub number_of_ongoing_works: Option<i64>,
    pub persondays_of_central_liability_so_far: Option<i64>,
    pub sc_persondays: Option<i64>,
    pub sc_workers_against_active_workers: Option<i64>,
    pub st_persondays: Option<i64>,
    pub st_workers_against_active_workers: Option<i64>,
    pub total_adm_expenditure: Option<f64>,
    pub total_exp: Option<f64>,
    pub total_households_worked: Option<i64>,
    pub total_individuals_worked: Option<i64>,
    pub total_no_of_active_job_cards: Option<i64>,
    pub total_no_of_active_workers: Option<i64>,
    pub total_no_of_hhs_completed_100_days_of_wage_employment: Option<i64>,
    pub total_no_of_jobcards_issued: Option<i64>,
    pub total_no_of_workers: Option<i64>,
    pub total_no_of_works_takenup: Option<i64>,
    pub wages: Option<f64>,
    pub women_persondays: Option<i64>,
    pub percent_of_category_b_works: Option<f64>,
    pub percent_of_expenditure_on_agriculture_allied_works: Option<f64>,
    pub percent_of_nrm_expenditure: Option<f64>,
    pub percentage_payments_gererated_within_15_days: Option<f64>,
    pub remarks: Option<String>,
}

impl StoredRecord {
    /// Attach a surrogate id to a normalized record (used by the in-memory
    /// store; Postgres assigns ids itself).
    pub fn from_normalized(id: i64, r: NormalizedRecord) -> Self {
        Self {
            id,
            fin_year: r.fin_year,
            month: r.month,
            state_code: r.state_code,
            state_name: r.state_name,
            district_code: r.district_code,
            district_name: r.district_name,
            report_date: r.report_date,
            approved_labour_budget: r.approved_labour_budget,
            average_wage_rate_per_day_per_person: r.average_wage_rate_per_day_per_person,
            average_days_of_employment_provided_per_household: r
                .average_days_of_employment_provided_per_household,
            differently_abled_persons_worked: r.differently_abled_persons_worked,
            material_and_skilled_wages: r.material_and_skilled_wages,
            number_of_completed_works: r.number_of_completed_works,
            number_of_gps_with_nil_exp: r.number_of_gps_with_nil_exp,
            number_of_ongoing_works: r.number_of_ongoing_works,
            persondays_of_central_liability_so_far: r.persondays_of_central_liability_so_far,
            sc_persondays: r.sc_persondays,
            sc_workers_against_active_workers: r.sc_workers_against_active_workers,
            st_persondays: r.st_persondays,
            st_workers_against_active_workers: r.st_workers_against_active_workers,
            total_adm_expenditure: r.total_adm_expenditure,
            total_exp: r.total_exp,
            total_households_worked: r.total_households_worked,
            total_individuals_worked: r.total_individuals_worked,
            total_no_of_active_job_cards: r.total_no_of_active_job_cards,
            total_no_of_active_workers: r.total_no_of_active_workers,
            total_no_of_hhs_completed_100_days_of_wage_employment: r
                .total_no_of_hhs_completed_100_days_of_wage_employment,
            total_no_of_jobcards_issued: r.total_no_of_jobcards_issued,
            total_no_of_workers: r.total_no_of_workers,
            total_no_of_works_takenup: r.total_no_of_works_takenup,
            wages: r.wages,
            women_persondays: r.women_persondays,
            percent_of_category_b_works: r.percent_of_category_b_works,
            percent_of_expenditure_on_agriculture_allied_works: r
                .percent_of_expenditure_on_agriculture_allied_works,
            percent_of_nrm_expenditure: r.percent_of_nrm_expenditure,
            percentage_payments_gererated_within_15_days: r
                .percentage_payments_gererated_within_15_days,
            remarks: r.remarks,
        }
    }
}
