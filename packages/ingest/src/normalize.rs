//! Per-record validation and coercion.
//!
//! Normalization is a two-stage pipeline: a strict shape check that either
//! accepts or rejects the whole record, followed by field-wise numeric
//! coercion where each field fails independently to `None`. A bad metric
//! never invalidates its siblings, and nothing in here panics on upstream
//! garbage.

use thiserror::Error;

use crate::fiscal;
use crate::types::{NormalizedRecord, RawRecord};

/// Upstream marker for "value not available".
const SENTINEL: &str = "NA";

/// Why one record was dropped. A skip is logged and counted, never fatal.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("record failed shape validation: {0}")]
    Shape(#[from] serde_json::Error),
    #[error("unresolvable report date (fin_year {fin_year:?}, month {month:?})")]
    UnresolvableDate {
        fin_year: Option<String>,
        month: Option<String>,
    },
}

/// Replace sentinel strings with nulls, in place, across every field of the
/// record. Runs before shape validation so that "NA" and "" are uniformly
/// treated as absence.
fn cleanse_sentinels(value: &mut serde_json::Value) {
    if let Some(map) = value.as_object_mut() {
        for field in map.values_mut() {
            if let Some(s) = field.as_str() {
                let trimmed = s.trim();
                if trimmed == SENTINEL || trimmed.is_empty() {
                    *field = serde_json::Value::Null;
                }
            }
        }
    }
}

/// Parse as a float then truncate. Absent or unparseable input is absent
/// output; upstream serves integers like "1234.0".
pub fn coerce_int(value: Option<&str>) -> Option<i64> {
    value?.trim().parse::<f64>().ok().map(|f| f as i64)
}

/// Parse as a float. Absent or unparseable input is absent output.
pub fn coerce_float(value: Option<&str>) -> Option<f64> {
    value?.trim().parse::<f64>().ok()
}

/// Validate and coerce one raw upstream record.
///
/// Sentinel cleansing → shape validation → per-field coercion → fiscal date
/// resolution. Records without a resolvable report date are rejected; they
/// must never reach the store.
pub fn normalize(mut value: serde_json::Value) -> Result<NormalizedRecord, SkipReason> {
    cleanse_sentinels(&mut value);

    let raw: RawRecord = serde_json::from_value(value)?;

    let report_date = raw
        .fin_year
        .as_deref()
        .zip(raw.month.as_deref())
        .and_then(|(fy, m)| fiscal::report_date(fy, m))
        .ok_or_else(|| SkipReason::UnresolvableDate {
            fin_year: raw.fin_year.clone(),
            month: raw.month.clone(),
        })?;

    Ok(NormalizedRecord {
        report_date,
        approved_labour_budget: coerce_int(raw.approved_labour_budget.as_deref()),
        average_wage_rate_per_day_per_person: coerce_float(
            raw.average_wage_rate_per_day_per_person.as_deref(),
        ),
        average_days_of_employment_provided_per_household: coerce_int(
            raw.average_days_of_employment_provided_per_household.as_deref(),
        ),
        differently_abled_persons_worked: coerce_int(
            raw.differently_abled_persons_worked.as_deref(),
        ),
        material_and_skilled_wages: coerce_float(raw.material_and_skilled_wages.as_deref()),
        number_of_completed_works: coerce_int(raw.number_of_completed_works.as_deref()),
        number_of_gps_with_nil_exp: coerce_int(raw.number_of_gps_with_nil_exp.as_deref()),
        number_of_ongoing_works: coerce_int(raw.number_of_ongoing_works.as_deref()),
        persondays_of_central_liability_so_far: coerce_int(
            raw.persondays_of_central_liability_so_far.as_deref(),
        ),
        sc_persondays: coerce_int(raw.sc_persondays.as_deref()),
        sc_workers_against_active_workers: coerce_int(
            raw.sc_workers_against_active_workers.as_deref(),
        ),
        st_persondays: coerce_int(raw.st_persondays.as_deref()),
        st_workers_against_active_workers: coerce_int(
            raw.st_workers_against_active_workers.as_deref(),
        ),
        total_adm_expenditure: coerce_float(raw.total_adm_expenditure.as_deref()),
        total_exp: coerce_float(raw.total_exp.as_deref()),
        total_households_worked: coerce_int(raw.total_households_worked.as_deref()),
        total_individuals_worked: coerce_int(raw.total_individuals_worked.as_deref()),
        total_no_of_active_job_cards: coerce_int(raw.total_no_of_active_job_cards.as_deref()),
        total_no_of_active_workers: coerce_int(raw.total_no_of_active_workers.as_deref()),
        total_no_of_hhs_completed_100_days_of_wage_employment: coerce_int(
            raw.total_no_of_hhs_completed_100_days_of_wage_employment
                .as_deref(),
        ),
        total_no_of_jobcards_issued: coerce_int(raw.total_no_of_jobcards_issued.as_deref()),
        total_no_of_workers: coerce_int(raw.total_no_of_workers.as_deref()),
        total_no_of_works_takenup: coerce_int(raw.total_no_of_works_takenup.as_deref()),
        wages: coerce_float(raw.wages.as_deref()),
        women_persondays: coerce_int(raw.women_persondays.as_deref()),
        percent_of_category_b_works: coerce_float(raw.percent_of_category_b_works.as_deref()),
        percent_of_expenditure_on_agriculture_allied_works: coerce_float(
            raw.percent_of_expenditure_on_agriculture_allied_works
                .as_deref(),
        ),
        percent_of_nrm_expenditure: coerce_float(raw.percent_of_nrm_expenditure.as_deref()),
        percentage_payments_gererated_within_15_days: coerce_float(
            raw.percentage_payments_gererated_within_15_days.as_deref(),
        ),
        remarks: raw.remarks,
        fin_year: raw.fin_year,
        month: raw.month,
        state_code: raw.state_code,
        state_name: raw.state_name,
        district_code: raw.district_code,
        district_name: raw.district_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base_record() -> serde_json::Value {
        json!({
            "fin_year": "2023-2024",
            "month": "June",
            "state_name": "UTTAR PRADESH",
            "district_name": "AGRA",
        })
    }

    #[test]
    fn coerce_int_truncates_floats() {
        assert_eq!(coerce_int(Some("123")), Some(123));
        assert_eq!(coerce_int(Some("123.9")), Some(123));
        assert_eq!(coerce_int(Some(" 42 ")), Some(42));
    }

    #[test]
    fn coercion_garbage_becomes_absent() {
        assert_eq!(coerce_int(Some("12.5xyz")), None);
        assert_eq!(coerce_int(None), None);
        assert_eq!(coerce_float(Some("n/a")), None);
        assert_eq!(coerce_float(None), None);
    }

    #[test]
    fn sentinel_and_empty_strings_normalize_to_absent() {
        let mut value = base_record();
        value["Wages"] = json!("NA");
        value["Total_Exp"] = json!("  NA  ");
        value["Remarks"] = json!("");
        value["Approved_Labour_Budget"] = json!("100");

        let record = normalize(value).unwrap();
        assert_eq!(record.wages, None);
        assert_eq!(record.total_exp, None);
        assert_eq!(record.remarks, None);
        assert_eq!(record.approved_labour_budget, Some(100));
    }

    #[test]
    fn one_bad_field_does_not_invalidate_siblings() {
        let mut value = base_record();
        value["Wages"] = json!("garbage");
        value["Total_Exp"] = json!("12.5");

        let record = normalize(value).unwrap();
        assert_eq!(record.wages, None);
        assert_eq!(record.total_exp, Some(12.5));
    }

    #[test]
    fn unresolvable_date_is_rejected() {
        let mut value = base_record();
        value["month"] = json!("Juneuary");
        assert!(matches!(
            normalize(value),
            Err(SkipReason::UnresolvableDate { .. })
        ));

        // "NA" fin_year cleanses to null, so the date cannot resolve either.
        let mut value = base_record();
        value["fin_year"] = json!("NA");
        assert!(matches!(
            normalize(value),
            Err(SkipReason::UnresolvableDate { .. })
        ));
    }

    #[test]
    fn non_object_fails_shape_validation() {
        assert!(matches!(
            normalize(json!("not a record")),
            Err(SkipReason::Shape(_))
        ));
        assert!(matches!(normalize(json!([1, 2, 3])), Err(SkipReason::Shape(_))));
    }

    #[test]
    fn report_date_derives_from_fiscal_calendar() {
        let mut value = base_record();
        value["month"] = json!("Feb");
        let record = normalize(value).unwrap();
        assert_eq!(
            record.report_date,
            chrono::NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
        );
    }
}
