//! Fiscal calendar handling.
//!
//! The upstream dataset is keyed by fiscal year ("2024-2025") and month name.
//! The fiscal year starts in April, so January through March of a label fall
//! in the *second* calendar year of that label.

use chrono::NaiveDate;

/// Month names as the upstream serves them, in fiscal order starting April.
pub const MONTHS: [&str; 12] = [
    "April", "May", "June", "July", "Aug", "Sep", "Oct", "Nov", "Dec", "Jan", "Feb", "March",
];

fn month_number(month: &str) -> Option<u32> {
    match month {
        "Jan" => Some(1),
        "Feb" => Some(2),
        "March" => Some(3),
        "April" => Some(4),
        "May" => Some(5),
        "June" => Some(6),
        "July" => Some(7),
        "Aug" => Some(8),
        "Sep" => Some(9),
        "Oct" => Some(10),
        "Nov" => Some(11),
        "Dec" => Some(12),
        _ => None,
    }
}

/// Resolve a (fiscal-year label, month name) pair to the first of that month.
///
/// Returns `None` for an unknown month name or an unparseable label; callers
/// treat that as a per-record skip, never a task failure.
pub fn report_date(fin_year: &str, month: &str) -> Option<NaiveDate> {
    let month_num = month_number(month)?;
    let mut year: i32 = fin_year.split('-').next()?.trim().parse().ok()?;
    // Jan/Feb/March belong to the second calendar year of the label.
    if month_num < 4 {
        year += 1;
    }
    NaiveDate::from_ymd_opt(year, month_num, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn months_after_april_fall_in_first_year() {
        assert_eq!(
            report_date("2024-2025", "April"),
            NaiveDate::from_ymd_opt(2024, 4, 1)
        );
        assert_eq!(
            report_date("2024-2025", "Dec"),
            NaiveDate::from_ymd_opt(2024, 12, 1)
        );
    }

    #[test]
    fn months_before_april_roll_into_second_year() {
        assert_eq!(
            report_date("2024-2025", "Jan"),
            NaiveDate::from_ymd_opt(2025, 1, 1)
        );
        assert_eq!(
            report_date("2024-2025", "March"),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
    }

    #[test]
    fn unknown_month_is_unresolvable() {
        assert_eq!(report_date("2024-2025", "January"), None);
        assert_eq!(report_date("2024-2025", ""), None);
    }

    #[test]
    fn malformed_label_is_unresolvable() {
        assert_eq!(report_date("twenty-twentyone", "Jan"), None);
        assert_eq!(report_date("", "Jan"), None);
    }

    #[test]
    fn month_set_is_complete() {
        for m in MONTHS {
            assert!(month_number(m).is_some(), "missing month {m}");
        }
    }
}
