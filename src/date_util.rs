use chrono::{Duration, Months, NaiveDate};

/// Get the last day of a given month.
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some(first_of_next - Duration::days(1))
}

/// Whole calendar days from `from` to `to` (negative when `to` is earlier).
pub fn calendar_days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

pub fn add_days(d: NaiveDate, days: i64) -> NaiveDate {
    d + Duration::days(days)
}

pub fn sub_days(d: NaiveDate, days: i64) -> NaiveDate {
    d - Duration::days(days)
}

/// Same day `months` months earlier, clamped to the end of shorter months.
pub fn sub_months(d: NaiveDate, months: u32) -> NaiveDate {
    d.checked_sub_months(Months::new(months)).unwrap_or(d)
}

/// `YYYY-MM` bucket key for monthly trends.
pub fn month_key(d: NaiveDate) -> String {
    d.format("%Y-%m").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(2025, 1), Some(ymd(2025, 1, 31)));
        assert_eq!(last_day_of_month(2025, 2), Some(ymd(2025, 2, 28)));
        assert_eq!(last_day_of_month(2024, 2), Some(ymd(2024, 2, 29))); // Leap year
        assert_eq!(last_day_of_month(2025, 12), Some(ymd(2025, 12, 31)));
        assert_eq!(last_day_of_month(2025, 13), None);
    }

    #[test]
    fn test_calendar_days_between() {
        assert_eq!(calendar_days_between(ymd(2026, 1, 1), ymd(2026, 1, 31)), 30);
        assert_eq!(calendar_days_between(ymd(2026, 1, 31), ymd(2026, 1, 1)), -30);
        assert_eq!(calendar_days_between(ymd(2026, 1, 1), ymd(2026, 1, 1)), 0);
    }

    #[test]
    fn test_sub_months_clamps_month_end() {
        assert_eq!(sub_months(ymd(2026, 3, 31), 1), ymd(2026, 2, 28));
        assert_eq!(sub_months(ymd(2026, 1, 15), 5), ymd(2025, 8, 15));
    }

    #[test]
    fn test_month_key() {
        assert_eq!(month_key(ymd(2026, 4, 9)), "2026-04");
    }
}
