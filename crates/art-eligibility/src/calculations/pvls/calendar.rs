use chrono::{Months, NaiveDateTime};

/// Shifts `instant` by a signed number of calendar months.
///
/// The day of month is clamped to the last day of the target month when the
/// target is shorter (Jan 31 + 1 month lands on Feb 28/29) and the time of day
/// is kept. Returns `None` only when the result falls outside chrono's range.
pub fn add_months(instant: NaiveDateTime, months: i32) -> Option<NaiveDateTime> {
    let magnitude = Months::new(months.unsigned_abs());
    if months >= 0 {
        instant.checked_add_months(magnitude)
    } else {
        instant.checked_sub_months(magnitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .expect("valid date")
            .and_hms_opt(0, 0, 0)
            .expect("valid time")
    }

    #[test]
    fn adds_months_on_the_same_day() {
        assert_eq!(add_months(at(2021, 1, 15), 3), Some(at(2021, 4, 15)));
    }

    #[test]
    fn clamps_to_end_of_shorter_month() {
        assert_eq!(add_months(at(2021, 1, 31), 3), Some(at(2021, 4, 30)));
        assert_eq!(add_months(at(2021, 1, 31), 1), Some(at(2021, 2, 28)));
        assert_eq!(add_months(at(2024, 1, 31), 1), Some(at(2024, 2, 29)));
    }

    #[test]
    fn subtracts_months_across_leap_years() {
        assert_eq!(add_months(at(2024, 2, 29), -12), Some(at(2023, 2, 28)));
        assert_eq!(add_months(at(2022, 3, 15), -12), Some(at(2021, 3, 15)));
    }

    #[test]
    fn keeps_time_of_day() {
        let instant = NaiveDate::from_ymd_opt(2021, 11, 30)
            .and_then(|date| date.and_hms_opt(14, 45, 10))
            .expect("valid instant");
        let shifted = add_months(instant, 3).expect("in range");
        assert_eq!(
            shifted,
            NaiveDate::from_ymd_opt(2022, 2, 28)
                .and_then(|date| date.and_hms_opt(14, 45, 10))
                .expect("valid instant")
        );
    }

    #[test]
    fn zero_months_is_identity() {
        assert_eq!(add_months(at(2020, 2, 29), 0), Some(at(2020, 2, 29)));
    }

    #[test]
    fn reports_overflow_as_none() {
        assert_eq!(add_months(NaiveDateTime::MAX, 1), None);
        assert_eq!(add_months(NaiveDateTime::MIN, -1), None);
    }
}
