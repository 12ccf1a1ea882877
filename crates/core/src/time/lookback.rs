use anyhow::Context;
use chrono::{DateTime, Months, NaiveDate, Utc};

pub const LOOKBACK_YEARS: u32 = 5;

/// Uses the explicit `YYYY-MM-DD` argument when given, otherwise today's UTC date.
pub fn resolve_as_of_date(
    as_of_date_arg: Option<&str>,
    now_utc: DateTime<Utc>,
) -> anyhow::Result<NaiveDate> {
    if let Some(s) = as_of_date_arg {
        return NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .with_context(|| format!("invalid as-of date {s:?}, expected YYYY-MM-DD"));
    }
    Ok(now_utc.date_naive())
}

/// Same month and day `LOOKBACK_YEARS` years before `as_of`. Feb 29 clamps to Feb 28.
pub fn history_start_date(as_of: NaiveDate) -> NaiveDate {
    as_of
        .checked_sub_months(Months::new(LOOKBACK_YEARS * 12))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn start_date_is_five_calendar_years_back() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(
            history_start_date(today),
            NaiveDate::from_ymd_opt(2021, 10, 16).unwrap()
        );
    }

    #[test]
    fn leap_day_clamps_to_end_of_february() {
        let today = NaiveDate::from_ymd_opt(2028, 2, 29).unwrap();
        assert_eq!(
            history_start_date(today),
            NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()
        );
    }

    #[test]
    fn explicit_date_wins_over_clock() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 23, 0, 0).unwrap();
        let d = resolve_as_of_date(Some("2025-01-02"), now).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
    }

    #[test]
    fn defaults_to_utc_today() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 23, 0, 0).unwrap();
        let d = resolve_as_of_date(None, now).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
    }

    #[test]
    fn rejects_malformed_date() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap();
        assert!(resolve_as_of_date(Some("16/10/2026"), now).is_err());
    }
}
