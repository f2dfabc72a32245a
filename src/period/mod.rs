use std::fmt;
use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime};
use crate::util;

/// A named reporting window, resolved against "now" when a query runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Period {
    Today,
    /// From Monday of the current week
    Week,
    /// Last 30 days
    Month,
    /// Last 90 days
    Quarter,
    /// From 1 January of the current year
    Year,
    /// A calendar month
    Calendar(i32, u32),
    All,
}

impl Period {
    pub(crate) fn from_keyword(keyword: &str) -> Option<Period> {
        match keyword.to_ascii_lowercase().as_str() {
            "today" => Some(Period::Today),
            "week" => Some(Period::Week),
            "month" => Some(Period::Month),
            "quarter" => Some(Period::Quarter),
            "year" => Some(Period::Year),
            "all" => Some(Period::All),
            other => util::parse_month_year(other).map(|(year, month)| Period::Calendar(year, month)),
        }
    }

    /// Inclusive start and end bounds. `None` means unbounded on that side.
    pub(crate) fn bounds(&self, now: NaiveDateTime) -> (Option<NaiveDateTime>, Option<NaiveDateTime>) {
        let midnight = now.date().and_time(NaiveTime::MIN);
        match self {
            Period::Today => (Some(midnight), None),
            Period::Week => {
                let days_from_monday = now.weekday().num_days_from_monday() as i64;
                (Some(midnight - Duration::days(days_from_monday)), None)
            }
            Period::Month => (Some(now - Duration::days(30)), None),
            Period::Quarter => (Some(now - Duration::days(90)), None),
            Period::Year => (util::start_of_year(now.year()), None),
            Period::Calendar(year, month) => match util::month_range(*year, *month) {
                Some(range) => (Some(*range.start()), Some(*range.end())),
                None => (None, None),
            },
            Period::All => (None, None),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Today => write!(f, "today"),
            Period::Week => write!(f, "this week"),
            Period::Month => write!(f, "last 30 days"),
            Period::Quarter => write!(f, "last 90 days"),
            Period::Year => write!(f, "this year"),
            Period::Calendar(year, month) => write!(f, "{} {}", util::month_name(*month), year),
            Period::All => write!(f, "all time"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use super::*;

    fn now() -> NaiveDateTime {
        // A Thursday
        NaiveDateTime::from_str("2024-03-14T15:30:00").unwrap()
    }

    #[test]
    fn test_week_starts_on_monday() {
        let (start, end) = Period::Week.bounds(now());
        assert_eq!(start, Some(NaiveDateTime::from_str("2024-03-11T00:00:00").unwrap()));
        assert!(end.is_none());
    }

    #[test]
    fn test_rolling_windows() {
        assert_eq!(Period::Month.bounds(now()).0, Some(NaiveDateTime::from_str("2024-02-13T15:30:00").unwrap()));
        assert_eq!(Period::Today.bounds(now()).0, Some(NaiveDateTime::from_str("2024-03-14T00:00:00").unwrap()));
        assert_eq!(Period::Year.bounds(now()).0, Some(NaiveDateTime::from_str("2024-01-01T00:00:00").unwrap()));
        assert_eq!(Period::All.bounds(now()), (None, None));
    }

    #[test]
    fn test_keywords() {
        assert_eq!(Period::from_keyword("QUARTER"), Some(Period::Quarter));
        assert_eq!(Period::from_keyword("02/2024"), Some(Period::Calendar(2024, 2)));
        assert_eq!(Period::from_keyword("fortnight"), None);

        let (start, end) = Period::Calendar(2024, 2).bounds(now());
        assert_eq!(start, Some(NaiveDateTime::from_str("2024-02-01T00:00:00").unwrap()));
        assert_eq!(end, Some(NaiveDateTime::from_str("2024-02-29T23:59:59").unwrap()));
    }
}
