use std::str::FromStr;

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

/// Named time window anchored to "now". Month-based variants use calendar
/// arithmetic, so subtracting a month from Mar 31 lands on the last day of
/// February rather than a fixed 30 days back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

/// Unknown period names are rejected at the route layer; this error exists so
/// a bad value can never silently fall back to a default window.
#[derive(Debug, thiserror::Error)]
#[error("invalid period: {0}")]
pub struct InvalidPeriod(pub String);

impl FromStr for Period {
    type Err = InvalidPeriod;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "quarter" => Ok(Period::Quarter),
            "year" => Ok(Period::Year),
            other => Err(InvalidPeriod(other.to_string())),
        }
    }
}

impl Period {
    pub fn start_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let months = match self {
            Period::Week => return now - Duration::days(7),
            Period::Month => 1,
            Period::Quarter => 3,
            Period::Year => 12,
        };
        // checked_sub_months only fails at the edge of the representable range
        now.checked_sub_months(Months::new(months))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Bucket width for trend series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid granularity: {0}")]
pub struct InvalidGranularity(pub String);

impl FromStr for Granularity {
    type Err = InvalidGranularity;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "day" => Ok(Granularity::Day),
            "week" => Ok(Granularity::Week),
            "month" => Ok(Granularity::Month),
            other => Err(InvalidGranularity(other.to_string())),
        }
    }
}

impl Granularity {
    /// Formats a timestamp into its bucket key. Keys sort chronologically
    /// within a year; `Week` numbers weeks from the first Sunday, with any
    /// earlier days falling into week 00.
    pub fn bucket_key(&self, ts: DateTime<Utc>) -> String {
        let format = match self {
            Granularity::Day => "%Y-%m-%d",
            Granularity::Week => "%Y-%U",
            Granularity::Month => "%Y-%m",
        };
        ts.format(format).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn parses_known_periods() {
        assert_eq!("week".parse::<Period>().unwrap(), Period::Week);
        assert_eq!("month".parse::<Period>().unwrap(), Period::Month);
        assert_eq!("quarter".parse::<Period>().unwrap(), Period::Quarter);
        assert_eq!("year".parse::<Period>().unwrap(), Period::Year);
        assert!("fortnight".parse::<Period>().is_err());
        assert!("".parse::<Period>().is_err());
    }

    #[test]
    fn defaults_are_month_and_day() {
        assert_eq!(Period::default(), Period::Month);
        assert_eq!(Granularity::default(), Granularity::Day);
    }

    #[test]
    fn window_starts_age_in_order() {
        let now = at(2024, 6, 15);
        let week = Period::Week.start_from(now);
        let month = Period::Month.start_from(now);
        let quarter = Period::Quarter.start_from(now);
        let year = Period::Year.start_from(now);

        assert!(week < now);
        assert!(month < week);
        assert!(quarter < month);
        assert!(year < quarter);
    }

    #[test]
    fn month_subtraction_rolls_back_to_month_end() {
        assert_eq!(Period::Month.start_from(at(2024, 3, 31)), at(2024, 2, 29));
        assert_eq!(Period::Month.start_from(at(2023, 5, 31)), at(2023, 4, 30));
        assert_eq!(Period::Quarter.start_from(at(2024, 3, 31)), at(2023, 12, 31));
        assert_eq!(Period::Year.start_from(at(2024, 2, 29)), at(2023, 2, 28));
    }

    #[test]
    fn week_window_is_exactly_seven_days() {
        let now = at(2024, 6, 15);
        assert_eq!(now - Period::Week.start_from(now), Duration::days(7));
    }

    #[test]
    fn parses_known_granularities() {
        assert_eq!("day".parse::<Granularity>().unwrap(), Granularity::Day);
        assert_eq!("week".parse::<Granularity>().unwrap(), Granularity::Week);
        assert_eq!("month".parse::<Granularity>().unwrap(), Granularity::Month);
        assert!("hour".parse::<Granularity>().is_err());
    }

    #[test]
    fn bucket_keys_by_granularity() {
        let ts = at(2024, 6, 5);
        assert_eq!(Granularity::Day.bucket_key(ts), "2024-06-05");
        assert_eq!(Granularity::Month.bucket_key(ts), "2024-06");

        // Jan 1 2024 is a Monday, before the year's first Sunday (Jan 7)
        assert_eq!(Granularity::Week.bucket_key(at(2024, 1, 1)), "2024-00");
        assert_eq!(Granularity::Week.bucket_key(at(2024, 1, 7)), "2024-01");
    }
}
