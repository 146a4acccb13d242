//! Reporting and budgeting periods
//!
//! A [`Period`] identifies a span of calendar time: a month, a quarter, a
//! year, or a custom date range. Budgets are keyed by (scope, period);
//! trend reports bucket expenses into periods by [`Granularity`].

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a budgeting/reporting period
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Period {
    /// Calendar month (e.g., "2025-01")
    Monthly { year: i32, month: u32 },

    /// Calendar quarter (e.g., "2025-Q1")
    Quarterly { year: i32, quarter: u32 },

    /// Calendar year (e.g., "2025")
    Yearly { year: i32 },

    /// Custom date range (inclusive on both ends)
    Custom { start: NaiveDate, end: NaiveDate },
}

impl Period {
    /// Create a monthly period
    pub fn monthly(year: i32, month: u32) -> Self {
        Self::Monthly { year, month }
    }

    /// Create a quarterly period
    pub fn quarterly(year: i32, quarter: u32) -> Self {
        Self::Quarterly { year, quarter }
    }

    /// Create a yearly period
    pub fn yearly(year: i32) -> Self {
        Self::Yearly { year }
    }

    /// Create a custom period
    pub fn custom(start: NaiveDate, end: NaiveDate) -> Self {
        Self::Custom { start, end }
    }

    /// Get the current monthly period
    pub fn current_month() -> Self {
        let today = chrono::Local::now().date_naive();
        Self::Monthly {
            year: today.year(),
            month: today.month(),
        }
    }

    /// Get the start date of this period
    pub fn start_date(&self) -> NaiveDate {
        match self {
            Self::Monthly { year, month } => NaiveDate::from_ymd_opt(*year, *month, 1)
                .unwrap_or_else(|| NaiveDate::from_ymd_opt(*year, 1, 1).unwrap()),
            Self::Quarterly { year, quarter } => {
                let quarter = (*quarter).clamp(1, 4);
                NaiveDate::from_ymd_opt(*year, quarter * 3 - 2, 1).unwrap()
            }
            Self::Yearly { year } => NaiveDate::from_ymd_opt(*year, 1, 1).unwrap(),
            Self::Custom { start, .. } => *start,
        }
    }

    /// Get the end date of this period (inclusive)
    pub fn end_date(&self) -> NaiveDate {
        match self {
            Self::Monthly { year, month } => {
                let next_month = if *month == 12 {
                    NaiveDate::from_ymd_opt(*year + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(*year, *month + 1, 1)
                };
                next_month.unwrap() - Duration::days(1)
            }
            Self::Quarterly { year, quarter } => {
                let quarter = (*quarter).clamp(1, 4);
                if quarter == 4 {
                    NaiveDate::from_ymd_opt(*year, 12, 31).unwrap()
                } else {
                    NaiveDate::from_ymd_opt(*year, quarter * 3 + 1, 1).unwrap()
                        - Duration::days(1)
                }
            }
            Self::Yearly { year } => NaiveDate::from_ymd_opt(*year, 12, 31).unwrap(),
            Self::Custom { end, .. } => *end,
        }
    }

    /// Check if a date falls within this period
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date() && date <= self.end_date()
    }

    /// Get the next period
    pub fn next(&self) -> Self {
        match self {
            Self::Monthly { year, month } => {
                if *month == 12 {
                    Self::Monthly {
                        year: *year + 1,
                        month: 1,
                    }
                } else {
                    Self::Monthly {
                        year: *year,
                        month: *month + 1,
                    }
                }
            }
            Self::Quarterly { year, quarter } => {
                if *quarter >= 4 {
                    Self::Quarterly {
                        year: *year + 1,
                        quarter: 1,
                    }
                } else {
                    Self::Quarterly {
                        year: *year,
                        quarter: *quarter + 1,
                    }
                }
            }
            Self::Yearly { year } => Self::Yearly { year: *year + 1 },
            Self::Custom { start, end } => {
                let duration = *end - *start;
                Self::Custom {
                    start: *end + Duration::days(1),
                    end: *end + duration + Duration::days(1),
                }
            }
        }
    }

    /// Get the previous period
    pub fn prev(&self) -> Self {
        match self {
            Self::Monthly { year, month } => {
                if *month == 1 {
                    Self::Monthly {
                        year: *year - 1,
                        month: 12,
                    }
                } else {
                    Self::Monthly {
                        year: *year,
                        month: *month - 1,
                    }
                }
            }
            Self::Quarterly { year, quarter } => {
                if *quarter <= 1 {
                    Self::Quarterly {
                        year: *year - 1,
                        quarter: 4,
                    }
                } else {
                    Self::Quarterly {
                        year: *year,
                        quarter: *quarter - 1,
                    }
                }
            }
            Self::Yearly { year } => Self::Yearly { year: *year - 1 },
            Self::Custom { start, end } => {
                let duration = *end - *start;
                Self::Custom {
                    start: *start - duration - Duration::days(1),
                    end: *start - Duration::days(1),
                }
            }
        }
    }

    /// Parse a period string
    ///
    /// Formats:
    /// - Monthly: "2025-01"
    /// - Quarterly: "2025-Q1"
    /// - Yearly: "2025"
    /// - Custom: "2025-01-01..2025-03-15"
    pub fn parse(s: &str) -> Result<Self, PeriodParseError> {
        let s = s.trim();

        // Custom range format (contains ..)
        if let Some((start_str, end_str)) = s.split_once("..") {
            let start = NaiveDate::parse_from_str(start_str, "%Y-%m-%d")
                .map_err(|_| PeriodParseError::InvalidFormat(s.to_string()))?;
            let end = NaiveDate::parse_from_str(end_str, "%Y-%m-%d")
                .map_err(|_| PeriodParseError::InvalidFormat(s.to_string()))?;
            if end < start {
                return Err(PeriodParseError::EmptyRange(s.to_string()));
            }
            return Ok(Self::Custom { start, end });
        }

        // Quarterly format (contains Q)
        if let Some((year_str, quarter_str)) = s.split_once("-Q") {
            let year = parse_year(year_str, s)?;
            let quarter: u32 = quarter_str
                .parse()
                .map_err(|_| PeriodParseError::InvalidFormat(s.to_string()))?;
            if !(1..=4).contains(&quarter) {
                return Err(PeriodParseError::InvalidQuarter(quarter));
            }
            return Ok(Self::Quarterly { year, quarter });
        }

        // Monthly format (YYYY-MM)
        if let Some((year_str, month_str)) = s.split_once('-') {
            let year = parse_year(year_str, s)?;
            let month: u32 = month_str
                .parse()
                .map_err(|_| PeriodParseError::InvalidFormat(s.to_string()))?;
            if !(1..=12).contains(&month) {
                return Err(PeriodParseError::InvalidMonth(month));
            }
            return Ok(Self::Monthly { year, month });
        }

        // Yearly format (YYYY)
        let year = parse_year(s, s)?;
        Ok(Self::Yearly { year })
    }

    fn variant_rank(&self) -> u8 {
        match self {
            Self::Monthly { .. } => 0,
            Self::Quarterly { .. } => 1,
            Self::Yearly { .. } => 2,
            Self::Custom { .. } => 3,
        }
    }
}

/// Parse a year component, bounded to the calendar-date range the store
/// can represent
fn parse_year(year_str: &str, whole: &str) -> Result<i32, PeriodParseError> {
    let year: i32 = year_str
        .parse()
        .map_err(|_| PeriodParseError::InvalidFormat(whole.to_string()))?;
    if !(0..=9999).contains(&year) {
        return Err(PeriodParseError::InvalidYear(year));
    }
    Ok(year)
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monthly { year, month } => write!(f, "{:04}-{:02}", year, month),
            Self::Quarterly { year, quarter } => write!(f, "{:04}-Q{}", year, quarter),
            Self::Yearly { year } => write!(f, "{:04}", year),
            Self::Custom { start, end } => write!(
                f,
                "{}..{}",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            ),
        }
    }
}

impl Ord for Period {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Start date first; the trailing tie-breaks keep the order total and
        // consistent with Eq so Period can key a BTreeMap.
        self.start_date()
            .cmp(&other.start_date())
            .then_with(|| self.end_date().cmp(&other.end_date()))
            .then_with(|| self.variant_rank().cmp(&other.variant_rank()))
    }
}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Time-bucket size for trend reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One bucket per calendar month
    #[default]
    Monthly,
    /// One bucket per calendar quarter
    Quarterly,
    /// One bucket per calendar year
    Yearly,
}

impl Granularity {
    /// The period bucket a date falls into at this granularity
    pub fn bucket_of(&self, date: NaiveDate) -> Period {
        match self {
            Self::Monthly => Period::Monthly {
                year: date.year(),
                month: date.month(),
            },
            Self::Quarterly => Period::Quarterly {
                year: date.year(),
                quarter: (date.month() - 1) / 3 + 1,
            },
            Self::Yearly => Period::Yearly { year: date.year() },
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monthly => write!(f, "monthly"),
            Self::Quarterly => write!(f, "quarterly"),
            Self::Yearly => write!(f, "yearly"),
        }
    }
}

/// Error type for period parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodParseError {
    InvalidFormat(String),
    InvalidMonth(u32),
    InvalidQuarter(u32),
    InvalidYear(i32),
    EmptyRange(String),
}

impl fmt::Display for PeriodParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodParseError::InvalidFormat(s) => write!(f, "Invalid period format: {}", s),
            PeriodParseError::InvalidMonth(m) => write!(f, "Invalid month: {}", m),
            PeriodParseError::InvalidQuarter(q) => write!(f, "Invalid quarter: {}", q),
            PeriodParseError::InvalidYear(y) => write!(f, "Year out of range: {}", y),
            PeriodParseError::EmptyRange(s) => write!(f, "Range ends before it starts: {}", s),
        }
    }
}

impl std::error::Error for PeriodParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_period() {
        let period = Period::monthly(2025, 1);
        assert_eq!(
            period.start_date(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
        assert_eq!(
            period.end_date(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
        );
    }

    #[test]
    fn test_quarterly_period() {
        let q1 = Period::quarterly(2025, 1);
        assert_eq!(q1.start_date(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(q1.end_date(), NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());

        let q4 = Period::quarterly(2025, 4);
        assert_eq!(q4.start_date(), NaiveDate::from_ymd_opt(2025, 10, 1).unwrap());
        assert_eq!(q4.end_date(), NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    #[test]
    fn test_monthly_navigation() {
        let jan = Period::monthly(2025, 1);
        assert_eq!(jan.next(), Period::monthly(2025, 2));
        assert_eq!(jan.prev(), Period::monthly(2024, 12));

        let dec = Period::monthly(2024, 12);
        assert_eq!(dec.next(), Period::monthly(2025, 1));
    }

    #[test]
    fn test_quarterly_navigation() {
        let q4 = Period::quarterly(2024, 4);
        assert_eq!(q4.next(), Period::quarterly(2025, 1));
        assert_eq!(Period::quarterly(2025, 1).prev(), q4);
    }

    #[test]
    fn test_contains() {
        let jan = Period::monthly(2025, 1);
        assert!(jan.contains(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()));
        assert!(jan.contains(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()));
        assert!(!jan.contains(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()));
    }

    #[test]
    fn test_parse() {
        assert_eq!(Period::parse("2025-01").unwrap(), Period::monthly(2025, 1));
        assert_eq!(Period::parse("2025-Q3").unwrap(), Period::quarterly(2025, 3));
        assert_eq!(Period::parse("2025").unwrap(), Period::yearly(2025));

        let custom = Period::parse("2025-01-01..2025-03-15").unwrap();
        assert_eq!(
            custom,
            Period::custom(
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
            )
        );

        assert!(Period::parse("2025-13").is_err());
        assert!(Period::parse("2025-Q5").is_err());
        assert!(Period::parse("2025-03-15..2025-01-01").is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_range_year() {
        // Years past the calendar range must fail at parse time, so a
        // loaded period can always produce its start and end dates
        assert!(Period::parse("300000").is_err());
        assert!(Period::parse("300000-01").is_err());
        assert!(Period::parse("300000-Q1").is_err());
        assert!(Period::parse("10000").is_err());
        assert!(Period::parse("9999").is_ok());
    }

    #[test]
    fn test_display_round_trip() {
        for s in ["2025-01", "2025-Q2", "2025", "2025-01-01..2025-03-15"] {
            let period = Period::parse(s).unwrap();
            assert_eq!(format!("{}", period), s);
        }
    }

    #[test]
    fn test_ordering_by_start_date() {
        let jan = Period::monthly(2025, 1);
        let feb = Period::monthly(2025, 2);
        assert!(jan < feb);
    }

    #[test]
    fn test_granularity_buckets() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap();
        assert_eq!(Granularity::Monthly.bucket_of(date), Period::monthly(2025, 5));
        assert_eq!(
            Granularity::Quarterly.bucket_of(date),
            Period::quarterly(2025, 2)
        );
        assert_eq!(Granularity::Yearly.bucket_of(date), Period::yearly(2025));
    }

    #[test]
    fn test_serialization() {
        let period = Period::quarterly(2025, 2);
        let json = serde_json::to_string(&period).unwrap();
        let deserialized: Period = serde_json::from_str(&json).unwrap();
        assert_eq!(period, deserialized);
    }
}
