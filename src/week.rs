//! Week keys: the `DD/MM/YYYY` Sunday that anchors every weekly bucket.
//!
//! Keys compare by the date they denote, never by string order. A key that
//! does not parse still participates in bucketing but sorts after every key
//! that does.

use std::cmp::Ordering;
use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{MetricsError, Result};

const WEEK_KEY_FORMAT: &str = "%d/%m/%Y";

/// Parse `DD/MM/YYYY` with optional zero padding: day and month may be one or
/// two digits, the year must be four. Any other shape is rejected.
pub fn parse_week_start(value: &str) -> Result<NaiveDate> {
    let invalid = || MetricsError::InvalidWeekKey(value.to_string());
    let mut parts = value.trim().split('/');
    let (day, month, year) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(d), Some(m), Some(y), None) => (d, m, y),
        _ => return Err(invalid()),
    };

    let all_digits = |s: &str, min: usize, max: usize| {
        (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
    };
    if !all_digits(day, 1, 2) || !all_digits(month, 1, 2) || !all_digits(year, 4, 4) {
        return Err(invalid());
    }

    let day: u32 = day.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// The Sunday on or before `date`.
pub fn sunday_on_or_before(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

pub fn current_week_start(today: NaiveDate) -> WeekKey {
    WeekKey::from_date(sunday_on_or_before(today))
}

pub fn compare_weeks(a: &str, b: &str) -> Ordering {
    match (parse_week_start(a), parse_week_start(b)) {
        (Ok(left), Ok(right)) => left.cmp(&right),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// A week is completed once its start is strictly before the current week's.
/// Unparsable keys are never completed.
pub fn is_completed_week(week: &str, today: NaiveDate) -> bool {
    match parse_week_start(week) {
        Ok(start) => start < sunday_on_or_before(today),
        Err(_) => false,
    }
}

/// Human label spanning Sunday..Saturday, e.g. `Jan 05 – Jan 11, 2025`.
pub fn format_range(week: &str) -> Result<String> {
    let start = parse_week_start(week)?;
    let end = start + Duration::days(6);
    Ok(format!(
        "{} – {}, {}",
        start.format("%b %d"),
        end.format("%b %d"),
        end.year()
    ))
}

/// Canonical week identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekKey(String);

impl WeekKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format(WEEK_KEY_FORMAT).to_string())
    }

    /// Build a key from a raw field value. Parseable values are re-rendered
    /// with zero padding so `5/1/2025` and `05/01/2025` share a bucket; other
    /// non-empty values are kept verbatim.
    pub fn from_raw(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        match parse_week_start(trimmed) {
            Ok(date) => Some(Self::from_date(date)),
            Err(_) => Some(Self(trimmed.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Ord for WeekKey {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_weeks(&self.0, &other.0)
    }
}

impl PartialOrd for WeekKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
