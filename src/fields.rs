//! Canonical email, date, medium and week extraction from raw records.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::record::Record;
use crate::week::{parse_week_start, WeekKey};

pub const WEEK_START: &str = "Week start of report date";
pub const EMAIL_KEYS: &[&str] = &["Email (from Lead list)", "Email"];
pub const REPORT_DATE_KEYS: &[&str] = &["report date", "Report date"];
pub const MEDIUM_KEYS: &[&str] = &[
    "Medium",
    "Source / medium",
    "Medium (from Source / medium)",
    "source_medium",
    "Source/medium",
];
pub const LINKEDIN_KEYS: &[&str] = &["Person Linkedin Url", "Lead Linkedin Url (from Lead list)"];

pub const SEQUENCE: &str = "Sequence";
pub const EVENT: &str = "Event";
pub const MAILGUN_TAGS: &str = "mailgun_tags";
pub const SOURCE: &str = "Source";
pub const LEAD_LIST_SOURCE: &str = "Source (from Lead list)";
pub const SOURCE_MEDIUM: &str = "Source / medium";
pub const CONVERSATION_ID: &str = "Conversation_id";
pub const SENDER: &str = "Sender";
pub const SENT_TIME: &str = "Sent time";
pub const SESSION_DURATION: &str = "Session Duration (second)";
pub const BOOK_A_CALL_CLICKS: &str = "Click book a call button";
pub const CREATED: &str = "Created";

/// Trimmed, lower-cased email, or an empty string when the record has none.
/// An empty result means the record carries no identity.
pub fn get_email(record: &Record) -> String {
    record
        .get_text(EMAIL_KEYS)
        .map(|email| email.to_lowercase())
        .unwrap_or_default()
}

/// Most precise date a record carries: the report date (strict week-key
/// format first, then any common date shape), else the week start.
pub fn get_record_date(record: &Record) -> Option<NaiveDate> {
    if let Some(raw) = record.get_text(REPORT_DATE_KEYS) {
        if let Some(date) = parse_week_start(&raw).ok().or_else(|| parse_loose_date(&raw)) {
            return Some(date);
        }
    }
    record
        .get_text(&[WEEK_START])
        .and_then(|raw| parse_week_start(&raw).ok())
}

pub fn get_medium(record: &Record) -> String {
    record
        .get_text(MEDIUM_KEYS)
        .map(|medium| medium.to_lowercase())
        .unwrap_or_default()
}

/// Recommendation / referral traffic: the medium contains `rec` anywhere.
pub fn is_recommendation(record: &Record) -> bool {
    get_medium(record).contains("rec")
}

pub fn get_week_start(record: &Record) -> Option<WeekKey> {
    record.get_text(&[WEEK_START]).and_then(|raw| WeekKey::from_raw(&raw))
}

pub fn get_linkedin_url(record: &Record) -> Option<String> {
    record.get_text(LINKEDIN_KEYS)
}

/// Lower-cased text of `key`, empty when absent.
pub fn lower_text(record: &Record, key: &str) -> String {
    record
        .get_text(&[key])
        .map(|text| text.to_lowercase())
        .unwrap_or_default()
}

/// Parse the date shapes the upstream exports produce: RFC 3339 timestamps,
/// ISO dates and datetimes, `Jan 5, 2025` style labels and US `M/D/YYYY`.
pub fn parse_loose_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(timestamp.date());
        }
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%b %d, %Y", "%B %d, %Y", "%d %b %Y", "%d %B %Y", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::records_from_value;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        records_from_value(json!([value])).remove(0)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn email_prefers_lead_list_lookup_and_normalises() {
        let rec = record(json!({
            "Email (from Lead list)": ["", "  Jane@Example.COM "],
            "Email": "other@example.com"
        }));
        assert_eq!(get_email(&rec), "jane@example.com");
        assert_eq!(get_email(&record(json!({"Email": "A@B.co"}))), "a@b.co");
        assert_eq!(get_email(&record(json!({"Name": "x"}))), "");
    }

    #[test]
    fn record_date_prefers_report_date() {
        let rec = record(json!({
            "report date": "07/01/2025",
            "Week start of report date": "05/01/2025"
        }));
        assert_eq!(get_record_date(&rec), Some(date(2025, 1, 7)));

        let iso = record(json!({"Report date": "2025-01-08T10:00:00.000Z"}));
        assert_eq!(get_record_date(&iso), Some(date(2025, 1, 8)));

        let week_only = record(json!({"report date": "???", "Week start of report date": "05/01/2025"}));
        assert_eq!(get_record_date(&week_only), Some(date(2025, 1, 5)));

        assert_eq!(get_record_date(&record(json!({"Email": "x"}))), None);
    }

    #[test]
    fn medium_checks_aliases_in_order() {
        let rec = record(json!({"Source/medium": "IG", "source_medium": "Recommended-by-partner"}));
        assert_eq!(get_medium(&rec), "recommended-by-partner");
        assert!(is_recommendation(&rec));
        assert!(!is_recommendation(&record(json!({"Medium": "organic"}))));
        assert!(!is_recommendation(&record(json!({}))));
    }

    #[test]
    fn loose_dates_cover_common_shapes() {
        assert_eq!(parse_loose_date("2025-01-05"), Some(date(2025, 1, 5)));
        assert_eq!(parse_loose_date("Jan 5, 2025"), Some(date(2025, 1, 5)));
        assert_eq!(parse_loose_date("1/25/2025"), Some(date(2025, 1, 25)));
        assert_eq!(parse_loose_date("2025-01-05 09:30"), Some(date(2025, 1, 5)));
        assert_eq!(parse_loose_date("soon"), None);
    }
}
