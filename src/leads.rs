use std::collections::{HashMap, HashSet};

use crate::fields::{get_email, get_week_start, parse_loose_date, CREATED, SOURCE};
use crate::metrics::materialize;
use crate::models::Metric;
use crate::record::Record;
use crate::week::{sunday_on_or_before, WeekKey};

const ORGANIC_SOURCES: &[&str] = &["Lead magnet", "Book a call"];

pub fn is_organic(record: &Record) -> bool {
    record
        .get_text(&[SOURCE])
        .is_some_and(|source| ORGANIC_SOURCES.contains(&source.as_str()))
}

/// Week start field, else the Sunday of the `Created` timestamp.
fn lead_week(record: &Record) -> Option<WeekKey> {
    get_week_start(record).or_else(|| {
        record
            .get_text(&[CREATED])
            .and_then(|created| parse_loose_date(&created))
            .map(|date| WeekKey::from_date(sunday_on_or_before(date)))
    })
}

#[derive(Debug, Default)]
struct LeadWeek {
    count: u64,
    emails: HashSet<String>,
}

pub fn calculate_organic_leads(leads: &[Record]) -> Vec<Metric> {
    let mut buckets: HashMap<WeekKey, LeadWeek> = HashMap::new();
    let mut undated = 0usize;

    for record in leads.iter().filter(|record| is_organic(record)) {
        let Some(week) = lead_week(record) else {
            undated += 1;
            continue;
        };
        let bucket = buckets.entry(week).or_default();
        bucket.count += 1;
        let email = get_email(record);
        if !email.is_empty() {
            bucket.emails.insert(email);
        }
    }

    tracing::debug!(total = leads.len(), undated, weeks = buckets.len(), "counted organic leads");

    materialize(buckets, |week, totals| {
        let mut metric = Metric::new(week, totals.count as f64);
        metric.unique_emails = Some(totals.emails.len());
        metric
    })
}
