//! Email sends per sequence family and email interactions per mailgun tag.

use std::collections::HashSet;

use crate::fields::{get_email, get_week_start, lower_text, EVENT, MAILGUN_TAGS, SEQUENCE};
use crate::metrics::{fold_weekly, materialize, percent};
use crate::models::Metric;
use crate::record::Record;

/// Which sequences a sent-email series covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceFamily {
    MktOutreach,
    Nurture,
}

impl SequenceFamily {
    pub fn matches(self, sequence: &str) -> bool {
        let sequence = sequence.trim().to_lowercase();
        match self {
            Self::MktOutreach => sequence.contains("mkt outreach"),
            Self::Nurture => {
                sequence.contains("nurture")
                    || sequence.contains("win-back")
                    || sequence == "general nurture"
            }
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::MktOutreach => "mkt outreach sent",
            Self::Nurture => "nurture sent",
        }
    }
}

/// Which mailgun tags an interaction series covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagFamily {
    Outreach,
    Nurture,
    AnalysisResult,
}

impl TagFamily {
    pub fn matches(self, tag: &str) -> bool {
        let tag = tag.trim().to_lowercase();
        match self {
            Self::Outreach => tag.contains("outreach") || tag.contains("mkt outreach"),
            Self::Nurture => tag.contains("nurture") || tag.contains("win-back"),
            Self::AnalysisResult => ["analysis", "result", "lead magnet", "deck analysis", "report"]
                .iter()
                .any(|needle| tag.contains(needle)),
        }
    }

    fn matches_record(self, record: &Record) -> bool {
        record
            .get_list(&[MAILGUN_TAGS])
            .iter()
            .any(|tag| self.matches(tag))
    }

    fn label(self) -> &'static str {
        match self {
            Self::Outreach => "outreach interactions",
            Self::Nurture => "nurture interactions",
            Self::AnalysisResult => "analysis result interactions",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InteractionKind {
    Opened,
    Clicked,
    Unsubscribed,
    Other,
}

fn classify_event(event: &str) -> InteractionKind {
    if event.contains("open") {
        InteractionKind::Opened
    } else if event.contains("click") {
        InteractionKind::Clicked
    } else if event.contains("unsubscribe") {
        InteractionKind::Unsubscribed
    } else {
        InteractionKind::Other
    }
}

fn is_delivery_failure(event: &str) -> bool {
    event == "unsubscribed" || event.contains("fail")
}

#[derive(Debug, Default)]
struct SentWeek {
    sent: u64,
    success: u64,
    failed: u64,
    recipients: HashSet<String>,
}

/// Sent counts for one sequence family. The percentage is the share of sends
/// left after subtracting every unsubscribe or delivery failure logged in the
/// same week, whatever its tag.
pub fn calculate_sent_metrics(
    family: SequenceFamily,
    sent_log: &[Record],
    interactions: &[Record],
) -> Vec<Metric> {
    let mut buckets = fold_weekly::<SentWeek, _, _>(
        family.label(),
        sent_log,
        |record| {
            record
                .get_list(&[SEQUENCE])
                .iter()
                .any(|sequence| family.matches(sequence))
        },
        |week, record| {
            week.sent += 1;
            week.success += 1;
            let email = get_email(record);
            if !email.is_empty() {
                week.recipients.insert(email);
            }
        },
    );

    for record in interactions {
        let Some(week) = get_week_start(record) else {
            continue;
        };
        let Some(bucket) = buckets.get_mut(&week) else {
            continue;
        };
        if !is_delivery_failure(&lower_text(record, EVENT)) {
            continue;
        }
        bucket.success = bucket.success.saturating_sub(1);
        bucket.failed += 1;
    }

    materialize(buckets, |week, totals| {
        tracing::trace!(%week, sent = totals.sent, failed = totals.failed, "sent week");
        let mut metric = Metric::new(week, totals.sent as f64)
            .with_percentage(percent(totals.success as f64, totals.sent as f64));
        metric.unique_emails = Some(totals.recipients.len());
        metric
    })
}

pub fn calculate_mkt_outreach_sent(sent_log: &[Record], interactions: &[Record]) -> Vec<Metric> {
    calculate_sent_metrics(SequenceFamily::MktOutreach, sent_log, interactions)
}

pub fn calculate_nurture_sent(sent_log: &[Record], interactions: &[Record]) -> Vec<Metric> {
    calculate_sent_metrics(SequenceFamily::Nurture, sent_log, interactions)
}

#[derive(Debug, Default)]
struct InteractionWeek {
    opened: u64,
    clicked: u64,
    unsubscribed: u64,
    events: u64,
    opened_emails: HashSet<String>,
    clicked_emails: HashSet<String>,
    leads: HashSet<String>,
}

/// Opens per week for one tag family, with click-through as the percentage.
pub fn calculate_interaction_metrics(family: TagFamily, interactions: &[Record]) -> Vec<Metric> {
    let buckets = fold_weekly::<InteractionWeek, _, _>(
        family.label(),
        interactions,
        |record| family.matches_record(record),
        |week, record| {
            let email = get_email(record);
            let kind = classify_event(&lower_text(record, EVENT));
            week.events += 1;
            match kind {
                InteractionKind::Opened => week.opened += 1,
                InteractionKind::Clicked => week.clicked += 1,
                InteractionKind::Unsubscribed => week.unsubscribed += 1,
                InteractionKind::Other => {}
            }
            if email.is_empty() {
                return;
            }
            match kind {
                InteractionKind::Opened => {
                    week.opened_emails.insert(email.clone());
                }
                InteractionKind::Clicked => {
                    week.clicked_emails.insert(email.clone());
                }
                _ => {}
            }
            week.leads.insert(email);
        },
    );

    materialize(buckets, |week, totals| {
        tracing::trace!(%week, unsubscribed = totals.unsubscribed, "interaction week");
        let leads = totals.leads.len();
        let mut metric = Metric::new(week, totals.opened as f64)
            .with_percentage(percent(totals.clicked as f64, totals.opened as f64));
        metric.clicked = Some(totals.clicked as f64);
        metric.unique_emails_opened = Some(totals.opened_emails.len());
        metric.unique_emails_clicked = Some(totals.clicked_emails.len());
        metric.unique_leads = Some(leads);
        metric.avg_interactions_per_lead = if leads > 0 {
            Some(totals.events as f64 / leads as f64)
        } else {
            None
        };
        metric
    })
}

pub fn calculate_outreach_interactions(interactions: &[Record]) -> Vec<Metric> {
    calculate_interaction_metrics(TagFamily::Outreach, interactions)
}

pub fn calculate_nurture_interactions(interactions: &[Record]) -> Vec<Metric> {
    calculate_interaction_metrics(TagFamily::Nurture, interactions)
}

pub fn calculate_analysis_interactions(interactions: &[Record]) -> Vec<Metric> {
    calculate_interaction_metrics(TagFamily::AnalysisResult, interactions)
}
