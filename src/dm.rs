//! LinkedIn DM conversation state: new conversations, replies and follow-ups.
//!
//! A conversation belongs to the week it was first seen. A reply is credited
//! to that first week no matter when the reply message arrived.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::fields::{get_week_start, CONVERSATION_ID, SENDER};
use crate::metrics::{materialize, percent};
use crate::models::Metric;
use crate::record::Record;
use crate::week::WeekKey;

/// Sender labels that identify the account owner in DM exports.
pub const DEFAULT_SELF_ALIASES: &[&str] = &["(me)", "(you)", "myself"];

/// "Is this message mine?" heuristic over the free-text `Sender` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderIdentity {
    aliases: Vec<String>,
}

impl Default for SenderIdentity {
    fn default() -> Self {
        Self::new(DEFAULT_SELF_ALIASES.iter().copied())
    }
}

impl SenderIdentity {
    pub fn new<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let aliases = aliases
            .into_iter()
            .map(|alias| alias.as_ref().trim().to_lowercase())
            .filter(|alias| !alias.is_empty())
            .collect();
        Self { aliases }
    }

    /// Empty, exactly `me`, or containing one of the aliases.
    pub fn is_me(&self, sender: &str) -> bool {
        let sender = sender.trim().to_lowercase();
        sender.is_empty()
            || sender == "me"
            || self.aliases.iter().any(|alias| sender.contains(alias.as_str()))
    }

    /// Collapse every self label to `me` so distinct senders can be counted.
    pub fn normalize(&self, sender: &str) -> String {
        if self.is_me(sender) {
            "me".to_string()
        } else {
            sender.trim().to_lowercase()
        }
    }
}

/// A row's conversation id and week, when it has both.
pub(crate) fn conversation_key(record: &Record) -> Option<(String, WeekKey)> {
    let week = get_week_start(record)?;
    let conversation = record.get_text(&[CONVERSATION_ID])?;
    Some((conversation, week))
}

pub(crate) fn sender_of(record: &Record) -> String {
    record.get_text(&[SENDER]).unwrap_or_default()
}

#[derive(Debug)]
struct ConversationSummary {
    first_week: WeekKey,
    senders: HashSet<String>,
}

impl ConversationSummary {
    fn replied(&self) -> bool {
        self.senders.len() >= 2
    }
}

#[derive(Debug, Default)]
struct NewConversationWeek {
    started: u64,
    replied: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DmMetrics {
    pub new_conversations: Vec<Metric>,
    pub replies: Vec<Metric>,
    pub follow_ups: Vec<Metric>,
}

fn summarize_conversations(
    records: &[Record],
    identity: &SenderIdentity,
) -> HashMap<String, ConversationSummary> {
    let mut conversations: HashMap<String, ConversationSummary> = HashMap::new();
    let mut skipped = 0usize;

    for record in records {
        let Some((conversation, week)) = conversation_key(record) else {
            skipped += 1;
            continue;
        };
        let sender = identity.normalize(&sender_of(record));
        let summary = conversations
            .entry(conversation)
            .or_insert_with(|| ConversationSummary {
                first_week: week.clone(),
                senders: HashSet::new(),
            });
        if week < summary.first_week {
            summary.first_week = week;
        }
        summary.senders.insert(sender);
    }

    tracing::debug!(
        total = records.len(),
        skipped,
        conversations = conversations.len(),
        "grouped DM records by conversation"
    );
    conversations
}

/// New conversations per first-seen week, with replies credited to that week.
pub fn calculate_dm_new_conversations(records: &[Record], identity: &SenderIdentity) -> Vec<Metric> {
    calculate_dm_metrics(records, identity).new_conversations
}

pub fn calculate_dm_metrics(records: &[Record], identity: &SenderIdentity) -> DmMetrics {
    let conversations = summarize_conversations(records, identity);

    let mut by_week: HashMap<WeekKey, NewConversationWeek> = HashMap::new();
    for summary in conversations.values() {
        let week = by_week.entry(summary.first_week.clone()).or_default();
        week.started += 1;
        if summary.replied() {
            week.replied += 1;
        }
    }

    let mut follow_ups: HashMap<WeekKey, HashSet<String>> = HashMap::new();
    for record in records {
        let Some((conversation, week)) = conversation_key(record) else {
            continue;
        };
        let Some(summary) = conversations.get(&conversation) else {
            continue;
        };
        if week > summary.first_week && identity.is_me(&sender_of(record)) {
            follow_ups.entry(week).or_default().insert(conversation);
        }
    }

    let replies = materialize(
        by_week
            .iter()
            .map(|(week, totals)| (week.clone(), (totals.started, totals.replied)))
            .collect(),
        |week, (started, replied)| {
            Metric::new(week, replied as f64).with_percentage(percent(replied as f64, started as f64))
        },
    );

    let new_conversations = materialize(by_week, |week, totals| {
        let mut metric = Metric::new(week, totals.started as f64)
            .with_percentage(percent(totals.replied as f64, totals.started as f64));
        metric.replied = Some(totals.replied as f64);
        metric
    });

    let follow_ups = materialize(follow_ups, |week, conversations| {
        Metric::new(week, conversations.len() as f64)
    });

    DmMetrics {
        new_conversations,
        replies,
        follow_ups,
    }
}
