//! Per-week, per-conversation message breakdown.
//!
//! Unlike the new-conversation series, every week a conversation had traffic
//! gets its own entry for that conversation.

use std::collections::HashMap;

use crate::dm::{conversation_key, sender_of, SenderIdentity};
use crate::fields::SENT_TIME;
use crate::models::{DmConversationDetail, DmDetailMetrics};
use crate::record::Record;
use crate::week::WeekKey;

#[derive(Debug, Default)]
struct WeekDetails {
    conversations: Vec<DmConversationDetail>,
    index: HashMap<String, usize>,
    by_me: u64,
    by_correspondent: u64,
}

impl WeekDetails {
    fn conversation(&mut self, id: &str, week: &WeekKey) -> &mut DmConversationDetail {
        let position = match self.index.get(id) {
            Some(position) => *position,
            None => {
                self.conversations.push(DmConversationDetail {
                    conversation_id: id.to_string(),
                    week: week.clone(),
                    messages_by_me: 0,
                    messages_by_correspondent: 0,
                    total_messages: 0,
                    first_message_time: None,
                    last_message_time: None,
                });
                self.index.insert(id.to_string(), self.conversations.len() - 1);
                self.conversations.len() - 1
            }
        };
        &mut self.conversations[position]
    }

    /// Largest conversation by message count; the earliest one wins ties.
    fn top_conversation(&self) -> Option<DmConversationDetail> {
        let mut top: Option<&DmConversationDetail> = None;
        for conversation in &self.conversations {
            match top {
                Some(current) if conversation.total_messages <= current.total_messages => {}
                _ => top = Some(conversation),
            }
        }
        top.cloned()
    }
}

fn track_time(detail: &mut DmConversationDetail, sent_time: Option<String>) {
    let Some(sent_time) = sent_time else {
        return;
    };
    // Raw timestamps compare as strings.
    if detail
        .first_message_time
        .as_ref()
        .map_or(true, |first| sent_time < *first)
    {
        detail.first_message_time = Some(sent_time.clone());
    }
    if detail
        .last_message_time
        .as_ref()
        .map_or(true, |last| sent_time > *last)
    {
        detail.last_message_time = Some(sent_time);
    }
}

pub fn calculate_dm_details(records: &[Record], identity: &SenderIdentity) -> Vec<DmDetailMetrics> {
    let mut weeks: HashMap<WeekKey, WeekDetails> = HashMap::new();
    let mut skipped = 0usize;

    for record in records {
        let Some((conversation_id, week)) = conversation_key(record) else {
            skipped += 1;
            continue;
        };
        let from_me = identity.is_me(&sender_of(record));
        let details = weeks.entry(week.clone()).or_default();
        if from_me {
            details.by_me += 1;
        } else {
            details.by_correspondent += 1;
        }

        let detail = details.conversation(&conversation_id, &week);
        if from_me {
            detail.messages_by_me += 1;
        } else {
            detail.messages_by_correspondent += 1;
        }
        detail.total_messages += 1;
        track_time(detail, record.get_text(&[SENT_TIME]));
    }

    tracing::debug!(
        total = records.len(),
        skipped,
        weeks = weeks.len(),
        "built DM conversation details"
    );

    let mut metrics: Vec<DmDetailMetrics> = weeks
        .into_iter()
        .map(|(week, details)| {
            let top_conversation = details.top_conversation();
            DmDetailMetrics {
                week,
                total_messages_by_me: details.by_me,
                total_messages_by_correspondent: details.by_correspondent,
                conversation_count: details.conversations.len(),
                conversations: details.conversations,
                top_conversation,
            }
        })
        .collect();
    metrics.sort_by(|a, b| a.week.cmp(&b.week));
    metrics
}
