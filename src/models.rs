use chrono::NaiveDate;
use serde::Serialize;

use crate::week::WeekKey;

/// One week of a named series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub week: WeekKey,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_week: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clicked: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replied: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_emails: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_emails_opened: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_emails_clicked: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_leads: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_interactions_per_lead: Option<f64>,
}

impl Metric {
    pub fn new(week: WeekKey, value: f64) -> Self {
        Self {
            week,
            value,
            percentage: None,
            previous_week: None,
            change: None,
            clicked: None,
            replied: None,
            unique_emails: None,
            unique_emails_opened: None,
            unique_emails_clicked: None,
            unique_leads: None,
            avg_interactions_per_lead: None,
        }
    }

    pub fn with_percentage(mut self, percentage: Option<f64>) -> Self {
        self.percentage = percentage;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DmConversationDetail {
    pub conversation_id: String,
    pub week: WeekKey,
    pub messages_by_me: u64,
    pub messages_by_correspondent: u64,
    pub total_messages: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_message_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DmDetailMetrics {
    pub week: WeekKey,
    pub total_messages_by_me: u64,
    pub total_messages_by_correspondent: u64,
    pub conversation_count: usize,
    pub conversations: Vec<DmConversationDetail>,
    pub top_conversation: Option<DmConversationDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InactiveLead {
    pub email: String,
    pub linked_in_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InactiveLeadsDebug {
    pub visited_either: usize,
    pub visited_primary_only: usize,
    pub visited_redemptive_only: usize,
    pub visited_both: usize,
    pub total_submissions_ever: usize,
    pub inactive_count: usize,
    pub with_linked_in: usize,
    pub without_linked_in: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InactiveLeadsReport {
    pub leads: Vec<InactiveLead>,
    pub count: usize,
    pub date_range: DateRange,
    pub criteria: Vec<String>,
    pub debug: InactiveLeadsDebug,
}
