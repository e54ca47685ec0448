use serde::Serialize;

use crate::dm::{calculate_dm_metrics, SenderIdentity};
use crate::email::{
    calculate_analysis_interactions, calculate_mkt_outreach_sent, calculate_nurture_interactions,
    calculate_nurture_sent, calculate_outreach_interactions,
};
use crate::funnel::{calculate_lead_magnet_metrics, calculate_sales_funnel_metrics};
use crate::leads::calculate_organic_leads;
use crate::models::Metric;
use crate::source::Tables;

/// Every weekly series the dashboard plots, keyed the way the cards name them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub mkt_outreach_sent: Vec<Metric>,
    pub nurture_sent: Vec<Metric>,
    pub outreach_interactions: Vec<Metric>,
    pub nurture_interactions: Vec<Metric>,
    pub analysis_interactions: Vec<Metric>,
    pub dm_new_conversations: Vec<Metric>,
    pub dm_replies: Vec<Metric>,
    pub dm_follow_ups: Vec<Metric>,
    pub organic_leads: Vec<Metric>,
    pub lead_magnet_landed: Vec<Metric>,
    pub lead_magnet_avg_duration: Vec<Metric>,
    pub lead_magnet_submissions: Vec<Metric>,
    pub sales_funnel_landed: Vec<Metric>,
    pub sales_funnel_avg_duration: Vec<Metric>,
    pub sales_funnel_clicks: Vec<Metric>,
    pub sales_funnel_click_to_landed: Vec<Metric>,
}

impl DashboardMetrics {
    pub fn compute(tables: &Tables, identity: &SenderIdentity) -> Self {
        let dm = calculate_dm_metrics(&tables.dm_log, identity);
        let lead_magnet =
            calculate_lead_magnet_metrics(&tables.lead_magnet_sessions, &tables.lead_magnet_submissions);
        let sales = calculate_sales_funnel_metrics(&tables.sales_funnel_sessions);

        Self {
            mkt_outreach_sent: calculate_mkt_outreach_sent(&tables.sent_email_log, &tables.email_interactions),
            nurture_sent: calculate_nurture_sent(&tables.sent_email_log, &tables.email_interactions),
            outreach_interactions: calculate_outreach_interactions(&tables.email_interactions),
            nurture_interactions: calculate_nurture_interactions(&tables.email_interactions),
            analysis_interactions: calculate_analysis_interactions(&tables.email_interactions),
            dm_new_conversations: dm.new_conversations,
            dm_replies: dm.replies,
            dm_follow_ups: dm.follow_ups,
            organic_leads: calculate_organic_leads(&tables.lead_list),
            lead_magnet_landed: lead_magnet.landed,
            lead_magnet_avg_duration: lead_magnet.avg_duration,
            lead_magnet_submissions: lead_magnet.submissions,
            sales_funnel_landed: sales.landed,
            sales_funnel_avg_duration: sales.avg_duration,
            sales_funnel_clicks: sales.clicks,
            sales_funnel_click_to_landed: sales.click_to_landed,
        }
    }

    /// Display name and series, in card order.
    pub fn named_series(&self) -> Vec<(&'static str, &[Metric])> {
        vec![
            ("MKT outreach sent", self.mkt_outreach_sent.as_slice()),
            ("Nurture sent", self.nurture_sent.as_slice()),
            ("Outreach opens", self.outreach_interactions.as_slice()),
            ("Nurture opens", self.nurture_interactions.as_slice()),
            ("Analysis result opens", self.analysis_interactions.as_slice()),
            ("DM new conversations", self.dm_new_conversations.as_slice()),
            ("DM replies", self.dm_replies.as_slice()),
            ("DM follow-ups", self.dm_follow_ups.as_slice()),
            ("Organic leads", self.organic_leads.as_slice()),
            ("Lead magnet landed", self.lead_magnet_landed.as_slice()),
            ("Lead magnet avg duration (s)", self.lead_magnet_avg_duration.as_slice()),
            ("Lead magnet submissions", self.lead_magnet_submissions.as_slice()),
            ("Sales funnel landed", self.sales_funnel_landed.as_slice()),
            ("Sales funnel avg duration (s)", self.sales_funnel_avg_duration.as_slice()),
            ("Book a call clicks", self.sales_funnel_clicks.as_slice()),
            ("% Landed over Clicked", self.sales_funnel_click_to_landed.as_slice()),
        ]
    }
}
