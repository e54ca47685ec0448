//! Website session series for the lead-magnet and sales-funnel pages.
//!
//! Only recommendation traffic (medium containing `rec`) counts as a session.

use std::collections::HashMap;

use serde::Serialize;

use crate::fields::{is_recommendation, BOOK_A_CALL_CLICKS, SESSION_DURATION};
use crate::metrics::{fold_weekly, materialize, percent};
use crate::models::Metric;
use crate::record::Record;
use crate::week::WeekKey;

#[derive(Debug, Default)]
struct SessionWeek {
    landed: u64,
    duration_seconds: f64,
    clicks: f64,
}

impl SessionWeek {
    fn avg_duration(&self) -> f64 {
        if self.landed == 0 {
            0.0
        } else {
            self.duration_seconds / self.landed as f64
        }
    }
}

/// Clicks recorded on a session: a number, or a checkbox-style flag.
fn click_count(record: &Record) -> f64 {
    if let Some(clicks) = record.get_number(&[BOOK_A_CALL_CLICKS]) {
        return clicks.max(0.0);
    }
    match record
        .get_text(&[BOOK_A_CALL_CLICKS])
        .map(|text| text.to_lowercase())
        .as_deref()
    {
        Some("true" | "yes" | "checked") => 1.0,
        _ => 0.0,
    }
}

fn fold_sessions(label: &str, sessions: &[Record]) -> HashMap<WeekKey, SessionWeek> {
    fold_weekly::<SessionWeek, _, _>(label, sessions, is_recommendation, |week, record| {
        week.landed += 1;
        week.duration_seconds += record.get_number(&[SESSION_DURATION]).unwrap_or(0.0);
        week.clicks += click_count(record);
    })
}

fn series<F>(buckets: &HashMap<WeekKey, SessionWeek>, build: F) -> Vec<Metric>
where
    F: Fn(WeekKey, &SessionWeek) -> Metric,
{
    materialize(
        buckets.iter().map(|(week, totals)| (week.clone(), totals)).collect(),
        |week, totals| build(week, totals),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadMagnetMetrics {
    pub landed: Vec<Metric>,
    pub avg_duration: Vec<Metric>,
    pub submissions: Vec<Metric>,
}

pub fn calculate_lead_magnet_metrics(sessions: &[Record], submissions: &[Record]) -> LeadMagnetMetrics {
    let buckets = fold_sessions("lead magnet sessions", sessions);
    let submitted = fold_weekly::<u64, _, _>("lead magnet submissions", submissions, |_| true, |count, _| {
        *count += 1;
    });

    LeadMagnetMetrics {
        landed: series(&buckets, |week, totals| Metric::new(week, totals.landed as f64)),
        avg_duration: series(&buckets, |week, totals| Metric::new(week, totals.avg_duration())),
        submissions: materialize(submitted, |week, count| Metric::new(week, count as f64)),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesFunnelMetrics {
    pub landed: Vec<Metric>,
    pub avg_duration: Vec<Metric>,
    pub clicks: Vec<Metric>,
    pub click_to_landed: Vec<Metric>,
}

/// `click_to_landed` carries clicks as its value and landed over clicks as
/// its percentage, the "% Landed over Clicked" figure.
pub fn calculate_sales_funnel_metrics(sessions: &[Record]) -> SalesFunnelMetrics {
    let buckets = fold_sessions("sales funnel sessions", sessions);

    SalesFunnelMetrics {
        landed: series(&buckets, |week, totals| Metric::new(week, totals.landed as f64)),
        avg_duration: series(&buckets, |week, totals| Metric::new(week, totals.avg_duration())),
        clicks: series(&buckets, |week, totals| Metric::new(week, totals.clicks)),
        click_to_landed: series(&buckets, |week, totals| {
            Metric::new(week, totals.clicks)
                .with_percentage(percent(totals.landed as f64, totals.clicks))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::records_from_value;
    use serde_json::json;

    #[test]
    fn only_recommendation_traffic_lands() {
        let sessions = records_from_value(json!([
            {"Source / medium": "Recommended-by-partner", "Session Duration (second)": 30, "Week start of report date": "05/01/2025"},
            {"Medium": "organic", "Session Duration (second)": 500, "Week start of report date": "05/01/2025"},
            {"source_medium": "newsletter / rec", "Session Duration (second)": "90", "Week start of report date": "05/01/2025"},
            {"Medium": "rec", "Week start of report date": "12/01/2025"}
        ]));
        let submissions = records_from_value(json!([
            {"Email": "a@x.com", "Week start of report date": "12/01/2025"},
            {"Email": "b@x.com", "Week start of report date": "12/01/2025"},
            {"Email": "c@x.com"}
        ]));

        let metrics = calculate_lead_magnet_metrics(&sessions, &submissions);
        assert_eq!(metrics.landed.len(), 2);
        assert_eq!(metrics.landed[0].value, 2.0);
        assert_eq!(metrics.landed[1].value, 1.0);
        assert_eq!(metrics.avg_duration[0].value, 60.0);
        assert_eq!(metrics.avg_duration[1].value, 0.0);
        assert_eq!(metrics.avg_duration[1].change, Some(-100.0));
        assert_eq!(metrics.submissions.len(), 1);
        assert_eq!(metrics.submissions[0].value, 2.0);
    }

    #[test]
    fn landed_over_clicked_ratio_direction() {
        let sessions = records_from_value(json!([
            {"Medium": "rec", "Click book a call button": 1, "Week start of report date": "05/01/2025"},
            {"Medium": "rec", "Click book a call button": "true", "Week start of report date": "05/01/2025"},
            {"Medium": "rec", "Week start of report date": "05/01/2025"},
            {"Medium": "rec", "Week start of report date": "05/01/2025"},
            {"Medium": "rec", "Click book a call button": 0, "Week start of report date": "12/01/2025"}
        ]));

        let metrics = calculate_sales_funnel_metrics(&sessions);
        assert_eq!(metrics.landed[0].value, 4.0);
        assert_eq!(metrics.clicks[0].value, 2.0);
        assert_eq!(metrics.click_to_landed[0].value, 2.0);
        assert_eq!(metrics.click_to_landed[0].percentage, Some(200.0));
        assert_eq!(metrics.click_to_landed[1].percentage, None);
        assert_eq!(metrics.clicks[1].change, Some(-100.0));
    }

    #[test]
    fn repeated_calls_agree() {
        let sessions = records_from_value(json!([
            {"Medium": "rec", "Session Duration (second)": 40, "Click book a call button": 1, "Week start of report date": "12/01/2025"},
            {"Medium": "rec", "Session Duration (second)": 20, "Week start of report date": "05/01/2025"},
            {"Medium": "rec", "Week start of report date": "19/01/2025"}
        ]));
        let submissions = records_from_value(json!([
            {"Email": "a@x.com", "Week start of report date": "19/01/2025"},
            {"Email": "b@x.com", "Week start of report date": "05/01/2025"}
        ]));

        assert_eq!(
            calculate_lead_magnet_metrics(&sessions, &submissions),
            calculate_lead_magnet_metrics(&sessions, &submissions)
        );
        assert_eq!(
            calculate_sales_funnel_metrics(&sessions),
            calculate_sales_funnel_metrics(&sessions)
        );
    }
}
