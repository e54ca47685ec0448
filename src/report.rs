use std::fmt::Write;

use chrono::NaiveDate;

use crate::dashboard::DashboardMetrics;
use crate::metrics::latest_completed;
use crate::models::{DmDetailMetrics, InactiveLeadsReport, Metric};
use crate::week::{current_week_start, format_range, is_completed_week};

fn week_label(metric: &Metric) -> String {
    format_range(metric.week.as_str()).unwrap_or_else(|_| metric.week.to_string())
}

fn describe(metric: &Metric) -> String {
    let mut line = format!("{:.1}", metric.value);
    if let Some(percentage) = metric.percentage {
        let _ = write!(line, " ({percentage:.1}%)");
    }
    match (metric.previous_week, metric.change) {
        (Some(previous), Some(change)) => {
            let _ = write!(line, ", WoW {change:+.1}% vs {previous:.1}");
        }
        _ => line.push_str(", no prior week"),
    }
    line
}

pub fn build_report(
    dashboard: &DashboardMetrics,
    dm_details: &[DmDetailMetrics],
    inactive: Option<&InactiveLeadsReport>,
    today: NaiveDate,
) -> String {
    let mut output = String::new();
    let current = current_week_start(today);

    let _ = writeln!(output, "# Weekly Marketing Metrics");
    let _ = writeln!(
        output,
        "Generated {} (current week {}, figures are for the latest completed week)",
        today, current
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Week over Week");

    for (name, metrics) in dashboard.named_series() {
        match latest_completed(metrics, today) {
            Some(metric) => {
                let _ = writeln!(output, "- {} ({}): {}", name, week_label(metric), describe(metric));
            }
            None => {
                let _ = writeln!(output, "- {}: no completed weeks", name);
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## DM Top Conversations");

    let completed: Vec<&DmDetailMetrics> = dm_details
        .iter()
        .filter(|week| is_completed_week(week.week.as_str(), today))
        .collect();
    if completed.is_empty() {
        let _ = writeln!(output, "No DM activity in completed weeks.");
    } else {
        for week in completed.iter().rev().take(4) {
            let label = format_range(week.week.as_str()).unwrap_or_else(|_| week.week.to_string());
            match &week.top_conversation {
                Some(top) => {
                    let _ = writeln!(
                        output,
                        "- {}: {} of {} conversations, top {} with {} messages ({} by me, {} by correspondent)",
                        label,
                        week.total_messages_by_me + week.total_messages_by_correspondent,
                        week.conversation_count,
                        top.conversation_id,
                        top.total_messages,
                        top.messages_by_me,
                        top.messages_by_correspondent
                    );
                }
                None => {
                    let _ = writeln!(output, "- {}: no conversations", label);
                }
            }
        }
    }

    if let Some(inactive) = inactive {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Inactive Leads");
        let _ = writeln!(
            output,
            "{} leads visited since {} without ever submitting ({} with LinkedIn, {} without).",
            inactive.count,
            inactive.date_range.from,
            inactive.debug.with_linked_in,
            inactive.debug.without_linked_in
        );
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dm::SenderIdentity;
    use crate::record::records_from_value;
    use crate::source::Tables;
    use serde_json::json;

    #[test]
    fn reports_latest_completed_week_only() {
        let tables = Tables {
            sent_email_log: records_from_value(json!([
                {"Sequence": "MKT Outreach", "Week start of report date": "29/12/2024"},
                {"Sequence": "MKT Outreach", "Week start of report date": "29/12/2024"},
                {"Sequence": "MKT Outreach", "Week start of report date": "05/01/2025"},
                {"Sequence": "MKT Outreach", "Week start of report date": "12/01/2025"}
            ])),
            ..Tables::default()
        };
        let dashboard = DashboardMetrics::compute(&tables, &SenderIdentity::default());
        let today = NaiveDate::from_ymd_opt(2025, 1, 14).unwrap();

        let report = build_report(&dashboard, &[], None, today);
        assert!(report.contains(
            "- MKT outreach sent (Jan 05 – Jan 11, 2025): 1.0 (100.0%), WoW -50.0% vs 2.0"
        ));
        assert!(report.contains("- Nurture sent: no completed weeks"));
        assert!(report.contains("No DM activity in completed weeks."));
        assert!(!report.contains("## Inactive Leads"));
    }
}
