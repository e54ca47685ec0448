//! Leads who visited a tracked site since a cutoff but never submitted.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::NaiveDate;

use crate::fields::{
    get_email, get_linkedin_url, get_record_date, is_recommendation, LEAD_LIST_SOURCE, SOURCE_MEDIUM,
};
use crate::models::{DateRange, InactiveLead, InactiveLeadsDebug, InactiveLeadsReport};
use crate::record::Record;

/// Record collections the inactive-lead computation joins by email.
#[derive(Debug, Clone, Copy)]
pub struct InactiveLeadSources<'a> {
    pub primary_visits: &'a [Record],
    pub redemptive_visits: &'a [Record],
    pub submissions: &'a [Record],
    pub lead_list: &'a [Record],
}

fn is_internal(record: &Record) -> bool {
    record
        .get_list(&[LEAD_LIST_SOURCE])
        .iter()
        .any(|source| source.to_lowercase().contains("internal"))
}

fn is_test_traffic(record: &Record) -> bool {
    record
        .get_text(&[SOURCE_MEDIUM])
        .is_some_and(|medium| medium.to_lowercase().contains("test"))
}

/// Emails of qualifying visits on or after `from`, with any LinkedIn URL the
/// visit itself carries.
fn collect_visitors(
    visits: &[Record],
    from: NaiveDate,
    linkedin: &mut HashMap<String, String>,
) -> BTreeSet<String> {
    let mut visitors = BTreeSet::new();
    for record in visits {
        let email = get_email(record);
        if email.is_empty() {
            continue;
        }
        if !get_record_date(record).is_some_and(|date| date >= from) {
            continue;
        }
        if is_internal(record) || is_test_traffic(record) || !is_recommendation(record) {
            continue;
        }
        if let Some(url) = get_linkedin_url(record) {
            linkedin.entry(email.clone()).or_insert(url);
        }
        visitors.insert(email);
    }
    visitors
}

fn criteria(from: NaiveDate) -> Vec<String> {
    vec![
        format!("visited the primary or redemptive site on or after {from}"),
        "lead list source does not contain \"internal\"".to_string(),
        "source / medium does not contain \"test\"".to_string(),
        "medium contains \"rec\"".to_string(),
        "never submitted (all time)".to_string(),
    ]
}

pub fn calculate_inactive_leads(
    sources: InactiveLeadSources<'_>,
    from: NaiveDate,
    today: NaiveDate,
) -> InactiveLeadsReport {
    let mut visit_linkedin: HashMap<String, String> = HashMap::new();
    let primary = collect_visitors(sources.primary_visits, from, &mut visit_linkedin);
    let redemptive = collect_visitors(sources.redemptive_visits, from, &mut visit_linkedin);

    let submitted: HashSet<String> = sources
        .submissions
        .iter()
        .map(get_email)
        .filter(|email| !email.is_empty())
        .collect();

    let mut lead_linkedin: HashMap<String, String> = HashMap::new();
    for record in sources.lead_list {
        let email = get_email(record);
        if email.is_empty() {
            continue;
        }
        if let Some(url) = get_linkedin_url(record) {
            lead_linkedin.entry(email).or_insert(url);
        }
    }

    let visited: BTreeSet<&String> = primary.union(&redemptive).collect();
    let leads: Vec<InactiveLead> = visited
        .iter()
        .filter(|email| !submitted.contains(email.as_str()))
        .map(|email| InactiveLead {
            email: (*email).clone(),
            linked_in_url: visit_linkedin
                .get(*email)
                .or_else(|| lead_linkedin.get(*email))
                .cloned(),
        })
        .collect();

    let with_linked_in = leads.iter().filter(|lead| lead.linked_in_url.is_some()).count();
    let both = primary.intersection(&redemptive).count();
    let tally = InactiveLeadsDebug {
        visited_either: visited.len(),
        visited_primary_only: primary.len() - both,
        visited_redemptive_only: redemptive.len() - both,
        visited_both: both,
        total_submissions_ever: submitted.len(),
        inactive_count: leads.len(),
        with_linked_in,
        without_linked_in: leads.len() - with_linked_in,
    };

    tracing::debug!(?tally, %from, "computed inactive leads");

    InactiveLeadsReport {
        count: leads.len(),
        leads,
        date_range: DateRange { from, to: today },
        criteria: criteria(from),
        debug: tally,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::records_from_value;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn visit(email: &str, day: &str, medium: &str) -> serde_json::Value {
        json!({"Email": email, "report date": day, "Source / medium": medium})
    }

    #[test]
    fn excludes_anyone_who_ever_submitted() {
        let primary = records_from_value(json!([
            visit("a@x.com", "10/01/2025", "rec / partner"),
            visit("b@x.com", "10/01/2025", "rec / partner")
        ]));
        let submissions = records_from_value(json!([
            {"Email": "B@x.com", "report date": "01/01/2015"}
        ]));

        let report = calculate_inactive_leads(
            InactiveLeadSources {
                primary_visits: &primary,
                redemptive_visits: &[],
                submissions: &submissions,
                lead_list: &[],
            },
            date(2025, 1, 5),
            date(2025, 1, 20),
        );

        assert_eq!(report.count, 1);
        assert_eq!(report.leads[0].email, "a@x.com");
        assert_eq!(report.debug.total_submissions_ever, 1);
        assert_eq!(report.date_range.to, date(2025, 1, 20));
    }

    #[test]
    fn filters_by_date_source_and_medium() {
        let primary = records_from_value(json!([
            visit("on-boundary@x.com", "05/01/2025", "recommendation"),
            visit("before@x.com", "04/01/2025", "recommendation"),
            {"Email": "undated@x.com", "Source / medium": "recommendation"},
            visit("organic@x.com", "06/01/2025", "google / organic"),
            visit("tester@x.com", "06/01/2025", "rec / test"),
            {"Email": "staff@x.com", "report date": "06/01/2025", "Source / medium": "rec", "Source (from Lead list)": ["Internal team"]}
        ]));

        let report = calculate_inactive_leads(
            InactiveLeadSources {
                primary_visits: &primary,
                redemptive_visits: &[],
                submissions: &[],
                lead_list: &[],
            },
            date(2025, 1, 5),
            date(2025, 1, 20),
        );

        let emails: Vec<&str> = report.leads.iter().map(|lead| lead.email.as_str()).collect();
        assert_eq!(emails, vec!["on-boundary@x.com"]);
    }

    #[test]
    fn tallies_overlap_and_linkedin_sources() {
        let primary = records_from_value(json!([
            visit("a@x.com", "10/01/2025", "rec"),
            visit("b@x.com", "10/01/2025", "rec")
        ]));
        let redemptive = records_from_value(json!([
            {"Email": "b@x.com", "report date": "11/01/2025", "Source / medium": "rec", "Person Linkedin Url": "https://linkedin.com/in/b"},
            visit("c@x.com", "11/01/2025", "rec")
        ]));
        let lead_list = records_from_value(json!([
            {"Email": "a@x.com", "Lead Linkedin Url (from Lead list)": "https://linkedin.com/in/a"},
            {"Email": "b@x.com", "Person Linkedin Url": "https://linkedin.com/in/b-old"}
        ]));

        let report = calculate_inactive_leads(
            InactiveLeadSources {
                primary_visits: &primary,
                redemptive_visits: &redemptive,
                submissions: &[],
                lead_list: &lead_list,
            },
            date(2025, 1, 5),
            date(2025, 1, 20),
        );

        assert_eq!(report.debug.visited_either, 3);
        assert_eq!(report.debug.visited_primary_only, 1);
        assert_eq!(report.debug.visited_redemptive_only, 1);
        assert_eq!(report.debug.visited_both, 1);
        assert_eq!(report.debug.with_linked_in, 2);
        assert_eq!(report.debug.without_linked_in, 1);
        assert_eq!(report.leads[0].linked_in_url.as_deref(), Some("https://linkedin.com/in/a"));
        assert_eq!(report.leads[1].linked_in_url.as_deref(), Some("https://linkedin.com/in/b"));
        assert_eq!(report.leads[2].linked_in_url, None);
    }

    #[test]
    fn repeated_calls_agree() {
        let primary = records_from_value(json!([
            visit("c@x.com", "10/01/2025", "rec"),
            visit("a@x.com", "10/01/2025", "rec"),
            visit("b@x.com", "12/01/2025", "rec")
        ]));
        let redemptive = records_from_value(json!([
            {"Email": "d@x.com", "report date": "11/01/2025", "Source / medium": "rec", "Person Linkedin Url": "https://linkedin.com/in/d"},
            visit("a@x.com", "11/01/2025", "rec")
        ]));
        let submissions = records_from_value(json!([{"Email": "b@x.com"}]));
        let sources = InactiveLeadSources {
            primary_visits: &primary,
            redemptive_visits: &redemptive,
            submissions: &submissions,
            lead_list: &[],
        };

        let first = calculate_inactive_leads(sources, date(2025, 1, 5), date(2025, 1, 20));
        assert_eq!(first, calculate_inactive_leads(sources, date(2025, 1, 5), date(2025, 1, 20)));
        assert_eq!(first.count, 3);
        assert_eq!(first.debug.inactive_count, 3);
    }
}
