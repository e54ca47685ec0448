//! Accumulate-then-materialize helpers shared by every weekly series.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::fields::get_week_start;
use crate::models::Metric;
use crate::record::Record;
use crate::week::{is_completed_week, WeekKey};

/// Fold `records` into per-week accumulators.
///
/// Records without a week start, or rejected by `include`, are skipped.
pub fn fold_weekly<A, P, U>(
    series: &str,
    records: &[Record],
    include: P,
    mut update: U,
) -> HashMap<WeekKey, A>
where
    A: Default,
    P: Fn(&Record) -> bool,
    U: FnMut(&mut A, &Record),
{
    let mut buckets: HashMap<WeekKey, A> = HashMap::new();
    let mut missing_week = 0usize;
    let mut rejected = 0usize;

    for record in records {
        let Some(week) = get_week_start(record) else {
            missing_week += 1;
            continue;
        };
        if !include(record) {
            rejected += 1;
            continue;
        }
        update(buckets.entry(week).or_default(), record);
    }

    tracing::debug!(
        series,
        total = records.len(),
        missing_week,
        rejected,
        weeks = buckets.len(),
        "folded records into weekly buckets"
    );
    buckets
}

/// Build one metric per bucket, order chronologically and attach deltas.
pub fn materialize<A, F>(buckets: HashMap<WeekKey, A>, build: F) -> Vec<Metric>
where
    F: Fn(WeekKey, A) -> Metric,
{
    let mut metrics: Vec<Metric> = buckets
        .into_iter()
        .map(|(week, accumulator)| build(week, accumulator))
        .collect();
    metrics.sort_by(|a, b| a.week.cmp(&b.week));
    with_week_over_week_deltas(metrics)
}

/// Set `previous_week` and `change` on every metric after the first.
/// `change` is 0 when the previous value is not positive.
pub fn with_week_over_week_deltas(mut metrics: Vec<Metric>) -> Vec<Metric> {
    for index in 1..metrics.len() {
        let previous = metrics[index - 1].value;
        let metric = &mut metrics[index];
        metric.previous_week = Some(previous);
        metric.change = Some(if previous > 0.0 {
            (metric.value - previous) / previous * 100.0
        } else {
            0.0
        });
    }
    metrics
}

/// `numerator / denominator * 100`, absent when the denominator is zero.
pub fn percent(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator > 0.0 {
        Some(numerator / denominator * 100.0)
    } else {
        None
    }
}

/// Most recent metric whose week has finished, for "this week vs last" cards.
pub fn latest_completed(metrics: &[Metric], today: NaiveDate) -> Option<&Metric> {
    metrics
        .iter()
        .rev()
        .find(|metric| is_completed_week(metric.week.as_str(), today))
}
