//! Week-over-week marketing and sales metrics.
//!
//! Raw table exports (leads, email logs, DM logs, website sessions) are folded
//! into weekly [`Metric`](models::Metric) series keyed by the Sunday that
//! starts each week. All aggregation is pure: the same records always produce
//! the same series, and "today" is always passed in.

pub mod dashboard;
pub mod dm;
pub mod dm_details;
pub mod email;
pub mod error;
pub mod fields;
pub mod funnel;
pub mod inactive;
pub mod leads;
pub mod metrics;
pub mod models;
pub mod record;
pub mod report;
pub mod source;
pub mod week;

pub use dashboard::DashboardMetrics;
pub use dm::SenderIdentity;
pub use error::{MetricsError, Result};
pub use models::{DmConversationDetail, DmDetailMetrics, InactiveLeadsReport, Metric};
pub use record::Record;
pub use week::WeekKey;
