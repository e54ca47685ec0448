use std::path::PathBuf;

use anyhow::Context;
use chrono::{Duration, Local, NaiveDate};
use clap::{ArgGroup, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use wow_dashboard_metrics::dm_details::calculate_dm_details;
use wow_dashboard_metrics::fields::parse_loose_date;
use wow_dashboard_metrics::inactive::{calculate_inactive_leads, InactiveLeadSources};
use wow_dashboard_metrics::report::build_report;
use wow_dashboard_metrics::source::{DirectorySource, Table, Tables};
use wow_dashboard_metrics::week::parse_week_start;
use wow_dashboard_metrics::{DashboardMetrics, InactiveLeadsReport, MetricsError, SenderIdentity};

#[derive(Parser)]
#[command(name = "wow-dashboard")]
#[command(about = "Week-over-week marketing and sales metrics from table exports", long_about = None)]
struct Cli {
    /// Directory holding one `<table>.json` or `<table>.csv` export per table
    #[arg(long, env = "DASHBOARD_DATA_DIR", default_value = "data", global = true)]
    data_dir: PathBuf,

    /// Treat this date as today (DD/MM/YYYY or YYYY-MM-DD)
    #[arg(long, env = "DASHBOARD_TODAY", global = true)]
    today: Option<String>,

    /// Sender labels that mean "me" in DM exports
    #[arg(long = "self-alias", env = "DASHBOARD_SELF_ALIASES", value_delimiter = ',', global = true)]
    self_aliases: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every weekly series as JSON
    Metrics,
    /// Print the per-week DM conversation breakdown as JSON
    DmDetails,
    /// Print leads who visited but never submitted as JSON
    #[command(group(
        ArgGroup::new("window")
            .args(["since_days", "from"])
            .multiple(false)
    ))]
    InactiveLeads {
        #[arg(long, default_value_t = 30)]
        since_days: i64,
        #[arg(long)]
        from: Option<String>,
    },
    /// Write a markdown summary of the latest completed week
    Report {
        #[arg(long, default_value_t = 30)]
        since_days: i64,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn parse_date_arg(raw: &str) -> anyhow::Result<NaiveDate> {
    parse_week_start(raw)
        .ok()
        .or_else(|| parse_loose_date(raw))
        .ok_or_else(|| MetricsError::InvalidDate(raw.to_string()))
        .map_err(anyhow::Error::from)
}

/// Start of a look-back window of `since_days` (at least one) ending today.
fn window_start(today: NaiveDate, since_days: i64) -> anyhow::Result<NaiveDate> {
    Duration::try_days(since_days.max(1))
        .and_then(|span| today.checked_sub_signed(span))
        .with_context(|| format!("--since-days {since_days} reaches past the supported date range"))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{rendered}");
    Ok(())
}

fn inactive_leads(tables: &Tables, from: NaiveDate, today: NaiveDate) -> InactiveLeadsReport {
    calculate_inactive_leads(
        InactiveLeadSources {
            primary_visits: &tables.lead_magnet_sessions,
            redemptive_visits: &tables.sales_funnel_sessions,
            submissions: &tables.lead_magnet_submissions,
            lead_list: &tables.lead_list,
        },
        from,
        today,
    )
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let today = match cli.today.as_deref() {
        Some(raw) => parse_date_arg(raw).context("invalid --today")?,
        None => Local::now().date_naive(),
    };
    let identity = if cli.self_aliases.is_empty() {
        SenderIdentity::default()
    } else {
        SenderIdentity::new(&cli.self_aliases)
    };

    let source = DirectorySource::new(&cli.data_dir);
    let tables = Tables::load(&source);
    for table in Table::ALL {
        tracing::info!(%table, records = tables.get(table).len(), dir = %source.dir().display(), "table ready");
    }

    match cli.command {
        Commands::Metrics => {
            print_json(&DashboardMetrics::compute(&tables, &identity))?;
        }
        Commands::DmDetails => {
            print_json(&calculate_dm_details(&tables.dm_log, &identity))?;
        }
        Commands::InactiveLeads { since_days, from } => {
            let from = match from.as_deref() {
                Some(raw) => parse_date_arg(raw).context("invalid --from")?,
                None => window_start(today, since_days)?,
            };
            print_json(&inactive_leads(&tables, from, today))?;
        }
        Commands::Report { since_days, out } => {
            let dashboard = DashboardMetrics::compute(&tables, &identity);
            let details = calculate_dm_details(&tables.dm_log, &identity);
            let inactive = inactive_leads(&tables, window_start(today, since_days)?, today);
            let report = build_report(&dashboard, &details, Some(&inactive), today);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            tracing::info!(out = %out.display(), "report written");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn window_start_counts_back_at_least_one_day() {
        let today = date(2025, 1, 20);
        assert_eq!(window_start(today, 30).unwrap(), date(2024, 12, 21));
        assert_eq!(window_start(today, 0).unwrap(), date(2025, 1, 19));
        assert_eq!(window_start(today, -5).unwrap(), date(2025, 1, 19));
    }

    #[test]
    fn window_start_rejects_out_of_range_spans() {
        let today = date(2025, 1, 20);
        assert!(window_start(today, i64::MAX).is_err());
        assert!(window_start(today, 1_000_000_000).is_err());
    }

    #[test]
    fn date_args_accept_both_formats() {
        assert_eq!(parse_date_arg("05/01/2025").unwrap(), date(2025, 1, 5));
        assert!(parse_date_arg("someday").is_err());
    }
}
