//! Supplies raw table exports to the aggregators.
//!
//! Each table is fetched on its own. A table that fails to load becomes an
//! empty collection so the remaining series still render.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

use crate::record::{records_from_value, FieldValue, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    LeadList,
    SentEmailLog,
    EmailInteractions,
    DmLog,
    LeadMagnetSessions,
    LeadMagnetSubmissions,
    SalesFunnelSessions,
}

impl Table {
    pub const ALL: [Table; 7] = [
        Table::LeadList,
        Table::SentEmailLog,
        Table::EmailInteractions,
        Table::DmLog,
        Table::LeadMagnetSessions,
        Table::LeadMagnetSubmissions,
        Table::SalesFunnelSessions,
    ];

    pub fn stem(self) -> &'static str {
        match self {
            Table::LeadList => "lead_list",
            Table::SentEmailLog => "sent_email_log",
            Table::EmailInteractions => "email_interactions",
            Table::DmLog => "dm_log",
            Table::LeadMagnetSessions => "lead_magnet_sessions",
            Table::LeadMagnetSubmissions => "lead_magnet_submissions",
            Table::SalesFunnelSessions => "sales_funnel_sessions",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stem())
    }
}

pub trait RecordSource {
    fn fetch(&self, table: Table) -> anyhow::Result<Vec<Record>>;
}

/// Reads `<stem>.json` or `<stem>.csv` exports from one directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl RecordSource for DirectorySource {
    fn fetch(&self, table: Table) -> anyhow::Result<Vec<Record>> {
        let json_path = self.dir.join(format!("{}.json", table.stem()));
        if json_path.is_file() {
            return read_json(&json_path);
        }
        let csv_path = self.dir.join(format!("{}.csv", table.stem()));
        if csv_path.is_file() {
            return read_csv(&csv_path);
        }
        bail!("no export for table {table} in {}", self.dir.display())
    }
}

fn read_json(path: &Path) -> anyhow::Result<Vec<Record>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(records_from_value(value))
}

/// Header row names the fields; blank cells are left absent.
fn read_csv(path: &Path) -> anyhow::Result<Vec<Record>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let headers = reader.headers()?.clone();
    let mut records = Vec::new();

    for result in reader.records() {
        let row = result.with_context(|| format!("malformed row in {}", path.display()))?;
        let mut record = Record::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            if !cell.trim().is_empty() {
                record.insert(header, FieldValue::Text(cell.to_string()));
            }
        }
        records.push(record);
    }

    Ok(records)
}

/// Every table the dashboard reads, already materialized.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub lead_list: Vec<Record>,
    pub sent_email_log: Vec<Record>,
    pub email_interactions: Vec<Record>,
    pub dm_log: Vec<Record>,
    pub lead_magnet_sessions: Vec<Record>,
    pub lead_magnet_submissions: Vec<Record>,
    pub sales_funnel_sessions: Vec<Record>,
}

impl Tables {
    pub fn load(source: &dyn RecordSource) -> Self {
        Self {
            lead_list: fetch_or_empty(source, Table::LeadList),
            sent_email_log: fetch_or_empty(source, Table::SentEmailLog),
            email_interactions: fetch_or_empty(source, Table::EmailInteractions),
            dm_log: fetch_or_empty(source, Table::DmLog),
            lead_magnet_sessions: fetch_or_empty(source, Table::LeadMagnetSessions),
            lead_magnet_submissions: fetch_or_empty(source, Table::LeadMagnetSubmissions),
            sales_funnel_sessions: fetch_or_empty(source, Table::SalesFunnelSessions),
        }
    }

    pub fn get(&self, table: Table) -> &[Record] {
        match table {
            Table::LeadList => &self.lead_list,
            Table::SentEmailLog => &self.sent_email_log,
            Table::EmailInteractions => &self.email_interactions,
            Table::DmLog => &self.dm_log,
            Table::LeadMagnetSessions => &self.lead_magnet_sessions,
            Table::LeadMagnetSubmissions => &self.lead_magnet_submissions,
            Table::SalesFunnelSessions => &self.sales_funnel_sessions,
        }
    }
}

fn fetch_or_empty(source: &dyn RecordSource, table: Table) -> Vec<Record> {
    match source.fetch(table) {
        Ok(records) => {
            tracing::debug!(%table, records = records.len(), "loaded table");
            records
        }
        Err(error) => {
            tracing::warn!(%table, error = %format!("{error:#}"), "table unavailable, using no records");
            Vec::new()
        }
    }
}
