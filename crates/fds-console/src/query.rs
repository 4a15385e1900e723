//! Ad-hoc query runner
//!
//! The backend validates and executes the SQL; the console only refuses an
//! empty query and renders whatever columns and rows come back.

use crate::api::{self, Transport};
use crate::error::{ConsoleError, Result};
use crate::view::{ConsoleView, Control};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use fds_common::types::QueryResult;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

pub struct QueryRunner {
    transport: Arc<dyn Transport>,
    view: Arc<ConsoleView>,
}

impl QueryRunner {
    pub fn new(transport: Arc<dyn Transport>, view: Arc<ConsoleView>) -> Self {
        Self { transport, view }
    }

    pub async fn run(&self, sql: &str) -> Result<QueryResult> {
        let sql = sql.trim();
        if sql.is_empty() {
            return Err(ConsoleError::validation("Please enter a SQL query"));
        }

        let _guard = self
            .view
            .try_acquire(Control::RunQuery)
            .ok_or(ConsoleError::Busy(Control::RunQuery))?;

        debug!(sql = %sql, "Executing query");
        let result = api::run_query(self.transport.as_ref(), sql).await?;
        debug!(rows = result.rows.len(), count = result.count, "Query finished");
        Ok(result)
    }
}

/// Rendered text of a result set, cells in column order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub count: u64,
}

impl From<&QueryResult> for QueryTable {
    fn from(result: &QueryResult) -> Self {
        let rows = result
            .rows
            .iter()
            .map(|row| {
                result
                    .columns
                    .iter()
                    .map(|column| row.get(column).map(cell_text).unwrap_or_default())
                    .collect()
            })
            .collect();

        Self {
            columns: result.columns.clone(),
            rows,
            count: result.count,
        }
    }
}

/// Display text of one cell; null is an empty cell.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Output format of query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryFormat {
    #[default]
    Table,
    Json,
    Csv,
    Tsv,
}

impl std::str::FromStr for QueryFormat {
    type Err = ConsoleError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(QueryFormat::Table),
            "json" => Ok(QueryFormat::Json),
            "csv" => Ok(QueryFormat::Csv),
            "tsv" => Ok(QueryFormat::Tsv),
            _ => Err(ConsoleError::validation(format!(
                "Unknown format: '{}'. Use table, json, csv, or tsv",
                s
            ))),
        }
    }
}

/// Format a result in the requested output format.
pub fn format_result(result: &QueryResult, format: QueryFormat) -> Result<String> {
    let table = QueryTable::from(result);
    match format {
        QueryFormat::Table => Ok(format_as_table(&table)),
        QueryFormat::Json => serde_json::to_string_pretty(&result.rows)
            .map(|s| s + "\n")
            .map_err(|e| ConsoleError::Other(e.into())),
        QueryFormat::Csv => Ok(format_delimited(&table, ',', csv_field)),
        QueryFormat::Tsv => Ok(format_delimited(&table, '\t', tsv_field)),
    }
}

fn format_as_table(table: &QueryTable) -> String {
    if table.columns.is_empty() {
        return format!("({} rows)\n", table.count);
    }

    let mut out = Table::new();
    out.load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(&table.columns);
    for row in &table.rows {
        out.add_row(row.clone());
    }

    format!("{}\n({} rows)\n", out, table.count)
}

fn format_delimited(table: &QueryTable, sep: char, field: fn(&str) -> String) -> String {
    let mut out = String::new();
    let line = |cells: &[String]| {
        cells
            .iter()
            .map(|c| field(c))
            .collect::<Vec<_>>()
            .join(&sep.to_string())
    };

    out.push_str(&line(&table.columns));
    out.push('\n');
    for row in &table.rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn tsv_field(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}
