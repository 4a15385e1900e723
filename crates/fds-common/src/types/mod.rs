//! Wire types of the ingestion backend
//!
//! These mirror the JSON documents the backend returns. Every read type is
//! lenient: missing fields fall back to their defaults and unknown fields are
//! ignored, since the backend adds columns over time.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Aggregate state of the ingestion loop, as reported by `GET /api/status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionStatus {
    pub is_running: bool,
    pub is_paused: bool,
    pub current_table: Option<String>,
    pub summary: Summary,
}

/// Table counters. No relation between the counters is assumed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Summary {
    pub total_discovered: u64,
    pub completed: u64,
    pub pending: u64,
    pub failed: u64,
    pub in_progress: u64,
    pub tables_ingested: u64,
    pub columns_ingested: u64,
    pub last_processed_table: Option<String>,
}

/// Severity attached to a backend log line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum LogLevel {
    #[default]
    Info,
    Warn,
    Error,
    Other(String),
}

impl LogLevel {
    pub fn as_str(&self) -> &str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Other(s) => s,
        }
    }
}

impl From<&str> for LogLevel {
    fn from(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "INFO" => LogLevel::Info,
            "WARN" | "WARNING" => LogLevel::Warn,
            "ERROR" => LogLevel::Error,
            _ => LogLevel::Other(s.to_string()),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LogLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(LogLevel::from(s.as_str()))
    }
}

/// One line of the backend's ingestion log.
///
/// The timestamp is kept exactly as the server formatted it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogEntry {
    pub timestamp: Option<String>,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    /// Server timestamp as an instant, when it is in RFC 2822 or RFC 3339 form.
    pub fn instant(&self) -> Option<DateTime<FixedOffset>> {
        let raw = self.timestamp.as_deref()?;
        DateTime::parse_from_rfc2822(raw)
            .or_else(|_| DateTime::parse_from_rfc3339(raw))
            .ok()
    }
}

/// Envelope of `GET /api/logs`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsResponse {
    pub logs: Vec<LogEntry>,
}

/// Per-table ingestion state of a discovered table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum TableStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
    Other(String),
}

impl TableStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TableStatus::Pending => "PENDING",
            TableStatus::InProgress => "IN_PROGRESS",
            TableStatus::Completed => "COMPLETED",
            TableStatus::Failed => "FAILED",
            TableStatus::Other(s) => s,
        }
    }

    /// Whether the table's schema is already loaded.
    pub fn is_ingested(&self) -> bool {
        matches!(self, TableStatus::Completed)
    }
}

impl From<&str> for TableStatus {
    fn from(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => TableStatus::Pending,
            "IN_PROGRESS" => TableStatus::InProgress,
            "COMPLETED" => TableStatus::Completed,
            "FAILED" => TableStatus::Failed,
            _ => TableStatus::Other(s.to_string()),
        }
    }
}

impl std::fmt::Display for TableStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TableStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TableStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(TableStatus::from(s.as_str()))
    }
}

/// A table found by discovery, whether or not it has been ingested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveredTable {
    pub table_name: String,
    pub table_url: String,
    pub status: TableStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Identity of a table whose schema is already stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestedTableRef {
    pub table_name: String,
}

/// Result set of an ad-hoc read query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
    pub count: u64,
}

/// Generic reply of the mutating endpoints.
///
/// `success` is absent on some replies (retry-failed, reset); absence means the
/// request went through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandReply {
    pub success: Option<bool>,
    pub message: Option<String>,
    pub error: Option<String>,
    pub count: Option<u64>,
}

impl CommandReply {
    pub fn is_success(&self) -> bool {
        self.success.unwrap_or(true)
    }
}

/// Reply of `POST /api/search-table`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchTableReply {
    pub success: Option<bool>,
    pub discovered: Vec<DiscoveredTable>,
    pub ingested: Vec<IngestedTableRef>,
    pub error: Option<String>,
}

/// Reply of `POST /api/query`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryReply {
    pub success: Option<bool>,
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
    pub count: u64,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverRequest {
    pub toc_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTableRequest {
    pub table_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSingleRequest {
    pub table_url: String,
    pub table_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestByNameRequest {
    pub table_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub sql: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_tolerates_missing_fields() {
        let status: IngestionStatus = serde_json::from_value(json!({
            "is_running": true,
            "summary": {"pending": 5}
        }))
        .unwrap();

        assert!(status.is_running);
        assert!(!status.is_paused);
        assert_eq!(status.current_table, None);
        assert_eq!(status.summary.pending, 5);
        assert_eq!(status.summary.total_discovered, 0);
    }

    #[test]
    fn test_status_full_payload() {
        let status: IngestionStatus = serde_json::from_value(json!({
            "is_running": false,
            "is_paused": true,
            "current_table": "GL_LEDGERS",
            "summary": {
                "tables_ingested": 3,
                "columns_ingested": 41,
                "pending": 7,
                "completed": 3,
                "failed": 1,
                "in_progress": 1,
                "total_discovered": 12,
                "last_processed_table": "AP_INVOICES_ALL"
            }
        }))
        .unwrap();

        assert!(status.is_paused);
        assert_eq!(status.current_table.as_deref(), Some("GL_LEDGERS"));
        assert_eq!(status.summary.columns_ingested, 41);
        assert_eq!(
            status.summary.last_processed_table.as_deref(),
            Some("AP_INVOICES_ALL")
        );
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from("INFO"), LogLevel::Info);
        assert_eq!(LogLevel::from("warn"), LogLevel::Warn);
        assert_eq!(LogLevel::from("Error"), LogLevel::Error);
        assert_eq!(LogLevel::from("DEBUG"), LogLevel::Other("DEBUG".to_string()));
    }

    #[test]
    fn test_log_entry_null_timestamp() {
        let logs: LogsResponse = serde_json::from_value(json!({
            "logs": [
                {"timestamp": null, "level": "WARN", "message": "Full reset requested by user"},
                {"timestamp": "Mon, 06 Jan 2025 10:00:00 GMT", "level": "INFO", "message": "ok"}
            ]
        }))
        .unwrap();

        assert_eq!(logs.logs.len(), 2);
        assert_eq!(logs.logs[0].timestamp, None);
        assert_eq!(logs.logs[0].level, LogLevel::Warn);
        assert_eq!(logs.logs[1].message, "ok");
    }

    #[test]
    fn test_log_entry_instant() {
        let entry = LogEntry {
            timestamp: Some("Mon, 06 Jan 2025 10:00:00 GMT".to_string()),
            ..Default::default()
        };
        let instant = entry.instant().unwrap();
        assert_eq!(instant.format("%H:%M:%S").to_string(), "10:00:00");

        let entry = LogEntry {
            timestamp: Some("2025-01-06T10:00:00+00:00".to_string()),
            ..Default::default()
        };
        assert!(entry.instant().is_some());

        let entry = LogEntry {
            timestamp: Some("yesterday".to_string()),
            ..Default::default()
        };
        assert!(entry.instant().is_none());
    }

    #[test]
    fn test_table_status() {
        assert_eq!(TableStatus::from("completed"), TableStatus::Completed);
        assert!(TableStatus::Completed.is_ingested());
        assert!(!TableStatus::Failed.is_ingested());
        assert!(!TableStatus::from("SKIPPED").is_ingested());
    }

    #[test]
    fn test_command_reply_without_success_flag() {
        let reply: CommandReply =
            serde_json::from_value(json!({"message": "Marked 2 failed tables for retry"})).unwrap();
        assert!(reply.is_success());

        let reply: CommandReply =
            serde_json::from_value(json!({"success": false, "error": "boom"})).unwrap();
        assert!(!reply.is_success());
        assert_eq!(reply.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_search_reply_ignores_extra_columns() {
        let reply: SearchTableReply = serde_json::from_value(json!({
            "success": true,
            "discovered": [{
                "id": 4,
                "table_name": "ORDERS",
                "table_url": "https://docs.oracle.com/x/orders.html",
                "module": "Financials",
                "status": "FAILED",
                "error_message": "timeout"
            }],
            "ingested": [{"id": 1, "table_name": "ORDERS", "schema_name": "FIN"}]
        }))
        .unwrap();

        assert_eq!(reply.discovered[0].status, TableStatus::Failed);
        assert_eq!(reply.discovered[0].error_message.as_deref(), Some("timeout"));
        assert_eq!(reply.ingested[0].table_name, "ORDERS");
    }
}
