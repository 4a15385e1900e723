//! HTTP transport for the ingestion backend
//!
//! [`Transport`] is the only way the console talks to the backend. It returns
//! the parsed JSON body or a [`TransportError`]; it never panics and never
//! retries. HTTP error statuses are not transport failures here: the backend
//! reports application errors as `{success: false, error}` with a 4xx/5xx
//! status, so the body is parsed and handed back for the caller to classify.
//! A 4xx/5xx JSON body without a `success` flag is handed back with
//! `success: false`; only 2xx replies may omit the flag and still succeed.

use crate::api::endpoints;
use crate::error::{ConsoleError, Result, TransportError};
use async_trait::async_trait;
use fds_common::types::{
    CommandReply, IngestionStatus, LogEntry, LogsResponse, QueryReply, QueryRequest,
    QueryResult, SearchTableReply, SearchTableRequest,
};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// HTTP method of an exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

/// One request/response exchange with the backend.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> std::result::Result<Value, TransportError>;
}

/// `reqwest`-backed transport
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client with the given caller-side timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConsoleError::Transport(e.into()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn call(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> std::result::Result<Value, TransportError> {
        let url = endpoints::join(&self.base_url, endpoint);

        let request = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        }
        .header(ACCEPT, "application/json");

        let request = match body {
            Some(ref body) => request.header(CONTENT_TYPE, "application/json").json(body),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        debug!(%method, endpoint, status = status.as_u16(), "Backend responded");

        let text = response.text().await?;
        let value = serde_json::from_str(&text).map_err(|e| {
            TransportError::new(format!(
                "unparseable response from {} (HTTP {}): {}",
                endpoint, status, e
            ))
        })?;

        if status.is_success() {
            Ok(value)
        } else {
            Ok(mark_rejected(value, status.as_u16()))
        }
    }
}

/// Error statuses whose body carries no `success` flag (proxies, framework
/// error pages) are rejections too. Keeps `message` as the `error` text.
fn mark_rejected(value: Value, status: u16) -> Value {
    let Value::Object(mut map) = value else {
        return json!({
            "success": false,
            "error": format!("The server responded with HTTP {}.", status),
        });
    };
    if map.contains_key("success") {
        return Value::Object(map);
    }

    let error = map
        .get("error")
        .or_else(|| map.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("The server responded with HTTP {}.", status));
    map.insert("success".to_string(), Value::Bool(false));
    map.insert("error".to_string(), Value::String(error));
    Value::Object(map)
}

/// `success: false` on a read endpoint
fn ensure_not_rejected(endpoint: &str, value: &Value) -> Result<()> {
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let error = value
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string);
        return Err(application_error(endpoint, error));
    }
    Ok(())
}

fn decode<T: DeserializeOwned>(endpoint: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        ConsoleError::Transport(TransportError::new(format!(
            "unexpected response shape from {}: {}",
            endpoint, e
        )))
    })
}

fn application_error(endpoint: &str, error: Option<String>) -> ConsoleError {
    ConsoleError::application(
        error.unwrap_or_else(|| format!("The server rejected the request to {}.", endpoint)),
    )
}

/// Fetch the aggregate ingestion status
pub async fn fetch_status(transport: &dyn Transport) -> Result<IngestionStatus> {
    let value = transport.call(Method::Get, endpoints::STATUS, None).await?;
    ensure_not_rejected(endpoints::STATUS, &value)?;
    decode(endpoints::STATUS, value)
}

/// Fetch the newest `limit` log lines, in the order the server sends them
pub async fn fetch_logs(transport: &dyn Transport, limit: u32) -> Result<Vec<LogEntry>> {
    let endpoint = endpoints::logs(limit);
    let value = transport.call(Method::Get, &endpoint, None).await?;
    ensure_not_rejected(&endpoint, &value)?;
    let response: LogsResponse = decode(&endpoint, value)?;
    Ok(response.logs)
}

/// POST to a mutating endpoint; `success: false` becomes an application error
pub async fn post_command(
    transport: &dyn Transport,
    endpoint: &str,
    body: Option<Value>,
) -> Result<CommandReply> {
    let value = transport.call(Method::Post, endpoint, body).await?;
    let reply: CommandReply = decode(endpoint, value)?;

    if !reply.is_success() {
        return Err(application_error(endpoint, reply.error));
    }

    Ok(reply)
}

/// Look up a table by (partial) name among discovered and ingested tables
pub async fn search_table(transport: &dyn Transport, table_name: &str) -> Result<SearchTableReply> {
    let body = serde_json::to_value(SearchTableRequest {
        table_name: table_name.to_string(),
    })
    .map_err(anyhow::Error::from)?;

    let value = transport
        .call(Method::Post, endpoints::SEARCH_TABLE, Some(body))
        .await?;
    let reply: SearchTableReply = decode(endpoints::SEARCH_TABLE, value)?;

    if reply.success == Some(false) {
        return Err(application_error(endpoints::SEARCH_TABLE, reply.error));
    }

    Ok(reply)
}

/// Execute a read query on the backend
pub async fn run_query(transport: &dyn Transport, sql: &str) -> Result<QueryResult> {
    let body = serde_json::to_value(QueryRequest {
        sql: sql.to_string(),
    })
    .map_err(anyhow::Error::from)?;

    let value = transport.call(Method::Post, endpoints::QUERY, Some(body)).await?;
    let reply: QueryReply = decode(endpoints::QUERY, value)?;

    if reply.success == Some(false) {
        return Err(application_error(endpoints::QUERY, reply.error));
    }

    Ok(QueryResult {
        columns: reply.columns,
        rows: reply.rows,
        count: reply.count,
    })
}
