//! API endpoint paths
//!
//! Paths are relative to the server URL; the transport joins them.

pub const DISCOVER: &str = "/api/discover";
pub const START: &str = "/api/start";
pub const PAUSE: &str = "/api/pause";
pub const RESUME: &str = "/api/resume";
pub const RETRY_FAILED: &str = "/api/retry-failed";
pub const RESET: &str = "/api/reset";
pub const STATUS: &str = "/api/status";
pub const SEARCH_TABLE: &str = "/api/search-table";
pub const INGEST_SINGLE: &str = "/api/ingest-single";
pub const INGEST_BY_NAME: &str = "/api/ingest-by-name";
pub const QUERY: &str = "/api/query";

/// Build the log tail path
pub fn logs(limit: u32) -> String {
    format!("/api/logs?limit={}", limit)
}

/// Join a server URL and an endpoint path, tolerating a trailing slash
pub fn join(base_url: &str, endpoint: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logs_path() {
        assert_eq!(logs(50), "/api/logs?limit=50");
    }

    #[test]
    fn test_join() {
        assert_eq!(
            join("http://localhost:5000", STATUS),
            "http://localhost:5000/api/status"
        );
        assert_eq!(
            join("http://localhost:5000/", RETRY_FAILED),
            "http://localhost:5000/api/retry-failed"
        );
    }
}
