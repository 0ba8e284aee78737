//! In-memory call log grouped by authority

use chrono::{DateTime, Utc};
use esbar_common::{ClientError, Request, Response};
use std::time::Duration;

/// One observed client call
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub request: Request,
    pub response: Option<Response>,
    pub elapsed: Duration,
    pub error: Option<ClientError>,
    pub recorded_at: DateTime<Utc>,
}

impl LogEntry {
    pub fn success(request: Request, response: Response, elapsed: Duration) -> Self {
        Self {
            request,
            response: Some(response),
            elapsed,
            error: None,
            recorded_at: Utc::now(),
        }
    }

    /// Failed call; keeps the response the error carries, if any
    pub fn failure(request: Request, error: ClientError, elapsed: Duration) -> Self {
        Self {
            request,
            response: error.response().cloned(),
            elapsed,
            error: Some(error),
            recorded_at: Utc::now(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// Entries sent to one authority, in call order
#[derive(Debug, Clone)]
pub struct Bucket {
    pub authority: String,
    pub entries: Vec<LogEntry>,
}

/// Calls grouped by authority
///
/// Buckets keep first-seen order and are never empty.
#[derive(Debug, Clone, Default)]
pub struct QueryLog {
    buckets: Vec<Bucket>,
}

impl QueryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to the bucket for `authority`, creating it if needed
    pub fn push(&mut self, authority: String, entry: LogEntry) {
        match self.buckets.iter_mut().find(|b| b.authority == authority) {
            Some(bucket) => bucket.entries.push(entry),
            None => self.buckets.push(Bucket {
                authority,
                entries: vec![entry],
            }),
        }
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn get(&self, authority: &str) -> Option<&[LogEntry]> {
        self.buckets
            .iter()
            .find(|b| b.authority == authority)
            .map(|b| b.entries.as_slice())
    }

    /// Authority of the first bucket created
    pub fn first_authority(&self) -> Option<&str> {
        self.buckets.first().map(|b| b.authority.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.buckets.iter().flat_map(|b| b.entries.iter())
    }

    /// Total number of entries across all buckets
    pub fn len(&self) -> usize {
        self.buckets.iter().map(|b| b.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Running call count and cumulative time
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub total_time: Duration,
    pub query_count: usize,
}

impl Totals {
    pub fn add(&mut self, elapsed: Duration) {
        self.total_time += elapsed;
        self.query_count += 1;
    }

    pub fn total_ms(&self) -> f64 {
        self.total_time.as_secs_f64() * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use serde_json::json;

    fn entry(path: &str) -> LogEntry {
        LogEntry::success(
            Request::new(path, Method::GET),
            Response::new(200, json!({})),
            Duration::from_millis(1),
        )
    }

    #[test]
    fn test_buckets_keep_first_seen_order() {
        let mut log = QueryLog::new();
        log.push("http://a:9200".to_string(), entry("one"));
        log.push("http://b:9200".to_string(), entry("two"));
        log.push("http://a:9200".to_string(), entry("three"));

        let authorities: Vec<&str> = log.buckets().iter().map(|b| b.authority.as_str()).collect();
        assert_eq!(authorities, vec!["http://a:9200", "http://b:9200"]);

        let paths: Vec<&str> = log
            .get("http://a:9200")
            .unwrap()
            .iter()
            .map(|e| e.request.path.as_str())
            .collect();
        assert_eq!(paths, vec!["one", "three"]);
        assert_eq!(log.len(), 3);
        assert_eq!(log.first_authority(), Some("http://a:9200"));
    }

    #[test]
    fn test_empty_log() {
        let log = QueryLog::new();
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
        assert!(log.first_authority().is_none());
        assert!(log.get("http://a:9200").is_none());
    }

    #[test]
    fn test_failure_keeps_carried_response() {
        let request = Request::new("idx/_search", Method::GET);
        let response = Response::new(500, "oops".to_string());
        let error = ClientError::Response {
            request: Box::new(request.clone()),
            response: Box::new(response.clone()),
            message: "oops".to_string(),
        };

        let entry = LogEntry::failure(request, error, Duration::from_millis(2));
        assert_eq!(entry.response, Some(response));
        assert!(entry.error.is_some());
    }

    #[test]
    fn test_totals() {
        let mut totals = Totals::default();
        totals.add(Duration::from_millis(10));
        totals.add(Duration::from_micros(2500));
        assert_eq!(totals.query_count, 2);
        assert_eq!(totals.total_time, Duration::from_micros(12500));
        assert!((totals.total_ms() - 12.5).abs() < 1e-9);
    }
}
