//! Explain replay of logged search calls
//!
//! Successful GET search calls with a structured body are sent again with
//! `explain=1` so the panel can show scoring details. The log itself is never
//! touched: the pass returns a borrowed view with substituted responses.

use crate::extract::extract_request;
use crate::log::{LogEntry, QueryLog};
use esbar_common::{constants, ClientError, Response, SearchClient};
use http::Method;
use std::borrow::Cow;

/// A logged entry as shown in one rendering pass
#[derive(Debug, Clone)]
pub struct ReplayedEntry<'a> {
    pub entry: &'a LogEntry,
    response: Option<Cow<'a, Response>>,
    pub explained: bool,
}

impl<'a> ReplayedEntry<'a> {
    fn copy(entry: &'a LogEntry) -> Self {
        Self {
            entry,
            response: entry.response.as_ref().map(Cow::Borrowed),
            explained: false,
        }
    }

    fn explained(entry: &'a LogEntry, response: Response) -> Self {
        Self {
            entry,
            response: Some(Cow::Owned(response)),
            explained: true,
        }
    }

    /// The explained response if the replay succeeded, the logged one otherwise
    pub fn response(&self) -> Option<&Response> {
        self.response.as_deref()
    }
}

/// Replayed entries of one authority
#[derive(Debug, Clone)]
pub struct ReplayedBucket<'a> {
    pub authority: &'a str,
    pub entries: Vec<ReplayedEntry<'a>>,
}

/// Whether an entry may be sent again with `explain`
///
/// Only calls that succeeded, are GET requests to a search endpoint
/// (`marker`, matched case-insensitively) and carry a structured body qualify.
pub fn is_replayable(entry: &LogEntry, marker: &str) -> bool {
    if entry.error.is_some() {
        return false;
    }

    let request = &entry.request;
    if request.method != Method::GET
        || !request
            .path
            .to_ascii_lowercase()
            .contains(&marker.to_ascii_lowercase())
    {
        return false;
    }

    extract_request(request).is_structured()
}

/// Send the entry's request again with `explain=1` overriding its query
fn replay(entry: &LogEntry, client: &dyn SearchClient) -> Result<Response, ClientError> {
    let request = &entry.request;
    let mut query = request.query.clone();
    query.insert(constants::EXPLAIN_PARAM.to_string(), "1".to_string());

    client.request(&request.path, request.method.clone(), request.data.clone(), query)
}

/// View of the log with eligible search responses replaced by explained ones
///
/// Replays run one after another; a failed replay keeps the logged response.
pub fn explain_pass<'a>(
    log: &'a QueryLog,
    client: &dyn SearchClient,
    marker: &str,
) -> Vec<ReplayedBucket<'a>> {
    log.buckets()
        .iter()
        .map(|bucket| ReplayedBucket {
            authority: bucket.authority.as_str(),
            entries: bucket
                .entries
                .iter()
                .map(|entry| {
                    if !is_replayable(entry, marker) {
                        return ReplayedEntry::copy(entry);
                    }
                    match replay(entry, client) {
                        Ok(response) => ReplayedEntry::explained(entry, response),
                        Err(e) => {
                            tracing::debug!("Explain replay of {} failed: {}", entry.request.path, e);
                            ReplayedEntry::copy(entry)
                        }
                    }
                })
                .collect(),
        })
        .collect()
}

/// View of the log without any replay
pub fn copy_pass(log: &QueryLog) -> Vec<ReplayedBucket<'_>> {
    log.buckets()
        .iter()
        .map(|bucket| ReplayedBucket {
            authority: bucket.authority.as_str(),
            entries: bucket.entries.iter().map(ReplayedEntry::copy).collect(),
        })
        .collect()
}
