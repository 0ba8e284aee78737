//! Grouping key for logged calls

use crate::log::QueryLog;
use esbar_common::Response;
use url::Url;

/// `scheme://host[:port]` of a URL, without user info, path or query
///
/// Default ports are omitted.
pub fn host_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?;

    Some(match parsed.port() {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
        None => format!("{}://{}", parsed.scheme(), host),
    })
}

/// Bucket a call belongs to
///
/// Calls without usable transport info join the first bucket of the log, or
/// `default` when nothing has been logged yet.
pub fn authority_of(response: Option<&Response>, log: &QueryLog, default: &str) -> String {
    let from_response = response
        .and_then(|r| r.transfer_info.url.as_deref())
        .and_then(host_url);

    if let Some(authority) = from_response {
        return authority;
    }

    match log.first_authority() {
        Some(authority) => authority.to_string(),
        None => host_url(default).unwrap_or_else(|| default.to_string()),
    }
}
