//! esbar Common - Shared search-client object model
//!
//! This crate contains the request/response types, the client error family
//! and the observer contract shared by the HTTP transport and the
//! diagnostics panel.

use http::Method;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use thiserror::Error;

/// Query string parameters, kept in key order
pub type QueryParams = BTreeMap<String, String>;

/// Errors raised by a search client
///
/// Variants carrying a response keep it so observers can still group and
/// display the failed call.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("{message}")]
    Response {
        request: Box<Request>,
        response: Box<Response>,
        message: String,
    },

    #[error("Bulk request reported {} failed item(s)", .failures.len())]
    BulkResponse {
        request: Box<Request>,
        response: Box<Response>,
        failures: Vec<BulkFailure>,
    },

    #[error("Connection to {url} failed: {message}")]
    Connection {
        request: Box<Request>,
        url: String,
        message: String,
    },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },
}

impl ClientError {
    /// The response that came back before the call was considered failed
    pub fn response(&self) -> Option<&Response> {
        match self {
            ClientError::Response { response, .. } | ClientError::BulkResponse { response, .. } => {
                Some(response.as_ref())
            }
            ClientError::Connection { .. } | ClientError::InvalidRequest { .. } => None,
        }
    }

    /// The request that failed, when it was built far enough to be sent
    pub fn request(&self) -> Option<&Request> {
        match self {
            ClientError::Response { request, .. }
            | ClientError::BulkResponse { request, .. }
            | ClientError::Connection { request, .. } => Some(request.as_ref()),
            ClientError::InvalidRequest { .. } => None,
        }
    }
}

/// A request or response body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Body {
    /// Already decoded JSON; `Null` means there is no body
    Json(Value),

    /// Undecoded text (NDJSON bulk payloads, wire responses)
    Raw(String),
}

impl Body {
    /// A body that is not sent at all
    pub fn empty() -> Self {
        Body::Json(Value::Null)
    }
}

impl Default for Body {
    fn default() -> Self {
        Body::empty()
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Raw(text)
    }
}

/// A single call to the search engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    /// Endpoint path relative to the node URL (e.g. "products/_search")
    pub path: String,

    /// HTTP method
    #[serde(with = "method_serde")]
    pub method: Method,

    /// Query string parameters
    pub query: QueryParams,

    /// Request body
    pub data: Body,
}

impl Request {
    pub fn new(path: impl Into<String>, method: Method) -> Self {
        Self {
            path: path.into(),
            method,
            query: QueryParams::new(),
            data: Body::empty(),
        }
    }

    pub fn with_data(mut self, data: impl Into<Body>) -> Self {
        self.data = data.into();
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Wire representation of the request, including its metadata
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Path followed by the encoded query string, for display
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query: Vec<String> = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        format!("{}?{}", self.path, query.join("&"))
    }
}

/// Transport metadata reported for a completed call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransferInfo {
    /// Final URL the call was sent to
    pub url: Option<String>,

    /// HTTP status code as seen by the transport
    pub http_code: u16,

    /// Transport-measured time in seconds
    pub total_time: Option<f64>,
}

/// Response to a single call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// HTTP status code
    pub status: u16,

    /// Response body, usually raw text straight off the wire
    pub body: Body,

    /// Transport metadata
    pub transfer_info: TransferInfo,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Body>) -> Self {
        Self {
            status,
            body: body.into(),
            transfer_info: TransferInfo {
                http_code: status,
                ..TransferInfo::default()
            },
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.transfer_info.url = Some(url.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One failed item of a bulk call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkFailure {
    /// Bulk action name ("index", "create", "update", "delete")
    pub action: String,

    /// Target index
    pub index: Option<String>,

    /// Document ID
    pub id: Option<String>,

    /// Item status code
    pub status: u16,

    /// Error object reported for the item
    pub error: Value,
}

impl BulkFailure {
    /// Collect failed items from a decoded bulk response
    ///
    /// Items look like `{"index": {"_index": .., "_id": .., "status": .., "error": {..}}}`;
    /// items without an `error` key succeeded and are skipped.
    pub fn from_bulk_response(body: &Value) -> Vec<BulkFailure> {
        let Some(items) = body.get("items").and_then(Value::as_array) else {
            return Vec::new();
        };

        items
            .iter()
            .filter_map(Value::as_object)
            .flat_map(|item| item.iter())
            .filter_map(|(action, result)| {
                let error = result.get("error")?;
                Some(BulkFailure {
                    action: action.clone(),
                    index: result.get("_index").and_then(Value::as_str).map(String::from),
                    id: result.get("_id").and_then(Value::as_str).map(String::from),
                    status: result
                        .get("status")
                        .and_then(Value::as_u64)
                        .and_then(|s| u16::try_from(s).ok())
                        .unwrap_or(0),
                    error: error.clone(),
                })
            })
            .collect()
    }
}

/// Observer notified when a client call completes
pub trait ClientListener: Send + Sync {
    fn on_success(&self, request: &Request, response: &Response, elapsed: Duration);

    fn on_failure(&self, request: &Request, error: &ClientError, elapsed: Duration);
}

/// Ordered list of registered listeners
///
/// Clients embed this and call `notify_*` once per completed call.
#[derive(Default)]
pub struct Listeners {
    inner: RwLock<Vec<Arc<dyn ClientListener>>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; it is notified after all earlier ones
    pub fn add(&self, listener: Arc<dyn ClientListener>) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn notify_success(&self, request: &Request, response: &Response, elapsed: Duration) {
        for listener in self.current() {
            listener.on_success(request, response, elapsed);
        }
    }

    pub fn notify_failure(&self, request: &Request, error: &ClientError, elapsed: Duration) {
        for listener in self.current() {
            listener.on_failure(request, error, elapsed);
        }
    }

    // Listeners run without the lock held so they may register others.
    fn current(&self) -> Vec<Arc<dyn ClientListener>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// A search-engine client that can be observed and re-driven
pub trait SearchClient: Send + Sync {
    /// Issue a call and notify listeners of its outcome
    fn request(
        &self,
        path: &str,
        method: Method,
        data: Body,
        query: QueryParams,
    ) -> Result<Response, ClientError>;

    /// Subscribe to success/failure notifications
    fn add_listener(&self, listener: Arc<dyn ClientListener>);
}

/// Serialize `http::Method` as its upper-case name
mod method_serde {
    use http::Method;
    use serde::Serializer;

    pub fn serialize<S>(method: &Method, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(method.as_str())
    }
}

/// Constants shared by the client and the panel
pub mod constants {
    /// Product name shown when nothing else is available
    pub const PRODUCT_NAME: &str = "ElasticSearch";

    /// Authority used when a failed call has no transport info and nothing was logged yet
    pub const DEFAULT_AUTHORITY: &str = "http://localhost:9200";

    /// Path marker of search endpoints
    pub const SEARCH_ENDPOINT: &str = "_search";

    /// Path marker of bulk endpoints
    pub const BULK_ENDPOINT: &str = "_bulk";

    /// Query parameter asking the engine for scoring diagnostics
    pub const EXPLAIN_PARAM: &str = "explain";

    /// Content type for single-document bodies
    pub const JSON_CONTENT_TYPE: &str = "application/json";

    /// Content type for line-delimited bodies
    pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";
}
