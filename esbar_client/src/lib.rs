//! Blocking HTTP search client
//!
//! Sends calls to a single search node and reports every completed call,
//! successful or not, to the registered [`ClientListener`]s.

mod config;

pub use config::{ClientConfig, ConfigError};

use esbar_common::{
    constants, Body, BulkFailure, ClientError, ClientListener, Listeners, QueryParams, Request,
    Response, SearchClient, TransferInfo,
};
use http::Method;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Search client over blocking HTTP
pub struct HttpClient {
    base_url: Url,
    client: Client,
    listeners: Listeners,
}

impl HttpClient {
    /// Create a client for the node configured in `config`
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.url).map_err(|e| ClientError::InvalidRequest {
            message: format!("Invalid node URL {}: {}", config.url, e),
        })?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| ClientError::InvalidRequest {
            message: format!("Failed to build HTTP client: {}", e),
        })?;

        Ok(Self {
            base_url,
            client,
            listeners: Listeners::new(),
        })
    }

    /// Full URL for a request: base path, endpoint path, then query string
    fn endpoint(&self, request: &Request) -> Url {
        let mut url = self.base_url.clone();
        let path = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            request.path.trim_start_matches('/')
        );
        url.set_path(&path);
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        url
    }

    fn send(&self, request: &Request, started: Instant) -> Result<Response, ClientError> {
        let url = self.endpoint(request);
        let mut builder = self.client.request(request.method.clone(), url.clone());

        builder = match &request.data {
            Body::Json(Value::Null) => builder,
            Body::Json(value) => builder.json(value),
            Body::Raw(text) => builder
                .header(CONTENT_TYPE, constants::NDJSON_CONTENT_TYPE)
                .body(text.clone()),
        };

        let connection_error = |e: reqwest::Error| ClientError::Connection {
            request: Box::new(request.clone()),
            url: url.to_string(),
            message: e.to_string(),
        };

        let reply = builder.send().map_err(connection_error)?;
        let status = reply.status().as_u16();
        let final_url = reply.url().to_string();
        let text = reply.text().map_err(connection_error)?;

        let response = Response {
            status,
            body: Body::Raw(text),
            transfer_info: TransferInfo {
                url: Some(final_url),
                http_code: status,
                total_time: Some(started.elapsed().as_secs_f64()),
            },
        };

        check_response(request, response)
    }
}

/// Turn error statuses and error bodies into the matching [`ClientError`]
fn check_response(request: &Request, response: Response) -> Result<Response, ClientError> {
    let decoded = match &response.body {
        Body::Json(value) => Some(value.clone()),
        Body::Raw(text) => serde_json::from_str::<Value>(text).ok(),
    };

    let error = decoded.as_ref().and_then(|body| body.get("error"));
    if !response.is_success() || error.is_some() {
        let message = error
            .map(error_message)
            .unwrap_or_else(|| format!("HTTP {}", response.status));
        return Err(ClientError::Response {
            request: Box::new(request.clone()),
            response: Box::new(response),
            message,
        });
    }

    let is_bulk = request.path.contains(constants::BULK_ENDPOINT);
    if let Some(body) = decoded.filter(|body| is_bulk && body["errors"] == Value::Bool(true)) {
        return Err(ClientError::BulkResponse {
            request: Box::new(request.clone()),
            response: Box::new(response),
            failures: BulkFailure::from_bulk_response(&body),
        });
    }

    Ok(response)
}

/// Readable message from an `error` field, which is either a string or an object
fn error_message(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(_) => {
            let kind = error.get("type").and_then(Value::as_str);
            let reason = error.get("reason").and_then(Value::as_str);
            match (kind, reason) {
                (Some(kind), Some(reason)) => format!("{}: {}", kind, reason),
                (Some(text), None) | (None, Some(text)) => text.to_string(),
                (None, None) => error.to_string(),
            }
        }
        other => other.to_string(),
    }
}

impl SearchClient for HttpClient {
    fn request(
        &self,
        path: &str,
        method: Method,
        data: Body,
        query: QueryParams,
    ) -> Result<Response, ClientError> {
        let request = Request {
            path: path.to_string(),
            method,
            query,
            data,
        };

        let started = Instant::now();
        let result = self.send(&request, started);
        let elapsed = started.elapsed();

        match &result {
            Ok(response) => {
                tracing::debug!("{} {} -> {}", request.method, request.path, response.status);
                self.listeners.notify_success(&request, response, elapsed);
            }
            Err(e) => {
                tracing::debug!("{} {} failed: {}", request.method, request.path, e);
                self.listeners.notify_failure(&request, e, elapsed);
            }
        }

        result
    }

    fn add_listener(&self, listener: Arc<dyn ClientListener>) {
        self.listeners.add(listener);
    }
}
