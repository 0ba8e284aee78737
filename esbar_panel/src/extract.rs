//! Payload decoding for requests and responses
//!
//! Point queries answer with a single JSON document while bulk and streaming
//! endpoints use newline-delimited JSON. Bodies go through an ordered list of
//! decoding strategies and fall back to the raw text when none applies.

use esbar_common::{Body, Request, Response};
use serde_json::Value;
use thiserror::Error;

/// Decoded body of a request or response
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A single JSON document
    Document(Value),

    /// One JSON document per line
    Lines(Vec<Value>),

    /// Text that could not be decoded
    Raw(String),
}

impl Payload {
    pub fn is_structured(&self) -> bool {
        !matches!(self, Payload::Raw(_))
    }

    /// Collapse into one value; lines become an array
    pub fn to_value(&self) -> Value {
        match self {
            Payload::Document(value) => value.clone(),
            Payload::Lines(lines) => Value::Array(lines.clone()),
            Payload::Raw(text) => Value::String(text.clone()),
        }
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Invalid JSON document: {0}")]
    Document(#[source] serde_json::Error),

    #[error("Invalid JSON on line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("No lines to decode")]
    NoLines,
}

type Strategy = fn(&str) -> Result<Payload, DecodeError>;

/// Tried in order; the first success wins
const STRATEGIES: &[(&str, Strategy)] = &[
    ("document", decode_document as Strategy),
    ("lines", decode_lines as Strategy),
];

/// Strict single-document decoding
pub fn decode_document(text: &str) -> Result<Payload, DecodeError> {
    serde_json::from_str(text)
        .map(Payload::Document)
        .map_err(DecodeError::Document)
}

/// Newline-delimited decoding; blank lines are skipped, every other line must decode
pub fn decode_lines(text: &str) -> Result<Payload, DecodeError> {
    let lines = text
        .split('\n')
        .map(str::trim)
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|source| DecodeError::Line {
                line: idx + 1,
                source,
            })
        })
        .collect::<Result<Vec<Value>, _>>()?;

    if lines.is_empty() {
        return Err(DecodeError::NoLines);
    }

    Ok(Payload::Lines(lines))
}

/// Decode text with each strategy in turn, keeping the raw text if all fail
pub fn decode(text: &str) -> Payload {
    for (name, strategy) in STRATEGIES {
        match strategy(text) {
            Ok(payload) => return payload,
            Err(e) => tracing::trace!("{} decoding failed: {}", name, e),
        }
    }
    Payload::Raw(text.to_string())
}

/// The `data` field of the request's wire representation
///
/// Raw request bodies (bulk NDJSON) travel as a JSON string and come back as
/// [`Payload::Raw`].
pub fn extract_request(request: &Request) -> Payload {
    let wire = request
        .to_json()
        .and_then(|json| serde_json::from_str::<Value>(&json));

    match wire {
        Ok(mut wire) => match wire.get_mut("data").map(Value::take) {
            Some(Value::String(text)) => Payload::Raw(text),
            Some(data) => Payload::Document(data),
            None => Payload::Document(Value::Null),
        },
        Err(e) => {
            tracing::trace!("Request {} has no wire form: {}", request.path, e);
            match &request.data {
                Body::Json(value) => Payload::Document(value.clone()),
                Body::Raw(text) => Payload::Raw(text.clone()),
            }
        }
    }
}

/// The decoded response body
pub fn extract_response(response: &Response) -> Payload {
    match &response.body {
        Body::Json(value) => Payload::Document(value.clone()),
        Body::Raw(text) => decode(text),
    }
}
