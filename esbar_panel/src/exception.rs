//! Error-page section for search-client failures

use crate::config::DumpOptions;
use crate::dump::to_html_serialized;
use esbar_common::{constants, ClientError};
use std::error::Error;

/// Tab title and HTML body shown on the host's error page
#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionPanel {
    pub tab: String,
    pub panel: String,
}

/// Render a section for an unhandled error
///
/// Only errors from the search client (possibly wrapped as the source of
/// another error) produce a section, and only when they carry something to
/// show: the request/response pair of a failed call, or the failed items of a
/// bulk call.
pub fn render_exception(error: &(dyn Error + 'static)) -> Option<ExceptionPanel> {
    let client_error = find_client_error(error)?;
    let options = DumpOptions::default();

    let panel = match client_error {
        ClientError::Response {
            request, response, ..
        } => format!(
            "<h3>Request</h3>{}<h3>Response</h3>{}",
            to_html_serialized(request.as_ref(), &options),
            to_html_serialized(response.as_ref(), &options)
        ),
        ClientError::BulkResponse { failures, .. } => format!(
            "<h3>Failures</h3>{}",
            to_html_serialized(failures, &options)
        ),
        ClientError::Connection { .. } | ClientError::InvalidRequest { .. } => return None,
    };

    Some(ExceptionPanel {
        tab: constants::PRODUCT_NAME.to_string(),
        panel,
    })
}

fn find_client_error<'a>(error: &'a (dyn Error + 'static)) -> Option<&'a ClientError> {
    let mut current = Some(error);
    while let Some(e) = current {
        if let Some(found) = e.downcast_ref::<ClientError>() {
            return Some(found);
        }
        current = e.source();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use esbar_common::{BulkFailure, Request, Response};
    use http::Method;
    use serde_json::json;

    fn request() -> Request {
        Request::new("idx/_doc/1", Method::PUT).with_data(json!({"title": "x"}))
    }

    #[derive(Debug, thiserror::Error)]
    #[error("indexing failed")]
    struct Wrapper(#[source] ClientError);

    fn response_error() -> ClientError {
        ClientError::Response {
            request: Box::new(request()),
            response: Box::new(Response::new(400, r#"{"error":"mapper_parsing_exception"}"#.to_string())),
            message: "mapper_parsing_exception".to_string(),
        }
    }

    #[test]
    fn test_foreign_error() {
        let error = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert!(render_exception(&error).is_none());
    }

    #[test]
    fn test_single_call_failure() {
        let rendered = render_exception(&response_error()).unwrap();
        assert_eq!(rendered.tab, "ElasticSearch");
        assert!(rendered.panel.contains("<h3>Request</h3>"));
        assert!(rendered.panel.contains("<h3>Response</h3>"));
        assert!(rendered.panel.contains(r#"<span class="json-string">"idx/_doc/1"</span>"#));
        assert!(rendered.panel.contains(r#"<span class="json-number">400</span>"#));
    }

    #[test]
    fn test_bulk_failure() {
        let error = ClientError::BulkResponse {
            request: Box::new(Request::new("_bulk", Method::POST)),
            response: Box::new(Response::new(200, "{}".to_string())),
            failures: vec![BulkFailure {
                action: "index".to_string(),
                index: Some("idx".to_string()),
                id: Some("7".to_string()),
                status: 400,
                error: json!({"type": "mapper_parsing_exception"}),
            }],
        };

        let rendered = render_exception(&error).unwrap();
        assert!(rendered.panel.starts_with("<h3>Failures</h3>"));
        assert!(rendered.panel.contains("mapper_parsing_exception"));
        assert!(!rendered.panel.contains("<h3>Request</h3>"));
    }

    #[test]
    fn test_client_error_without_detail() {
        let error = ClientError::Connection {
            request: Box::new(request()),
            url: "http://es:9200".to_string(),
            message: "refused".to_string(),
        };
        assert!(render_exception(&error).is_none());
    }

    #[test]
    fn test_wrapped_client_error() {
        let error = Wrapper(response_error());
        let rendered = render_exception(&error).unwrap();
        assert!(rendered.panel.contains("<h3>Response</h3>"));
    }
}
