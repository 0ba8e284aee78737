//! Scripted search client for tests

use esbar_common::{
    Body, ClientError, ClientListener, Listeners, QueryParams, Request, Response, SearchClient,
};
use http::Method;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Responder = Box<dyn Fn(&Request) -> Result<Response, ClientError> + Send + Sync>;

/// Answers every call through a closure and notifies listeners like a real client
pub(crate) struct ScriptedClient {
    listeners: Listeners,
    calls: Mutex<Vec<Request>>,
    responder: Responder,
}

impl ScriptedClient {
    pub(crate) fn new(
        responder: impl Fn(&Request) -> Result<Response, ClientError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            listeners: Listeners::new(),
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    /// Client whose responses echo the request back, tagged with the node URL
    pub(crate) fn echo(node: &'static str) -> Self {
        Self::new(move |request| {
            let body = serde_json::json!({
                "path": request.path,
                "query": request.query,
            });
            Ok(Response::new(200, body.to_string()).with_url(format!("{}/{}", node, request.path)))
        })
    }

    pub(crate) fn calls(&self) -> Vec<Request> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn send(&self, request: Request) -> Result<Response, ClientError> {
        self.request(&request.path, request.method.clone(), request.data.clone(), request.query.clone())
    }
}

impl SearchClient for ScriptedClient {
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
        self.calls.lock().unwrap().push(request.clone());

        let elapsed = Duration::from_millis(2);
        let result = (self.responder)(&request);
        match &result {
            Ok(response) => self.listeners.notify_success(&request, response, elapsed),
            Err(e) => self.listeners.notify_failure(&request, e, elapsed),
        }
        result
    }

    fn add_listener(&self, listener: Arc<dyn ClientListener>) {
        self.listeners.add(listener);
    }
}
