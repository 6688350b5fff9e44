//! Scripted transport shared by the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use etcd_v2_client::{Client, ClientConfig, Error, RawResponse, Result, Transport};
use http::{HeaderValue, Method, Request, StatusCode};
use http_body_util::{BodyExt, Full};

/// What the client sent
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
    pub timeout: Option<Duration>,
}

impl Recorded {
    /// Query pairs in send order
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .as_deref()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn query_value(&self, name: &str) -> Option<String> {
        self.query_pairs()
            .into_iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    pub fn form_value(&self, name: &str) -> Option<String> {
        url::form_urlencoded::parse(self.body.as_bytes())
            .into_owned()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }
}

#[derive(Default)]
struct Script {
    responses: VecDeque<Result<RawResponse>>,
    requests: Vec<Recorded>,
}

/// Replays queued responses in order and records every request.
/// Running out of responses is reported as a connection error.
#[derive(Clone, Default)]
pub struct MockTransport {
    script: Arc<Mutex<Script>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, status: u16, body: &str) -> &Self {
        let raw = RawResponse::new(
            StatusCode::from_u16(status).expect("valid status"),
            body.to_string(),
        );
        self.script.lock().unwrap().responses.push_back(Ok(raw));
        self
    }

    pub fn push_with_index(&self, status: u16, body: &str, etcd_index: u64) -> &Self {
        let mut raw = RawResponse::new(
            StatusCode::from_u16(status).expect("valid status"),
            body.to_string(),
        );
        raw.headers.insert(
            "x-etcd-index",
            HeaderValue::from_str(&etcd_index.to_string()).unwrap(),
        );
        self.script.lock().unwrap().responses.push_back(Ok(raw));
        self
    }

    pub fn push_error(&self, error: Error) -> &Self {
        self.script.lock().unwrap().responses.push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.script.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.script.lock().unwrap().requests.len()
    }

    pub fn last(&self) -> Recorded {
        self.requests().pop().expect("no request was sent")
    }
}

impl Transport for MockTransport {
    fn send(
        &self,
        request: Request<Full<Bytes>>,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<RawResponse>> + Send {
        let script = self.script.clone();
        async move {
            let (parts, body) = request.into_parts();
            let body = body.collect().await.map(|c| c.to_bytes()).unwrap_or_default();
            let header = |name: http::header::HeaderName| {
                parts
                    .headers
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            };

            let recorded = Recorded {
                method: parts.method.clone(),
                path: parts.uri.path().to_string(),
                query: parts.uri.query().map(str::to_string),
                authorization: header(http::header::AUTHORIZATION),
                content_type: header(http::header::CONTENT_TYPE),
                body: String::from_utf8_lossy(&body).to_string(),
                timeout,
            };

            let mut guard = script.lock().unwrap();
            guard.requests.push(recorded);
            let response = guard
                .responses
                .pop_front()
                .unwrap_or_else(|| Err(Error::Connection("no scripted response left".to_string())));
            response
        }
    }
}

/// Client over a fresh mock transport
pub fn mock_client() -> (Client<MockTransport>, MockTransport) {
    mock_client_with(ClientConfig::default())
}

pub fn mock_client_with(config: ClientConfig) -> (Client<MockTransport>, MockTransport) {
    let transport = MockTransport::new();
    let client = Client::with_transport(config, transport.clone()).expect("valid config");
    (client, transport)
}
