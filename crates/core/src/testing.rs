//! In-memory fakes for exercising the protocol layer without a server.
//!
//! [`FakeTransport`] answers requests from a scripted FIFO queue and
//! records everything it was asked to send; [`FakeDriver`] does the same
//! for the browser seam. Both are used by unit tests here and by
//! downstream crates that test against the client.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::browser::{BrowserCookie, BrowserDriver};
use crate::error::{Error, Result};
use crate::transport::{Body, Method, Transport, TransportRequest, TransportResponse};

/// A request as the fake transport recorded it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<RecordedBody>,
    pub cookie: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedBody {
    Form(Vec<(String, String)>),
    Xml(String),
}

/// Scripted transport: responses are served in push order; when the
/// script runs dry, requests fail as transport errors.
#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<VecDeque<TransportResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the next response.
    pub fn push(&self, response: TransportResponse) {
        self.responses.lock().push_back(response);
    }

    /// Everything sent so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn execute(&self, request: TransportRequest<'_>) -> Result<TransportResponse> {
        self.requests.lock().push(RecordedRequest {
            method: request.method,
            path: request.path.to_string(),
            query: request.query.to_vec(),
            body: request.body.as_ref().map(|body| match body {
                Body::Form(fields) => RecordedBody::Form(fields.clone()),
                Body::Xml(xml) => RecordedBody::Xml(xml.clone()),
            }),
            cookie: request.cookie.clone(),
        });
        self.responses
            .lock()
            .pop_front()
            .ok_or_else(|| Error::Transport("no scripted response left".to_string()))
    }
}

/// 200 response with an HTML body.
pub fn html_response(body: &str) -> TransportResponse {
    TransportResponse {
        status: 200,
        set_cookie: None,
        message: None,
        body: body.to_string(),
    }
}

/// 200 response carrying a `Set-Cookie` header.
pub fn cookie_response(set_cookie: &str) -> TransportResponse {
    TransportResponse {
        status: 200,
        set_cookie: Some(set_cookie.to_string()),
        message: None,
        body: String::new(),
    }
}

/// Failed response with a status and the server's `message` header.
pub fn error_response(status: u16, message: &str) -> TransportResponse {
    TransportResponse {
        status,
        set_cookie: None,
        message: Some(message.to_string()),
        body: String::new(),
    }
}

/// Scripted browser driver.
///
/// `title()` answers from a FIFO script (the last entry repeats), so a
/// test can stage "still anonymous after the first login click, logged in
/// after recovery". Every UI operation is recorded.
#[derive(Default)]
pub struct FakeDriver {
    operations: Mutex<Vec<String>>,
    titles: Mutex<VecDeque<String>>,
    cookies: Mutex<Vec<BrowserCookie>>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the title reported by the next `title()` call.
    pub fn push_title(&self, title: &str) {
        self.titles.lock().push_back(title.to_string());
    }

    pub fn set_cookies(&self, cookies: Vec<BrowserCookie>) {
        *self.cookies.lock() = cookies;
    }

    /// Recorded UI operations, in order.
    pub fn operations(&self) -> Vec<String> {
        self.operations.lock().clone()
    }

    fn record(&self, operation: String) {
        self.operations.lock().push(operation);
    }
}

#[async_trait]
impl BrowserDriver for FakeDriver {
    async fn goto(&self, url: &str) -> Result<()> {
        self.record(format!("goto:{url}"));
        Ok(())
    }

    async fn fill(&self, selector: &str, _value: &str) -> Result<()> {
        self.record(format!("fill:{selector}"));
        Ok(())
    }

    async fn click(&self, control: &str) -> Result<()> {
        self.record(format!("click:{control}"));
        Ok(())
    }

    async fn click_button_labeled(&self, label: &str) -> Result<()> {
        self.record(format!("button:{label}"));
        Ok(())
    }

    async fn wait_for_network_idle(&self) -> Result<()> {
        self.record("wait".to_string());
        Ok(())
    }

    async fn title(&self) -> Result<String> {
        let mut titles = self.titles.lock();
        let title = if titles.len() > 1 {
            titles.pop_front()
        } else {
            titles.front().cloned()
        };
        title.ok_or_else(|| Error::Transport("no scripted title left".to_string()))
    }

    async fn cookies(&self) -> Result<Vec<BrowserCookie>> {
        Ok(self.cookies.lock().clone())
    }
}
