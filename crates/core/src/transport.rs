//! Transport seam: how requests leave the client.
//!
//! The protocol layer never talks to reqwest directly; it goes through the
//! [`Transport`] trait so the engine and the session manager can be
//! exercised against an in-memory fake. [`HttpTransport`] is the plain
//! HTTP deployment variant. The browser-driven deployment keeps its own
//! seam in [`crate::browser`].

use async_trait::async_trait;
use reqwest::header;
use url::Url;

use crate::error::{Error, Result};

/// Content type of form envelope posts.
pub const XML_CONTENT_TYPE: &str = "text/xml; charset=UTF-8";

/// HTTP method of an outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Body of an outbound POST.
#[derive(Debug, Clone)]
pub enum Body {
    /// `application/x-www-form-urlencoded` fields (login).
    Form(Vec<(String, String)>),
    /// `text/xml; charset=UTF-8` document (form envelope).
    Xml(String),
}

/// One outbound request, fully described.
#[derive(Debug)]
pub struct TransportRequest<'a> {
    pub method: Method,
    /// Server path, absolute (`/jsp/...`).
    pub path: &'a str,
    /// Query parameters, order-preserving.
    pub query: &'a [(String, String)],
    pub body: Option<Body>,
    /// `Cookie` header value carrying the current session, if any.
    pub cookie: Option<String>,
}

/// The parts of a response the protocol layer actually reads.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    /// First `Set-Cookie` header, raw.
    pub set_cookie: Option<String>,
    /// The server's custom `message` header (login failures).
    pub message: Option<String>,
    pub body: String,
}

impl TransportResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues outbound requests carrying the current session token.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: TransportRequest<'_>) -> Result<TransportResponse>;
}

/// Plain-HTTP transport over reqwest.
///
/// Cookie handling is deliberately manual: the session token is attached
/// explicitly per request and extracted explicitly from `Set-Cookie`, so
/// the one-token-one-writer invariant is not hidden inside a cookie store.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: Url) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str, query: &[(String, String)]) -> Result<Url> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| Error::Protocol(format!("invalid request path `{path}`: {e}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: TransportRequest<'_>) -> Result<TransportResponse> {
        let url = self.url(request.path, request.query)?;

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        if let Some(cookie) = &request.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder = match request.body {
            Some(Body::Form(fields)) => builder.form(&fields),
            Some(Body::Xml(xml)) => builder
                .header(header::CONTENT_TYPE, XML_CONTENT_TYPE)
                .body(xml),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let message = response
            .headers()
            .get("message")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        Ok(TransportResponse {
            status,
            set_cookie,
            message,
            body,
        })
    }
}
