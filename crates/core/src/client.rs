//! Client composition root.
//!
//! One [`Client`] owns one logical session. The protocol capabilities
//! (session manager, query engine, form channel) and the entity services
//! are borrowed from it as independent values; there is no service base
//! class, and nothing but the session manager writes the session.
//!
//! Concurrent use of one client from multiple call sites is not supported:
//! the session token is shared state, and callers wanting parallel
//! sessions give each its own client.

use std::sync::Arc;

use parking_lot::Mutex;
use url::Url;

use crate::auth::AuthService;
use crate::browser::BrowserCookie;
use crate::error::{Error, Result};
use crate::form::FormChannel;
use crate::query::QueryEngine;
use crate::services::{StaffService, TicketService};
use crate::session::Session;
use crate::transport::{Body, HttpTransport, Method, Transport, TransportRequest, TransportResponse};

pub struct Client {
    transport: Arc<dyn Transport>,
    session: Mutex<Session>,
}

impl Client {
    /// Creates a client for the given server over plain HTTP(S).
    ///
    /// A bare hostname is taken as `https://<host>`.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;
        let transport = Arc::new(HttpTransport::new(base_url.clone())?);
        Ok(Self::with_transport(transport, base_url))
    }

    /// Creates a client over a caller-provided transport.
    pub fn with_transport(transport: Arc<dyn Transport>, base_url: Url) -> Self {
        Self {
            transport,
            session: Mutex::new(Session::new(base_url)),
        }
    }

    /// Session manager capability.
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self)
    }

    /// Tabular query capability.
    pub fn queries(&self) -> QueryEngine<'_> {
        QueryEngine::new(self)
    }

    /// Form submission / action capability.
    pub fn forms(&self) -> FormChannel<'_> {
        FormChannel::new(self)
    }

    pub fn staff(&self) -> StaffService<'_> {
        StaffService::new(self)
    }

    pub fn tickets(&self) -> TicketService<'_> {
        TicketService::new(self)
    }

    /// Hostname of the target server.
    pub fn host(&self) -> String {
        self.session.lock().host().to_string()
    }

    /// Current session token, if authenticated.
    pub fn session_token(&self) -> Option<String> {
        self.session.lock().token().map(str::to_string)
    }

    /// Absolute URL for a server path (browser navigation).
    pub(crate) fn url_for(&self, path: &str) -> String {
        self.session.lock().url_for(path)
    }

    pub(crate) async fn get(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<TransportResponse> {
        self.execute(Method::Get, path, query, None).await
    }

    pub(crate) async fn post(
        &self,
        path: &str,
        query: &[(String, String)],
        body: Option<Body>,
    ) -> Result<TransportResponse> {
        self.execute(Method::Post, path, query, body).await
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<Body>,
    ) -> Result<TransportResponse> {
        let cookie = self.session.lock().cookie_header();
        self.transport
            .execute(TransportRequest {
                method,
                path,
                query,
                body,
                cookie,
            })
            .await
    }

    // Session mutation below is reserved for the session manager.

    pub(crate) fn adopt_set_cookie(&self, header: &str) -> bool {
        self.session.lock().adopt_set_cookie(header)
    }

    pub(crate) fn adopt_browser_cookies(&self, cookies: Vec<BrowserCookie>) {
        self.session.lock().adopt_cookies(cookies);
    }

    pub(crate) fn clear_session(&self) {
        self.session.lock().clear();
    }
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    let normalized = if base_url.contains("://") {
        base_url.to_string()
    } else {
        format!("https://{base_url}")
    };
    Url::parse(&normalized).map_err(|e| Error::Protocol(format!("invalid base url `{base_url}`: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_hostname_defaults_to_https() {
        let client = Client::new("wticket.example.nl").unwrap();
        assert_eq!(client.host(), "wticket.example.nl");
        assert_eq!(
            client.url_for("/jsp/wf/index.jsp"),
            "https://wticket.example.nl/jsp/wf/index.jsp"
        );
    }

    #[test]
    fn explicit_scheme_is_kept() {
        let client = Client::new("http://127.0.0.1:8080").unwrap();
        assert_eq!(client.url_for("/login"), "http://127.0.0.1:8080/login");
    }

    #[test]
    fn fresh_client_is_anonymous() {
        let client = Client::new("wticket.example.nl").unwrap();
        assert_eq!(client.session_token(), None);
    }
}
