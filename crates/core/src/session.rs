//! Session state: one token, one writer.
//!
//! The session is the only mutable state a client carries. It is owned by
//! [`crate::Client`] behind a lock and mutated exclusively through the
//! session-manager entry points, so the "one token, one writer" invariant
//! stays auditable.

use url::Url;

use crate::browser::BrowserCookie;

/// The authentication state of one client instance.
///
/// `token` is the `JSESSIONID` value. The browser-driven login variant
/// additionally installs the full browser cookie jar; the HTTP variant
/// only ever tracks the token.
#[derive(Debug, Clone)]
pub struct Session {
    base_url: Url,
    token: Option<String>,
    cookies: Vec<BrowserCookie>,
}

impl Session {
    /// Creates an anonymous session against the given server.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            token: None,
            cookies: Vec::new(),
        }
    }

    /// Hostname of the target server.
    pub fn host(&self) -> &str {
        self.base_url.host_str().unwrap_or_default()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for a server path.
    pub fn url_for(&self, path: &str) -> String {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url.to_string()
    }

    /// Current session token, if authenticated.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// `Cookie` header value for the next request: the full browser jar
    /// when one was adopted, else `JSESSIONID=<token>`.
    pub fn cookie_header(&self) -> Option<String> {
        if !self.cookies.is_empty() {
            let joined = self
                .cookies
                .iter()
                .map(|c| format!("{}={}", c.name, c.value))
                .collect::<Vec<_>>()
                .join("; ");
            return Some(joined);
        }
        self.token.as_ref().map(|t| format!("JSESSIONID={t}"))
    }

    /// Overwrites the token with the value carried by a `Set-Cookie`
    /// response header. Returns false when the header has no usable
    /// `name=value` part.
    pub(crate) fn adopt_set_cookie(&mut self, header: &str) -> bool {
        match token_from_set_cookie(header) {
            Some(token) => {
                self.token = Some(token);
                self.cookies.clear();
                true
            }
            None => false,
        }
    }

    /// Installs a browser cookie jar, keeping the `JSESSIONID` entry as
    /// the session token.
    pub(crate) fn adopt_cookies(&mut self, cookies: Vec<BrowserCookie>) {
        self.token = cookies
            .iter()
            .find(|c| c.name == "JSESSIONID")
            .map(|c| c.value.clone());
        self.cookies = cookies;
    }

    /// Drops all authentication state.
    pub(crate) fn clear(&mut self) {
        self.token = None;
        self.cookies.clear();
    }
}

/// Extracts the cookie value from a `Set-Cookie` header: first cookie,
/// value up to the first `;`.
fn token_from_set_cookie(header: &str) -> Option<String> {
    let first = header.split(';').next()?;
    let (_, value) = first.split_once('=')?;
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(Url::parse("https://wticket.example.nl").unwrap())
    }

    #[test]
    fn set_cookie_value_is_taken_up_to_first_semicolon() {
        let mut session = session();
        assert!(session.adopt_set_cookie("JSESSIONID=ABC123; Path=/; HttpOnly"));
        assert_eq!(session.token(), Some("ABC123"));
        assert_eq!(session.cookie_header().as_deref(), Some("JSESSIONID=ABC123"));
    }

    #[test]
    fn set_cookie_without_value_is_rejected() {
        let mut session = session();
        assert!(!session.adopt_set_cookie("garbage"));
        assert!(!session.adopt_set_cookie("JSESSIONID=; Path=/"));
        assert_eq!(session.token(), None);
        assert_eq!(session.cookie_header(), None);
    }

    #[test]
    fn browser_jar_joins_all_cookies_and_keeps_jsessionid_as_token() {
        let mut session = session();
        session.adopt_cookies(vec![
            BrowserCookie::new("JSESSIONID", "XYZ789"),
            BrowserCookie::new("atsc_lang", "nl"),
        ]);
        assert_eq!(session.token(), Some("XYZ789"));
        assert_eq!(
            session.cookie_header().as_deref(),
            Some("JSESSIONID=XYZ789; atsc_lang=nl")
        );
    }

    #[test]
    fn url_for_builds_absolute_paths() {
        let session = session();
        assert_eq!(
            session.url_for("/jsp/wf/index.jsp"),
            "https://wticket.example.nl/jsp/wf/index.jsp"
        );
    }

    #[test]
    fn clear_drops_all_state() {
        let mut session = session();
        session.adopt_set_cookie("JSESSIONID=ABC123");
        session.clear();
        assert_eq!(session.token(), None);
        assert_eq!(session.cookie_header(), None);
    }
}
