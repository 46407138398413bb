//! Session manager: the login/logout state machine and liveness probes.
//!
//! Two deployment variants express the same state machine. The plain-HTTP
//! variant walks the login endpoints directly and lifts the session token
//! out of `Set-Cookie`. The browser-driven variant automates the login
//! page UI through a [`BrowserDriver`], including the application's
//! duplicate-session conflict dialog.
//!
//! States: Anonymous → Authenticating → Authenticated, with one side path
//! Authenticating → ConflictDetected → Authenticating (retried once) →
//! Authenticated | Failed. There is never more than one recovery cycle.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::browser::BrowserDriver;
use crate::client::Client;
use crate::error::{Error, Result};
use crate::table;
use crate::transport::Body;

/// Landing page; doubles as the anonymous-cookie bootstrap.
pub const INDEX_PATH: &str = "/jsp/wf/index.jsp";
const LOGIN_PATH: &str = "/login";
const LOGOUT_PATH: &str = "/login/wf/logout.jsp";
const STATUS_PATH: &str = "/jsp/wf/status.jsp";

/// Pages served to an anonymous session carry exactly this title;
/// logged-in pages never do.
const ANONYMOUS_TITLE: &str = "WTicket";
const LOGIN_BUTTON_LABEL: &str = "Login";

// The conflict dialog is dismissed by clicking these controls in exactly
// this order. The second control really is clicked twice; the target UI
// does not proceed otherwise.
const CONFLICT_CONTROLS: [&str; 3] = ["remove_session_0", "remove_session_1", "remove_session_1"];

const GENERIC_LOGIN_ERROR: &str = "Something went wrong";
const LOGIN_FAILED: &str = "Failed to login";

/// Login credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Answer of the status probe: server date, warehouse identity, and the
/// authenticated user's identity.
#[derive(Debug, Clone, Serialize)]
pub struct Status {
    pub date: NaiveDate,
    pub warehouse: StatusWarehouse,
    pub user: StatusUser,
    pub version: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusWarehouse {
    pub unid: u64,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusUser {
    pub unid: u64,
    /// User-facing staff number, distinct from the unid.
    pub id: u64,
    pub login: String,
    pub code: String,
}

pub struct AuthService<'a> {
    client: &'a Client,
}

impl<'a> AuthService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Authenticates over plain HTTP.
    ///
    /// Walks the observed protocol: fetch the login page for an anonymous
    /// cookie, refresh the session, post the credentials form-encoded,
    /// then adopt the token from `Set-Cookie`. A non-OK status fails with
    /// the server's `message` header when present.
    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        let site = self.client.get(INDEX_PATH, &[]).await?;
        match &site.set_cookie {
            Some(header) => {
                self.client.adopt_set_cookie(header);
            }
            None => debug!(target: "wt.session", "login page set no anonymous cookie"),
        }

        self.client
            .post(
                LOGIN_PATH,
                &[("action".to_string(), "refreshsession".to_string())],
                None,
            )
            .await?;

        let response = self
            .client
            .post(
                LOGIN_PATH,
                &[],
                Some(Body::Form(vec![
                    ("username".to_string(), credentials.username.clone()),
                    ("password".to_string(), credentials.password.clone()),
                ])),
            )
            .await?;
        if let Some(header) = &response.set_cookie {
            self.client.adopt_set_cookie(header);
        }

        if !response.ok() {
            return Err(Error::Auth(
                response
                    .message
                    .clone()
                    .unwrap_or_else(|| GENERIC_LOGIN_ERROR.to_string()),
            ));
        }

        info!(target: "wt.session", user = %credentials.username, "logged in");
        Ok(())
    }

    /// Authenticates by driving the login page UI.
    ///
    /// If the page is still anonymous after the login click, another
    /// session is active elsewhere and the conflict dialog is resolved by
    /// the documented click sequence, then login is retried exactly once.
    pub async fn login_with_driver(
        &self,
        driver: &dyn BrowserDriver,
        credentials: &Credentials,
    ) -> Result<()> {
        driver.goto(&self.client.url_for(INDEX_PATH)).await?;
        driver.fill("#username", &credentials.username).await?;
        driver.fill("#password", &credentials.password).await?;

        self.click_login(driver).await?;
        if self.page_is_anonymous(driver).await? {
            debug!(target: "wt.session", "session active elsewhere; resolving conflict");
            for control in CONFLICT_CONTROLS {
                driver.click(control).await?;
            }
            self.click_login(driver).await?;
            if self.page_is_anonymous(driver).await? {
                return Err(Error::Auth(LOGIN_FAILED.to_string()));
            }
        }

        self.client.adopt_browser_cookies(driver.cookies().await?);
        info!(target: "wt.session", user = %credentials.username, "logged in via browser");
        Ok(())
    }

    /// Ends the session on the server, best-effort. Failures are logged,
    /// never surfaced; local state is dropped either way so the client can
    /// be reused with a fresh login.
    pub async fn logout(&self) {
        if let Err(err) = self.client.get(LOGOUT_PATH, &[]).await {
            warn!(target: "wt.session", error = %err, "logout failed");
        }
        self.client.clear_session();
    }

    /// Browser variant: whether the current browser context is logged in,
    /// judged by the index page title.
    pub async fn is_logged_in(&self, driver: &dyn BrowserDriver) -> Result<bool> {
        driver.goto(&self.client.url_for(INDEX_PATH)).await?;
        Ok(!self.page_is_anonymous(driver).await?)
    }

    /// Fetches and parses the status fragment. Serves as a liveness probe
    /// and as the source of the caller's own user unid.
    pub async fn status(&self) -> Result<Status> {
        let response = self.client.get(STATUS_PATH, &[]).await?;
        parse_status(&response.body)
    }

    async fn click_login(&self, driver: &dyn BrowserDriver) -> Result<()> {
        driver.click_button_labeled(LOGIN_BUTTON_LABEL).await?;
        driver.wait_for_network_idle().await
    }

    async fn page_is_anonymous(&self, driver: &dyn BrowserDriver) -> Result<bool> {
        Ok(driver.title().await? == ANONYMOUS_TITLE)
    }
}

fn parse_status(html: &str) -> Result<Status> {
    let date_text =
        table::element_text_by_id(html, "statusdate").ok_or_else(|| missing("statusdate"))?;
    let date = table::parse_date(&date_text)
        .map_err(|e| Error::Protocol(format!("status date: {e}")))?;

    let (warehouse_attrs, warehouse_inner) =
        table::element_by_id(html, "warehouse").ok_or_else(|| missing("warehouse"))?;
    let warehouse = parse_warehouse(&warehouse_attrs, &warehouse_inner)?;

    let (user_attrs, user_inner) =
        table::element_by_id(html, "user").ok_or_else(|| missing("user"))?;
    let user = parse_user(&user_attrs, &user_inner)?;

    let version = table::element_text_by_id(html, "version")
        .ok_or_else(|| missing("version"))?
        .parse()
        .map_err(|_| Error::Protocol("status version is not a number".to_string()))?;

    Ok(Status {
        date,
        warehouse,
        user,
        version,
    })
}

fn parse_warehouse(attrs: &str, inner: &str) -> Result<StatusWarehouse> {
    let unid = required_attr(attrs, "unid", "warehouse")?;
    let text = table::clean_text(inner);
    let (code, name) = text
        .split_once(" - ")
        .ok_or_else(|| Error::Protocol(format!("unparseable warehouse label `{text}`")))?;
    Ok(StatusWarehouse {
        unid,
        code: code.to_string(),
        name: name.to_string(),
    })
}

fn parse_user(attrs: &str, inner: &str) -> Result<StatusUser> {
    let unid = required_attr(attrs, "unid", "user")?;
    let id = required_attr(attrs, "userid", "user")?;
    let text = table::clean_text(inner);
    let (login, code) = text
        .split_once(" (")
        .and_then(|(login, rest)| Some((login, rest.strip_suffix(')')?)))
        .ok_or_else(|| Error::Protocol(format!("unparseable user label `{text}`")))?;
    Ok(StatusUser {
        unid,
        id,
        login: login.to_string(),
        code: code.to_string(),
    })
}

fn required_attr(attrs: &str, name: &str, element: &str) -> Result<u64> {
    table::attribute(attrs, name)
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| Error::Protocol(format!("status {element} has no numeric {name}")))
}

fn missing(id: &str) -> Error {
    Error::Protocol(format!("status fragment has no `{id}` element"))
}
