//! Browser-driver seam for the UI-automated deployment variant.
//!
//! Some installations sit behind a login page that plain HTTP cannot
//! negotiate (scripted redirects, conflict dialogs). There the login state
//! machine runs as UI automation over whatever headless-browser driver the
//! embedder provides; the session manager only needs the small surface
//! below. Production drivers wrap a real browser; tests use a scripted
//! fake.

use async_trait::async_trait;

use crate::error::Result;

/// One browser-managed cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserCookie {
    pub name: String,
    pub value: String,
}

impl BrowserCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Minimal browser automation surface the session manager drives.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Navigates to an absolute URL and waits for the load to settle.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Types a value into the element matching a CSS selector.
    async fn fill(&self, selector: &str, value: &str) -> Result<()>;

    /// Clicks the control with the given name/id.
    async fn click(&self, control: &str) -> Result<()>;

    /// Clicks the button whose visible text equals `label` exactly.
    async fn click_button_labeled(&self, label: &str) -> Result<()>;

    /// Waits until the page reaches network idle.
    async fn wait_for_network_idle(&self) -> Result<()>;

    /// Title of the current page.
    async fn title(&self) -> Result<String>;

    /// All cookies of the browser context.
    async fn cookies(&self) -> Result<Vec<BrowserCookie>>;
}
