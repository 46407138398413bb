// wt-rs: client core for the WTicket ERP's server-rendered protocol surface.
//
// The target application exposes no formal API: data lives in HTML tables
// behind one generic query endpoint, and every write goes through one XML
// form servlet. This crate owns the session state machine, the tabular
// query engine, and the form/action protocol; entity services are thin
// consumers of those capabilities.

pub mod auth;
pub mod browser;
pub mod client;
pub mod error;
pub mod form;
pub mod query;
pub mod services;
pub mod session;
pub mod table;
pub mod testing;
pub mod transport;

pub use auth::{AuthService, Credentials, Status, StatusUser, StatusWarehouse};
pub use browser::{BrowserCookie, BrowserDriver};
pub use client::Client;
pub use error::{Error, Result};
pub use form::FormChannel;
pub use query::QueryEngine;
pub use session::Session;
pub use transport::{Body, HttpTransport, Method, Transport, TransportRequest, TransportResponse};

pub use wt_protocol as protocol;
