//! Wire types for the WTicket server protocol.
//!
//! This crate contains the types that describe data exactly as it crosses
//! the wire: the query-string encoding understood by the generic table
//! endpoint, and the XML envelope/response shapes of the shared IOServlet
//! form endpoint.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: no transport, no session, no I/O
//! * 1:1 with the protocol: encodings match what the server actually accepts
//! * Stable: changes only when the observed wire protocol changes
//!
//! Higher-level ergonomic APIs are built on top of these types in `wt-rs`.

pub mod form;
pub mod query;

pub use form::*;
pub use query::*;
