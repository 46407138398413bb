//! Error and Result types for wt-rs.
//!
//! Every recoverable failure is returned as data through [`Result`]; the
//! variants follow the protocol's error taxonomy rather than the transport
//! stack's. Nothing in this crate panics on a recoverable condition.

use thiserror::Error;

use crate::table::{DecodeError, RawRow};

/// Result type used throughout wt-rs.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Network or navigation failure. Not retried automatically.
    #[error("something went wrong: {0}")]
    Transport(String),

    /// Login failed, or conflict recovery was exhausted. Terminal.
    #[error("{0}")]
    Auth(String),

    /// A single-entity query yielded zero real rows after sentinel
    /// exclusion. Distinct from a transport or parsing failure.
    #[error("no matching entity row")]
    NotFound,

    /// A row's cells did not satisfy the expected shape. Fails the whole
    /// listing call, tagged with the offending row's identifier.
    #[error("failed to decode row {unid}: {reason}")]
    Decode { unid: String, reason: String },

    /// Server-side validation/business error, carried verbatim.
    #[error("form rejected: {0}")]
    FormRejected(String),

    /// The server did not recognize the form id/template.
    #[error("form not recognized")]
    UnrecognizedForm,

    /// A response did not have the shape the protocol requires. Indicates
    /// a client/library bug or a server change, not a business condition.
    #[error("protocol violation: {0}")]
    Protocol(String),
}

impl Error {
    /// Tags a row decode failure with the row's entity identifier.
    pub(crate) fn decode(row: &RawRow, err: DecodeError) -> Self {
        Error::Decode {
            unid: row
                .unid
                .map(|u| u.to_string())
                .unwrap_or_else(|| "<no unid>".to_string()),
            reason: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

impl From<wt_protocol::ResponseParseError> for Error {
    fn from(err: wt_protocol::ResponseParseError) -> Self {
        Error::Protocol(err.to_string())
    }
}
