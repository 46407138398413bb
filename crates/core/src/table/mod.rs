//! Decoding of server-rendered HTML tables into raw rows.
//!
//! The query endpoint answers with an HTML document whose `tr` elements
//! carry the data: a `unid` attribute holds the entity identifier, and a
//! row marked `empty="true"` is the server's "no matching results"
//! placeholder, never data. The first two rows of a full listing are
//! header/structural rows. All of those rules are applied here, once,
//! before any per-entity decoding sees a row.

mod cell;
mod fragment;

use std::sync::LazyLock;

use regex_lite::Regex;
use thiserror::Error;

pub use cell::Cell;
pub(crate) use cell::{parse_date, parse_datetime};
pub(crate) use fragment::{
    attribute, clean_text, element_by_id, element_html_by_class, element_text_by_class,
    element_text_by_id,
};

/// Number of leading header/structural rows in a full listing.
pub const STRUCTURAL_ROWS: usize = 2;

static ROW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tr\b([^>]*)>(.*?)</tr>").expect("ROW_RE should compile"));
static CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<td\b[^>]*>(.*?)</td>").expect("CELL_RE should compile"));

/// A row as the server rendered it: identifier, sentinel marker, and the
/// ordered cell sequence. Ordering is the server's; no client-side sort.
#[derive(Debug, Clone)]
pub struct RawRow {
    /// Entity identifier, absent on header/structural rows.
    pub unid: Option<u64>,
    /// True when the row is the "no results" placeholder.
    pub empty: bool,
    pub cells: Vec<Cell>,
}

impl RawRow {
    /// The row's entity identifier; an error when the row has none.
    pub fn unid(&self) -> DecodeResult<u64> {
        self.unid
            .ok_or_else(|| DecodeError::new("row has no unid attribute"))
    }

    /// Cell at `index`; an error when the row is too short.
    pub fn cell(&self, index: usize) -> DecodeResult<&Cell> {
        self.cells
            .get(index)
            .ok_or_else(|| DecodeError::new(format!("row has no cell {index}")))
    }
}

/// A per-entity decode rejected a row.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct DecodeError(String);

impl DecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Extracts every `tr` of the document, in server order.
pub fn parse_rows(html: &str) -> Vec<RawRow> {
    ROW_RE
        .captures_iter(html)
        .map(|caps| {
            let attrs = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let inner = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            RawRow {
                unid: fragment::attribute(attrs, "unid").and_then(|v| v.parse().ok()),
                empty: fragment::attribute(attrs, "empty").as_deref() == Some("true"),
                cells: CELL_RE
                    .captures_iter(inner)
                    .map(|c| Cell::from_html(c.get(1).map(|m| m.as_str()).unwrap_or_default()))
                    .collect(),
            }
        })
        .collect()
}

/// Listing view: skips the structural rows, drops placeholder rows.
pub fn data_rows(rows: &[RawRow]) -> impl Iterator<Item = &RawRow> {
    rows.iter().skip(STRUCTURAL_ROWS).filter(|row| !row.empty)
}

/// Lookup view: drops placeholder rows only, yields the first remainder.
pub fn first_match(rows: &[RawRow]) -> Option<&RawRow> {
    rows.iter().find(|row| !row.empty)
}
