//! Typed access to a single table cell.

use chrono::{NaiveDate, NaiveDateTime};

use super::{DecodeError, DecodeResult, fragment};

const DATE_FORMAT: &str = "%d-%m-%Y";
const DATETIME_FORMATS: [&str; 2] = ["%d-%m-%Y %H:%M:%S", "%d-%m-%Y %H:%M"];

/// One table cell. Empty text is an absent value, uniformly; callers never
/// see `""`, `0`, or an epoch date standing in for "nothing".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    text: Option<String>,
}

impl Cell {
    pub(crate) fn from_html(inner: &str) -> Self {
        let text = fragment::clean_text(inner);
        Self {
            text: (!text.is_empty()).then_some(text),
        }
    }

    /// Builds a cell from plain text; used by decoder tests.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            text: (!text.is_empty()).then_some(text),
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn required_text(&self) -> DecodeResult<String> {
        self.text
            .clone()
            .ok_or_else(|| DecodeError::new("expected text in empty cell"))
    }

    pub fn integer(&self) -> DecodeResult<Option<i64>> {
        self.text
            .as_deref()
            .map(|t| {
                t.parse()
                    .map_err(|_| DecodeError::new(format!("`{t}` is not an integer")))
            })
            .transpose()
    }

    pub fn required_integer(&self) -> DecodeResult<i64> {
        self.integer()?
            .ok_or_else(|| DecodeError::new("expected an integer in empty cell"))
    }

    /// Calendar date in the server's locale format `dd-mm-yyyy`.
    pub fn date(&self) -> DecodeResult<Option<NaiveDate>> {
        self.text.as_deref().map(parse_date).transpose()
    }

    /// Timestamp in the server's locale format `dd-mm-yyyy HH:mm[:ss]`;
    /// a bare date reads as midnight.
    pub fn datetime(&self) -> DecodeResult<Option<NaiveDateTime>> {
        self.text.as_deref().map(parse_datetime).transpose()
    }
}

pub(crate) fn parse_date(text: &str) -> DecodeResult<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map_err(|_| DecodeError::new(format!("`{text}` is not a dd-mm-yyyy date")))
}

pub(crate) fn parse_datetime(text: &str) -> DecodeResult<NaiveDateTime> {
    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(ts);
        }
    }
    parse_date(text)
        .map(|d| d.and_hms_opt(0, 0, 0).expect("midnight is a valid time"))
        .map_err(|_| DecodeError::new(format!("`{text}` is not a dd-mm-yyyy timestamp")))
}
