//! XML envelope and response shapes of the shared form endpoint.
//!
//! Every business-object write goes through one servlet, keyed by form id
//! and a numeric action code. The request is a flat XML document; the
//! response is one of two structurally different XML shapes that this
//! module normalizes into a single [`FormOutcome`]:
//!
//! * root `message`: an empty `error` element means success, non-empty is
//!   the server-side error text.
//! * root `ioservletresponse`: an EMPTY `error` element means the server
//!   did not recognize the form id/template at all; non-empty is again an
//!   error text. Emptiness signals failure here, inverted from `message`.
//!
//! Downstream code never inspects raw XML shape; the asymmetry is decided
//! once, in [`parse_form_response`].

use std::fmt::Write as _;

use quick_xml::Reader;
use quick_xml::escape::{escape, unescape};
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One field of a form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub id: String,
    pub value: String,
}

/// A complete form submission: form id, numeric action code, and an
/// ordered field list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSubmission {
    pub form_id: String,
    pub action: u16,
    pub fields: Vec<FormField>,
}

impl FormSubmission {
    pub fn new(form_id: impl Into<String>, action: u16) -> Self {
        Self {
            form_id: form_id.into(),
            action,
            fields: Vec::new(),
        }
    }

    /// Appends a field, preserving insertion order.
    pub fn field(mut self, id: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(FormField {
            id: id.into(),
            value: value.into(),
        });
        self
    }

    /// Serializes the submission to the servlet's XML envelope:
    /// `<form id=".." action=".."><field id="..">value</field>…</form>`.
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        let _ = write!(
            xml,
            r#"<form id="{}" action="{}">"#,
            escape(&self.form_id),
            self.action
        );
        for field in &self.fields {
            let _ = write!(
                xml,
                r#"<field id="{}">{}</field>"#,
                escape(&field.id),
                escape(&field.value)
            );
        }
        xml.push_str("</form>");
        xml
    }
}

/// Normalized outcome of a form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// The server accepted the write.
    Success,
    /// The server recognized the form but rejected the write; the message
    /// is carried verbatim.
    Rejected(String),
    /// The server did not recognize the form id/template.
    Unrecognized,
}

/// The response was not one of the two known XML shapes.
#[derive(Debug, Error)]
pub enum ResponseParseError {
    #[error("malformed form response: {0}")]
    Malformed(String),
    #[error("unexpected form response root `{0}`")]
    UnexpectedRoot(String),
}

#[derive(Clone, Copy, PartialEq)]
enum Root {
    Message,
    IoServlet,
}

/// Parses a form endpoint response into its normalized outcome.
pub fn parse_form_response(xml: &str) -> Result<FormOutcome, ResponseParseError> {
    let mut reader = Reader::from_str(xml);

    let mut root = None;
    let mut in_error = false;
    let mut saw_error = false;
    let mut error_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match root {
                    None => {
                        root = Some(match name.as_str() {
                            "message" => Root::Message,
                            "ioservletresponse" => Root::IoServlet,
                            _ => return Err(ResponseParseError::UnexpectedRoot(name)),
                        });
                    }
                    Some(_) if name == "error" => {
                        in_error = true;
                        saw_error = true;
                    }
                    Some(_) => {}
                }
            }
            Ok(Event::Empty(e)) => {
                if root.is_some() && e.name().as_ref() == b"error" {
                    saw_error = true;
                }
            }
            Ok(Event::Text(t)) => {
                if in_error {
                    let decoded = t
                        .decode()
                        .map_err(|e| ResponseParseError::Malformed(e.to_string()))?;
                    let text =
                        unescape(&decoded).map_err(|e| ResponseParseError::Malformed(e.to_string()))?;
                    error_text.push_str(&text);
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"error" {
                    in_error = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ResponseParseError::Malformed(e.to_string())),
            Ok(_) => {}
        }
    }

    let root = root.ok_or_else(|| ResponseParseError::Malformed("no root element".to_string()))?;
    if !saw_error {
        return Err(ResponseParseError::Malformed(
            "missing <error> element".to_string(),
        ));
    }

    let error_text = error_text.trim().to_string();
    Ok(match root {
        // Empty error under ioservletresponse means the form was not
        // recognized, not that the call succeeded.
        Root::IoServlet if error_text.is_empty() => FormOutcome::Unrecognized,
        Root::IoServlet => FormOutcome::Rejected(error_text),
        Root::Message if error_text.is_empty() => FormOutcome::Success,
        Root::Message => FormOutcome::Rejected(error_text),
    })
}
