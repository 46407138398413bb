//! Ticket lookup, ticket messages, and message actions.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex_lite::Regex;
use serde::Serialize;

use wt_protocol::{FilterOp, FormSubmission, QuerySpec};

use crate::client::Client;
use crate::error::{Error, Result};
use crate::table::{self, DecodeError, DecodeResult, RawRow};

const TICKET_QUERY: &str = "wf1act";
const MESSAGE_FORM: &str = "wf1procesinsmsgadd";
const MESSAGE_FORM_ACTION: u16 = 15;
const MESSAGE_ENTITY: &str = "wf1procesinsmsg";
const PIN_ACTION: &str = "101";
const UNPIN_ACTION: &str = "102";
/// Entity form page the message thread is scraped from.
const TICKET_FORM_PATH: &str = "/jsp/wf/uiform/uiform_wf1act.jsp";

/// Search columns of the ticket query, by position in the server-side
/// report definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchColumn {
    Id,
    SearchName,
    Description,
    P,
    Pi,
    S,
    As,
    PlannedFrom,
    PlannedUntil,
    Deadline,
    UpdatedAt,
    Age,
    Eig,
    Hv,
    Involved,
}

impl SearchColumn {
    pub fn index(self) -> u32 {
        match self {
            SearchColumn::Id => 2,
            SearchColumn::SearchName => 3,
            SearchColumn::Description => 4,
            SearchColumn::P => 5,
            SearchColumn::Pi => 6,
            SearchColumn::S => 7,
            SearchColumn::As => 8,
            SearchColumn::PlannedFrom => 9,
            SearchColumn::PlannedUntil => 10,
            SearchColumn::Deadline => 11,
            SearchColumn::UpdatedAt => 12,
            SearchColumn::Age => 13,
            SearchColumn::Eig => 14,
            SearchColumn::Hv => 15,
            SearchColumn::Involved => 16,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Ticket {
    pub unid: u64,
    /// User-facing ticket number, distinct from the unid.
    pub number: i64,
    pub search_name: String,
    pub description: Option<String>,
}

/// Whether a message is internal to the organization or visible to the
/// customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum MessageKind {
    #[default]
    Internal,
    External,
}

impl MessageKind {
    fn code(self) -> &'static str {
        match self {
            MessageKind::Internal => "I",
            MessageKind::External => "E",
        }
    }
}

/// Header colors the application accepts for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MessageColor {
    Blauw,
    DonkerGrijs,
    Oranje,
    Geel,
    Groen,
    Paars,
    Rood,
    Roze,
    Turquoise,
}

impl MessageColor {
    fn code(self) -> &'static str {
        match self {
            MessageColor::Blauw => "BLAUW",
            MessageColor::DonkerGrijs => "DONKER-GRIJS",
            MessageColor::Oranje => "ORANJE",
            MessageColor::Geel => "GEEL",
            MessageColor::Groen => "GROEN",
            MessageColor::Paars => "PAARS",
            MessageColor::Rood => "ROOD",
            MessageColor::Roze => "ROZE",
            MessageColor::Turquoise => "TURQUOISE",
        }
    }
}

/// A message to append to a ticket's thread.
#[derive(Debug, Clone, Default)]
pub struct NewMessage {
    pub kind: MessageKind,
    pub color: Option<MessageColor>,
    pub title: Option<String>,
    pub body: Option<String>,
}

impl NewMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn external(mut self) -> Self {
        self.kind = MessageKind::External;
        self
    }

    pub fn with_color(mut self, color: MessageColor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// One message of a ticket's thread as rendered on the entity form page.
#[derive(Debug, Clone, Serialize)]
pub struct TicketMessage {
    pub unid: u64,
    pub kind: MessageKind,
    pub timestamp: NaiveDateTime,
    pub author: String,
    pub title: String,
    /// Message body, raw inner HTML.
    pub body_html: String,
}

pub struct TicketService<'a> {
    client: &'a Client,
}

impl<'a> TicketService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Looks a ticket up by its user-facing number.
    pub async fn get(&self, ticket_number: i64) -> Result<Ticket> {
        let spec = QuerySpec::new(TICKET_QUERY).filter(
            SearchColumn::Id.index(),
            FilterOp::Exact,
            ticket_number.to_string(),
        );
        self.client.queries().get(&spec, decode_ticket).await
    }

    /// Appends a message to the ticket's thread.
    pub async fn add_message(&self, ticket_unid: u64, message: &NewMessage) -> Result<()> {
        let mut submission = FormSubmission::new(MESSAGE_FORM, MESSAGE_FORM_ACTION)
            .field("messageType", message.kind.code())
            .field("actnr_wf1act_unid", ticket_unid.to_string());
        if let Some(color) = message.color {
            submission = submission.field("headerclass", color.code());
        }
        if let Some(title) = &message.title {
            submission = submission.field("onderwerp", title.clone());
        }
        if let Some(body) = &message.body {
            submission = submission.field("bericht", body.clone());
        }
        self.client.forms().submit(&submission).await
    }

    /// Pins a message to the top of the thread. Idempotent by id.
    pub async fn pin_message(&self, message_unid: u64) -> Result<()> {
        self.message_action(PIN_ACTION, message_unid).await
    }

    /// Removes a message's pin. Idempotent by id.
    pub async fn unpin_message(&self, message_unid: u64) -> Result<()> {
        self.message_action(UNPIN_ACTION, message_unid).await
    }

    /// Scrapes the ticket's message thread off the entity form page.
    pub async fn list_messages(&self, ticket_unid: u64) -> Result<Vec<TicketMessage>> {
        let html = self
            .client
            .queries()
            .page(
                TICKET_FORM_PATH,
                &[("uniqueid".to_string(), ticket_unid.to_string())],
            )
            .await?;
        parse_messages(&html)
    }

    async fn message_action(&self, action: &str, message_unid: u64) -> Result<()> {
        self.client
            .forms()
            .execute_action(&[
                ("action", action),
                ("name", MESSAGE_ENTITY),
                ("uniqueid", &message_unid.to_string()),
            ])
            .await
    }
}

pub(crate) fn decode_ticket(row: &RawRow) -> DecodeResult<Ticket> {
    Ok(Ticket {
        unid: row.unid()?,
        number: row.cell(1)?.required_integer()?,
        search_name: row.cell(2)?.required_text()?,
        description: row.cell(3)?.text().map(str::to_string),
    })
}

static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<div([^>]*class=["'][^"']*\bcomment\b[^"']*\bexpanded\b[^"']*["'][^>]*)>"#)
        .expect("COMMENT_RE should compile")
});

fn parse_messages(html: &str) -> Result<Vec<TicketMessage>> {
    // Expanded comment blocks are flat siblings; each block runs from its
    // opening tag to the next block's opening tag.
    let blocks: Vec<(String, usize, usize)> = COMMENT_RE
        .captures_iter(html)
        .map(|caps| {
            let whole = caps.get(0).expect("match 0 is always present");
            let attrs = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
            (attrs, whole.start(), whole.end())
        })
        .collect();

    let mut messages = Vec::new();
    for (i, (attrs, _, content_start)) in blocks.iter().enumerate() {
        let end = blocks.get(i + 1).map(|(_, start, _)| *start).unwrap_or(html.len());
        let chunk = &html[*content_start..end];

        let unid = table::attribute(attrs, "id")
            .and_then(|id| id.strip_prefix("comment").map(str::to_string))
            .and_then(|id| id.parse().ok())
            .ok_or_else(|| Error::Protocol("comment block has no comment id".to_string()))?;

        let message = decode_message(unid, chunk).map_err(|e| Error::Decode {
            unid: unid.to_string(),
            reason: e.to_string(),
        })?;
        messages.push(message);
    }
    Ok(messages)
}

fn decode_message(unid: u64, chunk: &str) -> DecodeResult<TicketMessage> {
    let kind = if table::element_html_by_class(chunk, "internal").is_some() {
        MessageKind::Internal
    } else {
        MessageKind::External
    };
    let timestamp = table::element_text_by_class(chunk, "timestamp")
        .ok_or_else(|| DecodeError::new("comment has no timestamp"))?;
    let timestamp = table::parse_datetime(&timestamp)?;
    let author = table::element_text_by_class(chunk, "author")
        .ok_or_else(|| DecodeError::new("comment has no author"))?;
    let title = table::element_text_by_class(chunk, "desc")
        .ok_or_else(|| DecodeError::new("comment has no title"))?;
    let body_html = table::element_html_by_class(chunk, "message")
        .ok_or_else(|| DecodeError::new("comment has no message body"))?;

    Ok(TicketMessage {
        unid,
        kind,
        timestamp,
        author,
        title,
        body_html,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use url::Url;

    use super::*;
    use crate::testing::{FakeTransport, RecordedBody, html_response};

    fn client_with(transport: Arc<FakeTransport>) -> Client {
        Client::with_transport(transport, Url::parse("https://wticket.example.nl").unwrap())
    }

    #[tokio::test]
    async fn get_filters_on_the_number_column() {
        let transport = Arc::new(FakeTransport::new());
        transport.push(html_response(
            r#"<tr unid="9001"><td>x</td><td>20412</td><td>ACME</td><td></td></tr>"#,
        ));
        let client = client_with(transport.clone());

        let ticket = client.tickets().get(20412).await.unwrap();
        assert_eq!(ticket.unid, 9001);
        assert_eq!(ticket.number, 20412);
        assert_eq!(ticket.search_name, "ACME");
        assert_eq!(ticket.description, None);

        let requests = transport.requests();
        assert!(
            requests[0]
                .query
                .contains(&("searchcol".to_string(), "2".to_string()))
        );
        assert!(
            requests[0]
                .query
                .contains(&("key".to_string(), "_<exact>_20412".to_string()))
        );
    }

    #[tokio::test]
    async fn get_reports_not_found_on_placeholder_only_answers() {
        let transport = Arc::new(FakeTransport::new());
        transport.push(html_response(
            r#"<tr empty="true"><td>Geen resultaten</td></tr>"#,
        ));
        let client = client_with(transport);

        let err = client.tickets().get(99999).await.unwrap_err();
        assert!(matches!(err, Error::NotFound));
    }

    #[tokio::test]
    async fn add_message_builds_the_documented_envelope() {
        let transport = Arc::new(FakeTransport::new());
        transport.push(html_response("<message><error></error></message>"));
        let client = client_with(transport.clone());

        let message = NewMessage::new()
            .with_color(MessageColor::DonkerGrijs)
            .with_title("Terugbelverzoek")
            .with_body("Klant gebeld, geen gehoor.");
        client.tickets().add_message(5512, &message).await.unwrap();

        let requests = transport.requests();
        match &requests[0].body {
            Some(RecordedBody::Xml(xml)) => {
                assert!(xml.starts_with(r#"<form id="wf1procesinsmsgadd" action="15">"#));
                assert!(xml.contains(r#"<field id="messageType">I</field>"#));
                assert!(xml.contains(r#"<field id="actnr_wf1act_unid">5512</field>"#));
                assert!(xml.contains(r#"<field id="headerclass">DONKER-GRIJS</field>"#));
                assert!(xml.contains(r#"<field id="onderwerp">Terugbelverzoek</field>"#));
            }
            other => panic!("expected xml body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn bare_message_omits_optional_fields() {
        let transport = Arc::new(FakeTransport::new());
        transport.push(html_response("<message><error></error></message>"));
        let client = client_with(transport.clone());

        client
            .tickets()
            .add_message(5512, &NewMessage::new().external())
            .await
            .unwrap();

        let requests = transport.requests();
        match &requests[0].body {
            Some(RecordedBody::Xml(xml)) => {
                assert!(xml.contains(r#"<field id="messageType">E</field>"#));
                assert!(!xml.contains("headerclass"));
                assert!(!xml.contains("onderwerp"));
                assert!(!xml.contains("bericht"));
            }
            other => panic!("expected xml body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn pin_and_unpin_use_the_action_codes() {
        let transport = Arc::new(FakeTransport::new());
        transport.push(html_response(""));
        transport.push(html_response(""));
        let client = client_with(transport.clone());

        client.tickets().pin_message(7710).await.unwrap();
        client.tickets().unpin_message(7710).await.unwrap();

        let requests = transport.requests();
        assert_eq!(
            requests[0].query,
            vec![
                ("action".to_string(), "101".to_string()),
                ("name".to_string(), "wf1procesinsmsg".to_string()),
                ("uniqueid".to_string(), "7710".to_string()),
            ]
        );
        assert_eq!(requests[1].query[0], ("action".to_string(), "102".to_string()));
    }

    const THREAD: &str = r#"
        <div id="comment7710" class="comment expanded">
            <span class="internal">I</span>
            <span class="timestamp">24-09-2025 13:05</span>
            <span class="author">P. Bakker</span>
            <span class="desc">Terugbelverzoek</span>
            <p class="message">Klant gebeld, <b>geen gehoor</b>.</p>
        </div>
        <div id="comment7711" class="comment expanded">
            <span class="timestamp">25-09-2025 09:12:30</span>
            <span class="author">J. Doe</span>
            <span class="desc">Update</span>
            <p class="message">Onderdeel besteld.</p>
        </div>
        <div id="comment7712" class="comment">collapsed, not listed</div>
    "#;

    #[tokio::test]
    async fn list_messages_scrapes_expanded_comments() {
        let transport = Arc::new(FakeTransport::new());
        transport.push(html_response(THREAD));
        let client = client_with(transport.clone());

        let messages = client.tickets().list_messages(5512).await.unwrap();
        assert_eq!(messages.len(), 2);

        assert_eq!(messages[0].unid, 7710);
        assert_eq!(messages[0].kind, MessageKind::Internal);
        assert_eq!(messages[0].author, "P. Bakker");
        assert_eq!(messages[0].title, "Terugbelverzoek");
        assert_eq!(messages[0].body_html, "Klant gebeld, <b>geen gehoor</b>.");
        assert_eq!(
            messages[0].timestamp.format("%d-%m-%Y %H:%M").to_string(),
            "24-09-2025 13:05"
        );

        assert_eq!(messages[1].kind, MessageKind::External);

        let requests = transport.requests();
        assert_eq!(requests[0].path, "/jsp/wf/uiform/uiform_wf1act.jsp");
        assert_eq!(
            requests[0].query,
            vec![("uniqueid".to_string(), "5512".to_string())]
        );
    }

    #[test]
    fn search_columns_match_the_report_definition() {
        assert_eq!(SearchColumn::Id.index(), 2);
        assert_eq!(SearchColumn::Description.index(), 4);
        assert_eq!(SearchColumn::Involved.index(), 16);
    }
}
