//! Staff listings.

use serde::Serialize;

use wt_protocol::QuerySpec;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::query::QueryEngine;
use crate::table::{self, DecodeResult, RawRow};

use super::ticket::{Ticket, decode_ticket};

const STAFF_QUERY: &str = "wf1medewerkers";
const RUNNING_TICKETS_QUERY: &str = "wf1actlopend";
/// Foreign link selecting tickets whose executor set contains the staff
/// member.
const EXECUTOR_LINK: &str = "_<arrayoverlaps>_uitvoerder_gc1mdw_unid";
/// Footer cell carrying the aggregate open-task count of the listing.
const TASK_TOTAL_ID: &str = "sc3";

#[derive(Debug, Clone, Serialize)]
pub struct StaffMember {
    pub unid: u64,
    pub staff_code: String,
    pub name: String,
    /// Open task count; absent when the member has none recorded.
    pub tasks: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StaffList {
    /// Aggregate open-task count over the whole listing.
    pub total_tasks: i64,
    pub staff: Vec<StaffMember>,
}

pub struct StaffService<'a> {
    client: &'a Client,
}

impl<'a> StaffService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Full staff listing plus the footer task total.
    pub async fn list(&self) -> Result<StaffList> {
        let html = self
            .client
            .queries()
            .document(&QuerySpec::new(STAFF_QUERY))
            .await?;
        let rows = table::parse_rows(&html);
        let staff = QueryEngine::decode_listing(&rows, decode_member)?;
        let total_tasks = table::element_text_by_id(&html, TASK_TOTAL_ID)
            .and_then(|text| text.parse().ok())
            .ok_or_else(|| Error::Protocol("staff listing has no task total".to_string()))?;
        Ok(StaffList { total_tasks, staff })
    }

    /// Running tickets assigned to one staff member.
    pub async fn list_tickets(&self, staff_unid: u64) -> Result<Vec<Ticket>> {
        let spec = QuerySpec::new(RUNNING_TICKETS_QUERY)
            .with_foreign(EXECUTOR_LINK, staff_unid.to_string());
        self.client.queries().list(&spec, decode_ticket).await
    }
}

fn decode_member(row: &RawRow) -> DecodeResult<StaffMember> {
    Ok(StaffMember {
        unid: row.unid()?,
        staff_code: row.cell(0)?.required_text()?,
        name: row.cell(1)?.required_text()?,
        tasks: row.cell(2)?.integer()?,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use url::Url;

    use super::*;
    use crate::testing::{FakeTransport, html_response};

    const STAFF_LISTING: &str = r#"
        <table>
        <tr><td>Code</td><td>Naam</td><td>Taken</td></tr>
        <tr><td></td><td></td><td></td></tr>
        <tr unid="311"><td>JDO</td><td>J. Doe</td><td>4</td></tr>
        <tr unid="312"><td>AVR</td><td>A. de Vries</td><td></td></tr>
        <tr empty="true"><td>Geen resultaten</td><td></td><td></td></tr>
        </table>
        <td id="sc3">27</td>
    "#;

    fn client_with(transport: Arc<FakeTransport>) -> Client {
        Client::with_transport(transport, Url::parse("https://wticket.example.nl").unwrap())
    }

    #[tokio::test]
    async fn list_decodes_members_and_footer_total() {
        let transport = Arc::new(FakeTransport::new());
        transport.push(html_response(STAFF_LISTING));
        let client = client_with(transport.clone());

        let listing = client.staff().list().await.unwrap();
        assert_eq!(listing.total_tasks, 27);
        assert_eq!(listing.staff.len(), 2);
        assert_eq!(listing.staff[0].staff_code, "JDO");
        assert_eq!(listing.staff[0].tasks, Some(4));
        // Empty task cell is absent, not zero.
        assert_eq!(listing.staff[1].tasks, None);

        let requests = transport.requests();
        assert_eq!(
            requests[0].query,
            vec![("queryid".to_string(), "wf1medewerkers".to_string())]
        );
    }

    #[tokio::test]
    async fn listing_without_footer_total_is_a_protocol_error() {
        let transport = Arc::new(FakeTransport::new());
        transport.push(html_response("<tr></tr><tr></tr>"));
        let client = client_with(transport);

        let err = client.staff().list().await.unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[tokio::test]
    async fn ticket_listing_is_scoped_by_executor_link() {
        let transport = Arc::new(FakeTransport::new());
        transport.push(html_response(
            r#"
            <tr><td></td></tr>
            <tr><td></td></tr>
            <tr unid="9001"><td>x</td><td>20412</td><td>ACME</td><td>Pomp vervangen</td></tr>
            "#,
        ));
        let client = client_with(transport.clone());

        let tickets = client.staff().list_tickets(311).await.unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].number, 20412);

        let requests = transport.requests();
        assert!(requests[0].query.contains(&(
            "foreignUNIDName".to_string(),
            "_<arrayoverlaps>_uitvoerder_gc1mdw_unid".to_string()
        )));
        assert!(
            requests[0]
                .query
                .contains(&("foreignUNIDValue".to_string(), "311".to_string()))
        );
    }
}
