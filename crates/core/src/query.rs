//! Tabular query engine.
//!
//! Runs a [`QuerySpec`] against the generic table endpoint and decodes the
//! answer into rows, applying the structural-row and placeholder-row
//! exclusion rules in one place. Per-entity decoding is delegated to a
//! closure over the raw row; one bad row fails the whole call rather than
//! silently dropping data.

use tracing::debug;

use wt_protocol::QuerySpec;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::table::{self, DecodeResult, RawRow};

/// The generic table endpoint every predefined query is served from.
pub const QUERY_PATH: &str = "/jsp/atsc/UITableIFrame.jsp";

pub struct QueryEngine<'a> {
    client: &'a Client,
}

impl<'a> QueryEngine<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Raw HTML answer of a table query. Consumers that need more than
    /// the rows (footer aggregates) start here.
    pub async fn document(&self, spec: &QuerySpec) -> Result<String> {
        debug!(
            target: "wt.query",
            query_id = %spec.query_id,
            filters = spec.filters.len(),
            "running table query"
        );
        let response = self.client.get(QUERY_PATH, &spec.to_params()).await?;
        Ok(response.body)
    }

    /// All `tr` rows of the answer, in server order, before exclusions.
    pub async fn rows(&self, spec: &QuerySpec) -> Result<Vec<RawRow>> {
        Ok(table::parse_rows(&self.document(spec).await?))
    }

    /// Full listing: structural rows skipped, placeholders dropped, every
    /// remaining row decoded.
    pub async fn list<T, F>(&self, spec: &QuerySpec, decode: F) -> Result<Vec<T>>
    where
        F: Fn(&RawRow) -> DecodeResult<T>,
    {
        let rows = self.rows(spec).await?;
        Self::decode_listing(&rows, decode)
    }

    /// Decodes a listing view over already-fetched rows. A decode failure
    /// fails the whole listing, tagged with the offending row's unid.
    pub fn decode_listing<T, F>(rows: &[RawRow], decode: F) -> Result<Vec<T>>
    where
        F: Fn(&RawRow) -> DecodeResult<T>,
    {
        table::data_rows(rows)
            .map(|row| decode(row).map_err(|e| Error::decode(row, e)))
            .collect()
    }

    /// Single-entity lookup: placeholders dropped, first remaining row
    /// decoded. Zero rows is [`Error::NotFound`], not an empty success.
    pub async fn get<T, F>(&self, spec: &QuerySpec, decode: F) -> Result<T>
    where
        F: Fn(&RawRow) -> DecodeResult<T>,
    {
        let rows = self.rows(spec).await?;
        let row = table::first_match(&rows).ok_or(Error::NotFound)?;
        decode(row).map_err(|e| Error::decode(row, e))
    }

    /// Fetches an arbitrary consumer page (entity forms) with the current
    /// session.
    pub async fn page(&self, path: &str, params: &[(String, String)]) -> Result<String> {
        let response = self.client.get(path, params).await?;
        Ok(response.body)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use url::Url;

    use super::*;
    use crate::testing::{FakeTransport, html_response};

    fn client_with_body(body: &str) -> Client {
        let transport = FakeTransport::new();
        transport.push(html_response(body));
        Client::with_transport(
            Arc::new(transport),
            Url::parse("https://wticket.example.nl").unwrap(),
        )
    }

    const LISTING: &str = r#"
        <tr><td>Code</td><td>Naam</td></tr>
        <tr><td></td><td></td></tr>
        <tr unid="311"><td>JDO</td><td>J. Doe</td></tr>
        <tr unid="312" empty="true"><td>Geen resultaten</td><td></td></tr>
        <tr unid="313"><td>AVR</td><td>A. de Vries</td></tr>
    "#;

    #[tokio::test]
    async fn list_applies_both_exclusion_rules() {
        let client = client_with_body(LISTING);
        let names = client
            .queries()
            .list(&QuerySpec::new("wf1medewerkers"), |row| {
                row.cell(1)?.required_text()
            })
            .await
            .unwrap();
        assert_eq!(names, vec!["J. Doe".to_string(), "A. de Vries".to_string()]);
    }

    #[tokio::test]
    async fn one_bad_row_fails_the_whole_listing() {
        let client = client_with_body(LISTING);
        let err = client
            .queries()
            .list(&QuerySpec::new("wf1medewerkers"), |row| {
                row.cell(0)?.required_integer()
            })
            .await
            .unwrap_err();
        match err {
            Error::Decode { unid, .. } => assert_eq!(unid, "311"),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn get_excludes_placeholders_and_reports_not_found() {
        let client = client_with_body(r#"<tr empty="true"><td>Geen resultaten</td></tr>"#);
        let err = client
            .queries()
            .get(&QuerySpec::new("wf1act"), |row| row.unid())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound));
    }

    #[tokio::test]
    async fn get_takes_first_real_row() {
        let body = r#"
            <tr empty="true"><td></td></tr>
            <tr unid="42"><td>x</td></tr>
            <tr unid="43"><td>y</td></tr>
        "#;
        let client = client_with_body(body);
        let unid = client
            .queries()
            .get(&QuerySpec::new("wf1act"), |row| row.unid())
            .await
            .unwrap();
        assert_eq!(unid, 42);
    }

    #[tokio::test]
    async fn query_request_carries_spec_params_and_session() {
        let transport = FakeTransport::new();
        transport.push(html_response("<tr></tr>"));
        let transport = Arc::new(transport);
        let client = Client::with_transport(
            transport.clone(),
            Url::parse("https://wticket.example.nl").unwrap(),
        );
        client.adopt_set_cookie("JSESSIONID=TOK1");

        let spec = QuerySpec::new("wf1act").filter(2, wt_protocol::FilterOp::Exact, "20412");
        client.queries().rows(&spec).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, QUERY_PATH);
        assert_eq!(requests[0].cookie.as_deref(), Some("JSESSIONID=TOK1"));
        assert!(
            requests[0]
                .query
                .contains(&("key".to_string(), "_<exact>_20412".to_string()))
        );
    }
}
