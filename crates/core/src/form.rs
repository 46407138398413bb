//! Form submission and action invocation over the shared servlet.
//!
//! Writes go through one endpoint for every business form; the XML
//! envelope and the response normalization live in `wt-protocol`. This
//! module only moves bytes and maps the normalized outcome onto the error
//! taxonomy.

use tracing::debug;

use wt_protocol::{FormOutcome, FormSubmission, parse_form_response};

use crate::client::Client;
use crate::error::{Error, Result};
use crate::transport::Body;

/// The shared submission endpoint.
pub const IOSERVLET_PATH: &str = "/IOServlet";

pub struct FormChannel<'a> {
    client: &'a Client,
}

impl<'a> FormChannel<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Submits a form envelope and normalizes the answer.
    pub async fn submit(&self, submission: &FormSubmission) -> Result<()> {
        debug!(
            target: "wt.form",
            form_id = %submission.form_id,
            action = submission.action,
            fields = submission.fields.len(),
            "submitting form"
        );
        let response = self
            .client
            .post(IOSERVLET_PATH, &[], Some(Body::Xml(submission.to_xml())))
            .await?;
        match parse_form_response(&response.body)? {
            FormOutcome::Success => Ok(()),
            FormOutcome::Rejected(message) => Err(Error::FormRejected(message)),
            FormOutcome::Unrecognized => Err(Error::UnrecognizedForm),
        }
    }

    /// Fires a single-effect command: a bodyless POST with the parameters
    /// in the query string. Success is the absence of a transport error;
    /// the response body is not interpreted.
    pub async fn execute_action(&self, params: &[(&str, &str)]) -> Result<()> {
        let query: Vec<(String, String)> = params
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        debug!(target: "wt.form", params = query.len(), "executing action");
        self.client.post(IOSERVLET_PATH, &query, None).await?;
        Ok(())
    }
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

    fn message_form() -> FormSubmission {
        FormSubmission::new("wf1procesinsmsgadd", 15)
            .field("messageType", "I")
            .field("actnr_wf1act_unid", "5512")
    }

    #[tokio::test]
    async fn accepted_form_posts_xml_and_succeeds() {
        let transport = Arc::new(FakeTransport::new());
        transport.push(html_response("<message><error></error></message>"));
        let client = client_with(transport.clone());

        client.forms().submit(&message_form()).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].path, IOSERVLET_PATH);
        match &requests[0].body {
            Some(RecordedBody::Xml(xml)) => {
                assert!(xml.starts_with("<form id=\"wf1procesinsmsgadd\" action=\"15\">"));
            }
            other => panic!("expected xml body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejected_form_carries_the_server_message_verbatim() {
        let transport = Arc::new(FakeTransport::new());
        transport.push(html_response(
            "<message><error>Validation failed</error></message>",
        ));
        let client = client_with(transport);

        let err = client.forms().submit(&message_form()).await.unwrap_err();
        match err {
            Error::FormRejected(message) => assert_eq!(message, "Validation failed"),
            other => panic!("expected form rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_ioservletresponse_error_is_unrecognized_form() {
        let transport = Arc::new(FakeTransport::new());
        transport.push(html_response(
            "<ioservletresponse><error></error></ioservletresponse>",
        ));
        let client = client_with(transport);

        let err = client.forms().submit(&message_form()).await.unwrap_err();
        assert!(matches!(err, Error::UnrecognizedForm));
    }

    #[tokio::test]
    async fn action_posts_params_in_query_string_with_no_body() {
        let transport = Arc::new(FakeTransport::new());
        transport.push(html_response(""));
        let client = client_with(transport.clone());

        client
            .forms()
            .execute_action(&[
                ("action", "101"),
                ("name", "wf1procesinsmsg"),
                ("uniqueid", "7710"),
            ])
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].path, IOSERVLET_PATH);
        assert!(requests[0].body.is_none());
        assert_eq!(
            requests[0].query,
            vec![
                ("action".to_string(), "101".to_string()),
                ("name".to_string(), "wf1procesinsmsg".to_string()),
                ("uniqueid".to_string(), "7710".to_string()),
            ]
        );
    }
}
