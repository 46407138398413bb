// Integration tests for the form submission protocol and the action
// invoker against the fixture server.


use test_server::TestServer;
use wt::protocol::FormSubmission;
use wt::services::NewMessage;
use wt::{Client, Credentials, Error};

async fn logged_in_client(server: &TestServer) -> Client {
    let client = Client::new(&server.url()).expect("failed to build client");
    client
        .auth()
        .login(&Credentials::new("jdoe", "hunter2"))
        .await
        .expect("login failed");
    client
}

#[tokio::test]
async fn accepted_message_form_succeeds() {
    let server = TestServer::start().await;
    let client = logged_in_client(&server).await;

    client
        .tickets()
        .add_message(5512, &NewMessage::new().with_title("Update"))
        .await
        .expect("message should be accepted");
    server.shutdown();
}

#[tokio::test]
async fn rejected_form_carries_the_validation_message() {
    let server = TestServer::start().await;
    let client = logged_in_client(&server).await;

    let err = client
        .tickets()
        .add_message(5512, &NewMessage::new().with_body("fail"))
        .await
        .expect_err("message should be rejected");
    match err {
        Error::FormRejected(message) => assert_eq!(message, "Validation failed"),
        other => panic!("expected rejection, got {other:?}"),
    }
    server.shutdown();
}

#[tokio::test]
async fn unknown_form_id_is_unrecognized_not_rejected() {
    let server = TestServer::start().await;
    let client = logged_in_client(&server).await;

    let err = client
        .forms()
        .submit(&FormSubmission::new("nosuchform", 1))
        .await
        .expect_err("form should be unknown");
    assert!(matches!(err, Error::UnrecognizedForm));
    server.shutdown();
}

#[tokio::test]
async fn pin_action_round_trips_without_body() {
    let server = TestServer::start().await;
    let client = logged_in_client(&server).await;

    client.tickets().pin_message(7710).await.expect("pin failed");
    client.tickets().unpin_message(7710).await.expect("unpin failed");
    server.shutdown();
}
