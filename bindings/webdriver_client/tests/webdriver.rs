use std::time::Duration;

use serde_json::json;
use stampede_core::prelude::{BrowserDriver, BrowserSession, DriverError};
use webdriver_client::prelude::{Browser, WebDriverClient};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

fn client(server: &MockServer) -> WebDriverClient {
    WebDriverClient::new(&server.uri(), Browser::Chrome)
        .unwrap()
        .with_poll_interval(Duration::from_millis(10))
}

async fn mount_new_session(server: &MockServer, session_id: &str) {
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": { "sessionId": session_id, "capabilities": {} }
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn ready_when_server_reports_ready() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": { "ready": true, "message": "ChromeDriver ready for new sessions." }
        })))
        .mount(&server)
        .await;

    client(&server).ready().await.unwrap();
}

#[tokio::test]
async fn busy_server_is_not_ready() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": { "ready": false, "message": "session limit reached" }
        })))
        .mount(&server)
        .await;

    let err = client(&server).ready().await.unwrap_err();

    assert_eq!(
        DriverError::launch("WebDriver is not ready: session limit reached"),
        err
    );
}

#[tokio::test]
async fn unreachable_server_is_a_launch_failure() {
    let client = WebDriverClient::new("http://127.0.0.1:1", Browser::Firefox).unwrap();

    let err = client.ready().await.unwrap_err();

    assert!(matches!(err, DriverError::Launch { .. }));
}

#[tokio::test]
async fn session_runs_the_user_workflow() {
    let server = MockServer::start().await;
    mount_new_session(&server, "abc").await;

    Mock::given(method("POST"))
        .and(path("/session/abc/url"))
        .and(body_json(json!({ "url": "http://quiz.test/" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": null })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/session/abc/elements"))
        .and(body_json(json!({ "using": "css selector", "value": ".grid button" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [ { ELEMENT_KEY: "e1" }, { ELEMENT_KEY: "e2" } ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/session/abc/element/e2/click"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": null })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/session/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": null })))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = client(&server).launch_session().await.unwrap();
    assert_eq!("abc", session.session_id());

    session.navigate("http://quiz.test/").await.unwrap();
    let elements = session
        .wait_for_selector(".grid button", Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(
        vec!["e1", "e2"],
        elements.iter().map(|e| e.id()).collect::<Vec<_>>()
    );
    session.click(&elements[1]).await.unwrap();
    session.close().await.unwrap();
}

#[tokio::test]
async fn no_matches_time_out() {
    let server = MockServer::start().await;
    mount_new_session(&server, "abc").await;
    Mock::given(method("POST"))
        .and(path("/session/abc/elements"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
        .mount(&server)
        .await;

    let mut session = client(&server).launch_session().await.unwrap();
    let err = session
        .wait_for_selector(".text-3xl", Duration::from_millis(50))
        .await
        .unwrap_err();

    assert_eq!(
        DriverError::selector_timeout(".text-3xl", Duration::from_millis(50)),
        err
    );
}

#[tokio::test]
async fn protocol_error_on_navigate_is_a_navigation_failure() {
    let server = MockServer::start().await;
    mount_new_session(&server, "abc").await;
    Mock::given(method("POST"))
        .and(path("/session/abc/url"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "value": {
                "error": "invalid session id",
                "message": "session deleted",
                "stacktrace": ""
            }
        })))
        .mount(&server)
        .await;

    let mut session = client(&server).launch_session().await.unwrap();
    let err = session.navigate("http://quiz.test/").await.unwrap_err();

    match err {
        DriverError::Navigation { url, reason } => {
            assert_eq!("http://quiz.test/", url);
            assert_eq!("invalid session id (404): session deleted", reason);
        }
        other => panic!("expected a navigation error, got {other:?}"),
    }
}

#[tokio::test]
async fn session_creation_error_is_a_launch_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "value": {
                "error": "session not created",
                "message": "Chrome failed to start"
            }
        })))
        .mount(&server)
        .await;

    let err = client(&server).launch_session().await.unwrap_err();

    assert!(matches!(err, DriverError::Launch { .. }));
}

#[tokio::test]
async fn lost_session_fails_without_waiting_for_the_timeout() {
    let server = MockServer::start().await;
    mount_new_session(&server, "abc").await;
    Mock::given(method("POST"))
        .and(path("/session/abc/elements"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "value": {
                "error": "invalid session id",
                "message": "session deleted because of page crash",
                "stacktrace": ""
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = client(&server).launch_session().await.unwrap();
    let err = tokio::time::timeout(
        Duration::from_secs(5),
        session.wait_for_selector(".grid button", Duration::from_secs(30)),
    )
    .await
    .expect("a lost session should not be polled until the selector timeout")
    .unwrap_err();

    assert_eq!(
        DriverError::session_lost(
            "invalid session id (404): session deleted because of page crash"
        ),
        err
    );
}
