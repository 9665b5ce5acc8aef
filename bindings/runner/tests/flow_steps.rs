use std::sync::Arc;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use feedpulse_probe_runner::prelude::{steps, FeedPulseClient, FetchFeedbacksRequest};
use flow_probe_instruments::{ReportConfig, Reporter};

async fn client_for(server: &MockServer) -> (FeedPulseClient, Arc<Reporter>) {
    let reporter = Arc::new(ReportConfig::default().init());
    let client = FeedPulseClient::new(
        Url::parse(&server.uri()).unwrap(),
        reporter.clone(),
    )
    .unwrap();
    (client, reporter)
}

#[tokio::test]
async fn login_returns_token_when_all_checks_pass() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"login": "ftecher3", "password": "12345678"})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("authorization", "token123")
                .set_body_json(json!({"message": "ok"})),
        )
        .mount(&server)
        .await;

    let (client, reporter) = client_for(&server).await;
    let token = steps::login(&client, 1000).await.unwrap();

    assert_eq!(Some("token123".to_string()), token);

    let stats = reporter.finalize();
    assert_eq!(1, stats.checks["login status is 200"].passes);
    assert_eq!(1, stats.checks["has authorization header"].passes);
    assert_eq!(1, stats.operations["login"].count);
    assert_eq!(0, stats.operations["login"].error_count);
}

#[tokio::test]
async fn login_returns_no_token_on_bad_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "nope"})))
        .mount(&server)
        .await;

    let (client, reporter) = client_for(&server).await;
    let token = steps::login(&client, 1000).await.unwrap();

    assert_eq!(None, token);

    // A 401 is a failed request even though it is a well-formed response.
    let stats = reporter.finalize();
    assert_eq!(1, stats.checks["login status is 200"].fails);
    assert_eq!(1, stats.operations["login"].error_count);
}

#[tokio::test]
async fn login_returns_no_token_when_header_is_missing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .mount(&server)
        .await;

    let (client, reporter) = client_for(&server).await;
    let token = steps::login(&client, 1000).await.unwrap();

    assert_eq!(None, token);
    let stats = reporter.finalize();
    assert_eq!(1, stats.checks["has authorization header"].fails);
}

#[tokio::test]
async fn acquire_token_skips_checks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("authorization", "token123"),
        )
        .mount(&server)
        .await;

    let (client, reporter) = client_for(&server).await;
    let token = steps::acquire_token(&client).await.unwrap();

    assert_eq!(Some("token123".to_string()), token);
    let stats = reporter.finalize();
    assert!(stats.checks.is_empty());
    assert_eq!(1, stats.operations["login"].count);
}

#[tokio::test]
async fn user_info_verifies_body_when_asked() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/user"))
        .and(header("authorization", "token123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": 42}})))
        .mount(&server)
        .await;

    let (client, _reporter) = client_for(&server).await;
    assert!(steps::user_info(&client, "token123", 1000, true).await.unwrap());
}

#[tokio::test]
async fn user_info_fails_closed_on_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/user"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let (client, reporter) = client_for(&server).await;
    assert!(!steps::user_info(&client, "token123", 1000, true).await.unwrap());

    let stats = reporter.finalize();
    assert_eq!(1, stats.checks["response contains user data"].fails);
    // Status and latency were still fine.
    assert_eq!(1, stats.checks["user info status is 200"].passes);
}

#[tokio::test]
async fn register_accepts_existing_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "already exists"})),
        )
        .mount(&server)
        .await;

    let (client, _reporter) = client_for(&server).await;
    let request = feedpulse_probe_runner::prelude::RegisterRequest {
        username: "testuser1".to_string(),
        email: "test1@example.com".to_string(),
        password: "testpassword123".to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
    };

    assert!(steps::register(&client, &request, 1000).await.unwrap());
}

#[tokio::test]
async fn fetch_feedbacks_posts_the_page_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/feedbacks/fetch"))
        .and(body_json(json!({"limit": 10, "offset": 0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let (client, _reporter) = client_for(&server).await;
    let request = FetchFeedbacksRequest {
        limit: 10,
        offset: 0,
    };

    assert!(
        steps::fetch_feedbacks(&client, "token123", &request, 1000, true)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn board_metrics_accepts_any_nonempty_data_object() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/board/metrics"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"customField": 1}})),
        )
        .mount(&server)
        .await;

    let (client, _reporter) = client_for(&server).await;
    assert!(steps::board_metrics(&client, "token123", 1000, true).await.unwrap());
}

#[tokio::test]
async fn upload_feedbacks_sends_a_json_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/feedbacks/upload"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"message": "stored"})))
        .mount(&server)
        .await;

    let (client, _reporter) = client_for(&server).await;
    let items = vec![feedpulse_probe_runner::prelude::FeedbackItem {
        id: "fb_001".to_string(),
        date: "2025-04-14T10:30:00Z".to_string(),
        channel: "twitter".to_string(),
        text: "Le support client a été très réactif et efficace.".to_string(),
    }];

    assert!(steps::upload_feedbacks(&client, "token123", &items).await.unwrap());
}

#[tokio::test]
async fn transport_errors_are_recorded_and_propagated() {
    // A server that is immediately dropped leaves nothing listening on the port.
    // A pooled server (`MockServer::start`) would keep listening after drop, so
    // build a dedicated one whose listener actually closes.
    let server = MockServer::builder().start().await;
    let uri = server.uri();
    drop(server);

    let reporter = Arc::new(ReportConfig::default().init());
    let client = FeedPulseClient::new(Url::parse(&uri).unwrap(), reporter.clone()).unwrap();

    let result = steps::ping(&client, 500).await;
    assert!(result.is_err());

    let stats = reporter.finalize();
    assert_eq!(1, stats.operations["ping"].error_count);
}
