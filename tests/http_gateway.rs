use std::net::TcpListener;
use std::time::Duration;

use fast2sms_relay::{
    ApiKey, GatewayClient, GatewayError, GuidanceCategory, RelayConfig, SendRequest, SmsRelay,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GatewayClient {
    GatewayClient::builder(ApiKey::new("live-key").unwrap())
        .endpoint(format!("{}/dev/bulkV2", server.uri()))
        .build()
        .unwrap()
}

#[tokio::test]
async fn posts_quick_route_json_with_authorization_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/dev/bulkV2"))
        .and(header("authorization", "live-key"))
        .and(body_json(json!({
            "route": "q",
            "message": "Invoice INV-1 paid",
            "language": "english",
            "flash": 0,
            "numbers": "919876543210"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "return": true,
            "request_id": "abc123",
            "message": ["SMS sent successfully."]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server)
        .send_request(&SendRequest::new("+91 98765-43210", "Invoice INV-1 paid"))
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.request_id.unwrap().as_str(), "abc123");
}

#[tokio::test]
async fn provider_rejection_is_classified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "return": false,
            "status_code": 996,
            "message": "You need to complete one transaction of 100 INR or more before using API route"
        })))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .send_request(&SendRequest::new("9876543210", "hello"))
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(
        result.category,
        Some(GuidanceCategory::AccountVerificationRequired)
    );
    assert!(result.message.contains("Account Verification Required"));
}

#[tokio::test]
async fn error_status_is_a_transport_error_with_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "return": false,
            "status_code": 412,
            "message": "Invalid Authentication, Check Authorization Key"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .send_request(&SendRequest::new("9876543210", "hello"))
        .await
        .unwrap_err();

    match &err {
        GatewayError::Transport {
            status: Some(401),
            payload: Some(payload),
            ..
        } => assert!(payload.contains("Invalid Authentication")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.http_status(), 401);
}

#[tokio::test]
async fn slow_provider_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"return": true}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = GatewayClient::builder(ApiKey::new("live-key").unwrap())
        .endpoint(format!("{}/dev/bulkV2", server.uri()))
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();

    let err = client
        .send_request(&SendRequest::new("9876543210", "hello"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, GatewayError::Timeout { after } if after == Duration::from_millis(100)),
        "{err:?}"
    );
    assert!(err.is_retryable());
}

#[tokio::test]
async fn closed_port_is_connection_refused() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let client = GatewayClient::builder(ApiKey::new("live-key").unwrap())
        .endpoint(format!("http://127.0.0.1:{port}/dev/bulkV2"))
        .build()
        .unwrap();

    let err = client
        .send_request(&SendRequest::new("9876543210", "hello"))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::ConnectionRefused(_)), "{err:?}");
}

#[tokio::test]
async fn unresolvable_host_is_host_not_found() {
    let client = GatewayClient::builder(ApiKey::new("live-key").unwrap())
        .endpoint("http://fast2sms-relay-test.invalid/dev/bulkV2")
        .build()
        .unwrap();

    let err = client
        .send_request(&SendRequest::new("9876543210", "hello"))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::HostNotFound(_)), "{err:?}");
    assert_eq!(err.to_string(), "SMS gateway URL not found");
}

#[tokio::test]
async fn relay_batch_runs_against_provider_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({
            "route": "q",
            "message": "second",
            "language": "english",
            "flash": 0,
            "numbers": "9876543211"
        })))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "return": true,
            "request_id": "ok"
        })))
        .mount(&server)
        .await;

    let mut config = RelayConfig::new(ApiKey::new("live-key").unwrap());
    config.endpoint = format!("{}/dev/bulkV2", server.uri());
    let relay = SmsRelay::new(&config).unwrap();

    let envelope = relay
        .send_batch(vec![
            SendRequest::new("9876543210", "first"),
            SendRequest::new("9876543211", "second"),
            SendRequest::new("9876543212", "third"),
        ])
        .await;

    assert!(envelope.success);
    let summary = envelope.summary.unwrap();
    assert_eq!(summary.success_count, 2);
    assert_eq!(summary.total_count, 3);
    assert!(summary.items[0].success);
    assert!(!summary.items[1].success);
    assert_eq!(summary.items[1].message, "SMS gateway returned HTTP 500");
    assert!(summary.items[2].success);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}
