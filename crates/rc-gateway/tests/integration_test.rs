mod common;

use common::*;
use rc_core::domain::{
    GatewayError, RefereeToken, ReferenceBackend, RequestId, RequestStatus, TransportError,
};
use rc_gateway::http::HttpGateway;

// ---------------------------------------------------------------------------
// Happy-path round trips
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_validate_token_round_trip() {
    let server = MockGasServer::start(&[("validateRefereeToken", sample_portal_reply())]).await;
    let gateway = HttpGateway::new(&server.url(), 5_000).expect("build gateway");

    let view = gateway
        .validate_referee_token(&RefereeToken::new(TEST_TOKEN))
        .await
        .expect("token should validate");

    assert_eq!(view.request_id.as_str(), "req-001");
    assert_eq!(view.candidate_name, "Alex Mercer");
    assert_eq!(view.fields.len(), 2);
}

#[tokio::test]
async fn test_get_my_requests_round_trip() {
    let server = MockGasServer::start(&[("getMyRequests", sample_requests_reply())]).await;
    let gateway = HttpGateway::new(&server.url(), 5_000).expect("build gateway");

    let requests = gateway.get_my_requests().await.expect("list requests");

    assert_eq!(requests.len(), 1);
    // Mixed-casing statuses normalize on read.
    assert_eq!(
        requests[0].canonical_status(),
        Some(RequestStatus::Sealed)
    );
    assert!(requests[0].pdf_url.is_some());
}

#[tokio::test]
async fn test_ack_action_round_trip() {
    let server = MockGasServer::start(&[(
        "authorizeConsent",
        serde_json::json!({"success": true}),
    )])
    .await;
    let gateway = HttpGateway::new(&server.url(), 5_000).expect("build gateway");

    gateway
        .authorize_consent(&RefereeToken::new(TEST_TOKEN))
        .await
        .expect("consent should be acknowledged");
}

// ---------------------------------------------------------------------------
// Logical failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_rejection_surfaces_backend_message() {
    let server = MockGasServer::start(&[(
        "validateRefereeToken",
        serde_json::json!({"success": false, "error": "Token expired or already used"}),
    )])
    .await;
    let gateway = HttpGateway::new(&server.url(), 5_000).expect("build gateway");

    let err = gateway
        .validate_referee_token(&RefereeToken::new(TEST_TOKEN))
        .await
        .unwrap_err();

    assert!(err.is_rejection());
    assert_eq!(err.to_string(), "Token expired or already used");
}

#[tokio::test]
async fn test_action_name_reaches_the_wire() {
    // The server rejects unknown actions with the name it saw, so the
    // rejection message proves which name the gateway emitted.
    let server = MockGasServer::start(&[]).await;
    let gateway = HttpGateway::new(&server.url(), 5_000).expect("build gateway");

    let err = gateway
        .seal_request(&RequestId::new("req-001"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Unknown action: sealRequest");
}

// ---------------------------------------------------------------------------
// Transport failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_http_error_status_is_transport_error() {
    let server = MockGasServer::start_raw(502, "upstream unavailable").await;
    let gateway = HttpGateway::new(&server.url(), 5_000).expect("build gateway");

    let err = gateway.get_my_requests().await.unwrap_err();
    match err {
        GatewayError::Transport(TransportError::HttpStatus { status, body }) => {
            assert_eq!(status, 502);
            assert_eq!(body, "upstream unavailable");
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_body_is_transport_error() {
    let server = MockGasServer::start_raw(200, "<html>Deployment not found</html>").await;
    let gateway = HttpGateway::new(&server.url(), 5_000).expect("build gateway");

    let err = gateway.get_my_requests().await.unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Transport(TransportError::InvalidJson(_))
    ));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Nothing listens on this port.
    let gateway = HttpGateway::new("http://127.0.0.1:1", 2_000).expect("build gateway");

    let err = gateway.get_my_requests().await.unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)));
}
