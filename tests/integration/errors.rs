//! Integration tests for status classification and decoding

use super::*;
use dhl_parcel_client::DhlError;
use std::time::Duration;
use test_case::test_case;

#[test_case(302)]
#[test_case(400)]
#[test_case(403)]
#[test_case(404)]
#[test_case(500)]
#[test_case(502)]
#[tokio::test]
async fn test_non_success_status_is_api_error(status: u16) {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/labels/L1"))
        .respond_with(error_response(status, "upstream says no").insert_header("Location", "/labels/L2"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = anonymous_client(&mock_server);
    let error = client.find_label("L1").await.unwrap_err();

    assert!(error.is_api_error());
    assert_eq!(error.status(), Some(status));
    assert!(error.body().unwrap().contains("upstream says no"));
    assert!(error
        .to_string()
        .starts_with("Could not retrieve label information"));
}

#[tokio::test]
async fn test_json_object_round_trip() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/labels/L1"))
        .respond_with(success_response(json!({"a": 1})))
        .mount(&mock_server)
        .await;

    let client = anonymous_client(&mock_server);
    let value = client.find_label("L1").await.unwrap();

    assert_eq!(value, json!({"a": 1}));
}

#[tokio::test]
async fn test_empty_success_body_is_null() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/pickup-requests"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = anonymous_client(&mock_server);
    let value = client.create_pickup_request(&json!({})).await.unwrap();

    assert_eq!(value, serde_json::Value::Null);
}

#[tokio::test]
async fn test_malformed_success_body_is_decode_error() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/labels/L1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"a\":"))
        .mount(&mock_server)
        .await;

    let client = anonymous_client(&mock_server);
    let error = client.find_label("L1").await.unwrap_err();

    match error {
        DhlError::Decode { operation, body, .. } => {
            assert_eq!(operation, "findLabel");
            assert_eq!(body, "{\"a\":");
        }
        other => panic!("Expected Decode error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_slow_response_is_timeout() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/labels/L1"))
        .respond_with(success_response(json!({})).set_delay(Duration::from_millis(500)))
        .mount(&mock_server)
        .await;

    let client = DhlClient::builder()
        .base_url(mock_server.uri())
        .timeout_millis(50)
        .build()
        .unwrap();
    let error = client.find_label("L1").await.unwrap_err();

    assert!(error.is_timeout(), "expected timeout, got {:?}", error);
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let client = DhlClient::builder()
        .base_url("http://127.0.0.1:1")
        .build()
        .unwrap();

    let error = client.find_label("L1").await.unwrap_err();

    assert!(matches!(error, DhlError::Transport { .. }));
}
