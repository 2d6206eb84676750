//! Integration tests for token handling

use super::*;
use dhl_parcel_client::DhlError;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::header;

#[tokio::test]
async fn test_anonymous_client_never_authenticates() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/authenticate/api-key"))
        .respond_with(success_response(json!({"accessToken": "unused"})))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/labels/L1"))
        .respond_with(success_response(json!({"labelId": "L1"})))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = anonymous_client(&mock_server);
    client.find_label("L1").await.unwrap();
    client.find_label("L1").await.unwrap();

    assert_eq!(authorization_headers(&mock_server).await, vec![None, None]);
}

#[tokio::test]
async fn test_token_is_granted_once_and_reused() {
    let mock_server = setup_mock_server().await;

    grant_mock("jwt-1", 900)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/labels/L1"))
        .and(header("Authorization", "Bearer jwt-1"))
        .respond_with(success_response(json!({"labelId": "L1"})))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = authenticated_client(&mock_server);
    for _ in 0..3 {
        client.find_label("L1").await.unwrap();
    }
}

#[tokio::test]
async fn test_401_refreshes_token_and_retries_once() {
    let mock_server = setup_mock_server().await;

    grant_mock("jwt-1", 900)
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    grant_mock("jwt-2", 900)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/labels/L1"))
        .and(header("Authorization", "Bearer jwt-1"))
        .respond_with(error_response(401, "token revoked"))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/labels/L1"))
        .and(header("Authorization", "Bearer jwt-2"))
        .respond_with(success_response(json!({"labelId": "L1"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = authenticated_client(&mock_server);
    let label = client.find_label("L1").await.unwrap();

    assert_eq!(label, json!({"labelId": "L1"}));
    assert_eq!(
        authorization_headers(&mock_server).await,
        vec![
            Some("Bearer jwt-1".to_string()),
            Some("Bearer jwt-2".to_string())
        ]
    );
}

#[tokio::test]
async fn test_second_401_surfaces_as_api_error() {
    let mock_server = setup_mock_server().await;

    grant_mock("jwt-1", 900)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/labels/L1"))
        .respond_with(error_response(401, "unauthorized"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = authenticated_client(&mock_server);
    let error = client.find_label("L1").await.unwrap_err();

    assert!(matches!(error, DhlError::Api { .. }));
    assert_eq!(error.status(), Some(401));
}

#[tokio::test]
async fn test_concurrent_calls_after_expiry_share_one_grant() {
    let mock_server = setup_mock_server().await;

    // Shortest accepted lifetime: usable for one second after the grant.
    grant_mock("jwt-stale", 2)
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    grant_mock("jwt-fresh", 900)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/time-windows"))
        .respond_with(success_response(json!({"windows": []})))
        .mount(&mock_server)
        .await;

    let client = Arc::new(authenticated_client(&mock_server));
    client.time_windows("NL", "1234AB").await.unwrap();
    tokio::time::sleep(Duration::from_millis(1_200)).await;

    let (first, second) = tokio::join!(
        client.time_windows("NL", "1234AB"),
        client.time_windows("NL", "1234AB")
    );
    first.unwrap();
    second.unwrap();

    let headers = authorization_headers(&mock_server).await;
    assert_eq!(headers.len(), 3);
    assert_eq!(headers[0].as_deref(), Some("Bearer jwt-stale"));
    assert_eq!(headers[1].as_deref(), Some("Bearer jwt-fresh"));
    assert_eq!(headers[2].as_deref(), Some("Bearer jwt-fresh"));
}

#[tokio::test]
async fn test_grant_failure_is_authentication_error() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/authenticate/api-key"))
        .respond_with(error_response(401, "invalid key"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/labels/L1"))
        .respond_with(success_response(json!({})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = authenticated_client(&mock_server);
    let error = client.find_label("L1").await.unwrap_err();

    match error {
        DhlError::Authentication { status, body, .. } => {
            assert_eq!(status, Some(401));
            assert!(body.unwrap().contains("invalid key"));
        }
        other => panic!("Expected Authentication error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_grant_response_is_authentication_error() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/authenticate/api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let client = authenticated_client(&mock_server);
    let error = client.time_windows("NL", "1234AB").await.unwrap_err();

    assert!(matches!(error, DhlError::Authentication { .. }));
}

#[tokio::test]
async fn test_zero_lifetime_grant_still_authenticates_the_call() {
    let mock_server = setup_mock_server().await;

    grant_mock("jwt-1", 0)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/labels/L1"))
        .and(header("Authorization", "Bearer jwt-1"))
        .respond_with(success_response(json!({"labelId": "L1"})))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = authenticated_client(&mock_server);
    client.find_label("L1").await.unwrap();
    client.find_label("L1").await.unwrap();
}
