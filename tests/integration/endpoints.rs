//! Integration tests for the endpoint wire format

use super::*;
use pretty_assertions::assert_eq;
use wiremock::matchers::{header, query_param};

#[tokio::test]
async fn test_time_windows() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/time-windows"))
        .and(query_param("countryCode", "NL"))
        .and(query_param("postalCode", "1234AB"))
        .and(header("Accept", "application/json"))
        .respond_with(success_response(json!({"windows": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = anonymous_client(&mock_server);
    let windows = client.time_windows("NL", "1234AB").await.unwrap();

    assert_eq!(windows, json!({"windows": []}));

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(
        requests[0].url.query(),
        Some("countryCode=NL&postalCode=1234AB")
    );
}

#[tokio::test]
async fn test_find_parcel_shop_locations() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/parcel-shop-locations/nl"))
        .and(query_param("limit", "10"))
        .and(query_param("zipCode", "1234AB"))
        .respond_with(success_response(json!([{"id": "8004-NL-272403"}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = anonymous_client(&mock_server);
    let shops = client
        .find_parcel_shop_locations("1234AB", "NL")
        .await
        .unwrap();

    assert_eq!(shops, json!([{"id": "8004-NL-272403"}]));

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("limit=10&zipCode=1234AB"));
}

#[tokio::test]
async fn test_create_pickup_request_sends_body() {
    let mock_server = setup_mock_server().await;
    let pickup = json!({
        "pickupDate": "2026-10-20",
        "numberOfPackages": 2,
        "shipper": {"postalCode": "1234AB"}
    });

    Mock::given(method("POST"))
        .and(path("/pickup-requests"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(pickup.clone()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "P-1"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = anonymous_client(&mock_server);
    let created = client.create_pickup_request(&pickup).await.unwrap();

    assert_eq!(created, json!({"id": "P-1"}));
}

#[tokio::test]
async fn test_create_label_returns_parcel() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/labels"))
        .respond_with(success_response(json!({
            "labelId": "a8f4c1b0",
            "labelType": "PDF",
            "trackerCode": "3SDEVC1234567",
            "pieceNumber": 1,
            "pdf": "JVBERi0="
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = anonymous_client(&mock_server);
    let parcel = client
        .create_label(&json!({"orderReference": "order-42"}))
        .await
        .unwrap();

    assert_eq!(parcel.label_id.as_deref(), Some("a8f4c1b0"));
    assert_eq!(parcel.tracker_code.as_deref(), Some("3SDEVC1234567"));
    assert_eq!(parcel.pdf_bytes().unwrap(), Some(b"%PDF-".to_vec()));
}

#[tokio::test]
async fn test_track_and_trace() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/track-trace"))
        .and(query_param("key", "3SABC,3SDEF"))
        .respond_with(success_response(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = anonymous_client(&mock_server);
    client.track_and_trace(&["3SABC", "3SDEF"]).await.unwrap();
}

#[tokio::test]
async fn test_find_parcel_shop() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/parcel-shop-locations/be/8004-BE-1"))
        .respond_with(success_response(json!({"id": "8004-BE-1"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = anonymous_client(&mock_server);
    let shop = client.find_parcel_shop("BE", "8004-BE-1").await.unwrap();

    assert_eq!(shop["id"], "8004-BE-1");
}

#[tokio::test]
async fn test_pieces() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/pieces/JVGL0001/pod"))
        .and(query_param("receiver.address.postalCode", "1234AB"))
        .respond_with(success_response(json!({"signature": "J. Jansen"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = anonymous_client(&mock_server);
    let pod = client.pieces("JVGL0001", "1234AB").await.unwrap();

    assert_eq!(pod["signature"], "J. Jansen");
}
