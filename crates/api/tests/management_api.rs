//! HTTP-level tests for the lot-manager desk (`/management`).

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, get, new_location, post_json, put_json, store_with, test_state,
    FailingStore, SLOW_WRITE,
};
use parkspot_db::store::ParkingStore;
use serde_json::json;

// ---------------------------------------------------------------------------
// POST /management/locations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_location_starts_empty() {
    let (store, _) = store_with(&[]).await;
    let app = build_test_app(test_state(store));

    let response = post_json(
        app.clone(),
        "/api/v1/management/locations",
        json!({
            "name": "Koramangala Block 5",
            "address": "80 Feet Road, Bangalore",
            "total_spots": 120,
            "current_fee": 60.0
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["occupied_spots"], 0);
    assert_eq!(json["data"]["occupancy"]["level"], "low");

    let list = body_json(get(app, "/api/v1/locations").await).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn create_location_validates_fields() {
    let (store, _) = store_with(&[]).await;
    let app = build_test_app(test_state(store));

    for body in [
        json!({ "name": "AB", "address": "Long enough", "total_spots": 10, "current_fee": 1.0 }),
        json!({ "name": "Valid", "address": "Shrt", "total_spots": 10, "current_fee": 1.0 }),
        json!({ "name": "Valid", "address": "Long enough", "total_spots": 0, "current_fee": 1.0 }),
        json!({
            "name": "Valid",
            "address": "Long enough",
            "total_spots": 10,
            "current_fee": -1.0
        }),
        json!({
            "name": "Valid",
            "address": "Long enough",
            "total_spots": i32::MAX,
            "current_fee": 1.0
        }),
        json!({
            "name": "Valid",
            "address": "Long enough",
            "total_spots": 10,
            "current_fee": 1.0,
            "owner_id": "o".repeat(129)
        }),
    ] {
        let response = post_json(app.clone(), "/api/v1/management/locations", body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn largest_lot_gets_a_full_spot_map() {
    let (store, _) = store_with(&[]).await;
    let app = build_test_app(test_state(store));

    let response = post_json(
        app.clone(),
        "/api/v1/management/locations",
        json!({
            "name": "Stadium Parking",
            "address": "Gate 4, Stadium Road",
            "total_spots": 10_000,
            "current_fee": 30.0
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["data"]["id"].as_str().unwrap().to_string();

    let json = body_json(get(app, &format!("/api/v1/management/locations/{id}/spots")).await).await;
    assert_eq!(json["data"]["spots"].as_array().unwrap().len(), 10_000);
}

// ---------------------------------------------------------------------------
// PUT /management/locations/{id}/occupancy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn occupancy_edits_are_clamped() {
    let (store, locations) = store_with(&[new_location("Clamp Lot", 50, 10.0)]).await;
    let lot = locations[0].id;
    let app = build_test_app(test_state(store));
    let uri = format!("/api/v1/management/locations/{lot}/occupancy");

    let json = body_json(put_json(app.clone(), &uri, json!({ "occupied_spots": -5 })).await).await;
    assert_eq!(json["data"]["occupied_spots"], 0);

    let json = body_json(put_json(app.clone(), &uri, json!({ "occupied_spots": 150 })).await).await;
    assert_eq!(json["data"]["occupied_spots"], 50);
    assert_eq!(json["data"]["occupancy"]["level"], "high");

    let json = body_json(put_json(app, &uri, json!({ "occupied_spots": 40 })).await).await;
    assert_eq!(json["data"]["occupied_spots"], 40);
    assert_eq!(json["data"]["occupancy"]["percentage"], 80.0);
    assert_eq!(json["data"]["occupancy"]["level"], "moderate");
}

#[tokio::test]
async fn occupancy_edit_on_unknown_location_is_not_found() {
    let (store, _) = store_with(&[]).await;
    let app = build_test_app(test_state(store));

    let uri = format!("/api/v1/management/locations/{}/occupancy", uuid::Uuid::nil());
    let response = put_json(app, &uri, json!({ "occupied_spots": 1 })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// GET /management/locations/{id}/spots
// ---------------------------------------------------------------------------

#[tokio::test]
async fn spot_map_marks_the_first_spots_occupied() {
    let (store, locations) = store_with(&[new_location("Grid Lot", 6, 10.0)]).await;
    let lot = locations[0].id;
    store.set_occupancy(lot, 2).await.unwrap();
    let app = build_test_app(test_state(store));

    let uri = format!("/api/v1/management/locations/{lot}/spots");
    let json = body_json(get(app, &uri).await).await;
    let spots = json["data"]["spots"].as_array().unwrap();
    assert_eq!(spots.len(), 6);
    assert_eq!(spots[0], json!({ "number": 1, "occupied": true }));
    assert_eq!(spots[1]["occupied"], true);
    assert_eq!(spots[2]["occupied"], false);
    assert_eq!(json["data"]["occupancy"]["available_spots"], 4);
}

// ---------------------------------------------------------------------------
// POST /management/vehicles
// ---------------------------------------------------------------------------

#[tokio::test]
async fn check_in_charges_and_counts_the_vehicle() {
    let (store, locations) = store_with(&[new_location("Desk Lot", 10, 50.0)]).await;
    let lot = locations[0].id;
    let app = build_test_app(test_state(store));

    let response = post_json(
        app.clone(),
        "/api/v1/management/vehicles",
        json!({
            "location_id": lot,
            "vehicle_number": "TN 09 BZ 7777",
            "vehicle_type": "4w",
            "duration_hours": 3,
            "mobile_number": "9876543210"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["vehicle"]["charges_paid"], 150.0);
    assert_eq!(json["data"]["vehicle"]["location_name"], "Desk Lot");
    assert_eq!(json["data"]["occupancy"]["occupied_spots"], 1);

    let uri = format!("/api/v1/management/vehicles?location_id={lot}");
    let ledger = body_json(get(app, &uri).await).await;
    assert_eq!(ledger["data"].as_array().unwrap().len(), 1);
    assert_eq!(ledger["data"][0]["mobile_number"], "9876543210");
}

#[tokio::test]
async fn check_in_validates_input() {
    let (store, locations) = store_with(&[new_location("Strict Desk", 10, 50.0)]).await;
    let lot = locations[0].id;
    let app = build_test_app(test_state(store));

    for body in [
        json!({
            "location_id": lot,
            "vehicle_number": "AB",
            "vehicle_type": "4w",
            "duration_hours": 1
        }),
        json!({
            "location_id": lot,
            "vehicle_number": "ABC1",
            "vehicle_type": "4w",
            "duration_hours": 0
        }),
        json!({
            "location_id": lot,
            "vehicle_number": "ABC1",
            "vehicle_type": "4w",
            "duration_hours": 1,
            "mobile_number": "12345"
        }),
    ] {
        let response = post_json(app.clone(), "/api/v1/management/vehicles", body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let ledger = body_json(get(app, "/api/v1/management/vehicles").await).await;
    assert!(ledger["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn check_in_at_full_lot_keeps_occupancy_at_capacity() {
    let (store, locations) = store_with(&[new_location("Packed Lot", 2, 20.0)]).await;
    let lot = locations[0].id;
    store.set_occupancy(lot, 2).await.unwrap();
    let app = build_test_app(test_state(store));

    let response = post_json(
        app,
        "/api/v1/management/vehicles",
        json!({
            "location_id": lot,
            "vehicle_number": "XYZ9",
            "vehicle_type": "2w",
            "duration_hours": 2
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["occupancy"]["occupied_spots"], 2);
    assert_eq!(json["data"]["vehicle"]["charges_paid"], 40.0);
}

#[tokio::test]
async fn failed_ledger_write_undoes_the_occupancy_change() {
    let store =
        Arc::new(FailingStore::with_locations(&[new_location("Broken Desk", 10, 10.0)]).await);
    let lot = store.list_locations().await.unwrap()[0].id;
    FailingStore::set(&store.fail_append_vehicle, true);
    let app = build_test_app(test_state(store.clone()));

    let response = post_json(
        app,
        "/api/v1/management/vehicles",
        json!({
            "location_id": lot,
            "vehicle_number": "ABC1",
            "vehicle_type": "4w",
            "duration_hours": 1
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let location = store.find_location(lot).await.unwrap().unwrap();
    assert_eq!(location.occupied_spots, 0);
}

#[tokio::test(start_paused = true)]
async fn check_in_completes_after_the_request_times_out() {
    let store =
        Arc::new(FailingStore::with_locations(&[new_location("Slow Desk", 10, 10.0)]).await);
    let lot = store.list_locations().await.unwrap()[0].id;
    FailingStore::set(&store.slow_writes, true);
    let app = build_test_app(test_state(store.clone()));

    let response = post_json(
        app,
        "/api/v1/management/vehicles",
        json!({
            "location_id": lot,
            "vehicle_number": "LATE1",
            "vehicle_type": "4w",
            "duration_hours": 1
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

    tokio::time::sleep(SLOW_WRITE).await;
    let ledger = store.list_vehicles(Some(lot)).await.unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].vehicle_number, "LATE1");
    let location = store.find_location(lot).await.unwrap().unwrap();
    assert_eq!(location.occupied_spots, 1);
}
