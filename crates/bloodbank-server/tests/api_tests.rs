//! HTTP tests driving the router in-process against a file-backed store.

use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use bloodbank_core::Database;
use bloodbank_server::{build_router, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

const FAR_FUTURE: &str = "2099-01-01T00:00:00Z";

struct TestApp {
    router: Router,
    _dir: TempDir,
}

impl TestApp {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bloodbank.db");
        Database::open(&path).unwrap();
        let router = build_router(AppState::new(path, Duration::from_secs(5)));
        Self { router, _dir: dir }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(raw) => {
                builder = builder.header("content-type", "application/json");
                Body::from(raw.to_string())
            }
            None => Body::empty(),
        };
        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(&body.to_string())).await
    }

    async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(&body.to_string())).await
    }

    async fn hospital(&self, name: &str, latitude: f64, longitude: f64) -> String {
        let (status, body) = self
            .post(
                "/api/v1/hospitals/create",
                json!({
                    "name": name,
                    "address": "1 Main Road",
                    "city": "Pune",
                    "state": "MH",
                    "contact": "020-555-0100",
                    "latitude": latitude,
                    "longitude": longitude,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_str().unwrap().to_string()
    }

    async fn batch(&self, hospital_id: &str, group: &str, quantity: i64, expiry: &str) -> String {
        let (status, body) = self
            .post(
                "/api/v1/inventory/create",
                json!({
                    "hospitalId": hospital_id,
                    "bloodGroup": group,
                    "quantity": quantity,
                    "expiryDate": expiry,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_str().unwrap().to_string()
    }

    async fn user(&self, body: Value) -> String {
        let (status, body) = self.post("/api/v1/users/create", body).await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_deduct_flow() {
    let app = TestApp::new();
    let h = app.hospital("General", 18.5, 73.8).await;
    let first = app.batch(&h, "A+", 5, "2098-01-01T00:00:00Z").await;
    app.batch(&h, "A+", 3, FAR_FUTURE).await;

    let (status, body) = app
        .post(
            "/api/v1/inventory/deduct",
            json!({ "hospitalId": h, "bloodGroup": "A+", "unitsRequired": 6 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["deducted"], 6);
    assert_eq!(body["remaining"], 2);
    assert_eq!(body["bloodGroup"], "A+");

    let (status, _) = app.get(&format!("/api/v1/inventory/{}", first)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .post(
            "/api/v1/inventory/deduct",
            json!({ "hospitalId": h, "bloodGroup": "A+", "unitsRequired": 100 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["available"], 2);
    assert_eq!(body["required"], 100);
}

#[tokio::test]
async fn test_deduct_rejects_bad_input() {
    let app = TestApp::new();
    let h = app.hospital("General", 18.5, 73.8).await;

    let (status, body) = app
        .send(Method::POST, "/api/v1/inventory/deduct", Some("{not json"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = app
        .post("/api/v1/inventory/deduct", json!({ "hospitalId": h, "bloodGroup": "A+" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/v1/inventory/deduct",
            json!({ "hospitalId": h, "bloodGroup": "A+", "unitsRequired": 0 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/v1/inventory/deduct",
            json!({ "hospitalId": h, "bloodGroup": "Q+", "unitsRequired": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_rejects_unknown_keys() {
    let app = TestApp::new();
    let h = app.hospital("General", 18.5, 73.8).await;

    let (status, _) = app
        .put(&format!("/api/v1/hospitals/update/{}", h), json!({ "isAdmin": true }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .put(&format!("/api/v1/hospitals/update/{}", h), json!({ "city": "Mumbai" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["city"], "Mumbai");
}

#[tokio::test]
async fn test_donation_create() {
    let app = TestApp::new();
    let h = app.hospital("General", 18.5, 73.8).await;
    let donor = app.user(json!({ "name": "Asha", "bloodGroup": "B+" })).await;

    let (status, body) = app
        .post(
            "/api/v1/donations/create",
            json!({
                "donorId": donor,
                "hospitalId": h,
                "date": "2026-10-10T09:00:00Z",
                "unitsDonated": 2,
                "bloodGroup": "B+",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["donorId"], donor.as_str());
    assert_eq!(body["merged"], false);
    assert!(body["batchId"].is_string());

    let (_, user) = app.get(&format!("/api/v1/users/id/{}", donor)).await;
    assert_eq!(user["isEligible"], false);

    // Neither hospital nor camp
    let (status, _) = app
        .post(
            "/api/v1/donations/create",
            json!({
                "donorId": donor,
                "date": "2026-10-10T09:00:00Z",
                "unitsDonated": 1,
                "bloodGroup": "B+",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown donor fails inside the transaction
    let (status, body) = app
        .post(
            "/api/v1/donations/create",
            json!({
                "donorId": "nobody",
                "hospitalId": h,
                "date": "2026-10-10T09:00:00Z",
                "unitsDonated": 1,
                "bloodGroup": "B+",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to record donation");

    let (_, donations) = app.get(&format!("/api/v1/donations/hospital/{}", h)).await;
    assert_eq!(donations.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_request_fulfilment() {
    let app = TestApp::new();
    let h = app.hospital("General", 18.5, 73.8).await;
    let patient = app
        .user(json!({ "name": "Ravi", "bloodGroup": "O-", "userType": "PATIENT" }))
        .await;

    let (status, request) = app
        .post(
            "/api/v1/requests/create",
            json!({ "receiverId": patient, "bloodGroup": "O-", "unitsRequired": 2 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", request);
    assert_eq!(request["status"], "PENDING");
    let id = request["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .post("/api/v1/requests/fulfill/missing", json!({ "hospitalId": h }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/v1/requests/fulfill/{}", id);
    let (status, body) = app.post(&uri, json!({ "hospitalId": h })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["available"], 0);

    app.batch(&h, "O-", 5, FAR_FUTURE).await;
    let (status, body) = app.post(&uri, json!({ "hospitalId": h })).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["request"]["status"], "FULFILLED");

    // Terminal requests stay terminal
    let (status, _) = app.post(&uri, json!({ "hospitalId": h })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app
        .put(&format!("/api/v1/requests/cancel/{}", id), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, summary) = app
        .get(&format!("/api/v1/inventory/hospital/{}/summary", h))
        .await;
    assert_eq!(summary[0]["available"], 3);
}

#[tokio::test]
async fn test_emergency_search() {
    let app = TestApp::new();
    let h = app.hospital("H", 18.5, 73.8).await;
    let j = app.hospital("J", 18.68, 73.8).await;
    let k = app.hospital("K", 18.545, 73.8).await;
    app.batch(&h, "B-", 3, FAR_FUTURE).await;
    app.batch(&j, "B-", 15, FAR_FUTURE).await;
    app.batch(&k, "B-", 2, FAR_FUTURE).await;

    let (status, body) = app
        .post(
            "/api/v1/hospitals/emergency/search",
            json!({ "hospitalId": h, "bloodGroup": "B-", "unitsRequired": 10 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["hasEnough"], false);
    assert_eq!(body["currentQuantity"], 3);
    assert_eq!(body["nearestHospital"]["id"], j.as_str());
    assert_eq!(body["nearestHospital"]["availableQuantity"], 15);
    assert_eq!(body["allAvailableHospitals"].as_array().unwrap().len(), 1);

    let (status, _) = app
        .post(
            "/api/v1/hospitals/emergency/search",
            json!({ "hospitalId": "missing", "bloodGroup": "B-", "unitsRequired": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_search_and_list() {
    let app = TestApp::new();
    let h = app.hospital("General", 18.5, 73.8).await;
    app.user(json!({
        "name": "Asha Patil",
        "bloodGroup": "A+",
        "email": "asha@example.com",
        "hospitalId": h,
    }))
    .await;
    app.user(json!({ "name": "Vikram", "bloodGroup": "O+" })).await;

    let (status, found) = app.get("/api/v1/users/search?name=asha").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["name"], "Asha Patil");

    let (_, all) = app.get("/api/v1/users/list").await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, scoped) = app.get(&format!("/api/v1/users/list?hospitalId={}", h)).await;
    assert_eq!(scoped.as_array().unwrap().len(), 1);

    let (_, staff) = app.get(&format!("/api/v1/hospitals/{}/users", h)).await;
    assert_eq!(staff.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_records_are_404() {
    let app = TestApp::new();
    for uri in [
        "/api/v1/hospitals/nope",
        "/api/v1/users/id/nope",
        "/api/v1/camps/nope",
        "/api/v1/donations/nope",
        "/api/v1/requests/nope",
        "/api/v1/inventory/nope",
    ] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert!(body["error"].is_string());
    }

    let (status, _) = app
        .send(Method::DELETE, "/api/v1/camps/delete/nope", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_camp_lifecycle() {
    let app = TestApp::new();
    let (status, camp) = app
        .post(
            "/api/v1/camps/create",
            json!({
                "name": "Riverside Drive",
                "location": "Riverside Hall",
                "startDate": "2026-11-01T09:00:00Z",
                "endDate": "2026-11-01T17:00:00Z",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", camp);
    let id = camp["id"].as_str().unwrap().to_string();

    let donor = app.user(json!({ "name": "Asha", "bloodGroup": "A+" })).await;
    let (status, receipt) = app
        .post(
            "/api/v1/donations/create",
            json!({
                "donorId": donor,
                "campId": id,
                "date": "2026-11-01T10:00:00Z",
                "unitsDonated": 1,
                "bloodGroup": "A+",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", receipt);
    assert!(receipt["batchId"].is_null());

    let (_, donations) = app.get(&format!("/api/v1/camps/{}/donations", id)).await;
    assert_eq!(donations.as_array().unwrap().len(), 1);

    // Still referenced by a donation
    let (status, _) = app
        .send(Method::DELETE, &format!("/api/v1/camps/delete/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, empty) = app
        .post(
            "/api/v1/camps/create",
            json!({
                "name": "Cancelled Drive",
                "location": "Town Hall",
                "startDate": "2026-12-01T09:00:00Z",
                "endDate": "2026-12-01T17:00:00Z",
            }),
        )
        .await;
    let (status, body) = app
        .send(
            Method::DELETE,
            &format!("/api/v1/camps/delete/{}", empty["id"].as_str().unwrap()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Camp deleted");
}
