use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use bloodbank_core::models::{BloodRequest, NewRequest};
use bloodbank_core::RequestFulfiller;
use serde::Deserialize;
use serde_json::{json, Value};

use super::deleted;
use crate::error::{ApiJson, ApiResult};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/:id", get(get_one))
        .route("/hospital/:hospital_id", get(for_hospital))
        .route("/create", post(create))
        .route("/fulfill/:id", post(fulfill))
        .route("/cancel/:id", put(cancel))
        .route("/delete/:id", delete(remove))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FulfillBody {
    hospital_id: String,
}

async fn fulfill(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<FulfillBody>,
) -> ApiResult<Json<Value>> {
    let request = state
        .with_db(move |db| RequestFulfiller::new(db).fulfill(&id, &body.hospital_id))
        .await?;
    Ok(Json(json!({
        "message": "Request fulfilled",
        "request": request,
    })))
}

async fn cancel(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let request = state
        .with_db(move |db| RequestFulfiller::new(db).cancel(&id))
        .await?;
    Ok(Json(json!({
        "message": "Request cancelled",
        "request": request,
    })))
}

async fn create(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<NewRequest>,
) -> ApiResult<(StatusCode, Json<BloodRequest>)> {
    let request = state
        .with_db(move |db| RequestFulfiller::new(db).create_request(form))
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<BloodRequest>>> {
    let requests = state
        .with_db(|db| RequestFulfiller::new(db).list_requests())
        .await?;
    Ok(Json(requests))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<BloodRequest>> {
    let request = state
        .with_db(move |db| RequestFulfiller::new(db).get_request(&id))
        .await?;
    Ok(Json(request))
}

async fn for_hospital(
    State(state): State<AppState>,
    Path(hospital_id): Path<String>,
) -> ApiResult<Json<Vec<BloodRequest>>> {
    let requests = state
        .with_db(move |db| RequestFulfiller::new(db).list_for_hospital(&hospital_id))
        .await?;
    Ok(Json(requests))
}

async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    state
        .with_db(move |db| RequestFulfiller::new(db).delete_request(&id))
        .await?;
    Ok(Json(deleted("Request")))
}
