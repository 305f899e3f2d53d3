use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use bloodbank_core::models::{BloodGroup, Hospital, HospitalUpdate, NewHospital, User};
use bloodbank_core::{Directory, EmergencyLocator, EmergencySearchResult};
use serde::Deserialize;
use serde_json::Value;

use super::deleted;
use crate::error::{ApiJson, ApiResult};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/:id", get(get_one))
        .route("/:id/users", get(users))
        .route("/emergency/search", post(emergency_search))
        .route("/create", post(create))
        .route("/update/:id", put(update))
        .route("/delete/:id", delete(remove))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmergencySearchBody {
    hospital_id: String,
    blood_group: BloodGroup,
    units_required: i64,
}

async fn emergency_search(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<EmergencySearchBody>,
) -> ApiResult<Json<EmergencySearchResult>> {
    let result = state
        .with_db(move |db| {
            EmergencyLocator::new(db).locate(&body.hospital_id, body.blood_group, body.units_required)
        })
        .await?;
    Ok(Json(result))
}

async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Hospital>>> {
    let hospitals = state.with_db(|db| Directory::new(db).list_hospitals()).await?;
    Ok(Json(hospitals))
}

async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Hospital>> {
    let hospital = state
        .with_db(move |db| Directory::new(db).get_hospital(&id))
        .await?;
    Ok(Json(hospital))
}

async fn users(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Vec<User>>> {
    let users = state
        .with_db(move |db| Directory::new(db).hospital_users(&id))
        .await?;
    Ok(Json(users))
}

async fn create(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<NewHospital>,
) -> ApiResult<(StatusCode, Json<Hospital>)> {
    let hospital = state
        .with_db(move |db| Directory::new(db).register_hospital(form))
        .await?;
    Ok((StatusCode::CREATED, Json(hospital)))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<HospitalUpdate>,
) -> ApiResult<Json<Hospital>> {
    let hospital = state
        .with_db(move |db| Directory::new(db).update_hospital(&id, update))
        .await?;
    Ok(Json(hospital))
}

async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    state
        .with_db(move |db| Directory::new(db).delete_hospital(&id))
        .await?;
    Ok(Json(deleted("Hospital")))
}
