use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use bloodbank_core::models::{Camp, CampUpdate, DonationEvent, NewCamp};
use bloodbank_core::Directory;
use serde_json::Value;

use super::deleted;
use crate::error::{ApiJson, ApiResult};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/:id", get(get_one))
        .route("/:id/donations", get(donations))
        .route("/create", post(create))
        .route("/update/:id", put(update))
        .route("/delete/:id", delete(remove))
}

async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Camp>>> {
    let camps = state.with_db(|db| Directory::new(db).list_camps()).await?;
    Ok(Json(camps))
}

async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Camp>> {
    let camp = state.with_db(move |db| Directory::new(db).get_camp(&id)).await?;
    Ok(Json(camp))
}

async fn donations(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<DonationEvent>>> {
    let donations = state
        .with_db(move |db| Directory::new(db).camp_donations(&id))
        .await?;
    Ok(Json(donations))
}

async fn create(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<NewCamp>,
) -> ApiResult<(StatusCode, Json<Camp>)> {
    let camp = state
        .with_db(move |db| Directory::new(db).create_camp(form))
        .await?;
    Ok((StatusCode::CREATED, Json(camp)))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<CampUpdate>,
) -> ApiResult<Json<Camp>> {
    let camp = state
        .with_db(move |db| Directory::new(db).update_camp(&id, update))
        .await?;
    Ok(Json(camp))
}

async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    state
        .with_db(move |db| Directory::new(db).delete_camp(&id))
        .await?;
    Ok(Json(deleted("Camp")))
}
