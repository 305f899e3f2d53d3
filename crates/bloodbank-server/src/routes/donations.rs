use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use bloodbank_core::models::{DonationEvent, DonationUpdate, NewDonation};
use bloodbank_core::{DonationReceipt, DonationReconciler};
use serde_json::Value;

use super::deleted;
use crate::error::{ApiJson, ApiResult};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/:id", get(get_one))
        .route("/donor/:donor_id", get(for_donor))
        .route("/hospital/:hospital_id", get(for_hospital))
        .route("/camp/:camp_id", get(for_camp))
        .route("/create", post(create))
        .route("/update/:id", put(update))
        .route("/delete/:id", delete(remove))
}

async fn create(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<NewDonation>,
) -> ApiResult<(StatusCode, Json<DonationReceipt>)> {
    let receipt = state
        .with_db(move |db| DonationReconciler::new(db).record_donation(form))
        .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<DonationEvent>>> {
    let donations = state
        .with_db(|db| DonationReconciler::new(db).list_donations())
        .await?;
    Ok(Json(donations))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DonationEvent>> {
    let donation = state
        .with_db(move |db| DonationReconciler::new(db).get_donation(&id))
        .await?;
    Ok(Json(donation))
}

async fn for_donor(
    State(state): State<AppState>,
    Path(donor_id): Path<String>,
) -> ApiResult<Json<Vec<DonationEvent>>> {
    let donations = state
        .with_db(move |db| DonationReconciler::new(db).list_for_donor(&donor_id))
        .await?;
    Ok(Json(donations))
}

async fn for_hospital(
    State(state): State<AppState>,
    Path(hospital_id): Path<String>,
) -> ApiResult<Json<Vec<DonationEvent>>> {
    let donations = state
        .with_db(move |db| DonationReconciler::new(db).list_for_hospital(&hospital_id))
        .await?;
    Ok(Json(donations))
}

async fn for_camp(
    State(state): State<AppState>,
    Path(camp_id): Path<String>,
) -> ApiResult<Json<Vec<DonationEvent>>> {
    let donations = state
        .with_db(move |db| DonationReconciler::new(db).list_for_camp(&camp_id))
        .await?;
    Ok(Json(donations))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<DonationUpdate>,
) -> ApiResult<Json<DonationEvent>> {
    let donation = state
        .with_db(move |db| DonationReconciler::new(db).update_donation(&id, update))
        .await?;
    Ok(Json(donation))
}

async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    state
        .with_db(move |db| DonationReconciler::new(db).delete_donation(&id))
        .await?;
    Ok(Json(deleted("Donation")))
}
