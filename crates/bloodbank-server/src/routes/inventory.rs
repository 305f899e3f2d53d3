use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use bloodbank_core::models::{BatchUpdate, BloodGroup, InventoryBatch, LowStockAlert, NewBatch, StockLevel};
use bloodbank_core::InventoryLedger;
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
        .route("/hospital/:hospital_id/summary", get(summary))
        .route("/low-stock/:hospital_id", get(low_stock))
        .route("/deduct", post(deduct))
        .route("/create", post(create))
        .route("/update/:id", put(update))
        .route("/delete/:id", delete(remove))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeductBody {
    hospital_id: String,
    blood_group: BloodGroup,
    units_required: i64,
}

async fn deduct(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<DeductBody>,
) -> ApiResult<Json<Value>> {
    let deduction = state
        .with_db(move |db| {
            InventoryLedger::new(db).deduct(&body.hospital_id, body.blood_group, body.units_required)
        })
        .await?;

    Ok(Json(json!({
        "message": format!("Deducted {} units of {}", deduction.deducted, deduction.blood_group),
        "deducted": deduction.deducted,
        "remaining": deduction.remaining,
        "bloodGroup": deduction.blood_group,
    })))
}

async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<InventoryBatch>>> {
    let batches = state.with_db(|db| InventoryLedger::new(db).list_batches()).await?;
    Ok(Json(batches))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<InventoryBatch>> {
    let batch = state
        .with_db(move |db| InventoryLedger::new(db).get_batch(&id))
        .await?;
    Ok(Json(batch))
}

async fn for_hospital(
    State(state): State<AppState>,
    Path(hospital_id): Path<String>,
) -> ApiResult<Json<Vec<InventoryBatch>>> {
    let batches = state
        .with_db(move |db| InventoryLedger::new(db).list_for_hospital(&hospital_id))
        .await?;
    Ok(Json(batches))
}

async fn summary(
    State(state): State<AppState>,
    Path(hospital_id): Path<String>,
) -> ApiResult<Json<Vec<StockLevel>>> {
    let levels = state
        .with_db(move |db| InventoryLedger::new(db).stock_summary(&hospital_id))
        .await?;
    Ok(Json(levels))
}

async fn low_stock(
    State(state): State<AppState>,
    Path(hospital_id): Path<String>,
) -> ApiResult<Json<Vec<LowStockAlert>>> {
    let alerts = state
        .with_db(move |db| InventoryLedger::new(db).low_stock(&hospital_id))
        .await?;
    Ok(Json(alerts))
}

async fn create(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<NewBatch>,
) -> ApiResult<(StatusCode, Json<InventoryBatch>)> {
    let batch = state
        .with_db(move |db| InventoryLedger::new(db).create_batch(form))
        .await?;
    Ok((StatusCode::CREATED, Json(batch)))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<BatchUpdate>,
) -> ApiResult<Json<InventoryBatch>> {
    let batch = state
        .with_db(move |db| InventoryLedger::new(db).update_batch(&id, update))
        .await?;
    Ok(Json(batch))
}

async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    state
        .with_db(move |db| InventoryLedger::new(db).delete_batch(&id))
        .await?;
    Ok(Json(deleted("Inventory batch")))
}
