//! HTTP front end for the blood bank core.
//!
//! Every request runs its core operation on the blocking pool against a
//! fresh store connection; concurrent writers are serialized by the store
//! itself, so handlers hold no locks of their own.

pub mod config;
pub mod error;
mod routes;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::{Json, Router};
use bloodbank_core::{BloodBankResult, Database};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{ApiError, ApiResult};

/// Shared handler state: where the store lives and how long to wait on it.
#[derive(Clone)]
pub struct AppState {
    db_path: Arc<PathBuf>,
    busy_timeout: Duration,
}

impl AppState {
    pub fn new(db_path: impl Into<PathBuf>, busy_timeout: Duration) -> Self {
        Self {
            db_path: Arc::new(db_path.into()),
            busy_timeout,
        }
    }

    /// Run `f` against its own connection on the blocking pool.
    pub async fn with_db<T, F>(&self, f: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> BloodBankResult<T> + Send + 'static,
    {
        let path = Arc::clone(&self.db_path);
        let busy_timeout = self.busy_timeout;

        let outcome = tokio::task::spawn_blocking(move || {
            let db = Database::connect(path.as_path(), busy_timeout)
                .map_err(bloodbank_core::BloodBankError::from)?;
            f(&db)
        })
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

        outcome.map_err(ApiError::from)
    }
}

/// Assemble the full `/api/v1` router.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .nest("/inventory", routes::inventory::router())
        .nest("/donations", routes::donations::router())
        .nest("/requests", routes::requests::router())
        .nest("/hospitals", routes::hospitals::router())
        .nest("/users", routes::users::router())
        .nest("/camps", routes::camps::router());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
