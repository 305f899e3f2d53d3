use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use bloodbank_core::models::{NewUser, User, UserQuery, UserSummary, UserUpdate};
use bloodbank_core::Directory;
use serde::Deserialize;
use serde_json::Value;

use super::deleted;
use crate::error::{ApiJson, ApiResult};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/all", get(list))
        .route("/id/:id", get(get_one))
        .route("/search", get(search))
        .route("/list", get(summaries))
        .route("/create", post(create))
        .route("/update/:id", put(update))
        .route("/delete/:id", delete(remove))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListFilter {
    hospital_id: Option<String>,
}

async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    let users = state.with_db(|db| Directory::new(db).list_users()).await?;
    Ok(Json(users))
}

async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<User>> {
    let user = state.with_db(move |db| Directory::new(db).get_user(&id)).await?;
    Ok(Json(user))
}

async fn search(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<Vec<User>>> {
    let users = state
        .with_db(move |db| Directory::new(db).search_users(&query))
        .await?;
    Ok(Json(users))
}

async fn summaries(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> ApiResult<Json<Vec<UserSummary>>> {
    let users = state
        .with_db(move |db| Directory::new(db).user_summaries(filter.hospital_id.as_deref()))
        .await?;
    Ok(Json(users))
}

async fn create(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<NewUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state
        .with_db(move |db| Directory::new(db).register_user(form))
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<UserUpdate>,
) -> ApiResult<Json<User>> {
    let user = state
        .with_db(move |db| Directory::new(db).update_user(&id, update))
        .await?;
    Ok(Json(user))
}

async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    state
        .with_db(move |db| Directory::new(db).delete_user(&id))
        .await?;
    Ok(Json(deleted("User")))
}
