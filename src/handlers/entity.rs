//! Entity handlers: read current values, stage edits into the mounted provider.

use crate::error::AppError;
use crate::provider::Provider;
use crate::response::{success_one_ok, success_with_meta};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

fn mounted_provider(state: &AppState) -> Result<&Arc<Provider>, AppError> {
    state
        .provider
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("no provider mounted; edits cannot be staged".into()))
}

pub async fn read_entity(
    State(state): State<AppState>,
    Path(entity): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let value = state.cms.client().query(&entity).await?;
    Ok(success_one_ok(value))
}

pub async fn read_record(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let record = state
        .cms
        .client()
        .find_record(&entity, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {}", entity, id)))?;
    Ok(success_one_ok(record))
}

pub async fn stage_entity(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let provider = mounted_provider(&state)?;
    provider.stage(&entity, None, body)?;
    Ok(staged(provider, &entity, None))
}

pub async fn stage_record(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let provider = mounted_provider(&state)?;
    provider.stage(&entity, Some(&id), body)?;
    Ok(staged(provider, &entity, Some(&id)))
}

fn staged(
    provider: &Provider,
    entity: &str,
    id: Option<&str>,
) -> (StatusCode, Json<crate::response::SuccessOne<Value>>) {
    success_with_meta(
        StatusCode::ACCEPTED,
        json!({ "entity": entity, "id": id }),
        json!({ "pending": provider.pending_count() }),
    )
}
