//! Deploy/reset handlers forwarding to whichever provider is mounted.

use crate::cms::ControlOutcome;
use crate::error::AppError;
use crate::response::{success_with_meta, SuccessOne};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

fn outcome_response<T: Serialize>(
    outcome: ControlOutcome<T>,
) -> Result<(StatusCode, Json<SuccessOne<Value>>), AppError> {
    Ok(match outcome {
        ControlOutcome::Delegated(result) => success_with_meta(
            StatusCode::OK,
            serde_json::to_value(result)?,
            json!({ "status": "delegated" }),
        ),
        ControlOutcome::NoProvider => {
            success_with_meta(StatusCode::OK, Value::Null, json!({ "status": "no_provider" }))
        }
    })
}

pub async fn deploy(
    State(state): State<AppState>,
    Path(entity): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    outcome_response(state.cms.deploy(&entity, None).await?)
}

pub async fn deploy_record(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    outcome_response(state.cms.deploy(&entity, Some(&id)).await?)
}

pub async fn reset(
    State(state): State<AppState>,
    Path(entity): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    outcome_response(state.cms.reset(&entity, None).await?)
}

pub async fn reset_record(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    outcome_response(state.cms.reset(&entity, Some(&id)).await?)
}
