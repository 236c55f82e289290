//! Entity and control routes. Mounted under `/api/v1` by the server.

use crate::handlers::control::{deploy, deploy_record, reset, reset_record};
use crate::handlers::entity::{read_entity, read_record, stage_entity, stage_record};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};
use tower_http::limit::RequestBodyLimitLayer;

pub fn entity_routes(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/entities/:entity", get(read_entity).put(stage_entity))
        .route("/entities/:entity/:id", get(read_record).put(stage_record))
        .route("/deploy/:entity", post(deploy))
        .route("/deploy/:entity/:id", post(deploy_record))
        .route("/reset/:entity", post(reset))
        .route("/reset/:entity/:id", post(reset_record))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}
