//! Navigation fallback: any GET path not claimed by another router is read as a location.

use crate::handlers::navigation::navigate;
use crate::state::AppState;
use axum::{routing::get, Router};

/// Merge last; it installs the router fallback. Other methods get 405.
pub fn navigation_routes(state: AppState) -> Router {
    Router::new().fallback(get(navigate)).with_state(state)
}
