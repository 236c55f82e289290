//! Navigation handler: treats the request URI as the current location.

use crate::error::AppError;
use crate::response::success_one_ok;
use crate::route::Location;
use crate::state::AppState;
use axum::extract::{OriginalUri, State};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationBody {
    pub routes: Vec<String>,
    pub params: HashMap<String, String>,
    pub root_key: Option<String>,
    /// Current value of the root entity; `null` when the root is not a schema entity.
    pub data: Value,
}

pub async fn navigate(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let location = Location::new(uri.path(), uri.query().map(|q| format!("?{}", q)).unwrap_or_default());
    let navigation = state.cms.navigate(&location);
    let root_key = navigation.root_key().map(str::to_string);
    let data = match root_key.as_deref() {
        Some(key) if state.cms.schema().contains(key) => state.cms.client().query(key).await?,
        _ => Value::Null,
    };
    Ok(success_one_ok(NavigationBody {
        routes: navigation.routes,
        params: navigation.params,
        root_key,
        data,
    }))
}
