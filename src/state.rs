//! Shared application state for all routes.

use crate::cms::Cms;
use crate::provider::Provider;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub cms: Arc<Cms>,
    /// Strong handle keeping the mounted provider alive; `None` serves without one.
    pub provider: Option<Arc<Provider>>,
}

impl AppState {
    /// State with `provider` mounted on `cms`.
    pub fn mounted(cms: Arc<Cms>, provider: Arc<Provider>) -> Self {
        cms.mount(&provider);
        AppState {
            cms,
            provider: Some(provider),
        }
    }

    pub fn unmounted(cms: Arc<Cms>) -> Self {
        AppState { cms, provider: None }
    }
}
