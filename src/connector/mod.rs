//! Data-source adapters and connector resolution.

pub mod memory;
pub mod postgres;
pub mod resolve;

pub use memory::MemoryConnector;
pub use postgres::{cms_schema, ensure_database_exists, PgConnector};
pub use resolve::*;

use crate::error::AppError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Backend contract for one or more entities. Each entity is stored as a single JSON
/// document: an array for list entities, an object for singletons.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Short label used in logs and errors.
    fn name(&self) -> &str;

    /// Current value for `entity`, or `None` when nothing has been stored yet.
    async fn load(&self, entity: &str) -> Result<Option<Value>, AppError>;

    async fn store(&self, entity: &str, value: Value) -> Result<(), AppError>;
}

pub type SharedConnector = Arc<dyn Connector>;
