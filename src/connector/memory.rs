//! In-memory connector, used as the zero-config fallback.

use crate::connector::Connector;
use crate::error::AppError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryConnector {
    data: RwLock<Map<String, Value>>,
}

impl MemoryConnector {
    pub fn new(default_data: Map<String, Value>) -> Self {
        MemoryConnector {
            data: RwLock::new(default_data),
        }
    }

    /// Copy of everything currently held.
    pub fn snapshot(&self) -> Result<Map<String, Value>, AppError> {
        self.data.read().map(|d| d.clone()).map_err(|_| self.poisoned())
    }

    fn poisoned(&self) -> AppError {
        AppError::Connector {
            connector: self.name().to_string(),
            message: "lock poisoned".into(),
        }
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load(&self, entity: &str) -> Result<Option<Value>, AppError> {
        let data = self.data.read().map_err(|_| self.poisoned())?;
        Ok(data.get(entity).cloned())
    }

    async fn store(&self, entity: &str, value: Value) -> Result<(), AppError> {
        let mut data = self.data.write().map_err(|_| self.poisoned())?;
        data.insert(entity.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn serves_seed_data_and_overwrites() {
        let mut seed = Map::new();
        seed.insert("posts".into(), json!([]));
        let connector = MemoryConnector::new(seed);

        assert_eq!(connector.load("posts").await.unwrap(), Some(json!([])));
        assert_eq!(connector.load("missing").await.unwrap(), None);

        connector.store("posts", json!([{ "id": "1" }])).await.unwrap();
        assert_eq!(connector.snapshot().unwrap()["posts"], json!([{ "id": "1" }]));
    }

    #[tokio::test]
    async fn poisoned_lock_is_reported() {
        let connector = std::sync::Arc::new(MemoryConnector::default());
        let held = connector.clone();
        let _ = std::thread::spawn(move || {
            let _guard = held.data.write().unwrap();
            panic!("poison");
        })
        .join();
        assert!(matches!(connector.snapshot(), Err(AppError::Connector { .. })));
        assert!(connector.load("posts").await.is_err());
    }
}
