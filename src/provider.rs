//! Subtree controller: buffers edits for the active entity and flushes them on deploy.

use crate::client::DataClient;
use crate::error::AppError;
use crate::schema::ID_FIELD;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// An edit staged against the client but not yet deployed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DataChange {
    pub entity: String,
    pub id: Option<String>,
    pub value: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployReport {
    pub entity: String,
    pub id: Option<String>,
    /// Number of staged changes written to the client.
    pub written: usize,
    pub deployed_at: DateTime<Utc>,
}

pub type ChangeHook = Arc<dyn Fn(&DataChange) + Send + Sync>;
pub type DeployHook = Arc<dyn Fn(&DeployReport) + Send + Sync>;

// Whole-entity changes sort before record changes of the same entity.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct ChangeKey {
    entity: String,
    id: Option<String>,
}

impl ChangeKey {
    fn matches(&self, entity: &str, id: Option<&str>) -> bool {
        self.entity == entity && (id.is_none() || self.id.as_deref() == id)
    }
}

pub struct Provider {
    client: Arc<DataClient>,
    root_key: Option<String>,
    pending: Mutex<BTreeMap<ChangeKey, Value>>,
    data_did_change: Option<ChangeHook>,
    after_deploy: Option<DeployHook>,
}

impl Provider {
    pub fn new(client: Arc<DataClient>, root_key: Option<String>) -> Self {
        Provider {
            client,
            root_key,
            pending: Mutex::new(BTreeMap::new()),
            data_did_change: None,
            after_deploy: None,
        }
    }

    pub fn on_change(mut self, hook: ChangeHook) -> Self {
        self.data_did_change = Some(hook);
        self
    }

    pub fn on_deploy(mut self, hook: DeployHook) -> Self {
        self.after_deploy = Some(hook);
        self
    }

    pub fn client(&self) -> &Arc<DataClient> {
        &self.client
    }

    pub fn root_key(&self) -> Option<&str> {
        self.root_key.as_deref()
    }

    pub fn pending_count(&self) -> usize {
        self.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Stage a replacement for a whole entity (`id = None`) or one record of a list entity.
    /// A `null` record value stages a removal.
    pub fn stage(&self, entity: &str, id: Option<&str>, value: Value) -> Result<(), AppError> {
        let definition = self
            .client
            .schema()
            .get(entity)
            .ok_or_else(|| AppError::NotFound(format!("entity {}", entity)))?;
        if id.is_some() && !definition.is_list() {
            return Err(AppError::BadRequest(format!("{} has no records", entity)));
        }
        let change = DataChange {
            entity: entity.to_string(),
            id: id.map(str::to_string),
            value,
        };
        self.lock()?.insert(
            ChangeKey {
                entity: change.entity.clone(),
                id: change.id.clone(),
            },
            change.value.clone(),
        );
        if let Some(hook) = &self.data_did_change {
            hook(&change);
        }
        Ok(())
    }

    /// Write pending changes for `entity` (or only record `id`) to the client.
    /// Changes that could not be written stay pending.
    pub async fn deploy(&self, entity: &str, id: Option<&str>) -> Result<DeployReport, AppError> {
        let mut changes = self.take_matching(entity, id)?;
        let mut written = 0;
        while !changes.is_empty() {
            let (key, value) = changes.remove(0);
            if let Err(e) = self.apply(&key, value.clone()).await {
                // A change staged while this deploy ran is newer; keep it.
                let mut pending = self.lock()?;
                for (key, value) in std::iter::once((key, value)).chain(changes) {
                    pending.entry(key).or_insert(value);
                }
                tracing::warn!(entity, error = %e, "deploy failed, changes kept pending");
                return Err(e);
            }
            written += 1;
        }
        let report = DeployReport {
            entity: entity.to_string(),
            id: id.map(str::to_string),
            written,
            deployed_at: Utc::now(),
        };
        tracing::info!(entity, id = ?id, written, "deployed");
        if let Some(hook) = &self.after_deploy {
            hook(&report);
        }
        Ok(report)
    }

    /// Discard pending changes for `entity` (or only record `id`). Returns how many were dropped.
    pub fn reset(&self, entity: &str, id: Option<&str>) -> Result<usize, AppError> {
        let dropped = self.take_matching(entity, id)?.len();
        tracing::debug!(entity, id = ?id, dropped, "reset pending changes");
        Ok(dropped)
    }

    async fn apply(&self, key: &ChangeKey, value: Value) -> Result<(), AppError> {
        match &key.id {
            None => self.client.write(&key.entity, value).await,
            Some(id) if value.is_null() => self.client.remove_record(&key.entity, id).await.map(|_| ()),
            Some(id) => {
                let mut value = value;
                if let Value::Object(map) = &mut value {
                    map.insert(ID_FIELD.to_string(), Value::String(id.clone()));
                }
                self.client.upsert_record(&key.entity, value).await.map(|_| ())
            }
        }
    }

    fn take_matching(&self, entity: &str, id: Option<&str>) -> Result<Vec<(ChangeKey, Value)>, AppError> {
        let mut pending = self.lock()?;
        let keys: Vec<ChangeKey> = pending.keys().filter(|k| k.matches(entity, id)).cloned().collect();
        Ok(keys
            .into_iter()
            .filter_map(|k| pending.remove(&k).map(|v| (k, v)))
            .collect())
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<ChangeKey, Value>>, AppError> {
        self.pending
            .lock()
            .map_err(|_| AppError::Internal("pending changes lock poisoned".into()))
    }
}
