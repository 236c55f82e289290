//! Unified data client: one schema, one resolver set, any number of connectors.

use crate::connector::{resolve_connectors, ConnectorSpec, MemoryConnector, ResolvedConnectors, SharedConnector};
use crate::error::{AppError, ConfigError};
use crate::schema::{create_empty_data, empty_entity, validate, EntitySchema, ID_FIELD};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Computes one field of a record from the record itself.
pub type FieldResolver = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Field name -> resolver, for one entity.
pub type EntityResolvers = HashMap<String, FieldResolver>;

/// Entity key -> computed-field resolvers.
pub type ResolverMap = HashMap<String, EntityResolvers>;

/// Construction options. At least one of `connector` / `connectors` must be set.
#[derive(Clone, Default)]
pub struct ClientOptions {
    pub schema: EntitySchema,
    pub resolvers: ResolverMap,
    pub connector: Option<SharedConnector>,
    pub connectors: HashMap<String, SharedConnector>,
}

pub struct DataClient {
    schema: EntitySchema,
    resolvers: ResolverMap,
    default_connector: Option<SharedConnector>,
    connectors: HashMap<String, SharedConnector>,
    // Held across load-modify-store so record edits on one entity apply in turn.
    write_locks: HashMap<String, Mutex<()>>,
}

impl fmt::Debug for DataClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataClient")
            .field("entities", &self.schema.keys().collect::<Vec<_>>())
            .field("default_connector", &self.default_connector.as_ref().map(|c| c.name()))
            .field("connectors", &self.connectors.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl DataClient {
    /// Validates the schema and builds the client. Schema errors are returned unchanged.
    pub fn new(options: ClientOptions) -> Result<Self, ConfigError> {
        validate(&options.schema)?;
        if options.connector.is_none() && options.connectors.is_empty() {
            return Err(ConfigError::NoDataSource);
        }
        let write_locks = options.schema.keys().map(|k| (k.to_string(), Mutex::new(()))).collect();
        Ok(DataClient {
            write_locks,
            schema: options.schema,
            resolvers: options.resolvers,
            default_connector: options.connector,
            connectors: options.connectors,
        })
    }

    pub fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    pub fn has_default_connector(&self) -> bool {
        self.default_connector.is_some()
    }

    /// Number of distinct connector slots (default plus per-entity).
    pub fn connector_count(&self) -> usize {
        self.connectors.len() + usize::from(self.default_connector.is_some())
    }

    /// Connector serving `entity`: its named connector, else the default.
    pub fn connector_for(&self, entity: &str) -> Result<&SharedConnector, AppError> {
        if !self.schema.contains(entity) {
            return Err(AppError::NotFound(format!("entity {}", entity)));
        }
        self.connectors
            .get(entity)
            .or(self.default_connector.as_ref())
            .ok_or_else(|| AppError::NotFound(format!("no connector serves entity {}", entity)))
    }

    /// Current value of `entity` with computed fields applied.
    pub async fn query(&self, entity: &str) -> Result<Value, AppError> {
        let mut value = self.load_raw(entity).await?;
        self.apply_resolvers(entity, &mut value);
        Ok(value)
    }

    /// One record of a list entity, by id.
    pub async fn find_record(&self, entity: &str, id: &str) -> Result<Option<Value>, AppError> {
        let records = self.load_list(entity).await?;
        let mut record = match records.into_iter().find(|r| record_id(r).as_deref() == Some(id)) {
            Some(r) => r,
            None => return Ok(None),
        };
        if let Some(resolvers) = self.resolvers.get(entity) {
            apply_to_record(resolvers, &mut record);
        }
        Ok(Some(record))
    }

    /// Replace the whole value of `entity`. List entities take an array, the rest an object.
    pub async fn write(&self, entity: &str, value: Value) -> Result<(), AppError> {
        let _guard = self.write_lock(entity).await?;
        self.store_checked(entity, value).await
    }

    /// Insert or replace a record of a list entity. A record without an id gets a fresh UUID.
    /// Returns the stored record.
    pub async fn upsert_record(&self, entity: &str, record: Value) -> Result<Value, AppError> {
        let mut record = match record {
            Value::Object(map) => map,
            _ => return Err(AppError::BadRequest("record must be a JSON object".into())),
        };
        let id = match record.get(ID_FIELD).and_then(id_string) {
            Some(id) => id,
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                record.insert(ID_FIELD.to_string(), Value::String(id.clone()));
                id
            }
        };
        let record = Value::Object(record);
        let _guard = self.write_lock(entity).await?;
        let mut records = self.load_list(entity).await?;
        match records.iter_mut().find(|r| record_id(r).as_deref() == Some(id.as_str())) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        self.store_checked(entity, Value::Array(records)).await?;
        Ok(record)
    }

    /// Remove a record of a list entity. Returns whether it existed.
    pub async fn remove_record(&self, entity: &str, id: &str) -> Result<bool, AppError> {
        let _guard = self.write_lock(entity).await?;
        let mut records = self.load_list(entity).await?;
        let before = records.len();
        records.retain(|r| record_id(r).as_deref() != Some(id));
        if records.len() == before {
            return Ok(false);
        }
        self.store_checked(entity, Value::Array(records)).await?;
        Ok(true)
    }

    async fn write_lock(&self, entity: &str) -> Result<MutexGuard<'_, ()>, AppError> {
        match self.write_locks.get(entity) {
            Some(lock) => Ok(lock.lock().await),
            None => Err(AppError::NotFound(format!("entity {}", entity))),
        }
    }

    // Callers hold the entity's write lock.
    async fn store_checked(&self, entity: &str, value: Value) -> Result<(), AppError> {
        let definition = self
            .schema
            .get(entity)
            .ok_or_else(|| AppError::NotFound(format!("entity {}", entity)))?;
        match (definition.is_list(), &value) {
            (true, Value::Array(_)) | (false, Value::Object(_)) => {}
            (true, _) => return Err(AppError::BadRequest(format!("{} expects an array", entity))),
            (false, _) => return Err(AppError::BadRequest(format!("{} expects an object", entity))),
        }
        let connector = self.connector_for(entity)?;
        connector.store(entity, value).await?;
        tracing::debug!(entity, connector = connector.name(), "entity written");
        Ok(())
    }

    async fn load_raw(&self, entity: &str) -> Result<Value, AppError> {
        let connector = self.connector_for(entity)?;
        match connector.load(entity).await? {
            Some(value) => Ok(value),
            None => Ok(self.schema.get(entity).map(empty_entity).unwrap_or(Value::Null)),
        }
    }

    async fn load_list(&self, entity: &str) -> Result<Vec<Value>, AppError> {
        let definition = self
            .schema
            .get(entity)
            .ok_or_else(|| AppError::NotFound(format!("entity {}", entity)))?;
        if !definition.is_list() {
            return Err(AppError::BadRequest(format!("{} is not a list entity", entity)));
        }
        match self.load_raw(entity).await? {
            Value::Array(records) => Ok(records),
            Value::Null => Ok(Vec::new()),
            _ => Err(AppError::Connector {
                connector: self.connector_for(entity)?.name().to_string(),
                message: format!("stored value for {} is not an array", entity),
            }),
        }
    }

    fn apply_resolvers(&self, entity: &str, value: &mut Value) {
        let Some(resolvers) = self.resolvers.get(entity) else {
            return;
        };
        match value {
            Value::Array(records) => records.iter_mut().for_each(|r| apply_to_record(resolvers, r)),
            other => apply_to_record(resolvers, other),
        }
    }
}

fn apply_to_record(resolvers: &EntityResolvers, record: &mut Value) {
    let computed: Vec<(String, Value)> = resolvers
        .iter()
        .map(|(field, resolve)| (field.clone(), resolve(&*record)))
        .collect();
    if let Value::Object(map) = record {
        map.extend(computed);
    }
}

// Ids may be stored as strings or numbers; compare them as strings.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn record_id(record: &Value) -> Option<String> {
    record.get(ID_FIELD).and_then(id_string)
}

/// Builds the one client for a bootstrap. When `resolved` carries no connector at all,
/// an in-memory connector seeded with empty data for `raw`'s entities becomes the default.
pub fn assemble_client(
    raw: &EntitySchema,
    normalized: EntitySchema,
    resolved: ResolvedConnectors,
    resolvers: ResolverMap,
) -> Result<DataClient, ConfigError> {
    let ResolvedConnectors {
        mut default_connector,
        named_connectors,
    } = resolved;
    if default_connector.is_none() && named_connectors.is_empty() {
        tracing::info!(entities = raw.len(), "no connector supplied, using in-memory connector");
        let fallback: SharedConnector = Arc::new(MemoryConnector::new(create_empty_data(raw)));
        default_connector = Some(fallback);
    }

    let mut options = ClientOptions {
        schema: normalized,
        resolvers,
        ..ClientOptions::default()
    };
    if let Some(connector) = default_connector {
        options.connector = Some(connector);
    }
    if !named_connectors.is_empty() {
        options.connectors = named_connectors;
    }
    DataClient::new(options)
}

/// Resolve then assemble in one step, for callers that already hold a normalized schema.
pub fn create_client(
    raw: &EntitySchema,
    normalized: EntitySchema,
    spec: ConnectorSpec,
    resolvers: ResolverMap,
) -> Result<DataClient, ConfigError> {
    assemble_client(raw, normalized, resolve_connectors(spec), resolvers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::normalize;
    use serde_json::json;

    fn schema() -> EntitySchema {
        EntitySchema::from_json(json!({
            "users": {
                "type": "array",
                "items": { "type": "object", "items": { "name": { "type": "string" } } }
            },
            "info": { "type": "object", "items": { "title": { "type": "string" } } }
        }))
        .unwrap()
    }

    fn fallback_client(resolvers: ResolverMap) -> DataClient {
        let raw = schema();
        assemble_client(&raw, normalize(&raw), ResolvedConnectors::default(), resolvers).unwrap()
    }

    #[tokio::test]
    async fn empty_resolution_gets_memory_fallback() {
        let client = fallback_client(ResolverMap::new());
        assert!(client.has_default_connector());
        assert_eq!(client.connector_for("users").unwrap().name(), "memory");
        assert_eq!(client.query("users").await.unwrap(), json!([]));
        assert_eq!(client.query("info").await.unwrap(), json!({ "title": "" }));
    }

    #[test]
    fn direct_construction_without_connectors_fails() {
        let err = DataClient::new(ClientOptions {
            schema: schema(),
            ..ClientOptions::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::NoDataSource));
    }

    #[test]
    fn malformed_schema_propagates() {
        let raw = EntitySchema::from_json(json!({ "posts": { "type": "array" } })).unwrap();
        let err = assemble_client(&raw, normalize(&raw), ResolvedConnectors::default(), ResolverMap::new())
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingItems { .. }));
    }

    #[tokio::test]
    async fn named_connector_wins_over_default() {
        let raw = schema();
        let users: SharedConnector = Arc::new(MemoryConnector::default());
        let mut named = HashMap::new();
        named.insert("users".to_string(), users.clone());
        let resolved = ResolvedConnectors {
            default_connector: None,
            named_connectors: named,
        };
        let client = assemble_client(&raw, normalize(&raw), resolved, ResolverMap::new()).unwrap();
        assert!(!client.has_default_connector());
        assert!(Arc::ptr_eq(client.connector_for("users").unwrap(), &users));
        assert!(matches!(client.connector_for("info"), Err(AppError::NotFound(_))));
        // Nothing stored yet: reads as the entity's empty value.
        assert_eq!(client.query("users").await.unwrap(), json!([]));
    }

    #[tokio::test]
    async fn records_get_ids_and_can_be_removed() {
        let client = fallback_client(ResolverMap::new());
        let stored = client.upsert_record("users", json!({ "name": "ada" })).await.unwrap();
        let id = stored["id"].as_str().unwrap().to_string();
        assert!(uuid::Uuid::parse_str(&id).is_ok());

        client
            .upsert_record("users", json!({ "id": id, "name": "grace" }))
            .await
            .unwrap();
        let found = client.find_record("users", &id).await.unwrap().unwrap();
        assert_eq!(found["name"], json!("grace"));
        assert_eq!(client.query("users").await.unwrap().as_array().unwrap().len(), 1);

        assert!(client.remove_record("users", &id).await.unwrap());
        assert!(!client.remove_record("users", &id).await.unwrap());
    }

    #[tokio::test]
    async fn writes_are_shape_checked() {
        let client = fallback_client(ResolverMap::new());
        assert!(matches!(client.write("users", json!({})).await, Err(AppError::BadRequest(_))));
        assert!(matches!(client.write("info", json!([])).await, Err(AppError::BadRequest(_))));
        assert!(matches!(client.write("nope", json!([])).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            client.upsert_record("info", json!({})).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn resolvers_compute_fields_on_read() {
        let mut user_resolvers = EntityResolvers::new();
        user_resolvers.insert(
            "greeting".to_string(),
            Arc::new(|r: &Value| json!(format!("hi {}", r["name"].as_str().unwrap_or("")))) as FieldResolver,
        );
        let mut resolvers = ResolverMap::new();
        resolvers.insert("users".to_string(), user_resolvers);

        let client = fallback_client(resolvers);
        let stored = client
            .upsert_record("users", json!({ "id": "7", "name": "ada" }))
            .await
            .unwrap();
        assert!(stored.get("greeting").is_none());
        assert_eq!(client.query("users").await.unwrap()[0]["greeting"], json!("hi ada"));
        assert_eq!(
            client.find_record("users", "7").await.unwrap().unwrap()["greeting"],
            json!("hi ada")
        );
    }
}
