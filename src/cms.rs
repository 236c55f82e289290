//! Top-level orchestrator: bootstraps the data client once and re-exposes deploy/reset
//! of whichever provider is currently mounted.

use crate::client::{assemble_client, DataClient, ResolverMap};
use crate::connector::{resolve_connectors, ConnectorSpec};
use crate::error::{AppError, ConfigError};
use crate::image::{distribute_image_configs, ImageService, ImgurService};
use crate::provider::{DeployReport, Provider};
use crate::route::{Location, Navigation, DEFAULT_BASE_URL};
use crate::schema::{normalize, EntitySchema};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, Weak};

pub struct CmsOptions {
    pub schema: EntitySchema,
    pub connector: ConnectorSpec,
    pub resolvers: ResolverMap,
    pub base_url: String,
    pub image_service_configs: Option<HashMap<String, Value>>,
    pub image_service: Arc<dyn ImageService>,
}

impl Default for CmsOptions {
    fn default() -> Self {
        CmsOptions {
            schema: EntitySchema::new(),
            connector: ConnectorSpec::None,
            resolvers: ResolverMap::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            image_service_configs: None,
            image_service: Arc::new(ImgurService::default()),
        }
    }
}

/// Result of a control operation forwarded to the mounted provider.
#[derive(Clone, Debug, PartialEq)]
pub enum ControlOutcome<T> {
    Delegated(T),
    /// Nothing was mounted; the call succeeded without doing anything. Callers cannot
    /// tell this apart from a provider that has not mounted yet.
    NoProvider,
}

impl<T> ControlOutcome<T> {
    pub fn is_delegated(&self) -> bool {
        matches!(self, ControlOutcome::Delegated(_))
    }
}

pub struct Cms {
    raw_schema: EntitySchema,
    client: Arc<DataClient>,
    base_url: String,
    image_service_configs: HashMap<String, Value>,
    provider: RwLock<Weak<Provider>>,
}

impl Cms {
    pub fn bootstrap(options: CmsOptions) -> Result<Self, ConfigError> {
        let CmsOptions {
            schema,
            connector,
            resolvers,
            base_url,
            image_service_configs,
            image_service,
        } = options;

        let normalized = normalize(&schema);
        let resolved = resolve_connectors(connector);
        tracing::info!(
            entities = schema.len(),
            default_connector = ?resolved.default_connector.as_ref().map(|c| c.name()),
            named_connectors = resolved.named_connectors.len(),
            "resolved connectors"
        );
        let client = assemble_client(&schema, normalized, resolved, resolvers)?;
        let image_service_configs =
            distribute_image_configs(schema.keys(), image_service.as_ref(), image_service_configs.as_ref());

        Ok(Cms {
            raw_schema: schema,
            client: Arc::new(client),
            base_url,
            image_service_configs,
            provider: RwLock::new(Weak::new()),
        })
    }

    pub fn client(&self) -> &Arc<DataClient> {
        &self.client
    }

    /// Normalized schema the client was built with.
    pub fn schema(&self) -> &EntitySchema {
        self.client.schema()
    }

    /// Schema as supplied by the caller.
    pub fn raw_schema(&self) -> &EntitySchema {
        &self.raw_schema
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn image_service_configs(&self) -> &HashMap<String, Value> {
        &self.image_service_configs
    }

    /// Navigation state for `location`; recomputed on every call.
    pub fn navigate(&self, location: &Location) -> Navigation {
        Navigation::from_location(location, &self.base_url)
    }

    /// New provider rooted at the entity `location` points to. Not mounted.
    pub fn provider_for(&self, location: &Location) -> Provider {
        let root_key = self.navigate(location).root_key().map(str::to_string);
        Provider::new(self.client.clone(), root_key)
    }

    /// Record `provider` as the mounted subtree controller. Only a weak handle is kept;
    /// once the caller drops the provider it counts as unmounted.
    pub fn mount(&self, provider: &Arc<Provider>) {
        if let Ok(mut slot) = self.provider.write() {
            *slot = Arc::downgrade(provider);
            tracing::debug!(root_key = ?provider.root_key(), "provider mounted");
        }
    }

    pub fn unmount(&self) {
        if let Ok(mut slot) = self.provider.write() {
            *slot = Weak::new();
        }
    }

    pub fn mounted(&self) -> Option<Arc<Provider>> {
        self.provider.read().ok().and_then(|slot| slot.upgrade())
    }

    pub async fn deploy(&self, entity: &str, id: Option<&str>) -> Result<ControlOutcome<DeployReport>, AppError> {
        match self.mounted() {
            Some(provider) => Ok(ControlOutcome::Delegated(provider.deploy(entity, id).await?)),
            None => {
                tracing::debug!(entity, "deploy requested with no provider mounted");
                Ok(ControlOutcome::NoProvider)
            }
        }
    }

    pub async fn reset(&self, entity: &str, id: Option<&str>) -> Result<ControlOutcome<usize>, AppError> {
        match self.mounted() {
            Some(provider) => Ok(ControlOutcome::Delegated(provider.reset(entity, id)?)),
            None => {
                tracing::debug!(entity, "reset requested with no provider mounted");
                Ok(ControlOutcome::NoProvider)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::{MemoryConnector, SharedConnector, DEFAULT_CONNECTOR_KEY};
    use serde_json::json;

    fn schema() -> EntitySchema {
        EntitySchema::from_json(json!({
            "user": { "type": "array", "items": { "type": "object", "items": {} } },
            "post": { "type": "array", "items": { "type": "object", "items": {} } }
        }))
        .unwrap()
    }

    fn cms() -> Cms {
        Cms::bootstrap(CmsOptions {
            schema: schema(),
            base_url: "/admin".into(),
            ..CmsOptions::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn control_operations_without_provider_are_no_ops() {
        let cms = cms();
        assert_eq!(cms.deploy("user", None).await.unwrap(), ControlOutcome::NoProvider);
        assert_eq!(cms.reset("user", Some("1")).await.unwrap(), ControlOutcome::NoProvider);
    }

    #[tokio::test]
    async fn mounted_provider_receives_control_operations() {
        let cms = cms();
        let provider = Arc::new(cms.provider_for(&Location::new("/admin/user/1", "")));
        assert_eq!(provider.root_key(), Some("user"));
        cms.mount(&provider);

        provider.stage("user", Some("1"), json!({ "name": "ada" })).unwrap();
        let outcome = cms.deploy("user", Some("1")).await.unwrap();
        assert!(outcome.is_delegated());
        assert!(cms.client().find_record("user", "1").await.unwrap().is_some());

        provider.stage("user", Some("2"), json!({})).unwrap();
        assert_eq!(cms.reset("user", None).await.unwrap(), ControlOutcome::Delegated(1));

        cms.unmount();
        assert_eq!(cms.deploy("user", None).await.unwrap(), ControlOutcome::NoProvider);
    }

    #[tokio::test]
    async fn dropped_provider_counts_as_unmounted() {
        let cms = cms();
        let provider = Arc::new(cms.provider_for(&Location::default()));
        cms.mount(&provider);
        drop(provider);
        assert!(cms.mounted().is_none());
        assert_eq!(cms.deploy("user", None).await.unwrap(), ControlOutcome::NoProvider);
    }

    #[test]
    fn image_configs_cover_every_entity() {
        let mut overrides = HashMap::new();
        overrides.insert("user".to_string(), json!({ "foo": 1 }));
        let cms = Cms::bootstrap(CmsOptions {
            schema: schema(),
            image_service_configs: Some(overrides),
            ..CmsOptions::default()
        })
        .unwrap();
        assert_eq!(cms.image_service_configs()["user"], json!({ "foo": 1 }));
        assert_eq!(cms.image_service_configs()["post"]["name"], json!("imgur"));
    }

    #[test]
    fn keyed_connectors_route_per_entity() {
        let default: SharedConnector = Arc::new(MemoryConnector::default());
        let posts: SharedConnector = Arc::new(MemoryConnector::default());
        let mut map = HashMap::new();
        map.insert(DEFAULT_CONNECTOR_KEY.to_string(), default.clone());
        map.insert("post".to_string(), posts.clone());
        let cms = Cms::bootstrap(CmsOptions {
            schema: schema(),
            connector: ConnectorSpec::from_keyed_map(map),
            ..CmsOptions::default()
        })
        .unwrap();
        assert!(Arc::ptr_eq(cms.client().connector_for("user").unwrap(), &default));
        assert!(Arc::ptr_eq(cms.client().connector_for("post").unwrap(), &posts));
        assert_eq!(cms.client().connector_count(), 2);
    }

    #[test]
    fn normalized_schema_is_exposed_and_raw_kept() {
        let cms = cms();
        assert!(cms.schema().get("user").unwrap().items.as_ref().unwrap().contains_key("id"));
        assert!(!cms.raw_schema().get("user").unwrap().items.as_ref().unwrap().contains_key("id"));
        assert_eq!(cms.navigate(&Location::new("/admin/post", "")).routes, vec!["post"]);
    }
}
