//! Connector resolution: what the caller supplied -> default connector plus per-entity connectors.

use crate::connector::SharedConnector;
use std::collections::HashMap;
use std::fmt;

/// Key that marks the default connector inside a keyed connector map.
pub const DEFAULT_CONNECTOR_KEY: &str = "__default";

/// Connectors as supplied by the caller.
#[derive(Clone, Default)]
pub enum ConnectorSpec {
    /// Nothing supplied; the client falls back to an in-memory connector.
    #[default]
    None,
    /// One connector serving every entity.
    Single(SharedConnector),
    /// Optional default plus connectors for specific entities.
    Keyed {
        default: Option<SharedConnector>,
        by_entity: HashMap<String, SharedConnector>,
    },
}

impl ConnectorSpec {
    /// Parses a map that may carry the default connector under `__default`.
    /// The sentinel entry is removed; it never becomes a per-entity connector.
    pub fn from_keyed_map(mut map: HashMap<String, SharedConnector>) -> Self {
        let default = map.remove(DEFAULT_CONNECTOR_KEY);
        ConnectorSpec::Keyed {
            default,
            by_entity: map,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ConnectorSpec::None => true,
            ConnectorSpec::Single(_) => false,
            ConnectorSpec::Keyed { default, by_entity } => default.is_none() && by_entity.is_empty(),
        }
    }
}

impl fmt::Debug for ConnectorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectorSpec::None => f.write_str("None"),
            ConnectorSpec::Single(c) => f.debug_tuple("Single").field(&c.name()).finish(),
            ConnectorSpec::Keyed { default, by_entity } => f
                .debug_struct("Keyed")
                .field("default", &default.as_ref().map(|c| c.name()))
                .field("by_entity", &by_entity.keys().collect::<Vec<_>>())
                .finish(),
        }
    }
}

#[derive(Clone, Default)]
pub struct ResolvedConnectors {
    pub default_connector: Option<SharedConnector>,
    pub named_connectors: HashMap<String, SharedConnector>,
}

impl ResolvedConnectors {
    /// No default and no per-entity connectors.
    pub fn is_empty(&self) -> bool {
        self.default_connector.is_none() && self.named_connectors.is_empty()
    }
}

impl fmt::Debug for ResolvedConnectors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConnectors")
            .field("default_connector", &self.default_connector.as_ref().map(|c| c.name()))
            .field("named_connectors", &self.named_connectors.keys().collect::<Vec<_>>())
            .finish()
    }
}

pub fn resolve_connectors(spec: ConnectorSpec) -> ResolvedConnectors {
    match spec {
        ConnectorSpec::None => ResolvedConnectors::default(),
        ConnectorSpec::Single(connector) => ResolvedConnectors {
            default_connector: Some(connector),
            named_connectors: HashMap::new(),
        },
        ConnectorSpec::Keyed {
            default,
            mut by_entity,
        } => {
            // A hand-built Keyed spec may still carry the sentinel.
            let default = default.or_else(|| by_entity.remove(DEFAULT_CONNECTOR_KEY));
            by_entity.remove(DEFAULT_CONNECTOR_KEY);
            ResolvedConnectors {
                default_connector: default,
                named_connectors: by_entity,
            }
        }
    }
}
