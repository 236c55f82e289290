//! Raw schema types matching the declarative entity schema JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Declared kind of an entity or field (`"type"` in the schema JSON).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    Array,
    Object,
    String,
    Number,
    Boolean,
    DateTime,
    Id,
    Relation,
    Image,
    File,
    GeoPoint,
    Json,
    Enum,
    Component,
    /// Caller-defined kind; kept verbatim.
    Other(String),
}

impl FieldKind {
    pub fn as_str(&self) -> &str {
        match self {
            FieldKind::Array => "array",
            FieldKind::Object => "object",
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::DateTime => "dateTime",
            FieldKind::Id => "id",
            FieldKind::Relation => "relation",
            FieldKind::Image => "image",
            FieldKind::File => "file",
            FieldKind::GeoPoint => "geoPoint",
            FieldKind::Json => "json",
            FieldKind::Enum => "enum",
            FieldKind::Component => "component",
            FieldKind::Other(s) => s,
        }
    }

    /// Kind declared by a nested field definition (`{"type": ...}`), if any.
    pub fn of(definition: &Value) -> Option<FieldKind> {
        definition
            .get("type")
            .and_then(Value::as_str)
            .map(|s| FieldKind::from(s.to_string()))
    }
}

impl From<String> for FieldKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "array" => FieldKind::Array,
            "object" => FieldKind::Object,
            "string" => FieldKind::String,
            "number" => FieldKind::Number,
            "boolean" => FieldKind::Boolean,
            "dateTime" => FieldKind::DateTime,
            "id" => FieldKind::Id,
            "relation" => FieldKind::Relation,
            "image" => FieldKind::Image,
            "file" => FieldKind::File,
            "geoPoint" => FieldKind::GeoPoint,
            "json" => FieldKind::Json,
            "enum" => FieldKind::Enum,
            "component" => FieldKind::Component,
            _ => FieldKind::Other(s),
        }
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One top-level entity. For arrays `items` is the element definition; for objects it
/// is the field map. Unknown keys (title, ui, ...) are preserved in `extra`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityDefinition {
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EntityDefinition {
    pub fn new(kind: FieldKind) -> Self {
        EntityDefinition {
            kind,
            items: None,
            extra: Map::new(),
        }
    }

    pub fn with_items(mut self, items: Map<String, Value>) -> Self {
        self.items = Some(items);
        self
    }

    pub fn is_list(&self) -> bool {
        self.kind == FieldKind::Array
    }
}

/// Entity key -> definition. Read-only once a client has been built from it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntitySchema {
    entities: BTreeMap<String, EntityDefinition>,
}

impl EntitySchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn insert(&mut self, key: impl Into<String>, definition: EntityDefinition) {
        self.entities.insert(key.into(), definition);
    }

    pub fn get(&self, key: &str) -> Option<&EntityDefinition> {
        self.entities.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entities.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntityDefinition)> {
        self.entities.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl FromIterator<(String, EntityDefinition)> for EntitySchema {
    fn from_iter<I: IntoIterator<Item = (String, EntityDefinition)>>(iter: I) -> Self {
        EntitySchema {
            entities: iter.into_iter().collect(),
        }
    }
}
