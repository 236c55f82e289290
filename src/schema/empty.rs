//! Empty seed data derived from a schema, used by the in-memory fallback connector.

use crate::schema::{EntityDefinition, EntitySchema, FieldKind};
use serde_json::{Map, Value};

/// Entity key -> empty value for every entity in `schema`. Pure and deterministic.
pub fn create_empty_data(schema: &EntitySchema) -> Map<String, Value> {
    schema
        .iter()
        .map(|(key, definition)| (key.to_string(), empty_entity(definition)))
        .collect()
}

/// Empty value for one top-level entity.
pub fn empty_entity(definition: &EntityDefinition) -> Value {
    empty_value(&definition.kind, definition.items.as_ref())
}

fn empty_value(kind: &FieldKind, items: Option<&Map<String, Value>>) -> Value {
    match kind {
        FieldKind::Array => Value::Array(Vec::new()),
        FieldKind::Object => Value::Object(
            items
                .map(|fields| {
                    fields
                        .iter()
                        .filter_map(|(name, field)| empty_field(field).map(|v| (name.clone(), v)))
                        .collect()
                })
                .unwrap_or_default(),
        ),
        FieldKind::String | FieldKind::DateTime | FieldKind::Enum => Value::String(String::new()),
        FieldKind::Number => Value::from(0),
        FieldKind::Boolean => Value::Bool(false),
        FieldKind::Image | FieldKind::File | FieldKind::GeoPoint | FieldKind::Json => {
            Value::Object(Map::new())
        }
        FieldKind::Id | FieldKind::Relation | FieldKind::Component | FieldKind::Other(_) => Value::Null,
    }
}

// Nested field definitions stay untyped JSON; entries without a "type" are skipped.
fn empty_field(field: &Value) -> Option<Value> {
    let kind = FieldKind::of(field)?;
    let items = field.get("items").and_then(Value::as_object);
    Some(empty_value(&kind, items))
}
