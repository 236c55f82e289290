//! Schema normalization: every list entity gets an addressable record key.

use crate::schema::{EntitySchema, FieldKind};
use serde_json::{json, Map, Value};

/// Name of the identity field injected into list item definitions.
pub const ID_FIELD: &str = "id";

/// Returns a client-ready copy of `raw`. Array entities get `items.id = {"type": "id"}`;
/// everything else is copied as is. Arrays without `items` are left for the client
/// constructor to reject.
pub fn normalize(raw: &EntitySchema) -> EntitySchema {
    raw.iter()
        .map(|(key, definition)| {
            let mut definition = definition.clone();
            if definition.kind == FieldKind::Array {
                if let Some(items) = definition.items.as_mut() {
                    inject_identity(items);
                }
            }
            (key.to_string(), definition)
        })
        .collect()
}

fn inject_identity(items: &mut Map<String, Value>) {
    items.insert(ID_FIELD.to_string(), json!({ "type": FieldKind::Id.as_str() }));
}
