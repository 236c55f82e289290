//! Schema validation run by the data client constructor.

use crate::connector::DEFAULT_CONNECTOR_KEY;
use crate::error::ConfigError;
use crate::schema::{EntitySchema, FieldKind};

pub fn validate(schema: &EntitySchema) -> Result<(), ConfigError> {
    for (key, definition) in schema.iter() {
        if key == DEFAULT_CONNECTOR_KEY {
            return Err(ConfigError::ReservedKey(key.to_string()));
        }
        if definition.kind == FieldKind::Array && definition.items.is_none() {
            return Err(ConfigError::MissingItems {
                entity: key.to_string(),
            });
        }
    }
    Ok(())
}
