//! Load a schema from JSON text or a file on disk.

use crate::error::ConfigError;
use crate::schema::EntitySchema;
use std::path::Path;

pub fn load_schema_from_str(json: &str) -> Result<EntitySchema, ConfigError> {
    serde_json::from_str(json).map_err(|e| ConfigError::Load(e.to_string()))
}

pub async fn load_schema_from_path(path: impl AsRef<Path>) -> Result<EntitySchema, ConfigError> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    load_schema_from_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_schema_text() {
        let schema = load_schema_from_str(r#"{"posts": {"type": "array", "items": {"type": "object"}}}"#).unwrap();
        assert!(schema.contains("posts"));
    }

    #[test]
    fn non_object_schema_is_a_load_error() {
        assert!(matches!(load_schema_from_str("[1, 2]"), Err(ConfigError::Load(_))));
    }

    #[tokio::test]
    async fn missing_file_is_a_load_error() {
        let err = load_schema_from_path("/nonexistent/schema.json").await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/schema.json"));
    }
}
