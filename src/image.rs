//! Per-entity image upload service configuration.

use serde_json::{json, Value};
use std::collections::HashMap;

const IMGUR_UPLOAD_URL: &str = "https://imgur-apiv3.p.mashape.com/3/image";

/// Produces the default upload configuration handed to image fields.
pub trait ImageService: Send + Sync {
    fn service_config(&self) -> Value;
}

/// Imgur upload through the Mashape gateway.
#[derive(Clone, Debug, Default)]
pub struct ImgurService {
    pub client_id: String,
    pub mashape_key: String,
}

impl ImgurService {
    pub fn new(client_id: impl Into<String>, mashape_key: impl Into<String>) -> Self {
        ImgurService {
            client_id: client_id.into(),
            mashape_key: mashape_key.into(),
        }
    }
}

impl ImageService for ImgurService {
    fn service_config(&self) -> Value {
        json!({
            "name": "imgur",
            "accept": "image/*",
            "action": IMGUR_UPLOAD_URL,
            "filename": "image",
            "headers": {
                "Authorization": format!("Client-ID {}", self.client_id),
                "X-Mashape-Key": self.mashape_key,
            }
        })
    }
}

/// One generated default per key, then caller overrides replace whole entries.
pub fn distribute_image_configs<'a>(
    keys: impl IntoIterator<Item = &'a str>,
    service: &dyn ImageService,
    overrides: Option<&HashMap<String, Value>>,
) -> HashMap<String, Value> {
    let mut configs: HashMap<String, Value> = keys
        .into_iter()
        .map(|key| (key.to_string(), service.service_config()))
        .collect();
    if let Some(overrides) = overrides {
        configs.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    configs
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl ImageService for Fixed {
        fn service_config(&self) -> Value {
            json!({ "foo": 0, "bar": 1 })
        }
    }

    #[test]
    fn overrides_replace_whole_entries() {
        let mut overrides = HashMap::new();
        overrides.insert("user".to_string(), json!({ "foo": 1 }));
        let configs = distribute_image_configs(["user", "post"], &Fixed, Some(&overrides));
        assert_eq!(configs["user"], json!({ "foo": 1 }));
        assert_eq!(configs["post"], json!({ "foo": 0, "bar": 1 }));
    }

    #[test]
    fn override_keys_outside_schema_are_kept() {
        let mut overrides = HashMap::new();
        overrides.insert("extra".to_string(), json!({}));
        let configs = distribute_image_configs(["user"], &Fixed, Some(&overrides));
        assert_eq!(configs.len(), 2);
    }

    #[test]
    fn imgur_config_carries_credentials() {
        let config = ImgurService::new("abc", "xyz").service_config();
        assert_eq!(config["headers"]["Authorization"], json!("Client-ID abc"));
        assert_eq!(config["headers"]["X-Mashape-Key"], json!("xyz"));
        let configs = distribute_image_configs(["a", "b"], &ImgurService::default(), None);
        assert_eq!(configs["a"], configs["b"]);
    }
}
