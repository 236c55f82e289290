//! Runtime settings read from the environment (`.env` is loaded by the binary, not here).

use crate::image::ImgurService;
use crate::route::DEFAULT_BASE_URL;

const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;
const DEFAULT_BIND: &str = "0.0.0.0:3000";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Path prefix the CMS is served under. `CMS_BASE_URL`, default `/`.
    pub base_url: String,
    /// `IMGUR_CLIENT_ID`, default empty.
    pub imgur_client_id: String,
    /// `IMGUR_MASHAPE_KEY`, default empty.
    pub imgur_mashape_key: String,
    /// `DATABASE_URL`. When unset the in-memory connector is used.
    pub database_url: Option<String>,
    /// `CMS_SCHEMA_PATH`: schema JSON file, default `schema.json`.
    pub schema_path: String,
    /// `CMS_BODY_LIMIT` in bytes, default 2 MiB.
    pub body_limit: usize,
    /// `CMS_BIND`, default `0.0.0.0:3000`.
    pub bind: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            base_url: DEFAULT_BASE_URL.to_string(),
            imgur_client_id: String::new(),
            imgur_mashape_key: String::new(),
            database_url: None,
            schema_path: "schema.json".into(),
            body_limit: DEFAULT_BODY_LIMIT,
            bind: DEFAULT_BIND.into(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or empty values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Settings::default();
        Settings {
            base_url: get("CMS_BASE_URL").unwrap_or(defaults.base_url),
            imgur_client_id: get("IMGUR_CLIENT_ID").unwrap_or_default(),
            imgur_mashape_key: get("IMGUR_MASHAPE_KEY").unwrap_or_default(),
            database_url: get("DATABASE_URL"),
            schema_path: get("CMS_SCHEMA_PATH").unwrap_or(defaults.schema_path),
            body_limit: get("CMS_BODY_LIMIT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.body_limit),
            bind: get("CMS_BIND").unwrap_or(defaults.bind),
        }
    }

    pub fn image_service(&self) -> ImgurService {
        ImgurService::new(self.imgur_client_id.clone(), self.imgur_mashape_key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_nothing_is_set() {
        assert_eq!(Settings::from_lookup(|_| None), Settings::default());
    }

    #[test]
    fn reads_values_and_ignores_garbage() {
        let env: HashMap<&str, &str> = [
            ("CMS_BASE_URL", "/admin"),
            ("IMGUR_CLIENT_ID", "cid"),
            ("CMS_BODY_LIMIT", "not-a-number"),
            ("DATABASE_URL", "  "),
        ]
        .into_iter()
        .collect();
        let settings = Settings::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(settings.base_url, "/admin");
        assert_eq!(settings.image_service().client_id, "cid");
        assert_eq!(settings.body_limit, DEFAULT_BODY_LIMIT);
        assert_eq!(settings.database_url, None);
    }
}
