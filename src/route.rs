//! Navigation state derived from the current location.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Path separator for route segments.
pub const SEPARATOR: char = '/';

/// Default base path when none is configured.
pub const DEFAULT_BASE_URL: &str = "/";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub pathname: String,
    #[serde(default)]
    pub search: String,
}

impl Location {
    pub fn new(pathname: impl Into<String>, search: impl Into<String>) -> Self {
        Location {
            pathname: pathname.into(),
            search: search.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub routes: Vec<String>,
    pub params: HashMap<String, String>,
}

impl Navigation {
    pub fn from_location(location: &Location, base_url: &str) -> Self {
        Navigation {
            routes: derive_route(&location.pathname, base_url),
            params: parse_query(&location.search),
        }
    }

    /// Active entity key: the first segment, when non-empty.
    pub fn root_key(&self) -> Option<&str> {
        self.routes.first().map(String::as_str).filter(|s| !s.is_empty())
    }

    /// Active record id: the second segment, when non-empty.
    pub fn record_id(&self) -> Option<&str> {
        self.routes.get(1).map(String::as_str).filter(|s| !s.is_empty())
    }
}

/// Segments of `pathname` after `base_url`.
///
/// The base is removed by length, not matched, so it must be a literal prefix. One
/// leading separator is dropped from the remainder before splitting. A path equal to
/// the base yields `[""]`.
pub fn derive_route(pathname: &str, base_url: &str) -> Vec<String> {
    let rest: String = pathname.chars().skip(base_url.chars().count()).collect();
    let rest = rest.strip_prefix(SEPARATOR).unwrap_or(&rest);
    rest.split(SEPARATOR).map(str::to_string).collect()
}

/// Parses a `?a=1&b=two` query string. `+` decodes to a space, a bare key maps to `""`,
/// and a repeated key keeps its last value.
pub fn parse_query(search: &str) -> HashMap<String, String> {
    let query = search.strip_prefix('?').unwrap_or(search);
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_base_and_splits() {
        assert_eq!(derive_route("/admin/users/42", "/admin"), vec!["users", "42"]);
        assert_eq!(derive_route("/users/42", DEFAULT_BASE_URL), vec!["users", "42"]);
    }

    #[test]
    fn base_followed_by_path_is_prefix_exact() {
        for base in ["/", "/admin", "/cms/v2"] {
            let pathname = format!("{}/a/b", base);
            assert_eq!(derive_route(&pathname, base), vec!["a", "b"]);
            assert_eq!(derive_route(&pathname, base), derive_route(&pathname, base));
        }
    }

    #[test]
    fn path_equal_to_base_yields_single_empty_segment() {
        assert_eq!(derive_route("/admin", "/admin"), vec![""]);
        assert_eq!(derive_route("/", "/"), vec![""]);
        assert_eq!(derive_route("/a", "/longer-than-path"), vec![""]);
    }

    #[test]
    fn only_one_leading_separator_is_dropped() {
        assert_eq!(derive_route("/admin//x", "/admin"), vec!["", "x"]);
        assert_eq!(derive_route("/users/", "/"), vec!["users", ""]);
    }

    #[test]
    fn base_is_removed_by_length_not_pattern() {
        assert_eq!(derive_route("/other/users", "/admin"), vec!["users"]);
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(derive_route("/café/posts/1", "/café"), vec!["posts", "1"]);
    }

    #[test]
    fn navigation_exposes_root_and_record() {
        let nav = Navigation::from_location(&Location::new("/admin/users/42", "?tab=info"), "/admin");
        assert_eq!(nav.root_key(), Some("users"));
        assert_eq!(nav.record_id(), Some("42"));
        assert_eq!(nav.params.get("tab").map(String::as_str), Some("info"));

        let home = Navigation::from_location(&Location::new("/admin", ""), "/admin");
        assert_eq!(home.root_key(), None);
        assert!(home.params.is_empty());
    }

    #[test]
    fn query_decoding() {
        let params = parse_query("?q=hello+world&path=%2Fa%2Fb&flag&x=1&x=2");
        assert_eq!(params["q"], "hello world");
        assert_eq!(params["path"], "/a/b");
        assert_eq!(params["flag"], "");
        assert_eq!(params["x"], "2");
        assert!(parse_query("").is_empty());
        assert!(parse_query("?").is_empty());
    }
}
