//! Site configuration.
//!
//! Read once from `<script type="application/json" id="elkaretro-config">`.
//! Every field has a default, so a missing or partial block still boots.

use std::collections::BTreeMap;

use er_blog::Messages;
use er_reactive::{FieldType, Value};
use serde::Deserialize;
use tracing::warn;

pub const CONFIG_ELEMENT_ID: &str = "elkaretro-config";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BlogConfig {
    pub endpoint: String,
    pub per_page: u64,
    pub root_margin: String,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            endpoint: "/wp-json/wp/v2/posts".to_owned(),
            per_page: 10,
            root_margin: "200px".to_owned(),
        }
    }
}

impl BlogConfig {
    /// Apply `data-endpoint` / `data-per-page` from a blog mount element.
    pub fn with_overrides(&self, endpoint: Option<&str>, per_page: Option<&str>) -> Self {
        let mut blog = self.clone();
        if let Some(endpoint) = endpoint.map(str::trim).filter(|e| !e.is_empty()) {
            blog.endpoint = endpoint.to_owned();
        }
        let default = Value::from(blog.per_page as f64);
        match FieldType::Number.parse_attribute(per_page, &default) {
            Ok(Value::Number(n)) if n >= 1.0 => blog.per_page = n as u64,
            Ok(_) => {}
            Err(err) => warn!(%err, "ignoring data-per-page"),
        }
        blog
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub poll_interval_ms: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub blog: BlogConfig,
    pub auth: AuthConfig,
    pub log_level: String,
    pub messages: Messages,
    /// Icon name to SVG markup, merged over the built-in set.
    pub icons: BTreeMap<String, String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            blog: BlogConfig::default(),
            auth: AuthConfig::default(),
            log_level: "info".to_owned(),
            messages: Messages::default(),
            icons: BTreeMap::new(),
        }
    }
}

impl SiteConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Parse `raw`, falling back to defaults when it is absent or broken.
    /// Runs before logging is up, so the parse error is returned for later.
    pub fn from_json_or_default(raw: Option<&str>) -> (Self, Option<serde_json::Error>) {
        match raw.map(str::trim).filter(|r| !r.is_empty()) {
            None => (Self::default(), None),
            Some(raw) => match Self::from_json(raw) {
                Ok(config) => (config, None),
                Err(err) => (Self::default(), Some(err)),
            },
        }
    }
}

/// Text of the config script element, if the page has one.
pub fn read_config_block() -> Option<String> {
    gloo_utils::document()
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|el| el.text_content())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_block_keeps_defaults() -> Result<(), serde_json::Error> {
        let config = SiteConfig::from_json(
            r#"{
                "blog": { "per_page": 12 },
                "messages": { "end": "That's all, folks." },
                "icons": { "cart": "<svg></svg>" }
            }"#,
        )?;
        assert_eq!(config.blog.per_page, 12);
        assert_eq!(config.blog.endpoint, "/wp-json/wp/v2/posts");
        assert_eq!(config.blog.root_margin, "200px");
        assert_eq!(config.auth.poll_interval_ms, 5000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.messages.end, "That's all, folks.");
        assert_eq!(config.messages.empty, Messages::default().empty);
        assert_eq!(config.icons.get("cart").map(String::as_str), Some("<svg></svg>"));
        Ok(())
    }

    #[test]
    fn broken_block_falls_back() {
        let (config, err) = SiteConfig::from_json_or_default(Some("{ nope"));
        assert_eq!(config, SiteConfig::default());
        assert!(err.is_some());

        let (config, err) = SiteConfig::from_json_or_default(None);
        assert_eq!(config, SiteConfig::default());
        assert!(err.is_none());
    }

    #[test]
    fn mount_attributes_override_blog_settings() {
        let base = BlogConfig::default();
        let blog = base.with_overrides(Some("/?rest_route=/wp/v2/posts"), Some("6"));
        assert_eq!(blog.endpoint, "/?rest_route=/wp/v2/posts");
        assert_eq!(blog.per_page, 6);

        assert_eq!(base.with_overrides(Some("  "), Some("six")), base);
        assert_eq!(base.with_overrides(None, Some("0")).per_page, 10);
    }
}
