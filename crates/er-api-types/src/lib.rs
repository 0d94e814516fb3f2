use serde::{Deserialize, Serialize};

// ── WordPress REST shapes ──

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenderedField {
    #[serde(default)]
    pub rendered: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WpMedia {
    #[serde(default)]
    pub source_url: String,
    #[serde(default)]
    pub alt_text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WpEmbedded {
    #[serde(default, rename = "wp:featuredmedia")]
    pub featured_media: Vec<WpMedia>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WpPost {
    pub id: u64,
    #[serde(default)]
    pub title: RenderedField,
    #[serde(default)]
    pub excerpt: RenderedField,
    #[serde(default)]
    pub content: RenderedField,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub link: String,
    #[serde(default, rename = "_embedded")]
    pub embedded: Option<WpEmbedded>,
}

impl WpPost {
    pub fn featured_media(&self) -> Option<&WpMedia> {
        self.embedded
            .as_ref()
            .and_then(|e| e.featured_media.first())
            .filter(|m| !m.source_url.is_empty())
    }
}

/// Offset-paginated listing request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostsQuery {
    pub offset: u64,
    pub per_page: u64,
    pub embed: bool,
}

impl PostsQuery {
    pub fn new(offset: u64, per_page: u64) -> Self {
        Self {
            offset,
            per_page,
            embed: true,
        }
    }

    /// Append the query parameters to `base`, which may already carry a query string.
    pub fn to_url(&self, base: &str) -> String {
        let sep = if base.contains('?') { '&' } else { '?' };
        let mut url = format!(
            "{base}{sep}offset={}&per_page={}",
            self.offset, self.per_page
        );
        if self.embed {
            url.push_str("&_embed=1");
        }
        url
    }
}

// ── Control events ──

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Change,
    Input,
    Select,
    Deselect,
    Open,
    Close,
    Validation,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Change => "change",
            EventKind::Input => "input",
            EventKind::Select => "select",
            EventKind::Deselect => "deselect",
            EventKind::Open => "open",
            EventKind::Close => "close",
            EventKind::Validation => "validation",
        }
    }

    /// DOM event type used when the event is dispatched from a host element.
    pub fn dom_event_name(self) -> String {
        format!("er-{}", self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            ..Self::default()
        }
    }
}

/// Payload carried by every control notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ControlEvent {
    #[serde(skip)]
    pub kind: Option<EventKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<SelectOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub component: String,
    pub name: String,
}

impl ControlEvent {
    pub fn new(kind: EventKind, component: &str, name: &str) -> Self {
        Self {
            kind: Some(kind),
            value: None,
            values: None,
            previous_value: None,
            option: None,
            reason: None,
            component: component.to_owned(),
            name: name.to_owned(),
        }
    }

    pub fn kind(&self) -> Option<EventKind> {
        self.kind
    }

    pub fn with_value(mut self, value: serde_json::Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_values(mut self, values: Vec<String>) -> Self {
        self.values = Some(values);
        self
    }

    pub fn with_previous(mut self, previous: serde_json::Value) -> Self {
        self.previous_value = Some(previous);
        self
    }

    pub fn with_option(mut self, option: SelectOption) -> Self {
        self.option = Some(option);
        self
    }

    pub fn with_reason(mut self, reason: &str) -> Self {
        self.reason = Some(reason.to_owned());
        self
    }
}

// ── Authentication ──

/// Read-only view of the site's login state, owned by the external auth module.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthSnapshot {
    pub logged_in: bool,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub account_url: Option<String>,
    pub logout_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_url_appends_to_existing_query_string() {
        let q = PostsQuery::new(20, 10);
        assert_eq!(
            q.to_url("/wp-json/wp/v2/posts"),
            "/wp-json/wp/v2/posts?offset=20&per_page=10&_embed=1"
        );
        assert_eq!(
            q.to_url("/?rest_route=/wp/v2/posts"),
            "/?rest_route=/wp/v2/posts&offset=20&per_page=10&_embed=1"
        );
    }

    #[test]
    fn post_featured_media_reads_embedded_array() {
        let post: WpPost = serde_json::from_value(serde_json::json!({
            "id": 7,
            "title": { "rendered": "Radio" },
            "_embedded": { "wp:featuredmedia": [{ "source_url": "/a.jpg", "alt_text": "A" }] }
        }))
        .unwrap();
        assert_eq!(post.featured_media().map(|m| m.source_url.as_str()), Some("/a.jpg"));
    }

    #[test]
    fn event_payload_is_camel_case_without_empty_fields() {
        let ev = ControlEvent::new(EventKind::Change, "er-select", "color")
            .with_value(serde_json::json!("red"))
            .with_previous(serde_json::json!("blue"));
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "value": "red",
                "previousValue": "blue",
                "component": "er-select",
                "name": "color"
            })
        );
        assert_eq!(EventKind::Change.dom_event_name(), "er-change");
    }
}
