//! Named SVG icons and the `<er-icon>` element.

use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::LazyLock;

use er_reactive::{Component, FieldDef, Schema, State};
use tracing::warn;

const SVG_OPEN: &str = r#"<svg viewBox="0 0 24 24" width="100%" height="100%" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round" focusable="false">"#;

const BUILTIN: &[(&str, &str)] = &[
    ("chevron-down", r#"<path d="M6 9l6 6 6-6"/>"#),
    ("close", r#"<path d="M18 6L6 18M6 6l12 12"/>"#),
    ("check", r#"<path d="M20 6L9 17l-5-5"/>"#),
    ("search", r#"<circle cx="11" cy="11" r="7"/><path d="M21 21l-4.35-4.35"/>"#),
    ("user", r#"<circle cx="12" cy="8" r="4"/><path d="M4 21a8 8 0 0 1 16 0"/>"#),
    (
        "cart",
        r#"<circle cx="9" cy="20" r="1.5"/><circle cx="18" cy="20" r="1.5"/><path d="M2 3h3l2.7 12.4a2 2 0 0 0 2 1.6h7.6a2 2 0 0 0 2-1.6L21 7H6"/>"#,
    ),
    ("spinner", r#"<path d="M12 3a9 9 0 1 0 9 9"/>"#),
];

/// Icon name to SVG markup. Content is trusted and inserted unescaped.
#[derive(Debug, Clone)]
pub struct IconRegistry {
    icons: BTreeMap<String, String>,
}

impl Default for IconRegistry {
    fn default() -> Self {
        let icons = BUILTIN
            .iter()
            .map(|(name, body)| ((*name).to_owned(), format!("{SVG_OPEN}{body}</svg>")))
            .collect();
        Self { icons }
    }
}

impl IconRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-ins with `overrides` merged on top.
    pub fn with_overrides<I, K, V>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut registry = Self::default();
        for (name, svg) in overrides {
            registry.register(name, svg);
        }
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, svg: impl Into<String>) {
        self.icons.insert(name.into(), svg.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.icons.get(name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.icons.keys().map(String::as_str)
    }

    /// Markup for `name`, or nothing (with a warning) when it is unknown.
    pub fn render(&self, name: &str, label: &str, size: f64) -> String {
        match self.get(name) {
            Some(svg) => er_templates::icon(svg, label, size),
            None => {
                if !name.is_empty() {
                    warn!(icon = name, "unknown icon");
                }
                String::new()
            }
        }
    }
}

static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::declare(vec![
        FieldDef::new("name", "").attr("name"),
        FieldDef::new("label", "").attr("label"),
        FieldDef::new("size", 0.0).attr("size"),
    ])
    .expect("icon schema is valid")
});

pub struct Icon {
    registry: Rc<IconRegistry>,
}

impl Icon {
    pub fn new(registry: Rc<IconRegistry>) -> Self {
        Self { registry }
    }
}

impl Component for Icon {
    const TAG: &'static str = "er-icon";

    fn schema() -> &'static Schema {
        &SCHEMA
    }

    fn render(&self, state: &State) -> String {
        self.registry
            .render(state.str("name"), state.str("label"), state.number("size"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use er_reactive::{MemoryHost, ReactiveElement};

    #[test]
    fn builtins_are_present() {
        let registry = IconRegistry::new();
        for name in ["chevron-down", "close", "check", "search", "user", "cart", "spinner"] {
            assert!(registry.get(name).is_some_and(|svg| svg.starts_with("<svg")), "{name}");
        }
    }

    #[test]
    fn overrides_replace_builtins() {
        let registry = IconRegistry::with_overrides([("cart", "<svg>bag</svg>"), ("tape", "<svg>t</svg>")]);
        assert_eq!(registry.get("cart"), Some("<svg>bag</svg>"));
        assert_eq!(registry.get("tape"), Some("<svg>t</svg>"));
    }

    #[test]
    fn element_renders_labelled_or_hidden() {
        let registry = Rc::new(IconRegistry::new());
        let host = MemoryHost::new().with("name", "search").with("label", "Find <radios>");
        let mut el = ReactiveElement::construct(Icon::new(registry.clone()), host);
        let html = el.connect().to_owned();
        assert!(html.contains(r#"aria-label="Find &lt;radios&gt;""#));

        let mut hidden = ReactiveElement::construct(Icon::new(registry.clone()), MemoryHost::new().with("name", "user"));
        assert!(hidden.connect().contains(r#"aria-hidden="true""#));

        let mut unknown = ReactiveElement::construct(Icon::new(registry), MemoryHost::new().with("name", "nope"));
        assert_eq!(unknown.connect(), "");
    }
}
