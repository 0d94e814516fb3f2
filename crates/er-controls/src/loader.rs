//! `<er-loader>` overlay.

use std::sync::LazyLock;

use er_reactive::{AttributeHost, Component, FieldDef, ReactiveElement, Schema, State, Value};
use tracing::warn;

static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::declare(vec![
        FieldDef::new("active", false).attr("active"),
        FieldDef::new("message", "").attr("message"),
    ])
    .expect("loader schema is valid")
});

pub struct Loader;

impl Component for Loader {
    const TAG: &'static str = "er-loader";

    fn schema() -> &'static Schema {
        &SCHEMA
    }

    fn render(&self, state: &State) -> String {
        er_templates::loading_overlay(state.flag("active"), state.str("message"))
    }
}

pub struct LoaderControl<H> {
    element: ReactiveElement<Loader, H>,
}

impl<H: AttributeHost> LoaderControl<H> {
    pub fn mount(host: H) -> Self {
        let mut element = ReactiveElement::construct(Loader, host);
        element.connect();
        Self { element }
    }

    pub fn element(&self) -> &ReactiveElement<Loader, H> {
        &self.element
    }

    pub fn markup(&self) -> &str {
        self.element.markup()
    }

    pub fn is_active(&self) -> bool {
        self.element.state().flag("active")
    }

    pub fn show(&mut self, message: &str) {
        self.update(true, message);
    }

    pub fn hide(&mut self) {
        self.update(false, "");
    }

    pub fn attribute_changed(&mut self, attribute: &str, raw: Option<&str>) -> bool {
        self.element.attribute_changed(attribute, raw)
    }

    fn update(&mut self, active: bool, message: &str) {
        let batch = [("active", Value::from(active)), ("message", Value::from(message))];
        if let Err(err) = self.element.set_state(batch) {
            warn!(tag = Loader::TAG, %err, "loader update rejected");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use er_reactive::MemoryHost;

    #[test]
    fn show_and_hide_toggle_the_overlay() {
        let mut loader = LoaderControl::mount(MemoryHost::new());
        assert_eq!(loader.markup(), "");

        loader.show("Loading posts…");
        assert!(loader.is_active());
        assert!(loader.markup().contains("Loading posts…"));
        assert_eq!(loader.element().host().attribute("active").as_deref(), Some(""));
        assert_eq!(loader.element().render_count(), 2);

        loader.hide();
        assert_eq!(loader.markup(), "");
        assert_eq!(loader.element().host().attribute("active"), None);
    }

    #[test]
    fn external_active_attribute_shows_it() {
        let mut loader = LoaderControl::mount(MemoryHost::new());
        assert!(loader.attribute_changed("active", Some("")));
        assert!(loader.markup().contains("er-loader__spinner"));
    }
}
