//! `<er-text-input>`.

use std::rc::Rc;
use std::sync::LazyLock;

use er_api_types::{ControlEvent, EventKind};
use er_reactive::{
    AttributeHost, Component, ConfigurationError, FieldDef, FieldLink, HandlerRegistry,
    ReactiveElement, Schema, State, Value,
};
use er_templates::TextInputView;
use serde_json::json;
use tracing::warn;

use crate::events;

pub const REQUIRED_MESSAGE: &str = "This field is required.";

static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::declare(vec![
        FieldDef::new("name", "").attr("name"),
        FieldDef::new("label", "").attr("label"),
        FieldDef::new("value", "").attr("value"),
        FieldDef::new("placeholder", "").attr("placeholder"),
        FieldDef::new("input_type", "text").attr("type"),
        FieldDef::new("required", false).attr("required"),
        FieldDef::new("disabled", false).attr("disabled"),
        FieldDef::new("max_length", 0.0).attr("maxlength"),
        FieldDef::new("error", "").attr("error"),
        FieldDef::new("on_change", "").observed_attr("on-change"),
    ])
    .expect("text input schema is valid")
});

pub struct TextInput {
    id: String,
    /// Value at the last `change`, reported as `previousValue`.
    committed: String,
    registry: Rc<HandlerRegistry>,
}

impl Component for TextInput {
    const TAG: &'static str = "er-text-input";

    fn schema() -> &'static Schema {
        &SCHEMA
    }

    fn render(&self, state: &State) -> String {
        let max = state.number("max_length");
        er_templates::text_input(&TextInputView {
            id: &self.id,
            name: state.str("name"),
            label: state.str("label"),
            value: state.str("value"),
            placeholder: state.str("placeholder"),
            input_type: state.str("input_type"),
            required: state.flag("required"),
            disabled: state.flag("disabled"),
            max_length: (max >= 1.0).then_some(max as usize),
            error: state.str("error"),
        })
    }
}

pub struct TextInputControl<H> {
    element: ReactiveElement<TextInput, H>,
}

impl<H: AttributeHost> TextInputControl<H> {
    pub fn mount(id: &str, host: H, registry: Rc<HandlerRegistry>) -> Self {
        let input = TextInput {
            id: id.to_owned(),
            committed: String::new(),
            registry,
        };
        let mut element = ReactiveElement::construct(input, host);
        element.component_mut().committed = element.state().str("value").to_owned();
        element.connect();
        Self { element }
    }

    pub fn element(&self) -> &ReactiveElement<TextInput, H> {
        &self.element
    }

    pub fn markup(&self) -> &str {
        self.element.markup()
    }

    pub fn value(&self) -> String {
        self.element
            .get("value")
            .and_then(|v| v.as_str().map(str::to_owned))
            .unwrap_or_default()
    }

    pub fn link(&mut self, link: FieldLink) -> Result<(), ConfigurationError> {
        self.element.link_field("value", link)?;
        self.element.component_mut().committed = self.value();
        self.element.render();
        Ok(())
    }

    pub fn unlink(&mut self) {
        self.element.unlink();
    }

    pub fn attribute_changed(&mut self, attribute: &str, raw: Option<&str>) -> bool {
        self.element.attribute_changed(attribute, raw)
    }

    fn max_length(&self) -> Option<usize> {
        let max = self.element.state().number("max_length");
        (max >= 1.0).then_some(max as usize)
    }

    fn event(&self, kind: EventKind) -> ControlEvent {
        ControlEvent::new(kind, TextInput::TAG, self.element.state().str("name"))
    }

    /// Keystroke-level edit. Text past `maxlength` characters is cut off.
    pub fn input(&mut self, text: &str) -> Vec<ControlEvent> {
        if self.element.state().flag("disabled") {
            return Vec::new();
        }
        let mut emitted = Vec::new();
        let mut text = text.to_owned();
        if let Some(max) = self.max_length() {
            if text.chars().count() > max {
                text = text.chars().take(max).collect();
                emitted.push(
                    self.event(EventKind::Validation)
                        .with_reason("max_length")
                        .with_value(json!(max)),
                );
            }
        }

        let previous = self.value();
        if previous == text {
            return emitted;
        }
        if let Err(err) = self.element.set_state([("value", Value::from(text.as_str()))]) {
            warn!(tag = TextInput::TAG, %err, "text input update rejected");
            return emitted;
        }
        emitted.push(
            self.event(EventKind::Input)
                .with_value(json!(text))
                .with_previous(json!(previous)),
        );
        emitted
    }

    /// Commit (blur or Enter). Emits `change` when the value moved since the
    /// last commit, then validates.
    pub fn change(&mut self) -> Vec<ControlEvent> {
        let value = self.value();
        let mut emitted = Vec::new();
        if value != self.element.component().committed {
            let previous = std::mem::replace(&mut self.element.component_mut().committed, value.clone());
            emitted.push(
                self.event(EventKind::Change)
                    .with_value(json!(value))
                    .with_previous(json!(previous)),
            );
            let input = self.element.component();
            events::run_change_handler(&input.registry, self.element.state().str("on_change"), &emitted);
        }
        emitted.extend(self.validate());
        emitted
    }

    /// Check `required`. Sets or clears the error message.
    pub fn validate(&mut self) -> Option<ControlEvent> {
        let missing = self.element.state().flag("required") && self.value().trim().is_empty();
        let message = if missing { REQUIRED_MESSAGE } else { "" };
        if let Err(err) = self.element.set_state([("error", Value::from(message))]) {
            warn!(tag = TextInput::TAG, %err, "text input error update rejected");
        }
        missing.then(|| self.event(EventKind::Validation).with_reason("required"))
    }
}
