//! `<er-toggle>`: a segmented single choice.
//!
//! Shares the selection rules of the single select but never opens a menu.
//! Arrow keys move focus between enabled segments and commit as they go,
//! like a native radio group.

use std::rc::Rc;
use std::sync::LazyLock;

use er_api_types::ControlEvent;
use er_reactive::{
    AttributeHost, Component, ConfigurationError, FieldDef, FieldLink, HandlerRegistry,
    ReactiveElement, Schema, State, Value,
};
use er_templates::ToggleView;
use serde_json::json;
use tracing::warn;

use crate::events;
use crate::keys::Key;
use crate::machine::{Effect, SelectMachine, SelectMode};
use crate::select::{parse_options, selection_from};

static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::declare(vec![
        FieldDef::new("name", "").attr("name"),
        FieldDef::new("label", "").attr("label"),
        FieldDef::new("options", json!([])).attr("options"),
        FieldDef::new("value", "").attr("value"),
        FieldDef::new("disabled", false).attr("disabled"),
        FieldDef::new("on_change", "").observed_attr("on-change"),
        FieldDef::new("focused", -1.0).internal(),
    ])
    .expect("toggle schema is valid")
});

pub struct SegmentedToggle {
    machine: SelectMachine,
    registry: Rc<HandlerRegistry>,
}

impl SegmentedToggle {
    pub fn new(registry: Rc<HandlerRegistry>) -> Self {
        Self {
            machine: SelectMachine::new(SelectMode::Single),
            registry,
        }
    }

    pub fn machine(&self) -> &SelectMachine {
        &self.machine
    }
}

impl Component for SegmentedToggle {
    const TAG: &'static str = "er-toggle";

    fn schema() -> &'static Schema {
        &SCHEMA
    }

    fn render(&self, state: &State) -> String {
        let focused = state.number("focused");
        er_templates::toggle(&ToggleView {
            name: state.str("name"),
            label: state.str("label"),
            options: self.machine.options(),
            selected: state.str("value"),
            focused: (focused >= 0.0).then_some(focused as usize),
            disabled: state.flag("disabled"),
        })
    }

    fn state_changed(&mut self, key: &str, state: &State) {
        match key {
            "options" => self.machine.set_options(parse_options(state.json("options"))),
            "value" => self.machine.set_selection(selection_from(state.get("value"))),
            _ => {}
        }
    }
}

pub struct ToggleControl<H> {
    element: ReactiveElement<SegmentedToggle, H>,
}

impl<H: AttributeHost> ToggleControl<H> {
    pub fn mount(host: H, registry: Rc<HandlerRegistry>) -> Self {
        let mut element = ReactiveElement::construct(SegmentedToggle::new(registry), host);
        let state = element.state().clone();
        element.component_mut().state_changed("options", &state);
        element.component_mut().state_changed("value", &state);
        element.connect();
        Self { element }
    }

    pub fn element(&self) -> &ReactiveElement<SegmentedToggle, H> {
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

    pub fn focused(&self) -> Option<usize> {
        let focused = self.element.state().number("focused");
        (focused >= 0.0).then_some(focused as usize)
    }

    pub fn link(&mut self, link: FieldLink) -> Result<(), ConfigurationError> {
        self.element.link_field("value", link)?;
        self.element.render();
        Ok(())
    }

    pub fn unlink(&mut self) {
        self.element.unlink();
    }

    pub fn attribute_changed(&mut self, attribute: &str, raw: Option<&str>) -> bool {
        self.element.attribute_changed(attribute, raw)
    }

    pub fn choose(&mut self, value: &str) -> Vec<ControlEvent> {
        if self.element.state().flag("disabled") {
            return Vec::new();
        }
        let position = self.machine().options().iter().position(|o| o.value == value);
        self.run(position, |m| m.choose(value))
    }

    /// Arrow keys move to the next enabled segment (wrapping) and select it.
    pub fn key(&mut self, key: Key) -> Vec<ControlEvent> {
        if self.element.state().flag("disabled") {
            return Vec::new();
        }
        let target = match key {
            Key::ArrowRight | Key::ArrowDown => self.step(1),
            Key::ArrowLeft | Key::ArrowUp => self.step(-1),
            Key::Home => self.enabled().first().copied(),
            Key::End => self.enabled().last().copied(),
            Key::Enter | Key::Space => self.focused(),
            _ => None,
        };
        let Some(position) = target else {
            return Vec::new();
        };
        let Some(value) = self.machine().options().get(position).map(|o| o.value.clone()) else {
            return Vec::new();
        };
        self.run(Some(position), |m| m.choose(&value))
    }

    fn machine(&self) -> &SelectMachine {
        self.element.component().machine()
    }

    fn enabled(&self) -> Vec<usize> {
        self.machine()
            .options()
            .iter()
            .enumerate()
            .filter(|(_, o)| !o.disabled)
            .map(|(idx, _)| idx)
            .collect()
    }

    fn step(&self, delta: isize) -> Option<usize> {
        let enabled = self.enabled();
        if enabled.is_empty() {
            return None;
        }
        let current = self.value();
        let anchor = self
            .focused()
            .or_else(|| self.machine().options().iter().position(|o| o.value == current));
        let next = match anchor.and_then(|a| enabled.iter().position(|&idx| idx == a)) {
            Some(pos) => (pos as isize + delta).rem_euclid(enabled.len() as isize) as usize,
            None if delta < 0 => enabled.len() - 1,
            None => 0,
        };
        enabled.get(next).copied()
    }

    fn run<F>(&mut self, focus: Option<usize>, op: F) -> Vec<ControlEvent>
    where
        F: FnOnce(&mut SelectMachine) -> Vec<Effect>,
    {
        let selection = selection_from(self.element.get("value").as_ref());
        let effects = {
            let machine = &mut self.element.component_mut().machine;
            machine.set_selection(selection);
            op(machine)
        };

        let mut batch = vec![(
            "focused",
            Value::from(focus.map(|f| f as f64).unwrap_or(-1.0)),
        )];
        if effects.iter().any(|e| matches!(e, Effect::SelectionChanged { .. })) {
            let selected = self.machine().selected();
            batch.push(("value", events::selection_value(false, selected)));
        }
        if let Err(err) = self.element.set_state(batch) {
            warn!(tag = SegmentedToggle::TAG, %err, "toggle state update rejected");
        }

        let state = self.element.state();
        let toggle = self.element.component();
        let emitted = events::from_effects(
            effects,
            SegmentedToggle::TAG,
            state.str("name"),
            false,
            toggle.machine.selected(),
        );
        events::run_change_handler(&toggle.registry, state.str("on_change"), &emitted);
        emitted
    }
}
