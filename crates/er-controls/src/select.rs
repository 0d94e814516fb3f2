//! `<er-select>` and `<er-multi-select>`.

use std::rc::Rc;
use std::sync::LazyLock;

use er_api_types::{ControlEvent, SelectOption};
use er_reactive::{
    AttributeHost, Component, FieldDef, FieldLink, HandlerRegistry, ReactiveElement, Schema, State,
    Value,
};
use er_templates::SelectView;
use serde_json::json;
use tracing::warn;

use crate::events;
use crate::keys::Key;
use crate::machine::{Effect, SelectMachine, SelectMode};

fn common_fields() -> Vec<FieldDef> {
    vec![
        FieldDef::new("name", "").attr("name"),
        FieldDef::new("label", "").attr("label"),
        FieldDef::new("placeholder", "Select…").attr("placeholder"),
        FieldDef::new("options", json!([])).attr("options"),
        FieldDef::new("disabled", false).attr("disabled"),
        FieldDef::new("searchable", false).attr("searchable"),
        FieldDef::new("required", false).attr("required"),
        FieldDef::new("filter", "").observed_attr("filter"),
        FieldDef::new("on_change", "").observed_attr("on-change"),
        FieldDef::new("open", false).attr("open").internal(),
        FieldDef::new("query", "").internal(),
        FieldDef::new("highlighted", -1.0).internal(),
    ]
}

static SINGLE_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    let mut fields = common_fields();
    fields.push(FieldDef::new("value", "").attr("value"));
    Schema::declare(fields).expect("select schema is valid")
});

static MULTI_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    let mut fields = common_fields();
    fields.push(FieldDef::new("value", json!([])).attr("value"));
    fields.push(FieldDef::new("max", 0.0).attr("max-selections"));
    fields.push(FieldDef::new("select_all", false).attr("select-all"));
    Schema::declare(fields).expect("multi-select schema is valid")
});

/// Options come from a JSON array of option objects or plain strings.
/// Anything else is treated as an empty list.
pub fn parse_options(json: Option<&serde_json::Value>) -> Vec<SelectOption> {
    let Some(serde_json::Value::Array(items)) = json else {
        if json.is_some_and(|j| !j.is_null()) {
            warn!("select options are not an array, ignoring");
        }
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            serde_json::Value::String(s) => Some(SelectOption::new(s.as_str(), s.as_str())),
            other => match serde_json::from_value::<SelectOption>(other.clone()) {
                Ok(option) => Some(option),
                Err(err) => {
                    warn!(%err, "skipping malformed select option");
                    None
                }
            },
        })
        .collect()
}

/// Selected values held by a `value` field of either shape.
pub fn selection_from(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
        Some(Value::Json(serde_json::Value::Array(items))) => items
            .iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Some(Value::Json(serde_json::Value::String(s))) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

pub struct SelectWidget<const MULTI: bool> {
    id: String,
    machine: SelectMachine,
    registry: Rc<HandlerRegistry>,
}

pub type SingleSelect = SelectWidget<false>;
pub type MultiSelect = SelectWidget<true>;

impl<const MULTI: bool> SelectWidget<MULTI> {
    pub fn new(id: &str, registry: Rc<HandlerRegistry>) -> Self {
        let mode = if MULTI { SelectMode::Multi } else { SelectMode::Single };
        Self {
            id: id.to_owned(),
            machine: SelectMachine::new(mode),
            registry,
        }
    }

    pub fn machine(&self) -> &SelectMachine {
        &self.machine
    }

    fn sync_from(&mut self, key: &str, state: &State) {
        match key {
            "options" => self.machine.set_options(parse_options(state.json("options"))),
            "value" => self.machine.set_selection(selection_from(state.get("value"))),
            "max" => self.machine.set_max(state.number("max").max(0.0) as usize),
            "filter" => {
                let key = state.str("filter");
                let matcher = if key.is_empty() { None } else { self.registry.matcher(key) };
                self.machine.set_matcher(matcher);
            }
            _ => {}
        }
    }

    fn render_view(&self, state: &State) -> String {
        let selected = selection_from(state.get("value"));
        let highlighted = state.number("highlighted");
        er_templates::select(&SelectView {
            id: &self.id,
            name: state.str("name"),
            label: state.str("label"),
            placeholder: state.str("placeholder"),
            options: self.machine.options(),
            filtered: self.machine.filtered(),
            selected: &selected,
            open: state.flag("open"),
            query: state.str("query"),
            highlighted: (highlighted >= 0.0).then_some(highlighted as usize),
            searchable: state.flag("searchable"),
            multiple: MULTI,
            disabled: state.flag("disabled"),
            show_select_all: state.flag("select_all"),
        })
    }
}

impl Component for SelectWidget<false> {
    const TAG: &'static str = "er-select";

    fn schema() -> &'static Schema {
        &SINGLE_SCHEMA
    }

    fn render(&self, state: &State) -> String {
        self.render_view(state)
    }

    fn state_changed(&mut self, key: &str, state: &State) {
        self.sync_from(key, state);
    }
}

impl Component for SelectWidget<true> {
    const TAG: &'static str = "er-multi-select";

    fn schema() -> &'static Schema {
        &MULTI_SCHEMA
    }

    fn render(&self, state: &State) -> String {
        self.render_view(state)
    }

    fn state_changed(&mut self, key: &str, state: &State) {
        self.sync_from(key, state);
    }
}

/// A mounted select: the reactive element plus the interaction operations.
pub struct SelectControl<const MULTI: bool, H> {
    element: ReactiveElement<SelectWidget<MULTI>, H>,
}

impl<const MULTI: bool, H> SelectControl<MULTI, H>
where
    SelectWidget<MULTI>: Component,
    H: AttributeHost,
{
    pub fn mount(id: &str, host: H, registry: Rc<HandlerRegistry>) -> Self {
        let mut element = ReactiveElement::construct(SelectWidget::new(id, registry), host);
        let state = element.state().clone();
        for key in ["options", "value", "max", "filter"] {
            element.component_mut().sync_from(key, &state);
        }
        element.connect();
        Self { element }
    }

    pub fn element(&self) -> &ReactiveElement<SelectWidget<MULTI>, H> {
        &self.element
    }

    pub fn element_mut(&mut self) -> &mut ReactiveElement<SelectWidget<MULTI>, H> {
        &mut self.element
    }

    pub fn markup(&self) -> &str {
        self.element.markup()
    }

    pub fn machine(&self) -> &SelectMachine {
        self.element.component().machine()
    }

    pub fn value(&self) -> Option<Value> {
        self.element.get("value")
    }

    pub fn selected(&self) -> Vec<String> {
        selection_from(self.value().as_ref())
    }

    /// Delegate `value` to an ancestor form field.
    pub fn link(&mut self, link: FieldLink) -> Result<(), er_reactive::ConfigurationError> {
        self.element.link_field("value", link)?;
        self.sync();
        self.element.render();
        Ok(())
    }

    pub fn unlink(&mut self) {
        self.element.unlink();
    }

    pub fn open(&mut self) -> Vec<ControlEvent> {
        if self.disabled() {
            return Vec::new();
        }
        self.run(|m| m.open())
    }

    pub fn close(&mut self) -> Vec<ControlEvent> {
        self.run(|m| m.close())
    }

    pub fn toggle_open(&mut self) -> Vec<ControlEvent> {
        if self.disabled() {
            return Vec::new();
        }
        self.run(|m| m.toggle_open())
    }

    pub fn outside_pointer_down(&mut self) -> Vec<ControlEvent> {
        self.run(|m| m.outside_pointer_down())
    }

    pub fn key(&mut self, key: Key) -> Vec<ControlEvent> {
        if self.disabled() {
            return Vec::new();
        }
        self.run(|m| m.key(key))
    }

    pub fn set_query(&mut self, query: &str) -> Vec<ControlEvent> {
        if self.disabled() {
            return Vec::new();
        }
        self.run(|m| m.set_query(query))
    }

    pub fn choose(&mut self, value: &str) -> Vec<ControlEvent> {
        if self.disabled() {
            return Vec::new();
        }
        self.run(|m| m.choose(value))
    }

    pub fn highlight(&mut self, position: usize) -> Vec<ControlEvent> {
        self.run(|m| {
            m.highlight(position);
            Vec::new()
        })
    }

    pub fn select_all(&mut self) -> Vec<ControlEvent> {
        if self.disabled() {
            return Vec::new();
        }
        self.run(|m| m.select_all())
    }

    pub fn remove(&mut self, value: &str) -> Vec<ControlEvent> {
        if self.disabled() {
            return Vec::new();
        }
        self.run(|m| m.remove(value))
    }

    pub fn remove_chip(&mut self, label: &str) -> Vec<ControlEvent> {
        if self.disabled() {
            return Vec::new();
        }
        self.run(|m| m.remove_chip(label))
    }

    pub fn attribute_changed(&mut self, attribute: &str, raw: Option<&str>) -> bool {
        let changed = self.element.attribute_changed(attribute, raw);
        if changed {
            self.run(|_| Vec::new());
        }
        changed
    }

    fn disabled(&self) -> bool {
        self.element.state().flag("disabled")
    }

    /// Pull the current value (possibly from the ancestor) into the machine.
    fn sync(&mut self) {
        let selection = selection_from(self.element.get("value").as_ref());
        let machine = &mut self.element.component_mut().machine;
        machine.set_selection(selection);
        machine.refilter();
    }

    fn run<F>(&mut self, op: F) -> Vec<ControlEvent>
    where
        F: FnOnce(&mut SelectMachine) -> Vec<Effect>,
    {
        self.sync();
        let effects = op(&mut self.element.component_mut().machine);

        let machine = self.element.component().machine();
        let mut batch: Vec<(&str, Value)> = vec![
            ("open", Value::from(machine.is_open())),
            ("query", Value::from(machine.query())),
            (
                "highlighted",
                Value::from(machine.highlighted().map(|h| h as f64).unwrap_or(-1.0)),
            ),
        ];
        let selection_changed = effects
            .iter()
            .any(|e| matches!(e, Effect::SelectionChanged { .. }));
        if selection_changed {
            batch.push(("value", events::selection_value(MULTI, machine.selected())));
        }

        if let Err(err) = self.element.set_state(batch) {
            warn!(tag = SelectWidget::<MULTI>::TAG, %err, "select state update rejected");
        }

        let tag = SelectWidget::<MULTI>::TAG;
        let state = self.element.state();
        let widget = self.element.component();
        let emitted =
            events::from_effects(effects, tag, state.str("name"), MULTI, widget.machine.selected());
        events::run_change_handler(&widget.registry, state.str("on_change"), &emitted);
        emitted
    }
}
