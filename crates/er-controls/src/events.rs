use er_api_types::{ControlEvent, EventKind};
use er_reactive::{HandlerRegistry, Value};
use serde_json::json;

use crate::machine::Effect;

/// The `value` field for a selection: a plain string for single-value
/// controls, a JSON array for multi-select.
pub fn selection_value(multi: bool, selected: &[String]) -> Value {
    if multi {
        Value::Json(json!(selected))
    } else {
        Value::String(selected.first().cloned().unwrap_or_default())
    }
}

/// Turn machine effects into event payloads. `selected` is the selection
/// after the operation.
pub fn from_effects(
    effects: Vec<Effect>,
    component: &str,
    name: &str,
    multi: bool,
    selected: &[String],
) -> Vec<ControlEvent> {
    effects
        .into_iter()
        .map(|effect| match effect {
            Effect::Opened => ControlEvent::new(EventKind::Open, component, name),
            Effect::Closed => ControlEvent::new(EventKind::Close, component, name),
            Effect::Selected(option) => ControlEvent::new(EventKind::Select, component, name)
                .with_value(json!(option.value))
                .with_option(option),
            Effect::Deselected(option) => ControlEvent::new(EventKind::Deselect, component, name)
                .with_value(json!(option.value))
                .with_option(option),
            Effect::SelectionChanged { previous } => {
                let event = ControlEvent::new(EventKind::Change, component, name)
                    .with_value(selection_value(multi, selected).to_json())
                    .with_previous(selection_value(multi, &previous).to_json());
                if multi {
                    event.with_values(selected.to_vec())
                } else {
                    event
                }
            }
            Effect::LimitReached { option, max } => {
                ControlEvent::new(EventKind::Validation, component, name)
                    .with_reason("max_selections")
                    .with_value(json!(max))
                    .with_option(option)
            }
        })
        .collect()
}

/// Run the `on-change` handler for every change event, if one is configured.
pub fn run_change_handler(registry: &HandlerRegistry, key: &str, events: &[ControlEvent]) {
    if key.is_empty() {
        return;
    }
    for event in events.iter().filter(|e| e.kind() == Some(EventKind::Change)) {
        registry.dispatch(key, event);
    }
}
