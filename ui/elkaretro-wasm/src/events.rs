//! Control notifications as DOM `CustomEvent`s.
//!
//! Each [`ControlEvent`] is dispatched from the control's host element as
//! `er-<kind>`, bubbling and composed so page scripts can listen anywhere
//! above it. The payload goes in `detail`.

use er_api_types::ControlEvent;
use serde::Serialize;
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CustomEvent, CustomEventInit, Element};

pub fn dispatch(el: &Element, event: &ControlEvent) {
    let Some(kind) = event.kind() else {
        return;
    };
    if let Err(err) = try_dispatch(el, &kind.dom_event_name(), event) {
        warn!(component = %event.component, ?err, "event dispatch failed");
    }
}

pub fn dispatch_all(el: &Element, events: &[ControlEvent]) {
    for event in events {
        dispatch(el, event);
    }
}

fn try_dispatch(el: &Element, name: &str, event: &ControlEvent) -> Result<(), JsValue> {
    let detail = event
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)?;
    let init = CustomEventInit::new();
    init.set_bubbles(true);
    init.set_composed(true);
    init.set_detail(&detail);
    let custom = CustomEvent::new_with_event_init_dict(name, &init)?;
    debug!(name, component = %event.component, field = %event.name, "dispatch");
    el.dispatch_event(&custom)?;
    Ok(())
}
