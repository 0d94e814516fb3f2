//! Element attributes as an [`AttributeHost`], plus the observer that feeds
//! outside attribute changes back into a control.

use er_reactive::AttributeHost;
use js_sys::Array;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, MutationObserver, MutationObserverInit, MutationRecord};

#[derive(Debug, Clone)]
pub struct DomHost {
    el: Element,
}

impl DomHost {
    pub fn new(el: Element) -> Self {
        Self { el }
    }

    pub fn element(&self) -> &Element {
        &self.el
    }
}

impl AttributeHost for DomHost {
    fn attribute(&self, name: &str) -> Option<String> {
        self.el.get_attribute(name)
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        if let Err(err) = self.el.set_attribute(name, value) {
            tracing::warn!(name, ?err, "setAttribute failed");
        }
    }

    fn remove_attribute(&mut self, name: &str) {
        let _ = self.el.remove_attribute(name);
    }
}

/// Attribute observer; watching stops when it is dropped.
pub struct AttributeObserver {
    observer: MutationObserver,
    _callback: Closure<dyn FnMut(Array, MutationObserver)>,
}

impl Drop for AttributeObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Call `on_change(attribute, current_value)` whenever one of `names` changes on `el`.
///
/// Reflected writes come back through here too; the element's equality check
/// turns those into no-ops.
pub fn observe_attributes<F>(el: &Element, names: &[&str], mut on_change: F) -> Result<AttributeObserver, JsValue>
where
    F: FnMut(&str, Option<String>) + 'static,
{
    let target = el.clone();
    let callback = Closure::<dyn FnMut(Array, MutationObserver)>::new(move |records: Array, _| {
        for record in records.iter() {
            let Ok(record) = record.dyn_into::<MutationRecord>() else {
                continue;
            };
            if let Some(name) = record.attribute_name() {
                on_change(&name, target.get_attribute(&name));
            }
        }
    });
    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;

    let filter: Array = names.iter().map(|n| JsValue::from_str(n)).collect();
    let init = MutationObserverInit::new();
    init.set_attributes(true);
    init.set_attribute_filter(&filter);
    observer.observe_with_options(el, &init)?;
    Ok(AttributeObserver {
        observer,
        _callback: callback,
    })
}
