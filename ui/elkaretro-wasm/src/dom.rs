//! DOM helpers shared by the mount modules.

use js_sys::Array;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlElement, HtmlInputElement, NodeList, ShadowRoot, ShadowRootInit,
    ShadowRootMode,
};

use crate::state;

pub fn document() -> Document {
    gloo_utils::document()
}

/// Every element in the document matching `selector`.
pub fn query_all(selector: &str) -> Vec<Element> {
    match document().query_selector_all(selector) {
        Ok(list) => elements(&list),
        Err(_) => Vec::new(),
    }
}

fn elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// The element's open shadow root, attached on first use.
pub fn shadow_root(el: &Element) -> Result<ShadowRoot, JsValue> {
    if let Some(root) = el.shadow_root() {
        return Ok(root);
    }
    el.attach_shadow(&ShadowRootInit::new(ShadowRootMode::Open))
}

/// An event listener that stays registered until it is dropped.
pub struct Listener {
    target: EventTarget,
    name: String,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub fn new<F>(target: &EventTarget, name: &str, handler: F) -> Result<Self, JsValue>
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        target.add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            name: name.to_owned(),
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(&self.name, self.callback.as_ref().unchecked_ref());
    }
}

/// Listen for `name` on `target` until the page is torn down.
pub fn on<F>(target: &EventTarget, name: &str, handler: F) -> Result<(), JsValue>
where
    F: FnMut(Event) + 'static,
{
    let listener = Listener::new(target, name, handler)?;
    state::on_teardown(move || drop(listener));
    Ok(())
}

/// Listen for `name` on `target` for the lifetime of the page, across teardowns.
pub fn on_page<F>(target: &EventTarget, name: &str, handler: F) -> Result<(), JsValue>
where
    F: FnMut(Event) + 'static,
{
    std::mem::forget(Listener::new(target, name, handler)?);
    Ok(())
}

/// Innermost element the event started on, looking through shadow roots.
pub fn event_element(event: &Event) -> Option<Element> {
    event
        .composed_path()
        .iter()
        .find_map(|node| node.dyn_into::<Element>().ok())
}

/// `attr` of the closest ancestor (or self) matching `selector`.
pub fn closest_attr(el: &Element, selector: &str, attr: &str) -> Option<String> {
    el.closest(selector).ok().flatten()?.get_attribute(attr)
}

/// Whether `el` is on the event's composed path.
pub fn path_contains(event: &Event, el: &Element) -> bool {
    let path: Array = event.composed_path();
    path.includes(el, 0)
}

/// Put focus back into a re-rendered input, caret at the end.
pub fn refocus_input(root: &ShadowRoot, selector: &str) {
    let Ok(Some(el)) = root.query_selector(selector) else {
        return;
    };
    if let Ok(input) = el.dyn_into::<HtmlInputElement>() {
        let _ = input.focus();
        let end = input.value().encode_utf16().count() as u32;
        let _ = input.set_selection_range(end, end);
    }
}

pub fn focus(root: &ShadowRoot, selector: &str) {
    if let Ok(Some(el)) = root.query_selector(selector) {
        if let Ok(el) = el.dyn_into::<HtmlElement>() {
            let _ = el.focus();
        }
    }
}
