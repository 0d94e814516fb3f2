//! Page-wide state.
//!
//! `thread_local!` + `RefCell` storage, since WASM is single-threaded. Holds
//! the site config, the handler registry JS fills before `mount()`, the
//! mounted form fields descendants link to, and teardown hooks run on
//! `pagehide`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use er_controls::SharedField;
use er_reactive::HandlerRegistry;
use web_sys::Element;

use crate::config::SiteConfig;
use crate::host::DomHost;

thread_local! {
    static CONFIG: RefCell<Rc<SiteConfig>> = RefCell::new(Rc::new(SiteConfig::default()));
    static REGISTRY: RefCell<HandlerRegistry> = RefCell::new(HandlerRegistry::new());
    static FIELDS: RefCell<Vec<(Element, SharedField<DomHost>)>> = const { RefCell::new(Vec::new()) };
    static TEARDOWN: RefCell<Vec<Box<dyn FnOnce()>>> = const { RefCell::new(Vec::new()) };
    static NEXT_ID: Cell<u32> = const { Cell::new(0) };
    static MOUNTED: Cell<bool> = const { Cell::new(false) };
}

// ── Config ──

pub fn set_config(config: SiteConfig) {
    CONFIG.with(|c| *c.borrow_mut() = Rc::new(config));
}

pub fn config() -> Rc<SiteConfig> {
    CONFIG.with(|c| Rc::clone(&c.borrow()))
}

// ── Handler registry ──

pub fn with_registry<R>(f: impl FnOnce(&mut HandlerRegistry) -> R) -> R {
    REGISTRY.with(|r| f(&mut r.borrow_mut()))
}

/// Registry snapshot handed to controls at mount.
pub fn registry() -> Rc<HandlerRegistry> {
    REGISTRY.with(|r| Rc::new(r.borrow().clone()))
}

// ── Form fields ──

pub fn add_field(el: Element, field: SharedField<DomHost>) {
    FIELDS.with(|f| f.borrow_mut().push((el, field)));
}

pub fn field_for(el: &Element) -> Option<SharedField<DomHost>> {
    FIELDS.with(|f| {
        f.borrow()
            .iter()
            .find(|(host, _)| host == el)
            .map(|(_, field)| Rc::clone(field))
    })
}

// ── Lifecycle ──

/// `er-select-3` style ids for hosts without one.
pub fn next_id(prefix: &str) -> String {
    NEXT_ID.with(|n| {
        let id = n.get() + 1;
        n.set(id);
        format!("{prefix}-{id}")
    })
}

/// Marks the page as mounted. Returns false when it already was.
pub fn begin_mount() -> bool {
    MOUNTED.with(|m| !m.replace(true))
}

pub fn on_teardown(hook: impl FnOnce() + 'static) {
    TEARDOWN.with(|t| t.borrow_mut().push(Box::new(hook)));
}

/// Run every teardown hook once, newest first.
pub fn teardown() {
    let hooks = TEARDOWN.with(|t| std::mem::take(&mut *t.borrow_mut()));
    for hook in hooks.into_iter().rev() {
        hook();
    }
    FIELDS.with(|f| f.borrow_mut().clear());
    MOUNTED.with(|m| m.set(false));
}
