//! Named handlers that markup can refer to by key.
//!
//! A control carrying `on-change="cart.update"` looks the key up here instead
//! of walking global objects by dotted path.

use std::collections::HashMap;
use std::rc::Rc;

use er_api_types::{ControlEvent, SelectOption};
use tracing::warn;

pub type Handler = Rc<dyn Fn(&ControlEvent)>;
pub type Matcher = Rc<dyn Fn(&SelectOption, &str) -> bool>;

#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Handler>,
    matchers: HashMap<String, Matcher>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_handler<F>(&mut self, key: &str, handler: F)
    where
        F: Fn(&ControlEvent) + 'static,
    {
        self.handlers.insert(key.to_owned(), Rc::new(handler));
    }

    pub fn register_matcher<F>(&mut self, key: &str, matcher: F)
    where
        F: Fn(&SelectOption, &str) -> bool + 'static,
    {
        self.matchers.insert(key.to_owned(), Rc::new(matcher));
    }

    pub fn handler(&self, key: &str) -> Option<Handler> {
        let found = self.handlers.get(key).cloned();
        if found.is_none() {
            warn!(key, "no handler registered");
        }
        found
    }

    pub fn matcher(&self, key: &str) -> Option<Matcher> {
        let found = self.matchers.get(key).cloned();
        if found.is_none() {
            warn!(key, "no matcher registered");
        }
        found
    }

    /// Call the handler registered under `key`. Returns whether one ran.
    pub fn dispatch(&self, key: &str, event: &ControlEvent) -> bool {
        match self.handler(key) {
            Some(handler) => {
                handler(event);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use er_api_types::EventKind;
    use std::cell::Cell;

    #[test]
    fn dispatches_by_key_and_ignores_unknown() {
        let calls = Rc::new(Cell::new(0));
        let mut registry = HandlerRegistry::new();
        let seen = calls.clone();
        registry.register_handler("cart.update", move |ev| {
            assert_eq!(ev.name, "qty");
            seen.set(seen.get() + 1);
        });

        let ev = ControlEvent::new(EventKind::Change, "er-text-input", "qty");
        assert!(registry.dispatch("cart.update", &ev));
        assert!(!registry.dispatch("cart.remove", &ev));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn matchers_are_looked_up_by_key() {
        let mut registry = HandlerRegistry::new();
        registry.register_matcher("prefix", |opt, q| opt.label.starts_with(q));
        let matcher = registry.matcher("prefix").unwrap();
        assert!(matcher(&SelectOption::new("1", "Sony"), "So"));
        assert!(!matcher(&SelectOption::new("1", "Sony"), "ny"));
        assert!(registry.matcher("missing").is_none());
    }
}
