//! Login state from the site's auth module.
//!
//! The module publishes `window.elkaretroAuth` with `snapshot()` returning
//! `{ loggedIn, displayName, avatarUrl, accountUrl, logoutUrl }` and, when it
//! can push, `subscribe(callback)` returning an unsubscribe function.

use er_api_types::AuthSnapshot;
use er_controls::{AuthSource, Subscription};
use js_sys::{Function, Reflect};
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

pub const AUTH_GLOBAL: &str = "elkaretroAuth";

#[derive(Debug, Default, Clone, Copy)]
pub struct WindowAuth;

impl WindowAuth {
    fn module() -> Option<JsValue> {
        Reflect::get(&gloo_utils::window(), &JsValue::from_str(AUTH_GLOBAL))
            .ok()
            .filter(JsValue::is_object)
    }

    fn method(module: &JsValue, name: &str) -> Option<Function> {
        Reflect::get(module, &JsValue::from_str(name))
            .ok()?
            .dyn_into::<Function>()
            .ok()
    }
}

fn parse(value: JsValue) -> Option<AuthSnapshot> {
    match serde_wasm_bindgen::from_value(value) {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            warn!(%err, "auth snapshot has an unexpected shape");
            None
        }
    }
}

impl AuthSource for WindowAuth {
    /// Logged out when the module is missing or misbehaves.
    fn snapshot(&self) -> AuthSnapshot {
        let Some(module) = Self::module() else {
            return AuthSnapshot::default();
        };
        let Some(snapshot) = Self::method(&module, "snapshot") else {
            return AuthSnapshot::default();
        };
        match snapshot.call0(&module) {
            Ok(value) => parse(value).unwrap_or_default(),
            Err(err) => {
                warn!(?err, "auth snapshot() threw");
                AuthSnapshot::default()
            }
        }
    }

    fn subscribe(&self, callback: Box<dyn Fn(AuthSnapshot)>) -> Option<Subscription> {
        let module = Self::module()?;
        let subscribe = Self::method(&module, "subscribe")?;
        let cb = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
            if let Some(snapshot) = parse(value) {
                callback(snapshot);
            }
        });
        let unsubscribe = match subscribe.call1(&module, cb.as_ref()) {
            Ok(unsubscribe) => unsubscribe,
            Err(err) => {
                warn!(?err, "auth subscribe() threw, falling back to polling");
                return None;
            }
        };
        debug!("subscribed to auth updates");
        Some(Subscription::new(move || {
            if let Ok(unsubscribe) = unsubscribe.dyn_into::<Function>() {
                let _ = unsubscribe.call0(&JsValue::NULL);
            }
            drop(cb);
        }))
    }
}
