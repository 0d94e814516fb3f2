//! ElkaRetro browser frontend.
//!
//! `start` runs when the module is instantiated: panic hook, config, logging.
//! Page scripts then register their handlers and call [`mount`], which
//! attaches every control and blog listing found in the document.

pub mod api;
pub mod auth;
pub mod blog_page;
pub mod config;
pub mod controls;
pub mod dom;
pub mod events;
pub mod host;
pub mod logging;
pub mod state;

use er_api_types::{ControlEvent, SelectOption};
use js_sys::Function;
use serde::Serialize;
use tracing::{info, warn};
use wasm_bindgen::prelude::*;

use crate::config::SiteConfig;

/// WASM entry point, called automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let raw = config::read_config_block();
    let (config, parse_error) = SiteConfig::from_json_or_default(raw.as_deref());
    logging::init(&config.log_level);
    if let Some(err) = parse_error {
        warn!(%err, "site config is malformed, using defaults");
    }
    state::set_config(config);

    dom::on_page(&gloo_utils::window(), "pagehide", |_| {
        info!("page hidden, tearing down");
        state::teardown();
    })?;
    Ok(())
}

/// Attach controls and blog listings. Calling it again is a no-op until the
/// page has been torn down.
#[wasm_bindgen]
pub fn mount() -> Result<(), JsValue> {
    if !state::begin_mount() {
        return Ok(());
    }
    let registry = state::registry();
    let controls = controls::mount_all(&registry)?;
    let listings = blog_page::mount_all()?;
    info!(controls, listings, "mounted");
    Ok(())
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::NULL)
}

/// Register `handler(detail)` under `key` for controls carrying `on-change="key"`.
#[wasm_bindgen(js_name = registerHandler)]
pub fn register_handler(key: &str, handler: Function) {
    let name = key.to_owned();
    state::with_registry(|registry| {
        registry.register_handler(key, move |event: &ControlEvent| {
            if let Err(err) = handler.call1(&JsValue::NULL, &to_js(event)) {
                warn!(key = %name, ?err, "change handler threw");
            }
        })
    });
}

/// Register `matcher(option, query) -> bool` under `key` for selects carrying `filter="key"`.
#[wasm_bindgen(js_name = registerMatcher)]
pub fn register_matcher(key: &str, matcher: Function) {
    state::with_registry(|registry| {
        registry.register_matcher(key, move |option: &SelectOption, query: &str| {
            matcher
                .call2(&JsValue::NULL, &to_js(option), &JsValue::from_str(query))
                .map(|hit| hit.is_truthy())
                .unwrap_or(false)
        })
    });
}

#[wasm_bindgen(js_name = showLoader)]
pub fn show_loader(message: &str) {
    controls::set_loading(true, message);
}

#[wasm_bindgen(js_name = hideLoader)]
pub fn hide_loader() {
    controls::set_loading(false, "");
}
