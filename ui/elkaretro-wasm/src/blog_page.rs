//! Blog listing mount.
//!
//! Markup contract: an element carrying `data-er-blog` (optionally with
//! `data-endpoint` / `data-per-page`) that contains a `[data-er-results]`
//! list. A status slot and the scroll sentinel are appended after the list.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use er_blog::{BlogController, LoadMode, Messages, PostCard, ResultsModel, ResultsView, ViewportWatcher, load};
use js_sys::Array;
use tracing::{debug, info};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use crate::api::WpSource;
use crate::config::BlogConfig;
use crate::dom;
use crate::state;

pub const BLOG_SELECTOR: &str = "[data-er-blog]";
pub const RESULTS_SELECTOR: &str = "[data-er-results]";

// ── Results view ──

/// Writes the listing into the page, keeping a [`ResultsModel`] of what it shows.
pub struct DomResults {
    model: ResultsModel,
    list: Element,
    status: Element,
}

impl DomResults {
    fn new(list: Element, status: Element, messages: &Messages) -> Self {
        Self {
            model: ResultsModel::new(&messages.empty),
            list,
            status,
        }
    }

    fn cards_html(cards: &[PostCard]) -> String {
        cards.iter().map(PostCard::to_html).collect()
    }

    fn sync_status(&self) {
        self.status.set_inner_html(&self.model.status().to_html());
    }
}

impl ResultsView for DomResults {
    fn render_initial(&mut self, cards: &[PostCard]) {
        self.model.render_initial(cards);
        self.list.set_inner_html(&Self::cards_html(self.model.cards()));
        self.sync_status();
    }

    fn append_posts(&mut self, cards: &[PostCard]) {
        self.model.append_posts(cards);
        if !cards.is_empty() {
            let _ = self.list.insert_adjacent_html("beforeend", &Self::cards_html(cards));
        }
        self.sync_status();
    }

    fn show_skeleton(&mut self, markup: &str) {
        self.model.show_skeleton(markup);
        self.sync_status();
    }

    fn hide_skeleton(&mut self) {
        self.model.hide_skeleton();
        self.sync_status();
    }

    fn show_error(&mut self, message: &str) {
        self.model.show_error(message);
        self.sync_status();
    }

    fn show_empty(&mut self, message: &str) {
        self.model.show_empty(message);
        self.list.set_inner_html("");
        self.sync_status();
    }

    fn show_end_message(&mut self, message: &str) {
        self.model.show_end_message(message);
        self.sync_status();
    }
}

// ── Sentinel watcher ──

pub struct SentinelWatcher {
    observer: IntersectionObserver,
    sentinel: Element,
    observing: bool,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

impl SentinelWatcher {
    fn new(sentinel: Element, root_margin: &str, on_visible: impl Fn() + 'static) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(move |entries: Array, _| {
            let visible = entries.iter().any(|entry| {
                entry
                    .dyn_into::<IntersectionObserverEntry>()
                    .is_ok_and(|e| e.is_intersecting())
            });
            if visible {
                on_visible();
            }
        });
        let init = IntersectionObserverInit::new();
        init.set_root_margin(root_margin);
        let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        Ok(Self {
            observer,
            sentinel,
            observing: false,
            _callback: callback,
        })
    }
}

impl ViewportWatcher for SentinelWatcher {
    fn observe(&mut self) {
        if !self.observing {
            self.observer.observe(&self.sentinel);
            self.observing = true;
        }
    }

    fn disconnect(&mut self) {
        if self.observing {
            self.observer.disconnect();
            self.observing = false;
        }
    }

    fn is_observing(&self) -> bool {
        self.observing
    }
}

// ── Mount ──

pub struct BlogMount {
    controller: RefCell<BlogController<DomResults, SentinelWatcher>>,
    source: WpSource,
}

impl BlogMount {
    fn load(self: Rc<Self>, mode: LoadMode) {
        spawn_local(async move {
            let outcome = load(&self.controller, &self.source, mode).await;
            debug!(?mode, ?outcome, "blog load settled");
        });
    }
}

fn child(root: &Element, class: &str) -> Result<Element, JsValue> {
    if let Some(existing) = root.query_selector(&format!(".{class}"))? {
        return Ok(existing);
    }
    let el = dom::document().create_element("div")?;
    el.set_class_name(class);
    root.append_child(&el)?;
    Ok(el)
}

/// Mount one listing and start the first load.
pub fn mount(root: &Element, base: &BlogConfig, messages: &Messages) -> Result<Rc<BlogMount>, JsValue> {
    let list = root
        .query_selector(RESULTS_SELECTOR)?
        .ok_or_else(|| JsValue::from_str(&format!("blog mount is missing {RESULTS_SELECTOR}")))?;
    let status = child(root, "er-blog__status")?;
    let sentinel = child(root, "er-blog__sentinel")?;
    let _ = sentinel.set_attribute("aria-hidden", "true");

    let blog = base.with_overrides(
        root.get_attribute("data-endpoint").as_deref(),
        root.get_attribute("data-per-page").as_deref(),
    );

    // The observer needs the mount and the mount owns the observer.
    let slot: Rc<RefCell<Weak<BlogMount>>> = Rc::new(RefCell::new(Weak::new()));
    let target = Rc::clone(&slot);
    let watcher = SentinelWatcher::new(sentinel, &blog.root_margin, move || {
        if let Some(mount) = target.borrow().upgrade() {
            mount.load(LoadMode::Append);
        }
    })?;

    let view = DomResults::new(list, status, messages);
    let mount = Rc::new(BlogMount {
        controller: RefCell::new(BlogController::new(view, watcher, blog.per_page, messages.clone())),
        source: WpSource::new(&blog.endpoint),
    });
    *slot.borrow_mut() = Rc::downgrade(&mount);

    let teardown = Rc::clone(&mount);
    state::on_teardown(move || teardown.controller.borrow_mut().teardown());

    info!(endpoint = %blog.endpoint, per_page = blog.per_page, "blog mounted");
    Rc::clone(&mount).load(LoadMode::Initial);
    Ok(mount)
}

/// Mount every listing on the page.
pub fn mount_all() -> Result<usize, JsValue> {
    let config = state::config();
    let roots = dom::query_all(BLOG_SELECTOR);
    for root in &roots {
        mount(root, &config.blog, &config.messages)?;
    }
    Ok(roots.len())
}
