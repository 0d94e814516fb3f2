//! Mounting controls onto their custom-element hosts.
//!
//! Each host gets an open shadow root holding the control's markup. DOM
//! events are delegated from the shadow root to the control's operations;
//! whatever the operation emits is dispatched from the host. The markup is
//! repainted only when the control actually rendered.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use er_api_types::ControlEvent;
use er_controls::{
    AuthSource, FormField, Icon, IconRegistry, Key, Loader, LoaderControl, MultiSelect, SegmentedToggle, SelectControl,
    SharedField, SingleSelect, TextInput, TextInputControl, ToggleControl, UserMenu, UserMenuControl, form_field,
};
use er_reactive::{AttributeHost, Component, FieldLink, HandlerRegistry, ReactiveElement};
use gloo_timers::callback::Interval;
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event, HtmlInputElement, KeyboardEvent, ShadowRoot};

use crate::auth::WindowAuth;
use crate::dom;
use crate::events;
use crate::host::{self, DomHost};
use crate::state;

const SEARCH: &str = ".er-select__search";
const TEXT_FIELD: &str = ".er-text-input__field";

/// What a mounted control exposes for painting.
pub trait Painted {
    fn markup(&self) -> &str;
    fn render_count(&self) -> u64;
}

impl<C: Component, H: AttributeHost> Painted for ReactiveElement<C, H> {
    fn markup(&self) -> &str {
        ReactiveElement::markup(self)
    }

    fn render_count(&self) -> u64 {
        ReactiveElement::render_count(self)
    }
}

macro_rules! painted_via_element {
    ($($ty:ty),* $(,)?) => {$(
        impl Painted for $ty {
            fn markup(&self) -> &str {
                self.element().markup()
            }

            fn render_count(&self) -> u64 {
                self.element().render_count()
            }
        }
    )*};
}

painted_via_element!(
    SelectControl<false, DomHost>,
    SelectControl<true, DomHost>,
    TextInputControl<DomHost>,
    ToggleControl<DomHost>,
    LoaderControl<DomHost>,
    UserMenuControl<DomHost>,
);

pub struct Mounted<C> {
    host: Element,
    root: ShadowRoot,
    control: RefCell<C>,
    painted: Cell<u64>,
}

impl<C: Painted + 'static> Mounted<C> {
    fn attach(host: &Element, control: C) -> Result<Rc<Self>, JsValue> {
        let mounted = Rc::new(Self {
            host: host.clone(),
            root: dom::shadow_root(host)?,
            control: RefCell::new(control),
            painted: Cell::new(0),
        });
        mounted.paint();
        Ok(mounted)
    }

    fn paint(&self) {
        let control = self.control.borrow();
        let count = control.render_count();
        if count != self.painted.get() {
            self.root.set_inner_html(control.markup());
            self.painted.set(count);
        }
    }

    /// Run an operation, repaint, then dispatch what it emitted.
    fn run(&self, op: impl FnOnce(&mut C) -> Vec<ControlEvent>) {
        let emitted = op(&mut self.control.borrow_mut());
        self.paint();
        events::dispatch_all(&self.host, &emitted);
    }

    fn listen(self: &Rc<Self>, name: &str, handler: impl Fn(&Self, &Event) + 'static) -> Result<(), JsValue> {
        let this = Rc::clone(self);
        dom::on(&self.root, name, move |event| handler(&this, &event))
    }

    /// Pointer down anywhere outside the host.
    fn on_outside(self: &Rc<Self>, op: fn(&mut C) -> Vec<ControlEvent>) -> Result<(), JsValue> {
        let this = Rc::clone(self);
        dom::on(&dom::document(), "pointerdown", move |event| {
            if !dom::path_contains(&event, &this.host) {
                this.run(op);
            }
        })
    }

    fn observe(self: &Rc<Self>, names: &[&str], apply: fn(&mut C, &str, Option<&str>) -> bool) -> Result<(), JsValue> {
        let this = Rc::clone(self);
        let observer = host::observe_attributes(&self.host, names, move |name, raw| {
            if apply(&mut this.control.borrow_mut(), name, raw.as_deref()) {
                this.paint();
            }
        })?;
        state::on_teardown(move || drop(observer));
        Ok(())
    }
}

fn host_id(el: &Element, prefix: &str) -> String {
    let id = el.id();
    if id.is_empty() { state::next_id(prefix) } else { id }
}

fn ancestor_link(el: &Element) -> Option<FieldLink> {
    let parent = el.parent_element()?.closest(FormField::TAG).ok()??;
    let field = state::field_for(&parent)?;
    Some(form_field::value_link(&field))
}

fn key_of(event: &Event) -> Option<Key> {
    event.dyn_ref::<KeyboardEvent>().map(|ke| Key::from_dom(&ke.key()))
}

fn closest(event: &Event, selector: &str) -> Option<Element> {
    dom::event_element(event)?.closest(selector).ok().flatten()
}

fn input_value(event: &Event) -> Option<String> {
    dom::event_element(event)?
        .dyn_into::<HtmlInputElement>()
        .ok()
        .map(|input| input.value())
}

// ── Form field ──

fn mount_field(el: &Element) -> Result<(), JsValue> {
    let field: SharedField<DomHost> = form_field::mount(DomHost::new(el.clone()));
    let root = dom::shadow_root(el)?;
    root.set_inner_html(field.borrow().markup());

    let painted = Rc::new(Cell::new(field.borrow().render_count()));
    let shared = Rc::clone(&field);
    let observer = host::observe_attributes(el, &FormField::schema().observed_attributes(), move |name, raw| {
        let mut field = shared.borrow_mut();
        if field.attribute_changed(name, raw.as_deref()) && field.render_count() != painted.get() {
            root.set_inner_html(field.markup());
            painted.set(field.render_count());
        }
    })?;
    state::on_teardown(move || drop(observer));
    state::add_field(el.clone(), field);
    Ok(())
}

// ── Selects ──

fn mount_select<const MULTI: bool>(el: &Element, registry: &Rc<HandlerRegistry>) -> Result<(), JsValue>
where
    SelectControl<MULTI, DomHost>: Painted,
    er_controls::SelectWidget<MULTI>: Component,
{
    let id = host_id(el, er_controls::SelectWidget::<MULTI>::TAG);
    let mut control = SelectControl::<MULTI, DomHost>::mount(&id, DomHost::new(el.clone()), Rc::clone(registry));
    if let Some(link) = ancestor_link(el) {
        if let Err(err) = control.link(link) {
            warn!(%id, %err, "select not linked to its form field");
        }
    }
    let m = Mounted::attach(el, control)?;

    m.listen("click", |m, event| {
        if let Some(chip) = closest(event, ".er-chip__remove") {
            let label = chip.get_attribute("data-remove").unwrap_or_default();
            event.stop_propagation();
            m.run(|c| c.remove_chip(&label));
        } else if let Some(option) = closest(event, ".er-select__option") {
            let value = option.get_attribute("data-value").unwrap_or_default();
            m.run(|c| c.choose(&value));
        } else if closest(event, ".er-select__all").is_some() {
            m.run(SelectControl::select_all);
        } else if closest(event, ".er-select__trigger").is_some() {
            m.run(SelectControl::toggle_open);
        } else {
            return;
        }
        restore_select_focus(m);
    })?;

    m.listen("keydown", |m, event| {
        let Some(key) = key_of(event) else {
            return;
        };
        let in_search = closest(event, SEARCH).is_some();
        if in_search && matches!(key, Key::Space | Key::Home | Key::End | Key::ArrowLeft | Key::ArrowRight) {
            return;
        }
        let was_open = m.control.borrow().machine().is_open();
        m.run(|c| c.key(key));
        if !key.is_navigation() {
            return;
        }
        if was_open || m.control.borrow().machine().is_open() {
            event.prevent_default();
        }
        restore_select_focus(m);
    })?;

    m.listen("input", |m, event| {
        if closest(event, SEARCH).is_none() {
            return;
        }
        if let Some(query) = input_value(event) {
            m.run(|c| c.set_query(&query));
            dom::refocus_input(&m.root, SEARCH);
        }
    })?;

    m.listen("mouseover", |m, event| {
        let position = closest(event, ".er-select__option")
            .map(|option| option.id())
            .and_then(|id| id.rsplit_once("-opt-").and_then(|(_, pos)| pos.parse::<usize>().ok()));
        if let Some(position) = position {
            if m.control.borrow().machine().highlighted() != Some(position) {
                m.run(|c| c.highlight(position));
            }
        }
    })?;

    m.on_outside(SelectControl::outside_pointer_down)?;
    m.observe(&er_controls::SelectWidget::<MULTI>::schema().observed_attributes(), SelectControl::attribute_changed)?;

    let unlink = Rc::clone(&m);
    state::on_teardown(move || unlink.control.borrow_mut().unlink());
    debug!(%id, multi = MULTI, "select mounted");
    Ok(())
}

fn restore_select_focus<const MULTI: bool>(m: &Mounted<SelectControl<MULTI, DomHost>>)
where
    er_controls::SelectWidget<MULTI>: Component,
{
    if m.control.borrow().machine().is_open() {
        dom::refocus_input(&m.root, SEARCH);
    } else {
        dom::focus(&m.root, ".er-select__trigger");
    }
}

// ── Toggle ──

fn mount_toggle(el: &Element, registry: &Rc<HandlerRegistry>) -> Result<(), JsValue> {
    let mut control = ToggleControl::mount(DomHost::new(el.clone()), Rc::clone(registry));
    if let Some(link) = ancestor_link(el) {
        if let Err(err) = control.link(link) {
            warn!(%err, "toggle not linked to its form field");
        }
    }
    let m = Mounted::attach(el, control)?;

    m.listen("click", |m, event| {
        if let Some(segment) = closest(event, ".er-toggle__segment") {
            let value = segment.get_attribute("data-value").unwrap_or_default();
            m.run(|c| c.choose(&value));
        }
    })?;
    m.listen("keydown", |m, event| {
        let Some(key) = key_of(event) else {
            return;
        };
        if !key.is_navigation() {
            return;
        }
        event.prevent_default();
        m.run(|c| c.key(key));
        if m.control.borrow().focused().is_some() {
            dom::focus(&m.root, ".er-toggle__segment.is-focused");
        } else {
            dom::focus(&m.root, ".er-toggle__segment.is-active");
        }
    })?;
    m.observe(&SegmentedToggle::schema().observed_attributes(), ToggleControl::attribute_changed)?;

    let unlink = Rc::clone(&m);
    state::on_teardown(move || unlink.control.borrow_mut().unlink());
    Ok(())
}

// ── Text input ──

fn mount_text_input(el: &Element, registry: &Rc<HandlerRegistry>) -> Result<(), JsValue> {
    let id = host_id(el, TextInput::TAG);
    let mut control = TextInputControl::mount(&id, DomHost::new(el.clone()), Rc::clone(registry));
    if let Some(link) = ancestor_link(el) {
        if let Err(err) = control.link(link) {
            warn!(%id, %err, "text input not linked to its form field");
        }
    }
    let m = Mounted::attach(el, control)?;

    m.listen("input", |m, event| {
        if let Some(text) = input_value(event) {
            m.run(|c| c.input(&text));
            dom::refocus_input(&m.root, TEXT_FIELD);
        }
    })?;
    m.listen("change", |m, _| m.run(TextInputControl::change))?;
    m.observe(&TextInput::schema().observed_attributes(), TextInputControl::attribute_changed)?;

    let unlink = Rc::clone(&m);
    state::on_teardown(move || unlink.control.borrow_mut().unlink());
    Ok(())
}

// ── Icon, loader, user menu ──

fn mount_icon(el: &Element, registry: &Rc<IconRegistry>) -> Result<(), JsValue> {
    let mut element = ReactiveElement::construct(Icon::new(Rc::clone(registry)), DomHost::new(el.clone()));
    element.connect();
    let m = Mounted::attach(el, element)?;
    m.observe(&Icon::schema().observed_attributes(), ReactiveElement::attribute_changed)
}

thread_local! {
    static LOADERS: RefCell<Vec<Rc<Mounted<LoaderControl<DomHost>>>>> = const { RefCell::new(Vec::new()) };
}

fn mount_loader(el: &Element) -> Result<(), JsValue> {
    let m = Mounted::attach(el, LoaderControl::mount(DomHost::new(el.clone())))?;
    m.observe(&Loader::schema().observed_attributes(), LoaderControl::attribute_changed)?;
    LOADERS.with(|l| l.borrow_mut().push(m));
    Ok(())
}

/// Show or hide every mounted loading overlay.
pub fn set_loading(active: bool, message: &str) {
    let loaders = LOADERS.with(|l| l.borrow().clone());
    for m in loaders {
        m.run(|c| {
            if active { c.show(message) } else { c.hide() }
            Vec::new()
        });
    }
}

fn mount_user_menu(el: &Element, poll_interval_ms: u32) -> Result<(), JsValue> {
    let m = Mounted::attach(el, UserMenuControl::mount(DomHost::new(el.clone())))?;

    m.listen("click", |m, event| {
        if closest(event, ".er-user-menu__trigger").is_some() {
            m.run(UserMenuControl::toggle);
        }
    })?;
    m.listen("keydown", |m, event| {
        if let Some(key) = key_of(event) {
            m.run(|c| c.key(key));
        }
    })?;
    m.on_outside(UserMenuControl::outside_pointer_down)?;
    m.observe(&UserMenu::schema().observed_attributes(), UserMenuControl::attribute_changed)?;

    m.run(|c| c.poll(&WindowAuth));
    let pushed = Rc::clone(&m);
    match WindowAuth.subscribe(Box::new(move |snapshot| pushed.run(|c| c.apply_snapshot(&snapshot)))) {
        Some(subscription) => state::on_teardown(move || drop(subscription)),
        None => {
            let polled = Rc::clone(&m);
            let interval = Interval::new(poll_interval_ms, move || polled.run(|c| c.poll(&WindowAuth)));
            debug!(poll_interval_ms, "polling auth state");
            state::on_teardown(move || { interval.cancel(); });
        }
    }
    Ok(())
}

/// Mount every control on the page. Form fields go first so descendants can link.
pub fn mount_all(registry: &Rc<HandlerRegistry>) -> Result<usize, JsValue> {
    let config = state::config();
    let icons = Rc::new(IconRegistry::with_overrides(config.icons.clone()));
    let mut mounted = 0;

    for el in dom::query_all(FormField::TAG) {
        mount_field(&el)?;
        mounted += 1;
    }
    for el in dom::query_all(SingleSelect::TAG) {
        mount_select::<false>(&el, registry)?;
        mounted += 1;
    }
    for el in dom::query_all(MultiSelect::TAG) {
        mount_select::<true>(&el, registry)?;
        mounted += 1;
    }
    for el in dom::query_all(SegmentedToggle::TAG) {
        mount_toggle(&el, registry)?;
        mounted += 1;
    }
    for el in dom::query_all(TextInput::TAG) {
        mount_text_input(&el, registry)?;
        mounted += 1;
    }
    for el in dom::query_all(Icon::TAG) {
        mount_icon(&el, &icons)?;
        mounted += 1;
    }
    for el in dom::query_all(Loader::TAG) {
        mount_loader(&el)?;
        mounted += 1;
    }
    for el in dom::query_all(UserMenu::TAG) {
        mount_user_menu(&el, config.auth.poll_interval_ms)?;
        mounted += 1;
    }
    Ok(mounted)
}
