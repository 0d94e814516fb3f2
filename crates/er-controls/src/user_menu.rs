//! `<er-user-menu>`: account dropdown mirroring the site's login state.
//!
//! The login state belongs to an external auth module exposed through
//! [`AuthSource`]. The menu only reads it: pushed when the source supports
//! [`AuthSource::subscribe`], polled by the host otherwise.

use std::sync::LazyLock;

use er_api_types::{AuthSnapshot, ControlEvent, EventKind};
use er_reactive::{AttributeHost, Component, FieldDef, ReactiveElement, Schema, State, Value};
use er_templates::UserMenuView;
use tracing::{debug, warn};

use crate::keys::Key;

pub trait AuthSource {
    fn snapshot(&self) -> AuthSnapshot;

    /// Push updates to `callback`. `None` means the source cannot push and
    /// the caller has to poll [`AuthSource::snapshot`].
    fn subscribe(&self, _callback: Box<dyn Fn(AuthSnapshot)>) -> Option<Subscription> {
        None
    }
}

/// Active push registration. Unsubscribes on drop.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::declare(vec![
        FieldDef::new("open", false).attr("open").internal(),
        FieldDef::new("logged_in", false).attr("logged-in"),
        FieldDef::new("display_name", "").attr("display-name"),
        FieldDef::new("avatar", "").attr("avatar"),
        FieldDef::new("account_url", "").attr("account-url"),
        FieldDef::new("logout_url", "").attr("logout-url"),
        FieldDef::new("login_url", "/wp-login.php").attr("login-url"),
    ])
    .expect("user menu schema is valid")
});

pub struct UserMenu;

impl Component for UserMenu {
    const TAG: &'static str = "er-user-menu";

    fn schema() -> &'static Schema {
        &SCHEMA
    }

    fn render(&self, state: &State) -> String {
        er_templates::user_menu(&UserMenuView {
            open: state.flag("open"),
            logged_in: state.flag("logged_in"),
            display_name: state.str("display_name"),
            avatar_url: state.str("avatar"),
            account_url: state.str("account_url"),
            logout_url: state.str("logout_url"),
            login_url: state.str("login_url"),
        })
    }
}

pub struct UserMenuControl<H> {
    element: ReactiveElement<UserMenu, H>,
}

impl<H: AttributeHost> UserMenuControl<H> {
    pub fn mount(host: H) -> Self {
        let mut element = ReactiveElement::construct(UserMenu, host);
        element.connect();
        Self { element }
    }

    pub fn element(&self) -> &ReactiveElement<UserMenu, H> {
        &self.element
    }

    pub fn markup(&self) -> &str {
        self.element.markup()
    }

    pub fn is_open(&self) -> bool {
        self.element.state().flag("open")
    }

    pub fn is_logged_in(&self) -> bool {
        self.element.state().flag("logged_in")
    }

    pub fn toggle(&mut self) -> Vec<ControlEvent> {
        if self.is_open() {
            self.close()
        } else if self.is_logged_in() {
            self.set_open(true)
        } else {
            Vec::new()
        }
    }

    pub fn close(&mut self) -> Vec<ControlEvent> {
        if self.is_open() { self.set_open(false) } else { Vec::new() }
    }

    pub fn key(&mut self, key: Key) -> Vec<ControlEvent> {
        match key {
            Key::Escape => self.close(),
            _ => Vec::new(),
        }
    }

    pub fn outside_pointer_down(&mut self) -> Vec<ControlEvent> {
        self.close()
    }

    pub fn attribute_changed(&mut self, attribute: &str, raw: Option<&str>) -> bool {
        self.element.attribute_changed(attribute, raw)
    }

    /// Mirror an auth snapshot. Only changed fields are written, and a
    /// logout closes the dropdown in the same render.
    pub fn apply_snapshot(&mut self, snapshot: &AuthSnapshot) -> Vec<ControlEvent> {
        let was_open = self.is_open();
        let mut batch = vec![
            ("logged_in", Value::from(snapshot.logged_in)),
            ("display_name", Value::from(snapshot.display_name.as_str())),
            ("avatar", Value::from(snapshot.avatar_url.as_deref().unwrap_or_default())),
            ("account_url", Value::from(snapshot.account_url.as_deref().unwrap_or_default())),
            ("logout_url", Value::from(snapshot.logout_url.as_deref().unwrap_or_default())),
        ];
        if !snapshot.logged_in {
            batch.push(("open", Value::from(false)));
        }

        match self.element.set_state(batch) {
            Ok(changed) if !changed.is_empty() => {
                debug!(?changed, logged_in = snapshot.logged_in, "auth state mirrored");
            }
            Ok(_) => {}
            Err(err) => warn!(tag = UserMenu::TAG, %err, "auth snapshot rejected"),
        }

        if was_open && !self.is_open() {
            vec![ControlEvent::new(EventKind::Close, UserMenu::TAG, "")]
        } else {
            Vec::new()
        }
    }

    /// One poll tick against a source that cannot push.
    pub fn poll(&mut self, source: &dyn AuthSource) -> Vec<ControlEvent> {
        self.apply_snapshot(&source.snapshot())
    }

    fn set_open(&mut self, open: bool) -> Vec<ControlEvent> {
        if let Err(err) = self.element.set_state([("open", Value::from(open))]) {
            warn!(tag = UserMenu::TAG, %err, "user menu update rejected");
            return Vec::new();
        }
        let kind = if open { EventKind::Open } else { EventKind::Close };
        vec![ControlEvent::new(kind, UserMenu::TAG, "")]
    }
}
