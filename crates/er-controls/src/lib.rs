//! ElkaRetro control components.
//!
//! Each control pairs a [`er_reactive::Component`] with a `*Control` wrapper
//! that owns the mounted element and exposes the user-facing operations.
//! Operations never touch the DOM: they update state and return the
//! [`er_api_types::ControlEvent`]s the host should dispatch.

pub mod events;
pub mod form_field;
pub mod icon;
pub mod keys;
pub mod loader;
pub mod machine;
pub mod select;
pub mod text_input;
pub mod toggle;
pub mod user_menu;

pub use form_field::{FormField, SharedField};
pub use icon::{Icon, IconRegistry};
pub use keys::Key;
pub use loader::{Loader, LoaderControl};
pub use machine::{Effect, MenuState, SelectMachine, SelectMode};
pub use select::{MultiSelect, SelectControl, SelectWidget, SingleSelect};
pub use text_input::{TextInput, TextInputControl};
pub use toggle::{SegmentedToggle, ToggleControl};
pub use user_menu::{AuthSource, Subscription, UserMenu, UserMenuControl};
