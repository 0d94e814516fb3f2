//! Markup renderers.
//!
//! Every function here is pure: state in, HTML string out. Dynamic text is
//! always escaped; only registry icon markup is inserted verbatim.

mod blog;
mod chrome;
mod controls;
mod escape;

pub use blog::{CardView, MessageKind, post_card, results_message, skeleton};
pub use chrome::{UserMenuView, icon, loading_overlay, user_menu};
pub use controls::{SelectView, TextInputView, ToggleView, form_field, select, text_input, toggle};
pub use escape::{decode_entities, escape_attr, escape_html, strip_tags, truncate_words};
