//! Reactive element base.
//!
//! A component declares a [`Schema`] of typed fields once per type. Each
//! [`ReactiveElement`] keeps the typed state, mirrors selected fields to host
//! attributes in both directions, and re-renders once per state batch.

mod element;
mod error;
mod link;
mod registry;
mod schema;
mod value;

pub use element::{AttributeHost, Component, MemoryHost, ReactiveElement, State};
pub use error::{ConfigurationError, ParseError};
pub use link::{FieldLink, LinkTarget};
pub use registry::{Handler, HandlerRegistry, Matcher};
pub use schema::{AttributeDescriptor, FieldDef, Schema};
pub use value::{FieldType, Value};
