//! `<er-form-field>`: labelled container whose `value` a nested control can
//! take over through a [`FieldLink`].

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::LazyLock;

use er_reactive::{AttributeHost, Component, FieldDef, FieldLink, ReactiveElement, Schema, State};

static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::declare(vec![
        FieldDef::new("name", "").attr("name"),
        FieldDef::new("label", "").attr("label"),
        FieldDef::new("value", serde_json::Value::Null).attr("value"),
        FieldDef::new("error", "").attr("error"),
        FieldDef::new("required", false).attr("required"),
    ])
    .expect("form field schema is valid")
});

pub struct FormField;

impl Component for FormField {
    const TAG: &'static str = "er-form-field";

    fn schema() -> &'static Schema {
        &SCHEMA
    }

    fn render(&self, state: &State) -> String {
        er_templates::form_field(state.str("label"), state.str("error"), state.flag("required"))
    }
}

pub type SharedField<H> = Rc<RefCell<ReactiveElement<FormField, H>>>;

/// Construct and render a field, shared so descendants can link to it.
pub fn mount<H: AttributeHost + 'static>(host: H) -> SharedField<H> {
    let field = Rc::new(RefCell::new(ReactiveElement::construct(FormField, host)));
    field.borrow_mut().connect();
    field
}

/// Link handle for a descendant control's `value`.
pub fn value_link<H: AttributeHost + 'static>(field: &SharedField<H>) -> FieldLink {
    FieldLink::new(field, "value")
}
