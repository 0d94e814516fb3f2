use std::rc::Rc;

use er_api_types::EventKind;
use er_controls::form_field::{self, value_link};
use er_controls::{Key, SelectControl, TextInputControl, ToggleControl};
use er_reactive::{AttributeHost, HandlerRegistry, MemoryHost, Value};
use serde_json::json;

const ERAS: &str = r#"["60s", "70s", "80s", "90s"]"#;

#[test]
fn toggle_writes_through_to_form_field() -> anyhow::Result<()> {
    let field = form_field::mount(MemoryHost::new().with("name", "era").with("value", r#""70s""#));
    let mut toggle = ToggleControl::mount(MemoryHost::new().with("options", ERAS), Rc::default());
    toggle.link(value_link(&field))?;

    assert_eq!(toggle.value(), "70s");
    assert!(toggle.markup().contains(r#"aria-checked="true" data-value="70s""#));

    let events = toggle.key(Key::ArrowRight);
    assert_eq!(events.last().and_then(|e| e.kind()), Some(EventKind::Change));
    assert_eq!(field.borrow().state().json("value"), Some(&json!("80s")));
    assert_eq!(field.borrow().host().attribute("value").as_deref(), Some(r#""80s""#));
    assert_eq!(field.borrow().render_count(), 1);
    // The toggle's own attribute is not the source of truth while linked.
    assert_eq!(toggle.element().host().attribute("value"), None);

    toggle.unlink();
    assert_eq!(toggle.value(), "80s");
    Ok(())
}

#[test]
fn ancestor_value_is_read_when_opening() -> anyhow::Result<()> {
    let field = form_field::mount(MemoryHost::new());
    let mut select: SelectControl<false, MemoryHost> =
        SelectControl::mount("era", MemoryHost::new().with("options", ERAS), Rc::default());
    select.link(value_link(&field))?;

    field.borrow_mut().set_state([("value", Value::from(json!("90s")))])?;
    select.open();
    assert_eq!(select.machine().highlighted(), Some(3));
    assert!(select.markup().contains(r#"<span class="er-select__value">90s</span>"#));
    Ok(())
}

#[test]
fn multi_select_stores_array_in_field() -> anyhow::Result<()> {
    let field = form_field::mount(MemoryHost::new());
    let host = MemoryHost::new().with("options", ERAS).with("select-all", "");
    let mut select: SelectControl<true, MemoryHost> = SelectControl::mount("eras", host, Rc::default());
    select.link(value_link(&field))?;

    select.open();
    select.set_query("0s");
    select.select_all();
    assert_eq!(field.borrow().state().json("value"), Some(&json!(["60s", "70s", "80s", "90s"])));

    let events = select.remove_chip("70s");
    let kinds: Vec<_> = events.iter().filter_map(|e| e.kind()).collect();
    assert_eq!(kinds, vec![EventKind::Deselect, EventKind::Change]);
    assert_eq!(events[1].values.as_deref(), Some(&["60s".to_owned(), "80s".to_owned(), "90s".to_owned()][..]));
    assert_eq!(field.borrow().state().json("value"), Some(&json!(["60s", "80s", "90s"])));
    Ok(())
}

#[test]
fn custom_matcher_comes_from_registry() {
    let mut registry = HandlerRegistry::new();
    registry.register_matcher("prefix", |option, query| option.label.starts_with(query));
    let host = MemoryHost::new().with("options", ERAS).with("filter", "prefix");
    let mut select: SelectControl<false, MemoryHost> = SelectControl::mount("era", host, Rc::new(registry));

    select.set_query("8");
    assert_eq!(select.machine().filtered(), &[2]);
    select.set_query("0");
    assert!(select.machine().filtered().is_empty());
    assert!(select.markup().contains("No results"));
}

#[test]
fn text_input_linked_value_survives_unlink() -> anyhow::Result<()> {
    let field = form_field::mount(MemoryHost::new());
    let mut input = TextInputControl::mount("q", MemoryHost::new(), Rc::default());
    input.link(value_link(&field))?;
    input.input("walkman");
    assert_eq!(field.borrow().state().json("value"), Some(&json!("walkman")));

    input.unlink();
    assert_eq!(input.value(), "walkman");
    Ok(())
}
