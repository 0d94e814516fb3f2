use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::ConfigurationError;
use crate::link::{FieldLink, LinkTarget};
use crate::schema::Schema;
use crate::value::Value;

/// Attribute storage of the element a component is mounted on.
pub trait AttributeHost {
    fn attribute(&self, name: &str) -> Option<String>;
    fn set_attribute(&mut self, name: &str, value: &str);
    fn remove_attribute(&mut self, name: &str);
}

/// In-memory attribute map, used off the DOM and in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryHost {
    attributes: BTreeMap<String, String>,
    writes: usize,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_owned(), value.to_owned());
        self
    }

    /// Number of set/remove calls made through [`AttributeHost`].
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}

impl AttributeHost for MemoryHost {
    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        self.writes += 1;
        self.attributes.insert(name.to_owned(), value.to_owned());
    }

    fn remove_attribute(&mut self, name: &str) {
        self.writes += 1;
        self.attributes.remove(name);
    }
}

/// Snapshot of typed field values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct State {
    values: BTreeMap<String, Value>,
}

impl State {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn str(&self, key: &str) -> &str {
        self.get(key).and_then(Value::as_str).unwrap_or_default()
    }

    pub fn number(&self, key: &str) -> f64 {
        self.get(key).and_then(Value::as_f64).unwrap_or_default()
    }

    pub fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or_default()
    }

    pub fn json(&self, key: &str) -> Option<&serde_json::Value> {
        self.get(key).and_then(Value::as_json)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn insert(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_owned(), value);
    }
}

/// Behavior of one component type.
pub trait Component {
    /// Custom element tag, also used as `component` in event payloads.
    const TAG: &'static str;

    fn schema() -> &'static Schema;

    fn render(&self, state: &State) -> String;

    /// Called once per changed key, before the batch re-render.
    fn state_changed(&mut self, _key: &str, _state: &State) {}
}

/// A mounted component: typed state, attribute sync and the last rendered markup.
pub struct ReactiveElement<C, H> {
    component: C,
    host: H,
    state: State,
    link: Option<(String, FieldLink)>,
    markup: String,
    renders: u64,
}

fn linked_value(schema: &Schema, key: &str, link: &FieldLink) -> Option<Value> {
    let value = link.get()?;
    schema.field(key)?.ty.coerce(value)
}

fn overlay(schema: &Schema, state: &State, link: &Option<(String, FieldLink)>) -> Option<State> {
    let (key, link) = link.as_ref()?;
    let value = linked_value(schema, key, link)?;
    let mut view = state.clone();
    view.insert(key, value);
    Some(view)
}

impl<C, H> ReactiveElement<C, H>
where
    C: Component,
    H: AttributeHost,
{
    /// Initialize from schema defaults, then overlay attributes present on the host.
    pub fn construct(component: C, host: H) -> Self {
        let mut state = State::default();

        for field in C::schema().fields() {
            let mut value = field.default.clone();
            if let Some(attr) = field.synced_attribute() {
                if let Some(raw) = host.attribute(&attr.name) {
                    match field.ty.parse_attribute(Some(&raw), &field.default) {
                        Ok(parsed) => value = parsed,
                        Err(err) => warn!(
                            tag = C::TAG,
                            attribute = %attr.name,
                            %err,
                            "ignoring unparsable attribute"
                        ),
                    }
                }
            }
            state.insert(&field.name, value);
        }

        Self {
            component,
            host,
            state,
            link: None,
            markup: String::new(),
            renders: 0,
        }
    }

    /// First render after the host is attached.
    pub fn connect(&mut self) -> &str {
        self.render()
    }

    pub fn component(&self) -> &C {
        &self.component
    }

    pub fn component_mut(&mut self) -> &mut C {
        &mut self.component
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Local state only. Linked fields read through [`ReactiveElement::get`].
    pub fn state(&self) -> &State {
        &self.state
    }

    /// State as the component sees it, with any linked field resolved.
    pub fn snapshot(&self) -> State {
        overlay(C::schema(), &self.state, &self.link).unwrap_or_else(|| self.state.clone())
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        if let Some((linked, link)) = &self.link {
            if linked == key {
                if let Some(value) = linked_value(C::schema(), key, link) {
                    return Some(value);
                }
            }
        }
        self.state.get(key).cloned()
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn render_count(&self) -> u64 {
        self.renders
    }

    /// Apply a batch of writes, then render once if anything changed.
    ///
    /// Every key is validated before any write happens.
    pub fn set_state<K, I>(&mut self, partial: I) -> Result<Vec<String>, ConfigurationError>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let partial: Vec<(K, Value)> = partial.into_iter().collect();
        for (key, value) in &partial {
            Self::validate(key.as_ref(), value)?;
        }

        let mut changed = Vec::new();
        for (key, value) in partial {
            if self.write(key.as_ref(), value) {
                changed.push(key.as_ref().to_owned());
            }
        }

        if !changed.is_empty() {
            self.render();
        }
        Ok(changed)
    }

    /// Write one field without rendering.
    pub fn write_silent(&mut self, key: &str, value: Value) -> Result<bool, ConfigurationError> {
        Self::validate(key, &value)?;
        Ok(self.write(key, value))
    }

    /// Observed attribute mutation coming from outside.
    ///
    /// Returns whether state changed. Values equal to the current state are
    /// ignored, which is what stops reflected writes from echoing back.
    pub fn attribute_changed(&mut self, attribute: &str, raw: Option<&str>) -> bool {
        let Some(field) = C::schema().by_attribute(attribute) else {
            return false;
        };
        if !field.synced_attribute().is_some_and(|a| a.observed) {
            return false;
        }

        let parsed = match field.ty.parse_attribute(raw, &field.default) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(tag = C::TAG, attribute, %err, "attribute rejected, keeping previous value");
                return false;
            }
        };

        if self.get(&field.name).as_ref() == Some(&parsed) {
            return false;
        }

        if self.write(&field.name, parsed) {
            self.render();
            true
        } else {
            false
        }
    }

    pub fn render(&mut self) -> &str {
        self.markup = match overlay(C::schema(), &self.state, &self.link) {
            Some(view) => self.component.render(&view),
            None => self.component.render(&self.state),
        };
        self.renders += 1;
        &self.markup
    }

    /// Delegate `key` to an ancestor field. At most one link per element.
    pub fn link_field(&mut self, key: &str, link: FieldLink) -> Result<(), ConfigurationError> {
        if let Some((existing, _)) = &self.link {
            return Err(ConfigurationError::AlreadyLinked(existing.clone()));
        }
        if C::schema().field(key).is_none() {
            return Err(ConfigurationError::UnknownField(key.to_owned()));
        }
        debug!(tag = C::TAG, key, target = link.field(), "linked to ancestor field");
        self.link = Some((key.to_owned(), link));
        Ok(())
    }

    /// Tear the link down, keeping the last linked value as local state.
    pub fn unlink(&mut self) -> Option<FieldLink> {
        let (key, link) = self.link.take()?;
        if let Some(value) = linked_value(C::schema(), &key, &link) {
            self.state.insert(&key, value);
        }
        Some(link)
    }

    pub fn is_linked(&self) -> bool {
        self.link.is_some()
    }

    fn validate(key: &str, value: &Value) -> Result<(), ConfigurationError> {
        let field = C::schema()
            .field(key)
            .ok_or_else(|| ConfigurationError::UnknownField(key.to_owned()))?;
        if value.field_type() != field.ty {
            return Err(ConfigurationError::TypeMismatch {
                field: key.to_owned(),
                expected: field.ty.name(),
            });
        }
        Ok(())
    }

    fn write(&mut self, key: &str, value: Value) -> bool {
        if let Some((linked, link)) = &self.link {
            if linked == key {
                let changed = link.set(value);
                if changed {
                    self.notify(key);
                }
                return changed;
            }
        }

        if self.state.get(key) == Some(&value) {
            return false;
        }
        self.state.insert(key, value);
        self.reflect(key);
        self.notify(key);
        true
    }

    fn notify(&mut self, key: &str) {
        match overlay(C::schema(), &self.state, &self.link) {
            Some(view) => self.component.state_changed(key, &view),
            None => self.component.state_changed(key, &self.state),
        }
    }

    fn reflect(&mut self, key: &str) {
        let Some(attr) = C::schema().field(key).and_then(|f| f.synced_attribute()) else {
            return;
        };
        if !attr.reflected {
            return;
        }

        let serialized = self.state.get(key).and_then(Value::to_attribute);
        if self.host.attribute(&attr.name) == serialized {
            return;
        }
        match serialized {
            Some(s) => self.host.set_attribute(&attr.name, &s),
            None => self.host.remove_attribute(&attr.name),
        }
    }
}

impl<C, H> LinkTarget for ReactiveElement<C, H>
where
    C: Component,
    H: AttributeHost,
{
    fn link_value(&self, field: &str) -> Option<Value> {
        self.get(field)
    }

    fn set_link_value(&mut self, field: &str, value: Value) -> bool {
        let value = match C::schema().field(field) {
            Some(def) => def.ty.coerce(value.clone()).unwrap_or(value),
            None => value,
        };
        self.write_silent(field, value).unwrap_or_else(|err| {
            warn!(tag = C::TAG, field, %err, "linked write rejected");
            false
        })
    }
}
