use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::warn;

use crate::value::Value;

/// State owner a control can delegate one of its fields to.
pub trait LinkTarget {
    fn link_value(&self, field: &str) -> Option<Value>;

    /// Write without re-rendering the target. Returns whether the value changed.
    fn set_link_value(&mut self, field: &str, value: Value) -> bool;
}

/// Binding from a control field to a field on an ancestor container.
///
/// Holds the ancestor weakly: a dropped ancestor makes reads return `None`
/// and writes no-ops.
#[derive(Clone)]
pub struct FieldLink {
    target: Weak<RefCell<dyn LinkTarget>>,
    field: String,
}

impl FieldLink {
    pub fn new<T>(target: &Rc<RefCell<T>>, field: &str) -> Self
    where
        T: LinkTarget + 'static,
    {
        let target: Rc<RefCell<dyn LinkTarget>> = target.clone();
        Self {
            target: Rc::downgrade(&target),
            field: field.to_owned(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn is_alive(&self) -> bool {
        self.target.strong_count() > 0
    }

    pub fn get(&self) -> Option<Value> {
        let target = self.target.upgrade()?;
        let Ok(target) = target.try_borrow() else {
            warn!(field = %self.field, "ancestor field is mutably borrowed, read skipped");
            return None;
        };
        target.link_value(&self.field)
    }

    pub fn set(&self, value: Value) -> bool {
        let Some(target) = self.target.upgrade() else {
            return false;
        };
        let Ok(mut target) = target.try_borrow_mut() else {
            warn!(field = %self.field, "ancestor field is borrowed, write dropped");
            return false;
        };
        target.set_link_value(&self.field, value)
    }
}

impl std::fmt::Debug for FieldLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldLink")
            .field("field", &self.field)
            .field("alive", &self.is_alive())
            .finish()
    }
}
