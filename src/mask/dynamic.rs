//! Polymorphic slots the masker can look through.

use std::any::{Any, TypeId};

use serde_json::Value;

use super::{walk_name, walk_type, Mask};
use crate::decode::Decode;
use crate::error::Result;
use crate::shape::{Shape, Shaped};

/// A polymorphic slot holding any [`Mask`] value, or nothing.
///
/// The masker looks through the slot at whatever it currently holds. Clearing
/// happens on a copy of the contents which then replaces them.
///
/// ```
/// use serde_json::json;
/// use wireshape::{clear_by_name, Dynamic, Value};
///
/// let mut slot = Dynamic::new(json!({"token": "abc", "id": 1}));
/// clear_by_name(&mut slot, "token").unwrap();
/// assert_eq!(slot.downcast_ref::<Value>(), Some(&json!({"token": "", "id": 1})));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Dynamic(Option<Box<dyn Mask>>);

impl Dynamic {
    /// Wraps a value.
    pub fn new<T: Mask>(value: T) -> Self {
        Dynamic(Some(Box::new(value)))
    }

    /// An empty slot.
    pub fn empty() -> Self {
        Dynamic(None)
    }

    /// Whether the slot holds nothing.
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Borrows the contents as a `T`, if that is what the slot holds.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_ref()?.as_any().downcast_ref()
    }

    /// Borrows the contents.
    pub fn get(&self) -> Option<&dyn Mask> {
        self.0.as_deref()
    }
}

impl Mask for Dynamic {
    fn mask_type(&mut self, target: TypeId) {
        if let Some(inner) = &mut self.0 {
            let mut copy = inner.clone_box();
            walk_type(copy.as_mut(), target);
            *inner = copy;
        }
    }

    fn mask_name(&mut self, name: &str) {
        if let Some(inner) = &mut self.0 {
            let mut copy = inner.clone_box();
            walk_name(copy.as_mut(), name);
            *inner = copy;
        }
    }

    fn zero(&mut self) {
        self.0 = None;
    }

    fn clone_box(&self) -> Box<dyn Mask> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Shaped for Dynamic {
    fn shape() -> Shape {
        Shape::Polymorphic
    }
}

impl Decode for Dynamic {
    fn coerce(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Dynamic::empty()),
            other => Ok(Dynamic::new(other)),
        }
    }
}
