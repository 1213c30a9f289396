//! Redaction rules for request and response bodies bound for the logs.
//!
//! A [`Redactor`] never modifies the value it is given. When masking fails,
//! [`Redactor::log`] withholds the body rather than logging it unmasked.

use std::any::{Any, TypeId};

use crate::error::Result;
use crate::mask::{masked_by_name, masked_by_type, Mask};

/// A reusable set of masking rules for values about to be logged.
///
/// Type rules run first, then name rules. The value handed to
/// [`apply`](Self::apply) is never modified.
///
/// ```
/// use serde_json::json;
/// use wireshape::{Redactor, Secret};
///
/// let redactor = Redactor::new()
///     .field("password")
///     .of_type::<Secret<String>>();
///
/// let body = json!({"user": "ann", "password": "hunter2"});
/// let safe = redactor.apply(&body).unwrap();
/// assert_eq!(safe, json!({"user": "ann", "password": ""}));
/// assert_eq!(body["password"], "hunter2");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Redactor {
    names: Vec<String>,
    types: Vec<(TypeId, &'static str)>,
}

impl Redactor {
    /// Creates a redactor with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule zeroing every field or map entry called `name`.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    /// Adds a rule zeroing every value of type `T`.
    pub fn of_type<T: Any>(mut self) -> Self {
        self.types
            .push((TypeId::of::<T>(), std::any::type_name::<T>()));
        self
    }

    /// Whether no rules have been added.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.types.is_empty()
    }

    /// Returns a masked copy of `value`.
    pub fn apply<T: Mask + Clone>(&self, value: &T) -> Result<T> {
        let mut masked = value.clone();
        for (target, type_name) in &self.types {
            tracing::trace!(target_type = *type_name, "applying type rule");
            masked = masked_by_type(&masked, *target)?;
        }
        for name in &self.names {
            masked = masked_by_name(&masked, name)?;
        }
        Ok(masked)
    }

    /// Logs `value` at debug level after masking it.
    ///
    /// If masking fails the body is withheld and a warning is logged instead.
    pub fn log<T: Mask + Clone>(&self, message: &str, value: &T) {
        match self.apply(value) {
            Ok(masked) => tracing::debug!(body = ?masked, "{}", message),
            Err(err) => tracing::warn!(error = %err, "{}: body withheld", message),
        }
    }
}
