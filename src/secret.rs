//! Redacting wrapper for sensitive values.

use std::any::{Any, TypeId};
use std::fmt;

use serde_json::Value;

use crate::decode::Decode;
use crate::error::Result;
use crate::mask::{walk_name, walk_type, Mask};
use crate::shape::{Shape, Shaped};

/// A wrapper that keeps sensitive values out of formatted output.
///
/// Debug and Display always print `[REDACTED]`. The wrapped value is only
/// reachable through [`expose_secret`](Self::expose_secret). A `Secret`
/// decodes exactly like the value it wraps and is a natural target for
/// [`clear_by_type_of`](crate::clear_by_type_of).
///
/// ```
/// use wireshape::{decode_str, record, Secret};
///
/// record! {
///     #[derive(Debug, Clone, Default)]
///     pub struct Login {
///         required user: String,
///         required password: Secret<String>,
///     }
/// }
///
/// let mut login = Login::default();
/// decode_str(r#"{"user":"ann","password":"hunter2"}"#, &mut login, true).unwrap();
/// assert_eq!(login.password.expose_secret(), "hunter2");
/// assert!(!format!("{login:?}").contains("hunter2"));
/// ```
// Clones stay wrapped; the masker needs them to clear copies of a value.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret<T> {
    inner: T,
}

impl<T> Secret<T> {
    /// Wraps a sensitive value.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Explicitly exposes the secret value.
    ///
    /// The name is deliberately loud; do not log what it returns.
    pub fn expose_secret(&self) -> &T {
        &self.inner
    }

    /// Consumes the wrapper and returns the secret value.
    pub fn into_exposed(self) -> T {
        self.inner
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T: Shaped> Shaped for Secret<T> {
    fn shape() -> Shape {
        T::shape()
    }
}

impl<T: Decode> Decode for Secret<T> {
    fn coerce(value: Value) -> Result<Self> {
        T::coerce(value).map(Secret::new)
    }

    fn decode_native(value: Value) -> Result<Self> {
        T::decode_native(value).map(Secret::new)
    }
}

impl<T: Mask + Clone + Default> Mask for Secret<T> {
    fn mask_type(&mut self, target: TypeId) {
        walk_type(&mut self.inner, target);
    }

    fn mask_name(&mut self, name: &str) {
        walk_name(&mut self.inner, name);
    }

    fn zero(&mut self) {
        self.inner = T::default();
    }

    fn clone_box(&self) -> Box<dyn Mask> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clear_by_type_of, decode_str, Dynamic};

    #[test]
    fn secret_redacts_debug() {
        let secret = Secret::new("sk-1234567890".to_string());
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert_eq!(format!("{:?}", Some(&secret)), "Some([REDACTED])");
    }

    #[test]
    fn secret_redacts_display() {
        let secret = Secret::new(42_u32);
        assert_eq!(secret.to_string(), "[REDACTED]");
        assert_eq!(secret.into_exposed(), 42);
    }

    #[test]
    fn secret_decodes_like_inner() {
        let mut pin: Secret<u16> = Secret::default();
        decode_str("1234", &mut pin, true).expect("decodes");
        assert_eq!(*pin.expose_secret(), 1234);

        let err = decode_str("70000", &mut pin, true).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::TypeMismatch);
    }

    #[test]
    fn clear_by_type_wipes_secrets_only() {
        let mut rows = vec![
            Dynamic::new(Secret::new("hunter2".to_string())),
            Dynamic::new("visible".to_string()),
        ];
        clear_by_type_of::<Secret<String>, _>(&mut rows).expect("clears");

        let secret = rows[0].downcast_ref::<Secret<String>>().expect("still a secret");
        assert_eq!(secret.expose_secret(), "");
        assert_eq!(rows[1].downcast_ref::<String>().map(String::as_str), Some("visible"));
    }
}
