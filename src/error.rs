use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::shape::ScalarKind;

/// Convenience alias used by every entry point of the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by the decoder, the masker and the scalar codec.
///
/// Null-value and type-mismatch errors carry the document path at which they
/// were raised, rendered as `$`, `$.user.name` or `$.items[2]`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required value was absent or explicitly `null`.
    #[error("required value at {} is missing or null", render_path(.path))]
    NullValue {
        /// Location of the missing value inside the document.
        path: String,
    },

    /// The document shape disagrees with the destination shape.
    #[error("type mismatch at {}: expected {expected}, found {found}", render_path(.path))]
    TypeMismatch {
        /// Location of the offending value inside the document.
        path: String,
        /// Description of the destination shape.
        expected: String,
        /// Kind of the document value that was found instead.
        found: &'static str,
    },

    /// Numeric text does not fit the destination scalar.
    #[error("value {value:?} overflows {kind}")]
    Overflow {
        /// The offending text.
        value: String,
        /// The destination scalar kind.
        kind: ScalarKind,
    },

    /// Scalar text could not be parsed into the destination kind.
    #[error("cannot parse {value:?} as {kind}")]
    Parse {
        /// The offending text.
        value: String,
        /// The destination scalar kind.
        kind: ScalarKind,
    },

    /// The masker was handed a polymorphic root with nothing behind it.
    #[error("value must reference mutable storage")]
    NotAReference,

    /// `clear_by_name` was called with an empty field name.
    #[error("field name is required")]
    FieldNameRequired,

    /// The scalar codec does not handle this destination kind.
    #[error("unsupported destination kind: {kind}")]
    UnsupportedKind {
        /// Name of the unsupported kind.
        kind: &'static str,
    },

    /// The wire document is not well-formed JSON.
    #[error("malformed document: {0}")]
    Syntax(#[from] serde_json::Error),

    /// A panic raised while walking a value, recovered at the entry point.
    #[error("internal fault: {message}")]
    Fault {
        /// The panic payload, when it was a string.
        message: String,
    },
}

/// Fieldless discriminant of [`Error`], for matching in callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::NullValue`].
    NullValue,
    /// See [`Error::TypeMismatch`].
    TypeMismatch,
    /// See [`Error::Overflow`].
    Overflow,
    /// See [`Error::Parse`].
    Parse,
    /// See [`Error::NotAReference`].
    NotAReference,
    /// See [`Error::FieldNameRequired`].
    FieldNameRequired,
    /// See [`Error::UnsupportedKind`].
    UnsupportedKind,
    /// See [`Error::Syntax`].
    Syntax,
    /// See [`Error::Fault`].
    Fault,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NullValue => "null value",
            Self::TypeMismatch => "type mismatch",
            Self::Overflow => "overflow",
            Self::Parse => "parse",
            Self::NotAReference => "not a reference",
            Self::FieldNameRequired => "field name required",
            Self::UnsupportedKind => "unsupported kind",
            Self::Syntax => "syntax",
            Self::Fault => "fault",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NullValue { .. } => ErrorKind::NullValue,
            Error::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Error::Overflow { .. } => ErrorKind::Overflow,
            Error::Parse { .. } => ErrorKind::Parse,
            Error::NotAReference => ErrorKind::NotAReference,
            Error::FieldNameRequired => ErrorKind::FieldNameRequired,
            Error::UnsupportedKind { .. } => ErrorKind::UnsupportedKind,
            Error::Syntax(_) => ErrorKind::Syntax,
            Error::Fault { .. } => ErrorKind::Fault,
        }
    }

    /// A null-value error at the document root.
    pub fn null_value() -> Self {
        Error::NullValue {
            path: String::new(),
        }
    }

    /// A type-mismatch error at the document root.
    pub fn type_mismatch(expected: impl Into<String>, found: &serde_json::Value) -> Self {
        Error::TypeMismatch {
            path: String::new(),
            expected: expected.into(),
            found: value_kind(found),
        }
    }

    /// Returns the document path of a null-value or type-mismatch error.
    pub fn path(&self) -> Option<String> {
        match self {
            Error::NullValue { path } | Error::TypeMismatch { path, .. } => {
                Some(render_path(path))
            }
            _ => None,
        }
    }

    /// Prefixes the error path with a record field or map key.
    pub(crate) fn in_field(self, field: &str) -> Self {
        self.prefix(&format!(".{field}"))
    }

    /// Prefixes the error path with a sequence index.
    pub(crate) fn at_index(self, index: usize) -> Self {
        self.prefix(&format!("[{index}]"))
    }

    fn prefix(self, segment: &str) -> Self {
        match self {
            Error::NullValue { path } => Error::NullValue {
                path: format!("{segment}{path}"),
            },
            Error::TypeMismatch {
                path,
                expected,
                found,
            } => Error::TypeMismatch {
                path: format!("{segment}{path}"),
                expected,
                found,
            },
            other => other,
        }
    }
}

fn render_path(path: &str) -> String {
    format!("${path}")
}

/// Names the kind of a document value for error messages.
pub(crate) fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Runs an entry point, turning a panic into [`Error::Fault`].
///
/// Every public entry point goes through here so that a fault raised by a
/// user-supplied implementation never unwinds into the caller.
pub(crate) fn recover<T>(operation: &'static str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(operation, %message, "recovered panic");
            Err(Error::Fault { message })
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn paths_accumulate_outermost_last() {
        let err = Error::null_value().in_field("key").at_index(0).in_field("items");
        assert_eq!(err.path().as_deref(), Some("$.items[0].key"));
        assert_eq!(
            err.to_string(),
            "required value at $.items[0].key is missing or null"
        );
    }

    #[test]
    fn type_mismatch_names_found_kind() {
        let err = Error::type_mismatch("sequence", &json!({"a": 1}));
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(
            err.to_string(),
            "type mismatch at $: expected sequence, found object"
        );
    }

    #[test]
    fn prefix_leaves_other_kinds_alone() {
        let err = Error::FieldNameRequired.in_field("x");
        assert_eq!(err.kind(), ErrorKind::FieldNameRequired);
        assert!(err.path().is_none());
    }

    #[test]
    fn recover_converts_panics() {
        let result: Result<()> = recover("test", || panic!("boom"));
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fault);
        assert_eq!(err.to_string(), "internal fault: boom");
    }

    #[test]
    fn recover_passes_results_through() {
        let result = recover("test", || Ok(7));
        assert_eq!(result.unwrap(), 7);
    }
}
