//! Type-directed decoding of JSON documents.
//!
//! Decoding runs in two stages. The wire document is first parsed into a
//! generic [`Value`]; the value is then coerced into the destination type,
//! driven by the destination's [`Shape`]. Required record fields are enforced
//! at every nesting depth while coercing.
//!
//! # Numeric narrowing
//!
//! Numbers nested inside records, sequences and maps are narrowed with `as`
//! casts: `300` decoded into a `u8` field becomes `44` and `1.9` decoded into
//! an integer field becomes `1`. Only a scalar destination at the top level of
//! a document is range-checked. Callers that need strict bounds on nested
//! numbers must validate them separately.
//!
//! # Examples
//!
//! ```
//! use wireshape::{decode_str, record, ErrorKind};
//!
//! record! {
//!     #[derive(Debug, Clone, Default, PartialEq)]
//!     pub struct Credentials {
//!         required key: String,
//!         optional note: Option<String>,
//!     }
//! }
//!
//! let mut creds = Credentials::default();
//! decode_str(r#"{"key":"test123"}"#, &mut creds, true).unwrap();
//! assert_eq!(creds.key, "test123");
//!
//! let err = decode_str("{}", &mut Credentials::default(), true).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::NullValue);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::io::Read;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{recover, Error, Result};
use crate::shape::{Shape, Shaped, SKIP_KEY};

/// Types that can be populated from a generic document value.
///
/// Implemented for scalars, `String`, `Vec`, `HashMap`, `BTreeMap`, `Option`,
/// `Box`, `Arc` and [`Value`] itself. Records get an implementation from
/// [`record!`](crate::record).
pub trait Decode: Shaped + Default + Sized {
    /// Recursively converts `value` into `Self`.
    ///
    /// `null` converts to the zero value, except for `Option` which converts
    /// to `None`. Required-field checks happen one level up, in the record
    /// that owns the field.
    fn coerce(value: Value) -> Result<Self>;

    /// Converts a top-level, non-null scalar document into `Self`.
    ///
    /// Numeric types override this with range-checked conversion.
    fn decode_native(value: Value) -> Result<Self> {
        Self::coerce(value)
    }

    /// Converts a JSON object key into a map key of type `Self`.
    fn coerce_key(key: String) -> Result<Self> {
        Self::coerce(Value::String(key))
    }
}

/// Decodes a JSON document read from `reader` into `destination`.
///
/// When `required` is set, a `null` document fails with
/// [`ErrorKind::NullValue`](crate::ErrorKind::NullValue). Otherwise a `null`
/// document leaves `destination` untouched. On any error `destination` is
/// left as it was.
pub fn decode<T: Decode, R: Read>(reader: R, destination: &mut T, required: bool) -> Result<()> {
    recover("decode", || {
        let document: Value = serde_json::from_reader(reader)?;
        decode_document(document, destination, required)
    })
}

/// Decodes a JSON document held in a byte slice. See [`decode`].
pub fn decode_slice<T: Decode>(bytes: &[u8], destination: &mut T, required: bool) -> Result<()> {
    recover("decode", || {
        let document: Value = serde_json::from_slice(bytes)?;
        decode_document(document, destination, required)
    })
}

/// Decodes a JSON document held in a string. See [`decode`].
pub fn decode_str<T: Decode>(text: &str, destination: &mut T, required: bool) -> Result<()> {
    decode_slice(text.as_bytes(), destination, required)
}

/// Decodes an already parsed document. See [`decode`].
pub fn decode_value<T: Decode>(document: Value, destination: &mut T, required: bool) -> Result<()> {
    recover("decode", || decode_document(document, destination, required))
}

fn decode_document<T: Decode>(document: Value, destination: &mut T, required: bool) -> Result<()> {
    let shape = T::shape();
    tracing::trace!(%shape, required, "decoding document");

    let result = if shape.is_composite() {
        decode_composite(shape.innermost(), document, destination, required)
    } else if document.is_null() {
        null_document(required)
    } else {
        T::decode_native(document).map(|value| *destination = value)
    };

    if let Err(err) = &result {
        tracing::debug!(%shape, error = %err, "decode failed");
    }
    result
}

fn decode_composite<T: Decode>(
    innermost: &Shape,
    document: Value,
    destination: &mut T,
    required: bool,
) -> Result<()> {
    match (innermost, &document) {
        (_, Value::Null) => return null_document(required),
        (Shape::Sequence(_), Value::Array(_)) => {}
        (Shape::Record(_) | Shape::Map(..), Value::Object(_)) => {}
        _ => return Err(Error::type_mismatch(innermost.to_string(), &document)),
    }
    *destination = T::coerce(document)?;
    Ok(())
}

fn null_document(required: bool) -> Result<()> {
    if required {
        Err(Error::null_value())
    } else {
        Ok(())
    }
}

/// Populates one record field from `object`. Used by [`record!`](crate::record).
///
/// A missing or `null` entry fails when `required` is set and otherwise
/// leaves `slot` untouched.
#[doc(hidden)]
pub fn coerce_field<T: Decode>(
    object: &mut Map<String, Value>,
    key: &str,
    required: bool,
    slot: &mut T,
) -> Result<()> {
    if key == SKIP_KEY {
        return Ok(());
    }
    match object.remove(key) {
        Some(value) if !value.is_null() => {
            *slot = T::coerce(value).map_err(|err| err.in_field(key))?;
            Ok(())
        }
        _ if required => {
            tracing::trace!(field = key, "required field missing or null");
            Err(Error::null_value().in_field(key))
        }
        _ => Ok(()),
    }
}

/// Unwraps the object behind a record. Used by [`record!`](crate::record).
///
/// `null` yields `None`; the record then takes its default value, like any
/// other null element or map value.
#[doc(hidden)]
pub fn record_object<T: Shaped>(value: Value) -> Result<Option<Map<String, Value>>> {
    match value {
        Value::Object(object) => Ok(Some(object)),
        Value::Null => Ok(None),
        other => Err(Error::type_mismatch(T::shape().to_string(), &other)),
    }
}

fn mismatch<T: Shaped>(value: &Value) -> Error {
    Error::type_mismatch(T::shape().to_string(), value)
}

impl Decode for bool {
    fn coerce(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(false),
            Value::Bool(b) => Ok(b),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn coerce_key(key: String) -> Result<Self> {
        key.parse()
            .map_err(|_| mismatch::<Self>(&Value::String(key)))
    }
}

impl Decode for String {
    fn coerce(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(String::new()),
            Value::String(s) => Ok(s),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

macro_rules! decode_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Decode for $ty {
                fn coerce(value: Value) -> Result<Self> {
                    match &value {
                        Value::Null => Ok(0),
                        Value::Number(n) => {
                            if let Some(i) = n.as_i64() {
                                Ok(i as $ty)
                            } else if let Some(u) = n.as_u64() {
                                Ok(u as $ty)
                            } else {
                                Ok(n.as_f64().unwrap_or_default() as $ty)
                            }
                        }
                        other => Err(mismatch::<Self>(other)),
                    }
                }

                fn decode_native(value: Value) -> Result<Self> {
                    let checked = match &value {
                        Value::Number(n) => n
                            .as_i64()
                            .and_then(|i| <$ty>::try_from(i).ok())
                            .or_else(|| n.as_u64().and_then(|u| <$ty>::try_from(u).ok())),
                        _ => None,
                    };
                    checked.ok_or_else(|| mismatch::<Self>(&value))
                }

                fn coerce_key(key: String) -> Result<Self> {
                    key.parse()
                        .map_err(|_| mismatch::<Self>(&Value::String(key)))
                }
            }
        )*
    };
}

decode_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! decode_float {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Decode for $ty {
                fn coerce(value: Value) -> Result<Self> {
                    match &value {
                        Value::Null => Ok(0.0),
                        Value::Number(n) => Ok(n.as_f64().unwrap_or_default() as $ty),
                        other => Err(mismatch::<Self>(other)),
                    }
                }

                fn decode_native(value: Value) -> Result<Self> {
                    match &value {
                        Value::Number(n) => {
                            let narrow = n.as_f64().unwrap_or_default() as $ty;
                            if narrow.is_finite() {
                                Ok(narrow)
                            } else {
                                Err(mismatch::<Self>(&value))
                            }
                        }
                        _ => Err(mismatch::<Self>(&value)),
                    }
                }
            }
        )*
    };
}

decode_float!(f32, f64);

impl Decode for Value {
    fn coerce(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn coerce(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| T::coerce(item).map_err(|err| err.at_index(index)))
                .collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<K, V, S> Decode for HashMap<K, V, S>
where
    K: Decode + Eq + Hash,
    V: Decode,
    S: BuildHasher + Default,
{
    fn coerce(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(HashMap::default()),
            Value::Object(object) => object
                .into_iter()
                .map(|(key, value)| coerce_entry::<K, V>(key, value))
                .collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<K, V> Decode for BTreeMap<K, V>
where
    K: Decode + Ord,
    V: Decode,
{
    fn coerce(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(BTreeMap::new()),
            Value::Object(object) => object
                .into_iter()
                .map(|(key, value)| coerce_entry::<K, V>(key, value))
                .collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

fn coerce_entry<K: Decode, V: Decode>(key: String, value: Value) -> Result<(K, V)> {
    let value = V::coerce(value).map_err(|err| err.in_field(&key))?;
    let key_path = key.clone();
    let key = K::coerce_key(key).map_err(|err| err.in_field(&key_path))?;
    Ok((key, value))
}

impl<T: Decode> Decode for Option<T> {
    fn coerce(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::coerce(other).map(Some),
        }
    }

    fn decode_native(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::decode_native(other).map(Some),
        }
    }
}

impl<T: Decode> Decode for Box<T> {
    fn coerce(value: Value) -> Result<Self> {
        T::coerce(value).map(Box::new)
    }

    fn decode_native(value: Value) -> Result<Self> {
        T::decode_native(value).map(Box::new)
    }

    fn coerce_key(key: String) -> Result<Self> {
        T::coerce_key(key).map(Box::new)
    }
}

impl<T: Decode> Decode for Arc<T> {
    fn coerce(value: Value) -> Result<Self> {
        T::coerce(value).map(Arc::new)
    }

    fn decode_native(value: Value) -> Result<Self> {
        T::decode_native(value).map(Arc::new)
    }
}
