//! String codec for path and query parameters.
//!
//! Unlike the document decoder, text parsed into a number is always range
//! checked: `"1000"` into a `u8` is an overflow, never a truncation.
//!
//! ```
//! use wireshape::{from_string, to_string, ErrorKind};
//!
//! assert_eq!(to_string(&vec![1.5, 2.0]), "1.5,2");
//!
//! let mut ids: Vec<u32> = Vec::new();
//! from_string("1,2,3", &mut ids).unwrap();
//! assert_eq!(ids, vec![1, 2, 3]);
//!
//! let mut small = 0_u8;
//! let err = from_string("1000", &mut small).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Overflow);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::num::IntErrorKind;
use std::sync::Arc;

use crate::error::{recover, Error, Result};
use crate::shape::ScalarKind;

/// Values that render as a parameter string.
pub trait ToParam {
    /// Renders `self`. Numbers use the shortest form that parses back exactly.
    fn to_param(&self) -> String;
}

/// Values that can be filled in from a parameter string.
pub trait FromParam {
    /// Parses `text` into `self`.
    ///
    /// Sequences append to their current contents. An empty option gets a
    /// freshly parsed inner value; a filled one parses into what it holds.
    fn from_param(&mut self, text: &str) -> Result<()>;
}

/// Renders `value` as a parameter string.
pub fn to_string<T: ToParam + ?Sized>(value: &T) -> String {
    value.to_param()
}

/// Parses `text` into `destination`.
///
/// Empty text yields the zero value. On error `destination` keeps its
/// previous contents.
pub fn from_string<T: FromParam + ?Sized>(text: &str, destination: &mut T) -> Result<()> {
    let result = recover("from_string", || destination.from_param(text));
    if let Err(err) = &result {
        tracing::debug!(text, error = %err, "parameter rejected");
    }
    result
}

macro_rules! display_param {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToParam for $ty {
                fn to_param(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

display_param!(bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, str, String);

impl<T: ToParam> ToParam for [T] {
    fn to_param(&self) -> String {
        self.iter().map(ToParam::to_param).collect::<Vec<_>>().join(",")
    }
}

impl<T: ToParam> ToParam for Vec<T> {
    fn to_param(&self) -> String {
        self.as_slice().to_param()
    }
}

impl<T: ToParam> ToParam for Option<T> {
    fn to_param(&self) -> String {
        match self {
            Some(value) => value.to_param(),
            None => String::new(),
        }
    }
}

impl<T: ToParam + ?Sized> ToParam for &T {
    fn to_param(&self) -> String {
        (**self).to_param()
    }
}

impl<T: ToParam + ?Sized> ToParam for Box<T> {
    fn to_param(&self) -> String {
        (**self).to_param()
    }
}

impl<T: ToParam + ?Sized> ToParam for Arc<T> {
    fn to_param(&self) -> String {
        (**self).to_param()
    }
}

macro_rules! int_param {
    ($($ty:ty => $kind:expr),* $(,)?) => {
        $(
            impl FromParam for $ty {
                fn from_param(&mut self, text: &str) -> Result<()> {
                    if text.is_empty() {
                        *self = 0;
                        return Ok(());
                    }
                    *self = text.parse::<$ty>().map_err(|err| match err.kind() {
                        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => Error::Overflow {
                            value: text.to_string(),
                            kind: $kind,
                        },
                        _ => Error::Parse {
                            value: text.to_string(),
                            kind: $kind,
                        },
                    })?;
                    Ok(())
                }
            }
        )*
    };
}

int_param! {
    i8 => ScalarKind::Int(8),
    i16 => ScalarKind::Int(16),
    i32 => ScalarKind::Int(32),
    i64 => ScalarKind::Int(64),
    isize => ScalarKind::Int(usize::BITS),
    u8 => ScalarKind::Uint(8),
    u16 => ScalarKind::Uint(16),
    u32 => ScalarKind::Uint(32),
    u64 => ScalarKind::Uint(64),
    usize => ScalarKind::Uint(usize::BITS),
}

fn is_infinity_literal(text: &str) -> bool {
    let magnitude = text.trim_start_matches(['+', '-']);
    magnitude.eq_ignore_ascii_case("inf") || magnitude.eq_ignore_ascii_case("infinity")
}

macro_rules! float_param {
    ($($ty:ty => $kind:expr),* $(,)?) => {
        $(
            impl FromParam for $ty {
                fn from_param(&mut self, text: &str) -> Result<()> {
                    if text.is_empty() {
                        *self = 0.0;
                        return Ok(());
                    }
                    let parsed = text.parse::<$ty>().map_err(|_| Error::Parse {
                        value: text.to_string(),
                        kind: $kind,
                    })?;
                    if parsed.is_infinite() && !is_infinity_literal(text) {
                        return Err(Error::Overflow {
                            value: text.to_string(),
                            kind: $kind,
                        });
                    }
                    *self = parsed;
                    Ok(())
                }
            }
        )*
    };
}

float_param! {
    f32 => ScalarKind::Float(32),
    f64 => ScalarKind::Float(64),
}

impl FromParam for bool {
    fn from_param(&mut self, text: &str) -> Result<()> {
        *self = match text {
            "" | "0" | "f" | "F" | "false" | "FALSE" | "False" => false,
            "1" | "t" | "T" | "true" | "TRUE" | "True" => true,
            _ => {
                return Err(Error::Parse {
                    value: text.to_string(),
                    kind: ScalarKind::Bool,
                })
            }
        };
        Ok(())
    }
}

impl FromParam for String {
    fn from_param(&mut self, text: &str) -> Result<()> {
        text.clone_into(self);
        Ok(())
    }
}

impl<T: FromParam + Default> FromParam for Vec<T> {
    fn from_param(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let mut parsed = Vec::new();
        for piece in text.split(',') {
            let mut item = T::default();
            item.from_param(piece)?;
            parsed.push(item);
        }
        self.extend(parsed);
        Ok(())
    }
}

impl<T: FromParam + Default> FromParam for Option<T> {
    fn from_param(&mut self, text: &str) -> Result<()> {
        match self {
            Some(inner) => inner.from_param(text),
            None => {
                let mut inner = T::default();
                inner.from_param(text)?;
                *self = Some(inner);
                Ok(())
            }
        }
    }
}

impl<T: FromParam + ?Sized> FromParam for Box<T> {
    fn from_param(&mut self, text: &str) -> Result<()> {
        (**self).from_param(text)
    }
}

impl<K, V, S> FromParam for HashMap<K, V, S> {
    fn from_param(&mut self, _text: &str) -> Result<()> {
        Err(Error::UnsupportedKind { kind: "map" })
    }
}

impl<K, V> FromParam for BTreeMap<K, V> {
    fn from_param(&mut self, _text: &str) -> Result<()> {
        Err(Error::UnsupportedKind { kind: "map" })
    }
}

impl<T, const N: usize> FromParam for [T; N] {
    fn from_param(&mut self, _text: &str) -> Result<()> {
        Err(Error::UnsupportedKind { kind: "array" })
    }
}
