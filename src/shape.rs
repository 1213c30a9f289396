//! Runtime shape descriptors.
//!
//! A [`Shape`] is a tagged description of how a value is structured. Shapes
//! drive the decoder and show up in diagnostics; they are discovered from the
//! destination type through the [`Shaped`] trait rather than by inspecting
//! values at runtime.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// External key marking a record field that never touches the wire.
pub const SKIP_KEY: &str = "-";

/// Kind of a scalar leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// `bool`
    Bool,
    /// Signed integer of the given bit width.
    Int(u32),
    /// Unsigned integer of the given bit width.
    Uint(u32),
    /// Floating point number of the given bit width.
    Float(u32),
    /// UTF-8 text.
    String,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKind::Bool => write!(f, "bool"),
            ScalarKind::Int(bits) => write!(f, "i{bits}"),
            ScalarKind::Uint(bits) => write!(f, "u{bits}"),
            ScalarKind::Float(bits) => write!(f, "f{bits}"),
            ScalarKind::String => write!(f, "string"),
        }
    }
}

/// Structure of a value, as seen by the generic walkers.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A leaf value.
    Scalar(ScalarKind),
    /// A homogeneous sequence.
    Sequence(Box<Shape>),
    /// An associative map from key shape to value shape.
    Map(Box<Shape>, Box<Shape>),
    /// A record with declared fields.
    Record(&'static RecordShape),
    /// An optional wrapper around the inner shape.
    Option(Box<Shape>),
    /// A value whose concrete shape is only known at runtime.
    Polymorphic,
}

impl Shape {
    /// Strips every level of [`Shape::Option`].
    pub fn innermost(&self) -> &Shape {
        let mut shape = self;
        while let Shape::Option(inner) = shape {
            shape = inner;
        }
        shape
    }

    /// Number of `Option` levels wrapped around the innermost shape.
    pub fn option_depth(&self) -> usize {
        let mut depth = 0;
        let mut shape = self;
        while let Shape::Option(inner) = shape {
            depth += 1;
            shape = inner;
        }
        depth
    }

    /// Whether the innermost shape is a record, map or sequence.
    pub fn is_composite(&self) -> bool {
        matches!(
            self.innermost(),
            Shape::Record(_) | Shape::Map(..) | Shape::Sequence(_)
        )
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Scalar(kind) => write!(f, "{kind}"),
            Shape::Sequence(elem) => write!(f, "sequence<{elem}>"),
            Shape::Map(key, value) => write!(f, "map<{key}, {value}>"),
            Shape::Record(record) => write!(f, "record {}", record.name),
            Shape::Option(inner) => write!(f, "option<{inner}>"),
            Shape::Polymorphic => write!(f, "any"),
        }
    }
}

/// Declared layout of a record type.
#[derive(Debug, PartialEq)]
pub struct RecordShape {
    /// Type name of the record.
    pub name: &'static str,
    /// Fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
}

impl RecordShape {
    /// Looks a field up by its declared name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Fields that are read from and written to the wire.
    pub fn wire_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|field| !field.is_skipped())
    }
}

/// One declared record field.
///
/// The field's shape is resolved on demand so that a record may contain
/// itself, e.g. a tree node holding `Vec<Node>`.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Declared field name.
    pub name: &'static str,
    /// Key used in the wire document, or [`SKIP_KEY`].
    pub key: &'static str,
    /// Whether the field must be present and non-null.
    pub required: bool,
    shape_of: fn() -> Shape,
}

impl FieldDescriptor {
    /// Describes a field of type `T`.
    pub fn of<T: Shaped>(name: &'static str, key: &'static str, required: bool) -> Self {
        Self {
            name,
            key,
            required,
            shape_of: T::shape,
        }
    }

    /// Shape of the field's type.
    pub fn shape(&self) -> Shape {
        (self.shape_of)()
    }

    /// Whether the field is hidden from the wire format.
    pub fn is_skipped(&self) -> bool {
        self.key == SKIP_KEY
    }
}

// Shapes of the same type always agree, so the resolver is not compared.
impl PartialEq for FieldDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.key == other.key && self.required == other.required
    }
}

/// Types with a statically known [`Shape`].
pub trait Shaped {
    /// Returns the shape of `Self`.
    fn shape() -> Shape;
}

macro_rules! scalar_shape {
    ($($ty:ty => $kind:expr),* $(,)?) => {
        $(
            impl Shaped for $ty {
                fn shape() -> Shape {
                    Shape::Scalar($kind)
                }
            }
        )*
    };
}

scalar_shape! {
    bool => ScalarKind::Bool,
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
    f32 => ScalarKind::Float(32),
    f64 => ScalarKind::Float(64),
    String => ScalarKind::String,
}

impl<T: Shaped> Shaped for Vec<T> {
    fn shape() -> Shape {
        Shape::Sequence(Box::new(T::shape()))
    }
}

impl<K: Shaped, V: Shaped, S> Shaped for HashMap<K, V, S> {
    fn shape() -> Shape {
        Shape::Map(Box::new(K::shape()), Box::new(V::shape()))
    }
}

impl<K: Shaped, V: Shaped> Shaped for BTreeMap<K, V> {
    fn shape() -> Shape {
        Shape::Map(Box::new(K::shape()), Box::new(V::shape()))
    }
}

impl<T: Shaped> Shaped for Option<T> {
    fn shape() -> Shape {
        Shape::Option(Box::new(T::shape()))
    }
}

impl<T: Shaped> Shaped for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }
}

impl<T: Shaped> Shaped for Arc<T> {
    fn shape() -> Shape {
        T::shape()
    }
}

impl Shaped for serde_json::Value {
    fn shape() -> Shape {
        Shape::Polymorphic
    }
}
