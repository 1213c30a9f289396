/// Declares a record type: a struct together with its static
/// [`RecordShape`](crate::RecordShape) and its [`Decode`](crate::Decode) and
/// [`Mask`](crate::Mask) implementations. Each field is prefixed with a mode:
///
/// - `required`: must be present and non-null in the wire document.
/// - `optional`: may be absent or null; the field then keeps its default.
/// - `skip`: never read from the wire; decoding leaves it at its default.
///
/// The wire key defaults to the field name and can be overridden with
/// `= "key"` after the type.
///
/// ```
/// use wireshape::{record, Shaped, Shape};
///
/// record! {
///     #[derive(Debug, Clone, Default)]
///     pub struct Account {
///         required user_name: String = "userName",
///         optional tags: Vec<String>,
///         skip session: Option<String>,
///     }
/// }
///
/// let Shape::Record(shape) = Account::shape() else { unreachable!() };
/// assert_eq!(shape.fields[0].key, "userName");
/// assert!(shape.fields[0].required);
/// assert!(shape.fields[2].is_skipped());
/// ```
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $mode:ident $field:ident : $fty:ty $(= $key:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                pub $field: $fty,
            )*
        }

        impl $crate::Shaped for $name {
            fn shape() -> $crate::Shape {
                static SHAPE: ::std::sync::OnceLock<$crate::shape::RecordShape> =
                    ::std::sync::OnceLock::new();
                $crate::Shape::Record(SHAPE.get_or_init(|| $crate::shape::RecordShape {
                    name: stringify!($name),
                    fields: vec![
                        $(
                            $crate::shape::FieldDescriptor::of::<$fty>(
                                stringify!($field),
                                $crate::__record_key!($mode $field $(= $key)?),
                                $crate::__record_required!($mode),
                            ),
                        )*
                    ],
                }))
            }
        }

        impl $crate::Decode for $name {
            fn coerce(value: $crate::Value) -> $crate::Result<Self> {
                #[allow(unused_mut, unused_variables)]
                let Some(mut object) = $crate::decode::record_object::<Self>(value)? else {
                    return Ok(<Self as ::std::default::Default>::default());
                };
                #[allow(unused_mut)]
                let mut record = <Self as ::std::default::Default>::default();
                $(
                    $crate::decode::coerce_field(
                        &mut object,
                        $crate::__record_key!($mode $field $(= $key)?),
                        $crate::__record_required!($mode),
                        &mut record.$field,
                    )?;
                )*
                Ok(record)
            }
        }

        impl $crate::Mask for $name {
            #[allow(unused_variables)]
            fn mask_type(&mut self, target: ::std::any::TypeId) {
                $( $crate::mask::walk_type(&mut self.$field, target); )*
            }

            #[allow(unused_variables)]
            fn mask_name(&mut self, name: &str) {
                $(
                    if stringify!($field) == name {
                        $crate::Mask::zero(&mut self.$field);
                    } else {
                        $crate::mask::walk_name(&mut self.$field, name);
                    }
                )*
            }

            fn zero(&mut self) {
                *self = <Self as ::std::default::Default>::default();
            }

            fn clone_box(&self) -> ::std::boxed::Box<dyn $crate::Mask> {
                ::std::boxed::Box::new(::std::clone::Clone::clone(self))
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_key {
    (skip $field:ident $(= $key:literal)?) => {
        $crate::shape::SKIP_KEY
    };
    ($mode:ident $field:ident = $key:literal) => {
        $key
    };
    ($mode:ident $field:ident) => {
        stringify!($field)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_required {
    (required) => {
        true
    };
    (optional) => {
        false
    };
    (skip) => {
        false
    };
}

#[cfg(test)]
mod tests {
    use crate::{decode_str, ErrorKind, Shape, Shaped};

    record! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Login {
            required key: String,
            optional attempts: u32 = "tries",
            skip cache: String,
        }
    }

    record! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Empty {}
    }

    record! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Node {
            required name: String,
            optional children: Vec<Node>,
        }
    }

    #[test]
    fn shape_is_built_once() {
        let (Shape::Record(first), Shape::Record(second)) = (Login::shape(), Login::shape()) else {
            panic!("record shape expected");
        };
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.name, "Login");
        assert_eq!(first.wire_fields().count(), 2);
        assert_eq!(first.field("attempts").map(|f| f.key), Some("tries"));
    }

    #[test]
    fn skipped_field_ignores_wire_key() {
        let mut login = Login {
            cache: "kept".into(),
            ..Login::default()
        };
        decode_str(
            r#"{"key":"k","tries":3,"cache":"wire","-":"x"}"#,
            &mut login,
            true,
        )
        .expect("decodes");
        assert_eq!(login.key, "k");
        assert_eq!(login.attempts, 3);
        assert_eq!(login.cache, "");
    }

    #[test]
    fn required_null_field_fails() {
        let mut login = Login::default();
        let err = decode_str(r#"{"key":null}"#, &mut login, true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NullValue);
        assert_eq!(err.path().as_deref(), Some("$.key"));
        assert_eq!(login, Login::default());
    }

    #[test]
    fn recursive_record_decodes() {
        let mut root = Node::default();
        decode_str(
            r#"{"name":"root","children":[{"name":"leaf","children":[{"name":"deep"}]}]}"#,
            &mut root,
            true,
        )
        .expect("decodes");
        assert_eq!(root.children[0].name, "leaf");
        assert_eq!(root.children[0].children[0].name, "deep");

        let Shape::Record(shape) = Node::shape() else {
            panic!("record shape expected");
        };
        let children = shape.field("children").expect("declared");
        assert_eq!(children.shape().to_string(), "sequence<record Node>");
    }

    #[test]
    fn null_element_becomes_default_record() {
        let mut logins: Vec<Login> = Vec::new();
        decode_str(r#"[null, {"key":"k"}]"#, &mut logins, true).expect("decodes");
        assert_eq!(logins[0], Login::default());
        assert_eq!(logins[1].key, "k");
    }

    #[test]
    fn empty_record_accepts_any_object() {
        let mut empty = Empty::default();
        decode_str(r#"{"anything":[1,2]}"#, &mut empty, true).expect("decodes");
        assert_eq!(empty, Empty {});
    }
}
