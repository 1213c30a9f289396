//! Masking: zeroing parts of a value selected by type or by name.
//!
//! The walk descends through records, sequences, maps, options, boxes and
//! [`Dynamic`] slots. Every entry point works on a copy and only commits it
//! once the walk has finished, so a failing call leaves the input untouched.
//!
//! ```
//! use std::collections::HashMap;
//! use wireshape::masked_by_name;
//!
//! let mut body = HashMap::new();
//! body.insert("username".to_string(), "tester".to_string());
//! body.insert("role".to_string(), "admin".to_string());
//!
//! let original = body.clone();
//! wireshape::clear_by_name(&mut body, "username").unwrap();
//! assert_eq!(body["username"], "");
//! assert_eq!(original["username"], "tester");
//!
//! let copy = masked_by_name(&original, "role").unwrap();
//! assert_eq!(copy["role"], "");
//! assert_eq!(original["role"], "admin");
//! ```

mod containers;
mod dynamic;

use std::any::{Any, TypeId};
use std::fmt;

pub use dynamic::Dynamic;

use crate::error::{recover, Error, Result};

/// Values the masker can walk.
///
/// The trait is object safe so that [`Dynamic`] can hold any implementor.
/// Records get an implementation from [`record!`](crate::record).
pub trait Mask: Any + fmt::Debug + Send + Sync {
    /// Zeroes every descendant whose type is `target`.
    ///
    /// The node itself has already been checked by the caller.
    fn mask_type(&mut self, target: TypeId);

    /// Zeroes every record field or map entry called `name` below this node.
    fn mask_name(&mut self, name: &str);

    /// Resets this node to its zero value.
    fn zero(&mut self);

    /// Clones this node behind a fresh box.
    fn clone_box(&self) -> Box<dyn Mask>;

    /// Upcasts to `Any`, for type checks and downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl Clone for Box<dyn Mask> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Zeroes `node` if it is a `target`, otherwise walks into it.
pub fn walk_type(node: &mut dyn Mask, target: TypeId) {
    if Any::type_id(node.as_any()) == target {
        node.zero();
    } else {
        node.mask_type(target);
    }
}

/// Walks into `node` looking for fields or keys called `name`.
pub fn walk_name(node: &mut dyn Mask, name: &str) {
    node.mask_name(name);
}

/// Clears a copy of `slot` and writes the copy back.
///
/// Used for slots that cannot be walked in place, such as map values.
pub(crate) fn substitute<T: Mask + Clone>(slot: &mut T, clear: impl FnOnce(&mut T)) {
    let mut copy = slot.clone();
    clear(&mut copy);
    *slot = copy;
}

/// Zeroes every part of `value` whose concrete type has the given id.
///
/// If `value` itself has that type, the whole value is zeroed.
pub fn clear_by_type<T: Mask + Clone>(value: &mut T, target: TypeId) -> Result<()> {
    let masked = masked_by_type(value, target)?;
    *value = masked;
    Ok(())
}

/// Zeroes every `Target` inside `value`.
///
/// ```
/// use wireshape::{clear_by_type_of, Secret};
///
/// let mut rows = vec![Secret::new("hunter2".to_string())];
/// clear_by_type_of::<Secret<String>, _>(&mut rows).unwrap();
/// assert_eq!(rows[0].expose_secret(), "");
/// ```
pub fn clear_by_type_of<Target: Any, T: Mask + Clone>(value: &mut T) -> Result<()> {
    tracing::trace!(target_type = std::any::type_name::<Target>(), "clearing by type");
    clear_by_type(value, TypeId::of::<Target>())
}

/// Returns a copy of `value` with every part of the given type zeroed.
pub fn masked_by_type<T: Mask + Clone>(value: &T, target: TypeId) -> Result<T> {
    recover("clear_by_type", || {
        ensure_reference(value)?;
        tracing::trace!(?target, "masking by type");
        let mut copy = value.clone();
        walk_type(&mut copy, target);
        Ok(copy)
    })
}

/// Zeroes every record field or map entry called `name` inside `value`.
///
/// Map keys are compared through their `Display` form. An empty name fails
/// with [`ErrorKind::FieldNameRequired`](crate::ErrorKind::FieldNameRequired).
pub fn clear_by_name<T: Mask + Clone>(value: &mut T, name: &str) -> Result<()> {
    let masked = masked_by_name(value, name)?;
    *value = masked;
    Ok(())
}

/// Returns a copy of `value` with every field or entry called `name` zeroed.
pub fn masked_by_name<T: Mask + Clone>(value: &T, name: &str) -> Result<T> {
    recover("clear_by_name", || {
        if name.is_empty() {
            return Err(Error::FieldNameRequired);
        }
        ensure_reference(value)?;
        tracing::trace!(name, "masking by name");
        let mut copy = value.clone();
        walk_name(&mut copy, name);
        Ok(copy)
    })
}

fn ensure_reference(value: &dyn Mask) -> Result<()> {
    match value.as_any().downcast_ref::<Dynamic>() {
        Some(dynamic) if dynamic.is_empty() => Err(Error::NotAReference),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{record, ErrorKind};
    use std::collections::HashMap;
    use std::sync::Arc;

    record! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Profile {
            required username: String,
            optional age: u32,
            optional tags: Vec<String>,
        }
    }

    record! {
        #[derive(Debug, Clone, Default)]
        struct Envelope {
            required profiles: HashMap<String, Vec<Profile>>,
            optional owner: Option<Box<Profile>>,
            optional extra: Dynamic,
        }
    }

    fn profile(name: &str, age: u32) -> Profile {
        Profile {
            username: name.to_string(),
            age,
            tags: vec!["a".to_string()],
        }
    }

    fn envelope() -> Envelope {
        let mut profiles = HashMap::new();
        profiles.insert("team".to_string(), vec![profile("ann", 30), profile("bob", 41)]);
        Envelope {
            profiles,
            owner: Some(Box::new(profile("root", 50))),
            extra: Dynamic::new(7_u32),
        }
    }

    #[test]
    fn clears_record_field_by_name() {
        let mut p = profile("tester", 20);
        clear_by_name(&mut p, "username").expect("clears");
        assert_eq!(p.username, "");
        assert_eq!(p.age, 20);
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut p = profile("tester", 20);
        let err = clear_by_name(&mut p, "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FieldNameRequired);
        assert_eq!(p.username, "tester");
    }

    #[test]
    fn empty_dynamic_root_is_not_a_reference() {
        let mut d = Dynamic::empty();
        let err = clear_by_name(&mut d, "x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAReference);
        let err = clear_by_type(&mut d, TypeId::of::<u32>()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAReference);
    }

    #[test]
    fn clears_through_map_of_sequences_of_records() {
        let mut env = envelope();
        clear_by_name(&mut env, "username").expect("clears");
        assert!(env.profiles["team"].iter().all(|p| p.username.is_empty()));
        assert_eq!(env.owner.as_ref().map(|p| p.username.as_str()), Some(""));
        assert_eq!(env.profiles["team"][1].age, 41);
    }

    #[test]
    fn clears_by_exact_type() {
        let mut env = envelope();
        clear_by_type_of::<u32, _>(&mut env).expect("clears");
        assert!(env.profiles["team"].iter().all(|p| p.age == 0));
        assert_eq!(env.owner.as_ref().map(|p| p.age), Some(0));
        assert_eq!(env.extra.downcast_ref::<u32>(), Some(&0));
        assert_eq!(env.profiles["team"][0].username, "ann");
    }

    #[test]
    fn matching_record_type_is_zeroed_whole() {
        let mut env = envelope();
        clear_by_type_of::<Profile, _>(&mut env).expect("clears");
        assert!(env.profiles["team"].iter().all(|p| *p == Profile::default()));
        assert_eq!(env.owner.as_deref(), Some(&Profile::default()));
    }

    #[test]
    fn empty_dynamic_members_are_skipped() {
        let mut env = envelope();
        env.extra = Dynamic::empty();
        clear_by_name(&mut env, "age").expect("clears");
        assert!(env.extra.is_empty());
        assert_eq!(env.profiles["team"][0].age, 0);
    }

    #[test]
    fn shared_arc_is_not_mutated() {
        let shared = Arc::new(profile("shared", 9));
        let mut holder = vec![Arc::clone(&shared)];
        clear_by_name(&mut holder, "username").expect("clears");
        assert_eq!(holder[0].username, "");
        assert_eq!(shared.username, "shared");
    }

    #[test]
    fn masked_copy_leaves_original() {
        let original = profile("tester", 20);
        let copy = masked_by_type(&original, TypeId::of::<String>()).expect("masks");
        assert_eq!(copy.username, "");
        assert_eq!(copy.tags, vec![String::new()]);
        assert_eq!(original.username, "tester");
    }

    #[derive(Debug, Clone, Default)]
    struct Exploding;

    impl Mask for Exploding {
        fn mask_type(&mut self, _target: TypeId) {
            panic!("exploded while masking");
        }

        fn mask_name(&mut self, _name: &str) {
            panic!("exploded while masking");
        }

        fn zero(&mut self) {}

        fn clone_box(&self) -> Box<dyn Mask> {
            Box::new(self.clone())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn panics_become_faults_and_leave_value_intact() {
        let mut env = envelope();
        env.extra = Dynamic::new(Exploding);
        let err = clear_by_name(&mut env, "username").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fault);
        assert_eq!(env.profiles["team"][0].username, "ann");
    }
}
