//! `Mask` implementations for scalars, std containers and JSON values.
//!
//! Map values are cleared through a copy that replaces the entry; sequence
//! elements are cleared in place.

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Debug, Display};
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use serde_json::Value;

use super::{substitute, walk_name, walk_type, Mask};

macro_rules! mask_leaf {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Mask for $ty {
                fn mask_type(&mut self, _target: TypeId) {}

                fn mask_name(&mut self, _name: &str) {}

                fn zero(&mut self) {
                    *self = <$ty>::default();
                }

                fn clone_box(&self) -> Box<dyn Mask> {
                    Box::new(self.clone())
                }

                fn as_any(&self) -> &dyn Any {
                    self
                }
            }
        )*
    };
}

mask_leaf!(bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, String);

impl<T: Mask + Clone> Mask for Vec<T> {
    fn mask_type(&mut self, target: TypeId) {
        for item in self.iter_mut() {
            walk_type(item, target);
        }
    }

    fn mask_name(&mut self, name: &str) {
        for item in self.iter_mut() {
            walk_name(item, name);
        }
    }

    fn zero(&mut self) {
        self.clear();
    }

    fn clone_box(&self) -> Box<dyn Mask> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Zeroes the entry if its key is `name`, otherwise walks into it.
fn mask_entry<K: Display, V: Mask + Clone>(key: &K, value: &mut V, name: &str) {
    if key.to_string() == name {
        value.zero();
    } else {
        substitute(value, |copy| walk_name(copy, name));
    }
}

impl<K, V, S> Mask for HashMap<K, V, S>
where
    K: Eq + Hash + Display + Debug + Clone + Send + Sync + 'static,
    V: Mask + Clone,
    S: BuildHasher + Clone + Send + Sync + 'static,
{
    fn mask_type(&mut self, target: TypeId) {
        for value in self.values_mut() {
            substitute(value, |copy| walk_type(copy, target));
        }
    }

    fn mask_name(&mut self, name: &str) {
        for (key, value) in self.iter_mut() {
            mask_entry(key, value, name);
        }
    }

    fn zero(&mut self) {
        self.clear();
    }

    fn clone_box(&self) -> Box<dyn Mask> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<K, V> Mask for BTreeMap<K, V>
where
    K: Ord + Display + Debug + Clone + Send + Sync + 'static,
    V: Mask + Clone,
{
    fn mask_type(&mut self, target: TypeId) {
        for value in self.values_mut() {
            substitute(value, |copy| walk_type(copy, target));
        }
    }

    fn mask_name(&mut self, name: &str) {
        for (key, value) in self.iter_mut() {
            mask_entry(key, value, name);
        }
    }

    fn zero(&mut self) {
        self.clear();
    }

    fn clone_box(&self) -> Box<dyn Mask> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: Mask + Clone> Mask for Option<T> {
    fn mask_type(&mut self, target: TypeId) {
        if let Some(inner) = self {
            walk_type(inner, target);
        }
    }

    fn mask_name(&mut self, name: &str) {
        if let Some(inner) = self {
            walk_name(inner, name);
        }
    }

    fn zero(&mut self) {
        *self = None;
    }

    fn clone_box(&self) -> Box<dyn Mask> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: Mask + Clone + Default> Mask for Box<T> {
    fn mask_type(&mut self, target: TypeId) {
        walk_type(&mut **self, target);
    }

    fn mask_name(&mut self, name: &str) {
        walk_name(&mut **self, name);
    }

    fn zero(&mut self) {
        **self = T::default();
    }

    fn clone_box(&self) -> Box<dyn Mask> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// make_mut detaches a shared Arc before writing, so other holders never see
// the cleared value.
impl<T: Mask + Clone + Default> Mask for Arc<T> {
    fn mask_type(&mut self, target: TypeId) {
        let inner: &mut T = Arc::make_mut(self);
        walk_type(inner, target);
    }

    fn mask_name(&mut self, name: &str) {
        let inner: &mut T = Arc::make_mut(self);
        walk_name(inner, name);
    }

    fn zero(&mut self) {
        *self = Arc::new(T::default());
    }

    fn clone_box(&self) -> Box<dyn Mask> {
        Box::new(Arc::clone(self))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn holds_type(value: &Value, target: TypeId) -> bool {
    match value {
        Value::Bool(_) => target == TypeId::of::<bool>(),
        Value::Number(_) => target == TypeId::of::<f64>(),
        Value::String(_) => target == TypeId::of::<String>(),
        _ => false,
    }
}

impl Mask for Value {
    fn mask_type(&mut self, target: TypeId) {
        if holds_type(self, target) {
            self.zero();
            return;
        }
        match self {
            Value::Array(items) => {
                for item in items.iter_mut() {
                    walk_type(item, target);
                }
            }
            Value::Object(object) => {
                for value in object.values_mut() {
                    substitute(value, |copy| walk_type(copy, target));
                }
            }
            _ => {}
        }
    }

    fn mask_name(&mut self, name: &str) {
        match self {
            Value::Array(items) => {
                for item in items.iter_mut() {
                    walk_name(item, name);
                }
            }
            Value::Object(object) => {
                for (key, value) in object.iter_mut() {
                    mask_entry(key, value, name);
                }
            }
            _ => {}
        }
    }

    fn zero(&mut self) {
        let zero = match self {
            Value::Null => Value::Null,
            Value::Bool(_) => Value::Bool(false),
            Value::Number(_) => Value::from(0),
            Value::String(_) => Value::String(String::new()),
            Value::Array(_) => Value::Array(Vec::new()),
            Value::Object(_) => Value::Object(serde_json::Map::new()),
        };
        *self = zero;
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
    use crate::{clear_by_name, clear_by_type_of, masked_by_name};
    use serde_json::{json, Value};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    #[test]
    fn json_entry_is_zeroed_by_kind() {
        let mut body = json!({"password": "pw", "pin": 1234, "admin": true, "roles": ["a"]});
        for name in ["password", "pin", "admin", "roles"] {
            clear_by_name(&mut body, name).expect("clears");
        }
        assert_eq!(body, json!({"password": "", "pin": 0, "admin": false, "roles": []}));
    }

    #[test]
    fn json_nested_names_are_found() {
        let body = json!({"users": [{"token": "a"}, {"token": "b", "id": 2}]});
        let masked = masked_by_name(&body, "token").expect("masks");
        assert_eq!(masked, json!({"users": [{"token": ""}, {"token": "", "id": 2}]}));
        assert_eq!(body["users"][0]["token"], "a");
    }

    #[test]
    fn json_leaves_match_by_kind() {
        let mut body = json!({"name": "x", "score": 9.5, "flags": [true, "y"]});
        clear_by_type_of::<String, _>(&mut body).expect("clears");
        assert_eq!(body, json!({"name": "", "score": 9.5, "flags": [true, ""]}));

        clear_by_type_of::<f64, _>(&mut body).expect("clears");
        assert_eq!(body["score"], 0);
    }

    #[test]
    fn whole_json_value_matches_its_own_type() {
        let mut body = json!({"a": 1});
        clear_by_type_of::<Value, _>(&mut body).expect("clears");
        assert_eq!(body, json!({}));
    }

    #[test]
    fn btree_map_keys_use_display() {
        let mut ports = BTreeMap::new();
        ports.insert(443_u16, "https".to_string());
        ports.insert(80_u16, "http".to_string());
        clear_by_name(&mut ports, "443").expect("clears");
        assert_eq!(ports[&443], "");
        assert_eq!(ports[&80], "http");
    }

    #[test]
    fn shared_arc_is_detached_before_clearing() {
        let shared = Arc::new(vec!["keep".to_string()]);
        let mut holder = Arc::clone(&shared);
        clear_by_type_of::<String, _>(&mut holder).expect("clears");
        assert_eq!(*holder, vec![String::new()]);
        assert_eq!(*shared, vec!["keep".to_string()]);

        clear_by_name(&mut holder, "anything").expect("walks");
        assert!(!Arc::ptr_eq(&holder, &shared));
    }

    #[test]
    fn option_matches_inner_type() {
        let mut slot = Some(vec![3_i32, 4]);
        clear_by_type_of::<i32, _>(&mut slot).expect("clears");
        assert_eq!(slot, Some(vec![0, 0]));

        clear_by_type_of::<Vec<i32>, _>(&mut slot).expect("clears");
        assert_eq!(slot, Some(Vec::new()));
    }
}
