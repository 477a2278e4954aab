use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::*;
use crate::namespace::Namespace;

fn class(name: &str, bases: &[&Rc<ClassObject>]) -> Rc<ClassObject> {
    ClassObject::new(
        name,
        name,
        "__main__",
        bases.iter().map(|b| Rc::clone(b)).collect(),
        Namespace::new(),
    )
    .unwrap_or_else(|| panic!("no MRO for {name}"))
}

fn names(mro: &[Rc<ClassObject>]) -> Vec<&str> {
    mro.iter().map(|c| c.name.as_str()).collect()
}

#[test]
fn numerically_equal_keys_collide() {
    assert_eq!(Value::Int(1).hash_key(), Value::Bool(true).hash_key());
    assert_eq!(Value::Int(2).hash_key(), Value::Float(2.0).hash_key());
    assert_ne!(Value::Float(2.5).hash_key(), Value::Int(2).hash_key());
}

#[test]
fn mutable_containers_are_unhashable() {
    assert!(Value::list(vec![]).hash_key().is_none());
    assert!(Value::dict(DictValue::new()).hash_key().is_none());
    assert!(Value::tuple(vec![Value::list(vec![])]).hash_key().is_none());
    assert!(Value::tuple(vec![Value::Int(1), Value::from("a")]).hash_key().is_some());
}

#[test]
fn range_length_and_indexing() {
    let r = RangeValue { start: 0, stop: 10, step: 3 };
    assert_eq!(r.len(), 4);
    assert_eq!(r.iter().collect::<Vec<_>>(), vec![0, 3, 6, 9]);
    let down = RangeValue { start: 5, stop: 0, step: -2 };
    assert_eq!(down.iter().collect::<Vec<_>>(), vec![5, 3, 1]);
    assert!(RangeValue { start: 3, stop: 3, step: 1 }.is_empty());
    assert_eq!(down.get(3), None);
}

#[test]
fn diamond_linearizes_depth_first_with_shared_base_last() {
    let object = ClassObject::builtin_type(TypeTag::Object, None);
    let a = class("A", &[&object]);
    let b = class("B", &[&a]);
    let c = class("C", &[&a]);
    let d = class("D", &[&b, &c]);
    assert_eq!(names(&d.mro()), vec!["D", "B", "C", "A", "object"]);
    assert!(d.is_subclass_of(&a));
    assert!(!a.is_subclass_of(&d));
}

#[test]
fn inconsistent_hierarchy_has_no_mro() {
    let object = ClassObject::builtin_type(TypeTag::Object, None);
    let a = class("A", &[&object]);
    let b = class("B", &[&a]);
    assert!(ClassObject::new("X", "X", "m", vec![a, b], Namespace::new()).is_none());
}

#[test]
fn lookup_walks_the_mro() {
    let object = ClassObject::builtin_type(TypeTag::Object, None);
    let base = class("Base", &[&object]);
    base.dict.set("greet", Value::from("hi"));
    let child = class("Child", &[&base]);
    assert!(matches!(child.lookup("greet"), Some(Value::Str(s)) if &*s == "hi"));
    assert!(child.lookup("missing").is_none());
}

#[test]
fn dict_keeps_insertion_order_across_overwrite_and_removal() {
    let mut dict = DictValue::new();
    for (k, v) in [("a", 1), ("b", 2), ("c", 3)] {
        let key = Value::from(k);
        dict.insert(key.hash_key().unwrap_or(HashKey::None), key, Value::Int(v));
    }
    let b = Value::from("b").hash_key().unwrap_or(HashKey::None);
    let a = Value::from("a").hash_key().unwrap_or(HashKey::None);
    dict.insert(a.clone(), Value::from("a"), Value::Int(10));
    assert!(dict.remove(&b).is_some());
    let keys: Vec<_> = dict.keys().filter_map(|k| k.as_str().map(str::to_owned)).collect();
    assert_eq!(keys, vec!["a", "c"]);
    assert!(matches!(dict.get(&a), Some(Value::Int(10))));
    assert!(dict.pop_last().is_some());
    assert_eq!(dict.len(), 1);
}

#[test]
fn type_names_follow_the_builtin_names() {
    assert_eq!(Value::None.type_name(), "NoneType");
    assert_eq!(Value::Bool(true).type_name(), "bool");
    assert_eq!(Value::list(vec![]).type_name(), "list");
    assert!(TypeTag::Bool.is_subtype_of(TypeTag::Int));
    assert!(!TypeTag::Int.is_subtype_of(TypeTag::Bool));
}

#[test]
fn identity_distinguishes_equal_lists() {
    let a = Value::list(vec![Value::Int(1)]);
    let b = Value::list(vec![Value::Int(1)]);
    assert!(a.is(&a.clone()));
    assert!(!a.is(&b));
    assert!(Value::None.is(&Value::None));
}

fn int_set(items: &[i64]) -> SetValue {
    let mut set = SetValue::new();
    for &i in items {
        set.insert(HashKey::Int(i), Value::Int(i));
    }
    set
}

fn members(set: &SetValue) -> Vec<i64> {
    set.iter()
        .map(|member| match member {
            Value::Int(i) => *i,
            other => panic!("unexpected member {other:?}"),
        })
        .collect()
}

#[test]
fn set_algebra_keeps_left_order() {
    let a = int_set(&[3, 1, 2]);
    let b = int_set(&[2, 4, 3]);
    assert_eq!(members(&a.union(&b)), [3, 1, 2, 4]);
    assert_eq!(members(&a.intersection(&b)), [3, 2]);
    assert_eq!(members(&a.difference(&b)), [1]);
    assert_eq!(members(&a.symmetric_difference(&b)), [1, 4]);
    assert!(int_set(&[1, 2]).is_subset(&a));
    assert!(!a.is_subset(&b));
}

#[test]
fn set_insert_ignores_equal_members() {
    let mut set = int_set(&[1]);
    assert!(!set.insert(HashKey::Int(1), Value::Float(1.0)));
    assert!(set.insert(HashKey::Int(2), Value::Int(2)));
    assert_eq!(set.len(), 2);
    assert!(matches!(set.remove(&HashKey::Int(1)), Some(Value::Int(1))));
    assert!(matches!(set.pop(), Some(Value::Int(2))));
    assert!(set.is_empty());
}

#[test]
fn complex_and_bytes_keys() {
    assert_eq!(
        Value::Complex(Complex::new(2.0, 0.0)).hash_key(),
        Value::Int(2).hash_key()
    );
    assert_ne!(
        Value::Complex(Complex::new(2.0, 1.0)).hash_key(),
        Value::Int(2).hash_key()
    );
    assert_eq!(
        Value::bytes(b"ab".to_vec()).hash_key(),
        Value::bytes(&b"ab"[..]).hash_key()
    );
    assert_eq!(Value::set(SetValue::new()).hash_key(), None);
}
