//! Pass-through field operations on a raw `Value`.
//!
//! This is the whole mechanism of mutate mode: the same protocol as the COW
//! views, but reads return sub-values directly and writes land in the target
//! immediately, with no change log and no recursive shielding. Operations on
//! a value of the wrong shape are no-ops, matching permissive dynamic-record
//! semantics.

use std::rc::Rc;

use crate::shield::change::is_reserved;
use crate::value::{FieldName, Value};

pub(crate) fn get(target: &Value, name: &str) -> Option<Value> {
    if is_reserved(name) {
        return None;
    }
    match target {
        Value::Record(map) => map.get(name).cloned(),
        _ => None,
    }
}

pub(crate) fn set(target: &mut Value, name: &str, value: Value) {
    if is_reserved(name) {
        return;
    }
    if let Value::Record(map) = target {
        Rc::make_mut(map).insert(FieldName::new(name), value);
    }
}

pub(crate) fn delete(target: &mut Value, name: &str) {
    if is_reserved(name) {
        return;
    }
    if let Value::Record(map) = target {
        Rc::make_mut(map).shift_remove(name);
    }
}

pub(crate) fn has(target: &Value, name: &str) -> bool {
    if is_reserved(name) {
        return false;
    }
    matches!(target, Value::Record(map) if map.contains_key(name))
}

pub(crate) fn keys(target: &Value) -> Vec<FieldName> {
    match target {
        Value::Record(map) => map
            .keys()
            .filter(|k| !is_reserved(k))
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn get_at(target: &Value, index: usize) -> Option<Value> {
    match target {
        Value::Seq(items) => items.get(index).cloned(),
        _ => None,
    }
}

/// Index writes past the end extend the sequence, padding with `Null`
/// (host array convention; the caller is responsible for sane indices).
pub(crate) fn set_at(target: &mut Value, index: usize, value: Value) {
    if let Value::Seq(items) = target {
        let items = Rc::make_mut(items);
        if index < items.len() {
            items[index] = value;
        } else {
            items.resize(index, Value::Null);
            items.push(value);
        }
    }
}

pub(crate) fn len(target: &Value) -> Option<usize> {
    match target {
        Value::Seq(items) => Some(items.len()),
        _ => None,
    }
}

pub(crate) fn sub_mut<'s>(target: &'s mut Value, name: &str) -> Option<&'s mut Value> {
    if is_reserved(name) {
        return None;
    }
    match target {
        Value::Record(map) => Rc::make_mut(map).get_mut(name),
        _ => None,
    }
}

pub(crate) fn sub_mut_at(target: &mut Value, index: usize) -> Option<&mut Value> {
    match target {
        Value::Seq(items) => Rc::make_mut(items).get_mut(index),
        _ => None,
    }
}
