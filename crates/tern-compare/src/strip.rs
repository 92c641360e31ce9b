//! Data-only projection of a value.

use tern_types::{Host, Kind, Value};

use crate::cycle::has_cycles_with;

/// Returns a copy of `value` with every function and element removed from
/// records, recursing through arrays and records.
///
/// Arrays keep their length and holes; array items are projected but never
/// removed. Records keep their class. Other values, and cyclic or unreadable
/// inputs, are returned unchanged.
pub fn strip_functions_and_elements(value: &Value, host: &dyn Host) -> Value {
    if has_cycles_with(value, &mut Vec::new(), host) {
        return value.clone();
    }
    project(value, host)
}

fn project(value: &Value, host: &dyn Host) -> Value {
    match (Kind::of(value, host), value) {
        (Kind::Array, Value::Array(array)) => match array.try_borrow() {
            Ok(slots) => Value::sparse_array(
                slots
                    .iter()
                    .map(|slot| slot.as_ref().map(|item| project(item, host)))
                    .collect(),
            ),
            Err(_) => value.clone(),
        },
        (Kind::Object, Value::Object(object)) => match object.try_borrow() {
            Ok(data) => {
                let kept = data
                    .iter()
                    .filter(|(_, v)| !matches!(Kind::of(v, host), Kind::Function | Kind::Element))
                    .map(|(k, v)| (k.to_string(), project(v, host)))
                    .collect::<Vec<_>>();
                Value::object_of_class(data.class(), kept)
            }
            Err(_) => value.clone(),
        },
        _ => value.clone(),
    }
}
