//! Bridge between [`Value`] and `serde_json::Value`.
//!
//! Conversion to JSON follows `JSON.stringify`: absent, function and symbol
//! values are dropped from records and become `null` inside arrays, dates
//! become RFC 3339 strings, and keyed collections without enumerable slots
//! (maps, sets, regexps, buffers, blobs) become `{}`.

use chrono::SecondsFormat;
use serde_json::{Map, Number};

use crate::error::TypeError;
use crate::value::Value;

/// Largest integer a double represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl Value {
    /// Build a value tree from parsed JSON. Every container is a fresh allocation.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::string(s),
            serde_json::Value::Array(items) => Value::array(items.iter().map(Value::from_json)),
            serde_json::Value::Object(map) => {
                Value::object_from(map.iter().map(|(k, v)| (k.clone(), Value::from_json(v))))
            }
        }
    }

    /// Serialize to JSON. Fails on cycles, bigints and unreadable containers.
    pub fn to_json(&self) -> Result<serde_json::Value, TypeError> {
        let mut open = Vec::new();
        Ok(to_json_inner(self, &mut open)?.unwrap_or(serde_json::Value::Null))
    }

    /// Copy a value through its JSON form, dropping everything JSON cannot hold.
    pub fn deep_copy(&self) -> Result<Value, TypeError> {
        Ok(Value::from_json(&self.to_json()?))
    }
}

/// `None` means "skip": the value has no JSON form.
fn to_json_inner(
    value: &Value,
    open: &mut Vec<usize>,
) -> Result<Option<serde_json::Value>, TypeError> {
    let json = match value {
        Value::Undefined | Value::Function(_) | Value::Symbol(_) => return Ok(None),
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => number_to_json(*n),
        Value::BigInt(_) => return Err(TypeError::Unserializable("bigint")),
        Value::String(s) => serde_json::Value::String(s.to_string()),
        Value::Date(date) => match date.to_datetime() {
            Some(dt) => serde_json::Value::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => serde_json::Value::Null,
        },
        Value::RegExp(_)
        | Value::ArrayBuffer(_)
        | Value::Blob(_)
        | Value::Map(_)
        | Value::Set(_) => {
            serde_json::Value::Object(Map::new())
        }
        Value::Array(array) => {
            let id = enter(value, open)?;
            let slots = array.try_borrow()?;
            let mut items = Vec::with_capacity(slots.len());
            for slot in slots.iter() {
                let item = match slot {
                    Some(v) => to_json_inner(v, open)?,
                    None => None,
                };
                items.push(item.unwrap_or(serde_json::Value::Null));
            }
            leave(open, id);
            serde_json::Value::Array(items)
        }
        Value::Object(object) => {
            let id = enter(value, open)?;
            let data = object.try_borrow()?;
            let mut map = Map::new();
            for (key, v) in data.iter() {
                if let Some(json) = to_json_inner(v, open)? {
                    map.insert(key.to_string(), json);
                }
            }
            leave(open, id);
            serde_json::Value::Object(map)
        }
    };
    Ok(Some(json))
}

fn enter(value: &Value, open: &mut Vec<usize>) -> Result<usize, TypeError> {
    let id = value.identity().unwrap_or_default();
    if open.contains(&id) {
        return Err(TypeError::Cyclic(value.type_name().to_string()));
    }
    open.push(id);
    Ok(id)
}

fn leave(open: &mut Vec<usize>, id: usize) {
    if open.last() == Some(&id) {
        open.pop();
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    if !n.is_finite() {
        return serde_json::Value::Null;
    }
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return serde_json::Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn json_roundtrip_keeps_structure_and_order() {
        let source = json!({"z": 1, "a": [true, null, "s"], "m": {"x": 1.5}});
        let value = Value::from_json(&source);
        assert_eq!(value.to_json().unwrap(), source);
    }

    #[test]
    fn stringify_drops_absent_values_in_records() {
        let value = Value::object_from([
            ("a", Value::Undefined),
            ("f", Value::function("f")),
            ("s", Value::symbol("s")),
            ("b", Value::from(2)),
        ]);
        assert_eq!(value.to_json().unwrap(), json!({"b": 2}));
    }

    #[test]
    fn stringify_nulls_absent_values_in_arrays() {
        let value = Value::sparse_array(vec![
            Some(Value::Undefined),
            None,
            Some(Value::function("f")),
            Some(Value::from(f64::INFINITY)),
        ]);
        assert_eq!(value.to_json().unwrap(), json!([null, null, null, null]));
    }

    #[test]
    fn dates_and_collections() {
        let value = Value::object_from([
            ("when", Value::date_millis(86_400_000)),
            ("map", Value::map([(Value::from(1), Value::from(2))])),
            ("re", Value::regexp("a", "g")),
        ]);
        assert_eq!(
            value.to_json().unwrap(),
            json!({"when": "1970-01-02T00:00:00.000Z", "map": {}, "re": {}})
        );
    }

    #[test]
    fn cyclic_values_fail() {
        let obj = Value::object();
        obj.insert("me", obj.clone());
        assert_eq!(obj.to_json(), Err(TypeError::Cyclic("Object".into())));
    }

    #[test]
    fn shared_siblings_serialize_twice() {
        let shared = Value::object_from([("v", Value::from(1))]);
        let value = Value::array([shared.clone(), shared]);
        assert_eq!(value.to_json().unwrap(), json!([{"v": 1}, {"v": 1}]));
    }

    #[test]
    fn bigint_is_unserializable() {
        let value = Value::array([Value::BigInt(1)]);
        assert_eq!(value.to_json(), Err(TypeError::Unserializable("bigint")));
    }

    #[test]
    fn deep_copy_allocates_new_containers() {
        let original = Value::object_from([("inner", Value::array([Value::from(1)]))]);
        let copy = original.deep_copy().unwrap();
        assert!(!copy.ptr_eq(&original));
        assert!(!copy.get("inner").unwrap().ptr_eq(&original.get("inner").unwrap()));
        assert_eq!(copy.to_json().unwrap(), original.to_json().unwrap());
    }
}
