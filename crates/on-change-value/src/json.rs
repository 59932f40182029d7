//! Conversion between runtime values and `serde_json` values.

use serde_json::{Map, Number};

use crate::builtins::date::iso_string;
use crate::error::{ValueError, ValueResult};
use crate::key::PropertyKey;
use crate::object::{Kind, Object, ObjectId};
use crate::value::Value;

impl Value {
    /// Build a fresh object graph from JSON. Arrays become lists, objects
    /// become plain objects with keys in document order.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::from(s.as_str()),
            serde_json::Value::Array(items) => {
                Value::Object(Object::array(items.iter().map(Value::from_json)))
            }
            serde_json::Value::Object(entries) => Value::Object(Object::from_entries(
                entries
                    .iter()
                    .map(|(k, v)| (k.as_str(), Value::from_json(v))),
            )),
        }
    }

    /// The JSON view of a value.
    ///
    /// Follows the usual stringification rules: `undefined`, functions and
    /// symbols are dropped from objects and become `null` in lists,
    /// non-finite numbers become `null`, dates render as ISO strings, and
    /// maps and sets contribute only their own properties. Reads go through
    /// `get`, so proxies see them. A cyclic graph is an error.
    pub fn to_json(&self) -> ValueResult<serde_json::Value> {
        let mut seen = Vec::new();
        Ok(to_json(self, &mut seen)?.unwrap_or(serde_json::Value::Null))
    }
}

fn to_json(value: &Value, seen: &mut Vec<ObjectId>) -> ValueResult<Option<serde_json::Value>> {
    let json = match value {
        Value::Undefined | Value::Symbol(_) => return Ok(None),
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => Number::from_f64(*n)
            .map(|n| match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < 9.007_199_254_740_992e15 => {
                    serde_json::Value::from(f as i64)
                }
                _ => serde_json::Value::Number(n),
            })
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.to_string()),
        Value::Object(o) => return object_to_json(o, seen),
    };
    Ok(Some(json))
}

fn object_to_json(o: &Object, seen: &mut Vec<ObjectId>) -> ValueResult<Option<serde_json::Value>> {
    match o.kind() {
        Kind::Function => return Ok(None),
        Kind::Date => {
            let t = o.date_value().unwrap_or(f64::NAN);
            return Ok(Some(
                iso_string(t).map_or(serde_json::Value::Null, serde_json::Value::String),
            ));
        }
        _ => {}
    }
    let id = o.unwrap_proxy().id();
    if seen.contains(&id) {
        return Err(ValueError::Cycle);
    }
    seen.push(id);
    let json = if o.kind() == Kind::Array {
        let len = crate::builtins::array::length(o)?;
        let mut items = Vec::with_capacity(len);
        for i in 0..len {
            items.push(to_json(&o.get(i)?, seen)?.unwrap_or(serde_json::Value::Null));
        }
        serde_json::Value::Array(items)
    } else {
        let mut entries = Map::new();
        for key in o.keys() {
            if o.kind() == Kind::Buffer && matches!(key, PropertyKey::Index(_)) {
                continue;
            }
            if let Some(json) = to_json(&o.get(&key)?, seen)? {
                entries.insert(key.to_string(), json);
            }
        }
        serde_json::Value::Object(entries)
    };
    seen.pop();
    Ok(Some(json))
}
