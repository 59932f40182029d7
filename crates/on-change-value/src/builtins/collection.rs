//! Map and set methods. They operate on the internal slots of the
//! underlying object, so a proxy receiver is looked through.

use std::collections::VecDeque;

use super::{arg, callable, slot_receiver, IteratorState, MethodTable};
use crate::error::ValueResult;
use crate::map_key::MapKey;
use crate::object::{Kind, Object, Slots};
use crate::value::Value;

pub(crate) const MAP_METHODS: MethodTable = &[
    ("get", map_get),
    ("set", map_set),
    ("has", map_has),
    ("delete", map_delete),
    ("clear", clear),
    ("forEach", map_for_each),
    ("keys", map_keys),
    ("values", map_values),
    ("entries", map_entries),
];

pub(crate) const SET_METHODS: MethodTable = &[
    ("add", set_add),
    ("has", set_has),
    ("delete", set_delete),
    ("clear", clear),
    ("forEach", set_for_each),
    ("keys", set_values),
    ("values", set_values),
    ("entries", set_entries),
];

fn map_receiver(this: &Value, method: &'static str) -> ValueResult<Object> {
    slot_receiver(this, Kind::Map, method)
}

fn set_receiver(this: &Value, method: &'static str) -> ValueResult<Object> {
    slot_receiver(this, Kind::Set, method)
}

fn snapshot(items: Vec<Value>) -> Value {
    Value::Object(Object::with_iterator(IteratorState::Items(VecDeque::from(
        items,
    ))))
}

fn pair(key: Value, value: Value) -> Value {
    Value::Object(Object::array([key, value]))
}

fn map_get(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let map = map_receiver(this, "get")?;
    Ok(map.map_get(&arg(args, 0)).unwrap_or_default())
}

fn map_set(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let map = map_receiver(this, "set")?;
    map.map_insert(arg(args, 0), arg(args, 1));
    Ok(this.clone())
}

fn map_has(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let map = map_receiver(this, "has")?;
    Ok(Value::Bool(map.collection_has(&arg(args, 0))))
}

fn map_delete(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let map = map_receiver(this, "delete")?;
    let key = MapKey::new(arg(args, 0));
    let removed = map
        .with_slots(|slots| match slots {
            Slots::Map(entries) => entries.shift_remove(&key).is_some(),
            _ => false,
        })
        .unwrap_or(false);
    Ok(Value::Bool(removed))
}

fn clear(this: &Value, _args: &[Value]) -> ValueResult<Value> {
    let object = match this.as_object().map(Object::kind) {
        Some(Kind::Set) => set_receiver(this, "clear")?,
        _ => map_receiver(this, "clear")?,
    };
    object.with_slots(|slots| match slots {
        Slots::Map(entries) => entries.clear(),
        Slots::Set(values) => values.clear(),
        _ => {}
    });
    Ok(Value::Undefined)
}

fn map_for_each(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let map = map_receiver(this, "forEach")?;
    let callback = callable(&arg(args, 0), "forEach")?;
    let this_arg = arg(args, 1);
    for (key, value) in map.map_entries().unwrap_or_default() {
        if map.collection_has(&key) {
            callback.call(&this_arg, &[value, key, this.clone()])?;
        }
    }
    Ok(Value::Undefined)
}

fn map_keys(this: &Value, _args: &[Value]) -> ValueResult<Value> {
    let map = map_receiver(this, "keys")?;
    let entries = map.map_entries().unwrap_or_default();
    Ok(snapshot(entries.into_iter().map(|(k, _)| k).collect()))
}

fn map_values(this: &Value, _args: &[Value]) -> ValueResult<Value> {
    let map = map_receiver(this, "values")?;
    let entries = map.map_entries().unwrap_or_default();
    Ok(snapshot(entries.into_iter().map(|(_, v)| v).collect()))
}

fn map_entries(this: &Value, _args: &[Value]) -> ValueResult<Value> {
    let map = map_receiver(this, "entries")?;
    let entries = map.map_entries().unwrap_or_default();
    Ok(snapshot(
        entries.into_iter().map(|(k, v)| pair(k, v)).collect(),
    ))
}

fn set_add(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let set = set_receiver(this, "add")?;
    let value = MapKey::new(arg(args, 0));
    set.with_slots(|slots| {
        if let Slots::Set(values) = slots {
            values.insert(value);
        }
    });
    Ok(this.clone())
}

fn set_has(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let set = set_receiver(this, "has")?;
    Ok(Value::Bool(set.collection_has(&arg(args, 0))))
}

fn set_delete(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let set = set_receiver(this, "delete")?;
    let value = MapKey::new(arg(args, 0));
    let removed = set
        .with_slots(|slots| match slots {
            Slots::Set(values) => values.shift_remove(&value),
            _ => false,
        })
        .unwrap_or(false);
    Ok(Value::Bool(removed))
}

fn set_for_each(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let set = set_receiver(this, "forEach")?;
    let callback = callable(&arg(args, 0), "forEach")?;
    let this_arg = arg(args, 1);
    for value in set.set_values().unwrap_or_default() {
        if set.collection_has(&value) {
            callback.call(&this_arg, &[value.clone(), value, this.clone()])?;
        }
    }
    Ok(Value::Undefined)
}

fn set_values(this: &Value, _args: &[Value]) -> ValueResult<Value> {
    let set = set_receiver(this, "values")?;
    Ok(snapshot(set.set_values().unwrap_or_default()))
}

fn set_entries(this: &Value, _args: &[Value]) -> ValueResult<Value> {
    let set = set_receiver(this, "entries")?;
    let values = set.set_values().unwrap_or_default();
    Ok(snapshot(
        values.into_iter().map(|v| pair(v.clone(), v)).collect(),
    ))
}
