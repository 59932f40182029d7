//! Wrapping of iterators returned by map and set methods.
//!
//! The native iterators run against the underlying container and yield raw
//! values. The wrapped iterator prepares each yielded value the way a
//! property read would, under the container's path plus the entry key.

use on_change_path::Path;
use on_change_value::{Kind, Object, Value, ValueResult};

use crate::handler::{Interceptor, Origin};

/// Whether `value` is an iterator object.
pub(crate) fn is_iterator(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|object| object.kind() == Kind::Iterator)
}

pub(crate) fn wrap_iterator(
    handler: &Interceptor,
    iterator: &Object,
    method: &str,
    receiver: &Object,
    path: &Path<Value>,
) -> ValueResult<Value> {
    let handler = handler.clone();
    let receiver = receiver.clone();
    let path = path.clone();
    let is_map = receiver.kind() == Kind::Map;

    let wrapped = match method {
        "entries" => Object::mapped_iterator(iterator.clone(), move |entry| {
            let Some(pair) = entry.as_object() else {
                return Ok(entry);
            };
            let key = pair.get(0usize)?;
            let value = pair.get(1usize)?;
            let origin = || Origin::Iteration {
                receiver: &receiver,
                path: &path,
            };
            let key_out = if is_map {
                key.clone()
            } else {
                handler.prepare_value(key.clone(), &key, origin())
            };
            let value_out = handler.prepare_value(value, &key, origin());
            Ok(Value::Object(Object::array([key_out, value_out])))
        }),
        "values" if is_map => {
            let keys = receiver.call_method("keys", &[])?.into_object();
            Object::mapped_iterator(iterator.clone(), move |value| {
                let key = match &keys {
                    Some(keys) => keys.iter_next()?.unwrap_or_default(),
                    None => Value::Undefined,
                };
                let origin = Origin::Iteration {
                    receiver: &receiver,
                    path: &path,
                };
                Ok(handler.prepare_value(value, &key, origin))
            })
        }
        _ => Object::mapped_iterator(iterator.clone(), move |item| {
            let origin = Origin::Iteration {
                receiver: &receiver,
                path: &path,
            };
            Ok(handler.prepare_value(item.clone(), &item, origin))
        }),
    };
    Ok(Value::Object(wrapped))
}
