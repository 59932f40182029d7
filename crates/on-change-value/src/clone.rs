use crate::error::ValueResult;
use crate::value::Value;

/// Creates a shallow structural copy of a value.
///
/// Primitives are returned as is. Plain objects, lists, maps, sets, dates
/// and buffers get a new identity holding the same own properties and
/// internal contents; nested objects are shared with the original. Proxies
/// are looked through, so cloning a wrapper copies what it wraps.
///
/// Functions and iterators cannot be cloned.
///
/// # Examples
///
/// ```
/// use on_change_value::{shallow_clone, Object, Value};
///
/// let list = Object::array([1, 2]);
/// let copy = shallow_clone(&Value::from(&list)).unwrap();
/// assert_ne!(copy, Value::from(&list));
/// assert_eq!(copy.as_object().unwrap().array_elements(), list.array_elements());
/// ```
pub fn shallow_clone(value: &Value) -> ValueResult<Value> {
    match value {
        Value::Object(o) => Ok(Value::Object(o.copy_ordinary()?)),
        other => Ok(other.clone()),
    }
}
