//! Interception hooks for proxy objects.

use crate::descriptor::PropertyDescriptor;
use crate::error::ValueResult;
use crate::key::PropertyKey;
use crate::object::Object;
use crate::value::Value;

/// The traps of a proxy object.
///
/// An object created with [`Object::proxy`] forwards every internal
/// operation to its handler together with the proxied `target`. Each trap
/// defaults to performing the operation on the target unchanged, so a
/// handler only overrides what it wants to observe.
///
/// Own-property introspection (`get_own_property`, `own_keys`) is not
/// trappable and always reads the target.
pub trait ProxyHandler {
    /// Property read. `receiver` is the object the read started from
    /// (usually the proxy itself) and is passed to accessors as `this`.
    fn get(&self, target: &Object, key: &PropertyKey, receiver: &Value) -> ValueResult<Value> {
        target.get_with_receiver(key, receiver)
    }

    /// Property write. `Ok(false)` means the write was rejected.
    fn set(
        &self,
        target: &Object,
        key: &PropertyKey,
        value: Value,
        receiver: &Value,
    ) -> ValueResult<bool> {
        target.set_with_receiver(key, value, receiver)
    }

    fn define_property(
        &self,
        target: &Object,
        key: &PropertyKey,
        desc: &PropertyDescriptor,
    ) -> ValueResult<bool> {
        target.define_property(key, desc.clone())
    }

    fn delete_property(&self, target: &Object, key: &PropertyKey) -> ValueResult<bool> {
        target.delete(key)
    }

    fn has(&self, target: &Object, key: &PropertyKey) -> ValueResult<bool> {
        target.has(key)
    }

    /// Call of a proxied function. `target` is the function.
    fn apply(&self, target: &Object, this: &Value, args: &[Value]) -> ValueResult<Value> {
        target.call(this, args)
    }
}
