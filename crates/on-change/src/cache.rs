//! The identity cache: one wrapper per underlying object, and the path at
//! which each object was first reached.

use std::collections::HashMap;
use std::rc::Rc;

use on_change_path::Path;
use on_change_value::{
    is_never_wrapped, same_value, Kind, Object, ObjectId, PropertyDescriptor, PropertyKey,
    ProxyHandler, Value, ValueResult, WeakObject,
};
use tracing::debug;

use crate::options::Equals;

/// Number of insertions between automatic sweeps.
const SWEEP_INTERVAL: usize = 256;

struct Entry {
    target: WeakObject,
    path: Path<Value>,
    proxy: WeakObject,
}

struct Reverse {
    proxy: WeakObject,
    target: WeakObject,
}

/// Maps underlying objects to their wrappers and recorded paths.
///
/// Entries hold only weak handles: the cache never keeps an object or a
/// wrapper alive. Entries whose object was dropped are removed by
/// [`IdentityCache::sweep`], which also runs periodically on insertion.
#[derive(Default)]
pub struct IdentityCache {
    entries: HashMap<ObjectId, Entry>,
    proxies: HashMap<ObjectId, Reverse>,
    unsubscribed: bool,
    inserted: usize,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The wrapper for `value`, creating it with `handler` on first use.
    ///
    /// Primitives, never-wrapped values and this cache's own wrappers are
    /// returned unchanged, as is everything once unsubscribed. The path of
    /// an existing entry is never updated.
    pub fn get_proxy<F>(&mut self, value: Value, path: Path<Value>, handler: F) -> Value
    where
        F: FnOnce() -> Rc<dyn ProxyHandler>,
    {
        if self.unsubscribed || is_never_wrapped(&value) {
            return value;
        }
        let target = match value {
            Value::Object(target) => target,
            other => return other,
        };
        if self.target_of(&target).is_some() {
            return Value::Object(target);
        }

        let id = target.id();
        let path = match self.entries.get(&id) {
            Some(entry) if entry.target.upgrade().is_some_and(|t| t.ptr_eq(&target)) => {
                if let Some(proxy) = entry.proxy.upgrade() {
                    return Value::Object(proxy);
                }
                entry.path.clone()
            }
            _ => path,
        };

        let proxy = Object::proxy(target.clone(), handler());
        self.proxies.insert(
            proxy.id(),
            Reverse {
                proxy: proxy.downgrade(),
                target: target.downgrade(),
            },
        );
        self.entries.insert(
            id,
            Entry {
                target: target.downgrade(),
                path,
                proxy: proxy.downgrade(),
            },
        );
        self.inserted += 1;
        if self.inserted >= SWEEP_INTERVAL {
            self.sweep();
        }
        Value::Object(proxy)
    }

    /// The underlying object of one of this cache's wrappers.
    pub fn target_of(&self, proxy: &Object) -> Option<Object> {
        let reverse = self.proxies.get(&proxy.id())?;
        if !reverse.proxy.is(proxy) {
            return None;
        }
        reverse.target.upgrade()
    }

    /// Unwrap `value` if it is one of this cache's wrappers.
    pub fn unwrap_value(&self, value: Value) -> Value {
        let target = value.as_object().and_then(|o| self.target_of(o));
        target.map_or(value, Value::Object)
    }

    /// The path recorded for `target`, or the root path if unknown.
    pub fn path_of(&self, target: &Object) -> Path<Value> {
        self.entries
            .get(&target.id())
            .filter(|entry| entry.target.upgrade().is_some_and(|t| t.ptr_eq(target)))
            .map(|entry| entry.path.clone())
            .unwrap_or_default()
    }

    /// Whether `target` is no longer found at its recorded path when
    /// walking from `root`. The walk reads own data properties, map entries
    /// and set members only, so it never runs accessors. A set member's
    /// path segment is the member itself.
    pub fn is_detached(&self, target: &Object, root: &Object) -> bool {
        let path = self.path_of(target);
        let mut current = root.clone();
        for key in path.keys() {
            let next = match current.kind() {
                Kind::Map => current.map_get(key),
                Kind::Set => current.collection_has(key).then(|| key.clone()),
                _ => current
                    .get_own_property(PropertyKey::from_value(key))
                    .and_then(|desc| desc.value),
            };
            match next {
                Some(Value::Object(o)) => current = o,
                _ => return true,
            }
        }
        !current.ptr_eq(target)
    }

    /// Whether a read of `key` must return the stored value itself: the
    /// property is non-configurable and not a writable data property.
    pub fn is_get_invariant(target: &Object, key: &PropertyKey) -> bool {
        target
            .get_own_property(key)
            .is_some_and(|desc| desc.configurable != Some(true) && desc.writable != Some(true))
    }

    /// Perform a write the way an unobserved write would.
    ///
    /// Nothing is written when `key` exists and `value` equals `previous`.
    /// Own accessors run with `receiver` as `this`.
    pub fn set_property(
        target: &Object,
        key: &PropertyKey,
        value: Value,
        receiver: &Value,
        previous: &Value,
        exists: bool,
        equals: &Equals,
    ) -> ValueResult<bool> {
        if exists && equals.call(previous, &value) {
            return Ok(true);
        }
        let is_accessor = target
            .get_own_property(key)
            .is_some_and(|desc| desc.is_accessor());
        if is_accessor {
            target.set_with_receiver(key, value, receiver)
        } else {
            target.set(key, value)
        }
    }

    pub fn define_property(
        target: &Object,
        key: &PropertyKey,
        desc: PropertyDescriptor,
    ) -> ValueResult<bool> {
        target.define_property(key, desc)
    }

    pub fn delete_property(target: &Object, key: &PropertyKey) -> ValueResult<bool> {
        target.delete(key)
    }

    /// Whether defining `desc` would leave the property exactly as it is.
    pub fn is_same_descriptor(desc: &PropertyDescriptor, target: &Object, key: &PropertyKey) -> bool {
        let Some(current) = target.get_own_property(key) else {
            return false;
        };
        let value = |d: &PropertyDescriptor| d.value.clone().unwrap_or_default();
        let get = |d: &PropertyDescriptor| d.get.clone().unwrap_or_default();
        let set = |d: &PropertyDescriptor| d.set.clone().unwrap_or_default();
        same_value(&value(desc), &value(&current))
            && desc.writable.unwrap_or(false) == current.writable.unwrap_or(false)
            && desc.enumerable.unwrap_or(false) == current.enumerable.unwrap_or(false)
            && desc.configurable.unwrap_or(false) == current.configurable.unwrap_or(false)
            && same_value(&get(desc), &get(&current))
            && same_value(&set(desc), &set(&current))
    }

    /// Stop wrapping and forget every entry. Irreversible.
    pub fn unsubscribe(&mut self) {
        self.unsubscribed = true;
        self.entries.clear();
        self.proxies.clear();
        debug!("unsubscribed");
    }

    pub fn is_unsubscribed(&self) -> bool {
        self.unsubscribed
    }

    /// Number of entries, including ones not swept yet.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop entries whose object is gone. Returns how many were removed.
    pub fn sweep(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.target.is_alive());
        self.proxies.retain(|_, reverse| reverse.proxy.is_alive());
        self.inserted = 0;
        let removed = before - self.entries.len();
        debug!(removed, remaining = self.entries.len(), "identity cache swept");
        removed
    }
}
