//! The proxy handler shared by every wrapper of one observer.

use std::cell::{RefCell, RefMut};
use std::rc::Rc;

use on_change_path::Path;
use on_change_value::{
    is_never_wrapped, reads_through_target, ContainerKind, Object, PropertyDescriptor,
    PropertyKey, ProxyHandler, Symbol, Value, ValueResult,
};
use tracing::trace;

use crate::cache::IdentityCache;
use crate::change::{ApplyData, Change};
use crate::ignore::is_ignored;
use crate::iterator::{is_iterator, wrap_iterator};
use crate::options::Options;
use crate::smart_clone::SmartClone;

/// Reading this symbol from a wrapper returns the underlying object.
pub fn target_symbol() -> Symbol {
    Symbol::for_key("on-change.target")
}

/// Reading this symbol from the root wrapper unsubscribes the observer and
/// returns the underlying root.
pub fn unsubscribe_symbol() -> Symbol {
    Symbol::for_key("on-change.unsubscribe")
}

pub(crate) type Callback = Box<dyn Fn(&Change)>;

struct Inner {
    root: Value,
    callback: Callback,
    options: Options,
    cache: RefCell<IdentityCache>,
    smart_clone: RefCell<SmartClone>,
}

/// Where a value about to be handed out was read from.
pub(crate) enum Origin<'a> {
    /// A property of `target`.
    Property(&'a Object),
    /// An item produced by iterating a container located at `path`.
    Iteration {
        receiver: &'a Object,
        path: &'a Path<Value>,
    },
}

/// Intercepts every operation on the wrappers of one observed graph.
#[derive(Clone)]
pub(crate) struct Interceptor {
    inner: Rc<Inner>,
}

impl Interceptor {
    pub(crate) fn new(root: Value, callback: Callback, options: Options) -> Self {
        Self {
            inner: Rc::new(Inner {
                root,
                callback,
                options,
                cache: RefCell::new(IdentityCache::new()),
                smart_clone: RefCell::new(SmartClone::new()),
            }),
        }
    }

    /// The wrapper of the root value.
    pub(crate) fn wrap_root(&self) -> Value {
        self.wrap(self.inner.root.clone(), Path::root())
    }

    pub(crate) fn cache(&self) -> RefMut<'_, IdentityCache> {
        self.inner.cache.borrow_mut()
    }

    pub(crate) fn unsubscribe(&self) {
        let mut cache = self.cache();
        if !cache.is_unsubscribed() {
            cache.unsubscribe();
        }
    }

    pub(crate) fn is_unsubscribed(&self) -> bool {
        self.inner.cache.borrow().is_unsubscribed()
    }

    fn smart_clone(&self) -> RefMut<'_, SmartClone> {
        self.inner.smart_clone.borrow_mut()
    }

    fn unwrap_value(&self, value: Value) -> Value {
        self.inner.cache.borrow().unwrap_value(value)
    }

    fn path_of(&self, target: &Object) -> Path<Value> {
        self.inner.cache.borrow().path_of(target)
    }

    fn is_ignored(&self, key: &Value) -> bool {
        is_ignored(&self.inner.cache.borrow(), &self.inner.options, key)
    }

    fn is_detached(&self, target: &Object) -> bool {
        let Some(root) = self.inner.root.as_object() else {
            return false;
        };
        self.inner.options.ignore_detached && self.inner.cache.borrow().is_detached(target, root)
    }

    /// Wrap `value` at `path`, reusing the existing wrapper if any.
    pub(crate) fn wrap(&self, value: Value, path: Path<Value>) -> Value {
        let handler = self.clone();
        self.cache()
            .get_proxy(value, path, move || Rc::new(handler) as Rc<dyn ProxyHandler>)
    }

    /// The value handed out for a read of `key`: either `value` itself or
    /// its wrapper.
    pub(crate) fn prepare_value(&self, value: Value, key: &Value, origin: Origin<'_>) -> Value {
        if is_never_wrapped(&value) || key.as_str() == Some("constructor") || self.is_ignored(key)
        {
            return value;
        }
        let is_shallow = self.inner.options.is_shallow;
        let base = match origin {
            Origin::Property(target) => {
                let is_handled = key
                    .as_str()
                    .is_some_and(|name| SmartClone::is_handled_method(target, name));
                if (is_shallow && !is_handled)
                    || IdentityCache::is_get_invariant(target, &PropertyKey::from_value(key))
                    || self.is_detached(target)
                {
                    return value;
                }
                self.path_of(target)
            }
            Origin::Iteration { receiver, path } => {
                if is_shallow || self.is_detached(receiver) {
                    return value;
                }
                path.clone()
            }
        };
        self.wrap(value, base.concat(key.clone()))
    }

    fn handle_change_on_target(
        &self,
        target: &Object,
        key: &PropertyKey,
        value: Value,
        previous: Value,
    ) {
        let key = key.to_value();
        if self.is_ignored(&key) || self.is_detached(target) {
            return;
        }
        let path = self.path_of(target);
        self.handle_change(path, Some(key), value, previous, None);
    }

    /// Fold the change into the open session, or deliver it.
    fn handle_change(
        &self,
        base: Path<Value>,
        key: Option<Value>,
        value: Value,
        previous: Value,
        apply_data: Option<ApplyData>,
    ) {
        {
            let mut smart_clone = self.smart_clone();
            if smart_clone.is_cloning() {
                trace!(path = %base, key = ?key, "change folded into session");
                smart_clone.update(&base, key.as_ref(), previous);
                return;
            }
        }
        let path = match key {
            Some(key) => base.concat(key),
            None => base,
        };
        let change = Change {
            path: path.render(self.inner.options.path_format()),
            value,
            previous,
            apply_data,
        };
        trace!(path = %change.path, method = ?change.method(), "change delivered");
        (self.inner.callback)(&change);
    }
}

impl ProxyHandler for Interceptor {
    fn get(&self, target: &Object, key: &PropertyKey, receiver: &Value) -> ValueResult<Value> {
        if let PropertyKey::Symbol(symbol) = key {
            if *symbol == target_symbol() {
                return Ok(Value::Object(target.clone()));
            }
            if *symbol == unsubscribe_symbol() && self.path_of(target).is_root() {
                self.unsubscribe();
                return Ok(Value::Object(target.clone()));
            }
        }

        let value = if reads_through_target(target) {
            target.get(key)?
        } else {
            target.get_with_receiver(key, receiver)?
        };
        if self.is_unsubscribed() {
            return Ok(value);
        }
        Ok(self.prepare_value(value, &key.to_value(), Origin::Property(target)))
    }

    fn set(
        &self,
        target: &Object,
        key: &PropertyKey,
        value: Value,
        receiver: &Value,
    ) -> ValueResult<bool> {
        if self.is_unsubscribed() {
            return target.set_with_receiver(key, value, receiver);
        }
        let value = self.unwrap_value(value);
        let previous = target.get(key)?;
        let exists = target.has(key)?;
        let equals = &self.inner.options.equals;

        if !IdentityCache::set_property(target, key, value.clone(), receiver, &previous, exists, equals)? {
            return Ok(false);
        }
        if !exists || !equals.call(&previous, &value) {
            self.handle_change_on_target(target, key, value, previous);
        }
        Ok(true)
    }

    fn define_property(
        &self,
        target: &Object,
        key: &PropertyKey,
        desc: &PropertyDescriptor,
    ) -> ValueResult<bool> {
        if self.is_unsubscribed() {
            return target.define_property(key, desc.clone());
        }
        let mut desc = desc.clone();
        desc.value = desc.value.map(|value| self.unwrap_value(value));
        if IdentityCache::is_same_descriptor(&desc, target, key) {
            return Ok(true);
        }
        let value = desc.value.clone().unwrap_or_default();
        if !IdentityCache::define_property(target, key, desc)? {
            return Ok(false);
        }
        self.handle_change_on_target(target, key, value, Value::Undefined);
        Ok(true)
    }

    fn delete_property(&self, target: &Object, key: &PropertyKey) -> ValueResult<bool> {
        if self.is_unsubscribed() {
            return target.delete(key);
        }
        if !target.has(key)? {
            return Ok(true);
        }
        let previous = target.get(key)?;
        if !IdentityCache::delete_property(target, key)? {
            return Ok(false);
        }
        self.handle_change_on_target(target, key, Value::Undefined, previous);
        Ok(true)
    }

    fn apply(&self, function: &Object, this: &Value, args: &[Value]) -> ValueResult<Value> {
        if self.is_unsubscribed() {
            return function.call(this, args);
        }
        let Some(receiver) = self.unwrap_value(this.clone()).into_object() else {
            return function.call(this, args);
        };
        let Some(kind) = ContainerKind::of_object(&receiver) else {
            return function.call(this, args);
        };
        let name = function.function_name().unwrap_or_else(|| Rc::from(""));
        if kind == ContainerKind::List && self.inner.options.details.includes(&name) {
            return function.call(this, args);
        }

        let is_handled = kind.is_handled_method(&name);
        let call_path = self.path_of(&receiver);
        self.smart_clone()
            .start(receiver.clone(), call_path.clone(), &name)?;

        let call_this = SmartClone::preferred_this(is_handled, this, &receiver);
        let call_args: Vec<Value> = if is_handled {
            args.iter().map(|arg| self.unwrap_value(arg.clone())).collect()
        } else {
            args.to_vec()
        };
        let result = function.call(&call_this, &call_args);
        let session = self.smart_clone().stop();
        let mut result = result?;
        let Some(session) = session else {
            return Ok(result);
        };
        let is_changed = session.is_changed(&self.inner.options.equals);

        if is_handled && SmartClone::is_handled_type(&result) {
            let result_path = match (kind, &*name, args.first()) {
                (ContainerKind::Map, "get", Some(key)) => call_path.concat(self.unwrap_value(key.clone())),
                _ => call_path.clone(),
            };
            result = self.wrap(result, result_path);
        }

        if is_changed {
            let value = Value::Object(receiver.clone());
            let previous = Value::Object(session.into_clone());
            if self.smart_clone().is_cloning() {
                let key = call_path.last().cloned();
                self.handle_change(call_path.initial(), key, value, previous, None);
            } else {
                let apply_data = ApplyData {
                    name: name.to_string(),
                    args: args.to_vec(),
                    result: result.clone(),
                };
                self.handle_change(call_path.clone(), None, value, previous, Some(apply_data));
            }
        }

        match &result {
            Value::Object(iterator) if kind.exposes_iterators() && is_iterator(&result) => {
                wrap_iterator(self, iterator, &name, &receiver, &call_path)
            }
            _ => Ok(result),
        }
    }
}
