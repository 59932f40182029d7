//! Objects: identity, own properties, internal slots and proxies.
//!
//! # Overview
//!
//! An [`Object`] is a reference-counted handle. Two handles are the same
//! object when [`Object::ptr_eq`] holds; [`Object::id`] exposes that identity
//! as a hashable value and [`WeakObject`] holds it without keeping the object
//! alive.
//!
//! Every object is either *ordinary* (a set of own properties plus the
//! internal slots of its [`Kind`]) or a *proxy* (a target object and a
//! [`ProxyHandler`] that intercepts every internal operation). Both expose the
//! same internal-method API (`get`, `set`, `define_property`, `delete`, `has`,
//! `call`), so callers never need to know whether a value is proxied.
//!
//! Built-in methods (`push`, `set`, `setFullYear`, ...) are not stored as
//! properties. A read that misses the own properties falls back to the
//! built-ins of the object's kind and returns a fresh function object.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::{IndexMap, IndexSet};

use crate::builtins::{self, IteratorState};
use crate::descriptor::{Property, PropertyDescriptor, Slot};
use crate::error::{ValueError, ValueResult};
use crate::key::PropertyKey;
use crate::map_key::MapKey;
use crate::proxy::ProxyHandler;
use crate::value::Value;

/// Signature of native functions: `(this, arguments) -> result`.
pub type NativeFn = dyn Fn(&Value, &[Value]) -> ValueResult<Value>;

/// The kind of an object, which fixes its internal slots and built-ins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Plain,
    Array,
    Map,
    Set,
    Date,
    Buffer,
    Function,
    Iterator,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::Plain => "Object",
            Kind::Array => "Array",
            Kind::Map => "Map",
            Kind::Set => "Set",
            Kind::Date => "Date",
            Kind::Buffer => "ArrayBuffer",
            Kind::Function => "Function",
            Kind::Iterator => "Iterator",
        }
    }
}

/// A native function with a name.
#[derive(Clone)]
pub(crate) struct Function {
    name: Rc<str>,
    call: Rc<NativeFn>,
}

pub(crate) enum Slots {
    Plain,
    Array(Vec<Value>),
    Map(IndexMap<MapKey, Value>),
    Set(IndexSet<MapKey>),
    Date(f64),
    Buffer(Vec<u8>),
    Function(Function),
    Iterator(IteratorState),
}

impl Slots {
    fn kind(&self) -> Kind {
        match self {
            Slots::Plain => Kind::Plain,
            Slots::Array(_) => Kind::Array,
            Slots::Map(_) => Kind::Map,
            Slots::Set(_) => Kind::Set,
            Slots::Date(_) => Kind::Date,
            Slots::Buffer(_) => Kind::Buffer,
            Slots::Function(_) => Kind::Function,
            Slots::Iterator(_) => Kind::Iterator,
        }
    }
}

pub(crate) struct ObjectData {
    pub(crate) slots: Slots,
    props: IndexMap<PropertyKey, Property>,
    extensible: bool,
    frozen: bool,
}

struct ProxySlots {
    target: Object,
    handler: Rc<dyn ProxyHandler>,
}

enum Cell {
    Ordinary(RefCell<ObjectData>),
    Proxy(ProxySlots),
}

/// A handle to an object.
#[derive(Clone)]
pub struct Object(Rc<Cell>);

/// A non-owning handle to an object.
#[derive(Clone)]
pub struct WeakObject(Weak<Cell>);

/// The identity of an object, usable as a map key.
///
/// Identities are only unique among live objects; pair them with a
/// [`WeakObject`] to detect reuse after the object is dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

enum Lookup {
    Found(Value),
    Getter(Value),
    Missing(Kind),
}

enum Assign {
    Done(bool),
    Setter(Value),
}

impl ObjectData {
    fn new(slots: Slots) -> Self {
        Self {
            slots,
            props: IndexMap::new(),
            extensible: true,
            frozen: false,
        }
    }

    /// Own properties backed by internal slots rather than `props`.
    fn slot_property(&self, key: &PropertyKey) -> Option<PropertyDescriptor> {
        let frozen = self.frozen;
        let data = |value: Value, writable: bool, enumerable: bool, configurable: bool| {
            Some(PropertyDescriptor {
                value: Some(value),
                writable: Some(writable),
                enumerable: Some(enumerable),
                configurable: Some(configurable),
                ..PropertyDescriptor::default()
            })
        };
        match (&self.slots, key) {
            (Slots::Array(items), PropertyKey::Index(i)) => items
                .get(*i)
                .and_then(|v| data(v.clone(), !frozen, true, !frozen)),
            (Slots::Array(items), key) if key.is("length") => {
                data(Value::from(items.len()), !frozen, false, false)
            }
            (Slots::Buffer(bytes), PropertyKey::Index(i)) => bytes
                .get(*i)
                .and_then(|b| data(Value::from(u32::from(*b)), true, true, false)),
            (Slots::Buffer(bytes), key) if key.is("length") || key.is("byteLength") => {
                data(Value::from(bytes.len()), false, false, false)
            }
            (Slots::Function(f), key) if key.is("name") => {
                data(Value::String(f.name.clone()), false, false, true)
            }
            _ => None,
        }
    }

    fn lookup(&self, key: &PropertyKey) -> Lookup {
        if let Some(desc) = self.slot_property(key) {
            return Lookup::Found(desc.value.unwrap_or_default());
        }
        match (&self.slots, key) {
            (Slots::Map(entries), key) if key.is("size") => {
                return Lookup::Found(Value::from(entries.len()))
            }
            (Slots::Set(values), key) if key.is("size") => {
                return Lookup::Found(Value::from(values.len()))
            }
            _ => {}
        }
        match self.props.get(key) {
            Some(Property {
                slot: Slot::Data { value, .. },
                ..
            }) => Lookup::Found(value.clone()),
            Some(Property {
                slot: Slot::Accessor { get, .. },
                ..
            }) => Lookup::Getter(get.clone()),
            None => Lookup::Missing(self.slots.kind()),
        }
    }

    fn assign(&mut self, key: &PropertyKey, value: Value) -> ValueResult<Assign> {
        let frozen = self.frozen;
        let extensible = self.extensible;
        match (&mut self.slots, key) {
            (Slots::Array(items), PropertyKey::Index(i)) => {
                if frozen {
                    return Ok(Assign::Done(false));
                }
                let i = *i;
                if i < items.len() {
                    items[i] = value;
                } else if !extensible {
                    return Ok(Assign::Done(false));
                } else {
                    if i >= MAX_DENSE_LENGTH {
                        return Err(ValueError::InvalidLength);
                    }
                    items.resize(i, Value::Undefined);
                    items.push(value);
                }
                return Ok(Assign::Done(true));
            }
            (Slots::Array(items), key) if key.is("length") => {
                let len = to_array_length(&value)?;
                if frozen {
                    return Ok(Assign::Done(len == items.len()));
                }
                items.resize(len, Value::Undefined);
                return Ok(Assign::Done(true));
            }
            (Slots::Buffer(bytes), PropertyKey::Index(i)) => {
                return Ok(Assign::Done(match bytes.get_mut(*i) {
                    Some(byte) => {
                        *byte = to_uint8(&value);
                        true
                    }
                    None => false,
                }));
            }
            (Slots::Map(_) | Slots::Set(_), key) if key.is("size") => {
                return Ok(Assign::Done(false))
            }
            _ => {}
        }
        if self.slot_property(key).is_some() {
            return Ok(Assign::Done(false));
        }
        match self.props.get_mut(key) {
            Some(Property {
                slot: Slot::Data { value: current, writable },
                ..
            }) => {
                if !*writable {
                    return Ok(Assign::Done(false));
                }
                *current = value;
                Ok(Assign::Done(true))
            }
            Some(Property {
                slot: Slot::Accessor { set, .. },
                ..
            }) => Ok(match set {
                Value::Object(_) => Assign::Setter(set.clone()),
                _ => Assign::Done(false),
            }),
            None => {
                if !extensible {
                    return Ok(Assign::Done(false));
                }
                self.props.insert(key.clone(), Property::assigned(value));
                Ok(Assign::Done(true))
            }
        }
    }

    fn define(&mut self, key: &PropertyKey, desc: &PropertyDescriptor) -> ValueResult<bool> {
        if let Slots::Array(items) = &self.slots {
            let defaults_only = !desc.is_accessor()
                && desc.enumerable != Some(false)
                && desc.configurable != Some(false)
                && desc.writable != Some(false);
            if let PropertyKey::Index(i) = key {
                if !defaults_only {
                    return Ok(false);
                }
                let value = match &desc.value {
                    Some(v) => v.clone(),
                    None => items.get(*i).cloned().unwrap_or_default(),
                };
                return Ok(matches!(self.assign(key, value)?, Assign::Done(true)));
            }
            if key.is("length") {
                if desc.is_accessor()
                    || desc.enumerable == Some(true)
                    || desc.configurable == Some(true)
                {
                    return Ok(false);
                }
                if desc.writable == Some(false) {
                    return Ok(false);
                }
                return match &desc.value {
                    Some(v) => Ok(matches!(self.assign(key, v.clone())?, Assign::Done(true))),
                    None => Ok(true),
                };
            }
        }
        if self.slot_property(key).is_some() {
            return Ok(false);
        }
        match self.props.get_mut(key) {
            None => {
                if !self.extensible {
                    return Ok(false);
                }
                self.props
                    .insert(key.clone(), Property::from_descriptor(desc));
                Ok(true)
            }
            Some(current) => {
                if !current.accepts(desc) {
                    return Ok(false);
                }
                current.apply(desc);
                Ok(true)
            }
        }
    }

    fn remove(&mut self, key: &PropertyKey) -> bool {
        let frozen = self.frozen;
        match (&mut self.slots, key) {
            (Slots::Array(items), PropertyKey::Index(i)) => {
                if *i >= items.len() {
                    return true;
                }
                if frozen {
                    return false;
                }
                items[*i] = Value::Undefined;
                return true;
            }
            (Slots::Map(_) | Slots::Set(_), key) if key.is("size") => return true,
            _ => {}
        }
        if self.slot_property(key).is_some() {
            return false;
        }
        match self.props.get(key) {
            None => true,
            Some(prop) if !prop.configurable => false,
            Some(_) => {
                self.props.shift_remove(key);
                true
            }
        }
    }

    fn own_keys(&self) -> Vec<PropertyKey> {
        let mut keys = Vec::new();
        match &self.slots {
            Slots::Array(items) => {
                keys.extend((0..items.len()).map(PropertyKey::Index));
                keys.push(PropertyKey::from("length"));
            }
            Slots::Buffer(bytes) => {
                keys.extend((0..bytes.len()).map(PropertyKey::Index));
            }
            Slots::Function(_) => keys.push(PropertyKey::from("name")),
            _ => {}
        }
        keys.extend(self.props.keys().cloned());
        keys
    }
}

/// The largest length a list may grow to. Lists are stored densely.
pub const MAX_DENSE_LENGTH: usize = 1 << 24;

fn to_array_length(value: &Value) -> ValueResult<usize> {
    let n = value.to_number();
    if n.is_nan() || n < 0.0 || n.fract() != 0.0 || n > MAX_DENSE_LENGTH as f64 {
        return Err(ValueError::InvalidLength);
    }
    Ok(n as usize)
}

fn to_uint8(value: &Value) -> u8 {
    let n = value.to_integer();
    if !n.is_finite() {
        return 0;
    }
    n.rem_euclid(256.0) as u8
}

impl Object {
    fn ordinary(slots: Slots) -> Self {
        Object(Rc::new(Cell::Ordinary(RefCell::new(ObjectData::new(slots)))))
    }

    /// An empty plain object.
    pub fn plain() -> Self {
        Self::ordinary(Slots::Plain)
    }

    /// A plain object with the given enumerable, writable properties.
    pub fn from_entries<K, V, I>(entries: I) -> Self
    where
        K: Into<PropertyKey>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut data = ObjectData::new(Slots::Plain);
        for (k, v) in entries {
            data.props.insert(k.into(), Property::assigned(v.into()));
        }
        Object(Rc::new(Cell::Ordinary(RefCell::new(data))))
    }

    pub fn array<T: Into<Value>, I: IntoIterator<Item = T>>(items: I) -> Self {
        Self::ordinary(Slots::Array(items.into_iter().map(Into::into).collect()))
    }

    pub fn map_of<K, V, I>(entries: I) -> Self
    where
        K: Into<Value>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (MapKey::new(k.into()), v.into()))
            .collect();
        Self::ordinary(Slots::Map(entries))
    }

    pub fn set_of<T: Into<Value>, I: IntoIterator<Item = T>>(values: I) -> Self {
        let values = values
            .into_iter()
            .map(|v| MapKey::new(v.into()))
            .collect();
        Self::ordinary(Slots::Set(values))
    }

    /// A date holding `time` milliseconds since the Unix epoch (UTC).
    pub fn date(time: f64) -> Self {
        Self::ordinary(Slots::Date(builtins::date::time_clip(time)))
    }

    /// A raw binary buffer.
    pub fn buffer(bytes: Vec<u8>) -> Self {
        Self::ordinary(Slots::Buffer(bytes))
    }

    /// A native function.
    pub fn function<F>(name: &str, f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> ValueResult<Value> + 'static,
    {
        Self::ordinary(Slots::Function(Function {
            name: Rc::from(name),
            call: Rc::new(f),
        }))
    }

    /// A proxy for `target` whose operations are intercepted by `handler`.
    pub fn proxy(target: Object, handler: Rc<dyn ProxyHandler>) -> Self {
        Object(Rc::new(Cell::Proxy(ProxySlots { target, handler })))
    }

    /// An iterator that yields `map(item)` for every item of `inner`.
    pub fn mapped_iterator<F>(inner: Object, map: F) -> Self
    where
        F: Fn(Value) -> ValueResult<Value> + 'static,
    {
        Self::ordinary(Slots::Iterator(IteratorState::Mapped {
            inner,
            map: Rc::new(map),
        }))
    }

    /// An iterator over a fixed list of items.
    pub fn list_iterator(items: Vec<Value>) -> Self {
        Self::ordinary(Slots::Iterator(IteratorState::Items(VecDeque::from(items))))
    }

    pub(crate) fn with_iterator(state: IteratorState) -> Self {
        Self::ordinary(Slots::Iterator(state))
    }

    // ── Identity ──────────────────────────────────────────────────────────

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn id(&self) -> ObjectId {
        ObjectId(Rc::as_ptr(&self.0) as *const () as usize)
    }

    pub fn downgrade(&self) -> WeakObject {
        WeakObject(Rc::downgrade(&self.0))
    }

    /// Number of strong handles to this object.
    pub fn strong_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub fn is_proxy(&self) -> bool {
        matches!(&*self.0, Cell::Proxy(_))
    }

    /// The proxied target, if this object is a proxy.
    pub fn proxy_target(&self) -> Option<&Object> {
        match &*self.0 {
            Cell::Proxy(p) => Some(&p.target),
            Cell::Ordinary(_) => None,
        }
    }

    /// Follow proxy targets down to the ordinary object.
    pub fn unwrap_proxy(&self) -> Object {
        let mut current = self.clone();
        while let Some(target) = current.proxy_target().cloned() {
            current = target;
        }
        current
    }

    /// The kind of the object, looking through proxies.
    pub fn kind(&self) -> Kind {
        match &*self.0 {
            Cell::Ordinary(data) => data.borrow().slots.kind(),
            Cell::Proxy(p) => p.target.kind(),
        }
    }

    fn ordinary_data(&self) -> Option<&RefCell<ObjectData>> {
        match &*self.0 {
            Cell::Ordinary(data) => Some(data),
            Cell::Proxy(_) => None,
        }
    }

    /// Run `f` on the internal slots of the underlying ordinary object.
    ///
    /// `f` must not call back into the runtime.
    pub(crate) fn with_slots<R>(&self, f: impl FnOnce(&mut Slots) -> R) -> Option<R> {
        let target = self.unwrap_proxy();
        let data = target.ordinary_data()?;
        let mut data = data.borrow_mut();
        Some(f(&mut data.slots))
    }

    // ── Internal methods ──────────────────────────────────────────────────

    /// Read a property, passing this object as the receiver.
    pub fn get(&self, key: impl Into<PropertyKey>) -> ValueResult<Value> {
        self.get_with_receiver(&key.into(), &Value::Object(self.clone()))
    }

    pub fn get_with_receiver(&self, key: &PropertyKey, receiver: &Value) -> ValueResult<Value> {
        match &*self.0 {
            Cell::Proxy(p) => p.handler.get(&p.target, key, receiver),
            Cell::Ordinary(data) => {
                let lookup = data.borrow().lookup(key);
                match lookup {
                    Lookup::Found(value) => Ok(value),
                    Lookup::Getter(Value::Object(getter)) => getter.call(receiver, &[]),
                    Lookup::Getter(_) => Ok(Value::Undefined),
                    Lookup::Missing(kind) => Ok(key
                        .as_str()
                        .and_then(|name| builtins::method(kind, name))
                        .unwrap_or_default()),
                }
            }
        }
    }

    /// Write a property. `Ok(false)` means the write was rejected.
    pub fn set(&self, key: impl Into<PropertyKey>, value: impl Into<Value>) -> ValueResult<bool> {
        self.set_with_receiver(&key.into(), value.into(), &Value::Object(self.clone()))
    }

    pub fn set_with_receiver(
        &self,
        key: &PropertyKey,
        value: Value,
        receiver: &Value,
    ) -> ValueResult<bool> {
        match &*self.0 {
            Cell::Proxy(p) => p.handler.set(&p.target, key, value, receiver),
            Cell::Ordinary(data) => {
                let assign = data.borrow_mut().assign(key, value.clone())?;
                match assign {
                    Assign::Done(done) => Ok(done),
                    Assign::Setter(setter) => {
                        if let Value::Object(setter) = setter {
                            setter.call(receiver, &[value])?;
                        }
                        Ok(true)
                    }
                }
            }
        }
    }

    /// Define or redefine an own property. `Ok(false)` means the definition
    /// is incompatible with the current property or the object.
    pub fn define_property(
        &self,
        key: impl Into<PropertyKey>,
        desc: PropertyDescriptor,
    ) -> ValueResult<bool> {
        let key = key.into();
        match &*self.0 {
            Cell::Proxy(p) => p.handler.define_property(&p.target, &key, &desc),
            Cell::Ordinary(data) => data.borrow_mut().define(&key, &desc),
        }
    }

    /// Delete an own property. Deleting a missing property succeeds.
    pub fn delete(&self, key: impl Into<PropertyKey>) -> ValueResult<bool> {
        let key = key.into();
        match &*self.0 {
            Cell::Proxy(p) => p.handler.delete_property(&p.target, &key),
            Cell::Ordinary(data) => Ok(data.borrow_mut().remove(&key)),
        }
    }

    /// Whether the property exists, either own or as a built-in method.
    pub fn has(&self, key: impl Into<PropertyKey>) -> ValueResult<bool> {
        let key = key.into();
        match &*self.0 {
            Cell::Proxy(p) => p.handler.has(&p.target, &key),
            Cell::Ordinary(data) => {
                let data = data.borrow();
                if !matches!(data.lookup(&key), Lookup::Missing(_)) {
                    return Ok(true);
                }
                Ok(key
                    .as_str()
                    .is_some_and(|name| builtins::has_method(data.slots.kind(), name)))
            }
        }
    }

    /// The full descriptor of an own property.
    pub fn get_own_property(&self, key: impl Into<PropertyKey>) -> Option<PropertyDescriptor> {
        let key = key.into();
        let target = self.unwrap_proxy();
        let data = target.ordinary_data()?.borrow();
        data.slot_property(&key)
            .or_else(|| data.props.get(&key).map(Property::to_descriptor))
    }

    /// Own property keys in insertion order (indices first for arrays).
    pub fn own_keys(&self) -> Vec<PropertyKey> {
        let target = self.unwrap_proxy();
        target
            .ordinary_data()
            .map(|data| data.borrow().own_keys())
            .unwrap_or_default()
    }

    /// Own enumerable string keys.
    pub fn keys(&self) -> Vec<PropertyKey> {
        self.own_keys()
            .into_iter()
            .filter(|key| {
                !key.is_symbol()
                    && self
                        .get_own_property(key)
                        .is_some_and(|desc| desc.enumerable == Some(true))
            })
            .collect()
    }

    pub fn is_callable(&self) -> bool {
        self.kind() == Kind::Function
    }

    /// The name of a (possibly proxied) function.
    pub fn function_name(&self) -> Option<Rc<str>> {
        self.with_slots(|slots| match slots {
            Slots::Function(f) => Some(f.name.clone()),
            _ => None,
        })
        .flatten()
    }

    /// Call this object as a function.
    pub fn call(&self, this: &Value, args: &[Value]) -> ValueResult<Value> {
        match &*self.0 {
            Cell::Proxy(p) => p.handler.apply(&p.target, this, args),
            Cell::Ordinary(data) => {
                let f = match &data.borrow().slots {
                    Slots::Function(f) => f.call.clone(),
                    other => return Err(ValueError::NotCallable(other.kind().name().to_string())),
                };
                f(this, args)
            }
        }
    }

    /// Read `name` and call it with this object as `this`.
    pub fn call_method(&self, name: &str, args: &[Value]) -> ValueResult<Value> {
        match self.get(name)? {
            Value::Object(f) if f.is_callable() => f.call(&Value::Object(self.clone()), args),
            _ => Err(ValueError::NotCallable(name.to_string())),
        }
    }

    /// Advance an iterator object. Returns `None` once it is done.
    pub fn iter_next(&self) -> ValueResult<Option<Value>> {
        let step = self.call_method("next", &[])?;
        let Value::Object(step) = step else {
            return Err(ValueError::NotAnObject(step.type_name()));
        };
        if step.get("done")?.is_truthy() {
            return Ok(None);
        }
        Ok(Some(step.get("value")?))
    }

    /// Drain an iterator object.
    pub fn collect_iter(&self) -> ValueResult<Vec<Value>> {
        let mut out = Vec::new();
        while let Some(value) = self.iter_next()? {
            out.push(value);
        }
        Ok(out)
    }

    /// Make the underlying object non-extensible and all its own
    /// properties read-only and non-configurable.
    pub fn freeze(&self) {
        let target = self.unwrap_proxy();
        if let Some(data) = target.ordinary_data() {
            let mut data = data.borrow_mut();
            data.extensible = false;
            data.frozen = true;
            for prop in data.props.values_mut() {
                prop.freeze();
            }
        }
    }

    pub fn prevent_extensions(&self) {
        let target = self.unwrap_proxy();
        if let Some(data) = target.ordinary_data() {
            data.borrow_mut().extensible = false;
        }
    }

    pub fn is_extensible(&self) -> bool {
        let target = self.unwrap_proxy();
        target
            .ordinary_data()
            .is_some_and(|data| data.borrow().extensible)
    }

    // ── Internal slots ────────────────────────────────────────────────────

    /// Elements of an array, read without going through any proxy.
    pub fn array_elements(&self) -> Option<Vec<Value>> {
        self.with_slots(|slots| match slots {
            Slots::Array(items) => Some(items.clone()),
            _ => None,
        })
        .flatten()
    }

    /// Time value of a date.
    pub fn date_value(&self) -> Option<f64> {
        self.with_slots(|slots| match slots {
            Slots::Date(t) => Some(*t),
            _ => None,
        })
        .flatten()
    }

    pub fn buffer_bytes(&self) -> Option<Vec<u8>> {
        self.with_slots(|slots| match slots {
            Slots::Buffer(bytes) => Some(bytes.clone()),
            _ => None,
        })
        .flatten()
    }

    /// Entry lookup on a map.
    pub fn map_get(&self, key: &Value) -> Option<Value> {
        self.with_slots(|slots| match slots {
            Slots::Map(entries) => entries.get(&MapKey::new(key.clone())).cloned(),
            _ => None,
        })
        .flatten()
    }

    /// Membership test on a map (by key) or a set (by value).
    pub fn collection_has(&self, key: &Value) -> bool {
        self.with_slots(|slots| match slots {
            Slots::Map(entries) => entries.contains_key(&MapKey::new(key.clone())),
            Slots::Set(values) => values.contains(&MapKey::new(key.clone())),
            _ => false,
        })
        .unwrap_or(false)
    }

    /// Insert or replace a map entry. Returns `false` for non-maps.
    pub fn map_insert(&self, key: Value, value: Value) -> bool {
        self.with_slots(|slots| match slots {
            Slots::Map(entries) => {
                entries.insert(MapKey::new(key), value);
                true
            }
            _ => false,
        })
        .unwrap_or(false)
    }

    pub fn map_entries(&self) -> Option<Vec<(Value, Value)>> {
        self.with_slots(|slots| match slots {
            Slots::Map(entries) => Some(
                entries
                    .iter()
                    .map(|(k, v)| (k.value().clone(), v.clone()))
                    .collect(),
            ),
            _ => None,
        })
        .flatten()
    }

    pub fn set_values(&self) -> Option<Vec<Value>> {
        self.with_slots(|slots| match slots {
            Slots::Set(values) => Some(values.iter().map(|k| k.value().clone()).collect()),
            _ => None,
        })
        .flatten()
    }

    /// Element count of an array, map or set.
    pub fn size(&self) -> Option<usize> {
        self.with_slots(|slots| match slots {
            Slots::Array(items) => Some(items.len()),
            Slots::Map(entries) => Some(entries.len()),
            Slots::Set(values) => Some(values.len()),
            _ => None,
        })
        .flatten()
    }

    /// Copy the internal state and own properties of the underlying object
    /// into a new, unrelated object.
    pub(crate) fn copy_ordinary(&self) -> ValueResult<Object> {
        let target = self.unwrap_proxy();
        let Some(data) = target.ordinary_data() else {
            return Err(ValueError::NotCloneable("Proxy"));
        };
        let data = data.borrow();
        let slots = match &data.slots {
            Slots::Plain => Slots::Plain,
            Slots::Array(items) => Slots::Array(items.clone()),
            Slots::Map(entries) => Slots::Map(entries.clone()),
            Slots::Set(values) => Slots::Set(values.clone()),
            Slots::Date(t) => Slots::Date(*t),
            Slots::Buffer(bytes) => Slots::Buffer(bytes.clone()),
            other => return Err(ValueError::NotCloneable(other.kind().name())),
        };
        let mut copy = ObjectData::new(slots);
        copy.props = data.props.clone();
        Ok(Object(Rc::new(Cell::Ordinary(RefCell::new(copy)))))
    }
}

impl WeakObject {
    pub fn upgrade(&self) -> Option<Object> {
        self.0.upgrade().map(Object)
    }

    /// Whether this handle points at `object`.
    pub fn is(&self, object: &Object) -> bool {
        Weak::as_ptr(&self.0) == Rc::as_ptr(&object.0)
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            Cell::Proxy(p) => write!(f, "Proxy({:?})", p.target),
            Cell::Ordinary(_) => write!(f, "{}@{:#x}", self.kind().name(), self.id().0),
        }
    }
}

impl fmt::Debug for WeakObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(object) => write!(f, "Weak({object:?})"),
            None => f.write_str("Weak(<dropped>)"),
        }
    }
}
