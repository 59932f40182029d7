//! Built-in methods and the closed classification of container kinds.
//!
//! Built-ins are not stored on objects. [`method`] resolves a name against
//! the method table of an object's [`Kind`] and returns a shared function
//! object, so repeated reads of `list.push` yield the same function.

pub(crate) mod array;
pub(crate) mod collection;
pub(crate) mod date;
mod iterator;

use std::cell::RefCell;
use std::collections::HashMap;

pub(crate) use iterator::{IteratorState, Yield};

use crate::error::{ValueError, ValueResult};
use crate::object::{Kind, Object};
use crate::value::Value;

pub(crate) type Builtin = fn(&Value, &[Value]) -> ValueResult<Value>;

pub(crate) type MethodTable = &'static [(&'static str, Builtin)];

thread_local! {
    static FUNCTIONS: RefCell<HashMap<(Kind, &'static str), Object>> = RefCell::new(HashMap::new());
}

fn table(kind: Kind) -> MethodTable {
    match kind {
        Kind::Array => array::METHODS,
        Kind::Map => collection::MAP_METHODS,
        Kind::Set => collection::SET_METHODS,
        Kind::Date => date::METHODS,
        Kind::Iterator => iterator::METHODS,
        Kind::Plain | Kind::Buffer | Kind::Function => &[],
    }
}

fn find(kind: Kind, name: &str) -> Option<(&'static str, Builtin)> {
    table(kind).iter().find(|(n, _)| *n == name).copied()
}

/// The built-in method `name` of objects of `kind`, if there is one.
pub(crate) fn method(kind: Kind, name: &str) -> Option<Value> {
    let (name, f) = find(kind, name)?;
    let function = FUNCTIONS.with(|functions| {
        functions
            .borrow_mut()
            .entry((kind, name))
            .or_insert_with(|| Object::function(name, f))
            .clone()
    });
    Some(Value::Object(function))
}

pub(crate) fn has_method(kind: Kind, name: &str) -> bool {
    find(kind, name).is_some()
}

/// The observable container kinds: built-ins whose state changes are not
/// visible as property writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    List,
    Map,
    Set,
    Date,
}

const LIST_MUTATORS: &[&str] = &[
    "push",
    "pop",
    "shift",
    "unshift",
    "splice",
    "reverse",
    "sort",
    "fill",
    "copyWithin",
];
const LIST_READERS: &[&str] = &["concat", "includes", "indexOf", "lastIndexOf", "join", "keys"];
const MAP_MUTATORS: &[&str] = &["set", "delete", "clear", "forEach"];
const MAP_READERS: &[&str] = &["get", "has", "keys", "values", "entries"];
const SET_MUTATORS: &[&str] = &["add", "delete", "clear", "forEach"];
const SET_READERS: &[&str] = &["has", "keys", "values", "entries"];

impl ContainerKind {
    pub fn of(value: &Value) -> Option<Self> {
        value.as_object().and_then(Self::of_object)
    }

    pub fn of_object(object: &Object) -> Option<Self> {
        match object.kind() {
            Kind::Array => Some(ContainerKind::List),
            Kind::Map => Some(ContainerKind::Map),
            Kind::Set => Some(ContainerKind::Set),
            Kind::Date => Some(ContainerKind::Date),
            _ => None,
        }
    }

    /// Methods that may change the container's contents. Every date method
    /// counts as a mutator.
    pub fn mutators(self) -> Vec<&'static str> {
        match self {
            ContainerKind::List => LIST_MUTATORS.to_vec(),
            ContainerKind::Map => MAP_MUTATORS.to_vec(),
            ContainerKind::Set => SET_MUTATORS.to_vec(),
            ContainerKind::Date => date::METHODS.iter().map(|(name, _)| *name).collect(),
        }
    }

    /// Read-only methods that still have to run against the underlying
    /// object rather than a proxy.
    pub fn readers(self) -> &'static [&'static str] {
        match self {
            ContainerKind::List => LIST_READERS,
            ContainerKind::Map => MAP_READERS,
            ContainerKind::Set => SET_READERS,
            ContainerKind::Date => &[],
        }
    }

    pub fn is_mutator(self, name: &str) -> bool {
        match self {
            ContainerKind::List => LIST_MUTATORS.contains(&name),
            ContainerKind::Map => MAP_MUTATORS.contains(&name),
            ContainerKind::Set => SET_MUTATORS.contains(&name),
            ContainerKind::Date => has_method(Kind::Date, name),
        }
    }

    pub fn is_handled_method(self, name: &str) -> bool {
        self.is_mutator(name) || self.readers().contains(&name)
    }

    /// Whether some of the kind's methods return iterators over contents.
    pub fn exposes_iterators(self) -> bool {
        matches!(self, ContainerKind::Map | ContainerKind::Set)
    }

    /// Whether the kind keeps its state in internal slots that only the
    /// underlying object can reach.
    pub fn is_slot_backed(self) -> bool {
        !matches!(self, ContainerKind::List)
    }
}

/// Values that are never wrapped: primitives and raw binary buffers.
pub fn is_never_wrapped(value: &Value) -> bool {
    match value {
        Value::Object(o) => o.kind() == Kind::Buffer,
        _ => true,
    }
}

/// Whether reads on `object` must use the object itself as receiver.
pub fn reads_through_target(object: &Object) -> bool {
    matches!(object.kind(), Kind::Map | Kind::Set | Kind::Date | Kind::Buffer)
}

pub(crate) fn this_object<'a>(this: &'a Value, method: &'static str) -> ValueResult<&'a Object> {
    this.as_object()
        .ok_or(ValueError::IncompatibleReceiver { method })
}

/// Resolve `this` to the underlying object, requiring `kind`.
pub(crate) fn slot_receiver(this: &Value, kind: Kind, method: &'static str) -> ValueResult<Object> {
    let object = this_object(this, method)?.unwrap_proxy();
    if object.kind() != kind {
        return Err(ValueError::IncompatibleReceiver { method });
    }
    Ok(object)
}

pub(crate) fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or_default()
}

pub(crate) fn callable(value: &Value, method: &'static str) -> ValueResult<Object> {
    match value {
        Value::Object(f) if f.is_callable() => Ok(f.clone()),
        _ => Err(ValueError::NotCallable(format!("{method} callback"))),
    }
}
