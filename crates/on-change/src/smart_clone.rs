//! Snapshot and diff of built-in containers around method calls.
//!
//! Container methods change internal state that property traps never see.
//! Before such a call, [`SmartClone::start`] takes a shallow copy of the
//! container; afterwards the popped [`Session`] compares the copy with the
//! container to decide whether the call changed anything. Changes reported
//! by traps while a session is open are folded into the innermost session
//! through [`SmartClone::update`], which also writes the first observed
//! previous value of each location into the copy.

use on_change_path::Path;
use on_change_value::{
    shallow_clone, ContainerKind, Kind, Object, PropertyDescriptor, PropertyKey, Value,
    ValueResult,
};
use tracing::trace;

use crate::options::Equals;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Comparator {
    /// Compare time values.
    Time,
    /// Compare size and contents.
    Contents,
    /// Only changes reported from inside the call count.
    NestedOnly,
}

/// One bracketed method call.
#[derive(Debug)]
pub struct Session {
    target: Object,
    path: Path<Value>,
    method: String,
    clone: Object,
    kind: Option<ContainerKind>,
    comparator: Comparator,
    nested_change: bool,
    recorded: Vec<Path<Value>>,
    copied: Vec<Path<Value>>,
}

impl Session {
    pub fn target(&self) -> &Object {
        &self.target
    }

    pub fn path(&self) -> &Path<Value> {
        &self.path
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// The container's state before the call, with previous values of
    /// nested changes written in.
    pub fn clone_object(&self) -> &Object {
        &self.clone
    }

    pub fn into_clone(self) -> Object {
        self.clone
    }

    /// Whether the call changed the container.
    pub fn is_changed(&self, equals: &Equals) -> bool {
        match self.comparator {
            Comparator::Time => {
                let before = Value::from(self.clone.date_value());
                let after = Value::from(self.target.date_value());
                !equals.call(&before, &after)
            }
            _ if self.nested_change => true,
            Comparator::NestedOnly => false,
            Comparator::Contents => match self.kind {
                Some(ContainerKind::List) => lists_differ(&self.clone, &self.target, equals),
                Some(ContainerKind::Map) => maps_differ(&self.clone, &self.target, equals),
                Some(ContainerKind::Set) => sets_differ(&self.clone, &self.target),
                Some(ContainerKind::Date) | None => false,
            },
        }
    }

    /// The container inside the clone at `relative`, copying every
    /// container along the way the first time it is touched so that the
    /// live graph is never written.
    fn container_at(&mut self, relative: &Path<Value>) -> Option<Object> {
        let mut current = self.clone.clone();
        let mut walked = Path::root();
        for segment in relative.keys() {
            walked = walked.concat(segment.clone());
            let child = read_entry(&current, segment)?.into_object()?;
            if self.copied.contains(&walked) {
                current = child;
                continue;
            }
            let copy = shallow_clone(&Value::Object(child)).ok()?.into_object()?;
            write_entry(&current, segment, Value::Object(copy.clone()));
            self.copied.push(walked.clone());
            current = copy;
        }
        Some(current)
    }
}

fn lists_differ(before: &Object, after: &Object, equals: &Equals) -> bool {
    let (Some(before), Some(after)) = (before.array_elements(), after.array_elements()) else {
        return true;
    };
    before.len() != after.len() || before.iter().zip(&after).any(|(a, b)| !equals.call(a, b))
}

fn maps_differ(before: &Object, after: &Object, equals: &Equals) -> bool {
    let (Some(entries), Some(size)) = (before.map_entries(), after.size()) else {
        return true;
    };
    entries.len() != size
        || entries.iter().any(|(key, value)| match after.map_get(key) {
            Some(current) => !after.collection_has(key) || !equals.call(value, &current),
            None => true,
        })
}

fn sets_differ(before: &Object, after: &Object) -> bool {
    let (Some(values), Some(size)) = (before.set_values(), after.size()) else {
        return true;
    };
    values.len() != size || values.iter().any(|value| !after.collection_has(value))
}

fn read_entry(container: &Object, key: &Value) -> Option<Value> {
    if container.kind() == Kind::Map {
        return container.map_get(key);
    }
    container
        .get_own_property(PropertyKey::from_value(key))
        .and_then(|desc| desc.value)
}

fn write_entry(container: &Object, key: &Value, value: Value) {
    let written = match container.kind() {
        Kind::Map => container.map_insert(key.clone(), value),
        Kind::Set => false,
        _ => container
            .define_property(PropertyKey::from_value(key), PropertyDescriptor::data(value))
            .unwrap_or(false),
    };
    if !written {
        trace!(key = %key, "previous value not recorded");
    }
}

/// The stack of open sessions.
#[derive(Debug, Default)]
pub struct SmartClone {
    sessions: Vec<Session>,
}

impl SmartClone {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `value` is a container whose changes need snapshotting.
    pub fn is_handled_type(value: &Value) -> bool {
        ContainerKind::of(value).is_some()
    }

    /// Whether `name` is a mutator or a known reader of `target`'s kind.
    pub fn is_handled_method(target: &Object, name: &str) -> bool {
        ContainerKind::of_object(target).is_some_and(|kind| kind.is_handled_method(name))
    }

    pub fn is_cloning(&self) -> bool {
        !self.sessions.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.sessions.len()
    }

    /// Open a session for a call of `method` on `target` (the underlying
    /// container) located at `path`.
    pub fn start(&mut self, target: Object, path: Path<Value>, method: &str) -> ValueResult<()> {
        let kind = ContainerKind::of_object(&target);
        let comparator = match kind {
            Some(ContainerKind::Date) => Comparator::Time,
            Some(kind) if kind.is_mutator(method) => Comparator::Contents,
            _ => Comparator::NestedOnly,
        };
        let clone = shallow_clone(&Value::Object(target.clone()))?
            .into_object()
            .unwrap_or_else(Object::plain);
        trace!(method, path = %path, depth = self.sessions.len() + 1, "session started");
        self.sessions.push(Session {
            target,
            path,
            method: method.to_string(),
            clone,
            kind,
            comparator,
            nested_change: false,
            recorded: Vec::new(),
            copied: Vec::new(),
        });
        Ok(())
    }

    /// Fold a change reported under the innermost session.
    ///
    /// `previous` is written into the clone at the location of `key` below
    /// `path` unless a previous value was already recorded there. `length`
    /// keys and locations outside the session's own path only mark the
    /// session as changed.
    pub fn update(&mut self, path: &Path<Value>, key: Option<&Value>, previous: Value) {
        let Some(session) = self.sessions.last_mut() else {
            return;
        };
        session.nested_change = true;
        let Some(key) = key else {
            return;
        };
        if key.as_str() == Some("length") {
            return;
        }
        let Some(relative) = path.after(&session.path) else {
            trace!(path = %path, session = %session.path, "change outside session path");
            return;
        };
        let location = relative.concat(key.clone());
        if session.recorded.contains(&location) {
            return;
        }
        session.recorded.push(location);
        if let Some(container) = session.container_at(&relative) {
            write_entry(&container, key, previous);
        }
    }

    /// Close the innermost session.
    pub fn stop(&mut self) -> Option<Session> {
        let session = self.sessions.pop()?;
        trace!(method = %session.method, path = %session.path, "session stopped");
        Some(session)
    }

    /// The `this` a bracketed call runs with: the underlying container for
    /// handled methods, the wrapper otherwise.
    pub fn preferred_this(is_handled: bool, wrapper_this: &Value, underlying: &Object) -> Value {
        if is_handled {
            Value::Object(underlying.clone())
        } else {
            wrapper_this.clone()
        }
    }
}
