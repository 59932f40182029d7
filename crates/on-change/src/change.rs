use std::fmt;

use on_change_path::PathRepr;
use on_change_value::Value;

/// Call metadata attached to changes produced by a container method.
#[derive(Clone, Debug)]
pub struct ApplyData {
    pub name: String,
    pub args: Vec<Value>,
    pub result: Value,
}

/// A change notification.
///
/// `path` locates the changed property relative to the observed root (for
/// method calls, the container the method ran on). `value` is the new
/// value and `previous` the value before the change; for method calls these
/// are the container itself and a shallow copy of its state before the
/// call.
#[derive(Clone, Debug)]
pub struct Change {
    pub path: PathRepr<Value>,
    pub value: Value,
    pub previous: Value,
    pub apply_data: Option<ApplyData>,
}

impl Change {
    /// The method name, for changes produced by a method call.
    pub fn method(&self) -> Option<&str> {
        self.apply_data.as_ref().map(|data| data.name.as_str())
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.apply_data {
            Some(data) => write!(f, "{}: {}()", self.path, data.name),
            None => write!(f, "{}: {:?} -> {:?}", self.path, self.previous, self.value),
        }
    }
}
