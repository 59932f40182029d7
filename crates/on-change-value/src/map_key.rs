use std::hash::{Hash, Hasher};

use crate::value::{same_value_zero, Value};

/// A value used as a map key or set member.
///
/// Equality is SameValueZero: `NaN` equals itself, `+0` equals `-0`, and
/// objects compare by identity.
#[derive(Clone, Debug)]
pub struct MapKey(Value);

impl MapKey {
    pub fn new(value: Value) -> Self {
        let value = match value {
            Value::Number(n) if n == 0.0 => Value::Number(0.0),
            other => other,
        };
        Self(value)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl PartialEq for MapKey {
    fn eq(&self, other: &Self) -> bool {
        same_value_zero(&self.0, &other.0)
    }
}

impl Eq for MapKey {}

impl Hash for MapKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(&self.0).hash(state);
        match &self.0 {
            Value::Undefined | Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Number(n) if n.is_nan() => u64::MAX.hash(state),
            Value::Number(n) => n.to_bits().hash(state),
            Value::String(s) => s.hash(state),
            Value::Symbol(symbol) => symbol.hash(state),
            Value::Object(o) => o.id().hash(state),
        }
    }
}
