//! Property descriptors and stored property records.

use crate::value::{same_value, Value};

/// A (possibly partial) property descriptor, as passed to
/// [`Object::define_property`](crate::Object::define_property) and returned
/// by [`Object::get_own_property`](crate::Object::get_own_property).
///
/// Absent fields leave the current attribute unchanged when redefining, and
/// default to `false`/`undefined` when creating a property.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyDescriptor {
    pub value: Option<Value>,
    pub writable: Option<bool>,
    pub get: Option<Value>,
    pub set: Option<Value>,
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    /// A writable, enumerable, configurable data property.
    pub fn data(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            writable: Some(true),
            enumerable: Some(true),
            configurable: Some(true),
            ..Self::default()
        }
    }

    /// An enumerable, configurable accessor property.
    pub fn accessor(get: Option<Value>, set: Option<Value>) -> Self {
        Self {
            get: Some(get.unwrap_or_default()),
            set: Some(set.unwrap_or_default()),
            enumerable: Some(true),
            configurable: Some(true),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn writable(mut self, writable: bool) -> Self {
        self.writable = Some(writable);
        self
    }

    pub fn enumerable(mut self, enumerable: bool) -> Self {
        self.enumerable = Some(enumerable);
        self
    }

    pub fn configurable(mut self, configurable: bool) -> Self {
        self.configurable = Some(configurable);
        self
    }

    pub fn is_accessor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    pub fn is_data(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }
}

#[derive(Clone, Debug)]
pub(crate) enum Slot {
    Data { value: Value, writable: bool },
    Accessor { get: Value, set: Value },
}

/// A stored own property.
#[derive(Clone, Debug)]
pub(crate) struct Property {
    pub(crate) slot: Slot,
    pub(crate) enumerable: bool,
    pub(crate) configurable: bool,
}

impl Property {
    /// A plain assignment-created property: all attributes `true`.
    pub(crate) fn assigned(value: Value) -> Self {
        Self {
            slot: Slot::Data {
                value,
                writable: true,
            },
            enumerable: true,
            configurable: true,
        }
    }

    pub(crate) fn from_descriptor(desc: &PropertyDescriptor) -> Self {
        let slot = if desc.is_accessor() {
            Slot::Accessor {
                get: desc.get.clone().unwrap_or_default(),
                set: desc.set.clone().unwrap_or_default(),
            }
        } else {
            Slot::Data {
                value: desc.value.clone().unwrap_or_default(),
                writable: desc.writable.unwrap_or(false),
            }
        };
        Self {
            slot,
            enumerable: desc.enumerable.unwrap_or(false),
            configurable: desc.configurable.unwrap_or(false),
        }
    }

    pub(crate) fn to_descriptor(&self) -> PropertyDescriptor {
        let mut desc = PropertyDescriptor {
            enumerable: Some(self.enumerable),
            configurable: Some(self.configurable),
            ..PropertyDescriptor::default()
        };
        match &self.slot {
            Slot::Data { value, writable } => {
                desc.value = Some(value.clone());
                desc.writable = Some(*writable);
            }
            Slot::Accessor { get, set } => {
                desc.get = Some(get.clone());
                desc.set = Some(set.clone());
            }
        }
        desc
    }

    /// Whether redefining this property with `desc` is allowed.
    pub(crate) fn accepts(&self, desc: &PropertyDescriptor) -> bool {
        if self.configurable {
            return true;
        }
        if desc.configurable == Some(true) {
            return false;
        }
        if desc.enumerable.is_some_and(|e| e != self.enumerable) {
            return false;
        }
        match &self.slot {
            Slot::Data { value, writable } => {
                if desc.is_accessor() {
                    return false;
                }
                if !writable {
                    if desc.writable == Some(true) {
                        return false;
                    }
                    if desc.value.as_ref().is_some_and(|v| !same_value(v, value)) {
                        return false;
                    }
                }
                true
            }
            Slot::Accessor { get, set } => {
                if desc.is_data() {
                    return false;
                }
                let same_get = desc.get.as_ref().map_or(true, |g| same_value(g, get));
                let same_set = desc.set.as_ref().map_or(true, |s| same_value(s, set));
                same_get && same_set
            }
        }
    }

    /// Merge `desc` into this property. Callers check [`Property::accepts`] first.
    pub(crate) fn apply(&mut self, desc: &PropertyDescriptor) {
        if let Some(enumerable) = desc.enumerable {
            self.enumerable = enumerable;
        }
        if let Some(configurable) = desc.configurable {
            self.configurable = configurable;
        }
        if desc.is_accessor() {
            let (mut get, mut set) = match &self.slot {
                Slot::Accessor { get, set } => (get.clone(), set.clone()),
                Slot::Data { .. } => (Value::Undefined, Value::Undefined),
            };
            if let Some(g) = &desc.get {
                get = g.clone();
            }
            if let Some(s) = &desc.set {
                set = s.clone();
            }
            self.slot = Slot::Accessor { get, set };
        } else if desc.is_data() {
            let (mut value, mut writable) = match &self.slot {
                Slot::Data { value, writable } => (value.clone(), *writable),
                Slot::Accessor { .. } => (Value::Undefined, false),
            };
            if let Some(v) = &desc.value {
                value = v.clone();
            }
            if let Some(w) = desc.writable {
                writable = w;
            }
            self.slot = Slot::Data { value, writable };
        }
    }

    pub(crate) fn freeze(&mut self) {
        self.configurable = false;
        if let Slot::Data { writable, .. } = &mut self.slot {
            *writable = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_property_defaults_to_false() {
        let prop = Property::from_descriptor(&PropertyDescriptor::default().with_value(1));
        let desc = prop.to_descriptor();
        assert_eq!(desc.writable, Some(false));
        assert_eq!(desc.enumerable, Some(false));
        assert_eq!(desc.configurable, Some(false));
    }

    #[test]
    fn test_frozen_property_rejects_new_value() {
        let mut prop = Property::assigned(Value::from(1));
        prop.freeze();
        assert!(!prop.accepts(&PropertyDescriptor::default().with_value(2)));
        assert!(prop.accepts(&PropertyDescriptor::default().with_value(1)));
        assert!(!prop.accepts(&PropertyDescriptor::default().configurable(true)));
    }

    #[test]
    fn test_apply_switches_to_accessor() {
        let mut prop = Property::assigned(Value::from(1));
        prop.apply(&PropertyDescriptor::accessor(None, None));
        assert!(prop.to_descriptor().is_accessor());
    }
}
