//! A small dynamic object runtime.
//!
//! Values are either primitives or [`Object`] handles with identity.
//! Objects carry own properties described by [`PropertyDescriptor`]s, the
//! internal state of their [`Kind`] (list elements, map entries, set
//! members, a date's time value, raw bytes, a native function), and the
//! built-in methods of that kind. A proxy object forwards every internal
//! operation to a [`ProxyHandler`], which is how observers intercept reads,
//! writes, definitions, deletions and calls without the caller noticing.
//!
//! # Example
//!
//! ```
//! use on_change_value::{Object, Value};
//!
//! let list = Object::array([1, 2, 3]);
//! list.call_method("splice", &[Value::from(1), Value::from(0), Value::from(9)]).unwrap();
//! assert_eq!(list.get("length").unwrap(), Value::from(4));
//!
//! let doc = Value::from_json(&serde_json::json!({"user": {"name": "ada"}}));
//! let user = doc.as_object().unwrap().get("user").unwrap();
//! assert_eq!(user.as_object().unwrap().get("name").unwrap(), Value::from("ada"));
//! ```

mod builtins;
mod clone;
mod descriptor;
mod error;
mod json;
mod key;
mod map_key;
mod object;
mod proxy;
mod value;

pub use builtins::date::iso_string;
pub use builtins::{is_never_wrapped, reads_through_target, ContainerKind};
pub use clone::shallow_clone;
pub use descriptor::PropertyDescriptor;
pub use error::{ValueError, ValueResult};
pub use key::{PropertyKey, Symbol};
pub use map_key::MapKey;
pub use object::{Kind, NativeFn, Object, ObjectId, WeakObject, MAX_DENSE_LENGTH};
pub use proxy::ProxyHandler;
pub use value::{same_value, same_value_zero, strict_equals, Value};
