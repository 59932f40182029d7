//! Observe every mutation inside an object graph.
//!
//! [`observe`] returns a wrapper of the root that behaves like the root for
//! every read, write, definition, deletion and method call. Nested objects
//! are wrapped lazily as they are reached. Each mutation made through a
//! wrapper reaches the callback once, as a [`Change`] carrying the path of
//! the changed location, its new value and its previous value. Mutating
//! methods of lists, maps, sets and dates are reported as a single change
//! on the container, with [`ApplyData`] describing the call.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use on_change::{observe, Options};
//! use on_change_value::{Object, Value};
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let log = seen.clone();
//! let root = Value::from_json(&serde_json::json!({"user": {"tags": []}}));
//! let proxy = observe(root, move |change| log.borrow_mut().push(change.to_string()), Options::new());
//!
//! let user = proxy.as_object().unwrap().get("user").unwrap();
//! let user = user.as_object().unwrap();
//! user.set("name", "ada").unwrap();
//! let tags = user.get("tags").unwrap();
//! tags.as_object().unwrap().call_method("push", &[Value::from("admin")]).unwrap();
//!
//! assert_eq!(seen.borrow().as_slice(), ["user.name: undefined -> \"ada\"", "user.tags: push()"]);
//! ```

mod cache;
mod change;
mod handler;
mod ignore;
mod iterator;
mod options;
mod smart_clone;

use on_change_value::Value;

use crate::handler::Interceptor;

pub use cache::IdentityCache;
pub use change::{ApplyData, Change};
pub use handler::{target_symbol, unsubscribe_symbol};
pub use options::{Details, Equals, Options, OptionsError};
pub use smart_clone::{Session, SmartClone};

/// An observed graph: the root wrapper plus control over the observation.
pub struct Observer {
    interceptor: Interceptor,
    proxy: Value,
}

impl Observer {
    /// Start observing `root`. Non-object roots are not wrapped and never
    /// produce changes.
    pub fn new<F>(root: Value, callback: F, options: Options) -> Self
    where
        F: Fn(&Change) + 'static,
    {
        let interceptor = Interceptor::new(root, Box::new(callback), options);
        let proxy = interceptor.wrap_root();
        Self { interceptor, proxy }
    }

    /// The wrapper of the root.
    pub fn proxy(&self) -> &Value {
        &self.proxy
    }

    pub fn into_proxy(self) -> Value {
        self.proxy
    }

    /// Stop observing. Wrappers keep forwarding operations but no longer
    /// report changes or wrap values. Irreversible.
    pub fn unsubscribe(&self) {
        self.interceptor.unsubscribe();
    }

    pub fn is_unsubscribed(&self) -> bool {
        self.interceptor.is_unsubscribed()
    }

    /// Number of identity-cache entries.
    pub fn cached(&self) -> usize {
        self.interceptor.cache().len()
    }

    /// Drop identity-cache entries of objects that no longer exist.
    pub fn sweep(&self) -> usize {
        self.interceptor.cache().sweep()
    }
}

/// Observe `root`, returning its wrapper.
///
/// The callback receives only the change. A callback that needs the root
/// wrapper should capture a [`WeakObject`](on_change_value::WeakObject) of
/// it: a strong handle would keep the whole observer alive through its own
/// callback.
pub fn observe<F>(root: Value, callback: F, options: Options) -> Value
where
    F: Fn(&Change) + 'static,
{
    Observer::new(root, callback, options).into_proxy()
}

/// The underlying object of a wrapper. Anything else is returned as is.
pub fn target(value: &Value) -> Value {
    read_hatch(value, target_symbol().into())
}

/// Unsubscribe the observer of a root wrapper and return the underlying
/// root. Anything else is returned as is.
pub fn unsubscribe(value: &Value) -> Value {
    read_hatch(value, unsubscribe_symbol().into())
}

fn read_hatch(value: &Value, key: on_change_value::PropertyKey) -> Value {
    match value.as_object().map(|o| o.get(key)) {
        Some(Ok(Value::Object(target))) => Value::Object(target),
        _ => value.clone(),
    }
}
