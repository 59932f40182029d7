#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use on_change::{observe, Change, Options};
use on_change_value::{Object, Value};

pub type Log = Rc<RefCell<Vec<Change>>>;

/// Route trace output through the test harness.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

/// Observe `root` and record every delivered change.
pub fn observed(root: impl Into<Value>, options: Options) -> (Object, Log) {
    init_tracing();
    let log: Log = Rc::default();
    let sink = log.clone();
    let proxy = observe(
        root.into(),
        move |change: &Change| sink.borrow_mut().push(change.clone()),
        options,
    );
    (proxy.into_object().unwrap(), log)
}

/// The object behind `key`, read through `object`.
pub fn child(object: &Object, key: &str) -> Object {
    object.get(key).unwrap().into_object().unwrap()
}

/// Rendered paths of the recorded changes.
pub fn paths(log: &Log) -> Vec<String> {
    log.borrow().iter().map(|c| c.path.to_string()).collect()
}

pub fn elements(value: &Value) -> Vec<Value> {
    value.as_object().unwrap().array_elements().unwrap()
}

pub fn values<T: Into<Value> + Copy>(items: &[T]) -> Vec<Value> {
    items.iter().map(|item| (*item).into()).collect()
}
