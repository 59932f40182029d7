mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{child, observed, paths};
use on_change::{target, unsubscribe, Observer, Options};
use on_change_value::{Object, Value};

#[test]
fn unsubscribe_is_terminal() {
    let root = Object::from_entries([("a", Object::plain())]);
    let (proxy, log) = observed(&root, Options::new());
    let a = child(&proxy, "a");

    let underlying = unsubscribe(&Value::from(&proxy));
    assert_eq!(underlying, Value::from(&root));

    proxy.set("x", 1).unwrap();
    a.set("y", 1).unwrap();
    assert!(log.borrow().is_empty());
    assert_eq!(root.get("x").unwrap(), Value::from(1));

    assert_eq!(unsubscribe(&Value::from(&proxy)), Value::from(&root));
    assert!(!proxy.get("a").unwrap().as_object().unwrap().is_proxy());
}

#[test]
fn unsubscribe_hatch_only_works_on_the_root() {
    let root = Object::from_entries([("a", Object::plain())]);
    let (proxy, log) = observed(&root, Options::new());
    let a = proxy.get("a").unwrap();

    assert_eq!(unsubscribe(&a), a);
    child(&proxy, "a").set("y", 1).unwrap();

    assert_eq!(paths(&log), ["a.y"]);
}

#[test]
fn target_and_unsubscribe_pass_plain_values_through() {
    let plain = Value::from(Object::plain());
    assert_eq!(target(&plain), plain);
    assert_eq!(unsubscribe(&plain), plain);
    assert_eq!(target(&Value::from("x")), Value::from("x"));
}

#[test]
fn detached_subtrees_are_ignored_when_configured() {
    let root = Value::from_json(&serde_json::json!({"child": {}}));
    let (proxy, log) = observed(root, Options::new().ignore_detached(true));
    let child_proxy = child(&proxy, "child");

    child_proxy.set("x", 1).unwrap();
    proxy.delete("child").unwrap();
    child_proxy.set("y", 2).unwrap();

    assert_eq!(paths(&log), ["child.x", "child"]);
}

#[test]
fn detached_subtrees_are_reported_by_default() {
    let root = Value::from_json(&serde_json::json!({"child": {}}));
    let (proxy, log) = observed(root, Options::new());
    let child_proxy = child(&proxy, "child");

    proxy.delete("child").unwrap();
    child_proxy.set("y", 2).unwrap();

    assert_eq!(paths(&log), ["child", "child.y"]);
}

#[test]
fn observer_handle_controls_the_observation() {
    let count = Rc::new(RefCell::new(0));
    let counter = count.clone();
    let observer = Observer::new(
        Object::plain().into(),
        move |_| *counter.borrow_mut() += 1,
        Options::new(),
    );
    let proxy = observer.proxy().as_object().unwrap().clone();

    proxy.set("a", 1).unwrap();
    assert!(!observer.is_unsubscribed());
    observer.unsubscribe();
    proxy.set("b", 1).unwrap();

    assert!(observer.is_unsubscribed());
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn sweep_reclaims_entries_of_dropped_objects() {
    let root = Object::from_entries([("a", Object::plain())]);
    let observer = Observer::new(root.clone().into(), |_| {}, Options::new());
    let proxy = observer.proxy().as_object().unwrap().clone();

    let a = proxy.get("a").unwrap();
    assert_eq!(observer.cached(), 2);

    drop(a);
    root.delete("a").unwrap();
    assert_eq!(observer.sweep(), 1);
    assert_eq!(observer.cached(), 1);
}

#[test]
fn rewrapping_keeps_the_first_path() {
    let shared = Object::plain();
    let root = Object::from_entries([("a", &shared), ("b", &shared)]);
    let (proxy, log) = observed(&root, Options::new());

    let via_a = proxy.get("a").unwrap();
    let via_b = proxy.get("b").unwrap();
    assert_eq!(via_a, via_b);
    via_b.as_object().unwrap().set("x", 1).unwrap();

    assert_eq!(paths(&log), ["a.x"]);
}
