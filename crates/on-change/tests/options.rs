mod common;

use common::{child, observed, paths};
use on_change::{Details, Options};
use on_change_value::{Object, Symbol, Value};

#[test]
fn path_as_array_reports_key_lists() {
    let root = Value::from_json(&serde_json::json!({"a": {"b": {}}, "list": [0]}));
    let (proxy, log) = observed(root, Options::new().path_as_array(true));

    child(&child(&proxy, "a"), "b").set("c", 1).unwrap();
    child(&proxy, "list").set(0usize, 5).unwrap();

    let log = log.borrow();
    assert_eq!(
        log[0].path.as_keys(),
        Some(&[Value::from("a"), Value::from("b"), Value::from("c")][..])
    );
    assert_eq!(
        log[1].path.as_keys(),
        Some(&[Value::from("list"), Value::from(0)][..])
    );
}

#[test]
fn dotted_paths_render_indices_like_keys() {
    let root = Value::from_json(&serde_json::json!({"list": [{"x": 0}]}));
    let (proxy, log) = observed(root, Options::new());

    let item = child(&proxy, "list").get(0usize).unwrap();
    item.as_object().unwrap().set("x", 1).unwrap();

    assert_eq!(paths(&log), ["list.0.x"]);
}

#[test]
fn shallow_mode_only_observes_the_root() {
    let root = Object::array([Object::from_entries([("x", 1)])]);
    let (proxy, log) = observed(&root, Options::new().shallow(true));

    let item = proxy.get(0usize).unwrap();
    assert!(!item.as_object().unwrap().is_proxy());
    item.as_object().unwrap().set("x", 2).unwrap();
    assert!(log.borrow().is_empty());

    proxy.call_method("push", &[Value::from(5)]).unwrap();
    assert_eq!(paths(&log), [""]);
    assert_eq!(log.borrow()[0].method(), Some("push"));
}

#[test]
fn ignored_keys_are_neither_wrapped_nor_reported() {
    let options = Options::new()
        .ignore_underscores(true)
        .ignore_symbols(true)
        .ignore_keys(["secret"]);
    let root = Object::from_entries([("_private", Object::plain())]);
    let (proxy, log) = observed(&root, options);

    proxy.set("_x", 1).unwrap();
    proxy.set(Symbol::new("s"), 1).unwrap();
    proxy.set("secret", 1).unwrap();
    assert!(!child(&proxy, "_private").is_proxy());
    assert!(log.borrow().is_empty());

    proxy.set("visible", 1).unwrap();
    assert_eq!(paths(&log), ["visible"]);
    assert_eq!(root.get("secret").unwrap(), Value::from(1));
}

#[test]
fn symbol_keys_are_observed_by_default() {
    let (proxy, log) = observed(Object::plain(), Options::new().path_as_array(true));
    let symbol = Symbol::new("tag");

    proxy.set(symbol.clone(), 1).unwrap();

    assert_eq!(log.borrow()[0].path.as_keys(), Some(&[Value::from(symbol)][..]));
}

#[test]
fn details_report_individual_list_writes() {
    let root = Object::from_entries([("list", Object::array([1, 2]))]);
    let (proxy, log) = observed(&root, Options::new().details(Details::All));
    let list = child(&proxy, "list");

    list.call_method("push", &[Value::from(3)]).unwrap();

    let log = log.borrow();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].path, "list.2");
    assert_eq!(log[0].value, Value::from(3));
    assert!(log[0].apply_data.is_none());
}

#[test]
fn details_can_name_individual_methods() {
    let root = Object::from_entries([("list", Object::array([1, 2]))]);
    let options = Options::new().details(Details::Methods(vec!["push".to_string()]));
    let (proxy, log) = observed(&root, options);
    let list = child(&proxy, "list");

    list.call_method("push", &[Value::from(3)]).unwrap();
    list.call_method("pop", &[]).unwrap();

    let log = log.borrow();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].path, "list.2");
    assert_eq!(log[1].path, "list");
    assert_eq!(log[1].method(), Some("pop"));
}

#[test]
fn details_do_not_apply_to_maps() {
    let root = Object::from_entries([("map", Object::map_of::<Value, Value, _>([]))]);
    let (proxy, log) = observed(&root, Options::new().details(Details::All));

    child(&proxy, "map")
        .call_method("set", &[Value::from("k"), Value::from(1)])
        .unwrap();

    assert_eq!(paths(&log), ["map"]);
    assert_eq!(log.borrow()[0].method(), Some("set"));
}

#[test]
fn options_load_from_json() {
    let options = Options::from_json(r#"{"ignoreDetached": true, "details": false}"#)
        .expect("valid options");
    assert!(options.ignore_detached);
    assert_eq!(options.details, Details::Off);
}
