mod common;

use common::{child, elements, observed, paths, values};
use on_change::{Options, SmartClone};
use on_change_value::{Object, Value, ValueError, MAX_DENSE_LENGTH};

#[test]
fn splice_reports_one_change_with_previous_contents() {
    let root = Object::from_entries([("list", Object::array([1, 2, 3]))]);
    let (proxy, log) = observed(&root, Options::new());
    let list = child(&proxy, "list");

    list.call_method("splice", &values(&[1, 0, 9])).unwrap();

    let log = log.borrow();
    assert_eq!(log.len(), 1);
    let change = &log[0];
    assert_eq!(change.path, "list");
    assert_eq!(elements(&change.previous), values(&[1, 2, 3]));
    assert_eq!(elements(&change.value), values(&[1, 9, 2, 3]));
    let data = change.apply_data.as_ref().expect("call metadata");
    assert_eq!(data.name, "splice");
    assert_eq!(data.args, values(&[1, 0, 9]));
    assert_eq!(elements(&data.result), Vec::<Value>::new());
}

#[test]
fn list_methods_without_effect_are_silent() {
    let root = Object::from_entries([("list", Object::array([3, 1, 2]))]);
    let (proxy, log) = observed(&root, Options::new());
    let list = child(&proxy, "list");

    list.call_method("includes", &[Value::from(1)]).unwrap();
    list.call_method("indexOf", &[Value::from(2)]).unwrap();
    list.call_method("fill", &[Value::from(0), Value::from(3)]).unwrap();
    assert!(log.borrow().is_empty());

    list.call_method("sort", &[]).unwrap();
    assert_eq!(paths(&log), ["list"]);
    assert_eq!(elements(&root.get("list").unwrap()), values(&[1, 2, 3]));
}

#[test]
fn methods_returning_the_receiver_return_its_wrapper() {
    let root = Object::from_entries([("list", Object::array([1, 2]))]);
    let (proxy, _) = observed(&root, Options::new());
    let list = child(&proxy, "list");

    let reversed = list.call_method("reverse", &[]).unwrap();

    assert_eq!(reversed, Value::from(&list));
}

#[test]
fn map_delete_of_missing_key_is_silent_and_set_carries_metadata() {
    let map = Object::map_of::<Value, Value, _>([]);
    let (proxy, log) = observed(&map, Options::new());

    proxy.call_method("delete", &[Value::from("missing")]).unwrap();
    assert!(log.borrow().is_empty());

    proxy
        .call_method("set", &[Value::from("k"), Value::from("v")])
        .unwrap();

    let log = log.borrow();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].path, "");
    assert_eq!(log[0].previous.as_object().unwrap().size(), Some(0));
    let data = log[0].apply_data.as_ref().expect("call metadata");
    assert_eq!(data.name, "set");
    assert_eq!(data.args, values(&["k", "v"]));
    assert_eq!(data.result, Value::from(&proxy));
    assert_eq!(map.map_get(&Value::from("k")), Some(Value::from("v")));
}

#[test]
fn map_size_and_reads_work_through_the_wrapper() {
    let map = Object::map_of([("a", 1), ("b", 2)]);
    let (proxy, log) = observed(&map, Options::new());

    assert_eq!(proxy.get("size").unwrap(), Value::from(2));
    assert_eq!(
        proxy.call_method("get", &[Value::from("b")]).unwrap(),
        Value::from(2)
    );
    assert_eq!(
        proxy.call_method("has", &[Value::from("a")]).unwrap(),
        Value::Bool(true)
    );
    assert!(log.borrow().is_empty());
}

#[test]
fn map_get_wraps_containers_under_the_key() {
    let map = Object::map_of([("k", Object::array([1]))]);
    let (proxy, log) = observed(&map, Options::new().path_as_array(true));

    let list = proxy
        .call_method("get", &[Value::from("k")])
        .unwrap()
        .into_object()
        .unwrap();
    assert!(list.is_proxy());
    list.call_method("push", &[Value::from(2)]).unwrap();

    assert_eq!(log.borrow()[0].path.as_keys(), Some(&[Value::from("k")][..]));
}

#[test]
fn map_iterators_yield_wrapped_values() {
    let map = Object::map_of([("k", Object::from_entries([("x", 1)]))]);
    let (proxy, log) = observed(&map, Options::new());

    let items = proxy
        .call_method("values", &[])
        .unwrap()
        .into_object()
        .unwrap()
        .collect_iter()
        .unwrap();
    let item = items[0].as_object().unwrap();
    assert!(item.is_proxy());
    item.set("x", 2).unwrap();

    let entries = proxy
        .call_method("entries", &[])
        .unwrap()
        .into_object()
        .unwrap()
        .collect_iter()
        .unwrap();
    let entry = entries[0].as_object().unwrap();
    assert_eq!(entry.get(0usize).unwrap(), Value::from("k"));
    assert_eq!(entry.get(1usize).unwrap(), items[0]);

    assert_eq!(paths(&log), ["k.x"]);
}

fn iterate(container: &Object, method: &str) -> Vec<Value> {
    container
        .call_method(method, &[])
        .unwrap()
        .into_object()
        .unwrap()
        .collect_iter()
        .unwrap()
}

#[test]
fn set_iterators_wrap_members_under_the_member_key() {
    let member = Object::from_entries([("x", 1)]);
    let root = Object::from_entries([("s", Object::set_of([&member]))]);
    let (proxy, log) = observed(&root, Options::new().path_as_array(true));
    let set = child(&proxy, "s");

    let items = iterate(&set, "values");
    let item = items[0].as_object().unwrap();
    assert!(item.is_proxy());
    assert_eq!(iterate(&set, "keys"), items);

    let entries = iterate(&set, "entries");
    let entry = entries[0].as_object().unwrap();
    assert_eq!(entry.get(0usize).unwrap(), items[0]);
    assert_eq!(entry.get(1usize).unwrap(), items[0]);

    item.set("x", 2).unwrap();
    assert_eq!(
        log.borrow()[0].path.as_keys(),
        Some(&[Value::from("s"), Value::from(&member), Value::from("x")][..])
    );
}

#[test]
fn ignore_detached_follows_map_entries_and_set_members() {
    let value = Object::plain();
    let member = Object::plain();
    let root = Object::from_entries([
        ("m", Object::map_of([("k", &value)])),
        ("s", Object::set_of([&member])),
    ]);
    let options = Options::new().ignore_detached(true).path_as_array(true);
    let (proxy, log) = observed(&root, options);
    let map = child(&proxy, "m");
    let set = child(&proxy, "s");
    let entry_value = iterate(&map, "values").remove(0).into_object().unwrap();
    let set_member = iterate(&set, "values").remove(0).into_object().unwrap();

    entry_value.set("a", 1).unwrap();
    set_member.set("b", 1).unwrap();
    map.call_method("delete", &[Value::from("k")]).unwrap();
    set.call_method("delete", &[Value::from(&set_member)]).unwrap();
    entry_value.set("c", 1).unwrap();
    set_member.set("d", 1).unwrap();

    let log = log.borrow();
    let keys: Vec<&[Value]> = log.iter().map(|c| c.path.as_keys().unwrap()).collect();
    assert_eq!(
        keys,
        [
            &[Value::from("m"), Value::from("k"), Value::from("a")][..],
            &[Value::from("s"), Value::from(&member), Value::from("b")][..],
            &[Value::from("m")][..],
            &[Value::from("s")][..],
        ]
    );
}

#[test]
fn oversized_list_writes_fail_without_reporting() {
    let root = Object::from_entries([("list", Object::array([1]))]);
    let (proxy, log) = observed(&root, Options::new());
    let list = child(&proxy, "list");

    assert_eq!(list.set(1_000_000_000usize, 1), Err(ValueError::InvalidLength));
    assert_eq!(
        list.set("length", MAX_DENSE_LENGTH + 1),
        Err(ValueError::InvalidLength)
    );

    assert!(log.borrow().is_empty());
    assert_eq!(list.get("length").unwrap(), Value::from(1));
}

#[test]
fn set_add_reports_once_and_duplicate_add_is_silent() {
    let set = Object::set_of([1]);
    let (proxy, log) = observed(Object::from_entries([("tags", &set)]), Options::new());
    let tags = child(&proxy, "tags");

    tags.call_method("add", &[Value::from(1)]).unwrap();
    tags.call_method("add", &[Value::from(2)]).unwrap();
    tags.call_method("clear", &[]).unwrap();
    tags.call_method("clear", &[]).unwrap();

    assert_eq!(paths(&log), ["tags", "tags"]);
    let methods: Vec<_> = log.borrow().iter().filter_map(|c| c.method().map(str::to_string)).collect();
    assert_eq!(methods, ["add", "clear"]);
    assert_eq!(set.size(), Some(0));
}

#[test]
fn date_setters_report_previous_time() {
    let root = Object::from_entries([("when", Object::date(0.0))]);
    let (proxy, log) = observed(&root, Options::new());
    let when = child(&proxy, "when");

    assert_eq!(when.call_method("getTime", &[]).unwrap(), Value::from(0));
    when.call_method("setTime", &[Value::from(5)]).unwrap();
    when.call_method("setTime", &[Value::from(5)]).unwrap();

    let log = log.borrow();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].path, "when");
    assert_eq!(log[0].previous.as_object().unwrap().date_value(), Some(0.0));
    assert_eq!(log[0].method(), Some("setTime"));
}

#[test]
fn nested_method_calls_fold_into_the_outer_call() {
    let root = Value::from_json(&serde_json::json!({"list": [[1]]}));
    let (proxy, log) = observed(root, Options::new());
    let list = child(&proxy, "list");

    let visit = Object::function("visit", |_, args| {
        let inner = args[0].as_object().expect("element");
        inner.call_method("push", &[Value::from(2)])?;
        Ok(Value::Undefined)
    });
    list.call_method("forEach", &[visit.into()]).unwrap();

    let log = log.borrow();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].path, "list");
    assert_eq!(log[0].method(), Some("forEach"));
    let before = log[0].previous.as_object().unwrap().get(0usize).unwrap();
    assert_eq!(elements(&before), values(&[1]));
    let after = log[0].value.as_object().unwrap().get(0usize).unwrap();
    assert_eq!(elements(&after), values(&[1, 2]));
}

#[test]
fn writes_to_unrelated_paths_fold_into_an_open_call() {
    let root = Value::from_json(&serde_json::json!({"a": [{"x": 1}], "b": {}}));
    let raw = root.as_object().unwrap().clone();
    let (proxy, log) = observed(root, Options::new());
    let list = child(&proxy, "a");
    let b = child(&proxy, "b");

    let visit = Object::function("visit", move |_, _| {
        b.set("y", 1)?;
        Ok(Value::Undefined)
    });
    list.call_method("forEach", &[visit.into()]).unwrap();

    assert_eq!(paths(&log), ["a"]);
    assert_eq!(log.borrow()[0].method(), Some("forEach"));
    let b = raw.get("b").unwrap();
    assert_eq!(b.as_object().unwrap().get("y").unwrap(), Value::from(1));
}

#[test]
fn handled_types_are_the_builtin_containers() {
    assert!(SmartClone::is_handled_type(&Object::array([1]).into()));
    assert!(SmartClone::is_handled_type(&Object::date(0.0).into()));
    assert!(!SmartClone::is_handled_type(&Object::plain().into()));
    assert!(!SmartClone::is_handled_type(&Value::from(1)));
    assert!(SmartClone::is_handled_method(&Object::array([1]), "copyWithin"));
    assert!(!SmartClone::is_handled_method(&Object::array([1]), "map"));
}
