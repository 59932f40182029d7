use std::cell::RefCell;
use std::rc::Rc;

use on_change_value::{
    Object, PropertyDescriptor, PropertyKey, ProxyHandler, Value, ValueResult,
};

/// Records every trap invocation and forwards to the target.
#[derive(Default)]
struct Recorder {
    log: RefCell<Vec<String>>,
}

impl Recorder {
    fn take(&self) -> Vec<String> {
        self.log.borrow_mut().drain(..).collect()
    }
}

impl ProxyHandler for Recorder {
    fn get(&self, target: &Object, key: &PropertyKey, receiver: &Value) -> ValueResult<Value> {
        self.log.borrow_mut().push(format!("get {key}"));
        target.get_with_receiver(key, receiver)
    }

    fn set(
        &self,
        target: &Object,
        key: &PropertyKey,
        value: Value,
        receiver: &Value,
    ) -> ValueResult<bool> {
        self.log.borrow_mut().push(format!("set {key}={value}"));
        target.set_with_receiver(key, value, receiver)
    }

    fn define_property(
        &self,
        target: &Object,
        key: &PropertyKey,
        desc: &PropertyDescriptor,
    ) -> ValueResult<bool> {
        self.log.borrow_mut().push(format!("define {key}"));
        target.define_property(key, desc.clone())
    }

    fn delete_property(&self, target: &Object, key: &PropertyKey) -> ValueResult<bool> {
        self.log.borrow_mut().push(format!("delete {key}"));
        target.delete(key)
    }

    fn apply(&self, target: &Object, this: &Value, args: &[Value]) -> ValueResult<Value> {
        self.log.borrow_mut().push("apply".to_string());
        target.call(this, args)
    }
}

fn proxied(target: &Object) -> (Object, Rc<Recorder>) {
    let recorder = Rc::new(Recorder::default());
    let proxy = Object::proxy(target.clone(), recorder.clone());
    (proxy, recorder)
}

#[test]
fn test_proxy_forwards_reads_and_writes() {
    let target = Object::from_entries([("a", 1)]);
    let (proxy, recorder) = proxied(&target);

    assert_eq!(proxy.get("a").unwrap(), Value::from(1));
    assert!(proxy.set("b", 2).unwrap());
    assert!(proxy.delete("a").unwrap());

    assert_eq!(recorder.take(), vec!["get a", "set b=2", "delete a"]);
    assert_eq!(target.get("b").unwrap(), Value::from(2));
    assert!(!target.has("a").unwrap());
}

#[test]
fn test_proxy_has_its_own_identity() {
    let target = Object::plain();
    let (proxy, _) = proxied(&target);
    assert!(!proxy.ptr_eq(&target));
    assert!(proxy.unwrap_proxy().ptr_eq(&target));
    assert!(proxy.is_proxy());
    assert_eq!(proxy.kind(), target.kind());
}

#[test]
fn test_list_methods_on_proxy_go_through_traps() {
    let target = Object::array([1, 2]);
    let (proxy, recorder) = proxied(&target);

    proxy.call_method("push", &[Value::from(3)]).unwrap();

    assert_eq!(
        recorder.take(),
        vec!["get push", "get length", "set 2=3", "set length=3"]
    );
    assert_eq!(target.size(), Some(3));
}

#[test]
fn test_map_methods_look_through_proxy() {
    let target = Object::map_of::<Value, Value, _>([]);
    let (proxy, recorder) = proxied(&target);

    proxy
        .call_method("set", &[Value::from("k"), Value::from(1)])
        .unwrap();

    assert_eq!(recorder.take(), vec!["get set"]);
    assert_eq!(target.map_get(&Value::from("k")), Some(Value::from(1)));
}

#[test]
fn test_accessor_sees_receiver_through_proxy() {
    let target = Object::plain();
    let setter = Object::function("set", |this, args| {
        let this = this.as_object().cloned().unwrap_or_else(Object::plain);
        this.set("backing", args[0].clone())?;
        Ok(Value::Undefined)
    });
    target
        .define_property("x", PropertyDescriptor::accessor(None, Some(setter.into())))
        .unwrap();
    let (proxy, recorder) = proxied(&target);

    proxy.set("x", 5).unwrap();

    assert_eq!(recorder.take(), vec!["set x=5", "set backing=5"]);
    assert_eq!(target.get("backing").unwrap(), Value::from(5));
}

#[test]
fn test_proxied_function_call_goes_through_apply() {
    let f = Object::function("id", |_, args| Ok(args.first().cloned().unwrap_or_default()));
    let (proxy, recorder) = proxied(&f);

    assert_eq!(
        proxy.call(&Value::Undefined, &[Value::from("x")]).unwrap(),
        Value::from("x")
    );
    assert!(proxy.is_callable());
    assert_eq!(proxy.function_name().as_deref(), Some("id"));
    assert_eq!(recorder.take(), vec!["apply"]);
}

#[test]
fn test_rejected_define_is_reported() {
    let target = Object::plain();
    target
        .define_property("fixed", PropertyDescriptor::default().with_value(1))
        .unwrap();
    let (proxy, recorder) = proxied(&target);

    let ok = proxy
        .define_property("fixed", PropertyDescriptor::data(2))
        .unwrap();

    assert!(!ok);
    assert_eq!(recorder.take(), vec!["define fixed"]);
    assert_eq!(target.get("fixed").unwrap(), Value::from(1));
}
