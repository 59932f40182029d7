use on_change_value::{same_value_zero, MapKey, Object, Value};
use proptest::prelude::*;

fn number() -> impl Strategy<Value = f64> {
    prop_oneof![
        Just(0.0),
        Just(-0.0),
        Just(f64::NAN),
        Just(f64::INFINITY),
        (-3i32..3).prop_map(f64::from),
        any::<f64>(),
    ]
}

fn numbers(list: &Object) -> Vec<i32> {
    list.array_elements()
        .expect("list")
        .iter()
        .map(|v| v.to_number() as i32)
        .collect()
}

proptest! {
    #[test]
    fn splice_matches_vec_model(
        items in prop::collection::vec(-100i32..100, 0..12),
        start in 0usize..16,
        delete in 0usize..16,
        inserted in prop::collection::vec(-100i32..100, 0..4),
    ) {
        let list = Object::array(items.iter().copied());
        let mut args = vec![Value::from(start), Value::from(delete)];
        args.extend(inserted.iter().copied().map(Value::from));
        let removed = list.call_method("splice", &args).expect("splice");

        let mut model = items.clone();
        let from = start.min(model.len());
        let to = from + delete.min(model.len() - from);
        let expected: Vec<i32> = model.splice(from..to, inserted).collect();

        prop_assert_eq!(numbers(&list), model);
        prop_assert_eq!(numbers(removed.as_object().expect("array")), expected);
    }

    #[test]
    fn map_keys_agree_with_same_value_zero(a in number(), b in number()) {
        let (a, b) = (Value::from(a), Value::from(b));
        prop_assert_eq!(
            MapKey::new(a.clone()) == MapKey::new(b.clone()),
            same_value_zero(&a, &b)
        );

        let map = Object::map_of([(a.clone(), 1)]);
        prop_assert_eq!(map.collection_has(&b), same_value_zero(&a, &b));
        let set = Object::set_of([a.clone(), b.clone()]);
        let size = if same_value_zero(&a, &b) { 1 } else { 2 };
        prop_assert_eq!(set.size(), Some(size));
    }
}
