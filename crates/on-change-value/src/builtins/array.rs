//! List methods.
//!
//! Every method works on its receiver through `get`, `set` and `delete`
//! only, so calling one with a proxy as `this` goes through the proxy's
//! traps element by element.

use std::cmp::Ordering;

use super::{arg, callable, this_object, IteratorState, MethodTable, Yield};
use crate::error::{ValueError, ValueResult};
use crate::key::PropertyKey;
use crate::object::{Kind, Object};
use crate::value::{same_value_zero, strict_equals, Value};

pub(crate) const METHODS: MethodTable = &[
    ("push", push),
    ("pop", pop),
    ("shift", shift),
    ("unshift", unshift),
    ("splice", splice),
    ("reverse", reverse),
    ("sort", sort),
    ("fill", fill),
    ("copyWithin", copy_within),
    ("concat", concat),
    ("includes", includes),
    ("indexOf", index_of),
    ("lastIndexOf", last_index_of),
    ("join", join),
    ("keys", keys),
    ("values", values),
    ("entries", entries),
    ("slice", slice),
    ("at", at),
    ("forEach", for_each),
    ("map", map),
    ("filter", filter),
    ("find", find),
    ("findIndex", find_index),
    ("some", some),
    ("every", every),
];

pub(crate) fn length(o: &Object) -> ValueResult<usize> {
    let n = o.get("length")?.to_integer();
    Ok(if n <= 0.0 { 0 } else { n as usize })
}

fn put(o: &Object, key: impl Into<PropertyKey>, value: Value) -> ValueResult<()> {
    let key = key.into();
    if o.set(&key, value)? {
        Ok(())
    } else {
        Err(ValueError::ReadOnly(key))
    }
}

fn remove(o: &Object, key: impl Into<PropertyKey>) -> ValueResult<()> {
    let key = key.into();
    if o.delete(&key)? {
        Ok(())
    } else {
        Err(ValueError::ReadOnly(key))
    }
}

fn set_length(o: &Object, len: usize) -> ValueResult<()> {
    put(o, "length", Value::from(len))
}

/// Resolve a relative index argument against `len`; `default` is used for
/// `undefined`.
fn relative(value: &Value, len: usize, default: usize) -> usize {
    if value.is_undefined() {
        return default;
    }
    let n = value.to_integer();
    if n < 0.0 {
        let back = len as f64 + n;
        if back < 0.0 {
            0
        } else {
            back as usize
        }
    } else if n > len as f64 {
        len
    } else {
        n as usize
    }
}

fn elements(o: &Object) -> ValueResult<Vec<Value>> {
    let len = length(o)?;
    (0..len).map(|i| o.get(i)).collect()
}

fn push(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let o = this_object(this, "push")?;
    let len = length(o)?;
    for (i, item) in args.iter().enumerate() {
        put(o, len + i, item.clone())?;
    }
    let len = len + args.len();
    set_length(o, len)?;
    Ok(Value::from(len))
}

fn pop(this: &Value, _args: &[Value]) -> ValueResult<Value> {
    let o = this_object(this, "pop")?;
    let len = length(o)?;
    if len == 0 {
        set_length(o, 0)?;
        return Ok(Value::Undefined);
    }
    let last = o.get(len - 1)?;
    remove(o, len - 1)?;
    set_length(o, len - 1)?;
    Ok(last)
}

fn shift(this: &Value, _args: &[Value]) -> ValueResult<Value> {
    let o = this_object(this, "shift")?;
    let len = length(o)?;
    if len == 0 {
        set_length(o, 0)?;
        return Ok(Value::Undefined);
    }
    let first = o.get(0usize)?;
    for k in 1..len {
        let value = o.get(k)?;
        put(o, k - 1, value)?;
    }
    remove(o, len - 1)?;
    set_length(o, len - 1)?;
    Ok(first)
}

fn unshift(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let o = this_object(this, "unshift")?;
    let len = length(o)?;
    let count = args.len();
    if count > 0 {
        for k in (0..len).rev() {
            let value = o.get(k)?;
            put(o, k + count, value)?;
        }
        for (j, item) in args.iter().enumerate() {
            put(o, j, item.clone())?;
        }
    }
    set_length(o, len + count)?;
    Ok(Value::from(len + count))
}

fn splice(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let o = this_object(this, "splice")?;
    let len = length(o)?;
    let start = relative(&arg(args, 0), len, 0);
    let delete_count = match args.len() {
        0 => 0,
        1 => len - start,
        _ => {
            let n = args[1].to_integer().max(0.0);
            (n as usize).min(len - start)
        }
    };
    let items = args.get(2..).unwrap_or(&[]);
    let removed = (start..start + delete_count)
        .map(|k| o.get(k))
        .collect::<ValueResult<Vec<_>>>()?;
    let item_count = items.len();
    if item_count < delete_count {
        for k in start..len - delete_count {
            let value = o.get(k + delete_count)?;
            put(o, k + item_count, value)?;
        }
        for k in (len - delete_count + item_count..len).rev() {
            remove(o, k)?;
        }
    } else if item_count > delete_count {
        for k in (start..len - delete_count).rev() {
            let value = o.get(k + delete_count)?;
            put(o, k + item_count, value)?;
        }
    }
    for (i, item) in items.iter().enumerate() {
        put(o, start + i, item.clone())?;
    }
    set_length(o, len - delete_count + item_count)?;
    Ok(Value::Object(Object::array(removed)))
}

fn reverse(this: &Value, _args: &[Value]) -> ValueResult<Value> {
    let o = this_object(this, "reverse")?;
    let len = length(o)?;
    let (mut lower, mut upper) = (0, len);
    while lower + 1 < upper {
        upper -= 1;
        let low = o.get(lower)?;
        let high = o.get(upper)?;
        put(o, lower, high)?;
        put(o, upper, low)?;
        lower += 1;
    }
    Ok(this.clone())
}

/// Insertion sort with a fallible comparator.
fn sort_by<T, F>(items: &mut [T], mut compare: F) -> ValueResult<()>
where
    F: FnMut(&T, &T) -> ValueResult<Ordering>,
{
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && compare(&items[j - 1], &items[j])? == Ordering::Greater {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
    Ok(())
}

fn sort(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let o = this_object(this, "sort")?;
    let comparator = match arg(args, 0) {
        Value::Undefined => None,
        other => Some(callable(&other, "sort")?),
    };
    let items = elements(o)?;
    let (mut defined, undefined): (Vec<_>, Vec<_>) =
        items.into_iter().partition(|v| !v.is_undefined());
    sort_by(&mut defined, |a, b| match &comparator {
        Some(f) => {
            let n = f.call(&Value::Undefined, &[a.clone(), b.clone()])?.to_number();
            Ok(if n > 0.0 {
                Ordering::Greater
            } else if n < 0.0 {
                Ordering::Less
            } else {
                Ordering::Equal
            })
        }
        None => Ok(a.to_string().cmp(&b.to_string())),
    })?;
    for (i, value) in defined.into_iter().chain(undefined).enumerate() {
        put(o, i, value)?;
    }
    Ok(this.clone())
}

fn fill(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let o = this_object(this, "fill")?;
    let len = length(o)?;
    let value = arg(args, 0);
    let start = relative(&arg(args, 1), len, 0);
    let end = relative(&arg(args, 2), len, len);
    for k in start..end {
        put(o, k, value.clone())?;
    }
    Ok(this.clone())
}

fn copy_within(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let o = this_object(this, "copyWithin")?;
    let len = length(o)?;
    let to = relative(&arg(args, 0), len, 0);
    let from = relative(&arg(args, 1), len, 0);
    let end = relative(&arg(args, 2), len, len);
    let count = end.saturating_sub(from).min(len - to);
    if from < to && to < from + count {
        for k in (0..count).rev() {
            let value = o.get(from + k)?;
            put(o, to + k, value)?;
        }
    } else {
        for k in 0..count {
            let value = o.get(from + k)?;
            put(o, to + k, value)?;
        }
    }
    Ok(this.clone())
}

fn concat(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let o = this_object(this, "concat")?;
    let mut out = elements(o)?;
    for item in args {
        match item {
            Value::Object(list) if list.kind() == Kind::Array => out.extend(elements(list)?),
            other => out.push(other.clone()),
        }
    }
    Ok(Value::Object(Object::array(out)))
}

fn includes(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let o = this_object(this, "includes")?;
    let len = length(o)?;
    let needle = arg(args, 0);
    for k in relative(&arg(args, 1), len, 0)..len {
        if same_value_zero(&o.get(k)?, &needle) {
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(false))
}

fn index_of(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let o = this_object(this, "indexOf")?;
    let len = length(o)?;
    let needle = arg(args, 0);
    for k in relative(&arg(args, 1), len, 0)..len {
        if strict_equals(&o.get(k)?, &needle) {
            return Ok(Value::from(k));
        }
    }
    Ok(Value::from(-1))
}

fn last_index_of(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let o = this_object(this, "lastIndexOf")?;
    let len = length(o)?;
    if len == 0 {
        return Ok(Value::from(-1));
    }
    let needle = arg(args, 0);
    let from = match args.get(1) {
        None => len - 1,
        Some(v) => {
            let n = v.to_integer();
            let k = if n < 0.0 { len as f64 + n } else { n.min((len - 1) as f64) };
            if k < 0.0 {
                return Ok(Value::from(-1));
            }
            k as usize
        }
    };
    for k in (0..=from).rev() {
        if strict_equals(&o.get(k)?, &needle) {
            return Ok(Value::from(k));
        }
    }
    Ok(Value::from(-1))
}

fn join(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let o = this_object(this, "join")?;
    let separator = match arg(args, 0) {
        Value::Undefined => ",".to_string(),
        other => other.to_string(),
    };
    let parts = elements(o)?
        .into_iter()
        .map(|v| match v {
            Value::Undefined | Value::Null => Ok(String::new()),
            Value::Object(list) if list.kind() == Kind::Array => {
                Ok(list.call_method("join", &[])?.to_string())
            }
            other => Ok(other.to_string()),
        })
        .collect::<ValueResult<Vec<_>>>()?;
    Ok(Value::from(parts.join(&separator)))
}

fn iterate(this: &Value, method: &'static str, yields: Yield) -> ValueResult<Value> {
    let o = this_object(this, method)?;
    Ok(Value::Object(Object::with_iterator(IteratorState::Indexed {
        target: o.clone(),
        next: 0,
        yields,
    })))
}

fn keys(this: &Value, _args: &[Value]) -> ValueResult<Value> {
    iterate(this, "keys", Yield::Keys)
}

fn values(this: &Value, _args: &[Value]) -> ValueResult<Value> {
    iterate(this, "values", Yield::Values)
}

fn entries(this: &Value, _args: &[Value]) -> ValueResult<Value> {
    iterate(this, "entries", Yield::Entries)
}

fn slice(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let o = this_object(this, "slice")?;
    let len = length(o)?;
    let start = relative(&arg(args, 0), len, 0);
    let end = relative(&arg(args, 1), len, len);
    let items = (start..end.max(start))
        .map(|k| o.get(k))
        .collect::<ValueResult<Vec<_>>>()?;
    Ok(Value::Object(Object::array(items)))
}

fn at(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let o = this_object(this, "at")?;
    let len = length(o)? as f64;
    let n = arg(args, 0).to_integer();
    let k = if n < 0.0 { len + n } else { n };
    if k < 0.0 || k >= len {
        return Ok(Value::Undefined);
    }
    o.get(k as usize)
}

/// Call `f(element, index, list)` for each element until it returns
/// `Some`.
fn visit<R>(
    this: &Value,
    args: &[Value],
    method: &'static str,
    mut f: impl FnMut(usize, Value, Value) -> Option<R>,
) -> ValueResult<Option<R>> {
    let o = this_object(this, method)?;
    let callback = callable(&arg(args, 0), method)?;
    let this_arg = arg(args, 1);
    let len = length(o)?;
    for k in 0..len {
        let element = o.get(k)?;
        let result = callback.call(&this_arg, &[element.clone(), Value::from(k), this.clone()])?;
        if let Some(r) = f(k, element, result) {
            return Ok(Some(r));
        }
    }
    Ok(None)
}

fn for_each(this: &Value, args: &[Value]) -> ValueResult<Value> {
    visit::<()>(this, args, "forEach", |_, _, _| None)?;
    Ok(Value::Undefined)
}

fn map(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let mut out = Vec::new();
    visit::<()>(this, args, "map", |_, _, result| {
        out.push(result);
        None
    })?;
    Ok(Value::Object(Object::array(out)))
}

fn filter(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let mut out = Vec::new();
    visit::<()>(this, args, "filter", |_, element, result| {
        if result.is_truthy() {
            out.push(element);
        }
        None
    })?;
    Ok(Value::Object(Object::array(out)))
}

fn find(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let found = visit(this, args, "find", |_, element, result| {
        result.is_truthy().then_some(element)
    })?;
    Ok(found.unwrap_or_default())
}

fn find_index(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let found = visit(this, args, "findIndex", |k, _, result| {
        result.is_truthy().then_some(k)
    })?;
    Ok(found.map_or(Value::from(-1), Value::from))
}

fn some(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let found = visit(this, args, "some", |_, _, result| result.is_truthy().then_some(()))?;
    Ok(Value::Bool(found.is_some()))
}

fn every(this: &Value, args: &[Value]) -> ValueResult<Value> {
    let failed = visit(this, args, "every", |_, _, result| {
        (!result.is_truthy()).then_some(())
    })?;
    Ok(Value::Bool(failed.is_none()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[i32]) -> Object {
        Object::array(items.iter().copied())
    }

    fn numbers(o: &Object) -> Vec<f64> {
        o.array_elements()
            .unwrap()
            .iter()
            .map(Value::to_number)
            .collect()
    }

    #[test]
    fn test_splice_insert() {
        let a = list(&[1, 2, 3]);
        let removed = a
            .call_method("splice", &[Value::from(1), Value::from(0), Value::from(9)])
            .unwrap();
        assert_eq!(numbers(&a), vec![1.0, 9.0, 2.0, 3.0]);
        assert_eq!(removed.as_object().unwrap().size(), Some(0));
    }

    #[test]
    fn test_splice_remove_and_replace() {
        let a = list(&[1, 2, 3, 4]);
        let removed = a
            .call_method("splice", &[Value::from(-3), Value::from(2), Value::from(7)])
            .unwrap();
        assert_eq!(numbers(&a), vec![1.0, 7.0, 4.0]);
        assert_eq!(numbers(removed.as_object().unwrap()), vec![2.0, 3.0]);
    }

    #[test]
    fn test_push_pop_shift_unshift() {
        let a = list(&[2]);
        a.call_method("push", &[Value::from(3)]).unwrap();
        a.call_method("unshift", &[Value::from(1)]).unwrap();
        assert_eq!(numbers(&a), vec![1.0, 2.0, 3.0]);
        assert_eq!(a.call_method("shift", &[]).unwrap(), Value::from(1));
        assert_eq!(a.call_method("pop", &[]).unwrap(), Value::from(3));
        assert_eq!(numbers(&a), vec![2.0]);
        let empty = list(&[]);
        assert_eq!(empty.call_method("pop", &[]).unwrap(), Value::Undefined);
    }

    #[test]
    fn test_sort_default_is_lexicographic() {
        let a = list(&[10, 9, 1]);
        a.call_method("sort", &[]).unwrap();
        assert_eq!(numbers(&a), vec![1.0, 10.0, 9.0]);
    }

    #[test]
    fn test_sort_with_comparator() {
        let a = list(&[3, 1, 2]);
        let cmp = Object::function("cmp", |_, args| {
            Ok(Value::from(args[0].to_number() - args[1].to_number()))
        });
        a.call_method("sort", &[cmp.into()]).unwrap();
        assert_eq!(numbers(&a), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_sort_propagates_comparator_error() {
        let a = list(&[3, 1]);
        let cmp = Object::function("cmp", |_, _| Err(ValueError::Thrown("boom".into())));
        let err = a.call_method("sort", &[cmp.into()]).unwrap_err();
        assert_eq!(err, ValueError::Thrown("boom".into()));
    }

    #[test]
    fn test_fill_and_copy_within() {
        let a = list(&[1, 2, 3, 4, 5]);
        a.call_method("copyWithin", &[Value::from(0), Value::from(3)]).unwrap();
        assert_eq!(numbers(&a), vec![4.0, 5.0, 3.0, 4.0, 5.0]);
        a.call_method("fill", &[Value::from(0), Value::from(1), Value::from(3)])
            .unwrap();
        assert_eq!(numbers(&a), vec![4.0, 0.0, 0.0, 4.0, 5.0]);
    }

    #[test]
    fn test_readers() {
        let a = list(&[1, 2, 1]);
        assert_eq!(a.call_method("indexOf", &[Value::from(1)]).unwrap(), Value::from(0));
        assert_eq!(
            a.call_method("lastIndexOf", &[Value::from(1)]).unwrap(),
            Value::from(2)
        );
        assert_eq!(
            a.call_method("includes", &[Value::from(2)]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(a.call_method("join", &[Value::from("-")]).unwrap(), Value::from("1-2-1"));
        let joined = a.call_method("concat", &[list(&[4]).into(), Value::from(5)]).unwrap();
        assert_eq!(numbers(joined.as_object().unwrap()), vec![1.0, 2.0, 1.0, 4.0, 5.0]);
    }

    #[test]
    fn test_keys_iterator_is_lazy() {
        let a = list(&[1]);
        let keys = a.call_method("keys", &[]).unwrap().into_object().unwrap();
        a.call_method("push", &[Value::from(2)]).unwrap();
        assert_eq!(keys.collect_iter().unwrap(), vec![Value::from(0), Value::from(1)]);
    }

    #[test]
    fn test_find_and_filter() {
        let a = list(&[1, 2, 3]);
        let even = Object::function("even", |_, args| {
            Ok(Value::Bool(args[0].to_number() % 2.0 == 0.0))
        });
        assert_eq!(a.call_method("find", &[even.clone().into()]).unwrap(), Value::from(2));
        let odd = a.call_method("filter", &[even.into()]).unwrap();
        assert_eq!(numbers(odd.as_object().unwrap()), vec![2.0]);
    }
}
