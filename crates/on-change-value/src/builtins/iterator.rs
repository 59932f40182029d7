use std::collections::VecDeque;
use std::rc::Rc;

use super::array::length;
use super::{this_object, MethodTable};
use crate::error::ValueResult;
use crate::object::{Object, Slots};
use crate::value::Value;

pub(crate) const METHODS: MethodTable = &[("next", next)];

/// What an index-based iterator yields.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Yield {
    Keys,
    Values,
    Entries,
}

pub(crate) enum IteratorState {
    /// A snapshot of items.
    Items(VecDeque<Value>),
    /// Positions of a list, read lazily through the (possibly proxied)
    /// list so later changes are visible.
    Indexed {
        target: Object,
        next: usize,
        yields: Yield,
    },
    /// Items of another iterator, transformed.
    Mapped {
        inner: Object,
        map: Rc<dyn Fn(Value) -> ValueResult<Value>>,
    },
    Done,
}

enum Step {
    Yield(Value),
    Done,
    Indexed(Object, usize, Yield),
    Mapped(Object, Rc<dyn Fn(Value) -> ValueResult<Value>>),
}

fn result(value: Value, done: bool) -> Value {
    Value::Object(Object::from_entries([
        ("value", value),
        ("done", Value::Bool(done)),
    ]))
}

fn finish(iterator: &Object) {
    iterator.with_slots(|slots| *slots = Slots::Iterator(IteratorState::Done));
}

fn next(this: &Value, _args: &[Value]) -> ValueResult<Value> {
    let iterator = this_object(this, "next")?.unwrap_proxy();
    let step = iterator
        .with_slots(|slots| match slots {
            Slots::Iterator(IteratorState::Items(items)) => match items.pop_front() {
                Some(item) => Step::Yield(item),
                None => Step::Done,
            },
            Slots::Iterator(IteratorState::Indexed {
                target,
                next,
                yields,
            }) => Step::Indexed(target.clone(), *next, *yields),
            Slots::Iterator(IteratorState::Mapped { inner, map }) => {
                Step::Mapped(inner.clone(), map.clone())
            }
            _ => Step::Done,
        })
        .unwrap_or(Step::Done);

    match step {
        Step::Yield(item) => Ok(result(item, false)),
        Step::Done => {
            finish(&iterator);
            Ok(result(Value::Undefined, true))
        }
        Step::Indexed(target, index, yields) => {
            if index >= length(&target)? {
                finish(&iterator);
                return Ok(result(Value::Undefined, true));
            }
            iterator.with_slots(|slots| {
                if let Slots::Iterator(IteratorState::Indexed { next, .. }) = slots {
                    *next = index + 1;
                }
            });
            let item = match yields {
                Yield::Keys => Value::from(index),
                Yield::Values => target.get(index)?,
                Yield::Entries => Value::Object(Object::array([
                    Value::from(index),
                    target.get(index)?,
                ])),
            };
            Ok(result(item, false))
        }
        Step::Mapped(inner, map) => match inner.iter_next()? {
            Some(item) => Ok(result(map(item)?, false)),
            None => {
                finish(&iterator);
                Ok(result(Value::Undefined, true))
            }
        },
    }
}
