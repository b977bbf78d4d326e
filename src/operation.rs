//! The stage interface and the callback types operations are configured with.
//!
//! An [`Operation`] is a value: its parameters are bound when it is built and
//! [`Operation::apply`] only wires a new lazy [`Sequence`] on top of its
//! input. Nothing is pulled until the returned sequence is. Operations are
//! shared as `Arc<dyn Operation>` so pipelines can be cloned, stored and
//! reused freely.
//!
//! User callbacks are type-erased into the `Arc` aliases below. Each has an
//! infallible constructor (`callback`, `predicate`, ...) and a fallible one
//! (`try_callback`, `try_predicate`, ...) whose `anyhow::Error` is surfaced
//! unchanged as [`Error::Callback`].

use crate::error::{Error, Result};
use crate::sequence::Sequence;
use crate::value::Value;
use std::cmp::Ordering;
use std::sync::Arc;

/// One pipeline stage.
pub trait Operation: Send + Sync {
    /// Short name used in logs and [`Pipeline::explain`](crate::Pipeline::explain).
    fn name(&self) -> &'static str;

    /// Wire the stage on top of `input`. Must not pull from `input`.
    fn apply(&self, input: Sequence) -> Sequence;

    /// Whether the stage drains its whole input before emitting.
    fn buffering(&self) -> bool {
        false
    }
}

/// `(value, key) -> value`
pub type Callback = Arc<dyn Fn(&Value, &Value) -> anyhow::Result<Value> + Send + Sync>;

/// `(value, key) -> bool`
pub type Predicate = Arc<dyn Fn(&Value, &Value) -> anyhow::Result<bool> + Send + Sync>;

/// `(accumulator, value, key) -> accumulator`
pub type Reducer = Arc<dyn Fn(&Value, &Value, &Value) -> anyhow::Result<Value> + Send + Sync>;

/// Ordering between two values (or two keys).
pub type Comparator = Arc<dyn Fn(&Value, &Value) -> Ordering + Send + Sync>;

/// Equality between two values.
pub type Matcher = Arc<dyn Fn(&Value, &Value) -> bool + Send + Sync>;

pub fn callback<F>(f: F) -> Callback
where
    F: Fn(&Value, &Value) -> Value + Send + Sync + 'static,
{
    Arc::new(move |v: &Value, k: &Value| -> anyhow::Result<Value> { Ok(f(v, k)) })
}

pub fn try_callback<F>(f: F) -> Callback
where
    F: Fn(&Value, &Value) -> anyhow::Result<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

pub fn predicate<F>(f: F) -> Predicate
where
    F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
{
    Arc::new(move |v: &Value, k: &Value| -> anyhow::Result<bool> { Ok(f(v, k)) })
}

pub fn try_predicate<F>(f: F) -> Predicate
where
    F: Fn(&Value, &Value) -> anyhow::Result<bool> + Send + Sync + 'static,
{
    Arc::new(f)
}

pub fn reducer<F>(f: F) -> Reducer
where
    F: Fn(&Value, &Value, &Value) -> Value + Send + Sync + 'static,
{
    Arc::new(move |acc: &Value, v: &Value, k: &Value| -> anyhow::Result<Value> {
        Ok(f(acc, v, k))
    })
}

pub fn try_reducer<F>(f: F) -> Reducer
where
    F: Fn(&Value, &Value, &Value) -> anyhow::Result<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

pub fn comparator<F>(f: F) -> Comparator
where
    F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
{
    Arc::new(f)
}

pub fn matcher<F>(f: F) -> Matcher
where
    F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Loose ordering, the default comparator.
pub fn natural_order() -> Comparator {
    Arc::new(|a: &Value, b: &Value| a.compare(b))
}

/// Strict equality, the default matcher.
pub fn strict_equality() -> Matcher {
    Arc::new(|a: &Value, b: &Value| a == b)
}

/// Truthiness of the value, the default predicate.
pub fn truthy() -> Predicate {
    Arc::new(|v: &Value, _: &Value| -> anyhow::Result<bool> { Ok(v.is_truthy()) })
}

pub(crate) fn call(f: &Callback, value: &Value, key: &Value) -> Result<Value> {
    f(value, key).map_err(Error::Callback)
}

pub(crate) fn check(p: &Predicate, value: &Value, key: &Value) -> Result<bool> {
    p(value, key).map_err(Error::Callback)
}

pub(crate) fn fold(r: &Reducer, acc: &Value, value: &Value, key: &Value) -> Result<Value> {
    r(acc, value, key).map_err(Error::Callback)
}

/// OR across `predicates`, short-circuiting on the first `true`.
/// An empty set falls back to the value's truthiness.
pub(crate) fn any_of(predicates: &[Predicate], value: &Value, key: &Value) -> Result<bool> {
    if predicates.is_empty() {
        return Ok(value.is_truthy());
    }
    for p in predicates {
        if check(p, value, key)? {
            return Ok(true);
        }
    }
    Ok(false)
}
