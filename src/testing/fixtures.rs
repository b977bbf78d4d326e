//! Short constructors for test data.

use crate::sequence::Entry;
use crate::value::Value;

/// One entry.
pub fn kv(key: impl Into<Value>, value: impl Into<Value>) -> Entry {
    (key.into(), value.into())
}

#[must_use]
pub fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().copied().map(Value::from).collect()
}

#[must_use]
pub fn strs(values: &[&str]) -> Vec<Value> {
    values.iter().copied().map(Value::from).collect()
}

/// A small list of records, useful for `column`, `pluck` and `group_by`.
#[must_use]
pub fn sample_people() -> Vec<Value> {
    [("ada", "eng", 36), ("grace", "eng", 45), ("linus", "ops", 28)]
        .into_iter()
        .map(|(name, team, age)| Value::map([("name", Value::from(name)), ("team", team.into()), ("age", age.into())]))
        .collect()
}
