//! Assertion functions for collection outputs.

use crate::collection::Collection;
use crate::error::Result;
use crate::sequence::Entry;
use crate::value::Value;

/// Assert that `actual` yields exactly `expected`, keys included, in order.
///
/// # Panics
///
/// Panics if the entries differ in length or content.
pub fn assert_entries_equal(actual: &Collection, expected: &[Entry]) -> Result<()> {
    let entries = actual.entries()?;
    assert_eq!(
        entries.len(),
        expected.len(),
        "Entry count mismatch:\n  Expected: {expected:?}\n  Actual: {entries:?}"
    );
    for (i, (a, e)) in entries.iter().zip(expected).enumerate() {
        assert_eq!(
            a, e,
            "Entry mismatch at position {i}:\n  Expected: {e:?}\n  Actual: {a:?}\n  Full actual: {entries:?}"
        );
    }
    Ok(())
}

/// Assert that `actual` yields `expected` values in order, ignoring keys.
///
/// # Panics
///
/// Panics if the values differ in length or content.
pub fn assert_values_equal<T>(actual: &Collection, expected: &[T]) -> Result<()>
where
    T: Clone + Into<Value>,
{
    let values = actual.all_values()?;
    let expected: Vec<Value> = expected.iter().cloned().map(Into::into).collect();
    assert_eq!(
        values, expected,
        "Value mismatch:\n  Expected: {expected:?}\n  Actual: {values:?}"
    );
    Ok(())
}

/// Assert that `actual` yields the same values as `expected`, in any order.
///
/// # Panics
///
/// Panics if some value is missing or extra.
pub fn assert_values_unordered_equal<T>(actual: &Collection, expected: &[T]) -> Result<()>
where
    T: Clone + Into<Value>,
{
    let mut values = actual.all_values()?;
    let mut expected: Vec<Value> = expected.iter().cloned().map(Into::into).collect();
    values.sort_by(Value::compare);
    expected.sort_by(Value::compare);
    assert_eq!(
        values, expected,
        "Value mismatch (unordered):\n  Expected: {expected:?}\n  Actual: {values:?}"
    );
    Ok(())
}
