//! Terminal operations on [`Collection`].
//!
//! These consume the collection (fully or up to a short-circuit point) and
//! return a plain value. Each call opens a fresh cursor, so they can be run
//! any number of times on the same collection. The first failing entry
//! stops the traversal and its error is returned.

use crate::collection::Collection;
use crate::error::Result;
use crate::operation::{Callback, Matcher, Predicate, Reducer, any_of, call, fold, strict_equality};
use crate::sequence::Entry;
use crate::value::Value;
use std::collections::HashMap;

impl Collection {
    /// Materialize into a keyed container. Duplicate keys collapse
    /// last-write-wins, at the position the key first appeared.
    pub fn all(&self) -> Result<Value> {
        let mut entries: Vec<Entry> = Vec::new();
        let mut slots: HashMap<Value, usize> = HashMap::new();
        for item in self.iter() {
            let (k, v) = item?;
            match slots.get(&k) {
                Some(&i) => entries[i].1 = v,
                None => {
                    slots.insert(k.clone(), entries.len());
                    entries.push((k, v));
                }
            }
        }
        Ok(Value::from_entries(entries))
    }

    /// Every value in order, keys discarded.
    pub fn all_values(&self) -> Result<Vec<Value>> {
        self.iter().map(|item| item.map(|(_, v)| v)).collect()
    }

    /// Every entry in order, duplicate keys included.
    pub fn entries(&self) -> Result<Vec<Entry>> {
        self.iter().collect()
    }

    pub fn count(&self) -> Result<usize> {
        let mut n = 0;
        for item in self.iter() {
            item?;
            n += 1;
        }
        Ok(n)
    }

    /// Left fold. Without `initial` the first value seeds the fold; an
    /// empty collection then yields `Null`.
    pub fn reduce(&self, f: &Reducer, initial: Option<Value>) -> Result<Value> {
        let mut acc = initial;
        for item in self.iter() {
            let (k, v) = item?;
            acc = Some(match acc {
                Some(a) => fold(f, &a, &v, &k)?,
                None => v,
            });
        }
        Ok(acc.unwrap_or_default())
    }

    /// `true` once every one of `values` has been seen.
    pub fn contains<I, T>(&self, values: I) -> Result<bool>
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        let mut missing: Vec<Value> = values.into_iter().map(Into::into).collect();
        if missing.is_empty() {
            return Ok(true);
        }
        for item in self.iter() {
            let (_, v) = item?;
            missing.retain(|m| *m != v);
            if missing.is_empty() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Same number of values, each found in the other side, in any order.
    pub fn equals(&self, other: &Collection) -> Result<bool> {
        let mut theirs = other.all_values()?;
        for item in self.iter() {
            let (_, v) = item?;
            match theirs.iter().position(|t| *t == v) {
                Some(i) => {
                    theirs.swap_remove(i);
                }
                None => return Ok(false),
            }
        }
        Ok(theirs.is_empty())
    }

    /// Same entries in the same order, compared strictly.
    pub fn same(&self, other: &Collection) -> Result<bool> {
        self.same_by(other, &strict_equality(), &strict_equality())
    }

    /// Pairwise comparison with custom value and key matchers.
    pub fn same_by(&self, other: &Collection, values: &Matcher, keys: &Matcher) -> Result<bool> {
        let mut theirs = other.iter();
        for item in self.iter() {
            let (k, v) = item?;
            match theirs.next() {
                Some(other_item) => {
                    let (ok, ov) = other_item?;
                    if !keys(&k, &ok) || !values(&v, &ov) {
                        return Ok(false);
                    }
                }
                None => return Ok(false),
            }
        }
        Ok(theirs.next().is_none())
    }

    /// `true` when every entry satisfies at least one predicate.
    pub fn every(&self, predicates: &[Predicate]) -> Result<bool> {
        for item in self.iter() {
            let (k, v) = item?;
            if !any_of(predicates, &v, &k)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// `true` when some entry's value equals `f(value, key)` for one of `fns`.
    pub fn has(&self, fns: &[Callback]) -> Result<bool> {
        for item in self.iter() {
            let (k, v) = item?;
            for f in fns {
                if call(f, &v, &k)? == v {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// `true` when some entry satisfies at least one predicate.
    pub fn match_any(&self, predicates: &[Predicate]) -> Result<bool> {
        for item in self.iter() {
            let (k, v) = item?;
            if any_of(predicates, &v, &k)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Every value falsy (vacuously true when empty).
    pub fn falsy(&self) -> Result<bool> {
        self.all_values_satisfy(|v| !v.is_truthy())
    }

    /// Every value null-like: null, `false`, `0`, `""` or an empty container.
    pub fn nullsy(&self) -> Result<bool> {
        self.all_values_satisfy(|v| match v {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Int(i) => *i == 0,
            Value::Str(s) => s.is_empty(),
            Value::List(_) | Value::Map(_) => v.is_empty(),
            _ => false,
        })
    }

    /// Every value truthy (vacuously true when empty).
    pub fn truthy(&self) -> Result<bool> {
        self.all_values_satisfy(Value::is_truthy)
    }

    fn all_values_satisfy(&self, f: impl Fn(&Value) -> bool) -> Result<bool> {
        for item in self.iter() {
            let (_, v) = item?;
            if !f(&v) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn is_empty(&self) -> Result<bool> {
        match self.iter().next() {
            Some(item) => item.map(|_| false),
            None => Ok(true),
        }
    }

    /// First value satisfying any predicate, or `default`.
    pub fn find(&self, default: Value, predicates: &[Predicate]) -> Result<Value> {
        for item in self.iter() {
            let (k, v) = item?;
            if any_of(predicates, &v, &k)? {
                return Ok(v);
            }
        }
        Ok(default)
    }

    /// Value at position `index`, `None` past the end.
    pub fn current(&self, index: usize) -> Result<Option<Value>> {
        self.iter().nth(index).map(|item| item.map(|(_, v)| v)).transpose()
    }

    /// Key at position `index`, `None` past the end.
    pub fn key(&self, index: usize) -> Result<Option<Value>> {
        self.iter().nth(index).map(|item| item.map(|(k, _)| k)).transpose()
    }

    /// Values rendered as text and joined by `glue`.
    pub fn implode(&self, glue: &str) -> Result<String> {
        let parts: Vec<String> = self
            .iter()
            .map(|item| item.map(|(_, v)| v.to_string()))
            .collect::<Result<_>>()?;
        Ok(parts.join(glue))
    }

    /// Values joined by single spaces.
    pub fn unwords(&self) -> Result<String> {
        self.implode(" ")
    }

    /// Values joined by newlines.
    pub fn unlines(&self) -> Result<String> {
        self.implode("\n")
    }
}

impl Collection {
    /// The [`all`](Collection::all) structure as a `serde_json::Value`.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        crate::io::to_json(&self.all()?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        crate::io::to_json_string(&self.all()?)
    }

    /// Write the [`all`](Collection::all) structure as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        crate::io::write_json(path, &self.all()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{predicate, reducer};

    #[test]
    fn all_collapses_duplicate_keys_last_write_wins() -> Result<()> {
        let c = Collection::from_entries([("a", 1), ("b", 2), ("a", 3)]);
        assert_eq!(c.all()?, Value::map([("a", 3), ("b", 2)]));
        assert_eq!(c.all_values()?.len(), 3);
        Ok(())
    }

    #[test]
    fn reduce_without_initial_seeds_from_first_value() -> Result<()> {
        let sum = reducer(|acc, v, _| Value::from(acc.as_i64().unwrap_or(0) + v.as_i64().unwrap_or(0)));
        assert_eq!(Collection::from_iterable([1, 2, 3]).reduce(&sum, None)?, Value::from(6));
        assert_eq!(Collection::empty().reduce(&sum, None)?, Value::Null);
        assert_eq!(Collection::empty().reduce(&sum, Some(Value::from(5)))?, Value::from(5));
        Ok(())
    }

    #[test]
    fn contains_stops_once_everything_is_found() -> Result<()> {
        let c = Collection::range(0.0, f64::INFINITY, 1.0);
        assert!(c.contains([Value::float(2.0), Value::float(5.0)])?);
        assert!(!Collection::from_iterable([1, 2]).contains([1, 3])?);
        Ok(())
    }

    #[test]
    fn equals_ignores_order_and_same_does_not() -> Result<()> {
        let a = Collection::from_iterable([1, 2, 3]);
        let b = Collection::from_iterable([3, 1, 2]);
        assert!(a.equals(&b)?);
        assert!(!a.same(&b)?);
        assert!(a.same(&Collection::from_iterable([1, 2, 3]))?);
        assert!(!a.equals(&Collection::from_iterable([1, 2]))?);
        Ok(())
    }

    #[test]
    fn boolean_terminals() -> Result<()> {
        let even = predicate(|v, _| v.as_i64().is_some_and(|n| n % 2 == 0));
        let c = Collection::from_iterable([2, 4, 5]);
        assert!(!c.every(&[even.clone()])?);
        assert!(c.match_any(&[even])?);
        assert!(Collection::from_iterable([Value::Null, 0.into(), "".into()]).nullsy()?);
        assert!(Collection::from_iterable([0, 0]).falsy()?);
        assert!(Collection::empty().is_empty()?);
        Ok(())
    }

    #[test]
    fn positional_lookups() -> Result<()> {
        let c = Collection::from_entries([("x", 10), ("y", 20)]);
        assert_eq!(c.current(1)?, Some(Value::from(20)));
        assert_eq!(c.key(0)?, Some(Value::from("x")));
        assert_eq!(c.current(5)?, None);
        Ok(())
    }

    #[test]
    fn implode_joins_text() -> Result<()> {
        let c = Collection::from_iterable(["a", "b"]);
        assert_eq!(c.implode(", ")?, "a, b");
        assert_eq!(c.unlines()?, "a\nb");
        Ok(())
    }
}
