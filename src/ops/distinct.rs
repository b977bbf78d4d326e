//! First occurrences and repeats.
//!
//! Both stages stream: they keep the accessed value of every entry kept so
//! far and compare each new entry against that list with the matcher.

use crate::error::Result;
use crate::operation::{Callback, Matcher, Operation, call, strict_equality};
use crate::ops::on_entry;
use crate::sequence::Sequence;
use crate::value::Value;
use std::sync::Arc;

struct Seen {
    matcher: Matcher,
    accessor: Option<Callback>,
    values: Vec<Value>,
}

impl Seen {
    fn new(matcher: Matcher, accessor: Option<Callback>) -> Self {
        Self {
            matcher,
            accessor,
            values: Vec::new(),
        }
    }

    /// Record the entry and report whether an equal one was recorded before.
    fn repeat(&mut self, value: &Value, key: &Value) -> Result<bool> {
        let accessed = match &self.accessor {
            Some(f) => call(f, value, key)?,
            None => value.clone(),
        };
        let m = &self.matcher;
        if self.values.iter().any(|seen| m(seen, &accessed)) {
            return Ok(true);
        }
        self.values.push(accessed);
        Ok(false)
    }
}

/// Keep the first entry of every group of equal values.
pub struct Distinct {
    matcher: Matcher,
    accessor: Option<Callback>,
}

impl Distinct {
    /// Defaults: strict equality on the value itself.
    pub fn new(matcher: Option<Matcher>, accessor: Option<Callback>) -> Self {
        Self {
            matcher: matcher.unwrap_or_else(strict_equality),
            accessor,
        }
    }
}

impl Operation for Distinct {
    fn name(&self) -> &'static str {
        "distinct"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let mut seen = Seen::new(Arc::clone(&self.matcher), self.accessor.clone());
        Box::new(input.filter_map(move |item| {
            on_entry(item, |(k, v)| Ok((!seen.repeat(&v, &k)?).then_some((k, v))))
        }))
    }
}

/// Keep every repeat occurrence, dropping first occurrences.
pub struct Duplicate {
    matcher: Matcher,
    accessor: Option<Callback>,
}

impl Duplicate {
    pub fn new(matcher: Option<Matcher>, accessor: Option<Callback>) -> Self {
        Self {
            matcher: matcher.unwrap_or_else(strict_equality),
            accessor,
        }
    }
}

impl Operation for Duplicate {
    fn name(&self) -> &'static str {
        "duplicate"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let mut seen = Seen::new(Arc::clone(&self.matcher), self.accessor.clone());
        Box::new(input.filter_map(move |item| {
            on_entry(item, |(k, v)| Ok(seen.repeat(&v, &k)?.then_some((k, v))))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{callback, matcher};
    use crate::sequence::{indexed, materialize};

    fn letters() -> Sequence {
        indexed(vec![Value::from("a"), "B".into(), "b".into(), "a".into()])
    }

    #[test]
    fn distinct_keeps_first_occurrence_and_key() -> anyhow::Result<()> {
        let out = materialize(Distinct::new(None, None).apply(letters()))?;
        let keys: Vec<i64> = out.iter().filter_map(|(k, _)| k.as_i64()).collect();
        assert_eq!(keys, vec![0, 1, 2]);
        Ok(())
    }

    #[test]
    fn distinct_with_case_insensitive_matcher() -> anyhow::Result<()> {
        let lower = callback(|v, _| Value::from(v.to_string().to_lowercase()));
        let same = matcher(|a, b| a == b);
        let out = materialize(Distinct::new(Some(same), Some(lower)).apply(letters()))?;
        assert_eq!(out.len(), 2);
        Ok(())
    }

    #[test]
    fn duplicate_keeps_only_repeats() -> anyhow::Result<()> {
        let out = materialize(Duplicate::new(None, None).apply(letters()))?;
        assert_eq!(out, vec![(Value::from(3), Value::from("a"))]);
        Ok(())
    }
}
