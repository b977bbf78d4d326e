//! Whole-sequence reordering. Both stages buffer their input.

use crate::error::{Error, Result};
use crate::operation::{Comparator, Operation, natural_order};
use crate::sequence::{Sequence, buffered, sequence};
use std::str::FromStr;
use std::sync::Arc;

/// What [`Sort`] compares.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortMode {
    #[default]
    Values,
    Keys,
}

impl FromStr for SortMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "values" | "0" => Ok(Self::Values),
            "keys" | "1" => Ok(Self::Keys),
            other => Err(Error::configuration("sort", format!("invalid sort mode '{other}'"))),
        }
    }
}

/// Stable sort by value or key; entries keep their keys.
pub struct Sort {
    mode: SortMode,
    comparator: Comparator,
}

impl Sort {
    /// `None` sorts by the loose natural ordering.
    pub fn new(mode: SortMode, comparator: Option<Comparator>) -> Self {
        Self {
            mode,
            comparator: comparator.unwrap_or_else(natural_order),
        }
    }
}

impl Operation for Sort {
    fn name(&self) -> &'static str {
        "sort"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let cmp = Arc::clone(&self.comparator);
        let mode = self.mode;
        buffered(input, move |mut entries| {
            match mode {
                SortMode::Values => entries.sort_by(|a, b| cmp(&a.1, &b.1)),
                SortMode::Keys => entries.sort_by(|a, b| cmp(&a.0, &b.0)),
            }
            sequence(entries)
        })
    }

    fn buffering(&self) -> bool {
        true
    }
}

/// Last entry first, keys kept.
#[derive(Clone, Copy, Debug, Default)]
pub struct Reverse;

impl Operation for Reverse {
    fn name(&self) -> &'static str {
        "reverse"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        buffered(input, |mut entries| {
            entries.reverse();
            sequence(entries)
        })
    }

    fn buffering(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::comparator;
    use crate::sequence::{Entry, materialize};
    use crate::value::Value;

    fn scrambled() -> Vec<Entry> {
        vec![
            (Value::from("c"), Value::from(2)),
            (Value::from("a"), Value::from(3)),
            (Value::from("b"), Value::from(1)),
        ]
    }

    #[test]
    fn sorts_values_keeping_keys() -> anyhow::Result<()> {
        let out = materialize(Sort::new(SortMode::Values, None).apply(sequence(scrambled())))?;
        let keys: Vec<String> = out.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["b", "c", "a"]);
        Ok(())
    }

    #[test]
    fn sorts_keys_with_custom_comparator() -> anyhow::Result<()> {
        let desc = comparator(|a, b| b.compare(a));
        let out = materialize(Sort::new(SortMode::Keys, Some(desc)).apply(sequence(scrambled())))?;
        let keys: Vec<String> = out.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["c", "b", "a"]);
        Ok(())
    }

    #[test]
    fn sort_is_stable() -> anyhow::Result<()> {
        let input = vec![
            (Value::from(0), Value::from(1)),
            (Value::from(1), Value::from(1.0)),
            (Value::from(2), Value::from(0)),
        ];
        let out = materialize(Sort::new(SortMode::Values, None).apply(sequence(input)))?;
        let keys: Vec<i64> = out.iter().filter_map(|(k, _)| k.as_i64()).collect();
        assert_eq!(keys, vec![2, 0, 1]);
        Ok(())
    }

    #[test]
    fn unknown_mode_is_a_configuration_error() {
        assert!(matches!("sideways".parse::<SortMode>(), Err(Error::Configuration { .. })));
        assert_eq!("1".parse::<SortMode>().ok(), Some(SortMode::Keys));
    }

    #[test]
    fn reverse_keeps_keys() -> anyhow::Result<()> {
        let out = materialize(Reverse.apply(sequence(scrambled())))?;
        assert_eq!(out.first(), Some(&(Value::from("b"), Value::from(1))));
        Ok(())
    }
}
