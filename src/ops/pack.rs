//! Stages that move data between keys and values.

use super::on_entry;
use crate::operation::Operation;
use crate::sequence::{Entry, Sequence};
use crate::value::Value;

/// Small macro for stateless per-entry stages with no parameters.
macro_rules! entry_stage {
    ($(#[$doc:meta])* $name:ident, $label:literal, |$k:ident, $v:ident| $body:expr) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $name;

        impl Operation for $name {
            fn name(&self) -> &'static str {
                $label
            }

            fn apply(&self, input: Sequence) -> Sequence {
                Box::new(input.filter_map(|item| on_entry(item, |($k, $v)| Ok(Some($body)))))
            }
        }
    };
}

entry_stage!(
    /// Swap keys and values.
    Flip, "flip", |k, v| (v, k)
);

/// Values become `[key, value]` pairs, keyed `0..`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pack;

impl Operation for Pack {
    fn name(&self) -> &'static str {
        "pack"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        Box::new(input.enumerate().map(|(i, item)| {
            item.map(|(k, v)| (Value::from(i), Value::List(vec![k, v])))
        }))
    }
}

/// Inverse of [`Pack`]: each `[key, value, key, value, ..]` list value is
/// expanded into entries. Scalar values are skipped.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unpack;

impl Operation for Unpack {
    fn name(&self) -> &'static str {
        "unpack"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        Box::new(input.flat_map(|item| -> Vec<crate::Result<Entry>> {
            match item {
                Ok((_, v)) => v
                    .values()
                    .map(|items| pairs(items).into_iter().map(Ok).collect())
                    .unwrap_or_default(),
                Err(e) => vec![Err(e)],
            }
        }))
    }
}

fn pairs(items: Vec<Value>) -> Vec<Entry> {
    let mut out = Vec::with_capacity(items.len() / 2 + 1);
    let mut it = items.into_iter();
    while let Some(k) = it.next() {
        out.push((k, it.next().unwrap_or_default()));
    }
    out
}

/// Consecutive values pair up as `key => value`. An odd trailing value gets
/// a null value.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pair;

impl Operation for Pair {
    fn name(&self) -> &'static str {
        "pair"
    }

    fn apply(&self, mut input: Sequence) -> Sequence {
        Box::new(std::iter::from_fn(move || {
            let first = match input.next()? {
                Ok((_, v)) => v,
                Err(e) => return Some(Err(e)),
            };
            match input.next() {
                Some(Ok((_, second))) => Some(Ok((first, second))),
                Some(Err(e)) => Some(Err(e)),
                None => Some(Ok((first, Value::Null))),
            }
        }))
    }
}

/// Inverse of [`Pair`]: every entry emits its key then its value, keyed `0..`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unpair;

impl Operation for Unpair {
    fn name(&self) -> &'static str {
        "unpair"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let flat = input.flat_map(|item| -> Vec<crate::Result<Value>> {
            match item {
                Ok((k, v)) => vec![Ok(k), Ok(v)],
                Err(e) => vec![Err(e)],
            }
        });
        Box::new(
            flat.enumerate()
                .map(|(i, v)| v.map(|v| (Value::from(i), v))),
        )
    }
}

/// Keys become the values, keyed `0..`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Keys;

impl Operation for Keys {
    fn name(&self) -> &'static str {
        "keys"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        Box::new(
            input
                .enumerate()
                .map(|(i, item)| item.map(|(k, _)| (Value::from(i), k))),
        )
    }
}

/// Discard keys and re-key `0..`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Normalize;

impl Operation for Normalize {
    fn name(&self) -> &'static str {
        "normalize"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        Box::new(
            input
                .enumerate()
                .map(|(i, item)| item.map(|(_, v)| (Value::from(i), v))),
        )
    }
}

/// Every entry becomes a one-entry container `{key: value}`, keyed `0..`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Wrap;

impl Operation for Wrap {
    fn name(&self) -> &'static str {
        "wrap"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        Box::new(input.enumerate().map(|(i, item)| {
            item.map(|(k, v)| (Value::from(i), Value::from_entries(vec![(k, v)])))
        }))
    }
}

/// Inline the entries of every container value; scalars pass through.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unwrap;

impl Operation for Unwrap {
    fn name(&self) -> &'static str {
        "unwrap"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        Box::new(input.flat_map(|item| -> Vec<crate::Result<Entry>> {
            match item {
                Ok((k, v)) => match v.entries() {
                    Some(entries) => entries.into_iter().map(Ok).collect(),
                    None => vec![Ok((k, v))],
                },
                Err(e) => vec![Err(e)],
            }
        }))
    }
}

/// Use `keys` as the keys of the values, position by position.
///
/// Extra values get null keys, extra keys get null values.
pub struct Combine {
    keys: Vec<Value>,
}

impl Combine {
    pub fn new(keys: Vec<Value>) -> Self {
        Self { keys }
    }
}

impl Operation for Combine {
    fn name(&self) -> &'static str {
        "combine"
    }

    fn apply(&self, mut input: Sequence) -> Sequence {
        let mut keys = self.keys.clone().into_iter();
        let mut values_done = false;
        Box::new(std::iter::from_fn(move || {
            if !values_done {
                match input.next() {
                    Some(Ok((_, v))) => return Some(Ok((keys.next().unwrap_or_default(), v))),
                    Some(Err(e)) => return Some(Err(e)),
                    None => values_done = true,
                }
            }
            keys.next().map(|k| Ok((k, Value::Null)))
        }))
    }
}
