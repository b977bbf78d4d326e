//! Sliding and prefix/suffix views: window, unwindow, tails, inits.

use crate::error::{Error, Result};
use crate::operation::Operation;
use crate::sequence::{Entry, Sequence, buffered, indexed};
use crate::value::Value;
use std::collections::VecDeque;

/// For each entry, the list of the last `size + 1` values seen so far.
/// Keys are kept.
#[derive(Clone, Copy, Debug)]
pub struct Window {
    /// `None` accumulates every value.
    capacity: Option<usize>,
}

impl Window {
    /// `size == -1` accumulates all values; other negative sizes are rejected.
    pub fn new(size: i64) -> Result<Self> {
        let capacity = match size {
            -1 => None,
            s if s < 0 => {
                return Err(Error::configuration("window", format!("invalid size {s}")));
            }
            s => Some(usize::try_from(s).unwrap_or(usize::MAX - 1).saturating_add(1)),
        };
        Ok(Self { capacity })
    }
}

impl Operation for Window {
    fn name(&self) -> &'static str {
        "window"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let capacity = self.capacity;
        let mut stack: VecDeque<Value> = VecDeque::new();
        Box::new(input.map(move |item| -> Result<Entry> {
            let (k, v) = item?;
            stack.push_back(v);
            if let Some(cap) = capacity {
                while stack.len() > cap {
                    stack.pop_front();
                }
            }
            Ok((k, Value::List(stack.iter().cloned().collect())))
        }))
    }
}

/// Replace every container value by its last element; scalars pass through.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unwindow;

impl Operation for Unwindow {
    fn name(&self) -> &'static str {
        "unwindow"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        Box::new(input.map(|item| -> Result<Entry> {
            let (k, v) = item?;
            let last = match v.values() {
                Some(values) => values.last().cloned().unwrap_or(Value::Null),
                None => v,
            };
            Ok((k, last))
        }))
    }
}

/// Every suffix of the value list, longest first, ending with `[]`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tails;

impl Operation for Tails {
    fn name(&self) -> &'static str {
        "tails"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        buffered(input, |entries| {
            let values: Vec<Value> = entries.into_iter().map(|(_, v)| v).collect();
            indexed((0..=values.len()).map(move |i| Value::List(values[i..].to_vec())))
        })
    }

    fn buffering(&self) -> bool {
        true
    }
}

/// Every prefix of the entries as `[key, value]` pair lists, starting with
/// `[]`. Streams: prefix `n` is emitted once entry `n` has been pulled.
#[derive(Clone, Copy, Debug, Default)]
pub struct Inits;

impl Operation for Inits {
    fn name(&self) -> &'static str {
        "inits"
    }

    fn apply(&self, mut input: Sequence) -> Sequence {
        let mut prefix: Vec<Value> = Vec::new();
        let mut index = 0usize;
        let mut started = false;
        Box::new(std::iter::from_fn(move || {
            if started {
                match input.next()? {
                    Ok((k, v)) => prefix.push(Value::List(vec![k, v])),
                    Err(e) => return Some(Err(e)),
                }
            }
            started = true;
            let key = Value::from(index);
            index += 1;
            Some(Ok((key, Value::List(prefix.clone()))))
        }))
    }
}
