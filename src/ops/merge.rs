//! Stages that add entries: merge, append, prepend, intersperse, pad.

use crate::error::{Error, Result};
use crate::operation::Operation;
use crate::sequence::{AutoKey, Entry, Sequence, indexed};
use crate::source::Source;
use crate::value::Value;
use std::sync::Arc;

/// This sequence, then every other source in turn. Integer keys are
/// renumbered `0..` across the whole output; other keys are kept.
pub struct Merge {
    others: Arc<Vec<Arc<dyn Source>>>,
}

impl Merge {
    pub fn new(others: Vec<Arc<dyn Source>>) -> Self {
        Self {
            others: Arc::new(others),
        }
    }
}

impl Operation for Merge {
    fn name(&self) -> &'static str {
        "merge"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let others = Arc::clone(&self.others);
        // Later sources are opened lazily, when the previous one runs out.
        let rest = (0..others.len()).flat_map(move |i| others[i].open());
        let mut next_index = 0i64;
        Box::new(input.chain(rest).map(move |item| -> Result<Entry> {
            let (k, v) = item?;
            let k = match k {
                Value::Int(_) => {
                    next_index += 1;
                    Value::Int(next_index - 1)
                }
                other => other,
            };
            Ok((k, v))
        }))
    }
}

/// Values added after the sequence, keyed `0..n`.
pub struct Append {
    values: Arc<Vec<Value>>,
}

impl Append {
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values: Arc::new(values),
        }
    }
}

impl Operation for Append {
    fn name(&self) -> &'static str {
        "append"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        Box::new(input.chain(indexed(self.values.to_vec())))
    }
}

/// Values added before the sequence, keyed `0..n`.
pub struct Prepend {
    values: Arc<Vec<Value>>,
}

impl Prepend {
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values: Arc::new(values),
        }
    }
}

impl Operation for Prepend {
    fn name(&self) -> &'static str {
        "prepend"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        Box::new(indexed(self.values.to_vec()).chain(input))
    }
}

/// Insert `value` before every `every`-th entry, counting from `start_at`.
/// Inserted entries get the next free integer key.
pub struct Intersperse {
    value: Value,
    every: u64,
    start_at: u64,
}

impl Intersperse {
    pub fn new(value: Value, every: i64, start_at: i64) -> Result<Self> {
        let every = u64::try_from(every)
            .ok()
            .filter(|e| *e > 0)
            .ok_or_else(|| Error::configuration("intersperse", "interval must be a positive integer"))?;
        let start_at = u64::try_from(start_at)
            .map_err(|_| Error::configuration("intersperse", "start position must not be negative"))?;
        Ok(Self { value, every, start_at })
    }
}

impl Operation for Intersperse {
    fn name(&self) -> &'static str {
        "intersperse"
    }

    fn apply(&self, mut input: Sequence) -> Sequence {
        let (value, every) = (self.value.clone(), self.every);
        let mut position = self.start_at;
        let mut keys = AutoKey::default();
        let mut pending: Option<Entry> = None;
        Box::new(std::iter::from_fn(move || {
            if let Some(entry) = pending.take() {
                return Some(Ok(entry));
            }
            let (k, v) = match input.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e)),
            };
            keys.observe(&k);
            let hit = position % every == 0;
            position += 1;
            if hit {
                pending = Some((k, v));
                Some(Ok((keys.next_key(), value.clone())))
            } else {
                Some(Ok((k, v)))
            }
        }))
    }
}

/// Append `value` until the sequence has at least `size` entries.
pub struct Pad {
    size: usize,
    value: Value,
}

impl Pad {
    pub fn new(size: usize, value: Value) -> Self {
        Self { size, value }
    }
}

impl Operation for Pad {
    fn name(&self) -> &'static str {
        "pad"
    }

    fn apply(&self, mut input: Sequence) -> Sequence {
        let (size, value) = (self.size, self.value.clone());
        let mut seen = 0usize;
        let mut keys = AutoKey::default();
        let mut live = true;
        Box::new(std::iter::from_fn(move || {
            if live {
                match input.next() {
                    Some(Ok((k, v))) => {
                        seen += 1;
                        keys.observe(&k);
                        return Some(Ok((k, v)));
                    }
                    Some(Err(e)) => return Some(Err(e)),
                    None => live = false,
                }
            }
            if seen >= size {
                return None;
            }
            seen += 1;
            Some(Ok((keys.next_key(), value.clone())))
        }))
    }
}
