//! Stages that inline nested containers, plus `cycle`.

use crate::error::Result;
use crate::operation::{Callback, Operation, call};
use crate::sequence::{Entry, Sequence};
use crate::value::Value;
use std::sync::Arc;

/// Inline container values up to `depth` levels; keys come from the
/// container that held the value. `depth == Some(0)` is a no-op, `None`
/// flattens fully.
#[derive(Clone, Copy, Debug)]
pub struct Flatten {
    depth: Option<usize>,
}

impl Flatten {
    pub fn new(depth: Option<usize>) -> Self {
        Self { depth }
    }
}

fn flatten_into(out: &mut Vec<Result<Entry>>, (k, v): Entry, depth: Option<usize>) {
    if depth == Some(0) {
        out.push(Ok((k, v)));
        return;
    }
    match v.entries() {
        Some(children) => {
            let next = depth.map(|d| d - 1);
            for child in children {
                flatten_into(out, child, next);
            }
        }
        None => out.push(Ok((k, v))),
    }
}

impl Operation for Flatten {
    fn name(&self) -> &'static str {
        "flatten"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let depth = self.depth;
        if depth == Some(0) {
            return input;
        }
        Box::new(input.flat_map(move |item| {
            let mut out = Vec::new();
            match item {
                Ok(entry) => flatten_into(&mut out, entry, depth),
                Err(e) => out.push(Err(e)),
            }
            out
        }))
    }
}

/// Map each value, then inline the result one level. Scalar results are
/// kept under the original key.
pub struct FlatMap {
    f: Callback,
}

impl FlatMap {
    pub fn new(f: Callback) -> Self {
        Self { f }
    }
}

impl Operation for FlatMap {
    fn name(&self) -> &'static str {
        "flat_map"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let f = Arc::clone(&self.f);
        Box::new(input.flat_map(move |item| -> Vec<Result<Entry>> {
            let (k, v) = match item {
                Ok(entry) => entry,
                Err(e) => return vec![Err(e)],
            };
            match call(&f, &v, &k) {
                Ok(mapped) => match mapped.entries() {
                    Some(children) => children.into_iter().map(Ok).collect(),
                    None => vec![Ok((k, mapped))],
                },
                Err(e) => vec![Err(e)],
            }
        }))
    }
}

/// Inline container values one level and drop scalar values.
#[derive(Clone, Copy, Debug, Default)]
pub struct Collapse;

impl Operation for Collapse {
    fn name(&self) -> &'static str {
        "collapse"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        Box::new(input.flat_map(|item| -> Vec<Result<Entry>> {
            match item {
                Ok((_, v)) => v
                    .entries()
                    .map(|children| children.into_iter().map(Ok).collect())
                    .unwrap_or_default(),
                Err(e) => vec![Err(e)],
            }
        }))
    }
}

/// Repeat the input forever. Entries are recorded during the first pass and
/// replayed afterwards, so the input is read only once. An empty input stays
/// empty.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cycle;

impl Operation for Cycle {
    fn name(&self) -> &'static str {
        "cycle"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let mut input = Some(input);
        let mut seen: Vec<Entry> = Vec::new();
        let mut pos = 0usize;
        Box::new(std::iter::from_fn(move || {
            if let Some(live) = input.as_mut() {
                match live.next() {
                    Some(Ok(entry)) => {
                        seen.push(entry.clone());
                        return Some(Ok(entry));
                    }
                    Some(Err(e)) => {
                        input = None;
                        seen.clear();
                        return Some(Err(e));
                    }
                    None => input = None,
                }
            }
            if seen.is_empty() {
                return None;
            }
            let entry = seen[pos % seen.len()].clone();
            pos += 1;
            Some(Ok(entry))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::callback;
    use crate::sequence::{indexed, materialize};

    fn nested() -> Sequence {
        indexed(vec![
            Value::list(["a", "b", "c"]),
            Value::from("d"),
            Value::list([Value::from("d"), Value::list(["e", "f"])]),
        ])
    }

    #[test]
    fn flatten_fully_takes_inner_keys() -> anyhow::Result<()> {
        let out = materialize(Flatten::new(None).apply(nested()))?;
        let keys: Vec<i64> = out.iter().filter_map(|(k, _)| k.as_i64()).collect();
        assert_eq!(keys, vec![0, 1, 2, 1, 0, 0, 1]);
        assert_eq!(out.last().map(|(_, v)| v.clone()), Some(Value::from("f")));
        Ok(())
    }

    #[test]
    fn flatten_one_level_keeps_deeper_lists() -> anyhow::Result<()> {
        let out = materialize(Flatten::new(Some(1)).apply(nested()))?;
        assert_eq!(out.last(), Some(&(Value::from(1), Value::list(["e", "f"]))));
        Ok(())
    }

    #[test]
    fn collapse_drops_scalars() -> anyhow::Result<()> {
        let out = materialize(Collapse.apply(nested()))?;
        assert_eq!(out.len(), 5);
        Ok(())
    }

    #[test]
    fn cycle_repeats_recorded_entries() -> anyhow::Result<()> {
        let out: Vec<Entry> = Cycle
            .apply(indexed(vec![Value::from(1), Value::from(2)]))
            .take(5)
            .collect::<Result<_>>()?;
        let values: Vec<i64> = out.iter().filter_map(|(_, v)| v.as_i64()).collect();
        assert_eq!(values, vec![1, 2, 1, 2, 1]);
        Ok(())
    }

    #[test]
    fn flat_map_inlines_results() -> anyhow::Result<()> {
        let dup = callback(|v, _| Value::list([v.clone(), v.clone()]));
        let out = materialize(FlatMap::new(dup).apply(indexed(vec![Value::from(1)])))?;
        assert_eq!(out.len(), 2);
        Ok(())
    }
}
