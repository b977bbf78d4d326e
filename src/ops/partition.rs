//! Bucketing stages. All of them drain their input before emitting.

use crate::error::Result;
use crate::operation::{Callback, Operation, Predicate, any_of, call, check, truthy};
use crate::sequence::{Entry, Sequence, buffered, failed, indexed, sequence};
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Route each entry to the bucket of the first predicate it satisfies;
/// entries matching none go to a final bucket. Buckets keep the original
/// keys and are emitted as container values keyed `0..`.
pub struct Partition {
    predicates: Arc<Vec<Predicate>>,
}

impl Partition {
    /// Without predicates, entries are split on value truthiness.
    pub fn new(predicates: Vec<Predicate>) -> Self {
        let predicates = if predicates.is_empty() { vec![truthy()] } else { predicates };
        Self {
            predicates: Arc::new(predicates),
        }
    }
}

fn route(predicates: &[Predicate], entries: Vec<Entry>) -> Result<Vec<Vec<Entry>>> {
    let mut buckets: Vec<Vec<Entry>> = vec![Vec::new(); predicates.len() + 1];
    for (k, v) in entries {
        let mut slot = predicates.len();
        for (i, p) in predicates.iter().enumerate() {
            if check(p, &v, &k)? {
                slot = i;
                break;
            }
        }
        buckets[slot].push((k, v));
    }
    Ok(buckets)
}

impl Operation for Partition {
    fn name(&self) -> &'static str {
        "partition"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let preds = Arc::clone(&self.predicates);
        buffered(input, move |entries| match route(&preds, entries) {
            Ok(buckets) => indexed(buckets.into_iter().map(Value::from_entries).collect::<Vec<_>>()),
            Err(e) => failed(e),
        })
    }

    fn buffering(&self) -> bool {
        true
    }
}

/// Two buckets: the longest prefix where any predicate holds, then the rest.
pub struct Span {
    predicates: Arc<Vec<Predicate>>,
}

impl Span {
    pub fn new(predicates: Vec<Predicate>) -> Self {
        Self {
            predicates: Arc::new(predicates),
        }
    }
}

fn split_prefix(predicates: &[Predicate], entries: Vec<Entry>) -> Result<(Vec<Entry>, Vec<Entry>)> {
    let mut head = Vec::new();
    let mut rest = entries.into_iter();
    for (k, v) in rest.by_ref() {
        if !any_of(predicates, &v, &k)? {
            let mut tail = vec![(k, v)];
            tail.extend(rest);
            return Ok((head, tail));
        }
        head.push((k, v));
    }
    Ok((head, Vec::new()))
}

impl Operation for Span {
    fn name(&self) -> &'static str {
        "span"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let preds = Arc::clone(&self.predicates);
        buffered(input, move |entries| match split_prefix(&preds, entries) {
            Ok((head, tail)) => indexed(vec![Value::from_entries(head), Value::from_entries(tail)]),
            Err(e) => failed(e),
        })
    }

    fn buffering(&self) -> bool {
        true
    }
}

/// Runs of consecutive equal values, as lists keyed `0..`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Group;

impl Operation for Group {
    fn name(&self) -> &'static str {
        "group"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        buffered(input, |entries| {
            let mut runs: Vec<Vec<Value>> = Vec::new();
            for (_, v) in entries {
                match runs.last_mut() {
                    Some(run) if run.last() == Some(&v) => run.push(v),
                    _ => runs.push(vec![v]),
                }
            }
            indexed(runs.into_iter().map(Value::List).collect::<Vec<_>>())
        })
    }

    fn buffering(&self) -> bool {
        true
    }
}

/// Bucket values by `f(value, key)` (the entry key without a callback),
/// across the whole sequence. Groups come out in order of first appearance,
/// keyed by the group key.
pub struct GroupBy {
    f: Option<Callback>,
}

impl GroupBy {
    pub fn new(f: Option<Callback>) -> Self {
        Self { f }
    }
}

fn group_by(f: Option<&Callback>, entries: Vec<Entry>) -> Result<Vec<Entry>> {
    let mut order: Vec<(Value, Vec<Value>)> = Vec::new();
    let mut index: HashMap<Value, usize> = HashMap::new();
    for (k, v) in entries {
        let group = match f {
            Some(f) => call(f, &v, &k)?,
            None => k,
        };
        match index.get(&group) {
            Some(&i) => order[i].1.push(v),
            None => {
                index.insert(group.clone(), order.len());
                order.push((group, vec![v]));
            }
        }
    }
    Ok(order.into_iter().map(|(g, values)| (g, Value::List(values))).collect())
}

impl Operation for GroupBy {
    fn name(&self) -> &'static str {
        "group_by"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let f = self.f.clone();
        buffered(input, move |entries| match group_by(f.as_ref(), entries) {
            Ok(groups) => sequence(groups),
            Err(e) => failed(e),
        })
    }

    fn buffering(&self) -> bool {
        true
    }
}

/// `count => value` for each distinct value, in order of first occurrence.
#[derive(Clone, Copy, Debug, Default)]
pub struct Frequency;

impl Operation for Frequency {
    fn name(&self) -> &'static str {
        "frequency"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        buffered(input, |entries| {
            let mut counts: Vec<(Value, i64)> = Vec::new();
            let mut index: HashMap<Value, usize> = HashMap::new();
            for (_, v) in entries {
                match index.get(&v) {
                    Some(&i) => counts[i].1 += 1,
                    None => {
                        index.insert(v.clone(), counts.len());
                        counts.push((v, 1));
                    }
                }
            }
            sequence(counts.into_iter().map(|(v, n)| (Value::from(n), v)).collect::<Vec<_>>())
        })
    }

    fn buffering(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{callback, predicate};
    use crate::sequence::materialize;

    fn ints(values: &[i64]) -> Sequence {
        indexed(values.iter().copied().map(Value::from).collect::<Vec<_>>())
    }

    #[test]
    fn partition_routes_to_first_matching_bucket() -> anyhow::Result<()> {
        let small = predicate(|v, _| v.as_i64().is_some_and(|n| n < 3));
        let even = predicate(|v, _| v.as_i64().is_some_and(|n| n % 2 == 0));
        let out = materialize(Partition::new(vec![small, even]).apply(ints(&[1, 2, 3, 4, 5])))?;
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].1, Value::list([1, 2]));
        assert_eq!(out[1].1, Value::map([(3, 4)]));
        assert_eq!(out[2].1, Value::map([(2, 3), (4, 5)]));
        Ok(())
    }

    #[test]
    fn span_splits_at_first_failure() -> anyhow::Result<()> {
        let small = predicate(|v, _| v.as_i64().is_some_and(|n| n < 3));
        let out = materialize(Span::new(vec![small]).apply(ints(&[1, 2, 3, 1])))?;
        assert_eq!(out[0].1, Value::list([1, 2]));
        assert_eq!(out[1].1, Value::map([(2, 3), (3, 1)]));
        Ok(())
    }

    #[test]
    fn group_is_run_length() -> anyhow::Result<()> {
        let out = materialize(Group.apply(ints(&[1, 1, 2, 1])))?;
        let runs: Vec<Value> = out.into_iter().map(|(_, v)| v).collect();
        assert_eq!(runs, vec![Value::list([1, 1]), Value::list([2]), Value::list([1])]);
        Ok(())
    }

    #[test]
    fn group_by_parity_in_first_appearance_order() -> anyhow::Result<()> {
        let parity = callback(|v, _| Value::from(if v.as_i64().unwrap_or(0) % 2 == 0 { "even" } else { "odd" }));
        let out = materialize(GroupBy::new(Some(parity)).apply(ints(&[1, 2, 3, 4])))?;
        assert_eq!(
            out,
            vec![
                (Value::from("odd"), Value::list([1, 3])),
                (Value::from("even"), Value::list([2, 4])),
            ]
        );
        Ok(())
    }

    #[test]
    fn frequency_counts_values() -> anyhow::Result<()> {
        let out = materialize(Frequency.apply(ints(&[7, 8, 7, 7])))?;
        assert_eq!(out, vec![(Value::from(3), Value::from(7)), (Value::from(1), Value::from(8))]);
        Ok(())
    }
}
