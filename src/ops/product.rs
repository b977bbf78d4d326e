//! Combinatorial stages. The input is buffered; the results themselves are
//! generated one at a time from an index vector, so taking the first few
//! permutations of a long list stays cheap.

use crate::operation::Operation;
use crate::sequence::{Sequence, buffered, failed, indexed, materialize};
use crate::source::Source;
use crate::value::Value;
use std::sync::Arc;

/// Advance an odometer over `radices`, last digit fastest.
/// Returns `false` once it wraps around.
fn advance(digits: &mut [usize], radices: &[usize]) -> bool {
    for i in (0..digits.len()).rev() {
        digits[i] += 1;
        if digits[i] < radices[i] {
            return true;
        }
        digits[i] = 0;
    }
    false
}

/// Cartesian product of this sequence's values with every other source,
/// the last input varying fastest. Each result is a list keyed `0..`.
pub struct Product {
    others: Arc<Vec<Arc<dyn Source>>>,
}

impl Product {
    pub fn new(others: Vec<Arc<dyn Source>>) -> Self {
        Self {
            others: Arc::new(others),
        }
    }
}

impl Operation for Product {
    fn name(&self) -> &'static str {
        "product"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let others = Arc::clone(&self.others);
        buffered(input, move |first| {
            let mut axes: Vec<Vec<Value>> = vec![first.into_iter().map(|(_, v)| v).collect()];
            for source in others.iter() {
                match materialize(source.open()) {
                    Ok(entries) => axes.push(entries.into_iter().map(|(_, v)| v).collect()),
                    Err(e) => return failed(e),
                }
            }
            let radices: Vec<usize> = axes.iter().map(Vec::len).collect();
            let mut digits = if radices.contains(&0) { None } else { Some(vec![0; axes.len()]) };
            indexed(std::iter::from_fn(move || {
                let current = digits.as_mut()?;
                let tuple = Value::List(current.iter().zip(&axes).map(|(&d, axis)| axis[d].clone()).collect());
                if !advance(current, &radices) {
                    digits = None;
                }
                Some(tuple)
            }))
        })
    }

    fn buffering(&self) -> bool {
        true
    }
}

/// All `length`-combinations of the values, in index order.
/// `None` or zero means the full length; a length beyond the input
/// yields nothing.
#[derive(Clone, Copy, Debug)]
pub struct Combinate {
    length: Option<usize>,
}

impl Combinate {
    pub fn new(length: Option<usize>) -> Self {
        Self {
            length: length.filter(|n| *n > 0),
        }
    }
}

/// Next combination of `k` indices out of `n`, lexicographically.
fn next_combination(idx: &mut [usize], n: usize) -> bool {
    let k = idx.len();
    for i in (0..k).rev() {
        if idx[i] < n - k + i {
            idx[i] += 1;
            for j in i + 1..k {
                idx[j] = idx[j - 1] + 1;
            }
            return true;
        }
    }
    false
}

impl Operation for Combinate {
    fn name(&self) -> &'static str {
        "combinate"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let length = self.length;
        buffered(input, move |entries| {
            let values: Vec<Value> = entries.into_iter().map(|(_, v)| v).collect();
            let n = values.len();
            let k = length.unwrap_or(n);
            let mut idx = (k <= n).then(|| (0..k).collect::<Vec<usize>>());
            indexed(std::iter::from_fn(move || {
                let current = idx.as_mut()?;
                let combo = Value::List(current.iter().map(|&i| values[i].clone()).collect());
                if !next_combination(current, n) {
                    idx = None;
                }
                Some(combo)
            }))
        })
    }

    fn buffering(&self) -> bool {
        true
    }
}

/// Next permutation of `idx` in lexicographic order.
fn next_permutation(idx: &mut [usize]) -> bool {
    let Some(i) = (1..idx.len()).rev().find(|&i| idx[i - 1] < idx[i]) else {
        return false;
    };
    let pivot = i - 1;
    let Some(j) = (i..idx.len()).rev().find(|&j| idx[j] > idx[pivot]) else {
        return false;
    };
    idx.swap(pivot, j);
    idx[i..].reverse();
    true
}

/// Every ordering of the values, by lexicographic order of positions.
#[derive(Clone, Copy, Debug, Default)]
pub struct Permutate;

impl Operation for Permutate {
    fn name(&self) -> &'static str {
        "permutate"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        buffered(input, |entries| {
            let values: Vec<Value> = entries.into_iter().map(|(_, v)| v).collect();
            let mut idx = Some((0..values.len()).collect::<Vec<usize>>());
            indexed(std::iter::from_fn(move || {
                let current = idx.as_mut()?;
                let perm = Value::List(current.iter().map(|&i| values[i].clone()).collect());
                if !next_permutation(current) {
                    idx = None;
                }
                Some(perm)
            }))
        })
    }

    fn buffering(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::IterableSource;

    fn letters(items: &[&str]) -> Sequence {
        indexed(items.iter().map(|s| Value::from(*s)).collect::<Vec<_>>())
    }

    fn lists(seq: Sequence) -> crate::Result<Vec<String>> {
        Ok(materialize(seq)?.into_iter().map(|(_, v)| v.to_string()).collect())
    }

    #[test]
    fn product_is_an_odometer() -> anyhow::Result<()> {
        let other: Arc<dyn Source> = Arc::new(IterableSource::new(vec![
            (Value::from(0), Value::from(1)),
            (Value::from(1), Value::from(2)),
        ]));
        let out = lists(Product::new(vec![other]).apply(letters(&["a", "b"])))?;
        assert_eq!(out, vec![r#"["a",1]"#, r#"["a",2]"#, r#"["b",1]"#, r#"["b",2]"#]);
        Ok(())
    }

    #[test]
    fn product_without_others_wraps_each_value() -> anyhow::Result<()> {
        let out = lists(Product::new(vec![]).apply(letters(&["a", "b"])))?;
        assert_eq!(out, vec![r#"["a"]"#, r#"["b"]"#]);
        Ok(())
    }

    #[test]
    fn combinations_in_index_order() -> anyhow::Result<()> {
        let out = lists(Combinate::new(Some(2)).apply(letters(&["a", "b", "c"])))?;
        assert_eq!(out, vec![r#"["a","b"]"#, r#"["a","c"]"#, r#"["b","c"]"#]);
        assert_eq!(lists(Combinate::new(None).apply(letters(&["a", "b"])))?.len(), 1);
        assert!(lists(Combinate::new(Some(4)).apply(letters(&["a", "b"])))?.is_empty());
        Ok(())
    }

    #[test]
    fn permutations_are_lexicographic() -> anyhow::Result<()> {
        let out = lists(Permutate.apply(letters(&["a", "b", "c"])))?;
        assert_eq!(out.len(), 6);
        assert_eq!(out[1], r#"["a","c","b"]"#);
        assert_eq!(out[5], r#"["c","b","a"]"#);
        Ok(())
    }
}
