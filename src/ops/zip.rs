//! Position-wise combination of several sequences, and its inverses.

use crate::operation::Operation;
use crate::sequence::{Sequence, buffered, deferred, indexed, sequence};
use crate::source::Source;
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Walk this sequence and every other source in lock step. Each output
/// entry has the list of keys as key and the list of values as value;
/// exhausted inputs contribute `Null` until all of them are exhausted.
pub struct Zip {
    others: Arc<Vec<Arc<dyn Source>>>,
}

impl Zip {
    pub fn new(others: Vec<Arc<dyn Source>>) -> Self {
        Self {
            others: Arc::new(others),
        }
    }
}

impl Operation for Zip {
    fn name(&self) -> &'static str {
        "zip"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let others = Arc::clone(&self.others);
        deferred(move || {
            let mut cursors: Vec<Option<Sequence>> = Vec::with_capacity(others.len() + 1);
            cursors.push(Some(input));
            cursors.extend(others.iter().map(|s| Some(s.open())));
            Box::new(std::iter::from_fn(move || {
                let mut keys = Vec::with_capacity(cursors.len());
                let mut values = Vec::with_capacity(cursors.len());
                let mut any = false;
                for slot in cursors.iter_mut() {
                    let next = slot.as_mut().and_then(|c| c.next());
                    match next {
                        Some(Ok((k, v))) => {
                            any = true;
                            keys.push(k);
                            values.push(v);
                        }
                        Some(Err(e)) => return Some(Err(e)),
                        None => {
                            *slot = None;
                            keys.push(Value::Null);
                            values.push(Value::Null);
                        }
                    }
                }
                any.then(|| Ok((Value::List(keys), Value::List(values))))
            }))
        })
    }
}

/// Columns of list values: column `j` gathers element `j` of every row,
/// `Null` where a row is too short. Columns are keyed `0..`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unzip;

impl Operation for Unzip {
    fn name(&self) -> &'static str {
        "unzip"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        buffered(input, |entries| {
            let rows: Vec<Vec<Value>> = entries
                .into_iter()
                .map(|(_, v)| v.values().unwrap_or_else(|| vec![v]))
                .collect();
            let width = rows.iter().map(Vec::len).max().unwrap_or(0);
            let columns = (0..width)
                .map(|j| Value::List(rows.iter().map(|row| row.get(j).cloned().unwrap_or(Value::Null)).collect()))
                .collect::<Vec<_>>();
            indexed(columns)
        })
    }

    fn buffering(&self) -> bool {
        true
    }
}

/// Regroup container values by inner key: every inner key becomes an
/// output key holding the list of values found under it, in order.
#[derive(Clone, Copy, Debug, Default)]
pub struct Transpose;

impl Operation for Transpose {
    fn name(&self) -> &'static str {
        "transpose"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        buffered(input, |entries| {
            let mut order: Vec<(Value, Vec<Value>)> = Vec::new();
            let mut index: HashMap<Value, usize> = HashMap::new();
            for (_, row) in entries {
                for (k, v) in row.entries().unwrap_or_default() {
                    match index.get(&k) {
                        Some(&i) => order[i].1.push(v),
                        None => {
                            index.insert(k.clone(), order.len());
                            order.push((k, vec![v]));
                        }
                    }
                }
            }
            sequence(order.into_iter().map(|(k, vs)| (k, Value::List(vs))).collect::<Vec<_>>())
        })
    }

    fn buffering(&self) -> bool {
        true
    }
}
