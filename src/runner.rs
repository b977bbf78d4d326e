use crate::error::Result;
use crate::operation::{Callback, Operation, call};
use crate::sequence::{Entry, Sequence};
use crate::value::Value;
use log::debug;
use std::collections::VecDeque;
use std::sync::Arc;

/// Thread a sequence through `stages`, left to right.
pub(crate) fn compose(stages: &[Arc<dyn Operation>], input: Sequence) -> Sequence {
    stages.iter().fold(input, |acc, op| {
        debug!("wiring stage '{}'", op.name());
        op.apply(acc)
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecMode {
    Sequential,
    Parallel { threads: Option<usize> },
}

/// How per-entry work of `async_map` is executed.
#[derive(Clone, Copy, Debug)]
pub struct Runner {
    pub mode: ExecMode,
    /// Entries pulled and mapped together by the parallel executor.
    pub default_batch: usize,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            mode: ExecMode::Parallel { threads: None },
            default_batch: 4 * num_cpus::get().max(2),
        }
    }
}

impl Runner {
    pub fn sequential() -> Self {
        Self {
            mode: ExecMode::Sequential,
            ..Default::default()
        }
    }

    pub fn parallel(threads: Option<usize>) -> Self {
        Self {
            mode: ExecMode::Parallel { threads },
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_batch(mut self, batch: usize) -> Self {
        self.default_batch = batch.max(1);
        self
    }

    /// Map every value through `fns` (in order), keeping keys and the original
    /// entry order whatever the execution mode.
    pub(crate) fn map_ordered(&self, input: Sequence, fns: Arc<Vec<Callback>>) -> Sequence {
        match self.mode {
            ExecMode::Sequential => Box::new(input.map(move |item| item.and_then(|e| apply_all(&fns, e)))),
            ExecMode::Parallel { threads } => {
                #[cfg(feature = "parallel")]
                if let Some(t) = threads {
                    // ok() to ignore "already built" on repeated calls
                    rayon::ThreadPoolBuilder::new().num_threads(t).build_global().ok();
                }
                #[cfg(not(feature = "parallel"))]
                let _ = threads;
                Box::new(OrderedBatches {
                    input,
                    fns,
                    batch: self.default_batch.max(1),
                    ready: VecDeque::new(),
                    exhausted: false,
                })
            }
        }
    }
}

fn apply_all(fns: &[Callback], (key, value): Entry) -> Result<Entry> {
    let mut value = value;
    for f in fns {
        value = call(f, &value, &key)?;
    }
    Ok((key, value))
}

/// Pulls a batch, maps it on the worker pool, then emits it in input order.
struct OrderedBatches {
    input: Sequence,
    fns: Arc<Vec<Callback>>,
    batch: usize,
    ready: VecDeque<Result<Entry>>,
    exhausted: bool,
}

impl OrderedBatches {
    fn refill(&mut self) {
        let mut pending: Vec<Entry> = Vec::with_capacity(self.batch);
        let mut upstream_error = None;
        while pending.len() < self.batch {
            match self.input.next() {
                Some(Ok(e)) => pending.push(e),
                Some(Err(e)) => {
                    upstream_error = Some(e);
                    break;
                }
                None => {
                    self.exhausted = true;
                    break;
                }
            }
        }
        self.ready.extend(map_batch(&self.fns, pending));
        if let Some(e) = upstream_error {
            self.ready.push_back(Err(e));
        }
    }
}

impl Iterator for OrderedBatches {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.ready.is_empty() && !self.exhausted {
            self.refill();
        }
        self.ready.pop_front()
    }
}

#[cfg(feature = "parallel")]
fn map_batch(fns: &[Callback], batch: Vec<Entry>) -> Vec<Result<Entry>> {
    use rayon::prelude::*;
    batch.into_par_iter().map(|e| apply_all(fns, e)).collect()
}

#[cfg(not(feature = "parallel"))]
fn map_batch(fns: &[Callback], batch: Vec<Entry>) -> Vec<Result<Entry>> {
    batch.into_iter().map(|e| apply_all(fns, e)).collect()
}

/// Order-preserving parallel map stage.
pub struct AsyncMap {
    fns: Arc<Vec<Callback>>,
    runner: Runner,
}

impl AsyncMap {
    pub fn new(fns: Vec<Callback>, runner: Runner) -> Self {
        Self {
            fns: Arc::new(fns),
            runner,
        }
    }
}

impl Operation for AsyncMap {
    fn name(&self) -> &'static str {
        "async_map"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        self.runner.map_ordered(input, Arc::clone(&self.fns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::callback;
    use crate::sequence::{indexed, materialize};

    #[test]
    fn parallel_map_preserves_order() -> anyhow::Result<()> {
        let input = indexed((0..100).map(Value::from));
        let double = callback(|v, _| Value::from(v.as_i64().unwrap_or(0) * 2));
        let out = Runner::parallel(None)
            .with_batch(7)
            .map_ordered(input, Arc::new(vec![double]));
        let got = materialize(out)?;
        let want: Vec<Entry> = (0..100).map(|i| (Value::from(i), Value::from(i * 2))).collect();
        assert_eq!(got, want);
        Ok(())
    }

    #[test]
    fn sequential_mode_matches_parallel() -> anyhow::Result<()> {
        let inc = callback(|v, _| Value::from(v.as_i64().unwrap_or(0) + 1));
        let fns = Arc::new(vec![inc]);
        let a = materialize(Runner::sequential().map_ordered(indexed((0..10).map(Value::from)), Arc::clone(&fns)))?;
        let b = materialize(Runner::default().map_ordered(indexed((0..10).map(Value::from)), fns))?;
        assert_eq!(a, b);
        Ok(())
    }
}
