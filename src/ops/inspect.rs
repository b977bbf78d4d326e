//! Pass-through stages for side effects, diagnostics and control flow.

use crate::error::{Error, Result};
use crate::operation::{Callback, Operation, Predicate, call, check};
use crate::pipeline::Pipe;
use crate::sequence::{Entry, Sequence, deferred};
use crate::value::Value;
use log::{info, trace, warn};
use std::sync::Arc;

/// Run side-effect callbacks on every entry, which passes through
/// unchanged. Once a callback returns `false`, it and the callbacks after
/// it are skipped for that entry and every later one.
pub struct Apply {
    callbacks: Arc<Vec<Predicate>>,
}

impl Apply {
    pub fn new(callbacks: Vec<Predicate>) -> Self {
        Self {
            callbacks: Arc::new(callbacks),
        }
    }
}

impl Operation for Apply {
    fn name(&self) -> &'static str {
        "apply"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let callbacks = Arc::clone(&self.callbacks);
        let mut active = callbacks.len();
        Box::new(input.map(move |item| -> Result<Entry> {
            let (k, v) = item?;
            for i in 0..active {
                if !check(&callbacks[i], &v, &k)? {
                    active = i;
                    break;
                }
            }
            Ok((k, v))
        }))
    }
}

/// Receives `(label, key, value)` for every dumped entry.
pub type DumpSink = Arc<dyn Fn(&str, &Value, &Value) + Send + Sync>;

fn log_sink() -> DumpSink {
    Arc::new(|label: &str, k: &Value, v: &Value| {
        info!(target: "ironseq::dump", "{label}: {k} => {v}");
    })
}

/// Forward the first entries to a sink and pass everything through.
pub struct Dump {
    label: String,
    limit: Option<usize>,
    sink: DumpSink,
}

impl Dump {
    /// `size == 0` dumps every entry, a negative size none of them.
    /// Without a sink, entries are logged at info level under the
    /// `ironseq::dump` target.
    pub fn new(label: impl Into<String>, size: i64, sink: Option<DumpSink>) -> Self {
        let limit = match size {
            0 => None,
            s if s < 0 => Some(0),
            s => Some(usize::try_from(s).unwrap_or(usize::MAX)),
        };
        Self {
            label: label.into(),
            limit,
            sink: sink.unwrap_or_else(log_sink),
        }
    }
}

impl Operation for Dump {
    fn name(&self) -> &'static str {
        "dump"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let (label, limit, sink) = (self.label.clone(), self.limit, Arc::clone(&self.sink));
        let mut dumped = 0usize;
        Box::new(input.inspect(move |item| {
            if let Ok((k, v)) = item
                && limit.is_none_or(|n| dumped < n)
            {
                dumped += 1;
                trace!("dump '{label}' entry {dumped}");
                sink(&label, k, v);
            }
        }))
    }
}

/// Drop failing entries instead of propagating them.
#[derive(Clone, Copy, Debug, Default)]
pub struct Squash;

impl Operation for Squash {
    fn name(&self) -> &'static str {
        "squash"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        Box::new(input.filter(|item| match item {
            Ok(_) => true,
            Err(e) => {
                warn!("squash discarded an error: {e}");
                false
            }
        }))
    }
}

/// Fail with [`Error::Type`] at the first value whose type differs from the
/// first value's type. The type is `type_fn(value, key)` rendered as text,
/// or [`Value::type_name`] by default.
pub struct Strict {
    type_fn: Option<Callback>,
}

impl Strict {
    pub fn new(type_fn: Option<Callback>) -> Self {
        Self { type_fn }
    }
}

impl Operation for Strict {
    fn name(&self) -> &'static str {
        "strict"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let type_fn = self.type_fn.clone();
        let mut expected: Option<String> = None;
        Box::new(input.map(move |item| -> Result<Entry> {
            let (k, v) = item?;
            let found = match &type_fn {
                Some(f) => call(f, &v, &k)?.to_string(),
                None => v.type_name().to_string(),
            };
            let want = expected.get_or_insert_with(|| found.clone());
            if *want != found {
                return Err(Error::Type {
                    expected: want.clone(),
                    found,
                });
            }
            Ok((k, v))
        }))
    }
}

pub type Condition = Arc<dyn Fn() -> bool + Send + Sync>;

/// Branch the whole sequence through one of two pipes. The condition is
/// evaluated at the first pull, not when the stage is built.
pub struct When {
    condition: Condition,
    then: Pipe,
    otherwise: Option<Pipe>,
}

impl When {
    pub fn new(condition: Condition, then: Pipe, otherwise: Option<Pipe>) -> Self {
        Self {
            condition,
            then,
            otherwise,
        }
    }
}

impl Operation for When {
    fn name(&self) -> &'static str {
        "when"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let condition = Arc::clone(&self.condition);
        let (then, otherwise) = (self.then.clone(), self.otherwise.clone());
        deferred(move || {
            if condition() {
                then.apply(input)
            } else {
                match otherwise {
                    Some(pipe) => pipe.apply(input),
                    None => input,
                }
            }
        })
    }

    fn buffering(&self) -> bool {
        self.then.buffering() || self.otherwise.as_ref().is_some_and(|p| p.buffering())
    }
}
