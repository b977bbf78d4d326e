//! Value-rewriting stages.

use super::on_entry;
use crate::error::{Error, Result};
use crate::operation::{Callback, Operation, Predicate, call, check};
use crate::sequence::Sequence;
use crate::value::Value;
use std::sync::Arc;

/// Apply each callback in order: `fₙ(..f₂(f₁(v)))`. Keys are preserved.
pub struct Map {
    fns: Arc<Vec<Callback>>,
}

impl Map {
    pub fn new(fns: Vec<Callback>) -> Self {
        Self { fns: Arc::new(fns) }
    }
}

impl Operation for Map {
    fn name(&self) -> &'static str {
        "map"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let fns = Arc::clone(&self.fns);
        Box::new(input.filter_map(move |item| {
            on_entry(item, |(k, mut v)| {
                for f in fns.iter() {
                    v = call(f, &v, &k)?;
                }
                Ok(Some((k, v)))
            })
        }))
    }
}

/// Re-key and re-value every entry.
///
/// The key callback receives `(key, value)`, the value callback
/// `(value, key)`; both see the original entry. A missing callback leaves its
/// side unchanged.
pub struct Associate {
    key_fn: Option<Callback>,
    value_fn: Option<Callback>,
}

impl Associate {
    pub fn new(key_fn: Option<Callback>, value_fn: Option<Callback>) -> Self {
        Self { key_fn, value_fn }
    }
}

impl Operation for Associate {
    fn name(&self) -> &'static str {
        "associate"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let key_fn = self.key_fn.clone();
        let value_fn = self.value_fn.clone();
        Box::new(input.filter_map(move |item| {
            on_entry(item, |(k, v)| {
                let nk = match &key_fn {
                    Some(f) => call(f, &k, &v)?,
                    None => k.clone(),
                };
                let nv = match &value_fn {
                    Some(f) => call(f, &v, &k)?,
                    None => v,
                };
                Ok(Some((nk, nv)))
            })
        }))
    }
}

/// Per-entry conditional map. Entries failing the condition pass through
/// `otherwise` when given, unchanged otherwise.
pub struct IfThenElse {
    condition: Predicate,
    then: Callback,
    otherwise: Option<Callback>,
}

impl IfThenElse {
    pub fn new(condition: Predicate, then: Callback, otherwise: Option<Callback>) -> Self {
        Self {
            condition,
            then,
            otherwise,
        }
    }
}

impl Operation for IfThenElse {
    fn name(&self) -> &'static str {
        "if_then_else"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let cond = Arc::clone(&self.condition);
        let then = Arc::clone(&self.then);
        let otherwise = self.otherwise.clone();
        Box::new(input.filter_map(move |item| {
            on_entry(item, |(k, v)| {
                let nv = if check(&cond, &v, &k)? {
                    call(&then, &v, &k)?
                } else if let Some(f) = &otherwise {
                    call(f, &v, &k)?
                } else {
                    v
                };
                Ok(Some((k, nv)))
            })
        }))
    }
}

/// The child at `column` of every container value; entries without it are
/// skipped.
pub struct Column {
    column: Value,
}

impl Column {
    pub fn new(column: Value) -> Self {
        Self { column }
    }
}

impl Operation for Column {
    fn name(&self) -> &'static str {
        "column"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let column = self.column.clone();
        Box::new(input.filter_map(move |item| {
            on_entry(item, |(k, v)| Ok(v.get(&column).map(|found| (k, found.clone()))))
        }))
    }
}

/// Resolve a dotted path in every value (see [`Value::pluck`]).
pub struct Pluck {
    path: Value,
    default: Value,
}

impl Pluck {
    pub fn new(path: Value, default: Value) -> Self {
        Self { path, default }
    }
}

impl Operation for Pluck {
    fn name(&self) -> &'static str {
        "pluck"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let (path, default) = (self.path.clone(), self.default.clone());
        Box::new(input.filter_map(move |item| {
            on_entry(item, |(k, v)| Ok(Some((k, v.pluck(&path, &default)))))
        }))
    }
}

/// Rescale numbers from `[lower, upper]` into `[wanted_lower, wanted_upper]`.
///
/// Without a base the mapping is linear. With a base `b` the position inside
/// the source range is `log_b(1 + v - lower) / log_b(1 + upper - lower)`.
/// Non-numeric and out-of-range values are dropped. Results are floats.
#[derive(Clone, Copy)]
pub struct Scale {
    lower: f64,
    upper: f64,
    wanted_lower: f64,
    wanted_upper: f64,
    base: Option<f64>,
}

impl Scale {
    pub fn new(
        lower: f64,
        upper: f64,
        wanted_lower: f64,
        wanted_upper: f64,
        base: Option<f64>,
    ) -> Result<Self> {
        if !(lower < upper) {
            return Err(Error::configuration("scale", "lower bound must be below upper bound"));
        }
        if let Some(b) = base
            && (b <= 0.0 || b == 1.0)
        {
            return Err(Error::configuration("scale", "log base must be positive and not 1"));
        }
        Ok(Self {
            lower,
            upper,
            wanted_lower,
            wanted_upper,
            base,
        })
    }

    fn rescale(&self, v: f64) -> f64 {
        let position = match self.base {
            None => (v - self.lower) / (self.upper - self.lower),
            Some(b) => (1.0 + v - self.lower).log(b) / (1.0 + self.upper - self.lower).log(b),
        };
        self.wanted_lower + position * (self.wanted_upper - self.wanted_lower)
    }
}

impl Operation for Scale {
    fn name(&self) -> &'static str {
        "scale"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let me = *self;
        Box::new(input.filter_map(move |item| {
            on_entry(item, |(k, v)| {
                Ok(v.as_f64()
                    .filter(|n| v.is_numeric() && (me.lower..=me.upper).contains(n))
                    .map(|n| (k, Value::from(me.rescale(n)))))
            })
        }))
    }
}
