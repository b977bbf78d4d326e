//! Running accumulations.
//!
//! [`Reduction`] and [`ScanLeft1`] are the only stateful pieces; every other
//! scan and fold is a fixed [`Pipe`] around them:
//!
//! | operation        | pipe                                         |
//! |------------------|----------------------------------------------|
//! | `scan_left`      | reduction, prepend initial                   |
//! | `scan_right`     | reverse, reduction, prepend initial, reverse |
//! | `scan_right1`    | reverse, scan_left1, reverse                 |
//! | `fold_left(1)`   | scan_left(1), last                           |
//! | `fold_right(1)`  | scan_right(1), first                         |

use crate::error::Result;
use crate::operation::{Operation, Reducer, fold};
use crate::ops::merge::Prepend;
use crate::ops::slice::{Last, Limit};
use crate::ops::sort::Reverse;
use crate::pipeline::Pipe;
use crate::sequence::{Entry, Sequence};
use crate::value::Value;
use std::sync::Arc;

/// Emit every intermediate accumulator, one per input entry, under the
/// input entry's key.
pub struct Reduction {
    f: Reducer,
    initial: Value,
}

impl Reduction {
    pub fn new(f: Reducer, initial: Value) -> Self {
        Self { f, initial }
    }
}

impl Operation for Reduction {
    fn name(&self) -> &'static str {
        "reduction"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let f = Arc::clone(&self.f);
        let mut acc = self.initial.clone();
        Box::new(input.map(move |item| -> Result<Entry> {
            let (k, v) = item?;
            acc = fold(&f, &acc, &v, &k)?;
            Ok((k, acc.clone()))
        }))
    }
}

/// Like [`Reduction`] seeded with the first value, which is emitted as is.
pub struct ScanLeft1 {
    f: Reducer,
}

impl ScanLeft1 {
    pub fn new(f: Reducer) -> Self {
        Self { f }
    }
}

impl Operation for ScanLeft1 {
    fn name(&self) -> &'static str {
        "scan_left1"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let f = Arc::clone(&self.f);
        let mut acc: Option<Value> = None;
        Box::new(input.map(move |item| -> Result<Entry> {
            let (k, v) = item?;
            let next = match acc.take() {
                None => v,
                Some(prev) => fold(&f, &prev, &v, &k)?,
            };
            acc = Some(next.clone());
            Ok((k, next))
        }))
    }
}

pub fn scan_left(f: Reducer, initial: Value) -> Pipe {
    Pipe::default()
        .then(Reduction::new(f, initial.clone()))
        .then(Prepend::new(vec![initial]))
}

pub fn scan_right(f: Reducer, initial: Value) -> Pipe {
    Pipe::default()
        .then(Reverse)
        .then(Reduction::new(f, initial.clone()))
        .then(Prepend::new(vec![initial]))
        .then(Reverse)
}

pub fn scan_right1(f: Reducer) -> Pipe {
    Pipe::default().then(Reverse).then(ScanLeft1::new(f)).then(Reverse)
}

pub fn fold_left(f: Reducer, initial: Value) -> Pipe {
    scan_left(f, initial).then(Last)
}

pub fn fold_left1(f: Reducer) -> Pipe {
    Pipe::default().then(ScanLeft1::new(f)).then(Last)
}

pub fn fold_right(f: Reducer, initial: Value) -> Pipe {
    scan_right(f, initial).then(Limit::first())
}

pub fn fold_right1(f: Reducer) -> Pipe {
    scan_right1(f).then(Limit::first())
}
