//! Positional and boundary stages: limit, skip, slice, head/last/init, nth,
//! take-while and friends. None of them buffer more than one entry.

use crate::error::{Error, Result};
use crate::operation::{Operation, Predicate, any_of};
use crate::sequence::{Entry, Sequence, failed};
use crate::value::Value;
use std::sync::Arc;

/// Skip `offset` entries, then yield at most `count`.
///
/// A count of zero is accepted when configured but raises a bounds error as
/// soon as the stage is pulled.
#[derive(Clone, Copy, Debug)]
pub struct Limit {
    count: Option<usize>,
    offset: usize,
}

impl Limit {
    /// `count == -1` means unbounded; other negative counts are rejected.
    pub fn new(count: i64, offset: usize) -> Result<Self> {
        let count = match count {
            -1 => None,
            c if c < 0 => {
                return Err(Error::configuration("limit", format!("invalid count {c}")));
            }
            c => Some(usize::try_from(c).unwrap_or(usize::MAX)),
        };
        Ok(Self { count, offset })
    }

    pub fn first() -> Self {
        Self {
            count: Some(1),
            offset: 0,
        }
    }
}

impl Operation for Limit {
    fn name(&self) -> &'static str {
        "limit"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        match self.count {
            Some(0) => failed(Error::bounds("limit", "cannot take zero entries")),
            Some(n) => Box::new(input.skip(self.offset).take(n)),
            None => Box::new(input.skip(self.offset)),
        }
    }
}

/// Skip the sum of the given counts from the front.
#[derive(Clone, Copy, Debug)]
pub struct Skip {
    count: usize,
}

impl Skip {
    pub fn new(counts: &[usize]) -> Self {
        Self {
            count: counts.iter().sum(),
        }
    }
}

impl Operation for Skip {
    fn name(&self) -> &'static str {
        "skip"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        Box::new(input.skip(self.count))
    }
}

/// `length` entries starting at `offset`; all remaining ones without a length.
#[derive(Clone, Copy, Debug)]
pub struct Slice {
    offset: usize,
    length: Option<usize>,
}

impl Slice {
    pub fn new(offset: usize, length: Option<usize>) -> Self {
        Self { offset, length }
    }
}

impl Operation for Slice {
    fn name(&self) -> &'static str {
        "slice"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let rest = input.skip(self.offset);
        match self.length {
            Some(n) => Box::new(rest.take(n)),
            None => Box::new(rest),
        }
    }
}

/// Only the final entry.
#[derive(Clone, Copy, Debug, Default)]
pub struct Last;

impl Operation for Last {
    fn name(&self) -> &'static str {
        "last"
    }

    fn apply(&self, mut input: Sequence) -> Sequence {
        let mut done = false;
        Box::new(std::iter::from_fn(move || {
            if done {
                return None;
            }
            done = true;
            let mut last: Option<Entry> = None;
            for item in input.by_ref() {
                match item {
                    Ok(entry) => last = Some(entry),
                    Err(e) => return Some(Err(e)),
                }
            }
            last.map(Ok)
        }))
    }

    fn buffering(&self) -> bool {
        true
    }
}

/// Everything but the final entry, with one entry of look-ahead.
#[derive(Clone, Copy, Debug, Default)]
pub struct Init;

impl Operation for Init {
    fn name(&self) -> &'static str {
        "init"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let mut input = input.peekable();
        Box::new(std::iter::from_fn(move || {
            let current = input.next()?;
            if current.is_ok() && input.peek().is_none() {
                return None;
            }
            Some(current)
        }))
    }
}

/// Every `step`-th entry, starting at position `offset`.
#[derive(Clone, Copy, Debug)]
pub struct Nth {
    step: usize,
    offset: usize,
}

impl Nth {
    pub fn new(step: usize, offset: usize) -> Result<Self> {
        if step == 0 {
            return Err(Error::configuration("nth", "step must be positive"));
        }
        Ok(Self { step, offset })
    }
}

impl Operation for Nth {
    fn name(&self) -> &'static str {
        "nth"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let (step, offset) = (self.step, self.offset);
        Box::new(
            input
                .enumerate()
                .filter(move |(pos, item)| item.is_err() || pos % step == offset)
                .map(|(_, item)| item),
        )
    }
}

/// Entry at `key`, or a single `0 => default` entry when absent.
pub struct Get {
    key: Value,
    default: Value,
}

impl Get {
    pub fn new(key: Value, default: Value) -> Self {
        Self { key, default }
    }
}

impl Operation for Get {
    fn name(&self) -> &'static str {
        "get"
    }

    fn apply(&self, mut input: Sequence) -> Sequence {
        let (key, default) = (self.key.clone(), self.default.clone());
        let mut done = false;
        Box::new(std::iter::from_fn(move || {
            if done {
                return None;
            }
            done = true;
            for item in input.by_ref() {
                match item {
                    Ok((k, v)) if k == key => return Some(Ok((k, v))),
                    Ok(_) => {}
                    Err(e) => return Some(Err(e)),
                }
            }
            Some(Ok((Value::from(0), default.clone())))
        }))
    }
}

/// Where a [`Boundary`] stage cuts the sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryKind {
    /// Yield while any predicate holds; stop at the first entry where none does.
    TakeWhile,
    /// Skip while any predicate holds; yield everything from then on.
    DropWhile,
    /// Skip until any predicate holds; yield from that entry on.
    Since,
    /// Yield up to and including the first entry where any predicate holds.
    Until,
}

/// One forward scan that flips once, on the OR of its predicates.
pub struct Boundary {
    kind: BoundaryKind,
    predicates: Arc<Vec<Predicate>>,
}

impl Boundary {
    pub fn new(kind: BoundaryKind, predicates: Vec<Predicate>) -> Self {
        Self {
            kind,
            predicates: Arc::new(predicates),
        }
    }
}

impl Operation for Boundary {
    fn name(&self) -> &'static str {
        match self.kind {
            BoundaryKind::TakeWhile => "take_while",
            BoundaryKind::DropWhile => "drop_while",
            BoundaryKind::Since => "since",
            BoundaryKind::Until => "until",
        }
    }

    fn apply(&self, mut input: Sequence) -> Sequence {
        let preds = Arc::clone(&self.predicates);
        let kind = self.kind;
        let mut flipped = false;
        let mut finished = false;
        Box::new(std::iter::from_fn(move || {
            loop {
                if finished {
                    return None;
                }
                let (k, v) = match input.next()? {
                    Ok(entry) => entry,
                    Err(e) => return Some(Err(e)),
                };
                if flipped {
                    return Some(Ok((k, v)));
                }
                let hit = match any_of(&preds, &v, &k) {
                    Ok(hit) => hit,
                    Err(e) => return Some(Err(e)),
                };
                match (kind, hit) {
                    (BoundaryKind::TakeWhile, true) => return Some(Ok((k, v))),
                    (BoundaryKind::TakeWhile, false) => finished = true,
                    (BoundaryKind::DropWhile, true) | (BoundaryKind::Since, false) => {}
                    (BoundaryKind::DropWhile, false) | (BoundaryKind::Since, true) => {
                        flipped = true;
                        return Some(Ok((k, v)));
                    }
                    (BoundaryKind::Until, false) => return Some(Ok((k, v))),
                    (BoundaryKind::Until, true) => {
                        finished = true;
                        return Some(Ok((k, v)));
                    }
                }
            }
        }))
    }
}
