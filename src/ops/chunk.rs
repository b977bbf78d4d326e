//! Grouping consecutive entries into list values.

use crate::error::{Error, Result};
use crate::operation::{Operation, Predicate, any_of, predicate};
use crate::sequence::{Entry, Sequence};
use crate::value::Value;
use std::str::FromStr;
use std::sync::Arc;

/// Fixed-size chunks of values, keyed `0..`. Several sizes are used in turn,
/// cycling; a size of zero ends the output.
#[derive(Clone, Debug)]
pub struct Chunk {
    sizes: Arc<Vec<usize>>,
}

impl Chunk {
    pub fn new(sizes: Vec<usize>) -> Self {
        Self {
            sizes: Arc::new(sizes),
        }
    }
}

impl Operation for Chunk {
    fn name(&self) -> &'static str {
        "chunk"
    }

    fn apply(&self, mut input: Sequence) -> Sequence {
        let sizes = Arc::clone(&self.sizes);
        let mut turn = 0usize;
        let mut done = false;
        Box::new(std::iter::from_fn(move || {
            if done || sizes.is_empty() {
                return None;
            }
            let size = sizes[turn % sizes.len()];
            if size == 0 {
                done = true;
                return None;
            }
            let mut chunk = Vec::with_capacity(size);
            while chunk.len() < size {
                match input.next() {
                    Some(Ok((_, v))) => chunk.push(v),
                    Some(Err(e)) => return Some(Err(e)),
                    None => {
                        done = true;
                        break;
                    }
                }
            }
            if chunk.is_empty() {
                return None;
            }
            let key = Value::from(turn);
            turn += 1;
            Some(Ok((key, Value::List(chunk))))
        }))
    }
}

/// Where a matching entry lands when splitting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitMode {
    /// The match opens the next chunk.
    Before,
    /// The match closes the current chunk.
    After,
    /// The match closes the current chunk and is dropped.
    Remove,
}

impl FromStr for SplitMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "before" | "-1" => Ok(Self::Before),
            "remove" | "0" => Ok(Self::Remove),
            "after" | "1" => Ok(Self::After),
            other => Err(Error::configuration("split", format!("unknown split mode '{other}'"))),
        }
    }
}

/// Cut the sequence into list chunks at entries matching any predicate.
pub struct Split {
    mode: SplitMode,
    predicates: Arc<Vec<Predicate>>,
}

impl Split {
    pub fn new(mode: SplitMode, predicates: Vec<Predicate>) -> Self {
        Self {
            mode,
            predicates: Arc::new(predicates),
        }
    }
}

impl Operation for Split {
    fn name(&self) -> &'static str {
        "split"
    }

    fn apply(&self, mut input: Sequence) -> Sequence {
        let preds = Arc::clone(&self.predicates);
        let mode = self.mode;
        let mut chunk: Vec<Value> = Vec::new();
        let mut index = 0usize;
        let mut done = false;
        let mut emit = move |chunk: Vec<Value>| -> Option<Result<Entry>> {
            let key = Value::from(index);
            index += 1;
            Some(Ok((key, Value::List(chunk))))
        };
        Box::new(std::iter::from_fn(move || {
            while !done {
                let (k, v) = match input.next() {
                    Some(Ok(entry)) => entry,
                    Some(Err(e)) => return Some(Err(e)),
                    None => {
                        done = true;
                        break;
                    }
                };
                let hit = match any_of(&preds, &v, &k) {
                    Ok(hit) => hit,
                    Err(e) => return Some(Err(e)),
                };
                match (mode, hit) {
                    (_, false) => chunk.push(v),
                    (SplitMode::Before, true) => {
                        if chunk.is_empty() {
                            chunk.push(v);
                        } else {
                            let full = std::mem::replace(&mut chunk, vec![v]);
                            return emit(full);
                        }
                    }
                    (SplitMode::After, true) => {
                        chunk.push(v);
                        return emit(std::mem::take(&mut chunk));
                    }
                    (SplitMode::Remove, true) => return emit(std::mem::take(&mut chunk)),
                }
            }
            if chunk.is_empty() {
                None
            } else {
                emit(std::mem::take(&mut chunk))
            }
        }))
    }
}

/// Split on any of the `separators` values, dropping them.
pub fn explode(separators: Vec<Value>) -> Split {
    let separators = Arc::new(separators);
    Split::new(
        SplitMode::Remove,
        vec![predicate(move |v, _| separators.contains(v))],
    )
}
