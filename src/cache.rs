//! Memoising pulled entries into a pluggable key/value store.
//!
//! The [`Cache`] stage records entry `i` of its input under key `i` and,
//! once the input ran out, an end marker holding the entry count. A later
//! traversal reads from the store first and only pulls the input (skipping
//! what it already has) on a miss. After one full traversal the input is
//! never pulled again.

use crate::error::{Error, Result};
use crate::operation::Operation;
use crate::sequence::{Entry, Sequence};
use crate::value::Value;
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Minimal store contract consumed by [`Cache`].
pub trait CacheStore: Send + Sync {
    /// The stored value, `None` on a miss.
    fn get(&self, key: &Value) -> Result<Option<Value>>;

    fn set(&self, key: Value, value: Value) -> Result<()>;

    fn has(&self, key: &Value) -> Result<bool>;
}

/// Process-local store backed by a `HashMap`.
#[derive(Debug, Default, Clone)]
pub struct MemoryCache {
    items: Arc<Mutex<HashMap<Value, Value>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Value, Value>>> {
        self.items
            .lock()
            .map_err(|_| Error::resource("cache store lock poisoned", None))
    }

    /// Number of stored items, end marker included.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &Value) -> Result<Option<Value>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: Value, value: Value) -> Result<()> {
        self.lock()?.insert(key, value);
        Ok(())
    }

    fn has(&self, key: &Value) -> Result<bool> {
        Ok(self.lock()?.contains_key(key))
    }
}

fn end_marker() -> Value {
    Value::from("ironseq.cache.end")
}

/// Stage that replays entries from a [`CacheStore`] when it can.
pub struct Cache {
    store: Arc<dyn CacheStore>,
}

impl Cache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }
}

struct CacheCursor {
    store: Arc<dyn CacheStore>,
    input: Sequence,
    /// Position of the next entry to emit.
    position: usize,
    /// Entries pulled from `input` so far.
    pulled: usize,
    done: bool,
}

impl CacheCursor {
    fn lookup(&self) -> Result<Option<Entry>> {
        let key = Value::from(self.position);
        match self.store.get(&key)? {
            Some(Value::List(mut pair)) if pair.len() == 2 => {
                let v = pair.pop().unwrap_or(Value::Null);
                let k = pair.pop().unwrap_or(Value::Null);
                Ok(Some((k, v)))
            }
            _ => Ok(None),
        }
    }

    fn reached_end(&self) -> Result<bool> {
        Ok(match self.store.get(&end_marker())? {
            Some(count) => count.as_i64().is_some_and(|n| usize::try_from(n) == Ok(self.position)),
            None => false,
        })
    }

    fn step(&mut self) -> Result<Option<Entry>> {
        if self.reached_end()? {
            return Ok(None);
        }
        if let Some(entry) = self.lookup()? {
            self.position += 1;
            return Ok(Some(entry));
        }
        while self.pulled < self.position {
            match self.input.next() {
                Some(item) => {
                    item?;
                    self.pulled += 1;
                }
                None => return Ok(None),
            }
        }
        match self.input.next() {
            Some(item) => {
                let (k, v) = item?;
                self.pulled += 1;
                self.store
                    .set(Value::from(self.position), Value::List(vec![k.clone(), v.clone()]))?;
                self.position += 1;
                Ok(Some((k, v)))
            }
            None => {
                debug!("cache recorded {} entries", self.position);
                self.store.set(end_marker(), Value::from(self.position))?;
                Ok(None)
            }
        }
    }
}

impl Iterator for CacheCursor {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.step() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => Some(Err(e)),
        }
    }
}

impl Operation for Cache {
    fn name(&self) -> &'static str {
        "cache"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        Box::new(CacheCursor {
            store: Arc::clone(&self.store),
            input,
            position: 0,
            pulled: 0,
            done: false,
        })
    }
}
