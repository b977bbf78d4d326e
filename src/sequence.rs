//! Entries and the single-pass sequences that carry them.
//!
//! A [`Sequence`] is a boxed pull iterator of `Result<Entry>`. It is consumed
//! at most once; re-iterating means re-opening the [`Source`](crate::Source)
//! it came from. A failing entry surfaces as one `Err` item; consumers decide
//! whether to stop (terminal transformations do) or skip it (`squash`).

use crate::error::Result;
use crate::value::Value;

/// One `(key, value)` pair.
pub type Entry = (Value, Value);

/// An ordered, single-pass, possibly infinite stream of entries.
pub type Sequence = Box<dyn Iterator<Item = Result<Entry>> + Send>;

/// Wrap an iterator of entries into a [`Sequence`].
pub fn sequence<I>(entries: I) -> Sequence
where
    I: IntoIterator<Item = Entry>,
    I::IntoIter: Send + 'static,
{
    Box::new(entries.into_iter().map(Ok::<Entry, crate::Error>))
}

/// Key an iterator of values `0, 1, 2, ..`.
pub fn indexed<I>(values: I) -> Sequence
where
    I: IntoIterator<Item = Value>,
    I::IntoIter: Send + 'static,
{
    Box::new(
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| Ok::<Entry, crate::Error>((Value::from(i), v))),
    )
}

/// Sequence yielding a single error, used when a stage fails before producing
/// anything.
pub fn failed(error: crate::Error) -> Sequence {
    Box::new(std::iter::once(Err(error)))
}

/// Drain a sequence into memory, stopping at the first error.
pub fn materialize(input: Sequence) -> Result<Vec<Entry>> {
    input.collect()
}

/// A sequence whose construction is postponed until the first pull.
///
/// Buffering stages (sort, group, partition, ...) wrap their body in this so
/// that applying the stage reads nothing; the whole input is drained only
/// when a consumer asks for the first output entry.
pub struct Deferred<F> {
    init: Option<F>,
    inner: Option<Sequence>,
}

impl<F> Deferred<F>
where
    F: FnOnce() -> Sequence + Send,
{
    pub fn new(init: F) -> Self {
        Self {
            init: Some(init),
            inner: None,
        }
    }
}

impl<F> Iterator for Deferred<F>
where
    F: FnOnce() -> Sequence + Send,
{
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(init) = self.init.take() {
            self.inner = Some(init());
        }
        self.inner.as_mut()?.next()
    }
}

/// Postpone building a sequence until it is first pulled.
pub fn deferred<F>(init: F) -> Sequence
where
    F: FnOnce() -> Sequence + Send + 'static,
{
    Box::new(Deferred::new(init))
}

/// Materialize `input` on first pull and hand the buffered entries to `body`.
///
/// An upstream error is forwarded as the only item.
pub fn buffered<F>(input: Sequence, body: F) -> Sequence
where
    F: FnOnce(Vec<Entry>) -> Sequence + Send + 'static,
{
    deferred(move || match materialize(input) {
        Ok(entries) => body(entries),
        Err(e) => failed(e),
    })
}

/// Allocates integer keys the way an auto-keyed append does: one past the
/// largest integer key seen so far, starting at zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoKey {
    next: i64,
}

impl AutoKey {
    pub fn observe(&mut self, key: &Value) {
        if let Value::Int(i) = key
            && *i >= self.next
        {
            self.next = i.saturating_add(1);
        }
    }

    pub fn next_key(&mut self) -> Value {
        let key = Value::Int(self.next);
        self.next = self.next.saturating_add(1);
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn deferred_runs_nothing_until_pulled() -> anyhow::Result<()> {
        let touched = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&touched);
        let mut seq = deferred(move || {
            flag.store(true, Ordering::SeqCst);
            indexed(vec![Value::from(1)])
        });
        assert!(!touched.load(Ordering::SeqCst));
        let first = seq.next().transpose()?;
        assert!(touched.load(Ordering::SeqCst));
        assert_eq!(first, Some((Value::from(0), Value::from(1))));
        Ok(())
    }

    #[test]
    fn auto_keys_continue_after_largest_integer() {
        let mut auto = AutoKey::default();
        auto.observe(&Value::from("a"));
        assert_eq!(auto.next_key(), Value::from(0));
        auto.observe(&Value::from(7));
        assert_eq!(auto.next_key(), Value::from(8));
    }
}
