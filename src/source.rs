//! Restartable producers of sequences.
//!
//! Every [`Source`] can be opened any number of times; each
//! [`open`](Source::open) returns an independent cursor starting at the
//! beginning. Opening is itself lazy: callables are not invoked and resources
//! are not touched until the first entry is pulled.

use crate::error::{Error, Result};
use crate::io::{ByteSource, Utf8Chars};
use crate::operation::{Callback, call};
use crate::sequence::{Entry, Sequence, deferred, failed};
use crate::value::Value;
use log::debug;
use std::sync::{Arc, Mutex};

/// Anything that can produce a fresh [`Sequence`] on demand.
pub trait Source: Send + Sync {
    fn open(&self) -> Sequence;

    /// Human-readable description for [`Pipeline::explain`](crate::Pipeline::explain).
    fn describe(&self) -> String {
        "source".to_string()
    }
}

/// No entries at all.
pub struct EmptySource;

impl Source for EmptySource {
    fn open(&self) -> Sequence {
        Box::new(std::iter::empty())
    }

    fn describe(&self) -> String {
        "empty".to_string()
    }
}

/// A finite, in-memory list of entries. Entries are cloned as they are pulled.
pub struct IterableSource {
    entries: Arc<Vec<Entry>>,
}

impl IterableSource {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self {
            entries: Arc::new(entries),
        }
    }
}

impl Source for IterableSource {
    fn open(&self) -> Sequence {
        let entries = Arc::clone(&self.entries);
        Box::new((0..entries.len()).filter_map(move |i| entries.get(i).cloned().map(Ok::<Entry, Error>)))
    }

    fn describe(&self) -> String {
        format!("iterable[{}]", self.entries.len())
    }
}

type SequenceFactory = Arc<dyn Fn() -> Sequence + Send + Sync>;

/// A callable invoked on every open, generator style. May be infinite.
pub struct CallableSource {
    factory: SequenceFactory,
}

impl CallableSource {
    /// Values produced by `f` are keyed `0..`.
    pub fn values<F, I>(f: F) -> Self
    where
        F: Fn() -> I + Send + Sync + 'static,
        I: IntoIterator<Item = Value>,
        I::IntoIter: Send + 'static,
    {
        Self {
            factory: Arc::new(move || crate::sequence::indexed(f())),
        }
    }

    /// `f` produces keyed entries directly.
    pub fn entries<F, I>(f: F) -> Self
    where
        F: Fn() -> I + Send + Sync + 'static,
        I: IntoIterator<Item = Entry>,
        I::IntoIter: Send + 'static,
    {
        Self {
            factory: Arc::new(move || crate::sequence::sequence(f())),
        }
    }
}

impl Source for CallableSource {
    fn open(&self) -> Sequence {
        let factory = Arc::clone(&self.factory);
        deferred(move || factory())
    }

    fn describe(&self) -> String {
        "callable".to_string()
    }
}

/// Characters of a string, or the segments between occurrences of a
/// delimiter. Empty segments (leading, inner and trailing) are kept.
pub struct StringSource {
    text: Arc<str>,
    delimiter: Option<Arc<str>>,
}

impl StringSource {
    pub fn new(text: &str, delimiter: Option<&str>) -> Self {
        Self {
            text: Arc::from(text),
            delimiter: delimiter.filter(|d| !d.is_empty()).map(Arc::from),
        }
    }
}

impl Source for StringSource {
    fn open(&self) -> Sequence {
        let text = Arc::clone(&self.text);
        let mut pos = 0usize;
        let pieces: Box<dyn Iterator<Item = String> + Send> = match self.delimiter.clone() {
            None => Box::new(std::iter::from_fn(move || {
                let c = text.get(pos..)?.chars().next()?;
                pos += c.len_utf8();
                Some(c.to_string())
            })),
            Some(delim) => {
                let mut done = false;
                Box::new(std::iter::from_fn(move || {
                    if done {
                        return None;
                    }
                    let rest = text.get(pos..)?;
                    match rest.find(&*delim) {
                        Some(at) => {
                            let piece = rest[..at].to_string();
                            pos += at + delim.len();
                            Some(piece)
                        }
                        None => {
                            done = true;
                            Some(rest.to_string())
                        }
                    }
                }))
            }
        };
        Box::new(
            pieces
                .enumerate()
                .map(|(i, s)| Ok((Value::from(i), Value::Str(s)))),
        )
    }

    fn describe(&self) -> String {
        match &self.delimiter {
            Some(d) => format!("string split on {d:?}"),
            None => "string chars".to_string(),
        }
    }
}

type ByteSourceFactory = Arc<dyn Fn() -> Result<Box<dyn ByteSource>> + Send + Sync>;

/// Characters decoded lazily from a byte source.
///
/// Every open calls the factory for an independent handle; a handle is never
/// shared between cursors.
pub struct ResourceSource {
    factory: ByteSourceFactory,
    label: String,
}

impl ResourceSource {
    pub fn new<F>(label: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn ByteSource>> + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
            label: label.into(),
        }
    }

    /// A single, non-restartable reader. The first open takes it; later opens
    /// fail with a resource error at their first pull.
    pub fn once<R>(label: impl Into<String>, reader: R) -> Self
    where
        R: std::io::Read + Send + 'static,
    {
        let label = label.into();
        let slot = Mutex::new(Some(reader));
        let name = label.clone();
        Self::new(label, move || {
            let mut guard = slot
                .lock()
                .map_err(|_| Error::resource(format!("{name} lock poisoned"), None))?;
            match guard.take() {
                Some(r) => Ok(Box::new(crate::io::ReaderSource::new(r, name.clone())) as Box<dyn ByteSource>),
                None => Err(Error::resource(format!("{name} was already consumed"), None)),
            }
        })
    }
}

impl Source for ResourceSource {
    fn open(&self) -> Sequence {
        let factory = Arc::clone(&self.factory);
        let label = self.label.clone();
        deferred(move || match factory() {
            Ok(bytes) => {
                debug!("reading characters from {label}");
                Box::new(
                    Utf8Chars::new(bytes)
                        .enumerate()
                        .map(|(i, c)| c.map(|c| (Value::from(i), Value::from(c)))),
                )
            }
            Err(e) => failed(e),
        })
    }

    fn describe(&self) -> String {
        format!("resource {}", self.label)
    }
}

/// Half-open float range `[start, end)` stepping by `step`.
///
/// `end` may be `f64::INFINITY`. A step that never reaches `end` produces an
/// infinite sequence.
pub struct RangeSource {
    start: f64,
    end: f64,
    step: f64,
}

impl RangeSource {
    pub fn new(start: f64, end: f64, step: f64) -> Self {
        Self { start, end, step }
    }
}

impl Source for RangeSource {
    fn open(&self) -> Sequence {
        let (start, end, step) = (self.start, self.end, self.step);
        let mut current = start;
        let mut index = 0usize;
        Box::new(std::iter::from_fn(move || -> Option<Result<Entry>> {
            if current >= end {
                return None;
            }
            let entry = (Value::from(index), Value::float(current));
            index += 1;
            current += step;
            Some(Ok(entry))
        }))
    }

    fn describe(&self) -> String {
        format!("range({}, {}, {})", self.start, self.end, self.step)
    }
}

/// `f(1), f(2), .., f(n)`, or `1..=n` without a callback.
pub struct TimesSource {
    count: usize,
    f: Option<Callback>,
}

impl TimesSource {
    pub fn new(count: usize, f: Option<Callback>) -> Self {
        Self { count, f }
    }
}

impl Source for TimesSource {
    fn open(&self) -> Sequence {
        let f = self.f.clone();
        Box::new((1..=self.count).enumerate().map(move |(i, n)| {
            let key = Value::from(i);
            let n = Value::from(n);
            match &f {
                Some(f) => call(f, &n, &key).map(|v| (key, v)),
                None => Ok((key, n)),
            }
        }))
    }

    fn describe(&self) -> String {
        format!("times({})", self.count)
    }
}

pub type UnfoldFn = Arc<dyn Fn(&[Value]) -> anyhow::Result<Vec<Value>> + Send + Sync>;

/// Infinite sequence of repeated applications: the parameters of each call
/// are the results of the previous one, starting from `seed`.
///
/// A single-valued result is emitted as that value, several results as a list.
pub struct UnfoldSource {
    f: UnfoldFn,
    seed: Vec<Value>,
}

impl UnfoldSource {
    pub fn new(f: UnfoldFn, seed: Vec<Value>) -> Self {
        Self { f, seed }
    }
}

impl Source for UnfoldSource {
    fn open(&self) -> Sequence {
        let f = Arc::clone(&self.f);
        let mut params = Some(self.seed.clone());
        let mut index = 0usize;
        Box::new(std::iter::from_fn(move || {
            let current = params.take()?;
            match f(&current) {
                Ok(next) => {
                    let value = match next.as_slice() {
                        [single] => single.clone(),
                        _ => Value::List(next.clone()),
                    };
                    let key = Value::from(index);
                    index += 1;
                    params = Some(next);
                    Some(Ok((key, value)))
                }
                Err(e) => Some(Err(Error::Callback(e))),
            }
        }))
    }

    fn describe(&self) -> String {
        "unfold".to_string()
    }
}
