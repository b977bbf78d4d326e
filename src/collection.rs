//! The [`Collection`] facade.
//!
//! A `Collection` is a [`Pipeline`] plus the [`Runner`] used by parallel
//! maps. Every chain method returns a new collection with one more stage and
//! leaves `self` untouched, so intermediate collections can be kept, shared
//! across threads and traversed any number of times. Terminal operations
//! live in [`crate::transformations`].

use crate::cache::{Cache, CacheStore};
use crate::error::Result;
use crate::io::{ByteSource, ReaderSource, open_file};
use crate::operation::{
    Callback, Comparator, Matcher, Operation, Predicate, Reducer, callback, predicate, try_callback,
    try_predicate,
};
use crate::ops::*;
use crate::pipeline::{Explanation, Pipe, Pipeline};
use crate::runner::{AsyncMap, Runner};
use crate::sequence::{Entry, Sequence};
use crate::source::{
    CallableSource, EmptySource, IterableSource, RangeSource, ResourceSource, Source, StringSource,
    TimesSource, UnfoldFn, UnfoldSource,
};
use crate::value::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Lazy, immutable, re-iterable sequence of `(key, value)` entries.
#[derive(Clone)]
pub struct Collection {
    pipeline: Pipeline,
    runner: Runner,
}

fn values_of<I, T>(items: I) -> Vec<Value>
where
    I: IntoIterator<Item = T>,
    T: Into<Value>,
{
    items.into_iter().map(Into::into).collect()
}

fn sources_of<I>(others: I) -> Vec<Arc<dyn Source>>
where
    I: IntoIterator<Item = Collection>,
{
    others
        .into_iter()
        .map(|c| Arc::new(c) as Arc<dyn Source>)
        .collect()
}

// ---------- construction ----------

impl Collection {
    pub fn new(source: impl Source + 'static) -> Self {
        Self {
            pipeline: Pipeline::new(source),
            runner: Runner::default(),
        }
    }

    /// Values keyed `0..`.
    pub fn from_iterable<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::from_entries(
            items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (Value::from(i), v.into())),
        )
    }

    /// Entries with explicit keys; duplicates are kept.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        let entries: Vec<Entry> = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::new(IterableSource::new(entries))
    }

    /// The entries of a container value, or the value itself under key `0`.
    pub fn from_value(value: Value) -> Self {
        match value.entries() {
            Some(entries) => Self::new(IterableSource::new(entries)),
            None => Self::new(IterableSource::new(vec![(Value::from(0), value)])),
        }
    }

    /// `f` runs again on every traversal; its values are keyed `0..`.
    pub fn from_callable<F, I>(f: F) -> Self
    where
        F: Fn() -> I + Send + Sync + 'static,
        I: IntoIterator<Item = Value>,
        I::IntoIter: Send + 'static,
    {
        Self::new(CallableSource::values(f))
    }

    pub fn from_entries_callable<F, I>(f: F) -> Self
    where
        F: Fn() -> I + Send + Sync + 'static,
        I: IntoIterator<Item = Entry>,
        I::IntoIter: Send + 'static,
    {
        Self::new(CallableSource::entries(f))
    }

    /// Characters of `text`, or its segments between `delimiter`s.
    pub fn from_string(text: &str, delimiter: Option<&str>) -> Self {
        Self::new(StringSource::new(text, delimiter))
    }

    /// Characters read lazily from byte sources built by `factory`, one per
    /// traversal.
    pub fn from_resource<F>(label: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn ByteSource>> + Send + Sync + 'static,
    {
        Self::new(ResourceSource::new(label, factory))
    }

    /// Characters of a reader. The reader is consumed by the first
    /// traversal; later ones fail with a resource error.
    pub fn from_reader<R>(label: impl Into<String>, reader: R) -> Self
    where
        R: std::io::Read + Send + 'static,
    {
        Self::new(ResourceSource::once(label, reader))
    }

    /// Characters of a file, reopened on every traversal. A missing file is
    /// reported at the first pull.
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        let path: PathBuf = path.as_ref().to_path_buf();
        let label = path.display().to_string();
        Self::from_resource(label, move || {
            let file: ReaderSource<std::fs::File> = open_file(&path)?;
            Ok(Box::new(file) as Box<dyn ByteSource>)
        })
    }

    pub fn empty() -> Self {
        Self::new(EmptySource)
    }

    /// `[start, end)` by `step`, as floats. `end` may be infinite.
    pub fn range(start: f64, end: f64, step: f64) -> Self {
        Self::new(RangeSource::new(start, end, step))
    }

    pub fn times(count: usize, f: Option<Callback>) -> Self {
        Self::new(TimesSource::new(count, f))
    }

    /// Infinite `seed`, `f(seed)`, `f(f(seed))`, ... (the seed itself is not
    /// emitted).
    pub fn unfold<F>(f: F, seed: Vec<Value>) -> Self
    where
        F: Fn(&[Value]) -> Vec<Value> + Send + Sync + 'static,
    {
        let f: UnfoldFn = Arc::new(move |params: &[Value]| -> anyhow::Result<Vec<Value>> { Ok(f(params)) });
        Self::new(UnfoldSource::new(f, seed))
    }

    pub fn try_unfold<F>(f: F, seed: Vec<Value>) -> Self
    where
        F: Fn(&[Value]) -> anyhow::Result<Vec<Value>> + Send + Sync + 'static,
    {
        Self::new(UnfoldSource::new(Arc::new(f), seed))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Collection {
    fn from(items: Vec<T>) -> Self {
        Self::from_iterable(items)
    }
}

impl Source for Collection {
    fn open(&self) -> Sequence {
        self.pipeline.open()
    }

    fn describe(&self) -> String {
        format!("collection over {}", self.pipeline.source().describe())
    }
}

// ---------- plumbing ----------

impl Collection {
    /// A new collection with `op` appended.
    #[must_use]
    pub fn then(&self, op: impl Operation + 'static) -> Self {
        self.then_shared(Arc::new(op))
    }

    #[must_use]
    pub fn then_shared(&self, op: Arc<dyn Operation>) -> Self {
        Self {
            pipeline: self.pipeline.then(op),
            runner: self.runner,
        }
    }

    /// Apply stored operations in order, as one stage.
    #[must_use]
    pub fn pipe(&self, ops: Vec<Arc<dyn Operation>>) -> Self {
        self.then(Pipe::new(ops))
    }

    #[must_use]
    pub fn with_runner(&self, runner: Runner) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
            runner,
        }
    }

    pub fn runner(&self) -> Runner {
        self.runner
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Fresh cursor over the entries.
    pub fn iter(&self) -> Sequence {
        self.pipeline.open()
    }

    pub fn explain(&self) -> Explanation {
        self.pipeline.explain()
    }
}

// ---------- chainable operations ----------

impl Collection {
    #[must_use]
    pub fn append<I, T>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.then(Append::new(values_of(values)))
    }

    #[must_use]
    pub fn prepend<I, T>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.then(Prepend::new(values_of(values)))
    }

    /// Side effects per entry; see [`Apply`].
    #[must_use]
    pub fn apply(&self, callbacks: Vec<Predicate>) -> Self {
        self.then(Apply::new(callbacks))
    }

    #[must_use]
    pub fn associate(&self, key_fn: Option<Callback>, value_fn: Option<Callback>) -> Self {
        self.then(Associate::new(key_fn, value_fn))
    }

    /// Map on the collection's runner, keeping the input order.
    #[must_use]
    pub fn async_map<F>(&self, f: F) -> Self
    where
        F: Fn(&Value, &Value) -> Value + Send + Sync + 'static,
    {
        self.async_map_n(vec![callback(f)])
    }

    #[must_use]
    pub fn async_map_n(&self, fns: Vec<Callback>) -> Self {
        self.then(AsyncMap::new(fns, self.runner))
    }

    #[must_use]
    pub fn cache(&self, store: Arc<dyn CacheStore>) -> Self {
        self.then(Cache::new(store))
    }

    #[must_use]
    pub fn chunk(&self, sizes: &[usize]) -> Self {
        self.then(Chunk::new(sizes.to_vec()))
    }

    /// The first truthy entry, if any.
    #[must_use]
    pub fn coalesce(&self) -> Self {
        self.then(Pipe::default().then(Filter::new(Vec::new())).then(Limit::first()))
    }

    #[must_use]
    pub fn collapse(&self) -> Self {
        self.then(Collapse)
    }

    #[must_use]
    pub fn column(&self, key: impl Into<Value>) -> Self {
        self.then(Column::new(key.into()))
    }

    #[must_use]
    pub fn combinate(&self, length: Option<usize>) -> Self {
        self.then(Combinate::new(length))
    }

    #[must_use]
    pub fn combine<I, T>(&self, keys: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.then(Combine::new(values_of(keys)))
    }

    /// Drop the given values, or every falsy value with `None`.
    #[must_use]
    pub fn compact(&self, values: Option<Vec<Value>>) -> Self {
        self.then_shared(compact(values))
    }

    #[must_use]
    pub fn cycle(&self) -> Self {
        self.then(Cycle)
    }

    #[must_use]
    pub fn diff<I, T>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.then(Membership::diff(values_of(values)))
    }

    #[must_use]
    pub fn diff_keys<I, T>(&self, keys: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.then(Membership::diff_keys(values_of(keys)))
    }

    #[must_use]
    pub fn distinct(&self) -> Self {
        self.distinct_by(None, None)
    }

    #[must_use]
    pub fn distinct_by(&self, matcher: Option<Matcher>, accessor: Option<Callback>) -> Self {
        self.then(Distinct::new(matcher, accessor))
    }

    #[must_use]
    pub fn drop_while(&self, predicates: Vec<Predicate>) -> Self {
        self.then(Boundary::new(BoundaryKind::DropWhile, predicates))
    }

    /// Hand the first `size` entries to `sink` (all with `0`, none when
    /// negative). Without a sink they are logged at info level.
    #[must_use]
    pub fn dump(&self, label: &str, size: i64, sink: Option<DumpSink>) -> Self {
        self.then(Dump::new(label, size, sink))
    }

    #[must_use]
    pub fn duplicate(&self) -> Self {
        self.duplicate_by(None, None)
    }

    #[must_use]
    pub fn duplicate_by(&self, matcher: Option<Matcher>, accessor: Option<Callback>) -> Self {
        self.then(Duplicate::new(matcher, accessor))
    }

    #[must_use]
    pub fn explode<I, T>(&self, separators: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.then(explode(values_of(separators)))
    }

    /// Keep entries for which any predicate holds; without predicates,
    /// keep truthy values.
    #[must_use]
    pub fn filter(&self, predicates: Vec<Predicate>) -> Self {
        self.then(Filter::new(predicates))
    }

    #[must_use]
    pub fn filter_by<F>(&self, f: F) -> Self
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        self.filter(vec![predicate(f)])
    }

    #[must_use]
    pub fn try_filter<F>(&self, f: F) -> Self
    where
        F: Fn(&Value, &Value) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        self.filter(vec![try_predicate(f)])
    }

    #[must_use]
    pub fn first(&self) -> Self {
        self.then(Limit::first())
    }

    #[must_use]
    pub fn head(&self) -> Self {
        self.first()
    }

    #[must_use]
    pub fn flat_map<F>(&self, f: F) -> Self
    where
        F: Fn(&Value, &Value) -> Value + Send + Sync + 'static,
    {
        self.then(FlatMap::new(callback(f)))
    }

    /// `None` flattens every level.
    #[must_use]
    pub fn flatten(&self, depth: Option<usize>) -> Self {
        self.then(Flatten::new(depth))
    }

    #[must_use]
    pub fn flip(&self) -> Self {
        self.then(Flip)
    }

    /// A one-entry collection holding the left fold of the values.
    #[must_use]
    pub fn fold_left(&self, f: Reducer, initial: impl Into<Value>) -> Self {
        self.then(fold_left(f, initial.into()))
    }

    #[must_use]
    pub fn fold_left1(&self, f: Reducer) -> Self {
        self.then(fold_left1(f))
    }

    #[must_use]
    pub fn fold_right(&self, f: Reducer, initial: impl Into<Value>) -> Self {
        self.then(fold_right(f, initial.into()))
    }

    #[must_use]
    pub fn fold_right1(&self, f: Reducer) -> Self {
        self.then(fold_right1(f))
    }

    #[must_use]
    pub fn forget<I, T>(&self, keys: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.then(Membership::forget(values_of(keys)))
    }

    #[must_use]
    pub fn frequency(&self) -> Self {
        self.then(Frequency)
    }

    #[must_use]
    pub fn get(&self, key: impl Into<Value>, default: impl Into<Value>) -> Self {
        self.then(Get::new(key.into(), default.into()))
    }

    #[must_use]
    pub fn group(&self) -> Self {
        self.then(Group)
    }

    /// Group by `f(value, key)`, or by entry key with `None`.
    #[must_use]
    pub fn group_by(&self, f: Option<Callback>) -> Self {
        self.then(GroupBy::new(f))
    }

    #[must_use]
    pub fn if_then_else(&self, condition: Predicate, then: Callback, otherwise: Option<Callback>) -> Self {
        self.then(IfThenElse::new(condition, then, otherwise))
    }

    #[must_use]
    pub fn init(&self) -> Self {
        self.then(Init)
    }

    #[must_use]
    pub fn inits(&self) -> Self {
        self.then(Inits)
    }

    #[must_use]
    pub fn intersect<I, T>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.then(Membership::intersect(values_of(values)))
    }

    #[must_use]
    pub fn intersect_keys<I, T>(&self, keys: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.then(Membership::intersect_keys(values_of(keys)))
    }

    pub fn intersperse(&self, value: impl Into<Value>, every: i64, start_at: i64) -> Result<Self> {
        Ok(self.then(Intersperse::new(value.into(), every, start_at)?))
    }

    #[must_use]
    pub fn keys(&self) -> Self {
        self.then(Keys)
    }

    #[must_use]
    pub fn last(&self) -> Self {
        self.then(Last)
    }

    /// `count == -1` is unbounded.
    pub fn limit(&self, count: i64, offset: usize) -> Result<Self> {
        Ok(self.then(Limit::new(count, offset)?))
    }

    #[must_use]
    pub fn lines(&self) -> Self {
        self.then(lines())
    }

    #[must_use]
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(&Value, &Value) -> Value + Send + Sync + 'static,
    {
        self.map_n(vec![callback(f)])
    }

    #[must_use]
    pub fn try_map<F>(&self, f: F) -> Self
    where
        F: Fn(&Value, &Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.map_n(vec![try_callback(f)])
    }

    /// Apply the callbacks in order to every value.
    #[must_use]
    pub fn map_n(&self, fns: Vec<Callback>) -> Self {
        self.then(Map::new(fns))
    }

    #[must_use]
    pub fn merge<I>(&self, others: I) -> Self
    where
        I: IntoIterator<Item = Collection>,
    {
        self.then(Merge::new(sources_of(others)))
    }

    #[must_use]
    pub fn normalize(&self) -> Self {
        self.then(Normalize)
    }

    pub fn nth(&self, step: usize, offset: usize) -> Result<Self> {
        Ok(self.then(Nth::new(step, offset)?))
    }

    #[must_use]
    pub fn pack(&self) -> Self {
        self.then(Pack)
    }

    #[must_use]
    pub fn pad(&self, size: usize, value: impl Into<Value>) -> Self {
        self.then(Pad::new(size, value.into()))
    }

    #[must_use]
    pub fn pair(&self) -> Self {
        self.then(Pair)
    }

    #[must_use]
    pub fn partition(&self, predicates: Vec<Predicate>) -> Self {
        self.then(Partition::new(predicates))
    }

    #[must_use]
    pub fn permutate(&self) -> Self {
        self.then(Permutate)
    }

    #[must_use]
    pub fn pluck(&self, path: impl Into<Value>, default: impl Into<Value>) -> Self {
        self.then(Pluck::new(path.into(), default.into()))
    }

    #[must_use]
    pub fn product<I>(&self, others: I) -> Self
    where
        I: IntoIterator<Item = Collection>,
    {
        self.then(Product::new(sources_of(others)))
    }

    pub fn random(&self, size: i64, seed: u64) -> Result<Self> {
        Ok(self.then(Random::new(size, seed)?))
    }

    /// Every intermediate accumulator, one per entry.
    #[must_use]
    pub fn reduction(&self, f: Reducer, initial: impl Into<Value>) -> Self {
        self.then(Reduction::new(f, initial.into()))
    }

    #[must_use]
    pub fn reject(&self, predicates: Vec<Predicate>) -> Self {
        self.then(Reject::new(predicates))
    }

    #[must_use]
    pub fn reverse(&self) -> Self {
        self.then(Reverse)
    }

    pub fn rsample(&self, probability: f64, seed: u64) -> Result<Self> {
        Ok(self.then(Rsample::new(probability, seed)?))
    }

    /// Rescale numeric values from `[lower, upper]` to
    /// `[wanted_lower, wanted_upper]`, logarithmically when `base` is set.
    pub fn scale(
        &self,
        lower: f64,
        upper: f64,
        wanted_lower: f64,
        wanted_upper: f64,
        base: Option<f64>,
    ) -> Result<Self> {
        Ok(self.then(Scale::new(lower, upper, wanted_lower, wanted_upper, base)?))
    }

    #[must_use]
    pub fn scan_left(&self, f: Reducer, initial: impl Into<Value>) -> Self {
        self.then(scan_left(f, initial.into()))
    }

    #[must_use]
    pub fn scan_left1(&self, f: Reducer) -> Self {
        self.then(ScanLeft1::new(f))
    }

    #[must_use]
    pub fn scan_right(&self, f: Reducer, initial: impl Into<Value>) -> Self {
        self.then(scan_right(f, initial.into()))
    }

    #[must_use]
    pub fn scan_right1(&self, f: Reducer) -> Self {
        self.then(scan_right1(f))
    }

    #[must_use]
    pub fn shuffle(&self, seed: u64) -> Self {
        self.then(Shuffle::new(seed))
    }

    #[must_use]
    pub fn since(&self, predicates: Vec<Predicate>) -> Self {
        self.then(Boundary::new(BoundaryKind::Since, predicates))
    }

    /// Skip the sum of `counts` entries.
    #[must_use]
    pub fn skip(&self, counts: &[usize]) -> Self {
        self.then(Skip::new(counts))
    }

    #[must_use]
    pub fn slice(&self, offset: usize, length: Option<usize>) -> Self {
        self.then(Slice::new(offset, length))
    }

    #[must_use]
    pub fn sort(&self, mode: SortMode, comparator: Option<Comparator>) -> Self {
        self.then(Sort::new(mode, comparator))
    }

    #[must_use]
    pub fn span(&self, predicates: Vec<Predicate>) -> Self {
        self.then(Span::new(predicates))
    }

    #[must_use]
    pub fn split(&self, mode: SplitMode, predicates: Vec<Predicate>) -> Self {
        self.then(Split::new(mode, predicates))
    }

    #[must_use]
    pub fn squash(&self) -> Self {
        self.then(Squash)
    }

    #[must_use]
    pub fn strict(&self, type_fn: Option<Callback>) -> Self {
        self.then(Strict::new(type_fn))
    }

    /// Everything but the first entry.
    #[must_use]
    pub fn tail(&self) -> Self {
        self.skip(&[1])
    }

    #[must_use]
    pub fn tails(&self) -> Self {
        self.then(Tails)
    }

    #[must_use]
    pub fn take_while(&self, predicates: Vec<Predicate>) -> Self {
        self.then(Boundary::new(BoundaryKind::TakeWhile, predicates))
    }

    #[must_use]
    pub fn transpose(&self) -> Self {
        self.then(Transpose)
    }

    #[must_use]
    pub fn unpack(&self) -> Self {
        self.then(Unpack)
    }

    #[must_use]
    pub fn unpair(&self) -> Self {
        self.then(Unpair)
    }

    /// Up to and including the first entry where any predicate holds.
    #[must_use]
    pub fn until(&self, predicates: Vec<Predicate>) -> Self {
        self.then(Boundary::new(BoundaryKind::Until, predicates))
    }

    #[must_use]
    pub fn unwindow(&self) -> Self {
        self.then(Unwindow)
    }

    #[must_use]
    pub fn unwrap(&self) -> Self {
        self.then(Unwrap)
    }

    #[must_use]
    pub fn unzip(&self) -> Self {
        self.then(Unzip)
    }

    /// Route the whole collection through `then` or `otherwise`, deciding
    /// when the first entry is pulled.
    #[must_use]
    pub fn when(&self, condition: Condition, then: Pipe, otherwise: Option<Pipe>) -> Self {
        self.then(When::new(condition, then, otherwise))
    }

    /// `size == -1` accumulates every value.
    pub fn window(&self, size: i64) -> Result<Self> {
        Ok(self.then(Window::new(size)?))
    }

    #[must_use]
    pub fn words(&self) -> Self {
        self.then(words())
    }

    #[must_use]
    pub fn wrap(&self) -> Self {
        self.then(Wrap)
    }

    #[must_use]
    pub fn zip<I>(&self, others: I) -> Self
    where
        I: IntoIterator<Item = Collection>,
    {
        self.then(Zip::new(sources_of(others)))
    }
}
