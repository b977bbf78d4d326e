//! # ironseq
//!
//! A **lazy, composable sequence library** for Rust. A [`Collection`] wraps a
//! restartable [`Source`] (a list, a callable, a string, a file, a range)
//! behind one key/value iteration contract and exposes a large catalogue of
//! chainable operations: filter, map, window, partition, zip, sort, fold and
//! many more.
//!
//! ## Key Features
//!
//! - **Lazy** - chain methods only record stages; nothing is pulled until a
//!   terminal operation or an iterator asks for it
//! - **Immutable** - every chain method returns a new collection and never
//!   touches the one it was called on
//! - **Re-iterable** - each traversal opens a fresh cursor over the source
//! - **Key-aware** - entries are `(key, value)` pairs; keys survive
//!   filtering and may repeat
//! - **Composable** - operations are values that can be stored in a [`Pipe`]
//!   and reused
//! - **Infinite sources** - `range`, `unfold` and `cycle` are fine as long as
//!   something bounds them before a full traversal
//! - **Order-preserving parallel map** - `async_map` runs on a `rayon` pool
//!
//! ## Quick Start
//!
//! ```
//! use ironseq::*;
//!
//! # fn main() -> ironseq::Result<()> {
//! let evens = Collection::from_iterable([1, 2, 3, 4])
//!     .filter_by(|v, _| v.as_i64().is_some_and(|n| n % 2 == 0));
//!
//! // Keys are preserved...
//! assert_eq!(evens.all()?, Value::map([(1, 2), (3, 4)]));
//! // ...until they are normalized.
//! assert_eq!(evens.normalize().all()?, Value::list([2, 4]));
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Value and Entry
//!
//! Keys and values are [`Value`]s, a dynamic union of null, booleans,
//! numbers, strings, lists, maps and opaque handles. An [`Entry`] is one
//! `(key, value)` pair and a [`Sequence`] is a boxed iterator of
//! `Result<Entry>`.
//!
//! ### Operations and pipelines
//!
//! An [`Operation`] maps one sequence to another. A [`Pipeline`] is a source
//! plus an ordered list of operations; opening it folds the stages over a
//! fresh source cursor. Stages that must see their whole input (sort,
//! reverse, partition...) drain it on the *first pull*, not when they are
//! added. [`Collection::explain`] lists the stages and marks the buffering
//! ones.
//!
//! ### Terminal operations
//!
//! `all`, `count`, `reduce`, `contains`, `equals`, `implode` and friends
//! consume the collection and return a plain value. The first failing entry
//! stops them and its [`Error`] is returned.
//!
//! ## Error Handling
//!
//! Invalid parameters are reported by the chain method itself
//! ([`Error::Configuration`]). Resource failures, bounds violations and
//! callback errors surface at pull time. Fallible callbacks return
//! `anyhow::Result`; their error is carried unchanged in [`Error::Callback`].
//!
//! ## Execution Modes
//!
//! [`Runner`] configures `async_map`: [`ExecMode::Sequential`] or
//! [`ExecMode::Parallel`] (feature `parallel`, on by default). Results are
//! always emitted in input order.
//!
//! ## Feature Flags
//!
//! - `parallel` (default) - rayon-backed `async_map`

pub mod cache;
pub mod collection;
pub mod error;
pub mod io;
pub mod operation;
pub mod ops;
pub mod pipeline;
pub mod runner;
pub mod sequence;
pub mod source;
pub mod testing;
pub mod transformations;
pub mod value;

pub use cache::{CacheStore, MemoryCache};
pub use collection::Collection;
pub use error::{Error, Result};
pub use operation::{
    Callback, Comparator, Matcher, Operation, Predicate, Reducer, callback, comparator, matcher,
    natural_order, predicate, reducer, strict_equality, truthy, try_callback, try_predicate,
    try_reducer,
};
pub use ops::{Condition, DumpSink, SortMode, SplitMode};
pub use pipeline::{ExplainStep, Explanation, Pipe, Pipeline};
pub use runner::{ExecMode, Runner};
pub use sequence::{Entry, Sequence};
pub use source::{
    CallableSource, EmptySource, IterableSource, RangeSource, ResourceSource, Source, StringSource,
    TimesSource, UnfoldFn, UnfoldSource,
};
pub use value::{Handle, Value};
