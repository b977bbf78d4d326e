//! Stage implementations, one file per family.
//!
//! Every struct here implements [`Operation`](crate::Operation). Primitive
//! stages (filter, map, slice, flatten, pack, chunk, scan, sort, merge) are
//! written directly against the iterator protocol; derived stages are either
//! small state machines or fixed [`Pipe`](crate::Pipe)s of primitives.
//!
//! Buffering stages drain their input on the *first pull*, never when they
//! are applied, so a chain stays lazy until it is consumed.

pub mod chunk;
pub mod distinct;
pub mod filter;
pub mod flatten;
pub mod inspect;
pub mod map;
pub mod merge;
pub mod pack;
pub mod partition;
pub mod product;
pub mod random;
pub mod scan;
pub mod slice;
pub mod sort;
pub mod strings;
pub mod window;
pub mod zip;

pub use chunk::{Chunk, Split, SplitMode, explode};
pub use distinct::{Distinct, Duplicate};
pub use filter::{Filter, Membership, Reject, compact};
pub use flatten::{Collapse, Cycle, FlatMap, Flatten};
pub use inspect::{Apply, Condition, Dump, DumpSink, Squash, Strict, When};
pub use map::{Associate, Column, IfThenElse, Map, Pluck, Scale};
pub use merge::{Append, Intersperse, Merge, Pad, Prepend};
pub use pack::{Combine, Flip, Keys, Normalize, Pack, Pair, Unpack, Unpair, Unwrap, Wrap};
pub use partition::{Frequency, Group, GroupBy, Partition, Span};
pub use product::{Combinate, Permutate, Product};
pub use random::{Random, Rsample, Shuffle};
pub use scan::{Reduction, ScanLeft1, fold_left, fold_left1, fold_right, fold_right1, scan_left, scan_right, scan_right1};
pub use slice::{Boundary, BoundaryKind, Get, Init, Last, Limit, Nth, Skip, Slice};
pub use sort::{Reverse, Sort, SortMode};
pub use strings::{lines, words};
pub use window::{Inits, Tails, Unwindow, Window};
pub use zip::{Transpose, Unzip, Zip};

use crate::error::Result;
use crate::sequence::Entry;

/// Pass upstream errors through untouched while applying `f` to entries.
pub(crate) fn on_entry<F>(item: Result<Entry>, f: F) -> Option<Result<Entry>>
where
    F: FnOnce(Entry) -> Result<Option<Entry>>,
{
    match item {
        Ok(entry) => f(entry).transpose(),
        Err(e) => Some(Err(e)),
    }
}
