//! Testing utilities for ironseq pipelines.
//!
//! - **Assertions**: compare a collection's entries or values with expected
//!   data, with readable failure messages.
//! - **Probes**: sources that count how often they are opened and pulled,
//!   for checking laziness, and a byte source that fails on demand.
//! - **Fixtures**: short constructors for keyed test data.
//!
//! # Quick Start
//!
//! ```
//! use ironseq::Collection;
//! use ironseq::testing::*;
//!
//! # fn main() -> ironseq::Result<()> {
//! let evens = Collection::from_iterable(ints(&[1, 2, 3, 4]))
//!     .filter_by(|v, _| v.as_i64().is_some_and(|n| n % 2 == 0));
//! assert_entries_equal(&evens, &[kv(1, 2), kv(3, 4)])?;
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod fixtures;
pub mod probe;

pub use assertions::*;
pub use fixtures::*;
pub use probe::*;
