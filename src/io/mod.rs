//! Byte-level input and JSON export.
//!
//! - [`ByteSource`] is the minimal readable-byte contract resource-backed
//!   sequences consume: `read_chunk` until `None`, then `close`.
//! - [`ReaderSource`] adapts any [`std::io::Read`] (files included).
//! - [`Utf8Chars`] decodes a byte source into characters lazily, one chunk at
//!   a time, and releases the source on every exit path.
//! - [`write_json`] / [`to_json`] export materialized values.

pub mod json;
pub mod resource;

pub use json::{to_json, to_json_string, write_json};
pub use resource::{ByteSource, ReaderSource, Utf8Chars, open_file};
