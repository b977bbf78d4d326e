//! Instrumented sources for laziness and failure tests.

use crate::error::{Error, Result};
use crate::io::ByteSource;
use crate::sequence::{Sequence, indexed};
use crate::source::Source;
use crate::value::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Wraps a list of values and counts opens and pulls.
///
/// Clones share their counters, so a clone can be handed to a collection
/// while the test keeps the original to read the numbers.
#[derive(Clone)]
pub struct ProbeSource {
    values: Arc<Vec<Value>>,
    opens: Arc<AtomicUsize>,
    pulls: Arc<AtomicUsize>,
}

impl ProbeSource {
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values: Arc::new(values),
            opens: Arc::new(AtomicUsize::new(0)),
            pulls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Entries pulled across every cursor.
    pub fn pulls(&self) -> usize {
        self.pulls.load(Ordering::SeqCst)
    }
}

impl Source for ProbeSource {
    fn open(&self) -> Sequence {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let pulls = Arc::clone(&self.pulls);
        Box::new(indexed(self.values.to_vec()).inspect(move |_| {
            pulls.fetch_add(1, Ordering::SeqCst);
        }))
    }

    fn describe(&self) -> String {
        format!("probe of {} values", self.values.len())
    }
}

/// Serves `data` in one chunk, then fails every read.
pub struct FailingByteSource {
    data: Option<Vec<u8>>,
    closed: Arc<AtomicUsize>,
}

impl FailingByteSource {
    pub fn new(data: &[u8]) -> Self {
        Self {
            data: Some(data.to_vec()),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Counter bumped on every `close`.
    pub fn close_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.closed)
    }
}

impl ByteSource for FailingByteSource {
    fn read_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        match self.data.take() {
            Some(chunk) => Ok(Some(chunk)),
            None => Err(Error::resource(
                "probe read failed",
                Some(std::io::Error::other("injected failure")),
            )),
        }
    }

    fn close(&mut self) -> Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
