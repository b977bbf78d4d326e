//! Seeded randomised stages. Each cursor builds its own `StdRng` from the
//! configured seed, so the same pipeline re-opened yields the same output.

use crate::error::{Error, Result};
use crate::operation::Operation;
use crate::sequence::{Sequence, buffered, failed, sequence};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Every entry, keys kept, in a seeded random order.
#[derive(Clone, Copy, Debug)]
pub struct Shuffle {
    seed: u64,
}

impl Shuffle {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Operation for Shuffle {
    fn name(&self) -> &'static str {
        "shuffle"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let seed = self.seed;
        buffered(input, move |mut entries| {
            entries.shuffle(&mut StdRng::seed_from_u64(seed));
            sequence(entries)
        })
    }

    fn buffering(&self) -> bool {
        true
    }
}

/// `size` entries drawn without replacement. Asking for none, or for more
/// than the input holds, is a bounds error at the first pull.
#[derive(Clone, Copy, Debug)]
pub struct Random {
    size: usize,
    seed: u64,
}

impl Random {
    pub fn new(size: i64, seed: u64) -> Result<Self> {
        let size = usize::try_from(size)
            .map_err(|_| Error::configuration("random", format!("invalid sample size {size}")))?;
        Ok(Self { size, seed })
    }
}

impl Operation for Random {
    fn name(&self) -> &'static str {
        "random"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let Self { size, seed } = *self;
        buffered(input, move |mut entries| {
            if size == 0 || size > entries.len() {
                return failed(Error::bounds(
                    "random",
                    format!("cannot draw {size} entries out of {}", entries.len()),
                ));
            }
            entries.shuffle(&mut StdRng::seed_from_u64(seed));
            entries.truncate(size);
            sequence(entries)
        })
    }

    fn buffering(&self) -> bool {
        true
    }
}

/// Keep each entry independently with the given probability. Streams.
#[derive(Clone, Copy, Debug)]
pub struct Rsample {
    probability: f64,
    seed: u64,
}

impl Rsample {
    pub fn new(probability: f64, seed: u64) -> Result<Self> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(Error::configuration(
                "rsample",
                format!("probability {probability} is outside [0, 1]"),
            ));
        }
        Ok(Self { probability, seed })
    }
}

impl Operation for Rsample {
    fn name(&self) -> &'static str {
        "rsample"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let p = self.probability;
        let mut rng = StdRng::seed_from_u64(self.seed);
        Box::new(input.filter(move |item| item.is_err() || rng.gen_bool(p)))
    }
}
