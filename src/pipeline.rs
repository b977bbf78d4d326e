//! Immutable pipelines: a source plus an ordered list of stages.
//!
//! Appending a stage returns a new [`Pipeline`] and never touches the source.
//! Stages are shared behind `Arc`, so cloning a pipeline is cheap and the
//! same stage value can sit in many pipelines at once.

use crate::operation::Operation;
use crate::runner::compose;
use crate::sequence::Sequence;
use crate::source::Source;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct Pipeline {
    source: Arc<dyn Source>,
    stages: Vec<Arc<dyn Operation>>,
}

impl Pipeline {
    pub fn new(source: impl Source + 'static) -> Self {
        Self::from_shared(Arc::new(source))
    }

    pub fn from_shared(source: Arc<dyn Source>) -> Self {
        Self {
            source,
            stages: Vec::new(),
        }
    }

    /// A new pipeline with `op` appended. `self` is left untouched.
    #[must_use]
    pub fn then(&self, op: Arc<dyn Operation>) -> Self {
        let mut stages = Vec::with_capacity(self.stages.len() + 1);
        stages.extend(self.stages.iter().cloned());
        stages.push(op);
        Self {
            source: Arc::clone(&self.source),
            stages,
        }
    }

    pub fn stages(&self) -> &[Arc<dyn Operation>] {
        &self.stages
    }

    pub fn source(&self) -> &Arc<dyn Source> {
        &self.source
    }

    /// Open the source and thread it through every stage, left to right.
    /// Nothing is read until the returned sequence is pulled.
    pub fn open(&self) -> Sequence {
        compose(&self.stages, self.source.open())
    }

    /// Describe the stages without running anything.
    #[must_use]
    pub fn explain(&self) -> Explanation {
        let steps = self
            .stages
            .iter()
            .enumerate()
            .map(|(i, op)| ExplainStep {
                step: i + 1,
                name: op.name(),
                buffering: op.buffering(),
            })
            .collect();
        Explanation {
            source: self.source.describe(),
            steps,
        }
    }
}

/// One stage in an [`Explanation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplainStep {
    pub step: usize,
    pub name: &'static str,
    /// `true` when the stage drains its input before emitting.
    pub buffering: bool,
}

/// Human-readable listing of a pipeline.
#[derive(Debug, Clone)]
pub struct Explanation {
    pub source: String,
    pub steps: Vec<ExplainStep>,
}

impl Explanation {
    pub fn buffering_stages(&self) -> usize {
        self.steps.iter().filter(|s| s.buffering).count()
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "┌─ Pipeline ─────────────────────────────")?;
        writeln!(f, "│ source: {}", self.source)?;
        for s in &self.steps {
            let marker = if s.buffering { " (BUFFERING)" } else { "" };
            writeln!(f, "│ {:>3}. {}{marker}", s.step, s.name)?;
        }
        write!(f, "└────────────────────────────────────────")
    }
}

/// Several stages bundled into one, applied in order.
///
/// `Pipe` is itself an [`Operation`], so stored pipes nest and compose
/// associatively: `pipe(a, pipe(b, c))` behaves like `pipe(pipe(a, b), c)`.
#[derive(Clone, Default)]
pub struct Pipe {
    stages: Vec<Arc<dyn Operation>>,
}

impl Pipe {
    pub fn new(stages: Vec<Arc<dyn Operation>>) -> Self {
        Self { stages }
    }

    #[must_use]
    pub fn then(mut self, op: impl Operation + 'static) -> Self {
        self.stages.push(Arc::new(op));
        self
    }
}

impl Operation for Pipe {
    fn name(&self) -> &'static str {
        "pipe"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        compose(&self.stages, input)
    }

    fn buffering(&self) -> bool {
        self.stages.iter().any(|s| s.buffering())
    }
}
