//! Transformer trait and run statistics.

use std::fmt;

use crate::{deobfuscation::EventLog, model::ClassPool, Result};

/// A whole-pool bytecode transformation.
///
/// Transformers mutate the [`ClassPool`] in place and report per-item
/// results to the [`EventLog`]. Recoverable per-item failures are logged, not
/// returned; an `Err` means the transformer could not run at all.
pub trait Transformer {
    /// Unique name for logging and debugging.
    fn name(&self) -> &'static str;

    /// Human-readable description of what this transformer does.
    fn description(&self) -> &'static str {
        ""
    }

    /// Runs the transformation over every class in `pool`.
    ///
    /// # Errors
    ///
    /// Returns an error if the transformer cannot be set up.
    fn transform(&mut self, pool: &mut ClassPool, events: &EventLog) -> Result<TransformStats>;
}

/// Counters collected during one [`Transformer::transform`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformStats {
    /// Classes in the pool.
    pub classes_scanned: usize,
    /// Candidate sites found.
    pub candidates: usize,
    /// Sites rewritten into direct calls.
    pub decrypted: usize,
    /// Sites abandoned because interpreted code threw.
    pub exceptions: usize,
    /// Sites abandoned because the interpreter faulted.
    pub faults: usize,
    /// Sites abandoned because the capture did not have the expected shape.
    pub malformed: usize,
    /// Sites abandoned because the recovered member does not exist.
    pub unresolved: usize,
    /// Methods that received at least one rewrite.
    pub methods_patched: usize,
}

impl TransformStats {
    /// Total number of abandoned sites.
    #[must_use]
    pub fn abandoned(&self) -> usize {
        self.exceptions + self.faults + self.malformed + self.unresolved
    }

    /// Returns true if nothing was rewritten.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.decrypted == 0
    }
}

impl fmt::Display for TransformStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} classes, {} candidates, {} decrypted, {} abandoned, {} methods patched",
            self.classes_scanned,
            self.candidates,
            self.decrypted,
            self.abandoned(),
            self.methods_patched
        )
    }
}
