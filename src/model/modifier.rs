//! Deferred instruction replacement.

use std::collections::BTreeMap;

use crate::model::{Insn, InsnId, InsnList};

/// Collects instruction replacements for one method and applies them at once.
///
/// Queuing changes while a method is still being scanned keeps the instruction
/// list stable for the scan. Queuing a second replacement for the same
/// instruction overrides the first.
#[derive(Debug, Default, Clone)]
pub struct InstructionModifier {
    replacements: BTreeMap<InsnId, Insn>,
}

impl InstructionModifier {
    /// Creates an empty modifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues replacing the instruction `id` with `insn`.
    pub fn replace(&mut self, id: InsnId, insn: Insn) {
        self.replacements.insert(id, insn);
    }

    /// Number of queued replacements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.replacements.len()
    }

    /// Returns `true` if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }

    /// Applies all queued replacements and returns how many took effect.
    ///
    /// Replacements whose instruction is no longer part of `list` are dropped.
    pub fn apply(self, list: &mut InsnList) -> usize {
        self.replacements
            .into_iter()
            .filter_map(|(id, insn)| list.replace(id, insn))
            .count()
    }
}
