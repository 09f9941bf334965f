//! Instruction lists with stable instruction identities.
//!
//! A rewriting pass discovers instructions in one pass and replaces them in a
//! later one, so positions alone are not a usable handle: they shift whenever
//! anything is inserted or removed. Every instruction pushed into an
//! [`InsnList`] therefore receives an [`InsnId`] that stays valid for the
//! lifetime of the list, across replacements.

use std::fmt;

use crate::model::Insn;

/// Identity of an instruction inside one [`InsnList`].
///
/// Ids are only meaningful for the list that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InsnId(u32);

impl InsnId {
    /// Returns the raw id value.
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for InsnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An ordered list of instructions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsnList {
    entries: Vec<(InsnId, Insn)>,
    next_id: u32,
}

impl InsnList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an instruction and returns its id.
    pub fn push(&mut self, insn: Insn) -> InsnId {
        let id = InsnId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, insn));
        id
    }

    /// Number of instructions in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the list holds no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(id, instruction)` pairs in program order.
    pub fn iter(&self) -> impl Iterator<Item = (InsnId, &Insn)> {
        self.entries.iter().map(|(id, insn)| (*id, insn))
    }

    /// Iterates over the instructions in program order.
    pub fn insns(&self) -> impl Iterator<Item = &Insn> {
        self.entries.iter().map(|(_, insn)| insn)
    }

    /// Returns the instruction with the given id.
    #[must_use]
    pub fn get(&self, id: InsnId) -> Option<&Insn> {
        self.position(id).map(|pos| &self.entries[pos].1)
    }

    /// Returns the current position of the instruction with the given id.
    #[must_use]
    pub fn position(&self, id: InsnId) -> Option<usize> {
        self.entries.iter().position(|(entry_id, _)| *entry_id == id)
    }

    /// Replaces the instruction with the given id in place.
    ///
    /// The replacement keeps the id of the instruction it replaces. Returns the
    /// previous instruction, or `None` (leaving the list untouched) if the id
    /// is unknown.
    pub fn replace(&mut self, id: InsnId, insn: Insn) -> Option<Insn> {
        let pos = self.position(id)?;
        Some(std::mem::replace(&mut self.entries[pos].1, insn))
    }
}

impl FromIterator<Insn> for InsnList {
    fn from_iter<I: IntoIterator<Item = Insn>>(iter: I) -> Self {
        let mut list = InsnList::new();
        for insn in iter {
            list.push(insn);
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Opcode;

    #[test]
    fn test_ids_are_stable_across_replace() {
        let mut list = InsnList::new();
        let a = list.push(Insn::Simple(Opcode::Iconst0));
        let b = list.push(Insn::Simple(Opcode::Pop));
        let c = list.push(Insn::Simple(Opcode::Return));

        let old = list.replace(b, Insn::Simple(Opcode::Nop));
        assert_eq!(old, Some(Insn::Simple(Opcode::Pop)));
        assert_eq!(list.position(a), Some(0));
        assert_eq!(list.position(b), Some(1));
        assert_eq!(list.position(c), Some(2));
        assert_eq!(list.get(b), Some(&Insn::Simple(Opcode::Nop)));
    }

    #[test]
    fn test_replace_unknown_id() {
        let mut list: InsnList = [Insn::Simple(Opcode::Return)].into_iter().collect();
        let mut other = InsnList::new();
        other.push(Insn::Simple(Opcode::Nop));
        let unknown = other.push(Insn::Simple(Opcode::Nop));
        assert_eq!(unknown.value(), 1);

        assert_eq!(list.replace(unknown, Insn::Simple(Opcode::Nop)), None);
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(unknown), None);
    }

    #[test]
    fn test_iteration_order() {
        let list: InsnList = [
            Insn::Simple(Opcode::Iconst1),
            Insn::Simple(Opcode::Iconst2),
            Insn::Simple(Opcode::Iadd),
        ]
        .into_iter()
        .collect();
        let ops: Vec<_> = list.insns().map(Insn::opcode).collect();
        assert_eq!(ops, vec![Opcode::Iconst1, Opcode::Iconst2, Opcode::Iadd]);
        assert!(!list.is_empty());
    }
}
