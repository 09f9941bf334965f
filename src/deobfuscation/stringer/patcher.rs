//! Replacement of dynamic call sites by direct calls.

use crate::{
    deobfuscation::stringer::{CandidateSite, ResolvedTarget},
    model::{Insn, InstructionModifier, MethodInsn},
};

/// Builds the direct call that replaces a dynamic call site.
#[must_use]
pub fn direct_call(target: &ResolvedTarget) -> Insn {
    Insn::Method(MethodInsn {
        kind: target.kind.invoke_kind(),
        owner: target.owner.clone(),
        name: target.name.clone(),
        desc: target.desc.clone(),
        interface: target.kind.is_interface(),
    })
}

/// Queues the replacement of `site` by a call to `target`.
pub fn queue(modifier: &mut InstructionModifier, site: &CandidateSite, target: &ResolvedTarget) {
    modifier.replace(site.insn_id, direct_call(target));
}
