//! Candidate site discovery.
//!
//! A dynamic call site is a candidate when its bootstrap method is declared by
//! the class that contains the site and has the probed bootstrap descriptor.
//! Everything else is skipped silently. The scan is read-only, so the
//! pool-wide variants can fan out over classes with `rayon`.

use rayon::prelude::*;

use crate::{
    deobfuscation::IndyConfig,
    model::{ClassNode, ClassPool, InsnId, InvokeDynamicInsn, JvmType, MethodNode},
    Result,
};

/// A dynamic call site selected for probing.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSite {
    /// Stable id of the `invokedynamic` instruction.
    pub insn_id: InsnId,
    /// Position of the instruction when it was found.
    pub index: usize,
    /// The dynamic call site.
    pub indy: InvokeDynamicInsn,
}

impl CandidateSite {
    /// Declared argument types of the call site.
    ///
    /// # Errors
    ///
    /// Returns an error if the call site descriptor is invalid.
    pub fn arg_types(&self) -> Result<Vec<JvmType>> {
        Ok(self.indy.descriptor()?.params)
    }
}

/// Returns true if `indy`, found in class `class_name`, should be probed.
#[must_use]
pub fn is_candidate(class_name: &str, indy: &InvokeDynamicInsn, config: &IndyConfig) -> bool {
    indy.bsm.owner == class_name && indy.bsm.desc == config.bootstrap_desc
}

/// Collects the candidate sites of one method, in program order.
#[must_use]
pub fn find_candidates(
    class: &ClassNode,
    method: &MethodNode,
    config: &IndyConfig,
) -> Vec<CandidateSite> {
    method
        .instructions
        .iter()
        .enumerate()
        .filter_map(|(index, (insn_id, insn))| {
            let indy = insn.as_invoke_dynamic()?;
            is_candidate(&class.name, indy, config).then(|| CandidateSite {
                insn_id,
                index,
                indy: indy.clone(),
            })
        })
        .collect()
}

fn class_has_candidates(class: &ClassNode, config: &IndyConfig) -> bool {
    class.methods.iter().any(|method| {
        method
            .instructions
            .insns()
            .filter_map(|insn| insn.as_invoke_dynamic())
            .any(|indy| is_candidate(&class.name, indy, config))
    })
}

fn class_candidate_count(class: &ClassNode, config: &IndyConfig) -> usize {
    class
        .methods
        .iter()
        .map(|method| find_candidates(class, method, config).len())
        .sum()
}

/// Internal names of the classes that contain at least one candidate site,
/// in pool order.
#[must_use]
pub fn classes_with_candidates(pool: &ClassPool, config: &IndyConfig) -> Vec<String> {
    if config.parallel_scan {
        pool.classes()
            .par_iter()
            .filter(|class| class_has_candidates(class, config))
            .map(|class| class.name.clone())
            .collect()
    } else {
        pool.classes()
            .iter()
            .filter(|class| class_has_candidates(class, config))
            .map(|class| class.name.clone())
            .collect()
    }
}

/// Number of candidate sites in the whole pool.
#[must_use]
pub fn count_candidates(pool: &ClassPool, config: &IndyConfig) -> usize {
    if config.parallel_scan {
        pool.classes()
            .par_iter()
            .map(|class| class_candidate_count(class, config))
            .sum()
    } else {
        pool.classes()
            .iter()
            .map(|class| class_candidate_count(class, config))
            .sum()
    }
}
