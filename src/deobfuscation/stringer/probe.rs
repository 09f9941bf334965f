//! Probe method synthesis and attachment.
//!
//! A probe is a throwaway static method that replays one dynamic call site in
//! isolation: it pushes a zero value for every declared argument, re-issues a
//! clone of the `invokedynamic`, and returns. Executing it forces the
//! bootstrap method to run without touching the method the site came from.

use std::ops::Deref;

use crate::{
    deobfuscation::stringer::CandidateSite,
    model::{ClassNode, ClassPool, Insn, InsnList, MethodAccessFlags, MethodNode, Opcode},
    Error, Result,
};

/// Descriptor of every probe method.
pub const PROBE_DESC: &str = "()V";

/// Returns the name for the next probe of a method.
///
/// Names are `<prefix><n>` with `n` counting up from `counter`. Names already
/// declared by `class` are skipped. `counter` is advanced past the returned
/// name.
pub fn next_probe_name(class: &ClassNode, prefix: &str, counter: &mut usize) -> String {
    loop {
        let name = format!("{}{}", prefix, counter);
        *counter += 1;
        if !class.has_method_named(&name) {
            return name;
        }
    }
}

/// Builds the probe method for `site`.
///
/// # Errors
///
/// Returns an error if the site descriptor cannot be parsed.
pub fn build_probe(site: &CandidateSite, name: impl Into<String>) -> Result<MethodNode> {
    let mut body = InsnList::new();
    for ty in site.arg_types()? {
        let zero = ty.zero_insn().ok_or_else(|| {
            malformed_error!("call site descriptor '{}' has a void argument", site.indy.desc)
        })?;
        body.push(zero);
    }
    body.push(Insn::InvokeDynamic(site.indy.clone()));
    body.push(Insn::Simple(Opcode::Return));

    Ok(MethodNode::new(
        MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
        name,
        PROBE_DESC,
    )
    .with_instructions(body))
}

/// A probe attached to a class for the lifetime of the value.
///
/// The probe is removed from the class when the attachment is dropped, on
/// every exit path. While attached, the pool is reachable read-only through
/// `Deref`.
pub struct ProbeAttachment<'a> {
    pool: &'a mut ClassPool,
    class: String,
    name: String,
    desc: String,
}

impl<'a> ProbeAttachment<'a> {
    /// Adds `probe` to `class`.
    ///
    /// # Errors
    ///
    /// Returns an error if the class is unknown or already declares a method
    /// with the probe's name and descriptor.
    pub fn attach(pool: &'a mut ClassPool, class: &str, probe: MethodNode) -> Result<Self> {
        let name = probe.name.clone();
        let desc = probe.desc.clone();
        pool.get_mut(class)
            .ok_or_else(|| Error::ClassNotFound(class.to_string()))?
            .add_method(probe)?;
        Ok(Self {
            pool,
            class: class.to_string(),
            name,
            desc,
        })
    }

    /// Internal name of the class the probe is attached to.
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Name of the attached probe.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Descriptor of the attached probe.
    #[must_use]
    pub fn desc(&self) -> &str {
        &self.desc
    }
}

impl Deref for ProbeAttachment<'_> {
    type Target = ClassPool;

    fn deref(&self) -> &ClassPool {
        &*self.pool
    }
}

impl Drop for ProbeAttachment<'_> {
    fn drop(&mut self) {
        if let Some(class) = self.pool.get_mut(&self.class) {
            class.remove_method(&self.name, &self.desc);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        deobfuscation::{stringer::find_candidates, IndyConfig},
        test::{indy_site, obfuscated_class},
    };

    fn site(desc: &str) -> CandidateSite {
        let body: InsnList = [indy_site("a/Main", desc)].into_iter().collect();
        let class = obfuscated_class("a/Main", body);
        let method = class.method("run", "()V").unwrap();
        find_candidates(&class, method, &IndyConfig::default()).remove(0)
    }

    #[test]
    fn test_zero_pushes_match_arguments() {
        let site = site("(ZBCSIJFD[ILjava/lang/String;)Ljava/lang/Object;");
        let probe = build_probe(&site, "Decrypt0").unwrap();

        let ops: Vec<_> = probe.instructions.insns().map(Insn::opcode).collect();
        assert_eq!(
            ops,
            vec![
                Opcode::Iconst0,
                Opcode::Iconst0,
                Opcode::Iconst0,
                Opcode::Iconst0,
                Opcode::Iconst0,
                Opcode::Lconst0,
                Opcode::Fconst0,
                Opcode::Dconst0,
                Opcode::AconstNull,
                Opcode::AconstNull,
                Opcode::Invokedynamic,
                Opcode::Return,
            ]
        );
        assert!(probe.is_static());
        assert!(probe.access.contains(MethodAccessFlags::PUBLIC));
        assert_eq!(probe.desc, PROBE_DESC);
        assert_eq!(probe.name, "Decrypt0");
    }

    #[test]
    fn test_probe_clones_site() {
        let site = site("()V");
        let probe = build_probe(&site, "Decrypt0").unwrap();
        let cloned = probe
            .instructions
            .insns()
            .find_map(Insn::as_invoke_dynamic)
            .unwrap();
        assert_eq!(cloned, &site.indy);
        assert_eq!(probe.instructions.len(), 2);
    }

    #[test]
    fn test_invalid_site_descriptor() {
        let mut site = site("()V");
        site.indy.desc = "(Q)V".into();
        assert!(build_probe(&site, "Decrypt0").is_err());
    }

    #[test]
    fn test_next_probe_name_skips_existing() {
        let mut class = obfuscated_class("a/Main", InsnList::new());
        class
            .add_method(MethodNode::new(MethodAccessFlags::STATIC, "Decrypt1", "()V"))
            .unwrap();
        let mut counter = 0;
        assert_eq!(next_probe_name(&class, "Decrypt", &mut counter), "Decrypt0");
        assert_eq!(next_probe_name(&class, "Decrypt", &mut counter), "Decrypt2");
        assert_eq!(counter, 3);
    }

    #[test]
    fn test_attachment_detaches_on_drop() {
        let mut pool = ClassPool::new();
        pool.insert(obfuscated_class("a/Main", InsnList::new()))
            .unwrap();
        let before = pool.get("a/Main").unwrap().methods.clone();

        let probe = MethodNode::new(MethodAccessFlags::STATIC, "Decrypt0", PROBE_DESC);
        {
            let attachment = ProbeAttachment::attach(&mut pool, "a/Main", probe).unwrap();
            assert!(attachment.get("a/Main").unwrap().method("Decrypt0", "()V").is_some());
            assert_eq!(attachment.name(), "Decrypt0");
        }
        assert_eq!(pool.get("a/Main").unwrap().methods, before);
    }

    #[test]
    fn test_attach_to_unknown_class() {
        let mut pool = ClassPool::new();
        let probe = MethodNode::new(MethodAccessFlags::STATIC, "Decrypt0", PROBE_DESC);
        assert!(matches!(
            ProbeAttachment::attach(&mut pool, "a/Missing", probe),
            Err(Error::ClassNotFound(_))
        ));
    }
}
