//! Batch driver for invokedynamic recovery.

use crate::{
    deobfuscation::{
        stringer::{
            build_probe, classes_with_candidates, find_candidates, next_probe_name, queue,
            resolve_target, CandidateSite, ResolvedTarget, SandboxSession, SiteFailure,
        },
        EventKind, EventLog, IndyConfig, TransformStats, Transformer,
    },
    emulation::{MachineFactory, VirtualMachine},
    model::{ClassPool, InstructionModifier},
    Result,
};

/// Recovers direct calls from bootstrap-resolved dynamic call sites.
///
/// One interpreter is created per [`Transformer::transform`] call. Every
/// class under analysis is marked initialized before the first probe runs, so
/// their static initializers are never executed. Sites are processed one at a time;
/// sites that cannot be recovered are logged and left as they are.
pub struct Invokedynamic2Transformer<F: MachineFactory> {
    factory: F,
    config: IndyConfig,
}

impl<F: MachineFactory> Invokedynamic2Transformer<F> {
    /// Creates a transformer with the default configuration.
    pub fn new(factory: F) -> Self {
        Self::with_config(factory, IndyConfig::default())
    }

    /// Creates a transformer with a custom configuration.
    pub fn with_config(factory: F, config: IndyConfig) -> Self {
        Self { factory, config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &IndyConfig {
        &self.config
    }

    fn run(&self, vm: &mut F::Machine, pool: &mut ClassPool, events: &EventLog) -> TransformStats {
        let mut stats = TransformStats {
            classes_scanned: pool.len(),
            ..TransformStats::default()
        };

        for class in pool.class_names() {
            vm.mark_initialized(&class);
        }

        for class in classes_with_candidates(pool, &self.config) {
            let methods: Vec<(String, String)> = match pool.get(&class) {
                Some(node) => node
                    .methods
                    .iter()
                    .map(|m| (m.name.clone(), m.desc.clone()))
                    .collect(),
                None => continue,
            };
            for (name, desc) in methods {
                self.process_method(vm, pool, &class, &name, &desc, events, &mut stats);
            }
        }

        stats
    }

    #[allow(clippy::too_many_arguments)]
    fn process_method(
        &self,
        vm: &mut F::Machine,
        pool: &mut ClassPool,
        class: &str,
        name: &str,
        desc: &str,
        events: &EventLog,
        stats: &mut TransformStats,
    ) {
        let sites = match (pool.get(class), pool.method(class, name, desc)) {
            (Some(node), Ok(method)) => find_candidates(node, method, &self.config),
            _ => return,
        };
        if sites.is_empty() {
            return;
        }
        stats.candidates += sites.len();

        let location = format!("{}{}", name, desc);
        let mut modifier = InstructionModifier::new();
        let mut probe_counter = 0;

        for site in &sites {
            events
                .record(EventKind::ProbeStarted)
                .at(class, &location, site.index)
                .message(site.indy.to_string());

            match self.decrypt_site(vm, pool, class, site, &mut probe_counter) {
                Ok(target) => {
                    queue(&mut modifier, site, &target);
                    stats.decrypted += 1;
                    events
                        .record(EventKind::SiteDecrypted)
                        .at(class, &location, site.index)
                        .message(format!(
                            "Decrypted {} {}{}",
                            target.owner, target.name, target.desc
                        ));
                }
                Err(failure) => {
                    let kind = failure.event_kind();
                    match kind {
                        EventKind::InterpretedException => stats.exceptions += 1,
                        EventKind::MalformedCapture => stats.malformed += 1,
                        EventKind::UnresolvedTarget => stats.unresolved += 1,
                        _ => stats.faults += 1,
                    }
                    events
                        .record(kind)
                        .at(class, &location, site.index)
                        .message(failure.render_chain());
                }
            }
        }

        if modifier.is_empty() {
            return;
        }
        if let Ok(method) = pool.method_mut(class, name, desc) {
            let applied = modifier.apply(&mut method.instructions);
            stats.methods_patched += 1;
            events
                .record(EventKind::MethodPatched)
                .in_method(class, &location)
                .message(format!("{} call sites rewritten", applied));
        }
    }

    fn decrypt_site(
        &self,
        vm: &mut F::Machine,
        pool: &mut ClassPool,
        class: &str,
        site: &CandidateSite,
        probe_counter: &mut usize,
    ) -> std::result::Result<ResolvedTarget, SiteFailure> {
        let probe_name = match pool.get(class) {
            Some(node) => next_probe_name(node, &self.config.probe_name_prefix, probe_counter),
            None => return Err(crate::Error::ClassNotFound(class.to_string()).into()),
        };
        let probe = build_probe(site, probe_name)?;
        let capture = SandboxSession::new(&mut *vm, &self.config).run(pool, class, probe)?;
        resolve_target(&capture, &*vm, pool, self.config.search_hierarchy)
    }
}

impl<F: MachineFactory> Transformer for Invokedynamic2Transformer<F> {
    fn name(&self) -> &'static str {
        "stringer-invokedynamic2"
    }

    fn description(&self) -> &'static str {
        "Rewrites Stringer invokedynamic call sites into direct calls"
    }

    fn transform(&mut self, pool: &mut ClassPool, events: &EventLog) -> Result<TransformStats> {
        let mut vm = self.factory.create()?;
        let stats = self.run(&mut vm, pool, events);
        vm.shutdown();

        log::info!("{}: {}", self.name(), stats);
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        emulation::{ExecutionOutcome, JavaValue},
        model::{Insn, InsnList, Opcode},
        test::{indy_site, obfuscated_class, StubFactory, StubMachine},
    };

    #[test]
    fn test_noop_on_pool_without_sites() {
        let mut pool = ClassPool::new();
        pool.insert(obfuscated_class(
            "a/Plain",
            [Insn::Simple(Opcode::Return)].into_iter().collect(),
        ))
        .unwrap();
        let before = pool.classes().to_vec();

        let events = EventLog::new();
        let factory = StubFactory::new(StubMachine::default);
        let mut transformer = Invokedynamic2Transformer::new(factory);
        let stats = transformer.transform(&mut pool, &events).unwrap();

        assert!(stats.is_noop());
        assert_eq!(stats.classes_scanned, 1);
        assert_eq!(pool.classes(), &before[..]);
        assert!(events.is_empty());
    }

    #[test]
    fn test_marks_classes_initialized_and_shuts_down() {
        let mut pool = ClassPool::new();
        pool.insert(obfuscated_class("a/One", InsnList::new())).unwrap();
        pool.insert(obfuscated_class("a/Two", InsnList::new())).unwrap();

        let factory = StubFactory::new(StubMachine::default);
        let mut transformer = Invokedynamic2Transformer::new(factory);
        transformer.transform(&mut pool, &EventLog::new()).unwrap();

        let machine = transformer.factory.last_machine().unwrap();
        assert_eq!(machine.initialized, vec!["a/One", "a/Two"]);
        assert!(machine.shut_down);
    }

    #[test]
    fn test_probe_names_count_per_method() {
        let mut pool = ClassPool::new();
        let body: InsnList = [
            indy_site("a/Main", "()V"),
            indy_site("a/Main", "()V"),
            Insn::Simple(Opcode::Return),
        ]
        .into_iter()
        .collect();
        pool.insert(obfuscated_class("a/Main", body)).unwrap();

        let factory = StubFactory::new(|| {
            StubMachine::with_outcome(|| ExecutionOutcome::Aborted(vec![JavaValue::Null]))
        });
        let mut transformer = Invokedynamic2Transformer::new(factory);
        let events = EventLog::new();
        let stats = transformer.transform(&mut pool, &events).unwrap();

        let machine = transformer.factory.last_machine().unwrap();
        assert_eq!(
            machine.runs,
            vec!["a/Main.Decrypt0()V", "a/Main.Decrypt1()V"]
        );
        assert_eq!(stats.candidates, 2);
        assert_eq!(stats.malformed, 2);
        assert_eq!(stats.methods_patched, 0);
        assert_eq!(events.count_kind(EventKind::MalformedCapture), 2);
        assert_eq!(events.count_kind(EventKind::ProbeStarted), 2);
    }
}
