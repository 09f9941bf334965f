//! Shared fixtures for unit tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::{
    deobfuscation::BOOTSTRAP_DESC,
    emulation::{
        EmulationError, ExecutionOutcome, HookRegistry, JavaValue, MachineFactory, ObjectRef,
        VirtualMachine,
    },
    model::{
        ClassAccessFlags, ClassNode, ClassPool, Handle, Insn, InsnList, InvokeDynamicInsn,
        MethodAccessFlags, MethodNode,
    },
    Result,
};

#[derive(Debug, Clone)]
enum StubObject {
    Class(String),
    Str(String),
    MethodType(String),
}

/// What a [`StubMachine`] saw before it was shut down.
#[derive(Debug, Clone, Default)]
pub struct StubRecord {
    pub initialized: Vec<String>,
    pub runs: Vec<String>,
    pub shut_down: bool,
}

/// Interpreter double: every run returns whatever the outcome closure yields.
pub struct StubMachine {
    pub hooks: HookRegistry,
    pub initialized: Vec<String>,
    /// `class.namedesc` of every executed method, in order.
    pub runs: Vec<String>,
    /// Number of registered listeners at the start of each run.
    pub hooks_seen: Vec<usize>,
    pub shut_down: bool,
    outcome: Box<dyn FnMut() -> ExecutionOutcome>,
    heap: HashMap<u32, StubObject>,
    sink: Option<Arc<Mutex<Vec<StubRecord>>>>,
}

impl Default for StubMachine {
    fn default() -> Self {
        Self::with_outcome(|| ExecutionOutcome::Completed)
    }
}

impl StubMachine {
    pub fn with_outcome(outcome: impl FnMut() -> ExecutionOutcome + 'static) -> Self {
        Self {
            hooks: HookRegistry::new(),
            initialized: Vec::new(),
            runs: Vec::new(),
            hooks_seen: Vec::new(),
            shut_down: false,
            outcome: Box::new(outcome),
            heap: HashMap::new(),
            sink: None,
        }
    }

    fn alloc(&mut self, object: StubObject) -> JavaValue {
        let id = self.heap.len() as u32 + 1;
        self.heap.insert(id, object);
        JavaValue::Reference(ObjectRef(id))
    }

    pub fn alloc_class(&mut self, name: &str) -> JavaValue {
        self.alloc(StubObject::Class(name.to_string()))
    }

    pub fn alloc_string(&mut self, value: &str) -> JavaValue {
        self.alloc(StubObject::Str(value.to_string()))
    }

    pub fn alloc_method_type(&mut self, desc: &str) -> JavaValue {
        self.alloc(StubObject::MethodType(desc.to_string()))
    }

    fn object(&self, value: &JavaValue) -> Option<&StubObject> {
        self.heap.get(&value.as_reference()?.0)
    }
}

impl VirtualMachine for StubMachine {
    fn mark_initialized(&mut self, class: &str) {
        self.initialized.push(class.to_string());
    }

    fn hooks_mut(&mut self) -> &mut HookRegistry {
        &mut self.hooks
    }

    fn execute(
        &mut self,
        pool: &ClassPool,
        class: &str,
        name: &str,
        desc: &str,
    ) -> ExecutionOutcome {
        self.runs.push(format!("{}.{}{}", class, name, desc));
        self.hooks_seen.push(self.hooks.len());
        if pool.method(class, name, desc).is_err() {
            return ExecutionOutcome::Faulted(EmulationError::MethodNotFound {
                class: class.to_string(),
                name: name.to_string(),
                desc: desc.to_string(),
            });
        }
        (self.outcome)()
    }

    fn decode_class(&self, value: &JavaValue) -> Option<String> {
        match self.object(value)? {
            StubObject::Class(name) => Some(name.clone()),
            _ => None,
        }
    }

    fn decode_string(&self, value: &JavaValue) -> Option<String> {
        match self.object(value)? {
            StubObject::Str(value) => Some(value.clone()),
            _ => None,
        }
    }

    fn decode_method_type(&self, value: &JavaValue) -> Option<String> {
        match self.object(value)? {
            StubObject::MethodType(desc) => Some(desc.clone()),
            _ => None,
        }
    }

    fn shutdown(&mut self) {
        self.shut_down = true;
        if let Some(sink) = &self.sink {
            sink.lock().unwrap().push(StubRecord {
                initialized: self.initialized.clone(),
                runs: self.runs.clone(),
                shut_down: self.shut_down,
            });
        }
    }
}

/// Hands out [`StubMachine`]s and keeps a record of each one on shutdown.
pub struct StubFactory {
    make: fn() -> StubMachine,
    records: Arc<Mutex<Vec<StubRecord>>>,
}

impl StubFactory {
    pub fn new(make: fn() -> StubMachine) -> Self {
        Self {
            make,
            records: Arc::default(),
        }
    }

    pub fn last_machine(&self) -> Option<StubRecord> {
        self.records.lock().unwrap().last().cloned()
    }
}

impl MachineFactory for StubFactory {
    type Machine = StubMachine;

    fn create(&self) -> Result<StubMachine> {
        let mut machine = (self.make)();
        machine.sink = Some(Arc::clone(&self.records));
        Ok(machine)
    }
}

/// An invokedynamic site bootstrapped by `owner.bsm`.
pub fn indy_site(owner: &str, desc: &str) -> Insn {
    Insn::InvokeDynamic(InvokeDynamicInsn {
        name: "x".into(),
        desc: desc.into(),
        bsm: Handle::invoke_static(owner, "bsm", BOOTSTRAP_DESC),
        bsm_args: vec![],
    })
}

/// A class with a static `run()V` holding `body` and the Stringer bootstrap.
pub fn obfuscated_class(name: &str, body: InsnList) -> ClassNode {
    let mut class = ClassNode::new(name, ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER);
    class
        .add_method(
            MethodNode::new(
                MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
                "run",
                "()V",
            )
            .with_instructions(body),
        )
        .unwrap();
    class
        .add_method(MethodNode::new(
            MethodAccessFlags::PRIVATE | MethodAccessFlags::STATIC,
            "bsm",
            BOOTSTRAP_DESC,
        ))
        .unwrap();
    class
}
