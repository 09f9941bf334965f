//! Shared fixtures for the integration tests.
//!
//! [`ScriptedMachine`] is a tiny interpreter that understands just enough of a
//! probe body to be useful: zero pushes, one `invokedynamic` and `return`. The
//! bootstrap of each call site is not interpreted; its behavior is looked up
//! by call site name in a script.

#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use indyscope::{
    deobfuscation::{BOOTSTRAP_DESC, LOOKUP_DESC, LOOKUP_OWNER},
    emulation::{
        CallContext, EmulationError, ExceptionInfo, ExecutionOutcome, HookDecision, HookRegistry,
        JavaValue, MachineFactory, ObjectRef, StackFrame, VirtualMachine,
    },
    model::{
        ClassAccessFlags, ClassNode, ClassPool, Handle, Insn, InsnList, InvokeDynamicInsn,
        MethodAccessFlags, MethodNode, Opcode,
    },
    Result,
};

/// What the bootstrap of a call site does when probed.
#[derive(Debug, Clone)]
pub enum Bootstrap {
    /// Looks up `owner.name desc` from the bootstrap frame.
    Resolve {
        owner: String,
        name: String,
        desc: String,
    },
    /// Looks the target up through a helper in another class.
    ResolveViaHelper {
        helper: String,
        owner: String,
        name: String,
        desc: String,
    },
    /// Calls the lookup with a string where the class mirror belongs.
    GarbageLookup,
    /// Throws before reaching the lookup.
    Throw { class: String, message: String },
    /// Loops until the instruction budget runs out.
    Spin,
    /// Returns without any lookup.
    Return,
}

impl Bootstrap {
    pub fn resolve(owner: &str, name: &str, desc: &str) -> Self {
        Bootstrap::Resolve {
            owner: owner.to_string(),
            name: name.to_string(),
            desc: desc.to_string(),
        }
    }

    pub fn throw(class: &str, message: &str) -> Self {
        Bootstrap::Throw {
            class: class.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
enum HeapObject {
    Class(String),
    Str(String),
    MethodType(String),
}

/// Everything a machine observed, kept after it is shut down.
#[derive(Debug, Default)]
pub struct Trace {
    /// `class.namedesc` of every run.
    pub runs: Vec<String>,
    /// Classes marked initialized, in order.
    pub initialized: Vec<String>,
    /// Classes whose static initializer would have run.
    pub clinit_runs: Vec<String>,
    /// Arguments popped by each probed `invokedynamic`.
    pub site_args: Vec<Vec<JavaValue>>,
    /// Listener count at the start of each run.
    pub hooks_at_start: Vec<usize>,
    /// Whether the machine was shut down.
    pub shut_down: bool,
}

pub const INSTRUCTION_LIMIT: u64 = 10_000;

pub struct ScriptedMachine {
    hooks: HookRegistry,
    initialized: HashSet<String>,
    script: Arc<HashMap<String, Bootstrap>>,
    heap: Vec<HeapObject>,
    trace: Arc<Mutex<Trace>>,
}

impl ScriptedMachine {
    fn alloc(&mut self, object: HeapObject) -> JavaValue {
        self.heap.push(object);
        JavaValue::Reference(ObjectRef(self.heap.len() as u32))
    }

    fn object(&self, value: &JavaValue) -> Option<&HeapObject> {
        let index = value.as_reference()?.0 as usize;
        self.heap.get(index.checked_sub(1)?)
    }

    fn lookup_args(&mut self, owner: &str, name: &str, desc: &str) -> Vec<JavaValue> {
        vec![
            self.alloc(HeapObject::Class(owner.to_string())),
            self.alloc(HeapObject::Str(name.to_string())),
            self.alloc(HeapObject::MethodType(desc.to_string())),
        ]
    }

    fn lookup(&self, args: &[JavaValue], stack: &[StackFrame]) -> ExecutionOutcome {
        let context = CallContext::new(LOOKUP_OWNER, "findVirtual", LOOKUP_DESC)
            .with_args(args)
            .with_stack(stack);
        match self.hooks.dispatch(&context) {
            HookDecision::Abort(values) => ExecutionOutcome::Aborted(values),
            // The call site would now be linked and invoked; nothing observable
            // for a `()V` probe.
            HookDecision::Continue => ExecutionOutcome::Completed,
        }
    }

    fn bootstrap(
        &mut self,
        indy: &InvokeDynamicInsn,
        caller: StackFrame,
    ) -> ExecutionOutcome {
        let bsm_frame = StackFrame::new(&indy.bsm.owner, &indy.bsm.name, &indy.bsm.desc);

        // The JVM resolves the bootstrap handle itself before calling it.
        let linker = [StackFrame::new(
            "java/lang/invoke/MethodHandleNatives",
            "linkCallSite",
            "()V",
        )];
        let args = self.lookup_args(&indy.bsm.owner, &indy.bsm.name, &indy.bsm.desc);
        if let outcome @ ExecutionOutcome::Aborted(_) = self.lookup(&args, &linker) {
            return outcome;
        }

        let Some(behavior) = self.script.get(&indy.name).cloned() else {
            return ExecutionOutcome::Faulted(EmulationError::Internal {
                description: format!("no script for call site {}", indy.name),
            });
        };
        match behavior {
            Bootstrap::Resolve { owner, name, desc } => {
                let args = self.lookup_args(&owner, &name, &desc);
                self.lookup(&args, &[bsm_frame, caller])
            }
            Bootstrap::ResolveViaHelper {
                helper,
                owner,
                name,
                desc,
            } => {
                let args = self.lookup_args(&owner, &name, &desc);
                let stack = [
                    StackFrame::new(helper, "find", "()Ljava/lang/invoke/MethodHandle;"),
                    bsm_frame,
                    caller,
                ];
                self.lookup(&args, &stack)
            }
            Bootstrap::GarbageLookup => {
                let args = vec![
                    self.alloc(HeapObject::Str("not a class".into())),
                    self.alloc(HeapObject::Str("target".into())),
                    self.alloc(HeapObject::MethodType("()V".into())),
                ];
                self.lookup(&args, &[bsm_frame, caller])
            }
            Bootstrap::Throw { class, message } => {
                let mut info = ExceptionInfo::new(class, Some(message));
                info.stack = vec![bsm_frame, caller];
                ExecutionOutcome::InterpretedException(info)
            }
            Bootstrap::Spin => {
                ExecutionOutcome::Faulted(EmulationError::InstructionLimitExceeded {
                    executed: INSTRUCTION_LIMIT,
                    limit: INSTRUCTION_LIMIT,
                })
            }
            Bootstrap::Return => ExecutionOutcome::Completed,
        }
    }
}

impl VirtualMachine for ScriptedMachine {
    fn mark_initialized(&mut self, class: &str) {
        self.trace.lock().unwrap().initialized.push(class.to_string());
        self.initialized.insert(class.to_string());
    }

    fn hooks_mut(&mut self) -> &mut HookRegistry {
        &mut self.hooks
    }

    fn execute(&mut self, pool: &ClassPool, class: &str, name: &str, desc: &str) -> ExecutionOutcome {
        let qualified = format!("{}.{}{}", class, name, desc);
        {
            let mut trace = self.trace.lock().unwrap();
            trace.runs.push(qualified.clone());
            trace.hooks_at_start.push(self.hooks.len());
            if !self.initialized.contains(class) {
                trace.clinit_runs.push(class.to_string());
            }
        }

        let method = match pool.method(class, name, desc) {
            Ok(method) => method,
            Err(_) => {
                return ExecutionOutcome::Faulted(EmulationError::MethodNotFound {
                    class: class.to_string(),
                    name: name.to_string(),
                    desc: desc.to_string(),
                })
            }
        };
        let caller = StackFrame::new(class, name, desc);

        let mut stack: Vec<JavaValue> = Vec::new();
        for insn in method.instructions.insns() {
            match insn {
                Insn::Simple(Opcode::Iconst0) => stack.push(JavaValue::Int(0)),
                Insn::Simple(Opcode::Lconst0) => stack.push(JavaValue::Long(0)),
                Insn::Simple(Opcode::Fconst0) => stack.push(JavaValue::Float(0.0)),
                Insn::Simple(Opcode::Dconst0) => stack.push(JavaValue::Double(0.0)),
                Insn::Simple(Opcode::AconstNull) => stack.push(JavaValue::Null),
                Insn::Simple(Opcode::Return) => return ExecutionOutcome::Completed,
                Insn::InvokeDynamic(indy) => {
                    let arity = match indy.descriptor() {
                        Ok(descriptor) => descriptor.params.len(),
                        Err(_) => {
                            return ExecutionOutcome::Faulted(EmulationError::Internal {
                                description: format!("bad call site descriptor {}", indy.desc),
                            })
                        }
                    };
                    if stack.len() < arity {
                        return ExecutionOutcome::Faulted(EmulationError::StackUnderflow {
                            method: qualified,
                        });
                    }
                    let args = stack.split_off(stack.len() - arity);
                    self.trace.lock().unwrap().site_args.push(args);

                    let outcome = self.bootstrap(indy, caller.clone());
                    if !matches!(outcome, ExecutionOutcome::Completed) {
                        return outcome;
                    }
                }
                other => {
                    return ExecutionOutcome::Faulted(EmulationError::UnsupportedInstruction {
                        opcode: other.opcode(),
                    })
                }
            }
        }
        ExecutionOutcome::Completed
    }

    fn decode_class(&self, value: &JavaValue) -> Option<String> {
        match self.object(value)? {
            HeapObject::Class(name) => Some(name.clone()),
            _ => None,
        }
    }

    fn decode_string(&self, value: &JavaValue) -> Option<String> {
        match self.object(value)? {
            HeapObject::Str(value) => Some(value.clone()),
            _ => None,
        }
    }

    fn decode_method_type(&self, value: &JavaValue) -> Option<String> {
        match self.object(value)? {
            HeapObject::MethodType(desc) => Some(desc.clone()),
            _ => None,
        }
    }

    fn shutdown(&mut self) {
        self.trace.lock().unwrap().shut_down = true;
    }
}

/// Creates [`ScriptedMachine`]s sharing one script and one trace.
#[derive(Default)]
pub struct ScriptedFactory {
    script: Arc<HashMap<String, Bootstrap>>,
    trace: Arc<Mutex<Trace>>,
}

impl ScriptedFactory {
    pub fn new<I>(script: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Bootstrap)>,
    {
        Self {
            script: Arc::new(
                script
                    .into_iter()
                    .map(|(site, behavior)| (site.to_string(), behavior))
                    .collect(),
            ),
            trace: Arc::default(),
        }
    }

    pub fn trace(&self) -> Arc<Mutex<Trace>> {
        Arc::clone(&self.trace)
    }
}

impl MachineFactory for ScriptedFactory {
    type Machine = ScriptedMachine;

    fn create(&self) -> Result<ScriptedMachine> {
        Ok(ScriptedMachine {
            hooks: HookRegistry::new(),
            initialized: HashSet::new(),
            script: Arc::clone(&self.script),
            heap: Vec::new(),
            trace: Arc::clone(&self.trace),
        })
    }
}

/// A dynamic call site named `site`, bootstrapped by `owner`'s decryptor.
pub fn site(owner: &str, site: &str, desc: &str) -> Insn {
    Insn::InvokeDynamic(InvokeDynamicInsn {
        name: site.to_string(),
        desc: desc.to_string(),
        bsm: Handle::invoke_static(owner, "decrypt", BOOTSTRAP_DESC),
        bsm_args: vec![],
    })
}

pub fn body(insns: impl IntoIterator<Item = Insn>) -> InsnList {
    insns.into_iter().collect()
}

/// An obfuscated class: `main()V` holds `main`, plus the bootstrap method.
pub fn protected_class(name: &str, main: InsnList) -> ClassNode {
    let mut class = ClassNode::new(name, ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER);
    class
        .add_method(
            MethodNode::new(
                MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
                "main",
                "()V",
            )
            .with_instructions(main),
        )
        .unwrap();
    class
        .add_method(MethodNode::new(
            MethodAccessFlags::PRIVATE | MethodAccessFlags::STATIC,
            "decrypt",
            BOOTSTRAP_DESC,
        ))
        .unwrap();
    class
}

/// A class declaring the given `(access, name, desc)` methods.
pub fn library_class(
    name: &str,
    access: ClassAccessFlags,
    methods: &[(MethodAccessFlags, &str, &str)],
) -> ClassNode {
    let mut class = ClassNode::new(name, access);
    for (flags, method, desc) in methods {
        class
            .add_method(MethodNode::new(*flags, *method, *desc))
            .unwrap();
    }
    class
}

/// Opcodes of `class.name desc`.
pub fn opcodes(pool: &ClassPool, class: &str, name: &str, desc: &str) -> Vec<Opcode> {
    pool.method(class, name, desc)
        .unwrap()
        .instructions
        .insns()
        .map(Insn::opcode)
        .collect()
}
