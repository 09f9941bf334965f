//! # indyscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the indyscope library. Import it to get quick access to the class model, the
//! interpreter seam and the invokedynamic transformer.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all indyscope operations
pub use crate::Error;

/// The result type used throughout indyscope
pub use crate::Result;

// ================================================================================================
// Bytecode Model
// ================================================================================================

/// Classes, methods and the pool they live in
pub use crate::model::{ClassAccessFlags, ClassNode, ClassPool, MethodAccessFlags, MethodNode};

/// Instructions and instruction lists
pub use crate::model::{
    Handle, Insn, InsnId, InsnList, InstructionModifier, InvokeDynamicInsn, InvokeKind,
    MethodInsn, Opcode,
};

/// Descriptor parsing
pub use crate::model::{JvmType, MethodDescriptor};

// ================================================================================================
// Interpreter Seam
// ================================================================================================

/// Traits an interpreter implements to be driven by the transformers
pub use crate::emulation::{CallListener, MachineFactory, VirtualMachine};

/// Values and outcomes exchanged with the interpreter
pub use crate::emulation::{
    CallContext, EmulationError, ExceptionInfo, ExecutionOutcome, HookDecision, HookRegistry,
    JavaValue, ObjectRef, StackFrame,
};

// ================================================================================================
// Deobfuscation
// ================================================================================================

/// Transformer trait, configuration and reporting
pub use crate::deobfuscation::{
    Event, EventKind, EventLog, IndyConfig, TransformStats, Transformer,
};

/// Stringer invokedynamic recovery
pub use crate::deobfuscation::stringer::{DispatchKind, Invokedynamic2Transformer, SiteFailure};
