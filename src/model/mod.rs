//! In-memory bytecode model.
//!
//! A symbolic view of JVM classes: a [`ClassPool`] of [`ClassNode`]s, each with
//! [`MethodNode`]s whose bodies are [`InsnList`]s of [`Insn`]s. Reading and
//! writing class files is out of scope; callers build the pool from whatever
//! front end they use.
//!
//! # Key Components
//!
//! - [`ClassPool`] - Classes under analysis, with hierarchy-aware member lookup
//! - [`InsnList`] / [`InsnId`] - Instruction lists with stable identities
//! - [`InstructionModifier`] - Deferred, batched instruction replacement
//! - [`MethodDescriptor`] / [`JvmType`] - Descriptor parsing

mod access;
mod class;
mod descriptor;
mod insn;
mod list;
mod modifier;
mod pool;

pub use access::{ClassAccessFlags, MethodAccessFlags};
pub use class::{ClassNode, MethodNode};
pub use descriptor::{argument_types, JvmType, MethodDescriptor};
pub use insn::{
    Constant, FieldInsn, Handle, HandleKind, Insn, InvokeDynamicInsn, InvokeKind, MethodInsn,
    Opcode,
};
pub use list::{InsnId, InsnList};
pub use modifier::InstructionModifier;
pub use pool::ClassPool;
