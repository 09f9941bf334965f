//! Sandboxed interpreter interface.
//!
//! Deobfuscation of dynamic call sites needs to run obfuscator code, but only
//! far enough to observe what it resolves. This module defines what the rest
//! of the crate expects from an interpreter; the interpreter itself is
//! supplied by the caller through [`MachineFactory`].
//!
//! # Key Components
//!
//! - [`VirtualMachine`] - Execution, initialization state, value decoding
//! - [`HookRegistry`] / [`CallListener`] - Pre-call interception
//! - [`HookGuard`] - Listener registration scoped to one run
//! - [`ExecutionOutcome`] - Completed, aborted, exception or fault
//! - [`JavaValue`] - Operand stack values
//! - [`EmulationError`] - Interpreter faults

mod error;
mod hook;
mod machine;
mod outcome;
mod value;

pub use error::EmulationError;
pub use hook::{CallContext, CallListener, HookDecision, HookGuard, HookRegistry, StackFrame};
pub use machine::{MachineFactory, VirtualMachine};
pub use outcome::{ExceptionInfo, ExecutionOutcome};
pub use value::{JavaValue, ObjectRef};
