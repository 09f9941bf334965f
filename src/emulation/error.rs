//! Interpreter fault types.

use thiserror::Error;

use crate::model::Opcode;

/// Faults an interpreter can report while executing bytecode.
///
/// A fault means the interpreter itself could not continue. It is distinct
/// from an exception thrown by the interpreted program, which is reported as
/// [`crate::emulation::ExecutionOutcome::InterpretedException`].
#[derive(Error, Debug)]
pub enum EmulationError {
    /// Operand stack underflow (pop from an empty stack).
    #[error("operand stack underflow in {method}")]
    StackUnderflow {
        /// Method being executed
        method: String,
    },

    /// The configured instruction budget was exhausted.
    #[error("instruction limit exceeded: executed {executed}, limit {limit}")]
    InstructionLimitExceeded {
        /// Instructions executed before stopping
        executed: u64,
        /// Configured limit
        limit: u64,
    },

    /// The call stack grew past the configured depth.
    #[error("call depth {depth} exceeds limit {limit}")]
    CallDepthExceeded {
        /// Depth reached
        depth: usize,
        /// Configured limit
        limit: usize,
    },

    /// A class needed during execution is not available.
    #[error("class not found: {class}")]
    ClassNotFound {
        /// Internal name of the missing class
        class: String,
    },

    /// A method needed during execution is not available.
    #[error("method not found: {class}.{name}{desc}")]
    MethodNotFound {
        /// Internal name of the class that was searched
        class: String,
        /// Method name
        name: String,
        /// Method descriptor
        desc: String,
    },

    /// The interpreter does not implement an instruction.
    #[error("unsupported instruction: {opcode}")]
    UnsupportedInstruction {
        /// Opcode of the instruction
        opcode: Opcode,
    },

    /// A value does not refer to a live heap object.
    #[error("invalid heap reference: {reference}")]
    InvalidReference {
        /// Rendered value
        reference: String,
    },

    /// A native or intrinsic method failed.
    #[error("native method {method} failed")]
    Native {
        /// Qualified name of the native method
        method: String,
        /// Underlying cause
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal interpreter error.
    #[error("internal error: {description}")]
    Internal {
        /// Error description
        description: String,
    },
}

impl From<EmulationError> for crate::Error {
    fn from(error: EmulationError) -> Self {
        crate::Error::Emulation(Box::new(error))
    }
}
