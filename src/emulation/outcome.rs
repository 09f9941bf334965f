//! Results of a single interpreter run.

use std::fmt;

use crate::emulation::{EmulationError, JavaValue, StackFrame};

/// An exception thrown by interpreted code and not caught before the entry
/// method returned.
#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionInfo {
    /// Internal name of the exception class.
    pub class: String,
    /// Detail message, if any.
    pub message: Option<String>,
    /// Interpreted stack at the throw point, innermost frame first.
    pub stack: Vec<StackFrame>,
}

impl ExceptionInfo {
    /// Creates exception info without a stack trace.
    #[must_use]
    pub fn new(class: impl Into<String>, message: Option<String>) -> Self {
        Self {
            class: class.into(),
            message,
            stack: Vec::new(),
        }
    }
}

impl fmt::Display for ExceptionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.class.replace('/', "."), message),
            None => f.write_str(&self.class.replace('/', ".")),
        }
    }
}

/// How an interpreter run ended.
///
/// An aborted run is not an error: it is how a call listener stops execution
/// once it has seen what it needs.
#[derive(Debug)]
pub enum ExecutionOutcome {
    /// The entry method returned normally.
    Completed,
    /// A call listener aborted execution and handed back these values.
    Aborted(Vec<JavaValue>),
    /// Interpreted code threw an exception that was never caught.
    InterpretedException(ExceptionInfo),
    /// The interpreter faulted.
    Faulted(EmulationError),
}
