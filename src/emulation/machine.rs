//! The interpreter seam.

use crate::{
    emulation::{ExceptionInfo, ExecutionOutcome, HookRegistry, JavaValue},
    model::ClassPool,
    Result,
};

/// A sandboxed JVM bytecode interpreter.
///
/// Implementations execute methods of a [`ClassPool`] in isolation, consult
/// their [`HookRegistry`] before every invocation, and translate the end of a
/// run into an [`ExecutionOutcome`]. A single machine is reused for a whole
/// batch of runs; heap state may persist between runs.
pub trait VirtualMachine {
    /// Marks `class` as already initialized so its static initializer is
    /// never run.
    fn mark_initialized(&mut self, class: &str);

    /// The listeners consulted before each call.
    fn hooks_mut(&mut self) -> &mut HookRegistry;

    /// Runs `class.name desc` with an empty operand stack and no arguments.
    ///
    /// Must not panic for faults of the interpreted program or the
    /// interpreter; those are reported through the outcome.
    fn execute(&mut self, pool: &ClassPool, class: &str, name: &str, desc: &str)
        -> ExecutionOutcome;

    /// Decodes a `java.lang.Class` mirror into the internal name of the class.
    fn decode_class(&self, value: &JavaValue) -> Option<String>;

    /// Decodes a `java.lang.String`.
    fn decode_string(&self, value: &JavaValue) -> Option<String>;

    /// Decodes a `java.lang.invoke.MethodType` into a method descriptor.
    fn decode_method_type(&self, value: &JavaValue) -> Option<String>;

    /// Renders an uncaught interpreted exception for diagnostics.
    fn render_exception(&self, info: &ExceptionInfo) -> String {
        let mut rendered = info.to_string();
        for frame in &info.stack {
            rendered.push_str("\n\tat ");
            rendered.push_str(&frame.to_string());
        }
        rendered
    }

    /// Releases interpreter resources. No run may follow.
    fn shutdown(&mut self);
}

/// Creates a fresh [`VirtualMachine`] for each transformer run.
pub trait MachineFactory {
    /// The machine type produced.
    type Machine: VirtualMachine;

    /// Creates a machine.
    ///
    /// # Errors
    ///
    /// Returns an error if the interpreter cannot be set up.
    fn create(&self) -> Result<Self::Machine>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{emulation::StackFrame, test::StubMachine};

    #[test]
    fn test_default_render_exception() {
        let machine = StubMachine::default();
        let mut info = ExceptionInfo::new("java/lang/RuntimeException", Some("boom".into()));
        info.stack.push(StackFrame::new("a/B", "bsm", "()V"));
        assert_eq!(
            machine.render_exception(&info),
            "java.lang.RuntimeException: boom\n\tat a/B.bsm()V"
        );
    }
}
