//! One sandboxed probe run.

use crate::{
    deobfuscation::{
        stringer::{CaptureBuffer, LookupInterceptor, ProbeAttachment, SiteFailure},
        IndyConfig,
    },
    emulation::{ExecutionOutcome, HookGuard, VirtualMachine},
    model::{ClassPool, MethodNode},
};

/// Runs probes on a shared interpreter.
///
/// Each run attaches the probe, installs a fresh [`LookupInterceptor`] as the
/// only listener, executes the probe and classifies the outcome. The probe is
/// detached and the listener cleared on every path, including unwinding.
pub struct SandboxSession<'a, V: VirtualMachine + ?Sized> {
    vm: &'a mut V,
    config: &'a IndyConfig,
}

impl<'a, V: VirtualMachine + ?Sized> SandboxSession<'a, V> {
    /// Creates a session on `vm`.
    pub fn new(vm: &'a mut V, config: &'a IndyConfig) -> Self {
        Self { vm, config }
    }

    /// Attaches `probe` to `class`, runs it and returns what was captured.
    ///
    /// # Errors
    ///
    /// Returns a [`SiteFailure`] if the probe cannot be attached, if the
    /// interpreted code throws, or if the interpreter faults.
    pub fn run(
        &mut self,
        pool: &mut ClassPool,
        class: &str,
        probe: MethodNode,
    ) -> Result<CaptureBuffer, SiteFailure> {
        let outcome = {
            let attachment = ProbeAttachment::attach(pool, class, probe)?;
            let interceptor = LookupInterceptor::new(class, self.config);
            let mut guard = HookGuard::install(&mut *self.vm, Box::new(interceptor));
            guard.execute(&attachment, class, attachment.name(), attachment.desc())
        };
        classify(outcome, &*self.vm)
    }
}

/// Maps an execution outcome to a capture or a site failure.
///
/// A run that completes without reaching the lookup yields an empty capture.
///
/// # Errors
///
/// Returns [`SiteFailure::InterpretedException`] or [`SiteFailure::Fault`].
pub fn classify<V: VirtualMachine + ?Sized>(
    outcome: ExecutionOutcome,
    vm: &V,
) -> Result<CaptureBuffer, SiteFailure> {
    match outcome {
        ExecutionOutcome::Aborted(values) => Ok(CaptureBuffer::new(values)),
        ExecutionOutcome::Completed => Ok(CaptureBuffer::default()),
        ExecutionOutcome::InterpretedException(info) => Err(SiteFailure::InterpretedException {
            rendered: vm.render_exception(&info),
        }),
        ExecutionOutcome::Faulted(error) => Err(SiteFailure::Fault(error)),
    }
}
