//! Pre-call interception.
//!
//! An interpreter consults its [`HookRegistry`] before every method
//! invocation. Each registered [`CallListener`] sees a [`CallContext`]
//! describing the call and decides whether execution continues or is aborted.
//!
//! # Hook Execution Flow
//!
//! ```text
//! Method call about to happen
//!         │
//!         ▼
//! ┌───────────────────┐
//! │  dispatch to each │───► Abort(values) ───► run ends as Aborted(values)
//! │  listener in order│
//! └───────────────────┘
//!         │ all Continue
//!         ▼
//!   Execute the call
//! ```
//!
//! [`HookGuard`] scopes a registration to one run: the registry of the
//! machine it wraps is cleared when the guard is dropped, whatever the outcome.

use std::{
    fmt,
    ops::{Deref, DerefMut},
};

use crate::emulation::{JavaValue, VirtualMachine};

/// One frame of the interpreted call stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StackFrame {
    /// Internal name of the class declaring the executing method.
    pub class: String,
    /// Name of the executing method.
    pub method: String,
    /// Descriptor of the executing method.
    pub desc: String,
}

impl StackFrame {
    /// Creates a frame.
    #[must_use]
    pub fn new(
        class: impl Into<String>,
        method: impl Into<String>,
        desc: impl Into<String>,
    ) -> Self {
        Self {
            class: class.into(),
            method: method.into(),
            desc: desc.into(),
        }
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.class, self.method, self.desc)
    }
}

/// Information about the call being intercepted.
///
/// The context borrows from the interpreter state and is only valid for the
/// duration of the listener invocation.
#[derive(Debug, Clone, Copy)]
pub struct CallContext<'a> {
    /// Internal name of the class named by the invoke instruction.
    pub owner: &'a str,
    /// Name of the invoked method.
    pub name: &'a str,
    /// Descriptor of the invoked method.
    pub desc: &'a str,
    /// Arguments, excluding the receiver.
    pub args: &'a [JavaValue],
    /// Call stack at the call, innermost first. Index 0 is the frame that
    /// executes the invoke instruction.
    pub stack: &'a [StackFrame],
}

impl<'a> CallContext<'a> {
    /// Creates a context with no arguments and an empty stack.
    #[must_use]
    pub fn new(owner: &'a str, name: &'a str, desc: &'a str) -> Self {
        Self {
            owner,
            name,
            desc,
            args: &[],
            stack: &[],
        }
    }

    /// Sets the call arguments.
    #[must_use]
    pub fn with_args(mut self, args: &'a [JavaValue]) -> Self {
        self.args = args;
        self
    }

    /// Sets the call stack.
    #[must_use]
    pub fn with_stack(mut self, stack: &'a [StackFrame]) -> Self {
        self.stack = stack;
        self
    }

    /// The frame performing the call, if the stack is known.
    #[must_use]
    pub fn caller(&self) -> Option<&'a StackFrame> {
        self.stack.first()
    }

    /// Returns true if the call targets exactly this owner and descriptor.
    #[must_use]
    pub fn is_call_to(&self, owner: &str, desc: &str) -> bool {
        self.owner == owner && self.desc == desc
    }
}

/// Decision of a listener about an intercepted call.
#[derive(Debug, Clone, PartialEq)]
pub enum HookDecision {
    /// Let the call proceed.
    Continue,
    /// Stop the run. The interpreter reports
    /// [`crate::emulation::ExecutionOutcome::Aborted`] with these values.
    Abort(Vec<JavaValue>),
}

/// Observer invoked before each method call the interpreter performs.
pub trait CallListener: Send + Sync {
    /// Inspects a call that is about to happen.
    fn on_before_call(&self, context: &CallContext<'_>) -> HookDecision;
}

impl<F> CallListener for F
where
    F: Fn(&CallContext<'_>) -> HookDecision + Send + Sync,
{
    fn on_before_call(&self, context: &CallContext<'_>) -> HookDecision {
        self(context)
    }
}

/// Registered call listeners of one interpreter.
#[derive(Default)]
pub struct HookRegistry {
    listeners: Vec<Box<dyn CallListener>>,
}

impl HookRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener. Listeners are consulted in registration order.
    pub fn register(&mut self, listener: Box<dyn CallListener>) {
        self.listeners.push(listener);
    }

    /// Removes all listeners.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns true if no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Runs all listeners until one aborts.
    #[must_use]
    pub fn dispatch(&self, context: &CallContext<'_>) -> HookDecision {
        for listener in &self.listeners {
            if let HookDecision::Abort(values) = listener.on_before_call(context) {
                return HookDecision::Abort(values);
            }
        }
        HookDecision::Continue
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Exclusive, scoped listener registration on a machine.
///
/// Creating the guard clears the machine's registry and registers the
/// listener. Dropping it clears the registry again, so no listener outlives
/// the run it was installed for.
pub struct HookGuard<'a, V: VirtualMachine + ?Sized> {
    machine: &'a mut V,
}

impl<'a, V: VirtualMachine + ?Sized> HookGuard<'a, V> {
    /// Installs `listener` as the only listener of `machine`.
    pub fn install(machine: &'a mut V, listener: Box<dyn CallListener>) -> Self {
        let hooks = machine.hooks_mut();
        hooks.clear();
        hooks.register(listener);
        Self { machine }
    }
}

impl<V: VirtualMachine + ?Sized> Deref for HookGuard<'_, V> {
    type Target = V;

    fn deref(&self) -> &V {
        &*self.machine
    }
}

impl<V: VirtualMachine + ?Sized> DerefMut for HookGuard<'_, V> {
    fn deref_mut(&mut self) -> &mut V {
        &mut *self.machine
    }
}

impl<V: VirtualMachine + ?Sized> Drop for HookGuard<'_, V> {
    fn drop(&mut self) {
        self.machine.hooks_mut().clear();
    }
}
