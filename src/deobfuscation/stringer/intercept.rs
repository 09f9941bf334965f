//! Lookup interception.

use std::fmt;

use crate::{
    deobfuscation::IndyConfig,
    emulation::{CallContext, CallListener, HookDecision, JavaValue},
};

/// Listener that stops a probe run at the bootstrap's lookup call.
///
/// The bootstrap ends by resolving its real target with
/// `MethodHandles$Lookup.findXxx(Class, String, MethodType)`. The interceptor
/// fires on that call shape and aborts the run with the three arguments, so
/// the bootstrap never links the call site.
///
/// The JVM itself performs lookups of the same shape while linking, so the
/// call is only taken when the innermost frame belongs to the class under
/// analysis. Only that single frame is inspected: a bootstrap that delegates
/// the lookup to a helper in another class is not intercepted.
#[derive(Debug, Clone)]
pub struct LookupInterceptor {
    class: String,
    owner: String,
    desc: String,
    require_caller_frame: bool,
}

impl LookupInterceptor {
    /// Creates an interceptor for probes run on behalf of `class`.
    #[must_use]
    pub fn new(class: impl Into<String>, config: &IndyConfig) -> Self {
        Self {
            class: class.into(),
            owner: config.lookup_owner.clone(),
            desc: config.lookup_desc.clone(),
            require_caller_frame: config.require_caller_frame,
        }
    }

    /// Returns true if `context` is the lookup this interceptor waits for.
    #[must_use]
    pub fn qualifies(&self, context: &CallContext<'_>) -> bool {
        if !context.is_call_to(&self.owner, &self.desc) {
            return false;
        }
        !self.require_caller_frame
            || context
                .caller()
                .is_some_and(|frame| frame.class == self.class)
    }
}

impl CallListener for LookupInterceptor {
    fn on_before_call(&self, context: &CallContext<'_>) -> HookDecision {
        if self.qualifies(context) {
            HookDecision::Abort(context.args.to_vec())
        } else {
            HookDecision::Continue
        }
    }
}

/// Values captured from one probe run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureBuffer {
    values: Vec<JavaValue>,
}

impl CaptureBuffer {
    /// Number of values a usable capture holds: class, name and method type.
    pub const EXPECTED_LEN: usize = 3;

    /// Wraps captured values.
    #[must_use]
    pub fn new(values: Vec<JavaValue>) -> Self {
        Self { values }
    }

    /// Number of captured values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns true if the capture has the expected shape.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.values.len() == Self::EXPECTED_LEN
    }

    /// The captured values.
    #[must_use]
    pub fn values(&self) -> &[JavaValue] {
        &self.values
    }
}

impl fmt::Display for CaptureBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", value)?;
        }
        f.write_str("]")
    }
}
