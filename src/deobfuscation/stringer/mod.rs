//! Stringer invokedynamic recovery.
//!
//! Stringer replaces ordinary method calls by `invokedynamic` sites whose
//! bootstrap method, emitted into the same class, decrypts the real target and
//! resolves it through `MethodHandles$Lookup`. This module recovers those
//! targets by running each bootstrap in a sandbox and intercepting the
//! lookup, then rewrites the site into a direct call.
//!
//! # Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌─────────────┐   ┌────────────────────┐
//! │  candidate   │──►│    probe    │──►│  session           │
//! │  scan        │   │  synthesis  │   │  attach, run with  │
//! └──────────────┘   └─────────────┘   │  LookupInterceptor │
//!                                      └─────────┬──────────┘
//!                                                │ CaptureBuffer
//!                                                ▼
//! ┌──────────────┐   ┌─────────────┐   ┌────────────────────┐
//! │  apply once  │◄──│   patcher   │◄──│  resolver          │
//! │  per method  │   │   (queue)   │   │  class, name, type │
//! └──────────────┘   └─────────────┘   └────────────────────┘
//! ```
//!
//! Every failure is local to its site and reported as a [`SiteFailure`]
//! event; the remaining sites of the batch are still processed.

mod candidate;
mod failure;
mod intercept;
mod patcher;
mod probe;
mod resolver;
mod session;
mod transformer;

pub use candidate::{
    classes_with_candidates, count_candidates, find_candidates, is_candidate, CandidateSite,
};
pub use failure::SiteFailure;
pub use intercept::{CaptureBuffer, LookupInterceptor};
pub use patcher::{direct_call, queue};
pub use probe::{build_probe, next_probe_name, ProbeAttachment, PROBE_DESC};
pub use resolver::{resolve_target, DispatchKind, ResolvedTarget};
pub use session::{classify, SandboxSession};
pub use transformer::Invokedynamic2Transformer;
