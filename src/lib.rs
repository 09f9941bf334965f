// Copyright 2026 The indyscope Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # indyscope
//!
//! Recovery of direct method calls from JVM bytecode obfuscated with Stringer's
//! invokedynamic protection ("mode 2").
//!
//! Stringer hides call targets behind `invokedynamic` sites whose bootstrap
//! method decrypts the real target at link time. Instead of reimplementing the
//! decryption, `indyscope` runs the bootstrap of every protected site inside a
//! sandboxed interpreter, intercepts the `MethodHandles$Lookup` call that
//! resolves the target, and rewrites the site into a plain
//! `invokestatic`/`invokevirtual`/`invokeinterface`.
//!
//! ## Features
//!
//! - **🔍 Candidate scan** - Finds protected sites by bootstrap owner and descriptor, optionally in parallel
//! - **🧪 Sandboxed probing** - Every site is decrypted by a throwaway probe method with scoped hooks
//! - **🎯 Hierarchy-aware resolution** - Targets declared on supertypes are found and dispatched correctly
//! - **🩹 Batched patching** - All replacements of one method are applied together, once
//! - **📋 Event log** - Every recovered or abandoned site is recorded and forwarded to `log`
//!
//! ## Quick Start
//!
//! The interpreter is supplied by the caller through [`emulation::MachineFactory`]:
//!
//! ```rust,ignore
//! use indyscope::prelude::*;
//!
//! let mut pool = ClassPool::new();
//! // ... fill the pool from a class file front end ...
//!
//! let events = EventLog::new();
//! let mut transformer = Invokedynamic2Transformer::new(MyInterpreterFactory::default());
//! let stats = transformer.transform(&mut pool, &events)?;
//!
//! println!("{stats}");
//! for event in events.failures() {
//!     eprintln!("{event}");
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`model`] - Symbolic classes, methods and instruction lists
//! - [`emulation`] - The interpreter seam: hooks, values and run outcomes
//! - [`deobfuscation`] - Transformers, configuration, events and statistics
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Error Handling
//!
//! Operations on the model return [`Result<T, Error>`](Result). A site that
//! cannot be recovered never fails the run; it is left unchanged and reported
//! as an [`deobfuscation::Event`].

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use indyscope::prelude::*;
///
/// let config = IndyConfig::default().with_parallel_scan(false);
/// assert!(!config.parallel_scan);
/// ```
pub mod prelude;

/// The in-memory JVM bytecode model.
pub mod model;

/// The sandboxed interpreter seam.
///
/// `indyscope` does not ship an interpreter. This module defines what one must
/// provide: a [`emulation::VirtualMachine`] that consults its
/// [`emulation::HookRegistry`] before every call and reports each run as an
/// [`emulation::ExecutionOutcome`].
pub mod emulation;

/// Deobfuscation transformers and their shared infrastructure.
pub mod deobfuscation;

/// `indyscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `indyscope` Error type
///
/// The main error type for operations on the class model and the interpreter seam.
pub use error::Error;
