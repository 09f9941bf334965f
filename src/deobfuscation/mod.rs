//! Deobfuscation transformers.
//!
//! # Architecture
//!
//! Each supported obfuscation scheme lives in its own submodule and is exposed
//! as a [`Transformer`]. Transformers share the ambient pieces defined here:
//!
//! - [`IndyConfig`] - Tunables for dynamic call site recovery
//! - [`EventLog`] / [`Event`] - Per-site results, forwarded to `log`
//! - [`TransformStats`] - Counters returned by a run
//!
//! # Usage
//!
//! ```rust,ignore
//! use indyscope::prelude::*;
//!
//! let events = EventLog::new();
//! let mut transformer = Invokedynamic2Transformer::new(MyMachineFactory::default());
//! let stats = transformer.transform(&mut pool, &events)?;
//! println!("{stats}");
//! println!("{}", events.summary());
//! ```

mod config;
mod events;
pub mod stringer;
mod transformer;

pub use config::{IndyConfig, BOOTSTRAP_DESC, LOOKUP_DESC, LOOKUP_OWNER};
pub use events::{Event, EventBuilder, EventKind, EventLog};
pub use transformer::{TransformStats, Transformer};
