//! Per-site failure taxonomy.

use std::error::Error as StdError;

use thiserror::Error;

use crate::{deobfuscation::EventKind, emulation::EmulationError};

/// Why a candidate site was left untouched.
///
/// Failures are contained to their site: the transformer logs them and
/// continues with the next site.
#[derive(Error, Debug)]
pub enum SiteFailure {
    /// Interpreted code threw an exception that escaped the probe.
    #[error("exception while decrypting invokedynamic: {rendered}")]
    InterpretedException {
        /// Exception as rendered by the interpreter
        rendered: String,
    },

    /// The interpreter itself failed.
    #[error("severe exception while decrypting invokedynamic")]
    Fault(#[source] EmulationError),

    /// The probe could not be built or attached.
    #[error("could not prepare probe")]
    Probe(#[source] crate::Error),

    /// The capture did not hold a decodable class, name and method type.
    #[error("got bad data: {0}")]
    MalformedCapture(String),

    /// The recovered member does not exist.
    #[error("couldn't find method {owner} {name}{desc}")]
    UnresolvedTarget {
        /// Class named by the captured mirror
        owner: String,
        /// Captured member name
        name: String,
        /// Captured member descriptor
        desc: String,
    },
}

impl SiteFailure {
    /// The event kind this failure is reported as.
    #[must_use]
    pub fn event_kind(&self) -> EventKind {
        match self {
            SiteFailure::InterpretedException { .. } => EventKind::InterpretedException,
            SiteFailure::Fault(_) | SiteFailure::Probe(_) => EventKind::InterpreterFault,
            SiteFailure::MalformedCapture(_) => EventKind::MalformedCapture,
            SiteFailure::UnresolvedTarget { .. } => EventKind::UnresolvedTarget,
        }
    }

    /// Renders the failure together with its chain of causes.
    #[must_use]
    pub fn render_chain(&self) -> String {
        let mut rendered = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            rendered.push_str(": ");
            rendered.push_str(&cause.to_string());
            source = cause.source();
        }
        rendered
    }
}

impl From<crate::Error> for SiteFailure {
    fn from(error: crate::Error) -> Self {
        SiteFailure::Probe(error)
    }
}
