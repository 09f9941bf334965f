//! Event logging for deobfuscation runs.
//!
//! Every per-site result of a transformer is recorded as an [`Event`] in an
//! [`EventLog`]. Failures are recovered locally and never abort a batch, so
//! the log is the only place they surface. Each recorded event is also
//! forwarded to the `log` facade at a level derived from its kind.
//!
//! # Example
//!
//! ```rust
//! use indyscope::deobfuscation::{EventKind, EventLog};
//!
//! let log = EventLog::new();
//! log.record(EventKind::SiteDecrypted)
//!     .at("com/example/Foo", "run()V", 3)
//!     .message("invokestatic com/example/Bar.baz()V");
//!
//! assert_eq!(log.count_kind(EventKind::SiteDecrypted), 1);
//! assert_eq!(log.summary(), "1 site decrypted");
//! ```

use std::{collections::HashMap, fmt};

use log::Level;

/// Categories of events that can be logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// A dynamic call site was rewritten into a direct call.
    SiteDecrypted,
    /// Interpreted code threw while a site was probed.
    InterpretedException,
    /// The interpreter faulted while a site was probed.
    InterpreterFault,
    /// The probe did not deliver the expected lookup arguments.
    MalformedCapture,
    /// The recovered member does not exist in the class pool.
    UnresolvedTarget,
    /// A probe run started.
    ProbeStarted,
    /// A method received its queued rewrites.
    MethodPatched,
    /// Informational message.
    Info,
}

impl EventKind {
    /// Returns a human-readable description of this event kind.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::SiteDecrypted => "site decrypted",
            Self::InterpretedException => "interpreted exception",
            Self::InterpreterFault => "interpreter fault",
            Self::MalformedCapture => "malformed capture",
            Self::UnresolvedTarget => "unresolved target",
            Self::ProbeStarted => "probe started",
            Self::MethodPatched => "method patched",
            Self::Info => "info",
        }
    }

    /// Returns true if this event means a site was given up.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::InterpretedException
                | Self::InterpreterFault
                | Self::MalformedCapture
                | Self::UnresolvedTarget
        )
    }

    /// Level at which events of this kind are forwarded to `log`.
    #[must_use]
    pub fn level(&self) -> Level {
        match self {
            Self::SiteDecrypted
            | Self::MethodPatched
            | Self::InterpretedException
            | Self::InterpreterFault
            | Self::Info => Level::Info,
            Self::MalformedCapture | Self::UnresolvedTarget => Level::Warn,
            Self::ProbeStarted => Level::Debug,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A single logged event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// The type of event.
    pub kind: EventKind,
    /// Internal name of the class the event concerns.
    pub class: Option<String>,
    /// Method (`name` + descriptor) the event concerns.
    pub method: Option<String>,
    /// Instruction index within the method.
    pub location: Option<usize>,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.kind)?;
        if let Some(class) = &self.class {
            write!(f, " {}", class)?;
            if let Some(method) = &self.method {
                write!(f, ".{}", method)?;
            }
            if let Some(location) = self.location {
                write!(f, " @{}", location)?;
            }
        }
        write!(f, " {}", self.message)
    }
}

/// Builder for creating events with a fluent API.
///
/// Created by [`EventLog::record`]. The event is added to the log when the
/// builder is dropped.
pub struct EventBuilder<'a> {
    log: &'a EventLog,
    kind: EventKind,
    class: Option<String>,
    method: Option<String>,
    location: Option<usize>,
    message: Option<String>,
}

impl<'a> EventBuilder<'a> {
    fn new(log: &'a EventLog, kind: EventKind) -> Self {
        Self {
            log,
            kind,
            class: None,
            method: None,
            location: None,
            message: None,
        }
    }

    /// Sets the class, method and instruction index the event concerns.
    pub fn at(mut self, class: &str, method: &str, location: usize) -> Self {
        self.class = Some(class.to_string());
        self.method = Some(method.to_string());
        self.location = Some(location);
        self
    }

    /// Sets the class and method, for method-level events.
    pub fn in_method(mut self, class: &str, method: &str) -> Self {
        self.class = Some(class.to_string());
        self.method = Some(method.to_string());
        self
    }

    /// Sets a custom message describing the event.
    pub fn message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }
}

impl Drop for EventBuilder<'_> {
    fn drop(&mut self) {
        let message = self
            .message
            .take()
            .unwrap_or_else(|| self.kind.description().to_string());

        self.log.push(Event {
            kind: self.kind,
            class: self.class.take(),
            method: self.method.take(),
            location: self.location.take(),
            message,
        });
    }
}

/// Collection of events from a deobfuscation run.
///
/// Events can be appended concurrently through shared references.
#[derive(Debug)]
pub struct EventLog {
    events: boxcar::Vec<Event>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self {
            events: boxcar::Vec::new(),
        }
    }
}

impl EventLog {
    /// Creates an empty event log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: Event) {
        log::log!(target: "indyscope", event.kind.level(), "{}", event);
        self.events.push(event);
    }

    /// Returns true if no events have been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.count() == 0
    }

    /// Returns the total number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.count()
    }

    /// Starts building a new event of the given kind.
    pub fn record(&self, kind: EventKind) -> EventBuilder<'_> {
        EventBuilder::new(self, kind)
    }

    /// Records an informational message.
    pub fn info(&self, message: impl Into<String>) {
        self.record(EventKind::Info).message(message);
    }

    /// Returns true if any event of the given kind exists.
    #[must_use]
    pub fn has(&self, kind: EventKind) -> bool {
        self.events.iter().any(|(_, e)| e.kind == kind)
    }

    /// Counts events of the given kind.
    #[must_use]
    pub fn count_kind(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|(_, e)| e.kind == kind).count()
    }

    /// Returns an iterator over all events.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().map(|(_, e)| e)
    }

    /// Returns an iterator over events of a specific kind.
    pub fn filter_kind(&self, kind: EventKind) -> impl Iterator<Item = &Event> + '_ {
        self.iter().filter(move |e| e.kind == kind)
    }

    /// Returns an iterator over events that record an abandoned site.
    pub fn failures(&self) -> impl Iterator<Item = &Event> + '_ {
        self.iter().filter(|e| e.kind.is_failure())
    }

    /// Counts events grouped by kind.
    #[must_use]
    pub fn count_by_kind(&self) -> HashMap<EventKind, usize> {
        let mut counts = HashMap::new();
        for (_, event) in &self.events {
            *counts.entry(event.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Generates a human-readable summary of decrypted and abandoned sites.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "no events".to_string();
        }

        let mut counts: Vec<_> = self
            .count_by_kind()
            .into_iter()
            .filter(|(kind, _)| *kind == EventKind::SiteDecrypted || kind.is_failure())
            .collect();

        if counts.is_empty() {
            return format!("{} events", self.len());
        }

        counts.sort();
        counts
            .into_iter()
            .map(|(kind, count)| format!("{} {}", count, kind.description()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Clone for EventLog {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl FromIterator<Event> for EventLog {
    fn from_iter<T: IntoIterator<Item = Event>>(iter: T) -> Self {
        let log = Self::new();
        for event in iter {
            log.events.push(event);
        }
        log
    }
}
