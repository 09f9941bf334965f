use thiserror::Error;

use crate::emulation::EmulationError;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Per-site failures during invokedynamic recovery are *not* reported through this type; they
/// are contained in [`crate::deobfuscation::stringer::SiteFailure`] and turned into events.
/// This enum covers the failures that make an operation on the class model itself impossible.
///
/// # Error Categories
///
/// ## Model Errors
/// - [`Error::Malformed`] - Structurally invalid bytecode model data
/// - [`Error::InvalidDescriptor`] - A type or method descriptor could not be parsed
/// - [`Error::ClassNotFound`] - Requested class is not part of the [`crate::model::ClassPool`]
/// - [`Error::MethodNotFound`] - Requested method is not declared by a class
/// - [`Error::DuplicateClass`] / [`Error::DuplicateMethod`] - Insertion would shadow a member
///
/// ## Emulation Errors
/// - [`Error::Emulation`] - The sandboxed interpreter could not be created or driven
///
/// # Examples
///
/// ```rust
/// use indyscope::{Error, model::MethodDescriptor};
///
/// match MethodDescriptor::parse("(I") {
///     Err(Error::InvalidDescriptor(desc)) => assert_eq!(desc, "(I"),
///     other => panic!("unexpected: {:?}", other),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The model data is damaged and could not be used.
    ///
    /// The error includes the source location where the malformation was
    /// detected for debugging purposes.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A field or method descriptor is not valid JVM descriptor syntax.
    #[error("Invalid descriptor - {0}")]
    InvalidDescriptor(String),

    /// The class is not part of the class pool.
    #[error("Class not found - {0}")]
    ClassNotFound(String),

    /// The class does not declare a method with this name and descriptor.
    #[error("Method not found - {class}.{name}{desc}")]
    MethodNotFound {
        /// Internal name of the class that was searched
        class: String,
        /// Method name
        name: String,
        /// Method descriptor
        desc: String,
    },

    /// A class with the same internal name is already part of the pool.
    #[error("Duplicate class - {0}")]
    DuplicateClass(String),

    /// The class already declares a method with this name and descriptor.
    #[error("Duplicate method - {class}.{name}{desc}")]
    DuplicateMethod {
        /// Internal name of the declaring class
        class: String,
        /// Method name
        name: String,
        /// Method descriptor
        desc: String,
    },

    /// The sandboxed interpreter failed outside of a probe execution.
    ///
    /// Faults that happen while a probe runs are reported through
    /// [`crate::emulation::ExecutionOutcome::Faulted`] instead.
    #[error("{0}")]
    Emulation(#[from] Box<EmulationError>),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),
}
