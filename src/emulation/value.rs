//! Runtime values exchanged with the interpreter.

use std::fmt;

/// Opaque handle to an object on the interpreter's heap.
///
/// Only the interpreter that issued a handle can decode it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef(pub u32);

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{:#x}", self.0)
    }
}

/// A JVM value as seen on the operand stack.
///
/// `boolean`, `byte`, `char` and `short` are widened to [`JavaValue::Int`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JavaValue {
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// The `null` reference.
    Null,
    /// A non-null reference.
    Reference(ObjectRef),
}

impl JavaValue {
    /// Returns the heap handle if this is a non-null reference.
    #[must_use]
    pub fn as_reference(&self) -> Option<ObjectRef> {
        match self {
            JavaValue::Reference(r) => Some(*r),
            _ => None,
        }
    }

    /// Returns true for `null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, JavaValue::Null)
    }
}

impl fmt::Display for JavaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JavaValue::Int(v) => write!(f, "{}", v),
            JavaValue::Long(v) => write!(f, "{}L", v),
            JavaValue::Float(v) => write!(f, "{}F", v),
            JavaValue::Double(v) => write!(f, "{}D", v),
            JavaValue::Null => f.write_str("null"),
            JavaValue::Reference(r) => write!(f, "{}", r),
        }
    }
}
