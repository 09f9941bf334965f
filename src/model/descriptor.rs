//! JVM field and method descriptors.
//!
//! Descriptors are the only type information the deobfuscator needs: the
//! argument list of an `invokedynamic` site decides which placeholder values a
//! probe pushes, and the descriptor recovered from a captured `MethodType`
//! selects the member that is finally called.

use std::fmt;

use crate::{
    model::{Insn, Opcode},
    Error, Result,
};

/// A JVM type as written in a descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum JvmType {
    /// `Z`
    Boolean,
    /// `B`
    Byte,
    /// `C`
    Char,
    /// `S`
    Short,
    /// `I`
    Int,
    /// `J`
    Long,
    /// `F`
    Float,
    /// `D`
    Double,
    /// `V`, only valid as a return type.
    Void,
    /// `L<internal name>;`
    Reference(String),
    /// `[<component>`
    Array(Box<JvmType>),
}

impl JvmType {
    /// Returns true if this type occupies two slots on the operand stack.
    #[must_use]
    pub fn is_wide(&self) -> bool {
        matches!(self, JvmType::Long | JvmType::Double)
    }

    /// Returns true for class, interface and array types.
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self, JvmType::Reference(_) | JvmType::Array(_))
    }

    /// Returns the instruction that pushes the zero value of this type.
    ///
    /// Integral types (including `boolean`, `byte`, `char` and `short`) use
    /// `iconst_0`, the remaining primitives their own `*const_0`, and all
    /// reference types `aconst_null`. `void` has no value and yields `None`.
    #[must_use]
    pub fn zero_insn(&self) -> Option<Insn> {
        let opcode = match self {
            JvmType::Boolean | JvmType::Byte | JvmType::Char | JvmType::Short | JvmType::Int => {
                Opcode::Iconst0
            }
            JvmType::Long => Opcode::Lconst0,
            JvmType::Float => Opcode::Fconst0,
            JvmType::Double => Opcode::Dconst0,
            JvmType::Reference(_) | JvmType::Array(_) => Opcode::AconstNull,
            JvmType::Void => return None,
        };
        Some(Insn::Simple(opcode))
    }

    /// Parses a single field descriptor such as `I` or `[Ljava/lang/String;`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDescriptor`] if the input is not exactly one
    /// well-formed type.
    pub fn parse(desc: &str) -> Result<Self> {
        match parse_type_at(desc, 0) {
            Some((ty, next)) if next == desc.len() => Ok(ty),
            _ => Err(Error::InvalidDescriptor(desc.to_string())),
        }
    }
}

impl fmt::Display for JvmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JvmType::Boolean => f.write_str("Z"),
            JvmType::Byte => f.write_str("B"),
            JvmType::Char => f.write_str("C"),
            JvmType::Short => f.write_str("S"),
            JvmType::Int => f.write_str("I"),
            JvmType::Long => f.write_str("J"),
            JvmType::Float => f.write_str("F"),
            JvmType::Double => f.write_str("D"),
            JvmType::Void => f.write_str("V"),
            JvmType::Reference(name) => write!(f, "L{};", name),
            JvmType::Array(inner) => write!(f, "[{}", inner),
        }
    }
}

/// Parse a single type descriptor starting at position `pos` in `desc`.
/// Returns (JvmType, next_position).
fn parse_type_at(desc: &str, pos: usize) -> Option<(JvmType, usize)> {
    let bytes = desc.as_bytes();
    match *bytes.get(pos)? {
        b'Z' => Some((JvmType::Boolean, pos + 1)),
        b'B' => Some((JvmType::Byte, pos + 1)),
        b'C' => Some((JvmType::Char, pos + 1)),
        b'S' => Some((JvmType::Short, pos + 1)),
        b'I' => Some((JvmType::Int, pos + 1)),
        b'J' => Some((JvmType::Long, pos + 1)),
        b'F' => Some((JvmType::Float, pos + 1)),
        b'D' => Some((JvmType::Double, pos + 1)),
        b'V' => Some((JvmType::Void, pos + 1)),
        b'L' => {
            let semi = desc[pos + 1..].find(';')?;
            if semi == 0 {
                return None;
            }
            let class_name = &desc[pos + 1..pos + 1 + semi];
            Some((JvmType::Reference(class_name.to_string()), pos + semi + 2))
        }
        b'[' => {
            let (inner, next) = parse_type_at(desc, pos + 1)?;
            if inner == JvmType::Void {
                return None;
            }
            Some((JvmType::Array(Box::new(inner)), next))
        }
        _ => None,
    }
}

/// A parsed method descriptor, e.g. `(ILjava/lang/String;)V`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    /// Declared parameter types, in order.
    pub params: Vec<JvmType>,
    /// Return type, [`JvmType::Void`] for `V`.
    pub ret: JvmType,
}

impl MethodDescriptor {
    /// Parses a method descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDescriptor`] for syntactically invalid input and
    /// [`Error::Malformed`] if a parameter is declared `void`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use indyscope::model::{JvmType, MethodDescriptor};
    ///
    /// let desc = MethodDescriptor::parse("(IJ[Ljava/lang/String;)Z")?;
    /// assert_eq!(desc.params.len(), 3);
    /// assert_eq!(desc.ret, JvmType::Boolean);
    /// assert_eq!(desc.to_string(), "(IJ[Ljava/lang/String;)Z");
    /// # Ok::<(), indyscope::Error>(())
    /// ```
    pub fn parse(desc: &str) -> Result<Self> {
        let invalid = || Error::InvalidDescriptor(desc.to_string());

        if !desc.starts_with('(') {
            return Err(invalid());
        }
        let close = desc.find(')').ok_or_else(invalid)?;

        let mut params = Vec::new();
        let mut pos = 1;
        while pos < close {
            let (ty, next) = parse_type_at(desc, pos).ok_or_else(invalid)?;
            if next > close {
                return Err(invalid());
            }
            if ty == JvmType::Void {
                return Err(malformed_error!(
                    "method descriptor '{}' declares a void parameter",
                    desc
                ));
            }
            params.push(ty);
            pos = next;
        }

        match parse_type_at(desc, close + 1) {
            Some((ret, next)) if next == desc.len() => Ok(Self { params, ret }),
            _ => Err(invalid()),
        }
    }

    /// Number of operand stack slots the parameters occupy.
    #[must_use]
    pub fn param_slots(&self) -> usize {
        self.params
            .iter()
            .map(|p| if p.is_wide() { 2 } else { 1 })
            .sum()
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for param in &self.params {
            write!(f, "{}", param)?;
        }
        write!(f, "){}", self.ret)
    }
}

/// Returns the parameter types of a method descriptor.
///
/// Shorthand for [`MethodDescriptor::parse`] when only the arguments matter.
///
/// # Errors
///
/// See [`MethodDescriptor::parse`].
pub fn argument_types(desc: &str) -> Result<Vec<JvmType>> {
    Ok(MethodDescriptor::parse(desc)?.params)
}
