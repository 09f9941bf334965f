//! Instruction representation.
//!
//! Instructions are kept in a symbolic, tree-like form: operands reference
//! classes, members and descriptors by name instead of by constant pool index.
//! This is the shape a rewriting pass wants to work with; an instruction can be
//! cloned into a different method or replaced without any pool bookkeeping.

use std::fmt;

use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::{model::MethodDescriptor, Result};

/// JVM opcodes known to the model.
///
/// The `Display` output is the mnemonic used by `javap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[allow(missing_docs)]
pub enum Opcode {
    #[strum(serialize = "nop")]
    Nop,
    #[strum(serialize = "aconst_null")]
    AconstNull,
    #[strum(serialize = "iconst_m1")]
    IconstM1,
    #[strum(serialize = "iconst_0")]
    Iconst0,
    #[strum(serialize = "iconst_1")]
    Iconst1,
    #[strum(serialize = "iconst_2")]
    Iconst2,
    #[strum(serialize = "iconst_3")]
    Iconst3,
    #[strum(serialize = "iconst_4")]
    Iconst4,
    #[strum(serialize = "iconst_5")]
    Iconst5,
    #[strum(serialize = "lconst_0")]
    Lconst0,
    #[strum(serialize = "lconst_1")]
    Lconst1,
    #[strum(serialize = "fconst_0")]
    Fconst0,
    #[strum(serialize = "fconst_1")]
    Fconst1,
    #[strum(serialize = "fconst_2")]
    Fconst2,
    #[strum(serialize = "dconst_0")]
    Dconst0,
    #[strum(serialize = "dconst_1")]
    Dconst1,
    #[strum(serialize = "bipush")]
    Bipush,
    #[strum(serialize = "sipush")]
    Sipush,
    #[strum(serialize = "ldc")]
    Ldc,
    #[strum(serialize = "iload")]
    Iload,
    #[strum(serialize = "lload")]
    Lload,
    #[strum(serialize = "fload")]
    Fload,
    #[strum(serialize = "dload")]
    Dload,
    #[strum(serialize = "aload")]
    Aload,
    #[strum(serialize = "istore")]
    Istore,
    #[strum(serialize = "lstore")]
    Lstore,
    #[strum(serialize = "fstore")]
    Fstore,
    #[strum(serialize = "dstore")]
    Dstore,
    #[strum(serialize = "astore")]
    Astore,
    #[strum(serialize = "pop")]
    Pop,
    #[strum(serialize = "pop2")]
    Pop2,
    #[strum(serialize = "dup")]
    Dup,
    #[strum(serialize = "swap")]
    Swap,
    #[strum(serialize = "iadd")]
    Iadd,
    #[strum(serialize = "ladd")]
    Ladd,
    #[strum(serialize = "isub")]
    Isub,
    #[strum(serialize = "imul")]
    Imul,
    #[strum(serialize = "ixor")]
    Ixor,
    #[strum(serialize = "ireturn")]
    Ireturn,
    #[strum(serialize = "lreturn")]
    Lreturn,
    #[strum(serialize = "freturn")]
    Freturn,
    #[strum(serialize = "dreturn")]
    Dreturn,
    #[strum(serialize = "areturn")]
    Areturn,
    #[strum(serialize = "return")]
    Return,
    #[strum(serialize = "getstatic")]
    Getstatic,
    #[strum(serialize = "putstatic")]
    Putstatic,
    #[strum(serialize = "getfield")]
    Getfield,
    #[strum(serialize = "putfield")]
    Putfield,
    #[strum(serialize = "invokevirtual")]
    Invokevirtual,
    #[strum(serialize = "invokespecial")]
    Invokespecial,
    #[strum(serialize = "invokestatic")]
    Invokestatic,
    #[strum(serialize = "invokeinterface")]
    Invokeinterface,
    #[strum(serialize = "invokedynamic")]
    Invokedynamic,
    #[strum(serialize = "new")]
    New,
    #[strum(serialize = "anewarray")]
    Anewarray,
    #[strum(serialize = "arraylength")]
    Arraylength,
    #[strum(serialize = "athrow")]
    Athrow,
    #[strum(serialize = "checkcast")]
    Checkcast,
    #[strum(serialize = "instanceof")]
    Instanceof,
}

impl Opcode {
    /// The opcode byte as encoded in a `Code` attribute.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Opcode::Nop => 0x00,
            Opcode::AconstNull => 0x01,
            Opcode::IconstM1 => 0x02,
            Opcode::Iconst0 => 0x03,
            Opcode::Iconst1 => 0x04,
            Opcode::Iconst2 => 0x05,
            Opcode::Iconst3 => 0x06,
            Opcode::Iconst4 => 0x07,
            Opcode::Iconst5 => 0x08,
            Opcode::Lconst0 => 0x09,
            Opcode::Lconst1 => 0x0a,
            Opcode::Fconst0 => 0x0b,
            Opcode::Fconst1 => 0x0c,
            Opcode::Fconst2 => 0x0d,
            Opcode::Dconst0 => 0x0e,
            Opcode::Dconst1 => 0x0f,
            Opcode::Bipush => 0x10,
            Opcode::Sipush => 0x11,
            Opcode::Ldc => 0x12,
            Opcode::Iload => 0x15,
            Opcode::Lload => 0x16,
            Opcode::Fload => 0x17,
            Opcode::Dload => 0x18,
            Opcode::Aload => 0x19,
            Opcode::Istore => 0x36,
            Opcode::Lstore => 0x37,
            Opcode::Fstore => 0x38,
            Opcode::Dstore => 0x39,
            Opcode::Astore => 0x3a,
            Opcode::Pop => 0x57,
            Opcode::Pop2 => 0x58,
            Opcode::Dup => 0x59,
            Opcode::Swap => 0x5f,
            Opcode::Iadd => 0x60,
            Opcode::Ladd => 0x61,
            Opcode::Isub => 0x64,
            Opcode::Imul => 0x68,
            Opcode::Ixor => 0x82,
            Opcode::Ireturn => 0xac,
            Opcode::Lreturn => 0xad,
            Opcode::Freturn => 0xae,
            Opcode::Dreturn => 0xaf,
            Opcode::Areturn => 0xb0,
            Opcode::Return => 0xb1,
            Opcode::Getstatic => 0xb2,
            Opcode::Putstatic => 0xb3,
            Opcode::Getfield => 0xb4,
            Opcode::Putfield => 0xb5,
            Opcode::Invokevirtual => 0xb6,
            Opcode::Invokespecial => 0xb7,
            Opcode::Invokestatic => 0xb8,
            Opcode::Invokeinterface => 0xb9,
            Opcode::Invokedynamic => 0xba,
            Opcode::New => 0xbb,
            Opcode::Anewarray => 0xbd,
            Opcode::Arraylength => 0xbe,
            Opcode::Athrow => 0xbf,
            Opcode::Checkcast => 0xc0,
            Opcode::Instanceof => 0xc1,
        }
    }

    /// Looks up an opcode by its encoded byte.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Opcode::iter().find(|op| op.code() == code)
    }
}

/// The four invoke instructions that name their target directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum InvokeKind {
    /// `invokevirtual`
    #[strum(serialize = "invokevirtual")]
    Virtual,
    /// `invokespecial`
    #[strum(serialize = "invokespecial")]
    Special,
    /// `invokestatic`
    #[strum(serialize = "invokestatic")]
    Static,
    /// `invokeinterface`
    #[strum(serialize = "invokeinterface")]
    Interface,
}

impl InvokeKind {
    /// The opcode emitted for this kind of invocation.
    #[must_use]
    pub fn opcode(self) -> Opcode {
        match self {
            InvokeKind::Virtual => Opcode::Invokevirtual,
            InvokeKind::Special => Opcode::Invokespecial,
            InvokeKind::Static => Opcode::Invokestatic,
            InvokeKind::Interface => Opcode::Invokeinterface,
        }
    }
}

/// Method handle reference kinds (JVMS §5.4.3.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[allow(missing_docs)]
pub enum HandleKind {
    GetField,
    GetStatic,
    PutField,
    PutStatic,
    InvokeVirtual,
    InvokeStatic,
    InvokeSpecial,
    NewInvokeSpecial,
    InvokeInterface,
}

impl HandleKind {
    /// The `reference_kind` value of a `CONSTANT_MethodHandle`.
    #[must_use]
    pub fn tag(self) -> u8 {
        match self {
            HandleKind::GetField => 1,
            HandleKind::GetStatic => 2,
            HandleKind::PutField => 3,
            HandleKind::PutStatic => 4,
            HandleKind::InvokeVirtual => 5,
            HandleKind::InvokeStatic => 6,
            HandleKind::InvokeSpecial => 7,
            HandleKind::NewInvokeSpecial => 8,
            HandleKind::InvokeInterface => 9,
        }
    }
}

/// A symbolic method handle, as used for bootstrap methods.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Handle {
    /// Reference kind of the handle.
    pub kind: HandleKind,
    /// Internal name of the class that owns the referenced member.
    pub owner: String,
    /// Name of the referenced member.
    pub name: String,
    /// Descriptor of the referenced member.
    pub desc: String,
    /// Whether the owner is an interface.
    pub interface: bool,
}

impl Handle {
    /// Creates a handle to a static method on a class.
    #[must_use]
    pub fn invoke_static(
        owner: impl Into<String>,
        name: impl Into<String>,
        desc: impl Into<String>,
    ) -> Self {
        Self {
            kind: HandleKind::InvokeStatic,
            owner: owner.into(),
            name: name.into(),
            desc: desc.into(),
            interface: false,
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}.{}{}", self.kind, self.owner, self.name, self.desc)
    }
}

/// A loadable constant (`ldc` operand or bootstrap argument).
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum Constant {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    /// A class literal, by internal name or array descriptor.
    Class(String),
    /// A `MethodType` constant, by method descriptor.
    MethodType(String),
    Handle(Handle),
}

/// A direct method invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodInsn {
    /// Which invoke instruction is used.
    pub kind: InvokeKind,
    /// Internal name of the class or interface named by the call.
    pub owner: String,
    /// Method name.
    pub name: String,
    /// Method descriptor.
    pub desc: String,
    /// Whether `owner` is an interface (`InterfaceMethodref`).
    pub interface: bool,
}

/// A field access instruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldInsn {
    /// One of `getstatic`, `putstatic`, `getfield`, `putfield`.
    pub opcode: Opcode,
    /// Internal name of the owning class.
    pub owner: String,
    /// Field name.
    pub name: String,
    /// Field descriptor.
    pub desc: String,
}

/// A dynamic call site.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeDynamicInsn {
    /// Call site name.
    pub name: String,
    /// Call site descriptor; its parameters are what the site pops.
    pub desc: String,
    /// Bootstrap method.
    pub bsm: Handle,
    /// Static bootstrap arguments.
    pub bsm_args: Vec<Constant>,
}

impl InvokeDynamicInsn {
    /// Parses the call site descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error if the descriptor is invalid.
    pub fn descriptor(&self) -> Result<MethodDescriptor> {
        MethodDescriptor::parse(&self.desc)
    }
}

impl fmt::Display for InvokeDynamicInsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invokedynamic {}{} [{}]", self.name, self.desc, self.bsm)
    }
}

/// A single instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Insn {
    /// An instruction without operands.
    Simple(Opcode),
    /// `bipush` / `sipush` with its immediate.
    Push {
        /// `bipush` or `sipush`
        opcode: Opcode,
        /// Immediate value
        value: i16,
    },
    /// `ldc` and its wide forms.
    Ldc(Constant),
    /// Local variable load or store.
    Var {
        /// One of the `*load` / `*store` opcodes
        opcode: Opcode,
        /// Local variable slot
        index: u16,
    },
    /// Instruction with a class operand (`new`, `anewarray`, `checkcast`, `instanceof`).
    Type {
        /// The instruction
        opcode: Opcode,
        /// Internal name or array descriptor
        desc: String,
    },
    /// Field access.
    Field(FieldInsn),
    /// Direct method invocation.
    Method(MethodInsn),
    /// Dynamic call site.
    InvokeDynamic(InvokeDynamicInsn),
}

impl Insn {
    /// Returns the opcode of this instruction.
    #[must_use]
    pub fn opcode(&self) -> Opcode {
        match self {
            Insn::Simple(op) => *op,
            Insn::Push { opcode, .. } | Insn::Var { opcode, .. } | Insn::Type { opcode, .. } => {
                *opcode
            }
            Insn::Ldc(_) => Opcode::Ldc,
            Insn::Field(field) => field.opcode,
            Insn::Method(method) => method.kind.opcode(),
            Insn::InvokeDynamic(_) => Opcode::Invokedynamic,
        }
    }

    /// Returns the dynamic call site if this is an `invokedynamic`.
    #[must_use]
    pub fn as_invoke_dynamic(&self) -> Option<&InvokeDynamicInsn> {
        match self {
            Insn::InvokeDynamic(indy) => Some(indy),
            _ => None,
        }
    }

    /// Returns the invocation if this is one of the direct invoke instructions.
    #[must_use]
    pub fn as_method(&self) -> Option<&MethodInsn> {
        match self {
            Insn::Method(method) => Some(method),
            _ => None,
        }
    }
}

impl fmt::Display for Insn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Insn::Simple(op) => write!(f, "{}", op),
            Insn::Push { opcode, value } => write!(f, "{} {}", opcode, value),
            Insn::Ldc(constant) => write!(f, "ldc {:?}", constant),
            Insn::Var { opcode, index } => write!(f, "{} {}", opcode, index),
            Insn::Type { opcode, desc } => write!(f, "{} {}", opcode, desc),
            Insn::Field(field) => write!(
                f,
                "{} {}.{}:{}",
                field.opcode, field.owner, field.name, field.desc
            ),
            Insn::Method(method) => write!(
                f,
                "{} {}.{}{}",
                method.kind, method.owner, method.name, method.desc
            ),
            Insn::InvokeDynamic(indy) => write!(f, "{}", indy),
        }
    }
}
