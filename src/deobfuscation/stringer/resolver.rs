//! Target resolution from captured lookup arguments.

use strum::{Display, EnumIter};

use crate::{
    deobfuscation::stringer::{CaptureBuffer, SiteFailure},
    emulation::VirtualMachine,
    model::{ClassPool, InvokeKind},
};

/// How the recovered member is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum DispatchKind {
    /// `invokestatic`
    #[strum(serialize = "static")]
    Static,
    /// `invokevirtual`
    #[strum(serialize = "virtual")]
    Virtual,
    /// `invokeinterface`
    #[strum(serialize = "interface")]
    Interface,
}

impl DispatchKind {
    /// Picks the dispatch kind for a member.
    ///
    /// Static members are always invoked statically. Instance members use
    /// interface dispatch when the owner is an interface, virtual otherwise.
    #[must_use]
    pub fn select(member_is_static: bool, owner_is_interface: bool) -> Self {
        if member_is_static {
            DispatchKind::Static
        } else if owner_is_interface {
            DispatchKind::Interface
        } else {
            DispatchKind::Virtual
        }
    }

    /// The invoke instruction used for this kind.
    #[must_use]
    pub fn invoke_kind(self) -> InvokeKind {
        match self {
            DispatchKind::Static => InvokeKind::Static,
            DispatchKind::Virtual => InvokeKind::Virtual,
            DispatchKind::Interface => InvokeKind::Interface,
        }
    }

    /// Whether the emitted call references an interface method.
    #[must_use]
    pub fn is_interface(self) -> bool {
        self == DispatchKind::Interface
    }
}

/// A concrete member recovered for one call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Class named by the captured mirror.
    pub owner: String,
    /// Member name as declared.
    pub name: String,
    /// Member descriptor as declared.
    pub desc: String,
    /// Dispatch kind of the replacement call.
    pub kind: DispatchKind,
}

/// Resolves the captured `(Class, String, MethodType)` triple.
///
/// The member is looked up on the captured class and, with `hierarchy` set,
/// on its supertypes. Library classes of the pool are searched too. The target keeps the captured class as owner even when
/// the member is inherited.
///
/// # Errors
///
/// Returns [`SiteFailure::MalformedCapture`] if the capture does not hold
/// exactly three decodable values, and [`SiteFailure::UnresolvedTarget`] if
/// no such member exists.
pub fn resolve_target<V: VirtualMachine + ?Sized>(
    capture: &CaptureBuffer,
    vm: &V,
    pool: &ClassPool,
    hierarchy: bool,
) -> Result<ResolvedTarget, SiteFailure> {
    let [class, name, method_type] = capture.values() else {
        return Err(SiteFailure::MalformedCapture(capture.to_string()));
    };

    let malformed = || SiteFailure::MalformedCapture(capture.to_string());
    let owner = vm.decode_class(class).ok_or_else(malformed)?;
    let name = vm.decode_string(name).ok_or_else(malformed)?;
    let desc = vm.decode_method_type(method_type).ok_or_else(malformed)?;

    let unresolved = || SiteFailure::UnresolvedTarget {
        owner: owner.clone(),
        name: name.clone(),
        desc: desc.clone(),
    };
    let owner_is_interface = pool.resolve(&owner).ok_or_else(unresolved)?.is_interface();
    let (_, member) = pool
        .find_method(&owner, &name, &desc, hierarchy)
        .ok_or_else(unresolved)?;

    Ok(ResolvedTarget {
        kind: DispatchKind::select(member.is_static(), owner_is_interface),
        name: member.name.clone(),
        desc: member.desc.clone(),
        owner,
    })
}
