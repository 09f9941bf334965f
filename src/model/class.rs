//! Class and method nodes.

use crate::{
    model::{ClassAccessFlags, InsnList, MethodAccessFlags, MethodDescriptor},
    Error, Result,
};

/// A method declared by a class, with its instructions.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodNode {
    /// Access flags.
    pub access: MethodAccessFlags,
    /// Method name.
    pub name: String,
    /// Method descriptor.
    pub desc: String,
    /// Method body. Empty for abstract and native methods.
    pub instructions: InsnList,
}

impl MethodNode {
    /// Creates a method with an empty body.
    #[must_use]
    pub fn new(access: MethodAccessFlags, name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            access,
            name: name.into(),
            desc: desc.into(),
            instructions: InsnList::new(),
        }
    }

    /// Replaces the method body.
    #[must_use]
    pub fn with_instructions(mut self, instructions: InsnList) -> Self {
        self.instructions = instructions;
        self
    }

    /// Returns `true` if the method is static.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.access.is_static()
    }

    /// Parses the method descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error if the descriptor is invalid.
    pub fn descriptor(&self) -> Result<MethodDescriptor> {
        MethodDescriptor::parse(&self.desc)
    }

    /// Returns `true` if the method has this name and descriptor.
    #[must_use]
    pub fn matches(&self, name: &str, desc: &str) -> bool {
        self.name == name && self.desc == desc
    }
}

/// A class or interface.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassNode {
    /// Internal name, e.g. `com/example/Foo`.
    pub name: String,
    /// Access flags.
    pub access: ClassAccessFlags,
    /// Internal name of the superclass; `None` only for `java/lang/Object`.
    pub super_name: Option<String>,
    /// Internal names of the directly implemented interfaces.
    pub interfaces: Vec<String>,
    /// Declared methods, in declaration order.
    pub methods: Vec<MethodNode>,
}

impl ClassNode {
    /// Creates a class extending `java/lang/Object` with no methods.
    #[must_use]
    pub fn new(name: impl Into<String>, access: ClassAccessFlags) -> Self {
        Self {
            name: name.into(),
            access,
            super_name: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Returns `true` if this node describes an interface.
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.access.is_interface()
    }

    /// Looks up a declared method by name and descriptor.
    #[must_use]
    pub fn method(&self, name: &str, desc: &str) -> Option<&MethodNode> {
        self.methods.iter().find(|m| m.matches(name, desc))
    }

    /// Mutable variant of [`ClassNode::method`].
    pub fn method_mut(&mut self, name: &str, desc: &str) -> Option<&mut MethodNode> {
        self.methods.iter_mut().find(|m| m.matches(name, desc))
    }

    /// Returns `true` if the class declares a method with this name, of any descriptor.
    #[must_use]
    pub fn has_method_named(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m.name == name)
    }

    /// Appends a method.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateMethod`] if a method with the same name and
    /// descriptor is already declared.
    pub fn add_method(&mut self, method: MethodNode) -> Result<()> {
        if self.method(&method.name, &method.desc).is_some() {
            return Err(Error::DuplicateMethod {
                class: self.name.clone(),
                name: method.name,
                desc: method.desc,
            });
        }
        self.methods.push(method);
        Ok(())
    }

    /// Removes a method and returns it.
    pub fn remove_method(&mut self, name: &str, desc: &str) -> Option<MethodNode> {
        let pos = self.methods.iter().position(|m| m.matches(name, desc))?;
        Some(self.methods.remove(pos))
    }
}
