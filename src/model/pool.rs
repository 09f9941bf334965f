//! The set of classes under analysis and the library classes they call into.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::{
    model::{ClassNode, MethodNode},
    Error, Result,
};

/// All classes loaded for analysis, indexed by internal name.
///
/// Classes keep their insertion order, which is also the order in which
/// transformers visit them.
///
/// Library classes (the JDK, third-party jars) live in a separate tier. They
/// are visible to [`ClassPool::resolve`] and [`ClassPool::find_method`] but
/// are never scanned, patched or initialized ahead of time.
#[derive(Debug, Clone, Default)]
pub struct ClassPool {
    classes: Vec<ClassNode>,
    index: HashMap<String, usize>,
    libraries: Vec<ClassNode>,
    library_index: HashMap<String, usize>,
}

impl ClassPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a class.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateClass`] if a class with the same name exists.
    pub fn insert(&mut self, class: ClassNode) -> Result<()> {
        if self.is_known(&class.name) {
            return Err(Error::DuplicateClass(class.name));
        }
        self.index.insert(class.name.clone(), self.classes.len());
        self.classes.push(class);
        Ok(())
    }

    /// Adds a library class.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateClass`] if a class with the same name exists
    /// in either tier.
    pub fn insert_library(&mut self, class: ClassNode) -> Result<()> {
        if self.is_known(&class.name) {
            return Err(Error::DuplicateClass(class.name));
        }
        self.library_index.insert(class.name.clone(), self.libraries.len());
        self.libraries.push(class);
        Ok(())
    }

    fn is_known(&self, name: &str) -> bool {
        self.index.contains_key(name) || self.library_index.contains_key(name)
    }

    /// Looks up a class under analysis, then a library class.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&ClassNode> {
        self.get(name)
            .or_else(|| self.library_index.get(name).map(|&i| &self.libraries[i]))
    }

    /// Returns `true` if `name` is a library class.
    #[must_use]
    pub fn is_library(&self, name: &str) -> bool {
        self.library_index.contains_key(name)
    }

    /// Library classes, in insertion order.
    #[must_use]
    pub fn libraries(&self) -> &[ClassNode] {
        &self.libraries
    }

    /// Looks up a class under analysis by internal name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ClassNode> {
        self.index.get(name).map(|&i| &self.classes[i])
    }

    /// Mutable variant of [`ClassPool::get`].
    pub fn get_mut(&mut self, name: &str) -> Option<&mut ClassNode> {
        self.index.get(name).map(|&i| &mut self.classes[i])
    }

    /// Returns `true` if the class is under analysis.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All classes, in insertion order.
    #[must_use]
    pub fn classes(&self) -> &[ClassNode] {
        &self.classes
    }

    /// Internal names of all classes, in insertion order.
    #[must_use]
    pub fn class_names(&self) -> Vec<String> {
        self.classes.iter().map(|c| c.name.clone()).collect()
    }

    /// Number of classes under analysis.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns `true` if the pool holds no classes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Looks up a method declared directly by `class`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClassNotFound`] or [`Error::MethodNotFound`].
    pub fn method(&self, class: &str, name: &str, desc: &str) -> Result<&MethodNode> {
        self.get(class)
            .ok_or_else(|| Error::ClassNotFound(class.to_string()))?
            .method(name, desc)
            .ok_or_else(|| Error::MethodNotFound {
                class: class.to_string(),
                name: name.to_string(),
                desc: desc.to_string(),
            })
    }

    /// Mutable variant of [`ClassPool::method`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClassNotFound`] or [`Error::MethodNotFound`].
    pub fn method_mut(&mut self, class: &str, name: &str, desc: &str) -> Result<&mut MethodNode> {
        self.get_mut(class)
            .ok_or_else(|| Error::ClassNotFound(class.to_string()))?
            .method_mut(name, desc)
            .ok_or_else(|| Error::MethodNotFound {
                class: class.to_string(),
                name: name.to_string(),
                desc: desc.to_string(),
            })
    }

    /// Finds the class that declares `name` + `desc`, starting at `owner`.
    ///
    /// `owner` itself is searched first. With `hierarchy` set the search
    /// continues through the superclass chain and then through all
    /// superinterfaces, breadth first. Both tiers are searched; classes
    /// outside the pool end that branch of the search. Cyclic hierarchies
    /// terminate.
    #[must_use]
    pub fn find_method(
        &self,
        owner: &str,
        name: &str,
        desc: &str,
        hierarchy: bool,
    ) -> Option<(&ClassNode, &MethodNode)> {
        let start = self.resolve(owner)?;
        if let Some(method) = start.method(name, desc) {
            return Some((start, method));
        }
        if !hierarchy {
            return None;
        }

        let mut visited = HashSet::new();
        visited.insert(owner);
        let mut interfaces = VecDeque::new();
        interfaces.extend(start.interfaces.iter().map(String::as_str));

        let mut current = start.super_name.as_deref();
        while let Some(name_of_super) = current {
            if !visited.insert(name_of_super) {
                break;
            }
            let Some(class) = self.resolve(name_of_super) else {
                break;
            };
            if let Some(method) = class.method(name, desc) {
                return Some((class, method));
            }
            interfaces.extend(class.interfaces.iter().map(String::as_str));
            current = class.super_name.as_deref();
        }

        while let Some(iface) = interfaces.pop_front() {
            if !visited.insert(iface) {
                continue;
            }
            let Some(class) = self.resolve(iface) else {
                continue;
            };
            if let Some(method) = class.method(name, desc) {
                return Some((class, method));
            }
            interfaces.extend(class.interfaces.iter().map(String::as_str));
        }

        None
    }
}
