//! Host type metadata exposed to scripts.
//!
//! Backends cannot reflect over Rust types, so the host registers a
//! [`ClassDescriptor`] for every type it wants scripts to see. The descriptor
//! lists the operations the type exposes; backends render it through
//! [`ScriptInterpreter::class_methods`](crate::ScriptInterpreter::class_methods).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One exposed operation of a host type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    /// Method name.
    pub name: String,

    /// Parameter type names, in order.
    #[serde(default)]
    pub params: Vec<String>,

    /// Return type name, if the method returns anything.
    #[serde(default)]
    pub returns: Option<String>,
}

impl MethodSignature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns: None,
        }
    }

    pub fn param(mut self, ty: impl Into<String>) -> Self {
        self.params.push(ty.into());
        self
    }

    pub fn returns(mut self, ty: impl Into<String>) -> Self {
        self.returns = Some(ty.into());
        self
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.params.join(", "))?;
        if let Some(ret) = &self.returns {
            write!(f, " -> {}", ret)?;
        }
        Ok(())
    }
}

/// Metadata for one host type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    /// Type name as scripts see it.
    pub name: String,

    /// Declared methods.
    #[serde(default)]
    pub methods: Vec<MethodSignature>,
}

impl ClassDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    /// Add a method to the descriptor.
    pub fn method(mut self, signature: MethodSignature) -> Self {
        self.methods.push(signature);
        self
    }

    /// Rendered signatures, in declaration order.
    pub fn signatures(&self) -> Vec<String> {
        self.methods.iter().map(|m| m.to_string()).collect()
    }
}

/// Implemented by host types that can describe themselves.
pub trait Describe {
    fn describe() -> ClassDescriptor;
}

/// Host-supplied table of type name to descriptor.
#[derive(Debug, Clone, Default)]
pub struct ClassTable {
    classes: HashMap<String, ClassDescriptor>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self {
            classes: HashMap::new(),
        }
    }

    /// Register a descriptor. A descriptor with the same name is replaced.
    pub fn register(&mut self, descriptor: ClassDescriptor) {
        self.classes.insert(descriptor.name.clone(), descriptor);
    }

    /// Register a type through its [`Describe`] impl.
    pub fn register_type<T: Describe>(&mut self) {
        self.register(T::describe());
    }

    pub fn get(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Registered type names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.classes.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
