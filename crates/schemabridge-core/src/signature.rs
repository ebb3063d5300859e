//! Function and method signatures forwarded by a wrapper

use crate::named_type::NamedType;
use crate::types::Type;
use serde::{Deserialize, Serialize};

/// Import coordinates of the external library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    /// Local alias the generated code refers to the library by
    pub alias: String,
    /// Crate or module path of the library
    pub path: String,
}

impl Import {
    pub fn new(alias: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            path: path.into(),
        }
    }

    /// Whether the generated code needs a `use path as alias;` line.
    pub fn needs_alias(&self) -> bool {
        self.alias != self.path
    }
}

/// A callable's name and its ordered argument and return bindings.
///
/// A return typed [`Type::error`] is the error slot; `error_type` names the
/// concrete error type when the source declared one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    pub args: Vec<NamedType>,
    pub returns: Vec<NamedType>,
    #[serde(default)]
    pub is_async: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<Type>,
}

impl FunctionSignature {
    pub fn new(name: impl Into<String>, args: Vec<NamedType>, returns: Vec<NamedType>) -> Self {
        Self {
            name: name.into(),
            args,
            returns,
            is_async: false,
            error_type: None,
        }
    }

    pub fn with_async(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }

    pub fn with_error_type(mut self, error_type: impl Into<Type>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }

    pub fn has_error(&self) -> bool {
        self.returns.iter().any(|nt| nt.ty.is_error())
    }

    /// Returns excluding the error slot.
    pub fn values(&self) -> impl Iterator<Item = &NamedType> {
        self.returns.iter().filter(|nt| !nt.ty.is_error())
    }
}

/// A function bound to a receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    pub receiver: NamedType,
    #[serde(flatten)]
    pub signature: FunctionSignature,
}

impl MethodSignature {
    pub fn new(receiver: NamedType, signature: FunctionSignature) -> Self {
        Self {
            receiver,
            signature,
        }
    }

    /// Whether the receiver is borrowed mutably (`&mut Wrapper`).
    pub fn is_mut(&self) -> bool {
        self.receiver.ty.as_str().starts_with("&mut")
    }
}
