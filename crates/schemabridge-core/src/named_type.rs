//! Binding sites: a local name paired with its declared type

use crate::types::{NAMESPACE_SEPARATOR, Type};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A `(name, type)` pair for a field, argument or return value.
///
/// `primitive` is the built-in type a named wrapper is backed by, for example
/// `String` for `struct OptionType(String)`. It is always a bare, non-optional
/// type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamedType {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primitive: Option<Type>,
}

impl NamedType {
    pub fn new(name: impl Into<String>, ty: impl Into<Type>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            primitive: None,
        }
    }

    /// Attach the backing built-in type. Optionality is dropped from `primitive`.
    pub fn with_primitive(mut self, primitive: impl Into<Type>) -> Self {
        self.primitive = Some(primitive.into().dereference());
        self
    }

    pub fn is_pointer(&self) -> bool {
        self.ty.is_pointer()
    }

    pub fn dereference(&self) -> NamedType {
        NamedType {
            name: self.name.clone(),
            ty: self.ty.dereference(),
            primitive: self.primitive.clone(),
        }
    }

    pub fn pointer(&self) -> NamedType {
        NamedType {
            name: self.name.clone(),
            ty: self.ty.pointer(),
            primitive: self.primitive.clone(),
        }
    }

    /// The same binding typed as its primitive, keeping optionality.
    /// `None` when no primitive is declared.
    pub fn as_primitive(&self) -> Option<NamedType> {
        let primitive = self.primitive.as_ref()?;
        let ty = if self.is_pointer() {
            primitive.pointer()
        } else {
            primitive.clone()
        };
        Some(NamedType::new(self.name.clone(), ty))
    }

    /// Whether a value bound as `other` can be coerced into this binding.
    ///
    /// Holds when both dereference to the same type, or either side declares a
    /// primitive equal to the other's dereferenced type.
    pub fn assignable_from(&self, other: &NamedType) -> bool {
        let own = self.ty.dereference();
        let theirs = other.ty.dereference();
        own == theirs
            || other.primitive.as_ref() == Some(&own)
            || self.primitive.as_ref() == Some(&theirs)
    }

    /// Drop `pkg` qualification from the type and the `<pkg base>_` prefix from
    /// a synthesized name.
    pub fn strip_package_and_name(&self, pkg: &str) -> NamedType {
        NamedType {
            name: remove_base(pkg, &self.name),
            ty: self.ty.strip_package(pkg),
            primitive: self.primitive.clone(),
        }
    }

    pub fn strip_package(&self, pkg: &str) -> NamedType {
        NamedType {
            name: self.name.clone(),
            ty: self.ty.strip_package(pkg),
            primitive: self.primitive.clone(),
        }
    }
}

fn remove_base(pkg: &str, name: &str) -> String {
    let base = pkg.rsplit(NAMESPACE_SEPARATOR).next().unwrap_or(pkg);
    if base.is_empty() {
        return name.to_string();
    }
    match name.strip_prefix(base).and_then(|rest| rest.strip_prefix('_')) {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => name.to_string(),
    }
}

/// Rewrite every binding typed as `original` into `replacement`.
///
/// # Panics
///
/// Panics when `list` is empty: callers only pass non-empty signature lists,
/// so an empty one means the signature was built incorrectly.
pub fn replace_type(list: &[NamedType], original: &NamedType, replacement: &NamedType) -> Vec<NamedType> {
    assert!(!list.is_empty(), "replace_type called with an empty list");
    list.iter()
        .map(|nt| {
            if nt.ty == original.ty {
                replacement.clone()
            } else {
                nt.clone()
            }
        })
        .collect()
}

impl fmt::Display for NamedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.primitive {
            Some(primitive) => write!(f, "{} {}({})", self.name, self.ty, primitive),
            None => write!(f, "{} {}", self.name, self.ty),
        }
    }
}
