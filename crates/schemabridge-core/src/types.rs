//! Type names as the metadata model sees them

use serde::{Deserialize, Serialize};
use std::fmt;

/// Leading marker for an optional (pointer-like) type.
pub const POINTER_MARKER: char = '*';

/// Namespace separator inside qualified type names.
pub const NAMESPACE_SEPARATOR: &str = "::";

/// Spelling of the error slot in a return list.
pub const ERROR_TYPE: &str = "error";

const BUILTINS: &[&str] = &[
    "String", "str", "bool", "char", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16",
    "u32", "u64", "u128", "usize", "f32", "f64",
];

/// An opaque type name, optionally optional-qualified (`*Name`) and optionally
/// namespace-qualified (`library::Name`).
///
/// `Type` never interprets the rest of the spelling: generic arguments and
/// references are carried through as written.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Type(String);

impl Type {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The error slot type.
    pub fn error() -> Self {
        Self(ERROR_TYPE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_pointer(&self) -> bool {
        self.0.starts_with(POINTER_MARKER)
    }

    pub fn is_error(&self) -> bool {
        self.0 == ERROR_TYPE
    }

    /// Remove one level of optionality. A non-pointer type is returned as is.
    pub fn dereference(&self) -> Type {
        match self.0.strip_prefix(POINTER_MARKER) {
            Some(inner) => Type(inner.to_string()),
            None => self.clone(),
        }
    }

    /// Add one level of optionality.
    pub fn pointer(&self) -> Type {
        Type(format!("{POINTER_MARKER}{}", self.0))
    }

    /// Last path segment of the dereferenced type (`lib::Resource` -> `Resource`).
    pub fn base(&self) -> &str {
        let name = self.0.trim_start_matches(POINTER_MARKER);
        match last_separator(name) {
            Some(idx) => &name[idx + NAMESPACE_SEPARATOR.len()..],
            None => name,
        }
    }

    /// Everything before the base name, without the trailing separator.
    /// Empty when the type is not qualified.
    pub fn namespace(&self) -> &str {
        let name = self.0.trim_start_matches(POINTER_MARKER);
        match last_separator(name) {
            Some(idx) => &name[..idx],
            None => "",
        }
    }

    /// Remove every `pkg::` qualification, keeping the pointer marker.
    pub fn strip_package(&self, pkg: &str) -> Type {
        if pkg.is_empty() {
            return self.clone();
        }
        Type(self.0.replace(&format!("{pkg}{NAMESPACE_SEPARATOR}"), ""))
    }

    /// True for the scalar types a newtype can be backed by.
    pub fn is_builtin(&self) -> bool {
        BUILTINS.contains(&self.0.as_str())
    }
}

/// Byte index of the last `::` outside generic brackets.
fn last_separator(name: &str) -> Option<usize> {
    let bytes = name.as_bytes();
    let mut depth = 0usize;
    let mut found = None;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' | b'(' | b'[' => depth += 1,
            b'>' | b')' | b']' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                found = Some(i);
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    found
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Type {
    fn from(value: &str) -> Self {
        Type::new(value)
    }
}

impl From<String> for Type {
    fn from(value: String) -> Self {
        Type(value)
    }
}

impl PartialEq<str> for Type {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Type {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
