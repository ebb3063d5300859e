//! Compile-time introspection
//!
//! [`Describe`] is the derive-based stand-in for walking a live value's type at
//! runtime: `#[derive(Describe)]` implements it for structs and newtypes, and
//! `#[describe_api]` produces an [`ApiDescription`] for a trait.

use crate::data_type::DataType;
use crate::named_type::NamedType;
use crate::types::Type;
use serde::{Deserialize, Serialize};

/// A type that can describe its own schema.
pub trait Describe {
    /// Fully qualified type name, with the pointer marker for `Option`.
    fn schema_type() -> Type;

    /// Schema of a binding of this type named `name`.
    fn describe(name: &str) -> DataType;
}

macro_rules! describe_builtin {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn schema_type() -> Type {
                    Type::new($name)
                }

                fn describe(name: &str) -> DataType {
                    DataType::simple(NamedType::new(name, Self::schema_type()))
                }
            }
        )*
    };
}

describe_builtin! {
    String => "String",
    bool => "bool",
    char => "char",
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    i128 => "i128",
    isize => "isize",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    u128 => "u128",
    usize => "usize",
    f32 => "f32",
    f64 => "f64",
}

impl<T: Describe> Describe for Option<T> {
    fn schema_type() -> Type {
        T::schema_type().pointer()
    }

    fn describe(name: &str) -> DataType {
        T::describe(name).into_pointer()
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn schema_type() -> Type {
        Type::new(format!("Vec<{}>", T::schema_type()))
    }

    fn describe(name: &str) -> DataType {
        DataType::simple(NamedType::new(name, Self::schema_type()))
    }
}

/// Type name of `T` in the model's spelling.
pub fn type_of<T: ?Sized>() -> Type {
    Type::new(normalize_type_name(std::any::type_name::<T>()))
}

const OPTION_PATH: &str = "core::option::Option";

const STD_ALIASES: &[(&str, &str)] = &[
    ("alloc::string::String", "String"),
    ("alloc::vec::Vec", "Vec"),
    ("alloc::boxed::Box", "Box"),
    (OPTION_PATH, "Option"),
];

/// Rewrite `std::any::type_name` output so it matches source spellings.
///
/// Outer `Option` layers become pointer markers; prelude types lose their
/// `alloc::`/`core::` paths.
pub fn normalize_type_name(name: &str) -> String {
    let mut rest = name;
    let mut markers = String::new();
    while let Some(inner) = rest
        .strip_prefix(OPTION_PATH)
        .and_then(|r| r.strip_prefix('<'))
        .and_then(|r| r.strip_suffix('>'))
    {
        markers.push(crate::types::POINTER_MARKER);
        rest = inner;
    }

    let mut normalized = rest.to_string();
    for (path, alias) in STD_ALIASES {
        normalized = normalized.replace(path, alias);
    }
    markers + &normalized
}

/// Method set of a trait, produced by `#[describe_api]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDescription {
    /// Trait name
    pub name: String,
    /// Fully qualified trait path
    pub path: Type,
    pub methods: Vec<MethodDescription>,
}

/// One receiver method of a described trait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescription {
    pub name: String,
    pub is_async: bool,
    pub mutable_receiver: bool,
    pub args: Vec<Type>,
    /// Value returns; the `Ok` side when the method returns `Result`
    pub returns: Vec<Type>,
    /// The `Err` side when the method returns `Result`
    pub error: Option<Type>,
}
