//! schemabridge-core - Type metadata model for schemabridge
//!
//! This crate provides the language-neutral description of the two schemas a
//! translation layer bridges:
//! - [`Type`] and [`NamedType`] for type names and binding sites
//! - [`DataType`] / [`DataField`] for schema trees
//! - [`FunctionSignature`] / [`MethodSignature`] for forwarded API calls
//! - [`Describe`] and [`ApiDescription`] for compile-time introspection
//!
//! With the `derive` feature the `Describe` derive and the `describe_api`
//! attribute are re-exported from `schemabridge-macros`.

mod data_type;
mod describe;
mod error;
mod named_type;
mod signature;
mod types;

pub use data_type::{DataField, DataKind, DataType, Shape, describe_fields};
pub use describe::{ApiDescription, Describe, MethodDescription, normalize_type_name, type_of};
pub use error::{ModelError, ModelResult};
pub use named_type::{NamedType, replace_type};
pub use signature::{FunctionSignature, Import, MethodSignature};
pub use types::{ERROR_TYPE, NAMESPACE_SEPARATOR, POINTER_MARKER, Type};

#[cfg(feature = "derive")]
pub use schemabridge_macros::{Describe, describe_api};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ApiDescription, DataField, DataKind, DataType, Describe, FunctionSignature, Import,
        MethodSignature, ModelError, ModelResult, NamedType, Type,
    };
}
