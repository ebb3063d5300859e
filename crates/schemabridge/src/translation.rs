//! Translation layer requests and the generation entry point

use crate::config::Settings;
use crate::conversion::{Conversion, plan_conversions};
use crate::emit::Emitter;
use crate::error::{GenError, GenResult};
use schemabridge_core::{DataType, FunctionSignature, Import, MethodSignature, NamedType};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Everything needed to generate one output unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationLayer {
    /// Module the generated code belongs to
    pub package_name: String,
    pub wrapped_type: Option<WrappedType>,
}

/// A translation plus the API methods the wrapper forwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedType {
    pub translation: Translation,
    pub wrapper_methods: Vec<WrapperMethod>,
}

/// The two schemas being bridged and the names around them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub lib: Import,
    /// Display name used in conversion names (`to_atlas`)
    pub external_name: String,
    /// Schema as seen by the remote API
    pub external: DataType,
    /// Handle to the external API trait
    pub external_api: NamedType,
    /// Schema as stored internally
    pub internal: DataType,
    /// The generated adapter struct
    pub wrapper: NamedType,
}

/// A method on the wrapper and the external call it delegates to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapperMethod {
    /// Signature in internal terms
    pub method: MethodSignature,
    /// Signature in external terms
    pub wrapped_call: FunctionSignature,
}

impl TranslationLayer {
    pub fn new(package_name: impl Into<String>, wrapped_type: Option<WrappedType>) -> Self {
        Self {
            package_name: package_name.into(),
            wrapped_type,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.package_name.is_empty() && self.wrapped_type.is_none()
    }

    /// Generate the source text for this layer.
    pub fn generate(&self, settings: &Settings) -> GenResult<String> {
        generate_translation_layer(Some(self), settings)
    }
}

impl Translation {
    /// Internal to external conversion at the top of the plan.
    pub fn root_conversion(&self) -> Conversion<'_> {
        Conversion::new(&self.external_name, true, &self.internal, &self.external)
    }
}

/// Check, plan and emit a translation layer.
///
/// Fails with [`GenError::NilSpec`] without a request and
/// [`GenError::EmptySpec`] for a request with neither package nor wrapped
/// type. A layer without a wrapped type generates only the file header.
pub fn generate_translation_layer(layer: Option<&TranslationLayer>, settings: &Settings) -> GenResult<String> {
    let layer = layer.ok_or(GenError::NilSpec)?;
    if layer.is_empty() {
        return Err(GenError::EmptySpec);
    }

    let plans = match &layer.wrapped_type {
        Some(wrapped) => plan_conversions(wrapped.translation.root_conversion())?,
        None => Vec::new(),
    };

    let code = Emitter::new(settings)?.emit(layer, &plans)?;
    info!(
        package = %layer.package_name,
        conversions = plans.len(),
        bytes = code.len(),
        "generated translation layer"
    );
    Ok(code)
}

#[cfg(test)]
#[path = "translation/translation_tests.rs"]
mod translation_tests;
