//! Extraction from compile-time descriptions
//!
//! Types implementing [`Describe`] (usually through `#[derive(Describe)]`)
//! and a trait annotated with `#[describe_api]` carry everything needed to
//! build a [`TranslationLayer`] without reading any source text.
//!
//! ```ignore
//! let spec = TranslationLayerSpec::new::<Option<Resource>, Option<sdk::Resource>>(
//!     module_path!(),
//!     "Wrapper",
//!     sdk::api_interface(),
//! );
//! let layer = spec.translation_layer(&ReflectSettings::default(), &ShortNames::default())?;
//! ```

use super::{InterfaceMethod, wrapper_methods};
use crate::config::{Settings, ShortNames};
use crate::error::{GenError, GenResult};
use crate::naming::shorten;
use crate::translation::{Translation, TranslationLayer, WrappedType};
use schemabridge_core::{
    ApiDescription, DataField, DataType, Describe, FunctionSignature, Import, MethodDescription, NAMESPACE_SEPARATOR,
    NamedType, Shape, Type,
};
use tracing::debug;

const API_VAR: &str = "api";
const WRAPPER_VAR: &str = "w";

/// Names the reflection extractor cannot derive from the types themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectSettings {
    pub external_name: String,
    /// `None` uses the last segment of the API's module path
    pub import_alias: Option<String>,
    /// `None` uses the spec's name
    pub wrapper_type: Option<String>,
}

impl Default for ReflectSettings {
    fn default() -> Self {
        Self {
            external_name: Settings::default().external_name,
            import_alias: None,
            wrapper_type: None,
        }
    }
}

impl From<&Settings> for ReflectSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            external_name: settings.external_name.clone(),
            import_alias: settings.import_alias.clone(),
            wrapper_type: settings.wrapper_type.clone(),
        }
    }
}

/// A translation request expressed through types.
#[derive(Debug, Clone)]
pub struct TranslationLayerSpec {
    pub package_name: String,
    pub name: String,
    pub internal: DataType,
    pub external: DataType,
    pub api: ApiDescription,
}

impl TranslationLayerSpec {
    /// Describe `Internal` and `External` for the module `package_name`.
    ///
    /// Use `Option<T>` for a side whose conversions take and return
    /// optional values.
    pub fn new<Internal: Describe, External: Describe>(
        package_name: impl Into<String>,
        name: impl Into<String>,
        api: ApiDescription,
    ) -> Self {
        Self {
            package_name: package_name.into(),
            name: name.into(),
            internal: Internal::describe(""),
            external: External::describe(""),
            api,
        }
    }

    /// Build the translation layer.
    pub fn translation_layer(&self, settings: &ReflectSettings, short_names: &ShortNames) -> GenResult<TranslationLayer> {
        let internal = short_struct_names(&self.internal).strip_local_package(&self.package_name);
        let external = short_struct_names(&self.external);

        let lib_path = self.api.path.namespace().to_string();
        if lib_path.is_empty() {
            return Err(GenError::UnsupportedType(format!(
                "API {} has no module path",
                self.api.path
            )));
        }
        let alias = settings
            .import_alias
            .clone()
            .unwrap_or_else(|| last_segment(&lib_path).to_string());

        let wrapper = NamedType::new(
            WRAPPER_VAR,
            settings.wrapper_type.clone().unwrap_or_else(|| self.name.clone()),
        );
        let methods = self
            .api
            .methods
            .iter()
            .map(|method| interface_method(method, short_names))
            .collect::<GenResult<Vec<_>>>()?;
        let wrapper_methods = wrapper_methods(&methods, &wrapper, &external.named, &internal.named);
        debug!(
            package = %self.package_name,
            api = %self.api.path,
            methods = wrapper_methods.len(),
            "extracted described translation"
        );

        let translation = Translation {
            lib: Import::new(alias, lib_path),
            external_name: settings.external_name.clone(),
            external,
            external_api: NamedType::new(API_VAR, self.api.path.clone()),
            internal,
            wrapper,
        };
        Ok(TranslationLayer::new(
            self.package_name.clone(),
            Some(WrappedType {
                translation,
                wrapper_methods,
            }),
        ))
    }
}

/// Rename every struct node to the short alias of its type.
fn short_struct_names(data: &DataType) -> DataType {
    match &data.shape {
        Shape::Simple => data.clone(),
        Shape::Struct(fields) => {
            let ty = data.named.ty.dereference();
            let name = shorten(last_segment(ty.namespace()), ty.base());
            let fields = fields
                .iter()
                .map(|field| DataField::from_data(&field.field_name, short_struct_names(&field.data)))
                .collect();
            DataType::new_struct(NamedType { name, ..data.named.clone() }, fields)
        }
    }
}

fn interface_method(method: &MethodDescription, short_names: &ShortNames) -> GenResult<InterfaceMethod> {
    let mut returns = short_names.name_all(&method.returns);
    if method.error.is_some() {
        returns.push(NamedType::new(short_names.error_name(), Type::error()));
    }
    if returns.is_empty() {
        return Err(GenError::MissingReturn(method.name.clone()));
    }

    let mut signature = FunctionSignature::new(method.name.clone(), short_names.name_all(&method.args), returns)
        .with_async(method.is_async);
    if let Some(error) = &method.error {
        signature = signature.with_error_type(error.clone());
    }
    Ok(InterfaceMethod {
        signature,
        mutable_receiver: method.mutable_receiver,
    })
}

fn last_segment(path: &str) -> &str {
    path.rsplit(NAMESPACE_SEPARATOR).next().unwrap_or(path)
}

#[cfg(test)]
#[path = "reflect/reflect_tests.rs"]
mod reflect_tests;
