//! Generator settings (`schemabridge.toml`)

use crate::error::{GenError, GenResult};
use crate::naming;
use schemabridge_core::{NamedType, Type};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Default settings file name looked up by the CLI
pub const SETTINGS_FILE: &str = "schemabridge.toml";

/// Generator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Annotation prefix: directives read `+<generator>:<Directive>`
    pub generator: String,

    /// Display name of the external system when no annotation names it
    pub external_name: String,

    /// Import alias for the external library (`None` derives it from the path)
    pub import_alias: Option<String>,

    /// Wrapper struct name (`None` uses the described type's name)
    pub wrapper_type: Option<String>,

    /// Reject annotations outside the known vocabulary
    pub strict_annotations: bool,

    /// First line of every generated file
    pub header: String,

    /// Error type for forwarded calls whose signature names none
    pub default_error: String,

    pub helpers: Helpers,

    pub short_names: ShortNames,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            generator: "schemabridge".to_string(),
            external_name: "ExternalSystem".to_string(),
            import_alias: None,
            wrapper_type: None,
            strict_annotations: true,
            header: "Code generated by schemabridge. DO NOT EDIT.".to_string(),
            default_error: "Box<dyn std::error::Error + Send + Sync>".to_string(),
            helpers: Helpers::default(),
            short_names: ShortNames::default(),
        }
    }
}

/// Paths of the optional-value helpers the generated code calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Helpers {
    /// Wraps a value into an optional one
    pub make_ptr: String,
    /// Reads an optional value with a fallback: `f(value, default)`
    pub get_or_default: String,
}

impl Default for Helpers {
    fn default() -> Self {
        Self {
            make_ptr: "Some".to_string(),
            get_or_default: "Option::unwrap_or".to_string(),
        }
    }
}

/// Canonical parameter names keyed by type base name.
///
/// Types without an entry get [`naming::shorten`] of their package and name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortNames(BTreeMap<String, String>);

impl Default for ShortNames {
    fn default() -> Self {
        let mut names = BTreeMap::new();
        names.insert("Context".to_string(), "ctx".to_string());
        names.insert(schemabridge_core::ERROR_TYPE.to_string(), "err".to_string());
        Self(names)
    }
}

impl ShortNames {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with(mut self, base: impl Into<String>, short: impl Into<String>) -> Self {
        self.0.insert(base.into(), short.into());
        self
    }

    /// Parameter name for a value of type `ty`.
    pub fn name_for(&self, ty: &Type) -> String {
        let deref = ty.dereference();
        let spelled = deref
            .as_str()
            .trim_start_matches('&')
            .trim_start_matches("mut ")
            .trim_start();
        let unreferenced = Type::new(spelled);
        if let Some(short) = self.0.get(unreferenced.base()) {
            return short.clone();
        }
        let package_base = unreferenced
            .namespace()
            .rsplit(schemabridge_core::NAMESPACE_SEPARATOR)
            .next()
            .unwrap_or_default();
        naming::safe_ident(&naming::shorten(package_base, unreferenced.base()))
    }

    /// Named bindings for an ordered type list, with unique names.
    pub fn name_all(&self, types: &[Type]) -> Vec<NamedType> {
        let names = naming::dedup_names(types.iter().map(|ty| self.name_for(ty)).collect());
        names
            .into_iter()
            .zip(types)
            .map(|(name, ty)| NamedType::new(name, ty.clone()))
            .collect()
    }

    /// Name of the error slot.
    pub fn error_name(&self) -> String {
        self.0
            .get(schemabridge_core::ERROR_TYPE)
            .cloned()
            .unwrap_or_else(|| "err".to_string())
    }
}

impl Settings {
    /// Load settings from a file
    pub fn from_file(path: impl AsRef<Path>) -> GenResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;

        toml::from_str(&content).map_err(|source| GenError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse settings from string
    pub fn from_str(content: &str) -> GenResult<Self> {
        toml::from_str(content).map_err(|source| GenError::Toml {
            path: SETTINGS_FILE.into(),
            source,
        })
    }

    /// Validate the settings
    pub fn validate(&self) -> GenResult<()> {
        if self.generator.trim().is_empty() {
            return Err(GenError::Config("generator name cannot be empty".to_string()));
        }
        if self.generator.contains(':') || self.generator.contains(char::is_whitespace) {
            return Err(GenError::Config(format!(
                "generator name {:?} cannot contain ':' or whitespace",
                self.generator
            )));
        }
        if self.external_name.trim().is_empty() {
            return Err(GenError::Config("external name cannot be empty".to_string()));
        }

        for (key, path) in [
            ("helpers.make_ptr", &self.helpers.make_ptr),
            ("helpers.get_or_default", &self.helpers.get_or_default),
        ] {
            if syn::parse_str::<syn::Path>(path).is_err() {
                return Err(GenError::Config(format!("{key} must be a path, got {path:?}")));
            }
        }
        if syn::parse_str::<syn::Type>(&self.default_error).is_err() {
            return Err(GenError::Config(format!(
                "default_error must be a type, got {:?}",
                self.default_error
            )));
        }

        Ok(())
    }

    /// The annotation prefix, `+<generator>`.
    pub fn annotation_prefix(&self) -> String {
        format!("+{}", self.generator.trim_start_matches('+'))
    }
}
