//! Annotation-driven extraction
//!
//! Directives are comment lines of the form
//!
//! ```text
//! // +schemabridge:<Directive>[:<payload>]
//! ```
//!
//! where the payload is either a bare value or a comma-separated list of
//! `key=value` arguments. A source file carrying the directive set below is
//! enough to build a complete [`TranslationLayer`]:
//!
//! ```text
//! // +schemabridge:ExternalSystem:Atlas
//! // +schemabridge:ExternalPackage:var=sdk,path=atlas_sdk
//! // +schemabridge:ExternalType:var=res,type=*sdk::Resource
//! // +schemabridge:ExternalAPI:var=api,type=sdk::Api
//! // +schemabridge:WrapperType:var=w,type=Wrapper
//!
//! // +schemabridge:InternalType:var=res,pointer=true
//! pub struct Resource { /* ... */ }
//! ```

use super::locate::Locator;
use super::source::SourceTree;
use super::wrapper_methods;
use crate::config::Settings;
use crate::error::{GenError, GenResult, ResultExt};
use crate::translation::{Translation, TranslationLayer, WrappedType};
use schemabridge_core::{Import, NAMESPACE_SEPARATOR, NamedType, POINTER_MARKER, Type};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

const VAR_KEY: &str = "var";
const PATH_KEY: &str = "path";
const TYPE_KEY: &str = "type";
const POINTER_KEY: &str = "pointer";

const DEFAULT_WRAPPER: &str = "Wrapper";
const DEFAULT_WRAPPER_VAR: &str = "w";

/// One `+<generator>:<Name>[:<payload>]` comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenAnnotation {
    /// The comment as written
    pub raw: String,
    pub name: String,
    pub value: AnnotationValue,
    /// 1-based source line
    pub line: usize,
}

/// Payload of an annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationValue {
    NoValue,
    Simple(String),
    Args(BTreeMap<String, String>),
}

impl AnnotationValue {
    pub fn arg(&self, key: &str) -> Option<&str> {
        match self {
            AnnotationValue::Args(args) => args.get(key).map(String::as_str),
            _ => None,
        }
    }
}

/// Scan `source` for annotations of `generator`.
///
/// Only comments are scanned. A leading `+` on `generator` is optional.
pub fn annotations_for(generator: &str, source: &str) -> GenResult<Vec<GenAnnotation>> {
    let pattern = format!("+{}:", generator.trim_start_matches('+'));
    let mut annotations = Vec::new();
    for (idx, line) in source.lines().enumerate() {
        let Some(start) = line.find("//") else {
            continue;
        };
        let comment = &line[start..];
        let Some(at) = comment.find(&pattern) else {
            continue;
        };
        let payload = &comment[at + pattern.len()..];
        let (name, value) = parse_payload(payload).context_with(|| format!("line {}", idx + 1))?;
        annotations.push(GenAnnotation {
            raw: comment.trim_end().to_string(),
            name,
            value,
            line: idx + 1,
        });
    }
    Ok(annotations)
}

fn parse_payload(payload: &str) -> GenResult<(String, AnnotationValue)> {
    let (name, rest) = match payload.split_once(':') {
        Some((name, rest)) => (name.trim(), rest.trim()),
        None => (payload.trim(), ""),
    };
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(GenError::MalformedAnnotation {
            annotation: payload.trim().to_string(),
            reason: "expected a directive name".to_string(),
        });
    }

    let value = if rest.is_empty() {
        AnnotationValue::NoValue
    } else if let Some(args) = parse_args(rest) {
        AnnotationValue::Args(args)
    } else {
        AnnotationValue::Simple(unquote(rest).to_string())
    };
    Ok((name.to_string(), value))
}

/// `key=value` pairs, or `None` when any part is not an assignment.
fn parse_args(rest: &str) -> Option<BTreeMap<String, String>> {
    rest.split(',')
        .map(|part| {
            let (key, value) = part.split_once('=')?;
            Some((unquote(key).to_string(), unquote(value).to_string()))
        })
        .collect()
}

fn unquote(value: &str) -> &str {
    value.trim_matches(|c: char| c == ' ' || c == '"')
}

/// Case-insensitive `"true"`.
pub fn is_true(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

/// A recognized annotation with its values checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Display name used in conversion names
    ExternalSystem(String),
    /// The external library: `var` is the alias used in type values
    ExternalPackage { var: String, path: String },
    ExternalType { var: String, ty: Type },
    ExternalApi { var: String, ty: Type },
    WrapperType { var: String, ty: Type },
    /// Marks the struct below it as the internal type
    InternalType { var: String, pointer: bool },
}

impl Directive {
    /// Check an annotation against the directive vocabulary.
    ///
    /// Returns `Ok(None)` for names outside the vocabulary.
    pub fn parse(annotation: &GenAnnotation) -> GenResult<Option<Directive>> {
        let name = annotation.name.as_str();
        let directive = match name {
            "ExternalSystem" => match &annotation.value {
                AnnotationValue::Simple(value) => Directive::ExternalSystem(value.clone()),
                AnnotationValue::NoValue => return Err(missing(name, "value")),
                AnnotationValue::Args(_) => return Err(malformed(annotation, "expected a single value")),
            },
            "ExternalPackage" => Directive::ExternalPackage {
                var: required(annotation, VAR_KEY)?,
                path: required(annotation, PATH_KEY)?,
            },
            "ExternalType" => Directive::ExternalType {
                var: required(annotation, VAR_KEY)?,
                ty: Type::new(required(annotation, TYPE_KEY)?),
            },
            "ExternalAPI" => Directive::ExternalApi {
                var: required(annotation, VAR_KEY)?,
                ty: Type::new(required(annotation, TYPE_KEY)?),
            },
            "WrapperType" => Directive::WrapperType {
                var: required(annotation, VAR_KEY)?,
                ty: Type::new(required(annotation, TYPE_KEY)?),
            },
            "InternalType" => Directive::InternalType {
                var: required(annotation, VAR_KEY)?,
                pointer: annotation.value.arg(POINTER_KEY).is_some_and(is_true),
            },
            _ => return Ok(None),
        };
        Ok(Some(directive))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Directive::ExternalSystem(_) => "ExternalSystem",
            Directive::ExternalPackage { .. } => "ExternalPackage",
            Directive::ExternalType { .. } => "ExternalType",
            Directive::ExternalApi { .. } => "ExternalAPI",
            Directive::WrapperType { .. } => "WrapperType",
            Directive::InternalType { .. } => "InternalType",
        }
    }
}

fn required(annotation: &GenAnnotation, key: &str) -> GenResult<String> {
    match &annotation.value {
        AnnotationValue::Args(args) => match args.get(key) {
            Some(value) if !value.is_empty() => Ok(value.clone()),
            _ => Err(missing(&annotation.name, key)),
        },
        AnnotationValue::NoValue => Err(missing(&annotation.name, key)),
        AnnotationValue::Simple(_) => Err(malformed(annotation, "expected key=value arguments")),
    }
}

fn missing(directive: &str, what: &str) -> GenError {
    GenError::MissingValue {
        directive: directive.to_string(),
        what: what.to_string(),
    }
}

fn malformed(annotation: &GenAnnotation, reason: &str) -> GenError {
    GenError::MalformedAnnotation {
        annotation: annotation.raw.clone(),
        reason: reason.to_string(),
    }
}

/// Directives of one file, last occurrence winning.
#[derive(Debug, Default)]
struct DirectiveSet {
    external_system: Option<String>,
    external_package: Option<(String, String)>,
    external_type: Option<(String, Type)>,
    external_api: Option<(String, Type)>,
    wrapper_type: Option<(String, Type)>,
    internal_type: Option<(String, bool)>,
}

impl DirectiveSet {
    fn from_directives(directives: Vec<Directive>) -> Self {
        let mut set = Self::default();
        for directive in directives {
            match directive {
                Directive::ExternalSystem(name) => set.external_system = Some(name),
                Directive::ExternalPackage { var, path } => set.external_package = Some((var, path)),
                Directive::ExternalType { var, ty } => set.external_type = Some((var, ty)),
                Directive::ExternalApi { var, ty } => set.external_api = Some((var, ty)),
                Directive::WrapperType { var, ty } => set.wrapper_type = Some((var, ty)),
                Directive::InternalType { var, pointer } => set.internal_type = Some((var, pointer)),
            }
        }
        set
    }

    fn is_empty(&self) -> bool {
        self.external_system.is_none()
            && self.external_package.is_none()
            && self.external_type.is_none()
            && self.external_api.is_none()
            && self.wrapper_type.is_none()
            && self.internal_type.is_none()
    }
}

/// Builds translation layers from annotated source files.
pub struct AnnotationExtractor<'s> {
    settings: &'s Settings,
}

impl<'s> AnnotationExtractor<'s> {
    pub fn new(settings: &'s Settings) -> Self {
        Self { settings }
    }

    /// The directives in `source`.
    ///
    /// Unrecognized directive names are an error in strict mode and are
    /// skipped with a warning otherwise.
    pub fn directives(&self, source: &str) -> GenResult<Vec<Directive>> {
        let mut directives = Vec::new();
        for annotation in annotations_for(&self.settings.generator, source)? {
            match Directive::parse(&annotation).context_with(|| format!("line {}", annotation.line))? {
                Some(directive) => directives.push(directive),
                None if self.settings.strict_annotations => {
                    return Err(GenError::UnsupportedAnnotation(annotation.raw));
                }
                None => {
                    warn!(line = annotation.line, name = %annotation.name, "skipping unsupported annotation");
                }
            }
        }
        Ok(directives)
    }

    /// Build the translation layer for the annotated file at `path`.
    ///
    /// The file's module path comes from its crate layout; the external
    /// library's sources are found through the same crate's dependencies.
    pub fn extract_file(&self, path: impl AsRef<Path>) -> GenResult<TranslationLayer> {
        let path = path.as_ref();
        let path = &std::fs::canonicalize(path).map_err(|e| GenError::io(path, e))?;
        let locator = Locator::discover(path)?;
        let module = locator.module_path(path)?;
        let source = std::fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
        let internal = SourceTree::from_file(path, &module)?;

        self.extract(&module, &source, &internal, |lib| {
            let crate_name = lib.path.split(NAMESPACE_SEPARATOR).next().unwrap_or(&lib.path);
            let src_dir = locator.crate_src_dir(crate_name)?;
            SourceTree::from_crate(crate_name, src_dir)
        })
        .context_with(|| path.display().to_string())
    }

    /// Build the translation layer for `source`, the text of `module`.
    ///
    /// `internal` holds the parsed source; `load_external` produces the parsed
    /// sources of the external library once its import is known. A source
    /// without directives yields a layer with no wrapped type.
    pub fn extract<F>(
        &self,
        module: &str,
        source: &str,
        internal: &SourceTree,
        load_external: F,
    ) -> GenResult<TranslationLayer>
    where
        F: FnOnce(&Import) -> GenResult<SourceTree>,
    {
        let set = DirectiveSet::from_directives(self.directives(source)?);
        if set.is_empty() {
            debug!(module, "no directives found");
            return Ok(TranslationLayer::new(module, None));
        }

        let (internal_var, internal_pointer) = set.internal_type.ok_or_else(|| missing_directive("InternalType"))?;
        let (lib_var, lib_path) = set
            .external_package
            .ok_or_else(|| missing_directive("ExternalPackage"))?;
        let (external_var, external_ty) = set.external_type.ok_or_else(|| missing_directive("ExternalType"))?;
        let (api_var, api_ty) = set.external_api.ok_or_else(|| missing_directive("ExternalAPI"))?;

        let lib = Import::new(lib_var, lib_path);
        let annotation = format!("{}:InternalType", self.settings.annotation_prefix());
        let (internal_module, internal_name) = internal.find_annotated_type(&annotation)?;
        let mut internal_data = internal
            .describe_type(&internal_module, &internal_name)
            .context_with(|| format!("internal type {internal_name}"))?
            .strip_local_package(module)
            .renamed(internal_var);
        if internal_pointer {
            internal_data = internal_data.into_pointer();
        }

        let external_tree = load_external(&lib)?;
        let external_ty = qualify(&external_ty, &lib);
        let mut external_data = external_tree
            .describe_type(external_ty.namespace(), external_ty.base())
            .context_with(|| format!("external type {external_ty}"))?
            .renamed(external_var);
        if external_ty.is_pointer() {
            external_data = external_data.into_pointer();
        }

        let api_ty = qualify(&api_ty, &lib);
        let methods = external_tree
            .describe_interface(api_ty.namespace(), api_ty.base(), &self.settings.short_names)
            .context_with(|| format!("external API {api_ty}"))?;

        let wrapper = match set.wrapper_type {
            Some((var, ty)) => NamedType::new(var, ty),
            None => NamedType::new(
                DEFAULT_WRAPPER_VAR,
                self.settings.wrapper_type.as_deref().unwrap_or(DEFAULT_WRAPPER),
            ),
        };

        let wrapper_methods = wrapper_methods(&methods, &wrapper, &external_data.named, &internal_data.named);
        debug!(
            module,
            internal = %internal_data,
            external = %external_data,
            methods = wrapper_methods.len(),
            "extracted annotated translation"
        );

        let translation = Translation {
            lib,
            external_name: set
                .external_system
                .unwrap_or_else(|| self.settings.external_name.clone()),
            external: external_data,
            external_api: NamedType::new(api_var, api_ty),
            internal: internal_data,
            wrapper,
        };
        Ok(TranslationLayer::new(
            module,
            Some(WrappedType {
                translation,
                wrapper_methods,
            }),
        ))
    }
}

fn missing_directive(name: &str) -> GenError {
    GenError::MissingDirective(name.to_string())
}

/// Spell `ty` with the library path in place of its alias.
///
/// `*sdk::Resource` with `sdk` imported from `atlas_sdk` becomes
/// `*atlas_sdk::Resource`; an unqualified name is placed in the library.
pub fn qualify(ty: &Type, lib: &Import) -> Type {
    let spelled = ty.as_str().trim_start_matches(POINTER_MARKER);
    let markers = &ty.as_str()[..ty.as_str().len() - spelled.len()];
    let alias_prefix = format!("{}{NAMESPACE_SEPARATOR}", lib.alias);
    let qualified = match spelled.strip_prefix(&alias_prefix) {
        Some(rest) => format!("{}{NAMESPACE_SEPARATOR}{rest}", lib.path),
        None if Type::new(spelled).namespace().is_empty() => {
            format!("{}{NAMESPACE_SEPARATOR}{spelled}", lib.path)
        }
        None => spelled.to_string(),
    };
    Type::new(format!("{markers}{qualified}"))
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::ExternalSystem(name) => write!(f, "{}: {name}", self.name()),
            Directive::ExternalPackage { var, path } => write!(f, "{}: {var} = {path}", self.name()),
            Directive::ExternalType { var, ty } | Directive::ExternalApi { var, ty } | Directive::WrapperType { var, ty } => {
                write!(f, "{}: {var} {ty}", self.name())
            }
            Directive::InternalType { var, pointer } => write!(f, "{}: {var} (pointer: {pointer})", self.name()),
        }
    }
}
