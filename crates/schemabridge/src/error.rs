//! Error types for schema extraction, matching and emission

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for generator operations
pub type GenResult<T> = Result<T, GenError>;

/// Error type for generator operations
///
/// Every variant aborts the generation run; there is no partial output.
#[derive(Error, Debug)]
pub enum GenError {
    /// No generation request was given
    #[error("code specification cannot be nil")]
    NilSpec,

    /// The generation request has neither a package nor a wrapped type
    #[error("code specification cannot be empty")]
    EmptySpec,

    /// Annotation payload does not have the expected shape
    #[error("malformed annotation {annotation:?}: {reason}")]
    MalformedAnnotation { annotation: String, reason: String },

    /// A recognized annotation lacks a required value
    #[error("missing {what} for {directive} annotation")]
    MissingValue { directive: String, what: String },

    /// Strict mode found an annotation outside the known vocabulary
    #[error("unsupported annotation {0:?}")]
    UnsupportedAnnotation(String),

    /// A directive needed to build the wrapped type is absent
    #[error("missing {0} annotation")]
    MissingDirective(String),

    /// No declaration carries the annotation
    #[error("no type annotated with {0:?} found")]
    AnnotatedTypeNotFound(String),

    /// Named declaration is missing from the source tree
    #[error("not found type {name} in {module}")]
    DeclarationNotFound { module: String, name: String },

    /// Package sources could not be located on disk
    #[error("package {package:?} could not be located: {reason}")]
    PackageNotFound { package: String, reason: String },

    /// Source file failed to parse
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: syn::Error,
    },

    /// File system error
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cargo manifest, lock file or settings file failed to parse
    #[error("invalid TOML in {path:?}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Settings failed validation
    #[error("configuration error: {0}")]
    Config(String),

    /// Type expression has no model equivalent
    #[error("unsupported type {0}")]
    UnsupportedType(String),

    /// Type refers to itself
    #[error("recursive type {0} cannot be described")]
    RecursiveType(String),

    /// Forwarded method returns nothing
    #[error("method {0} must return at least one value")]
    MissingReturn(String),

    /// Nested struct field has no counterpart
    #[error("cannot find pair for struct {field} at {candidates}")]
    NoStructPair { field: String, candidates: String },

    /// Target field has no name-and-type compatible source field
    #[error("could not find corresponding field for {field} at {candidates}")]
    NoCorrespondingField { field: String, candidates: String },

    /// No coercion rule applies between two matched fields
    #[error("cannot find way to assign {from} to {to}")]
    CannotAssign { from: String, to: String },

    /// Conversion target must be a struct
    #[error("conversion target {0} is not a struct")]
    NotAStruct(String),

    /// Two different type pairs would produce the same function
    #[error("conversion {method} planned for both {first} and {second}")]
    ConflictingConversion {
        method: String,
        first: String,
        second: String,
    },

    /// Type spelling is not valid Rust
    #[error("invalid type {ty:?}: {reason}")]
    InvalidType { ty: String, reason: String },

    /// Name cannot be used as an identifier
    #[error("invalid identifier {0:?}")]
    InvalidIdent(String),

    /// Emitted tokens did not form a valid file
    #[error("generated code does not parse: {0}")]
    Render(#[source] syn::Error),

    /// An error with the field, type or annotation it concerns
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<GenError>,
    },
}

impl GenError {
    /// Wrap this error with what was being processed.
    pub fn context(self, context: impl Into<String>) -> Self {
        GenError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping context layers.
    pub fn root_cause(&self) -> &GenError {
        match self {
            GenError::Context { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Attach context to a [`GenResult`].
pub trait ResultExt<T> {
    fn context_with<C, F>(self, f: F) -> GenResult<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T> ResultExt<T> for GenResult<T> {
    fn context_with<C, F>(self, f: F) -> GenResult<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|err| err.context(f()))
    }
}
