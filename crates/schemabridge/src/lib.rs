//! schemabridge - Schema-mapping code generator
//!
//! Given an internal and an external description of the same record, this
//! crate generates the Rust code that bridges them:
//! - a wrapper struct forwarding calls to the external API trait
//! - `to_<name>` / `from_<name>` conversion functions, plus one pair per
//!   nested struct
//!
//! Pipeline:
//! - [`extract`] builds a [`TranslationLayer`] from annotated sources, parsed
//!   declarations or compile-time descriptions
//! - [`conversion`] pairs fields and plans coercions
//! - [`emit`] renders the plan
//!
//! [`generate_translation_layer`] runs the last two steps.

pub mod config;
pub mod conversion;
pub mod emit;
pub mod error;
pub mod extract;
pub mod naming;
pub mod translation;

pub use config::{Helpers, SETTINGS_FILE, Settings, ShortNames};
pub use conversion::{Assignment, Conversion, ConversionPlan, FieldAssignment, ZeroValue, plan_conversions};
pub use emit::Emitter;
pub use error::{GenError, GenResult, ResultExt};
pub use extract::{
    AnnotationExtractor, AnnotationValue, Directive, GenAnnotation, Locator, ReflectSettings, SourceTree,
    TranslationLayerSpec, annotations_for,
};
pub use translation::{Translation, TranslationLayer, WrappedType, WrapperMethod, generate_translation_layer};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AnnotationExtractor, GenError, GenResult, ReflectSettings, Settings, SourceTree, TranslationLayer,
        TranslationLayerSpec, generate_translation_layer,
    };
}
