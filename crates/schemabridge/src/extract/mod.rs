//! Schema extractors
//!
//! Three front ends build a [`TranslationLayer`](crate::TranslationLayer):
//! - [`annotations`] reads `+schemabridge:` directives from a source file
//! - [`source`] reads struct and trait declarations from parsed sources
//! - [`reflect`] uses the compile-time descriptions from `#[derive(Describe)]`
//!
//! [`locate`] finds the sources the first two need.

pub mod annotations;
pub mod locate;
pub mod reflect;
pub mod source;

pub use annotations::{AnnotationExtractor, AnnotationValue, Directive, GenAnnotation, annotations_for};
pub use locate::Locator;
pub use reflect::{ReflectSettings, TranslationLayerSpec};
pub use source::SourceTree;

use crate::naming::dedup_names;
use crate::translation::WrapperMethod;
use schemabridge_core::{FunctionSignature, MethodSignature, NamedType, Type, replace_type};

/// A receiver method of the external API, in external terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceMethod {
    pub signature: FunctionSignature,
    pub mutable_receiver: bool,
}

/// Wrapper methods forwarding to `methods`.
///
/// The wrapper side has every binding typed `external` rewritten to
/// `internal`; the wrapped call keeps the external terms.
pub fn wrapper_methods(
    methods: &[InterfaceMethod],
    wrapper: &NamedType,
    external: &NamedType,
    internal: &NamedType,
) -> Vec<WrapperMethod> {
    methods
        .iter()
        .map(|method| {
            let call = &method.signature;
            let sigil = if method.mutable_receiver { "&mut " } else { "&" };
            let receiver = NamedType::new(wrapper.name.clone(), Type::new(format!("{sigil}{}", wrapper.ty)));

            let mut signature = call.clone();
            signature.args = rewrite(&call.args, external, internal);
            signature.returns = rewrite(&call.returns, external, internal);

            WrapperMethod {
                method: MethodSignature::new(receiver, signature),
                wrapped_call: call.clone(),
            }
        })
        .collect()
}

fn rewrite(list: &[NamedType], external: &NamedType, internal: &NamedType) -> Vec<NamedType> {
    if list.is_empty() {
        return Vec::new();
    }
    let replaced = replace_type(list, external, internal);
    let names = dedup_names(replaced.iter().map(|nt| nt.name.clone()).collect());
    replaced
        .into_iter()
        .zip(names)
        .map(|(nt, name)| NamedType { name, ..nt })
        .collect()
}
