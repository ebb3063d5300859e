//! Code emission
//!
//! Renders a [`TranslationLayer`] and its conversion plans into Rust source.
//! Items are built with `quote!`, validated by parsing them back into a
//! `syn::File`, and formatted with `prettyplease`, so the output is well formed
//! and identical across runs.
//!
//! Output order:
//! 1. `use <library> as <alias>;`
//! 2. the wrapper struct and its constructor
//! 3. the forwarding methods
//! 4. the conversion functions, forward then reverse, in discovery order

use crate::config::Settings;
use crate::conversion::{Assignment, ConversionPlan, ZeroValue};
use crate::error::{GenError, GenResult, ResultExt};
use crate::naming::{is_keyword, safe_ident};
use crate::translation::{Translation, TranslationLayer, WrappedType, WrapperMethod};
use proc_macro2::{Span, TokenStream};
use quote::quote;
use schemabridge_core::{Import, NamedType, Type};
use syn::punctuated::Punctuated;
use syn::visit_mut::{self, VisitMut};

/// Renders translation layers with the helpers configured in [`Settings`].
pub struct Emitter<'s> {
    settings: &'s Settings,
    make_ptr: syn::Path,
    get_or_default: syn::Path,
}

/// How a forwarded argument or return value crosses the schema boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translate {
    /// Passed through unchanged
    Forward(String),
    /// Internal value converted with `to_<name>`
    ToExternal(String),
    /// External value converted with `from_<name>`
    FromExternal(String),
    /// The error slot, handled by `?`
    NoError,
}

impl<'s> Emitter<'s> {
    pub fn new(settings: &'s Settings) -> GenResult<Self> {
        Ok(Self {
            settings,
            make_ptr: parse_helper("make_ptr", &settings.helpers.make_ptr)?,
            get_or_default: parse_helper("get_or_default", &settings.helpers.get_or_default)?,
        })
    }

    /// Render `layer` with the conversions in `plans`.
    pub fn emit(&self, layer: &TranslationLayer, plans: &[ConversionPlan]) -> GenResult<String> {
        let mut output = format!("// {}\n// Package: {}\n", self.settings.header, layer.package_name);

        let Some(wrapped) = &layer.wrapped_type else {
            return Ok(output);
        };

        let translation = &wrapped.translation;
        let types = TypeRenderer::new(&translation.lib, &self.settings.default_error);

        let mut items = Vec::new();
        if translation.lib.needs_alias() {
            let path = syn::parse_str::<syn::Path>(&translation.lib.path).map_err(|e| GenError::InvalidType {
                ty: translation.lib.path.clone(),
                reason: e.to_string(),
            })?;
            let alias = ident(&translation.lib.alias)?;
            items.push(quote! { use #path as #alias; });
        }
        items.push(self.wrapper_struct(wrapped, &types)?);
        for plan in plans {
            items.push(self.conversion_fn(plan, &types).context_with(|| plan.method.clone())?);
        }

        let file: syn::File = syn::parse2(quote! { #(#items)* }).map_err(GenError::Render)?;
        output.push('\n');
        output.push_str(&prettyplease::unparse(&file));
        Ok(output)
    }

    fn wrapper_struct(&self, wrapped: &WrappedType, types: &TypeRenderer<'_>) -> GenResult<TokenStream> {
        let translation = &wrapped.translation;
        let wrapper = ident(bare_name(&translation.wrapper.ty))?;
        let api = param_ident(&translation.external_api.name)?;
        let api_trait = types.path(&translation.external_api.ty)?;
        let doc = format!(
            " Forwards calls to the {} API, translating between internal and external types.",
            translation.external_name
        );

        let methods = wrapped
            .wrapper_methods
            .iter()
            .map(|method| {
                self.wrapper_method(method, translation, types)
                    .context_with(|| format!("wrapper method {}", method.method.signature.name))
            })
            .collect::<GenResult<Vec<_>>>()?;

        let forwarding = if methods.is_empty() {
            quote! {}
        } else {
            quote! {
                impl<T: #api_trait> #wrapper<T> {
                    #(#methods)*
                }
            }
        };

        Ok(quote! {
            #[doc = #doc]
            pub struct #wrapper<T> {
                #api: T,
            }

            impl<T> #wrapper<T> {
                pub fn new(#api: T) -> Self {
                    Self { #api }
                }
            }

            #forwarding
        })
    }

    fn wrapper_method(
        &self,
        wrapper_method: &WrapperMethod,
        translation: &Translation,
        types: &TypeRenderer<'_>,
    ) -> GenResult<TokenStream> {
        let signature = &wrapper_method.method.signature;
        let call = &wrapper_method.wrapped_call;
        assert!(
            !signature.returns.is_empty() && !call.returns.is_empty(),
            "forwarded method {} has no return values",
            signature.name
        );

        let name = param_ident(&signature.name)?;
        let call_name = param_ident(&call.name)?;
        let api = param_ident(&translation.external_api.name)?;
        let receiver = if wrapper_method.method.is_mut() {
            quote! { &mut self }
        } else {
            quote! { &self }
        };

        let params = signature
            .args
            .iter()
            .map(|arg| {
                let arg_name = param_ident(&arg.name)?;
                let arg_ty = types.render(&arg.ty)?;
                Ok(quote! { #arg_name: #arg_ty })
            })
            .collect::<GenResult<Vec<_>>>()?;

        let value_types = signature
            .values()
            .map(|value| types.render(&value.ty))
            .collect::<GenResult<Vec<_>>>()?;
        let value_ty = tuple_of(&value_types);
        let return_ty = if signature.has_error() {
            let error = signature
                .error_type
                .as_ref()
                .or(call.error_type.as_ref())
                .map(|ty| types.render(ty))
                .unwrap_or_else(|| types.parse(&self.settings.default_error))?;
            quote! { Result<#value_ty, #error> }
        } else {
            value_ty
        };

        let call_args = signature
            .args
            .iter()
            .filter_map(|arg| self.translated(arg, translation).transpose())
            .collect::<GenResult<Vec<_>>>()?;

        let bindings = call
            .values()
            .map(|value| param_ident(&value.name))
            .collect::<GenResult<Vec<_>>>()?;
        let results = call
            .values()
            .filter_map(|value| self.translated(value, translation).transpose())
            .collect::<GenResult<Vec<_>>>()?;

        let asyncness = call.is_async.then(|| quote! { async });
        let await_call = call.is_async.then(|| quote! { .await });
        let propagate = call.has_error().then(|| quote! { ? });
        let invocation = quote! { self.#api.#call_name(#(#call_args),*) #await_call #propagate };
        let statement = match bindings.as_slice() {
            [] => quote! { #invocation; },
            [single] => quote! { let #single = #invocation; },
            many => quote! { let (#(#many),*) = #invocation; },
        };
        let result = tuple_of(&results);
        let result = if signature.has_error() {
            quote! { Ok(#result) }
        } else {
            result
        };

        Ok(quote! {
            pub #asyncness fn #name(#receiver, #(#params),*) -> #return_ty {
                #statement
                #result
            }
        })
    }

    /// Expression forwarding `value` across the boundary, `None` for the error slot.
    fn translated(&self, value: &NamedType, translation: &Translation) -> GenResult<Option<TokenStream>> {
        let binding = param_ident(&value.name)?;
        let root = translation.root_conversion();
        let expr = match translate(value, translation) {
            Translate::Forward(_) => quote! { #binding },
            Translate::ToExternal(_) => {
                let to = ident(&root.method())?;
                quote! { #to(#binding) }
            }
            Translate::FromExternal(_) => {
                let from = ident(&root.reverse().method())?;
                quote! { #from(#binding) }
            }
            Translate::NoError => return Ok(None),
        };
        Ok(Some(expr))
    }

    fn conversion_fn(&self, plan: &ConversionPlan, types: &TypeRenderer<'_>) -> GenResult<TokenStream> {
        let name = ident(&plan.method)?;
        let param = param_ident(&plan.source.name)?;
        let source_ty = types.render(&plan.source.ty)?;
        let target_ty = types.render(&plan.target.ty)?;

        let guard = if !plan.nil_guard {
            quote! {}
        } else if plan.target.is_pointer() {
            quote! { let #param = #param?; }
        } else {
            quote! {
                let Some(#param) = #param else {
                    return Default::default();
                };
            }
        };

        let struct_path = types.path(&plan.target.ty.dereference())?;
        let fields = plan
            .fields
            .iter()
            .map(|assignment| {
                let field = field_ident(&assignment.field)?;
                let value = self
                    .assignment(&assignment.value, types)
                    .context_with(|| format!("field {}", assignment.field))?;
                Ok(quote! { #field: #value })
            })
            .collect::<GenResult<Vec<_>>>()?;

        let value = quote! { #struct_path { #(#fields),* } };
        let body = if plan.target.is_pointer() {
            quote! { Some(#value) }
        } else {
            value
        };

        Ok(quote! {
            pub fn #name(#param: #source_ty) -> #target_ty {
                #guard
                #body
            }
        })
    }

    fn assignment(&self, value: &Assignment, types: &TypeRenderer<'_>) -> GenResult<TokenStream> {
        Ok(match value {
            Assignment::Read { binding, field } => {
                let binding = param_ident(binding)?;
                let field = field_ident(field)?;
                quote! { #binding.#field }
            }
            Assignment::MakePtr(inner) => {
                let inner = self.assignment(inner, types)?;
                let make_ptr = &self.make_ptr;
                quote! { #make_ptr(#inner) }
            }
            Assignment::GetOrDefault { value, default } => {
                let value = self.assignment(value, types)?;
                let default = zero_value(default, types)?;
                let get_or_default = &self.get_or_default;
                quote! { #get_or_default(#value, #default) }
            }
            Assignment::CastUp { ty, value, optional } => {
                let value = self.assignment(value, types)?;
                let ctor = types.path(ty)?;
                if *optional {
                    quote! { #value.map(#ctor) }
                } else {
                    quote! { #ctor(#value) }
                }
            }
            Assignment::CastDown { value, optional } => {
                let value = self.assignment(value, types)?;
                if *optional {
                    quote! { #value.map(|v| v.0) }
                } else {
                    quote! { #value.0 }
                }
            }
            Assignment::Convert { function, value } => {
                let value = self.assignment(value, types)?;
                let function = ident(function)?;
                quote! { #function(#value) }
            }
        })
    }
}

/// Classify a forwarded binding by its type.
pub fn translate(value: &NamedType, translation: &Translation) -> Translate {
    if value.ty.is_error() {
        Translate::NoError
    } else if value.ty == translation.external.named.ty {
        Translate::FromExternal(value.name.clone())
    } else if value.ty == translation.internal.named.ty {
        Translate::ToExternal(value.name.clone())
    } else {
        Translate::Forward(value.name.clone())
    }
}

fn zero_value(zero: &ZeroValue, types: &TypeRenderer<'_>) -> GenResult<TokenStream> {
    Ok(match zero {
        ZeroValue::EmptyString => quote! { String::new() },
        ZeroValue::Integer => quote! { 0 },
        ZeroValue::Float => quote! { 0.0 },
        ZeroValue::Bool => quote! { false },
        ZeroValue::Char => quote! { '\0' },
        ZeroValue::None => quote! { None },
        ZeroValue::Wrapped { ty, inner } => {
            let ctor = types.path(ty)?;
            let inner = zero_value(inner, types)?;
            quote! { #ctor(#inner) }
        }
        ZeroValue::Default => quote! { Default::default() },
    })
}

fn tuple_of(parts: &[impl quote::ToTokens]) -> TokenStream {
    match parts {
        [] => quote! { () },
        [single] => quote! { #single },
        many => quote! { (#(#many),*) },
    }
}

fn parse_helper(key: &str, path: &str) -> GenResult<syn::Path> {
    syn::parse_str(path).map_err(|e| GenError::Config(format!("helpers.{key} {path:?}: {e}")))
}

/// Type name without reference sigils, e.g. `Wrapper` for `&mut Wrapper`.
fn bare_name(ty: &Type) -> &str {
    ty.base()
        .trim_start_matches('&')
        .trim_start_matches("mut ")
        .trim_start()
}

fn ident(name: &str) -> GenResult<syn::Ident> {
    syn::parse_str(name).map_err(|_| GenError::InvalidIdent(name.to_string()))
}

/// Parameter and binding names: keywords get a trailing `_`.
fn param_ident(name: &str) -> GenResult<syn::Ident> {
    ident(&safe_ident(name))
}

/// Struct field names: keywords are written as raw identifiers.
fn field_ident(name: &str) -> GenResult<syn::Ident> {
    match name {
        "self" | "Self" | "super" | "crate" | "_" => Err(GenError::InvalidIdent(name.to_string())),
        keyword if is_keyword(keyword) => Ok(syn::Ident::new_raw(keyword, Span::call_site())),
        other => ident(other),
    }
}

/// Turns model [`Type`]s into `syn` types, writing the external library
/// through its import alias.
pub(crate) struct TypeRenderer<'a> {
    import: &'a Import,
    default_error: &'a str,
}

impl<'a> TypeRenderer<'a> {
    pub(crate) fn new(import: &'a Import, default_error: &'a str) -> Self {
        Self {
            import,
            default_error,
        }
    }

    pub(crate) fn render(&self, ty: &Type) -> GenResult<syn::Type> {
        if ty.is_pointer() {
            let inner = self.render(&ty.dereference())?;
            return Ok(syn::parse_quote! { Option<#inner> });
        }
        if ty.is_error() {
            return self.parse(self.default_error);
        }

        let mut parsed = self.parse(ty.as_str())?;
        if self.import.needs_alias() {
            let prefix: Vec<&str> = self.import.path.split(schemabridge_core::NAMESPACE_SEPARATOR).collect();
            let alias = ident(&self.import.alias)?;
            AliasPaths { prefix, alias }.visit_type_mut(&mut parsed);
        }
        Ok(parsed)
    }

    /// A type usable as a path (struct literal, constructor or trait bound).
    pub(crate) fn path(&self, ty: &Type) -> GenResult<syn::Path> {
        match self.render(ty)? {
            syn::Type::Path(path) if path.qself.is_none() => Ok(path.path),
            _ => Err(GenError::InvalidType {
                ty: ty.to_string(),
                reason: "expected a path".to_string(),
            }),
        }
    }

    fn parse(&self, spelled: &str) -> GenResult<syn::Type> {
        syn::parse_str(spelled).map_err(|e| GenError::InvalidType {
            ty: spelled.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Rewrites `library::path::Item` into `alias::Item`.
struct AliasPaths<'a> {
    prefix: Vec<&'a str>,
    alias: syn::Ident,
}

impl VisitMut for AliasPaths<'_> {
    fn visit_path_mut(&mut self, path: &mut syn::Path) {
        let len = self.prefix.len();
        let matches = path.segments.len() > len
            && path
                .segments
                .iter()
                .zip(&self.prefix)
                .all(|(segment, expected)| segment.arguments.is_none() && segment.ident == expected);
        if matches {
            let rest: Vec<syn::PathSegment> = path.segments.iter().skip(len).cloned().collect();
            let mut segments = Punctuated::new();
            segments.push(syn::PathSegment::from(self.alias.clone()));
            segments.extend(rest);
            path.leading_colon = None;
            path.segments = segments;
        }
        visit_mut::visit_path_mut(self, path);
    }
}
