//! schemabridge-macros - Compile-time schema introspection
//!
//! This crate provides:
//! - `#[derive(Describe)]` - Describe a struct or newtype as a schema tree
//! - `#[describe_api]` - Describe a trait's method set as an `ApiDescription`
//!
//! Generated code refers to `::schemabridge_core`, so use these macros through
//! the `derive` feature of `schemabridge-core`.

use darling::{FromDeriveInput, FromField};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::visit_mut::{self, VisitMut};
use syn::{DeriveInput, FnArg, ItemTrait, ReturnType, TraitItem, TraitItemFn, parse_macro_input};

/// Options for the Describe derive macro
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(describe), supports(struct_named, struct_newtype))]
struct DescribeOpts {
    ident: syn::Ident,
    generics: syn::Generics,
    data: darling::ast::Data<darling::util::Ignored, DescribeField>,
}

#[derive(Debug, FromField)]
#[darling(attributes(describe))]
struct DescribeField {
    ident: Option<syn::Ident>,
    ty: syn::Type,
    vis: syn::Visibility,

    /// Leave this field out of the schema
    #[darling(default)]
    skip: bool,
}

/// Derive macro for schema types
///
/// Structs with named fields describe their public fields in declaration
/// order. A single-field tuple struct is a newtype: it describes as a simple
/// field whose primitive is the wrapped built-in type.
///
/// # Example
///
/// ```ignore
/// #[derive(Describe)]
/// pub struct Resource {
///     pub id: String,
///     pub enabled: Option<bool>,
///     #[describe(skip)]
///     pub cached: Vec<u8>,
/// }
///
/// #[derive(Describe)]
/// pub struct OptionType(pub String);
/// ```
#[proc_macro_derive(Describe, attributes(describe))]
pub fn derive_describe(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match DescribeOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return TokenStream::from(e.write_errors()),
    };

    match expand_describe(opts) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(e) => TokenStream::from(e.to_compile_error()),
    }
}

fn expand_describe(opts: DescribeOpts) -> syn::Result<TokenStream2> {
    let name = &opts.ident;
    if !opts.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &opts.generics,
            "Describe cannot be derived for generic types",
        ));
    }

    let fields = opts
        .data
        .take_struct()
        .ok_or_else(|| syn::Error::new_spanned(name, "Describe can only be derived for structs"))?;

    let body = if fields.is_newtype() {
        let inner = &fields.fields[0].ty;
        quote! {
            let own = <Self as ::schemabridge_core::Describe>::schema_type();
            let inner = <#inner as ::schemabridge_core::Describe>::schema_type();
            let data = ::schemabridge_core::DataType::simple(::schemabridge_core::NamedType::new(name, own.clone()));
            if inner.is_builtin() && inner != own {
                data.with_primitive(inner)
            } else {
                data
            }
        }
    } else {
        let described = fields
            .fields
            .iter()
            .filter(|field| !field.skip && matches!(field.vis, syn::Visibility::Public(_)))
            .filter_map(|field| {
                let ident = field.ident.as_ref()?;
                let field_name = ident.unraw().to_string();
                let ty = &field.ty;
                Some(quote! {
                    ::schemabridge_core::DataField::from_data(
                        #field_name,
                        <#ty as ::schemabridge_core::Describe>::describe(#field_name),
                    )
                })
            });
        quote! {
            ::schemabridge_core::DataType::new_struct(
                ::schemabridge_core::NamedType::new(name, <Self as ::schemabridge_core::Describe>::schema_type()),
                ::std::vec![#(#described),*],
            )
        }
    };

    Ok(quote! {
        impl ::schemabridge_core::Describe for #name {
            fn schema_type() -> ::schemabridge_core::Type {
                ::schemabridge_core::type_of::<Self>()
            }

            fn describe(name: &str) -> ::schemabridge_core::DataType {
                #body
            }
        }
    })
}

/// Attribute for describing a trait's method set
///
/// Keeps the trait as written and adds a function named
/// `<snake_case trait name>_interface` returning its `ApiDescription`. Only
/// methods taking a receiver are listed. A `Result<T, E>` return is split into
/// the value `T` and the error `E`; a tuple `T` gives several values.
///
/// # Example
///
/// ```ignore
/// #[describe_api]
/// pub trait Api {
///     fn get(&self, ctx: &Context, id: &str) -> Result<Option<Resource>, Error>;
/// }
///
/// let api = api_interface();
/// ```
#[proc_macro_attribute]
pub fn describe_api(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        let attr = TokenStream2::from(attr);
        return TokenStream::from(
            syn::Error::new_spanned(attr, "#[describe_api] takes no arguments").to_compile_error(),
        );
    }

    let input = parse_macro_input!(item as syn::Item);
    let syn::Item::Trait(item_trait) = input else {
        return TokenStream::from(
            syn::Error::new_spanned(input, "#[describe_api] can only be applied to a trait")
                .to_compile_error(),
        );
    };

    match expand_describe_api(&item_trait) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(e) => TokenStream::from(e.to_compile_error()),
    }
}

fn expand_describe_api(item: &ItemTrait) -> syn::Result<TokenStream2> {
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "#[describe_api] does not support generic traits",
        ));
    }

    let vis = &item.vis;
    let trait_name = item.ident.unraw().to_string();
    let fn_name = format_ident!("{}_interface", to_snake_case(&trait_name));

    let methods = item
        .items
        .iter()
        .filter_map(|item| match item {
            TraitItem::Fn(method) if method.sig.receiver().is_some() => Some(method),
            _ => None,
        })
        .map(describe_method)
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(quote! {
        #item

        /// Method set of the trait, for schemabridge's reflection extractor.
        #vis fn #fn_name() -> ::schemabridge_core::ApiDescription {
            ::schemabridge_core::ApiDescription {
                name: #trait_name.to_string(),
                path: ::schemabridge_core::Type::new(concat!(module_path!(), "::", #trait_name)),
                methods: ::std::vec![#(#methods),*],
            }
        }
    })
}

fn describe_method(method: &TraitItemFn) -> syn::Result<TokenStream2> {
    let sig = &method.sig;
    let name = sig.ident.unraw().to_string();
    let is_async = sig.asyncness.is_some();
    let mutable_receiver = sig
        .receiver()
        .is_some_and(|receiver| receiver.reference.is_some() && receiver.mutability.is_some());

    let args = sig
        .inputs
        .iter()
        .filter_map(|arg| match arg {
            FnArg::Typed(pat) => Some(nameable(&pat.ty)),
            FnArg::Receiver(_) => None,
        })
        .collect::<syn::Result<Vec<_>>>()?;

    let (returns, error) = match &sig.output {
        ReturnType::Default => (Vec::new(), None),
        ReturnType::Type(_, ty) => split_result(ty),
    };
    let returns = returns.iter().map(nameable).collect::<syn::Result<Vec<_>>>()?;
    let error = match error {
        Some(ty) => {
            let ty = nameable(&ty)?;
            quote! { ::std::option::Option::Some(::schemabridge_core::type_of::<#ty>()) }
        }
        None => quote! { ::std::option::Option::None },
    };

    Ok(quote! {
        ::schemabridge_core::MethodDescription {
            name: #name.to_string(),
            is_async: #is_async,
            mutable_receiver: #mutable_receiver,
            args: ::std::vec![#(::schemabridge_core::type_of::<#args>()),*],
            returns: ::std::vec![#(::schemabridge_core::type_of::<#returns>()),*],
            error: #error,
        }
    })
}

/// Split `Result<T, E>` into its value list and error type.
fn split_result(ty: &syn::Type) -> (Vec<syn::Type>, Option<syn::Type>) {
    if let syn::Type::Path(path) = ty
        && let Some(segment) = path.path.segments.last()
        && segment.ident == "Result"
        && let syn::PathArguments::AngleBracketed(args) = &segment.arguments
    {
        let types: Vec<&syn::Type> = args
            .args
            .iter()
            .filter_map(|arg| match arg {
                syn::GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
            .collect();
        if let [ok, err] = types.as_slice() {
            return (expand_tuple(ok), Some((*err).clone()));
        }
    }
    (expand_tuple(ty), None)
}

fn expand_tuple(ty: &syn::Type) -> Vec<syn::Type> {
    match ty {
        syn::Type::Tuple(tuple) => tuple.elems.iter().cloned().collect(),
        syn::Type::Paren(paren) => expand_tuple(&paren.elem),
        other => vec![other.clone()],
    }
}

/// A copy of `ty` usable as a turbofish argument inside a free function.
fn nameable(ty: &syn::Type) -> syn::Result<syn::Type> {
    if let syn::Type::ImplTrait(_) = ty {
        return Err(syn::Error::new_spanned(
            ty,
            "#[describe_api] cannot describe `impl Trait` types",
        ));
    }
    let mut ty = ty.clone();
    ElideLifetimes.visit_type_mut(&mut ty);
    Ok(ty)
}

/// Replaces named lifetimes, which are out of scope in the generated function.
struct ElideLifetimes;

impl VisitMut for ElideLifetimes {
    fn visit_type_reference_mut(&mut self, reference: &mut syn::TypeReference) {
        if reference.lifetime.as_ref().is_some_and(|l| l.ident != "static") {
            reference.lifetime = None;
        }
        visit_mut::visit_type_reference_mut(self, reference);
    }

    fn visit_lifetime_mut(&mut self, lifetime: &mut syn::Lifetime) {
        if lifetime.ident != "static" {
            *lifetime = syn::Lifetime::new("'_", lifetime.apostrophe);
        }
    }
}

/// Convert a PascalCase string to snake_case, keeping acronyms together
///
/// Mirrors `schemabridge::naming::to_snake_case`; a proc-macro crate cannot
/// depend on the generator, which depends on it through `schemabridge-core`.
fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
            let acronym_end = i > 0
                && chars[i - 1].is_uppercase()
                && chars.get(i + 1).is_some_and(|next| next.is_lowercase());
            if prev_lower || acronym_end {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod lib_tests;
