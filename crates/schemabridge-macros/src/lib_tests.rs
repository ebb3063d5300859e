#![allow(non_snake_case)]

use super::*;

// to_snake_case tests

#[test]
fn to_snake_case___pascal_case___converts_correctly() {
    assert_eq!(to_snake_case("ResourceApi"), "resource_api");
}

#[test]
fn to_snake_case___acronym___kept_together() {
    assert_eq!(to_snake_case("AtlasAPI"), "atlas_api");
    assert_eq!(to_snake_case("HTTPClient"), "http_client");
}

#[test]
fn to_snake_case___single_word___lowercases() {
    assert_eq!(to_snake_case("Api"), "api");
}

#[test]
fn to_snake_case___already_lowercase___unchanged() {
    assert_eq!(to_snake_case("simple"), "simple");
}

#[test]
fn to_snake_case___empty_string___returns_empty() {
    assert_eq!(to_snake_case(""), "");
}

// split_result tests

#[test]
fn split_result___result_type___splits_value_and_error() {
    let ty: syn::Type = syn::parse_quote!(Result<Option<Resource>, Error>);

    let (values, error) = split_result(&ty);

    assert_eq!(values.len(), 1);
    assert_eq!(quote!(#(#values)*).to_string(), quote!(Option<Resource>).to_string());
    assert_eq!(quote!(#error).to_string(), quote!(Error).to_string());
}

#[test]
fn split_result___unit_ok___has_no_values() {
    let ty: syn::Type = syn::parse_quote!(std::result::Result<(), Error>);

    let (values, error) = split_result(&ty);

    assert!(values.is_empty());
    assert!(error.is_some());
}

#[test]
fn split_result___tuple___expands_values() {
    let ty: syn::Type = syn::parse_quote!((String, u32));

    let (values, error) = split_result(&ty);

    assert_eq!(values.len(), 2);
    assert!(error.is_none());
}

#[test]
fn split_result___single_argument_alias___is_plain_value() {
    let ty: syn::Type = syn::parse_quote!(Result<String>);

    let (values, error) = split_result(&ty);

    assert_eq!(values.len(), 1);
    assert!(error.is_none());
}

// nameable tests

#[test]
fn nameable___named_lifetime___is_elided() {
    let ty: syn::Type = syn::parse_quote!(&'a Context<'a>);

    let named = nameable(&ty).unwrap();

    assert_eq!(quote!(#named).to_string(), quote!(&Context<'_>).to_string());
}

#[test]
fn nameable___static_lifetime___is_kept() {
    let ty: syn::Type = syn::parse_quote!(&'static str);

    let named = nameable(&ty).unwrap();

    assert_eq!(quote!(#named).to_string(), quote!(&'static str).to_string());
}

#[test]
fn nameable___impl_trait___is_rejected() {
    let ty: syn::Type = syn::parse_quote!(impl Into<String>);

    assert!(nameable(&ty).is_err());
}

// expand_describe_api tests

#[test]
fn expand_describe_api___trait___emits_interface_function() {
    let item: ItemTrait = syn::parse_quote! {
        pub trait ResourceApi {
            fn get(&self, id: &str) -> Result<Option<Resource>, Error>;
            fn new() -> Self;
        }
    };

    let tokens = expand_describe_api(&item).unwrap().to_string();

    assert!(tokens.contains("fn resource_api_interface"));
    assert!(tokens.contains("\"get\""));
    assert!(!tokens.contains("\"new\""));
}

#[test]
fn expand_describe_api___generic_trait___is_rejected() {
    let item: ItemTrait = syn::parse_quote! {
        pub trait Store<T> {
            fn get(&self) -> T;
        }
    };

    let err = expand_describe_api(&item).unwrap_err();

    assert!(err.to_string().contains("generic"));
}

// expand_describe tests

#[test]
fn expand_describe___named_struct___skips_private_and_skipped_fields() {
    let input: DeriveInput = syn::parse_quote! {
        pub struct Resource {
            pub id: String,
            pub r#ref: String,
            secret: String,
            #[describe(skip)]
            pub cache: Vec<u8>,
        }
    };
    let opts = DescribeOpts::from_derive_input(&input).unwrap();

    let tokens = expand_describe(opts).unwrap().to_string();

    assert!(tokens.contains("\"id\""));
    assert!(tokens.contains("\"ref\""));
    assert!(!tokens.contains("\"secret\""));
    assert!(!tokens.contains("\"cache\""));
}

#[test]
fn expand_describe___newtype___emits_primitive_check() {
    let input: DeriveInput = syn::parse_quote! {
        pub struct OptionType(pub String);
    };
    let opts = DescribeOpts::from_derive_input(&input).unwrap();

    let tokens = expand_describe(opts).unwrap().to_string();

    assert!(tokens.contains("with_primitive"));
}

#[test]
fn DescribeOpts___enum___is_rejected() {
    let input: DeriveInput = syn::parse_quote! {
        pub enum Status { Ready, Failed }
    };

    assert!(DescribeOpts::from_derive_input(&input).is_err());
}

#[test]
fn DescribeOpts___unit_struct___is_rejected() {
    let input: DeriveInput = syn::parse_quote! {
        pub struct Marker;
    };

    assert!(DescribeOpts::from_derive_input(&input).is_err());
}
