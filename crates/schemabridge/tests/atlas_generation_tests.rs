//! End-to-end generation against the Atlas demo crates
//!
//! The annotated `demos/atlas-types/src/def.rs` must reproduce the checked-in
//! `generated.rs`, and describing the same types through `Describe` must give
//! the same schemas.

#![allow(non_snake_case)]

use quote::ToTokens;
use schemabridge::prelude::*;
use schemabridge::{ReflectSettings, ShortNames, TranslationLayerSpec};
use schemabridge_core::{DataType, Shape};
use std::path::PathBuf;

fn demo_file(name: &str) -> PathBuf {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/atlas-types/src").join(name);
    std::fs::canonicalize(&path).unwrap()
}

fn annotated_layer() -> TranslationLayer {
    let settings = Settings::default();
    AnnotationExtractor::new(&settings)
        .extract_file(demo_file("def.rs"))
        .unwrap()
}

fn described_layer() -> TranslationLayer {
    let spec = TranslationLayerSpec::new::<Option<atlas_types::def::Resource>, Option<atlas_sdk::Resource>>(
        "atlas_types::def",
        "Wrapper",
        atlas_sdk::api_interface(),
    );
    let settings = ReflectSettings {
        external_name: "Atlas".to_string(),
        import_alias: Some("sdk".to_string()),
        wrapper_type: None,
    };
    spec.translation_layer(&settings, &ShortNames::default()).unwrap()
}

fn tokens(code: &str) -> String {
    syn::parse_file(code).unwrap().to_token_stream().to_string()
}

/// `(field path, type, primitive)` for every node, ignoring binding names.
fn shape(data: &DataType) -> Vec<(String, String, Option<String>)> {
    fn walk(data: &DataType, path: &str, out: &mut Vec<(String, String, Option<String>)>) {
        out.push((
            path.to_string(),
            data.named.ty.to_string(),
            data.named.primitive.as_ref().map(ToString::to_string),
        ));
        if let Shape::Struct(fields) = &data.shape {
            for field in fields {
                walk(&field.data, &format!("{path}.{}", field.field_name), out);
            }
        }
    }
    let mut out = Vec::new();
    walk(data, "", &mut out);
    out
}

fn function_names(code: &str) -> Vec<String> {
    let file = syn::parse_file(code).unwrap();
    let mut names = Vec::new();
    for item in file.items {
        match item {
            syn::Item::Fn(function) => names.push(function.sig.ident.to_string()),
            syn::Item::Impl(block) => names.extend(block.items.into_iter().filter_map(|item| match item {
                syn::ImplItem::Fn(method) => Some(method.sig.ident.to_string()),
                _ => None,
            })),
            _ => {}
        }
    }
    names
}

// ============================================================================
// Annotation path
// ============================================================================

#[test]
fn annotations___atlas_types___reproduce_checked_in_code() {
    let expected = std::fs::read_to_string(demo_file("generated.rs")).unwrap();

    let generated = annotated_layer().generate(&Settings::default()).unwrap();

    let header: Vec<&str> = generated.lines().take(2).collect();
    assert_eq!(
        header,
        vec![
            "// Code generated by schemabridge. DO NOT EDIT.",
            "// Package: atlas_types::def"
        ]
    );
    assert_eq!(tokens(&generated), tokens(&expected));
}

#[test]
fn annotations___atlas_types___plan_nested_conversions_in_order() {
    let generated = annotated_layer().generate(&Settings::default()).unwrap();

    assert_eq!(
        function_names(&generated),
        vec![
            "new",
            "get",
            "create",
            "to_atlas",
            "from_atlas",
            "complex_subtype_to_atlas",
            "complex_subtype_from_atlas",
            "optional_ref_to_atlas",
            "optional_ref_from_atlas",
        ]
    );
}

#[test]
fn generate___same_input___is_deterministic() {
    let settings = Settings::default();
    let layer = annotated_layer();

    let first = layer.generate(&settings).unwrap();
    let second = annotated_layer().generate(&settings).unwrap();

    assert_eq!(first, second);
}

// ============================================================================
// Reflection path
// ============================================================================

#[test]
fn reflection___atlas_types___matches_annotation_schemas() {
    let annotated = annotated_layer().wrapped_type.unwrap();
    let described = described_layer().wrapped_type.unwrap();

    assert_eq!(
        shape(&described.translation.internal),
        shape(&annotated.translation.internal)
    );
    assert_eq!(
        shape(&described.translation.external),
        shape(&annotated.translation.external)
    );
    assert_eq!(described.translation.lib, annotated.translation.lib);
    assert_eq!(described.translation.external_api.ty, annotated.translation.external_api.ty);
    assert_eq!(described.translation.wrapper.ty, annotated.translation.wrapper.ty);
}

#[test]
fn reflection___atlas_api___matches_annotation_methods() {
    let annotated = annotated_layer().wrapped_type.unwrap();
    let described = described_layer().wrapped_type.unwrap();

    let signature_types = |methods: &[schemabridge::WrapperMethod]| {
        methods
            .iter()
            .map(|method| {
                let signature = &method.method.signature;
                (
                    signature.name.clone(),
                    signature.is_async,
                    method.method.receiver.ty.to_string(),
                    signature.args.iter().map(|arg| arg.ty.to_string()).collect::<Vec<_>>(),
                    signature.returns.iter().map(|ret| ret.ty.to_string()).collect::<Vec<_>>(),
                    signature.error_type.as_ref().map(ToString::to_string),
                )
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(
        signature_types(&described.wrapper_methods),
        signature_types(&annotated.wrapper_methods)
    );
}

#[test]
fn reflection___atlas_types___generates_same_functions() {
    let settings = Settings::default();

    let described = described_layer().generate(&settings).unwrap();
    let annotated = annotated_layer().generate(&settings).unwrap();

    assert_eq!(function_names(&described), function_names(&annotated));
    assert!(described.contains("use atlas_sdk as sdk;"));
}
