#![allow(non_snake_case)]

use super::*;
use schemabridge_core::{DataField, Type};

fn nested_translation() -> Translation {
    Translation {
        lib: Import::new("sdk", "atlas_sdk"),
        external_name: "Atlas".to_string(),
        external: DataType::new_struct(
            NamedType::new("res", "*atlas_sdk::Resource"),
            vec![
                DataField::new_struct(
                    "complex_subtype",
                    NamedType::new("complex_subtype", "atlas_sdk::ComplexSubtype"),
                    vec![DataField::simple("name", "String"), DataField::simple("subtype", "String")],
                ),
                DataField::simple("id", "String"),
            ],
        ),
        external_api: NamedType::new("api", "atlas_sdk::Api"),
        internal: DataType::new_struct(
            NamedType::new("res", "*Resource"),
            vec![
                DataField::new_struct(
                    "complex_subtype",
                    NamedType::new("complex_subtype", "ComplexSubtype"),
                    vec![
                        DataField::simple("name", "String"),
                        DataField::simple("subtype", "Subtype").with_primitive("String"),
                    ],
                ),
                DataField::simple("id", "String"),
            ],
        ),
        wrapper: NamedType::new("w", "Wrapper"),
    }
}

fn get_method() -> WrapperMethod {
    WrapperMethod {
        method: MethodSignature::new(
            NamedType::new("w", "&Wrapper"),
            FunctionSignature::new(
                "get",
                vec![NamedType::new("ctx", "&atlas_sdk::Context"), NamedType::new("s", "&str")],
                vec![NamedType::new("res", "*Resource"), NamedType::new("err", Type::error())],
            )
            .with_error_type("atlas_sdk::Error"),
        ),
        wrapped_call: FunctionSignature::new(
            "get",
            vec![NamedType::new("ctx", "&atlas_sdk::Context"), NamedType::new("s", "&str")],
            vec![
                NamedType::new("atlas_sdk_r", "*atlas_sdk::Resource"),
                NamedType::new("err", Type::error()),
            ],
        )
        .with_error_type("atlas_sdk::Error"),
    }
}

fn nested_layer() -> TranslationLayer {
    TranslationLayer::new(
        "atlas_types::def",
        Some(WrappedType {
            translation: nested_translation(),
            wrapper_methods: vec![get_method()],
        }),
    )
}

// ============================================================================
// Request validation
// ============================================================================

#[test]
fn generate_translation_layer___no_request___returns_nil_spec() {
    let result = generate_translation_layer(None, &Settings::default());

    assert!(matches!(result, Err(GenError::NilSpec)));
    assert_eq!(
        result.unwrap_err().to_string(),
        "code specification cannot be nil"
    );
}

#[test]
fn generate_translation_layer___empty_request___returns_empty_spec() {
    let layer = TranslationLayer::new("", None);

    let result = generate_translation_layer(Some(&layer), &Settings::default());

    assert!(matches!(result, Err(GenError::EmptySpec)));
}

#[test]
fn generate_translation_layer___package_only___returns_header() {
    let layer = TranslationLayer::new("atlas_types::def", None);

    let code = generate_translation_layer(Some(&layer), &Settings::default()).unwrap();

    assert_eq!(
        code,
        "// Code generated by schemabridge. DO NOT EDIT.\n// Package: atlas_types::def\n"
    );
}

#[test]
fn TranslationLayer___is_empty___only_without_package_and_type() {
    assert!(TranslationLayer::new("", None).is_empty());
    assert!(!TranslationLayer::new("pkg", None).is_empty());
    assert!(!nested_layer().is_empty());
}

// ============================================================================
// Generation
// ============================================================================

#[test]
fn TranslationLayer___nested_struct___emits_sub_conversions_in_order() {
    let code = nested_layer().generate(&Settings::default()).unwrap();

    let order: Vec<usize> = [
        "pub fn to_atlas(",
        "pub fn from_atlas(",
        "pub fn complex_subtype_to_atlas(",
        "pub fn complex_subtype_from_atlas(",
    ]
    .iter()
    .map(|needle| code.find(needle).unwrap_or_else(|| panic!("{needle} missing from:\n{code}")))
    .collect();

    assert!(order.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn TranslationLayer___nested_struct___converts_primitive_wrappers() {
    let code = nested_layer().generate(&Settings::default()).unwrap();

    assert!(code.contains("subtype: complex_subtype.subtype.0"));
    assert!(code.contains("subtype: Subtype(complex_subtype.subtype)"));
    assert!(code.contains("complex_subtype: complex_subtype_to_atlas(res.complex_subtype)"));
}

#[test]
fn TranslationLayer___generate___is_deterministic() {
    let layer = nested_layer();
    let settings = Settings::default();

    assert_eq!(layer.generate(&settings).unwrap(), layer.generate(&settings).unwrap());
}

#[test]
fn TranslationLayer___unmatched_field___fails_without_output() {
    let mut layer = nested_layer();
    let wrapped = layer.wrapped_type.as_mut().unwrap();
    wrapped.translation.external = DataType::new_struct(
        NamedType::new("res", "*atlas_sdk::Resource"),
        vec![DataField::simple("identifier", "String")],
    );

    let result = layer.generate(&Settings::default());

    let err = result.unwrap_err();
    assert!(matches!(err.root_cause(), GenError::NoCorrespondingField { .. }));
}

#[test]
fn TranslationLayer___serde_roundtrip___preserves_request() {
    let layer = nested_layer();

    let json = serde_json::to_string(&layer).unwrap();
    let parsed: TranslationLayer = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed, layer);
}

#[test]
fn Translation___root_conversion___goes_internal_to_external() {
    let translation = nested_translation();

    let root = translation.root_conversion();

    assert!(root.root);
    assert_eq!(root.method(), "to_atlas");
    assert_eq!(root.source.named.ty, Type::new("*Resource"));
    assert_eq!(root.reverse().method(), "from_atlas");
}
