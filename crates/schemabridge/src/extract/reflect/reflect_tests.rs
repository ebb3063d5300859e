#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

mod internal {
    #[derive(schemabridge_core::Describe)]
    pub struct Resource {
        pub id: String,
        pub label: Label,
    }

    #[derive(schemabridge_core::Describe)]
    pub struct Label(pub String);
}

mod sdk {
    #[derive(schemabridge_core::Describe)]
    pub struct Resource {
        pub id: String,
        pub label: Option<String>,
    }
}

fn internal_data() -> DataType {
    DataType::new_struct(
        NamedType::new("", "*app::model::Resource"),
        vec![
            DataField::simple("id", "String"),
            DataField::new_struct(
                "complex_subtype",
                NamedType::new("complex_subtype", "app::model::ComplexSubtype"),
                vec![DataField::simple("name", "String")],
            ),
        ],
    )
}

fn external_data() -> DataType {
    DataType::new_struct(
        NamedType::new("", "*lib::sdk::Resource"),
        vec![
            DataField::simple("id", "String"),
            DataField::new_struct(
                "complex_subtype",
                NamedType::new("complex_subtype", "lib::sdk::ComplexSubtype"),
                vec![DataField::simple("name", "*String")],
            ),
        ],
    )
}

fn get_method() -> MethodDescription {
    MethodDescription {
        name: "get".to_string(),
        is_async: true,
        mutable_receiver: false,
        args: vec![Type::new("&lib::sdk::Context"), Type::new("&str")],
        returns: vec![Type::new("*lib::sdk::Resource")],
        error: Some(Type::new("lib::sdk::Error")),
    }
}

fn layer_spec(methods: Vec<MethodDescription>) -> TranslationLayerSpec {
    TranslationLayerSpec {
        package_name: "app::model".to_string(),
        name: "Wrapper".to_string(),
        internal: internal_data(),
        external: external_data(),
        api: ApiDescription {
            name: "Api".to_string(),
            path: Type::new("lib::sdk::Api"),
            methods,
        },
    }
}

fn translation(layer: TranslationLayer) -> WrappedType {
    layer.wrapped_type.unwrap()
}

// ============================================================================
// Schemas
// ============================================================================

#[test]
fn translation_layer___struct_nodes___take_short_names() {
    let spec = layer_spec(vec![get_method()]);

    let layer = spec
        .translation_layer(&ReflectSettings::default(), &ShortNames::default())
        .unwrap();

    assert_eq!(layer.package_name, "app::model");
    let translation = translation(layer).translation;
    assert_eq!(
        translation.internal,
        DataType::new_struct(
            NamedType::new("r", "*Resource"),
            vec![
                DataField::simple("id", "String"),
                DataField::new_struct(
                    "complex_subtype",
                    NamedType::new("cs", "ComplexSubtype"),
                    vec![DataField::simple("name", "String")],
                ),
            ],
        )
    );
    assert_eq!(
        translation.external,
        DataType::new_struct(
            NamedType::new("sdk_r", "*lib::sdk::Resource"),
            vec![
                DataField::simple("id", "String"),
                DataField::new_struct(
                    "complex_subtype",
                    NamedType::new("sdk_cs", "lib::sdk::ComplexSubtype"),
                    vec![DataField::simple("name", "*String")],
                ),
            ],
        )
    );
}

#[test]
fn translation_layer___defaults___derive_alias_and_wrapper() {
    let spec = layer_spec(vec![get_method()]);

    let layer = spec
        .translation_layer(&ReflectSettings::default(), &ShortNames::default())
        .unwrap();

    let translation = translation(layer).translation;
    assert_eq!(translation.lib, Import::new("sdk", "lib::sdk"));
    assert_eq!(translation.external_name, "ExternalSystem");
    assert_eq!(translation.wrapper, NamedType::new("w", "Wrapper"));
    assert_eq!(translation.external_api, NamedType::new("api", "lib::sdk::Api"));
}

#[test]
fn translation_layer___settings___override_names() {
    let spec = layer_spec(vec![get_method()]);
    let settings = ReflectSettings {
        external_name: "Atlas".to_string(),
        import_alias: Some("remote".to_string()),
        wrapper_type: Some("Client".to_string()),
    };

    let layer = spec.translation_layer(&settings, &ShortNames::default()).unwrap();

    let translation = translation(layer).translation;
    assert_eq!(translation.lib, Import::new("remote", "lib::sdk"));
    assert_eq!(translation.external_name, "Atlas");
    assert_eq!(translation.wrapper, NamedType::new("w", "Client"));
}

#[test]
fn translation_layer___unqualified_api___returns_unsupported_type() {
    let mut spec = layer_spec(vec![get_method()]);
    spec.api.path = Type::new("Api");

    let result = spec.translation_layer(&ReflectSettings::default(), &ShortNames::default());

    assert!(matches!(result, Err(GenError::UnsupportedType(_))));
}

// ============================================================================
// Methods
// ============================================================================

#[test]
fn translation_layer___forwarded_method___uses_internal_type() {
    let spec = layer_spec(vec![get_method()]);

    let layer = spec
        .translation_layer(&ReflectSettings::default(), &ShortNames::default())
        .unwrap();

    let methods = translation(layer).wrapper_methods;
    assert_eq!(methods.len(), 1);
    let method = &methods[0].method;
    assert_eq!(method.receiver, NamedType::new("w", "&Wrapper"));
    assert!(method.signature.is_async);
    assert_eq!(
        method.signature.args,
        vec![NamedType::new("ctx", "&lib::sdk::Context"), NamedType::new("s", "&str")]
    );
    assert_eq!(
        method.signature.returns,
        vec![NamedType::new("r", "*Resource"), NamedType::new("err", Type::error())]
    );
    assert_eq!(method.signature.error_type, Some(Type::new("lib::sdk::Error")));
    assert_eq!(
        methods[0].wrapped_call.returns[0],
        NamedType::new("sdk_r", "*lib::sdk::Resource")
    );
}

#[test]
fn translation_layer___mutable_receiver___is_kept() {
    let method = MethodDescription {
        name: "update".to_string(),
        mutable_receiver: true,
        ..get_method()
    };
    let spec = layer_spec(vec![method]);

    let layer = spec
        .translation_layer(&ReflectSettings::default(), &ShortNames::default())
        .unwrap();

    assert!(translation(layer).wrapper_methods[0].method.is_mut());
}

#[test]
fn translation_layer___no_return_values___returns_missing_return() {
    let method = MethodDescription {
        name: "ping".to_string(),
        returns: vec![],
        error: None,
        ..get_method()
    };
    let spec = layer_spec(vec![method]);

    let result = spec.translation_layer(&ReflectSettings::default(), &ShortNames::default());

    assert!(matches!(result, Err(GenError::MissingReturn(name)) if name == "ping"));
}

#[test_case(Some("lib::sdk::Error"), 1; "error only")]
#[test_case(None, 0; "nothing")]
fn translation_layer___unit_result___needs_error_slot(error: Option<&str>, expected_returns: usize) {
    let method = MethodDescription {
        name: "delete".to_string(),
        returns: vec![],
        error: error.map(Type::new),
        ..get_method()
    };
    let spec = layer_spec(vec![method]);

    let result = spec.translation_layer(&ReflectSettings::default(), &ShortNames::default());

    match result {
        Ok(layer) => {
            let returns = &translation(layer).wrapper_methods[0].method.signature.returns;
            assert_eq!(returns.len(), expected_returns);
        }
        Err(err) => {
            assert_eq!(expected_returns, 0);
            assert!(matches!(err, GenError::MissingReturn(_)));
        }
    }
}

#[test]
fn translation_layer___custom_short_names___name_parameters() {
    let spec = layer_spec(vec![get_method()]);
    let short_names = ShortNames::default().with("str", "id");

    let layer = spec
        .translation_layer(&ReflectSettings::default(), &short_names)
        .unwrap();

    let args = &translation(layer).wrapper_methods[0].method.signature.args;
    assert_eq!(args[1], NamedType::new("id", "&str"));
}

// ============================================================================
// Described types
// ============================================================================

#[test]
fn new___derived_types___are_described_with_their_paths() {
    let api = ApiDescription {
        name: "Api".to_string(),
        path: Type::new("lib::sdk::Api"),
        methods: vec![],
    };
    let package = concat!(module_path!(), "::internal");

    let spec = TranslationLayerSpec::new::<Option<internal::Resource>, Option<sdk::Resource>>(package, "Wrapper", api);

    assert_eq!(spec.internal.named.ty, Type::new(format!("*{package}::Resource")));
    assert_eq!(
        spec.internal.fields()[1],
        DataField::simple("label", format!("{package}::Label")).with_primitive("String")
    );
    assert_eq!(spec.external.named.ty, Type::new(format!("*{}::sdk::Resource", module_path!())));
    assert_eq!(spec.external.fields()[1], DataField::simple("label", "*String"));
}

#[test]
fn new___derived_types___translate_with_local_names() {
    let api = ApiDescription {
        name: "Api".to_string(),
        path: Type::new(concat!(module_path!(), "::sdk::Api")),
        methods: vec![],
    };
    let package = concat!(module_path!(), "::internal");
    let spec = TranslationLayerSpec::new::<Option<internal::Resource>, Option<sdk::Resource>>(package, "Wrapper", api);

    let layer = spec
        .translation_layer(&ReflectSettings::default(), &ShortNames::default())
        .unwrap();

    let translation = translation(layer).translation;
    assert_eq!(translation.internal.named, NamedType::new("r", "*Resource"));
    assert_eq!(
        translation.internal.fields()[1],
        DataField::simple("label", "Label").with_primitive("String")
    );
    assert_eq!(translation.lib.alias, "sdk");
}

#[test]
fn ReflectSettings___from_settings___copies_names() {
    let settings = Settings {
        external_name: "Atlas".to_string(),
        import_alias: Some("sdk".to_string()),
        ..Settings::default()
    };

    let reflect = ReflectSettings::from(&settings);

    assert_eq!(reflect.external_name, "Atlas");
    assert_eq!(reflect.import_alias.as_deref(), Some("sdk"));
    assert_eq!(reflect.wrapper_type, None);
}
