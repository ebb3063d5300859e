//! Property-based tests for the generated Atlas conversions
//!
//! Internal values survive a trip through the external schema unchanged, and
//! absent values stay absent in both directions.

use atlas_sdk as sdk;
use atlas_types::def::{
    ComplexSubtype, OptionType, OptionalRef, Resource, Subtype, complex_subtype_from_atlas, complex_subtype_to_atlas,
    from_atlas, to_atlas,
};
use proptest::prelude::*;

fn arb_resource() -> impl Strategy<Value = Resource> {
    (
        ".*",
        ".*",
        any::<bool>(),
        "[a-z0-9-]{1,32}",
        proptest::option::of(".*"),
        ".*",
        ".*",
    )
        .prop_map(|(name, subtype, enabled, id, r#ref, selected, status)| Resource {
            complex_subtype: ComplexSubtype {
                name,
                subtype: Subtype(subtype),
            },
            enabled,
            id,
            optional_ref: r#ref.map(|r#ref| OptionalRef { r#ref }),
            selected_option: OptionType(selected),
            status,
        })
}

fn arb_external() -> impl Strategy<Value = sdk::Resource> {
    (
        any::<Option<bool>>(),
        "[a-z0-9-]{1,32}",
        proptest::option::of(".*"),
        proptest::option::of(".*"),
    )
        .prop_map(|(enabled, id, selected_option, status)| sdk::Resource {
            enabled,
            id,
            selected_option,
            status,
            ..sdk::Resource::default()
        })
}

proptest! {
    /// Property: internal -> external -> internal is the identity
    #[test]
    fn proptest_internal_roundtrip(res in arb_resource()) {
        let recovered = from_atlas(to_atlas(Some(res.clone())));

        prop_assert_eq!(recovered, Some(res));
    }

    /// Property: every internal value is present on the external side
    #[test]
    fn proptest_to_external_sets_optionals(res in arb_resource()) {
        let external = to_atlas(Some(res.clone())).unwrap();

        prop_assert_eq!(external.enabled, Some(res.enabled));
        prop_assert_eq!(external.selected_option, Some(res.selected_option.0));
        prop_assert_eq!(external.status, Some(res.status));
        prop_assert_eq!(external.optional_ref.is_some(), res.optional_ref.is_some());
    }

    /// Property: absent external values read as zero values
    #[test]
    fn proptest_from_external_defaults(external in arb_external()) {
        let internal = from_atlas(Some(external.clone())).unwrap();

        prop_assert_eq!(internal.enabled, external.enabled.unwrap_or(false));
        prop_assert_eq!(internal.selected_option.0, external.selected_option.unwrap_or_default());
        prop_assert_eq!(internal.status, external.status.unwrap_or_default());
        prop_assert_eq!(internal.optional_ref, None);
    }

    /// Property: nested values convert field by field
    #[test]
    fn proptest_complex_subtype_roundtrip(name in ".*", subtype in ".*") {
        let value = ComplexSubtype { name, subtype: Subtype(subtype) };

        let external = complex_subtype_to_atlas(value.clone());

        prop_assert_eq!(&external.subtype, &value.subtype.0);
        prop_assert_eq!(complex_subtype_from_atlas(external), value);
    }
}

#[test]
fn conversions___none___stays_none() {
    assert_eq!(to_atlas(None), None);
    assert_eq!(from_atlas(None), None);
    assert_eq!(atlas_types::def::optional_ref_to_atlas(None), None);
    assert_eq!(atlas_types::def::optional_ref_from_atlas(None), None);
}
