// Code generated by schemabridge. DO NOT EDIT.
// Package: atlas_types::def

use atlas_sdk as sdk;
/// Forwards calls to the Atlas API, translating between internal and external types.
pub struct Wrapper<T> {
    api: T,
}
impl<T> Wrapper<T> {
    pub fn new(api: T) -> Self {
        Self { api }
    }
}
impl<T: sdk::Api> Wrapper<T> {
    pub async fn get(
        &self,
        ctx: &sdk::Context,
        s: &str,
    ) -> Result<Option<Resource>, sdk::Error> {
        let atlas_sdk_r = self.api.get(ctx, s).await?;
        Ok(from_atlas(atlas_sdk_r))
    }
    pub async fn create(
        &self,
        ctx: &sdk::Context,
        res: Option<Resource>,
    ) -> Result<Option<Resource>, sdk::Error> {
        let atlas_sdk_r = self.api.create(ctx, to_atlas(res)).await?;
        Ok(from_atlas(atlas_sdk_r))
    }
}
pub fn to_atlas(res: Option<Resource>) -> Option<sdk::Resource> {
    let res = res?;
    Some(sdk::Resource {
        complex_subtype: complex_subtype_to_atlas(res.complex_subtype),
        enabled: Some(res.enabled),
        id: res.id,
        optional_ref: optional_ref_to_atlas(res.optional_ref),
        selected_option: Some(res.selected_option.0),
        status: Some(res.status),
    })
}
pub fn from_atlas(res: Option<sdk::Resource>) -> Option<Resource> {
    let res = res?;
    Some(Resource {
        complex_subtype: complex_subtype_from_atlas(res.complex_subtype),
        enabled: Option::unwrap_or(res.enabled, false),
        id: res.id,
        optional_ref: optional_ref_from_atlas(res.optional_ref),
        selected_option: OptionType(
            Option::unwrap_or(res.selected_option, String::new()),
        ),
        status: Option::unwrap_or(res.status, String::new()),
    })
}
pub fn complex_subtype_to_atlas(complex_subtype: ComplexSubtype) -> sdk::ComplexSubtype {
    sdk::ComplexSubtype {
        name: complex_subtype.name,
        subtype: complex_subtype.subtype.0,
    }
}
pub fn complex_subtype_from_atlas(
    complex_subtype: sdk::ComplexSubtype,
) -> ComplexSubtype {
    ComplexSubtype {
        name: complex_subtype.name,
        subtype: Subtype(complex_subtype.subtype),
    }
}
pub fn optional_ref_to_atlas(
    optional_ref: Option<OptionalRef>,
) -> Option<sdk::OptionalRef> {
    let optional_ref = optional_ref?;
    Some(sdk::OptionalRef {
        r#ref: optional_ref.r#ref,
    })
}
pub fn optional_ref_from_atlas(
    optional_ref: Option<sdk::OptionalRef>,
) -> Option<OptionalRef> {
    let optional_ref = optional_ref?;
    Some(OptionalRef {
        r#ref: optional_ref.r#ref,
    })
}
