// +schemabridge:ExternalSystem:Atlas
// +schemabridge:ExternalPackage:var=sdk,path=atlas_sdk
// +schemabridge:ExternalType:var=res,type=*sdk::Resource
// +schemabridge:ExternalAPI:var=api,type=sdk::Api
// +schemabridge:WrapperType:var=w,type=Wrapper

use schemabridge_core::Describe;

/// Resource as stored by the operator.
// +schemabridge:InternalType:var=res,pointer=true
#[derive(Debug, Clone, Default, PartialEq, Describe)]
pub struct Resource {
    pub complex_subtype: ComplexSubtype,
    pub enabled: bool,
    pub id: String,
    pub optional_ref: Option<OptionalRef>,
    pub selected_option: OptionType,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Describe)]
pub struct ComplexSubtype {
    pub name: String,
    pub subtype: Subtype,
}

#[derive(Debug, Clone, Default, PartialEq, Describe)]
pub struct OptionalRef {
    pub r#ref: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Describe)]
pub struct Subtype(pub String);

#[derive(Debug, Clone, Default, PartialEq, Eq, Describe)]
pub struct OptionType(pub String);

include!("generated.rs");
