//! atlas-sdk - Sample external library
//!
//! Stands in for a remote system's client library: its resource model marks
//! most fields optional, and [`Api`] is the trait a generated wrapper
//! forwards to. [`MemoryApi`] keeps resources in memory for tests.

use schemabridge_core::{Describe, describe_api};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// A resource as the Atlas API sees it.
#[derive(Debug, Clone, Default, PartialEq, Describe)]
pub struct Resource {
    pub complex_subtype: ComplexSubtype,
    pub enabled: Option<bool>,
    pub id: String,
    pub optional_ref: Option<OptionalRef>,
    pub selected_option: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Describe)]
pub struct ComplexSubtype {
    pub name: String,
    pub subtype: String,
}

#[derive(Debug, Clone, Default, PartialEq, Describe)]
pub struct OptionalRef {
    pub r#ref: String,
}

/// Per-request metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    pub request_id: String,
}

impl Context {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("resource {0} already exists")]
    AlreadyExists(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("service unavailable")]
    Unavailable,
}

/// The Atlas resource API.
#[describe_api]
#[allow(async_fn_in_trait)]
pub trait Api {
    /// Fetch a resource, `None` when it does not exist.
    async fn get(&self, ctx: &Context, id: &str) -> Result<Option<Resource>, Error>;

    /// Store a new resource and return it as stored.
    async fn create(&self, ctx: &Context, res: Option<Resource>) -> Result<Option<Resource>, Error>;
}

/// In-memory [`Api`] implementation.
#[derive(Debug, Default)]
pub struct MemoryApi {
    resources: Mutex<BTreeMap<String, Resource>>,
}

impl MemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored resources. A poisoned store still reports what it
    /// holds; the [`Api`] methods report it as [`Error::Unavailable`].
    pub fn len(&self) -> usize {
        match self.resources.lock() {
            Ok(resources) => resources.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Api for MemoryApi {
    async fn get(&self, _ctx: &Context, id: &str) -> Result<Option<Resource>, Error> {
        let resources = self.resources.lock().map_err(|_| Error::Unavailable)?;
        Ok(resources.get(id).cloned())
    }

    async fn create(&self, _ctx: &Context, res: Option<Resource>) -> Result<Option<Resource>, Error> {
        let res = res.ok_or_else(|| Error::InvalidArgument("resource is required".to_string()))?;
        if res.id.is_empty() {
            return Err(Error::InvalidArgument("id is required".to_string()));
        }

        let mut resources = self.resources.lock().map_err(|_| Error::Unavailable)?;
        if resources.contains_key(&res.id) {
            return Err(Error::AlreadyExists(res.id));
        }
        let mut stored = res;
        stored.status.get_or_insert_with(|| "READY".to_string());
        resources.insert(stored.id.clone(), stored.clone());
        Ok(Some(stored))
    }
}
