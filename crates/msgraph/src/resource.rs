//! Resource descriptors and endpoint resolution
//!
//! Each resource module registers the descriptors it needs into a
//! [`ResourceRegistry`] (see [`crate::user::register`]). The registry is
//! built once, shared behind an `Arc`, and only read afterwards.

use std::collections::HashMap;
use std::fmt;

use url::Url;

use crate::GraphError;

/// Microsoft Graph API version a resource is served from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    V1,
    Beta,
}

impl ApiVersion {
    /// Returns the URL path segment for this version
    pub fn segment(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1.0",
            ApiVersion::Beta => "beta",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

/// A logical API resource: its name, version and collection path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Logical name the resource is registered under (e.g. `UserV1`)
    pub name: String,
    pub api_version: ApiVersion,
    /// Path segment of the resource collection (e.g. `users`)
    pub path: String,
}

impl Resource {
    pub fn new(name: impl Into<String>, api_version: ApiVersion, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            api_version,
            path: path.into(),
        }
    }

    /// Renders the absolute endpoint `{base}/{version}/{path}`
    ///
    /// # Errors
    /// Returns [`GraphError::Endpoint`] if the result is not a valid URL.
    pub fn endpoint(&self, base: &str) -> Result<Url, GraphError> {
        let raw = format!(
            "{}/{}/{}",
            base.trim_end_matches('/'),
            self.api_version.segment(),
            self.path
        );
        Url::parse(&raw).map_err(|source| GraphError::Endpoint { url: raw, source })
    }
}

/// Lookup table of resources by logical name
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    resources: HashMap<String, Resource>,
}

impl ResourceRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every resource this crate knows about
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        crate::user::register(&mut registry);
        registry
    }

    /// Adds a resource, replacing any previous entry with the same name
    pub fn register(&mut self, resource: Resource) -> &mut Self {
        self.resources.insert(resource.name.clone(), resource);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
