//! Resource Registry - Load resource type descriptors from JSON
//!
//! The set of resource types the inventory knows how to list is defined in
//! an embedded JSON catalog. The registry is built once at startup and
//! passed by reference to whoever needs it.

use crate::config::Config;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Embedded resource catalog (compiled into the binary)
const CATALOG: &str = include_str!("../resources/catalog.json");

/// How to list one category of cloud resource
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceType {
    /// Registry key (injected from the map key)
    #[serde(skip)]
    pub key: String,
    pub display_name: String,
    /// API service that must be enabled for this type to be listed
    pub api: String,
    /// gcloud command group, e.g. `["compute", "instances"]`
    pub group: Vec<String>,
    /// Listing must be qualified with `--location`, once per location
    #[serde(default)]
    pub requires_location: bool,
}

/// Root structure of resources/catalog.json
#[derive(Debug, Deserialize)]
struct Catalog {
    #[serde(default)]
    resources: BTreeMap<String, ResourceType>,
}

/// Known resource types, keyed by name
#[derive(Debug, Clone)]
pub struct Registry {
    types: BTreeMap<String, ResourceType>,
}

impl Registry {
    /// Registry from the embedded catalog
    pub fn builtin() -> Result<Self, serde_json::Error> {
        Self::from_json(CATALOG)
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let catalog: Catalog = serde_json::from_str(content)?;

        let types = catalog
            .resources
            .into_iter()
            .map(|(key, mut def)| {
                def.key = key.clone();
                (key, def)
            })
            .collect();

        Ok(Self { types })
    }

    /// Get a resource type by key
    pub fn get(&self, key: &str) -> Option<&ResourceType> {
        self.types.get(key)
    }

    /// All resource keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        self.types.keys().map(String::as_str).collect()
    }

    /// Resource types whose API is enabled and which are not switched off
    /// in the configuration. Unknown APIs are ignored.
    pub fn supported<'a>(&'a self, enabled_apis: &[String], config: &Config) -> Vec<&'a ResourceType> {
        self.types
            .values()
            .filter(|t| enabled_apis.iter().any(|api| api == &t.api))
            .filter(|t| {
                let enabled = config.is_enabled(&t.key);
                if !enabled {
                    tracing::debug!("Resource type '{}' disabled in config", t.key);
                }
                enabled
            })
            .collect()
    }
}
