//! Version-qualified cache naming
//!
//! Decides which persisted caches belong to this application and which of
//! those belong to the current deployment.

use crate::config::schema::CacheConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical cache a response is stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheKind {
    /// Build-time assets and cache-first resources
    Static,
    /// Runtime responses from network-first requests
    Dynamic,
}

impl CacheKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Dynamic => "dynamic",
        }
    }
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names of the caches owned by one deployment version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheNames {
    namespace: String,
    version: String,
}

impl CacheNames {
    pub fn new(namespace: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            version: version.into(),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.namespace.clone(), config.version.clone())
    }

    fn qualify(&self, rest: &str) -> String {
        if self.namespace.is_empty() {
            rest.to_string()
        } else {
            format!("{}-{}", self.namespace, rest)
        }
    }

    /// Cache name for a kind (e.g. `hmp-static-v1`)
    pub fn name_for(&self, kind: CacheKind) -> String {
        self.qualify(&format!("{}-{}", kind, self.version))
    }

    pub fn static_name(&self) -> String {
        self.name_for(CacheKind::Static)
    }

    pub fn dynamic_name(&self) -> String {
        self.name_for(CacheKind::Dynamic)
    }

    /// Version string reported to the application (e.g. `hmp-v1`)
    pub fn version_tag(&self) -> String {
        self.qualify(&self.version)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Whether a cache name is owned by this application
    pub fn in_namespace(&self, name: &str) -> bool {
        self.namespace.is_empty()
            || name
                .strip_prefix(self.namespace.as_str())
                .is_some_and(|rest| rest.starts_with('-'))
    }

    /// Whether a cache name belongs to the current version
    pub fn is_current(&self, name: &str) -> bool {
        name == self.static_name() || name == self.dynamic_name()
    }

    /// Caches to purge on activation: in the namespace but not current
    pub fn stale<'a>(&self, names: &'a [String]) -> Vec<&'a String> {
        names
            .iter()
            .filter(|name| self.in_namespace(name) && !self.is_current(name))
            .collect()
    }

    /// Kind and version encoded in a namespaced cache name, if recognizable
    pub fn parse(&self, name: &str) -> Option<(CacheKind, String)> {
        let rest = if self.namespace.is_empty() {
            name
        } else {
            name.strip_prefix(self.namespace.as_str())?.strip_prefix('-')?
        };
        let (kind, version) = rest.split_once('-')?;
        let kind = match kind {
            "static" => CacheKind::Static,
            "dynamic" => CacheKind::Dynamic,
            _ => return None,
        };
        Some((kind, version.to_string()))
    }
}
