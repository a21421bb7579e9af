//! Build-time asset manifest

use crate::config::Config;
use crate::http::request::resolve_url;

/// One URL the static cache must hold after install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Absolute URL
    pub url: String,
    /// Local assets are required; a failure aborts install
    pub required: bool,
}

/// Fixed list of assets precached at install time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetManifest {
    entries: Vec<ManifestEntry>,
}

impl AssetManifest {
    /// Build from config, resolving local paths against the origin
    pub fn from_config(config: &Config) -> Self {
        let origin = &config.network.origin;
        let local = config.manifest.local.iter().map(|path| ManifestEntry {
            url: resolve_url(origin, path),
            required: true,
        });
        let external = config.manifest.external.iter().map(|url| ManifestEntry {
            url: url.clone(),
            required: false,
        });
        Self {
            entries: local.chain(external).collect(),
        }
    }

    pub fn new(entries: Vec<ManifestEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn required(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter().filter(|e| e.required)
    }

    pub fn optional(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter().filter(|e| !e.required)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_splits_local_and_external() {
        let mut config = Config::default();
        config.network.origin = "https://app.example".to_string();
        config.manifest.local = vec!["/".to_string(), "/js/app.js".to_string()];
        config.manifest.external = vec!["https://unpkg.com/react@18".to_string()];

        let manifest = AssetManifest::from_config(&config);
        assert_eq!(manifest.len(), 3);

        let required: Vec<&str> = manifest.required().map(|e| e.url.as_str()).collect();
        assert_eq!(
            required,
            vec!["https://app.example/", "https://app.example/js/app.js"]
        );

        let optional: Vec<&str> = manifest.optional().map(|e| e.url.as_str()).collect();
        assert_eq!(optional, vec!["https://unpkg.com/react@18"]);
    }
}
