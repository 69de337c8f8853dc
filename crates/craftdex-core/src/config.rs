//! Catalog configuration.
//!
//! Every field has a default so partial configuration files deserialize.
//! File loading lives in `craftdex-data`.

use serde::{Deserialize, Serialize};

const OFFICIAL_WIKI: &str = "https://wiki.hypixel.net";
const COMMUNITY_WIKI: &str = "https://hypixel-skyblock.fandom.com";

/// Top-level configuration for a catalog and its importer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub wiki: WikiConfig,
}

/// Import pass tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Individual record failures logged per pass before switching to a
    /// count-only summary.
    #[serde(default = "default_max_logged_failures")]
    pub max_logged_failures: usize,
}

fn default_max_logged_failures() -> usize {
    50
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_logged_failures: default_max_logged_failures(),
        }
    }
}

/// Which wiki item links should resolve to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WikiSource {
    #[default]
    Official,
    Community,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiConfig {
    #[serde(default)]
    pub source: WikiSource,
    #[serde(default = "default_official_domain")]
    pub official_domain: String,
    #[serde(default = "default_community_domain")]
    pub community_domain: String,
}

fn default_official_domain() -> String {
    OFFICIAL_WIKI.to_string()
}

fn default_community_domain() -> String {
    COMMUNITY_WIKI.to_string()
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            source: WikiSource::default(),
            official_domain: default_official_domain(),
            community_domain: default_community_domain(),
        }
    }
}

impl WikiConfig {
    /// URL prefix of the selected wiki.
    pub fn domain(&self) -> &str {
        match self.source {
            WikiSource::Official => &self.official_domain,
            WikiSource::Community => &self.community_domain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: CatalogConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CatalogConfig::default());
        assert_eq!(config.import.max_logged_failures, 50);
        assert_eq!(config.wiki.domain(), OFFICIAL_WIKI);
    }

    #[test]
    fn partial_wiki_section_keeps_other_defaults() {
        let config: CatalogConfig =
            serde_json::from_str(r#"{"wiki": {"source": "community"}}"#).unwrap();
        assert_eq!(config.wiki.source, WikiSource::Community);
        assert_eq!(config.wiki.domain(), COMMUNITY_WIKI);
        assert_eq!(config.wiki.official_domain, OFFICIAL_WIKI);
    }

    #[test]
    fn unknown_wiki_source_is_rejected() {
        let result: Result<CatalogConfig, _> =
            serde_json::from_str(r#"{"wiki": {"source": "mirror"}}"#);
        assert!(result.is_err());
    }
}
