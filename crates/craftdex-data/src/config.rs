//! Configuration file loading.

use craftdex_core::config::CatalogConfig;
use std::path::Path;

use crate::loader::{DataLoadError, locate, read_file};

/// Base name of the configuration file inside a repository directory.
pub const CONFIG_BASE_NAME: &str = "craftdex";

/// Load a [`CatalogConfig`] from an explicit file. Format follows the extension.
pub fn load_config(path: &Path) -> Result<CatalogConfig, DataLoadError> {
    let config: CatalogConfig = read_file(path)?;
    tracing::debug!(
        file = %path.display(),
        wiki = config.wiki.domain(),
        max_logged_failures = config.import.max_logged_failures,
        "configuration loaded"
    );
    Ok(config)
}

/// Look for `craftdex.{ron,toml,json}` in `dir`. A missing file yields the
/// default configuration; a present but unreadable one is an error.
pub fn find_config(dir: &Path) -> Result<CatalogConfig, DataLoadError> {
    match locate(dir, CONFIG_BASE_NAME)? {
        Some(path) => load_config(&path),
        None => Ok(CatalogConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use craftdex_core::config::WikiSource;
    use std::fs;

    #[test]
    fn missing_config_is_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_config(dir.path()).unwrap(), CatalogConfig::default());
    }

    #[test]
    fn toml_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("craftdex.toml"),
            r#"
[import]
max_logged_failures = 5

[wiki]
source = "community"
"#,
        )
        .unwrap();

        let config = find_config(dir.path()).unwrap();
        assert_eq!(config.import.max_logged_failures, 5);
        assert_eq!(config.wiki.source, WikiSource::Community);
        assert_eq!(config.wiki.domain(), "https://hypixel-skyblock.fandom.com");
    }

    #[test]
    fn ron_config_with_custom_domain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.ron");
        fs::write(
            &path,
            r#"(wiki: (official_domain: "https://wiki.example.org"))"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.wiki.domain(), "https://wiki.example.org");
        assert_eq!(config.import.max_logged_failures, 50);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("craftdex.json"), r#"{"wiki": {"source": 3}}"#).unwrap();
        assert!(matches!(
            find_config(dir.path()),
            Err(DataLoadError::Parse { .. })
        ));
    }
}
