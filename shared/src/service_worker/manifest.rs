use serde::{Deserialize, Serialize};
use url::Url;

use super::CacheError;
use crate::config::default_app_host;

pub const CACHE_PREFIX: &str = "noemafeed";
pub const DEFAULT_CACHE_VERSION: &str = "v1";
pub const DEFAULT_SHELL_DOCUMENT: &str = "./index.html";

const DEFAULT_ASSETS: [&str; 8] = [
    "./",
    "./index.html",
    "./styles.css",
    "./app.js",
    "./pkg/noemafeed_mobile.js",
    "./pkg/noemafeed_mobile_bg.wasm",
    "./icons/icon-192.png",
    "./icons/icon-512.png",
];

/// Cache manifest and scope. Asset paths are resolved against `scope`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheConfig {
    pub scope: Url,
    pub version: String,
    pub shell_document: String,
    pub assets: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            scope: default_app_host(),
            version: DEFAULT_CACHE_VERSION.into(),
            shell_document: DEFAULT_SHELL_DOCUMENT.into(),
            assets: DEFAULT_ASSETS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl CacheConfig {
    pub fn new(scope: &str) -> Result<Self, CacheError> {
        let scope = Url::parse(scope).map_err(|e| CacheError::InvalidConfig(e.to_string()))?;
        let config = Self {
            scope,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    #[must_use]
    pub fn with_assets(mut self, assets: Vec<String>) -> Self {
        self.assets = assets;
        self
    }

    /// Versioned cache name, e.g. `noemafeed-v1`.
    #[must_use]
    pub fn cache_name(&self) -> String {
        format!("{CACHE_PREFIX}-{}", self.version)
    }

    pub fn validate(&self) -> Result<(), CacheError> {
        if self.version.trim().is_empty() {
            return Err(CacheError::InvalidConfig("version cannot be empty".into()));
        }
        if !matches!(self.scope.scheme(), "http" | "https") {
            return Err(CacheError::InvalidConfig(format!(
                "scope must be http(s), got {}",
                self.scope.scheme()
            )));
        }
        if self.assets.is_empty() {
            return Err(CacheError::InvalidConfig("asset list cannot be empty".into()));
        }
        if !self.assets.contains(&self.shell_document) {
            return Err(CacheError::InvalidConfig(format!(
                "shell document {} is not in the asset list",
                self.shell_document
            )));
        }
        for asset in &self.assets {
            let url = self.resolve(asset)?;
            if url.origin() != self.scope.origin() {
                return Err(CacheError::InvalidConfig(format!(
                    "asset {asset} is outside the worker origin"
                )));
            }
        }
        Ok(())
    }

    pub fn resolve(&self, path: &str) -> Result<Url, CacheError> {
        self.scope
            .join(path)
            .map_err(|e| CacheError::InvalidConfig(format!("{path}: {e}")))
    }

    pub fn asset_urls(&self) -> Result<Vec<Url>, CacheError> {
        self.assets.iter().map(|a| self.resolve(a)).collect()
    }

    pub fn shell_url(&self) -> Result<Url, CacheError> {
        self.resolve(&self.shell_document)
    }

    #[must_use]
    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.scope.origin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn default_manifest() {
        let config = CacheConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache_name(), "noemafeed-v1");
        assert_eq!(config.assets.len(), 8);
        assert_eq!(
            config.shell_url().unwrap().as_str(),
            "https://max456im.github.io/noemafeed-mobile/index.html"
        );
    }

    #[test]
    fn assets_resolve_under_scope() {
        let urls = CacheConfig::default().asset_urls().unwrap();
        assert_eq!(urls[0].as_str(), "https://max456im.github.io/noemafeed-mobile/");
        assert!(urls
            .iter()
            .all(|u| u.path().starts_with("/noemafeed-mobile/")));
    }

    #[test]
    fn validation_errors() {
        assert_matches!(
            CacheConfig::default().with_version(" ").validate(),
            Err(CacheError::InvalidConfig(_))
        );
        assert_matches!(
            CacheConfig::default().with_assets(vec![]).validate(),
            Err(CacheError::InvalidConfig(_))
        );
        assert_matches!(
            CacheConfig::default()
                .with_assets(vec!["./index.html".into(), "https://cdn.example.com/x.js".into()])
                .validate(),
            Err(CacheError::InvalidConfig(_))
        );
        assert_matches!(
            CacheConfig::new("ftp://example.org/"),
            Err(CacheError::InvalidConfig(_))
        );
    }

    #[test]
    fn same_origin_check() {
        let config = CacheConfig::default();
        assert!(config.is_same_origin(&Url::parse("https://max456im.github.io/other").unwrap()));
        assert!(!config.is_same_origin(&Url::parse("https://example.org/").unwrap()));
        assert!(!config.is_same_origin(&Url::parse("http://max456im.github.io/").unwrap()));
    }
}
