//! TOML-based harvester configuration.
//!
//! Stores:
//! - The remote PDN deployment and HTTP timeout
//! - Page size of the virtual catalog
//! - Per-collection harvest switches
//! - Per-collection filters
//!
//! Configuration is stored at `~/.config/pdn-harvester/config.toml` unless
//! an explicit path is given.

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::filters::FilterConfig;
use crate::resource::HarvestToggles;

/// Harvester configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvesterConfig {
    /// Base URL of the PDN deployment, without the `/api` suffix.
    #[serde(default)]
    pub remote_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_true")]
    pub harvest_alerts: bool,
    #[serde(default = "default_true")]
    pub harvest_documents: bool,
    #[serde(default = "default_true")]
    pub harvest_experts: bool,
    #[serde(default = "default_true")]
    pub harvest_news: bool,
    #[serde(default = "default_true")]
    pub harvest_projects: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_publication_day_filter: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_publication_month_filter: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_publication_year_filter: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alerts_start_date_filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alerts_end_date_filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub news_start_date_filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub news_end_date_filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_active_filter: Option<bool>,
}

fn default_page_size() -> i64 {
    10
}
fn default_timeout_secs() -> u64 {
    5
}
fn default_true() -> bool {
    true
}

impl Default for HarvesterConfig {
    fn default() -> Self {
        Self {
            remote_url: String::new(),
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
            harvest_alerts: true,
            harvest_documents: true,
            harvest_experts: true,
            harvest_news: true,
            harvest_projects: true,
            document_publication_day_filter: None,
            document_publication_month_filter: None,
            document_publication_year_filter: None,
            alerts_start_date_filter: None,
            alerts_end_date_filter: None,
            news_start_date_filter: None,
            news_end_date_filter: None,
            project_active_filter: None,
        }
    }
}

fn check_range(key: &str, value: Option<u32>, min: u32, max: u32) -> Result<(), ConfigError> {
    match value {
        Some(v) if v < min || v > max => Err(ConfigError::invalid(
            key,
            format!("{v} is outside {min}..={max}"),
        )),
        _ => Ok(()),
    }
}

impl HarvesterConfig {
    /// Default location of the configuration file.
    pub fn default_path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: HarvesterConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, cannot be parsed, or
    /// holds invalid values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `path`, writing the defaults there when the file is missing.
    pub fn load_or_init(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();
            config.save(path)?;
            Ok(config)
        }
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Check value ranges and that every date filter parses.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size <= 0 {
            return Err(ConfigError::invalid(
                "page_size",
                format!("must be positive, got {}", self.page_size),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::invalid("timeout_secs", "must be positive"));
        }
        check_range(
            "document_publication_day_filter",
            self.document_publication_day_filter,
            1,
            31,
        )?;
        check_range(
            "document_publication_month_filter",
            self.document_publication_month_filter,
            1,
            12,
        )?;
        check_range(
            "document_publication_year_filter",
            self.document_publication_year_filter,
            1900,
            9999,
        )?;
        FilterConfig::from_config(self)?;
        Ok(())
    }

    /// Page size as a non-zero count.
    pub fn page_size(&self) -> Result<NonZeroUsize, ConfigError> {
        usize::try_from(self.page_size)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or_else(|| {
                ConfigError::invalid("page_size", format!("must be positive, got {}", self.page_size))
            })
    }

    /// Remote URL without a trailing slash.
    pub fn remote_url(&self) -> &str {
        self.remote_url.trim_end_matches('/')
    }

    /// Base URL of the PostgREST API.
    pub fn api_base_url(&self) -> String {
        format!("{}/api", self.remote_url())
    }

    pub fn toggles(&self) -> HarvestToggles {
        HarvestToggles {
            alerts: self.harvest_alerts,
            documents: self.harvest_documents,
            experts: self.harvest_experts,
            news: self.harvest_news,
            projects: self.harvest_projects,
        }
    }

    /// Typed filter options, with date strings parsed.
    pub fn filters(&self) -> Result<FilterConfig, ConfigError> {
        FilterConfig::from_config(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = HarvesterConfig::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed = HarvesterConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn empty_document_takes_defaults() {
        let cfg = HarvesterConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.page_size, 10);
        assert_eq!(cfg.timeout_secs, 5);
        assert_eq!(cfg.remote_url, "");
        assert_eq!(cfg.toggles(), HarvestToggles::default());
        assert_eq!(cfg.filters().unwrap(), FilterConfig::default());
    }

    #[test]
    fn api_base_url_strips_trailing_slash() {
        let cfg = HarvesterConfig {
            remote_url: "https://pdn.example/".into(),
            ..Default::default()
        };
        assert_eq!(cfg.api_base_url(), "https://pdn.example/api");
    }

    #[test]
    fn non_positive_page_size_is_rejected() {
        for page_size in [0, -3] {
            let cfg = HarvesterConfig {
                page_size,
                ..Default::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(ConfigError::InvalidValue { ref key, .. }) if key == "page_size"
            ));
            assert!(cfg.page_size().is_err());
        }
    }

    #[test]
    fn out_of_range_publication_filters_are_rejected() {
        let err = HarvesterConfig::from_toml_str("document_publication_month_filter = 13").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, .. } if key == "document_publication_month_filter"
        ));
        assert!(HarvesterConfig::from_toml_str("document_publication_year_filter = 1899").is_err());
        assert!(HarvesterConfig::from_toml_str("document_publication_day_filter = 31").is_ok());
    }

    #[test]
    fn unparseable_date_filter_is_rejected() {
        let err = HarvesterConfig::from_toml_str("news_start_date_filter = \"tomorrow\"").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, .. } if key == "news_start_date_filter"
        ));
    }

    #[test]
    fn toggles_follow_harvest_switches() {
        let cfg = HarvesterConfig::from_toml_str("harvest_news = false\nharvest_experts = false").unwrap();
        let toggles = cfg.toggles();
        assert!(toggles.alerts);
        assert!(!toggles.news);
        assert!(!toggles.experts);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            HarvesterConfig::from_toml_str("page_size = \"ten\""),
            Err(ConfigError::ParseFailed(_))
        ));
    }
}
