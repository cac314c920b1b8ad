//! Per-collection filter predicates in PostgREST operator syntax.
//!
//! A [`FilterSpec`] is a map of query parameter name to operator
//! expression (`eq.`, `gte.`, `lte.`, `is.`). It is built once from typed
//! configuration and handed to the remote client untouched.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::dates;
use crate::error::ConfigError;
use crate::resource::ResourceType;
use crate::storage::HarvesterConfig;

/// Received-date field of the alert collection. The misspelling is the
/// upstream column name.
pub const ALERT_DATE_FIELD: &str = "daterecieved";

/// Publication date field of the news collection.
pub const NEWS_DATE_FIELD: &str = "date";

/// Backend-specific predicate: query parameter name to operator expression.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSpec(BTreeMap<String, String>);

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, expression: impl Into<String>) {
        self.0.insert(field.into(), expression.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FilterSpec {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Optional date bounds, both inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Parse optional textual bounds. `key_prefix` names the configuration
    /// keys in errors (`{prefix}_start_date_filter`).
    pub fn parse(
        key_prefix: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let parse_bound = |suffix: &str, text: Option<&str>| match text {
            None => Ok(None),
            Some(text) => dates::parse_flexible(text).map(Some).ok_or_else(|| {
                ConfigError::invalid(
                    &format!("{key_prefix}_{suffix}_date_filter"),
                    format!("cannot parse '{text}' as a date-time"),
                )
            }),
        };
        Ok(Self {
            start: parse_bound("start", start)?,
            end: parse_bound("end", end)?,
        })
    }

    fn to_filter(self, field: &str) -> FilterSpec {
        let start = self.start.as_ref().map(dates::to_filter_text);
        let end = self.end.as_ref().map(dates::to_filter_text);
        let mut spec = FilterSpec::new();
        match (start, end) {
            (Some(start), Some(end)) => {
                spec.insert("and", format!("({field}.gte.{start},{field}.lte.{end})"));
            }
            (Some(start), None) => spec.insert(field, format!("gte.{start}")),
            (None, Some(end)) => spec.insert(field, format!("lte.{end}")),
            (None, None) => {}
        }
        spec
    }
}

/// Typed filter configuration for every collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConfig {
    pub document_publication_day: Option<u32>,
    pub document_publication_month: Option<u32>,
    pub document_publication_year: Option<u32>,
    pub alerts: DateRange,
    pub news: DateRange,
    pub project_active: Option<bool>,
}

impl FilterConfig {
    /// Extract and parse the filter options of a harvester configuration.
    pub fn from_config(config: &HarvesterConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            document_publication_day: config.document_publication_day_filter,
            document_publication_month: config.document_publication_month_filter,
            document_publication_year: config.document_publication_year_filter,
            alerts: DateRange::parse(
                "alerts",
                config.alerts_start_date_filter.as_deref(),
                config.alerts_end_date_filter.as_deref(),
            )?,
            news: DateRange::parse(
                "news",
                config.news_start_date_filter.as_deref(),
                config.news_end_date_filter.as_deref(),
            )?,
            project_active: config.project_active_filter,
        })
    }

    /// Build the predicate for one collection.
    pub fn build(&self, resource_type: ResourceType) -> FilterSpec {
        match resource_type {
            ResourceType::Alert => self.alerts.to_filter(ALERT_DATE_FIELD),
            ResourceType::Document => self.document_filter(),
            ResourceType::Expert => FilterSpec::new(),
            ResourceType::NewsArticle => self.news.to_filter(NEWS_DATE_FIELD),
            ResourceType::Project => self.project_filter(),
        }
    }

    fn document_filter(&self) -> FilterSpec {
        [
            ("publicationday", self.document_publication_day),
            ("publicationmonth", self.document_publication_month),
            ("publicationyear", self.document_publication_year),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, format!("eq.{v}"))))
        .collect()
    }

    fn project_filter(&self) -> FilterSpec {
        let mut spec = FilterSpec::new();
        if let Some(active) = self.project_active {
            spec.insert("active", format!("is.{active}"));
        }
        spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(prefix: &str, start: Option<&str>, end: Option<&str>) -> DateRange {
        DateRange::parse(prefix, start, end).unwrap()
    }

    #[test]
    fn news_start_only_is_single_gte() {
        let config = FilterConfig {
            news: range("news", Some("2024-01-01T00:00:00+00:00"), None),
            ..Default::default()
        };
        let spec = config.build(ResourceType::NewsArticle);
        assert_eq!(spec.len(), 1);
        assert_eq!(spec.get("date"), Some("gte.2024-01-01T00:00:00Z"));
    }

    #[test]
    fn news_end_only_is_single_lte() {
        let config = FilterConfig {
            news: range("news", None, Some("2024-02-01T12:00:00+02:00")),
            ..Default::default()
        };
        let spec = config.build(ResourceType::NewsArticle);
        assert_eq!(spec.get("date"), Some("lte.2024-02-01T10:00:00Z"));
    }

    #[test]
    fn alert_range_keeps_upstream_spelling() {
        let config = FilterConfig {
            alerts: range("alerts", Some("2024-01-01"), Some("2024-01-31T23:59:59Z")),
            ..Default::default()
        };
        let spec = config.build(ResourceType::Alert);
        assert_eq!(spec.len(), 1);
        assert_eq!(
            spec.get("and"),
            Some("(daterecieved.gte.2024-01-01T00:00:00Z,daterecieved.lte.2024-01-31T23:59:59Z)")
        );
    }

    #[test]
    fn document_filters_are_exact_matches() {
        let config = FilterConfig {
            document_publication_month: Some(3),
            document_publication_year: Some(2021),
            ..Default::default()
        };
        let spec = config.build(ResourceType::Document);
        assert_eq!(spec.get("publicationday"), None);
        assert_eq!(spec.get("publicationmonth"), Some("eq.3"));
        assert_eq!(spec.get("publicationyear"), Some("eq.2021"));
    }

    #[test]
    fn project_active_is_lowercase_is_operator() {
        let config = FilterConfig {
            project_active: Some(false),
            ..Default::default()
        };
        assert_eq!(config.build(ResourceType::Project).get("active"), Some("is.false"));
    }

    #[test]
    fn experts_and_empty_config_have_no_filters() {
        let config = FilterConfig {
            project_active: Some(true),
            ..Default::default()
        };
        assert!(config.build(ResourceType::Expert).is_empty());
        for t in ResourceType::ALL {
            assert!(FilterConfig::default().build(t).is_empty());
        }
    }

    #[test]
    fn unparseable_bound_names_the_key() {
        let err = DateRange::parse("alerts", None, Some("someday")).unwrap_err();
        match err {
            ConfigError::InvalidValue { key, .. } => assert_eq!(key, "alerts_end_date_filter"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
