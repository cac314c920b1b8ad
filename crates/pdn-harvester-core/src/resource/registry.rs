//! Per-collection settings and dispatch.

use serde::{Deserialize, Serialize};

use crate::filters::{FilterConfig, FilterSpec};
use crate::raw::RawRecord;

use super::titles::build_title;
use super::types::ResourceType;

/// Which collections take part in harvesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestToggles {
    pub alerts: bool,
    pub documents: bool,
    pub experts: bool,
    pub news: bool,
    pub projects: bool,
}

impl Default for HarvestToggles {
    fn default() -> Self {
        Self {
            alerts: true,
            documents: true,
            experts: true,
            news: true,
            projects: true,
        }
    }
}

impl HarvestToggles {
    pub fn is_enabled(&self, resource_type: ResourceType) -> bool {
        match resource_type {
            ResourceType::Alert => self.alerts,
            ResourceType::Document => self.documents,
            ResourceType::Expert => self.experts,
            ResourceType::NewsArticle => self.news,
            ResourceType::Project => self.projects,
        }
    }
}

/// The fixed table of collections: harvest flags, endpoints, filters and
/// titles. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct ResourceTypeRegistry {
    toggles: HarvestToggles,
    filters: [FilterSpec; 5],
}

impl ResourceTypeRegistry {
    /// Build the registry. Filters are computed once here.
    pub fn new(toggles: HarvestToggles, filter_config: &FilterConfig) -> Self {
        Self {
            toggles,
            filters: ResourceType::ALL.map(|t| filter_config.build(t)),
        }
    }

    pub fn is_enabled(&self, resource_type: ResourceType) -> bool {
        self.toggles.is_enabled(resource_type)
    }

    /// Enabled collections in canonical order.
    pub fn enabled_types(&self) -> impl Iterator<Item = ResourceType> + '_ {
        ResourceType::ALL
            .into_iter()
            .filter(move |t| self.is_enabled(*t))
    }

    pub fn endpoint(&self, resource_type: ResourceType) -> &'static str {
        resource_type.as_str()
    }

    pub fn filter(&self, resource_type: ResourceType) -> &FilterSpec {
        &self.filters[resource_type.index()]
    }

    pub fn title(&self, resource_type: ResourceType, record: &RawRecord) -> String {
        build_title(resource_type, record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn everything_is_enabled_by_default() {
        let registry = ResourceTypeRegistry::default();
        assert_eq!(registry.enabled_types().count(), 5);
    }

    #[test]
    fn disabled_types_are_skipped_in_order() {
        let toggles = HarvestToggles {
            documents: false,
            news: false,
            ..Default::default()
        };
        let registry = ResourceTypeRegistry::new(toggles, &FilterConfig::default());
        let enabled: Vec<_> = registry.enabled_types().collect();
        assert_eq!(
            enabled,
            vec![ResourceType::Alert, ResourceType::Expert, ResourceType::Project]
        );
    }

    #[test]
    fn filters_are_bound_per_type() {
        let filters = FilterConfig {
            project_active: Some(true),
            ..Default::default()
        };
        let registry = ResourceTypeRegistry::new(HarvestToggles::default(), &filters);
        assert_eq!(registry.filter(ResourceType::Project).get("active"), Some("is.true"));
        assert!(registry.filter(ResourceType::Alert).is_empty());
    }
}
