//! Resource types, composite identifiers and brief resources.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HarvestError;

/// Separator between the type name and the remote id in a [`ResourceId`].
pub const ID_SEPARATOR: char = '-';

/// Maximum number of characters kept in a brief resource title.
pub const MAX_TITLE_LEN: usize = 255;

/// A remote PDN collection.
///
/// Variant order is the canonical concatenation order of the virtual
/// catalog and matches the alphabetical order of the endpoint names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceType {
    #[serde(rename = "alert")]
    Alert,
    #[serde(rename = "document")]
    Document,
    #[serde(rename = "experts")]
    Expert,
    #[serde(rename = "news")]
    NewsArticle,
    #[serde(rename = "project")]
    Project,
}

impl ResourceType {
    /// All collections in canonical order.
    pub const ALL: [ResourceType; 5] = [
        ResourceType::Alert,
        ResourceType::Document,
        ResourceType::Expert,
        ResourceType::NewsArticle,
        ResourceType::Project,
    ];

    /// Endpoint name on the remote API, also used as the type part of
    /// composite ids.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Alert => "alert",
            ResourceType::Document => "document",
            ResourceType::Expert => "experts",
            ResourceType::NewsArticle => "news",
            ResourceType::Project => "project",
        }
    }

    /// Name of the field holding the remote identity.
    pub fn id_field(&self) -> &'static str {
        "id"
    }

    /// Position in [`ResourceType::ALL`].
    pub fn index(&self) -> usize {
        match self {
            ResourceType::Alert => 0,
            ResourceType::Document => 1,
            ResourceType::Expert => 2,
            ResourceType::NewsArticle => 3,
            ResourceType::Project => 4,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = HarvestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alert" => Ok(ResourceType::Alert),
            "document" => Ok(ResourceType::Document),
            "experts" => Ok(ResourceType::Expert),
            "news" => Ok(ResourceType::NewsArticle),
            "project" => Ok(ResourceType::Project),
            other => Err(HarvestError::UnknownResourceType(other.to_string())),
        }
    }
}

/// Identity of a resource across the whole virtual catalog:
/// `"{type}-{remote_id}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    resource_type: ResourceType,
    remote_id: String,
}

impl ResourceId {
    pub fn new(resource_type: ResourceType, remote_id: impl Into<String>) -> Self {
        Self {
            resource_type,
            remote_id: remote_id.into(),
        }
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn remote_id(&self) -> &str {
        &self.remote_id
    }

    /// The remote id as the numeric key used by the local stores.
    pub fn numeric_remote_id(&self) -> Result<i64, HarvestError> {
        self.remote_id
            .parse::<i64>()
            .map_err(|_| HarvestError::InvalidResourceId(self.to_string()))
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.resource_type, ID_SEPARATOR, self.remote_id)
    }
}

impl FromStr for ResourceId {
    type Err = HarvestError;

    /// Splits at the first separator rather than the last. Type names never
    /// contain it, so remote ids that do are kept whole; numeric ids parse
    /// the same either way.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (type_part, remote_id) = s
            .split_once(ID_SEPARATOR)
            .ok_or_else(|| HarvestError::InvalidResourceId(s.to_string()))?;
        if remote_id.is_empty() {
            return Err(HarvestError::InvalidResourceId(s.to_string()));
        }
        Ok(Self::new(type_part.parse()?, remote_id))
    }
}

impl Serialize for ResourceId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Cut a title down to [`MAX_TITLE_LEN`] characters.
pub fn truncate_title(title: &str) -> String {
    match title.char_indices().nth(MAX_TITLE_LEN) {
        Some((byte_idx, _)) => title[..byte_idx].to_string(),
        None => title.to_string(),
    }
}

/// Enumeration summary of one remote resource. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BriefResource {
    pub id: ResourceId,
    pub title: String,
    pub resource_type: ResourceType,
}

impl BriefResource {
    /// Build a brief resource; the title is truncated on the way in.
    pub fn new(id: ResourceId, title: &str) -> Self {
        let resource_type = id.resource_type();
        Self {
            id,
            title: truncate_title(title),
            resource_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn canonical_order_is_alphabetical_by_endpoint() {
        let names: Vec<&str> = ResourceType::ALL.iter().map(|t| t.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        for (i, t) in ResourceType::ALL.iter().enumerate() {
            assert_eq!(t.index(), i);
        }
    }

    #[test]
    fn type_names_never_contain_separator() {
        for t in ResourceType::ALL {
            assert!(!t.as_str().contains(ID_SEPARATOR));
        }
    }

    #[test]
    fn resource_type_round_trips_through_str() {
        for t in ResourceType::ALL {
            assert_eq!(t.as_str().parse::<ResourceType>().unwrap(), t);
        }
        assert!(matches!(
            "podcast".parse::<ResourceType>(),
            Err(HarvestError::UnknownResourceType(_))
        ));
    }

    #[test]
    fn resource_id_formats_and_parses() {
        let id = ResourceId::new(ResourceType::Expert, "12");
        assert_eq!(id.to_string(), "experts-12");

        let parsed: ResourceId = "experts-12".parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(parsed.numeric_remote_id().unwrap(), 12);
    }

    #[test]
    fn resource_id_keeps_separator_inside_remote_id() {
        let parsed: ResourceId = "news-2024-17".parse().unwrap();
        assert_eq!(parsed.resource_type(), ResourceType::NewsArticle);
        assert_eq!(parsed.remote_id(), "2024-17");
        assert!(parsed.numeric_remote_id().is_err());
    }

    #[test]
    fn resource_id_rejects_malformed_input() {
        assert!("project".parse::<ResourceId>().is_err());
        assert!("project-".parse::<ResourceId>().is_err());
        assert!("podcast-3".parse::<ResourceId>().is_err());
    }

    #[test]
    fn resource_id_serializes_as_string() {
        let id = ResourceId::new(ResourceType::Project, "99");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"project-99\"");
        let back: ResourceId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn titles_are_truncated_to_max_len() {
        let long = "x".repeat(300);
        assert_eq!(truncate_title(&long).chars().count(), MAX_TITLE_LEN);
        assert_eq!(truncate_title("short"), "short");

        let multibyte = "é".repeat(256);
        assert_eq!(truncate_title(&multibyte).chars().count(), MAX_TITLE_LEN);
    }

    #[test]
    fn brief_resource_takes_type_from_id() {
        let brief = BriefResource::new(ResourceId::new(ResourceType::Alert, "1"), "Flood");
        assert_eq!(brief.resource_type, ResourceType::Alert);
        assert_eq!(brief.title, "Flood");
    }

    proptest! {
        #[test]
        fn numeric_ids_round_trip(
            index in 0usize..ResourceType::ALL.len(),
            remote_id in any::<u32>(),
        ) {
            let resource_type = ResourceType::ALL[index];
            let id = ResourceId::new(resource_type, remote_id.to_string());
            let text = id.to_string();
            prop_assert_eq!(text.clone(), format!("{}-{}", resource_type.as_str(), remote_id));

            let parsed: ResourceId = text.parse().unwrap();
            prop_assert_eq!(parsed.resource_type(), resource_type);
            prop_assert_eq!(parsed.numeric_remote_id().unwrap(), i64::from(remote_id));
            prop_assert_eq!(parsed, id);
        }
    }
}
