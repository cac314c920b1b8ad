//! Human-readable titles for brief resources.

use crate::raw::{self, RawRecord};

use super::types::{truncate_title, ResourceType};

/// Build the listing title of a raw record, truncated to the maximum
/// title length.
pub fn build_title(resource_type: ResourceType, record: &RawRecord) -> String {
    let title = match resource_type {
        ResourceType::Alert => format!(
            "{} - {}",
            raw::text(record, "subject"),
            raw::text(record, "daterecieved")
        ),
        ResourceType::Document => ["country", "title", "series", "publicationyear"]
            .iter()
            .map(|key| raw::text(record, key))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" - "),
        ResourceType::Expert => format!(
            "{} - {}",
            raw::text(record, "name"),
            raw::text(record, "title")
        ),
        ResourceType::NewsArticle => raw::text(record, "title"),
        ResourceType::Project => format!(
            "{} - {}",
            raw::text(record, "acronym"),
            raw::text(record, "name")
        ),
    };
    truncate_title(&title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::MAX_TITLE_LEN;
    use serde_json::{json, Value};

    fn record(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn alert_title_uses_received_date_or_empty() {
        let with_date = record(json!({"subject": "Flood", "daterecieved": "2024-01-02"}));
        assert_eq!(build_title(ResourceType::Alert, &with_date), "Flood - 2024-01-02");

        let without = record(json!({"subject": "Flood"}));
        assert_eq!(build_title(ResourceType::Alert, &without), "Flood - ");
    }

    #[test]
    fn document_title_skips_empty_parts() {
        let doc = record(json!({
            "country": "Fiji",
            "title": "Climate report",
            "series": "",
            "publicationyear": 2019
        }));
        assert_eq!(
            build_title(ResourceType::Document, &doc),
            "Fiji - Climate report - 2019"
        );

        let bare = record(json!({"title": "Only title"}));
        assert_eq!(build_title(ResourceType::Document, &bare), "Only title");
    }

    #[test]
    fn expert_news_and_project_titles() {
        let expert = record(json!({"name": "Ana", "title": "Hydrologist"}));
        assert_eq!(build_title(ResourceType::Expert, &expert), "Ana - Hydrologist");

        let news = record(json!({"title": "Cyclone season opens"}));
        assert_eq!(build_title(ResourceType::NewsArticle, &news), "Cyclone season opens");

        let project = record(json!({"acronym": "PACRES", "name": "Pacific Resilience"}));
        assert_eq!(
            build_title(ResourceType::Project, &project),
            "PACRES - Pacific Resilience"
        );
    }

    #[test]
    fn long_titles_are_truncated() {
        let news = record(json!({"title": "n".repeat(400)}));
        assert_eq!(
            build_title(ResourceType::NewsArticle, &news).chars().count(),
            MAX_TITLE_LEN
        );
    }
}
