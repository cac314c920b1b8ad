//! Normalized local records and their mapping from raw remote records.
//!
//! Each mapping substitutes a fixed default for every absent or null
//! field. Dates that fail to parse are stored unset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{HarvestError, Result};
use crate::filters::{ALERT_DATE_FIELD, NEWS_DATE_FIELD};
use crate::raw::{self, RawRecord};
use crate::resource::{ResourceType, ID_SEPARATOR};

/// Local tables, one per non-document collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalRecordKind {
    Alert,
    Expert,
    News,
    Project,
}

impl LocalRecordKind {
    /// The local table of a collection; `None` for documents, which are
    /// described to the catalog instead.
    pub fn for_resource_type(resource_type: ResourceType) -> Option<Self> {
        match resource_type {
            ResourceType::Alert => Some(LocalRecordKind::Alert),
            ResourceType::Document => None,
            ResourceType::Expert => Some(LocalRecordKind::Expert),
            ResourceType::NewsArticle => Some(LocalRecordKind::News),
            ResourceType::Project => Some(LocalRecordKind::Project),
        }
    }

    pub fn resource_type(&self) -> ResourceType {
        match self {
            LocalRecordKind::Alert => ResourceType::Alert,
            LocalRecordKind::Expert => ResourceType::Expert,
            LocalRecordKind::News => ResourceType::NewsArticle,
            LocalRecordKind::Project => ResourceType::Project,
        }
    }
}

impl fmt::Display for LocalRecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LocalRecordKind::Alert => "alert",
            LocalRecordKind::Expert => "expert",
            LocalRecordKind::News => "news",
            LocalRecordKind::Project => "project",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub remote_id: i64,
    pub content: String,
    pub countries: String,
    pub date_received: Option<DateTime<Utc>>,
    pub ignore: bool,
    pub subject: String,
    pub uuid: String,
    pub source_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpertRecord {
    pub remote_id: i64,
    pub name: String,
    pub title: String,
    pub country: String,
    pub country_code: String,
    pub email: String,
    pub ministry: String,
    pub country_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsRecord {
    pub remote_id: i64,
    pub source_id: i64,
    pub title: String,
    pub url: String,
    pub country: String,
    pub country_code: String,
    pub date: Option<DateTime<Utc>>,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub remote_id: i64,
    pub name: String,
    pub acronym: String,
    pub description: String,
    pub logo_url: String,
    pub url: String,
    pub active: bool,
}

/// A record as written to the local store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocalRecord {
    Alert(AlertRecord),
    Expert(ExpertRecord),
    News(NewsRecord),
    Project(ProjectRecord),
}

impl LocalRecord {
    /// Map a raw record of the given kind.
    pub fn from_raw(kind: LocalRecordKind, raw: &RawRecord) -> Result<Self> {
        Ok(match kind {
            LocalRecordKind::Alert => LocalRecord::Alert(AlertRecord::from_raw(raw)?),
            LocalRecordKind::Expert => LocalRecord::Expert(ExpertRecord::from_raw(raw)?),
            LocalRecordKind::News => LocalRecord::News(NewsRecord::from_raw(raw)?),
            LocalRecordKind::Project => LocalRecord::Project(ProjectRecord::from_raw(raw)?),
        })
    }

    pub fn kind(&self) -> LocalRecordKind {
        match self {
            LocalRecord::Alert(_) => LocalRecordKind::Alert,
            LocalRecord::Expert(_) => LocalRecordKind::Expert,
            LocalRecord::News(_) => LocalRecordKind::News,
            LocalRecord::Project(_) => LocalRecordKind::Project,
        }
    }

    pub fn remote_id(&self) -> i64 {
        match self {
            LocalRecord::Alert(r) => r.remote_id,
            LocalRecord::Expert(r) => r.remote_id,
            LocalRecord::News(r) => r.remote_id,
            LocalRecord::Project(r) => r.remote_id,
        }
    }
}

/// The remote identity of `raw`; a record without one cannot be reconciled.
pub fn require_remote_id(resource_type: ResourceType, raw: &RawRecord) -> Result<i64> {
    let field = resource_type.id_field();
    match raw.get(field) {
        None | Some(serde_json::Value::Null) => Err(HarvestError::MissingField {
            resource_type,
            field: field.to_string(),
        }),
        Some(value) => raw::identity(raw, field).ok_or_else(|| {
            HarvestError::InvalidResourceId(format!("{resource_type}{ID_SEPARATOR}{value}"))
        }),
    }
}

impl AlertRecord {
    pub fn from_raw(raw: &RawRecord) -> Result<Self> {
        Ok(Self {
            remote_id: require_remote_id(ResourceType::Alert, raw)?,
            content: raw::text(raw, "content"),
            countries: raw::text(raw, "countries"),
            date_received: raw::date(raw, ALERT_DATE_FIELD),
            ignore: raw::flag_or(raw, "ignore", false),
            subject: raw::text(raw, "subject"),
            uuid: raw::text(raw, "uuid"),
            source_id: raw::integer_or(raw, "source_id", 0),
        })
    }
}

impl ExpertRecord {
    pub fn from_raw(raw: &RawRecord) -> Result<Self> {
        Ok(Self {
            remote_id: require_remote_id(ResourceType::Expert, raw)?,
            name: raw::text(raw, "name"),
            title: raw::text(raw, "title"),
            country: raw::text(raw, "country"),
            country_code: raw::text(raw, "country_code"),
            email: raw::text(raw, "email"),
            ministry: raw::text(raw, "ministry"),
            country_id: raw::text(raw, "country_id"),
        })
    }
}

impl NewsRecord {
    pub fn from_raw(raw: &RawRecord) -> Result<Self> {
        Ok(Self {
            remote_id: require_remote_id(ResourceType::NewsArticle, raw)?,
            source_id: raw::integer_or(raw, "source_id", 0),
            title: raw::text(raw, "title"),
            url: raw::text(raw, "url"),
            country: raw::text(raw, "country"),
            country_code: raw::text(raw, "country_code"),
            date: raw::date(raw, NEWS_DATE_FIELD),
            source: raw::text(raw, "source"),
        })
    }
}

impl ProjectRecord {
    pub fn from_raw(raw: &RawRecord) -> Result<Self> {
        Ok(Self {
            remote_id: require_remote_id(ResourceType::Project, raw)?,
            name: raw::text(raw, "name"),
            acronym: raw::text(raw, "acronym"),
            description: raw::text(raw, "description"),
            logo_url: raw::text(raw, "logo_url"),
            url: raw::text(raw, "url"),
            active: raw::flag_or(raw, "active", false),
        })
    }
}
