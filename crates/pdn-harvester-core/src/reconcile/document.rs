//! Catalog descriptors for PDN documents.
//!
//! Documents are not stored as local records. They are described to the
//! cataloging collaborator: two contact blocks, an identification block
//! and a distribution block with download and thumbnail links.
//!
//! PDN documents carry no globally unique identifier, so one is minted on
//! first import and must be reused on every later update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::raw::{self, RawRecord};
use crate::resource::ResourceType;

use super::records::require_remote_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactRole {
    #[serde(rename = "pointOfContact")]
    PointOfContact,
    #[serde(rename = "author")]
    Author,
}

impl ContactRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactRole::PointOfContact => "pointOfContact",
            ContactRole::Author => "author",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub role: ContactRole,
    pub name: Option<String>,
    pub organization: Option<String>,
    pub position: Option<String>,
    pub address_country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identification {
    pub name: Option<String>,
    pub title: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub date_type: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub purpose: Option<String>,
    pub originator: Contact,
    pub graphic_overview_uri: Option<String>,
    pub place_keywords: Vec<String>,
    pub other_keywords: Vec<String>,
    pub license: Vec<String>,
    pub supplemental_information: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    pub link_url: String,
    pub thumbnail_url: Option<String>,
    pub original_format_url: Option<String>,
}

/// Everything the catalog needs to create or update a document entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentDescriptor {
    pub uuid: Uuid,
    pub point_of_contact: Contact,
    pub author: Contact,
    pub date_stamp: Option<DateTime<Utc>>,
    pub identification: Identification,
    pub distribution: Distribution,
}

fn contact(role: ContactRole, raw: &RawRecord) -> Contact {
    Contact {
        role,
        name: raw::opt_text(raw, "authors"),
        organization: raw::opt_text(raw, "corporateauthor"),
        position: raw::opt_text(raw, "publisher"),
        address_country: raw::opt_text(raw, "country"),
    }
}

/// Download and thumbnail links for a stored file name.
fn file_links(remote_url: &str, filename: Option<&str>) -> (Option<String>, Option<String>) {
    match filename {
        Some(filename) => {
            let stem = filename
                .rsplit_once('.')
                .map(|(stem, _)| stem)
                .unwrap_or("");
            (
                Some(format!("{remote_url}/doc/{filename}")),
                Some(format!("{remote_url}/doc/{stem}.png")),
            )
        }
        None => (None, None),
    }
}

/// Describe a raw document record.
///
/// `existing_uuid` is the identifier of the catalog entry from a previous
/// import, if any; a fresh one is minted otherwise.
pub fn describe_document(
    raw: &RawRecord,
    remote_url: &str,
    existing_uuid: Option<Uuid>,
) -> Result<DocumentDescriptor> {
    let remote_id = require_remote_id(ResourceType::Document, raw)?;
    let remote_url = remote_url.trim_end_matches('/');

    let date_stamp = raw::date(raw, "uploaddate");
    let country = raw::opt_text(raw, "country");
    let point_of_contact = contact(ContactRole::PointOfContact, raw);
    let author = contact(ContactRole::Author, raw);
    let filename = raw::opt_text(raw, "filename");
    let (download_url, thumbnail_url) = file_links(remote_url, filename.as_deref());
    let title = raw::opt_text(raw, "title");

    let supplemental_information = [
        ("Cataloging source", "catalougingsource"),
        ("General Note", "generalnote"),
        ("ISBN", "isbn"),
        ("ISSN", "issn"),
    ]
    .iter()
    .map(|(label, key)| format!("{label}: {}", raw::text(raw, key)))
    .collect::<Vec<_>>()
    .join("\n");

    Ok(DocumentDescriptor {
        uuid: existing_uuid.unwrap_or_else(Uuid::new_v4),
        point_of_contact,
        author: author.clone(),
        date_stamp,
        identification: Identification {
            name: title.clone(),
            title,
            date: date_stamp,
            date_type: "upload".to_string(),
            abstract_text: raw::text(raw, "description"),
            purpose: raw::opt_text(raw, "targetaudicent"),
            originator: author,
            graphic_overview_uri: thumbnail_url.clone(),
            place_keywords: country.into_iter().collect(),
            other_keywords: Vec::new(),
            license: Vec::new(),
            supplemental_information,
        },
        distribution: Distribution {
            link_url: format!("{remote_url}/document/{remote_id}"),
            thumbnail_url,
            original_format_url: download_url,
        },
    })
}
