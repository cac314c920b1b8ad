mod config;
pub mod database;
pub mod migrations;

pub use config::HarvesterConfig;
pub use database::{CatalogEntry, Database};

use std::path::PathBuf;

use crate::error::{DatabaseError, Result};
use crate::reconcile::{DocumentDescriptor, LocalRecord, LocalRecordKind};
use uuid::Uuid;

/// Whether a write inserted a new row or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Persistence for reconciled local records, keyed by (kind, remote id).
pub trait RecordStore {
    /// Insert or replace the record with the same kind and remote id.
    fn upsert(&self, record: &LocalRecord) -> Result<UpsertOutcome, DatabaseError>;

    fn find(
        &self,
        kind: LocalRecordKind,
        remote_id: i64,
    ) -> Result<Option<LocalRecord>, DatabaseError>;

    /// Remove the record; `false` when there was nothing to remove.
    fn delete(&self, kind: LocalRecordKind, remote_id: i64) -> Result<bool, DatabaseError>;
}

/// The cataloging collaborator that owns document descriptors.
pub trait DocumentCatalog {
    /// Identifier minted for the document on its first import, if any.
    fn find_uuid(&self, remote_id: i64) -> Result<Option<Uuid>, DatabaseError>;

    fn save_descriptor(
        &self,
        remote_id: i64,
        descriptor: &DocumentDescriptor,
    ) -> Result<UpsertOutcome, DatabaseError>;

    fn catalog_entry(&self, remote_id: i64) -> Result<Option<CatalogEntry>, DatabaseError>;

    fn remove_entry(&self, remote_id: i64) -> Result<bool, DatabaseError>;
}

/// Returns `~/.config/pdn-harvester[-dev]/` based on PDN_HARVESTER_ENV.
///
/// Set PDN_HARVESTER_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("PDN_HARVESTER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("pdn-harvester-dev")
    } else {
        base_dir.join("pdn-harvester")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
