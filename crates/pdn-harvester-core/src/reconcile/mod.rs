//! Reconciliation of remote records into local state.
//!
//! Typed collections are mapped to [`LocalRecord`]s and upserted into a
//! [`RecordStore`]. Documents are described and handed to the
//! [`DocumentCatalog`], reusing the identifier of any earlier import.

pub mod document;
pub mod records;

pub use document::{
    describe_document, Contact, ContactRole, Distribution, DocumentDescriptor, Identification,
};
pub use records::{
    require_remote_id, AlertRecord, ExpertRecord, LocalRecord, LocalRecordKind, NewsRecord,
    ProjectRecord,
};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::raw::RawRecord;
use crate::resource::{ResourceId, ResourceType};
use crate::storage::{DocumentCatalog, RecordStore, UpsertOutcome};

/// What a reconciliation wrote.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum Reconciled {
    Record(LocalRecord),
    Document(DocumentDescriptor),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileOutcome {
    pub id: ResourceId,
    pub action: UpsertOutcome,
    pub reconciled: Reconciled,
}

/// Writes remote records into a local store.
pub struct RecordReconciler<'a, S: ?Sized> {
    store: &'a S,
    remote_url: String,
}

impl<'a, S: RecordStore + DocumentCatalog + ?Sized> RecordReconciler<'a, S> {
    /// `remote_url` is the base URL used for document links.
    pub fn new(store: &'a S, remote_url: &str) -> Self {
        Self {
            store,
            remote_url: remote_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create or update the local counterpart of `raw`.
    ///
    /// Reconciling the same record twice leaves the same state as once.
    pub fn reconcile(&self, resource_type: ResourceType, raw: &RawRecord) -> Result<ReconcileOutcome> {
        let Some(kind) = LocalRecordKind::for_resource_type(resource_type) else {
            return self.reconcile_document(raw);
        };

        let record = LocalRecord::from_raw(kind, raw)?;
        let action = self.store.upsert(&record)?;
        let id = ResourceId::new(resource_type, record.remote_id().to_string());
        info!(resource_id = %id, ?action, "reconciled record");

        Ok(ReconcileOutcome {
            id,
            action,
            reconciled: Reconciled::Record(record),
        })
    }

    fn reconcile_document(&self, raw: &RawRecord) -> Result<ReconcileOutcome> {
        let remote_id = require_remote_id(ResourceType::Document, raw)?;
        let existing_uuid = self.store.find_uuid(remote_id)?;
        let descriptor = describe_document(raw, &self.remote_url, existing_uuid)?;
        let action = self.store.save_descriptor(remote_id, &descriptor)?;
        let id = ResourceId::new(ResourceType::Document, remote_id.to_string());
        info!(resource_id = %id, uuid = %descriptor.uuid, ?action, "reconciled document");

        Ok(ReconcileOutcome {
            id,
            action,
            reconciled: Reconciled::Document(descriptor),
        })
    }

    /// Remove the local counterpart of `id`.
    ///
    /// Returns `Ok(false)` when there was nothing to remove.
    pub fn delete(&self, id: &ResourceId) -> Result<bool> {
        let remote_id = id.numeric_remote_id()?;
        let removed = match LocalRecordKind::for_resource_type(id.resource_type()) {
            Some(kind) => self.store.delete(kind, remote_id)?,
            None => self.store.remove_entry(remote_id)?,
        };

        if removed {
            info!(resource_id = %id, "deleted local resource");
        } else {
            warn!(resource_id = %id, "resource to delete does not exist locally");
        }
        Ok(removed)
    }
}
