//! Sequencing of list, fetch, reconcile and delete calls.

use std::num::NonZeroUsize;

use serde::Serialize;
use tracing::{info, warn};

use crate::client::{PostgRestClient, RemoteCollectionClient};
use crate::error::Result;
use crate::raw::RawRecord;
use crate::reconcile::{ReconcileOutcome, RecordReconciler};
use crate::resource::{BriefResource, ResourceId, ResourceTypeRegistry};
use crate::storage::{DocumentCatalog, HarvesterConfig, RecordStore, UpsertOutcome};
use crate::virtualizer::{OffsetVirtualizer, TypeCounts};

/// Summary of one [`SyncOrchestrator::harvest_page`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HarvestReport {
    pub listed: usize,
    pub created: usize,
    pub updated: usize,
    /// Listed but gone by the time it was fetched.
    pub missing: usize,
    pub failed: Vec<ResourceId>,
}

/// Drives a remote client and a local store through one configuration.
pub struct SyncOrchestrator<C, S> {
    client: C,
    store: S,
    registry: ResourceTypeRegistry,
    page_size: NonZeroUsize,
    remote_url: String,
}

impl<S: RecordStore + DocumentCatalog> SyncOrchestrator<PostgRestClient, S> {
    /// Build an orchestrator talking to the PostgREST API named by `config`.
    pub fn connect(config: &HarvesterConfig, store: S) -> Result<Self> {
        let client = PostgRestClient::from_config(config)?;
        Self::from_config(config, client, store)
    }
}

impl<C: RemoteCollectionClient, S: RecordStore + DocumentCatalog> SyncOrchestrator<C, S> {
    pub fn new(
        client: C,
        store: S,
        registry: ResourceTypeRegistry,
        page_size: NonZeroUsize,
        remote_url: &str,
    ) -> Self {
        Self {
            client,
            store,
            registry,
            page_size,
            remote_url: remote_url.trim_end_matches('/').to_string(),
        }
    }

    /// Validate `config` and build the registry from it.
    pub fn from_config(config: &HarvesterConfig, client: C, store: S) -> Result<Self> {
        config.validate()?;
        let registry = ResourceTypeRegistry::new(config.toggles(), &config.filters()?);
        Ok(Self::new(
            client,
            store,
            registry,
            config.page_size()?,
            config.remote_url(),
        ))
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn registry(&self) -> &ResourceTypeRegistry {
        &self.registry
    }

    pub fn page_size(&self) -> usize {
        self.page_size.get()
    }

    fn virtualizer(&self) -> OffsetVirtualizer<'_, C> {
        OffsetVirtualizer::new(&self.client, &self.registry, self.page_size)
    }

    fn reconciler(&self) -> RecordReconciler<'_, S> {
        RecordReconciler::new(&self.store, &self.remote_url)
    }

    pub fn check_availability(&self) -> bool {
        self.client.check_availability()
    }

    /// Per-collection remote counts; disabled collections count zero.
    pub fn counts(&self) -> TypeCounts {
        self.virtualizer().counts()
    }

    /// Size of the virtual catalog.
    pub fn num_available_resources(&self) -> u64 {
        self.counts().total()
    }

    /// One page of the virtual catalog starting at `offset`.
    pub fn list_resources(&self, offset: u64) -> Vec<BriefResource> {
        self.virtualizer().list(offset)
    }

    /// The full raw record behind `id`, if the remote still has it.
    pub fn fetch(&self, id: &ResourceId) -> Option<RawRecord> {
        let resource_type = id.resource_type();
        self.client.fetch_by_id(
            self.registry.endpoint(resource_type),
            id.remote_id(),
            resource_type.id_field(),
        )
    }

    /// Write `raw`, fetched for `id`, to the local store.
    pub fn reconcile(&self, id: &ResourceId, raw: &RawRecord) -> Result<ReconcileOutcome> {
        self.reconciler().reconcile(id.resource_type(), raw)
    }

    /// Fetch and reconcile `id`. `Ok(None)` when the remote has no such record.
    pub fn harvest(&self, id: &ResourceId) -> Result<Option<ReconcileOutcome>> {
        let Some(raw) = self.fetch(id) else {
            warn!(resource_id = %id, "resource not available remotely");
            return Ok(None);
        };
        self.reconcile(id, &raw).map(Some)
    }

    /// Harvest every resource on the page at `offset`.
    ///
    /// A record that fails to reconcile is reported and the rest of the page
    /// still runs.
    pub fn harvest_page(&self, offset: u64) -> HarvestReport {
        let page = self.list_resources(offset);
        let mut report = HarvestReport {
            listed: page.len(),
            ..Default::default()
        };

        for brief in page {
            match self.harvest(&brief.id) {
                Ok(Some(outcome)) => match outcome.action {
                    UpsertOutcome::Created => report.created += 1,
                    UpsertOutcome::Updated => report.updated += 1,
                },
                Ok(None) => report.missing += 1,
                Err(e) => {
                    warn!(resource_id = %brief.id, error = %e, "skipping resource");
                    report.failed.push(brief.id);
                }
            }
        }

        info!(
            offset,
            listed = report.listed,
            created = report.created,
            updated = report.updated,
            missing = report.missing,
            failed = report.failed.len(),
            "harvested page"
        );
        report
    }

    /// Remove the local counterpart of `id`; `Ok(false)` if there was none.
    pub fn delete(&self, id: &ResourceId) -> Result<bool> {
        self.reconciler().delete(id)
    }
}
