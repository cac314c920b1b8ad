//! # PDN Harvester Core Library
//!
//! This library harvests the five collections of a Pacific Data Network
//! (PDN) deployment: alerts, documents, experts, news articles and projects.
//! The remote API only offers per-collection pagination; this crate presents
//! all enabled collections as one offset-addressable catalog and keeps a
//! local copy of each record up to date.
//!
//! ## Architecture
//!
//! - **Registry**: which collections are harvested, their endpoints, filters
//!   and title rules
//! - **Virtualizer**: maps a global offset onto per-collection pages and tops
//!   up short pages from the following collections
//! - **Reconciler**: maps raw records to local records (or document
//!   descriptors) and upserts or deletes them
//! - **Storage**: SQLite record store and TOML configuration
//!
//! ## Key Components
//!
//! - [`SyncOrchestrator`]: list, fetch, reconcile and delete in one place
//! - [`OffsetVirtualizer`]: paging over the virtual catalog
//! - [`RemoteCollectionClient`]: the remote API seam, with [`PostgRestClient`]
//! - [`Database`]: local record store and document catalog
//! - [`HarvesterConfig`]: configuration

pub mod client;
pub mod dates;
pub mod error;
pub mod filters;
pub mod orchestrator;
pub mod raw;
pub mod reconcile;
pub mod resource;
pub mod storage;
pub mod virtualizer;

pub use client::{PostgRestClient, RemoteCollectionClient};
pub use error::{ConfigError, DatabaseError, HarvestError, Result};
pub use filters::{DateRange, FilterConfig, FilterSpec};
pub use orchestrator::{HarvestReport, SyncOrchestrator};
pub use raw::RawRecord;
pub use reconcile::{
    DocumentDescriptor, LocalRecord, LocalRecordKind, ReconcileOutcome, Reconciled,
    RecordReconciler,
};
pub use resource::{BriefResource, HarvestToggles, ResourceId, ResourceType, ResourceTypeRegistry};
pub use storage::{CatalogEntry, Database, DocumentCatalog, HarvesterConfig, RecordStore, UpsertOutcome};
pub use virtualizer::{OffsetVirtualizer, TypeCounts};
