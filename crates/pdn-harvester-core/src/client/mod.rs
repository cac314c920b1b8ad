//! Remote collection access.
//!
//! The harvester core only depends on [`RemoteCollectionClient`]. Clients
//! never fail loudly: an unavailable backend reads as "nothing here"
//! (zero count, empty page, absent record) and the failure is logged by
//! the client itself.

pub mod postgrest;

pub use postgrest::PostgRestClient;

use crate::filters::FilterSpec;
pub use crate::raw::RawRecord;

/// Read access to the paginated remote collections.
pub trait RemoteCollectionClient: Send + Sync {
    /// Whether the remote API answers at all.
    fn check_availability(&self) -> bool;

    /// Total number of records in `endpoint` matching `filter`; 0 on failure.
    fn total_count(&self, endpoint: &str, filter: &FilterSpec) -> u64;

    /// Up to `limit` records of `endpoint` starting at `offset`; empty on failure.
    fn page(&self, endpoint: &str, offset: u64, limit: u64, filter: &FilterSpec) -> Vec<RawRecord>;

    /// The single record whose `id_field` equals `id`; `None` on failure.
    fn fetch_by_id(&self, endpoint: &str, id: &str, id_field: &str) -> Option<RawRecord>;
}

impl<C: RemoteCollectionClient + ?Sized> RemoteCollectionClient for &C {
    fn check_availability(&self) -> bool {
        (**self).check_availability()
    }

    fn total_count(&self, endpoint: &str, filter: &FilterSpec) -> u64 {
        (**self).total_count(endpoint, filter)
    }

    fn page(&self, endpoint: &str, offset: u64, limit: u64, filter: &FilterSpec) -> Vec<RawRecord> {
        (**self).page(endpoint, offset, limit, filter)
    }

    fn fetch_by_id(&self, endpoint: &str, id: &str, id_field: &str) -> Option<RawRecord> {
        (**self).fetch_by_id(endpoint, id, id_field)
    }
}
