//! One offset-addressable sequence over all enabled collections.
//!
//! The remote API has no "list everything" endpoint. The virtual catalog
//! is the concatenation of every enabled collection in canonical order;
//! a global offset is mapped onto a (collection, local offset) pair using
//! prefix sums of the per-collection counts, and pages that run off the
//! end of one collection are topped up from the start of the next ones.

use std::num::NonZeroUsize;

use serde::Serialize;
use tracing::{debug, warn};

use crate::client::RemoteCollectionClient;
use crate::raw;
use crate::resource::{BriefResource, ResourceId, ResourceType, ResourceTypeRegistry};

/// Remote record count per collection; disabled collections count zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeCounts([u64; 5]);

impl TypeCounts {
    pub fn new(counts: [u64; 5]) -> Self {
        Self(counts)
    }

    pub fn get(&self, resource_type: ResourceType) -> u64 {
        self.0[resource_type.index()]
    }

    pub fn set(&mut self, resource_type: ResourceType, count: u64) {
        self.0[resource_type.index()] = count;
    }

    /// Size of the virtual catalog.
    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    /// Number of records in the collections before `resource_type`.
    pub fn prefix(&self, resource_type: ResourceType) -> u64 {
        self.0[..resource_type.index()].iter().sum()
    }

    /// The collection holding global `offset`, with the local offset into it.
    pub fn locate(&self, offset: u64) -> Option<(ResourceType, u64)> {
        let mut start = 0u64;
        for resource_type in ResourceType::ALL {
            let count = self.get(resource_type);
            if offset < start + count {
                return Some((resource_type, offset - start));
            }
            start += count;
        }
        None
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceType, u64)> + '_ {
        ResourceType::ALL.into_iter().map(|t| (t, self.get(t)))
    }
}

/// Pages through the virtual catalog.
pub struct OffsetVirtualizer<'a, C: ?Sized> {
    client: &'a C,
    registry: &'a ResourceTypeRegistry,
    page_size: NonZeroUsize,
}

impl<'a, C: RemoteCollectionClient + ?Sized> OffsetVirtualizer<'a, C> {
    pub fn new(client: &'a C, registry: &'a ResourceTypeRegistry, page_size: NonZeroUsize) -> Self {
        Self {
            client,
            registry,
            page_size,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size.get()
    }

    /// Count every enabled collection with its filter applied.
    pub fn counts(&self) -> TypeCounts {
        let mut counts = TypeCounts::default();
        for resource_type in self.registry.enabled_types() {
            let count = self.client.total_count(
                self.registry.endpoint(resource_type),
                self.registry.filter(resource_type),
            );
            counts.set(resource_type, count);
        }
        counts
    }

    /// List one page of brief resources starting at global `offset`.
    pub fn list(&self, offset: u64) -> Vec<BriefResource> {
        let counts = self.counts();
        self.list_with_counts(offset, &counts)
    }

    /// Like [`list`](Self::list) with counts obtained beforehand.
    pub fn list_with_counts(&self, offset: u64, counts: &TypeCounts) -> Vec<BriefResource> {
        let page_size = self.page_size();
        let Some((first_type, local_offset)) = counts.locate(offset) else {
            debug!(offset, total = counts.total(), "offset past end of virtual catalog");
            return Vec::new();
        };
        debug!(offset, resource_type = %first_type, local_offset, "located page start");

        let mut page = self.fetch_brief(first_type, local_offset);

        // Later collections always contribute from their own offset 0.
        for resource_type in ResourceType::ALL.into_iter().skip(first_type.index() + 1) {
            if page.len() >= page_size {
                break;
            }
            if counts.get(resource_type) == 0 {
                continue;
            }
            debug!(resource_type = %resource_type, have = page.len(), "topping up page");
            page.extend(self.fetch_brief(resource_type, 0));
        }

        page.truncate(page_size);
        page
    }

    fn fetch_brief(&self, resource_type: ResourceType, offset: u64) -> Vec<BriefResource> {
        if !self.registry.is_enabled(resource_type) {
            return Vec::new();
        }
        let records = self.client.page(
            self.registry.endpoint(resource_type),
            offset,
            self.page_size() as u64,
            self.registry.filter(resource_type),
        );

        records
            .iter()
            .filter_map(|record| {
                let Some(remote_id) = raw::display(record, resource_type.id_field()) else {
                    warn!(resource_type = %resource_type, "skipping listed record without id");
                    return None;
                };
                Some(BriefResource::new(
                    ResourceId::new(resource_type, remote_id),
                    &self.registry.title(resource_type, record),
                ))
            })
            .collect()
    }
}
