//! The closed set of remote collections and the identifiers built on them.
//!
//! PDN exposes five independent collections with no common listing
//! endpoint. Everything that needs to treat them uniformly goes through
//! [`ResourceType`] and the [`ResourceTypeRegistry`].

mod registry;
mod titles;
mod types;

pub use registry::{HarvestToggles, ResourceTypeRegistry};
pub use titles::build_title;
pub use types::{truncate_title, BriefResource, ResourceId, ResourceType, ID_SEPARATOR, MAX_TITLE_LEN};
