//! Resource abstraction layer
//!
//! Resource types are data, not code: each one is described in
//! `src/resources/catalog.json` by the API that must be enabled, the gcloud
//! command group that lists it, and whether listing needs a location.
//!
//! # Architecture
//!
//! - [`registry`] - Loads resource type descriptors from the embedded catalog
//! - [`listing`] - Lists instances, fanning out over locations when required

pub mod listing;
mod registry;

pub use listing::list_resource;
pub use registry::*;
