//! Catalog schema, loader, and validation
//!
//! The catalog is the system's sole input: service entries, reusable
//! behavior/cost/monitoring profiles, size tiers, release channels, and
//! environment/region pins. It is loaded once per run into an immutable
//! [`Catalog`] snapshot that is passed explicitly through the pipeline.

pub mod catalog;
pub mod error;
pub mod loader;
pub mod schema;

pub use catalog::Catalog;
pub use error::{Error, Result};
pub use loader::CatalogLoader;
pub use schema::{
    BehaviorProfile, OverrideBlock, PinTable, PinTarget, ProfileTemplate, ReplicaBounds,
    ResourceBaseline, ServiceOverrides, ServiceSpec, SizeTier,
};
