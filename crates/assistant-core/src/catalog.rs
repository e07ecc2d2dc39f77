//! Capability catalog: self-describing metadata and schemas for every
//! capability the assistant can hand to the external dispatcher.

pub mod descriptor;
pub mod metadata;
pub mod registry;
pub mod schema;

pub use descriptor::{
    CapabilityDescriptor, CapabilityHandler, CapabilitySummary, WireDescriptor, WireFunction,
    WireKind, WireNames,
};
pub use metadata::CapabilityMetadata;
pub use registry::{CapabilityRecord, Catalog, CatalogStats};
