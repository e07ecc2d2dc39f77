//! Capability routing: narrows the catalog to the candidates worth showing
//! the classifier for one utterance.

pub mod context;
pub mod ledger;
pub mod router;

pub use context::{GeoPoint, RoutingContext};
pub use ledger::UserPreferenceLedger;
pub use router::{CapabilityRouter, RankedCapability, RoutingResult, CATEGORY_KEYWORDS};
