pub mod error;
pub mod settings;

pub mod assistant;
pub mod catalog;
pub mod classifier;
pub mod effort;
pub mod intent;
pub mod routing;

pub use crate::assistant::AssistantCore;
pub use crate::catalog::{CapabilityMetadata, CapabilityRecord, Catalog, CatalogStats, WireDescriptor};
pub use crate::classifier::{Classifier, ClassifierError, ClassifierRequest, ClassifierResponse};
pub use crate::effort::{effort_for, Complexity, ReasoningEffort, TaskKind};
pub use crate::error::{CatalogError, CoreError, CoreResult, SettingsError};
pub use crate::intent::{Affect, IntentPayload, IntentResolver, Resolution, ResolutionSource};
pub use crate::routing::{CapabilityRouter, RoutingContext, UserPreferenceLedger};
pub use crate::settings::{ResolverSettings, SettingsStore};
