//! The external classifier seam. This crate shapes the classifier's input
//! and interprets its output; the completion client lives elsewhere.

pub mod provider;
pub mod types;

pub use provider::Classifier;
pub use types::{CapabilityInvocation, ClassifierError, ClassifierRequest, ClassifierResponse};
