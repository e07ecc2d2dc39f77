//! Intent resolution: from a free-form utterance to at most one capability call.

pub mod affect;
pub mod cache;
pub mod fallback;
pub mod parse;
pub mod prompt;
pub mod resolution;
pub mod resolver;

pub use affect::Affect;
pub use cache::{CachedIntent, IntentCache};
pub use resolution::{IntentPayload, Resolution, ResolutionSource, FEATURE_LIST_COMMAND};
pub use resolver::IntentResolver;
