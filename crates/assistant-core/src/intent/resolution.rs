use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::intent::affect::Affect;

pub const FEATURE_LIST_COMMAND: &str = "feature_list";

/// What the resolver decided for one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntentPayload {
    /// Hand `capability` with `arguments` to the dispatcher. The name is
    /// passed through as the classifier returned it.
    CapabilityCall {
        capability: String,
        arguments: Value,
        affect: Affect,
    },
    /// A built-in command recognized from a literal phrase.
    SpecialCommand { command: String },
    /// No capability applies.
    Conversation { affect: Affect },
}

impl IntentPayload {
    pub fn conversation(affect: Affect) -> Self {
        IntentPayload::Conversation { affect }
    }

    pub fn affect(&self) -> Option<Affect> {
        match self {
            IntentPayload::CapabilityCall { affect, .. } | IntentPayload::Conversation { affect } => {
                Some(*affect)
            }
            IntentPayload::SpecialCommand { .. } => None,
        }
    }

    pub fn capability(&self) -> Option<&str> {
        match self {
            IntentPayload::CapabilityCall { capability, .. } => Some(capability),
            _ => None,
        }
    }
}

/// Which stage of the pipeline produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    Cache,
    Special,
    Classifier,
    Fallback,
    NoCandidates,
}

/// `(matched, payload)` plus the stage that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub matched: bool,
    pub payload: IntentPayload,
    pub source: ResolutionSource,
}

impl Resolution {
    pub fn new(matched: bool, payload: IntentPayload, source: ResolutionSource) -> Self {
        Self {
            matched,
            payload,
            source,
        }
    }

    pub fn unmatched(source: ResolutionSource) -> Self {
        Self::new(false, IntentPayload::conversation(Affect::Neutral), source)
    }

    pub fn into_parts(self) -> (bool, IntentPayload) {
        (self.matched, self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payloads_are_tagged_by_kind() {
        let call = IntentPayload::CapabilityCall {
            capability: "weather_query".into(),
            arguments: json!({ "city": "Taipei" }),
            affect: Affect::Happy,
        };
        assert_eq!(
            serde_json::to_value(&call).expect("serialize"),
            json!({
                "kind": "capability_call",
                "capability": "weather_query",
                "arguments": { "city": "Taipei" },
                "affect": "happy"
            })
        );

        let chat = IntentPayload::conversation(Affect::Neutral);
        assert_eq!(
            serde_json::to_value(&chat).expect("serialize"),
            json!({ "kind": "conversation", "affect": "neutral" })
        );
    }

    #[test]
    fn unmatched_is_neutral_conversation() {
        let (matched, payload) = Resolution::unmatched(ResolutionSource::Fallback).into_parts();
        assert!(!matched);
        assert_eq!(payload.affect(), Some(Affect::Neutral));
        assert_eq!(payload.capability(), None);
    }
}
