use serde::{Deserialize, Serialize};

use crate::catalog::WireDescriptor;
use crate::effort::ReasoningEffort;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    #[error("classifier timed out")]
    Timeout,

    #[error("classifier transport error: {0}")]
    Transport(String),

    #[error("invalid classifier response: {0}")]
    InvalidResponse(String),
}

/// Everything the classifier receives for one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierRequest {
    pub instruction: String,
    pub utterance: String,
    pub capabilities: Vec<WireDescriptor>,
    pub effort: ReasoningEffort,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// One capability the classifier chose, with its raw JSON arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityInvocation {
    pub capability_name: String,
    pub arguments_json: String,
}

impl CapabilityInvocation {
    pub fn new(capability_name: impl Into<String>, arguments_json: impl Into<String>) -> Self {
        Self {
            capability_name: capability_name.into(),
            arguments_json: arguments_json.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierResponse {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub invocations: Vec<CapabilityInvocation>,
}

impl ClassifierResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            invocations: Vec::new(),
        }
    }

    pub fn invoking(invocation: CapabilityInvocation) -> Self {
        Self {
            content: String::new(),
            invocations: vec![invocation],
        }
    }
}
