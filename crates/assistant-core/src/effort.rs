//! Reasoning-effort selection for classifier calls.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::intent::Affect;

/// Opaque strength hint forwarded to the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Minimal,
    Low,
    Medium,
    High,
}

impl ReasoningEffort {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasoningEffort::Minimal => "minimal",
            ReasoningEffort::Low => "low",
            ReasoningEffort::Medium => "medium",
            ReasoningEffort::High => "high",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ReasoningEffort::Minimal => "fastest replies, under a second",
            ReasoningEffort::Low => "quick replies, one to two seconds",
            ReasoningEffort::Medium => "standard reasoning, two to five seconds",
            ReasoningEffort::High => "deep reasoning, five to fifteen seconds",
        }
    }

    /// Expected latency range in seconds.
    pub fn estimated_latency(&self) -> (f64, f64) {
        match self {
            ReasoningEffort::Minimal => (0.5, 1.0),
            ReasoningEffort::Low => (1.0, 2.0),
            ReasoningEffort::Medium => (2.0, 5.0),
            ReasoningEffort::High => (5.0, 15.0),
        }
    }
}

impl fmt::Display for ReasoningEffort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of work a classifier call performs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskKind {
    IntentClassification,
    CapabilityInvocation,
    ResponseFormatting,
    OpenChat,
    DeepReasoning,
    BatchSummary,
    Other(String),
}

impl TaskKind {
    pub fn as_str(&self) -> &str {
        match self {
            TaskKind::IntentClassification => "intent_classification",
            TaskKind::CapabilityInvocation => "capability_invocation",
            TaskKind::ResponseFormatting => "response_formatting",
            TaskKind::OpenChat => "open_chat",
            TaskKind::DeepReasoning => "deep_reasoning",
            TaskKind::BatchSummary => "batch_summary",
            TaskKind::Other(name) => name,
        }
    }
}

impl From<&str> for TaskKind {
    fn from(value: &str) -> Self {
        match value {
            "intent_classification" => TaskKind::IntentClassification,
            "capability_invocation" => TaskKind::CapabilityInvocation,
            "response_formatting" => TaskKind::ResponseFormatting,
            "open_chat" => TaskKind::OpenChat,
            "deep_reasoning" => TaskKind::DeepReasoning,
            "batch_summary" => TaskKind::BatchSummary,
            other => TaskKind::Other(other.to_string()),
        }
    }
}

impl FromStr for TaskKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TaskKind::from(s))
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

/// Picks the effort hint for a task. Rules are checked in order and the
/// first match wins; the affect override applies only after intent
/// classification has been ruled out.
pub fn effort_for(
    task: &TaskKind,
    affect: Option<Affect>,
    complexity: Option<Complexity>,
) -> ReasoningEffort {
    if *task == TaskKind::IntentClassification {
        return ReasoningEffort::Low;
    }

    if let Some(affect) = affect {
        if affect.is_distressed() {
            tracing::debug!(affect = %affect, "distressed affect; minimal effort");
            return ReasoningEffort::Minimal;
        }
    }

    match task {
        TaskKind::CapabilityInvocation | TaskKind::ResponseFormatting => ReasoningEffort::Low,
        TaskKind::OpenChat => match complexity {
            Some(Complexity::Complex) => ReasoningEffort::Medium,
            _ => ReasoningEffort::Low,
        },
        TaskKind::DeepReasoning | TaskKind::BatchSummary => ReasoningEffort::Medium,
        TaskKind::IntentClassification => ReasoningEffort::Low,
        TaskKind::Other(name) => {
            tracing::debug!(task = %name, "unknown task kind; low effort");
            ReasoningEffort::Low
        }
    }
}
