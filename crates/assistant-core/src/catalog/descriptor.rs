use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hasher;
use std::sync::Arc;

use fnv::FnvHasher;
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::metadata::CapabilityMetadata;
use crate::catalog::schema;

const MAX_DESCRIPTION_KEYWORDS: usize = 5;
const MAX_DESCRIPTION_EXAMPLES: usize = 3;
const MAX_DESCRIPTION_NEGATIVE_EXAMPLES: usize = 2;
const SUMMARY_DESCRIPTION_CHARS: usize = 50;

/// Executes a capability. Stored for the external dispatcher; never invoked here.
pub type CapabilityHandler =
    Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value, Value>> + Send + Sync>;

/// Metadata plus schemas for one capability. Owned by the catalog.
#[derive(Clone)]
pub struct CapabilityDescriptor {
    metadata: CapabilityMetadata,
    input_schema: Value,
    output_schema: Option<Value>,
    handler: Option<CapabilityHandler>,
}

impl fmt::Debug for CapabilityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityDescriptor")
            .field("metadata", &self.metadata)
            .field("input_schema", &self.input_schema)
            .field("output_schema", &self.output_schema)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

impl CapabilityDescriptor {
    pub fn new(
        metadata: CapabilityMetadata,
        input_schema: Value,
        output_schema: Option<Value>,
        handler: Option<CapabilityHandler>,
    ) -> Self {
        let input_schema = schema::extract_input_schema(&metadata.name, input_schema);
        Self {
            metadata,
            input_schema,
            output_schema,
            handler,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn category(&self) -> &str {
        &self.metadata.category
    }

    pub fn metadata(&self) -> &CapabilityMetadata {
        &self.metadata
    }

    pub fn input_schema(&self) -> &Value {
        &self.input_schema
    }

    pub fn output_schema(&self) -> Option<&Value> {
        self.output_schema.as_ref()
    }

    pub fn handler(&self) -> Option<&CapabilityHandler> {
        self.handler.as_ref()
    }

    pub(crate) fn set_requires_location(&mut self, requires_location: bool) {
        self.metadata.requires_location = requires_location;
    }

    /// Description enriched with keywords and usage examples to bias the classifier.
    ///
    /// At most 5 keywords, 3 positive examples and 2 negative examples are
    /// included, each clause separated by a period.
    pub fn rich_description(&self) -> String {
        let metadata = &self.metadata;
        let mut parts = vec![metadata.description.clone()];

        if !metadata.keywords.is_empty() {
            let keywords: Vec<&str> = metadata
                .keywords
                .iter()
                .take(MAX_DESCRIPTION_KEYWORDS)
                .map(String::as_str)
                .collect();
            parts.push(format!("Keywords: {}", keywords.join(", ")));
        }

        if !metadata.examples.is_empty() {
            let examples: Vec<&str> = metadata
                .examples
                .iter()
                .take(MAX_DESCRIPTION_EXAMPLES)
                .map(String::as_str)
                .collect();
            parts.push(format!("Use for: {}", examples.join("; ")));
        }

        if !metadata.negative_examples.is_empty() {
            let negatives: Vec<&str> = metadata
                .negative_examples
                .iter()
                .take(MAX_DESCRIPTION_NEGATIVE_EXAMPLES)
                .map(String::as_str)
                .collect();
            parts.push(format!("Do not use for: {}", negatives.join("; ")));
        }

        parts.join(". ")
    }

    /// Projects the descriptor into the classifier's function-calling format.
    pub fn to_wire(&self, strict: bool) -> WireDescriptor {
        self.to_wire_named(strict, &mut WireNames::new())
    }

    /// Same as [`CapabilityDescriptor::to_wire`], drawing the wire name from
    /// `names` so it stays unique across one export.
    pub fn to_wire_named(&self, strict: bool, names: &mut WireNames) -> WireDescriptor {
        let parameters = if strict {
            schema::to_strict_schema(&self.input_schema)
        } else {
            self.input_schema.clone()
        };
        WireDescriptor {
            kind: WireKind::Function,
            function: WireFunction {
                name: names.assign(&self.metadata.name),
                description: self.rich_description(),
                parameters,
                strict: strict.then_some(true),
            },
        }
    }

    /// Compact projection used by the keyword fallback.
    pub fn summarize(&self) -> CapabilitySummary {
        let description = &self.metadata.description;
        let description = if description.chars().count() > SUMMARY_DESCRIPTION_CHARS {
            let head: String = description.chars().take(SUMMARY_DESCRIPTION_CHARS).collect();
            format!("{head}...")
        } else {
            description.clone()
        };
        CapabilitySummary {
            name: self.metadata.name.clone(),
            description,
            category: self.metadata.category.clone(),
            keywords: self.metadata.keywords.clone(),
            params: schema::property_names(&self.input_schema),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireKind {
    Function,
}

/// `{kind:"function", function:{name, description, parameters, strict?}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireDescriptor {
    pub kind: WireKind,
    pub function: WireFunction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireFunction {
    pub name: String,
    pub description: String,
    pub parameters: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

impl WireDescriptor {
    pub fn name(&self) -> &str {
        &self.function.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySummary {
    pub name: String,
    pub description: String,
    pub category: String,
    pub keywords: Vec<String>,
    pub params: Vec<String>,
}

/// Wire-safe capability names for one export, with the way back to catalog names.
///
/// Names are restricted to `[A-Za-z0-9_-]`. When two catalog names sanitize
/// to the same string, the later one gets a hash suffix.
#[derive(Debug, Default)]
pub struct WireNames {
    used: HashSet<String>,
    originals: HashMap<String, String>,
}

impl WireNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, name: &str) -> String {
        let wire_name = sanitize_capability_name(name, &mut self.used);
        self.originals.insert(wire_name.clone(), name.to_string());
        wire_name
    }

    /// Catalog name behind `wire_name`. Names never assigned pass through.
    pub fn original<'a>(&'a self, wire_name: &'a str) -> &'a str {
        self.originals
            .get(wire_name)
            .map(String::as_str)
            .unwrap_or(wire_name)
    }
}

fn sanitize_capability_name(original: &str, used: &mut HashSet<String>) -> String {
    let mut safe: String = original
        .chars()
        .map(|ch| match ch {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '-' => ch,
            _ => '_',
        })
        .collect();

    if safe.is_empty() {
        safe = "capability".to_string();
    }

    if used.insert(safe.clone()) {
        return safe;
    }

    let candidate = format!("{safe}_{}", short_hash_suffix(original));
    if used.insert(candidate.clone()) {
        candidate
    } else {
        let fallback = format!("{safe}_{}", used.len());
        used.insert(fallback.clone());
        fallback
    }
}

fn short_hash_suffix(value: &str) -> String {
    let mut hasher = FnvHasher::default();
    hasher.write(value.as_bytes());
    format!("{:x}", hasher.finish()).chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bus_descriptor() -> CapabilityDescriptor {
        let mut metadata = CapabilityMetadata::new("tdx_bus_arrival", "Real-time bus arrival estimates");
        metadata.category = "transportation".into();
        metadata.keywords = vec![
            "公車".into(),
            "巴士".into(),
            "bus".into(),
            "到站".into(),
            "即時".into(),
            "幾分鐘".into(),
        ];
        metadata.examples = vec![
            "137公車還要多久".into(),
            "307 到站時間".into(),
            "紅30 幾分鐘到".into(),
            "下一班公車".into(),
        ];
        metadata.negative_examples = vec!["高鐵時刻".into(), "台鐵班次".into(), "捷運".into()];
        CapabilityDescriptor::new(
            metadata,
            json!({
                "type": "object",
                "properties": {
                    "route_name": { "type": "string" },
                    "city": { "type": "string", "default": "Taipei" }
                }
            }),
            None,
            None,
        )
    }

    #[test]
    fn rich_description_is_bounded() {
        let description = bus_descriptor().rich_description();

        assert!(description.starts_with(
            "Real-time bus arrival estimates. Keywords: 公車, 巴士, bus, 到站, 即時. Use for: "
        ));
        assert!(description.contains("紅30 幾分鐘到"));
        assert!(!description.contains("下一班公車"));
        assert!(description.contains("Do not use for: 高鐵時刻; 台鐵班次"));
        assert!(!description.contains("捷運"));
    }

    #[test]
    fn strict_wire_descriptor_sets_flag() {
        let wire = bus_descriptor().to_wire(true);
        let encoded = serde_json::to_value(&wire).expect("serialize");

        assert_eq!(encoded["kind"], json!("function"));
        assert_eq!(encoded["function"]["strict"], json!(true));
        assert_eq!(encoded["function"]["parameters"]["additionalProperties"], json!(false));
        assert_eq!(encoded["function"]["parameters"]["required"], json!(["route_name"]));
    }

    #[test]
    fn lenient_wire_descriptor_keeps_raw_schema() {
        let descriptor = bus_descriptor();
        let wire = descriptor.to_wire(false);
        let encoded = serde_json::to_value(&wire).expect("serialize");

        assert!(encoded["function"].get("strict").is_none());
        assert_eq!(&wire.function.parameters, descriptor.input_schema());
    }

    #[test]
    fn summary_truncates_long_descriptions() {
        let metadata = CapabilityMetadata::new("news_query", "n".repeat(80));
        let descriptor = CapabilityDescriptor::new(metadata, json!({}), None, None);
        let summary = descriptor.summarize();

        assert_eq!(summary.description.chars().count(), SUMMARY_DESCRIPTION_CHARS + 3);
        assert!(summary.description.ends_with("..."));
    }

    #[test]
    fn summary_lists_parameter_names() {
        let summary = bus_descriptor().summarize();
        assert_eq!(summary.params, vec!["city".to_string(), "route_name".to_string()]);
    }

    #[test]
    fn wire_names_are_sanitized() {
        let mut names = WireNames::new();
        assert_eq!(names.assign("notes.create"), "notes_create");
        assert_eq!(names.assign("tdx-metro_2"), "tdx-metro_2");
        assert_eq!(names.original("notes_create"), "notes.create");
        assert_eq!(names.original("unknown_tool"), "unknown_tool");
    }

    #[test]
    fn colliding_wire_names_stay_distinct() {
        let mut names = WireNames::new();
        let dotted = names.assign("a.b");
        let underscored = names.assign("a_b");

        assert_eq!(dotted, "a_b");
        assert_ne!(underscored, dotted);
        assert!(underscored.starts_with("a_b_"));
        assert_eq!(names.original(&dotted), "a.b");
        assert_eq!(names.original(&underscored), "a_b");
    }
}
