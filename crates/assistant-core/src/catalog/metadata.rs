use serde::{Deserialize, Serialize};

pub const DEFAULT_CATEGORY: &str = "general";
pub const DEFAULT_PRIORITY: i32 = 100;

/// Self-describing metadata for a capability.
///
/// Capabilities register this alongside their schemas so the router can rank
/// them and the classifier can be biased toward the right one via keywords
/// and usage examples. Metadata is never mutated after registration; a new
/// registration under the same name replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityMetadata {
    pub name: String,
    pub description: String,
    /// Category tag (e.g. "weather", "transportation").
    pub category: String,
    /// Trigger keywords in priority order (e.g. ["公車", "bus", "到站"]).
    pub keywords: Vec<String>,
    /// Utterances this capability should handle.
    pub examples: Vec<String>,
    /// Utterances this capability should NOT handle.
    pub negative_examples: Vec<String>,
    pub requires_location: bool,
    pub requires_auth: bool,
    pub is_complex: bool,
    /// Lower sorts first.
    pub priority: i32,
    pub aliases: Vec<String>,
}

impl CapabilityMetadata {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category: DEFAULT_CATEGORY.to_string(),
            keywords: Vec::new(),
            examples: Vec::new(),
            negative_examples: Vec::new(),
            requires_location: false,
            requires_auth: false,
            is_complex: false,
            priority: DEFAULT_PRIORITY,
            aliases: Vec::new(),
        }
    }

    /// Returns the first keyword contained in `text_lower`, compared case-insensitively.
    pub fn matching_keyword(&self, text_lower: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|keyword| !keyword.is_empty() && text_lower.contains(&keyword.to_lowercase()))
            .map(|keyword| keyword.as_str())
    }
}

/// Capabilities that need the user's location even when their schema does
/// not declare coordinates.
pub const LOCATION_CAPABILITIES: &[&str] = &[
    "reverse_geocode",
    "directions",
    "tdx_bus_arrival",
    "tdx_youbike",
    "tdx_metro",
    "tdx_parking",
    "tdx_train",
    "tdx_thsr",
];

pub fn requires_location_by_name(name: &str) -> bool {
    LOCATION_CAPABILITIES.contains(&name)
}

/// Infers a category tag from a capability name.
pub fn infer_category(name: &str) -> &'static str {
    let name_lower = name.to_lowercase();
    let has_any = |needles: &[&str]| needles.iter().any(|needle| name_lower.contains(needle));

    if has_any(&["weather", "forecast"]) {
        return "weather";
    }
    if has_any(&["bus", "train", "metro", "thsr", "youbike", "parking"]) {
        return "transportation";
    }
    if has_any(&["geocode", "directions", "location"]) {
        return "location";
    }
    if has_any(&["news"]) {
        return "information";
    }
    if has_any(&["exchange", "currency"]) {
        return "finance";
    }
    if has_any(&["health", "heart", "sleep", "step"]) {
        return "health";
    }
    DEFAULT_CATEGORY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_metadata_uses_defaults() {
        let metadata = CapabilityMetadata::new("weather_query", "Weather lookup");
        assert_eq!(metadata.category, DEFAULT_CATEGORY);
        assert_eq!(metadata.priority, DEFAULT_PRIORITY);
        assert!(metadata.keywords.is_empty());
    }

    #[test]
    fn matching_keyword_is_case_insensitive() {
        let mut metadata = CapabilityMetadata::new("tdx_youbike", "YouBike stations");
        metadata.keywords = vec!["YouBike".into(), "微笑單車".into()];

        assert_eq!(metadata.matching_keyword("附近的 youbike"), Some("YouBike"));
        assert_eq!(metadata.matching_keyword("哪裡有微笑單車"), Some("微笑單車"));
        assert_eq!(metadata.matching_keyword("天氣"), None);
    }

    #[test]
    fn infers_categories_from_names() {
        assert_eq!(infer_category("weather_query"), "weather");
        assert_eq!(infer_category("tdx_bus_arrival"), "transportation");
        assert_eq!(infer_category("reverse_geocode"), "location");
        assert_eq!(infer_category("news_query"), "information");
        assert_eq!(infer_category("exchange_query"), "finance");
        assert_eq!(infer_category("healthkit_query"), "health");
        assert_eq!(infer_category("calculator"), "general");
    }
}
