use crate::catalog::CapabilitySummary;
use crate::intent::affect::Affect;
use crate::intent::resolution::IntentPayload;

/// Keyword match over capability summaries, used when the classifier fails.
///
/// Summaries are scanned in order and each summary's keywords in order; the
/// first keyword contained in the utterance (case-insensitive) wins.
pub fn keyword_fallback(summaries: &[CapabilitySummary], utterance: &str) -> (bool, IntentPayload) {
    let utterance_lower = utterance.to_lowercase();

    for summary in summaries {
        for keyword in &summary.keywords {
            if keyword.is_empty() || !utterance_lower.contains(&keyword.to_lowercase()) {
                continue;
            }
            tracing::info!(keyword = %keyword, capability = %summary.name, "keyword fallback matched");
            return (
                true,
                IntentPayload::CapabilityCall {
                    capability: summary.name.clone(),
                    arguments: serde_json::Value::Object(serde_json::Map::new()),
                    affect: Affect::Neutral,
                },
            );
        }
    }

    (false, IntentPayload::conversation(Affect::Neutral))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str, keywords: &[&str]) -> CapabilitySummary {
        CapabilitySummary {
            name: name.to_string(),
            description: String::new(),
            category: "general".to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            params: Vec::new(),
        }
    }

    #[test]
    fn first_matching_summary_wins() {
        let summaries = vec![
            summary("weather_query", &["天氣"]),
            summary("tdx_bus_arrival", &["公車", "137"]),
            summary("bus_fares", &["公車"]),
        ];

        let (matched, payload) = keyword_fallback(&summaries, "137公車");

        assert!(matched);
        assert_eq!(payload.capability(), Some("tdx_bus_arrival"));
    }

    #[test]
    fn matching_ignores_case() {
        let summaries = vec![summary("news_query", &["News"])];
        let (matched, _) = keyword_fallback(&summaries, "latest NEWS please");
        assert!(matched);
    }

    #[test]
    fn no_match_is_neutral_conversation() {
        let summaries = vec![summary("weather_query", &["天氣"])];
        let (matched, payload) = keyword_fallback(&summaries, "你好");
        assert!(!matched);
        assert_eq!(payload, IntentPayload::conversation(Affect::Neutral));
    }
}
