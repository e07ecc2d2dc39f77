use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use chrono::Timelike;

use crate::catalog::CapabilityDescriptor;
use crate::routing::context::RoutingContext;
use crate::routing::ledger::UserPreferenceLedger;
use crate::settings::RouterSettings;

/// Fixed category -> keyword table used for category detection.
pub const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "weather",
        &["天氣", "氣溫", "下雨", "晴天", "陰天", "weather", "溫度", "濕度"],
    ),
    (
        "transportation",
        &[
            "公車", "巴士", "bus", "火車", "台鐵", "高鐵", "捷運", "metro", "youbike", "ubike",
            "微笑單車", "共享單車", "停車場", "停車位",
        ],
    ),
    (
        "location",
        &["我在哪", "這是哪", "位置", "地址", "怎麼去", "導航", "路線"],
    ),
    ("information", &["新聞", "消息", "報導", "news"]),
    (
        "finance",
        &["匯率", "換算", "美元", "日圓", "歐元", "currency", "exchange"],
    ),
    ("health", &["心率", "步數", "血氧", "睡眠", "健康", "運動"]),
];

const DEFAULT_NIGHT_EXCLUDED: &[&str] = &["tdx_bus_arrival", "tdx_metro"];

const DEFAULT_PRIORITIES: &[(&str, i32)] = &[
    ("weather_query", 1),
    ("reverse_geocode", 2),
    ("forward_geocode", 3),
    ("directions", 4),
    ("tdx_bus_arrival", 5),
    ("tdx_youbike", 6),
    ("tdx_metro", 7),
    ("tdx_train", 8),
    ("tdx_thsr", 9),
    ("news_query", 10),
    ("exchange_query", 11),
    ("healthkit_query", 12),
    ("tdx_parking", 13),
];

/// A capability that survived filtering, with its rank score.
#[derive(Debug, Clone)]
pub struct RankedCapability {
    pub descriptor: Arc<CapabilityDescriptor>,
    /// Lower sorts first.
    pub score: i64,
    pub explanation: String,
}

/// Result of a routing pass.
#[derive(Debug, Clone)]
pub struct RoutingResult {
    pub candidates: Vec<RankedCapability>,
    pub detected_categories: BTreeSet<String>,
    /// Size ceiling applied to `candidates`.
    pub ceiling: usize,
}

impl RoutingResult {
    pub fn descriptors(&self) -> Vec<Arc<CapabilityDescriptor>> {
        self.candidates
            .iter()
            .map(|candidate| candidate.descriptor.clone())
            .collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.candidates
            .iter()
            .map(|candidate| candidate.descriptor.name())
            .collect()
    }
}

/// Filters and ranks catalog capabilities for one utterance so the
/// classifier only sees a bounded, relevant subset.
pub struct CapabilityRouter {
    ledger: Arc<UserPreferenceLedger>,
    night_excluded: HashSet<String>,
    priorities: HashMap<String, i32>,
    settings: RouterSettings,
}

impl CapabilityRouter {
    pub fn new(ledger: Arc<UserPreferenceLedger>) -> Self {
        Self::with_settings(ledger, RouterSettings::default())
    }

    pub fn with_settings(ledger: Arc<UserPreferenceLedger>, settings: RouterSettings) -> Self {
        Self {
            ledger,
            night_excluded: DEFAULT_NIGHT_EXCLUDED.iter().map(|s| s.to_string()).collect(),
            priorities: DEFAULT_PRIORITIES
                .iter()
                .map(|(name, priority)| (name.to_string(), *priority))
                .collect(),
            settings,
        }
    }

    /// Replaces the set of capabilities dropped during the night window.
    pub fn with_night_excluded<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.night_excluded = names.into_iter().map(Into::into).collect();
        self
    }

    /// Overrides the static priority of one capability.
    pub fn with_priority(mut self, name: impl Into<String>, priority: i32) -> Self {
        self.priorities.insert(name.into(), priority);
        self
    }

    pub fn ledger(&self) -> &Arc<UserPreferenceLedger> {
        &self.ledger
    }

    /// Categories whose table keywords occur in the utterance (case-insensitive).
    pub fn detect_categories(&self, utterance: &str) -> BTreeSet<String> {
        let utterance_lower = utterance.to_lowercase();
        CATEGORY_KEYWORDS
            .iter()
            .filter(|(_, keywords)| {
                keywords
                    .iter()
                    .any(|keyword| utterance_lower.contains(&keyword.to_lowercase()))
            })
            .map(|(category, _)| category.to_string())
            .collect()
    }

    /// Filters, ranks and truncates `capabilities` for `utterance`.
    ///
    /// Scoring (lower first):
    /// - static priority (table entry, else the capability's own priority)
    /// - minus the category bonus when the capability's category was detected
    /// - minus the user's usage count, capped
    ///
    /// The sort is stable, so ties keep catalog order.
    pub fn filter_and_rank(
        &self,
        capabilities: &[Arc<CapabilityDescriptor>],
        utterance: &str,
        context: &RoutingContext,
    ) -> RoutingResult {
        let utterance_lower = utterance.to_lowercase();

        let mut detected = self.detect_categories(utterance);
        detected.extend(context.detected_categories.iter().cloned());
        for descriptor in capabilities {
            if descriptor.metadata().matching_keyword(&utterance_lower).is_some() {
                detected.insert(descriptor.category().to_string());
            }
        }
        tracing::debug!(categories = ?detected, "detected categories");

        let hour = context
            .hour
            .unwrap_or_else(|| chrono::Local::now().hour());
        let is_night = self.is_night(hour);

        let mut candidates: Vec<RankedCapability> = capabilities
            .iter()
            .filter(|descriptor| {
                if descriptor.metadata().requires_location && !context.has_location() {
                    // The capability reports the missing location itself.
                    tracing::debug!(
                        capability = %descriptor.name(),
                        "location missing; passing capability through"
                    );
                }
                if is_night && self.night_excluded.contains(descriptor.name()) {
                    tracing::debug!(
                        capability = %descriptor.name(),
                        hour,
                        "skipping capability during night window"
                    );
                    return false;
                }
                true
            })
            .map(|descriptor| self.rank(descriptor, &detected, context))
            .collect();

        candidates.sort_by_key(|candidate| candidate.score);

        let ceiling = self.ceiling(&detected);
        if candidates.len() > ceiling {
            tracing::info!(
                from = candidates.len(),
                to = ceiling,
                "truncating routed capabilities"
            );
            candidates.truncate(ceiling);
        }

        let result = RoutingResult {
            candidates,
            detected_categories: detected,
            ceiling,
        };
        tracing::info!(capabilities = ?result.names(), "routed capabilities");
        result
    }

    /// Records that `capability` was actually selected for `user_id`.
    pub fn record_usage(&self, user_id: &str, capability: &str) {
        let count = self.ledger.record(user_id, capability);
        tracing::debug!(user_id = %user_id, capability = %capability, count, "recorded capability usage");
    }

    pub fn usage_count(&self, user_id: &str, capability: &str) -> u64 {
        self.ledger.count(user_id, capability)
    }

    fn rank(
        &self,
        descriptor: &Arc<CapabilityDescriptor>,
        detected: &BTreeSet<String>,
        context: &RoutingContext,
    ) -> RankedCapability {
        let mut explanations: Vec<String> = Vec::new();

        let base = self
            .priorities
            .get(descriptor.name())
            .copied()
            .unwrap_or(descriptor.metadata().priority);
        let mut score = i64::from(base);
        explanations.push(format!("priority {base}"));

        if detected.contains(descriptor.category()) {
            score -= i64::from(self.settings.category_bonus);
            explanations.push(format!("category match: {}", descriptor.category()));
        }

        if let Some(user_id) = context.user_id.as_deref() {
            let usage = self
                .ledger
                .count(user_id, descriptor.name())
                .min(self.settings.usage_bonus_cap);
            if usage > 0 {
                score -= usage as i64;
                explanations.push(format!("usage bonus {usage}"));
            }
        }

        RankedCapability {
            descriptor: descriptor.clone(),
            score,
            explanation: explanations.join("; "),
        }
    }

    fn is_night(&self, hour: u32) -> bool {
        hour >= self.settings.night_start_hour && hour < self.settings.night_end_hour
    }

    fn ceiling(&self, detected: &BTreeSet<String>) -> usize {
        match detected.len() {
            0 => self.settings.max_candidates_undetected,
            1 => self.settings.max_candidates_single,
            _ => self.settings.max_candidates_multiple,
        }
    }
}
