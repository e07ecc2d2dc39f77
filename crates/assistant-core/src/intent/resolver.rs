use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use crate::catalog::{Catalog, WireDescriptor, WireNames};
use crate::classifier::{Classifier, ClassifierRequest};
use crate::effort::{effort_for, TaskKind};
use crate::intent::cache::IntentCache;
use crate::intent::fallback::keyword_fallback;
use crate::intent::parse::parse_response;
use crate::intent::prompt::build_instruction;
use crate::intent::resolution::{
    IntentPayload, Resolution, ResolutionSource, FEATURE_LIST_COMMAND,
};
use crate::routing::{CapabilityRouter, RoutingContext};
use crate::settings::ResolverSettings;

/// Turns an utterance into at most one capability call.
///
/// Pipeline: cache lookup, special-command check, routing, classification,
/// and keyword fallback when the classifier fails. Every path that reaches a
/// decision writes the cache under the same key.
pub struct IntentResolver {
    catalog: Arc<Catalog>,
    router: Arc<CapabilityRouter>,
    classifier: Arc<dyn Classifier>,
    cache: IntentCache,
    settings: ResolverSettings,
}

impl IntentResolver {
    pub fn new(
        catalog: Arc<Catalog>,
        router: Arc<CapabilityRouter>,
        classifier: Arc<dyn Classifier>,
        settings: ResolverSettings,
    ) -> Self {
        let cache = IntentCache::from_settings(&settings.cache);
        Self {
            catalog,
            router,
            classifier,
            cache,
            settings,
        }
    }

    /// Replaces the cache, e.g. with one using a shorter TTL.
    pub fn with_cache(mut self, cache: IntentCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    pub async fn resolve(
        &self,
        utterance: &str,
        user_id: Option<&str>,
        include_location_capable: bool,
    ) -> Resolution {
        self.resolve_with_context(
            utterance,
            RoutingContext::for_user(user_id),
            include_location_capable,
        )
        .await
    }

    /// Resolves an utterance. Never fails: classifier errors fall back to
    /// keyword matching.
    pub async fn resolve_with_context(
        &self,
        utterance: &str,
        context: RoutingContext,
        include_location_capable: bool,
    ) -> Resolution {
        let resolution_id = Uuid::now_v7();
        let span = tracing::info_span!(
            "resolve_intent",
            %resolution_id,
            user_id = context.user_id.as_deref().unwrap_or("-")
        );
        self.run_pipeline(utterance, context, include_location_capable)
            .instrument(span)
            .await
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::info!("intent cache cleared");
    }

    pub fn cache_len(&self) -> u64 {
        self.cache.len()
    }

    async fn run_pipeline(
        &self,
        utterance: &str,
        context: RoutingContext,
        include_location_capable: bool,
    ) -> Resolution {
        if let Some(entry) = self.cache.get(utterance) {
            tracing::debug!("intent cache hit");
            return Resolution::new(entry.matched, entry.payload, ResolutionSource::Cache);
        }

        tracing::info!(chars = utterance.chars().count(), "resolving intent");

        let resolution = match self.check_special_commands(utterance) {
            Some(resolution) => resolution,
            None => self.classify(utterance, &context, include_location_capable).await,
        };

        self.cache
            .insert(utterance, resolution.matched, resolution.payload.clone());
        resolution
    }

    fn check_special_commands(&self, utterance: &str) -> Option<Resolution> {
        let phrase = self
            .settings
            .special_commands
            .iter()
            .find(|phrase| !phrase.is_empty() && utterance.contains(phrase.as_str()))?;
        tracing::info!(phrase = %phrase, "special command");
        Some(Resolution::new(
            true,
            IntentPayload::SpecialCommand {
                command: FEATURE_LIST_COMMAND.to_string(),
            },
            ResolutionSource::Special,
        ))
    }

    async fn classify(
        &self,
        utterance: &str,
        context: &RoutingContext,
        include_location_capable: bool,
    ) -> Resolution {
        let exportable = self.catalog.list_exportable(None, include_location_capable);
        let routed = self.router.filter_and_rank(&exportable, utterance, context);

        if routed.candidates.is_empty() {
            tracing::warn!("no capabilities available; skipping classifier");
            return Resolution::unmatched(ResolutionSource::NoCandidates);
        }

        let mut wire_names = WireNames::new();
        let capabilities: Vec<WireDescriptor> = routed
            .candidates
            .iter()
            .map(|candidate| candidate.descriptor.to_wire_named(true, &mut wire_names))
            .collect();
        let effort = effort_for(&TaskKind::IntentClassification, None, None);
        tracing::info!(effort = %effort, capabilities = capabilities.len(), "calling classifier");

        let request = ClassifierRequest {
            instruction: build_instruction(),
            utterance: utterance.to_string(),
            capabilities,
            effort,
            model: self.settings.model(),
        };

        match self.classifier.classify(request).await {
            Ok(mut response) => {
                for invocation in &mut response.invocations {
                    let original = wire_names.original(&invocation.capability_name).to_string();
                    invocation.capability_name = original;
                }
                let (matched, payload) = parse_response(&response);
                Resolution::new(matched, payload, ResolutionSource::Classifier)
            }
            Err(error) => {
                tracing::warn!(error = %error, "classifier failed; using keyword fallback");
                let (matched, payload) = keyword_fallback(&self.catalog.summaries(), utterance);
                Resolution::new(matched, payload, ResolutionSource::Fallback)
            }
        }
    }
}
