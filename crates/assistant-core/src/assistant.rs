use std::sync::Arc;

use serde_json::Value;

use crate::catalog::{
    CapabilityDescriptor, CapabilityHandler, CapabilityMetadata, CapabilityRecord,
    CapabilitySummary, Catalog, CatalogStats, WireDescriptor,
};
use crate::classifier::Classifier;
use crate::error::CoreResult;
use crate::intent::{IntentResolver, Resolution};
use crate::routing::{CapabilityRouter, RoutingContext, UserPreferenceLedger};
use crate::settings::{ResolverSettings, SettingsStore};

/// Primary facade for the decision layer.
///
/// Owns the catalog, router and resolver and shares the catalog and router
/// between them by reference.
pub struct AssistantCore {
    catalog: Arc<Catalog>,
    router: Arc<CapabilityRouter>,
    resolver: IntentResolver,
}

impl AssistantCore {
    /// Create a core with default settings and an empty catalog.
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self::with_settings(classifier, ResolverSettings::default())
    }

    pub fn with_settings(classifier: Arc<dyn Classifier>, settings: ResolverSettings) -> Self {
        let catalog = Arc::new(Catalog::new());
        let ledger = Arc::new(UserPreferenceLedger::new());
        let router = Arc::new(CapabilityRouter::with_settings(
            ledger,
            settings.router.clone(),
        ));
        Self::with_state(catalog, router, classifier, settings)
    }

    /// Create a core from persisted settings, overlaid with `ASSISTANT_*`
    /// environment variables.
    pub fn from_store(classifier: Arc<dyn Classifier>, store: &SettingsStore) -> CoreResult<Self> {
        let settings = store.load()?.with_env_overrides();
        Ok(Self::with_settings(classifier, settings))
    }

    /// Create a core around existing components (for testing or custom routers).
    pub fn with_state(
        catalog: Arc<Catalog>,
        router: Arc<CapabilityRouter>,
        classifier: Arc<dyn Classifier>,
        settings: ResolverSettings,
    ) -> Self {
        let resolver = IntentResolver::new(catalog.clone(), router.clone(), classifier, settings);
        Self {
            catalog,
            router,
            resolver,
        }
    }

    /// Resolve an utterance into `(matched, payload)`. Never fails.
    pub async fn resolve(
        &self,
        utterance: &str,
        user_id: Option<&str>,
        include_location_capable: bool,
    ) -> Resolution {
        self.resolver
            .resolve(utterance, user_id, include_location_capable)
            .await
    }

    pub async fn resolve_with_context(
        &self,
        utterance: &str,
        context: RoutingContext,
        include_location_capable: bool,
    ) -> Resolution {
        self.resolver
            .resolve_with_context(utterance, context, include_location_capable)
            .await
    }

    pub fn register_capability(
        &self,
        metadata: CapabilityMetadata,
        input_schema: Value,
        output_schema: Option<Value>,
        handler: Option<CapabilityHandler>,
    ) {
        self.catalog.register(CapabilityDescriptor::new(
            metadata,
            input_schema,
            output_schema,
            handler,
        ));
    }

    pub fn register(&self, record: CapabilityRecord) -> CoreResult<()> {
        self.catalog.register_record(record)?;
        Ok(())
    }

    pub fn unregister(&self, name: &str) -> bool {
        self.catalog.unregister(name)
    }

    pub fn enable(&self, name: &str) -> bool {
        self.catalog.enable(name)
    }

    pub fn disable(&self, name: &str) -> bool {
        self.catalog.disable(name)
    }

    pub fn export_capabilities(
        &self,
        categories: Option<&[String]>,
        include_location_capable: bool,
        strict: bool,
    ) -> Vec<WireDescriptor> {
        self.catalog
            .export(categories, include_location_capable, strict)
    }

    /// Call once a resolved capability was actually dispatched.
    pub fn record_usage(&self, user_id: &str, capability: &str) {
        self.router.record_usage(user_id, capability);
    }

    pub fn get_stats(&self) -> CatalogStats {
        self.catalog.stats()
    }

    pub fn capability_names(&self) -> Vec<String> {
        self.catalog.names()
    }

    pub fn summaries(&self) -> Vec<CapabilitySummary> {
        self.catalog.summaries()
    }

    pub fn clear_cache(&self) {
        self.resolver.clear_cache();
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn router(&self) -> &Arc<CapabilityRouter> {
        &self.router
    }

    pub fn resolver(&self) -> &IntentResolver {
        &self.resolver
    }
}
