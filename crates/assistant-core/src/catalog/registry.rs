use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::descriptor::{
    CapabilityDescriptor, CapabilityHandler, CapabilitySummary, WireDescriptor, WireNames,
};
use crate::catalog::metadata::{self, CapabilityMetadata, DEFAULT_PRIORITY};
use crate::catalog::schema;
use crate::error::CatalogError;

/// Plain record a capability implementation hands over at registration time.
///
/// Fields left as `None` are derived: the category from the capability name,
/// the location requirement from coordinate properties in the input schema.
#[derive(Clone, Default)]
pub struct CapabilityRecord {
    pub name: String,
    pub description: String,
    pub category: Option<String>,
    pub keywords: Vec<String>,
    pub examples: Vec<String>,
    pub negative_examples: Vec<String>,
    pub requires_location: Option<bool>,
    pub requires_auth: bool,
    pub is_complex: bool,
    pub priority: Option<i32>,
    pub aliases: Vec<String>,
    pub input_schema: Value,
    pub output_schema: Option<Value>,
    pub handler: Option<CapabilityHandler>,
}

impl CapabilityRecord {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: schema::empty_object_schema(),
            ..Self::default()
        }
    }

    /// Builds the descriptor, filling in derived metadata.
    pub fn into_descriptor(self) -> Result<CapabilityDescriptor, CatalogError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(CatalogError::InvalidRecord(
                "capability name must not be empty".to_string(),
            ));
        }

        let category = match self.category {
            Some(category) if !category.trim().is_empty() => category,
            _ => metadata::infer_category(&name).to_string(),
        };
        let capability_metadata = CapabilityMetadata {
            name,
            description: self.description,
            category,
            keywords: self.keywords,
            examples: self.examples,
            negative_examples: self.negative_examples,
            requires_location: false,
            requires_auth: self.requires_auth,
            is_complex: self.is_complex,
            priority: self.priority.unwrap_or(DEFAULT_PRIORITY),
            aliases: self.aliases,
        };
        let mut descriptor = CapabilityDescriptor::new(
            capability_metadata,
            self.input_schema,
            self.output_schema,
            self.handler,
        );
        let requires_location = self.requires_location.unwrap_or_else(|| {
            schema::declares_location(descriptor.input_schema())
                || metadata::requires_location_by_name(descriptor.name())
        });
        descriptor.set_requires_location(requires_location);
        Ok(descriptor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total: usize,
    pub disabled: usize,
    pub active: usize,
    /// Counts every registered capability, enabled or not.
    pub categories: BTreeMap<String, usize>,
}

#[derive(Default)]
struct CatalogState {
    order: Vec<String>,
    descriptors: HashMap<String, Arc<CapabilityDescriptor>>,
    disabled: HashSet<String>,
}

impl CatalogState {
    fn enabled(&self) -> impl Iterator<Item = &Arc<CapabilityDescriptor>> {
        self.order
            .iter()
            .filter(|name| !self.disabled.contains(*name))
            .filter_map(|name| self.descriptors.get(name))
    }
}

/// Store of capability descriptors, keyed by unique name.
///
/// Iteration follows registration order; re-registering a name replaces the
/// descriptor in place without moving it.
#[derive(Default)]
pub struct Catalog {
    state: RwLock<CatalogState>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces a descriptor by name.
    pub fn register(&self, descriptor: CapabilityDescriptor) {
        let name = descriptor.name().to_string();
        let mut state = self.state.write();
        if !state.descriptors.contains_key(&name) {
            state.order.push(name.clone());
        }
        state.descriptors.insert(name.clone(), Arc::new(descriptor));
        tracing::debug!(capability = %name, "registered capability");
    }

    /// Builds a descriptor from a plain record and registers it.
    pub fn register_record(&self, record: CapabilityRecord) -> Result<(), CatalogError> {
        let descriptor = record.into_descriptor()?;
        self.register(descriptor);
        Ok(())
    }

    pub fn unregister(&self, name: &str) -> bool {
        let mut state = self.state.write();
        if state.descriptors.remove(name).is_none() {
            return false;
        }
        state.order.retain(|entry| entry != name);
        state.disabled.remove(name);
        tracing::debug!(capability = %name, "unregistered capability");
        true
    }

    /// Hides a capability from lookups and exports. Returns false for unknown names.
    pub fn disable(&self, name: &str) -> bool {
        let mut state = self.state.write();
        if !state.descriptors.contains_key(name) {
            return false;
        }
        state.disabled.insert(name.to_string());
        tracing::debug!(capability = %name, "disabled capability");
        true
    }

    pub fn enable(&self, name: &str) -> bool {
        let mut state = self.state.write();
        if !state.descriptors.contains_key(name) {
            return false;
        }
        state.disabled.remove(name);
        tracing::debug!(capability = %name, "enabled capability");
        true
    }

    pub fn is_disabled(&self, name: &str) -> bool {
        self.state.read().disabled.contains(name)
    }

    /// Returns the descriptor unless it is unknown or disabled.
    pub fn get(&self, name: &str) -> Option<Arc<CapabilityDescriptor>> {
        let state = self.state.read();
        if state.disabled.contains(name) {
            return None;
        }
        state.descriptors.get(name).cloned()
    }

    /// Same as [`Catalog::get`], but reports the missing name as an error.
    pub fn require(&self, name: &str) -> Result<Arc<CapabilityDescriptor>, CatalogError> {
        self.get(name)
            .ok_or_else(|| CatalogError::UnknownCapability(name.to_string()))
    }

    /// Enabled descriptors, optionally restricted to categories and to
    /// capabilities that do not need a location.
    pub fn list_exportable(
        &self,
        categories: Option<&[String]>,
        include_location_capable: bool,
    ) -> Vec<Arc<CapabilityDescriptor>> {
        let state = self.state.read();
        let exportable = state
            .enabled()
            .filter(|descriptor| match categories {
                Some(categories) if !categories.is_empty() => categories
                    .iter()
                    .any(|category| category == descriptor.category()),
                _ => true,
            })
            .filter(|descriptor| include_location_capable || !descriptor.metadata().requires_location)
            .cloned()
            .collect();
        exportable
    }

    pub fn export(
        &self,
        categories: Option<&[String]>,
        include_location_capable: bool,
        strict: bool,
    ) -> Vec<WireDescriptor> {
        let mut names = WireNames::new();
        self.list_exportable(categories, include_location_capable)
            .iter()
            .map(|descriptor| descriptor.to_wire_named(strict, &mut names))
            .collect()
    }

    pub fn to_wire_schema(&self, descriptor: &CapabilityDescriptor, strict: bool) -> WireDescriptor {
        descriptor.to_wire(strict)
    }

    pub fn summarize(&self, descriptor: &CapabilityDescriptor) -> CapabilitySummary {
        descriptor.summarize()
    }

    /// Summaries of every enabled capability, in registration order.
    pub fn summaries(&self) -> Vec<CapabilitySummary> {
        let state = self.state.read();
        let summaries = state.enabled().map(|descriptor| descriptor.summarize()).collect();
        summaries
    }

    pub fn names(&self) -> Vec<String> {
        let state = self.state.read();
        let names = state
            .enabled()
            .map(|descriptor| descriptor.name().to_string())
            .collect();
        names
    }

    pub fn stats(&self) -> CatalogStats {
        let state = self.state.read();
        let mut categories: BTreeMap<String, usize> = BTreeMap::new();
        for descriptor in state.descriptors.values() {
            *categories.entry(descriptor.category().to_string()).or_insert(0) += 1;
        }
        let total = state.descriptors.len();
        let disabled = state.disabled.len();
        CatalogStats {
            total,
            disabled,
            active: total - disabled,
            categories,
        }
    }

    pub fn len(&self) -> usize {
        self.state.read().descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn weather_record() -> CapabilityRecord {
        CapabilityRecord {
            keywords: vec!["天氣".into(), "weather".into()],
            examples: vec!["台北天氣".into()],
            input_schema: json!({
                "type": "object",
                "properties": { "city": { "type": "string" } }
            }),
            ..CapabilityRecord::new("weather_query", "Current weather and forecast")
        }
    }

    fn bus_record() -> CapabilityRecord {
        CapabilityRecord {
            keywords: vec!["公車".into(), "bus".into()],
            input_schema: json!({
                "type": "object",
                "properties": {
                    "route_name": { "type": "string" },
                    "lat": { "type": "number" },
                    "lon": { "type": "number" }
                }
            }),
            ..CapabilityRecord::new("tdx_bus_arrival", "Bus arrival estimates")
        }
    }

    #[test]
    fn record_derives_category_and_location() {
        let descriptor = bus_record().into_descriptor().expect("descriptor");
        assert_eq!(descriptor.category(), "transportation");
        assert!(descriptor.metadata().requires_location);

        let descriptor = weather_record().into_descriptor().expect("descriptor");
        assert_eq!(descriptor.category(), "weather");
        assert!(!descriptor.metadata().requires_location);
    }

    #[test]
    fn known_location_capability_needs_location_without_coordinates() {
        let catalog = Catalog::new();
        catalog
            .register_record(CapabilityRecord {
                input_schema: json!({
                    "type": "object",
                    "properties": { "destination": { "type": "string" } }
                }),
                ..CapabilityRecord::new("directions", "Route planning")
            })
            .expect("register");
        catalog.register_record(weather_record()).expect("register");

        assert!(catalog.require("directions").expect("descriptor").metadata().requires_location);
        let exported = catalog.export(None, false, true);
        assert_eq!(exported.len(), 1);
        assert_eq!(exported[0].name(), "weather_query");
    }

    #[test]
    fn explicit_location_flag_wins_over_name() {
        let descriptor = CapabilityRecord {
            requires_location: Some(false),
            ..CapabilityRecord::new("tdx_metro", "Metro arrivals")
        }
        .into_descriptor()
        .expect("descriptor");
        assert!(!descriptor.metadata().requires_location);
    }

    #[test]
    fn flat_schema_is_normalized_before_location_check() {
        let descriptor = CapabilityRecord {
            input_schema: json!({ "lat": { "type": "number" }, "lon": { "type": "number" } }),
            ..CapabilityRecord::new("nearby_search", "Places nearby")
        }
        .into_descriptor()
        .expect("descriptor");

        assert_eq!(descriptor.input_schema()["type"], json!("object"));
        assert!(descriptor.metadata().requires_location);
    }

    #[test]
    fn record_with_empty_name_is_rejected() {
        let result = CapabilityRecord::new("  ", "nothing").into_descriptor();
        assert!(matches!(result, Err(CatalogError::InvalidRecord(_))));
    }

    #[test]
    fn register_twice_exports_identically() {
        let catalog = Catalog::new();
        catalog.register_record(weather_record()).expect("register");
        let first = catalog.export(None, true, true);

        catalog.register_record(weather_record()).expect("register");
        let second = catalog.export(None, true, true);

        assert_eq!(first, second);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn reregistration_keeps_position() {
        let catalog = Catalog::new();
        catalog.register_record(weather_record()).expect("register");
        catalog.register_record(bus_record()).expect("register");
        catalog.register_record(weather_record()).expect("register");

        assert_eq!(catalog.names(), vec!["weather_query", "tdx_bus_arrival"]);
    }

    #[test]
    fn disabled_capability_is_hidden() {
        let catalog = Catalog::new();
        catalog.register_record(weather_record()).expect("register");
        catalog.register_record(bus_record()).expect("register");

        assert!(catalog.disable("weather_query"));
        assert!(catalog.get("weather_query").is_none());
        assert!(catalog
            .export(None, true, true)
            .iter()
            .all(|wire| wire.name() != "weather_query"));
        assert!(catalog.summaries().iter().all(|s| s.name != "weather_query"));

        assert!(catalog.enable("weather_query"));
        assert!(catalog.get("weather_query").is_some());
    }

    #[test]
    fn toggling_unknown_capability_is_noop() {
        let catalog = Catalog::new();
        assert!(!catalog.disable("missing"));
        assert!(!catalog.enable("missing"));
        assert_eq!(catalog.stats().disabled, 0);
    }

    #[test]
    fn unregister_reports_presence() {
        let catalog = Catalog::new();
        catalog.register_record(weather_record()).expect("register");

        assert!(catalog.unregister("weather_query"));
        assert!(!catalog.unregister("weather_query"));
        assert!(catalog.is_empty());
    }

    #[test]
    fn export_filters_by_category_and_location() {
        let catalog = Catalog::new();
        catalog.register_record(weather_record()).expect("register");
        catalog.register_record(bus_record()).expect("register");

        let weather_only = catalog.export(Some(&["weather".to_string()]), true, true);
        assert_eq!(weather_only.len(), 1);
        assert_eq!(weather_only[0].name(), "weather_query");

        let without_location = catalog.export(None, false, true);
        assert_eq!(without_location.len(), 1);
        assert_eq!(without_location[0].name(), "weather_query");
    }

    #[test]
    fn strict_export_always_closes_schema() {
        let catalog = Catalog::new();
        catalog.register_record(weather_record()).expect("register");
        catalog.register_record(bus_record()).expect("register");
        catalog
            .register_record(CapabilityRecord {
                input_schema: json!({ "amount": { "type": "number", "default": 1 } }),
                ..CapabilityRecord::new("exchange_query", "Currency conversion")
            })
            .expect("register");

        for wire in catalog.export(None, true, true) {
            let parameters = &wire.function.parameters;
            assert_eq!(parameters["additionalProperties"], json!(false));
            let required = parameters["required"].as_array().expect("required");
            for (name, property) in parameters["properties"].as_object().expect("properties") {
                if property.get("default").is_none() {
                    assert!(required.contains(&json!(name)));
                }
            }
        }
    }

    #[test]
    fn malformed_schema_registers_with_empty_object() {
        let catalog = Catalog::new();
        catalog
            .register_record(CapabilityRecord {
                input_schema: json!({ "type": 7 }),
                ..CapabilityRecord::new("broken_tool", "Broken")
            })
            .expect("register");

        let descriptor = catalog.require("broken_tool").expect("descriptor");
        assert_eq!(descriptor.input_schema(), &schema::empty_object_schema());
    }

    #[test]
    fn stats_count_categories() {
        let catalog = Catalog::new();
        catalog.register_record(weather_record()).expect("register");
        catalog.register_record(bus_record()).expect("register");
        catalog.disable("tdx_bus_arrival");

        let stats = catalog.stats();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.disabled, 1);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.categories.get("transportation"), Some(&1));
        assert_eq!(stats.categories.get("weather"), Some(&1));
    }
}
