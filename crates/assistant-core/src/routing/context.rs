use std::collections::BTreeSet;

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Per-request routing context. Built for one resolution and then dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutingContext {
    pub location: Option<GeoPoint>,
    /// Hour of day, 0-23. The local wall clock is used when absent.
    pub hour: Option<u32>,
    pub user_id: Option<String>,
    pub detected_categories: BTreeSet<String>,
}

impl RoutingContext {
    pub fn for_user(user_id: Option<&str>) -> Self {
        Self {
            user_id: user_id.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn with_location(mut self, lat: f64, lon: f64) -> Self {
        self.location = Some(GeoPoint { lat, lon });
        self
    }

    pub fn with_hour(mut self, hour: u32) -> Self {
        self.hour = Some(hour);
        self
    }

    pub fn has_location(&self) -> bool {
        self.location.is_some()
    }
}
