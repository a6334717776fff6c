use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::route_name;

/// Progress of a remote fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchStatus {
    pub fetched: bool,
    pub fetching: bool,
    pub error: bool,
}

impl FetchStatus {
    pub const IDLE: Self = Self {
        fetched: false,
        fetching: false,
        error: false,
    };
    pub const FETCHING: Self = Self {
        fetched: false,
        fetching: true,
        error: false,
    };
    pub const FETCHED: Self = Self {
        fetched: true,
        fetching: false,
        error: false,
    };
    pub const FAILED: Self = Self {
        fetched: false,
        fetching: false,
        error: true,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternsResponse {
    #[serde(default)]
    pub routes: Vec<RoutePatterns>,
}

/// A route as returned by the patterns query, with its patterns nested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePatterns {
    pub route_id: Arc<str>,
    pub route_short_name: Option<String>,
    pub route_long_name: Option<String>,
    #[serde(default)]
    pub patterns: Vec<PatternRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRecord {
    pub pattern_id: Arc<str>,
    pub name: Option<String>,
    #[serde(default)]
    pub stops: Vec<Arc<str>>,
}

/// A pattern annotated with the route it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternEntry {
    pub pattern_id: Arc<str>,
    pub name: Option<String>,
    pub stops: Vec<Arc<str>>,
    pub route_id: Arc<str>,
    pub route_name: String,
}

impl PatternsResponse {
    /// Flattens every route's patterns into one list, keeping route order.
    pub fn flatten(self) -> Vec<PatternEntry> {
        self.routes
            .into_iter()
            .flat_map(|route| {
                let route_name = route_name(
                    &route.route_id,
                    route.route_short_name.as_deref(),
                    route.route_long_name.as_deref(),
                );
                let route_id = route.route_id;
                route
                    .patterns
                    .into_iter()
                    .map(move |pattern| PatternEntry {
                        pattern_id: pattern.pattern_id,
                        name: pattern.name,
                        stops: pattern.stops,
                        route_id: route_id.clone(),
                        route_name: route_name.clone(),
                    })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatternsAction {
    /// A different feed version became active; everything loaded is stale.
    SetActiveFeedVersion,
    FetchPatterns,
    FetchPatternsRejected,
    FetchPatternsFulfilled(Option<PatternsResponse>),
    /// Patterns that were already flattened elsewhere.
    ReceivedGtfsElements(Vec<PatternEntry>),
    RouteFilterChange(Option<Arc<str>>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternsState {
    pub route_filter: Option<Arc<str>>,
    pub fetch_status: FetchStatus,
    pub data: Vec<PatternEntry>,
}

impl PatternsState {
    pub fn apply(&mut self, action: PatternsAction) {
        match action {
            PatternsAction::SetActiveFeedVersion => *self = Self::default(),
            PatternsAction::FetchPatterns => {
                self.fetch_status = FetchStatus::FETCHING;
                self.data.clear();
            }
            PatternsAction::FetchPatternsRejected => self.fetch_status = FetchStatus::FAILED,
            PatternsAction::ReceivedGtfsElements(patterns) => {
                self.fetch_status = FetchStatus::FETCHED;
                self.data = patterns;
            }
            PatternsAction::FetchPatternsFulfilled(response) => {
                self.fetch_status = FetchStatus::FETCHED;
                self.data = response.map(PatternsResponse::flatten).unwrap_or_default();
                debug!("Received {} patterns", self.data.len());
            }
            PatternsAction::RouteFilterChange(filter) => self.route_filter = filter,
        }
    }

    /// Patterns passing the current route filter.
    pub fn visible(&self) -> impl Iterator<Item = &PatternEntry> {
        self.data.iter().filter(|pattern| match &self.route_filter {
            Some(route_id) => pattern.route_id == *route_id,
            None => true,
        })
    }
}
