//! In-memory feed store standing in for the editor's GTFS backend.

use std::{collections::HashMap, sync::Arc};

use thiserror::Error;
use tracing::{debug, info, warn};

mod source {
    mod gtfs;
}

use crate::{
    gtfs,
    map::StopIndex,
    model::{
        Calendar, Column, FeedSource, FeedValidation, Pattern, RowId, Route, Stop, StopDraft,
        TripRow,
    },
    service::{
        self, DeleteTripsRequest, PatternService, SaveOutcome, SaveTripsRequest, StopService,
        TripService,
    },
    shared::geo::{Bounds, Coordinate, Distance},
    store::{PatternRecord, PatternsResponse, RoutePatterns, Timetable},
};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Gtfs error: {0}")]
    Gtfs(#[from] gtfs::Error),
}

type IdToIndex = HashMap<Arc<str>, usize>;
type IdToIndexes = HashMap<Arc<str>, Vec<usize>>;
type TimetableKey = (Arc<str>, Arc<str>);

#[derive(Debug, Clone, Default)]
pub struct Repository {
    pub feed_id: Arc<str>,
    stops: StopIndex,
    routes: Vec<Route>,
    patterns: Vec<Pattern>,
    calendars: Vec<Calendar>,
    /// Trips keyed by (pattern id, calendar id).
    timetables: HashMap<TimetableKey, Vec<TripRow>>,

    route_lookup: IdToIndex,
    pattern_lookup: IdToIndex,
    calendar_lookup: IdToIndex,
    route_to_patterns: IdToIndexes,
    next_id: u64,
}

impl Repository {
    pub fn new(feed_id: impl Into<Arc<str>>) -> Self {
        Self {
            feed_id: feed_id.into(),
            ..Default::default()
        }
    }

    pub fn stops(&self) -> impl Iterator<Item = &Stop> {
        self.stops.iter()
    }

    pub fn stop_by_id(&self, id: &str) -> Option<&Stop> {
        self.stops.get(id)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn route_by_id(&self, id: &str) -> Option<&Route> {
        let index = self.route_lookup.get(id)?;
        Some(&self.routes[*index])
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn pattern_by_id(&self, id: &str) -> Option<&Pattern> {
        let index = self.pattern_lookup.get(id)?;
        Some(&self.patterns[*index])
    }

    pub fn patterns_by_route_id(&self, route_id: &str) -> Vec<&Pattern> {
        self.route_to_patterns
            .get(route_id)
            .map(|indexes| indexes.iter().map(|i| &self.patterns[*i]).collect())
            .unwrap_or_default()
    }

    pub fn calendars(&self) -> &[Calendar] {
        &self.calendars
    }

    pub fn calendar_by_id(&self, id: &str) -> Option<&Calendar> {
        let index = self.calendar_lookup.get(id)?;
        Some(&self.calendars[*index])
    }

    pub fn trips(&self, pattern_id: &str, calendar_id: &str) -> &[TripRow] {
        self.timetables
            .get(&(Arc::from(pattern_id), Arc::from(calendar_id)))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Timetable of a pattern under a calendar, `None` if either is unknown.
    pub fn timetable(
        &self,
        pattern_id: &str,
        calendar_id: &str,
        attributes: &[Arc<str>],
    ) -> Option<Timetable> {
        let pattern = self.pattern_by_id(pattern_id)?;
        self.calendar_by_id(calendar_id)?;
        Some(Timetable::new(
            Column::for_pattern(pattern, attributes),
            self.trips(pattern_id, calendar_id).to_vec(),
        ))
    }

    /// Stops within `distance`, closest first.
    pub fn stops_by_coordinate(&self, coordinate: &Coordinate, distance: Distance) -> Vec<&Stop> {
        self.stops.stops_by_coordinate(coordinate, distance)
    }

    pub fn stop_index(&self) -> &StopIndex {
        &self.stops
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let coordinates: Vec<Coordinate> = self.stops.iter().map(|stop| stop.coordinate).collect();
        Bounds::from_coordinates(&coordinates)
    }

    pub fn feed_source(&self, name: impl Into<Arc<str>>) -> FeedSource {
        FeedSource {
            id: self.feed_id.clone(),
            name: name.into(),
            url: None,
            latest_validation: Some(FeedValidation {
                bounds: self.bounds(),
            }),
        }
    }

    fn generate_id(&mut self, prefix: &str) -> Arc<str> {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id).into()
    }

    fn check_feed(&self, feed_id: &str) -> Result<(), service::Error> {
        if *self.feed_id != *feed_id {
            return Err(service::Error::UnknownFeed(feed_id.to_string()));
        }
        Ok(())
    }

    fn check_timetable(
        &self,
        feed_id: &str,
        pattern_id: &str,
        calendar_id: &str,
    ) -> Result<&Pattern, service::Error> {
        self.check_feed(feed_id)?;
        self.calendar_by_id(calendar_id)
            .ok_or_else(|| service::Error::UnknownCalendar(calendar_id.to_string()))?;
        self.pattern_by_id(pattern_id)
            .ok_or_else(|| service::Error::UnknownPattern(pattern_id.to_string()))
    }
}

impl StopService for Repository {
    fn create_stop(&mut self, draft: &StopDraft) -> Result<Stop, service::Error> {
        self.check_feed(&draft.feed_id)?;
        let stop = Stop {
            id: self.generate_id("stop"),
            feed_id: self.feed_id.clone(),
            name: draft.name.as_str().into(),
            code: None,
            coordinate: draft.coordinate,
        };
        info!("Created stop {} at {}", stop.id, stop.coordinate);
        self.stops.insert(stop.clone());
        Ok(stop)
    }
}

impl TripService for Repository {
    fn save_trips(&mut self, request: &SaveTripsRequest) -> Result<SaveOutcome, service::Error> {
        let stop_count = self
            .check_timetable(&request.feed_id, &request.pattern_id, &request.calendar_id)?
            .pattern_stops
            .len();
        let key = (request.pattern_id.clone(), request.calendar_id.clone());
        let mut outcome = SaveOutcome::default();
        for (position, trip) in request.trips.iter().enumerate() {
            if trip.stop_times.len() != stop_count || trip.pattern_id != request.pattern_id {
                warn!("Rejecting trip {} that does not fit its pattern", trip.id);
                outcome.failed.push(position);
                continue;
            }
            let mut trip = trip.clone();
            trip.calendar_id = Some(request.calendar_id.clone());
            match trip.id.clone() {
                RowId::New => {
                    let id = self.generate_id("trip");
                    trip.id = RowId::Persisted(id.clone());
                    trip.gtfs_trip_id.get_or_insert_with(|| id.to_string());
                    self.timetables.entry(key.clone()).or_default().push(trip);
                    outcome.assigned.push((position, id));
                }
                RowId::Persisted(id) => {
                    let existing = self
                        .timetables
                        .get_mut(&key)
                        .and_then(|trips| trips.iter_mut().find(|other| other.id == trip.id));
                    match existing {
                        Some(existing) => *existing = trip,
                        None => {
                            warn!("Cannot update unknown trip {id}");
                            outcome.failed.push(position);
                        }
                    }
                }
            }
        }
        debug!(
            "Saved {} trips, {} failed",
            request.trips.len() - outcome.failed.len(),
            outcome.failed.len()
        );
        Ok(outcome)
    }

    fn delete_trips(&mut self, request: &DeleteTripsRequest) -> Result<(), service::Error> {
        self.check_timetable(&request.feed_id, &request.pattern_id, &request.calendar_id)?;
        let key = (request.pattern_id.clone(), request.calendar_id.clone());
        if let Some(trips) = self.timetables.get_mut(&key) {
            let before = trips.len();
            trips.retain(|trip| !request.trips.iter().any(|other| other.id == trip.id));
            info!("Deleted {} trips", before - trips.len());
        }
        Ok(())
    }
}

impl PatternService for Repository {
    fn fetch_patterns(&self, feed_id: &str) -> Result<PatternsResponse, service::Error> {
        self.check_feed(feed_id)?;
        let routes = self
            .routes
            .iter()
            .map(|route| RoutePatterns {
                route_id: route.id.clone(),
                route_short_name: route.short_name.as_deref().map(str::to_string),
                route_long_name: route.long_name.as_deref().map(str::to_string),
                patterns: self
                    .patterns_by_route_id(&route.id)
                    .into_iter()
                    .map(|pattern| PatternRecord {
                        pattern_id: pattern.id.clone(),
                        name: Some(pattern.name.to_string()),
                        stops: pattern
                            .pattern_stops
                            .iter()
                            .map(|stop| stop.stop_id.clone())
                            .collect(),
                    })
                    .collect(),
            })
            .collect();
        Ok(PatternsResponse { routes })
    }
}
