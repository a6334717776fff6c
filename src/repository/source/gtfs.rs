use crate::{
    gtfs::{self, Gtfs, GtfsStopTime, GtfsTrip},
    model::{Calendar, Pattern, PatternStop, RowId, Route, Stop, StopTimeCell, TripRow},
    repository::Repository,
    shared::{
        geo::Coordinate,
        time::{Duration, Time},
    },
};
use chrono::NaiveDate;
use rayon::prelude::*;
use std::{collections::HashMap, sync::Arc, time::Instant};
use tracing::{debug, warn};

const GTFS_DATE_FORMAT: &str = "%Y%m%d";

type TripToStopTimes = HashMap<Arc<str>, Vec<GtfsStopTime>>;

impl Repository {
    pub fn load_gtfs(mut self, gtfs: &Gtfs) -> Result<Self, crate::repository::Error> {
        self.load_stops(gtfs)?;
        self.load_routes(gtfs)?;
        self.load_calendars(gtfs)?;
        let trips = self.load_trips(gtfs)?;
        let stop_times = self.load_stop_times(gtfs)?;
        self.generate_patterns(trips, stop_times);
        Ok(self)
    }

    fn load_stops(&mut self, gtfs: &Gtfs) -> Result<(), gtfs::Error> {
        debug!("Loading stops...");
        let now = Instant::now();
        let feed_id = self.feed_id.clone();
        gtfs.stream_stops(|(_, stop)| {
            self.stops.insert(Stop {
                id: stop.stop_id.into(),
                feed_id: feed_id.clone(),
                name: stop.stop_name.unwrap_or_default().into(),
                code: stop.stop_code.map(Into::into),
                coordinate: Coordinate::new(stop.stop_lat, stop.stop_lon),
            });
        })?;
        debug!("Loading stops took {:?}", now.elapsed());
        Ok(())
    }

    fn load_routes(&mut self, gtfs: &Gtfs) -> Result<(), gtfs::Error> {
        debug!("Loading routes...");
        let now = Instant::now();
        let mut routes: Vec<Route> = Vec::new();
        gtfs.stream_routes(|(_, route)| {
            routes.push(Route {
                id: route.route_id.into(),
                short_name: route.route_short_name.map(Into::into),
                long_name: route.route_long_name.map(Into::into),
                route_type: route.route_type,
            });
        })?;
        self.route_lookup = routes
            .iter()
            .enumerate()
            .map(|(i, route)| (route.id.clone(), i))
            .collect();
        self.routes = routes;
        debug!("Loading routes took {:?}", now.elapsed());
        Ok(())
    }

    fn load_calendars(&mut self, gtfs: &Gtfs) -> Result<(), gtfs::Error> {
        debug!("Loading calendars...");
        let now = Instant::now();
        let mut calendars: Vec<Calendar> = Vec::new();
        gtfs.stream_calendar(|(_, calendar)| {
            let start_date = NaiveDate::parse_from_str(&calendar.start_date, GTFS_DATE_FORMAT);
            let end_date = NaiveDate::parse_from_str(&calendar.end_date, GTFS_DATE_FORMAT);
            let (Ok(start_date), Ok(end_date)) = (start_date, end_date) else {
                warn!("Skipping calendar {} with invalid dates", calendar.service_id);
                return;
            };
            calendars.push(Calendar {
                id: calendar.service_id.into(),
                days: [
                    calendar.monday,
                    calendar.tuesday,
                    calendar.wednesday,
                    calendar.thursday,
                    calendar.friday,
                    calendar.saturday,
                    calendar.sunday,
                ]
                .map(|day| day == 1),
                start_date,
                end_date,
            });
        })?;
        self.calendar_lookup = calendars
            .iter()
            .enumerate()
            .map(|(i, calendar)| (calendar.id.clone(), i))
            .collect();
        self.calendars = calendars;
        debug!("Loading calendars took {:?}", now.elapsed());
        Ok(())
    }

    fn load_trips(&mut self, gtfs: &Gtfs) -> Result<Vec<GtfsTrip>, gtfs::Error> {
        debug!("Loading trips...");
        let now = Instant::now();
        let mut trips: Vec<GtfsTrip> = Vec::new();
        gtfs.stream_trips(|(_, trip)| {
            if self.route_lookup.contains_key(trip.route_id.as_str()) {
                trips.push(trip);
            } else {
                warn!("Skipping trip {} of unknown route {}", trip.trip_id, trip.route_id);
            }
        })?;
        debug!("Loading trips took {:?}", now.elapsed());
        Ok(trips)
    }

    fn load_stop_times(&mut self, gtfs: &Gtfs) -> Result<TripToStopTimes, gtfs::Error> {
        debug!("Loading stop times...");
        let now = Instant::now();
        let mut trip_to_stop_times: TripToStopTimes = HashMap::new();
        gtfs.stream_stop_times(|(_, stop_time)| {
            trip_to_stop_times
                .entry(stop_time.trip_id.as_str().into())
                .or_default()
                .push(stop_time);
        })?;
        trip_to_stop_times
            .par_iter_mut()
            .for_each(|(_, stop_times)| stop_times.sort_by_key(|stop_time| stop_time.stop_sequence));
        debug!("Loading stop times took {:?}", now.elapsed());
        Ok(trip_to_stop_times)
    }

    /// Trips of a route that visit the same stops in the same order share a pattern.
    fn generate_patterns(&mut self, trips: Vec<GtfsTrip>, mut stop_times: TripToStopTimes) {
        debug!("Generating patterns...");
        let now = Instant::now();
        let mut signature_to_pattern: HashMap<(Arc<str>, Vec<Arc<str>>), usize> = HashMap::new();
        let mut patterns: Vec<Pattern> = Vec::new();
        let mut route_to_patterns: HashMap<Arc<str>, Vec<usize>> = HashMap::new();

        for trip in trips {
            let Some(trip_stop_times) = stop_times.remove(trip.trip_id.as_str()) else {
                warn!("Skipping trip {} without stop times", trip.trip_id);
                continue;
            };
            let route_id: Arc<str> = trip.route_id.as_str().into();
            let signature: Vec<Arc<str>> = trip_stop_times
                .iter()
                .map(|stop_time| stop_time.stop_id.as_str().into())
                .collect();

            let pattern_index = *signature_to_pattern
                .entry((route_id.clone(), signature))
                .or_insert_with(|| {
                    let route_patterns = route_to_patterns.entry(route_id.clone()).or_default();
                    route_patterns.push(patterns.len());
                    patterns.push(self.build_pattern(
                        &route_id,
                        route_patterns.len(),
                        &trip_stop_times,
                    ));
                    patterns.len() - 1
                });

            let pattern = &patterns[pattern_index];
            let row = TripRow {
                id: RowId::Persisted(trip.trip_id.as_str().into()),
                gtfs_trip_id: Some(trip.trip_id),
                block_id: trip.block_id,
                trip_headsign: trip.trip_headsign,
                use_frequency: pattern.use_frequency,
                feed_id: self.feed_id.clone(),
                pattern_id: pattern.id.clone(),
                route_id,
                calendar_id: Some(trip.service_id.as_str().into()),
                stop_times: trip_stop_times
                    .iter()
                    .map(|stop_time| StopTimeCell {
                        stop_id: stop_time.stop_id.as_str().into(),
                        arrival_time: parse_time(stop_time.arrival_time.as_deref()),
                        departure_time: parse_time(stop_time.departure_time.as_deref()),
                    })
                    .collect(),
                attributes: Default::default(),
            };
            self.timetables
                .entry((pattern.id.clone(), trip.service_id.into()))
                .or_default()
                .push(row);
        }

        self.pattern_lookup = patterns
            .iter()
            .enumerate()
            .map(|(i, pattern)| (pattern.id.clone(), i))
            .collect();
        self.route_to_patterns = route_to_patterns;
        self.patterns = patterns;
        debug!(
            "Generating {} patterns took {:?}",
            self.patterns.len(),
            now.elapsed()
        );
    }

    /// Default times come from the first trip seen with the stop sequence.
    fn build_pattern(&self, route_id: &Arc<str>, n: usize, stop_times: &[GtfsStopTime]) -> Pattern {
        let first = stop_times
            .first()
            .and_then(|stop_time| self.stop_by_id(&stop_time.stop_id));
        let last = stop_times
            .last()
            .and_then(|stop_time| self.stop_by_id(&stop_time.stop_id));
        let name = match (first, last) {
            (Some(first), Some(last)) => format!("{} to {}", first.name, last.name),
            _ => format!("Pattern {n}"),
        };

        let mut previous_departure: Option<Time> = None;
        let pattern_stops = stop_times
            .iter()
            .map(|stop_time| {
                let arrival = parse_time(stop_time.arrival_time.as_deref());
                let departure = parse_time(stop_time.departure_time.as_deref()).or(arrival);
                let travel = match (previous_departure, arrival) {
                    (Some(previous), Some(arrival)) => non_negative(arrival - previous),
                    _ => Duration::default(),
                };
                let dwell = match (arrival, departure) {
                    (Some(arrival), Some(departure)) => non_negative(departure - arrival),
                    _ => Duration::default(),
                };
                if departure.is_some() {
                    previous_departure = departure;
                }
                PatternStop {
                    stop_id: stop_time.stop_id.as_str().into(),
                    default_travel_time: travel,
                    default_dwell_time: dwell,
                    timepoint: stop_time.timepoint.map(|timepoint| timepoint == 1),
                }
            })
            .collect();

        Pattern {
            id: format!("{route_id}-{n}").into(),
            route_id: route_id.clone(),
            name: name.into(),
            use_frequency: false,
            pattern_stops,
        }
    }
}

fn parse_time(value: Option<&str>) -> Option<Time> {
    value.filter(|value| !value.is_empty()).and_then(Time::from_hms)
}

fn non_negative(seconds: i32) -> Duration {
    Duration::from_seconds(seconds.max(0) as u32)
}
