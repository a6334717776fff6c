use std::{collections::HashMap, sync::Arc};

use rayon::prelude::*;

use crate::{
    model::Stop,
    shared::geo::{Coordinate, Distance, GRID_CELL_SIZE, LATITUDE_DISTANCE, LONGITUDE_DISTANCE},
};

/// Farthest a proximity search reaches; larger distances are clamped.
pub const MAX_SEARCH_DISTANCE: Distance = Distance::from_meters(50_000.0);

type CellToIds = HashMap<(i32, i32), Vec<Arc<str>>>;

/// Stops bucketed on a fixed grid for proximity lookups.
#[derive(Debug, Clone, Default)]
pub struct StopIndex {
    stops: HashMap<Arc<str>, Stop>,
    cells: CellToIds,
}

impl StopIndex {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Stop> {
        self.stops.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stop> {
        self.stops.values()
    }

    /// True when a stop that has not been saved yet is indexed.
    pub fn has_new(&self) -> bool {
        self.stops.values().any(Stop::is_new)
    }

    /// Inserts `stop`, replacing (and re-bucketing) any stop with the same id.
    pub fn insert(&mut self, stop: Stop) {
        self.remove(&stop.id);
        self.cells
            .entry(stop.coordinate.to_grid())
            .or_default()
            .push(stop.id.clone());
        self.stops.insert(stop.id.clone(), stop);
    }

    pub fn remove(&mut self, id: &str) -> Option<Stop> {
        let stop = self.stops.remove(id)?;
        let cell = stop.coordinate.to_grid();
        if let Some(ids) = self.cells.get_mut(&cell) {
            ids.retain(|other| &**other != id);
            if ids.is_empty() {
                self.cells.remove(&cell);
            }
        }
        Some(stop)
    }

    /// Closest stop whose latitude and longitude are both within `degrees` of `coordinate`.
    pub fn nearest_within_degrees(&self, coordinate: &Coordinate, degrees: f64) -> Option<&Stop> {
        let reach_x = (degrees * LONGITUDE_DISTANCE.as_meters() / GRID_CELL_SIZE.as_meters())
            .ceil() as i32;
        let reach_y = (degrees * LATITUDE_DISTANCE.as_meters() / GRID_CELL_SIZE.as_meters())
            .ceil() as i32;
        self.candidates(coordinate, reach_x, reach_y)
            .filter(|stop| stop.coordinate.within_degrees(coordinate, degrees))
            .min_by(|a, b| {
                let da = a.coordinate.euclidean_distance(coordinate).as_meters();
                let db = b.coordinate.euclidean_distance(coordinate).as_meters();
                da.total_cmp(&db)
            })
    }

    /// Stops within `distance` of `coordinate`, closest first. `distance` is
    /// clamped to [`MAX_SEARCH_DISTANCE`].
    pub fn stops_by_coordinate(&self, coordinate: &Coordinate, distance: Distance) -> Vec<&Stop> {
        let distance = if distance > MAX_SEARCH_DISTANCE {
            MAX_SEARCH_DISTANCE
        } else {
            distance
        };
        // Grid columns are not scaled by latitude, so they narrow towards the poles.
        let column_width = GRID_CELL_SIZE.as_meters()
            * f64::cos(f64::to_radians(coordinate.latitude)).abs().max(0.01);
        let reach_x = (distance.as_meters() / column_width).ceil() as i32;
        let reach_y = (distance / GRID_CELL_SIZE).as_meters().ceil() as i32;
        let (origin_x, origin_y) = coordinate.to_grid();
        let mut stops: Vec<(&Stop, f64)> = (-reach_x..=reach_x)
            .into_par_iter()
            .flat_map_iter(|x| {
                (-reach_y..=reach_y).flat_map(move |y| {
                    self.cells
                        .get(&(origin_x.saturating_add(x), origin_y.saturating_add(y)))
                        .into_iter()
                        .flatten()
                        .filter_map(|id| self.stops.get(id))
                        .filter_map(move |stop| {
                            let d = stop.coordinate.euclidean_distance(coordinate);
                            (d <= distance).then_some((stop, d.as_meters()))
                        })
                })
            })
            .collect();
        stops.par_sort_unstable_by(|(_, a), (_, b)| a.total_cmp(b));
        stops.into_iter().map(|(stop, _)| stop).collect()
    }

    fn candidates<'a>(
        &'a self,
        coordinate: &Coordinate,
        reach_x: i32,
        reach_y: i32,
    ) -> impl Iterator<Item = &'a Stop> + 'a {
        let (origin_x, origin_y) = coordinate.to_grid();
        (-reach_x..=reach_x)
            .flat_map(move |x| {
                (-reach_y..=reach_y)
                    .map(move |y| (origin_x.saturating_add(x), origin_y.saturating_add(y)))
            })
            .filter_map(|cell| self.cells.get(&cell))
            .flatten()
            .filter_map(|id| self.stops.get(id))
    }
}

impl FromIterator<Stop> for StopIndex {
    fn from_iter<T: IntoIterator<Item = Stop>>(iter: T) -> Self {
        let mut index = Self::new();
        iter.into_iter().for_each(|stop| index.insert(stop));
        index
    }
}

#[cfg(test)]
fn stop(id: &str, latitude: f64, longitude: f64) -> Stop {
    Stop {
        id: id.into(),
        coordinate: Coordinate::new(latitude, longitude),
        ..Default::default()
    }
}

#[test]
fn nearest_picks_closest_candidate() {
    let index: StopIndex = [
        stop("a", 40.7130, -74.0060),
        stop("b", 40.7134, -74.0060),
        stop("c", 40.7200, -74.0060),
    ]
    .into_iter()
    .collect();
    let found = index
        .nearest_within_degrees(&Coordinate::new(40.7133, -74.0060), 0.0005)
        .unwrap();
    assert_eq!(&*found.id, "b");
}

#[test]
fn reinserting_moves_between_cells() {
    let mut index = StopIndex::new();
    index.insert(stop("a", 10.0, 10.0));
    index.insert(stop("a", 20.0, 20.0));
    assert_eq!(index.len(), 1);
    assert!(
        index
            .nearest_within_degrees(&Coordinate::new(10.0, 10.0), 0.0005)
            .is_none()
    );
    assert!(
        index
            .nearest_within_degrees(&Coordinate::new(20.0, 20.0), 0.0005)
            .is_some()
    );
}

#[test]
fn stops_by_coordinate_sorted_by_distance() {
    let index: StopIndex = [
        stop("far", 59.3300, 18.0600),
        stop("near", 59.3294, 18.0686),
        stop("out", 59.4000, 18.0686),
    ]
    .into_iter()
    .collect();
    let origin = Coordinate::new(59.3293, 18.0686);
    let found: Vec<_> = index
        .stops_by_coordinate(&origin, Distance::from_meters(1000.0))
        .into_iter()
        .map(|stop| stop.id.to_string())
        .collect();
    assert_eq!(found, vec!["near", "far"]);
}

#[test]
fn huge_search_distance_is_clamped() {
    let index: StopIndex = [stop("a", 0.0, 0.0), stop("b", 1.0, 0.0)]
        .into_iter()
        .collect();
    let found: Vec<_> = index
        .stops_by_coordinate(&Coordinate::new(0.0, 0.0), Distance::from_meters(1e13))
        .into_iter()
        .map(|stop| stop.id.to_string())
        .collect();
    assert_eq!(found, vec!["a"]);
}
