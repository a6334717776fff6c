use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::shared::{
    geo::{Bounds, Coordinate},
    time::Duration,
};

/// A physical point where passengers can board or alight from a vehicle.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    /// Unique external identifier. Unsaved stops carry [`crate::model::NEW_ID`].
    pub id: Arc<str>,
    pub feed_id: Arc<str>,
    /// Human-readable name (e.g., "Main St & 4th Ave").
    pub name: Arc<str>,
    pub code: Option<Arc<str>>,
    pub coordinate: Coordinate,
}

impl Stop {
    pub fn is_new(&self) -> bool {
        &*self.id == super::NEW_ID
    }
}

/// What the map editor hands to the stop service when the user drops a new stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopDraft {
    pub feed_id: Arc<str>,
    pub name: String,
    pub coordinate: Coordinate,
}

impl StopDraft {
    pub fn at(feed_id: Arc<str>, coordinate: Coordinate) -> Self {
        Self {
            feed_id,
            name: format!("New stop ({})", coordinate.to_lat_lng_string(5)),
            coordinate,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: Arc<str>,
    pub short_name: Option<Arc<str>>,
    pub long_name: Option<Arc<str>>,
    /// Classification of the vehicle (0: Tram, 1: Subway, 3: Bus, etc.).
    pub route_type: i32,
}

impl Route {
    /// `"short - long"` when both names exist, whichever exists otherwise,
    /// falling back on the id.
    pub fn display_name(&self) -> String {
        route_name(&self.id, self.short_name.as_deref(), self.long_name.as_deref())
    }
}

pub fn route_name(id: &str, short_name: Option<&str>, long_name: Option<&str>) -> String {
    let short_name = short_name.filter(|name| !name.is_empty());
    let long_name = long_name.filter(|name| !name.is_empty());
    match (short_name, long_name) {
        (Some(short), Some(long)) => format!("{short} - {long}"),
        (Some(name), None) | (None, Some(name)) => name.to_string(),
        (None, None) => id.to_string(),
    }
}

/// One stop of a [`Pattern`] with the default times used to seed new trips.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternStop {
    pub stop_id: Arc<str>,
    /// Travel time from the previous stop.
    pub default_travel_time: Duration,
    pub default_dwell_time: Duration,
    /// Whether times at this stop are fixed. `None` when the feed does not say.
    pub timepoint: Option<bool>,
}

/// An ordered, reusable stop sequence belonging to a route.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub id: Arc<str>,
    pub route_id: Arc<str>,
    pub name: Arc<str>,
    pub use_frequency: bool,
    pub pattern_stops: Vec<PatternStop>,
}

/// A service calendar, the "schedule" a timetable is edited under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    pub id: Arc<str>,
    /// Operating days, Monday first.
    pub days: [bool; 7],
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Calendar {
    pub fn describe_days(&self) -> String {
        let weekdays = self.days[..5].iter().filter(|day| **day).count();
        let weekends = self.days[5..].iter().filter(|day| **day).count();
        match (weekdays, weekends) {
            (5, 2) => "every day".to_string(),
            (5, 0) => "weekdays".to_string(),
            (0, 2) => "weekends".to_string(),
            (0, 0) => "no regular service".to_string(),
            _ => ["M", "T", "W", "Th", "F", "Sat", "Sun"]
                .into_iter()
                .zip(self.days)
                .filter(|(_, operates)| *operates)
                .map(|(day, _)| day)
                .collect(),
        }
    }

    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        use chrono::Datelike;
        date >= self.start_date
            && date <= self.end_date
            && self.days[date.weekday().num_days_from_monday() as usize]
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedValidation {
    pub bounds: Option<Bounds>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedSource {
    pub id: Arc<str>,
    pub name: Arc<str>,
    pub url: Option<String>,
    pub latest_validation: Option<FeedValidation>,
}

impl FeedSource {
    pub fn bounds(&self) -> Option<Bounds> {
        self.latest_validation.as_ref()?.bounds
    }

    /// Extent the editor map opens on, padded so edge stops are not clipped.
    pub fn map_bounds(&self, padding: f64) -> Option<Bounds> {
        self.bounds().map(|bounds| bounds.padded(padding))
    }

    /// Marker position for the feed: the averaged validated extent.
    pub fn location(&self) -> Option<Coordinate> {
        let location = self.bounds()?.center();
        if location.latitude.is_nan() || location.longitude.is_nan() {
            return None;
        }
        Some(location)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Arc<str>,
    pub name: Arc<str>,
    pub feed_sources: Vec<FeedSource>,
}

impl Project {
    /// Union of every feed's validated extent, `None` when no feed has one.
    pub fn feeds_bounds(&self) -> Option<Bounds> {
        feeds_bounds(self.feed_sources.iter())
    }
}

pub fn feeds_bounds<'a, I>(feeds: I) -> Option<Bounds>
where
    I: IntoIterator<Item = &'a FeedSource>,
{
    feeds
        .into_iter()
        .filter_map(FeedSource::bounds)
        .reduce(|acc, bounds| acc.union(&bounds))
}

pub fn find_project_by_feed_source<'a>(
    projects: &'a [Project],
    feed_source_id: &str,
) -> Option<&'a Project> {
    projects.iter().find(|project| {
        project
            .feed_sources
            .iter()
            .any(|feed| &*feed.id == feed_source_id)
    })
}

#[test]
fn route_name_variants() {
    assert_eq!(route_name("r1", Some("12"), Some("Crosstown")), "12 - Crosstown");
    assert_eq!(route_name("r1", None, Some("Crosstown")), "Crosstown");
    assert_eq!(route_name("r1", Some(""), None), "r1");
}

#[test]
fn calendar_describes_partial_week() {
    let calendar = Calendar {
        id: "c".into(),
        days: [true, false, true, false, false, false, true],
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
    };
    assert_eq!(calendar.describe_days(), "MWSun");
    // 2024-01-03 is a Wednesday.
    assert!(calendar.is_active_on(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()));
    assert!(!calendar.is_active_on(NaiveDate::from_ymd_opt(2024, 1, 4).unwrap()));
}

#[test]
fn project_bounds_skip_unvalidated_feeds() {
    let feed = |id: &str, bounds: Option<Bounds>| FeedSource {
        id: id.into(),
        latest_validation: Some(FeedValidation { bounds }),
        ..Default::default()
    };
    let project = Project {
        id: "p".into(),
        name: "Region".into(),
        feed_sources: vec![
            feed(
                "a",
                Some(Bounds {
                    north: 2.0,
                    south: 1.0,
                    east: 2.0,
                    west: 1.0,
                }),
            ),
            feed("b", None),
            feed(
                "c",
                Some(Bounds {
                    north: 3.0,
                    south: 0.5,
                    east: 1.5,
                    west: 0.0,
                }),
            ),
        ],
    };
    assert_eq!(
        project.feeds_bounds(),
        Some(Bounds {
            north: 3.0,
            south: 0.5,
            east: 2.0,
            west: 0.0,
        })
    );
    let projects = [project];
    assert!(find_project_by_feed_source(&projects, "b").is_some());
    assert!(find_project_by_feed_source(&projects, "z").is_none());
}
