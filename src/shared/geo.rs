use std::{
    cmp,
    fmt::Display,
    ops::{Add, Div, Sub},
};

use serde::{Deserialize, Serialize};

pub(crate) const GRID_CELL_SIZE: Distance = Distance::from_meters(500.0);
pub(crate) const LONGITUDE_DISTANCE: Distance = Distance::from_meters(111_320.0);
pub(crate) const LATITUDE_DISTANCE: Distance = Distance::from_meters(110_540.0);

/// Padding applied around a feed's validated extent before fitting the map to it.
pub const FEED_BOUNDS_PADDING: f64 = 0.005;

/// Number of decimals kept when a map click is turned into a stop location.
pub const LAT_LNG_PRECISION: u32 = 6;

#[derive(Debug, Clone, Copy, Default)]
pub struct Distance(f64);

impl PartialEq for Distance {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl Add for Distance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Distance {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Div for Distance {
    type Output = Self;
    fn div(self, rhs: Self) -> Self::Output {
        Self(self.0 / rhs.0)
    }
}

impl Distance {
    pub const fn from_meters(distance: f64) -> Self {
        Self(distance)
    }

    pub const fn from_kilometers(distance: f64) -> Self {
        Self(distance * 1000.0)
    }

    pub const fn as_meters(&self) -> f64 {
        self.0
    }

    pub const fn as_kilometers(&self) -> f64 {
        self.0 / 1000.0
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}, {}", self.latitude, self.longitude))
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(value: Coordinate) -> Self {
        (value.latitude, value.longitude)
    }
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn euclidean_distance(&self, coord: &Self) -> Distance {
        const R: f64 = 6371.0;
        let dist_lat = f64::to_radians(coord.latitude - self.latitude);
        let dist_lon = f64::to_radians(coord.longitude - self.longitude);
        let a = f64::powi(f64::sin(dist_lat / 2.0), 2)
            + f64::cos(f64::to_radians(self.latitude))
                * f64::cos(f64::to_radians(coord.latitude))
                * f64::sin(dist_lon / 2.0)
                * f64::sin(dist_lon / 2.0);
        let c = 2.0 * f64::atan2(f64::sqrt(a), f64::sqrt(1.0 - a));
        Distance::from_kilometers(R * c)
    }

    /// Maps the coordinate onto the stop grid. Cells are roughly
    /// [`GRID_CELL_SIZE`] wide at mid latitudes.
    pub fn to_grid(&self) -> (i32, i32) {
        let x = (self.longitude * LONGITUDE_DISTANCE.as_meters() / GRID_CELL_SIZE.as_meters())
            .floor() as i32;
        let y = (self.latitude * LATITUDE_DISTANCE.as_meters() / GRID_CELL_SIZE.as_meters())
            .floor() as i32;
        (x, y)
    }

    /// True when both axes are within `degrees` of the other coordinate.
    pub fn within_degrees(&self, other: &Self, degrees: f64) -> bool {
        const EPSILON: f64 = 1e-9;
        (self.latitude - other.latitude).abs() <= degrees + EPSILON
            && (self.longitude - other.longitude).abs() <= degrees + EPSILON
    }

    /// Rounds both axes to `decimals` places, the way map clicks are stored on stops.
    pub fn rounded(&self, decimals: u32) -> Self {
        let factor = 10f64.powi(decimals as i32);
        Self {
            latitude: (self.latitude * factor).round() / factor,
            longitude: (self.longitude * factor).round() / factor,
        }
    }

    /// Formats as `lat, lng` with a fixed number of decimals.
    pub fn to_lat_lng_string(&self, decimals: usize) -> String {
        format!(
            "{:.*}, {:.*}",
            decimals, self.latitude, decimals, self.longitude
        )
    }
}

/// Axis aligned bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Default for Bounds {
    /// Wide view used by the feeds map before anything is known.
    fn default() -> Self {
        Self {
            north: 70.0,
            south: -70.0,
            east: 130.0,
            west: -130.0,
        }
    }
}

impl Bounds {
    pub fn from_coordinates<'a, I>(coordinates: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Coordinate>,
    {
        coordinates.into_iter().fold(None, |bounds, coordinate| {
            let point = Self {
                north: coordinate.latitude,
                south: coordinate.latitude,
                east: coordinate.longitude,
                west: coordinate.longitude,
            };
            Some(match bounds {
                Some(bounds) => bounds.union(&point),
                None => point,
            })
        })
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            north: self.north.max(other.north),
            south: self.south.min(other.south),
            east: self.east.max(other.east),
            west: self.west.min(other.west),
        }
    }

    pub fn padded(&self, padding: f64) -> Self {
        Self {
            north: self.north + padding,
            south: self.south - padding,
            east: self.east + padding,
            west: self.west - padding,
        }
    }

    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        coordinate.latitude <= self.north
            && coordinate.latitude >= self.south
            && coordinate.longitude <= self.east
            && coordinate.longitude >= self.west
    }

    /// Averaged location of the box. A side that is exactly zero is
    /// treated as missing and replaced by its opposite side.
    pub fn center(&self) -> Coordinate {
        fn or_other(value: f64, other: f64) -> f64 {
            if value != 0.0 { value } else { other }
        }
        let east = or_other(self.east, self.west);
        let west = or_other(self.west, self.east);
        let north = or_other(self.north, self.south);
        let south = or_other(self.south, self.north);
        Coordinate::new((north + south) / 2.0, (west + east) / 2.0)
    }

    /// Corner pair as `[[north, east], [south, west]]`, the order map widgets expect.
    pub fn to_corners(&self) -> [[f64; 2]; 2] {
        [[self.north, self.east], [self.south, self.west]]
    }
}

#[test]
fn distance_test() {
    let coord_a = Coordinate {
        latitude: 48.85800943005911,
        longitude: 2.3514350059357927,
    };

    let coord_b = Coordinate {
        latitude: 51.5052389927712,
        longitude: -0.12495407345099824,
    };
    let d = coord_a.euclidean_distance(&coord_b);
    assert!((d.as_kilometers() - 343.0).abs() < 5.0);
}

#[test]
fn distance_eq_test() {
    let dist_a = Distance::from_meters(1000.0);
    let dist_b = Distance::from_kilometers(1.0);
    assert_eq!(dist_a, dist_b)
}

#[test]
fn rounded_keeps_six_decimals() {
    let coord = Coordinate::new(40.712_812_345, -74.006_012_345);
    let rounded = coord.rounded(LAT_LNG_PRECISION);
    assert_eq!(rounded, Coordinate::new(40.712812, -74.006012));
}

#[test]
fn center_falls_back_on_zero_sides() {
    let bounds = Bounds {
        north: 10.0,
        south: 0.0,
        east: 20.0,
        west: 10.0,
    };
    assert_eq!(bounds.center(), Coordinate::new(10.0, 15.0));
}

#[test]
fn grid_is_continuous_across_zero() {
    let west = Coordinate::new(0.0, -0.000_1);
    let east = Coordinate::new(0.0, 0.000_1);
    assert_eq!(west.to_grid().0 + 1, east.to_grid().0);
}
