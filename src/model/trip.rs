use std::{collections::BTreeMap, fmt::Display, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::shared::time::Time;

use super::NEW_ID;

/// Identifier of a timetable row: persisted, or not yet saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RowId {
    #[default]
    New,
    Persisted(Arc<str>),
}

impl RowId {
    pub fn is_new(&self) -> bool {
        matches!(self, Self::New)
    }
}

impl From<String> for RowId {
    fn from(value: String) -> Self {
        if value == NEW_ID {
            Self::New
        } else {
            Self::Persisted(value.into())
        }
    }
}

impl From<&str> for RowId {
    fn from(value: &str) -> Self {
        value.to_string().into()
    }
}

impl From<RowId> for String {
    fn from(value: RowId) -> Self {
        value.to_string()
    }
}

impl Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowId::New => f.write_str(NEW_ID),
            RowId::Persisted(id) => f.write_str(id),
        }
    }
}

/// Arrival and departure at one pattern stop.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopTimeCell {
    pub stop_id: Arc<str>,
    pub arrival_time: Option<Time>,
    pub departure_time: Option<Time>,
}

/// Typed address of a timetable cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColumnKey {
    GtfsTripId,
    TripHeadsign,
    BlockId,
    /// Arrival at the n-th pattern stop.
    Arrival(usize),
    /// Departure from the n-th pattern stop.
    Departure(usize),
    /// A custom plain attribute.
    Attribute(Arc<str>),
}

/// Content of a single cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellValue {
    Time(Option<Time>),
    Text(Option<String>),
}

/// One scheduled run of a pattern, a row of the timetable.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRow {
    pub id: RowId,
    pub gtfs_trip_id: Option<String>,
    pub block_id: Option<String>,
    pub trip_headsign: Option<String>,
    pub use_frequency: bool,
    pub feed_id: Arc<str>,
    pub pattern_id: Arc<str>,
    pub route_id: Arc<str>,
    pub calendar_id: Option<Arc<str>>,
    /// Positionally aligned with the pattern's stops.
    pub stop_times: Vec<StopTimeCell>,
    pub attributes: BTreeMap<Arc<str>, Option<String>>,
}

impl TripRow {
    pub fn is_new(&self) -> bool {
        self.id.is_new()
    }

    pub fn value(&self, key: &ColumnKey) -> Option<CellValue> {
        match key {
            ColumnKey::GtfsTripId => Some(CellValue::Text(self.gtfs_trip_id.clone())),
            ColumnKey::TripHeadsign => Some(CellValue::Text(self.trip_headsign.clone())),
            ColumnKey::BlockId => Some(CellValue::Text(self.block_id.clone())),
            ColumnKey::Arrival(i) => self
                .stop_times
                .get(*i)
                .map(|cell| CellValue::Time(cell.arrival_time)),
            ColumnKey::Departure(i) => self
                .stop_times
                .get(*i)
                .map(|cell| CellValue::Time(cell.departure_time)),
            ColumnKey::Attribute(name) => self
                .attributes
                .get(name)
                .map(|value| CellValue::Text(value.clone())),
        }
    }

    pub fn time(&self, key: &ColumnKey) -> Option<Time> {
        match self.value(key)? {
            CellValue::Time(time) => time,
            CellValue::Text(_) => None,
        }
    }

    /// Mutable access to a time cell, `None` when `key` is not a time cell of this row.
    pub fn time_mut(&mut self, key: &ColumnKey) -> Option<&mut Option<Time>> {
        match key {
            ColumnKey::Arrival(i) => self.stop_times.get_mut(*i).map(|c| &mut c.arrival_time),
            ColumnKey::Departure(i) => self.stop_times.get_mut(*i).map(|c| &mut c.departure_time),
            _ => None,
        }
    }

    /// Writes `value` into the cell at `key`. Returns false when the value's
    /// kind does not match the cell or the cell does not exist.
    pub fn set_value(&mut self, key: &ColumnKey, value: CellValue) -> bool {
        match (key, value) {
            (ColumnKey::GtfsTripId, CellValue::Text(text)) => self.gtfs_trip_id = text,
            (ColumnKey::TripHeadsign, CellValue::Text(text)) => self.trip_headsign = text,
            (ColumnKey::BlockId, CellValue::Text(text)) => self.block_id = text,
            (ColumnKey::Attribute(name), CellValue::Text(text)) => {
                self.attributes.insert(name.clone(), text);
            }
            (ColumnKey::Arrival(_) | ColumnKey::Departure(_), CellValue::Time(time)) => {
                match self.time_mut(key) {
                    Some(cell) => *cell = time,
                    None => return false,
                }
            }
            _ => return false,
        }
        true
    }

    pub fn set_arrival_time(&mut self, stop: usize, time: Option<Time>) -> bool {
        self.set_value(&ColumnKey::Arrival(stop), CellValue::Time(time))
    }

    pub fn set_departure_time(&mut self, stop: usize, time: Option<Time>) -> bool {
        self.set_value(&ColumnKey::Departure(stop), CellValue::Time(time))
    }

    pub fn set_attribute(&mut self, name: impl Into<Arc<str>>, value: Option<String>) {
        self.attributes.insert(name.into(), value);
    }
}

#[test]
fn row_id_round_trips_through_sentinel() {
    assert_eq!(RowId::from("new"), RowId::New);
    assert_eq!(RowId::from("t-1"), RowId::Persisted("t-1".into()));
    assert_eq!(String::from(RowId::New), "new");
}

#[test]
fn set_value_rejects_kind_mismatch() {
    let mut row = TripRow {
        stop_times: vec![StopTimeCell::default()],
        ..Default::default()
    };
    assert!(!row.set_value(&ColumnKey::GtfsTripId, CellValue::Time(None)));
    assert!(!row.set_arrival_time(3, Some(Time::from_seconds(10))));
    assert!(row.set_arrival_time(0, Some(Time::from_seconds(10))));
    assert_eq!(row.time(&ColumnKey::Arrival(0)), Some(Time::from_seconds(10)));
}
