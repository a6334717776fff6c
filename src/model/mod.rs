mod entities;
mod transfer;
mod trip;

pub use entities::*;
pub use transfer::*;
pub use trip::*;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Identifier carried by entities that have not been persisted yet.
pub const NEW_ID: &str = "new";

/// Kind of entity being edited, which drives overlays and edit affordances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Component {
    Stop,
    Route,
    Calendar,
}

/// Ask the host to make an entity the active one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEntityRequest {
    pub feed_id: Arc<str>,
    pub component: Component,
    pub entity_id: RowId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Time,
    Plain,
}

/// A timetable column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub key: ColumnKey,
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn plain(key: ColumnKey, name: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
            kind: ColumnKind::Plain,
        }
    }

    pub fn time(key: ColumnKey, name: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
            kind: ColumnKind::Time,
        }
    }

    pub fn is_time(&self) -> bool {
        self.kind == ColumnKind::Time
    }

    /// Trip id, headsign and block columns, then arrival and departure per
    /// pattern stop, then one plain column per custom attribute.
    pub fn for_pattern(pattern: &Pattern, attributes: &[Arc<str>]) -> Vec<Self> {
        let mut columns = vec![
            Self::plain(ColumnKey::GtfsTripId, "Trip ID"),
            Self::plain(ColumnKey::TripHeadsign, "Headsign"),
            Self::plain(ColumnKey::BlockId, "Block ID"),
        ];
        pattern
            .pattern_stops
            .iter()
            .enumerate()
            .for_each(|(i, stop)| {
                columns.push(Self::time(
                    ColumnKey::Arrival(i),
                    format!("{} arrival", stop.stop_id),
                ));
                columns.push(Self::time(
                    ColumnKey::Departure(i),
                    format!("{} departure", stop.stop_id),
                ));
            });
        columns.extend(
            attributes
                .iter()
                .map(|name| Self::plain(ColumnKey::Attribute(name.clone()), name.to_string())),
        );
        columns
    }
}
