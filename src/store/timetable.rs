use std::sync::Arc;

use tracing::{debug, warn};

use crate::model::{CellValue, Column, ColumnKey, RowId, TripRow};

use super::FetchStatus;

#[derive(Debug, Clone, PartialEq)]
pub enum TimetableAction {
    FetchTrips,
    FetchTripsRejected,
    ReceiveTrips {
        trips: Vec<TripRow>,
        columns: Vec<Column>,
    },
    AddTrip(TripRow),
    /// Removes rows by index, one after the other in the given order.
    /// Callers pass indices highest first.
    RemoveTrips(Vec<usize>),
    ToggleRowSelection(usize),
    ToggleAllRows(bool),
    /// Shifts every time column of the given rows and marks them edited.
    OffsetRows {
        rows: Vec<usize>,
        seconds: i32,
    },
    UpdateCell {
        row: usize,
        key: ColumnKey,
        value: CellValue,
    },
    SetEdited(Vec<usize>),
    /// Persisted ids handed back by a save, per row index.
    AssignIds(Vec<(usize, Arc<str>)>),
}

/// Trips of one (pattern, calendar) pair plus the editing working set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timetable {
    pub status: FetchStatus,
    pub trips: Vec<TripRow>,
    pub columns: Vec<Column>,
    /// Indices of checked rows.
    pub selected: Vec<usize>,
    /// Indices of rows changed since the last save. May hold duplicates.
    pub edited: Vec<usize>,
}

impl Timetable {
    pub fn new(columns: Vec<Column>, trips: Vec<TripRow>) -> Self {
        Self {
            status: FetchStatus::FETCHED,
            trips,
            columns,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    pub fn is_selected(&self, row: usize) -> bool {
        self.selected.contains(&row)
    }

    pub fn apply(&mut self, action: TimetableAction) {
        match action {
            TimetableAction::FetchTrips => {
                self.status = FetchStatus::FETCHING;
                self.trips.clear();
                self.selected.clear();
                self.edited.clear();
            }
            TimetableAction::FetchTripsRejected => self.status = FetchStatus::FAILED,
            TimetableAction::ReceiveTrips { trips, columns } => {
                *self = Self::new(columns, trips);
            }
            TimetableAction::AddTrip(trip) => self.trips.push(trip),
            TimetableAction::RemoveTrips(indexes) => {
                for index in indexes {
                    if index < self.trips.len() {
                        self.trips.remove(index);
                        shift_after_removal(&mut self.edited, index);
                        shift_after_removal(&mut self.selected, index);
                    } else {
                        warn!("Ignoring removal of missing row {index}");
                    }
                }
            }
            TimetableAction::ToggleRowSelection(row) => {
                if let Some(position) = self.selected.iter().position(|r| *r == row) {
                    self.selected.remove(position);
                } else if row < self.trips.len() {
                    self.selected.push(row);
                }
            }
            TimetableAction::ToggleAllRows(select) => {
                self.selected = if select {
                    (0..self.trips.len()).collect()
                } else {
                    Vec::new()
                };
            }
            TimetableAction::OffsetRows { rows, seconds } => self.offset_rows(rows, seconds),
            TimetableAction::UpdateCell { row, key, value } => {
                let Some(trip) = self.trips.get_mut(row) else {
                    warn!("Ignoring update of missing row {row}");
                    return;
                };
                if trip.set_value(&key, value) {
                    self.edited.push(row);
                } else {
                    warn!("Cell {key:?} of row {row} does not accept that value");
                }
            }
            TimetableAction::SetEdited(edited) => self.edited = edited,
            TimetableAction::AssignIds(ids) => {
                for (row, id) in ids {
                    if let Some(trip) = self.trips.get_mut(row) {
                        trip.id = RowId::Persisted(id);
                    }
                }
            }
        }
    }

    fn offset_rows(&mut self, rows: Vec<usize>, seconds: i32) {
        debug!("Offsetting {} rows by {} seconds", rows.len(), seconds);
        let time_keys: Vec<&ColumnKey> = self
            .columns
            .iter()
            .filter(|column| column.is_time())
            .map(|column| &column.key)
            .collect();
        for row in rows {
            let Some(trip) = self.trips.get_mut(row) else {
                warn!("Ignoring offset of missing row {row}");
                continue;
            };
            for key in time_keys.iter() {
                if let Some(Some(time)) = trip.time_mut(key) {
                    *time = time.offset(seconds);
                }
            }
            self.edited.push(row);
        }
    }
}

/// Drops `removed` from `rows` and renumbers the rows that followed it.
fn shift_after_removal(rows: &mut Vec<usize>, removed: usize) {
    rows.retain(|row| *row != removed);
    rows.iter_mut()
        .filter(|row| **row > removed)
        .for_each(|row| *row -= 1);
}

#[test]
fn removing_rows_renumbers_edited_and_selected() {
    let mut timetable = Timetable::new(Vec::new(), vec![TripRow::default(); 4]);
    timetable.edited = vec![0, 1, 3, 3];
    timetable.selected = vec![3, 1];
    timetable.apply(TimetableAction::RemoveTrips(vec![2, 1]));
    assert_eq!(timetable.len(), 2);
    assert_eq!(timetable.edited, vec![0, 1, 1]);
    assert_eq!(timetable.selected, vec![1]);
}
