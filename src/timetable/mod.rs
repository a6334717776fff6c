//! Spreadsheet-like editing of the trips of one pattern under one calendar.

use std::{cell::Cell, rc::Rc, sync::Arc};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    model::{ActiveEntityRequest, CellValue, Component, Pattern, RowId, TripRow},
    service::{DeleteTripsRequest, SaveOutcome, SaveTripsRequest},
    shared::signal::{Subscription, ViewportSignal, ViewportSize},
    store::{Timetable, TimetableAction},
};

pub mod layout;
mod row;
mod validate;

pub use layout::TimetableView;
pub use row::construct_new_row;
pub use validate::is_data_valid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("No trip pattern is active")]
    NoActivePattern,
    #[error("No calendar is active")]
    NoActiveCalendar,
}

/// Selection the timetable is edited under.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorContext {
    pub feed_id: Arc<str>,
    pub active_pattern: Option<Pattern>,
    pub active_calendar_id: Option<Arc<str>>,
}

impl EditorContext {
    fn pattern_and_calendar(&self) -> Result<(Arc<str>, Arc<str>), Error> {
        let pattern = self.active_pattern.as_ref().ok_or(Error::NoActivePattern)?;
        let calendar = self
            .active_calendar_id
            .clone()
            .ok_or(Error::NoActiveCalendar)?;
        Ok((pattern.id.clone(), calendar))
    }
}

/// Grid position the view should focus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    /// `(row, column)` of the cell being edited.
    pub active_cell: Option<(usize, usize)>,
    pub scroll_to_row: Option<usize>,
    pub scroll_to_column: Option<usize>,
}

impl Cursor {
    fn scroll_to(&mut self, row: usize) {
        self.active_cell = None;
        self.scroll_to_row = Some(row);
        self.scroll_to_column = Some(0);
    }
}

/// Local state and bulk operations of the timetable panel.
///
/// Shared state lives in [`Timetable`]; every change to it goes through
/// [`Timetable::apply`].
#[derive(Default)]
pub struct TimetableEditor {
    pub context: EditorContext,
    pub cursor: Cursor,
    viewport: Rc<Cell<ViewportSize>>,
    subscription: Option<Subscription>,
}

impl TimetableEditor {
    pub fn new(context: EditorContext) -> Self {
        Self {
            context,
            ..Default::default()
        }
    }

    /// Starts tracking the window size. Replaces any earlier subscription.
    pub fn mount(&mut self, signal: &ViewportSignal) {
        let viewport = self.viewport.clone();
        self.subscription = Some(signal.subscribe(move |size| viewport.set(size)));
    }

    pub fn unmount(&mut self) {
        self.subscription = None;
    }

    pub fn view(&self) -> TimetableView {
        if self.context.active_pattern.is_none() {
            TimetableView::ChoosePattern
        } else if self.context.active_calendar_id.is_none() {
            TimetableView::ChooseCalendar
        } else {
            TimetableView::Grid {
                height: layout::grid_height(self.viewport.get()),
            }
        }
    }

    /// Request to open a new, unsaved calendar in the calendar editor.
    pub fn create_calendar(&self) -> ActiveEntityRequest {
        ActiveEntityRequest {
            feed_id: self.context.feed_id.clone(),
            component: Component::Calendar,
            entity_id: RowId::New,
        }
    }

    pub fn construct_new_row(
        &self,
        timetable: &Timetable,
        template: Option<&TripRow>,
    ) -> Result<TripRow, Error> {
        construct_new_row(&self.context, &timetable.columns, template)
    }

    /// Appends a row cloned from the last one, or a blank one when `blank`
    /// is set or the table is empty.
    pub fn add_new_row(
        &mut self,
        timetable: &mut Timetable,
        blank: bool,
        scroll: bool,
    ) -> Result<(), Error> {
        let template = if blank { None } else { timetable.trips.last() };
        let row = self.construct_new_row(timetable, template)?;
        let new_index = timetable.len();
        timetable.apply(TimetableAction::AddTrip(row));
        if scroll {
            self.cursor.scroll_to(new_index);
        }
        Ok(())
    }

    /// Appends a copy of each given row, in ascending row order.
    /// Returns how many rows were added.
    pub fn duplicate_rows(&mut self, timetable: &mut Timetable, indexes: &[usize]) -> usize {
        let mut ascending = indexes.to_vec();
        ascending.sort_unstable();
        let start_len = timetable.len();
        let mut added = 0;
        for index in ascending {
            let Some(template) = timetable.trips.get(index) else {
                warn!("Cannot duplicate missing row {index}");
                continue;
            };
            let row = match self.construct_new_row(timetable, Some(template)) {
                Ok(row) => row,
                Err(err) => {
                    warn!("Cannot duplicate row {index}: {err}");
                    continue;
                }
            };
            timetable.apply(TimetableAction::AddTrip(row));
            added += 1;
            self.cursor.scroll_to((start_len + added).saturating_sub(1));
        }
        debug!("Duplicated {added} rows");
        added
    }

    /// Drops the selected rows. Unsaved rows go away locally, persisted ones
    /// are returned as a single delete request. The selection is cleared.
    pub fn remove_selected_rows(
        &mut self,
        timetable: &mut Timetable,
    ) -> Result<Option<DeleteTripsRequest>, Error> {
        let mut descending = timetable.selected.clone();
        descending.sort_unstable_by(|a, b| b.cmp(a));
        descending.dedup();

        let mut local = Vec::new();
        let mut persisted = Vec::new();
        for index in descending {
            match timetable.trips.get(index) {
                Some(row) if row.is_new() => local.push(index),
                Some(row) => persisted.push(row.clone()),
                None => warn!("Selected row {index} does not exist"),
            }
        }

        let request = if persisted.is_empty() {
            None
        } else {
            let (pattern_id, calendar_id) = self.context.pattern_and_calendar()?;
            Some(DeleteTripsRequest {
                feed_id: self.context.feed_id.clone(),
                pattern_id,
                calendar_id,
                trips: persisted,
            })
        };

        info!(
            "Removing {} unsaved and {} saved rows",
            local.len(),
            request.as_ref().map_or(0, |request| request.trips.len())
        );
        timetable.apply(TimetableAction::RemoveTrips(local));
        timetable.apply(TimetableAction::ToggleAllRows(false));
        Ok(request)
    }

    pub fn offset_rows(&self, timetable: &mut Timetable, rows: &[usize], seconds: i32) {
        timetable.apply(TimetableAction::OffsetRows {
            rows: rows.to_vec(),
            seconds,
        });
    }

    /// Collects the edited rows into a save request. When a row was edited
    /// more than once its first mention wins.
    pub fn save_edited_trips(&self, timetable: &Timetable) -> Result<SaveTripsRequest, Error> {
        let (pattern_id, calendar_id) = self.context.pattern_and_calendar()?;
        let mut rows: Vec<usize> = Vec::new();
        let mut trips = Vec::new();
        for index in timetable.edited.iter().copied() {
            if rows.contains(&index) {
                continue;
            }
            if let Some(trip) = timetable.trips.get(index) {
                trips.push(trip.clone());
                rows.push(index);
            }
        }
        debug!("Saving {} edited trips", trips.len());
        Ok(SaveTripsRequest {
            feed_id: self.context.feed_id.clone(),
            pattern_id,
            calendar_id,
            trips,
            rows,
        })
    }

    /// Keeps only the rows whose save failed in the edited set and records
    /// ids the service assigned.
    pub fn complete_save(
        &self,
        timetable: &mut Timetable,
        request: &SaveTripsRequest,
        outcome: &SaveOutcome,
    ) {
        let edited: Vec<usize> = outcome
            .failed
            .iter()
            .filter_map(|position| request.rows.get(*position).copied())
            .collect();
        if !edited.is_empty() {
            warn!("{} trips failed to save", edited.len());
        }
        let assigned = outcome
            .assigned
            .iter()
            .filter_map(|(position, id)| Some((*request.rows.get(*position)?, id.clone())))
            .collect();
        timetable.apply(TimetableAction::AssignIds(assigned));
        timetable.apply(TimetableAction::SetEdited(edited));
    }

    /// Commits `value` into the cell at (`row`, `column`) when it passes
    /// [`is_data_valid`]. Time cells are bounded by the next filled time
    /// cell of the row.
    pub fn update_cell(
        &mut self,
        timetable: &mut Timetable,
        row: usize,
        column: usize,
        value: CellValue,
    ) -> bool {
        let (Some(trip), Some(col)) = (timetable.trips.get(row), timetable.columns.get(column))
        else {
            return false;
        };
        let kind_matches = matches!(
            (col.is_time(), &value),
            (true, CellValue::Time(_)) | (false, CellValue::Text(_))
        );
        let bound = validate::bound_for(&timetable.columns, trip, column);
        if !kind_matches || !is_data_valid(col, &value, bound) {
            debug!("Rejected value for row {row} column {column}");
            return false;
        }
        let key = col.key.clone();
        timetable.apply(TimetableAction::UpdateCell { row, key, value });
        self.cursor.active_cell = Some((row, column));
        true
    }
}
