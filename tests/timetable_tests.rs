use std::sync::Arc;

use quill::{
    model::{CellValue, Column, ColumnKey, Pattern, PatternStop, RowId, TripRow},
    service::SaveOutcome,
    shared::{
        ViewportSignal, ViewportSize,
        time::{Duration, OFFSET_MODULUS, Time},
    },
    store::{Timetable, TimetableAction},
    timetable::{EditorContext, Error, TimetableEditor, TimetableView},
};

fn pattern(times: &[(u32, u32)]) -> Pattern {
    Pattern {
        id: "p1".into(),
        route_id: "r1".into(),
        name: "Centrum to Hamnen".into(),
        use_frequency: false,
        pattern_stops: times
            .iter()
            .enumerate()
            .map(|(i, (travel, dwell))| PatternStop {
                stop_id: format!("s{i}").into(),
                default_travel_time: Duration::from_seconds(*travel),
                default_dwell_time: Duration::from_seconds(*dwell),
                timepoint: None,
            })
            .collect(),
    }
}

fn editor(pattern: Pattern) -> TimetableEditor {
    TimetableEditor::new(EditorContext {
        feed_id: "feed".into(),
        active_pattern: Some(pattern),
        active_calendar_id: Some("weekday".into()),
    })
}

fn timetable_for(pattern: &Pattern) -> Timetable {
    Timetable::new(Column::for_pattern(pattern, &[]), Vec::new())
}

fn persisted(editor: &TimetableEditor, timetable: &Timetable, id: &str) -> TripRow {
    let mut row = editor.construct_new_row(timetable, None).unwrap();
    row.id = RowId::Persisted(id.into());
    row.gtfs_trip_id = Some(id.to_string());
    row
}

fn arrivals(row: &TripRow) -> Vec<Option<i32>> {
    row.stop_times
        .iter()
        .map(|cell| cell.arrival_time.map(|time| time.as_seconds()))
        .collect()
}

fn departures(row: &TripRow) -> Vec<Option<i32>> {
    row.stop_times
        .iter()
        .map(|cell| cell.departure_time.map(|time| time.as_seconds()))
        .collect()
}

#[test]
fn blank_row_seeds_cumulative_times() {
    let pattern = pattern(&[(60, 30), (120, 0)]);
    let editor = editor(pattern.clone());
    let row = editor
        .construct_new_row(&timetable_for(&pattern), None)
        .unwrap();
    assert_eq!(arrivals(&row), vec![Some(60), Some(210)]);
    assert_eq!(departures(&row), vec![Some(90), Some(210)]);
    assert_eq!(row.id, RowId::New);
    assert_eq!(row.gtfs_trip_id, None);
    assert_eq!(&*row.pattern_id, "p1");
    assert_eq!(&*row.route_id, "r1");
    assert_eq!(row.calendar_id.as_deref(), Some("weekday"));
}

#[test]
fn blank_row_times_are_ordered() {
    let pattern = pattern(&[(0, 0), (45, 15), (300, 0), (0, 60), (120, 30)]);
    let editor = editor(pattern.clone());
    let row = editor
        .construct_new_row(&timetable_for(&pattern), None)
        .unwrap();
    assert_eq!(row.stop_times.len(), 5);
    for (i, cell) in row.stop_times.iter().enumerate() {
        let arrival = cell.arrival_time.unwrap();
        let departure = cell.departure_time.unwrap();
        assert!(arrival <= departure);
        if let Some(next) = row.stop_times.get(i + 1) {
            assert!(departure <= next.arrival_time.unwrap());
        }
    }
}

#[test]
fn blank_row_needs_active_pattern() {
    let editor = TimetableEditor::new(EditorContext::default());
    let timetable = Timetable::default();
    assert_eq!(
        editor.construct_new_row(&timetable, None),
        Err(Error::NoActivePattern)
    );
}

#[test]
fn blank_row_fills_custom_attributes() {
    let pattern = pattern(&[(60, 0)]);
    let columns = Column::for_pattern(&pattern, &["wheelchair_accessible".into()]);
    let timetable = Timetable::new(columns, Vec::new());
    let row = editor(pattern).construct_new_row(&timetable, None).unwrap();
    assert_eq!(row.attributes.get("wheelchair_accessible"), Some(&None));
}

#[test]
fn blank_row_without_stops_keeps_other_columns() {
    let pattern = pattern(&[]);
    let columns = Column::for_pattern(&pattern, &["wheelchair_accessible".into()]);
    let timetable = Timetable::new(columns, Vec::new());
    let row = editor(pattern).construct_new_row(&timetable, None).unwrap();
    assert!(row.stop_times.is_empty());
    assert_eq!(row.id, RowId::New);
    assert_eq!(&*row.feed_id, "feed");
    assert_eq!(&*row.pattern_id, "p1");
    assert_eq!(&*row.route_id, "r1");
    assert_eq!(row.calendar_id.as_deref(), Some("weekday"));
    assert_eq!(row.attributes.get("wheelchair_accessible"), Some(&None));
}

#[test]
fn cloning_keeps_times() {
    let pattern = pattern(&[(60, 30), (120, 0)]);
    let editor = editor(pattern.clone());
    let timetable = timetable_for(&pattern);
    let mut template = persisted(&editor, &timetable, "t1");
    template.trip_headsign = Some("Hamnen".to_string());
    template.stop_times[1].arrival_time = Some(Time::from_seconds(500));

    let clone = editor.construct_new_row(&timetable, Some(&template)).unwrap();
    assert_eq!(clone.id, RowId::New);
    assert_eq!(clone.gtfs_trip_id, None);
    assert_eq!(clone.stop_times, template.stop_times);
    assert_eq!(clone.trip_headsign, template.trip_headsign);
}

#[test]
fn add_new_row_clones_last_row() {
    let pattern = pattern(&[(60, 30)]);
    let mut editor = editor(pattern.clone());
    let mut timetable = timetable_for(&pattern);
    editor.add_new_row(&mut timetable, true, false).unwrap();
    timetable.trips[0].stop_times[0].arrival_time = Some(Time::from_seconds(3600));

    editor.add_new_row(&mut timetable, false, true).unwrap();
    assert_eq!(timetable.len(), 2);
    assert_eq!(
        timetable.trips[1].stop_times[0].arrival_time,
        Some(Time::from_seconds(3600))
    );
    assert_eq!(editor.cursor.scroll_to_row, Some(1));
    assert_eq!(editor.cursor.scroll_to_column, Some(0));
}

#[test]
fn duplicate_rows_appends_in_ascending_order() {
    let pattern = pattern(&[(60, 0)]);
    let mut editor = editor(pattern.clone());
    let mut timetable = timetable_for(&pattern);
    for id in ["a", "b", "c"] {
        let mut row = persisted(&editor, &timetable, id);
        row.trip_headsign = Some(id.to_string());
        timetable.apply(TimetableAction::AddTrip(row));
    }

    let added = editor.duplicate_rows(&mut timetable, &[2, 0]);
    assert_eq!(added, 2);
    let headsigns: Vec<_> = timetable
        .trips
        .iter()
        .map(|trip| trip.trip_headsign.as_deref().unwrap())
        .collect();
    assert_eq!(headsigns, vec!["a", "b", "c", "a", "c"]);
    assert!(timetable.trips[3].is_new());
    assert_eq!(editor.cursor.scroll_to_row, Some(4));
}

#[test]
fn offsetting_by_remainder_restores_times() {
    let pattern = pattern(&[(60, 30), (120, 0), (600, 60)]);
    let editor = editor(pattern.clone());
    let mut timetable = timetable_for(&pattern);
    timetable.apply(TimetableAction::AddTrip(
        editor.construct_new_row(&timetable, None).unwrap(),
    ));
    let mut second = editor.construct_new_row(&timetable, None).unwrap();
    second.stop_times[1].departure_time = None;
    timetable.apply(TimetableAction::AddTrip(second));
    let original = timetable.trips.clone();

    for amount in [1, 300, 3600, 86_000] {
        editor.offset_rows(&mut timetable, &[0, 1], amount);
        editor.offset_rows(&mut timetable, &[0, 1], OFFSET_MODULUS - amount);
        for (row, before) in timetable.trips.iter().zip(original.iter()) {
            for (cell, before) in row.stop_times.iter().zip(before.stop_times.iter()) {
                let wraps = |after: Option<Time>, before: Option<Time>| match (after, before) {
                    (Some(after), Some(before)) => (after - before).rem_euclid(OFFSET_MODULUS) == 0,
                    (None, None) => true,
                    _ => false,
                };
                assert!(wraps(cell.arrival_time, before.arrival_time));
                assert!(wraps(cell.departure_time, before.departure_time));
            }
        }
    }
}

#[test]
fn offset_marks_rows_edited() {
    let pattern = pattern(&[(60, 0)]);
    let editor = editor(pattern.clone());
    let mut timetable = timetable_for(&pattern);
    timetable.apply(TimetableAction::AddTrip(
        editor.construct_new_row(&timetable, None).unwrap(),
    ));
    editor.offset_rows(&mut timetable, &[0], -30);
    editor.offset_rows(&mut timetable, &[0], 90);
    assert_eq!(timetable.edited, vec![0, 0]);
    assert_eq!(
        timetable.trips[0].stop_times[0].arrival_time,
        Some(Time::from_seconds(120))
    );
}

#[test]
fn removing_mixed_selection() {
    let pattern = pattern(&[(60, 0)]);
    let mut editor = editor(pattern.clone());
    let mut timetable = timetable_for(&pattern);
    timetable.apply(TimetableAction::AddTrip(persisted(&editor, &timetable, "t1")));
    timetable.apply(TimetableAction::AddTrip(
        editor.construct_new_row(&timetable, None).unwrap(),
    ));
    timetable.apply(TimetableAction::AddTrip(persisted(&editor, &timetable, "t2")));
    timetable.apply(TimetableAction::AddTrip(
        editor.construct_new_row(&timetable, None).unwrap(),
    ));
    timetable.apply(TimetableAction::AddTrip(
        editor.construct_new_row(&timetable, None).unwrap(),
    ));
    timetable.apply(TimetableAction::ToggleAllRows(true));
    timetable.apply(TimetableAction::ToggleRowSelection(4));

    let request = editor
        .remove_selected_rows(&mut timetable)
        .unwrap()
        .unwrap();
    assert_eq!(timetable.len(), 3);
    let deleted: Vec<_> = request.trips.iter().map(|trip| trip.id.to_string()).collect();
    assert_eq!(deleted, vec!["t2", "t1"]);
    assert_eq!(&*request.pattern_id, "p1");
    assert_eq!(&*request.calendar_id, "weekday");
    assert!(timetable.selected.is_empty());
}

#[test]
fn removing_only_new_rows_sends_nothing() {
    let pattern = pattern(&[(60, 0)]);
    let mut editor = editor(pattern.clone());
    let mut timetable = timetable_for(&pattern);
    editor.add_new_row(&mut timetable, true, false).unwrap();
    timetable.apply(TimetableAction::ToggleRowSelection(0));
    assert_eq!(editor.remove_selected_rows(&mut timetable), Ok(None));
    assert!(timetable.is_empty());
}

#[test]
fn removed_rows_leave_edited_set() {
    let pattern = pattern(&[(60, 0)]);
    let mut editor = editor(pattern.clone());
    let mut timetable = timetable_for(&pattern);
    editor.add_new_row(&mut timetable, true, false).unwrap();
    editor.add_new_row(&mut timetable, true, false).unwrap();
    editor.offset_rows(&mut timetable, &[1], 60);
    timetable.apply(TimetableAction::ToggleRowSelection(1));
    assert_eq!(editor.remove_selected_rows(&mut timetable), Ok(None));
    assert!(timetable.edited.is_empty());

    // The fresh row takes the removed row's index but was never touched.
    editor.add_new_row(&mut timetable, true, false).unwrap();
    let request = editor.save_edited_trips(&timetable).unwrap();
    assert!(request.trips.is_empty());
    assert!(request.rows.is_empty());
}

#[test]
fn removal_renumbers_later_edits() {
    let pattern = pattern(&[(60, 0)]);
    let mut editor = editor(pattern.clone());
    let mut timetable = timetable_for(&pattern);
    for _ in 0..3 {
        editor.add_new_row(&mut timetable, true, false).unwrap();
    }
    editor.offset_rows(&mut timetable, &[2], 60);
    timetable.apply(TimetableAction::ToggleRowSelection(0));
    editor.remove_selected_rows(&mut timetable).unwrap();

    let request = editor.save_edited_trips(&timetable).unwrap();
    assert_eq!(request.rows, vec![1]);
    assert_eq!(arrivals(&request.trips[0]), vec![Some(120)]);
}

#[test]
fn failed_saves_stay_edited() {
    let pattern = pattern(&[(60, 0)]);
    let editor = editor(pattern.clone());
    let mut timetable = timetable_for(&pattern);
    for _ in 0..6 {
        timetable.apply(TimetableAction::AddTrip(
            editor.construct_new_row(&timetable, None).unwrap(),
        ));
    }
    timetable.apply(TimetableAction::SetEdited(vec![2, 2, 5]));

    let request = editor.save_edited_trips(&timetable).unwrap();
    assert_eq!(request.trips.len(), 2);
    assert_eq!(request.rows, vec![2, 5]);

    let outcome = SaveOutcome {
        failed: vec![1],
        assigned: vec![(0, Arc::from("trip-7"))],
    };
    editor.complete_save(&mut timetable, &request, &outcome);
    assert_eq!(timetable.edited, vec![5]);
    assert_eq!(timetable.trips[2].id, RowId::Persisted("trip-7".into()));
    assert!(timetable.trips[5].is_new());
}

#[test]
fn saving_needs_calendar() {
    let pattern = pattern(&[(60, 0)]);
    let mut editor = editor(pattern.clone());
    editor.context.active_calendar_id = None;
    assert_eq!(
        editor.save_edited_trips(&timetable_for(&pattern)),
        Err(Error::NoActiveCalendar)
    );
}

#[test]
fn update_cell_validates_against_next_time() {
    let pattern = pattern(&[(60, 30), (120, 0)]);
    let mut editor = editor(pattern.clone());
    let mut timetable = timetable_for(&pattern);
    editor.add_new_row(&mut timetable, true, false).unwrap();
    // Columns: trip id, headsign, block, then arrival/departure per stop.
    let departure_0 = 4;
    assert_eq!(timetable.columns[departure_0].key, ColumnKey::Departure(0));

    let late = CellValue::Time(Some(Time::from_seconds(210)));
    assert!(!editor.update_cell(&mut timetable, 0, departure_0, late));
    assert!(timetable.edited.is_empty());

    let ok = CellValue::Time(Some(Time::from_seconds(200)));
    assert!(editor.update_cell(&mut timetable, 0, departure_0, ok));
    assert_eq!(
        timetable.trips[0].stop_times[0].departure_time,
        Some(Time::from_seconds(200))
    );
    assert_eq!(editor.cursor.active_cell, Some((0, departure_0)));
    assert_eq!(timetable.edited, vec![0]);

    let headsign = CellValue::Text(Some("Hamnen".to_string()));
    assert!(editor.update_cell(&mut timetable, 0, 1, headsign));
    assert!(!editor.update_cell(&mut timetable, 0, 1, CellValue::Time(None)));
}

#[test]
fn view_follows_selection_and_viewport() {
    let pattern = pattern(&[(60, 0)]);
    let mut editor = editor(pattern);
    let signal = ViewportSignal::new(ViewportSize {
        width: 1200,
        height: 800,
    });
    editor.mount(&signal);
    assert_eq!(editor.view(), TimetableView::Grid { height: 632 });

    signal.resize(ViewportSize {
        width: 1200,
        height: 1000,
    });
    assert_eq!(editor.view(), TimetableView::Grid { height: 832 });

    editor.unmount();
    assert_eq!(signal.listener_count(), 0);

    editor.context.active_calendar_id = None;
    assert_eq!(editor.view(), TimetableView::ChooseCalendar);
    editor.context.active_pattern = None;
    assert_eq!(editor.view(), TimetableView::ChoosePattern);
}

#[test]
fn create_calendar_requests_new_entity() {
    let request = editor(pattern(&[])).create_calendar();
    assert_eq!(request.entity_id, RowId::New);
    assert_eq!(&*request.feed_id, "feed");
}
