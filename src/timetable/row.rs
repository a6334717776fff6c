use tracing::debug;

use crate::{
    model::{Column, ColumnKey, Pattern, RowId, StopTimeCell, TripRow},
    shared::time::Time,
};

use super::{EditorContext, Error};

/// Builds a row to append to the timetable.
///
/// With a template the row is a copy of it that only loses its identity.
/// Without one, times are seeded from the active pattern's default travel
/// and dwell times, accumulated from zero.
pub fn construct_new_row(
    context: &EditorContext,
    columns: &[Column],
    template: Option<&TripRow>,
) -> Result<TripRow, Error> {
    if let Some(template) = template {
        let mut row = template.clone();
        row.id = RowId::New;
        row.gtfs_trip_id = None;
        return Ok(row);
    }

    let pattern = context.active_pattern.as_ref().ok_or(Error::NoActivePattern)?;
    let mut row = TripRow {
        stop_times: seed_stop_times(pattern),
        ..Default::default()
    };

    columns
        .iter()
        .filter(|column| !column.is_time())
        .for_each(|column| {
            if let ColumnKey::Attribute(name) = &column.key {
                row.attributes.entry(name.clone()).or_insert(None);
            }
        });

    row.id = RowId::New;
    row.gtfs_trip_id = None;
    row.use_frequency = pattern.use_frequency;
    row.feed_id = context.feed_id.clone();
    row.pattern_id = pattern.id.clone();
    row.route_id = pattern.route_id.clone();
    row.calendar_id = context.active_calendar_id.clone();
    debug!(
        "Constructed blank row with {} stop times for pattern {}",
        row.stop_times.len(),
        pattern.id
    );
    Ok(row)
}

fn seed_stop_times(pattern: &Pattern) -> Vec<StopTimeCell> {
    let mut cumulative = Time::from_seconds(0);
    pattern
        .pattern_stops
        .iter()
        .map(|stop| {
            cumulative += stop.default_travel_time;
            let arrival_time = cumulative;
            cumulative += stop.default_dwell_time;
            StopTimeCell {
                stop_id: stop.stop_id.clone(),
                arrival_time: Some(arrival_time),
                departure_time: Some(cumulative),
            }
        })
        .collect()
}
