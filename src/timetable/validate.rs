use crate::{
    model::{CellValue, Column, TripRow},
    shared::time::Time,
};

/// Structural check of a candidate cell value.
///
/// Time cells must hold a non-negative time strictly below `bound` when one
/// is given. Plain cells are always accepted.
pub fn is_data_valid(column: &Column, value: &CellValue, bound: Option<Time>) -> bool {
    if !column.is_time() {
        return true;
    }
    match value {
        CellValue::Time(Some(time)) => {
            time.as_seconds() >= 0 && bound.is_none_or(|bound| *time < bound)
        }
        _ => false,
    }
}

/// Upper bound for a time cell: the next time column of the row that holds a value.
pub(crate) fn bound_for(columns: &[Column], row: &TripRow, index: usize) -> Option<Time> {
    columns
        .iter()
        .skip(index + 1)
        .filter(|column| column.is_time())
        .find_map(|column| row.time(&column.key))
}

#[cfg(test)]
use crate::model::ColumnKey;

#[test]
fn plain_columns_accept_anything() {
    let column = Column::plain(ColumnKey::TripHeadsign, "Headsign");
    assert!(is_data_valid(&column, &CellValue::Text(None), None));
}

#[test]
fn time_columns_need_value_below_bound() {
    let column = Column::time(ColumnKey::Arrival(0), "A");
    let value = |secs| CellValue::Time(Some(Time::from_seconds(secs)));
    assert!(is_data_valid(&column, &value(60), Some(Time::from_seconds(90))));
    assert!(!is_data_valid(&column, &value(90), Some(Time::from_seconds(90))));
    assert!(!is_data_valid(&column, &value(-1), None));
    assert!(!is_data_valid(&column, &CellValue::Time(None), None));
    assert!(is_data_valid(&column, &value(0), None));
}
