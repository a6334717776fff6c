use quill::{
    model::{Column, TripRow},
    store::Timetable,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimetableDto {
    pub columns: Vec<Column>,
    pub trips: Vec<TripRow>,
}

impl From<Timetable> for TimetableDto {
    fn from(timetable: Timetable) -> Self {
        Self {
            columns: timetable.columns,
            trips: timetable.trips,
        }
    }
}
