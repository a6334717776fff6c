pub mod gtfs;
pub mod map;
pub mod model;
pub mod repository;
pub mod service;
pub mod shared;
pub mod store;
pub mod timetable;

pub mod prelude {
    pub use crate::gtfs::Gtfs;
    pub use crate::map::{MapConfig, MapEditor, MapEffect, MouseButton, StopIndex};
    pub use crate::model::*;
    pub use crate::repository::Repository;
    pub use crate::service::{
        DeleteTripsRequest, PatternService, SaveOutcome, SaveTripsRequest, StopService,
        TripService,
    };
    pub use crate::shared::geo::{Bounds, Coordinate, Distance};
    pub use crate::shared::time::{Duration, Time};
    pub use crate::store::{PatternsAction, PatternsState, Timetable, TimetableAction};
    pub use crate::timetable::{EditorContext, TimetableEditor};
}
