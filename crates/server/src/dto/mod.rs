mod calendar;
mod stop;
mod timetable;

pub use calendar::*;
pub use stop::*;
pub use timetable::*;
