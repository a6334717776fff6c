//! Shared editor state. Views never mutate these directly, they dispatch
//! actions through `apply`.

mod patterns;
mod timetable;

pub use patterns::*;
pub use timetable::*;
