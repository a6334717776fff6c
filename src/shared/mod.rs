pub mod geo;
pub mod signal;
pub mod time;

pub use geo::*;
pub use signal::*;
pub use time::*;

