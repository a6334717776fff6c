mod gtfs;
mod stops;
mod trips;

pub use gtfs::*;
pub use stops::*;
pub use trips::*;

use axum::http::StatusCode;
use quill::service;
use tracing::warn;

fn status_from(err: service::Error) -> StatusCode {
    warn!("Service error: {err}");
    match err {
        service::Error::UnknownFeed(_)
        | service::Error::UnknownPattern(_)
        | service::Error::UnknownCalendar(_) => StatusCode::NOT_FOUND,
    }
}
