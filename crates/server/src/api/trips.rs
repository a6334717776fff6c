use std::{collections::HashMap, sync::Arc};

use crate::{dto::TimetableDto, state::AppState};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use quill::prelude::*;

pub async fn timetable(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    let (Some(pattern), Some(calendar)) = (params.get("pattern"), params.get("calendar")) else {
        return Err(StatusCode::BAD_REQUEST);
    };
    let repository = state.repository.read().await;
    let timetable = repository
        .timetable(pattern, calendar, &[])
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(TimetableDto::from(timetable)).into_response())
}

pub async fn save_trips(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SaveTripsRequest>,
) -> Result<Response, StatusCode> {
    let outcome = state
        .repository
        .write()
        .await
        .save_trips(&request)
        .map_err(super::status_from)?;
    Ok(Json(outcome).into_response())
}

pub async fn delete_trips(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DeleteTripsRequest>,
) -> Result<Response, StatusCode> {
    state
        .repository
        .write()
        .await
        .delete_trips(&request)
        .map_err(super::status_from)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
