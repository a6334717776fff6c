use std::{collections::HashMap, sync::Arc};

use crate::{dto::StopDto, state::AppState};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use quill::{map::MAX_SEARCH_DISTANCE, prelude::*};

const DEFAULT_NEAR_DISTANCE: f64 = 500.0;
const DEFAULT_NEAR_COUNT: usize = 10;

pub async fn near(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    let latitude: f64 = parse_param(&params, "lat")?.ok_or(StatusCode::BAD_REQUEST)?;
    let longitude: f64 = parse_param(&params, "lon")?.ok_or(StatusCode::BAD_REQUEST)?;
    let distance: f64 = parse_param(&params, "distance")?.unwrap_or(DEFAULT_NEAR_DISTANCE);
    let count: usize = parse_param(&params, "count")?.unwrap_or(DEFAULT_NEAR_COUNT);
    if !(0.0..=MAX_SEARCH_DISTANCE.as_meters()).contains(&distance) {
        return Err(StatusCode::BAD_REQUEST);
    }

    let coordinate = Coordinate::new(latitude, longitude);
    let repository = state.repository.read().await;
    let result: Vec<_> = repository
        .stops_by_coordinate(&coordinate, Distance::from_meters(distance))
        .into_iter()
        .take(count)
        .map(|stop| StopDto::near(stop, &coordinate))
        .collect();
    Ok(Json(result).into_response())
}

pub async fn create_stop(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<StopDraft>,
) -> Result<Response, StatusCode> {
    let stop = state
        .repository
        .write()
        .await
        .create_stop(&draft)
        .map_err(super::status_from)?;
    Ok((StatusCode::CREATED, Json(StopDto::from(&stop))).into_response())
}

fn parse_param<T: std::str::FromStr>(
    params: &HashMap<String, String>,
    name: &str,
) -> Result<Option<T>, StatusCode> {
    match params.get(name) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| StatusCode::BAD_REQUEST),
        None => Ok(None),
    }
}
