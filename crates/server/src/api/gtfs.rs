use crate::{dto::CalendarDto, state::AppState};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::StreamExt;
use quill::prelude::*;
use reqwest::header::ACCEPT_ENCODING;
use std::{collections::HashMap, fs, path::Path, sync::Arc};
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::{error, info};

pub async fn age(
    Query(_): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    if state.gtfs_data_path.exists() {
        let last_modifed = seconds_since_modified(&state.gtfs_data_path)?;
        Ok(last_modifed.to_string().into_response())
    } else {
        Err(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

fn seconds_since_modified<P: AsRef<Path>>(path: P) -> Result<u64, StatusCode> {
    let meta_data = fs::metadata(path).map_err(|err| {
        error!("Failed to get metadata: {err}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    let modified = meta_data.modified().map_err(|err| {
        error!("Failed to get modified: {err}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    let duration = modified.elapsed().map_err(|err| {
        error!("Failed to elapsed time since modified: {err}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(duration.as_secs())
}

/// Downloads the feed at `q` over the current one and reloads the repository.
pub async fn fetch_url(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    let Some(q) = params.get("q") else {
        return Err(StatusCode::BAD_REQUEST);
    };
    let response = reqwest::Client::new()
        .get(q)
        .header(ACCEPT_ENCODING, "gzip, deflate")
        .send()
        .await
        .map_err(|err| {
            error!("Failed to fetch: {err}");
            StatusCode::BAD_REQUEST
        })?;

    if !response.status().is_success() {
        let body = response.text().await.unwrap_or_default();
        error!("Response is not success: {body}");
        return Err(StatusCode::BAD_REQUEST);
    }

    let mut file = File::create(&state.gtfs_data_path).await.map_err(|err| {
        error!("Failed to create file: {err}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let data = chunk.map_err(|err| {
            error!("Failed to fetch chunk: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

        file.write_all(&data).await.map_err(|err| {
            error!("Failed to write to file: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    }

    file.flush().await.map_err(|err| {
        error!("Failed to flush file: {err}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let feed_id = state.repository.read().await.feed_id.clone();
    let gtfs = Gtfs::default().from_zip(&state.gtfs_data_path);
    let repo = Repository::new(feed_id).load_gtfs(&gtfs).map_err(|err| {
        error!("Failed load gtfs file: {err}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    info!("Reloaded feed with {} patterns", repo.patterns().len());

    *state.repository.write().await = repo;
    Ok(().into_response())
}

pub async fn patterns(State(state): State<Arc<AppState>>) -> Result<Response, StatusCode> {
    let repository = state.repository.read().await;
    let response = repository
        .fetch_patterns(&repository.feed_id)
        .map_err(super::status_from)?;
    Ok(Json(response).into_response())
}

pub async fn calendars(State(state): State<Arc<AppState>>) -> Response {
    let repository = state.repository.read().await;
    let result: Vec<_> = repository
        .calendars()
        .iter()
        .map(CalendarDto::from)
        .collect();
    Json(result).into_response()
}
