mod api;
mod dto;
mod state;

use crate::state::AppState;
use axum::routing::get;
use quill::{gtfs::Gtfs, repository::Repository};
use std::{path::Path, sync::Arc, time::Instant};
use tracing::{error, info};

const PORT: u32 = 3000;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    info!("Starting server...");
    let args: Vec<_> = std::env::args().collect();
    if args.len() < 2 {
        error!("Missing gtfs zip");
        std::process::exit(1);
    }
    let path = match Path::new(&args[1]).canonicalize() {
        Ok(path) => path,
        Err(err) => {
            error!("Invalid gtfs path {}: {err}", args[1]);
            std::process::exit(1);
        }
    };
    let feed_id = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "feed".to_string());

    info!("Loading data...");
    let now = Instant::now();
    let gtfs = Gtfs::default().from_zip(&path);
    let repo = match Repository::new(feed_id).load_gtfs(&gtfs) {
        Ok(repo) => repo,
        Err(err) => {
            error!("Failed to load gtfs: {err}");
            std::process::exit(1);
        }
    };
    let state = Arc::new(AppState::new(path, repo));
    info!("Loading data took {:?}", now.elapsed());

    let app = axum::Router::new()
        .route("/patterns", get(api::patterns))
        .route("/calendars", get(api::calendars))
        .route("/timetable", get(api::timetable))
        .route("/trips", axum::routing::post(api::save_trips).delete(api::delete_trips))
        .route("/stops", axum::routing::post(api::create_stop))
        .route("/near", get(api::near))
        .route("/fetch", get(api::fetch_url))
        .route("/age", get(api::age))
        .with_state(state);
    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", PORT)).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind port {PORT}: {err}");
            std::process::exit(1);
        }
    };
    info!("Listening to port {PORT}");
    if let Err(err) = axum::serve(listener, app).await {
        error!("Server error: {err}");
    }
}
