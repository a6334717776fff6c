use quill::repository::Repository;
use std::path::PathBuf;
use tokio::sync::RwLock;

pub struct AppState {
    pub gtfs_data_path: PathBuf,
    pub repository: RwLock<Repository>,
}

impl AppState {
    pub fn new(gtfs_data_path: PathBuf, repository: Repository) -> Self {
        Self {
            gtfs_data_path,
            repository: RwLock::new(repository),
        }
    }
}
