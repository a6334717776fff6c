use serde::de::DeserializeOwned;
use std::{
    fs::File,
    io::{self},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::warn;
use zip::{ZipArchive, read::ZipFile};

mod config;
pub mod models;
pub use config::*;
pub use models::*;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Could not find file with name: {0}")]
    FileNotFound(String),
}

#[derive(Default)]
pub enum StorageType {
    #[default]
    None,
    Zip(PathBuf),
}

/// Streaming reader over the CSV files of a GTFS feed.
#[derive(Default)]
pub struct Gtfs {
    config: Config,
    storage: StorageType,
}

impl Gtfs {
    pub fn new(config: self::Config) -> Self {
        Self {
            config,
            storage: Default::default(),
        }
    }

    pub fn from_zip<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.storage = StorageType::Zip(path.as_ref().to_path_buf());
        self
    }

    pub fn stream_stops<F>(&self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsStop)),
    {
        self.stream(&self.config.stops_file_name, f)
    }

    pub fn stream_routes<F>(&self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsRoute)),
    {
        self.stream(&self.config.routes_file_name, f)
    }

    pub fn stream_trips<F>(&self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsTrip)),
    {
        self.stream(&self.config.trips_file_name, f)
    }

    pub fn stream_stop_times<F>(&self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsStopTime)),
    {
        self.stream(&self.config.stop_times_file_name, f)
    }

    /// `calendar.txt` is optional in GTFS, a feed without one streams nothing.
    pub fn stream_calendar<F>(&self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsCalendar)),
    {
        match self.stream(&self.config.calendar_file_name, f) {
            Err(self::Error::FileNotFound(name)) => {
                warn!("Feed has no {name}");
                Ok(())
            }
            result => result,
        }
    }

    fn stream<T, F>(&self, file_name: &str, f: F) -> Result<(), self::Error>
    where
        T: DeserializeOwned,
        F: FnMut((usize, T)),
    {
        match &self.storage {
            StorageType::None => Ok(()),
            StorageType::Zip(path) => stream_from_zip::<T, F>(path, file_name, f),
        }
    }
}

fn stream_from_zip<T, F>(zip_path: &Path, file_name: &str, f: F) -> Result<(), self::Error>
where
    T: DeserializeOwned,
    F: FnMut((usize, T)),
{
    let zip_file = File::open(zip_path)?;
    let mut archive = ZipArchive::new(zip_file)?;
    let file = get_file(&mut archive, file_name)?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
    let mut skipped = 0usize;
    reader
        .deserialize::<T>()
        .filter_map(|row| match row {
            Ok(row) => Some(row),
            Err(_) => {
                skipped += 1;
                None
            }
        })
        .enumerate()
        .for_each(f);
    if skipped > 0 {
        warn!("Skipped {skipped} malformed rows in {file_name}");
    }
    Ok(())
}

fn get_file<'a>(
    archive: &'a mut ZipArchive<File>,
    name: &'a str,
) -> Result<ZipFile<'a, File>, self::Error> {
    let index = archive
        .index_for_name(name)
        .ok_or(self::Error::FileNotFound(name.to_string()))?;
    let file = archive.by_index(index)?;
    Ok(file)
}
