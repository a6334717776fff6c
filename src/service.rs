//! Contracts of the remote collaborators the editor talks to.
//!
//! Editor operations build the request values below and apply the outcome
//! once the caller has run them, so nothing here blocks the editor's thread.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    model::{Stop, StopDraft, TripRow},
    store::PatternsResponse,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown feed: {0}")]
    UnknownFeed(String),
    #[error("Unknown pattern: {0}")]
    UnknownPattern(String),
    #[error("Unknown calendar: {0}")]
    UnknownCalendar(String),
}

/// Batch of edited rows to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveTripsRequest {
    pub feed_id: Arc<str>,
    pub pattern_id: Arc<str>,
    pub calendar_id: Arc<str>,
    pub trips: Vec<TripRow>,
    /// Timetable row index of each submitted trip. Local bookkeeping only.
    #[serde(default, skip_serializing)]
    pub rows: Vec<usize>,
}

/// Result of a batch save, positions refer to `SaveTripsRequest::trips`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub failed: Vec<usize>,
    /// Ids given to rows that were saved for the first time.
    #[serde(default)]
    pub assigned: Vec<(usize, Arc<str>)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteTripsRequest {
    pub feed_id: Arc<str>,
    pub pattern_id: Arc<str>,
    pub calendar_id: Arc<str>,
    pub trips: Vec<TripRow>,
}

pub trait StopService {
    fn create_stop(&mut self, draft: &StopDraft) -> Result<Stop, Error>;
}

pub trait TripService {
    fn save_trips(&mut self, request: &SaveTripsRequest) -> Result<SaveOutcome, Error>;
    fn delete_trips(&mut self, request: &DeleteTripsRequest) -> Result<(), Error>;
}

pub trait PatternService {
    fn fetch_patterns(&self, feed_id: &str) -> Result<PatternsResponse, Error>;
}
