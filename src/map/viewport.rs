use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::shared::geo::Bounds;

/// Viewport as last reported to shared state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapState {
    pub zoom: u8,
    pub bounds: Option<Bounds>,
    /// Key of the routes GeoJSON overlay currently loaded, if any.
    pub routes_geojson: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MapSettingUpdate {
    Zoom(u8),
    Bounds(Bounds),
}

impl MapState {
    pub fn apply(&mut self, update: &MapSettingUpdate) {
        match update {
            MapSettingUpdate::Zoom(zoom) => self.zoom = *zoom,
            MapSettingUpdate::Bounds(bounds) => self.bounds = Some(*bounds),
        }
    }
}

/// Keeps the widget's viewport and shared state in step.
///
/// After a deliberate fly-to, the widget reports the intermediate viewports
/// it passes through. Those are swallowed until `grace` has elapsed since
/// the first swallowed report so they do not override the requested target.
#[derive(Debug, Clone)]
pub struct ViewportSync {
    grace: Duration,
    zoom_to_target: bool,
    release_at: Option<Instant>,
    target: Option<Bounds>,
}

impl ViewportSync {
    pub fn new(grace: Duration) -> Self {
        Self {
            grace,
            zoom_to_target: false,
            release_at: None,
            target: None,
        }
    }

    /// Requests a fly-to `target`. Asking again for the same target is a no-op.
    pub fn zoom_to(&mut self, target: Bounds) -> bool {
        if self.target == Some(target) {
            return false;
        }
        debug!("Zooming to target {:?}", target);
        self.target = Some(target);
        self.zoom_to_target = true;
        self.release_at = None;
        true
    }

    /// Bounds the widget should be forced to, while a fly-to is in progress.
    pub fn forced_bounds(&self) -> Option<Bounds> {
        self.zoom_to_target.then_some(self.target).flatten()
    }

    /// Handles a move/zoom end reported by the widget at `now`.
    pub fn on_bounds_changed(
        &mut self,
        state: &MapState,
        now: Instant,
        zoom: u8,
        bounds: Bounds,
    ) -> Vec<MapSettingUpdate> {
        if self.zoom_to_target {
            match self.release_at {
                Some(release_at) if now >= release_at => {
                    self.zoom_to_target = false;
                    self.release_at = None;
                }
                Some(_) => return Vec::new(),
                None => {
                    self.release_at = Some(now + self.grace);
                    return Vec::new();
                }
            }
        }

        let mut updates = Vec::new();
        if state.zoom != zoom {
            updates.push(MapSettingUpdate::Zoom(zoom));
        }
        if state.bounds != Some(bounds) {
            updates.push(MapSettingUpdate::Bounds(bounds));
        }
        updates
    }
}
