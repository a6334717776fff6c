//! Map editing: what a click means for the active entity, which overlays
//! are drawn, and keeping the viewport in step with shared state.

use std::{cell::Cell, rc::Rc, sync::Arc, time::Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    model::{Component, Pattern, Route, Stop, StopDraft},
    shared::{
        geo::{Bounds, Coordinate, FEED_BOUNDS_PADDING, LAT_LNG_PRECISION},
        signal::{Subscription, ViewportSignal, ViewportSize},
    },
};

mod config;
mod index;
pub mod layers;
mod render;
mod viewport;

pub use config::*;
pub use index::*;
pub use layers::MapLayer;
pub use render::*;
pub use viewport::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Primary,
    /// Right click / context menu.
    Secondary,
}

/// What a click on the map does while a pattern's geometry is edited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnMapClick {
    #[default]
    NoAction,
    AddStopAtClick,
    AddStopsAtIntersections,
    AddStopsAtInterval,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditSettings {
    pub edit_geometry: bool,
    pub on_map_click: OnMapClick,
}

/// The entity currently selected for editing.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ActiveEntity {
    #[default]
    None,
    Stop(Option<Stop>),
    Route {
        route: Route,
        pattern: Option<Pattern>,
        /// Whether the pattern sub-editor is open.
        editing_pattern: bool,
    },
}

impl ActiveEntity {
    pub fn component(&self) -> Option<Component> {
        match self {
            ActiveEntity::None => None,
            ActiveEntity::Stop(_) => Some(Component::Stop),
            ActiveEntity::Route { .. } => Some(Component::Route),
        }
    }

    pub fn entity_id(&self) -> Option<Arc<str>> {
        match self {
            ActiveEntity::None | ActiveEntity::Stop(None) => None,
            ActiveEntity::Stop(Some(stop)) => Some(stop.id.clone()),
            ActiveEntity::Route { route, .. } => Some(route.id.clone()),
        }
    }

    fn active_stop(&self) -> Option<&Stop> {
        match self {
            ActiveEntity::Stop(stop) => stop.as_ref(),
            _ => None,
        }
    }
}

/// Work the host must carry out in response to a map event.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEffect {
    /// The pending new stop was moved; persist the new location on the entity.
    UpdateActiveEntity(Stop),
    CreateStop(StopDraft),
    SelectStop(Stop),
    AddStopAtPoint {
        coordinate: Coordinate,
        pattern_id: Arc<str>,
    },
    AddStopAtIntersection {
        coordinate: Coordinate,
        pattern_id: Arc<str>,
    },
    AddStopAtInterval {
        coordinate: Coordinate,
        pattern_id: Arc<str>,
    },
    UpdateMapSetting(MapSettingUpdate),
    FetchTripPatterns {
        feed_id: Arc<str>,
    },
    UpdateUserMapLayer {
        layer_id: &'static str,
    },
}

/// Host-controlled placement of the map panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapLayout {
    pub hidden: bool,
    /// Width taken by panels left of the map, in pixels.
    pub offset: u32,
    pub sidebar_expanded: bool,
}

pub struct MapEditor {
    pub feed_id: Arc<str>,
    pub config: MapConfig,
    pub active: ActiveEntity,
    pub edit_settings: EditSettings,
    pub map_state: MapState,
    pub stops: StopIndex,
    pub layout: MapLayout,
    pub patterns_loaded: bool,
    sync: ViewportSync,
    viewport: Rc<Cell<ViewportSize>>,
    subscription: Option<Subscription>,
}

impl MapEditor {
    pub fn new(feed_id: Arc<str>, config: MapConfig) -> Self {
        Self {
            feed_id,
            sync: ViewportSync::new(config.zoom_grace),
            config,
            active: ActiveEntity::None,
            edit_settings: EditSettings::default(),
            map_state: MapState::default(),
            stops: StopIndex::new(),
            layout: MapLayout::default(),
            patterns_loaded: false,
            viewport: Rc::default(),
            subscription: None,
        }
    }

    pub fn with_stops(mut self, stops: impl IntoIterator<Item = Stop>) -> Self {
        self.stops = stops.into_iter().collect();
        self
    }

    pub fn mount(&mut self, signal: &ViewportSignal) {
        let viewport = self.viewport.clone();
        self.subscription = Some(signal.subscribe(move |size| viewport.set(size)));
    }

    pub fn unmount(&mut self) {
        self.subscription = None;
    }

    pub fn width(&self) -> u32 {
        self.config.map_width(
            self.viewport.get(),
            self.layout.offset,
            self.layout.sidebar_expanded,
        )
    }

    pub fn set_active(&mut self, active: ActiveEntity) {
        self.active = active;
    }

    /// Opens the map on the feed's extent, padded.
    pub fn fit_feed(&mut self, feed_bounds: Bounds) -> bool {
        self.zoom_to(feed_bounds.padded(FEED_BOUNDS_PADDING))
    }

    pub fn zoom_to(&mut self, target: Bounds) -> bool {
        if self.sync.zoom_to(target) {
            self.map_state.bounds = Some(target);
            true
        } else {
            false
        }
    }

    pub fn on_click(&mut self, coordinate: Coordinate, button: MouseButton) -> Vec<MapEffect> {
        match button {
            MouseButton::Primary => self.on_primary_click(coordinate),
            MouseButton::Secondary => self.on_secondary_click(coordinate).into_iter().collect(),
        }
    }

    fn on_primary_click(&mut self, coordinate: Coordinate) -> Vec<MapEffect> {
        let location = coordinate.rounded(LAT_LNG_PRECISION);
        let mut effects = Vec::new();
        match &mut self.active {
            ActiveEntity::Stop(Some(stop)) if stop.is_new() => {
                stop.coordinate = location;
                self.stops.insert(stop.clone());
                effects.push(MapEffect::UpdateActiveEntity(stop.clone()));
            }
            ActiveEntity::Stop(_) => {
                if !self.stops.has_new() {
                    info!("Creating stop at {}", location);
                    effects.push(MapEffect::CreateStop(StopDraft::at(
                        self.feed_id.clone(),
                        location,
                    )));
                }
            }
            ActiveEntity::Route {
                pattern: Some(pattern),
                editing_pattern: true,
                ..
            } if self.edit_settings.edit_geometry => {
                let pattern_id = pattern.id.clone();
                let effect = match self.edit_settings.on_map_click {
                    OnMapClick::NoAction => None,
                    OnMapClick::AddStopAtClick => Some(MapEffect::AddStopAtPoint {
                        coordinate,
                        pattern_id,
                    }),
                    OnMapClick::AddStopsAtIntersections => {
                        Some(MapEffect::AddStopAtIntersection {
                            coordinate,
                            pattern_id,
                        })
                    }
                    OnMapClick::AddStopsAtInterval => Some(MapEffect::AddStopAtInterval {
                        coordinate,
                        pattern_id,
                    }),
                };
                effects.extend(effect);
            }
            _ => {}
        }
        effects
    }

    fn on_secondary_click(&mut self, coordinate: Coordinate) -> Option<MapEffect> {
        if !matches!(self.active, ActiveEntity::Stop(_)) {
            return None;
        }
        let stop = self
            .stops
            .nearest_within_degrees(&coordinate, self.config.selection_tolerance())?
            .clone();
        debug!("Map click selected stop {}", stop.id);
        if self.active.active_stop().is_some_and(|active| active.id == stop.id) {
            return None;
        }
        self.active = ActiveEntity::Stop(Some(stop.clone()));
        Some(MapEffect::SelectStop(stop))
    }

    /// A stop created in response to [`MapEffect::CreateStop`] becomes the active one.
    pub fn complete_create_stop(&mut self, stop: Stop) {
        self.stops.insert(stop.clone());
        self.active = ActiveEntity::Stop(Some(stop));
    }

    pub fn on_bounds_changed(&mut self, now: Instant, zoom: u8, bounds: Bounds) -> Vec<MapEffect> {
        let updates = self
            .sync
            .on_bounds_changed(&self.map_state, now, zoom, bounds);
        updates
            .into_iter()
            .map(|update| {
                self.map_state.apply(&update);
                MapEffect::UpdateMapSetting(update)
            })
            .collect()
    }

    pub fn on_overlay_added(&self, name: &str) -> Option<MapEffect> {
        (name == layers::ROUTE_ALIGNMENTS && !self.patterns_loaded).then(|| {
            MapEffect::FetchTripPatterns {
                feed_id: self.feed_id.clone(),
            }
        })
    }

    pub fn on_base_layer_changed(&self, name: &str) -> Option<MapEffect> {
        layers::base_layer_id(name).map(|layer_id| MapEffect::UpdateUserMapLayer { layer_id })
    }

    /// Overlays to draw for the current selection, in drawing order.
    pub fn layers(&self) -> Vec<MapLayer> {
        if self.layout.hidden {
            return Vec::new();
        }
        let mut layers = match &self.active {
            ActiveEntity::Route { .. } => {
                let mut layers = vec![MapLayer::Patterns, MapLayer::DirectionIcons];
                if self.edit_settings.edit_geometry {
                    layers.push(MapLayer::ControlPoints);
                }
                layers.extend([MapLayer::PatternStops, MapLayer::AddableStops]);
                layers
            }
            ActiveEntity::Stop(_) => vec![MapLayer::Stops],
            ActiveEntity::None => Vec::new(),
        };
        if self.map_state.routes_geojson.is_some() {
            layers.push(MapLayer::RoutesGeoJson);
        }
        layers
    }

    pub fn draw_stops(&self) -> bool {
        self.map_state.zoom >= self.config.draw_stops_zoom
    }

    pub fn props(&self) -> MapProps {
        MapProps {
            hidden: self.layout.hidden,
            offset: self.layout.offset,
            sidebar_expanded: self.layout.sidebar_expanded,
            viewport: self.viewport.get(),
            feed_id: self.feed_id.clone(),
            active_component: self.active.component(),
            active_entity_id: self.active.entity_id(),
            active_stop_coordinate: self.active.active_stop().map(|stop| stop.coordinate),
            patterns_loaded: self.patterns_loaded,
            routes_geojson: self.map_state.routes_geojson.clone(),
            draw_stops: self.draw_stops(),
            bounds: self.map_state.bounds,
            edit_settings: self.edit_settings.clone(),
            forced_bounds: self.sync.forced_bounds(),
        }
    }
}
