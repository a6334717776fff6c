use std::sync::Arc;

use crate::{
    model::Component,
    shared::{Bounds, Coordinate, ViewportSize},
};

use super::EditSettings;

/// Inputs the map view is drawn from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapProps {
    pub hidden: bool,
    pub offset: u32,
    pub sidebar_expanded: bool,
    pub viewport: ViewportSize,
    pub feed_id: Arc<str>,
    pub active_component: Option<Component>,
    pub active_entity_id: Option<Arc<str>>,
    /// Location of the active stop, compared so that dragging it redraws.
    pub active_stop_coordinate: Option<Coordinate>,
    pub patterns_loaded: bool,
    pub routes_geojson: Option<String>,
    pub draw_stops: bool,
    pub bounds: Option<Bounds>,
    pub edit_settings: EditSettings,
    pub forced_bounds: Option<Bounds>,
}

/// Whether the view must be redrawn going from `prev` to `next`.
///
/// A map that stays hidden never redraws. Bounds only matter while stops are
/// drawn, since the stops layer is the only bounds-dependent overlay.
pub fn should_update(prev: &MapProps, next: &MapProps) -> bool {
    if prev.hidden && next.hidden {
        return false;
    }
    let entity_changed = matches!(
        next.active_component,
        Some(Component::Stop | Component::Route)
    ) && prev.active_entity_id != next.active_entity_id;
    let stop_moved = next.active_component == Some(Component::Stop)
        && prev.active_stop_coordinate != next.active_stop_coordinate;

    prev.hidden != next.hidden
        || prev.offset != next.offset
        || prev.sidebar_expanded != next.sidebar_expanded
        || prev.viewport != next.viewport
        || prev.active_component != next.active_component
        || prev.edit_settings != next.edit_settings
        || prev.forced_bounds != next.forced_bounds
        || prev.routes_geojson != next.routes_geojson
        || prev.draw_stops != next.draw_stops
        || entity_changed
        || (next.patterns_loaded && !prev.patterns_loaded)
        || prev.feed_id != next.feed_id
        || (next.draw_stops && prev.bounds != next.bounds)
        || stop_moved
}

/// Remembers the last drawn inputs and tells whether new ones need a redraw.
#[derive(Debug, Clone, Default)]
pub struct RenderGate {
    last: Option<MapProps>,
}

impl RenderGate {
    pub fn check(&mut self, next: MapProps) -> bool {
        let update = match &self.last {
            Some(prev) => should_update(prev, &next),
            None => true,
        };
        self.last = Some(next);
        update
    }
}
