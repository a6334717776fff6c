use serde::Serialize;

/// Base layers the user can pick from, by display name and tile set id.
pub const MAP_LAYERS: &[(&str, &str)] = &[
    ("Streets", "mapbox.streets"),
    ("Light", "mapbox.light"),
    ("Dark", "mapbox.dark"),
    ("Satellite", "mapbox.streets-satellite"),
];

/// Name of the overlay that shows every route alignment of the feed.
pub const ROUTE_ALIGNMENTS: &str = "Route alignments";

/// Overlays drawn on top of the base layer, in drawing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MapLayer {
    Patterns,
    DirectionIcons,
    ControlPoints,
    PatternStops,
    AddableStops,
    Stops,
    RoutesGeoJson,
}

pub fn base_layer_id(name: &str) -> Option<&'static str> {
    MAP_LAYERS
        .iter()
        .find(|(layer, _)| *layer == name)
        .map(|(_, id)| *id)
}
