use std::time::{Duration, Instant};

use quill::{
    map::{
        ActiveEntity, EditSettings, MapConfig, MapEditor, MapEffect, MapLayer, MapSettingUpdate,
        MouseButton, OnMapClick, RenderGate, should_update,
    },
    model::{NEW_ID, Pattern, Route, Stop},
    shared::{Bounds, Coordinate, ViewportSignal, ViewportSize},
};

fn stop(id: &str, latitude: f64, longitude: f64) -> Stop {
    Stop {
        id: id.into(),
        feed_id: "feed".into(),
        name: format!("Stop {id}").into(),
        code: None,
        coordinate: Coordinate::new(latitude, longitude),
    }
}

fn stop_editor() -> MapEditor {
    let mut editor = MapEditor::new("feed".into(), MapConfig::default())
        .with_stops([stop("a", 59.3293, 18.0686), stop("b", 59.3400, 18.0500)]);
    editor.set_active(ActiveEntity::Stop(None));
    editor
}

fn route_editor(on_map_click: OnMapClick) -> MapEditor {
    let mut editor = MapEditor::new("feed".into(), MapConfig::default());
    editor.set_active(ActiveEntity::Route {
        route: Route {
            id: "r1".into(),
            ..Default::default()
        },
        pattern: Some(Pattern {
            id: "p1".into(),
            route_id: "r1".into(),
            ..Default::default()
        }),
        editing_pattern: true,
    });
    editor.edit_settings = EditSettings {
        edit_geometry: true,
        on_map_click,
    };
    editor
}

fn bounds(offset: f64) -> Bounds {
    Bounds {
        north: 59.4 + offset,
        south: 59.3 + offset,
        east: 18.1 + offset,
        west: 18.0 + offset,
    }
}

#[test]
fn secondary_click_selects_close_stop() {
    let mut editor = stop_editor();
    let effects = editor.on_click(Coordinate::new(59.3297, 18.0682), MouseButton::Secondary);
    assert_eq!(effects.len(), 1);
    match &effects[0] {
        MapEffect::SelectStop(stop) => assert_eq!(&*stop.id, "a"),
        other => panic!("unexpected effect {other:?}"),
    }
    assert_eq!(editor.active.entity_id().as_deref(), Some("a"));

    // Already active.
    let effects = editor.on_click(Coordinate::new(59.3293, 18.0686), MouseButton::Secondary);
    assert!(effects.is_empty());
}

#[test]
fn secondary_click_ignores_distant_stop() {
    let mut editor = stop_editor();
    let effects = editor.on_click(Coordinate::new(59.3313, 18.0686), MouseButton::Secondary);
    assert!(effects.is_empty());
    assert_eq!(editor.active, ActiveEntity::Stop(None));
}

#[test]
fn selection_tolerance_is_inclusive() {
    let mut editor = stop_editor();
    let effects = editor.on_click(Coordinate::new(59.3298, 18.0691), MouseButton::Secondary);
    assert!(matches!(effects.as_slice(), [MapEffect::SelectStop(stop)] if &*stop.id == "a"));

    let mut editor = stop_editor();
    let effects = editor.on_click(Coordinate::new(59.32981, 18.0686), MouseButton::Secondary);
    assert!(effects.is_empty());
}

#[test]
fn secondary_click_outside_stop_editing_does_nothing() {
    let mut editor = route_editor(OnMapClick::NoAction);
    let effects = editor.on_click(Coordinate::new(59.3293, 18.0686), MouseButton::Secondary);
    assert!(effects.is_empty());
}

#[test]
fn primary_click_creates_stop() {
    let mut editor = stop_editor();
    let effects = editor.on_click(
        Coordinate::new(59.123456789, 18.987654321),
        MouseButton::Primary,
    );
    let [MapEffect::CreateStop(draft)] = effects.as_slice() else {
        panic!("expected a create request, got {effects:?}");
    };
    assert_eq!(&*draft.feed_id, "feed");
    assert_eq!(draft.coordinate, Coordinate::new(59.123457, 18.987654));
    assert_eq!(draft.name, "New stop (59.12346, 18.98765)");

    let mut created = stop("s-1", draft.coordinate.latitude, draft.coordinate.longitude);
    created.name = draft.name.as_str().into();
    editor.complete_create_stop(created);
    assert_eq!(editor.active.entity_id().as_deref(), Some("s-1"));
    assert_eq!(editor.stops.len(), 3);
}

#[test]
fn primary_click_moves_pending_stop() {
    let mut editor = stop_editor();
    let pending = stop(NEW_ID, 59.0, 18.0);
    editor.stops.insert(pending.clone());
    editor.set_active(ActiveEntity::Stop(Some(pending)));

    let effects = editor.on_click(Coordinate::new(59.5, 18.5), MouseButton::Primary);
    let [MapEffect::UpdateActiveEntity(moved)] = effects.as_slice() else {
        panic!("expected the pending stop to move, got {effects:?}");
    };
    assert_eq!(moved.coordinate, Coordinate::new(59.5, 18.5));
    assert_eq!(
        editor.stops.get(NEW_ID).map(|stop| stop.coordinate),
        Some(Coordinate::new(59.5, 18.5))
    );
}

#[test]
fn primary_click_with_unsaved_stop_elsewhere_does_nothing() {
    let mut editor = stop_editor();
    editor.stops.insert(stop(NEW_ID, 59.0, 18.0));
    let effects = editor.on_click(Coordinate::new(59.5, 18.5), MouseButton::Primary);
    assert!(effects.is_empty());
}

#[test]
fn geometry_clicks_follow_setting() {
    let point = Coordinate::new(59.33, 18.07);
    let mut editor = route_editor(OnMapClick::NoAction);
    assert!(editor.on_click(point, MouseButton::Primary).is_empty());

    let mut editor = route_editor(OnMapClick::AddStopAtClick);
    assert_eq!(
        editor.on_click(point, MouseButton::Primary),
        vec![MapEffect::AddStopAtPoint {
            coordinate: point,
            pattern_id: "p1".into()
        }]
    );

    let mut editor = route_editor(OnMapClick::AddStopsAtIntersections);
    assert!(matches!(
        editor.on_click(point, MouseButton::Primary).as_slice(),
        [MapEffect::AddStopAtIntersection { .. }]
    ));

    let mut editor = route_editor(OnMapClick::AddStopsAtInterval);
    editor.edit_settings.edit_geometry = false;
    assert!(editor.on_click(point, MouseButton::Primary).is_empty());
    editor.edit_settings.edit_geometry = true;
    assert!(matches!(
        editor.on_click(point, MouseButton::Primary).as_slice(),
        [MapEffect::AddStopAtInterval { .. }]
    ));
}

#[test]
fn viewport_changes_propagate_when_different() {
    let mut editor = stop_editor();
    let now = Instant::now();
    let effects = editor.on_bounds_changed(now, 13, bounds(0.0));
    assert_eq!(
        effects,
        vec![
            MapEffect::UpdateMapSetting(MapSettingUpdate::Zoom(13)),
            MapEffect::UpdateMapSetting(MapSettingUpdate::Bounds(bounds(0.0))),
        ]
    );
    assert!(editor.on_bounds_changed(now, 13, bounds(0.0)).is_empty());
    assert_eq!(
        editor.on_bounds_changed(now, 14, bounds(0.0)),
        vec![MapEffect::UpdateMapSetting(MapSettingUpdate::Zoom(14))]
    );
    assert!(editor.draw_stops());
}

#[test]
fn fly_to_suppresses_feedback_during_grace() {
    let mut editor = stop_editor();
    let start = Instant::now();
    assert!(editor.zoom_to(bounds(0.0)));
    assert!(!editor.zoom_to(bounds(0.0)));
    assert_eq!(editor.props().forced_bounds, Some(bounds(0.0)));

    assert!(editor.on_bounds_changed(start, 12, bounds(0.01)).is_empty());
    let within = start + Duration::from_millis(150);
    assert!(editor.on_bounds_changed(within, 12, bounds(0.02)).is_empty());

    let after = start + Duration::from_millis(200);
    let effects = editor.on_bounds_changed(after, 12, bounds(0.03));
    assert!(effects.contains(&MapEffect::UpdateMapSetting(MapSettingUpdate::Bounds(
        bounds(0.03)
    ))));
    assert_eq!(editor.props().forced_bounds, None);
}

#[test]
fn fit_feed_pads_bounds() {
    let mut editor = stop_editor();
    assert!(editor.fit_feed(bounds(0.0)));
    let target = editor.map_state.bounds.unwrap();
    assert!((target.north - 59.405).abs() < 1e-9);
    assert!((target.west - 17.995).abs() < 1e-9);
}

#[test]
fn layers_follow_active_entity() {
    let editor = stop_editor();
    assert_eq!(editor.layers(), vec![MapLayer::Stops]);

    let mut editor = route_editor(OnMapClick::NoAction);
    assert_eq!(
        editor.layers(),
        vec![
            MapLayer::Patterns,
            MapLayer::DirectionIcons,
            MapLayer::ControlPoints,
            MapLayer::PatternStops,
            MapLayer::AddableStops,
        ]
    );
    editor.edit_settings.edit_geometry = false;
    editor.map_state.routes_geojson = Some("{}".to_string());
    assert_eq!(
        editor.layers(),
        vec![
            MapLayer::Patterns,
            MapLayer::DirectionIcons,
            MapLayer::PatternStops,
            MapLayer::AddableStops,
            MapLayer::RoutesGeoJson,
        ]
    );
    editor.layout.hidden = true;
    assert!(editor.layers().is_empty());
}

#[test]
fn overlay_and_base_layer_events() {
    let mut editor = stop_editor();
    assert_eq!(
        editor.on_overlay_added("Route alignments"),
        Some(MapEffect::FetchTripPatterns {
            feed_id: "feed".into()
        })
    );
    editor.patterns_loaded = true;
    assert_eq!(editor.on_overlay_added("Route alignments"), None);
    assert_eq!(
        editor.on_base_layer_changed("Satellite"),
        Some(MapEffect::UpdateUserMapLayer {
            layer_id: "mapbox.streets-satellite"
        })
    );
    assert_eq!(editor.on_base_layer_changed("Watercolor"), None);
}

#[test]
fn map_width_tracks_viewport() {
    let mut editor = stop_editor();
    let signal = ViewportSignal::new(ViewportSize {
        width: 1000,
        height: 700,
    });
    editor.mount(&signal);
    editor.layout.offset = 300;
    assert_eq!(editor.width(), 650);
    editor.layout.sidebar_expanded = true;
    assert_eq!(editor.width(), 570);
    signal.resize(ViewportSize {
        width: 1200,
        height: 700,
    });
    assert_eq!(editor.width(), 770);
}

#[test]
fn render_gate_skips_irrelevant_changes() {
    let mut editor = stop_editor();
    let mut gate = RenderGate::default();
    assert!(gate.check(editor.props()));
    assert!(!gate.check(editor.props()));

    // Bounds only matter once stops are drawn.
    editor.map_state.bounds = Some(bounds(0.0));
    assert!(!gate.check(editor.props()));
    editor.map_state.zoom = 15;
    assert!(gate.check(editor.props()));
    editor.map_state.bounds = Some(bounds(0.01));
    assert!(gate.check(editor.props()));

    editor.on_click(Coordinate::new(59.3293, 18.0686), MouseButton::Secondary);
    assert!(gate.check(editor.props()));

    editor.patterns_loaded = true;
    assert!(gate.check(editor.props()));
}

#[test]
fn hidden_map_never_redraws() {
    let mut editor = stop_editor();
    editor.layout.hidden = true;
    let prev = editor.props();
    editor.layout.offset = 400;
    editor.patterns_loaded = true;
    assert!(!should_update(&prev, &editor.props()));
    editor.layout.hidden = false;
    assert!(should_update(&prev, &editor.props()));
}
