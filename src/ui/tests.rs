use super::state::{ConnectState, MapperApp, PointerState, ResizeHandle};
use super::canvas::HitTarget;
use crate::constants;
use crate::geometry::ViewTransform;
use crate::types::{ElementKind, InfrastructureMap, Severity};
use eframe::egui;

/// A 900x800 viewport anchored at the origin maps logical coordinates to
/// screen coordinates one-to-one, which keeps the expected positions obvious.
fn identity_view() -> ViewTransform {
    ViewTransform::from_size(900.0, 800.0)
}

/// App with an empty map plus two elements at known positions.
fn app_with_two_elements() -> (MapperApp, crate::types::EntityId, crate::types::EntityId) {
    let mut app = MapperApp::default();
    app.map = InfrastructureMap::new();
    let a = app.map.add_element("water plant", ElementKind::Utility, Severity::High);
    let b = app.map.add_element("hospital", ElementKind::Service, Severity::Critical);
    {
        let e = app.map.element_mut(a).unwrap();
        e.x = 200.0;
        e.y = 200.0;
    }
    {
        let e = app.map.element_mut(b).unwrap();
        e.x = 600.0;
        e.y = 300.0;
    }
    (app, a, b)
}

fn click(app: &mut MapperApp, pos: egui::Pos2, view: &ViewTransform) {
    app.on_pointer_press(pos, view);
    app.on_pointer_release(pos, view);
}

#[test]
fn clicking_two_elements_opens_connector_prompt() {
    let (mut app, a, b) = app_with_two_elements();
    let view = identity_view();

    click(&mut app, egui::pos2(200.0, 200.0), &view);
    assert_eq!(app.interaction.connect, ConnectState::Armed { from: a });
    assert_eq!(app.interaction.selected_element, Some(a));

    click(&mut app, egui::pos2(600.0, 300.0), &view);
    match &app.interaction.connect {
        ConnectState::Pending { from, to, .. } => {
            assert_eq!(*from, a);
            assert_eq!(*to, b);
        }
        other => panic!("expected pending connection, got {other:?}"),
    }

    app.commit_pending_connection();
    assert_eq!(app.interaction.connect, ConnectState::Inactive);
    assert_eq!(app.map.connections.len(), 1);
    assert_eq!(app.map.connections[0].from, a);
    assert_eq!(app.map.connections[0].to, b);
}

#[test]
fn clicking_armed_element_again_cancels() {
    let (mut app, a, _) = app_with_two_elements();
    let view = identity_view();

    click(&mut app, egui::pos2(200.0, 200.0), &view);
    assert_eq!(app.interaction.connect, ConnectState::Armed { from: a });
    click(&mut app, egui::pos2(200.0, 200.0), &view);
    assert_eq!(app.interaction.connect, ConnectState::Inactive);
}

#[test]
fn empty_canvas_click_cancels_connect_and_clears_selection() {
    let (mut app, _, _) = app_with_two_elements();
    let view = identity_view();

    click(&mut app, egui::pos2(200.0, 200.0), &view);
    click(&mut app, egui::pos2(80.0, 700.0), &view);
    assert_eq!(app.interaction.connect, ConnectState::Inactive);
    assert_eq!(app.interaction.selected_element, None);
}

#[test]
fn duplicate_connection_is_rejected_with_an_error() {
    let (mut app, a, b) = app_with_two_elements();
    app.map
        .add_connection(a, b, Default::default(), Default::default(), String::new())
        .unwrap();

    app.interaction.connect = ConnectState::Pending {
        from: a,
        to: b,
        connector_type: Default::default(),
        strength: Default::default(),
        notes: String::new(),
    };
    app.commit_pending_connection();

    assert_eq!(app.map.connections.len(), 1);
    assert!(app.file.errors.iter().any(|e| e.contains("already exists")));
}

#[test]
fn dragging_moves_element_and_does_not_arm_connect() {
    let (mut app, a, _) = app_with_two_elements();
    let view = identity_view();

    // Grab off-center; the element must not jump to the pointer.
    app.on_pointer_press(egui::pos2(210.0, 205.0), &view);
    app.on_pointer_move(egui::pos2(260.0, 255.0), &view);
    app.on_pointer_release(egui::pos2(260.0, 255.0), &view);

    let element = app.map.element(a).unwrap();
    assert!((element.x - 250.0).abs() < 1e-3);
    assert!((element.y - 250.0).abs() < 1e-3);
    assert_eq!(app.interaction.connect, ConnectState::Inactive);
}

#[test]
fn wiggle_below_threshold_still_counts_as_click() {
    let (mut app, a, _) = app_with_two_elements();
    let view = identity_view();

    app.on_pointer_press(egui::pos2(200.0, 200.0), &view);
    app.on_pointer_move(egui::pos2(202.0, 201.0), &view);
    app.on_pointer_release(egui::pos2(202.0, 201.0), &view);

    assert_eq!(app.interaction.connect, ConnectState::Armed { from: a });
    let element = app.map.element(a).unwrap();
    assert_eq!((element.x, element.y), (200.0, 200.0));
}

#[test]
fn corner_resize_clamps_to_minimum_size() {
    let (mut app, a, _) = app_with_two_elements();
    let view = identity_view();
    app.interaction.selected_element = Some(a);

    // Default 70x30 centered at (200, 200): south-east corner is (235, 215).
    app.on_pointer_press(egui::pos2(235.0, 215.0), &view);
    assert!(matches!(
        app.interaction.pointer,
        PointerState::ResizeElement {
            handle: ResizeHandle::SouthEast,
            ..
        }
    ));

    // Drag almost onto the anchored north-west corner.
    app.on_pointer_move(egui::pos2(170.0, 190.0), &view);
    let element = app.map.element(a).unwrap();
    assert_eq!(element.width, constants::ELEMENT_MIN_WIDTH);
    assert_eq!(element.height, constants::ELEMENT_MIN_HEIGHT);

    app.on_pointer_release(egui::pos2(170.0, 190.0), &view);
    assert_eq!(app.interaction.pointer, PointerState::Idle);
}

#[test]
fn corner_resize_past_anchor_clamps_instead_of_flipping() {
    let (mut app, a, _) = app_with_two_elements();
    let view = identity_view();
    app.interaction.selected_element = Some(a);

    // Grab the south-east corner (235, 215) and drag well past the anchored
    // north-west corner at (165, 185).
    app.on_pointer_press(egui::pos2(235.0, 215.0), &view);
    app.on_pointer_move(egui::pos2(100.0, 100.0), &view);

    // The element stays on its own side of the anchor at the minimum size.
    let element = app.map.element(a).unwrap();
    assert_eq!(element.width, constants::ELEMENT_MIN_WIDTH);
    assert_eq!(element.height, constants::ELEMENT_MIN_HEIGHT);
    assert!((element.x - 185.0).abs() < 1e-3);
    assert!((element.y - 195.0).abs() < 1e-3);

    // Further moves past the anchor must not make the rect drift.
    app.on_pointer_move(egui::pos2(90.0, 110.0), &view);
    let element = app.map.element(a).unwrap();
    assert!((element.x - 185.0).abs() < 1e-3);
    assert!((element.y - 195.0).abs() < 1e-3);
}

#[test]
fn pressing_element_clears_connection_selection() {
    let (mut app, a, b) = app_with_two_elements();
    let view = identity_view();
    let conn = app
        .map
        .add_connection(a, b, Default::default(), Default::default(), String::new())
        .unwrap();
    app.interaction.selected_connection = Some(conn);

    click(&mut app, egui::pos2(600.0, 300.0), &view);

    assert_eq!(app.interaction.selected_element, Some(b));
    assert_eq!(app.interaction.selected_connection, None);
}

#[test]
fn zone_rim_drag_resizes_and_clamps() {
    let mut app = MapperApp::default();
    app.map = InfrastructureMap::new();
    let id = app.map.add_impact_zone("flood", 450.0, 400.0, 50.0);
    let view = identity_view();

    app.on_pointer_press(egui::pos2(500.0, 400.0), &view);
    assert_eq!(app.interaction.pointer, PointerState::ResizeZone { id });

    app.on_pointer_move(egui::pos2(570.0, 400.0), &view);
    assert!((app.map.impact_zones[0].radius - 120.0).abs() < 1e-3);

    app.on_pointer_move(egui::pos2(452.0, 400.0), &view);
    assert_eq!(app.map.impact_zones[0].radius, constants::ZONE_MIN_RADIUS);
}

#[test]
fn threat_handle_drag_sets_angle_about_center() {
    let mut app = MapperApp::default();
    app.map = InfrastructureMap::new();
    app.map.add_layer("person");
    let id = app.map.add_threat("storm", Severity::High);
    let view = identity_view();

    // One layer at radius 60 puts the marker ring at 80 from the center.
    let marker = egui::pos2(530.0, 400.0);
    assert_eq!(app.hit_test(marker, &view), HitTarget::ThreatHandle(id));

    app.on_pointer_press(marker, &view);
    app.on_pointer_move(egui::pos2(450.0, 500.0), &view);
    let threat = &app.map.threats[0];
    assert!((threat.angle - 90.0).abs() < 1e-3);

    app.on_pointer_move(egui::pos2(450.0, 300.0), &view);
    assert!((app.map.threats[0].angle - 270.0).abs() < 1e-3);
}

#[test]
fn handles_win_hit_test_over_element_body() {
    let (mut app, a, _) = app_with_two_elements();
    let view = identity_view();
    app.interaction.selected_element = Some(a);

    let corner = egui::pos2(165.0, 185.0);
    assert_eq!(
        app.hit_test(corner, &view),
        HitTarget::ElementHandle(a, ResizeHandle::NorthWest)
    );
    assert_eq!(
        app.hit_test(egui::pos2(200.0, 200.0), &view),
        HitTarget::Element(a)
    );
}

#[test]
fn pressing_element_in_headless_frame_selects_it() {
    let (mut app, a, _) = app_with_two_elements();

    let ctx = egui::Context::default();
    let screen = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(900.0, 800.0));

    // The central panel fills the whole screen here, so the canvas transform
    // matches the identity view used by the other tests.
    let mut frame = |events: Vec<egui::Event>, app: &mut MapperApp| {
        let mut raw = egui::RawInput::default();
        raw.screen_rect = Some(screen);
        raw.events = events;
        let _ = ctx.run(raw, |ctx| {
            egui::CentralPanel::default()
                .frame(egui::Frame::NONE)
                .show(ctx, |ui| {
                    app.draw_canvas(ui);
                });
        });
    };

    let pos = egui::pos2(200.0, 200.0);
    frame(vec![egui::Event::PointerMoved(pos)], &mut app);
    frame(
        vec![egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed: true,
            modifiers: egui::Modifiers::NONE,
        }],
        &mut app,
    );

    assert_eq!(app.interaction.selected_element, Some(a));
}
