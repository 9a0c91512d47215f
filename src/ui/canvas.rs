//! Canvas interaction: hit testing and pointer gesture handling.
//!
//! The pointer handlers are plain methods taking screen positions and a
//! [`ViewTransform`] so tests can drive them without constructing input
//! events. `draw_canvas` wires them to the live pointer each frame.

use super::state::{ConnectState, MapperApp, PointerState, ResizeHandle};
use crate::constants;
use crate::geometry::{point_on_circle, ViewTransform};
use crate::types::{Element, EntityId, ImpactZone, Threat};
use eframe::egui;

/// What the pointer landed on, in hit-test precedence order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitTarget {
    /// A corner handle of the selected element.
    ElementHandle(EntityId, ResizeHandle),
    /// An element body.
    Element(EntityId),
    /// A threat's perimeter marker or segment handle.
    ThreatHandle(EntityId),
    /// The rim band of an impact zone.
    ZoneRim(EntityId),
    /// An impact zone interior.
    Zone(EntityId),
    /// Empty canvas.
    Empty,
}

impl MapperApp {
    /// Screen-space rectangle of an element.
    pub fn element_screen_rect(element: &Element, view: &ViewTransform) -> egui::Rect {
        let center = view.to_screen(egui::pos2(element.x, element.y));
        let size = egui::vec2(
            element.width * view.scale_x(),
            element.height * view.scale_y(),
        );
        egui::Rect::from_center_size(center, size)
    }

    /// Screen-space center and radius of an impact zone.
    pub fn zone_screen_circle(zone: &ImpactZone, view: &ViewTransform) -> (egui::Pos2, f32) {
        let center = view.to_screen(egui::pos2(zone.x, zone.y));
        (center, view.ring_to_screen(zone.radius))
    }

    /// Screen position of a threat's perimeter marker, just beyond the
    /// outermost ring.
    pub fn threat_marker_pos(&self, threat: &Threat, view: &ViewTransform) -> egui::Pos2 {
        let radius = self.map.max_layer_radius() + constants::THREAT_RING_OFFSET;
        point_on_circle(view.center(), view.ring_to_screen(radius), threat.angle)
    }

    /// Screen position of the segment handle at the outer end of a threat's
    /// radial divider.
    pub fn segment_handle_pos(threat: &Threat, view: &ViewTransform) -> egui::Pos2 {
        point_on_circle(
            view.center(),
            view.ring_to_screen(constants::MAX_MAP_RADIUS),
            threat.angle,
        )
    }

    /// Finds what the pointer is over, preferring handles over bodies and
    /// later (topmost) entities over earlier ones.
    pub fn hit_test(&self, pos: egui::Pos2, view: &ViewTransform) -> HitTarget {
        // Corner handles are only live on the selected element.
        if let Some(id) = self.interaction.selected_element {
            if let Some(element) = self.map.element(id) {
                let rect = Self::element_screen_rect(element, view);
                for handle in ResizeHandle::ALL {
                    if handle.corner(rect).distance(pos) <= constants::HANDLE_HIT_RADIUS {
                        return HitTarget::ElementHandle(id, handle);
                    }
                }
            }
        }

        for threat in self.map.threats.iter().rev() {
            if self.threat_marker_pos(threat, view).distance(pos) <= constants::THREAT_MARKER_RADIUS
                || Self::segment_handle_pos(threat, view).distance(pos)
                    <= constants::HANDLE_HIT_RADIUS
            {
                return HitTarget::ThreatHandle(threat.id);
            }
        }

        for element in self.map.elements.iter().rev() {
            if Self::element_screen_rect(element, view).contains(pos) {
                return HitTarget::Element(element.id);
            }
        }

        for zone in self.map.impact_zones.iter().rev() {
            let (center, radius) = Self::zone_screen_circle(zone, view);
            let distance = center.distance(pos);
            if (distance - radius).abs() <= constants::ZONE_RIM_BAND {
                return HitTarget::ZoneRim(zone.id);
            }
            if distance < radius {
                return HitTarget::Zone(zone.id);
            }
        }

        HitTarget::Empty
    }

    /// Handles a primary button press on the canvas.
    pub fn on_pointer_press(&mut self, pos: egui::Pos2, view: &ViewTransform) {
        match self.hit_test(pos, view) {
            HitTarget::ElementHandle(id, handle) => {
                self.interaction.selected_element = Some(id);
                self.interaction.pointer = PointerState::ResizeElement { id, handle };
            }
            HitTarget::Element(id) => {
                self.interaction.selected_element = Some(id);
                self.interaction.selected_zone = None;
                self.interaction.selected_threat = None;
                self.interaction.selected_connection = None;
                if let Some(element) = self.map.element(id) {
                    let grab_offset = egui::pos2(element.x, element.y) - view.to_logical(pos);
                    self.interaction.pointer = PointerState::DragElement {
                        id,
                        grab_offset,
                        press_pos: pos,
                        moved: false,
                    };
                }
            }
            HitTarget::ThreatHandle(id) => {
                self.interaction.selected_threat = Some(id);
                self.interaction.pointer = PointerState::DragThreatHandle { id };
            }
            HitTarget::ZoneRim(id) => {
                self.interaction.selected_zone = Some(id);
                self.interaction.pointer = PointerState::ResizeZone { id };
            }
            HitTarget::Zone(id) => {
                self.interaction.selected_zone = Some(id);
                self.interaction.selected_element = None;
                if let Some(zone) = self.map.impact_zones.iter().find(|z| z.id == id) {
                    let grab_offset = egui::pos2(zone.x, zone.y) - view.to_logical(pos);
                    self.interaction.pointer = PointerState::DragZone { id, grab_offset };
                }
            }
            HitTarget::Empty => {
                // Empty canvas clears selection and cancels an armed connect.
                self.interaction.connect = ConnectState::Inactive;
                self.interaction.selected_element = None;
                self.interaction.selected_threat = None;
                self.interaction.selected_zone = None;
                self.interaction.selected_connection = None;
            }
        }
    }

    /// Handles pointer movement while the primary button is held.
    pub fn on_pointer_move(&mut self, pos: egui::Pos2, view: &ViewTransform) {
        match self.interaction.pointer {
            PointerState::DragElement {
                id,
                grab_offset,
                press_pos,
                moved,
            } => {
                let moved = moved || press_pos.distance(pos) > constants::CLICK_THRESHOLD;
                self.interaction.pointer = PointerState::DragElement {
                    id,
                    grab_offset,
                    press_pos,
                    moved,
                };
                if moved {
                    let logical = view.to_logical(pos) + grab_offset;
                    if let Some(element) = self.map.element_mut(id) {
                        element.x = logical.x;
                        element.y = logical.y;
                    }
                }
            }
            PointerState::DragZone { id, grab_offset } => {
                let logical = view.to_logical(pos) + grab_offset;
                if let Some(zone) = self.map.impact_zone_mut(id) {
                    zone.x = logical.x;
                    zone.y = logical.y;
                }
            }
            PointerState::ResizeElement { id, handle } => {
                let Some(element) = self.map.element(id) else {
                    return;
                };
                let rect = Self::element_screen_rect(element, view);
                let anchor = view.to_logical(handle.anchor(rect));
                let pointer = view.to_logical(pos);

                // Signed distance along the handle's own direction; the clamp
                // keeps the element from inverting past the anchor.
                let dir = handle.direction();
                let width =
                    (dir.x * (pointer.x - anchor.x)).max(constants::ELEMENT_MIN_WIDTH);
                let height =
                    (dir.y * (pointer.y - anchor.y)).max(constants::ELEMENT_MIN_HEIGHT);

                if let Some(element) = self.map.element_mut(id) {
                    element.width = width;
                    element.height = height;
                    element.x = anchor.x + dir.x * width / 2.0;
                    element.y = anchor.y + dir.y * height / 2.0;
                }
            }
            PointerState::ResizeZone { id } => {
                let Some(zone) = self.map.impact_zones.iter().find(|z| z.id == id) else {
                    return;
                };
                let center = view.to_screen(egui::pos2(zone.x, zone.y));
                let radius = view
                    .screen_to_ring(center.distance(pos))
                    .max(constants::ZONE_MIN_RADIUS);
                if let Some(zone) = self.map.impact_zone_mut(id) {
                    zone.radius = radius;
                }
            }
            PointerState::DragThreatHandle { id } => {
                let center = view.center();
                let angle = (pos.y - center.y).atan2(pos.x - center.x).to_degrees();
                if let Some(threat) = self.map.threat_mut(id) {
                    threat.set_angle(angle);
                }
            }
            PointerState::Idle => {}
        }
    }

    /// Handles release of the primary button, completing clicks and ending
    /// any gesture.
    pub fn on_pointer_release(&mut self, _pos: egui::Pos2, _view: &ViewTransform) {
        let pointer = std::mem::replace(&mut self.interaction.pointer, PointerState::Idle);
        if let PointerState::DragElement { id, moved: false, .. } = pointer {
            self.handle_element_click(id);
        }
    }

    /// A click (press and release without movement) on an element advances
    /// the connect flow.
    fn handle_element_click(&mut self, id: EntityId) {
        match self.interaction.connect.clone() {
            ConnectState::Inactive => {
                self.interaction.connect = ConnectState::Armed { from: id };
            }
            ConnectState::Armed { from } if from == id => {
                self.interaction.connect = ConnectState::Inactive;
            }
            ConnectState::Armed { from } => {
                self.interaction.connect = ConnectState::Pending {
                    from,
                    to: id,
                    connector_type: Default::default(),
                    strength: Default::default(),
                    notes: String::new(),
                };
            }
            // The connector prompt is open; clicks do not restart the flow.
            ConnectState::Pending { .. } => {}
        }
    }

    /// Commits the pending connection from the connector prompt.
    pub fn commit_pending_connection(&mut self) {
        if let ConnectState::Pending {
            from,
            to,
            connector_type,
            strength,
            notes,
        } = std::mem::replace(&mut self.interaction.connect, ConnectState::Inactive)
        {
            match self.map.add_connection(from, to, connector_type, strength, notes) {
                Ok(id) => {
                    self.interaction.selected_connection = Some(id);
                }
                Err(message) => {
                    log::warn!("rejected connection: {message}");
                    self.file.errors.push(message);
                }
            }
        }
    }

    /// Discards the pending connection from the connector prompt.
    pub fn cancel_pending_connection(&mut self) {
        self.interaction.connect = ConnectState::Inactive;
    }

    /// Renders the canvas and feeds pointer input into the gesture handlers.
    pub fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let view = ViewTransform::from_rect(response.rect);

        let (pointer_pos, pressed, down, released) = ui.ctx().input(|i| {
            (
                i.pointer.interact_pos(),
                i.pointer.primary_pressed(),
                i.pointer.primary_down(),
                i.pointer.primary_released(),
            )
        });

        if let Some(pos) = pointer_pos {
            if pressed && response.rect.contains(pos) {
                self.on_pointer_press(pos, &view);
            } else if down {
                self.on_pointer_move(pos, &view);
            }
            if released {
                self.on_pointer_release(pos, &view);
            }
        }

        self.render_map(&painter, &view, pointer_pos);
    }
}
