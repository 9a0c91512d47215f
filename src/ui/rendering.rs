//! Canvas rendering for rings, segments, threats, elements, connections and
//! impact zones.
//!
//! Drawing order is back to front: threat segment wedges, layer rings, impact
//! zones, threat impact circles, connections, elements, threat markers.

use super::state::{ConnectState, MapperApp, ResizeHandle};
use crate::constants;
use crate::geometry::{sector_arc_points, threat_segments, ViewTransform};
use crate::types::{ConnectorKind, Severity};
use eframe::egui;
use eframe::epaint::StrokeKind;

/// Parses a `#rrggbb` hex color, falling back to gray on malformed input.
pub fn color_from_hex(hex: &str) -> egui::Color32 {
    let hex = hex.trim_start_matches('#');
    if hex.len() == 6 {
        if let (Ok(r), Ok(g), Ok(b)) = (
            u8::from_str_radix(&hex[0..2], 16),
            u8::from_str_radix(&hex[2..4], 16),
            u8::from_str_radix(&hex[4..6], 16),
        ) {
            return egui::Color32::from_rgb(r, g, b);
        }
    }
    egui::Color32::GRAY
}

fn with_alpha(color: egui::Color32, alpha: u8) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

/// Marker and segment color for a severity level.
pub fn severity_color(severity: Severity) -> egui::Color32 {
    match severity {
        Severity::Low => egui::Color32::from_rgb(0xfa, 0xcc, 0x15),
        Severity::Medium => egui::Color32::from_rgb(0xfb, 0x92, 0x3c),
        Severity::High => egui::Color32::from_rgb(0xef, 0x44, 0x44),
        Severity::Critical => egui::Color32::from_rgb(0xb9, 0x1c, 0x1c),
    }
}

/// Line color for a connector kind.
pub fn connector_color(kind: ConnectorKind) -> egui::Color32 {
    match kind {
        ConnectorKind::Dependency => egui::Color32::from_rgb(0x3b, 0x82, 0xf6),
        ConnectorKind::Backup => egui::Color32::from_rgb(0x8b, 0x5c, 0xf6),
        ConnectorKind::Communication => egui::Color32::from_rgb(0x10, 0xb9, 0x81),
        ConnectorKind::Supply => egui::Color32::from_rgb(0xf5, 0x9e, 0x0b),
    }
}

impl MapperApp {
    /// Renders the whole map into the given painter.
    pub fn render_map(
        &self,
        painter: &egui::Painter,
        view: &ViewTransform,
        hover: Option<egui::Pos2>,
    ) {
        let center = view.center();

        if self.view.show_segments {
            self.draw_threat_segments(painter, view);
        }

        // Layer rings, outermost first so inner rings paint on top.
        for layer in self.map.layers.iter().rev() {
            let radius = view.ring_to_screen(layer.radius);
            let color = color_from_hex(&layer.color);
            let alpha = (layer.opacity.clamp(0.0, 1.0) * 255.0) as u8;
            painter.circle_filled(center, radius, with_alpha(color, alpha));
            painter.circle_stroke(center, radius, egui::Stroke::new(1.0, with_alpha(color, 180)));
            painter.text(
                egui::pos2(center.x, center.y - radius + 12.0),
                egui::Align2::CENTER_CENTER,
                &layer.name,
                egui::FontId::proportional(11.0),
                self.muted_text_color(),
            );
        }

        for zone in &self.map.impact_zones {
            self.draw_impact_zone(painter, view, zone);
        }

        if self.view.show_threat_impact {
            for threat in &self.map.threats {
                let pos = self.threat_marker_pos(threat, view);
                let radius = view.ring_to_screen(threat.impact_radius);
                painter.circle_filled(pos, radius, with_alpha(severity_color(threat.severity), 36));
            }
        }

        for connection in &self.map.connections {
            // Dangling endpoints are skipped, never deleted.
            let (Some(from), Some(to)) = (
                self.map.element(connection.from),
                self.map.element(connection.to),
            ) else {
                continue;
            };
            let a = view.to_screen(egui::pos2(from.x, from.y));
            let b = view.to_screen(egui::pos2(to.x, to.y));
            let color = connector_color(connection.connector_type);
            let selected = self.interaction.selected_connection == Some(connection.id);
            let width = connection.strength.line_width() + if selected { 1.5 } else { 0.0 };
            let stroke = egui::Stroke::new(width, color);

            if connection.connector_type == ConnectorKind::Backup {
                painter.extend(egui::Shape::dashed_line(&[a, b], stroke, 6.0, 4.0));
            } else {
                painter.line_segment([a, b], stroke);
            }
            self.draw_arrowhead(painter, a, b, stroke);
        }

        // Preview line while a connect is armed.
        if let ConnectState::Armed { from } = self.interaction.connect {
            if let (Some(element), Some(pos)) = (self.map.element(from), hover) {
                let a = view.to_screen(egui::pos2(element.x, element.y));
                let stroke = egui::Stroke::new(1.5, egui::Color32::from_gray(150));
                painter.extend(egui::Shape::dashed_line(&[a, pos], stroke, 5.0, 5.0));
            }
        }

        for element in &self.map.elements {
            let rect = Self::element_screen_rect(element, view);
            let selected = self.interaction.selected_element == Some(element.id);
            let armed = matches!(
                self.interaction.connect,
                ConnectState::Armed { from } if from == element.id
            );

            let fill = if self.dark_mode {
                egui::Color32::from_gray(45)
            } else {
                egui::Color32::WHITE
            };
            painter.rect_filled(rect, 4.0, fill);

            let stroke = if selected || armed {
                egui::Stroke::new(2.5, egui::Color32::from_rgb(100, 150, 255))
            } else {
                egui::Stroke::new(1.5, severity_color(element.criticality))
            };
            painter.rect_stroke(rect, 4.0, stroke, StrokeKind::Inside);

            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                &element.name,
                egui::FontId::proportional(11.0),
                self.text_color(),
            );

            if selected {
                for handle in ResizeHandle::ALL {
                    let corner = handle.corner(rect);
                    let half = constants::HANDLE_SIZE / 2.0;
                    painter.rect_filled(
                        egui::Rect::from_center_size(corner, egui::vec2(half * 2.0, half * 2.0)),
                        1.0,
                        egui::Color32::from_rgb(100, 150, 255),
                    );
                }
            }
        }

        for threat in &self.map.threats {
            let pos = self.threat_marker_pos(threat, view);
            let selected = self.interaction.selected_threat == Some(threat.id);
            painter.circle_filled(pos, constants::THREAT_MARKER_RADIUS, severity_color(threat.severity));
            painter.circle_stroke(
                pos,
                constants::THREAT_MARKER_RADIUS,
                egui::Stroke::new(if selected { 2.5 } else { 1.0 }, egui::Color32::WHITE),
            );
            painter.text(
                egui::pos2(pos.x, pos.y + constants::THREAT_MARKER_RADIUS + 10.0),
                egui::Align2::CENTER_CENTER,
                &threat.name,
                egui::FontId::proportional(11.0),
                self.text_color(),
            );
        }
    }

    fn draw_threat_segments(&self, painter: &egui::Painter, view: &ViewTransform) {
        let center = view.center();
        let outer = view.ring_to_screen(constants::MAX_MAP_RADIUS);

        for segment in threat_segments(&self.map.threats) {
            let Some(threat) = self.map.threats.iter().find(|t| t.id == segment.threat_id) else {
                continue;
            };
            let color = severity_color(threat.severity);

            // Triangle fan over the sampled arc; no span limit to worry about.
            let arc = sector_arc_points(center, outer, segment.start_angle, segment.end_angle);
            for pair in arc.windows(2) {
                painter.add(egui::Shape::convex_polygon(
                    vec![center, pair[0], pair[1]],
                    with_alpha(color, 26),
                    egui::Stroke::NONE,
                ));
            }

            // Radial divider at the segment start, with its drag handle at the
            // outer end.
            let divider_end = Self::segment_handle_pos(threat, view);
            painter.line_segment(
                [center, divider_end],
                egui::Stroke::new(1.0, with_alpha(color, 120)),
            );
            painter.circle_filled(divider_end, constants::HANDLE_SIZE / 2.0 + 1.0, color);
        }
    }

    fn draw_impact_zone(
        &self,
        painter: &egui::Painter,
        view: &ViewTransform,
        zone: &crate::types::ImpactZone,
    ) {
        let (center, radius) = Self::zone_screen_circle(zone, view);
        let color = severity_color(zone.criticality);
        let selected = self.interaction.selected_zone == Some(zone.id);

        painter.circle_filled(center, radius, with_alpha(color, 24));

        let stroke = egui::Stroke::new(if selected { 2.0 } else { 1.2 }, with_alpha(color, 200));
        let rim = sector_arc_points(center, radius, 0.0, 360.0);
        painter.extend(egui::Shape::dashed_line(&rim, stroke, 6.0, 5.0));

        painter.text(
            egui::pos2(center.x, center.y - radius - 8.0),
            egui::Align2::CENTER_CENTER,
            &zone.name,
            egui::FontId::proportional(11.0),
            self.text_color(),
        );
    }

    fn draw_arrowhead(&self, painter: &egui::Painter, from: egui::Pos2, to: egui::Pos2, stroke: egui::Stroke) {
        let dir = to - from;
        if dir.length() < 1.0 {
            return;
        }
        let dir = dir.normalized();
        // Pull the head back from the destination center so it is visible
        // outside the element body.
        let tip = to - dir * 18.0;
        let angle = dir.y.atan2(dir.x);
        let size = 9.0;
        for offset in [0.45, -0.45_f32] {
            let wing = egui::pos2(
                tip.x - size * (angle + offset).cos(),
                tip.y - size * (angle + offset).sin(),
            );
            painter.line_segment([tip, wing], stroke);
        }
    }

    fn text_color(&self) -> egui::Color32 {
        if self.dark_mode {
            egui::Color32::from_gray(220)
        } else {
            egui::Color32::from_gray(30)
        }
    }

    fn muted_text_color(&self) -> egui::Color32 {
        if self.dark_mode {
            egui::Color32::from_gray(150)
        } else {
            egui::Color32::from_gray(90)
        }
    }
}
