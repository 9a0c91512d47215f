//! Coordinate transforms and perimeter geometry.
//!
//! Maps are authored in a fixed 900x800 logical space and rendered into
//! whatever viewport the window currently provides. [`ViewTransform`] holds
//! the forward and inverse mappings used by rendering and pointer handling;
//! the free functions derive threat segments and sample circular arcs.

use egui::{pos2, Pos2};
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::types::{normalize_angle, EntityId, Threat};

/// Mapping between the fixed logical layout space and the rendered viewport.
///
/// Element positions scale per axis (`W/900`, `H/800`) re-based around the
/// logical center; ring radii (layers, zones, threat geometry) scale uniformly
/// by `min(W, H) / 800` so circles stay circular.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    origin: Pos2,
    width: f32,
    height: f32,
}

impl ViewTransform {
    /// Builds a transform for the given canvas rectangle.
    ///
    /// Dimensions are clamped to a minimum so a collapsed container can never
    /// produce non-finite coordinates on the inverse path.
    pub fn from_rect(rect: egui::Rect) -> Self {
        Self {
            origin: rect.min,
            width: rect.width().max(constants::MIN_VIEWPORT_WIDTH),
            height: rect.height().max(constants::MIN_VIEWPORT_HEIGHT),
        }
    }

    /// Builds a transform for a viewport of the given size anchored at the
    /// screen origin. Convenient in tests.
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::from_rect(egui::Rect::from_min_size(Pos2::ZERO, egui::vec2(width, height)))
    }

    /// Screen-space center of the viewport; all rings originate here.
    pub fn center(&self) -> Pos2 {
        pos2(self.origin.x + self.width / 2.0, self.origin.y + self.height / 2.0)
    }

    /// Horizontal element scale factor.
    pub fn scale_x(&self) -> f32 {
        self.width / constants::LOGICAL_WIDTH
    }

    /// Vertical element scale factor.
    pub fn scale_y(&self) -> f32 {
        self.height / constants::LOGICAL_HEIGHT
    }

    /// Uniform scale applied to ring radii.
    pub fn ring_scale(&self) -> f32 {
        self.width.min(self.height) / constants::RING_SCALE_REFERENCE
    }

    /// Maps a logical position to screen space.
    pub fn to_screen(&self, logical: Pos2) -> Pos2 {
        let center = self.center();
        pos2(
            center.x + (logical.x - constants::LOGICAL_CENTER_X) * self.scale_x(),
            center.y + (logical.y - constants::LOGICAL_CENTER_Y) * self.scale_y(),
        )
    }

    /// Maps a screen position back to logical space.
    pub fn to_logical(&self, screen: Pos2) -> Pos2 {
        let center = self.center();
        pos2(
            constants::LOGICAL_CENTER_X + (screen.x - center.x) / self.scale_x(),
            constants::LOGICAL_CENTER_Y + (screen.y - center.y) / self.scale_y(),
        )
    }

    /// Scales a ring-unit distance to screen pixels.
    pub fn ring_to_screen(&self, radius: f32) -> f32 {
        radius * self.ring_scale()
    }

    /// Converts a screen-pixel distance back to ring units.
    pub fn screen_to_ring(&self, distance: f32) -> f32 {
        distance / self.ring_scale()
    }
}

/// Derived polar coordinate written next to cartesian positions on export.
///
/// Never authoritative: recomputed from `(x, y)` at export time and ignored on
/// import.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarCoord {
    /// Distance from the logical center.
    pub r: f32,
    /// Direction in degrees, normalized into `[0, 360)`.
    pub theta: f32,
}

/// Computes the polar coordinate of a logical position relative to the
/// logical center.
pub fn polar_from_logical(x: f32, y: f32) -> PolarCoord {
    let dx = x - constants::LOGICAL_CENTER_X;
    let dy = y - constants::LOGICAL_CENTER_Y;
    PolarCoord {
        r: (dx * dx + dy * dy).sqrt(),
        theta: normalize_angle(dy.atan2(dx).to_degrees()),
    }
}

/// An angular wedge of the perimeter attributed to one threat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreatSegment {
    /// Id of the threat the segment starts at.
    pub threat_id: EntityId,
    /// Start angle in degrees, equal to the owning threat's angle.
    pub start_angle: f32,
    /// End angle in degrees; may exceed 360 for the wrap-around segment.
    pub end_angle: f32,
}

impl ThreatSegment {
    /// Angular width of the segment in degrees.
    pub fn span(&self) -> f32 {
        self.end_angle - self.start_angle
    }
}

/// Partitions the 360-degree perimeter into contiguous segments, one per
/// threat.
///
/// Threats are sorted by angle; segment `i` runs from threat `i` to threat
/// `i + 1`, and the last wraps back to the first with 360 added so N >= 1
/// threats always cover the full circle. A single threat owns the whole
/// perimeter. Threats sharing an angle produce zero-width segments, which is
/// accepted degenerate output.
pub fn threat_segments(threats: &[Threat]) -> Vec<ThreatSegment> {
    if threats.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<&Threat> = threats.iter().collect();
    sorted.sort_by(|a, b| {
        a.angle
            .partial_cmp(&b.angle)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let n = sorted.len();
    let mut segments = Vec::with_capacity(n);
    for i in 0..n {
        let current = sorted[i];
        let next = sorted[(i + 1) % n];
        let start_angle = current.angle;
        let mut end_angle = next.angle;
        if i == n - 1 && end_angle <= start_angle {
            end_angle += 360.0;
        }
        segments.push(ThreatSegment {
            threat_id: current.id,
            start_angle,
            end_angle,
        });
    }
    segments
}

/// Point on a circle at the given angle in degrees. Angles grow clockwise on
/// screen because y points down, matching the exported theta convention.
pub fn point_on_circle(center: Pos2, radius: f32, angle_deg: f32) -> Pos2 {
    let rad = angle_deg.to_radians();
    pos2(center.x + rad.cos() * radius, center.y + rad.sin() * radius)
}

/// Samples an arc from `start_deg` to `end_deg` at roughly four-degree steps,
/// always including both endpoints. Spans beyond 180 degrees need no special
/// casing since the arc is polygonal rather than a two-point flag encoding.
pub fn sector_arc_points(center: Pos2, radius: f32, start_deg: f32, end_deg: f32) -> Vec<Pos2> {
    let span = (end_deg - start_deg).max(0.0);
    let steps = ((span / 4.0).ceil() as usize).max(1);
    (0..=steps)
        .map(|i| {
            let angle = start_deg + span * (i as f32 / steps as f32);
            point_on_circle(center, radius, angle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    fn threat(name: &str, angle: f32) -> Threat {
        Threat::new(name, angle, Severity::Medium)
    }

    #[test]
    fn segments_cover_circle_with_sorted_starts() {
        let threats = vec![
            threat("d", 300.0),
            threat("a", 10.0),
            threat("c", 180.0),
            threat("b", 95.0),
        ];
        let segments = threat_segments(&threats);
        assert_eq!(segments.len(), threats.len());

        let starts: Vec<f32> = segments.iter().map(|s| s.start_angle).collect();
        assert_eq!(starts, vec![10.0, 95.0, 180.0, 300.0]);

        let total: f32 = segments.iter().map(|s| s.span()).sum();
        assert!((total - 360.0).abs() < 1e-3);
        for s in &segments {
            assert!(s.span() >= 0.0);
        }
    }

    #[test]
    fn single_threat_owns_full_circle() {
        let threats = vec![threat("only", 42.0)];
        let segments = threat_segments(&threats);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start_angle, 42.0);
        assert!((segments[0].span() - 360.0).abs() < 1e-3);
    }

    #[test]
    fn coincident_angles_yield_zero_width_segment() {
        let threats = vec![threat("a", 90.0), threat("b", 90.0)];
        let segments = threat_segments(&threats);
        assert_eq!(segments.len(), 2);
        let total: f32 = segments.iter().map(|s| s.span()).sum();
        assert!((total - 360.0).abs() < 1e-3);
        assert!(segments.iter().any(|s| s.span() == 0.0));
    }

    #[test]
    fn no_threats_no_segments() {
        assert!(threat_segments(&[]).is_empty());
    }

    #[test]
    fn screen_round_trip_recovers_logical_position() {
        let view = ViewTransform::from_size(1280.0, 720.0);
        let logical = pos2(512.0, 361.0);
        let back = view.to_logical(view.to_screen(logical));
        assert!((back.x - logical.x).abs() < 1e-3);
        assert!((back.y - logical.y).abs() < 1e-3);
    }

    #[test]
    fn screen_delta_maps_to_logical_delta_by_axis_scale() {
        let view = ViewTransform::from_size(1350.0, 1000.0);
        let logical = pos2(500.0, 420.0);
        let screen = view.to_screen(logical);

        let (dx, dy) = (37.0, -12.0);
        let moved = view.to_logical(pos2(screen.x + dx, screen.y + dy));
        assert!((moved.x - logical.x - dx / view.scale_x()).abs() < 1e-3);
        assert!((moved.y - logical.y - dy / view.scale_y()).abs() < 1e-3);
    }

    #[test]
    fn logical_center_maps_to_viewport_center() {
        let view = ViewTransform::from_size(800.0, 600.0);
        let center = view.to_screen(pos2(450.0, 400.0));
        assert_eq!(center, view.center());
    }

    #[test]
    fn collapsed_container_is_clamped_to_minimum() {
        let view = ViewTransform::from_size(0.0, 0.0);
        assert!(view.scale_x() > 0.0);
        assert!(view.scale_y() > 0.0);
        assert!(view.ring_scale() > 0.0);
        let p = view.to_logical(pos2(10.0, 10.0));
        assert!(p.x.is_finite() && p.y.is_finite());
    }

    #[test]
    fn ring_scale_uses_smaller_dimension() {
        let view = ViewTransform::from_size(1600.0, 800.0);
        assert_eq!(view.ring_scale(), 1.0);
        let wide = ViewTransform::from_size(2000.0, 1200.0);
        assert_eq!(wide.ring_scale(), 1.5);
    }

    #[test]
    fn polar_conversion_matches_known_points() {
        let east = polar_from_logical(550.0, 400.0);
        assert!((east.r - 100.0).abs() < 1e-3);
        assert!(east.theta.abs() < 1e-3);

        // y points down, so +y is 90 degrees.
        let south = polar_from_logical(450.0, 480.0);
        assert!((south.r - 80.0).abs() < 1e-3);
        assert!((south.theta - 90.0).abs() < 1e-3);

        let origin = polar_from_logical(450.0, 400.0);
        assert_eq!(origin.r, 0.0);
    }

    #[test]
    fn arc_points_include_both_endpoints() {
        let center = pos2(100.0, 100.0);
        let points = sector_arc_points(center, 50.0, 0.0, 200.0);
        assert!(points.len() >= 2);
        let first = points.first().unwrap();
        let last = points.last().unwrap();
        assert!((first.x - 150.0).abs() < 1e-3 && (first.y - 100.0).abs() < 1e-3);
        let expected_last = point_on_circle(center, 50.0, 200.0);
        assert!((last.x - expected_last.x).abs() < 1e-3);
        assert!((last.y - expected_last.y).abs() < 1e-3);
    }
}
