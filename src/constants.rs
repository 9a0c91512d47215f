//! Shared application-wide constants.
//! Centralizes tweakable values used across geometry, rendering and interactions.

// Logical canvas
/// Width of the fixed logical layout space that maps are authored in.
pub const LOGICAL_WIDTH: f32 = 900.0;
/// Height of the fixed logical layout space.
pub const LOGICAL_HEIGHT: f32 = 800.0;
/// X coordinate of the logical center, where the layer rings originate.
pub const LOGICAL_CENTER_X: f32 = 450.0;
/// Y coordinate of the logical center.
pub const LOGICAL_CENTER_Y: f32 = 400.0;
/// Reference dimension used for the uniform ring scale: `min(W, H) / 800`.
pub const RING_SCALE_REFERENCE: f32 = 800.0;
/// Minimum viewport width used when the container reports a smaller size.
pub const MIN_VIEWPORT_WIDTH: f32 = 400.0;
/// Minimum viewport height used when the container reports a smaller size.
pub const MIN_VIEWPORT_HEIGHT: f32 = 300.0;

// Layers
/// Radius assigned to the innermost layer after recalculation.
pub const LAYER_RADIUS_BASE: f32 = 60.0;
/// Radius increment between adjacent layers after recalculation.
pub const LAYER_RADIUS_STEP: f32 = 40.0;
/// Outer radius of the mapped area; threat segments extend this far.
pub const MAX_MAP_RADIUS: f32 = 320.0;

// Elements
/// Default element width in logical units.
pub const ELEMENT_DEFAULT_WIDTH: f32 = 70.0;
/// Default element height in logical units.
pub const ELEMENT_DEFAULT_HEIGHT: f32 = 30.0;
/// Minimum element width a corner resize can produce.
pub const ELEMENT_MIN_WIDTH: f32 = 40.0;
/// Minimum element height a corner resize can produce.
pub const ELEMENT_MIN_HEIGHT: f32 = 20.0;

// Impact zones
/// Minimum impact zone radius a resize can produce (ring units).
pub const ZONE_MIN_RADIUS: f32 = 20.0;

// Threats
/// Radius of the circular threat marker drawn at the perimeter.
pub const THREAT_MARKER_RADIUS: f32 = 20.0;
/// Distance beyond the outermost ring at which threat markers sit.
pub const THREAT_RING_OFFSET: f32 = 20.0;

// Canvas interactions
/// Screen-pixel threshold distinguishing a click from a drag.
pub const CLICK_THRESHOLD: f32 = 4.0;
/// Hit radius (screen pixels) for resize handles and threat segment handles.
pub const HANDLE_HIT_RADIUS: f32 = 8.0;
/// Half-width of the band around an impact zone's rim that starts a resize.
pub const ZONE_RIM_BAND: f32 = 6.0;
/// Visual size of element corner resize handles (screen pixels).
pub const HANDLE_SIZE: f32 = 7.0;

// Export schema
/// Schema version stamped into exported documents (YYYY-MM-DD).
pub const SCHEMA_VERSION: &str = "2025-06-01";
/// Identifier written into exported metadata.
pub const EXPORTED_BY: &str = "infra_mapper";
/// File name suggested by the export dialog.
pub const EXPORT_FILE_NAME: &str = "infrastructure-map.json";
