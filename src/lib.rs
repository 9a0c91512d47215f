//! # Infrastructure Mapper
//!
//! An interactive editor for critical infrastructure maps: concentric
//! distance layers around a central subject, labeled infrastructure elements,
//! perimeter threat markers with derived angular segments, directed
//! dependency connections and freeform impact zone overlays.
//!
//! ## Features
//! - Draggable, resizable elements in a fixed logical layout space
//! - Threat markers that partition the perimeter into angular segments
//! - Click-driven connection flow with connector metadata
//! - Impact zone overlays annotating affected areas
//! - JSON export with schema validation, and tolerant import

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod constants;
mod geometry;
mod schema;
mod types;
mod ui;

pub use geometry::*;
pub use schema::{export_json, parse_import, validate_map_file, ImportDocument, ValidationReport};
pub use types::*;
use ui::MapperApp;

/// Runs the mapper application with default settings.
///
/// Initializes the egui window and starts the main event loop. UI
/// preferences persisted by a previous session are restored.
///
/// # Example
///
/// ```no_run
/// use infra_mapper::run_app;
///
/// fn main() -> Result<(), eframe::Error> {
///     run_app()
/// }
/// ```
pub fn run_app() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Infrastructure Mapper",
        options,
        Box::new(|cc| {
            let app = cc
                .storage
                .and_then(|storage| storage.get_string("ui_prefs"))
                .and_then(|json| MapperApp::from_json(&json).ok())
                .unwrap_or_default();
            Ok(Box::new(app))
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_map_is_empty() {
        let map = InfrastructureMap::new();
        assert!(map.layers.is_empty());
        assert!(map.elements.is_empty());
        assert!(map.connections.is_empty());
    }

    #[test]
    fn starter_map_exports_cleanly() {
        let map = InfrastructureMap::starter();
        assert!(export_json(&map).is_ok());
    }
}
