//! Export document shape, pre-export validation and tolerant import parsing.
//!
//! The export file is a versioned JSON document: layers keyed by name,
//! cartesian positions augmented with derived polar coordinates, and a
//! metadata block stamping when and by what the file was written. Validation
//! runs over the serialized `serde_json::Value` before the file is offered
//! for download; import accepts both the current shape and the legacy one
//! (layers as a plain array, ids that are not UUIDs).

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::constants;
use crate::geometry::{polar_from_logical, PolarCoord};
use crate::types::{
    normalize_angle, Connection, Element, EntityId, ImpactZone, InfrastructureMap, Layer, Threat,
};

/// Fixed coordinate-system descriptor written into every export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinateSystem {
    #[serde(rename = "type")]
    pub kind: String,
    pub origin: String,
    pub units: String,
    pub center_x: f32,
    pub center_y: f32,
}

impl CoordinateSystem {
    fn current() -> Self {
        Self {
            kind: "cartesian".to_string(),
            origin: "center".to_string(),
            units: "pixels".to_string(),
            center_x: constants::LOGICAL_CENTER_X,
            center_y: constants::LOGICAL_CENTER_Y,
        }
    }
}

/// Unit conventions for the numeric fields in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defaults {
    pub distance_units: String,
    pub angle_units: String,
}

impl Defaults {
    fn current() -> Self {
        Self {
            distance_units: "px".to_string(),
            angle_units: "deg".to_string(),
        }
    }
}

/// Export provenance block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// ISO-8601 timestamp of the export.
    pub exported_at: String,
    /// Fixed producer identifier.
    pub exported_by: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ElementRecord<'a> {
    #[serde(flatten)]
    element: &'a Element,
    polar: PolarCoord,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ZoneRecord<'a> {
    #[serde(flatten)]
    zone: &'a ImpactZone,
    polar: PolarCoord,
}

/// Borrowed view of a document in export shape.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument<'a> {
    version: &'static str,
    coordinate_system: CoordinateSystem,
    defaults: Defaults,
    layers: BTreeMap<String, &'a Layer>,
    threats: &'a [Threat],
    elements: Vec<ElementRecord<'a>>,
    connections: &'a [Connection],
    impact_zones: Vec<ZoneRecord<'a>>,
    metadata: Metadata,
}

/// Builds the export shape for a document. Cartesian positions remain the
/// source of truth; the polar fields are derived here and nowhere else.
pub fn build_export<'a>(map: &'a InfrastructureMap, exported_at: DateTime<Utc>) -> ExportDocument<'a> {
    let mut layers = BTreeMap::new();
    for layer in &map.layers {
        // Name-keyed map; disambiguate duplicate names so no layer is lost.
        let mut key = layer.name.clone();
        if layers.contains_key(&key) {
            key = format!("{} ({})", layer.name, layer.id.simple());
        }
        layers.insert(key, layer);
    }

    ExportDocument {
        version: constants::SCHEMA_VERSION,
        coordinate_system: CoordinateSystem::current(),
        defaults: Defaults::current(),
        layers,
        threats: &map.threats,
        elements: map
            .elements
            .iter()
            .map(|element| ElementRecord {
                element,
                polar: polar_from_logical(element.x, element.y),
            })
            .collect(),
        connections: &map.connections,
        impact_zones: map
            .impact_zones
            .iter()
            .map(|zone| ZoneRecord {
                zone,
                polar: polar_from_logical(zone.x, zone.y),
            })
            .collect(),
        metadata: Metadata {
            exported_at: exported_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            exported_by: constants::EXPORTED_BY.to_string(),
        },
    }
}

/// Serializes the document to a pretty-printed export string, validating it
/// first. On validation failure the collected error list is returned and
/// nothing is written; the document itself is never mutated.
pub fn export_json(map: &InfrastructureMap) -> Result<String, Vec<String>> {
    let value = serde_json::to_value(build_export(map, Utc::now()))
        .map_err(|e| vec![format!("Serialization failed: {e}")])?;
    let report = validate_map_file(&value);
    if !report.valid {
        return Err(report.errors);
    }
    serde_json::to_string_pretty(&value).map_err(|e| vec![format!("Serialization failed: {e}")])
}

/// Outcome of validating a document against the export schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

fn is_date_version(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && [0, 1, 2, 3, 5, 6, 8, 9].iter().all(|&i| b[i].is_ascii_digit())
}

fn has_string(obj: &Value, field: &str) -> bool {
    obj.get(field).and_then(Value::as_str).map_or(false, |s| !s.is_empty())
}

fn number(obj: &Value, field: &str) -> Option<f64> {
    obj.get(field).and_then(Value::as_f64)
}

/// Validates a document in export shape, collecting every problem rather than
/// stopping at the first.
pub fn validate_map_file(data: &Value) -> ValidationReport {
    let mut errors = Vec::new();

    for field in [
        "version",
        "coordinateSystem",
        "layers",
        "elements",
        "threats",
        "connections",
        "metadata",
    ] {
        if data.get(field).is_none() {
            errors.push(format!("Missing {field} field"));
        }
    }

    if let Some(version) = data.get("version") {
        // A non-string version fails the format check too.
        if !version.as_str().is_some_and(is_date_version) {
            errors.push("Version must be in YYYY-MM-DD format".to_string());
        }
    }

    if let Some(cs) = data.get("coordinateSystem") {
        if cs.get("type").and_then(Value::as_str) != Some("cartesian") {
            errors.push("coordinateSystem.type must be 'cartesian'".to_string());
        }
        if number(cs, "centerX").is_none() || number(cs, "centerY").is_none() {
            errors.push("coordinateSystem must have numeric centerX and centerY".to_string());
        }
    }

    if let Some(elements) = data.get("elements").and_then(Value::as_array) {
        for (index, element) in elements.iter().enumerate() {
            if !has_string(element, "id") {
                errors.push(format!("Element {index}: missing id"));
            }
            if !has_string(element, "name") {
                errors.push(format!("Element {index}: missing name"));
            }
            if number(element, "x").is_none() {
                errors.push(format!("Element {index}: x must be a number"));
            }
            if number(element, "y").is_none() {
                errors.push(format!("Element {index}: y must be a number"));
            }
            if number(element, "layer").is_none() {
                errors.push(format!("Element {index}: layer must be a number"));
            }
        }
    }

    if let Some(threats) = data.get("threats").and_then(Value::as_array) {
        for (index, threat) in threats.iter().enumerate() {
            if !has_string(threat, "id") {
                errors.push(format!("Threat {index}: missing id"));
            }
            if !has_string(threat, "name") {
                errors.push(format!("Threat {index}: missing name"));
            }
            match number(threat, "angle") {
                Some(angle) if (0.0..360.0).contains(&angle) => {}
                _ => errors.push(format!("Threat {index}: angle must be between 0 and 360")),
            }
            match number(threat, "impactRadius") {
                Some(radius) if radius >= 0.0 => {}
                _ => errors.push(format!("Threat {index}: impactRadius must be a non-negative number")),
            }
        }
    }

    if let Some(layers) = data.get("layers") {
        // The current shape is a name-keyed map; a legacy array is validated
        // with its index as the key.
        let entries: Vec<(String, &Value)> = match layers {
            Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
            Value::Array(list) => list.iter().enumerate().map(|(i, v)| (i.to_string(), v)).collect(),
            _ => Vec::new(),
        };
        for (key, layer) in entries {
            if !has_string(layer, "id") {
                errors.push(format!("Layer {key}: missing id"));
            }
            if !has_string(layer, "name") {
                errors.push(format!("Layer {key}: missing name"));
            }
            match number(layer, "radius") {
                Some(radius) if radius >= 0.0 => {}
                _ => errors.push(format!("Layer {key}: radius must be a non-negative number")),
            }
            match number(layer, "opacity") {
                Some(opacity) if (0.0..=1.0).contains(&opacity) => {}
                _ => errors.push(format!("Layer {key}: opacity must be between 0 and 1")),
            }
        }
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}

/// Accepts a UUID or, for files written by older versions, an arbitrary id
/// string which is mapped deterministically so cross-references stay intact.
fn lenient_id<'de, D>(deserializer: D) -> Result<EntityId, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(Uuid::parse_str(&raw).unwrap_or_else(|_| Uuid::new_v5(&Uuid::NAMESPACE_OID, raw.as_bytes())))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayerIn {
    #[serde(deserialize_with = "lenient_id")]
    id: EntityId,
    name: String,
    radius: f32,
    #[serde(default = "default_layer_color")]
    color: String,
    #[serde(default = "default_layer_opacity")]
    opacity: f32,
}

fn default_layer_color() -> String {
    "#10b981".to_string()
}

fn default_layer_opacity() -> f32 {
    0.3
}

impl From<LayerIn> for Layer {
    fn from(l: LayerIn) -> Self {
        Layer {
            id: l.id,
            name: l.name,
            radius: l.radius,
            color: l.color,
            opacity: l.opacity,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreatIn {
    #[serde(deserialize_with = "lenient_id")]
    id: EntityId,
    name: String,
    angle: f32,
    #[serde(default = "default_impact_radius")]
    impact_radius: f32,
    #[serde(default)]
    severity: crate::types::Severity,
}

fn default_impact_radius() -> f32 {
    40.0
}

impl From<ThreatIn> for Threat {
    fn from(t: ThreatIn) -> Self {
        Threat {
            id: t.id,
            name: t.name,
            angle: normalize_angle(t.angle),
            impact_radius: t.impact_radius,
            severity: t.severity,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElementIn {
    #[serde(deserialize_with = "lenient_id")]
    id: EntityId,
    name: String,
    x: f32,
    y: f32,
    layer: u32,
    #[serde(default = "default_element_width")]
    width: f32,
    #[serde(default = "default_element_height")]
    height: f32,
    #[serde(default)]
    kind: crate::types::ElementKind,
    #[serde(default)]
    criticality: crate::types::Severity,
}

fn default_element_width() -> f32 {
    constants::ELEMENT_DEFAULT_WIDTH
}

fn default_element_height() -> f32 {
    constants::ELEMENT_DEFAULT_HEIGHT
}

impl From<ElementIn> for Element {
    fn from(e: ElementIn) -> Self {
        Element {
            id: e.id,
            name: e.name,
            x: e.x,
            y: e.y,
            layer: e.layer,
            width: e.width,
            height: e.height,
            kind: e.kind,
            criticality: e.criticality,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionIn {
    #[serde(default = "Uuid::new_v4", deserialize_with = "lenient_id")]
    id: EntityId,
    #[serde(deserialize_with = "lenient_id")]
    from: EntityId,
    #[serde(deserialize_with = "lenient_id")]
    to: EntityId,
    #[serde(default)]
    connector_type: crate::types::ConnectorKind,
    #[serde(default)]
    strength: crate::types::Strength,
    #[serde(default)]
    notes: String,
}

impl From<ConnectionIn> for Connection {
    fn from(c: ConnectionIn) -> Self {
        Connection {
            id: c.id,
            from: c.from,
            to: c.to,
            connector_type: c.connector_type,
            strength: c.strength,
            notes: c.notes,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ZoneIn {
    #[serde(deserialize_with = "lenient_id")]
    id: EntityId,
    name: String,
    x: f32,
    y: f32,
    radius: f32,
    #[serde(default)]
    infrastructure_problems: String,
    #[serde(default)]
    impact_effects: String,
    #[serde(default)]
    criticality: crate::types::Severity,
    #[serde(default)]
    description: String,
}

impl From<ZoneIn> for ImpactZone {
    fn from(z: ZoneIn) -> Self {
        ImpactZone {
            id: z.id,
            name: z.name,
            x: z.x,
            y: z.y,
            radius: z.radius,
            infrastructure_problems: z.infrastructure_problems,
            impact_effects: z.impact_effects,
            criticality: z.criticality,
            description: z.description,
        }
    }
}

/// `layers` may be the current name-keyed map or the legacy plain array.
#[derive(Deserialize)]
#[serde(untagged)]
enum LayersField {
    List(Vec<LayerIn>),
    Map(BTreeMap<String, LayerIn>),
}

impl LayersField {
    /// Normalizes either form into the canonical array representation,
    /// sorted by ascending radius.
    fn normalize(self) -> Vec<Layer> {
        let mut layers: Vec<Layer> = match self {
            LayersField::List(list) => list.into_iter().map(Layer::from).collect(),
            LayersField::Map(map) => map.into_values().map(Layer::from).collect(),
        };
        layers.sort_by(|a, b| {
            a.radius
                .partial_cmp(&b.radius)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        layers
    }
}

/// Parsed import payload; collections absent from the file stay `None` and
/// leave the corresponding in-memory collection untouched on apply.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDocument {
    #[serde(default)]
    layers: Option<LayersField>,
    #[serde(default)]
    threats: Option<Vec<ThreatIn>>,
    #[serde(default)]
    elements: Option<Vec<ElementIn>>,
    #[serde(default)]
    connections: Option<Vec<ConnectionIn>>,
    #[serde(default)]
    impact_zones: Option<Vec<ZoneIn>>,
}

/// Parses an uploaded document. Malformed JSON surfaces as the error; the
/// caller reports it and leaves existing state alone.
pub fn parse_import(json: &str) -> Result<ImportDocument, serde_json::Error> {
    serde_json::from_str(json)
}

impl ImportDocument {
    /// Applies the parsed collections onto the live document. Each present
    /// collection is replaced wholesale; there is no field-by-field merge.
    pub fn apply(self, map: &mut InfrastructureMap) {
        if let Some(layers) = self.layers {
            map.layers = layers.normalize();
        }
        if let Some(threats) = self.threats {
            map.threats = threats.into_iter().map(Threat::from).collect();
        }
        if let Some(elements) = self.elements {
            map.elements = elements.into_iter().map(Element::from).collect();
        }
        if let Some(connections) = self.connections {
            map.connections = connections.into_iter().map(Connection::from).collect();
        }
        if let Some(zones) = self.impact_zones {
            map.impact_zones = zones.into_iter().map(ImpactZone::from).collect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn export_value(map: &InfrastructureMap) -> Value {
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        serde_json::to_value(build_export(map, at)).unwrap()
    }

    #[test]
    fn full_document_validates_cleanly() {
        let mut map = InfrastructureMap::starter();
        map.add_impact_zone("power outage", 500.0, 350.0, 60.0);
        let report = validate_map_file(&export_value(&map));
        assert!(report.valid, "unexpected errors: {:?}", report.errors);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn missing_metadata_is_reported() {
        let mut value = export_value(&InfrastructureMap::starter());
        value.as_object_mut().unwrap().remove("metadata");
        let report = validate_map_file(&value);
        assert!(!report.valid);
        assert!(report.errors.iter().any(|e| e.contains("Missing metadata field")));
    }

    #[test]
    fn bad_version_format_is_reported() {
        let mut value = export_value(&InfrastructureMap::starter());
        value["version"] = json!("v1.2");
        let report = validate_map_file(&value);
        assert!(report.errors.contains(&"Version must be in YYYY-MM-DD format".to_string()));
    }

    #[test]
    fn non_string_version_is_reported() {
        let mut value = export_value(&InfrastructureMap::starter());
        value["version"] = json!(20250601);
        let report = validate_map_file(&value);
        assert!(report.errors.contains(&"Version must be in YYYY-MM-DD format".to_string()));
    }

    #[test]
    fn out_of_range_threat_angle_is_reported() {
        let mut value = export_value(&InfrastructureMap::starter());
        value["threats"][0]["angle"] = json!(360.0);
        let report = validate_map_file(&value);
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("angle must be between 0 and 360")));
    }

    #[test]
    fn wrong_coordinate_system_type_is_reported() {
        let mut value = export_value(&InfrastructureMap::starter());
        value["coordinateSystem"]["type"] = json!("polar");
        let report = validate_map_file(&value);
        assert!(report
            .errors
            .contains(&"coordinateSystem.type must be 'cartesian'".to_string()));
    }

    #[test]
    fn layer_opacity_out_of_range_is_reported() {
        let mut value = export_value(&InfrastructureMap::starter());
        value["layers"]["person"]["opacity"] = json!(1.5);
        let report = validate_map_file(&value);
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("opacity must be between 0 and 1")));
    }

    #[test]
    fn export_contains_fixed_blocks_and_polar_fields() {
        let mut map = InfrastructureMap::starter();
        map.add_impact_zone("outage", 550.0, 400.0, 50.0);
        let value = export_value(&map);

        assert_eq!(value["coordinateSystem"]["type"], "cartesian");
        assert_eq!(value["coordinateSystem"]["origin"], "center");
        assert_eq!(value["coordinateSystem"]["centerX"], 450.0);
        assert_eq!(value["defaults"]["distanceUnits"], "px");
        assert_eq!(value["defaults"]["angleUnits"], "deg");
        assert_eq!(value["metadata"]["exportedBy"], constants::EXPORTED_BY);
        assert_eq!(value["metadata"]["exportedAt"], "2025-06-01T12:00:00Z");

        // Layers are keyed by name, not an array.
        assert!(value["layers"].is_object());
        assert!(value["layers"]["person"]["radius"].is_number());

        // Derived polar fields ride along with cartesian positions.
        assert!(value["elements"][0]["polar"]["r"].is_number());
        let zone = &value["impactZones"][0];
        assert!((zone["polar"]["r"].as_f64().unwrap() - 100.0).abs() < 1e-3);
        assert!(zone["polar"]["theta"].as_f64().unwrap().abs() < 1e-3);
    }

    #[test]
    fn export_import_round_trip_preserves_collections() {
        let mut original = InfrastructureMap::starter();
        original.add_impact_zone("flood", 300.0, 500.0, 80.0);
        let json = export_json(&original).expect("starter map should validate");

        let mut restored = InfrastructureMap::new();
        parse_import(&json).unwrap().apply(&mut restored);

        assert_eq!(restored.layers, original.layers);
        assert_eq!(restored.threats, original.threats);
        assert_eq!(restored.elements, original.elements);
        assert_eq!(restored.connections, original.connections);
        assert_eq!(restored.impact_zones, original.impact_zones);
    }

    #[test]
    fn legacy_array_layers_are_normalized() {
        let json = r##"{
            "layers": [
                {"id": "2", "name": "home", "radius": 100, "color": "#bbf7d0"},
                {"id": "1", "name": "person", "radius": 60, "color": "#dcfce7"}
            ]
        }"##;
        let mut map = InfrastructureMap::starter();
        parse_import(json).unwrap().apply(&mut map);

        assert_eq!(map.layers.len(), 2);
        assert_eq!(map.layers[0].name, "person");
        assert_eq!(map.layers[1].name, "home");
        // Other collections were absent and stay untouched.
        assert_eq!(map.elements.len(), 10);
    }

    #[test]
    fn legacy_string_ids_keep_references_intact() {
        let json = r#"{
            "elements": [
                {"id": "1", "name": "home", "x": 480, "y": 320, "layer": 2},
                {"id": "2", "name": "power station", "x": 550, "y": 350, "layer": 3}
            ],
            "connections": [
                {"id": "1-2", "from": "1", "to": "2"}
            ]
        }"#;
        let mut map = InfrastructureMap::new();
        parse_import(json).unwrap().apply(&mut map);

        assert_eq!(map.elements.len(), 2);
        assert_eq!(map.connections.len(), 1);
        assert_eq!(map.connections[0].from, map.elements[0].id);
        assert_eq!(map.connections[0].to, map.elements[1].id);
    }

    #[test]
    fn imported_threat_angles_are_normalized() {
        let json = r#"{"threats": [{"id": "t", "name": "storm", "angle": 365.0}]}"#;
        let mut map = InfrastructureMap::new();
        parse_import(json).unwrap().apply(&mut map);
        assert_eq!(map.threats[0].angle, 5.0);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_import("{not json").is_err());
    }
}
