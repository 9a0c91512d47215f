//! Core data types for the infrastructure map document.
//!
//! This module defines the five entity collections (layers, threats, elements,
//! connections, impact zones), the aggregate document that owns them, and the
//! mutation operations the UI calls into. All structs serialize with camelCase
//! field names so they double as the wire representation of the export file.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants;

/// Unique identifier shared by every entity kind in the document.
pub type EntityId = Uuid;

/// Normalizes an angle in degrees into the `[0, 360)` range.
pub fn normalize_angle(deg: f32) -> f32 {
    let a = deg % 360.0;
    if a < 0.0 {
        a + 360.0
    } else {
        a
    }
}

/// Severity / criticality scale shared by threats, elements and impact zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Display label used in the side panel.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }

    /// Default impact radius assigned to a new threat of this severity.
    pub fn default_impact_radius(&self) -> f32 {
        match self {
            Severity::Critical => 60.0,
            Severity::High => 50.0,
            _ => 40.0,
        }
    }
}

/// Kind of infrastructure an element represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Utility,
    Service,
    #[default]
    Facility,
    Market,
    Storage,
}

impl ElementKind {
    /// Display label used in the side panel.
    pub fn label(&self) -> &'static str {
        match self {
            ElementKind::Utility => "Utility",
            ElementKind::Service => "Service",
            ElementKind::Facility => "Facility",
            ElementKind::Market => "Market",
            ElementKind::Storage => "Storage",
        }
    }
}

/// Semantic type of a dependency connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorKind {
    #[default]
    Dependency,
    Backup,
    Communication,
    Supply,
}

impl ConnectorKind {
    /// Display label used in the side panel.
    pub fn label(&self) -> &'static str {
        match self {
            ConnectorKind::Dependency => "Dependency",
            ConnectorKind::Backup => "Backup",
            ConnectorKind::Communication => "Communication",
            ConnectorKind::Supply => "Supply",
        }
    }
}

/// Strength of a connection; drives rendered line width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Weak,
    #[default]
    Moderate,
    Strong,
    Critical,
}

impl Strength {
    /// Display label used in the side panel.
    pub fn label(&self) -> &'static str {
        match self {
            Strength::Weak => "Weak",
            Strength::Moderate => "Moderate",
            Strength::Strong => "Strong",
            Strength::Critical => "Critical",
        }
    }

    /// Rendered line width in screen pixels.
    pub fn line_width(&self) -> f32 {
        match self {
            Strength::Weak => 1.0,
            Strength::Moderate => 2.0,
            Strength::Strong => 3.0,
            Strength::Critical => 4.0,
        }
    }
}

/// A concentric distance ring around the map center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    /// Unique identifier for this layer.
    pub id: EntityId,
    /// User-displayable name ("person", "home", "village", ...).
    pub name: String,
    /// Ring radius in logical ring units, ascending with layer order.
    pub radius: f32,
    /// Fill color as a `#rrggbb` hex string.
    pub color: String,
    /// Fill opacity in `[0, 1]`.
    pub opacity: f32,
}

impl Layer {
    /// Creates a new layer with a fresh id.
    pub fn new(name: impl Into<String>, radius: f32, color: impl Into<String>, opacity: f32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            radius,
            color: color.into(),
            opacity,
        }
    }
}

/// A directional hazard anchored to the perimeter of the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Threat {
    /// Unique identifier for this threat.
    pub id: EntityId,
    /// User-displayable name.
    pub name: String,
    /// Direction in degrees, always normalized into `[0, 360)`.
    pub angle: f32,
    /// Radius of the shaded impact circle, in ring units.
    pub impact_radius: f32,
    /// Severity level; drives marker color.
    #[serde(default)]
    pub severity: Severity,
}

impl Threat {
    /// Creates a new threat at the given angle, normalizing it.
    pub fn new(name: impl Into<String>, angle: f32, severity: Severity) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            angle: normalize_angle(angle),
            impact_radius: severity.default_impact_radius(),
            severity,
        }
    }

    /// Sets the angle, keeping the normalization invariant.
    pub fn set_angle(&mut self, angle: f32) {
        self.angle = normalize_angle(angle);
    }
}

fn default_element_width() -> f32 {
    constants::ELEMENT_DEFAULT_WIDTH
}

fn default_element_height() -> f32 {
    constants::ELEMENT_DEFAULT_HEIGHT
}

/// A draggable, resizable infrastructure node in logical coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Unique identifier for this element.
    pub id: EntityId,
    /// User-displayable name.
    pub name: String,
    /// Center X in the fixed 900x800 logical space.
    pub x: f32,
    /// Center Y in the fixed 900x800 logical space.
    pub y: f32,
    /// Informational layer index; elements are not snapped to the ring.
    pub layer: u32,
    /// Width in logical units.
    #[serde(default = "default_element_width")]
    pub width: f32,
    /// Height in logical units.
    #[serde(default = "default_element_height")]
    pub height: f32,
    /// Kind of infrastructure.
    #[serde(default)]
    pub kind: ElementKind,
    /// Criticality level; drives outline color.
    #[serde(default)]
    pub criticality: Severity,
}

impl Element {
    /// Creates a new element centered at the given logical position.
    pub fn new(name: impl Into<String>, x: f32, y: f32, layer: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            x,
            y,
            layer,
            width: constants::ELEMENT_DEFAULT_WIDTH,
            height: constants::ELEMENT_DEFAULT_HEIGHT,
            kind: ElementKind::default(),
            criticality: Severity::default(),
        }
    }
}

/// A directed dependency edge between two elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Unique identifier for this connection.
    pub id: EntityId,
    /// Id of the source element.
    pub from: EntityId,
    /// Id of the destination element.
    pub to: EntityId,
    /// Semantic type of the link.
    #[serde(default)]
    pub connector_type: ConnectorKind,
    /// Strength of the link.
    #[serde(default)]
    pub strength: Strength,
    /// Freeform notes entered when the connection was created.
    #[serde(default)]
    pub notes: String,
}

impl Connection {
    /// Creates a new connection between two element ids.
    pub fn new(from: EntityId, to: EntityId, connector_type: ConnectorKind, strength: Strength) -> Self {
        Self {
            id: Uuid::new_v4(),
            from,
            to,
            connector_type,
            strength,
            notes: String::new(),
        }
    }
}

/// A freeform circular overlay annotating an affected area.
///
/// Zones are stored in logical coordinates like elements; the radius is in
/// ring units so rendered zones stay circular under non-uniform viewports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactZone {
    /// Unique identifier for this zone.
    pub id: EntityId,
    /// User-displayable name.
    pub name: String,
    /// Center X in logical space.
    pub x: f32,
    /// Center Y in logical space.
    pub y: f32,
    /// Radius in ring units, never below [`constants::ZONE_MIN_RADIUS`].
    pub radius: f32,
    /// Which infrastructure problems the zone annotates.
    #[serde(default)]
    pub infrastructure_problems: String,
    /// Expected downstream effects.
    #[serde(default)]
    pub impact_effects: String,
    /// Criticality of the zone.
    #[serde(default)]
    pub criticality: Severity,
    /// Freeform description.
    #[serde(default)]
    pub description: String,
}

impl ImpactZone {
    /// Creates a new impact zone centered at the given logical position.
    pub fn new(name: impl Into<String>, x: f32, y: f32, radius: f32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            x,
            y,
            radius: radius.max(constants::ZONE_MIN_RADIUS),
            infrastructure_problems: String::new(),
            impact_effects: String::new(),
            criticality: Severity::default(),
            description: String::new(),
        }
    }
}

/// The whole in-memory document: every collection the editor mutates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureMap {
    /// Concentric distance layers, ordered by ascending radius.
    pub layers: Vec<Layer>,
    /// Perimeter threat markers.
    pub threats: Vec<Threat>,
    /// Infrastructure elements.
    pub elements: Vec<Element>,
    /// Directed dependency connections between elements.
    pub connections: Vec<Connection>,
    /// Freeform impact zone overlays.
    #[serde(default)]
    pub impact_zones: Vec<ImpactZone>,
}

impl InfrastructureMap {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the seeded starter map the application opens with: seven
    /// distance layers from "person" to "world", six survival threats, ten
    /// elements and a handful of dependency connections.
    pub fn starter() -> Self {
        let layers = vec![
            Layer::new("person", 60.0, "#dcfce7", 0.4),
            Layer::new("home", 100.0, "#bbf7d0", 0.4),
            Layer::new("village", 140.0, "#86efac", 0.4),
            Layer::new("town", 180.0, "#4ade80", 0.4),
            Layer::new("region", 220.0, "#22c55e", 0.4),
            Layer::new("country", 260.0, "#16a34a", 0.4),
            Layer::new("world", 300.0, "#15803d", 0.4),
        ];
        let threats = vec![
            Threat::new("injury", 0.0, Severity::High),
            Threat::new("too hot", 60.0, Severity::Medium),
            Threat::new("too cold", 120.0, Severity::Medium),
            Threat::new("hunger", 180.0, Severity::Critical),
            Threat::new("thirst", 240.0, Severity::Critical),
            Threat::new("illness", 300.0, Severity::High),
        ];
        let mut elements = vec![
            Element::new("the individual", 450.0, 400.0, 0),
            Element::new("home", 530.0, 370.0, 2),
            Element::new("cooking", 500.0, 430.0, 2),
            Element::new("heating", 530.0, 430.0, 2),
            Element::new("cooling", 570.0, 370.0, 2),
            Element::new("power station", 600.0, 400.0, 3),
            Element::new("water plant", 330.0, 430.0, 4),
            Element::new("hospital", 370.0, 330.0, 3),
            Element::new("police", 530.0, 270.0, 3),
            Element::new("food shops", 450.0, 500.0, 3),
        ];
        elements[0].criticality = Severity::Critical;
        elements[1].criticality = Severity::Critical;
        elements[5].kind = ElementKind::Utility;
        elements[5].criticality = Severity::Critical;
        elements[6].kind = ElementKind::Utility;
        elements[6].criticality = Severity::Critical;
        elements[7].kind = ElementKind::Service;
        elements[7].criticality = Severity::Critical;
        elements[8].kind = ElementKind::Service;
        elements[9].kind = ElementKind::Market;

        let connections = vec![
            Connection::new(elements[1].id, elements[5].id, ConnectorKind::Dependency, Strength::Critical),
            Connection::new(elements[2].id, elements[5].id, ConnectorKind::Dependency, Strength::Strong),
            Connection::new(elements[3].id, elements[5].id, ConnectorKind::Dependency, Strength::Strong),
            Connection::new(elements[1].id, elements[6].id, ConnectorKind::Dependency, Strength::Critical),
        ];

        Self {
            layers,
            threats,
            elements,
            connections,
            impact_zones: Vec::new(),
        }
    }

    /// Looks up a layer by id.
    pub fn layer(&self, id: EntityId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Looks up an element by id.
    pub fn element(&self, id: EntityId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Looks up an element by id, mutably.
    pub fn element_mut(&mut self, id: EntityId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Looks up a threat by id, mutably.
    pub fn threat_mut(&mut self, id: EntityId) -> Option<&mut Threat> {
        self.threats.iter_mut().find(|t| t.id == id)
    }

    /// Looks up an impact zone by id, mutably.
    pub fn impact_zone_mut(&mut self, id: EntityId) -> Option<&mut ImpactZone> {
        self.impact_zones.iter_mut().find(|z| z.id == id)
    }

    /// Radius of the outermost layer, or zero for an empty layer list.
    pub fn max_layer_radius(&self) -> f32 {
        self.layers.iter().fold(0.0, |acc, l| acc.max(l.radius))
    }

    /// Reassigns every layer's radius as `base + index * step` so radii are
    /// monotonically increasing with no gaps. Called after insert, remove and
    /// reorder; only slot values change, never names or colors.
    pub fn recalculate_layer_radii(&mut self) {
        for (index, layer) in self.layers.iter_mut().enumerate() {
            layer.radius = constants::LAYER_RADIUS_BASE + index as f32 * constants::LAYER_RADIUS_STEP;
        }
    }

    /// Appends a new outermost layer and recalculates radii.
    pub fn add_layer(&mut self, name: impl Into<String>) -> EntityId {
        let layer = Layer::new(name, 0.0, "#10b981", 0.3);
        let id = layer.id;
        self.layers.push(layer);
        self.recalculate_layer_radii();
        id
    }

    /// Removes a layer; no cascade. Returns whether it existed.
    pub fn remove_layer(&mut self, id: EntityId) -> bool {
        let before = self.layers.len();
        self.layers.retain(|l| l.id != id);
        let removed = self.layers.len() != before;
        if removed {
            self.recalculate_layer_radii();
        }
        removed
    }

    /// Moves the layer with the given id to `new_index` (clamped) and
    /// recalculates radii. Returns whether the layer existed.
    pub fn move_layer(&mut self, id: EntityId, new_index: usize) -> bool {
        let Some(old_index) = self.layers.iter().position(|l| l.id == id) else {
            return false;
        };
        let layer = self.layers.remove(old_index);
        let new_index = new_index.min(self.layers.len());
        self.layers.insert(new_index, layer);
        self.recalculate_layer_radii();
        true
    }

    /// Suggests an angle for a new threat: the midpoint of the widest angular
    /// gap between existing threats, or 0 for the first one.
    pub fn suggested_threat_angle(&self) -> f32 {
        if self.threats.is_empty() {
            return 0.0;
        }
        let mut angles: Vec<f32> = self.threats.iter().map(|t| t.angle).collect();
        angles.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mut best_start = angles[angles.len() - 1];
        let mut best_span = angles[0] + 360.0 - best_start;
        for pair in angles.windows(2) {
            let span = pair[1] - pair[0];
            if span > best_span {
                best_span = span;
                best_start = pair[0];
            }
        }
        normalize_angle(best_start + best_span / 2.0)
    }

    /// Adds a new threat at the suggested angle and returns its id.
    pub fn add_threat(&mut self, name: impl Into<String>, severity: Severity) -> EntityId {
        let angle = self.suggested_threat_angle();
        let threat = Threat::new(name, angle, severity);
        let id = threat.id;
        self.threats.push(threat);
        id
    }

    /// Removes a threat; no cascade. Returns whether it existed.
    pub fn remove_threat(&mut self, id: EntityId) -> bool {
        let before = self.threats.len();
        self.threats.retain(|t| t.id != id);
        self.threats.len() != before
    }

    /// Adds a new element near the logical center, cascading successive
    /// elements so they do not stack exactly.
    pub fn add_element(&mut self, name: impl Into<String>, kind: ElementKind, criticality: Severity) -> EntityId {
        let n = self.elements.len() as f32;
        let x = constants::LOGICAL_CENTER_X - 48.0 + 24.0 * (n % 5.0);
        let y = constants::LOGICAL_CENTER_Y - 48.0 + 24.0 * ((n / 5.0).floor() % 5.0);
        let mut element = Element::new(name, x, y, 2);
        element.kind = kind;
        element.criticality = criticality;
        let id = element.id;
        self.elements.push(element);
        id
    }

    /// Removes an element and every connection that references it.
    pub fn remove_element(&mut self, id: EntityId) -> bool {
        let before = self.elements.len();
        self.elements.retain(|e| e.id != id);
        let removed = self.elements.len() != before;
        if removed {
            self.connections.retain(|c| c.from != id && c.to != id);
        }
        removed
    }

    /// Adds a connection between two existing elements.
    ///
    /// Rejects self-connections, dangling endpoints and exact duplicates.
    pub fn add_connection(
        &mut self,
        from: EntityId,
        to: EntityId,
        connector_type: ConnectorKind,
        strength: Strength,
        notes: String,
    ) -> Result<EntityId, String> {
        if from == to {
            return Err("An element cannot depend on itself".to_string());
        }
        if self.element(from).is_none() {
            return Err("Source element does not exist".to_string());
        }
        if self.element(to).is_none() {
            return Err("Destination element does not exist".to_string());
        }
        if self.connections.iter().any(|c| c.from == from && c.to == to) {
            return Err("Connection already exists".to_string());
        }
        let mut connection = Connection::new(from, to, connector_type, strength);
        connection.notes = notes;
        let id = connection.id;
        self.connections.push(connection);
        Ok(id)
    }

    /// Removes a connection. Returns whether it existed.
    pub fn remove_connection(&mut self, id: EntityId) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c.id != id);
        self.connections.len() != before
    }

    /// Adds an impact zone centered at the given logical position.
    pub fn add_impact_zone(&mut self, name: impl Into<String>, x: f32, y: f32, radius: f32) -> EntityId {
        let zone = ImpactZone::new(name, x, y, radius);
        let id = zone.id;
        self.impact_zones.push(zone);
        id
    }

    /// Removes an impact zone; no cascade. Returns whether it existed.
    pub fn remove_impact_zone(&mut self, id: EntityId) -> bool {
        let before = self.impact_zones.len();
        self.impact_zones.retain(|z| z.id != id);
        self.impact_zones.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_angle_wraps_into_range() {
        assert_eq!(normalize_angle(0.0), 0.0);
        assert_eq!(normalize_angle(360.0), 0.0);
        assert_eq!(normalize_angle(-90.0), 270.0);
        assert_eq!(normalize_angle(725.0), 5.0);
    }

    #[test]
    fn starter_map_matches_seed_data() {
        let map = InfrastructureMap::starter();
        assert_eq!(map.layers.len(), 7);
        assert_eq!(map.threats.len(), 6);
        assert_eq!(map.elements.len(), 10);
        assert_eq!(map.connections.len(), 4);
        assert!(map.impact_zones.is_empty());
        // Radii ascend with layer order.
        for pair in map.layers.windows(2) {
            assert!(pair[0].radius < pair[1].radius);
        }
    }

    #[test]
    fn add_layer_extends_outward_and_recalculates() {
        let mut map = InfrastructureMap::new();
        map.add_layer("a");
        map.add_layer("b");
        map.add_layer("c");
        let radii: Vec<f32> = map.layers.iter().map(|l| l.radius).collect();
        assert_eq!(radii, vec![60.0, 100.0, 140.0]);
    }

    #[test]
    fn layer_reorder_moves_names_not_slot_radii() {
        let mut map = InfrastructureMap::new();
        map.add_layer("a");
        let b = map.add_layer("b");
        map.add_layer("c");

        // Move "b" below "c": names swap, slot values stay base + index*step.
        assert!(map.move_layer(b, 2));
        let names: Vec<&str> = map.layers.iter().map(|l| l.name.as_str()).collect();
        let radii: Vec<f32> = map.layers.iter().map(|l| l.radius).collect();
        assert_eq!(names, vec!["a", "c", "b"]);
        assert_eq!(radii, vec![60.0, 100.0, 140.0]);
    }

    #[test]
    fn remove_layer_closes_the_gap() {
        let mut map = InfrastructureMap::new();
        map.add_layer("a");
        let b = map.add_layer("b");
        map.add_layer("c");
        assert!(map.remove_layer(b));
        let radii: Vec<f32> = map.layers.iter().map(|l| l.radius).collect();
        assert_eq!(radii, vec![60.0, 100.0]);
    }

    #[test]
    fn new_threat_angle_is_normalized() {
        let threat = Threat::new("storm", 400.0, Severity::Low);
        assert_eq!(threat.angle, 40.0);
        let mut threat = threat;
        threat.set_angle(-30.0);
        assert_eq!(threat.angle, 330.0);
    }

    #[test]
    fn suggested_threat_angle_fills_widest_gap() {
        let mut map = InfrastructureMap::new();
        assert_eq!(map.suggested_threat_angle(), 0.0);

        map.threats.push(Threat::new("a", 0.0, Severity::Low));
        map.threats.push(Threat::new("b", 90.0, Severity::Low));
        // Widest gap is 90..360 (wrapping); midpoint is 225.
        assert_eq!(map.suggested_threat_angle(), 225.0);
    }

    #[test]
    fn add_connection_rejects_dangling_and_duplicates() {
        let mut map = InfrastructureMap::new();
        let a = map.add_element("a", ElementKind::Facility, Severity::Medium);
        let b = map.add_element("b", ElementKind::Facility, Severity::Medium);

        assert!(map
            .add_connection(a, b, ConnectorKind::Dependency, Strength::Moderate, String::new())
            .is_ok());
        let dup = map.add_connection(a, b, ConnectorKind::Backup, Strength::Weak, String::new());
        assert_eq!(dup.unwrap_err(), "Connection already exists");

        let missing = Uuid::new_v4();
        let err = map
            .add_connection(missing, b, ConnectorKind::Dependency, Strength::Moderate, String::new())
            .unwrap_err();
        assert_eq!(err, "Source element does not exist");

        let self_loop = map.add_connection(a, a, ConnectorKind::Dependency, Strength::Weak, String::new());
        assert!(self_loop.is_err());
    }

    #[test]
    fn remove_element_cascades_its_connections_only() {
        let mut map = InfrastructureMap::new();
        let a = map.add_element("a", ElementKind::Facility, Severity::Medium);
        let b = map.add_element("b", ElementKind::Facility, Severity::Medium);
        let c = map.add_element("c", ElementKind::Facility, Severity::Medium);

        map.add_connection(a, b, ConnectorKind::Dependency, Strength::Moderate, String::new())
            .unwrap();
        map.add_connection(b, c, ConnectorKind::Supply, Strength::Strong, String::new())
            .unwrap();
        map.add_connection(a, c, ConnectorKind::Backup, Strength::Weak, String::new())
            .unwrap();
        assert_eq!(map.connections.len(), 3);

        assert!(map.remove_element(b));
        assert_eq!(map.connections.len(), 1);
        assert_eq!(map.connections[0].from, a);
        assert_eq!(map.connections[0].to, c);
    }

    #[test]
    fn remove_threat_and_layer_do_not_cascade() {
        let mut map = InfrastructureMap::starter();
        let elements = map.elements.len();
        let connections = map.connections.len();

        let threat = map.threats[0].id;
        let layer = map.layers[0].id;
        assert!(map.remove_threat(threat));
        assert!(map.remove_layer(layer));
        assert_eq!(map.elements.len(), elements);
        assert_eq!(map.connections.len(), connections);
    }

    #[test]
    fn impact_zone_radius_is_clamped_on_creation() {
        let zone = ImpactZone::new("outage", 100.0, 100.0, 5.0);
        assert_eq!(zone.radius, constants::ZONE_MIN_RADIUS);
    }

    #[test]
    fn document_serializes_with_camel_case_keys() {
        let mut map = InfrastructureMap::new();
        map.add_impact_zone("outage", 400.0, 300.0, 50.0);
        let json = serde_json::to_string(&map).unwrap();
        assert!(json.contains("\"impactZones\""));
        assert!(json.contains("\"infrastructureProblems\""));
    }
}
