//! Application state structures.
//!
//! This module contains the state that tracks the current UI session: pointer
//! capture, the connect flow, side panel selection, and async file operations.

use crate::types::{ConnectorKind, ElementKind, EntityId, InfrastructureMap, Severity, Strength};
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Receiver, Sender};

/// Which corner of an element is being resized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl ResizeHandle {
    /// All four handles in drawing order.
    pub const ALL: [ResizeHandle; 4] = [
        ResizeHandle::NorthWest,
        ResizeHandle::NorthEast,
        ResizeHandle::SouthWest,
        ResizeHandle::SouthEast,
    ];

    /// The corner this handle sits on.
    pub fn corner(&self, rect: egui::Rect) -> egui::Pos2 {
        match self {
            ResizeHandle::NorthWest => rect.min,
            ResizeHandle::NorthEast => egui::pos2(rect.max.x, rect.min.y),
            ResizeHandle::SouthWest => egui::pos2(rect.min.x, rect.max.y),
            ResizeHandle::SouthEast => rect.max,
        }
    }

    /// The opposite corner, which stays fixed during the resize.
    pub fn anchor(&self, rect: egui::Rect) -> egui::Pos2 {
        match self {
            ResizeHandle::NorthWest => rect.max,
            ResizeHandle::NorthEast => egui::pos2(rect.min.x, rect.max.y),
            ResizeHandle::SouthWest => egui::pos2(rect.max.x, rect.min.y),
            ResizeHandle::SouthEast => rect.min,
        }
    }

    /// Unit direction from the anchor toward this handle's corner. The resize
    /// distance is measured along this direction so the element stays on its
    /// own side of the anchor.
    pub fn direction(&self) -> egui::Vec2 {
        match self {
            ResizeHandle::NorthWest => egui::vec2(-1.0, -1.0),
            ResizeHandle::NorthEast => egui::vec2(1.0, -1.0),
            ResizeHandle::SouthWest => egui::vec2(-1.0, 1.0),
            ResizeHandle::SouthEast => egui::vec2(1.0, 1.0),
        }
    }
}

/// What the pointer is currently doing on the canvas.
///
/// Exactly one gesture can be active at a time; pointer-up always returns to
/// [`PointerState::Idle`] and drops the captured ids and offsets with it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerState {
    /// No gesture in progress.
    Idle,
    /// An element is being dragged.
    DragElement {
        /// Element under the pointer.
        id: EntityId,
        /// Logical offset from the pointer to the element center at press time.
        grab_offset: egui::Vec2,
        /// Screen position of the initial press, for click-vs-drag detection.
        press_pos: egui::Pos2,
        /// Whether the pointer has moved beyond the click threshold.
        moved: bool,
    },
    /// An impact zone is being dragged.
    DragZone {
        id: EntityId,
        grab_offset: egui::Vec2,
    },
    /// An element corner handle is being dragged.
    ResizeElement { id: EntityId, handle: ResizeHandle },
    /// An impact zone rim is being dragged.
    ResizeZone { id: EntityId },
    /// A threat's perimeter handle is being dragged around the center.
    DragThreatHandle { id: EntityId },
}

/// The click-driven connect flow.
///
/// Clicking a first element arms the flow, clicking a second opens the
/// connector prompt; clicking empty canvas or the armed element cancels.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectState {
    /// Not connecting.
    Inactive,
    /// A source element has been picked; waiting for the destination click.
    Armed { from: EntityId },
    /// Both endpoints picked; the connector prompt is open.
    Pending {
        from: EntityId,
        to: EntityId,
        connector_type: ConnectorKind,
        strength: Strength,
        notes: String,
    },
}

/// Tabs of the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PanelTab {
    Elements,
    Threats,
    Layers,
    Connections,
    Zones,
}

/// Canvas display toggles.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    /// Whether threat segment wedges are drawn behind the rings.
    pub show_segments: bool,
    /// Whether threat impact circles are drawn at the perimeter.
    pub show_threat_impact: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            show_segments: true,
            show_threat_impact: true,
        }
    }
}

/// Per-session interaction state: pointer capture, selection and the small
/// form fields of the side panel.
pub struct InteractionState {
    /// Current pointer gesture.
    pub pointer: PointerState,
    /// Current connect flow state.
    pub connect: ConnectState,
    /// Selected element, if any.
    pub selected_element: Option<EntityId>,
    /// Selected threat, if any.
    pub selected_threat: Option<EntityId>,
    /// Selected impact zone, if any.
    pub selected_zone: Option<EntityId>,
    /// Selected connection, if any.
    pub selected_connection: Option<EntityId>,
    /// Name entered in the "add element" form.
    pub new_element_name: String,
    /// Kind picked in the "add element" form.
    pub new_element_kind: ElementKind,
    /// Criticality picked in the "add element" form.
    pub new_element_criticality: Severity,
    /// Name entered in the "add threat" form.
    pub new_threat_name: String,
    /// Severity picked in the "add threat" form.
    pub new_threat_severity: Severity,
    /// Name entered in the "add layer" form.
    pub new_layer_name: String,
    /// Name entered in the "add zone" form.
    pub new_zone_name: String,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            pointer: PointerState::Idle,
            connect: ConnectState::Inactive,
            selected_element: None,
            selected_threat: None,
            selected_zone: None,
            selected_connection: None,
            new_element_name: String::new(),
            new_element_kind: ElementKind::default(),
            new_element_criticality: Severity::default(),
            new_threat_name: String::new(),
            new_threat_severity: Severity::default(),
            new_layer_name: String::new(),
            new_zone_name: String::new(),
        }
    }
}

impl InteractionState {
    /// Clears selection and any in-progress gesture, e.g. after an import
    /// replaces the entities the selection pointed at.
    pub fn reset(&mut self) {
        self.pointer = PointerState::Idle;
        self.connect = ConnectState::Inactive;
        self.selected_element = None;
        self.selected_threat = None;
        self.selected_zone = None;
        self.selected_connection = None;
    }
}

/// Messages sent from async file operations back to the main app.
#[derive(Debug)]
pub enum FileOperationResult {
    /// Export completed successfully to the given path.
    ExportCompleted(String),
    /// Import read the file at the given path with the given content.
    ImportCompleted(String, String),
    /// Operation failed with an error message.
    OperationFailed(String),
}

/// State for async file operations.
///
/// Dialogs run on a tokio runtime; results come back over a channel and are
/// drained on the UI thread each frame.
pub struct FileState {
    /// Runtime driving the async file dialogs. `None` if construction failed,
    /// in which case file operations report an error instead of running.
    pub runtime: Option<tokio::runtime::Runtime>,
    /// Whether an export was requested this frame.
    pub pending_export: bool,
    /// Whether an import was requested this frame.
    pub pending_import: bool,
    /// Sender handed to spawned dialog tasks.
    pub sender: Sender<FileOperationResult>,
    /// Receiver drained by the UI thread.
    pub receiver: Receiver<FileOperationResult>,
    /// One-line status shown in the toolbar after the last file operation.
    pub status: Option<String>,
    /// Errors shown in a blocking window until dismissed.
    pub errors: Vec<String>,
}

impl Default for FileState {
    fn default() -> Self {
        let (sender, receiver) = channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .ok();
        Self {
            runtime,
            pending_export: false,
            pending_import: false,
            sender,
            receiver,
            status: None,
            errors: Vec::new(),
        }
    }
}

/// The main application: the map being edited plus all UI state.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct MapperApp {
    /// The infrastructure map being edited.
    #[serde(skip)]
    pub map: InfrastructureMap,
    /// Canvas display toggles.
    pub view: ViewState,
    /// Pointer, connect and selection state.
    #[serde(skip)]
    pub interaction: InteractionState,
    /// Async file operation state.
    #[serde(skip)]
    pub file: FileState,
    /// Which side panel tab is open.
    pub panel_tab: PanelTab,
    /// Whether dark mode visuals are enabled.
    pub dark_mode: bool,
}

impl Default for MapperApp {
    fn default() -> Self {
        Self {
            map: InfrastructureMap::starter(),
            view: ViewState::default(),
            interaction: InteractionState::default(),
            file: FileState::default(),
            panel_tab: PanelTab::Elements,
            dark_mode: true,
        }
    }
}

impl MapperApp {
    /// Serializes the persisted UI preferences to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Restores UI preferences from JSON, keeping everything else default.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
