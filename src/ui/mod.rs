//! User interface for the infrastructure mapper.
//!
//! # Module Organization
//!
//! - `state` - Application state structures and the main MapperApp
//! - `canvas` - Hit testing and pointer gesture handling
//! - `rendering` - Drawing rings, segments, threats, elements and zones
//! - `file_ops` - Async export/import via file dialogs

mod canvas;
mod file_ops;
mod rendering;
mod state;

#[cfg(test)]
mod tests;

pub use state::MapperApp;

use self::state::{ConnectState, PanelTab};
use crate::types::{ConnectorKind, ElementKind, EntityId, Severity, Strength};
use eframe::egui;

impl eframe::App for MapperApp {
    /// Persist UI preferences between restarts.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        match self.to_json() {
            Ok(json) => storage.set_string("ui_prefs", json),
            Err(err) => log::warn!("failed to serialize preferences: {err}"),
        }
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let visuals = if self.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);

        self.handle_pending_operations(ctx);
        self.handle_delete_key(ctx);
        self.handle_file_shortcuts(ctx);

        egui::TopBottomPanel::top("top_toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        egui::SidePanel::right("side_panel")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| {
                self.draw_side_panel(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_canvas(ui);
        });

        self.draw_connector_prompt(ctx);
        self.draw_error_window(ctx);
    }
}

impl MapperApp {
    /// Handles file-related keyboard shortcuts: New, Open (import), Save
    /// (export).
    fn handle_file_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        ctx.input(|i| {
            let cmd = i.modifiers.command;
            if i.key_pressed(egui::Key::S) && cmd {
                self.export_map();
            }
            if i.key_pressed(egui::Key::O) && cmd {
                self.import_map();
            }
            if i.key_pressed(egui::Key::N) && cmd {
                self.new_map();
            }
        });
    }

    /// Deletes the selected entity on Delete, respecting cascade rules.
    fn handle_delete_key(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() || !ctx.input(|i| i.key_pressed(egui::Key::Delete)) {
            return;
        }
        if let Some(id) = self.interaction.selected_element.take() {
            self.map.remove_element(id);
        } else if let Some(id) = self.interaction.selected_connection.take() {
            self.map.remove_connection(id);
        } else if let Some(id) = self.interaction.selected_threat.take() {
            self.map.remove_threat(id);
        } else if let Some(id) = self.interaction.selected_zone.take() {
            self.map.remove_impact_zone(id);
        }
    }

    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("New").clicked() {
                self.new_map();
            }
            if ui.button("Import").clicked() {
                self.import_map();
            }
            if ui.button("Export").clicked() {
                self.export_map();
            }

            ui.separator();

            ui.checkbox(&mut self.view.show_segments, "Threat Segments");
            ui.checkbox(&mut self.view.show_threat_impact, "Impact Circles");
            ui.separator();
            ui.checkbox(&mut self.dark_mode, "Dark Mode");

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if let ConnectState::Armed { from } = self.interaction.connect {
                    let name = self
                        .map
                        .element(from)
                        .map(|e| e.name.clone())
                        .unwrap_or_default();
                    ui.label(format!("Connecting from \"{name}\" — click a destination"));
                } else if let Some(status) = &self.file.status {
                    ui.label(status);
                }
            });
        });
    }

    fn draw_side_panel(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.panel_tab, PanelTab::Elements, "Elements");
            ui.selectable_value(&mut self.panel_tab, PanelTab::Threats, "Threats");
            ui.selectable_value(&mut self.panel_tab, PanelTab::Layers, "Layers");
        });
        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.panel_tab, PanelTab::Connections, "Connections");
            ui.selectable_value(&mut self.panel_tab, PanelTab::Zones, "Zones");
        });
        ui.separator();

        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| match self.panel_tab {
                PanelTab::Elements => self.draw_elements_tab(ui),
                PanelTab::Threats => self.draw_threats_tab(ui),
                PanelTab::Layers => self.draw_layers_tab(ui),
                PanelTab::Connections => self.draw_connections_tab(ui),
                PanelTab::Zones => self.draw_zones_tab(ui),
            });
    }

    fn draw_elements_tab(&mut self, ui: &mut egui::Ui) {
        ui.label("Add element:");
        ui.text_edit_singleline(&mut self.interaction.new_element_name);
        kind_combo(ui, "new_element_kind", &mut self.interaction.new_element_kind);
        severity_combo(
            ui,
            "new_element_criticality",
            "Criticality",
            &mut self.interaction.new_element_criticality,
        );
        if ui.button("Add").clicked() && !self.interaction.new_element_name.trim().is_empty() {
            let name = self.interaction.new_element_name.trim().to_string();
            let id = self.map.add_element(
                name,
                self.interaction.new_element_kind,
                self.interaction.new_element_criticality,
            );
            self.interaction.selected_element = Some(id);
            self.interaction.new_element_name.clear();
        }

        ui.separator();

        let mut delete: Option<EntityId> = None;
        let listing: Vec<(EntityId, String)> = self
            .map
            .elements
            .iter()
            .map(|e| (e.id, e.name.clone()))
            .collect();
        for (id, name) in listing {
            ui.horizontal(|ui| {
                let selected = self.interaction.selected_element == Some(id);
                if ui.selectable_label(selected, &name).clicked() {
                    self.interaction.selected_element = Some(id);
                }
                if ui.small_button("✖").clicked() {
                    delete = Some(id);
                }
            });
        }
        if let Some(id) = delete {
            self.map.remove_element(id);
            if self.interaction.selected_element == Some(id) {
                self.interaction.selected_element = None;
            }
        }

        if let Some(id) = self.interaction.selected_element {
            ui.separator();
            ui.label("Selected element:");
            let mut kind = ElementKind::default();
            let mut criticality = Severity::default();
            if let Some(element) = self.map.element_mut(id) {
                ui.text_edit_singleline(&mut element.name);
                kind = element.kind;
                criticality = element.criticality;
            }
            kind_combo(ui, "edit_element_kind", &mut kind);
            severity_combo(ui, "edit_element_criticality", "Criticality", &mut criticality);
            if let Some(element) = self.map.element_mut(id) {
                element.kind = kind;
                element.criticality = criticality;
            }
            ui.colored_label(egui::Color32::GRAY, "Click another element to connect");
        }
    }

    fn draw_threats_tab(&mut self, ui: &mut egui::Ui) {
        ui.label("Add threat:");
        ui.text_edit_singleline(&mut self.interaction.new_threat_name);
        severity_combo(
            ui,
            "new_threat_severity",
            "Severity",
            &mut self.interaction.new_threat_severity,
        );
        if ui.button("Add").clicked() && !self.interaction.new_threat_name.trim().is_empty() {
            let name = self.interaction.new_threat_name.trim().to_string();
            let id = self.map.add_threat(name, self.interaction.new_threat_severity);
            self.interaction.selected_threat = Some(id);
            self.interaction.new_threat_name.clear();
        }

        ui.separator();

        let mut delete: Option<EntityId> = None;
        let listing: Vec<(EntityId, String)> = self
            .map
            .threats
            .iter()
            .map(|t| (t.id, t.name.clone()))
            .collect();
        for (id, name) in listing {
            ui.horizontal(|ui| {
                let selected = self.interaction.selected_threat == Some(id);
                if ui.selectable_label(selected, &name).clicked() {
                    self.interaction.selected_threat = Some(id);
                }
                if ui.small_button("✖").clicked() {
                    delete = Some(id);
                }
            });
        }
        if let Some(id) = delete {
            self.map.remove_threat(id);
            if self.interaction.selected_threat == Some(id) {
                self.interaction.selected_threat = None;
            }
        }

        if let Some(id) = self.interaction.selected_threat {
            ui.separator();
            ui.label("Selected threat:");
            let mut severity = Severity::default();
            let mut angle = 0.0_f32;
            if let Some(threat) = self.map.threat_mut(id) {
                ui.text_edit_singleline(&mut threat.name);
                severity = threat.severity;
                angle = threat.angle;
                ui.horizontal(|ui| {
                    ui.label("Impact radius:");
                    ui.add(
                        egui::DragValue::new(&mut threat.impact_radius)
                            .range(0.0..=200.0)
                            .speed(1.0),
                    );
                });
            }
            ui.horizontal(|ui| {
                ui.label("Angle:");
                ui.add(egui::DragValue::new(&mut angle).speed(1.0).suffix("°"));
            });
            severity_combo(ui, "edit_threat_severity", "Severity", &mut severity);
            if let Some(threat) = self.map.threat_mut(id) {
                threat.set_angle(angle);
                threat.severity = severity;
            }
        }
    }

    fn draw_layers_tab(&mut self, ui: &mut egui::Ui) {
        ui.label("Add layer:");
        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut self.interaction.new_layer_name);
            if ui.button("Add").clicked() && !self.interaction.new_layer_name.trim().is_empty() {
                let name = self.interaction.new_layer_name.trim().to_string();
                self.map.add_layer(name);
                self.interaction.new_layer_name.clear();
            }
        });

        ui.separator();

        // Innermost first; reorder buttons shift a layer inward or outward
        // and radii follow the slot, not the layer.
        let mut move_to: Option<(EntityId, usize)> = None;
        let mut delete: Option<EntityId> = None;
        let listing: Vec<(EntityId, String, f32)> = self
            .map
            .layers
            .iter()
            .map(|l| (l.id, l.name.clone(), l.radius))
            .collect();
        let count = listing.len();
        for (index, (id, name, radius)) in listing.into_iter().enumerate() {
            ui.horizontal(|ui| {
                ui.label(format!("{name} ({radius:.0})"));
                if index > 0 && ui.small_button("↑").clicked() {
                    move_to = Some((id, index - 1));
                }
                if index + 1 < count && ui.small_button("↓").clicked() {
                    move_to = Some((id, index + 1));
                }
                if ui.small_button("✖").clicked() {
                    delete = Some(id);
                }
            });
        }
        if let Some((id, index)) = move_to {
            self.map.move_layer(id, index);
        }
        if let Some(id) = delete {
            self.map.remove_layer(id);
        }

        ui.separator();
        ui.label("Layer appearance:");
        for layer in &mut self.map.layers {
            ui.horizontal(|ui| {
                ui.label(&layer.name);
                ui.text_edit_singleline(&mut layer.color);
                ui.add(egui::Slider::new(&mut layer.opacity, 0.0..=1.0).show_value(false));
            });
        }
    }

    fn draw_connections_tab(&mut self, ui: &mut egui::Ui) {
        ui.colored_label(
            egui::Color32::GRAY,
            "Click one element then another on the canvas to connect them.",
        );
        ui.separator();

        let mut delete: Option<EntityId> = None;
        let listing: Vec<(EntityId, String)> = self
            .map
            .connections
            .iter()
            .map(|c| {
                let from = self
                    .map
                    .element(c.from)
                    .map(|e| e.name.as_str())
                    .unwrap_or("(missing)");
                let to = self
                    .map
                    .element(c.to)
                    .map(|e| e.name.as_str())
                    .unwrap_or("(missing)");
                (c.id, format!("{from} → {to} ({})", c.connector_type.label()))
            })
            .collect();
        for (id, label) in listing {
            ui.horizontal(|ui| {
                let selected = self.interaction.selected_connection == Some(id);
                if ui.selectable_label(selected, &label).clicked() {
                    self.interaction.selected_connection = Some(id);
                }
                if ui.small_button("✖").clicked() {
                    delete = Some(id);
                }
            });
        }
        if let Some(id) = delete {
            self.map.remove_connection(id);
            if self.interaction.selected_connection == Some(id) {
                self.interaction.selected_connection = None;
            }
        }

        if let Some(id) = self.interaction.selected_connection {
            if let Some(index) = self.map.connections.iter().position(|c| c.id == id) {
                ui.separator();
                ui.label("Selected connection:");
                let connection = &mut self.map.connections[index];
                connector_combo(ui, "edit_connector_type", &mut connection.connector_type);
                strength_combo(ui, "edit_connector_strength", &mut connection.strength);
                ui.label("Notes:");
                ui.text_edit_multiline(&mut connection.notes);
            }
        }
    }

    fn draw_zones_tab(&mut self, ui: &mut egui::Ui) {
        ui.label("Add impact zone:");
        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut self.interaction.new_zone_name);
            if ui.button("Add").clicked() && !self.interaction.new_zone_name.trim().is_empty() {
                let name = self.interaction.new_zone_name.trim().to_string();
                let id = self.map.add_impact_zone(
                    name,
                    crate::constants::LOGICAL_CENTER_X,
                    crate::constants::LOGICAL_CENTER_Y,
                    60.0,
                );
                self.interaction.selected_zone = Some(id);
                self.interaction.new_zone_name.clear();
            }
        });

        ui.separator();

        let mut delete: Option<EntityId> = None;
        let listing: Vec<(EntityId, String)> = self
            .map
            .impact_zones
            .iter()
            .map(|z| (z.id, z.name.clone()))
            .collect();
        for (id, name) in listing {
            ui.horizontal(|ui| {
                let selected = self.interaction.selected_zone == Some(id);
                if ui.selectable_label(selected, &name).clicked() {
                    self.interaction.selected_zone = Some(id);
                }
                if ui.small_button("✖").clicked() {
                    delete = Some(id);
                }
            });
        }
        if let Some(id) = delete {
            self.map.remove_impact_zone(id);
            if self.interaction.selected_zone == Some(id) {
                self.interaction.selected_zone = None;
            }
        }

        if let Some(id) = self.interaction.selected_zone {
            ui.separator();
            ui.label("Selected zone:");
            let mut criticality = Severity::default();
            if let Some(zone) = self.map.impact_zone_mut(id) {
                ui.text_edit_singleline(&mut zone.name);
                ui.horizontal(|ui| {
                    ui.label("Radius:");
                    ui.add(
                        egui::DragValue::new(&mut zone.radius)
                            .range(crate::constants::ZONE_MIN_RADIUS..=400.0)
                            .speed(1.0),
                    );
                });
                criticality = zone.criticality;
            }
            severity_combo(ui, "edit_zone_criticality", "Criticality", &mut criticality);
            if let Some(zone) = self.map.impact_zone_mut(id) {
                zone.criticality = criticality;
                ui.label("Infrastructure problems:");
                ui.text_edit_multiline(&mut zone.infrastructure_problems);
                ui.label("Impact effects:");
                ui.text_edit_multiline(&mut zone.impact_effects);
                ui.label("Description:");
                ui.text_edit_multiline(&mut zone.description);
            }
        }
    }

    /// The connector metadata prompt, open while a connection is pending.
    fn draw_connector_prompt(&mut self, ctx: &egui::Context) {
        let ConnectState::Pending {
            from,
            to,
            mut connector_type,
            mut strength,
            mut notes,
        } = self.interaction.connect.clone()
        else {
            return;
        };

        let from_name = self
            .map
            .element(from)
            .map(|e| e.name.clone())
            .unwrap_or_default();
        let to_name = self
            .map
            .element(to)
            .map(|e| e.name.clone())
            .unwrap_or_default();

        let mut commit = false;
        let mut cancel = false;
        egui::Window::new("New connection")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(format!("{from_name} → {to_name}"));
                connector_combo(ui, "pending_connector_type", &mut connector_type);
                strength_combo(ui, "pending_connector_strength", &mut strength);
                ui.label("Notes:");
                ui.text_edit_multiline(&mut notes);
                ui.horizontal(|ui| {
                    if ui.button("Add connection").clicked() {
                        commit = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                });
            });

        self.interaction.connect = ConnectState::Pending {
            from,
            to,
            connector_type,
            strength,
            notes,
        };
        if commit {
            self.commit_pending_connection();
        } else if cancel {
            self.cancel_pending_connection();
        }
    }

    /// Blocking error window listing every collected problem.
    fn draw_error_window(&mut self, ctx: &egui::Context) {
        if self.file.errors.is_empty() {
            return;
        }
        let mut dismiss = false;
        egui::Window::new("Problems")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                for error in &self.file.errors {
                    ui.label(format!("• {error}"));
                }
                if ui.button("OK").clicked() {
                    dismiss = true;
                }
            });
        if dismiss {
            self.file.errors.clear();
        }
    }
}

fn severity_combo(ui: &mut egui::Ui, id: &str, label: &str, value: &mut Severity) {
    ui.horizontal(|ui| {
        ui.label(format!("{label}:"));
        egui::ComboBox::from_id_salt(id)
            .selected_text(value.label())
            .show_ui(ui, |ui| {
                for option in [Severity::Low, Severity::Medium, Severity::High, Severity::Critical] {
                    ui.selectable_value(value, option, option.label());
                }
            });
    });
}

fn kind_combo(ui: &mut egui::Ui, id: &str, value: &mut ElementKind) {
    ui.horizontal(|ui| {
        ui.label("Kind:");
        egui::ComboBox::from_id_salt(id)
            .selected_text(value.label())
            .show_ui(ui, |ui| {
                for option in [
                    ElementKind::Utility,
                    ElementKind::Service,
                    ElementKind::Facility,
                    ElementKind::Market,
                    ElementKind::Storage,
                ] {
                    ui.selectable_value(value, option, option.label());
                }
            });
    });
}

fn connector_combo(ui: &mut egui::Ui, id: &str, value: &mut ConnectorKind) {
    ui.horizontal(|ui| {
        ui.label("Type:");
        egui::ComboBox::from_id_salt(id)
            .selected_text(value.label())
            .show_ui(ui, |ui| {
                for option in [
                    ConnectorKind::Dependency,
                    ConnectorKind::Backup,
                    ConnectorKind::Communication,
                    ConnectorKind::Supply,
                ] {
                    ui.selectable_value(value, option, option.label());
                }
            });
    });
}

fn strength_combo(ui: &mut egui::Ui, id: &str, value: &mut Strength) {
    ui.horizontal(|ui| {
        ui.label("Strength:");
        egui::ComboBox::from_id_salt(id)
            .selected_text(value.label())
            .show_ui(ui, |ui| {
                for option in [
                    Strength::Weak,
                    Strength::Moderate,
                    Strength::Strong,
                    Strength::Critical,
                ] {
                    ui.selectable_value(value, option, option.label());
                }
            });
    });
}
