//! Export and import of the map document via native file dialogs.
//!
//! Dialogs are async (`rfd::AsyncFileDialog`) and run on the tokio runtime
//! held in [`FileState`]; results come back to the UI thread over the channel
//! and are applied in `handle_pending_operations` each frame.
//!
//! [`FileState`]: super::state::FileState

use super::state::{FileOperationResult, MapperApp};
use crate::constants;
use crate::schema;
use crate::types::InfrastructureMap;
use eframe::egui;

impl MapperApp {
    /// Processes completed file operations and starts newly requested ones.
    pub fn handle_pending_operations(&mut self, ctx: &egui::Context) {
        while let Ok(result) = self.file.receiver.try_recv() {
            match result {
                FileOperationResult::ExportCompleted(path) => {
                    log::info!("exported map to {path}");
                    self.file.status = Some(format!("Exported to {path}"));
                }
                FileOperationResult::ImportCompleted(path, content) => {
                    match schema::parse_import(&content) {
                        Ok(document) => {
                            document.apply(&mut self.map);
                            self.interaction.reset();
                            log::info!("imported map from {path}");
                            self.file.status = Some(format!("Imported {path}"));
                        }
                        Err(e) => {
                            log::warn!("failed to parse {path}: {e}");
                            self.file.errors.push(format!("Could not parse file: {e}"));
                        }
                    }
                }
                FileOperationResult::OperationFailed(error) => {
                    log::warn!("file operation failed: {error}");
                    self.file.errors.push(error);
                }
            }
        }

        if self.file.pending_export {
            self.file.pending_export = false;
            // Validation failure blocks the dialog entirely.
            match schema::export_json(&self.map) {
                Ok(json) => self.spawn_export(ctx, json),
                Err(errors) => {
                    log::warn!("export blocked by {} validation error(s)", errors.len());
                    self.file.errors.extend(errors);
                }
            }
        }

        if self.file.pending_import {
            self.file.pending_import = false;
            self.spawn_import(ctx);
        }
    }

    fn spawn_export(&mut self, ctx: &egui::Context, json: String) {
        let Some(runtime) = &self.file.runtime else {
            self.file
                .errors
                .push("File dialogs are unavailable: no async runtime".to_string());
            return;
        };
        let ctx = ctx.clone();
        let sender = self.file.sender.clone();
        runtime.spawn(async move {
            if let Some(handle) = rfd::AsyncFileDialog::new()
                .add_filter("JSON", &["json"])
                .set_file_name(constants::EXPORT_FILE_NAME)
                .save_file()
                .await
            {
                let path = handle.path();
                let result = match std::fs::write(path, json) {
                    Ok(()) => FileOperationResult::ExportCompleted(path.display().to_string()),
                    Err(e) => FileOperationResult::OperationFailed(format!(
                        "Failed to write file: {e}"
                    )),
                };
                let _ = sender.send(result);
            }
            ctx.request_repaint();
        });
    }

    fn spawn_import(&mut self, ctx: &egui::Context) {
        let Some(runtime) = &self.file.runtime else {
            self.file
                .errors
                .push("File dialogs are unavailable: no async runtime".to_string());
            return;
        };
        let ctx = ctx.clone();
        let sender = self.file.sender.clone();
        runtime.spawn(async move {
            if let Some(handle) = rfd::AsyncFileDialog::new()
                .add_filter("JSON", &["json"])
                .pick_file()
                .await
            {
                let path = handle.path();
                let result = match std::fs::read_to_string(path) {
                    Ok(content) => {
                        FileOperationResult::ImportCompleted(path.display().to_string(), content)
                    }
                    Err(e) => {
                        FileOperationResult::OperationFailed(format!("Failed to read file: {e}"))
                    }
                };
                let _ = sender.send(result);
            }
            ctx.request_repaint();
        });
    }

    /// Requests an export; the dialog opens next frame if validation passes.
    pub fn export_map(&mut self) {
        self.file.pending_export = true;
    }

    /// Requests an import; the dialog opens next frame.
    pub fn import_map(&mut self) {
        self.file.pending_import = true;
    }

    /// Replaces the document with the seeded starter map.
    pub fn new_map(&mut self) {
        self.map = InfrastructureMap::starter();
        self.interaction.reset();
        self.file.status = None;
    }
}
