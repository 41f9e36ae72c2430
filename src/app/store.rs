use super::App;
use std::collections::HashSet;
use std::path::Path;

use crate::error::StoreResult;
use crate::file::{FileEntity, FileId};
use crate::import::import_file;
use crate::settings::EditorSettings;
use crate::store::{StoreReply, StoreRequest};
use crate::theme::theme_for;
use crate::types::Focus;

pub(crate) const DELETE_FAILED: &str = "Failed to delete file. Please try again.";
pub(crate) const SETTINGS_LOAD_FAILED: &str = "Failed to load settings. Using defaults.";
pub(crate) const SETTINGS_SAVE_FAILED: &str = "Failed to save settings. Please try again.";
pub(crate) const LIST_FAILED: &str = "Failed to load files. Please try again.";

impl App {
    /// Queues a request. A dead worker surfaces as a notice.
    pub(crate) fn request(&mut self, request: StoreRequest) {
        if let Err(err) = self.store.send(request) {
            log::error!("store worker unavailable: {err}");
            self.session
                .notices_mut()
                .error("The store is unavailable. Changes cannot be saved.");
        }
    }

    pub(crate) fn poll_store(&mut self) {
        for reply in self.store.poll() {
            self.apply_reply(reply);
        }
    }

    fn apply_reply(&mut self, reply: StoreReply) {
        match reply {
            StoreReply::Files(result) => self.apply_file_list(result),
            StoreReply::Created(result) => {
                let created = result.is_ok();
                self.session.file_created(result);
                if created {
                    self.request(StoreRequest::ListFiles);
                    self.select_active_in_explorer();
                    self.focus = Focus::Editor;
                }
            }
            StoreReply::Saved(ticket, result) => {
                let name = self
                    .session
                    .tabs()
                    .iter()
                    .find(|t| t.id() == ticket.id)
                    .map(|t| t.file.name.clone());
                let ok = result.is_ok();
                self.session.finish_save(ticket, result);
                if ok && let Some(name) = name {
                    self.set_status(format!("Saved {name}"));
                }
            }
            StoreReply::Deleted(id, result) => self.apply_deleted(id, result),
            StoreReply::Settings(result) => match result {
                Ok(settings) => self.apply_settings(settings),
                Err(err) => {
                    log::warn!("load settings failed: {err}");
                    self.session.notices_mut().error(SETTINGS_LOAD_FAILED);
                }
            },
            StoreReply::SettingsSaved(result) => match result {
                Ok(settings) => {
                    log::info!("settings saved");
                    self.apply_settings(settings);
                    self.session.notices_mut().info("Settings saved");
                }
                Err(err) => {
                    log::warn!("save settings failed: {err}");
                    self.session.notices_mut().error(SETTINGS_SAVE_FAILED);
                }
            },
        }
    }

    /// Refreshes the explorer and reconciles open tabs with the listing.
    /// Only files that vanished since the previous listing count as removed.
    fn apply_file_list(&mut self, result: StoreResult<Vec<FileEntity>>) {
        let files = match result {
            Ok(files) => files,
            Err(err) => {
                log::warn!("list files failed: {err}");
                self.session.notices_mut().error(LIST_FAILED);
                return;
            }
        };
        let listed: HashSet<FileId> = files.iter().map(|f| f.id).collect();
        let vanished: Vec<FileId> = self
            .files
            .iter()
            .map(|f| f.id)
            .filter(|id| !listed.contains(id))
            .collect();
        for file in &files {
            self.session.apply_external_update(file.clone());
        }
        for id in vanished {
            self.session.apply_external_removal(id);
        }
        self.files = files;
        self.clamp_selection();
    }

    fn apply_deleted(&mut self, id: FileId, result: StoreResult<()>) {
        match result {
            Ok(()) => {
                log::info!("deleted {id}");
                self.session.close(id);
                self.files.retain(|f| f.id != id);
                self.clamp_selection();
                self.set_status("Deleted");
            }
            Err(err) => {
                log::warn!("delete {id} failed: {err}");
                self.session.notices_mut().error(DELETE_FAILED);
            }
        }
    }

    pub(crate) fn apply_settings(&mut self, settings: EditorSettings) {
        self.settings = settings;
        self.theme = theme_for(settings.theme);
    }

    pub(crate) fn save_active(&mut self) {
        match self.session.begin_save() {
            Some(ticket) => {
                log::info!("saving {} (revision {})", ticket.id, ticket.revision);
                self.request(StoreRequest::SaveFile(ticket));
            }
            None => self.set_status("No file to save"),
        }
    }

    pub(crate) fn create_new_file(&mut self) {
        let new = self.session.new_file_request();
        self.set_status(format!("Creating {}", new.name));
        self.request(StoreRequest::CreateFile(new));
    }

    pub(crate) fn import_path(&mut self, path: &Path) {
        match import_file(path) {
            Ok(new) => {
                log::info!("importing {}", path.display());
                self.set_status(format!("Importing {}", new.name));
                self.request(StoreRequest::CreateFile(new));
            }
            Err(err) => {
                log::warn!("import {} failed: {err}", path.display());
                self.session
                    .notices_mut()
                    .error(format!("Failed to import {}: {err}", path.display()));
            }
        }
    }

    pub(crate) fn delete_file(&mut self, id: FileId) {
        self.request(StoreRequest::DeleteFile(id));
    }

    pub(crate) fn save_settings(&mut self, settings: EditorSettings) {
        self.request(StoreRequest::SaveSettings(settings));
    }
}
