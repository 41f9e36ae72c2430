//! Editor session: which files are open, which one is active, which ones are
//! dirty, and the single live view that edits the active one.

use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, Sender};

use crate::error::StoreResult;
use crate::file::{FileEntity, FileId, FilePatch, NewFile};
use crate::language::LanguageMode;
use crate::notice::Notices;
use crate::store::StoreClient;
use crate::view::{
    CursorPosition, ViewEvent, ViewEventSink, ViewFactory, ViewHandle, ViewParams, char_len,
};

pub const SAVE_FAILED: &str = "Failed to save file. Please check file permissions and try again.";
pub const CREATE_FAILED: &str = "Failed to create new file. Please try again.";

/// A member of the open set together with its last known persisted content.
#[derive(Debug, Clone)]
pub struct OpenFile {
    pub file: FileEntity,
    persisted: String,
    revision: u64,
}

impl OpenFile {
    fn new(file: FileEntity) -> Self {
        Self {
            persisted: file.content.clone(),
            file,
            revision: 0,
        }
    }

    pub fn id(&self) -> FileId {
        self.file.id
    }

    pub fn persisted(&self) -> &str {
        &self.persisted
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn is_dirty(&self) -> bool {
        self.file.content != self.persisted
    }
}

/// An in-flight save: what was sent, and the tab revision it was taken at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTicket {
    pub id: FileId,
    pub content: String,
    pub revision: u64,
}

impl SaveTicket {
    pub fn patch(&self) -> FilePatch {
        FilePatch {
            content: self.content.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ViewTag {
    file: FileId,
    language: LanguageMode,
}

struct ViewSession<H> {
    handle: H,
    tag: ViewTag,
    generation: u64,
}

pub struct EditorSession<F: ViewFactory> {
    factory: F,
    tabs: Vec<OpenFile>,
    active: Option<FileId>,
    modified: HashSet<FileId>,
    view: Option<ViewSession<F::Handle>>,
    next_generation: u64,
    cursor: CursorPosition,
    language: LanguageMode,
    events_tx: Sender<(u64, ViewEvent)>,
    events_rx: Receiver<(u64, ViewEvent)>,
    notices: Notices,
}

impl<F: ViewFactory> EditorSession<F> {
    pub fn new(factory: F) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            factory,
            tabs: Vec::new(),
            active: None,
            modified: HashSet::new(),
            view: None,
            next_generation: 0,
            cursor: CursorPosition::default(),
            language: LanguageMode::DEFAULT,
            events_tx,
            events_rx,
            notices: Notices::new(),
        }
    }

    pub fn open_or_switch(&mut self, file: FileEntity) {
        let id = file.id;
        self.language = file.language.clone();
        if self.tab(id).is_none() {
            log::debug!("opening {} ({id})", file.name);
            self.tabs.push(OpenFile::new(file));
        }
        self.active = Some(id);
        self.sync_view();
    }

    /// Activates the tab after the active one, wrapping around.
    pub fn switch_next(&mut self) {
        let Some(idx) = self.active_index() else {
            return;
        };
        let next = self.tabs[(idx + 1) % self.tabs.len()].file.clone();
        self.open_or_switch(next);
    }

    pub fn close(&mut self, id: FileId) {
        let Some(idx) = self.tabs.iter().position(|t| t.id() == id) else {
            return;
        };
        let closed = self.tabs.remove(idx);
        self.modified.remove(&id);
        log::debug!("closed {} ({id})", closed.file.name);
        if self.active == Some(id) {
            let next = if idx > 0 {
                self.tabs.get(idx - 1)
            } else {
                self.tabs.last()
            };
            self.active = next.map(OpenFile::id);
            if let Some(tab) = next {
                self.language = tab.file.language.clone();
            }
        }
        self.sync_view();
    }

    pub fn close_active(&mut self) {
        if let Some(id) = self.active {
            self.close(id);
        }
    }

    /// Replaces the active file's in-memory content.
    pub fn edit_content(&mut self, text: String) {
        self.apply_edit(text);
        self.sync_view();
    }

    fn apply_edit(&mut self, text: String) {
        let Some(id) = self.active else {
            return;
        };
        let Some(tab) = self.tabs.iter_mut().find(|t| t.id() == id) else {
            return;
        };
        if tab.file.content != text {
            tab.file.content = text;
            tab.revision += 1;
        }
        let dirty = tab.is_dirty();
        self.mark(id, dirty);
    }

    fn mark(&mut self, id: FileId, dirty: bool) {
        if dirty {
            self.modified.insert(id);
        } else {
            self.modified.remove(&id);
        }
    }

    pub fn change_language(&mut self, mode: LanguageMode) {
        log::debug!("language -> {mode}");
        self.language = mode;
        self.sync_view();
    }

    pub fn begin_save(&self) -> Option<SaveTicket> {
        let tab = self.active_tab()?;
        Some(SaveTicket {
            id: tab.id(),
            content: tab.file.content.clone(),
            revision: tab.revision,
        })
    }

    pub fn finish_save(&mut self, ticket: SaveTicket, result: StoreResult<FileEntity>) {
        let saved = match result {
            Ok(saved) => saved,
            Err(err) => {
                log::warn!("save of {} failed: {err}", ticket.id);
                self.notices.error(SAVE_FAILED);
                return;
            }
        };
        let Some(tab) = self.tabs.iter_mut().find(|t| t.id() == ticket.id) else {
            log::debug!("save of {} completed after close", ticket.id);
            return;
        };
        log::info!("saved {} ({})", saved.name, saved.id);
        tab.persisted = saved.content.clone();
        if tab.revision == ticket.revision {
            tab.file = saved;
        }
        self.modified.remove(&ticket.id);
        self.sync_view();
    }

    /// Saves the active file through `client` and applies the result.
    pub fn save(&mut self, client: &mut dyn StoreClient) {
        let Some(ticket) = self.begin_save() else {
            return;
        };
        let result = client.update_file(ticket.id, &ticket.patch());
        self.finish_save(ticket, result);
    }

    /// First `untitled-N.js` not used by an open tab.
    pub fn new_file_name(&self) -> String {
        (1..)
            .map(|n| format!("untitled-{n}.js"))
            .find(|name| !self.tabs.iter().any(|t| &t.file.name == name))
            .unwrap_or_else(|| "untitled.js".to_string())
    }

    pub fn new_file_request(&self) -> NewFile {
        let name = self.new_file_name();
        NewFile {
            path: format!("/{name}"),
            name,
            content: Some(String::new()),
            language: Some(LanguageMode::DEFAULT),
        }
    }

    pub fn file_created(&mut self, result: StoreResult<FileEntity>) {
        match result {
            Ok(file) => {
                log::info!("created {} ({})", file.name, file.id);
                self.open_or_switch(file);
            }
            Err(err) => {
                log::warn!("create failed: {err}");
                self.notices.error(CREATE_FAILED);
            }
        }
    }

    /// The store reports `file` changed by someone else.
    /// Local edits are judged against the snapshot, not the ModifiedSet: a
    /// save that completed under newer edits clears the set but leaves the
    /// tab's text ahead of the store.
    pub fn apply_external_update(&mut self, file: FileEntity) {
        let Some(tab) = self.tabs.iter_mut().find(|t| t.id() == file.id) else {
            return;
        };
        if tab.persisted == file.content {
            return;
        }
        let dirty = tab.is_dirty();
        log::debug!("external update of {} (dirty: {dirty})", file.name);
        tab.file.name = file.name;
        tab.file.path = file.path;
        tab.persisted = file.content;
        if !dirty {
            tab.file.content = tab.persisted.clone();
            tab.revision += 1;
        }
        let now_dirty = tab.is_dirty();
        self.mark(file.id, now_dirty);
        self.sync_view();
    }

    /// The store reports `id` deleted. Clean tabs close; dirty ones stay.
    pub fn apply_external_removal(&mut self, id: FileId) {
        let Some(tab) = self.tab(id) else {
            return;
        };
        if tab.is_dirty() {
            let name = tab.file.name.clone();
            self.notices.error(format!(
                "{name} was deleted from the store. Your unsaved changes are still open."
            ));
        } else {
            self.close(id);
        }
    }

    /// Applies everything the live view has reported since the last call.
    pub fn pump_view_events(&mut self) {
        let live = self.view.as_ref().map(|v| v.generation);
        while let Ok((generation, event)) = self.events_rx.try_recv() {
            if Some(generation) != live {
                continue;
            }
            match event {
                ViewEvent::TextChanged(text) => self.apply_edit(text),
                ViewEvent::CursorMoved(position) => self.cursor = position,
            }
        }
    }

    pub fn teardown(mut self) {
        self.destroy_view();
    }

    fn destroy_view(&mut self) {
        if let Some(outgoing) = self.view.take() {
            outgoing.handle.destroy();
        }
    }

    fn sync_view(&mut self) {
        let Some(active) = self.active else {
            self.destroy_view();
            self.cursor = CursorPosition::default();
            return;
        };
        let Some(content) = self.tab(active).map(|t| t.file.content.clone()) else {
            return;
        };
        let desired = ViewTag {
            file: active,
            language: self.language.clone(),
        };

        if let Some(view) = self.view.as_mut()
            && view.tag == desired
        {
            if view.handle.text() != content {
                view.handle.replace_all_text(&content);
            }
            self.refresh_cursor();
            return;
        }

        let outgoing = self.view.take().map(|v| {
            let state = (v.tag.file, v.handle.cursor(), v.handle.has_focus());
            v.handle.destroy();
            state
        });

        self.next_generation += 1;
        let generation = self.next_generation;
        let len = char_len(&content);
        let mut handle = self.factory.construct(ViewParams {
            text: content,
            language: desired.language.clone(),
            events: ViewEventSink::new(generation, self.events_tx.clone()),
        });
        if let Some((file, offset, focused)) = outgoing
            && file == desired.file
            && focused
        {
            handle.set_cursor(offset.min(len));
            handle.focus();
        }
        self.view = Some(ViewSession {
            handle,
            tag: desired,
            generation,
        });
        self.refresh_cursor();
    }

    fn refresh_cursor(&mut self) {
        if let Some(view) = &self.view {
            self.cursor = CursorPosition::from_offset(&view.handle.text(), view.handle.cursor());
        }
    }

    fn tab(&self, id: FileId) -> Option<&OpenFile> {
        self.tabs.iter().find(|t| t.id() == id)
    }

    pub fn tabs(&self) -> &[OpenFile] {
        &self.tabs
    }

    pub fn active_id(&self) -> Option<FileId> {
        self.active
    }

    pub fn active_index(&self) -> Option<usize> {
        let id = self.active?;
        self.tabs.iter().position(|t| t.id() == id)
    }

    fn active_tab(&self) -> Option<&OpenFile> {
        self.tab(self.active?)
    }

    pub fn active_file(&self) -> Option<&FileEntity> {
        self.active_tab().map(|t| &t.file)
    }

    pub fn is_modified(&self, id: FileId) -> bool {
        self.modified.contains(&id)
    }

    pub fn active_is_modified(&self) -> bool {
        self.active.is_some_and(|id| self.is_modified(id))
    }

    pub fn modified_ids(&self) -> &HashSet<FileId> {
        &self.modified
    }

    /// True when any open tab holds text the store has not confirmed,
    /// including edits made while a save was in flight.
    pub fn has_unsaved_changes(&self) -> bool {
        !self.modified.is_empty() || self.tabs.iter().any(OpenFile::is_dirty)
    }

    pub fn cursor(&self) -> CursorPosition {
        self.cursor
    }

    pub fn selected_language(&self) -> &LanguageMode {
        &self.language
    }

    pub fn view(&self) -> Option<&F::Handle> {
        self.view.as_ref().map(|v| &v.handle)
    }

    pub fn view_mut(&mut self) -> Option<&mut F::Handle> {
        self.view.as_mut().map(|v| &mut v.handle)
    }

    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut Notices {
        &mut self.notices
    }
}

impl<F: ViewFactory> Drop for EditorSession<F> {
    fn drop(&mut self) {
        self.destroy_view();
    }
}
