use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::Instant;

use arboard::Clipboard;
use notify::RecommendedWatcher;
use ratatui::crossterm::event::KeyEvent;
use ratatui::layout::Rect;

use crate::file::FileEntity;
use crate::keybinds::KeyBindings;
use crate::session::EditorSession;
use crate::settings::EditorSettings;
use crate::store::StoreWorker;
use crate::textarea_view::TextAreaFactory;
use crate::theme::Theme;
use crate::types::{Focus, PendingAction, PromptState};

mod core;
mod editor;
mod input;
mod input_handlers;
mod store;

pub(crate) struct SettingsPanel {
    pub(crate) open: bool,
    pub(crate) index: usize,
    pub(crate) draft: EditorSettings,
}

pub(crate) struct App {
    pub(crate) session: EditorSession<TextAreaFactory>,
    pub(crate) store: StoreWorker,
    pub(crate) settings: EditorSettings,
    pub(crate) theme: Theme,
    pub(crate) files: Vec<FileEntity>,
    pub(crate) selected: usize,
    pub(crate) focus: Focus,
    pub(crate) status: String,
    pub(crate) pending: PendingAction,
    pub(crate) quit: bool,
    pub(crate) prompt: Option<PromptState>,
    pub(crate) settings_panel: SettingsPanel,
    pub(crate) pending_keys: Vec<KeyEvent>,
    pub(crate) keybinds: KeyBindings,
    pub(crate) clipboard: Option<Clipboard>,
    pub(crate) editor_rect: Rect,
    pub(crate) store_label: String,
    pub(crate) watch_path: Option<PathBuf>,
    pub(crate) store_watcher: Option<RecommendedWatcher>,
    pub(crate) store_rx: Option<Receiver<()>>,
    pub(crate) store_refresh_pending: bool,
    pub(crate) last_store_refresh: Instant,
}
