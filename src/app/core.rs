use super::{App, SettingsPanel};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use arboard::Clipboard;
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use ratatui::layout::Rect;

use crate::keybinds::{KeyAction, KeyBindings};
use crate::session::EditorSession;
use crate::settings::EditorSettings;
use crate::store::{StoreRequest, StoreWorker};
use crate::textarea_view::TextAreaFactory;
use crate::theme::theme_for;
use crate::types::{Focus, PendingAction};
use crate::view::ViewHandle;

impl App {
    pub(crate) const STORE_REFRESH_DEBOUNCE_MS: u64 = 120;

    /// Builds the app around a running store worker and asks it for the
    /// initial file list and settings. `watch_path` is the JSON store file to
    /// watch for outside edits, if any.
    pub(crate) fn new(
        store: StoreWorker,
        keybinds: KeyBindings,
        store_label: String,
        watch_path: Option<PathBuf>,
    ) -> Self {
        let settings = EditorSettings::default();
        let mut app = Self {
            session: EditorSession::new(TextAreaFactory),
            store,
            settings,
            theme: theme_for(settings.theme),
            files: Vec::new(),
            selected: 0,
            focus: Focus::Explorer,
            status: String::new(),
            pending: PendingAction::None,
            quit: false,
            prompt: None,
            settings_panel: SettingsPanel {
                open: false,
                index: 0,
                draft: settings,
            },
            pending_keys: Vec::new(),
            keybinds,
            clipboard: Clipboard::new().ok(),
            editor_rect: Rect::default(),
            store_label,
            watch_path,
            store_watcher: None,
            store_rx: None,
            store_refresh_pending: false,
            last_store_refresh: Instant::now(),
        };
        app.request(StoreRequest::LoadSettings);
        app.request(StoreRequest::ListFiles);
        app.start_store_watcher();
        let kb = &app.keybinds;
        let hint = format!(
            "{} open file   {} new file   {} quit",
            kb.display_for(KeyAction::FindFile),
            kb.display_for(KeyAction::NewFile),
            kb.display_for(KeyAction::Quit),
        );
        app.set_status(hint);
        app
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
    }

    pub(crate) fn start_store_watcher(&mut self) {
        let Some(path) = self.watch_path.clone() else {
            return;
        };
        let Some(dir) = path.parent().map(|p| p.to_path_buf()) else {
            return;
        };
        let (tx, rx) = mpsc::channel::<()>();
        let target = path.clone();
        let mut watcher = match RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| {
                if let Ok(event) = res
                    && event.paths.iter().any(|p| p == &target)
                {
                    let _ = tx.send(());
                }
            },
            Config::default().with_poll_interval(Duration::from_millis(250)),
        ) {
            Ok(w) => w,
            Err(err) => {
                log::warn!("store watch unavailable: {err}");
                self.set_status(format!("Store watch unavailable: {err}"));
                return;
            }
        };
        if let Err(err) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
            log::warn!("store watch unavailable: {err}");
            self.set_status(format!("Store watch unavailable: {err}"));
            return;
        }
        log::info!("watching {}", path.display());
        self.store_rx = Some(rx);
        self.store_watcher = Some(watcher);
        self.store_refresh_pending = false;
        self.last_store_refresh = Instant::now();
    }

    /// Debounced re-list of the store after the watched file changed.
    pub(crate) fn poll_store_changes(&mut self) {
        let mut saw_event = false;
        if let Some(rx) = self.store_rx.as_ref() {
            while rx.try_recv().is_ok() {
                saw_event = true;
            }
        }
        if saw_event {
            self.store_refresh_pending = true;
        }
        if self.store_refresh_pending
            && self.last_store_refresh.elapsed()
                >= Duration::from_millis(Self::STORE_REFRESH_DEBOUNCE_MS)
        {
            self.request(StoreRequest::ListFiles);
            self.store_refresh_pending = false;
            self.last_store_refresh = Instant::now();
        }
    }

    /// One turn of background work: store replies, outside changes and
    /// events from the live view.
    pub(crate) fn tick(&mut self) {
        self.poll_store();
        self.poll_store_changes();
        self.session.pump_view_events();
        self.sync_view_focus();
    }

    /// The view holds focus exactly when the editor pane does.
    pub(crate) fn sync_view_focus(&mut self) {
        if self.session.active_id().is_none() && self.focus == Focus::Editor {
            self.focus = Focus::Explorer;
        }
        let editor_focused = self.focus == Focus::Editor;
        if let Some(view) = self.session.view_mut() {
            if editor_focused {
                view.focus();
            } else {
                view.blur();
            }
        }
    }

    pub(crate) fn select_active_in_explorer(&mut self) {
        if let Some(id) = self.session.active_id()
            && let Some(idx) = self.files.iter().position(|f| f.id == id)
        {
            self.selected = idx;
        }
        self.clamp_selection();
    }

    pub(crate) fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.files.len().saturating_sub(1));
    }

    pub(crate) fn shutdown(self) {
        let App { session, .. } = self;
        session.teardown();
    }
}
