use super::App;
use std::io;

use ratatui::crossterm::event::{KeyEvent, KeyEventKind};

use crate::keybinds::{KeyAction, KeyMatch, display_keys};
use crate::types::{Focus, PendingAction, PromptMode, PromptState};
use crate::view::ViewHandle;

impl App {
    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> io::Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        let result = self.route_key(key);
        self.session.pump_view_events();
        self.sync_view_focus();
        result
    }

    fn route_key(&mut self, key: KeyEvent) -> io::Result<()> {
        if self.prompt.is_some() {
            return self.handle_prompt_key(key);
        }
        if self.settings_panel.open {
            return self.handle_settings_key(key);
        }
        if self.handle_pending_key(key) {
            return Ok(());
        }

        self.pending_keys.push(key);
        match self.keybinds.lookup(&self.pending_keys) {
            KeyMatch::Action(action) => {
                self.pending_keys.clear();
                return self.run_key_action(action);
            }
            KeyMatch::Prefix => {
                self.set_status(format!("{}-", display_keys(&self.pending_keys)));
                return Ok(());
            }
            KeyMatch::None => {
                if self.pending_keys.len() > 1 {
                    let keys = display_keys(&self.pending_keys);
                    self.pending_keys.clear();
                    self.set_status(format!("{keys} is undefined"));
                    return Ok(());
                }
                self.pending_keys.clear();
            }
        }

        match self.focus {
            Focus::Explorer => self.handle_explorer_key(key),
            Focus::Editor => self.handle_editor_key(key),
        }
    }

    pub(crate) fn run_key_action(&mut self, action: KeyAction) -> io::Result<()> {
        log::debug!("action {action:?}");
        if action != KeyAction::Quit && self.pending == PendingAction::Quit {
            self.pending = PendingAction::None;
        }
        match action {
            KeyAction::Save => self.save_active(),
            KeyAction::CloseTab => {
                let name = self.session.active_file().map(|f| f.name.clone());
                self.session.close_active();
                if let Some(name) = name {
                    self.set_status(format!("Closed {name}"));
                }
                self.select_active_in_explorer();
            }
            KeyAction::FindFile => {
                self.focus = Focus::Explorer;
                self.select_active_in_explorer();
                self.set_status("Select a file and press Enter");
            }
            KeyAction::NextTab => {
                self.session.switch_next();
                self.select_active_in_explorer();
            }
            KeyAction::NewFile => self.create_new_file(),
            KeyAction::ImportFile => {
                self.prompt = Some(PromptState {
                    title: "Import local file".to_string(),
                    value: String::new(),
                    cursor: 0,
                    mode: PromptMode::ImportFile,
                });
            }
            KeyAction::CycleLanguage => {
                let next = self.session.selected_language().next();
                self.session.change_language(next);
                self.set_status(format!("Language: {}", self.session.selected_language().label()));
            }
            KeyAction::Settings => {
                self.settings_panel.open = true;
                self.settings_panel.index = 0;
                self.settings_panel.draft = self.settings;
            }
            KeyAction::ToggleComment => {
                if self.focus == Focus::Editor {
                    self.toggle_comment();
                }
            }
            KeyAction::DismissNotice => {
                if self.session.notices_mut().dismiss_current().is_none() {
                    self.set_status("No notifications");
                }
            }
            KeyAction::Quit => {
                if !self.session.has_unsaved_changes() || self.pending == PendingAction::Quit {
                    self.quit = true;
                } else {
                    self.pending = PendingAction::Quit;
                    self.set_status(format!(
                        "Modified files exist; {} again to quit",
                        self.keybinds.display_for(KeyAction::Quit)
                    ));
                }
            }
            KeyAction::Cancel => {
                self.pending = PendingAction::None;
                self.set_status("Quit");
            }
        }
        Ok(())
    }

    /// Bracketed paste from the terminal goes straight into the view.
    pub(crate) fn handle_paste(&mut self, text: String) {
        if text.is_empty() || self.focus != Focus::Editor {
            return;
        }
        if let Some(view) = self.session.view_mut()
            && view.has_focus()
            && view.insert_str(&text)
        {
            self.set_status("Pasted");
        }
        self.session.pump_view_events();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::thread;
    use std::time::Duration;

    use ratatui::crossterm::event::{KeyCode, KeyModifiers};
    use tempfile::tempdir;

    use crate::keybinds::KeyBindings;
    use crate::language::LanguageMode;
    use crate::notice::NoticeLevel;
    use crate::store::{MemStorage, StoreWorker, local_client};

    fn new_app() -> App {
        let client = local_client(Box::new(MemStorage::with_samples())).expect("client");
        let worker = StoreWorker::spawn(Box::new(client)).expect("worker");
        let mut app = App::new(worker, KeyBindings::defaults(), "memory".to_string(), None);
        app.clipboard = None;
        assert!(settle(&mut app, |a| a.files.len() == 3), "initial listing");
        app
    }

    fn settle(app: &mut App, done: impl Fn(&App) -> bool) -> bool {
        for _ in 0..400 {
            app.tick();
            if done(app) {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    fn press(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
        app.handle_key(KeyEvent::new(code, modifiers)).expect("key");
    }

    fn chord(app: &mut App, keys: &[(KeyCode, KeyModifiers)]) {
        for (code, modifiers) in keys {
            press(app, *code, *modifiers);
        }
    }

    const CX: (KeyCode, KeyModifiers) = (KeyCode::Char('x'), KeyModifiers::CONTROL);

    fn open_first(app: &mut App) {
        app.selected = 0;
        press(app, KeyCode::Enter, KeyModifiers::NONE);
    }

    #[test]
    fn enter_opens_selected_file_in_focused_view() {
        let mut app = new_app();
        open_first(&mut app);
        assert_eq!(app.focus, Focus::Editor);
        assert_eq!(app.session.active_file().map(|f| f.name.as_str()), Some("index.js"));
        assert!(app.session.view().is_some_and(|v| v.has_focus()));
    }

    #[test]
    fn typing_marks_modified_and_save_clears_it() {
        let mut app = new_app();
        open_first(&mut app);
        press(&mut app, KeyCode::Char('x'), KeyModifiers::NONE);
        assert!(app.session.active_is_modified());
        assert!(app.session.active_file().is_some_and(|f| f.content.starts_with("x//")));

        chord(&mut app, &[CX, (KeyCode::Char('s'), KeyModifiers::CONTROL)]);
        assert!(settle(&mut app, |a| !a.session.active_is_modified()));
        assert_eq!(app.status, "Saved index.js");
        let persisted = app.session.tabs()[0].persisted().to_string();
        assert!(persisted.starts_with("x//"));
    }

    #[test]
    fn prefix_is_shown_and_unknown_sequence_resets() {
        let mut app = new_app();
        press(&mut app, CX.0, CX.1);
        assert_eq!(app.pending_keys.len(), 1);
        assert_eq!(app.status, "C-x-");
        press(&mut app, KeyCode::Char('z'), KeyModifiers::NONE);
        assert!(app.pending_keys.is_empty());
        assert_eq!(app.status, "C-x z is undefined");
    }

    #[test]
    fn cancel_clears_pending_prefix() {
        let mut app = new_app();
        chord(&mut app, &[CX, (KeyCode::Char('g'), KeyModifiers::CONTROL)]);
        assert!(app.pending_keys.is_empty());
        assert_eq!(app.status, "Quit");
        assert!(!app.quit);
    }

    #[test]
    fn new_file_opens_untitled_tab() {
        let mut app = new_app();
        chord(&mut app, &[CX, (KeyCode::Char('n'), KeyModifiers::CONTROL)]);
        assert!(settle(&mut app, |a| a.files.len() == 4 && a.session.active_id().is_some()));
        let file = app.session.active_file().expect("active");
        assert_eq!(file.name, "untitled-1.js");
        assert_eq!(file.content, "");
        assert_eq!(app.focus, Focus::Editor);
    }

    #[test]
    fn language_cycle_keeps_unsaved_edits() {
        let mut app = new_app();
        open_first(&mut app);
        press(&mut app, KeyCode::Char('y'), KeyModifiers::NONE);
        chord(&mut app, &[CX, (KeyCode::Char('l'), KeyModifiers::NONE)]);
        assert_eq!(app.session.selected_language(), &LanguageMode::Python);
        let view = app.session.view().expect("view");
        assert_eq!(view.language(), &LanguageMode::Python);
        assert!(view.text().starts_with("y//"));
        assert_eq!(view.cursor(), 1);
        assert!(view.has_focus());
        assert!(app.session.active_is_modified());
        assert_eq!(app.status, "Language: Python");
    }

    #[test]
    fn quit_asks_again_when_files_are_modified() {
        let mut app = new_app();
        open_first(&mut app);
        press(&mut app, KeyCode::Char('q'), KeyModifiers::NONE);
        let quit = [CX, (KeyCode::Char('c'), KeyModifiers::CONTROL)];
        chord(&mut app, &quit);
        assert!(!app.quit);
        assert_eq!(app.pending, PendingAction::Quit);
        chord(&mut app, &quit);
        assert!(app.quit);
    }

    #[test]
    fn close_tab_returns_focus_to_explorer() {
        let mut app = new_app();
        open_first(&mut app);
        chord(&mut app, &[CX, (KeyCode::Char('k'), KeyModifiers::NONE)]);
        assert!(app.session.tabs().is_empty());
        assert!(app.session.view().is_none());
        assert_eq!(app.focus, Focus::Explorer);
        assert_eq!(app.status, "Closed index.js");
    }

    #[test]
    fn settings_panel_saves_through_store() {
        let mut app = new_app();
        chord(&mut app, &[CX, (KeyCode::Char('s'), KeyModifiers::NONE)]);
        assert!(app.settings_panel.open);
        for _ in 0..4 {
            press(&mut app, KeyCode::Down, KeyModifiers::NONE);
        }
        press(&mut app, KeyCode::Char(' '), KeyModifiers::NONE);
        assert!(!app.settings_panel.draft.emacs_mode);
        assert!(app.settings.emacs_mode);
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert!(!app.settings_panel.open);
        assert!(settle(&mut app, |a| !a.settings.emacs_mode));
        let notice = app.session.notices().current().expect("notice");
        assert_eq!(notice.level, NoticeLevel::Info);
        assert_eq!(notice.message, "Settings saved");
    }

    #[test]
    fn settings_panel_escape_discards_draft() {
        let mut app = new_app();
        chord(&mut app, &[CX, (KeyCode::Char('s'), KeyModifiers::NONE)]);
        press(&mut app, KeyCode::Right, KeyModifiers::NONE);
        press(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        assert!(!app.settings_panel.open);
        assert_eq!(app.settings, crate::settings::EditorSettings::default());
    }

    #[test]
    fn explorer_delete_needs_confirmation() {
        let mut app = new_app();
        open_first(&mut app);
        app.focus = Focus::Explorer;
        press(&mut app, KeyCode::Delete, KeyModifiers::NONE);
        press(&mut app, KeyCode::Char('n'), KeyModifiers::NONE);
        assert_eq!(app.status, "Canceled");
        press(&mut app, KeyCode::Delete, KeyModifiers::NONE);
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert!(settle(&mut app, |a| a.files.len() == 2));
        assert!(app.session.tabs().is_empty());
    }

    #[test]
    fn import_prompt_creates_file_with_language() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("query.sql");
        fs::write(&path, "select 1;").expect("write");
        let mut app = new_app();
        chord(&mut app, &[CX, (KeyCode::Char('i'), KeyModifiers::NONE)]);
        assert!(app.prompt.is_some());
        for ch in path.display().to_string().chars() {
            press(&mut app, KeyCode::Char(ch), KeyModifiers::NONE);
        }
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert!(app.prompt.is_none());
        assert!(settle(&mut app, |a| a.session.active_id().is_some()));
        let file = app.session.active_file().expect("active");
        assert_eq!(file.name, "query.sql");
        assert_eq!(file.language, LanguageMode::Sql);
        assert_eq!(file.content, "select 1;");
    }

    #[test]
    fn failed_import_raises_error_notice() {
        let mut app = new_app();
        app.import_path(std::path::Path::new("/definitely/missing/file.js"));
        let notice = app.session.notices().current().expect("notice");
        assert_eq!(notice.level, NoticeLevel::Error);
        chord(&mut app, &[CX, (KeyCode::Char('n'), KeyModifiers::NONE)]);
        assert!(app.session.notices().is_empty());
    }

    #[test]
    fn toggle_comment_edits_active_line() {
        let mut app = new_app();
        open_first(&mut app);
        press(&mut app, KeyCode::Char(';'), KeyModifiers::ALT);
        let text = app.session.active_file().expect("active").content.clone();
        assert!(text.starts_with("Welcome to mxedit\n"));
        assert!(app.session.active_is_modified());
        press(&mut app, KeyCode::Char(';'), KeyModifiers::ALT);
        assert!(!app.session.active_is_modified());
    }

    #[test]
    fn next_tab_cycles_open_files() {
        let mut app = new_app();
        open_first(&mut app);
        app.focus = Focus::Explorer;
        app.selected = 1;
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.session.active_file().map(|f| f.name.as_str()), Some("styles.css"));
        chord(&mut app, &[CX, (KeyCode::Char('b'), KeyModifiers::NONE)]);
        assert_eq!(app.session.active_file().map(|f| f.name.as_str()), Some("index.js"));
        assert_eq!(app.selected, 0);
    }
}
