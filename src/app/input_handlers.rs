use super::App;
use std::io;
use std::path::PathBuf;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::types::{Focus, PendingAction, PromptMode, SettingsField};

fn is_cancel(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('g'))
}

impl App {
    pub(crate) fn handle_prompt_key(&mut self, key: KeyEvent) -> io::Result<()> {
        let Some(prompt) = self.prompt.as_mut() else {
            return Ok(());
        };
        if is_cancel(&key) {
            self.prompt = None;
            self.set_status("Canceled");
            return Ok(());
        }
        match (key.modifiers, key.code) {
            (_, KeyCode::Enter) => {
                let value = prompt.value.trim().to_string();
                if value.is_empty() {
                    self.set_status("Path cannot be empty");
                    return Ok(());
                }
                let mode = prompt.mode;
                self.prompt = None;
                self.apply_prompt(mode, value);
            }
            (_, KeyCode::Backspace) => {
                if prompt.cursor > 0 {
                    prompt.cursor -= 1;
                    remove_char(&mut prompt.value, prompt.cursor);
                }
            }
            (_, KeyCode::Delete) => {
                if prompt.cursor < prompt.value.chars().count() {
                    remove_char(&mut prompt.value, prompt.cursor);
                }
            }
            (_, KeyCode::Left) => {
                prompt.cursor = prompt.cursor.saturating_sub(1);
            }
            (_, KeyCode::Right) => {
                if prompt.cursor < prompt.value.chars().count() {
                    prompt.cursor += 1;
                }
            }
            (_, KeyCode::Home) => prompt.cursor = 0,
            (KeyModifiers::CONTROL, KeyCode::Char('a')) => prompt.cursor = 0,
            (_, KeyCode::End) => prompt.cursor = prompt.value.chars().count(),
            (KeyModifiers::CONTROL, KeyCode::Char('e')) => {
                prompt.cursor = prompt.value.chars().count();
            }
            (_, KeyCode::Char(c)) => {
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT)
                {
                    let byte = byte_index(&prompt.value, prompt.cursor);
                    prompt.value.insert(byte, c);
                    prompt.cursor += 1;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn apply_prompt(&mut self, mode: PromptMode, value: String) {
        match mode {
            PromptMode::ImportFile => self.import_path(&expand_home(&value)),
        }
    }

    pub(crate) fn handle_settings_key(&mut self, key: KeyEvent) -> io::Result<()> {
        if is_cancel(&key) {
            self.settings_panel.open = false;
            self.set_status("Settings unchanged");
            return Ok(());
        }
        let panel = &mut self.settings_panel;
        let field = SettingsField::ALL[panel.index.min(SettingsField::ALL.len() - 1)];
        match (key.modifiers, key.code) {
            (_, KeyCode::Up) | (KeyModifiers::CONTROL, KeyCode::Char('p')) => {
                panel.index = panel.index.saturating_sub(1);
            }
            (_, KeyCode::Down) | (KeyModifiers::CONTROL, KeyCode::Char('n')) => {
                if panel.index + 1 < SettingsField::ALL.len() {
                    panel.index += 1;
                }
            }
            (_, KeyCode::Left)
            | (_, KeyCode::Right)
            | (KeyModifiers::NONE, KeyCode::Char(' ')) => {
                let draft = &mut panel.draft;
                match field {
                    SettingsField::Theme => draft.theme = draft.theme.next(),
                    SettingsField::FontSize => draft.font_size = draft.font_size.next(),
                    SettingsField::LineNumbers => draft.line_numbers = !draft.line_numbers,
                    SettingsField::WordWrap => draft.word_wrap = !draft.word_wrap,
                    SettingsField::EmacsMode => draft.emacs_mode = !draft.emacs_mode,
                }
            }
            (_, KeyCode::Enter) => {
                let draft = panel.draft;
                panel.open = false;
                self.save_settings(draft);
                self.set_status("Saving settings");
            }
            _ => {}
        }
        Ok(())
    }

    /// Confirmation step of a pending action. Returns true when the key was
    /// consumed.
    pub(crate) fn handle_pending_key(&mut self, key: KeyEvent) -> bool {
        let PendingAction::Delete(id) = self.pending else {
            return false;
        };
        self.pending = PendingAction::None;
        match key.code {
            KeyCode::Enter | KeyCode::Char('y') => {
                self.delete_file(id);
                self.set_status("Deleting");
            }
            _ => self.set_status("Canceled"),
        }
        true
    }

    pub(crate) fn handle_explorer_key(&mut self, key: KeyEvent) -> io::Result<()> {
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Down)
            | (KeyModifiers::NONE, KeyCode::Char('j'))
            | (KeyModifiers::CONTROL, KeyCode::Char('n')) => {
                if self.selected + 1 < self.files.len() {
                    self.selected += 1;
                }
            }
            (KeyModifiers::NONE, KeyCode::Up)
            | (KeyModifiers::NONE, KeyCode::Char('k'))
            | (KeyModifiers::CONTROL, KeyCode::Char('p')) => {
                self.selected = self.selected.saturating_sub(1);
            }
            (KeyModifiers::NONE, KeyCode::Enter) => self.open_selected(),
            (KeyModifiers::NONE, KeyCode::Delete) => {
                if let Some(file) = self.files.get(self.selected) {
                    let name = file.name.clone();
                    self.pending = PendingAction::Delete(file.id);
                    self.set_status(format!("Delete {name}? Enter to confirm, any other key cancels"));
                }
            }
            (KeyModifiers::NONE, KeyCode::Tab) | (KeyModifiers::NONE, KeyCode::Esc) => {
                if self.session.active_id().is_some() {
                    self.focus = Focus::Editor;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn open_selected(&mut self) {
        let Some(file) = self.files.get(self.selected).cloned() else {
            return;
        };
        self.set_status(format!("Opened {}", file.name));
        self.session.open_or_switch(file);
        self.focus = Focus::Editor;
    }

    pub(crate) fn handle_editor_key(&mut self, key: KeyEvent) -> io::Result<()> {
        if self.session.active_id().is_none() {
            self.focus = Focus::Explorer;
            self.set_status("No file open. Focus returned to files.");
            return Ok(());
        }
        let emacs = self.settings.emacs_mode;
        let yank_key = if emacs {
            key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('y')
        } else {
            key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('v')
        };
        if yank_key {
            self.paste_from_clipboard();
            return Ok(());
        }
        let height = usize::from(self.editor_rect.height.saturating_sub(2));
        let Some(view) = self.session.view_mut() else {
            return Ok(());
        };
        let killed_before = view.yank_text();
        view.handle_key(key, emacs);
        view.scroll_to_cursor(height);
        let killed = view.yank_text();
        if killed != killed_before {
            self.copy_kill_to_clipboard(killed);
        }
        Ok(())
    }
}

fn byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

fn remove_char(s: &mut String, char_idx: usize) {
    let byte = byte_index(s, char_idx);
    if byte < s.len() {
        s.remove(byte);
    }
}

fn expand_home(value: &str) -> PathBuf {
    if let Some(rest) = value.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(rest);
    }
    PathBuf::from(value)
}
