use super::App;

impl App {
    /// Yank, preferring the system clipboard over the widget's kill buffer.
    pub(crate) fn paste_from_clipboard(&mut self) {
        let mut from_system = false;
        let system_text = self
            .clipboard
            .as_mut()
            .and_then(|c| c.get_text().ok())
            .filter(|t| !t.is_empty());
        let height = usize::from(self.editor_rect.height.saturating_sub(2));
        let Some(view) = self.session.view_mut() else {
            return;
        };
        if let Some(text) = system_text {
            view.set_yank_text(text);
            from_system = true;
        }
        let pasted = view.yank();
        view.scroll_to_cursor(height);
        if pasted {
            if from_system {
                self.set_status("Yanked from clipboard");
            } else {
                self.set_status("Yanked");
            }
        } else {
            self.set_status("Kill ring is empty");
        }
    }

    /// Mirrors a kill (`C-k`, `C-w`, ...) into the system clipboard.
    pub(crate) fn copy_kill_to_clipboard(&mut self, killed: String) {
        if killed.is_empty() {
            return;
        }
        if let Some(clipboard) = self.clipboard.as_mut()
            && clipboard.set_text(killed).is_err()
        {
            log::debug!("system clipboard rejected kill text");
        }
    }

    pub(crate) fn toggle_comment(&mut self) {
        let Some(view) = self.session.view_mut() else {
            return;
        };
        if !view.toggle_comment() {
            let label = view.render_language().label();
            self.set_status(format!("{label} has no comments"));
        }
    }
}
