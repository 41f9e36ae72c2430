//! [`ViewHandle`] over `ratatui_textarea::TextArea`.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui_textarea::{CursorMove, Input, TextArea};

use crate::language::LanguageMode;
use crate::util::{detect_line_ending, text_to_lines, to_u16_saturating};
use crate::view::{
    CursorPosition, ViewEventSink, ViewFactory, ViewHandle, ViewParams, offset_of, row_col_of,
};

pub struct TextAreaView {
    editor: TextArea<'static>,
    language: LanguageMode,
    focused: bool,
    events: ViewEventSink,
    /// Joins the widget's lines back into [`ViewHandle::text`].
    line_ending: &'static str,
    reported_cursor: (usize, usize),
    scroll_row: usize,
}

impl TextAreaView {
    fn new(params: ViewParams) -> Self {
        let line_ending = detect_line_ending(&params.text);
        let editor = TextArea::from(text_to_lines(&params.text, line_ending));
        let reported_cursor = editor.cursor();
        Self {
            editor,
            language: params.language,
            focused: false,
            events: params.events,
            line_ending,
            reported_cursor,
            scroll_row: 0,
        }
    }

    /// Feeds one key press to the widget. With `emacs_mode` the widget's
    /// Emacs-style shortcuts (C-f, C-b, C-a, C-e, C-k, C-y, M-f, ...) are live;
    /// without it only plain editing and arrow motion are.
    pub fn handle_key(&mut self, key: KeyEvent, emacs_mode: bool) -> bool {
        let modified = if emacs_mode {
            self.editor.input(Input::from(key))
        } else {
            self.plain_input(key)
        };
        self.after_input(modified);
        modified
    }

    fn plain_input(&mut self, key: KeyEvent) -> bool {
        let motion = match (key.code, key.modifiers) {
            (KeyCode::Left, KeyModifiers::NONE) => Some(CursorMove::Back),
            (KeyCode::Right, KeyModifiers::NONE) => Some(CursorMove::Forward),
            (KeyCode::Up, KeyModifiers::NONE) => Some(CursorMove::Up),
            (KeyCode::Down, KeyModifiers::NONE) => Some(CursorMove::Down),
            (KeyCode::Home, _) => Some(CursorMove::Head),
            (KeyCode::End, _) => Some(CursorMove::End),
            (KeyCode::Left, KeyModifiers::CONTROL) => Some(CursorMove::WordBack),
            (KeyCode::Right, KeyModifiers::CONTROL) => Some(CursorMove::WordForward),
            _ => None,
        };
        match motion {
            Some(m) => {
                self.editor.move_cursor(m);
                false
            }
            None => self.editor.input_without_shortcuts(Input::from(key)),
        }
    }

    /// Inserts pasted text at the cursor.
    pub fn insert_str(&mut self, text: &str) -> bool {
        let modified = self.editor.insert_str(text);
        self.after_input(modified);
        modified
    }

    /// Pastes the widget's kill buffer, as `C-y` does.
    pub fn yank(&mut self) -> bool {
        let modified = self.editor.paste();
        self.after_input(modified);
        modified
    }

    pub fn yank_text(&self) -> String {
        self.editor.yank_text()
    }

    pub fn set_yank_text(&mut self, text: impl Into<String>) {
        self.editor.set_yank_text(text);
    }

    /// Adds or strips the language's comment on the cursor line. Block
    /// comment languages wrap the line in their delimiters.
    pub fn toggle_comment(&mut self) -> bool {
        let Some((open, close)) = self.render_language().comment_delimiters() else {
            return false;
        };
        let (row, col) = self.editor.cursor();
        let Some(line) = self.editor.lines().get(row).cloned() else {
            return false;
        };
        let indent = line.len() - line.trim_start().len();
        let (lead, body) = line.split_at(indent);
        let (new_line, new_col) = match uncomment(body, open, close) {
            Some(inner) => {
                let removed = body.chars().count() - inner.chars().count();
                let new_line = format!("{lead}{inner}");
                let len = new_line.chars().count();
                (new_line, col.saturating_sub(removed).min(len))
            }
            None if close.is_empty() => (
                format!("{lead}{open} {body}"),
                col + open.chars().count() + 1,
            ),
            None => (
                format!("{lead}{open} {body} {close}"),
                col + open.chars().count() + 1,
            ),
        };
        let mut lines = self.editor.lines().to_vec();
        lines[row] = new_line;
        self.rebuild(lines, (row, new_col));
        self.after_input(true);
        true
    }

    fn after_input(&mut self, modified: bool) {
        if modified {
            self.events.text_changed(self.text());
        }
        let cursor = self.editor.cursor();
        if cursor != self.reported_cursor {
            self.reported_cursor = cursor;
            self.events.cursor_moved(CursorPosition {
                line: cursor.0 + 1,
                column: cursor.1 + 1,
            });
        }
    }

    fn rebuild(&mut self, lines: Vec<String>, cursor: (usize, usize)) {
        let yank = self.editor.yank_text();
        let mut ta = TextArea::from(lines);
        ta.set_yank_text(yank);
        self.editor = ta;
        self.move_to(cursor.0, cursor.1);
    }

    /// Puts the cursor at 0-indexed `(row, col)`, clamped to the document.
    /// `CursorMove::Jump` takes `u16`s, so rows and columns past its range
    /// are reached by stepping from where the jump lands.
    fn move_to(&mut self, row: usize, col: usize) {
        let row = row.min(self.editor.lines().len().saturating_sub(1));
        let col = col.min(
            self.editor
                .lines()
                .get(row)
                .map_or(0, |line| line.chars().count()),
        );
        self.editor.move_cursor(CursorMove::Jump(
            to_u16_saturating(row),
            to_u16_saturating(col),
        ));
        let mut current = self.editor.cursor().0;
        while current < row {
            self.editor.move_cursor(CursorMove::Down);
            let next = self.editor.cursor().0;
            if next == current {
                break;
            }
            current = next;
        }
        let landed = self.editor.cursor().1;
        if landed > col {
            self.editor.move_cursor(CursorMove::Head);
        }
        for _ in self.editor.cursor().1..col {
            self.editor.move_cursor(CursorMove::Forward);
        }
    }

    /// `"\r\n"` for CRLF documents, `"\n"` otherwise.
    pub fn line_ending(&self) -> &'static str {
        self.line_ending
    }

    pub fn lines(&self) -> &[String] {
        self.editor.lines()
    }

    /// 0-indexed `(row, col)` of the cursor.
    pub fn cursor_row_col(&self) -> (usize, usize) {
        self.editor.cursor()
    }

    /// The language actually used for rendering. Modes without registered
    /// support render as the default mode.
    pub fn render_language(&self) -> LanguageMode {
        self.language.supported_or_default()
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// First visible row for a viewport of `height` rows, scrolled just
    /// enough to keep the cursor on screen.
    pub fn scroll_to_cursor(&mut self, height: usize) -> usize {
        let row = self.editor.cursor().0;
        if height == 0 {
            return self.scroll_row;
        }
        if row < self.scroll_row {
            self.scroll_row = row;
        } else if row >= self.scroll_row + height {
            self.scroll_row = row + 1 - height;
        }
        self.scroll_row
    }
}

/// `body` without its comment delimiters and one space inside each, or
/// `None` if it is not commented.
fn uncomment<'a>(body: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let rest = body.strip_prefix(open)?;
    let rest = if close.is_empty() {
        rest
    } else {
        let rest = rest.trim_end().strip_suffix(close)?;
        rest.strip_suffix(' ').unwrap_or(rest)
    };
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

impl ViewHandle for TextAreaView {
    fn destroy(self) {
        log::debug!("destroying {} view", self.language);
    }

    fn text(&self) -> String {
        self.editor.lines().join(self.line_ending)
    }

    fn cursor(&self) -> usize {
        let (row, col) = self.editor.cursor();
        offset_of(&self.text(), row, col)
    }

    fn set_cursor(&mut self, offset: usize) {
        let (row, col) = row_col_of(&self.text(), offset);
        self.move_to(row, col);
        self.reported_cursor = self.editor.cursor();
    }

    fn has_focus(&self) -> bool {
        self.focused
    }

    fn focus(&mut self) {
        self.focused = true;
    }

    fn replace_all_text(&mut self, text: &str) {
        let cursor = self.editor.cursor();
        self.line_ending = detect_line_ending(text);
        self.rebuild(text_to_lines(text, self.line_ending), cursor);
        self.reported_cursor = self.editor.cursor();
    }

    fn language(&self) -> &LanguageMode {
        &self.language
    }
}

#[derive(Debug, Default)]
pub struct TextAreaFactory;

impl ViewFactory for TextAreaFactory {
    type Handle = TextAreaView;

    fn construct(&mut self, params: ViewParams) -> TextAreaView {
        log::debug!("constructing {} view", params.language);
        TextAreaView::new(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ViewEvent;
    use std::sync::mpsc::{self, Receiver};

    fn view(text: &str, language: LanguageMode) -> (TextAreaView, Receiver<(u64, ViewEvent)>) {
        let (tx, rx) = mpsc::channel();
        let view = TextAreaFactory.construct(ViewParams {
            text: text.to_string(),
            language,
            events: ViewEventSink::new(1, tx),
        });
        (view, rx)
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn drain(rx: &Receiver<(u64, ViewEvent)>) -> Vec<ViewEvent> {
        rx.try_iter().map(|(_, e)| e).collect()
    }

    #[test]
    fn text_round_trips_trailing_newline() {
        let (v, _) = view("a\nb\n", LanguageMode::JavaScript);
        assert_eq!(v.text(), "a\nb\n");
        let (empty, _) = view("", LanguageMode::JavaScript);
        assert_eq!(empty.text(), "");
    }

    #[test]
    fn crlf_documents_keep_their_line_endings() {
        let (mut v, rx) = view("a\r\nb", LanguageMode::JavaScript);
        assert_eq!(v.text(), "a\r\nb");
        assert_eq!(v.line_ending(), "\r\n");
        assert_eq!(v.lines(), ["a", "b"]);
        v.set_cursor(3);
        assert_eq!(v.cursor_row_col(), (1, 0));
        assert_eq!(v.cursor(), 3);

        v.set_cursor(1);
        v.handle_key(key(KeyCode::Enter, KeyModifiers::NONE), false);
        assert_eq!(v.text(), "a\r\n\r\nb");
        v.handle_key(key(KeyCode::Backspace, KeyModifiers::NONE), false);
        let events = drain(&rx);
        assert_eq!(
            events.iter().rev().find(|e| matches!(e, ViewEvent::TextChanged(_))),
            Some(&ViewEvent::TextChanged("a\r\nb".into()))
        );

        v.replace_all_text("x\ny");
        assert_eq!(v.line_ending(), "\n");
        assert_eq!(v.text(), "x\ny");
    }

    #[test]
    fn crlf_edit_round_trip_is_not_modified() {
        use crate::file::{FileEntity, FileId};
        use crate::session::EditorSession;

        let mut session = EditorSession::new(TextAreaFactory);
        session.open_or_switch(FileEntity {
            id: FileId(1),
            name: "a.js".into(),
            content: "a\r\nb".into(),
            language: LanguageMode::JavaScript,
            path: "/a.js".into(),
        });
        let view = session.view_mut().expect("view");
        view.handle_key(key(KeyCode::Char('z'), KeyModifiers::NONE), false);
        view.handle_key(key(KeyCode::Backspace, KeyModifiers::NONE), false);
        session.pump_view_events();
        assert_eq!(session.active_file().map(|f| f.content.as_str()), Some("a\r\nb"));
        assert!(!session.is_modified(FileId(1)));
    }

    #[test]
    fn cursor_reaches_rows_past_jump_range() {
        let text = vec!["ab"; 70_000].join("\n");
        let (mut v, _) = view(&text, LanguageMode::JavaScript);
        let offset = offset_of(&text, 69_999, 1);
        v.set_cursor(offset);
        assert_eq!(v.cursor_row_col(), (69_999, 1));
        assert_eq!(v.cursor(), offset);
    }

    #[test]
    fn cursor_reaches_columns_past_jump_range() {
        let text = format!("x\n{}", "c".repeat(65_600));
        let (mut v, _) = view(&text, LanguageMode::JavaScript);
        v.set_cursor(2 + 65_580);
        assert_eq!(v.cursor_row_col(), (1, 65_580));
        assert_eq!(v.cursor(), 2 + 65_580);
    }

    #[test]
    fn typing_reports_text_and_cursor() {
        let (mut v, rx) = view("", LanguageMode::JavaScript);
        assert!(v.handle_key(key(KeyCode::Char('h'), KeyModifiers::NONE), true));
        assert!(v.handle_key(key(KeyCode::Char('i'), KeyModifiers::NONE), false));
        let events = drain(&rx);
        assert!(events.contains(&ViewEvent::TextChanged("hi".into())));
        assert_eq!(
            events.last(),
            Some(&ViewEvent::CursorMoved(CursorPosition { line: 1, column: 3 }))
        );
    }

    #[test]
    fn emacs_shortcuts_only_in_emacs_mode() {
        let (mut v, _) = view("hello", LanguageMode::JavaScript);
        v.set_cursor(5);
        v.handle_key(key(KeyCode::Char('a'), KeyModifiers::CONTROL), false);
        assert_eq!(v.cursor(), 5);
        v.handle_key(key(KeyCode::Char('a'), KeyModifiers::CONTROL), true);
        assert_eq!(v.cursor(), 0);
        v.handle_key(key(KeyCode::Char('f'), KeyModifiers::CONTROL), true);
        assert_eq!(v.cursor(), 1);
    }

    #[test]
    fn arrows_move_without_emacs_mode() {
        let (mut v, rx) = view("ab\ncd", LanguageMode::JavaScript);
        assert!(!v.handle_key(key(KeyCode::Down, KeyModifiers::NONE), false));
        assert!(!v.handle_key(key(KeyCode::Right, KeyModifiers::NONE), false));
        assert_eq!(v.cursor_row_col(), (1, 1));
        assert_eq!(v.cursor(), 4);
        assert!(!drain(&rx).iter().any(|e| matches!(e, ViewEvent::TextChanged(_))));
    }

    #[test]
    fn programmatic_changes_are_silent() {
        let (mut v, rx) = view("one\ntwo", LanguageMode::JavaScript);
        v.set_cursor(6);
        v.replace_all_text("x");
        assert_eq!(v.text(), "x");
        assert_eq!(v.cursor(), 1);
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn cursor_offsets_count_chars() {
        let (mut v, _) = view("héllo\nwörld", LanguageMode::JavaScript);
        v.set_cursor(8);
        assert_eq!(v.cursor_row_col(), (1, 2));
        assert_eq!(v.cursor(), 8);
        v.set_cursor(999);
        assert_eq!(v.cursor(), 11);
    }

    #[test]
    fn unsupported_language_renders_as_default() {
        let (v, _) = view("x", LanguageMode::from("cobol"));
        assert_eq!(v.language(), &LanguageMode::from("cobol"));
        assert_eq!(v.render_language(), LanguageMode::DEFAULT);
    }

    #[test]
    fn toggle_comment_uses_language_prefix() {
        let (mut v, rx) = view("  x = 1", LanguageMode::Python);
        assert!(v.toggle_comment());
        assert_eq!(v.text(), "  # x = 1");
        assert!(v.toggle_comment());
        assert_eq!(v.text(), "  x = 1");
        assert!(drain(&rx).contains(&ViewEvent::TextChanged("  # x = 1".into())));

        let (mut md, _) = view("# title", LanguageMode::Markdown);
        assert!(!md.toggle_comment());
    }

    #[test]
    fn toggle_comment_wraps_block_comment_languages() {
        let (mut css, _) = view("  a { color: red; }", LanguageMode::Css);
        assert!(css.toggle_comment());
        assert_eq!(css.text(), "  /* a { color: red; } */");
        assert!(css.toggle_comment());
        assert_eq!(css.text(), "  a { color: red; }");

        let (mut html, _) = view("<p>hi</p>", LanguageMode::Html);
        assert!(html.toggle_comment());
        assert_eq!(html.text(), "<!-- <p>hi</p> -->");

        let (mut tight, _) = view("/*x*/", LanguageMode::Css);
        assert!(tight.toggle_comment());
        assert_eq!(tight.text(), "x");

        let (mut json, _) = view("{}", LanguageMode::Json);
        assert!(!json.toggle_comment());
    }

    #[test]
    fn yank_buffer_survives_rebuild() {
        let (mut v, _) = view("abc", LanguageMode::JavaScript);
        v.set_yank_text("zz");
        v.replace_all_text("abc\n");
        assert_eq!(v.yank_text(), "zz");
        v.set_cursor(0);
        assert!(v.yank());
        assert!(v.text().starts_with("zz"));
    }

    #[test]
    fn scroll_follows_cursor() {
        let text = (0..50).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let (mut v, _) = view(&text, LanguageMode::JavaScript);
        assert_eq!(v.scroll_to_cursor(10), 0);
        v.set_cursor(offset_of(&text, 30, 0));
        assert_eq!(v.scroll_to_cursor(10), 21);
        v.set_cursor(0);
        assert_eq!(v.scroll_to_cursor(10), 0);
    }
}
