//! Contract between the session and the rich-text widget that edits text.
//!
//! The session never knows how a view is built or drawn. It constructs one
//! through a [`ViewFactory`], drives it through [`ViewHandle`], and learns
//! about user edits from the [`ViewEvent`]s the view pushes into the
//! [`ViewEventSink`] it was constructed with.

use std::sync::mpsc::Sender;

use crate::language::LanguageMode;

/// 1-indexed line/column of the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPosition {
    pub line: usize,
    pub column: usize,
}

impl Default for CursorPosition {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl CursorPosition {
    /// Position of char `offset` in `text`. Offsets past the end clamp to it.
    pub fn from_offset(text: &str, offset: usize) -> Self {
        let mut line = 1;
        let mut column = 1;
        for ch in text.chars().take(offset) {
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Self { line, column }
    }
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Char offset of 0-indexed `(row, col)`, clamped to the document.
pub fn offset_of(text: &str, row: usize, col: usize) -> usize {
    let mut offset = 0;
    for (idx, line) in text.split('\n').enumerate() {
        let len = char_len(line);
        if idx == row {
            return offset + col.min(len);
        }
        offset += len + 1;
    }
    char_len(text)
}

/// 0-indexed `(row, col)` of char `offset`.
pub fn row_col_of(text: &str, offset: usize) -> (usize, usize) {
    let pos = CursorPosition::from_offset(text, offset);
    (pos.line - 1, pos.column - 1)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    TextChanged(String),
    CursorMoved(CursorPosition),
}

/// Where a view reports edits. Each sink is stamped with the generation of
/// the view it belongs to so that events from a destroyed view can be told
/// apart from the live one.
#[derive(Debug, Clone)]
pub struct ViewEventSink {
    generation: u64,
    tx: Sender<(u64, ViewEvent)>,
}

impl ViewEventSink {
    pub(crate) fn new(generation: u64, tx: Sender<(u64, ViewEvent)>) -> Self {
        Self { generation, tx }
    }

    pub fn text_changed(&self, text: String) {
        self.emit(ViewEvent::TextChanged(text));
    }

    pub fn cursor_moved(&self, position: CursorPosition) {
        self.emit(ViewEvent::CursorMoved(position));
    }

    fn emit(&self, event: ViewEvent) {
        // The session owns the receiver; a send only fails during shutdown.
        let _ = self.tx.send((self.generation, event));
    }
}

pub struct ViewParams {
    pub text: String,
    /// Fixed for the lifetime of the constructed view.
    pub language: LanguageMode,
    pub events: ViewEventSink,
}

pub trait ViewHandle {
    fn destroy(self);
    fn text(&self) -> String;
    /// Cursor as a char offset into [`ViewHandle::text`].
    fn cursor(&self) -> usize;
    fn set_cursor(&mut self, offset: usize);
    fn has_focus(&self) -> bool;
    fn focus(&mut self);
    fn replace_all_text(&mut self, text: &str);
    fn language(&self) -> &LanguageMode;
}

pub trait ViewFactory {
    type Handle: ViewHandle;

    fn construct(&mut self, params: ViewParams) -> Self::Handle;
}
