mod helpers;
mod overlays;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::keybinds::display_keys;
use crate::syntax::highlight_line;
use crate::theme::Theme;
use crate::types::Focus;
use crate::util::{display_width, slice_chars, to_u16_saturating, wrap_segments};
use helpers::clip_columns;
use overlays::*;

const FILES_PANE_WIDTH: u16 = 28;
const GUTTER_WIDTH: usize = 6;

pub(crate) fn draw(app: &mut App, frame: &mut Frame<'_>) {
    let theme = app.theme.clone();
    let size = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.bg).fg(theme.fg)),
        size,
    );
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(size);
    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(FILES_PANE_WIDTH), Constraint::Min(20)])
        .split(vertical[1]);
    app.editor_rect = main[1];

    let file_label = match app.session.active_file() {
        Some(file) => {
            let mut s = file.path.clone();
            if app.session.active_is_modified() {
                s.push_str(" ●");
            }
            s
        }
        None => "no file".to_string(),
    };
    let top = Paragraph::new(format!(
        "mxedit   store: {}   file: {}",
        app.store_label, file_label
    ))
    .style(Style::default().fg(theme.fg).bg(theme.bg_alt))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    );
    frame.render_widget(top, vertical[0]);

    render_explorer(app, frame, main[0], &theme);
    render_editor(app, frame, main[1], &theme);
    render_status(app, frame, vertical[2], &theme);

    if app.session.notices().current().is_some() {
        render_notice(app, frame);
    }
    if app.settings_panel.open {
        render_settings(app, frame);
    }
    if app.prompt.is_some() {
        render_prompt(app, frame);
    }
}

fn render_explorer(app: &App, frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
    let border = if app.focus == Focus::Explorer {
        theme.accent
    } else {
        theme.border
    };
    let active = app.session.active_id();
    let items: Vec<ListItem> = app
        .files
        .iter()
        .map(|file| {
            let marker = if app.session.is_modified(file.id) {
                "● "
            } else {
                "  "
            };
            let mut style = Style::default().fg(theme.fg);
            if Some(file.id) == active {
                style = style.fg(theme.accent).add_modifier(Modifier::BOLD);
            }
            ListItem::new(Line::from(Span::styled(
                format!("{marker}{}", file.name),
                style,
            )))
        })
        .collect();
    let mut state = ListState::default();
    if !app.files.is_empty() {
        state.select(Some(app.selected));
    }
    let list = List::new(items)
        .highlight_style(
            Style::default()
                .fg(theme.fg)
                .bg(theme.selection)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .title("Files")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .style(Style::default().bg(theme.bg_alt).fg(theme.fg)),
        );
    frame.render_stateful_widget(list, area, &mut state);
}

fn tab_title(app: &App, theme: &Theme) -> Line<'static> {
    if app.session.tabs().is_empty() {
        return Line::from("No open files");
    }
    let active = app.session.active_id();
    let mut spans = Vec::new();
    for tab in app.session.tabs() {
        let marker = if app.session.is_modified(tab.id()) {
            "● "
        } else {
            ""
        };
        let label = format!(" {marker}{} ", tab.file.name);
        let style = if Some(tab.id()) == active {
            Style::default().fg(theme.fg).bg(theme.bg)
        } else {
            Style::default().fg(theme.fg_muted)
        };
        if !spans.is_empty() {
            spans.push(Span::styled("│", Style::default().fg(theme.border)));
        }
        spans.push(Span::styled(label, style));
    }
    Line::from(spans)
}

fn render_editor(app: &mut App, frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
    let border = if app.focus == Focus::Editor {
        theme.accent
    } else {
        theme.border
    };
    let block = Block::default()
        .title(tab_title(app, theme))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(theme.bg_alt).fg(theme.fg));
    frame.render_widget(block, area);
    let inner = Rect::new(
        area.x.saturating_add(1),
        area.y.saturating_add(1),
        area.width.saturating_sub(2),
        area.height.saturating_sub(2),
    );
    frame.render_widget(Clear, inner);

    let settings = app.settings;
    let gutter = if settings.line_numbers { GUTTER_WIDTH } else { 0 };
    let inner_w = inner.width as usize;
    let content_w = inner_w.saturating_sub(gutter).max(1);
    let height = inner.height as usize;
    let show_cursor =
        app.focus == Focus::Editor && app.prompt.is_none() && !app.settings_panel.open;

    let Some(view) = app.session.view_mut() else {
        let hint = Paragraph::new("No file open. Pick one from Files, or C-x C-n for a new file.")
            .style(Style::default().fg(theme.fg_muted).bg(theme.bg));
        frame.render_widget(hint, inner);
        return;
    };
    let scroll = view.scroll_to_cursor(height);
    let (cursor_row, cursor_col) = view.cursor_row_col();
    let lang = view.render_language();
    let lines = view.lines();

    let cursor_x_full = lines
        .get(cursor_row)
        .map_or(0, |l| display_width(l, cursor_col));
    let scroll_col = if settings.word_wrap || cursor_x_full < content_w {
        0
    } else {
        cursor_x_full + 1 - content_w
    };

    // (row, segment start, segment end) in chars
    let mut rows: Vec<(usize, usize, usize)> = Vec::new();
    for (row, line) in lines.iter().enumerate().skip(scroll) {
        if settings.word_wrap {
            for (s, e) in wrap_segments(line, content_w) {
                rows.push((row, s, e));
            }
        } else {
            rows.push((row, 0, line.chars().count()));
        }
        if rows.len() >= height && row >= cursor_row {
            break;
        }
    }
    let cursor_visual = rows.iter().position(|&(row, s, e)| {
        let len = lines[row].chars().count();
        row == cursor_row && cursor_col >= s && (cursor_col < e || (cursor_col == e && e == len))
    });
    let skip = match cursor_visual {
        Some(ci) if ci >= height => ci + 1 - height,
        _ => 0,
    };

    let mut out: Vec<Line> = Vec::with_capacity(height);
    for &(row, s, e) in rows.iter().skip(skip).take(height) {
        let mut spans = Vec::new();
        if gutter > 0 {
            let num = if s == 0 {
                format!("{:>5} ", row + 1)
            } else {
                " ".repeat(GUTTER_WIDTH)
            };
            let style = if row == cursor_row {
                Style::default().fg(theme.accent)
            } else {
                Style::default().fg(theme.fg_muted)
            };
            spans.push(Span::styled(num, style));
        }
        let segment = slice_chars(&lines[row], s, e);
        let visible = clip_columns(&segment, scroll_col, content_w);
        spans.extend(highlight_line(&visible, &lang, theme));
        let used: usize = spans.iter().map(|sp| sp.content.width()).sum();
        if used < inner_w {
            spans.push(Span::styled(
                " ".repeat(inner_w - used),
                Style::default().bg(theme.bg),
            ));
        }
        let line = Line::from(spans);
        let on_cursor = Some((row, s)) == cursor_visual.map(|ci| (rows[ci].0, rows[ci].1));
        out.push(if on_cursor {
            line.patch_style(Style::default().bg(theme.bg_alt))
        } else {
            line
        });
    }
    let paragraph = Paragraph::new(out).style(Style::default().bg(theme.bg).fg(theme.fg));
    frame.render_widget(paragraph, inner);

    if show_cursor && let Some(ci) = cursor_visual {
        let (row, s, _) = rows[ci];
        let x = display_width(&slice_chars(&lines[row], s, cursor_col), usize::MAX)
            .saturating_sub(scroll_col)
            .min(content_w.saturating_sub(1));
        let y = ci.saturating_sub(skip);
        frame.set_cursor_position((
            inner.x.saturating_add(to_u16_saturating(gutter + x)),
            inner.y.saturating_add(to_u16_saturating(y)),
        ));
    }
}

/// Right-hand status segments for the active file.
pub(crate) fn status_segments(app: &App) -> Vec<String> {
    let mut parts = Vec::new();
    if let Some(file) = app.session.active_file() {
        parts.push(file.name.clone());
        if app.session.active_is_modified() {
            parts.push("● Modified".to_string());
        }
    }
    if app.settings.emacs_mode {
        parts.push("Emacs".to_string());
    }
    if app.session.active_id().is_some() {
        let cursor = app.session.cursor();
        parts.push(format!("Ln {}, Col {}", cursor.line, cursor.column));
    }
    parts.push(app.session.selected_language().label());
    parts.push("UTF-8".to_string());
    let crlf = app.session.view().is_some_and(|v| v.line_ending() == "\r\n");
    parts.push(if crlf { "CRLF" } else { "LF" }.to_string());
    parts
}

fn render_status(app: &App, frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
    let right = status_segments(app).join("   ");
    let left = if app.pending_keys.is_empty() {
        app.status.clone()
    } else {
        format!("{}-", display_keys(&app.pending_keys))
    };
    let inner_w = area.width.saturating_sub(2) as usize;
    let right_w = right.width();
    let left: String = clip_columns(&left, 0, inner_w.saturating_sub(right_w + 1));
    let pad = inner_w.saturating_sub(left.width() + right_w);
    let line = Line::from(vec![
        Span::styled(left, Style::default().fg(theme.fg)),
        Span::raw(" ".repeat(pad)),
        Span::styled(right, Style::default().fg(theme.fg_muted)),
    ]);
    let status = Paragraph::new(line)
        .style(Style::default().fg(theme.fg).bg(theme.bg_alt))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border)),
        );
    frame.render_widget(status, area);
}
