use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, List, ListItem, Paragraph, Wrap};

use super::helpers::{centered_rect, list_item_style, themed_block};
use crate::app::App;
use crate::keybinds::KeyAction;
use crate::notice::NoticeLevel;
use crate::settings::EditorSettings;
use crate::types::SettingsField;
use crate::util::{display_width, to_u16_saturating};

pub(crate) fn render_notice(app: &App, frame: &mut Frame<'_>) {
    let Some(notice) = app.session.notices().current() else {
        return;
    };
    let theme = &app.theme;
    let area = frame.area();
    let width = area.width.saturating_sub(4).min(60);
    let inner_w = usize::from(width.saturating_sub(2)).max(1);
    let rows = display_width(&notice.message, usize::MAX).div_ceil(inner_w).max(1);
    let height = to_u16_saturating(rows + 2).min(area.height);
    let rect = Rect::new(
        area.right().saturating_sub(width + 2),
        area.y.saturating_add(3),
        width,
        height,
    );
    let (title, color) = match notice.level {
        NoticeLevel::Error => ("Error", theme.error),
        NoticeLevel::Info => ("Notice", theme.accent_secondary),
    };
    let more = app.session.notices().len().saturating_sub(1);
    let title = if more > 0 {
        format!(
            " {title} (+{more})  {} dismiss ",
            app.keybinds.display_for(KeyAction::DismissNotice)
        )
    } else {
        format!(
            " {title}  {} dismiss ",
            app.keybinds.display_for(KeyAction::DismissNotice)
        )
    };
    frame.render_widget(Clear, rect);
    let body = Paragraph::new(notice.message.clone())
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(theme.fg).bg(theme.bg_alt))
        .block(
            themed_block(theme)
                .title(title)
                .border_style(Style::default().fg(color)),
        );
    frame.render_widget(body, rect);
}

pub(crate) fn settings_value(settings: &EditorSettings, field: SettingsField) -> String {
    let on_off = |b: bool| if b { "on" } else { "off" }.to_string();
    match field {
        SettingsField::Theme => settings.theme.label().to_string(),
        SettingsField::FontSize => format!("{}px", settings.font_size.px()),
        SettingsField::LineNumbers => on_off(settings.line_numbers),
        SettingsField::WordWrap => on_off(settings.word_wrap),
        SettingsField::EmacsMode => on_off(settings.emacs_mode),
    }
}

pub(crate) fn render_settings(app: &App, frame: &mut Frame<'_>) {
    let theme = &app.theme;
    let panel = &app.settings_panel;
    let area = centered_rect(50, 50, frame.area());
    frame.render_widget(Clear, area);
    let mut items: Vec<ListItem> = SettingsField::ALL
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let label = format!(
                "{:<14}{}",
                field.label(),
                settings_value(&panel.draft, *field)
            );
            ListItem::new(Line::from(Span::styled(
                label,
                list_item_style(idx == panel.index, theme),
            )))
        })
        .collect();
    items.push(ListItem::new(Line::from("")));
    items.push(ListItem::new(Line::from(Span::styled(
        "←/→ change   Enter save   Esc cancel",
        Style::default()
            .fg(theme.fg_muted)
            .add_modifier(Modifier::ITALIC),
    ))));
    let list = List::new(items).block(themed_block(theme).title("Settings"));
    frame.render_widget(list, area);
}

pub(crate) fn render_prompt(app: &App, frame: &mut Frame<'_>) {
    let Some(prompt) = app.prompt.as_ref() else {
        return;
    };
    let theme = &app.theme;
    let area = centered_rect(60, 20, frame.area());
    let area = Rect::new(area.x, area.y, area.width, area.height.max(3));
    frame.render_widget(Clear, area);
    let input = Paragraph::new(prompt.value.clone()).block(
        themed_block(theme)
            .title(prompt.title.as_str())
            .style(Style::default().bg(theme.bg_alt).fg(theme.fg)),
    );
    frame.render_widget(input, area);
    let cursor_x = area.x + 1 + to_u16_saturating(display_width(&prompt.value, prompt.cursor));
    let cursor_y = area.y + 1;
    if cursor_x < area.right() {
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}
