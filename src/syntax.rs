use ratatui::style::{Modifier, Style};
use ratatui::text::Span;

use crate::language::LanguageMode;
use crate::theme::Theme;

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

#[rustfmt::skip]
fn keywords_for(lang: &LanguageMode) -> &'static [&'static str] {
    match lang {
        LanguageMode::JavaScript => &[
            "function", "const", "let", "var", "class", "if", "else", "for", "while", "return",
            "import", "from", "export", "default", "async", "await", "try", "catch", "switch",
            "case", "break", "continue", "new", "this", "null", "undefined", "true", "false",
        ],
        LanguageMode::Python => &[
            "def", "class", "if", "elif", "else", "for", "while", "try", "except", "return",
            "import", "from", "as", "with", "async", "await", "yield", "lambda", "pass", "None",
            "True", "False",
        ],
        LanguageMode::Sql => &[
            "select", "from", "where", "insert", "into", "values", "update", "set", "delete",
            "create", "table", "drop", "alter", "join", "left", "right", "inner", "on", "and",
            "or", "not", "null", "order", "by", "group", "limit", "as",
        ],
        LanguageMode::Css => &[
            "@media", "@supports", "@keyframes", "display", "position", "color", "background",
            "border", "margin", "padding", "width", "height", "font", "grid", "flex",
        ],
        _ => &[],
    }
}

fn comment_start_for(lang: &LanguageMode) -> Option<&'static str> {
    match lang {
        LanguageMode::JavaScript => Some("//"),
        LanguageMode::Python => Some("#"),
        LanguageMode::Sql => Some("--"),
        LanguageMode::Css => Some("/*"),
        _ => None,
    }
}

fn is_keyword(lang: &LanguageMode, token: &str) -> bool {
    let words = keywords_for(lang);
    if *lang == LanguageMode::Sql {
        words.iter().any(|w| w.eq_ignore_ascii_case(token))
    } else {
        words.contains(&token)
    }
}

/// Token-level coloring of one display line. `lang` should already be a
/// supported mode; anything else renders plain.
pub(crate) fn highlight_line(line: &str, lang: &LanguageMode, theme: &Theme) -> Vec<Span<'static>> {
    let base = Style::default().fg(theme.fg);
    let string_style = Style::default().fg(theme.syntax_string);
    let number_style = Style::default().fg(theme.syntax_number);
    let comment_style = Style::default().fg(theme.comment);
    let keyword_style = Style::default().fg(theme.accent).add_modifier(Modifier::BOLD);
    let tag_style = Style::default()
        .fg(theme.accent_secondary)
        .add_modifier(Modifier::BOLD);

    match lang {
        LanguageMode::Markdown => {
            let style = if line.starts_with('#') { tag_style } else { base };
            return vec![Span::styled(line.to_string(), style)];
        }
        LanguageMode::Other(_) => return vec![Span::styled(line.to_string(), base)],
        _ => {}
    }
    let markup = matches!(lang, LanguageMode::Html | LanguageMode::Xml);

    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut plain = String::new();
    let flush = |plain: &mut String, spans: &mut Vec<Span<'static>>| {
        if !plain.is_empty() {
            spans.push(Span::styled(std::mem::take(plain), base));
        }
    };
    let mut i = 0usize;
    while i < line.len() {
        let rest = &line[i..];
        let Some(ch) = rest.chars().next() else {
            break;
        };
        if let Some(comment) = comment_start_for(lang)
            && rest.starts_with(comment)
        {
            flush(&mut plain, &mut spans);
            spans.push(Span::styled(rest.to_string(), comment_style));
            break;
        }
        if markup && rest.starts_with("<!--") {
            flush(&mut plain, &mut spans);
            spans.push(Span::styled(rest.to_string(), comment_style));
            break;
        }
        if markup && ch == '<' {
            flush(&mut plain, &mut spans);
            let end = rest
                .char_indices()
                .skip(1)
                .find(|(_, c)| c.is_whitespace() || *c == '>')
                .map_or(rest.len(), |(idx, _)| idx);
            spans.push(Span::styled(rest[..end].to_string(), tag_style));
            i += end;
            continue;
        }
        if ch == '"' || ch == '\'' {
            flush(&mut plain, &mut spans);
            let mut end = ch.len_utf8();
            let mut escaped = false;
            for c in rest[end..].chars() {
                end += c.len_utf8();
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == ch {
                    break;
                }
            }
            spans.push(Span::styled(rest[..end].to_string(), string_style));
            i += end;
            continue;
        }
        if ch.is_ascii_digit() && !markup {
            flush(&mut plain, &mut spans);
            let end = rest
                .char_indices()
                .find(|(_, c)| !(c.is_ascii_digit() || *c == '.' || *c == '_'))
                .map_or(rest.len(), |(idx, _)| idx);
            spans.push(Span::styled(rest[..end].to_string(), number_style));
            i += end;
            continue;
        }
        if is_ident_char(ch) || ch == '@' {
            let end = rest
                .char_indices()
                .skip(1)
                .find(|(_, c)| !is_ident_char(*c) && *c != '-')
                .map_or(rest.len(), |(idx, _)| idx);
            let token = &rest[..end];
            if is_keyword(lang, token) {
                flush(&mut plain, &mut spans);
                spans.push(Span::styled(token.to_string(), keyword_style));
            } else {
                plain.push_str(token);
            }
            i += end;
            continue;
        }
        plain.push(ch);
        i += ch.len_utf8();
    }
    flush(&mut plain, &mut spans);
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ThemeName;
    use crate::theme::theme_for;

    fn text(spans: &[Span<'_>]) -> String {
        spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_highlight_preserves_text() {
        let theme = theme_for(ThemeName::Light);
        for (line, lang) in [
            ("const x = \"a\\\"b\"; // done", LanguageMode::JavaScript),
            ("<div class=\"x\">hi</div>", LanguageMode::Html),
            ("SELECT 1 FROM t -- note", LanguageMode::Sql),
            ("héllo wörld 42", LanguageMode::Python),
            ("", LanguageMode::Css),
        ] {
            assert_eq!(text(&highlight_line(line, &lang, &theme)), line);
        }
    }

    #[test]
    fn test_comment_and_keyword_styles() {
        let theme = theme_for(ThemeName::Dark);
        let spans = highlight_line("return 1 # why", &LanguageMode::Python, &theme);
        assert_eq!(spans[0].content.as_ref(), "return");
        assert_eq!(spans[0].style.fg, Some(theme.accent));
        let last = spans.last().expect("comment span");
        assert_eq!(last.content.as_ref(), "# why");
        assert_eq!(last.style.fg, Some(theme.comment));
    }

    #[test]
    fn test_sql_keywords_ignore_case() {
        let theme = theme_for(ThemeName::Light);
        let spans = highlight_line("select", &LanguageMode::Sql, &theme);
        assert_eq!(spans[0].style.fg, Some(theme.accent));
    }
}
