use unicode_width::UnicodeWidthChar;

/// `"\r\n"` when every newline in `text` is a CRLF, `"\n"` otherwise. Mixed
/// files keep their stray `\r`s inside the lines.
pub(crate) fn detect_line_ending(text: &str) -> &'static str {
    let crlf = text.matches("\r\n").count();
    if crlf > 0 && crlf == text.matches('\n').count() {
        "\r\n"
    } else {
        "\n"
    }
}

/// Splits `text` on `ending`. A trailing newline becomes an empty final line
/// so the cursor can sit after it, and joining with `ending` gives back
/// `text` exactly.
pub(crate) fn text_to_lines(text: &str, ending: &str) -> Vec<String> {
    text.split(ending).map(ToString::to_string).collect()
}

pub(crate) fn to_u16_saturating(v: usize) -> u16 {
    u16::try_from(v).unwrap_or(u16::MAX)
}

pub(crate) fn char_width(ch: char) -> usize {
    if ch == '\t' {
        4
    } else {
        UnicodeWidthChar::width(ch).unwrap_or(0)
    }
}

/// Display width of the first `chars` characters of `line`.
pub(crate) fn display_width(line: &str, chars: usize) -> usize {
    line.chars().take(chars).map(char_width).sum()
}

/// Splits `line` into char ranges no wider than `width` columns. An empty
/// line still yields one (empty) segment.
pub(crate) fn wrap_segments(line: &str, width: usize) -> Vec<(usize, usize)> {
    let width = width.max(1);
    let mut segments = Vec::new();
    let mut start = 0;
    let mut used = 0;
    for (idx, ch) in line.chars().enumerate() {
        let w = char_width(ch);
        if used + w > width && idx > start {
            segments.push((start, idx));
            start = idx;
            used = 0;
        }
        used += w;
    }
    segments.push((start, line.chars().count()));
    segments
}

pub(crate) fn slice_chars(s: &str, start: usize, end: usize) -> String {
    s.chars().skip(start).take(end.saturating_sub(start)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_to_lines_keeps_trailing_newline() {
        assert_eq!(text_to_lines("", "\n"), vec![String::new()]);
        assert_eq!(text_to_lines("a\nb", "\n"), vec!["a", "b"]);
        assert_eq!(text_to_lines("a\n", "\n"), vec!["a", ""]);
    }

    #[test]
    fn test_line_endings_round_trip() {
        for text in ["a\r\nb", "a\r\n", "a\nb\r\nc", "\r\n\r\n", "plain", "x\r"] {
            let ending = detect_line_ending(text);
            assert_eq!(text_to_lines(text, ending).join(ending), text, "{text:?}");
        }
        assert_eq!(detect_line_ending("a\r\nb"), "\r\n");
        assert_eq!(text_to_lines("a\r\nb", "\r\n"), vec!["a", "b"]);
        assert_eq!(detect_line_ending("a\nb\r\nc"), "\n");
        assert_eq!(detect_line_ending(""), "\n");
    }

    #[test]
    fn test_wrap_segments() {
        assert_eq!(wrap_segments("", 4), vec![(0, 0)]);
        assert_eq!(wrap_segments("abcdefghij", 4), vec![(0, 4), (4, 8), (8, 10)]);
        assert_eq!(wrap_segments("abcd", 4), vec![(0, 4)]);
    }

    #[test]
    fn test_wrap_segments_wide_chars() {
        // Each CJK char is two columns wide.
        assert_eq!(wrap_segments("日本語", 4), vec![(0, 2), (2, 3)]);
        assert_eq!(wrap_segments("日", 1), vec![(0, 1)]);
    }

    #[test]
    fn test_display_width_counts_tabs() {
        assert_eq!(display_width("\tab", 2), 5);
        assert_eq!(display_width("héllo", 10), 5);
    }

    #[test]
    fn test_to_u16_saturating() {
        assert_eq!(to_u16_saturating(7), 7);
        assert_eq!(to_u16_saturating(usize::MAX), u16::MAX);
    }
}
