use ratatui::style::Color;
use serde::Deserialize;

use crate::settings::ThemeName;

const LIGHT_JSON: &str = include_str!("../themes/light.json");
const DARK_JSON: &str = include_str!("../themes/dark.json");
const HIGH_CONTRAST_JSON: &str = include_str!("../themes/high-contrast.json");

#[derive(Debug, Clone)]
pub(crate) struct Theme {
    pub(crate) name: String,
    pub(crate) bg: Color,
    pub(crate) bg_alt: Color,
    pub(crate) fg: Color,
    pub(crate) fg_muted: Color,
    pub(crate) border: Color,
    pub(crate) accent: Color,
    pub(crate) accent_secondary: Color,
    pub(crate) selection: Color,
    pub(crate) error: Color,
    pub(crate) comment: Color,
    pub(crate) syntax_string: Color,
    pub(crate) syntax_number: Color,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ThemeFile {
    pub(crate) name: String,
    #[serde(rename = "type")]
    pub(crate) theme_type: String,
    pub(crate) colors: ThemeColors,
    #[serde(default)]
    pub(crate) syntax: Option<ThemeSyntaxColors>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ThemeColors {
    pub(crate) background: String,
    #[serde(rename = "backgroundAlt")]
    pub(crate) background_alt: String,
    pub(crate) foreground: String,
    #[serde(rename = "foregroundMuted")]
    pub(crate) foreground_muted: String,
    pub(crate) border: String,
    pub(crate) accent: String,
    #[serde(default, rename = "accentSecondary")]
    pub(crate) accent_secondary: Option<String>,
    pub(crate) selection: String,
    #[serde(default)]
    pub(crate) error: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct ThemeSyntaxColors {
    #[serde(default)]
    pub(crate) comment: Option<String>,
    #[serde(default)]
    pub(crate) string: Option<String>,
    #[serde(default)]
    pub(crate) number: Option<String>,
}

pub(crate) fn color_from_hex(input: &str, fallback: Color) -> Color {
    let s = input.trim();
    if let Some(stripped) = s.strip_prefix('#')
        && stripped.len() == 6
    {
        let r = u8::from_str_radix(&stripped[0..2], 16).ok();
        let g = u8::from_str_radix(&stripped[2..4], 16).ok();
        let b = u8::from_str_radix(&stripped[4..6], 16).ok();
        if let (Some(r), Some(g), Some(b)) = (r, g, b) {
            return Color::Rgb(r, g, b);
        }
    }
    fallback
}

fn optional_hex(value: Option<&String>, fallback: Color) -> Color {
    value.map_or(fallback, |c| color_from_hex(c, fallback))
}

pub(crate) fn theme_from_file(tf: ThemeFile) -> Theme {
    let syn = tf.syntax.as_ref();
    let fg_muted = color_from_hex(&tf.colors.foreground_muted, Color::Rgb(107, 114, 128));
    Theme {
        name: tf.name,
        bg: color_from_hex(&tf.colors.background, Color::Rgb(255, 255, 255)),
        bg_alt: color_from_hex(&tf.colors.background_alt, Color::Rgb(243, 244, 246)),
        fg: color_from_hex(&tf.colors.foreground, Color::Rgb(31, 41, 55)),
        fg_muted,
        border: color_from_hex(&tf.colors.border, Color::Rgb(209, 213, 219)),
        accent: color_from_hex(&tf.colors.accent, Color::Rgb(37, 99, 235)),
        accent_secondary: optional_hex(
            tf.colors.accent_secondary.as_ref(),
            Color::Rgb(5, 150, 105),
        ),
        selection: color_from_hex(&tf.colors.selection, Color::Rgb(191, 219, 254)),
        error: optional_hex(tf.colors.error.as_ref(), Color::Red),
        comment: optional_hex(syn.and_then(|s| s.comment.as_ref()), fg_muted),
        syntax_string: optional_hex(syn.and_then(|s| s.string.as_ref()), Color::Rgb(21, 128, 61)),
        syntax_number: optional_hex(syn.and_then(|s| s.number.as_ref()), Color::Rgb(180, 83, 9)),
    }
}

fn embedded_json(name: ThemeName) -> &'static str {
    match name {
        ThemeName::Light => LIGHT_JSON,
        ThemeName::Dark => DARK_JSON,
        ThemeName::HighContrast => HIGH_CONTRAST_JSON,
    }
}

/// Palette for a settings theme. A broken embedded file degrades to the
/// built-in fallback colors instead of failing.
pub(crate) fn theme_for(name: ThemeName) -> Theme {
    match serde_json::from_str::<ThemeFile>(embedded_json(name)) {
        Ok(tf) => theme_from_file(tf),
        Err(err) => {
            log::error!("embedded theme {} is invalid: {err}", name.label());
            theme_from_file(ThemeFile {
                name: name.label().to_string(),
                theme_type: "light".to_string(),
                colors: ThemeColors {
                    background: String::new(),
                    background_alt: String::new(),
                    foreground: String::new(),
                    foreground_muted: String::new(),
                    border: String::new(),
                    accent: String::new(),
                    accent_secondary: None,
                    selection: String::new(),
                    error: None,
                },
                syntax: None,
            })
        }
    }
}
