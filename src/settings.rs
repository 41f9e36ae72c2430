use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeName {
    #[default]
    Light,
    Dark,
    HighContrast,
}

impl ThemeName {
    pub const ALL: [ThemeName; 3] = [ThemeName::Light, ThemeName::Dark, ThemeName::HighContrast];

    pub fn label(self) -> &'static str {
        match self {
            ThemeName::Light => "Light",
            ThemeName::Dark => "Dark",
            ThemeName::HighContrast => "High Contrast",
        }
    }

    pub fn next(self) -> ThemeName {
        match self {
            ThemeName::Light => ThemeName::Dark,
            ThemeName::Dark => ThemeName::HighContrast,
            ThemeName::HighContrast => ThemeName::Light,
        }
    }
}

/// Editor font size in pixels. Only 12, 14, 16 and 18 are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct FontSize(u16);

impl FontSize {
    pub const ALLOWED: [u16; 4] = [12, 14, 16, 18];

    pub fn new(px: u16) -> Option<FontSize> {
        Self::ALLOWED.contains(&px).then_some(FontSize(px))
    }

    pub fn px(self) -> u16 {
        self.0
    }

    pub fn next(self) -> FontSize {
        let idx = Self::ALLOWED.iter().position(|v| *v == self.0).unwrap_or(0);
        FontSize(Self::ALLOWED[(idx + 1) % Self::ALLOWED.len()])
    }
}

impl Default for FontSize {
    fn default() -> Self {
        FontSize(14)
    }
}

impl TryFrom<u16> for FontSize {
    type Error = String;

    fn try_from(px: u16) -> Result<Self, Self::Error> {
        FontSize::new(px).ok_or_else(|| format!("unsupported font size {px}"))
    }
}

impl From<FontSize> for u16 {
    fn from(size: FontSize) -> Self {
        size.0
    }
}

/// The singleton preferences entity held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSettings {
    #[serde(default)]
    pub theme: ThemeName,
    #[serde(default)]
    pub font_size: FontSize,
    #[serde(default = "default_true")]
    pub line_numbers: bool,
    #[serde(default)]
    pub word_wrap: bool,
    #[serde(default = "default_true")]
    pub emacs_mode: bool,
}

fn default_true() -> bool {
    true
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            theme: ThemeName::Light,
            font_size: FontSize::default(),
            line_numbers: true,
            word_wrap: false,
            emacs_mode: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_is_camel_case_with_kebab_theme() {
        let settings = EditorSettings {
            theme: ThemeName::HighContrast,
            font_size: FontSize::new(16).expect("allowed"),
            line_numbers: false,
            word_wrap: true,
            emacs_mode: true,
        };
        let raw = serde_json::to_value(settings).expect("serialize");
        assert_eq!(raw["theme"], "high-contrast");
        assert_eq!(raw["fontSize"], 16);
        assert_eq!(raw["lineNumbers"], false);
        assert_eq!(raw["wordWrap"], true);
        assert_eq!(raw["emacsMode"], true);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let settings: EditorSettings = serde_json::from_str("{}").expect("parse");
        assert_eq!(settings, EditorSettings::default());
    }

    #[test]
    fn rejects_font_size_outside_domain() {
        let err = serde_json::from_str::<EditorSettings>(r#"{"fontSize":13}"#);
        assert!(err.is_err());
        assert!(FontSize::new(18).is_some());
        assert!(FontSize::new(20).is_none());
    }

    #[test]
    fn rejects_unknown_theme() {
        assert!(serde_json::from_str::<EditorSettings>(r#"{"theme":"solarized"}"#).is_err());
    }

    #[test]
    fn font_size_cycles() {
        let size = FontSize::new(18).expect("allowed");
        assert_eq!(size.next().px(), 12);
        assert_eq!(FontSize::default().next().px(), 16);
    }
}
