use crate::file::FileId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Focus {
    Explorer,
    Editor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PendingAction {
    None,
    Quit,
    Delete(FileId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PromptMode {
    ImportFile,
}

#[derive(Debug, Clone)]
pub(crate) struct PromptState {
    pub(crate) title: String,
    pub(crate) value: String,
    pub(crate) cursor: usize,
    pub(crate) mode: PromptMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SettingsField {
    Theme,
    FontSize,
    LineNumbers,
    WordWrap,
    EmacsMode,
}

impl SettingsField {
    pub(crate) const ALL: [SettingsField; 5] = [
        SettingsField::Theme,
        SettingsField::FontSize,
        SettingsField::LineNumbers,
        SettingsField::WordWrap,
        SettingsField::EmacsMode,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            SettingsField::Theme => "Theme",
            SettingsField::FontSize => "Font size",
            SettingsField::LineNumbers => "Line numbers",
            SettingsField::WordWrap => "Word wrap",
            SettingsField::EmacsMode => "Emacs mode",
        }
    }
}
