use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

use crate::config::app_dir;

const KEYBINDS_FILE: &str = "keybinds.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum KeyAction {
    Save,
    CloseTab,
    FindFile,
    NextTab,
    NewFile,
    ImportFile,
    CycleLanguage,
    Settings,
    ToggleComment,
    DismissNotice,
    Quit,
    Cancel,
}

impl KeyAction {
    pub(crate) fn label(self) -> &'static str {
        match self {
            KeyAction::Save => "Save file",
            KeyAction::CloseTab => "Close file",
            KeyAction::FindFile => "Open file",
            KeyAction::NextTab => "Next tab",
            KeyAction::NewFile => "New file",
            KeyAction::ImportFile => "Import local file",
            KeyAction::CycleLanguage => "Change language",
            KeyAction::Settings => "Settings",
            KeyAction::ToggleComment => "Toggle comment",
            KeyAction::DismissNotice => "Dismiss notification",
            KeyAction::Quit => "Quit",
            KeyAction::Cancel => "Cancel",
        }
    }

    pub(crate) fn all() -> &'static [KeyAction] {
        &[
            KeyAction::Save,
            KeyAction::CloseTab,
            KeyAction::FindFile,
            KeyAction::NextTab,
            KeyAction::NewFile,
            KeyAction::ImportFile,
            KeyAction::CycleLanguage,
            KeyAction::Settings,
            KeyAction::ToggleComment,
            KeyAction::DismissNotice,
            KeyAction::Quit,
            KeyAction::Cancel,
        ]
    }
}

/// One chord, e.g. `ctrl+x` or `C-x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct KeyBind {
    pub(crate) modifiers: KeyModifiers,
    pub(crate) code: KeyCode,
}

impl KeyBind {
    pub(crate) fn normalize_char_with_modifiers(code: KeyCode, modifiers: KeyModifiers) -> KeyCode {
        match code {
            KeyCode::Char(c) if modifiers.contains(KeyModifiers::CONTROL) => {
                let u = c as u32;
                if (1..=26).contains(&u) {
                    let letter = (b'a' + (u as u8) - 1) as char;
                    KeyCode::Char(letter)
                } else {
                    KeyCode::Char(c)
                }
            }
            other => other,
        }
    }

    /// Accepts `ctrl+alt+x` style and Emacs `C-M-x` style.
    pub(crate) fn parse(s: &str) -> Option<KeyBind> {
        let mut modifiers = KeyModifiers::NONE;
        let key_str = if s.contains('+') && s.len() > 1 {
            let parts: Vec<&str> = s.split('+').collect();
            for &part in &parts[..parts.len() - 1] {
                match part.to_ascii_lowercase().as_str() {
                    "ctrl" => modifiers |= KeyModifiers::CONTROL,
                    "shift" => modifiers |= KeyModifiers::SHIFT,
                    "alt" | "meta" => modifiers |= KeyModifiers::ALT,
                    _ => return None,
                }
            }
            *parts.last()?
        } else {
            let mut rest = s;
            loop {
                if let Some(tail) = rest.strip_prefix("C-").filter(|t| !t.is_empty()) {
                    modifiers |= KeyModifiers::CONTROL;
                    rest = tail;
                } else if let Some(tail) = rest.strip_prefix("M-").filter(|t| !t.is_empty()) {
                    modifiers |= KeyModifiers::ALT;
                    rest = tail;
                } else if let Some(tail) = rest.strip_prefix("S-").filter(|t| !t.is_empty()) {
                    modifiers |= KeyModifiers::SHIFT;
                    rest = tail;
                } else {
                    break rest;
                }
            }
        };
        let lower = key_str.to_ascii_lowercase();
        let code = match lower.as_str() {
            "spc" | "space" => KeyCode::Char(' '),
            "esc" | "escape" => KeyCode::Esc,
            "ret" | "enter" | "return" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "backspace" | "del" => KeyCode::Backspace,
            "delete" => KeyCode::Delete,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" => KeyCode::PageUp,
            "pagedown" => KeyCode::PageDown,
            _ => {
                let mut chars = lower.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => {
                        let n = lower.strip_prefix('f')?.parse::<u8>().ok()?;
                        if !(1..=12).contains(&n) {
                            return None;
                        }
                        KeyCode::F(n)
                    }
                }
            }
        };
        Some(KeyBind { modifiers, code })
    }

    fn key_name(&self) -> String {
        match self.code {
            KeyCode::Char(' ') => "SPC".to_string(),
            KeyCode::Char(c) => c.to_ascii_lowercase().to_string(),
            KeyCode::F(n) => format!("<f{n}>"),
            KeyCode::Esc => "ESC".to_string(),
            KeyCode::Enter => "RET".to_string(),
            KeyCode::Tab => "TAB".to_string(),
            KeyCode::Backspace => "DEL".to_string(),
            KeyCode::Delete => "<delete>".to_string(),
            KeyCode::Up => "<up>".to_string(),
            KeyCode::Down => "<down>".to_string(),
            KeyCode::Left => "<left>".to_string(),
            KeyCode::Right => "<right>".to_string(),
            KeyCode::Home => "<home>".to_string(),
            KeyCode::End => "<end>".to_string(),
            KeyCode::PageUp => "<prior>".to_string(),
            KeyCode::PageDown => "<next>".to_string(),
            _ => "?".to_string(),
        }
    }

    /// Emacs notation, e.g. `C-x` or `M-;`.
    pub(crate) fn display(&self) -> String {
        let mut out = String::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            out.push_str("C-");
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            out.push_str("M-");
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) && !matches!(self.code, KeyCode::Char(_)) {
            out.push_str("S-");
        }
        out.push_str(&self.key_name());
        out
    }

    pub(crate) fn matches(&self, key: &KeyEvent) -> bool {
        let bind_code = KeyBind::normalize_char_with_modifiers(self.code, self.modifiers);
        let ev_code = KeyBind::normalize_char_with_modifiers(key.code, key.modifiers);
        let lower = |code: KeyCode| match code {
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            other => other,
        };
        // Case is carried by the char itself; SHIFT is noise for Char keys.
        let mut ev_mods = key.modifiers;
        if matches!(ev_code, KeyCode::Char(_)) {
            ev_mods -= KeyModifiers::SHIFT;
        }
        let mut bind_mods = self.modifiers;
        if matches!(bind_code, KeyCode::Char(_)) {
            bind_mods -= KeyModifiers::SHIFT;
        }
        lower(ev_code) == lower(bind_code) && ev_mods == bind_mods
    }
}

/// A chord sequence such as `C-x C-s`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KeySequence(pub(crate) Vec<KeyBind>);

impl KeySequence {
    pub(crate) fn parse(s: &str) -> Option<KeySequence> {
        let binds = s
            .split_whitespace()
            .map(KeyBind::parse)
            .collect::<Option<Vec<_>>>()?;
        if binds.is_empty() {
            return None;
        }
        Some(KeySequence(binds))
    }

    pub(crate) fn display(&self) -> String {
        self.0
            .iter()
            .map(KeyBind::display)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn starts_with(&self, keys: &[KeyEvent]) -> bool {
        keys.len() <= self.0.len() && self.0.iter().zip(keys).all(|(b, k)| b.matches(k))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyMatch {
    Action(KeyAction),
    /// The keys so far begin at least one longer binding.
    Prefix,
    None,
}

#[derive(Debug, Clone)]
pub(crate) struct KeyBindings {
    pub(crate) map: HashMap<KeyAction, Vec<KeySequence>>,
}

impl KeyBindings {
    pub(crate) fn defaults() -> Self {
        let mut map: HashMap<KeyAction, Vec<KeySequence>> = HashMap::new();
        let mut bind = |action: KeyAction, s: &str| {
            if let Some(seq) = KeySequence::parse(s) {
                map.entry(action).or_default().push(seq);
            }
        };

        bind(KeyAction::Save, "C-x C-s");
        bind(KeyAction::CloseTab, "C-x k");
        bind(KeyAction::FindFile, "C-x C-f");
        bind(KeyAction::NextTab, "C-x b");
        bind(KeyAction::NewFile, "C-x C-n");
        bind(KeyAction::ImportFile, "C-x i");
        bind(KeyAction::CycleLanguage, "C-x l");
        bind(KeyAction::Settings, "C-x s");
        bind(KeyAction::ToggleComment, "M-;");
        bind(KeyAction::DismissNotice, "C-x n");
        bind(KeyAction::Quit, "C-x C-c");
        bind(KeyAction::Cancel, "C-g");

        KeyBindings { map }
    }

    /// Resolves the chords typed so far. `C-g` cancels a pending prefix.
    pub(crate) fn lookup(&self, keys: &[KeyEvent]) -> KeyMatch {
        if keys.is_empty() {
            return KeyMatch::None;
        }
        let mut prefix = false;
        for action in KeyAction::all().iter().copied() {
            let Some(seqs) = self.map.get(&action) else {
                continue;
            };
            for seq in seqs {
                if !seq.starts_with(keys) {
                    continue;
                }
                if seq.0.len() == keys.len() {
                    return KeyMatch::Action(action);
                }
                prefix = true;
            }
        }
        if prefix {
            return KeyMatch::Prefix;
        }
        if keys.len() > 1
            && let Some(last) = keys.last()
            && self.is_single_chord(KeyAction::Cancel, last)
        {
            return KeyMatch::Action(KeyAction::Cancel);
        }
        KeyMatch::None
    }

    fn is_single_chord(&self, action: KeyAction, key: &KeyEvent) -> bool {
        self.map
            .get(&action)
            .is_some_and(|seqs| seqs.iter().any(|s| s.0.len() == 1 && s.0[0].matches(key)))
    }

    pub(crate) fn display_for(&self, action: KeyAction) -> String {
        self.map
            .get(&action)
            .and_then(|v| v.first())
            .map(KeySequence::display)
            .unwrap_or_else(|| "unbound".to_string())
    }
}

pub(crate) fn display_keys(keys: &[KeyEvent]) -> String {
    keys.iter()
        .map(|k| {
            KeyBind {
                modifiers: k.modifiers,
                code: KeyBind::normalize_char_with_modifiers(k.code, k.modifiers),
            }
            .display()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SingleOrVec {
    Single(String),
    Multiple(Vec<String>),
}

fn keybinds_file_path() -> Option<PathBuf> {
    app_dir().map(|dir| dir.join(KEYBINDS_FILE))
}

pub(crate) fn parse_key_action_name(name: &str) -> Option<KeyAction> {
    serde_json::from_value::<KeyAction>(serde_json::Value::String(name.to_string())).ok()
}

pub(crate) fn apply_keybinding_overrides(
    kb: &mut KeyBindings,
    overrides: HashMap<String, SingleOrVec>,
    source: &str,
) {
    for (action_name, val) in overrides {
        let Some(action) = parse_key_action_name(&action_name) else {
            log::warn!("unknown key action '{action_name}' in {source}");
            continue;
        };
        let strings = match val {
            SingleOrVec::Single(s) => vec![s],
            SingleOrVec::Multiple(v) => v,
        };
        if strings.is_empty() {
            kb.map.insert(action, Vec::new());
            continue;
        }
        let mut seqs = Vec::new();
        let mut invalid = Vec::new();
        for s in strings {
            if let Some(parsed) = KeySequence::parse(&s) {
                seqs.push(parsed);
            } else {
                invalid.push(s);
            }
        }
        if !invalid.is_empty() {
            log::warn!(
                "invalid keybind(s) for '{action_name}' in {source}: {}",
                invalid.join(", ")
            );
        }
        if !seqs.is_empty() {
            kb.map.insert(action, seqs);
        }
    }
}

pub(crate) fn parse_override_entry(
    action_name: &str,
    raw: serde_json::Value,
    source: &str,
) -> Option<(String, SingleOrVec)> {
    match raw {
        serde_json::Value::String(s) => Some((action_name.to_string(), SingleOrVec::Single(s))),
        serde_json::Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                if let serde_json::Value::String(s) = item {
                    out.push(s);
                } else {
                    log::warn!(
                        "invalid keybind list item for '{action_name}' in {source}: expected string"
                    );
                    return None;
                }
            }
            Some((action_name.to_string(), SingleOrVec::Multiple(out)))
        }
        _ => {
            log::warn!(
                "invalid keybind value type for '{action_name}' in {source}: expected string or array of strings"
            );
            None
        }
    }
}

pub(crate) fn load_keybindings() -> KeyBindings {
    match keybinds_file_path() {
        Some(path) => load_keybindings_from(&path),
        None => KeyBindings::defaults(),
    }
}

pub(crate) fn load_keybindings_from(path: &std::path::Path) -> KeyBindings {
    let mut kb = KeyBindings::defaults();
    let Ok(raw) = fs::read_to_string(path) else {
        return kb;
    };
    let source = path.display().to_string();
    let Ok(root) = serde_json::from_str::<serde_json::Value>(&raw) else {
        log::warn!("invalid keybinds json in {source}");
        return kb;
    };
    let Some(obj) = root.as_object() else {
        log::warn!("invalid keybinds json in {source}: expected object");
        return kb;
    };
    let mut overrides: HashMap<String, SingleOrVec> = HashMap::new();
    for (action_name, raw_val) in obj {
        if let Some((k, v)) = parse_override_entry(action_name, raw_val.clone(), &source) {
            overrides.insert(k, v);
        }
    }
    apply_keybinding_overrides(&mut kb, overrides, &source);
    kb
}
