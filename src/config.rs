use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::LevelFilter;
use serde::{Deserialize, Serialize};

const APP_DIR: &str = "mxedit";
const CONFIG_FILE: &str = "config.json";
const STORE_FILE: &str = "files.json";
const LOG_FILE: &str = "mxedit.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    Memory,
    #[default]
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreKind,
    pub store_path: Option<PathBuf>,
    pub log_level: String,
    pub watch_store: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreKind::default(),
            store_path: None,
            log_level: "info".to_string(),
            watch_store: true,
        }
    }
}

impl AppConfig {
    /// Reads the user config, falling back to defaults when it is missing or
    /// unreadable.
    pub fn load() -> Self {
        config_file_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(raw) = fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str::<AppConfig>(&raw) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("ignoring invalid config {}: {err}", path.display());
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::other(format!("serialize config: {e}")))?;
        fs::write(path, raw)
    }

    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Info)
    }

    /// Where the JSON store lives: the configured path, else the app dir.
    pub fn resolved_store_path(&self) -> Option<PathBuf> {
        self.store_path
            .clone()
            .or_else(|| app_dir().map(|dir| dir.join(STORE_FILE)))
    }

    pub fn apply_cli(&mut self, args: &CliArgs) {
        if args.memory {
            self.store = StoreKind::Memory;
        }
        if let Some(path) = &args.store {
            self.store = StoreKind::Json;
            self.store_path = Some(path.clone());
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub help: bool,
    pub memory: bool,
    pub store: Option<PathBuf>,
    pub files: Vec<PathBuf>,
}

impl CliArgs {
    pub fn parse<I>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = CliArgs::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--help" | "-h" => parsed.help = true,
                "--memory" => parsed.memory = true,
                "--store" => {
                    let path = args
                        .next()
                        .ok_or_else(|| "--store requires a path".to_string())?;
                    parsed.store = Some(PathBuf::from(path));
                }
                flag if flag.starts_with("--") => return Err(format!("unknown option: {flag}")),
                _ => parsed.files.push(PathBuf::from(arg)),
            }
        }
        Ok(parsed)
    }

    pub fn usage() -> &'static str {
        "Usage: mxedit [OPTIONS] [FILE...]

Arguments:
  [FILE...]       Local files to import into the store on startup

Options:
  --memory        Use a throwaway in-memory store
  --store PATH    Use the JSON store at PATH
  --help          Show this help message"
    }
}

pub(crate) fn app_dir() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME")
        && !xdg.is_empty()
    {
        return Some(PathBuf::from(xdg).join(APP_DIR));
    }
    if let Ok(appdata) = std::env::var("APPDATA")
        && !appdata.is_empty()
    {
        return Some(PathBuf::from(appdata).join(APP_DIR));
    }
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".config").join(APP_DIR))
}

pub(crate) fn config_file_path() -> Option<PathBuf> {
    app_dir().map(|dir| dir.join(CONFIG_FILE))
}

pub(crate) fn log_file_path() -> Option<PathBuf> {
    if let Ok(state) = std::env::var("XDG_STATE_HOME")
        && !state.is_empty()
    {
        return Some(PathBuf::from(state).join(APP_DIR).join(LOG_FILE));
    }
    app_dir().map(|dir| dir.join(LOG_FILE))
}
