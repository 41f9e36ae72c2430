use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use super::Storage;
use super::memory::MemStorage;
use crate::error::StoreResult;
use crate::file::{FileEntity, FileId, NewFile};
use crate::settings::EditorSettings;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
struct StoreFile {
    #[serde(default)]
    files: Vec<FileEntity>,
    #[serde(default)]
    settings: Option<EditorSettings>,
    #[serde(default)]
    next_id: u64,
}

impl StoreFile {
    fn bump_next_id(&mut self) {
        let max = self.files.iter().map(|f| f.id.0).max().unwrap_or(0);
        self.next_id = self.next_id.max(max + 1);
    }
}

/// Store persisted as a single JSON document on disk.
///
/// The document is re-read whenever its modification time changes, so edits
/// made by another process are visible on the next call.
#[derive(Debug)]
pub struct JsonStorage {
    path: PathBuf,
    state: StoreFile,
    loaded_mtime: Option<SystemTime>,
}

impl JsonStorage {
    /// Opens the store at `path`, creating it with the sample files if absent.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let mut store = Self {
            path,
            state: StoreFile::default(),
            loaded_mtime: None,
        };
        if store.path.exists() {
            store.reload()?;
        } else {
            let mut seed = MemStorage::with_samples();
            let mut next = StoreFile {
                files: seed.list_files()?,
                ..StoreFile::default()
            };
            next.bump_next_id();
            store.commit(next)?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn reload(&mut self) -> StoreResult<()> {
        let raw = fs::read_to_string(&self.path)?;
        let mut state: StoreFile = if raw.trim().is_empty() {
            StoreFile::default()
        } else {
            serde_json::from_str(&raw)?
        };
        state.bump_next_id();
        self.state = state;
        self.loaded_mtime = modified_time(&self.path);
        Ok(())
    }

    fn refresh_if_changed(&mut self) -> StoreResult<()> {
        let current = modified_time(&self.path);
        if current.is_some() && current != self.loaded_mtime {
            log::debug!("store file changed on disk, reloading {}", self.path.display());
            self.reload()?;
        }
        Ok(())
    }

    /// Writes `next` to disk and only then adopts it. A failed write leaves
    /// the in-memory state matching the file.
    fn commit(&mut self, next: StoreFile) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&next)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        self.state = next;
        self.loaded_mtime = modified_time(&self.path);
        Ok(())
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

impl Storage for JsonStorage {
    fn list_files(&mut self) -> StoreResult<Vec<FileEntity>> {
        self.refresh_if_changed()?;
        Ok(self.state.files.clone())
    }

    fn get_file(&mut self, id: FileId) -> StoreResult<Option<FileEntity>> {
        self.refresh_if_changed()?;
        Ok(self.state.files.iter().find(|f| f.id == id).cloned())
    }

    fn get_file_by_path(&mut self, path: &str) -> StoreResult<Option<FileEntity>> {
        self.refresh_if_changed()?;
        Ok(self.state.files.iter().find(|f| f.path == path).cloned())
    }

    fn create_file(&mut self, new: NewFile) -> StoreResult<FileEntity> {
        self.refresh_if_changed()?;
        let mut next = self.state.clone();
        let file = new.into_entity(FileId(next.next_id));
        next.next_id += 1;
        next.files.push(file.clone());
        self.commit(next)?;
        Ok(file)
    }

    fn update_file(&mut self, id: FileId, content: String) -> StoreResult<Option<FileEntity>> {
        self.refresh_if_changed()?;
        let mut next = self.state.clone();
        let Some(file) = next.files.iter_mut().find(|f| f.id == id) else {
            return Ok(None);
        };
        file.content = content;
        let updated = file.clone();
        self.commit(next)?;
        Ok(Some(updated))
    }

    fn delete_file(&mut self, id: FileId) -> StoreResult<bool> {
        self.refresh_if_changed()?;
        if !self.state.files.iter().any(|f| f.id == id) {
            return Ok(false);
        }
        let mut next = self.state.clone();
        next.files.retain(|f| f.id != id);
        self.commit(next)?;
        Ok(true)
    }

    fn settings(&mut self) -> StoreResult<EditorSettings> {
        self.refresh_if_changed()?;
        Ok(self.state.settings.unwrap_or_default())
    }

    fn update_settings(&mut self, settings: EditorSettings) -> StoreResult<EditorSettings> {
        self.refresh_if_changed()?;
        let mut next = self.state.clone();
        next.settings = Some(settings);
        self.commit(next)?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn new_file(name: &str) -> NewFile {
        NewFile {
            name: name.to_string(),
            content: Some(format!("// {name}")),
            language: None,
            path: format!("/{name}"),
        }
    }

    #[test]
    fn open_missing_file_seeds_samples() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("nested/files.json");
        let mut store = JsonStorage::open(&path).expect("open");
        assert!(path.exists());
        assert_eq!(store.list_files().expect("list").len(), 3);
    }

    #[test]
    fn writes_survive_reopen() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("files.json");
        let created = {
            let mut store = JsonStorage::open(&path).expect("open");
            let created = store.create_file(new_file("a.js")).expect("create");
            store
                .update_file(created.id, "let a = 1;".into())
                .expect("update");
            let mut settings = EditorSettings::default();
            settings.line_numbers = false;
            store.update_settings(settings).expect("settings");
            created
        };
        let mut reopened = JsonStorage::open(&path).expect("reopen");
        let file = reopened.get_file(created.id).expect("get").expect("exists");
        assert_eq!(file.content, "let a = 1;");
        assert!(!reopened.settings().expect("settings").line_numbers);
        let next = reopened.create_file(new_file("b.js")).expect("create");
        assert!(next.id.0 > created.id.0);
    }

    #[test]
    fn picks_up_external_edits() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("files.json");
        let mut store = JsonStorage::open(&path).expect("open");
        let mut other = JsonStorage::open(&path).expect("open second");
        other.update_file(FileId(1), "changed".into()).expect("update");
        // Force a distinct mtime even on coarse filesystems.
        store.loaded_mtime = None;
        let file = store.get_file(FileId(1)).expect("get").expect("exists");
        assert_eq!(file.content, "changed");
    }

    #[test]
    fn delete_reports_missing() {
        let tmp = tempdir().expect("tempdir");
        let mut store = JsonStorage::open(tmp.path().join("f.json")).expect("open");
        assert!(store.delete_file(FileId(2)).expect("delete"));
        assert!(!store.delete_file(FileId(2)).expect("delete again"));
    }

    #[test]
    fn failed_write_leaves_store_unchanged() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("files.json");
        let mut store = JsonStorage::open(&path).expect("open");
        let before = store.list_files().expect("list");
        // A directory where the temp file goes makes every write fail.
        fs::create_dir(path.with_extension("json.tmp")).expect("block tmp");

        assert!(store.update_file(FileId(1), "never written".into()).is_err());
        assert!(store.create_file(new_file("c.js")).is_err());
        assert!(store.delete_file(FileId(2)).is_err());
        let mut settings = EditorSettings::default();
        settings.emacs_mode = false;
        assert!(store.update_settings(settings).is_err());

        assert_eq!(store.list_files().expect("list"), before);
        assert!(store.settings().expect("settings").emacs_mode);
        let on_disk = JsonStorage::open(&path).expect("reopen");
        assert_eq!(on_disk.state.files, before);
    }

    #[test]
    fn malformed_document_is_an_error() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("files.json");
        fs::write(&path, "{not json").expect("write");
        assert!(JsonStorage::open(&path).is_err());
    }
}
