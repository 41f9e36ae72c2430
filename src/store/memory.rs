use std::collections::BTreeMap;

use super::Storage;
use crate::error::StoreResult;
use crate::file::{FileEntity, FileId, NewFile};
use crate::language::LanguageMode;
use crate::settings::EditorSettings;

const SAMPLE_JS: &str = "// Welcome to mxedit
function greetUser(name) {
    const message = `Hello, ${name}!`;
    console.log(message);
    return message;
}

// Example usage
greetUser('World');";

const SAMPLE_CSS: &str = "/* Sample CSS file */
body {
    font-family: 'Inter', sans-serif;
    margin: 0;
    padding: 0;
    background-color: #f9fafb;
}

.container {
    max-width: 1200px;
    margin: 0 auto;
    padding: 20px;
}";

const SAMPLE_README: &str = "# mxedit

A terminal code editor with Emacs keybindings.

## Usage

- `C-x C-s` - Save file
- `C-x C-f` - Open file
- `C-x k` - Close file
- `C-g` - Cancel operation";

/// Process-local backing. Contents vanish on exit.
#[derive(Debug)]
pub struct MemStorage {
    files: BTreeMap<FileId, FileEntity>,
    settings: Option<EditorSettings>,
    next_id: u64,
}

impl MemStorage {
    pub fn new() -> Self {
        Self {
            files: BTreeMap::new(),
            settings: None,
            next_id: 1,
        }
    }

    /// A store holding the three sample files shown on first launch.
    pub fn with_samples() -> Self {
        let mut store = Self::new();
        for (name, content, language) in [
            ("index.js", SAMPLE_JS, LanguageMode::JavaScript),
            ("styles.css", SAMPLE_CSS, LanguageMode::Css),
            ("README.md", SAMPLE_README, LanguageMode::Markdown),
        ] {
            store.insert(NewFile {
                name: name.to_string(),
                content: Some(content.to_string()),
                language: Some(language),
                path: format!("/{name}"),
            });
        }
        store
    }

    fn insert(&mut self, new: NewFile) -> FileEntity {
        let id = FileId(self.next_id);
        self.next_id += 1;
        let file = new.into_entity(id);
        self.files.insert(id, file.clone());
        file
    }
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemStorage {
    fn list_files(&mut self) -> StoreResult<Vec<FileEntity>> {
        Ok(self.files.values().cloned().collect())
    }

    fn get_file(&mut self, id: FileId) -> StoreResult<Option<FileEntity>> {
        Ok(self.files.get(&id).cloned())
    }

    fn get_file_by_path(&mut self, path: &str) -> StoreResult<Option<FileEntity>> {
        Ok(self.files.values().find(|f| f.path == path).cloned())
    }

    fn create_file(&mut self, new: NewFile) -> StoreResult<FileEntity> {
        Ok(self.insert(new))
    }

    fn update_file(&mut self, id: FileId, content: String) -> StoreResult<Option<FileEntity>> {
        Ok(self.files.get_mut(&id).map(|file| {
            file.content = content;
            file.clone()
        }))
    }

    fn delete_file(&mut self, id: FileId) -> StoreResult<bool> {
        Ok(self.files.remove(&id).is_some())
    }

    fn settings(&mut self) -> StoreResult<EditorSettings> {
        Ok(*self.settings.get_or_insert_with(EditorSettings::default))
    }

    fn update_settings(&mut self, settings: EditorSettings) -> StoreResult<EditorSettings> {
        self.settings = Some(settings);
        Ok(settings)
    }
}
