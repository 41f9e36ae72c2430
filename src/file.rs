use std::fmt;

use serde::{Deserialize, Serialize};

use crate::language::LanguageMode;

/// Store-assigned identifier of a file. Never reused within one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub u64);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntity {
    pub id: FileId,
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub language: LanguageMode,
    pub path: String,
}

/// Insert form of a file. Missing content/language take the store defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<LanguageMode>,
    pub path: String,
}

impl NewFile {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if self.path.trim().is_empty() {
            return Err("path must not be empty".to_string());
        }
        Ok(())
    }

    pub(crate) fn into_entity(self, id: FileId) -> FileEntity {
        FileEntity {
            id,
            name: self.name,
            content: self.content.unwrap_or_default(),
            language: self.language.unwrap_or_default(),
            path: self.path,
        }
    }
}

/// Partial update accepted by the store. Only content is writable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePatch {
    pub content: String,
}
