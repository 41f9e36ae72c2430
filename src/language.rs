use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Syntax/editing profile tag attached to a file and to each live view.
///
/// Tags read from the store are kept verbatim, so a tag the editor has no
/// support for survives a round trip as [`LanguageMode::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LanguageMode {
    #[default]
    JavaScript,
    Python,
    Html,
    Css,
    Json,
    Markdown,
    Xml,
    Sql,
    Other(String),
}

impl LanguageMode {
    pub const DEFAULT: LanguageMode = LanguageMode::JavaScript;

    /// Modes with registered view support, in selector order.
    pub const SUPPORTED: [LanguageMode; 8] = [
        LanguageMode::JavaScript,
        LanguageMode::Python,
        LanguageMode::Html,
        LanguageMode::Css,
        LanguageMode::Json,
        LanguageMode::Markdown,
        LanguageMode::Xml,
        LanguageMode::Sql,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            LanguageMode::JavaScript => "javascript",
            LanguageMode::Python => "python",
            LanguageMode::Html => "html",
            LanguageMode::Css => "css",
            LanguageMode::Json => "json",
            LanguageMode::Markdown => "markdown",
            LanguageMode::Xml => "xml",
            LanguageMode::Sql => "sql",
            LanguageMode::Other(tag) => tag,
        }
    }

    /// Human label for the status bar: the tag with its first letter uppercased.
    pub fn label(&self) -> String {
        let tag = self.as_str();
        let mut chars = tag.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, LanguageMode::Other(_))
    }

    /// The mode a view should actually render with.
    pub fn supported_or_default(&self) -> LanguageMode {
        if self.is_supported() {
            self.clone()
        } else {
            LanguageMode::DEFAULT
        }
    }

    pub fn from_extension(ext: &str) -> LanguageMode {
        match ext.to_ascii_lowercase().as_str() {
            "js" | "jsx" | "ts" | "tsx" => LanguageMode::JavaScript,
            "py" => LanguageMode::Python,
            "html" | "htm" => LanguageMode::Html,
            "css" | "scss" | "less" => LanguageMode::Css,
            "json" => LanguageMode::Json,
            "md" => LanguageMode::Markdown,
            "xml" => LanguageMode::Xml,
            "sql" => LanguageMode::Sql,
            _ => LanguageMode::DEFAULT,
        }
    }

    pub fn for_file_name(name: &str) -> LanguageMode {
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(LanguageMode::from_extension)
            .unwrap_or_default()
    }

    /// Next supported mode in selector order, wrapping around.
    pub fn next(&self) -> LanguageMode {
        let idx = Self::SUPPORTED.iter().position(|m| m == self);
        match idx {
            Some(i) => Self::SUPPORTED[(i + 1) % Self::SUPPORTED.len()].clone(),
            None => LanguageMode::DEFAULT,
        }
    }

    /// Opening and closing comment delimiters. The closer is empty for line
    /// comments.
    pub(crate) fn comment_delimiters(&self) -> Option<(&'static str, &'static str)> {
        match self.supported_or_default() {
            LanguageMode::JavaScript => Some(("//", "")),
            LanguageMode::Python => Some(("#", "")),
            LanguageMode::Sql => Some(("--", "")),
            LanguageMode::Css => Some(("/*", "*/")),
            LanguageMode::Html | LanguageMode::Xml => Some(("<!--", "-->")),
            _ => None,
        }
    }
}

impl From<String> for LanguageMode {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "javascript" => LanguageMode::JavaScript,
            "python" => LanguageMode::Python,
            "html" => LanguageMode::Html,
            "css" => LanguageMode::Css,
            "json" => LanguageMode::Json,
            "markdown" => LanguageMode::Markdown,
            "xml" => LanguageMode::Xml,
            "sql" => LanguageMode::Sql,
            _ => LanguageMode::Other(tag),
        }
    }
}

impl From<&str> for LanguageMode {
    fn from(tag: &str) -> Self {
        LanguageMode::from(tag.to_string())
    }
}

impl From<LanguageMode> for String {
    fn from(mode: LanguageMode) -> Self {
        match mode {
            LanguageMode::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for LanguageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
