use std::fs;
use std::io;
use std::path::Path;

use crate::file::NewFile;
use crate::language::LanguageMode;

/// Reads a local text file into a store insert. The language comes from the
/// extension; unknown or missing extensions get the default mode.
pub fn import_file(path: &Path) -> io::Result<NewFile> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| io::Error::other(format!("not a file name: {}", path.display())))?
        .to_string();
    let content = fs::read_to_string(path)?;
    Ok(NewFile {
        path: format!("/{name}"),
        language: Some(LanguageMode::for_file_name(&name)),
        content: Some(content),
        name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn imports_with_extension_language() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("query.sql");
        fs::write(&path, "select 1;").expect("write");
        let new = import_file(&path).expect("import");
        assert_eq!(new.name, "query.sql");
        assert_eq!(new.path, "/query.sql");
        assert_eq!(new.content.as_deref(), Some("select 1;"));
        assert_eq!(new.language, Some(LanguageMode::Sql));
    }

    #[test]
    fn unknown_extension_uses_default() {
        let tmp = tempdir().expect("tempdir");
        for name in ["notes.weird", "Makefile", "archive."] {
            let path = tmp.path().join(name);
            fs::write(&path, "x").expect("write");
            let new = import_file(&path).expect("import");
            assert_eq!(new.language, Some(LanguageMode::DEFAULT), "{name}");
        }
    }

    #[test]
    fn missing_or_binary_file_is_an_error() {
        let tmp = tempdir().expect("tempdir");
        assert!(import_file(&tmp.path().join("gone.js")).is_err());
        let bin = tmp.path().join("blob.js");
        fs::write(&bin, [0xff, 0xfe, 0x00]).expect("write");
        assert!(import_file(&bin).is_err());
    }
}
