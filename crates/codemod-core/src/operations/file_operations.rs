use anyhow::{ensure, Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BACKUP_SUFFIX: &str = ".bak";

pub fn read_file_content(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))
}

pub fn write_file_content(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_context(|| format!("Failed to write file: {:?}", path))
}

pub fn file_exists(path: &Path) -> bool {
    path.is_file()
}

/// `Foo.swift` with suffix `.bak` becomes `Foo.swift.bak` in the same directory.
pub fn backup_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// Writes `original` to the backup location, replacing any earlier snapshot.
pub fn write_backup(path: &Path, original: &str, suffix: &str) -> Result<PathBuf> {
    ensure!(!suffix.is_empty(), "Refusing to back up {:?} onto itself", path);
    let backup = backup_path(path, suffix);
    fs::write(&backup, original)
        .with_context(|| format!("Failed to write backup {:?} for {:?}", backup, path))?;
    Ok(backup)
}
