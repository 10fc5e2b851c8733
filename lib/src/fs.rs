use std::fs;
use std::path::Path;

use crate::error::{Chainable, Result};

/// Reads the file at `path` as UTF-8 text.
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).chain_with(|| error! {
        "failed to open file for reading",
        "file path" => path.display()
    })?;

    String::from_utf8(bytes).map_err(|e| error! {
        "file is not valid UTF-8",
        "file path" => path.display(),
        "invalid byte offset" => e.utf8_error().valid_up_to(),
    })
}

/// Writes `text` to `path`, creating any missing parent directories and
/// replacing whatever was at `path` before.
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    fs::write(path, text).chain_with(|| error! {
        "failed to open/create file for writing",
        "file path" => path.display()
    })
}

/// Like [`fs::create_dir_all()`]: succeeds if the directory already exists.
pub fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path).chain_with(|| error! {
        "failed to create directory",
        "directory path" => path.display()
    })
}
