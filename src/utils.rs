use crate::error::Result;
use crate::log_debug;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn ensure_directory(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Saves a fetched page as `<dir>/<name>.html` so later runs can replay it.
pub fn save_html(content: &str, dir: impl AsRef<Path>, name: &str) -> Result<PathBuf> {
    ensure_directory(&dir)?;

    let path = dir.as_ref().join(format!("{}.html", name));
    let mut file = File::create(&path)?;
    file.write_all(content.as_bytes())?;

    log_debug!("[utils] Saved HTML content to {:?}", path);
    Ok(path)
}

/// Every `.html` file in `dir`, sorted by file name.
pub fn read_html_files(dir: impl AsRef<Path>) -> Result<Vec<(PathBuf, String)>> {
    ensure_directory(&dir)?;

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.extension().and_then(|s| s.to_str()) == Some("html") {
            let content = fs::read_to_string(&path)?;
            files.push((path, content));
        }
    }

    files.sort_by(|(a, _), (b, _)| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

pub fn save_json(data: &impl serde::Serialize, path: impl AsRef<Path>) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }

    let json_string = serde_json::to_string_pretty(data)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    Ok(())
}
