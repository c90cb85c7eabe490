//! Helpers shared by the commands

pub mod prompt;
pub mod reader;
pub mod session;

use std::fs;
use std::path::Path;

use tracing::info;

/// Write `data` to `path`, creating parent directories
pub fn write_file(path: &Path, data: &[u8]) -> eyre::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, data)?;
    info!(path = %path.display(), len = data.len(), "File written");
    Ok(())
}
