use crate::error::VectorStoreError;
use crate::store::VectorStore;
use log::info;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Namespace prefix for ephemeral (temp-path) stores.
const TEMP_NAMESPACE_PREFIX: &str = "temp-";

/// Namespace for a one-off indexed path, named by a hash of the canonical
/// path so repeat lookups land on the same store.
pub fn temp_namespace(path: &Path) -> String {
    let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let normalized = canonical.to_string_lossy().replace('\\', "/");
    let digest = Sha256::digest(normalized.as_bytes());
    let hex: String = digest
        .iter()
        .take(8)
        .map(|b| format!("{b:02x}"))
        .collect();
    format!("{TEMP_NAMESPACE_PREFIX}{hex}")
}

/// Whether a temp namespace already exists for the given path.
pub fn temp_store_exists(data_dir: &Path, path: &Path) -> bool {
    VectorStore::namespace_path(data_dir, &temp_namespace(path)).exists()
}

/// Remove the temp namespace for one path. Returns whether anything was
/// deleted.
pub fn cleanup_temp(data_dir: &Path, path: &Path) -> Result<bool, VectorStoreError> {
    let file = VectorStore::namespace_path(data_dir, &temp_namespace(path));
    if file.exists() {
        std::fs::remove_file(&file)?;
        info!("Removed temp index {}", file.display());
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Remove every temp namespace under the data directory. Returns how many
/// were deleted.
pub fn cleanup_all_temp(data_dir: &Path) -> Result<usize, VectorStoreError> {
    let mut removed = 0;

    let entries = match std::fs::read_dir(data_dir) {
        Ok(entries) => entries,
        Err(_) => return Ok(0),
    };

    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(TEMP_NAMESPACE_PREFIX) && name.ends_with(".json") {
            std::fs::remove_file(entry.path())?;
            removed += 1;
        }
    }

    if removed > 0 {
        info!("Removed {removed} temp indexes");
    }

    Ok(removed)
}
