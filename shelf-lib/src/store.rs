//! File-backed [`StateStore`].
//!
//! Each user's library lives in its own JSON file under the state directory.
//! File names encode the user key one-to-one: lowercase ASCII letters, digits
//! and `-` are kept, every other byte becomes `_` followed by two hex digits.
//! Writes go to a temp file that is renamed over the target, so a crash never
//! leaves a half-written snapshot behind.

use std::io;
use std::path::PathBuf;

use shelf_core::{LibraryState, ShelfError, StateStore};

pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the snapshot file for `key`. Empty keys are rejected.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, ShelfError> {
        if key.is_empty() {
            return Err(ShelfError::invalid_argument("Library key must not be empty"));
        }
        Ok(self.dir.join(format!("{}.json", file_stem(key))))
    }
}

impl StateStore for FileStateStore {
    fn load(&self, key: &str) -> Result<Option<LibraryState>, ShelfError> {
        let path = self.path_for(key)?;
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes).map(Some).map_err(|e| {
            ShelfError::invalid_argument(format!(
                "Corrupt library state {}: {}",
                path.display(),
                e
            ))
        })
    }

    fn save(&self, key: &str, state: &LibraryState) -> Result<(), ShelfError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;
        let bytes = serde_json::to_vec_pretty(state)
            .map_err(|e| ShelfError::internal(format!("Failed to serialize library: {}", e)))?;

        // Write atomically
        let tmp = path.with_extension("json.tmp");
        let written = std::fs::write(&tmp, &bytes).and_then(|_| std::fs::rename(&tmp, &path));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

/// Encode a user key as a file stem. Distinct keys never share a stem, even
/// on case-insensitive filesystems.
fn file_stem(key: &str) -> String {
    let mut stem = String::with_capacity(key.len());
    for &b in key.as_bytes() {
        if b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' {
            stem.push(b as char);
        } else {
            stem.push_str(&format!("_{:02x}", b));
        }
    }
    stem
}
