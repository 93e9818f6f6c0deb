//! Persisted client state (`~/.vibe/state.toml`).
//!
//! ```toml
//! [tutorial]
//! seen = true
//! ```
//!
//! Updated with `toml_edit` so anything else in the file survives.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use toml_edit::{DocumentMut, Item, Table, value};

use vibe_core::{FlagStoreError, TutorialFlag};

use crate::atomic_write;

#[derive(Debug)]
pub struct FileTutorialFlag {
    path: PathBuf,
    seen: bool,
}

impl FileTutorialFlag {
    /// Read the flag once. A missing or unreadable file counts as not seen.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let seen = match read_document(&path) {
            Ok(doc) => doc
                .get("tutorial")
                .and_then(|t| t.get("seen"))
                .and_then(Item::as_bool)
                .unwrap_or(false),
            Err(e) => {
                tracing::warn!(path = %path.display(), "Ignoring unreadable state file: {e}");
                false
            }
        };
        Self { path, seen }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_document(path: &Path) -> Result<DocumentMut, FlagStoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(source) => {
            return Err(FlagStoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    content
        .parse::<DocumentMut>()
        .map_err(|e| FlagStoreError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

impl TutorialFlag for FileTutorialFlag {
    fn is_seen(&self) -> bool {
        self.seen
    }

    fn mark_seen(&mut self) -> Result<(), FlagStoreError> {
        let mut doc = read_document(&self.path)?;
        let tutorial = doc
            .entry("tutorial")
            .or_insert(Item::Table(Table::new()))
            .as_table_like_mut()
            .ok_or_else(|| FlagStoreError::Corrupt {
                path: self.path.clone(),
                reason: "`tutorial` is not a table".to_owned(),
            })?;
        tutorial.insert("seen", value(true));

        atomic_write(&self.path, doc.to_string().as_bytes()).map_err(|source| {
            FlagStoreError::Io {
                path: self.path.clone(),
                source,
            }
        })?;
        self.seen = true;
        tracing::debug!(path = %self.path.display(), "Tutorial marked as seen");
        Ok(())
    }
}
