//! The "tutorial already shown" flag.
//!
//! Storage is injected through [`TutorialFlag`]; `vibe-config` provides the
//! file-backed implementation.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlagStoreError {
    #[error("failed to access tutorial flag at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("tutorial flag file {} is malformed: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },
}

pub trait TutorialFlag {
    fn is_seen(&self) -> bool;
    fn mark_seen(&mut self) -> Result<(), FlagStoreError>;
}

/// Process-local flag, for tests and for runs without a home directory.
#[derive(Debug, Default)]
pub struct MemoryFlag {
    seen: bool,
}

impl MemoryFlag {
    #[must_use]
    pub fn seen() -> Self {
        Self { seen: true }
    }
}

impl TutorialFlag for MemoryFlag {
    fn is_seen(&self) -> bool {
        self.seen
    }

    fn mark_seen(&mut self) -> Result<(), FlagStoreError> {
        self.seen = true;
        Ok(())
    }
}

/// Reads the flag once on creation and writes it once on dismissal.
#[derive(Debug)]
pub struct TutorialPrompt<F> {
    flag: F,
    visible: bool,
}

impl<F: TutorialFlag> TutorialPrompt<F> {
    pub fn new(flag: F) -> Self {
        let visible = !flag.is_seen();
        Self { flag, visible }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn dismiss(&mut self) -> Result<(), FlagStoreError> {
        if !self.visible {
            return Ok(());
        }
        self.visible = false;
        self.flag.mark_seen()
    }
}
