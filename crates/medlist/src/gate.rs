//! Editor mode gate.
//!
//! Editor mode unlocks edit and delete. The PIN is a shared configuration
//! value compared in plain text: this is a UI convenience, not access
//! control. Anything that needs real protection must be checked by a server
//! against a real credential.

use tracing::debug;

use crate::error::{Error, Result};

/// Whether editor affordances are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    /// Read-only directory; registration is still allowed.
    #[default]
    Locked,
    /// Edit and delete are available.
    Unlocked,
}

/// Two-state gate around editor mode.
#[derive(Debug, Clone)]
pub struct EditorGate {
    pin: String,
    mode: EditorMode,
}

impl EditorGate {
    /// Create a locked gate that opens on `pin`.
    #[must_use]
    pub fn new(pin: impl Into<String>) -> Self {
        Self {
            pin: pin.into(),
            mode: EditorMode::Locked,
        }
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    /// Whether editor mode is on.
    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        self.mode == EditorMode::Unlocked
    }

    /// Try to enter editor mode. Returns whether the gate is now unlocked.
    ///
    /// Only an exact match unlocks. A wrong attempt leaves the mode as it
    /// was, so an already unlocked gate stays unlocked.
    pub fn unlock(&mut self, attempt: &str) -> bool {
        if attempt == self.pin {
            self.mode = EditorMode::Unlocked;
        } else {
            debug!("Editor PIN rejected");
        }
        self.is_unlocked()
    }

    /// Leave editor mode.
    pub fn lock(&mut self) {
        self.mode = EditorMode::Locked;
    }

    /// Fail unless editor mode is on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EditorLocked`] when the gate is locked.
    pub fn require_unlocked(&self) -> Result<()> {
        if self.is_unlocked() {
            Ok(())
        } else {
            Err(Error::EditorLocked)
        }
    }
}
