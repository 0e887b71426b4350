//! Single-key terminal input.
//!
//! Reads happen with raw mode held only for the duration of one read, through [`RawModeGuard`].
//! Between reads the terminal is back in its normal (cooked) mode, so regular line-oriented output
//! and prompts keep working while a widget is on screen.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, is_raw_mode_enabled};
use tracing::{debug, warn};

use crate::Result;

/// Default upper bound for a single key read.
pub const DEFAULT_KEY_TIMEOUT: Duration = Duration::from_millis(100);

/// The keys the reorderable list reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKey {
    Up,
    Down,
    /// Grab or drop the row under the cursor.
    Select,
    /// Stop interacting.
    Interrupt,
}

/// A blocking source of list keys.
pub trait KeySource {
    /// Wait (for a bounded time) for one key.
    ///
    /// `Ok(None)` means the read timed out or the key pressed has no meaning for the list.
    fn read_key(&mut self) -> Result<Option<ListKey>>;
}

impl<K: KeySource + ?Sized> KeySource for &mut K {
    fn read_key(&mut self) -> Result<Option<ListKey>> {
        (**self).read_key()
    }
}

/// Puts the terminal into raw mode and restores the previous mode when dropped.
///
/// If raw mode was already on when the guard was acquired, dropping the guard leaves it on.
pub struct RawModeGuard {
    was_enabled: bool,
}

impl RawModeGuard {
    pub fn acquire() -> io::Result<Self> {
        let was_enabled = is_raw_mode_enabled()?;
        if !was_enabled {
            enable_raw_mode()?;
        }
        Ok(Self { was_enabled })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.was_enabled {
            return;
        }
        if let Err(err) = disable_raw_mode() {
            warn!(error = %err, "failed to restore terminal mode");
        }
    }
}

/// Reads keys from the controlling terminal with crossterm.
#[derive(Debug, Clone)]
pub struct CrosstermKeys {
    timeout: Duration,
}

impl CrosstermKeys {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for CrosstermKeys {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_TIMEOUT)
    }
}

impl KeySource for CrosstermKeys {
    fn read_key(&mut self) -> Result<Option<ListKey>> {
        let _raw = RawModeGuard::acquire()?;

        if !event::poll(self.timeout)? {
            return Ok(None);
        }

        match event::read()? {
            // Only handle presses (some terminals also report release/repeat).
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let mapped = map_key(&key);
                debug!(code = ?key.code, mapped = ?mapped, "key read");
                Ok(mapped)
            }
            _ => Ok(None),
        }
    }
}

/// Translate a crossterm key event into a list key.
pub fn map_key(key: &KeyEvent) -> Option<ListKey> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(ListKey::Interrupt)
        }
        KeyCode::Up | KeyCode::Char('k') => Some(ListKey::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(ListKey::Down),
        KeyCode::Char(' ') => Some(ListKey::Select),
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => Some(ListKey::Interrupt),
        _ => None,
    }
}
