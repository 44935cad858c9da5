//! Synthetic copy/paste chords on the virtual keyboard
//!
//! | Platform        | Copy | Paste |
//! |-----------------|------|-------|
//! | macOS           | ⌘C   | ⌘V    |
//! | Windows / Linux | Ctrl+C | Ctrl+V |

use std::fmt;
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use thiserror::Error;
use tracing::trace;

/// A modifier+key press-and-release sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chord {
    Copy,
    Paste,
}

impl Chord {
    /// Literal key pressed while the modifier is held
    pub fn key(self) -> char {
        match self {
            Chord::Copy => 'c',
            Chord::Paste => 'v',
        }
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modifier = if cfg!(target_os = "macos") { "Cmd" } else { "Ctrl" };
        write!(f, "{}+{}", modifier, self.key().to_ascii_uppercase())
    }
}

/// Key injection errors
#[derive(Debug, Error)]
pub enum InjectError {
    /// Backend could not be initialised
    #[error("Failed to connect to input backend: {0}")]
    Backend(String),

    /// A key event was rejected
    #[error("Key simulation failed: {0}")]
    KeySimulation(String),

    /// Blocking worker failed
    #[error("Injection task failed: {0}")]
    Task(String),
}

/// Sends chords to whatever window has keyboard focus
#[async_trait]
pub trait KeyInjector: Send + Sync {
    /// Modifier down, key down, wait `hold`, key up, modifier up
    async fn send_chord(&self, chord: Chord, hold: Duration) -> Result<(), InjectError>;
}

/// Injector backed by the enigo crate
///
/// `Enigo` is not `Send`, so each chord builds its own handle on a blocking
/// worker. The hold sleep happens on that worker as well.
#[derive(Debug, Default)]
pub struct EnigoInjector;

impl EnigoInjector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl KeyInjector for EnigoInjector {
    async fn send_chord(&self, chord: Chord, hold: Duration) -> Result<(), InjectError> {
        tokio::task::spawn_blocking(move || press_chord(chord, hold))
            .await
            .map_err(|e| InjectError::Task(e.to_string()))?
    }
}

fn modifier() -> Key {
    if cfg!(target_os = "macos") {
        Key::Meta
    } else {
        Key::Control
    }
}

fn press_chord(chord: Chord, hold: Duration) -> Result<(), InjectError> {
    let mut enigo =
        Enigo::new(&Settings::default()).map_err(|e| InjectError::Backend(e.to_string()))?;

    trace!(%chord, "Pressing chord");
    enigo
        .key(modifier(), Direction::Press)
        .map_err(|e| InjectError::KeySimulation(e.to_string()))?;

    let pressed = press_and_release(&mut enigo, chord.key(), hold);

    // The modifier is released even when the literal key failed.
    let released = enigo
        .key(modifier(), Direction::Release)
        .map_err(|e| InjectError::KeySimulation(e.to_string()));

    pressed.and(released)
}

fn press_and_release(enigo: &mut Enigo, key: char, hold: Duration) -> Result<(), InjectError> {
    enigo
        .key(Key::Unicode(key), Direction::Press)
        .map_err(|e| InjectError::KeySimulation(e.to_string()))?;
    thread::sleep(hold);
    enigo
        .key(Key::Unicode(key), Direction::Release)
        .map_err(|e| InjectError::KeySimulation(e.to_string()))
}
