//! Global input hook backed by rdev
//!
//! `rdev::listen` blocks its thread for the life of the process and reports
//! button events without coordinates, so the last motion position is tracked
//! here and attached to each button event.

use std::thread::{self, JoinHandle};

use rdev::{Button, EventType, Key};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::error;

use super::{InputEvent, InputKind, NamedKey, PointerButton};
use crate::selection::Point;

#[derive(Debug, Error)]
pub enum HookError {
    /// The OS refused the global hook
    #[error("Failed to listen for input events: {0}")]
    Listen(String),

    /// Hook thread could not be spawned
    #[error("Failed to spawn input hook thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Handle to the hook thread
pub struct InputHook {
    handle: JoinHandle<Result<(), HookError>>,
}

impl InputHook {
    /// Start listening; events are pushed onto `sender` without blocking
    pub fn start(sender: mpsc::UnboundedSender<InputEvent>) -> Result<Self, HookError> {
        let handle = thread::Builder::new()
            .name("selclip-input-hook".to_string())
            .spawn(move || {
                let mut translator = Translator::default();
                let result = rdev::listen(move |event| {
                    if let Some(kind) = translator.translate(&event.event_type) {
                        // A closed channel means the dispatcher is gone; the
                        // main loop notices that on its own.
                        let _ = sender.send(InputEvent::now(kind));
                    }
                });
                result.map_err(|e| {
                    let err = HookError::Listen(format!("{:?}", e));
                    error!("{}", err);
                    err
                })
            })?;

        Ok(Self { handle })
    }

    /// Whether the hook thread is still running
    pub fn is_alive(&self) -> bool {
        !self.handle.is_finished()
    }
}

/// Converts rdev events into [`InputKind`]s
#[derive(Debug, Default)]
pub(crate) struct Translator {
    position: Point,
}

impl Translator {
    pub(crate) fn translate(&mut self, event: &EventType) -> Option<InputKind> {
        match *event {
            EventType::MouseMove { x, y } => {
                self.position = Point::new(x, y);
                None
            }
            EventType::ButtonPress(button) => Some(InputKind::ButtonPress {
                button: map_button(button),
                position: self.position,
            }),
            EventType::ButtonRelease(button) => Some(InputKind::ButtonRelease {
                button: map_button(button),
                position: self.position,
            }),
            EventType::KeyPress(key) => Some(InputKind::KeyPress(map_key(key))),
            _ => None,
        }
    }
}

fn map_button(button: Button) -> PointerButton {
    match button {
        Button::Left => PointerButton::Left,
        Button::Middle => PointerButton::Middle,
        _ => PointerButton::Other,
    }
}

fn map_key(key: Key) -> Option<NamedKey> {
    match key {
        Key::End => Some(NamedKey::End),
        Key::Escape => Some(NamedKey::Escape),
        Key::Pause => Some(NamedKey::Pause),
        Key::ScrollLock => Some(NamedKey::ScrollLock),
        Key::Insert => Some(NamedKey::Insert),
        Key::F12 => Some(NamedKey::F12),
        _ => None,
    }
}
