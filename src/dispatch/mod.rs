//! Event dispatch
//!
//! The global input hook pushes [`InputEvent`]s onto a channel. A single
//! [`Dispatcher`] task drains it: left-button events go through the selection
//! classifier, a middle press starts a paste, and the exit key ends the loop.
//! Capture and paste run on their own tasks, so the dispatcher never waits on
//! the operation lock.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::orchestrator::{CaptureOutcome, Orchestrator, PasteOutcome};
use crate::selection::{Point, SelectionClassifier};

pub mod hook;

pub use hook::{HookError, InputHook};

/// Keys selclip can recognise, e.g. as the exit key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedKey {
    End,
    Escape,
    Pause,
    ScrollLock,
    Insert,
    F12,
}

impl NamedKey {
    pub const ALL: [NamedKey; 6] = [
        NamedKey::End,
        NamedKey::Escape,
        NamedKey::Pause,
        NamedKey::ScrollLock,
        NamedKey::Insert,
        NamedKey::F12,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NamedKey::End => "End",
            NamedKey::Escape => "Escape",
            NamedKey::Pause => "Pause",
            NamedKey::ScrollLock => "ScrollLock",
            NamedKey::Insert => "Insert",
            NamedKey::F12 => "F12",
        }
    }
}

impl fmt::Display for NamedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NamedKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown key {:?} (expected one of: {})", s, names.join(", "))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Middle,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputKind {
    ButtonPress {
        button: PointerButton,
        position: Point,
    },
    ButtonRelease {
        button: PointerButton,
        position: Point,
    },
    /// `None` for keys without a [`NamedKey`]
    KeyPress(Option<NamedKey>),
}

/// An input event stamped with the time the hook saw it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputEvent {
    pub kind: InputKind,
    pub at: Instant,
}

impl InputEvent {
    pub fn now(kind: InputKind) -> Self {
        Self {
            kind,
            at: Instant::now(),
        }
    }
}

/// What the dispatcher did with one event
#[derive(Debug)]
pub enum Dispatched {
    Nothing,
    Capture(JoinHandle<CaptureOutcome>),
    Paste(JoinHandle<PasteOutcome>),
    Exit,
}

/// Why [`Dispatcher::run`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchEnd {
    /// The exit key was pressed
    ExitKey(NamedKey),
    /// The input hook dropped its end of the channel
    HookClosed,
}

/// Routes input events to the classifier and the orchestrator
pub struct Dispatcher {
    classifier: SelectionClassifier,
    orchestrator: Arc<Orchestrator>,
    exit_key: NamedKey,
}

impl Dispatcher {
    pub fn new(
        classifier: SelectionClassifier,
        orchestrator: Arc<Orchestrator>,
        exit_key: NamedKey,
    ) -> Self {
        Self {
            classifier,
            orchestrator,
            exit_key,
        }
    }

    /// Handle one event; must be called from within a tokio runtime
    pub fn handle(&mut self, event: InputEvent) -> Dispatched {
        match event.kind {
            InputKind::ButtonPress {
                button: PointerButton::Left,
                position,
            } => {
                self.classifier.on_press(position, event.at);
                Dispatched::Nothing
            }
            InputKind::ButtonRelease {
                button: PointerButton::Left,
                position,
            } => match self.classifier.on_release(position, event.at) {
                Some(classification) if classification.triggers_capture() => {
                    Dispatched::Capture(self.orchestrator.spawn_capture())
                }
                _ => Dispatched::Nothing,
            },
            InputKind::ButtonPress {
                button: PointerButton::Middle,
                ..
            } => {
                info!("Middle click detected. Triggering paste.");
                Dispatched::Paste(self.orchestrator.spawn_paste())
            }
            InputKind::KeyPress(Some(key)) if key == self.exit_key => {
                debug!(%key, "Exit key pressed");
                Dispatched::Exit
            }
            _ => Dispatched::Nothing,
        }
    }

    /// Drain `events` until the exit key is pressed or the hook goes away
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<InputEvent>) -> DispatchEnd {
        while let Some(event) = events.recv().await {
            if let Dispatched::Exit = self.handle(event) {
                return DispatchEnd::ExitKey(self.exit_key);
            }
        }
        DispatchEnd::HookClosed
    }
}
