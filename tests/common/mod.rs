//! Shared fakes for protocol tests
//!
//! `FakeClipboard` and `FakeApp` append every clipboard read/write and every
//! chord to one shared trace, in the order they happen.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use selclip::clipboard::{ClipboardError, ClipboardGateway, ClipboardProvider};
use selclip::inject::{Chord, InjectError, KeyInjector};
use selclip::orchestrator::{Orchestrator, Timings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Read(String),
    Write(String),
    Chord(Chord),
}

pub type Trace = Arc<Mutex<Vec<Op>>>;

pub struct FakeClipboard {
    content: Mutex<String>,
    trace: Trace,
}

impl FakeClipboard {
    pub fn current(&self) -> String {
        self.content.lock().unwrap().clone()
    }

    /// Another application sets the clipboard (not traced)
    pub fn external_set(&self, text: &str) {
        *self.content.lock().unwrap() = text.to_string();
    }
}

#[async_trait]
impl ClipboardProvider for FakeClipboard {
    async fn get_text(&self) -> Result<String, ClipboardError> {
        let text = self.current();
        self.trace.lock().unwrap().push(Op::Read(text.clone()));
        Ok(text)
    }

    async fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.trace.lock().unwrap().push(Op::Write(text.to_string()));
        self.external_set(text);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Focused application: each copy chord puts the next queued selection on
/// the clipboard after `latency`. With nothing queued it ignores the chord.
pub struct FakeApp {
    clipboard: Arc<FakeClipboard>,
    selections: Mutex<VecDeque<String>>,
    latency: Duration,
    trace: Trace,
}

impl FakeApp {
    pub fn select(&self, text: &str) {
        self.selections.lock().unwrap().push_back(text.to_string());
    }
}

#[async_trait]
impl KeyInjector for FakeApp {
    async fn send_chord(&self, chord: Chord, _hold: Duration) -> Result<(), InjectError> {
        self.trace.lock().unwrap().push(Op::Chord(chord));
        if chord == Chord::Copy {
            if let Some(selection) = self.selections.lock().unwrap().pop_front() {
                let clipboard = Arc::clone(&self.clipboard);
                let latency = self.latency;
                tokio::spawn(async move {
                    tokio::time::sleep(latency).await;
                    clipboard.external_set(&selection);
                });
            }
        }
        Ok(())
    }
}

pub struct Harness {
    pub clipboard: Arc<FakeClipboard>,
    pub app: Arc<FakeApp>,
    pub orchestrator: Arc<Orchestrator>,
    pub trace: Trace,
}

impl Harness {
    pub fn new(initial: &str, latency: Duration) -> Self {
        let trace: Trace = Arc::new(Mutex::new(Vec::new()));
        let clipboard = Arc::new(FakeClipboard {
            content: Mutex::new(initial.to_string()),
            trace: Arc::clone(&trace),
        });
        let app = Arc::new(FakeApp {
            clipboard: Arc::clone(&clipboard),
            selections: Mutex::new(VecDeque::new()),
            latency,
            trace: Arc::clone(&trace),
        });
        let orchestrator = Arc::new(Orchestrator::new(
            ClipboardGateway::new(Arc::clone(&clipboard) as Arc<dyn ClipboardProvider>),
            Arc::clone(&app) as Arc<dyn KeyInjector>,
            Timings::default(),
        ));

        Self {
            clipboard,
            app,
            orchestrator,
            trace,
        }
    }

    pub fn trace(&self) -> Vec<Op> {
        self.trace.lock().unwrap().clone()
    }
}

/// One complete protocol run recovered from a trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Capture { original: String, polls: usize },
    Paste { original: String, pasted: String },
}

/// Split a trace into back-to-back complete operations
///
/// Fails if steps of two operations interleave or an operation does not
/// end by restoring the clipboard it started from.
pub fn split_operations(trace: &[Op]) -> Result<Vec<Operation>, String> {
    let mut ops = trace.iter().peekable();
    let mut operations = Vec::new();

    while let Some(first) = ops.next() {
        let original = match first {
            Op::Read(text) => text.clone(),
            other => return Err(format!("operation starts with {:?}", other)),
        };

        match ops.next() {
            Some(Op::Chord(Chord::Copy)) => {
                let mut polls = 0;
                while let Some(Op::Read(_)) = ops.peek() {
                    ops.next();
                    polls += 1;
                }
                match ops.next() {
                    Some(Op::Write(restored)) if *restored == original => {}
                    other => return Err(format!("capture ended with {:?}", other)),
                }
                operations.push(Operation::Capture { original, polls });
            }
            Some(Op::Write(pasted)) => {
                let pasted = pasted.clone();
                match ops.next() {
                    Some(Op::Chord(Chord::Paste)) => {}
                    other => return Err(format!("paste chord missing, got {:?}", other)),
                }
                match ops.next() {
                    Some(Op::Write(restored)) if *restored == original => {}
                    other => return Err(format!("paste ended with {:?}", other)),
                }
                operations.push(Operation::Paste { original, pasted });
            }
            other => return Err(format!("unexpected step {:?} after snapshot", other)),
        }
    }

    Ok(operations)
}
