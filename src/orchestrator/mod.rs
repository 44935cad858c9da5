//! Capture and paste protocols
//!
//! Both protocols touch the shared system clipboard and put it back the way
//! they found it. They run under one operation lock, so at most one of them
//! is in flight process-wide; a trigger that arrives meanwhile waits its turn
//! and runs after the current one has restored the clipboard.
//!
//! Lock order is operation lock, then special slot lock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, trace, warn};

use crate::clipboard::{preview, ClipboardGateway};
use crate::inject::{Chord, KeyInjector};

/// Delays used by the capture and paste protocols
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timings {
    /// How long the copy key is held down
    pub copy_press_duration: Duration,
    /// How long the paste key is held down
    pub paste_press_duration: Duration,
    /// Debounce before the clipboard snapshot, so the selection settles
    pub wait_before_copy: Duration,
    /// Upper bound on waiting for the target application to update the clipboard
    pub clipboard_timeout: Duration,
    /// Gap between clipboard polls
    pub clipboard_check_interval: Duration,
    /// Pause before a capture restores the clipboard
    pub copy_restore_delay: Duration,
    /// Pause between writing the clipboard and sending the paste chord
    pub paste_settle_delay: Duration,
    /// Pause before a paste restores the clipboard
    pub paste_restore_delay: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            copy_press_duration: Duration::from_millis(50),
            paste_press_duration: Duration::from_millis(50),
            wait_before_copy: Duration::from_millis(50),
            clipboard_timeout: Duration::from_millis(500),
            clipboard_check_interval: Duration::from_millis(50),
            copy_restore_delay: Duration::from_millis(10),
            paste_settle_delay: Duration::from_millis(20),
            paste_restore_delay: Duration::from_millis(80),
        }
    }
}

/// The private selection clipboard
#[derive(Debug, Default)]
pub struct SpecialSlot {
    text: Mutex<String>,
}

impl SpecialSlot {
    pub fn get(&self) -> String {
        self.text
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn set(&self, text: String) {
        *self
            .text
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = text;
    }
}

/// Result of one capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// New text landed in the special slot (length in chars)
    Stored(usize),
    /// Nothing new was copied; the special slot kept its value
    Unchanged,
}

/// Result of one paste
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteOutcome {
    Pasted,
    /// The special slot was empty; the clipboard was not touched
    EmptySlot,
}

/// Runs capture and paste against the system clipboard
pub struct Orchestrator {
    clipboard: ClipboardGateway,
    injector: Arc<dyn KeyInjector>,
    timings: Timings,
    operation_lock: AsyncMutex<()>,
    special: SpecialSlot,
}

impl Orchestrator {
    pub fn new(
        clipboard: ClipboardGateway,
        injector: Arc<dyn KeyInjector>,
        timings: Timings,
    ) -> Self {
        Self {
            clipboard,
            injector,
            timings,
            operation_lock: AsyncMutex::new(()),
            special: SpecialSlot::default(),
        }
    }

    /// Copy the current selection into the special slot
    pub async fn capture(&self) -> CaptureOutcome {
        debug!("Starting capture");
        let _operation = self.operation_lock.lock().await;

        sleep(self.timings.wait_before_copy).await;
        let original = self.clipboard.read().await;
        debug!(original = %preview(&original), "Original clipboard saved");

        let captured = match self
            .injector
            .send_chord(Chord::Copy, self.timings.copy_press_duration)
            .await
        {
            Ok(()) => Some(self.wait_for_change(&original).await),
            Err(e) => {
                warn!(error = %e, "Failed to send copy chord");
                None
            }
        };

        let outcome = match captured {
            Some(text) if is_new_text(&text, &original) => {
                debug!(captured = %preview(&text), "Captured text");
                let chars = text.chars().count();
                self.special.set(text);
                info!("Stored in special clipboard: {} chars", chars);
                CaptureOutcome::Stored(chars)
            }
            _ => {
                info!("Skipped storing to special clipboard (empty or identical content)");
                CaptureOutcome::Unchanged
            }
        };

        sleep(self.timings.copy_restore_delay).await;
        self.clipboard.write(&original).await;
        debug!("Original clipboard restored");

        debug!("Finished capture");
        outcome
    }

    /// Type the special slot's text at the cursor
    pub async fn paste(&self) -> PasteOutcome {
        debug!("Starting paste");
        let _operation = self.operation_lock.lock().await;

        let to_paste = self.special.get();
        if to_paste.is_empty() {
            info!("Special clipboard is empty. Nothing to paste.");
            return PasteOutcome::EmptySlot;
        }

        debug!(text = %preview(&to_paste), "Pasting");
        let original = self.clipboard.read().await;
        self.clipboard.write(&to_paste).await;
        sleep(self.timings.paste_settle_delay).await;

        if let Err(e) = self
            .injector
            .send_chord(Chord::Paste, self.timings.paste_press_duration)
            .await
        {
            warn!(error = %e, "Failed to send paste chord");
        }

        sleep(self.timings.paste_restore_delay).await;
        self.clipboard.write(&original).await;
        debug!("Original clipboard restored after paste");

        debug!("Finished paste");
        PasteOutcome::Pasted
    }

    /// Run [`Orchestrator::capture`] on its own task
    pub fn spawn_capture(self: &Arc<Self>) -> JoinHandle<CaptureOutcome> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.capture().await })
    }

    /// Run [`Orchestrator::paste`] on its own task
    pub fn spawn_paste(self: &Arc<Self>) -> JoinHandle<PasteOutcome> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.paste().await })
    }

    /// Current special slot content
    pub fn special_text(&self) -> String {
        self.special.get()
    }

    /// Poll until the clipboard holds new text or the timeout runs out
    ///
    /// On timeout one more read is taken and returned as-is.
    async fn wait_for_change(&self, original: &str) -> String {
        let start = Instant::now();
        while start.elapsed() < self.timings.clipboard_timeout {
            sleep(self.timings.clipboard_check_interval).await;
            let current = self.clipboard.read().await;
            if is_new_text(&current, original) {
                debug!(
                    "Clipboard changed after {:.3}s. Proceeding.",
                    start.elapsed().as_secs_f64()
                );
                return current;
            }
            trace!(
                "Clipboard content check ({:.3}s): no change yet.",
                start.elapsed().as_secs_f64()
            );
        }

        info!(
            "No clipboard change detected within {:.3}s; using last read.",
            self.timings.clipboard_timeout.as_secs_f64()
        );
        self.clipboard.read().await
    }
}

fn is_new_text(candidate: &str, original: &str) -> bool {
    !candidate.is_empty() && candidate != original
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::{ClipboardError, ClipboardProvider};
    use crate::inject::InjectError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeClipboard {
        content: Mutex<String>,
        reads: AtomicUsize,
        writes: Mutex<Vec<String>>,
    }

    impl FakeClipboard {
        fn with_text(text: &str) -> Arc<Self> {
            let fake = Self::default();
            *fake.content.lock().unwrap() = text.to_string();
            Arc::new(fake)
        }

        fn current(&self) -> String {
            self.content.lock().unwrap().clone()
        }

        // Simulates another application writing the clipboard.
        fn external_set(&self, text: &str) {
            *self.content.lock().unwrap() = text.to_string();
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }

        fn writes(&self) -> Vec<String> {
            self.writes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ClipboardProvider for FakeClipboard {
        async fn get_text(&self) -> Result<String, ClipboardError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.current())
        }

        async fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
            self.writes.lock().unwrap().push(text.to_string());
            self.external_set(text);
            Ok(())
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    /// Target application: answers a copy chord by putting `selection` on
    /// the clipboard after `latency`.
    struct FakeApp {
        clipboard: Arc<FakeClipboard>,
        selection: Option<String>,
        latency: Duration,
        fail: bool,
        chords: Mutex<Vec<Chord>>,
    }

    impl FakeApp {
        fn new(
            clipboard: &Arc<FakeClipboard>,
            selection: Option<&str>,
            latency: Duration,
        ) -> Arc<Self> {
            Arc::new(Self {
                clipboard: Arc::clone(clipboard),
                selection: selection.map(str::to_string),
                latency,
                fail: false,
                chords: Mutex::new(Vec::new()),
            })
        }

        fn failing(clipboard: &Arc<FakeClipboard>) -> Arc<Self> {
            Arc::new(Self {
                clipboard: Arc::clone(clipboard),
                selection: None,
                latency: Duration::ZERO,
                fail: true,
                chords: Mutex::new(Vec::new()),
            })
        }

        fn chords(&self) -> Vec<Chord> {
            self.chords.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl KeyInjector for FakeApp {
        async fn send_chord(&self, chord: Chord, _hold: Duration) -> Result<(), InjectError> {
            if self.fail {
                return Err(InjectError::Backend("no display".to_string()));
            }
            self.chords.lock().unwrap().push(chord);
            if let (Chord::Copy, Some(selection)) = (chord, self.selection.clone()) {
                let clipboard = Arc::clone(&self.clipboard);
                let latency = self.latency;
                tokio::spawn(async move {
                    sleep(latency).await;
                    clipboard.external_set(&selection);
                });
            }
            Ok(())
        }
    }

    fn orchestrator(clipboard: &Arc<FakeClipboard>, app: &Arc<FakeApp>) -> Orchestrator {
        Orchestrator::new(
            ClipboardGateway::new(Arc::clone(clipboard) as Arc<dyn ClipboardProvider>),
            Arc::clone(app) as Arc<dyn KeyInjector>,
            Timings::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_paste_with_empty_slot_never_touches_clipboard() {
        let clipboard = FakeClipboard::with_text("user text");
        let app = FakeApp::new(&clipboard, None, Duration::ZERO);
        let orch = orchestrator(&clipboard, &app);

        assert_eq!(orch.paste().await, PasteOutcome::EmptySlot);
        assert_eq!(clipboard.reads(), 0);
        assert!(clipboard.writes().is_empty());
        assert!(app.chords().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_stores_selection_and_restores() {
        let clipboard = FakeClipboard::with_text("user text");
        let app = FakeApp::new(&clipboard, Some("selected words"), Duration::from_millis(70));
        let orch = orchestrator(&clipboard, &app);

        assert_eq!(orch.capture().await, CaptureOutcome::Stored(14));
        assert_eq!(orch.special_text(), "selected words");
        assert_eq!(clipboard.current(), "user text");
        assert_eq!(clipboard.writes(), vec!["user text".to_string()]);
        assert_eq!(app.chords(), vec![Chord::Copy]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_stops_polling_on_first_change() {
        let clipboard = FakeClipboard::with_text("user text");
        let app = FakeApp::new(&clipboard, Some("quick"), Duration::from_millis(10));
        let orch = orchestrator(&clipboard, &app);

        orch.capture().await;

        // snapshot + the first poll
        assert_eq!(clipboard.reads(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_without_change_keeps_slot() {
        let clipboard = FakeClipboard::with_text("user text");
        let app = FakeApp::new(&clipboard, None, Duration::ZERO);
        let orch = orchestrator(&clipboard, &app);
        orch.special.set("earlier capture".to_string());

        assert_eq!(orch.capture().await, CaptureOutcome::Unchanged);
        assert_eq!(orch.special_text(), "earlier capture");
        assert_eq!(clipboard.current(), "user text");
        // snapshot + ten polls over the 500ms window + fallback read
        assert_eq!(clipboard.reads(), 12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_late_change_is_stored() {
        let clipboard = FakeClipboard::with_text("user text");
        let app = FakeApp::new(&clipboard, Some("late"), Duration::from_millis(480));
        let orch = orchestrator(&clipboard, &app);

        assert_eq!(orch.capture().await, CaptureOutcome::Stored(4));
        assert_eq!(orch.special_text(), "late");
        assert_eq!(clipboard.current(), "user text");
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_ignores_emptied_clipboard() {
        let clipboard = FakeClipboard::with_text("user text");
        let app = FakeApp::new(&clipboard, Some(""), Duration::from_millis(10));
        let orch = orchestrator(&clipboard, &app);

        assert_eq!(orch.capture().await, CaptureOutcome::Unchanged);
        assert_eq!(orch.special_text(), "");
        assert_eq!(clipboard.current(), "user text");
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_chord_failure_still_restores() {
        let clipboard = FakeClipboard::with_text("user text");
        let app = FakeApp::failing(&clipboard);
        let orch = orchestrator(&clipboard, &app);

        assert_eq!(orch.capture().await, CaptureOutcome::Unchanged);
        assert_eq!(clipboard.reads(), 1);
        assert_eq!(clipboard.writes(), vec!["user text".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paste_writes_then_restores() {
        let clipboard = FakeClipboard::with_text("user text");
        let app = FakeApp::new(&clipboard, None, Duration::ZERO);
        let orch = orchestrator(&clipboard, &app);
        orch.special.set("selection".to_string());

        assert_eq!(orch.paste().await, PasteOutcome::Pasted);
        assert_eq!(
            clipboard.writes(),
            vec!["selection".to_string(), "user text".to_string()]
        );
        assert_eq!(clipboard.current(), "user text");
        assert_eq!(app.chords(), vec![Chord::Paste]);
        assert_eq!(orch.special_text(), "selection");
    }

    #[tokio::test(start_paused = true)]
    async fn test_paste_chord_failure_still_restores() {
        let clipboard = FakeClipboard::with_text("user text");
        let app = FakeApp::failing(&clipboard);
        let orch = orchestrator(&clipboard, &app);
        orch.special.set("selection".to_string());

        assert_eq!(orch.paste().await, PasteOutcome::Pasted);
        assert_eq!(clipboard.current(), "user text");
    }

    #[test]
    fn test_is_new_text() {
        assert!(is_new_text("b", "a"));
        assert!(!is_new_text("a", "a"));
        assert!(!is_new_text("", "a"));
        assert!(is_new_text("a", ""));
    }
}
