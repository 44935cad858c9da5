//! Selection classifier
//!
//! Turns left-button press/release pairs into a decision: did the user just
//! select text (drag, or a double/triple click following a previous click),
//! or was it a plain click? Nothing here asks the OS whether text is really
//! selected; the capture protocol verifies that at the clipboard level.

use std::time::{Duration, Instant};

use tracing::{debug, info};

/// Pointer position in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Thresholds used to tell selections from clicks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierSettings {
    /// Press-to-release distance at or above which a gesture is a drag
    pub min_drag_distance: f64,
    /// Press duration above which a gesture is a drag
    pub max_click_duration: Duration,
    /// Largest gap between releases that still counts as a repeated click
    pub double_click_max_interval: Duration,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            min_drag_distance: 5.0,
            max_click_duration: Duration::from_millis(150),
            double_click_max_interval: Duration::from_millis(350),
        }
    }
}

/// Outcome of a left-button release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Pointer moved far enough, or the button was held long enough
    Drag,
    /// Quick click shortly after the previous release (word/line selection)
    RapidRepeat,
    /// Plain click; nothing was selected
    PlainClick,
}

impl Classification {
    /// Whether this gesture should start a capture
    pub fn triggers_capture(self) -> bool {
        !matches!(self, Classification::PlainClick)
    }
}

#[derive(Debug, Clone, Copy)]
struct PressState {
    position: Point,
    at: Instant,
}

/// Tracks one pointer's left button across press/release events
#[derive(Debug)]
pub struct SelectionClassifier {
    settings: ClassifierSettings,
    press: Option<PressState>,
    last_click: Option<Instant>,
}

impl SelectionClassifier {
    pub fn new(settings: ClassifierSettings) -> Self {
        Self {
            settings,
            press: None,
            last_click: None,
        }
    }

    /// Record a left-button press, replacing any stale one
    pub fn on_press(&mut self, position: Point, now: Instant) {
        self.press = Some(PressState { position, at: now });
    }

    /// Classify a left-button release
    ///
    /// Returns `None` when no press was recorded. Otherwise the press state
    /// is cleared and the release time becomes the new last-click time,
    /// whatever the outcome.
    pub fn on_release(&mut self, position: Point, now: Instant) -> Option<Classification> {
        let press = self.press.take()?;

        let distance = position.distance(press.position);
        let duration = now.saturating_duration_since(press.at);

        let classification = if distance >= self.settings.min_drag_distance
            || duration > self.settings.max_click_duration
        {
            info!(
                "Selection detected (D:{:.1}px, T:{:.3}s). Triggering copy.",
                distance,
                duration.as_secs_f64()
            );
            Classification::Drag
        } else if self.last_click.is_some_and(|last| {
            now.saturating_duration_since(last) <= self.settings.double_click_max_interval
        }) {
            info!("Multi-click detected. Assuming text is selected and triggering copy.");
            Classification::RapidRepeat
        } else {
            debug!(
                "Simple click detected (D:{:.1}px, T:{:.3}s). Waiting for multi-click.",
                distance,
                duration.as_secs_f64()
            );
            Classification::PlainClick
        };

        self.last_click = Some(now);
        Some(classification)
    }
}
