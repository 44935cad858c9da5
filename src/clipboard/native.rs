//! System clipboard provider backed by arboard
//!
//! arboard calls block, so every operation runs on the blocking pool with a
//! fresh `arboard::Clipboard` handle. Windows only lets one process open the
//! clipboard at a time; an occupied clipboard is retried a few times before
//! the operation gives up.

use std::thread;
use std::time::Duration;

use async_trait::async_trait;

use super::{ClipboardError, ClipboardProvider};

/// Attempts made while another process holds the clipboard
const OCCUPIED_RETRIES: u32 = 3;

/// Pause between attempts on an occupied clipboard
const OCCUPIED_BACKOFF: Duration = Duration::from_millis(10);

/// Native clipboard provider
pub struct NativeClipboard;

impl NativeClipboard {
    /// Create a new provider, failing early if no clipboard is reachable
    pub fn new() -> Result<Self, ClipboardError> {
        arboard::Clipboard::new().map_err(map_error)?;
        Ok(Self)
    }
}

#[async_trait]
impl ClipboardProvider for NativeClipboard {
    async fn get_text(&self) -> Result<String, ClipboardError> {
        tokio::task::spawn_blocking(|| {
            with_retry(|| {
                let mut clipboard = arboard::Clipboard::new().map_err(map_error)?;
                clipboard.get_text().map_err(map_error)
            })
        })
        .await
        .map_err(|e| ClipboardError::Task(e.to_string()))?
    }

    async fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        let text = text.to_owned();

        tokio::task::spawn_blocking(move || {
            with_retry(|| {
                let mut clipboard = arboard::Clipboard::new().map_err(map_error)?;
                clipboard.set_text(text.as_str()).map_err(map_error)
            })
        })
        .await
        .map_err(|e| ClipboardError::Task(e.to_string()))?
    }

    fn name(&self) -> &'static str {
        "native"
    }
}

fn with_retry<T>(
    mut op: impl FnMut() -> Result<T, ClipboardError>,
) -> Result<T, ClipboardError> {
    let mut attempt = 1;
    loop {
        match op() {
            Err(ClipboardError::Occupied) if attempt < OCCUPIED_RETRIES => {
                attempt += 1;
                thread::sleep(OCCUPIED_BACKOFF);
            }
            result => return result,
        }
    }
}

fn map_error(err: arboard::Error) -> ClipboardError {
    match err {
        arboard::Error::ContentNotAvailable => ClipboardError::NoContent,
        arboard::Error::ClipboardOccupied => ClipboardError::Occupied,
        other => ClipboardError::Platform(other.to_string()),
    }
}
