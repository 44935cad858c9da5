//! Clipboard abstraction layer for the single system clipboard text slot
//!
//! Providers expose the slot through fallible operations. [`ClipboardGateway`]
//! sits on top of a provider and is the only thing the rest of the crate
//! talks to: a failed read comes back as empty text and a failed write is a
//! no-op, both logged at diagnostic verbosity.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

pub mod native;

pub use native::NativeClipboard;

/// Number of characters of clipboard text shown in log messages
pub const PREVIEW_CHARS: usize = 50;

/// Clipboard provider trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClipboardProvider: Send + Sync {
    /// Get current clipboard text
    async fn get_text(&self) -> Result<String, ClipboardError>;

    /// Replace the whole clipboard content with `text`
    async fn set_text(&self, text: &str) -> Result<(), ClipboardError>;

    /// Get provider name
    fn name(&self) -> &'static str;
}

/// Clipboard errors
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// Platform-specific error
    #[error("Platform error: {0}")]
    Platform(String),

    /// Another process holds the clipboard
    #[error("Clipboard is occupied by another process")]
    Occupied,

    /// Clipboard is empty or holds a non-text format
    #[error("No text content available")]
    NoContent,

    /// Blocking worker failed
    #[error("Clipboard task failed: {0}")]
    Task(String),
}

/// Best-effort access to the system clipboard
///
/// Cloning is cheap; all clones share the same provider.
#[derive(Clone)]
pub struct ClipboardGateway {
    provider: Arc<dyn ClipboardProvider>,
}

impl ClipboardGateway {
    pub fn new(provider: Arc<dyn ClipboardProvider>) -> Self {
        Self { provider }
    }

    /// Read the clipboard text, or empty text if it cannot be read
    pub async fn read(&self) -> String {
        match self.provider.get_text().await {
            Ok(text) => text,
            Err(ClipboardError::NoContent) => String::new(),
            Err(e) => {
                debug!(provider = self.provider.name(), error = %e, "Error reading clipboard");
                String::new()
            }
        }
    }

    /// Replace the clipboard text; failures are logged and dropped
    pub async fn write(&self, text: &str) {
        if let Err(e) = self.provider.set_text(text).await {
            debug!(provider = self.provider.name(), error = %e, "Error writing clipboard");
        }
    }
}

/// Create a clipboard provider for the current platform
pub fn create_provider() -> Result<Arc<dyn ClipboardProvider>, ClipboardError> {
    Ok(Arc::new(NativeClipboard::new()?))
}

/// Quoted, truncated rendering of clipboard text for log output
pub fn preview(text: &str) -> String {
    let head: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{:?}", head)
}
