//! # selclip
//!
//! Linux-style selection clipboard for desktops that only have one system
//! clipboard.
//!
//! Selecting text with the mouse copies it into a private "special" slot;
//! a middle click types it at the cursor. Both directions go through the
//! system clipboard for a moment and then put it back, so its visible
//! content never changes at rest.

pub mod cli;
pub mod clipboard;
pub mod config;
pub mod dispatch;
pub mod inject;
pub mod logging;
pub mod orchestrator;
pub mod selection;

pub use config::Config;

/// Result type alias for selclip operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for selclip operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Clipboard operation error
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] clipboard::ClipboardError),

    /// Key injection error
    #[error("Key injection error: {0}")]
    Inject(#[from] inject::InjectError),

    /// Input hook error
    #[error("Input hook error: {0}")]
    Hook(#[from] dispatch::HookError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
