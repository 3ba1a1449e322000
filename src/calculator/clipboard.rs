//! Copy calculator results to the system clipboard.

use arboard::Clipboard;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("nothing to copy")]
    Nothing,
    #[error("failed to access clipboard: {0}")]
    Access(#[source] arboard::Error),
    #[error("failed to copy to clipboard: {0}")]
    Write(#[source] arboard::Error),
}

/// Copy a result to the clipboard. Blank text is refused.
pub fn copy_result(text: &str) -> Result<(), ClipboardError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ClipboardError::Nothing);
    }

    let mut clipboard = Clipboard::new().map_err(ClipboardError::Access)?;
    clipboard
        .set_text(text.to_string())
        .map_err(ClipboardError::Write)?;

    debug!(text, "Copied result to clipboard");
    Ok(())
}
