use base64::Engine;
use ipgeo_view::ViewError;
use std::io::Write;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("system clipboard: {0}")]
    System(#[from] arboard::Error),

    #[error("terminal clipboard: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Which path actually took the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyRoute {
    System,
    Terminal,
}

/// System clipboard first, then an OSC 52 escape through the terminal.
/// Only when both fail does the caller get an error.
pub fn copy_text(text: &str) -> Result<CopyRoute, ViewError> {
    let system = match system_copy(text) {
        Ok(()) => return Ok(CopyRoute::System),
        Err(e) => e,
    };
    log::debug!("{system}, falling back to OSC 52");

    osc52_copy(&mut std::io::stdout(), text)
        .map(|()| CopyRoute::Terminal)
        .map_err(|terminal| ViewError::ClipboardUnavailable(format!("{system}; {terminal}")))
}

fn system_copy(text: &str) -> Result<(), ClipboardError> {
    arboard::Clipboard::new()
        .and_then(|mut clipboard| clipboard.set_text(text.to_string()))
        .map_err(ClipboardError::from)
}

pub fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x07")
}

/// Bypasses the ratatui buffer and writes straight to the terminal.
fn osc52_copy(out: &mut impl Write, text: &str) -> Result<(), ClipboardError> {
    out.write_all(osc52_sequence(text).as_bytes())?;
    out.flush()?;
    Ok(())
}
