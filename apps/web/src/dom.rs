//! Thin wrappers over the page: the embedded record, the clock, reload,
//! prompts and the clipboard.

use std::time::Duration;

use ipgeo_view::{IpRecord, ViewError};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlDocument, HtmlTextAreaElement};

pub const RECORD_ELEMENT_ID: &str = "ip-data";

/// Reads the record the host page embedded before the app started.
pub fn initial_record() -> IpRecord {
    let text = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(RECORD_ELEMENT_ID))
        .and_then(|element| element.text_content());

    record_from_text(text.as_deref())
}

fn record_from_text(text: Option<&str>) -> IpRecord {
    let Some(text) = text.map(str::trim).filter(|text| !text.is_empty()) else {
        log::error!("No #{RECORD_ELEMENT_ID} element on the page");
        return IpRecord::from_error("IP data unavailable");
    };

    IpRecord::from_json(text).unwrap_or_else(|error| {
        log::error!("Failed to parse #{RECORD_ELEMENT_ID}: {error}");
        IpRecord::from_error(format!("IP data unavailable: {error}"))
    })
}

/// Milliseconds since page load, as the dashboard clock.
pub fn now() -> Duration {
    let millis = web_sys::window()
        .and_then(|window| window.performance())
        .map_or(0.0, |performance| performance.now());

    from_millis(millis)
}

fn from_millis(millis: f64) -> Duration {
    Duration::try_from_secs_f64(millis / 1000.0).unwrap_or_default()
}

pub fn reload() -> Result<(), ViewError> {
    let window = web_sys::window().ok_or_else(|| ViewError::NetworkFailure("no window".into()))?;
    window
        .location()
        .reload()
        .map_err(|error| ViewError::NetworkFailure(format!("{error:?}")))
}

pub fn alert(message: &str) {
    let shown = web_sys::window().map(|window| window.alert_with_message(message));
    if !matches!(shown, Some(Ok(()))) {
        log::warn!("Could not show alert: {message}");
    }
}

/// `navigator.clipboard` first, then a hidden textarea and `execCommand`.
/// Only a failure of both is reported.
pub async fn copy_text(text: String) -> Result<(), ViewError> {
    let Some(window) = web_sys::window() else {
        return Err(ViewError::ClipboardUnavailable("no window".to_string()));
    };

    match write_clipboard(&window, &text).await {
        Ok(()) => return Ok(()),
        Err(error) => log::warn!("Clipboard API unavailable, falling back: {error:?}"),
    }

    copy_with_textarea(&window, &text)
        .map_err(|error| ViewError::ClipboardUnavailable(format!("{error:?}")))
}

async fn write_clipboard(window: &web_sys::Window, text: &str) -> Result<(), JsValue> {
    let navigator = window.navigator();
    // Absent outside secure contexts.
    let clipboard = js_sys::Reflect::get(&navigator, &JsValue::from_str("clipboard"))?;
    if clipboard.is_undefined() || clipboard.is_null() {
        return Err(JsValue::from_str("navigator.clipboard is missing"));
    }

    JsFuture::from(navigator.clipboard().write_text(text)).await?;
    Ok(())
}

fn copy_with_textarea(window: &web_sys::Window, text: &str) -> Result<(), JsValue> {
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("no body"))?;

    let textarea = document
        .create_element("textarea")?
        .dyn_into::<HtmlTextAreaElement>()?;
    textarea.set_value(text);
    textarea.style().set_property("position", "fixed")?;
    textarea.style().set_property("opacity", "0")?;
    body.append_child(&textarea)?;
    textarea.select();

    let copied = document.dyn_into::<HtmlDocument>()?.exec_command("copy");
    textarea.remove();

    if copied? {
        Ok(())
    } else {
        Err(JsValue::from_str("execCommand(\"copy\") was refused"))
    }
}
