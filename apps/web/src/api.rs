use ipgeo_view::api::{endpoint, LookupRequest, CLEAR_CACHE_PATH, LOOKUP_PATH};
use ipgeo_view::{IpRecord, QueriedAddress, ViewError};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

/// Looks up `address` on the server that served the page. Like the terminal
/// client, error bodies come back as `Ok` records whatever the status code.
pub async fn lookup(address: &QueriedAddress) -> Result<IpRecord, ViewError> {
    let body = serde_json::to_string(&LookupRequest::new(address))?;
    log::debug!("Looking up {address}");

    let json = post_json(LOOKUP_PATH, Some(&body)).await?;
    serde_wasm_bindgen::from_value::<IpRecord>(json).map_err(|e| ViewError::Decode(e.to_string()))
}

pub async fn clear_cache() -> Result<(), ViewError> {
    log::debug!("Clearing server cache");

    let json = post_json(CLEAR_CACHE_PATH, None).await?;
    serde_wasm_bindgen::from_value::<serde_json::Map<String, serde_json::Value>>(json)
        .map_err(|e| ViewError::Decode(e.to_string()))?;
    Ok(())
}

async fn post_json(path: &str, body: Option<&str>) -> Result<JsValue, ViewError> {
    let Some(window) = web_sys::window() else {
        return Err(ViewError::NetworkFailure("no window".to_string()));
    };

    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::SameOrigin);
    if let Some(body) = body {
        let headers = Headers::new().map_err(network_failure)?;
        headers
            .set("Content-Type", "application/json")
            .map_err(network_failure)?;
        opts.set_headers(&headers);
        opts.set_body(&JsValue::from_str(body));
    }

    let request =
        Request::new_with_str_and_init(&endpoint("", path), &opts).map_err(network_failure)?;

    let response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(network_failure)?
        .dyn_into::<Response>()
        .map_err(network_failure)?;

    if !response.ok() {
        log::warn!("{path} answered {}", response.status());
    }

    let json = response.json().map_err(decode_failure)?;
    JsFuture::from(json).await.map_err(decode_failure)
}

fn network_failure(error: impl Into<JsValue>) -> ViewError {
    ViewError::NetworkFailure(describe(&error.into()))
}

fn decode_failure(error: JsValue) -> ViewError {
    ViewError::Decode(describe(&error))
}

/// Browsers reject fetches with `TypeError`s whose message is the only
/// useful part.
fn describe(error: &JsValue) -> String {
    error
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| error.as_string())
        .unwrap_or_else(|| format!("{error:?}"))
}
