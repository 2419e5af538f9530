//! Wire format of the two lookup-server endpoints.

use serde::Serialize;

use crate::address::QueriedAddress;
use crate::error::ViewError;
use crate::record::IpRecord;

pub const LOOKUP_PATH: &str = "/api/lookup";
pub const CLEAR_CACHE_PATH: &str = "/api/clear-cache";

/// Body of `POST /api/lookup`.
#[derive(Debug, Serialize)]
pub struct LookupRequest<'a> {
    pub ip: &'a str,
}

impl<'a> LookupRequest<'a> {
    pub fn new(address: &'a QueriedAddress) -> Self {
        Self {
            ip: address.as_str(),
        }
    }
}

/// Joins a base URL and an endpoint path with exactly one slash.
pub fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Parses a lookup response. A `{"error": ...}` body decodes fine; the
/// controller is the one that rejects it.
pub fn decode_lookup(body: &str) -> Result<IpRecord, ViewError> {
    IpRecord::from_json(body)
}

/// The clear-cache payload is ignored; only "is it a JSON object" matters.
pub fn decode_clear_cache(body: &str) -> Result<(), ViewError> {
    serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(body)?;
    Ok(())
}
