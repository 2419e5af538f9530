use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ViewError;

/// One lookup result as delivered by the server.
///
/// Records are immutable once received; a new lookup replaces the whole
/// record. Text fields accept strings or numbers, coordinates accept numbers
/// or numeric strings, and anything else (`"Unknown"`, `null`, `""`) reads as
/// absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IpRecord {
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Older payloads carry the owner here instead of `owner`.
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub isp: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub asn: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub connection_type: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub postal: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(deserialize_with = "lenient_coordinate", skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(deserialize_with = "lenient_coordinate", skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IpRecord {
    /// A record that only carries an error indicator.
    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn from_json(text: &str) -> Result<Self, ViewError> {
        serde_json::from_str(text).map_err(Into::into)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Latitude and longitude, only when both are defined.
    pub const fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some((latitude, longitude)),
            _ => None,
        }
    }

    /// `owner`, falling back to `org`.
    pub fn owner_name(&self) -> Option<&str> {
        self.owner.as_deref().or(self.org.as_deref())
    }

    /// The address the copy control puts on the clipboard.
    pub fn copy_target(&self) -> Option<&str> {
        if self.error.is_some() {
            return None;
        }
        self.ipv4.as_deref()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Other(IgnoredAny),
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawValue>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value {
        RawValue::Text(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        RawValue::Integer(number) => Some(number.to_string()),
        RawValue::Float(number) => Some(number.to_string()),
        RawValue::Other(_) => None,
    }))
}

fn lenient_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawValue>::deserialize(deserializer)?;
    let value = raw.and_then(|value| match value {
        RawValue::Text(text) => text.trim().parse::<f64>().ok(),
        #[allow(clippy::cast_precision_loss)]
        RawValue::Integer(number) => Some(number as f64),
        RawValue::Float(number) => Some(number),
        RawValue::Other(_) => None,
    });
    Ok(value.filter(|number| number.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::IpRecord;

    #[test]
    fn parses_full_server_payload() {
        let record = IpRecord::from_json(
            r#"{
                "ipv4": "8.8.8.8",
                "ipv6": "2001:4860:4860:0:0:0:0:8888",
                "owner": "Google LLC",
                "isp": "Google",
                "asn": 15169,
                "connection_type": "business",
                "postal": "940",
                "city": "Mountain View",
                "region": "California",
                "country": "United States",
                "latitude": 37.386,
                "longitude": -122.0838
            }"#,
        )
        .unwrap();

        assert_eq!(record.ipv4.as_deref(), Some("8.8.8.8"));
        assert_eq!(record.asn.as_deref(), Some("15169"));
        assert_eq!(record.coordinates(), Some((37.386, -122.0838)));
        assert_eq!(record.error_message(), None);
    }

    #[test]
    fn placeholder_coordinates_read_as_absent() {
        let record =
            IpRecord::from_json(r#"{"ipv4": "1.2.3.4", "latitude": "Unknown", "longitude": 20}"#)
                .unwrap();

        assert_eq!(record.latitude, None);
        assert_eq!(record.longitude, Some(20.0));
        assert_eq!(record.coordinates(), None);
    }

    #[test]
    fn numeric_string_coordinates_are_accepted() {
        let record =
            IpRecord::from_json(r#"{"latitude": "51.5072", "longitude": " -0.1276 "}"#).unwrap();

        assert_eq!(record.coordinates(), Some((51.5072, -0.1276)));
    }

    #[test]
    fn zero_coordinates_are_defined() {
        let record = IpRecord::from_json(r#"{"latitude": 0, "longitude": 0}"#).unwrap();

        assert_eq!(record.coordinates(), Some((0.0, 0.0)));
    }

    #[test]
    fn empty_and_null_text_read_as_absent() {
        let record =
            IpRecord::from_json(r#"{"ipv4": "", "city": null, "isp": {"name": "x"}}"#).unwrap();

        assert_eq!(record.ipv4, None);
        assert_eq!(record.city, None);
        assert_eq!(record.isp, None);
    }

    #[test]
    fn owner_falls_back_to_org() {
        let record = IpRecord::from_json(r#"{"org": "Example Networks"}"#).unwrap();
        assert_eq!(record.owner_name(), Some("Example Networks"));

        let record =
            IpRecord::from_json(r#"{"owner": "Primary", "org": "Secondary"}"#).unwrap();
        assert_eq!(record.owner_name(), Some("Primary"));
    }

    #[test]
    fn error_payload_has_no_copy_target() {
        let record =
            IpRecord::from_json(r#"{"ipv4": "1.2.3.4", "error": "rate limited"}"#).unwrap();

        assert_eq!(record.error_message(), Some("rate limited"));
        assert_eq!(record.copy_target(), None);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let record = IpRecord::from_json(r#"{"ipv4": "1.2.3.4", "timezone": "UTC"}"#).unwrap();
        assert_eq!(record.copy_target(), Some("1.2.3.4"));
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let error = IpRecord::from_json("{not json").unwrap_err();
        assert!(matches!(error, crate::ViewError::Decode(_)));
    }
}
