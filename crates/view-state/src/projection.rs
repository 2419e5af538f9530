//! Render-ready view of a record.
//!
//! Front ends never read [`IpRecord`] fields directly; they iterate
//! [`Field::ALL`] and draw whatever [`project`] hands back.

use std::time::Duration;

use serde::Serialize;

use crate::controller::ViewMode;
use crate::record::IpRecord;

pub const MAP_ZOOM: u8 = 13;
pub const AREA_RADIUS_METERS: f64 = 1000.0;
pub const MAP_UNAVAILABLE_TITLE: &str = "Map Not Available";
pub const MAP_UNAVAILABLE_DETAIL: &str = "Location coordinates could not be determined";

/// Entrance animation of the detail cards: each fades in over `CARD_FADE`,
/// starting `CARD_STAGGER` after the one before it.
pub const CARD_FADE: Duration = Duration::from_millis(600);
pub const CARD_STAGGER: Duration = Duration::from_millis(100);

/// Delay before card `index` starts fading in.
pub fn card_delay(index: usize) -> Duration {
    CARD_STAGGER.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Ipv4,
    Ipv6,
    Owner,
    Isp,
    Asn,
    ConnectionType,
    Postal,
    City,
    Region,
    Country,
    Coordinates,
}

impl Field {
    pub const ALL: [Self; 11] = [
        Self::Ipv4,
        Self::Ipv6,
        Self::Owner,
        Self::Isp,
        Self::Asn,
        Self::ConnectionType,
        Self::Postal,
        Self::City,
        Self::Region,
        Self::Country,
        Self::Coordinates,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Ipv4 => "IPv4 Address",
            Self::Ipv6 => "IPv6 Address",
            Self::Owner => "IP Owner",
            Self::Isp => "ISP Provider",
            Self::Asn => "ASN",
            Self::ConnectionType => "Connection Type",
            Self::Postal => "Postal Code (Partial)",
            Self::City => "City",
            Self::Region => "Region",
            Self::Country => "Country",
            Self::Coordinates => "Coordinates",
        }
    }

    const fn fallback(self) -> &'static str {
        match self {
            Self::Ipv4 | Self::Ipv6 => "Not available",
            _ => "Unknown",
        }
    }

    /// The display text for this field, with its fallback filled in.
    pub fn value(self, record: &IpRecord) -> String {
        let text = match self {
            Self::Ipv4 => record.ipv4.clone(),
            Self::Ipv6 => record.ipv6.clone(),
            Self::Owner => record.owner_name().map(str::to_string),
            Self::Isp => record.isp.clone(),
            Self::Asn => record.asn.clone(),
            Self::ConnectionType => record.connection_type.clone(),
            Self::Postal => record.postal.clone(),
            Self::City => record.city.clone(),
            Self::Region => record.region.clone(),
            Self::Country => record.country.clone(),
            Self::Coordinates => record
                .coordinates()
                .map(|(latitude, longitude)| format_coordinates(latitude, longitude)),
        };
        text.unwrap_or_else(|| self.fallback().to_string())
    }
}

pub fn format_coordinates(latitude: f64, longitude: f64) -> String {
    format!("{latitude:.4}, {longitude:.4}")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u8,
    pub radius_meters: f64,
    pub title: &'static str,
    pub popup: Vec<(&'static str, String)>,
}

/// Popup entries per row when the popup is folded under the map.
pub const POPUP_ROW_ENTRIES: usize = 3;

impl MapMarker {
    /// The popup entries folded onto two rows.
    pub fn popup_rows(&self) -> [&[(&'static str, String)]; 2] {
        let (first, second) = self
            .popup
            .split_at(self.popup.len().min(POPUP_ROW_ENTRIES));
        [first, second]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapView {
    Present(MapMarker),
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Projection {
    /// Replaces the whole content area; nothing else is rendered.
    Error { message: String },
    Details {
        fields: Vec<(Field, String)>,
        map: MapView,
    },
}

impl Projection {
    pub fn field(&self, field: Field) -> Option<&str> {
        match self {
            Self::Error { .. } => None,
            Self::Details { fields, .. } => fields
                .iter()
                .find(|(candidate, _)| *candidate == field)
                .map(|(_, value)| value.as_str()),
        }
    }

    pub const fn map(&self) -> Option<&MapView> {
        match self {
            Self::Error { .. } => None,
            Self::Details { map, .. } => Some(map),
        }
    }

    pub const fn is_map_present(&self) -> bool {
        matches!(
            self,
            Self::Details {
                map: MapView::Present(_),
                ..
            }
        )
    }
}

pub fn project(record: &IpRecord, mode: ViewMode) -> Projection {
    if let Some(message) = record.error_message() {
        return Projection::Error {
            message: message.to_string(),
        };
    }

    let fields = Field::ALL
        .iter()
        .map(|field| (*field, field.value(record)))
        .collect();

    let map = record
        .coordinates()
        .map_or(MapView::Unavailable, |(latitude, longitude)| {
            MapView::Present(marker(record, mode, latitude, longitude))
        });

    Projection::Details { fields, map }
}

fn marker(record: &IpRecord, mode: ViewMode, latitude: f64, longitude: f64) -> MapMarker {
    let unknown = |value: Option<&str>| value.unwrap_or("Unknown").to_string();

    MapMarker {
        latitude,
        longitude,
        zoom: MAP_ZOOM,
        radius_meters: AREA_RADIUS_METERS,
        title: match mode {
            ViewMode::SelfIp => "Your Location",
            ViewMode::Search => "Location",
        },
        popup: vec![
            ("IP", unknown(record.ipv4.as_deref())),
            ("Owner", unknown(record.owner_name())),
            ("ISP", unknown(record.isp.as_deref())),
            ("City", unknown(record.city.as_deref())),
            ("Country", unknown(record.country.as_deref())),
            ("Coordinates", format_coordinates(latitude, longitude)),
        ],
    }
}
