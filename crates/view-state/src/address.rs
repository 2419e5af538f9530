use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ViewError;

#[allow(clippy::expect_used)]
static IPV4_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{1,3})\.([0-9]{1,3})\.([0-9]{1,3})\.([0-9]{1,3})$")
        .expect("IPv4 pattern compiles")
});

#[allow(clippy::expect_used)]
static IPV6_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4}$").expect("IPv6 pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    pub const fn label(self) -> &'static str {
        match self {
            Self::V4 => "IPv4",
            Self::V6 => "IPv6",
        }
    }
}

/// A search query that passed literal-syntax validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueriedAddress {
    text: String,
    ip: IpAddr,
}

impl QueriedAddress {
    /// Accepts a dotted quad with every group at most 255, or exactly eight
    /// colon-separated hex groups. `::` shorthand is rejected.
    pub fn parse(input: &str) -> Result<Self, ViewError> {
        let text = input.trim();

        if let Some(ip) = parse_ipv4(text) {
            return Ok(Self {
                text: text.to_string(),
                ip: IpAddr::V4(ip),
            });
        }

        if let Some(ip) = parse_ipv6(text) {
            return Ok(Self {
                text: text.to_string(),
                ip: IpAddr::V6(ip),
            });
        }

        Err(ViewError::InvalidAddress(text.to_string()))
    }

    /// The address as the user typed it, minus surrounding whitespace.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub const fn ip(&self) -> IpAddr {
        self.ip
    }

    pub const fn family(&self) -> AddressFamily {
        match self.ip {
            IpAddr::V4(_) => AddressFamily::V4,
            IpAddr::V6(_) => AddressFamily::V6,
        }
    }

    /// True for private, loopback, link-local and unspecified ranges.
    pub fn is_private(&self) -> bool {
        match self.ip {
            IpAddr::V4(ip) => {
                ip.is_private() || ip.is_loopback() || ip.is_link_local() || ip.is_unspecified()
            }
            IpAddr::V6(ip) => {
                let first = ip.segments()[0];
                ip.is_loopback()
                    || ip.is_unspecified()
                    || (first & 0xfe00) == 0xfc00
                    || (first & 0xffc0) == 0xfe80
            }
        }
    }
}

impl fmt::Display for QueriedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn parse_ipv4(text: &str) -> Option<Ipv4Addr> {
    let captures = IPV4_PATTERN.captures(text)?;
    let mut octets = [0_u8; 4];
    for (index, octet) in octets.iter_mut().enumerate() {
        *octet = captures.get(index + 1)?.as_str().parse::<u8>().ok()?;
    }
    Some(Ipv4Addr::from(octets))
}

fn parse_ipv6(text: &str) -> Option<Ipv6Addr> {
    if !IPV6_PATTERN.is_match(text) {
        return None;
    }
    let mut segments = [0_u16; 8];
    for (segment, group) in segments.iter_mut().zip(text.split(':')) {
        *segment = u16::from_str_radix(group, 16).ok()?;
    }
    Some(Ipv6Addr::from(segments))
}
