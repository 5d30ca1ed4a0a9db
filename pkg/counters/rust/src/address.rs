// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::connection::ConnectionFamily;
use crate::errors::{Error, Result};

pub const V4_LEN: usize = 4;
pub const V6_LEN: usize = 16;

/// An IP address as it appears inside a connection key: the raw network-order
/// bytes, either 4 or 16 of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
    V4([u8; V4_LEN]),
    V6([u8; V6_LEN]),
}

impl Address {
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        if let Ok(octets) = <[u8; V4_LEN]>::try_from(buf) {
            return Ok(Address::V4(octets));
        }
        if let Ok(octets) = <[u8; V6_LEN]>::try_from(buf) {
            return Ok(Address::V6(octets));
        }
        Err(Error::InvalidLength { len: buf.len() })
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            Address::V4(octets) => octets.as_slice(),
            Address::V6(octets) => octets.as_slice(),
        }
    }

    pub fn family(&self) -> ConnectionFamily {
        match self {
            Address::V4(_) => ConnectionFamily::V4,
            Address::V6(_) => ConnectionFamily::V6,
        }
    }

    pub fn to_ip(&self) -> IpAddr {
        match *self {
            Address::V4(octets) => IpAddr::V4(Ipv4Addr::from(octets)),
            Address::V6(octets) => IpAddr::V6(Ipv6Addr::from(octets)),
        }
    }
}

impl From<IpAddr> for Address {
    fn from(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(v4) => Address::V4(v4.octets()),
            IpAddr::V6(v6) => Address::V6(v6.octets()),
        }
    }
}

impl From<Ipv4Addr> for Address {
    fn from(ip: Ipv4Addr) -> Self {
        Address::V4(ip.octets())
    }
}

impl From<Ipv6Addr> for Address {
    fn from(ip: Ipv6Addr) -> Self {
        Address::V6(ip.octets())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_ip(), f)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_v4_round_trip() {
        let addr = Address::from(Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(addr.bytes(), &[10, 0, 0, 1]);
        assert_eq!(Address::from_bytes(addr.bytes()), Ok(addr));
        assert_eq!(addr.family(), ConnectionFamily::V4);
    }

    #[test]
    fn test_v6_round_trip() {
        let addr: Address = "2001:db8::1".parse::<IpAddr>().unwrap().into();
        assert_eq!(addr.bytes().len(), V6_LEN);
        assert_eq!(Address::from_bytes(addr.bytes()), Ok(addr));
        assert_eq!(addr.family(), ConnectionFamily::V6);
    }

    #[test]
    fn test_invalid_lengths() {
        for len in [0, 1, 5, 15, 17] {
            let buf = vec![0u8; len];
            assert_eq!(Address::from_bytes(&buf), Err(Error::InvalidLength { len }));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Address::V4([127, 0, 0, 1]).to_string(), "127.0.0.1");
        assert_eq!(Address::from(Ipv6Addr::LOCALHOST).to_string(), "::1");
    }
}
