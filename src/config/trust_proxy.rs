//! Which forwarding proxies may rewrite the client address.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Parsed `trust_proxy` setting.
///
/// Accepted forms: unset/empty (disabled), a hop count, `true`/`false`, or a
/// comma-separated list of addresses, CIDR subnets and the names
/// `loopback`, `linklocal`, `uniquelocal`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TrustProxy {
    #[default]
    Disabled,
    All,
    Hops(u32),
    Trusted(Vec<TrustedRange>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustedRange {
    Loopback,
    LinkLocal,
    UniqueLocal,
    Subnet(IpAddr, u8),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTrustProxy(String);

impl fmt::Display for InvalidTrustProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid trust_proxy entry: {:?}", self.0)
    }
}

impl std::error::Error for InvalidTrustProxy {}

impl FromStr for TrustProxy {
    type Err = InvalidTrustProxy;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        match raw {
            "" | "false" => return Ok(TrustProxy::Disabled),
            "true" => return Ok(TrustProxy::All),
            _ => {}
        }
        if let Ok(hops) = raw.parse::<u32>() {
            return Ok(TrustProxy::Hops(hops));
        }

        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(TrustedRange::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map(TrustProxy::Trusted)
    }
}

impl FromStr for TrustedRange {
    type Err = InvalidTrustProxy;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidTrustProxy(raw.to_string());
        match raw {
            "loopback" => return Ok(TrustedRange::Loopback),
            "linklocal" => return Ok(TrustedRange::LinkLocal),
            "uniquelocal" => return Ok(TrustedRange::UniqueLocal),
            _ => {}
        }

        let (addr, prefix) = match raw.split_once('/') {
            Some((addr, prefix)) => (addr, Some(prefix)),
            None => (raw, None),
        };
        let addr = IpAddr::from_str(addr).map_err(|_| invalid())?;
        let max = if addr.is_ipv4() { 32 } else { 128 };
        let prefix = match prefix {
            Some(p) => p.parse::<u8>().ok().filter(|p| *p <= max).ok_or_else(invalid)?,
            None => max,
        };
        Ok(TrustedRange::Subnet(addr, prefix))
    }
}

impl fmt::Display for TrustedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrustedRange::Loopback => f.write_str("loopback"),
            TrustedRange::LinkLocal => f.write_str("linklocal"),
            TrustedRange::UniqueLocal => f.write_str("uniquelocal"),
            TrustedRange::Subnet(addr, prefix) => write!(f, "{addr}/{prefix}"),
        }
    }
}

impl TrustedRange {
    pub fn contains(&self, ip: IpAddr) -> bool {
        match (self, ip) {
            (TrustedRange::Loopback, ip) => ip.is_loopback(),
            (TrustedRange::LinkLocal, IpAddr::V4(v4)) => v4.is_link_local(),
            (TrustedRange::LinkLocal, IpAddr::V6(v6)) => in_v6(v6, Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 0), 10),
            (TrustedRange::UniqueLocal, IpAddr::V4(v4)) => v4.is_private(),
            (TrustedRange::UniqueLocal, IpAddr::V6(v6)) => in_v6(v6, Ipv6Addr::new(0xfc00, 0, 0, 0, 0, 0, 0, 0), 7),
            (TrustedRange::Subnet(IpAddr::V4(net), prefix), IpAddr::V4(v4)) => in_v4(v4, *net, *prefix),
            (TrustedRange::Subnet(IpAddr::V6(net), prefix), IpAddr::V6(v6)) => in_v6(v6, *net, *prefix),
            (TrustedRange::Subnet(..), _) => false,
        }
    }
}

fn in_v4(ip: Ipv4Addr, net: Ipv4Addr, prefix: u8) -> bool {
    let mask = u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0);
    u32::from(ip) & mask == u32::from(net) & mask
}

fn in_v6(ip: Ipv6Addr, net: Ipv6Addr, prefix: u8) -> bool {
    let mask = u128::MAX.checked_shl(128 - u32::from(prefix)).unwrap_or(0);
    u128::from(ip) & mask == u128::from(net) & mask
}

impl TrustProxy {
    fn trusts(&self, addr: IpAddr, hop: usize) -> bool {
        match self {
            TrustProxy::Disabled => false,
            TrustProxy::All => true,
            TrustProxy::Hops(n) => u32::try_from(hop).is_ok_and(|hop| hop < *n),
            TrustProxy::Trusted(ranges) => ranges.iter().any(|r| r.contains(addr)),
        }
    }

    /// Resolves the client address from the socket peer and `X-Forwarded-For`.
    ///
    /// Walks `[peer, forwarded right-to-left]` while the current hop is trusted and
    /// returns the first untrusted address (or the furthest one reached).
    pub fn client_ip(&self, peer: IpAddr, forwarded_for: Option<&str>) -> IpAddr {
        let Some(forwarded_for) = forwarded_for else {
            return peer;
        };

        let mut current = peer;
        let hops = forwarded_for
            .rsplit(',')
            .map(str::trim)
            .filter(|s| !s.is_empty());
        for (i, hop) in hops.enumerate() {
            if !self.trusts(current, i) {
                break;
            }
            match hop.parse::<IpAddr>() {
                Ok(ip) => current = ip,
                Err(_) => break,
            }
        }
        current
    }
}

impl<'de> Deserialize<'de> for TrustProxy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = Value::deserialize(deserializer)?;

        match v {
            Value::Null => Ok(TrustProxy::Disabled),
            Value::Bool(true) => Ok(TrustProxy::All),
            Value::Bool(false) => Ok(TrustProxy::Disabled),
            Value::Number(n) => n
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .map(TrustProxy::Hops)
                .ok_or_else(|| serde::de::Error::custom("trust_proxy hop count must be a non-negative integer")),
            Value::String(s) => s.parse().map_err(serde::de::Error::custom),
            _ => Err(serde::de::Error::custom(
                "expected a boolean, a hop count or an address list for trust_proxy",
            )),
        }
    }
}

impl Serialize for TrustProxy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            TrustProxy::Disabled => serializer.serialize_bool(false),
            TrustProxy::All => serializer.serialize_bool(true),
            TrustProxy::Hops(n) => serializer.serialize_u32(*n),
            TrustProxy::Trusted(ranges) => {
                let joined = ranges
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                serializer.serialize_str(&joined)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn parses_every_accepted_form() {
        assert_eq!("".parse::<TrustProxy>().unwrap(), TrustProxy::Disabled);
        assert_eq!("false".parse::<TrustProxy>().unwrap(), TrustProxy::Disabled);
        assert_eq!("true".parse::<TrustProxy>().unwrap(), TrustProxy::All);
        assert_eq!("3".parse::<TrustProxy>().unwrap(), TrustProxy::Hops(3));
        assert_eq!(
            "loopback, 10.0.0.0/8".parse::<TrustProxy>().unwrap(),
            TrustProxy::Trusted(vec![
                TrustedRange::Loopback,
                TrustedRange::Subnet(ip("10.0.0.0"), 8)
            ])
        );
        assert!("not-an-address".parse::<TrustProxy>().is_err());
        assert!("10.0.0.0/40".parse::<TrustProxy>().is_err());
    }

    #[test]
    fn deserializes_from_json_scalars() {
        let hops: TrustProxy = serde_json::from_value(json!(1)).unwrap();
        assert_eq!(hops, TrustProxy::Hops(1));
        let all: TrustProxy = serde_json::from_value(json!(true)).unwrap();
        assert_eq!(all, TrustProxy::All);
        let list: TrustProxy = serde_json::from_value(json!("uniquelocal")).unwrap();
        assert_eq!(list, TrustProxy::Trusted(vec![TrustedRange::UniqueLocal]));
        assert!(serde_json::from_value::<TrustProxy>(json!(-1)).is_err());
    }

    #[test]
    fn serialization_round_trips_through_config() {
        let original = TrustProxy::Trusted(vec![
            TrustedRange::LinkLocal,
            TrustedRange::Subnet(ip("192.168.1.0"), 24),
        ]);
        let value = serde_json::to_value(&original).unwrap();
        assert_eq!(value, json!("linklocal,192.168.1.0/24"));
        assert_eq!(serde_json::from_value::<TrustProxy>(value).unwrap(), original);
    }

    #[test]
    fn resolves_client_address() {
        let peer = ip("127.0.0.1");
        let xff = Some("203.0.113.7, 10.0.0.2");

        assert_eq!(TrustProxy::Disabled.client_ip(peer, xff), peer);
        assert_eq!(TrustProxy::All.client_ip(peer, xff), ip("203.0.113.7"));
        assert_eq!(TrustProxy::Hops(1).client_ip(peer, xff), ip("10.0.0.2"));
        assert_eq!(TrustProxy::Hops(5).client_ip(peer, xff), ip("203.0.113.7"));

        let trusted: TrustProxy = "loopback,uniquelocal".parse().unwrap();
        assert_eq!(trusted.client_ip(peer, xff), ip("203.0.113.7"));
        let loopback_only: TrustProxy = "loopback".parse().unwrap();
        assert_eq!(loopback_only.client_ip(peer, xff), ip("10.0.0.2"));
        assert_eq!(TrustProxy::All.client_ip(peer, None), peer);
    }
}
