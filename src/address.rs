//! Alias addresses and the loopback device listing

use ipnetwork::Ipv4Network;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::OnceLock;

/// Prefix used when the user gives a bare address
pub const HOST_PREFIX: u8 = 32;

/// Append `/32` unless `addr` already carries a valid IPv4 CIDR prefix.
///
/// Anything that does not parse is passed through with `/32` appended and left
/// for `ip` to reject.
pub fn normalize_prefix(addr: &str) -> String {
    if addr.contains('/') && addr.parse::<Ipv4Network>().is_ok() {
        addr.to_string()
    } else {
        format!("{}/{}", addr, HOST_PREFIX)
    }
}

/// True when the host part of `addr` is a loopback address (127.0.0.0/8 or ::1).
///
/// IPv4 is read the way `ip` reads it, so `0177.0.0.1`, `127.000.000.001`,
/// `0x7f.1` and `127.1` all count.
pub fn is_loopback(addr: &str) -> bool {
    let host = addr.split('/').next().unwrap_or(addr).trim();
    if let Some(v4) = parse_ipv4_lenient(host) {
        return v4.is_loopback();
    }
    host.parse::<IpAddr>().map(|ip| ip.is_loopback()).unwrap_or(false)
}

/// Parse an IPv4 host the way iproute2 does: up to four dot-separated parts,
/// each one base 0 (`0x` hex, leading `0` octal) and at most 255. Missing
/// trailing parts are zero.
pub fn parse_ipv4_lenient(host: &str) -> Option<Ipv4Addr> {
    let mut octets = [0u8; 4];
    let mut parts = host.split('.');

    for i in 0..octets.len() {
        match parts.next() {
            Some(part) => octets[i] = parse_octet(part)?,
            None => return Some(Ipv4Addr::from(octets)),
        }
    }

    match parts.next() {
        None => Some(Ipv4Addr::from(octets)),
        Some(_) => None,
    }
}

fn parse_octet(part: &str) -> Option<u8> {
    let part = part.trim_start();
    let part = part.strip_prefix('+').unwrap_or(part);

    let hex = part.strip_prefix("0x").or_else(|| part.strip_prefix("0X"));
    let (digits, radix) = if let Some(hex) = hex {
        (hex, 16)
    } else if part.len() > 1 && part.starts_with('0') {
        (&part[1..], 8)
    } else {
        (part, 10)
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u32::from_str_radix(digits, radix)
        .ok()
        .and_then(|n| u8::try_from(n).ok())
}

/// One address reported on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AliasEntry {
    pub address: Ipv4Addr,
    pub prefix: u8,
}

impl fmt::Display for AliasEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix)
    }
}

/// Aliases found on the device, ordered by address value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasListing {
    entries: BTreeMap<Ipv4Addr, AliasEntry>,
}

fn inet_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"inet\s+(\d+\.\d+\.\d+\.\d+)/(\d+)").expect("Failed to compile inet regex")
    })
}

impl AliasListing {
    /// Parse `ip address show dev <dev>` output.
    ///
    /// Loopback entries (127.0.0.1/8 and friends) are not aliases and are skipped.
    /// When an address shows up twice the first prefix wins.
    pub fn parse(output: &str) -> Self {
        let mut entries = BTreeMap::new();

        for caps in inet_pattern().captures_iter(output) {
            let Ok(address) = caps[1].parse::<Ipv4Addr>() else {
                continue;
            };
            let Ok(prefix) = caps[2].parse::<u8>() else {
                continue;
            };
            if prefix > HOST_PREFIX || address.is_loopback() {
                continue;
            }
            entries
                .entry(address)
                .or_insert(AliasEntry { address, prefix });
        }

        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &AliasEntry> {
        self.entries.values()
    }

    pub fn get(&self, address: &Ipv4Addr) -> Option<&AliasEntry> {
        self.entries.get(address)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOW_LO: &str = "\
1: lo: <LOOPBACK,UP,LOWER_UP> mtu 65536 qdisc noqueue state UNKNOWN group default qlen 1000
    link/loopback 00:00:00:00:00:00 brd 00:00:00:00:00:00
    inet 127.0.0.1/8 scope host lo
       valid_lft forever preferred_lft forever
    inet 10.0.0.10/32 scope global lo
       valid_lft forever preferred_lft forever
    inet 10.0.0.2/32 scope global lo
       valid_lft forever preferred_lft forever
    inet 10.0.0.1/24 scope global lo
       valid_lft forever preferred_lft forever
    inet6 ::1/128 scope host
       valid_lft forever preferred_lft forever
";

    #[test]
    fn test_normalize_bare_address() {
        assert_eq!(normalize_prefix("10.1.1.5"), "10.1.1.5/32");
        assert_eq!(normalize_prefix("192.168.0.1"), "192.168.0.1/32");
    }

    #[test]
    fn test_normalize_keeps_explicit_prefix() {
        assert_eq!(normalize_prefix("10.1.1.5/24"), "10.1.1.5/24");
        assert_eq!(normalize_prefix("10.1.1.5/32"), "10.1.1.5/32");
        assert_eq!(normalize_prefix("10.0.0.0/8"), "10.0.0.0/8");
    }

    #[test]
    fn test_normalize_malformed_passes_through() {
        assert_eq!(normalize_prefix("not-an-ip"), "not-an-ip/32");
        assert_eq!(normalize_prefix("10.0.0.1/99"), "10.0.0.1/99/32");
    }

    #[test]
    fn test_loopback_detection() {
        assert!(is_loopback("127.0.0.1"));
        assert!(is_loopback("127.0.0.1/8"));
        assert!(is_loopback("127.10.20.30"));
        assert!(is_loopback("::1"));

        assert!(!is_loopback("10.0.0.1"));
        assert!(!is_loopback("128.0.0.1"));
        assert!(!is_loopback("localhost"));
        assert!(!is_loopback(""));
    }

    #[test]
    fn test_loopback_detection_iproute2_spellings() {
        for addr in [
            "127.000.000.001",
            "127.000.000.001/8",
            "0177.0.0.1/8",
            "0x7f.0.0.1",
            "0X7F.1.2.3",
            "127.1",
            "127.1/8",
            "127",
        ] {
            assert!(is_loopback(addr), "{}", addr);
        }

        for addr in [
            "0200.0.0.1",
            "0x80.0.0.1",
            "010.0.0.1",
            "10.1",
            "1.2.3.4.5",
            "127.0.0.256",
            "0x",
        ] {
            assert!(!is_loopback(addr), "{}", addr);
        }
    }

    #[test]
    fn test_parse_ipv4_lenient() {
        assert_eq!(parse_ipv4_lenient("10.1.1.5"), Some(Ipv4Addr::new(10, 1, 1, 5)));
        assert_eq!(parse_ipv4_lenient("010.0.0.1"), Some(Ipv4Addr::new(8, 0, 0, 1)));
        assert_eq!(parse_ipv4_lenient("0xa.0x0.0.0xff"), Some(Ipv4Addr::new(10, 0, 0, 255)));
        assert_eq!(parse_ipv4_lenient("127.1"), Some(Ipv4Addr::new(127, 1, 0, 0)));
        assert_eq!(parse_ipv4_lenient("08.0.0.1"), None);
        assert_eq!(parse_ipv4_lenient("10..0.1"), None);
        assert_eq!(parse_ipv4_lenient("::1"), None);
        assert_eq!(parse_ipv4_lenient(""), None);
    }

    #[test]
    fn test_listing_skips_loopback_and_ipv6() {
        let listing = AliasListing::parse(SHOW_LO);
        assert_eq!(listing.len(), 3);
        assert!(listing.get(&Ipv4Addr::new(127, 0, 0, 1)).is_none());
    }

    #[test]
    fn test_listing_numeric_order() {
        let listing = AliasListing::parse(SHOW_LO);
        let rendered: Vec<String> = listing.iter().map(|e| e.to_string()).collect();
        assert_eq!(rendered, vec!["10.0.0.1/24", "10.0.0.2/32", "10.0.0.10/32"]);
    }

    #[test]
    fn test_listing_duplicates_keep_first() {
        let listing = AliasListing::parse("inet 10.0.0.5/32 x\ninet 10.0.0.5/24 y\n");
        assert_eq!(listing.len(), 1);
        assert_eq!(listing.get(&Ipv4Addr::new(10, 0, 0, 5)).unwrap().prefix, 32);
    }

    #[test]
    fn test_listing_empty_and_garbage() {
        assert!(AliasListing::parse("").is_empty());
        assert!(AliasListing::parse("inet 300.1.1.1/32\ninet 10.0.0.1/40\n").is_empty());
    }
}
