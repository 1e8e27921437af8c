use std::net::IpAddr;
use std::time::Duration;

use trust_dns_resolver::{
    Resolver,
    config::{ResolverConfig, ResolverOpts},
};

/// DNS lookups needed for mail-exchanger verification.
///
/// The production implementation performs blocking queries against the
/// system resolver; tests substitute a mock so no live DNS is required.
/// Implementations must swallow resolver faults (timeouts, NXDOMAIN,
/// network failures) and return an empty result instead.
pub trait DnsLookup: Send + Sync {
    /// Mail-exchanger hostnames for `domain`, unordered.
    fn mx_hosts(&self, domain: &str) -> Vec<String>;

    /// A/AAAA addresses for `host`.
    fn ip_addrs(&self, host: &str) -> Vec<IpAddr>;
}

/// Outcome of one mail-exchanger verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MxOutcome {
    /// A usable mail route exists.
    Found,
    /// No MX records and, in basic mode, no A/AAAA fallback either.
    NoRecords,
    /// MX records exist but every exchanger resolves only to
    /// loopback/unroutable addresses.
    Unroutable,
}

/// Verifies that `domain` can receive mail.
///
/// Basic mode accepts any MX record, falling back to an A/AAAA lookup per
/// the RFC 2821 §5 implicit-MX rule. Deep mode requires genuine MX records
/// and at least one exchanger that resolves to a routable address.
pub fn verify(lookup: &dyn DnsLookup, domain: &str, deep: bool) -> MxOutcome {
    let exchangers = lookup.mx_hosts(domain);

    if !deep {
        if !exchangers.is_empty() || !lookup.ip_addrs(domain).is_empty() {
            return MxOutcome::Found;
        }
        return MxOutcome::NoRecords;
    }

    if exchangers.is_empty() {
        return MxOutcome::NoRecords;
    }

    let mut resolved_any = false;
    for exchanger in &exchangers {
        for addr in lookup.ip_addrs(exchanger.trim_end_matches('.')) {
            resolved_any = true;
            if is_routable(&addr) {
                return MxOutcome::Found;
            }
        }
    }

    if resolved_any {
        MxOutcome::Unroutable
    } else {
        MxOutcome::NoRecords
    }
}

/// Whether an exchanger address is usable from the public network.
///
/// The rejected IPv4 ranges are the reserved/special-purpose blocks; for
/// IPv6, loopback, link-local and unique-local addresses are rejected.
fn is_routable(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => {
            let octets = v4.octets();
            !(v4.is_unspecified()
                || v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_documentation()
                || v4.is_multicast()
                || octets[0] == 100 && (octets[1] & 0b1100_0000) == 64 // 100.64.0.0/10
                || octets[0] == 198 && (octets[1] & 0b1111_1110) == 18 // 198.18.0.0/15
                || octets[0] == 192 && octets[1] == 88 && octets[2] == 99 // 192.88.99.0/24
                || octets[0] >= 240) // 240.0.0.0/4
        }
        IpAddr::V6(v6) => {
            let segments = v6.segments();
            !(v6.is_unspecified()
                || v6.is_loopback()
                || v6.is_multicast()
                || (segments[0] & 0xffc0) == 0xfe80 // link-local
                || (segments[0] & 0xfe00) == 0xfc00) // unique-local
        }
    }
}

/// Blocking resolver against the system DNS configuration.
///
/// Mirrors a conservative interactive setup: a two second timeout with two
/// attempts per query. Every failure path yields an empty answer, never an
/// error, so callers treat unreachable DNS as "no records".
pub struct SystemResolver;

impl SystemResolver {
    fn resolver() -> Option<Resolver> {
        let mut opts = ResolverOpts::default();
        opts.timeout = Duration::from_secs(2);
        opts.attempts = 2;
        Resolver::new(ResolverConfig::default(), opts).ok()
    }
}

impl DnsLookup for SystemResolver {
    fn mx_hosts(&self, domain: &str) -> Vec<String> {
        let Some(resolver) = Self::resolver() else {
            return Vec::new();
        };
        match resolver.mx_lookup(domain) {
            Ok(records) => records
                .iter()
                .map(|mx| mx.exchange().to_utf8())
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    fn ip_addrs(&self, host: &str) -> Vec<IpAddr> {
        let Some(resolver) = Self::resolver() else {
            return Vec::new();
        };
        match resolver.lookup_ip(host) {
            Ok(records) => records.iter().collect(),
            Err(_) => Vec::new(),
        }
    }
}
