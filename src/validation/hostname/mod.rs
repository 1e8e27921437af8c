//! Hostname validation: IP literals, DNS names, IDN labels and local
//! network names.
//!
//! A host is checked against up to three classification trails (IP, DNS,
//! local name). Every applicable failure is recorded, not just the first, so
//! a badly formed host surfaces its full diagnostic trail: schema failure,
//! then the TLD diagnostic, then the local-name outcome. A host is accepted
//! when at least one trail matches the configured allow mask with no errors
//! of its own; on acceptance the report is empty.

use std::collections::HashMap;
use std::net::IpAddr;

use serde_json::Value;

use super::error::ConfigError;
use super::report::{Code, Report, Templates, display_value};

pub mod punycode;
pub mod tld;

pub const INVALID: Code = "hostnameInvalid";
pub const IP_ADDRESS_NOT_ALLOWED: Code = "hostnameIpAddressNotAllowed";
pub const UNKNOWN_TLD: Code = "hostnameUnknownTld";
pub const UNDECIPHERABLE_TLD: Code = "hostnameUndecipherableTld";
pub const INVALID_HOSTNAME: Code = "hostnameInvalidHostname";
pub const INVALID_HOSTNAME_SCHEMA: Code = "hostnameInvalidHostnameSchema";
pub const CANNOT_DECODE_PUNYCODE: Code = "hostnameCannotDecodePunycode";
pub const INVALID_LOCAL_NAME: Code = "hostnameInvalidLocalName";
pub const LOCAL_NAME_NOT_ALLOWED: Code = "hostnameLocalNameNotAllowed";

/// Allow DNS hostnames (the default for email addresses).
pub const ALLOW_DNS: u8 = 0b0001;
/// Allow IPv4 address literals.
pub const ALLOW_IPV4: u8 = 0b0010;
/// Allow IPv6 address literals.
pub const ALLOW_IPV6: u8 = 0b0100;
/// Allow local network names such as `localhost` or single-label hosts.
pub const ALLOW_LOCAL: u8 = 0b1000;
/// Allow IP address literals of either family.
pub const ALLOW_IP: u8 = ALLOW_IPV4 | ALLOW_IPV6;
/// Allow every hostname class.
pub const ALLOW_ALL: u8 = ALLOW_DNS | ALLOW_IP | ALLOW_LOCAL;

const MESSAGE_TEMPLATES: &[(Code, &str)] = &[
    (INVALID, "Invalid type given. String expected"),
    (
        IP_ADDRESS_NOT_ALLOWED,
        "The input appears to be an IP address, but IP addresses are not allowed",
    ),
    (
        UNKNOWN_TLD,
        "The input appears to be a DNS hostname but cannot match TLD against known list",
    ),
    (
        UNDECIPHERABLE_TLD,
        "The input appears to be a DNS hostname but cannot extract TLD part",
    ),
    (
        INVALID_HOSTNAME,
        "The input does not match the expected structure for a DNS hostname",
    ),
    (
        INVALID_HOSTNAME_SCHEMA,
        "The input appears to be a DNS hostname but cannot match against hostname schema for TLD '%tld%'",
    ),
    (
        CANNOT_DECODE_PUNYCODE,
        "The input appears to be a DNS hostname but the given punycode notation cannot be decoded",
    ),
    (
        INVALID_LOCAL_NAME,
        "The input does not appear to be a valid local network name",
    ),
    (
        LOCAL_NAME_NOT_ALLOWED,
        "The input appears to be a local network name but local network names are not allowed",
    ),
];

/// Maximum encoded length of a full DNS name (RFC 1035).
const MAX_DNS_NAME_LENGTH: usize = 255;
/// Maximum encoded length of a single label.
const MAX_LABEL_LENGTH: usize = 63;

/// Classification assigned to an accepted host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostnameClass {
    Ipv4,
    Ipv6,
    DnsName,
    LocalName,
}

/// Result of classifying one host string.
#[derive(Debug, Clone)]
pub struct HostnameOutcome {
    pub class: Option<HostnameClass>,
    pub report: Report,
}

impl HostnameOutcome {
    fn accepted(class: HostnameClass) -> Self {
        Self {
            class: Some(class),
            report: Report::new(),
        }
    }

    fn rejected(report: Report) -> Self {
        Self {
            class: None,
            report,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.class.is_some() && self.report.is_empty()
    }
}

/// Options accepted by [`Hostname::new`].
#[derive(Debug, Clone)]
pub struct HostnameOptions {
    pub allow: u8,
    pub use_idn_check: bool,
    pub use_tld_check: bool,
    pub messages: HashMap<String, String>,
    pub value_obscured: bool,
}

impl Default for HostnameOptions {
    fn default() -> Self {
        Self {
            allow: ALLOW_DNS,
            use_idn_check: true,
            use_tld_check: true,
            messages: HashMap::new(),
            value_obscured: false,
        }
    }
}

/// Validates hostnames against the configured allow mask.
#[derive(Debug, Clone)]
pub struct Hostname {
    allow: u8,
    use_idn_check: bool,
    use_tld_check: bool,
    templates: Templates,
    last: Report,
}

impl Default for Hostname {
    fn default() -> Self {
        Self {
            allow: ALLOW_DNS,
            use_idn_check: true,
            use_tld_check: true,
            templates: Templates::new(MESSAGE_TEMPLATES),
            last: Report::new(),
        }
    }
}

enum LabelIssue {
    Syntax,
    Idn,
    Punycode,
}

impl Hostname {
    pub fn new(options: HostnameOptions) -> Result<Self, ConfigError> {
        let mut templates = Templates::new(MESSAGE_TEMPLATES);
        templates.set_value_obscured(options.value_obscured);
        for (key, template) in &options.messages {
            templates.set_message(key, template)?;
        }
        Ok(Self {
            allow: options.allow,
            use_idn_check: options.use_idn_check,
            use_tld_check: options.use_tld_check,
            templates,
            last: Report::new(),
        })
    }

    /// Replaces the message template for one failure code.
    pub fn set_message(&mut self, key: &str, template: &str) -> Result<(), ConfigError> {
        self.templates.set_message(key, template)
    }

    pub(crate) fn knows_message_key(&self, key: &str) -> bool {
        self.templates.knows(key)
    }

    /// Validates an arbitrary JSON input; only strings pass the type gate.
    pub fn validate(&self, value: &Value) -> Report {
        match value.as_str() {
            Some(host) => self.validate_host(host).report,
            None => {
                let mut report = Report::new();
                report.record(
                    INVALID,
                    self.templates.render(INVALID, &display_value(value), &[]),
                );
                report
            }
        }
    }

    /// Validates and retains the report for [`Hostname::messages`].
    pub fn is_valid(&mut self, value: &Value) -> bool {
        self.last = self.validate(value);
        self.last.is_empty()
    }

    /// Report of the most recent [`Hostname::is_valid`] call.
    pub fn messages(&self) -> &Report {
        &self.last
    }

    /// Classifies one host string, accumulating the full diagnostic trail
    /// for rejected hosts.
    pub fn validate_host(&self, host: &str) -> HostnameOutcome {
        let mut report = Report::new();

        if let Some(ip) = parse_ip_literal(host) {
            let (class, bit) = match ip {
                IpAddr::V4(_) => (HostnameClass::Ipv4, ALLOW_IPV4),
                IpAddr::V6(_) => (HostnameClass::Ipv6, ALLOW_IPV6),
            };
            if self.allow & bit != 0 {
                return HostnameOutcome::accepted(class);
            }
            self.record(&mut report, IP_ADDRESS_NOT_ALLOWED, host, &[]);
            return HostnameOutcome::rejected(report);
        }

        let labels: Vec<&str> = host.split('.').collect();
        let mut dns_ok = false;

        if labels.len() >= 2 {
            let tld_raw = labels[labels.len() - 1];
            let mut schema_ok = true;

            if host.ends_with('.') {
                // Trailing empty label is always a schema failure.
                self.record(&mut report, INVALID_HOSTNAME, host, &[]);
                schema_ok = false;
            } else {
                let mut encoded_len = 0;
                for label in &labels {
                    match self.check_label(label) {
                        Ok(len) => encoded_len += len + 1,
                        Err(LabelIssue::Syntax) => {
                            self.record(&mut report, INVALID_HOSTNAME, host, &[]);
                            schema_ok = false;
                            break;
                        }
                        Err(LabelIssue::Idn) => {
                            self.record(
                                &mut report,
                                INVALID_HOSTNAME_SCHEMA,
                                host,
                                &[("tld", tld_raw)],
                            );
                            schema_ok = false;
                            break;
                        }
                        Err(LabelIssue::Punycode) => {
                            self.record(&mut report, CANNOT_DECODE_PUNYCODE, host, &[]);
                            schema_ok = false;
                            break;
                        }
                    }
                }
                if schema_ok && encoded_len - 1 > MAX_DNS_NAME_LENGTH {
                    self.record(&mut report, INVALID_HOSTNAME, host, &[]);
                    schema_ok = false;
                }
            }

            // The TLD diagnostic runs even when the schema already failed so
            // a malformed host reports its complete trail.
            let mut tld_ok = true;
            if self.use_tld_check {
                match canonical_tld(tld_raw) {
                    Some(tld) if tld.chars().count() < 2 => {
                        self.record(&mut report, UNDECIPHERABLE_TLD, host, &[]);
                        tld_ok = false;
                    }
                    Some(tld) if tld::is_known(&tld) => {}
                    _ => {
                        self.record(&mut report, UNKNOWN_TLD, host, &[]);
                        tld_ok = false;
                    }
                }
            }

            dns_ok = schema_ok && tld_ok;
            if dns_ok && self.allow & ALLOW_DNS != 0 {
                return HostnameOutcome::accepted(HostnameClass::DnsName);
            }
        }

        if is_local_name(host) {
            if self.allow & ALLOW_LOCAL != 0 {
                return HostnameOutcome::accepted(HostnameClass::LocalName);
            }
            self.record(&mut report, LOCAL_NAME_NOT_ALLOWED, host, &[]);
        } else if dns_ok {
            // Well-formed DNS name, but DNS is not in the allow mask and the
            // host is no plausible local token either.
            self.record(&mut report, LOCAL_NAME_NOT_ALLOWED, host, &[]);
        } else {
            self.record(&mut report, INVALID_LOCAL_NAME, host, &[]);
        }

        HostnameOutcome::rejected(report)
    }

    fn record(&self, report: &mut Report, code: Code, value: &str, vars: &[(&str, &str)]) {
        report.record(code, self.templates.render(code, value, vars));
    }

    fn check_label(&self, label: &str) -> Result<usize, LabelIssue> {
        if label.is_empty() {
            return Err(LabelIssue::Syntax);
        }

        if label.is_ascii() {
            let bytes = label.as_bytes();
            if label.len() > MAX_LABEL_LENGTH
                || bytes[0] == b'-'
                || bytes[bytes.len() - 1] == b'-'
                || !bytes
                    .iter()
                    .all(|b| b.is_ascii_alphanumeric() || *b == b'-')
            {
                return Err(LabelIssue::Syntax);
            }
            if let Some(body) = label.to_ascii_lowercase().strip_prefix("xn--") {
                match punycode::decode(body) {
                    Some(decoded) if !decoded.is_empty() => Ok(label.len()),
                    _ => Err(LabelIssue::Punycode),
                }
            } else {
                Ok(label.len())
            }
        } else {
            if !self.use_idn_check {
                return Err(LabelIssue::Idn);
            }
            let chars: Vec<char> = label.chars().collect();
            if chars[0] == '-'
                || chars[chars.len() - 1] == '-'
                || !chars.iter().all(|c| c.is_alphanumeric() || *c == '-')
            {
                return Err(LabelIssue::Syntax);
            }
            let encoded = punycode::encode(&label.to_lowercase()).ok_or(LabelIssue::Idn)?;
            let ace_len = 4 + encoded.len();
            if ace_len > MAX_LABEL_LENGTH {
                return Err(LabelIssue::Idn);
            }
            Ok(ace_len)
        }
    }
}

/// Parses bare and bracketed IP literals, including the `[IPv6:...]` form
/// used in email domain literals.
fn parse_ip_literal(host: &str) -> Option<IpAddr> {
    let inner = host
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(host);
    let inner = inner.strip_prefix("IPv6:").unwrap_or(inner);
    inner.parse().ok()
}

/// Local network names: dot-separated alphanumeric/dash segments, final
/// segment starting alphanumeric, no trailing dot.
fn is_local_name(host: &str) -> bool {
    if host.is_empty() || host.ends_with('.') {
        return false;
    }
    let parts: Vec<&str> = host.split('.').collect();
    let valid_parts = parts.iter().all(|part| {
        !part.is_empty()
            && part.len() <= MAX_LABEL_LENGTH
            && part
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-')
    });
    valid_parts
        && parts[parts.len() - 1]
            .as_bytes()
            .first()
            .is_some_and(u8::is_ascii_alphanumeric)
}

/// Lowercased Unicode form of a TLD label; `xn--` labels are decoded first.
fn canonical_tld(raw: &str) -> Option<String> {
    let lower = raw.to_lowercase();
    match lower.strip_prefix("xn--") {
        Some(body) => punycode::decode(body),
        None => Some(lower),
    }
}
