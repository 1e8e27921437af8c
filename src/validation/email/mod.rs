//! Email address validation according to RFC 5321/5322.
//!
//! An address is split at the last `@`; the local part and hostname are then
//! validated independently so both contribute errors even if one already
//! failed. When the hostname is accepted and MX checking is enabled, a live
//! DNS verification runs as the final stage. Hostname failures surface as
//! the email-level `emailAddressInvalidHostname` code followed by the
//! hostname validator's own diagnostic trail.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use super::error::ConfigError;
use super::hostname::{self, Hostname, HostnameOptions};
use super::report::{Code, Report, Templates, display_value};

pub mod local_part;
pub mod mx;

use local_part::{Grammar, LocalPartOutcome};
use mx::{DnsLookup, MxOutcome, SystemResolver};

pub const INVALID: Code = "emailAddressInvalid";
pub const INVALID_FORMAT: Code = "emailAddressInvalidFormat";
pub const INVALID_HOSTNAME: Code = "emailAddressInvalidHostname";
pub const INVALID_MX_RECORD: Code = "emailAddressInvalidMxRecord";
pub const INVALID_SEGMENT: Code = "emailAddressInvalidSegment";
pub const DOT_ATOM: Code = "emailAddressDotAtom";
pub const QUOTED_STRING: Code = "emailAddressQuotedString";
pub const INVALID_LOCAL_PART: Code = "emailAddressInvalidLocalPart";
pub const LENGTH_EXCEEDED: Code = "emailAddressLengthExceeded";

const MESSAGE_TEMPLATES: &[(Code, &str)] = &[
    (INVALID, "Invalid type given. String expected"),
    (
        INVALID_FORMAT,
        "The input is not a valid email address. Use the basic format local-part@hostname",
    ),
    (
        INVALID_HOSTNAME,
        "'%hostname%' is not a valid hostname for the email address",
    ),
    (
        INVALID_MX_RECORD,
        "'%hostname%' does not appear to have any valid MX or A records for the email address",
    ),
    (
        INVALID_SEGMENT,
        "'%hostname%' is not in a routable network segment. The email address should not be resolved from public network",
    ),
    (
        DOT_ATOM,
        "'%localPart%' can not be matched against dot-atom format",
    ),
    (
        QUOTED_STRING,
        "'%localPart%' can not be matched against quoted-string format",
    ),
    (
        INVALID_LOCAL_PART,
        "'%localPart%' is not a valid local part for the email address",
    ),
    (LENGTH_EXCEEDED, "The input exceeds the allowed length"),
];

/// Options accepted by [`EmailAddress::new`].
///
/// `messages` overrides default templates per code and may name both
/// email-level and hostname-level codes; a key unknown to both validators is
/// a configuration error.
#[derive(Debug, Clone)]
pub struct EmailOptions {
    pub allow: u8,
    pub strict: bool,
    pub use_mx_check: bool,
    pub use_deep_mx_check: bool,
    pub hostname: Option<Hostname>,
    pub messages: HashMap<String, String>,
    pub value_obscured: bool,
}

impl Default for EmailOptions {
    fn default() -> Self {
        Self {
            allow: hostname::ALLOW_DNS,
            strict: true,
            use_mx_check: false,
            use_deep_mx_check: false,
            hostname: None,
            messages: HashMap::new(),
            value_obscured: false,
        }
    }
}

/// Validates email addresses; stateless configuration plus the report of the
/// most recent call.
pub struct EmailAddress {
    hostname: Hostname,
    strict: bool,
    use_mx_check: bool,
    use_deep_mx_check: bool,
    templates: Templates,
    lookup: Box<dyn DnsLookup>,
    last: Report,
}

impl fmt::Debug for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailAddress")
            .field("strict", &self.strict)
            .field("use_mx_check", &self.use_mx_check)
            .field("use_deep_mx_check", &self.use_deep_mx_check)
            .finish_non_exhaustive()
    }
}

impl Default for EmailAddress {
    fn default() -> Self {
        Self::new(EmailOptions::default())
            .unwrap_or_else(|_| unreachable!("default email options are always valid"))
    }
}

impl EmailAddress {
    pub fn new(options: EmailOptions) -> Result<Self, ConfigError> {
        let mut hostname = match options.hostname {
            Some(validator) => validator,
            None => Hostname::new(HostnameOptions {
                allow: options.allow,
                value_obscured: options.value_obscured,
                ..Default::default()
            })?,
        };

        let mut templates = Templates::new(MESSAGE_TEMPLATES);
        templates.set_value_obscured(options.value_obscured);
        for (key, template) in &options.messages {
            if templates.knows(key) {
                templates.set_message(key, template)?;
            } else if hostname.knows_message_key(key) {
                hostname.set_message(key, template)?;
            } else {
                return Err(ConfigError::UnknownMessageKey(key.clone()));
            }
        }

        Ok(Self {
            hostname,
            strict: options.strict,
            use_mx_check: options.use_mx_check,
            use_deep_mx_check: options.use_deep_mx_check,
            templates,
            lookup: Box::new(SystemResolver),
            last: Report::new(),
        })
    }

    /// Substitutes the DNS lookup used for MX verification. Intended for
    /// tests and callers that carry their own resolver.
    pub fn with_dns_lookup(mut self, lookup: Box<dyn DnsLookup>) -> Self {
        self.lookup = lookup;
        self
    }

    /// Validates an arbitrary JSON input; only strings pass the type gate.
    pub fn validate(&self, value: &Value) -> Report {
        match value.as_str() {
            Some(email) => self.validate_email(email),
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

    /// Validates and retains the report for [`EmailAddress::messages`].
    pub fn is_valid(&mut self, value: &Value) -> bool {
        self.last = self.validate(value);
        self.last.is_empty()
    }

    /// Report of the most recent [`EmailAddress::is_valid`] call; empty
    /// after a successful validation.
    pub fn messages(&self) -> &Report {
        &self.last
    }

    fn validate_email(&self, email: &str) -> Report {
        let mut report = Report::new();

        let Some((local, host)) = split_at_last_at(email) else {
            report.record(
                INVALID_FORMAT,
                self.templates.render(INVALID_FORMAT, email, &[]),
            );
            return report;
        };

        let outcome = self.hostname.validate_host(host);
        let hostname_ok = outcome.is_valid();
        if !hostname_ok {
            report.record(
                INVALID_HOSTNAME,
                self.templates
                    .render(INVALID_HOSTNAME, email, &[("hostname", host)]),
            );
            // The generic hostname schema code is already surfaced as the
            // email-level invalid-hostname entry above; the rest of the
            // hostname trail passes through untouched.
            for (code, message) in outcome.report.iter() {
                if code != hostname::INVALID_HOSTNAME {
                    report.record(code, message.to_string());
                }
            }
        }

        let local_ok = self.validate_local_part(&mut report, email, local);

        if hostname_ok && local_ok && (self.use_mx_check || self.use_deep_mx_check) {
            match mx::verify(self.lookup.as_ref(), host, self.use_deep_mx_check) {
                MxOutcome::Found => {}
                MxOutcome::NoRecords => report.record(
                    INVALID_MX_RECORD,
                    self.templates
                        .render(INVALID_MX_RECORD, email, &[("hostname", host)]),
                ),
                MxOutcome::Unroutable => report.record(
                    INVALID_SEGMENT,
                    self.templates
                        .render(INVALID_SEGMENT, email, &[("hostname", host)]),
                ),
            }
        }

        report
    }

    fn validate_local_part(&self, report: &mut Report, email: &str, local: &str) -> bool {
        match local_part::validate(local, self.strict) {
            LocalPartOutcome { valid: true, .. } => true,
            LocalPartOutcome {
                grammar: Some(Grammar::DotAtom),
                ..
            } => {
                report.record(
                    LENGTH_EXCEEDED,
                    self.templates.render(LENGTH_EXCEEDED, email, &[]),
                );
                false
            }
            _ => {
                for code in [DOT_ATOM, QUOTED_STRING, INVALID_LOCAL_PART] {
                    report.record(
                        code,
                        self.templates.render(code, email, &[("localPart", local)]),
                    );
                }
                false
            }
        }
    }
}

/// Splits at the last `@`; both sides must be non-empty. Using the last `@`
/// keeps quoted local parts like `"bob@jones"@domain.com` intact.
fn split_at_last_at(email: &str) -> Option<(&str, &str)> {
    let at = email.rfind('@')?;
    let local = &email[..at];
    let host = &email[at + 1..];
    if local.is_empty() || host.is_empty() {
        return None;
    }
    Some((local, host))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use serde_json::json;
    use std::net::IpAddr;

    mock! {
        pub Dns {}

        impl DnsLookup for Dns {
            fn mx_hosts(&self, domain: &str) -> Vec<String>;
            fn ip_addrs(&self, host: &str) -> Vec<IpAddr>;
        }
    }

    fn validator() -> EmailAddress {
        EmailAddress::default()
    }

    fn with_options(options: EmailOptions) -> EmailAddress {
        EmailAddress::new(options).unwrap()
    }

    #[test]
    fn basic_address_is_valid() {
        let mut validator = validator();
        assert!(validator.is_valid(&json!("username@example.com")));
        assert!(validator.messages().is_empty());
    }

    #[test]
    fn valid_addresses_pass() {
        let mut validator = validator();
        for email in [
            "bob@domain.com",
            "bob.jones@domain.co.uk",
            "bob.jones.smythe@domain.co.uk",
            "BoB@domain.museum",
            "bobjones@domain.info",
            "bob+jones@domain.us",
            "bob@some.domain.uk.com",
            "B.O'Callaghan@domain.com",
            "иван@письмо.рф",
            "öäü@ä-umlaut.de",
            "frédéric@domain.com",
            "bob@тест.рф",
            "bob@xn--e1aybc.xn--p1ai",
            "Bob.Jones!@domain.com",
            "/Bob.Jones@domain.com",
            "Bob&Jones@domain.com",
        ] {
            assert!(
                validator.is_valid(&json!(email)),
                "{email} failed: {:?}",
                validator.messages()
            );
        }
    }

    #[test]
    fn invalid_addresses_fail() {
        let mut validator = validator();
        for email in [
            "",
            "bob jones@domain.com",
            ".bobJones@studio24.com",
            "bobJones.@studio24.com",
            "bob.Jones.@studio24.com",
            "bob+domain.com",
            "bob.domain.com",
            "bob @domain.com",
            "bob@ domain.com",
            "bob @ domain.com",
            "Abc..123@example.com",
            "\"bob%jones@domain.com",
            "bob\n\n@domain.com",
            "bob@verylongdomainsupercalifragilisticexpialidociousaspoonfulofsugar.com",
        ] {
            assert!(!validator.is_valid(&json!(email)), "{email} should fail");
        }
    }

    #[test]
    fn missing_local_part_reports_invalid_format_only() {
        let mut validator = validator();
        assert!(!validator.is_valid(&json!("@example.com")));
        assert_eq!(validator.messages().len(), 1);
        assert!(validator.messages().contains(INVALID_FORMAT));
    }

    #[test]
    fn invalid_local_part_reports_three_codes_with_the_value() {
        let mut validator = validator();
        assert!(!validator.is_valid(&json!("Some User@example.com")));

        let report = validator.messages();
        assert_eq!(report.len(), 3);
        for code in [DOT_ATOM, QUOTED_STRING, INVALID_LOCAL_PART] {
            let message = report.get(code).expect(code);
            assert!(message.contains("Some User"), "{message}");
        }
    }

    #[test]
    fn quoted_local_part_is_valid_with_no_messages() {
        let mut validator = validator();
        assert!(validator.is_valid(&json!("\"Some User\"@example.com")));
        assert!(validator.messages().is_empty());

        for email in [
            "\"\"@domain.com",
            "\"\\\"\"@domain.com",
            "\"bob@jones\"@domain.com",
            "\"[[ bob ]]\"@domain.com",
        ] {
            assert!(validator.is_valid(&json!(email)), "{email}");
        }
    }

    #[test]
    fn control_bytes_in_quoted_local_part_fail() {
        let mut validator = validator();
        for email in [
            "\"\u{0}\"@example.com",
            "\"\u{1f}\"@example.com",
            "\"\u{7f}\"@example.com",
            "\"\"\"@example.com",
            "\"\\\"@example.com",
        ] {
            assert!(!validator.is_valid(&json!(email)), "{email:?} should fail");
        }
    }

    #[test]
    fn malformed_hostname_surfaces_the_full_trail_in_order() {
        let mut validator = validator();
        assert!(!validator.is_valid(&json!("username@ example . com")));

        let messages: Vec<&str> = validator.messages().iter().map(|(_, m)| m).collect();
        assert!(messages.len() >= 3);
        assert!(messages[0].contains("not a valid hostname"));
        assert!(messages[1].contains("cannot match TLD"));
        assert!(messages[2].contains("does not appear to be a valid local network name"));
    }

    #[test]
    fn display_form_address_fails_with_hostname_trail() {
        let mut validator = validator();
        assert!(!validator.is_valid(&json!("User Name <username@example.com>")));

        let messages: Vec<&str> = validator.messages().iter().map(|(_, m)| m).collect();
        assert!(messages.len() >= 3);
        assert!(messages[0].contains("not a valid hostname"));
        assert!(messages[1].contains("cannot match TLD"));
        assert!(messages[2].contains("does not appear to be a valid local network name"));
    }

    #[test]
    fn trailing_dot_in_host_is_rejected() {
        let mut validator = validator();
        for email in ["example@gmail.com.", "test@test.co.", "test@test.co.za."] {
            assert!(!validator.is_valid(&json!(email)), "{email}");
        }
    }

    #[test]
    fn localhost_requires_the_local_allow_bit() {
        let mut all = with_options(EmailOptions {
            allow: hostname::ALLOW_ALL,
            ..Default::default()
        });
        assert!(all.is_valid(&json!("username@localhost")));
        assert!(all.is_valid(&json!("root@localhost")));
        assert!(all.is_valid(&json!("username@localhost.localdomain")));

        let mut dns_only = validator();
        assert!(!dns_only.is_valid(&json!("bob@localhost")));
    }

    #[test]
    fn ip_hosts_require_the_ip_allow_bit() {
        let mut with_ip = with_options(EmailOptions {
            allow: hostname::ALLOW_DNS | hostname::ALLOW_IP,
            ..Default::default()
        });
        assert!(with_ip.is_valid(&json!("bob@212.212.20.4")));

        let mut dns_only = validator();
        assert!(!dns_only.is_valid(&json!("me@127.0.0.1")));
        assert!(dns_only.messages().contains(hostname::IP_ADDRESS_NOT_ALLOWED));
    }

    #[test]
    fn strict_length_ceiling_reports_length_exceeded() {
        let mut validator = validator();
        let email = format!("{}@domain.com", "x".repeat(65));
        assert!(!validator.is_valid(&json!(email)));
        assert_eq!(validator.messages().len(), 1);
        assert!(validator.messages().contains(LENGTH_EXCEEDED));
    }

    #[test]
    fn non_strict_lifts_the_length_ceiling() {
        let mut validator = with_options(EmailOptions {
            strict: false,
            ..Default::default()
        });
        for length in [309, 310, 900] {
            let email = format!("{}@domain.com", "x".repeat(length));
            assert!(validator.is_valid(&json!(email)), "length {length}");
        }
    }

    #[test]
    fn unknown_tld_passes_when_tld_check_is_disabled() {
        let lax_hostname = Hostname::new(HostnameOptions {
            use_tld_check: false,
            ..Default::default()
        })
        .unwrap();
        let mut validator = with_options(EmailOptions {
            hostname: Some(lax_hostname),
            ..Default::default()
        });
        for email in ["name@domain.xx", "name@domain.zz", "name@domain.madeup"] {
            assert!(validator.is_valid(&json!(email)), "{email}");
        }

        let mut strict = EmailAddress::default();
        assert!(!strict.is_valid(&json!("name@domain.madeup")));
    }

    #[test]
    fn idn_hosts_fail_when_idn_check_is_disabled() {
        let hostname = Hostname::new(HostnameOptions {
            use_idn_check: false,
            ..Default::default()
        })
        .unwrap();
        let mut validator = with_options(EmailOptions {
            hostname: Some(hostname),
            ..Default::default()
        });
        for email in ["name@bürger.de", "name@hällo.se"] {
            assert!(!validator.is_valid(&json!(email)), "{email}");
        }
    }

    #[test]
    fn non_string_input_reports_wrong_type_only() {
        let mut validator = validator();
        for value in [json!([1]), json!({}), json!(true), json!(12.5), json!(null)] {
            assert!(!validator.is_valid(&value), "{value} should fail");
            assert_eq!(validator.messages().len(), 1);
            assert!(validator.messages().contains(INVALID));
        }
    }

    #[test]
    fn message_override_applies_to_email_codes() {
        let mut messages = HashMap::new();
        messages.insert(INVALID.to_string(), "TestMessage".to_string());
        let mut validator = with_options(EmailOptions {
            messages,
            ..Default::default()
        });

        validator.is_valid(&json!([]));
        assert_eq!(validator.messages().get(INVALID), Some("TestMessage"));
    }

    #[test]
    fn message_override_reaches_the_hostname_validator() {
        let mut messages = HashMap::new();
        messages.insert(
            hostname::IP_ADDRESS_NOT_ALLOWED.to_string(),
            "Bad Hostname".to_string(),
        );
        let mut validator = with_options(EmailOptions {
            messages,
            ..Default::default()
        });

        assert!(!validator.is_valid(&json!("me@127.0.0.1")));
        assert_eq!(
            validator.messages().get(hostname::IP_ADDRESS_NOT_ALLOWED),
            Some("Bad Hostname")
        );
    }

    #[test]
    fn unknown_message_override_is_a_config_error() {
        let mut messages = HashMap::new();
        messages.insert("noSuchCode".to_string(), "x".to_string());
        assert!(matches!(
            EmailAddress::new(EmailOptions {
                messages,
                ..Default::default()
            }),
            Err(ConfigError::UnknownMessageKey(_))
        ));
    }

    #[test]
    fn obscured_values_never_leak_into_messages() {
        let mut validator = with_options(EmailOptions {
            value_obscured: true,
            ..Default::default()
        });
        assert!(!validator.is_valid(&json!("Secret Name@example.com")));
        for (_, message) in validator.messages().iter() {
            assert!(!message.contains("Secret Name"), "{message}");
        }
    }

    #[test]
    fn mx_check_accepts_domains_with_mx_records() {
        let mut dns = MockDns::new();
        dns.expect_mx_hosts()
            .withf(|domain| domain == "example.com")
            .return_const(vec!["mx.example.com.".to_string()]);

        let mut validator = with_options(EmailOptions {
            use_mx_check: true,
            ..Default::default()
        })
        .with_dns_lookup(Box::new(dns));

        assert!(validator.is_valid(&json!("jon@example.com")));
    }

    #[test]
    fn mx_check_falls_back_to_a_records() {
        let mut dns = MockDns::new();
        dns.expect_mx_hosts().return_const(Vec::new());
        dns.expect_ip_addrs()
            .return_const(vec!["93.184.216.34".parse::<IpAddr>().unwrap()]);

        let mut validator = with_options(EmailOptions {
            use_mx_check: true,
            ..Default::default()
        })
        .with_dns_lookup(Box::new(dns));

        assert!(validator.is_valid(&json!("good@www.example.org")));
    }

    #[test]
    fn mx_check_reports_missing_records() {
        let mut dns = MockDns::new();
        dns.expect_mx_hosts().return_const(Vec::new());
        dns.expect_ip_addrs().return_const(Vec::new());

        let mut validator = with_options(EmailOptions {
            use_mx_check: true,
            ..Default::default()
        })
        .with_dns_lookup(Box::new(dns));

        assert!(!validator.is_valid(&json!("jon@bad.example.com")));
        assert!(validator.messages().contains(INVALID_MX_RECORD));
    }

    #[test]
    fn deep_mx_check_rejects_a_record_fallback() {
        let mut dns = MockDns::new();
        dns.expect_mx_hosts().return_const(Vec::new());
        dns.expect_ip_addrs()
            .return_const(vec!["93.184.216.34".parse::<IpAddr>().unwrap()]);

        let mut validator = with_options(EmailOptions {
            use_mx_check: true,
            use_deep_mx_check: true,
            ..Default::default()
        })
        .with_dns_lookup(Box::new(dns));

        assert!(!validator.is_valid(&json!("jon@example.com")));
        assert!(validator.messages().contains(INVALID_MX_RECORD));
    }

    #[test]
    fn deep_mx_check_rejects_root_at_localhost() {
        let mut dns = MockDns::new();
        dns.expect_mx_hosts().return_const(Vec::new());
        dns.expect_ip_addrs()
            .return_const(vec!["127.0.0.1".parse::<IpAddr>().unwrap()]);

        let mut validator = with_options(EmailOptions {
            allow: hostname::ALLOW_ALL,
            use_mx_check: true,
            use_deep_mx_check: true,
            ..Default::default()
        })
        .with_dns_lookup(Box::new(dns));

        assert!(!validator.is_valid(&json!("root@localhost")));
    }

    #[test]
    fn deep_mx_check_rejects_loopback_only_exchangers() {
        let mut dns = MockDns::new();
        dns.expect_mx_hosts()
            .return_const(vec!["mx.example.com.".to_string()]);
        dns.expect_ip_addrs()
            .return_const(vec!["127.0.0.1".parse::<IpAddr>().unwrap()]);

        let mut validator = with_options(EmailOptions {
            use_mx_check: true,
            use_deep_mx_check: true,
            ..Default::default()
        })
        .with_dns_lookup(Box::new(dns));

        assert!(!validator.is_valid(&json!("jon@example.com")));
        assert!(validator.messages().contains(INVALID_SEGMENT));
    }

    #[test]
    fn no_mx_check_runs_for_syntactically_invalid_hosts() {
        // A mock with no expectations panics on any call, proving the
        // resolver is never consulted for a failed hostname.
        let dns = MockDns::new();
        let mut validator = with_options(EmailOptions {
            use_mx_check: true,
            use_deep_mx_check: true,
            ..Default::default()
        })
        .with_dns_lookup(Box::new(dns));

        assert!(!validator.is_valid(&json!("bob@ domain.com")));
        assert!(!validator.is_valid(&json!("bob jones@domain.com")));
    }

    #[test]
    fn repeated_validation_produces_identical_reports() {
        let mut validator = validator();
        assert!(!validator.is_valid(&json!("Some User@example.com")));
        let first = validator.messages().clone();

        assert!(validator.is_valid(&json!("fine@example.com")));
        assert!(validator.messages().is_empty());

        assert!(!validator.is_valid(&json!("Some User@example.com")));
        assert_eq!(&first, validator.messages());
    }
}
