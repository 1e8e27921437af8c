//! IBAN validation: per-country structural patterns plus the ISO 7064
//! MOD 97-10 check described in ISO 13616-1.
//!
//! Input is normalized first (whitespace stripped, uppercased), then checked
//! in three stages: country structure, check digits, SEPA membership. The
//! first failing stage records its code and stops.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::error::ConfigError;
use super::report::{Code, Report, Templates, display_value};

pub const SEPA_NOT_SUPPORTED: Code = "ibanSepaNotSupported";
pub const FALSE_FORMAT: Code = "ibanFalseFormat";
pub const CHECK_FAILED: Code = "ibanCheckFailed";

const MESSAGE_TEMPLATES: &[(Code, &str)] = &[
    (
        SEPA_NOT_SUPPORTED,
        "Countries outside the Single Euro Payments Area (SEPA) are not supported",
    ),
    (FALSE_FORMAT, "The input has a false IBAN format"),
    (CHECK_FAILED, "The input has failed the IBAN check"),
];

/// Full-IBAN structure per ISO 13616 registry entry, anchored at compile of
/// the pattern map below.
const COUNTRY_PATTERNS: &[(&str, &str)] = &[
    ("AD", "AD[0-9]{2}[0-9]{8}[A-Za-z0-9]{12}"),
    ("AE", "AE[0-9]{2}[0-9]{3}[0-9]{16}"),
    ("AL", "AL[0-9]{2}[0-9]{8}[A-Za-z0-9]{16}"),
    ("AT", "AT[0-9]{2}[0-9]{5}[0-9]{11}"),
    ("AZ", "AZ[0-9]{2}[A-Z]{4}[A-Za-z0-9]{20}"),
    ("BA", "BA[0-9]{2}[0-9]{3}[0-9]{3}[0-9]{8}[0-9]{2}"),
    ("BE", "BE[0-9]{2}[0-9]{3}[0-9]{7}[0-9]{2}"),
    ("BG", "BG[0-9]{2}[A-Z]{4}[0-9]{4}[0-9]{2}[A-Za-z0-9]{8}"),
    ("BH", "BH[0-9]{2}[A-Z]{4}[A-Za-z0-9]{14}"),
    ("BR", "BR[0-9]{2}[0-9]{8}[0-9]{5}[0-9]{10}[A-Z][A-Za-z0-9]"),
    ("BY", "BY[0-9]{2}[A-Za-z0-9]{4}[0-9]{4}[A-Za-z0-9]{16}"),
    ("CH", "CH[0-9]{2}[0-9]{5}[A-Za-z0-9]{12}"),
    ("CR", "CR[0-9]{2}[0-9]{3}[0-9]{14}"),
    ("CY", "CY[0-9]{2}[0-9]{3}[0-9]{5}[A-Za-z0-9]{16}"),
    ("CZ", "CZ[0-9]{2}[0-9]{4}[0-9]{6}[0-9]{10}"),
    ("DE", "DE[0-9]{2}[0-9]{8}[0-9]{10}"),
    ("DK", "DK[0-9]{2}[0-9]{4}[0-9]{9}[0-9]"),
    ("DO", "DO[0-9]{2}[A-Za-z0-9]{4}[0-9]{20}"),
    ("EE", "EE[0-9]{2}[0-9]{2}[0-9]{2}[0-9]{11}[0-9]"),
    ("ES", "ES[0-9]{2}[0-9]{4}[0-9]{4}[0-9][0-9][0-9]{10}"),
    ("FI", "FI[0-9]{2}[0-9]{6}[0-9]{7}[0-9]"),
    ("FO", "FO[0-9]{2}[0-9]{4}[0-9]{9}[0-9]"),
    ("FR", "FR[0-9]{2}[0-9]{5}[0-9]{5}[A-Za-z0-9]{11}[0-9]{2}"),
    ("GB", "GB[0-9]{2}[A-Z]{4}[0-9]{6}[0-9]{8}"),
    ("GE", "GE[0-9]{2}[A-Z]{2}[0-9]{16}"),
    ("GI", "GI[0-9]{2}[A-Z]{4}[A-Za-z0-9]{15}"),
    ("GL", "GL[0-9]{2}[0-9]{4}[0-9]{9}[0-9]"),
    ("GR", "GR[0-9]{2}[0-9]{3}[0-9]{4}[A-Za-z0-9]{16}"),
    ("GT", "GT[0-9]{2}[A-Za-z0-9]{4}[A-Za-z0-9]{20}"),
    ("HR", "HR[0-9]{2}[0-9]{7}[0-9]{10}"),
    ("HU", "HU[0-9]{2}[0-9]{3}[0-9]{4}[0-9][0-9]{15}[0-9]"),
    ("IE", "IE[0-9]{2}[A-Z]{4}[0-9]{6}[0-9]{8}"),
    ("IL", "IL[0-9]{2}[0-9]{3}[0-9]{3}[0-9]{13}"),
    ("IS", "IS[0-9]{2}[0-9]{4}[0-9]{2}[0-9]{6}[0-9]{10}"),
    ("IT", "IT[0-9]{2}[A-Z][0-9]{5}[0-9]{5}[A-Za-z0-9]{12}"),
    ("KW", "KW[0-9]{2}[A-Z]{4}[A-Za-z0-9]{22}"),
    ("KZ", "KZ[0-9]{2}[0-9]{3}[A-Za-z0-9]{13}"),
    ("LB", "LB[0-9]{2}[0-9]{4}[A-Za-z0-9]{20}"),
    ("LI", "LI[0-9]{2}[0-9]{5}[A-Za-z0-9]{12}"),
    ("LT", "LT[0-9]{2}[0-9]{5}[0-9]{11}"),
    ("LU", "LU[0-9]{2}[0-9]{3}[A-Za-z0-9]{13}"),
    ("LV", "LV[0-9]{2}[A-Z]{4}[A-Za-z0-9]{13}"),
    ("MC", "MC[0-9]{2}[0-9]{5}[0-9]{5}[A-Za-z0-9]{11}[0-9]{2}"),
    ("MD", "MD[0-9]{2}[A-Za-z0-9]{2}[A-Za-z0-9]{18}"),
    ("ME", "ME[0-9]{2}[0-9]{3}[0-9]{13}[0-9]{2}"),
    ("MK", "MK[0-9]{2}[0-9]{3}[A-Za-z0-9]{10}[0-9]{2}"),
    ("MR", "MR13[0-9]{5}[0-9]{5}[0-9]{11}[0-9]{2}"),
    ("MT", "MT[0-9]{2}[A-Z]{4}[0-9]{5}[A-Za-z0-9]{18}"),
    ("MU", "MU[0-9]{2}[A-Z]{4}[0-9]{2}[0-9]{2}[0-9]{12}[0-9]{3}[A-Z]{3}"),
    ("NL", "NL[0-9]{2}[A-Z]{4}[0-9]{10}"),
    ("NO", "NO[0-9]{2}[0-9]{4}[0-9]{6}[0-9]"),
    ("PK", "PK[0-9]{2}[A-Z]{4}[A-Za-z0-9]{16}"),
    ("PL", "PL[0-9]{2}[0-9]{8}[0-9]{16}"),
    ("PS", "PS[0-9]{2}[A-Z]{4}[A-Za-z0-9]{21}"),
    ("PT", "PT[0-9]{2}[0-9]{4}[0-9]{4}[0-9]{11}[0-9]{2}"),
    ("RO", "RO[0-9]{2}[A-Z]{4}[A-Za-z0-9]{16}"),
    ("RS", "RS[0-9]{2}[0-9]{3}[0-9]{13}[0-9]{2}"),
    ("SA", "SA[0-9]{2}[0-9]{2}[A-Za-z0-9]{18}"),
    ("SE", "SE[0-9]{2}[0-9]{3}[0-9]{16}[0-9]"),
    ("SI", "SI[0-9]{2}[0-9]{5}[0-9]{8}[0-9]{2}"),
    ("SK", "SK[0-9]{2}[0-9]{4}[0-9]{6}[0-9]{10}"),
    ("SM", "SM[0-9]{2}[A-Z][0-9]{5}[0-9]{5}[A-Za-z0-9]{12}"),
    ("TN", "TN59[0-9]{2}[0-9]{3}[0-9]{13}[0-9]{2}"),
    ("TR", "TR[0-9]{2}[0-9]{5}[A-Za-z0-9][A-Za-z0-9]{16}"),
    ("VG", "VG[0-9]{2}[A-Z]{4}[0-9]{16}"),
];

static COUNTRY_REGEX: LazyLock<HashMap<&'static str, Regex>> = LazyLock::new(|| {
    COUNTRY_PATTERNS
        .iter()
        .map(|(country, pattern)| {
            let anchored = format!("^{pattern}$");
            let regex = Regex::new(&anchored)
                .unwrap_or_else(|_| unreachable!("country pattern {country} is well formed"));
            (*country, regex)
        })
        .collect()
});

/// Countries participating in the Single Euro Payments Area.
const SEPA_COUNTRIES: &[&str] = &[
    "AT", "BE", "BG", "CH", "CY", "CZ", "DE", "DK", "EE", "ES", "FI", "FR", "GB", "GI", "GR",
    "HR", "HU", "IE", "IS", "IT", "LI", "LT", "LU", "LV", "MC", "MT", "NL", "NO", "PL", "PT",
    "RO", "SE", "SI", "SK", "SM",
];

/// ISO 3166-1 alpha-2 assignments, used to vet the `country_code` option.
const ISO_3166_ALPHA2: &[&str] = &[
    "AD", "AE", "AF", "AG", "AI", "AL", "AM", "AO", "AQ", "AR", "AS", "AT", "AU", "AW", "AX",
    "AZ", "BA", "BB", "BD", "BE", "BF", "BG", "BH", "BI", "BJ", "BL", "BM", "BN", "BO", "BQ",
    "BR", "BS", "BT", "BV", "BW", "BY", "BZ", "CA", "CC", "CD", "CF", "CG", "CH", "CI", "CK",
    "CL", "CM", "CN", "CO", "CR", "CU", "CV", "CW", "CX", "CY", "CZ", "DE", "DJ", "DK", "DM",
    "DO", "DZ", "EC", "EE", "EG", "EH", "ER", "ES", "ET", "FI", "FJ", "FK", "FM", "FO", "FR",
    "GA", "GB", "GD", "GE", "GF", "GG", "GH", "GI", "GL", "GM", "GN", "GP", "GQ", "GR", "GS",
    "GT", "GU", "GW", "GY", "HK", "HM", "HN", "HR", "HT", "HU", "ID", "IE", "IL", "IM", "IN",
    "IO", "IQ", "IR", "IS", "IT", "JE", "JM", "JO", "JP", "KE", "KG", "KH", "KI", "KM", "KN",
    "KP", "KR", "KW", "KY", "KZ", "LA", "LB", "LC", "LI", "LK", "LR", "LS", "LT", "LU", "LV",
    "LY", "MA", "MC", "MD", "ME", "MF", "MG", "MH", "MK", "ML", "MM", "MN", "MO", "MP", "MQ",
    "MR", "MS", "MT", "MU", "MV", "MW", "MX", "MY", "MZ", "NA", "NC", "NE", "NF", "NG", "NI",
    "NL", "NO", "NP", "NR", "NU", "NZ", "OM", "PA", "PE", "PF", "PG", "PH", "PK", "PL", "PM",
    "PN", "PR", "PS", "PT", "PW", "PY", "QA", "RE", "RO", "RS", "RU", "RW", "SA", "SB", "SC",
    "SD", "SE", "SG", "SH", "SI", "SJ", "SK", "SL", "SM", "SN", "SO", "SR", "SS", "ST", "SV",
    "SX", "SY", "SZ", "TC", "TD", "TF", "TG", "TH", "TJ", "TK", "TL", "TM", "TN", "TO", "TR",
    "TT", "TV", "TW", "TZ", "UA", "UG", "UM", "US", "UY", "UZ", "VA", "VC", "VE", "VG", "VI",
    "VN", "VU", "WF", "WS", "YE", "YT", "ZA", "ZM", "ZW",
];

/// Options accepted by [`Iban::new`].
///
/// When `country_code` is set, every input is validated against that
/// country's structure instead of the two-letter prefix carried by the
/// value itself.
#[derive(Debug, Clone)]
pub struct IbanOptions {
    pub country_code: Option<String>,
    pub allow_non_sepa: bool,
    pub messages: HashMap<String, String>,
    pub value_obscured: bool,
}

impl Default for IbanOptions {
    fn default() -> Self {
        Self {
            country_code: None,
            allow_non_sepa: true,
            messages: HashMap::new(),
            value_obscured: false,
        }
    }
}

/// Validates International Bank Account Numbers.
#[derive(Debug, Clone)]
pub struct Iban {
    country_code: Option<String>,
    allow_non_sepa: bool,
    templates: Templates,
    last: Report,
}

impl Default for Iban {
    fn default() -> Self {
        Self::new(IbanOptions::default())
            .unwrap_or_else(|_| unreachable!("default iban options are always valid"))
    }
}

impl Iban {
    pub fn new(options: IbanOptions) -> Result<Self, ConfigError> {
        if let Some(code) = &options.country_code {
            if !ISO_3166_ALPHA2.contains(&code.as_str()) {
                return Err(ConfigError::UnknownCountryCode(code.clone()));
            }
        }

        let mut templates = Templates::new(MESSAGE_TEMPLATES);
        templates.set_value_obscured(options.value_obscured);
        for (key, template) in &options.messages {
            templates.set_message(key, template)?;
        }

        Ok(Self {
            country_code: options.country_code,
            allow_non_sepa: options.allow_non_sepa,
            templates,
            last: Report::new(),
        })
    }

    /// Validates an arbitrary JSON input; only strings pass the type gate.
    pub fn validate(&self, value: &Value) -> Report {
        let mut report = Report::new();
        let Some(raw) = value.as_str() else {
            report.record(
                FALSE_FORMAT,
                self.templates.render(FALSE_FORMAT, &display_value(value), &[]),
            );
            return report;
        };

        let iban = normalize(raw);

        // get() rather than a byte slice: a multi-byte character at the
        // front must fall through to the format failure, not panic.
        let country = match &self.country_code {
            Some(code) => code.as_str(),
            None => iban.get(..2).unwrap_or(""),
        };

        let Some(pattern) = COUNTRY_REGEX.get(country) else {
            report.record(FALSE_FORMAT, self.templates.render(FALSE_FORMAT, raw, &[]));
            return report;
        };

        if !pattern.is_match(&iban) {
            report.record(FALSE_FORMAT, self.templates.render(FALSE_FORMAT, raw, &[]));
            return report;
        }

        if mod97(&iban) != 1 {
            report.record(CHECK_FAILED, self.templates.render(CHECK_FAILED, raw, &[]));
            return report;
        }

        if !self.allow_non_sepa && !SEPA_COUNTRIES.contains(&country) {
            report.record(
                SEPA_NOT_SUPPORTED,
                self.templates.render(SEPA_NOT_SUPPORTED, raw, &[]),
            );
        }

        report
    }

    /// Validates and retains the report for [`Iban::messages`].
    pub fn is_valid(&mut self, value: &Value) -> bool {
        self.last = self.validate(value);
        self.last.is_empty()
    }

    /// Report of the most recent [`Iban::is_valid`] call.
    pub fn messages(&self) -> &Report {
        &self.last
    }
}

fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// ISO 7064 MOD 97-10 over the rearranged IBAN (BBAN first, country and
/// check digits last), folding character by character so arbitrary lengths
/// never overflow.
fn mod97(iban: &str) -> u32 {
    let rearranged = iban[4..].chars().chain(iban[..4].chars());
    let mut remainder: u32 = 0;
    for c in rearranged {
        remainder = match c {
            '0'..='9' => (remainder * 10 + (c as u32 - '0' as u32)) % 97,
            'A'..='Z' => (remainder * 100 + (c as u32 - 'A' as u32 + 10)) % 97,
            // Structure validation runs first, so other characters cannot
            // appear; map them to a non-1 remainder regardless.
            _ => return 0,
        };
    }
    remainder
}
