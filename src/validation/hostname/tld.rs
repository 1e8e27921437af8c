//! Recognized top-level domains for hostname plausibility checking.
//!
//! The table covers the generic, sponsored and country-code TLDs that the
//! validator is expected to recognize, plus the internationalized TLDs in
//! their Unicode form. Punycode TLD labels are decoded before lookup, so
//! `xn--p1ai` matches the `рф` entry. The list is deliberately a compile-time
//! constant; it is consulted only when `use_tld_check` is enabled.

/// Generic and sponsored top-level domains.
const GENERIC: &[&str] = &[
    "aero", "arpa", "asia", "biz", "cat", "com", "coop", "edu", "gov", "info", "int", "jobs",
    "mil", "mobi", "museum", "name", "net", "org", "post", "pro", "tel", "travel", "xxx",
];

/// Newer generic TLDs that show up routinely in mail domains.
const NEW_GENERIC: &[&str] = &[
    "app", "blog", "cloud", "club", "dev", "digital", "email", "global", "guru", "life", "live",
    "media", "network", "online", "shop", "site", "space", "store", "tech", "today", "website",
    "world", "xyz", "zone",
];

/// ISO 3166 country-code top-level domains.
const COUNTRY: &[&str] = &[
    "ac", "ad", "ae", "af", "ag", "ai", "al", "am", "ao", "aq", "ar", "as", "at", "au", "aw",
    "ax", "az", "ba", "bb", "bd", "be", "bf", "bg", "bh", "bi", "bj", "bm", "bn", "bo", "br",
    "bs", "bt", "bw", "by", "bz", "ca", "cc", "cd", "cf", "cg", "ch", "ci", "ck", "cl", "cm",
    "cn", "co", "cr", "cu", "cv", "cw", "cx", "cy", "cz", "de", "dj", "dk", "dm", "do", "dz",
    "ec", "ee", "eg", "er", "es", "et", "eu", "fi", "fj", "fk", "fm", "fo", "fr", "ga", "gd",
    "ge", "gf", "gg", "gh", "gi", "gl", "gm", "gn", "gp", "gq", "gr", "gs", "gt", "gu", "gw",
    "gy", "hk", "hm", "hn", "hr", "ht", "hu", "id", "ie", "il", "im", "in", "io", "iq", "ir",
    "is", "it", "je", "jm", "jo", "jp", "ke", "kg", "kh", "ki", "km", "kn", "kp", "kr", "kw",
    "ky", "kz", "la", "lb", "lc", "li", "lk", "lr", "ls", "lt", "lu", "lv", "ly", "ma", "mc",
    "md", "me", "mg", "mh", "mk", "ml", "mm", "mn", "mo", "mp", "mq", "mr", "ms", "mt", "mu",
    "mv", "mw", "mx", "my", "mz", "na", "nc", "ne", "nf", "ng", "ni", "nl", "no", "np", "nr",
    "nu", "nz", "om", "pa", "pe", "pf", "pg", "ph", "pk", "pl", "pm", "pn", "pr", "ps", "pt",
    "pw", "py", "qa", "re", "ro", "rs", "ru", "rw", "sa", "sb", "sc", "sd", "se", "sg", "sh",
    "si", "sk", "sl", "sm", "sn", "so", "sr", "ss", "st", "sv", "sx", "sy", "sz", "tc", "td",
    "tf", "tg", "th", "tj", "tk", "tl", "tm", "tn", "to", "tr", "tt", "tv", "tw", "tz", "ua",
    "ug", "uk", "us", "uy", "uz", "va", "vc", "ve", "vg", "vi", "vn", "vu", "wf", "ws", "ye",
    "yt", "za", "zm", "zw",
];

/// Internationalized TLDs, stored in Unicode form.
const INTERNATIONALIZED: &[&str] = &[
    "бг", "бел", "ею", "рф", "срб", "укр", "مصر", "ไทย", "中国", "中國", "台湾", "台灣",
    "新加坡", "香港", "한국",
];

/// Whether `tld` (lowercase, Unicode form) is a recognized top-level domain.
pub fn is_known(tld: &str) -> bool {
    GENERIC.contains(&tld)
        || NEW_GENERIC.contains(&tld)
        || COUNTRY.contains(&tld)
        || INTERNATIONALIZED.contains(&tld)
}
