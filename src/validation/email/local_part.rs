//! Local-part grammars for email addresses.
//!
//! A local part is accepted by the dot-atom grammar (RFC 5322 §3.4.1, with
//! the RFC 6531 extension of non-ASCII alphanumerics) or, failing that, by
//! the quoted-string grammar. Raw control bytes, including CR and LF, are
//! rejected by both grammars, escaped or not.

/// RFC 5321 recommended ceiling for the local part, enforced under strict
/// validation only.
pub const MAX_LOCAL_PART_OCTETS: usize = 64;

const ATEXT_SPECIALS: &str = "!#$%&'*+/=?^_`{|}~-";

/// Grammar that matched a local part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    DotAtom,
    QuotedString,
}

/// Outcome of checking a local part against both grammars.
///
/// `grammar` is the grammar that structurally matched; a matched-but-invalid
/// outcome only happens for a dot-atom local part that exceeds the strict
/// length ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalPartOutcome {
    pub grammar: Option<Grammar>,
    pub valid: bool,
}

/// Checks `local` against the dot-atom grammar, then the quoted-string
/// grammar. Under `strict`, a dot-atom local part longer than 64 octets is
/// structurally matched but invalid.
pub fn validate(local: &str, strict: bool) -> LocalPartOutcome {
    if is_dot_atom(local) {
        let valid = !strict || local.len() <= MAX_LOCAL_PART_OCTETS;
        return LocalPartOutcome {
            grammar: Some(Grammar::DotAtom),
            valid,
        };
    }
    if is_quoted_string(local) {
        return LocalPartOutcome {
            grammar: Some(Grammar::QuotedString),
            valid: true,
        };
    }
    LocalPartOutcome {
        grammar: None,
        valid: false,
    }
}

/// Dot-atom: one or more atext runs separated by single dots. Leading,
/// trailing and consecutive dots all produce an empty run and are rejected.
fn is_dot_atom(local: &str) -> bool {
    if local.is_empty() {
        return false;
    }
    local
        .split('.')
        .all(|atom| !atom.is_empty() && atom.chars().all(is_atext))
}

fn is_atext(c: char) -> bool {
    c.is_alphanumeric() || ATEXT_SPECIALS.contains(c)
}

/// Quoted-string: content wrapped in one pair of unescaped double quotes.
/// Interior bytes must be printable ASCII; `\"` and `\\` are the only legal
/// escapes; control bytes are rejected wherever they appear.
fn is_quoted_string(local: &str) -> bool {
    let mut chars = local.chars();
    if local.chars().count() < 2 || chars.next() != Some('"') || !local.ends_with('"') {
        return false;
    }

    let content = &local[1..local.len() - 1];
    let mut escaped = false;
    for c in content.chars() {
        if c.is_ascii_control() || !c.is_ascii() || c == '\u{7F}' {
            return false;
        }
        if escaped {
            if c != '"' && c != '\\' {
                return false;
            }
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return false;
        }
    }
    !escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_valid(local: &str) {
        let outcome = validate(local, true);
        assert!(outcome.valid, "{local:?} should be valid");
    }

    fn assert_invalid(local: &str) {
        let outcome = validate(local, true);
        assert!(!outcome.valid, "{local:?} should be invalid");
    }

    #[test]
    fn plain_dot_atoms_are_valid() {
        for local in [
            "bob",
            "bob.jones",
            "bob.jones.smythe",
            "bob+jones",
            "B.O'Callaghan",
            "!#$%&'*+-/=?^_`{}|~",
            "#Bob.Jones",
            "Bob~Jones",
        ] {
            let outcome = validate(local, true);
            assert_eq!(outcome.grammar, Some(Grammar::DotAtom), "{local}");
            assert!(outcome.valid);
        }
    }

    #[test]
    fn unicode_local_parts_match_dot_atom() {
        assert_eq!(validate("иван", true).grammar, Some(Grammar::DotAtom));
        assert_eq!(validate("frédéric", true).grammar, Some(Grammar::DotAtom));
    }

    #[test]
    fn misplaced_dots_are_rejected() {
        for local in [".bobJones", "bobJones.", "bob.Jones.", "Abc..123", ""] {
            assert_invalid(local);
        }
    }

    #[test]
    fn quoted_strings_are_valid() {
        for local in [
            "\"\"",
            "\" \"",
            "\"!\"",
            "\"\\\"\"",
            "\"[\"",
            "\"]\"",
            "\"bob%jones\"",
            "\"bob jones\"",
            "\"bob@jones\"",
            "\"[[ bob ]]\"",
            "\"Some User\"",
        ] {
            let outcome = validate(local, true);
            assert_eq!(outcome.grammar, Some(Grammar::QuotedString), "{local}");
            assert!(outcome.valid);
        }
    }

    #[test]
    fn bad_quoting_is_rejected() {
        for local in [
            "\"",
            "\"\"\"",
            "\"\\\"",
            "\"unclosed",
            "un\"quoted",
            "\"bob%jones",
            "Some User",
        ] {
            assert_invalid(local);
        }
    }

    #[test]
    fn control_bytes_are_rejected_even_inside_quotes() {
        for byte in ['\u{0}', '\u{1}', '\u{1E}', '\u{1F}', '\u{7F}'] {
            assert_invalid(&format!("\"{byte}\""));
        }
        assert_invalid("\"line\nbreak\"");
        assert_invalid("line\rbreak");
    }

    #[test]
    fn strict_length_ceiling_applies_to_dot_atom_only() {
        let long = "x".repeat(65);
        let strict = validate(&long, true);
        assert_eq!(strict.grammar, Some(Grammar::DotAtom));
        assert!(!strict.valid);

        let lax = validate(&long, false);
        assert!(lax.valid);

        assert_valid(&"x".repeat(64));
    }
}
