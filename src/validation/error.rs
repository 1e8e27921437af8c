use thiserror::Error;

/// Configuration failures raised while constructing a validator.
///
/// These indicate programmer error (bad options), not bad input data, and are
/// therefore surfaced as a `Result` at construction time instead of being
/// folded into a validation report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The supplied country code is not an officially assigned
    /// ISO 3166-1 alpha-2 code.
    #[error("'{0}' is not a recognized ISO 3166-1 alpha-2 country code")]
    UnknownCountryCode(String),

    /// A message override was supplied for a code the validator does not
    /// define.
    #[error("no message template exists for key '{0}'")]
    UnknownMessageKey(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_code_error_mentions_iso_standard() {
        let err = ConfigError::UnknownCountryCode("foo".to_string());
        assert!(err.to_string().contains("ISO 3166-1"));
        assert!(err.to_string().contains("foo"));
    }

    #[test]
    fn message_key_error_names_the_key() {
        let err = ConfigError::UnknownMessageKey("emailAddressBogus".to_string());
        assert!(err.to_string().contains("emailAddressBogus"));
    }
}
