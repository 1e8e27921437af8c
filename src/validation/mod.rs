//! Validation engine for structured values.
//!
//! Each validator owns a set of error codes, a table of message templates,
//! and an ordered [`report::Report`] of violations. The pure entry point is
//! `validate`, which returns a fresh report; the stateful `is_valid` plus
//! `messages` pair mirrors it for callers that want to inspect the last
//! result afterwards.

pub mod email;
pub mod error;
pub mod hostname;
pub mod iban;
pub mod report;

pub use email::{EmailAddress, EmailOptions};
pub use error::ConfigError;
pub use hostname::{Hostname, HostnameOptions};
pub use iban::{Iban, IbanOptions};
pub use report::Report;
