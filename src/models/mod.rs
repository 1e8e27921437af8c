/// # Health Status Response
///
/// Represents the operational status of the service with a timestamp.
/// Used as the response format for health check endpoints.
pub mod health;

/// # Validation Response Payloads
///
/// Shared response structures for the validation endpoints: the overall
/// verdict plus a flat list of code/message pairs in the order the
/// validators recorded them.
pub mod validation;

pub use health::HealthResponse;
pub use validation::{ValidationMessage, ValidationResponse};
