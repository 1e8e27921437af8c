use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validation::Report;

/// One recorded violation: a stable machine-readable code and the rendered
/// human-readable message.
#[derive(Serialize, Deserialize, Debug, PartialEq, ToSchema)]
pub struct ValidationMessage {
    pub code: String,
    pub message: String,
}

/// # Validation Response
///
/// Response body shared by the validation endpoints. `messages` preserves
/// the order in which the validator recorded its findings; it is empty when
/// `is_valid` is `true`.
///
/// ## Example JSON
/// ```json
/// {
///   "is_valid": false,
///   "messages": [
///     { "code": "emailAddressInvalidFormat",
///       "message": "The input is not a valid email address. Use the basic format local-part@hostname" }
///   ]
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, PartialEq, ToSchema)]
pub struct ValidationResponse {
    pub is_valid: bool,
    pub messages: Vec<ValidationMessage>,
}

impl From<&Report> for ValidationResponse {
    fn from(report: &Report) -> Self {
        Self {
            is_valid: report.is_empty(),
            messages: report
                .iter()
                .map(|(code, message)| ValidationMessage {
                    code: code.to_string(),
                    message: message.to_string(),
                })
                .collect(),
        }
    }
}
