use actix_web::{HttpResponse, Responder, post, web};
use serde::Deserialize;
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::models::ValidationResponse;
use crate::validation::{Iban, IbanOptions};

#[derive(Deserialize, ToSchema)]
pub struct IbanValidationRequest {
    /// The value to validate. Any JSON value is accepted; non-strings fail
    /// with `ibanFalseFormat`.
    pub iban: Value,
    /// Pins validation to one country's IBAN structure instead of reading
    /// the country from the value's prefix.
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default = "default_true")]
    pub allow_non_sepa: bool,
}

fn default_true() -> bool {
    true
}

/// # IBAN Validation Endpoint
///
/// Validates an International Bank Account Number: per-country structure,
/// ISO 7064 MOD 97-10 check digits, and optionally SEPA membership.
///
/// ## Request
/// - Method: POST
/// - Body: JSON object with an `iban` field plus optional knobs:
///   - `country_code`: ISO 3166-1 alpha-2 code to validate against
///   - `allow_non_sepa`: accept countries outside SEPA (default `true`)
///
/// ## Responses
/// - **200 OK**: value is valid; `messages` is empty
/// - **400 Bad Request**: value is invalid (ordered violation list) or the
///   request options were rejected (`INVALID_CONFIGURATION`)
///
/// ## Example Request
/// ```json
/// { "iban": "DE89370400440532013000" }
/// ```
#[utoipa::path(
    post,
    path = "/api/v1/validate-iban",
    request_body = IbanValidationRequest,
    responses(
        (status = 200, description = "IBAN is valid", body = ValidationResponse),
        (status = 400, description = "IBAN is invalid or options were rejected", body = ValidationResponse)
    ),
    tag = "IBAN Validation"
)]
#[post("/validate-iban")]
pub async fn validate_iban(req: web::Json<IbanValidationRequest>) -> impl Responder {
    let request = req.into_inner();

    let validator = match Iban::new(IbanOptions {
        country_code: request.country_code,
        allow_non_sepa: request.allow_non_sepa,
        ..Default::default()
    }) {
        Ok(validator) => validator,
        Err(error) => {
            return HttpResponse::BadRequest().json(json!({
                "error": "INVALID_CONFIGURATION",
                "message": error.to_string()
            }));
        }
    };

    let response = ValidationResponse::from(&validator.validate(&request.iban));
    if response.is_valid {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::BadRequest().json(response)
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(validate_iban);
}
