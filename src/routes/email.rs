use actix_web::{HttpResponse, Responder, post, web};
use serde::Deserialize;
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::models::ValidationResponse;
use crate::validation::{
    ConfigError, EmailAddress, EmailOptions, Hostname, HostnameOptions, hostname,
};

/// Hostname classes a request may allow, combined into the validator's
/// allow mask. When the field is omitted only DNS hostnames are accepted.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AllowKind {
    Dns,
    Ipv4,
    Ipv6,
    Local,
    Ip,
    All,
}

impl AllowKind {
    fn bits(self) -> u8 {
        match self {
            AllowKind::Dns => hostname::ALLOW_DNS,
            AllowKind::Ipv4 => hostname::ALLOW_IPV4,
            AllowKind::Ipv6 => hostname::ALLOW_IPV6,
            AllowKind::Local => hostname::ALLOW_LOCAL,
            AllowKind::Ip => hostname::ALLOW_IP,
            AllowKind::All => hostname::ALLOW_ALL,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct EmailValidationRequest {
    /// The value to validate. Any JSON value is accepted; non-strings fail
    /// with `emailAddressInvalid`.
    pub email: Value,
    #[serde(default)]
    pub allow: Option<Vec<AllowKind>>,
    #[serde(default = "default_true")]
    pub strict: bool,
    #[serde(default)]
    pub use_mx_check: bool,
    #[serde(default)]
    pub use_deep_mx_check: bool,
    #[serde(default = "default_true")]
    pub use_tld_check: bool,
    #[serde(default = "default_true")]
    pub use_idn_check: bool,
}

fn default_true() -> bool {
    true
}

impl EmailValidationRequest {
    fn allow_mask(&self) -> u8 {
        match &self.allow {
            Some(kinds) => kinds.iter().fold(0, |mask, kind| mask | kind.bits()),
            None => hostname::ALLOW_DNS,
        }
    }

    fn build_validator(&self) -> Result<EmailAddress, ConfigError> {
        let hostname = Hostname::new(HostnameOptions {
            allow: self.allow_mask(),
            use_tld_check: self.use_tld_check,
            use_idn_check: self.use_idn_check,
            ..Default::default()
        })?;
        EmailAddress::new(EmailOptions {
            strict: self.strict,
            use_mx_check: self.use_mx_check,
            use_deep_mx_check: self.use_deep_mx_check,
            hostname: Some(hostname),
            ..Default::default()
        })
    }
}

/// # Email Validation Endpoint
///
/// Validates an email address against RFC 5321/5322 grammar rules, with
/// optional live MX verification.
///
/// ## Request
/// - Method: POST
/// - Body: JSON object with an `email` field plus optional knobs:
///   - `allow`: hostname classes to accept (`dns`, `ipv4`, `ipv6`, `local`,
///     `ip`, `all`); defaults to DNS hostnames only
///   - `strict`: enforce the 64-octet local-part ceiling (default `true`)
///   - `use_mx_check` / `use_deep_mx_check`: DNS-backed MX verification
///   - `use_tld_check` / `use_idn_check`: hostname grammar knobs
///
/// ## Responses
/// - **200 OK**: value is valid; `messages` is empty
/// - **400 Bad Request**: value is invalid (ordered violation list) or the
///   request options were rejected (`INVALID_CONFIGURATION`)
/// - **500 Internal Server Error**: validation task failed to run
///
/// ## Example Request
/// ```json
/// { "email": "user@example.com", "use_mx_check": true }
/// ```
#[utoipa::path(
    post,
    path = "/api/v1/validate-email",
    request_body = EmailValidationRequest,
    responses(
        (status = 200, description = "Email is valid", body = ValidationResponse),
        (status = 400, description = "Email is invalid or options were rejected", body = ValidationResponse),
        (status = 500, description = "Server error")
    ),
    tag = "Email Validation"
)]
#[post("/validate-email")]
pub async fn validate_email(
    req: web::Json<EmailValidationRequest>,
) -> Result<impl Responder, actix_web::Error> {
    let request = req.into_inner();

    let validator = match request.build_validator() {
        Ok(validator) => validator,
        Err(error) => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "error": "INVALID_CONFIGURATION",
                "message": error.to_string()
            })));
        }
    };

    // MX verification does blocking DNS lookups, so the whole validation
    // runs on the blocking pool.
    let value = request.email;
    let report = web::block(move || validator.validate(&value))
        .await
        .map_err(|e| {
            actix_web::error::ErrorInternalServerError(format!("validation task failed: {e}"))
        })?;

    let response = ValidationResponse::from(&report);
    if response.is_valid {
        Ok(HttpResponse::Ok().json(response))
    } else {
        Ok(HttpResponse::BadRequest().json(response))
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(validate_email);
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test};

    async fn post_validate(body: Value) -> (u16, ValidationResponse) {
        let app = test::init_service(App::new().configure(configure_routes)).await;
        let req = test::TestRequest::post()
            .uri("/validate-email")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status().as_u16();
        let body = test::read_body(resp).await;
        let parsed: ValidationResponse = serde_json::from_slice(&body).unwrap();
        (status, parsed)
    }

    #[actix_web::test]
    async fn test_valid_email_returns_ok() {
        let (status, response) = post_validate(json!({"email": "user@example.com"})).await;
        assert_eq!(status, 200);
        assert!(response.is_valid);
        assert!(response.messages.is_empty());
    }

    #[actix_web::test]
    async fn test_invalid_local_part_lists_all_codes_in_order() {
        let (status, response) = post_validate(json!({"email": "Some User@example.com"})).await;
        assert_eq!(status, 400);
        assert!(!response.is_valid);

        let codes: Vec<&str> = response.messages.iter().map(|m| m.code.as_str()).collect();
        assert_eq!(
            codes,
            vec![
                "emailAddressDotAtom",
                "emailAddressQuotedString",
                "emailAddressInvalidLocalPart"
            ]
        );
    }

    #[actix_web::test]
    async fn test_missing_at_sign_reports_invalid_format() {
        let (status, response) = post_validate(json!({"email": "not-an-email"})).await;
        assert_eq!(status, 400);
        assert_eq!(response.messages.len(), 1);
        assert_eq!(response.messages[0].code, "emailAddressInvalidFormat");
    }

    #[actix_web::test]
    async fn test_non_string_email_reports_wrong_type() {
        let (status, response) = post_validate(json!({"email": 42})).await;
        assert_eq!(status, 400);
        assert_eq!(response.messages[0].code, "emailAddressInvalid");
    }

    #[actix_web::test]
    async fn test_allow_local_accepts_localhost() {
        let (status, response) = post_validate(json!({
            "email": "root@localhost",
            "allow": ["dns", "local"]
        }))
        .await;
        assert_eq!(status, 200);
        assert!(response.is_valid);
    }

    #[actix_web::test]
    async fn test_ip_hosts_need_the_ip_allow_flag() {
        let (status, response) = post_validate(json!({"email": "me@127.0.0.1"})).await;
        assert_eq!(status, 400);
        let codes: Vec<&str> = response.messages.iter().map(|m| m.code.as_str()).collect();
        assert!(codes.contains(&"hostnameIpAddressNotAllowed"));

        let (status, _) = post_validate(json!({
            "email": "me@212.212.20.4",
            "allow": ["dns", "ip"]
        }))
        .await;
        assert_eq!(status, 200);
    }

    #[actix_web::test]
    async fn test_tld_check_can_be_disabled() {
        let (status, _) = post_validate(json!({"email": "name@domain.madeup"})).await;
        assert_eq!(status, 400);

        let (status, response) = post_validate(json!({
            "email": "name@domain.madeup",
            "use_tld_check": false
        }))
        .await;
        assert_eq!(status, 200);
        assert!(response.is_valid);
    }

    #[actix_web::test]
    async fn test_non_strict_lifts_length_ceiling() {
        let long_local = "x".repeat(200);
        let (status, response) = post_validate(json!({
            "email": format!("{long_local}@example.com")
        }))
        .await;
        assert_eq!(status, 400);
        assert_eq!(response.messages[0].code, "emailAddressLengthExceeded");

        let (status, _) = post_validate(json!({
            "email": format!("{long_local}@example.com"),
            "strict": false
        }))
        .await;
        assert_eq!(status, 200);
    }

    #[actix_web::test]
    async fn test_missing_email_field_is_a_deserialization_error() {
        let app = test::init_service(App::new().configure(configure_routes)).await;
        let req = test::TestRequest::post()
            .uri("/validate-email")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 400);
    }
}
