use utoipa::OpenApi;

/// OpenAPI Specification Documentation
///
/// Defines the API contract using OpenAPI 3.0 format with utoipa procedural macros.
///
/// # Endpoints
/// - Health Check: `GET /api/v1/health`
/// - Email Validation: `POST /api/v1/validate-email`
/// - IBAN Validation: `POST /api/v1/validate-iban`
///
/// # Note
/// The OpenAPI spec is generated at compile time from these annotations. Any changes
/// to the API surface should be reflected here first to maintain documentation accuracy.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health,
        crate::routes::email::validate_email,
        crate::routes::iban::validate_iban,
    ),
    components(
        schemas(
            crate::models::health::HealthResponse,
            crate::models::validation::ValidationMessage,
            crate::models::validation::ValidationResponse,
            crate::routes::email::EmailValidationRequest,
            crate::routes::email::AllowKind,
            crate::routes::iban::IbanValidationRequest
        )
    ),
    tags(
        (name = "Health Check", description = "Service health monitoring endpoints"),
        (name = "Email Validation", description = "Email address validation endpoints"),
        (name = "IBAN Validation", description = "IBAN validation endpoints")
    ),
    info(
        description = "API for validating structured values: email addresses and IBANs",
        title = "Value Validator API",
        version = "0.3.0",
    )
)]
pub struct ApiDoc;
