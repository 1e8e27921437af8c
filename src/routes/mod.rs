use actix_web::web;

/// # Health Check Endpoint
///
/// Returns the current health status of the service along with a timestamp.
pub mod health;

/// # Email Validation Endpoint
///
/// Validates an email address: RFC 5321/5322 local-part grammar, hostname
/// classification with IDN and TLD checks, and optional live MX
/// verification.
pub mod email;

/// # IBAN Validation Endpoint
///
/// Validates an International Bank Account Number: per-country structure,
/// ISO 7064 MOD 97-10 check digits, and SEPA membership.
pub mod iban;

/// # API Route Configuration
///
/// Sets up versioned API endpoints under the `/api/v1` base path.
///
/// ## Example Endpoints
///
/// ```text
/// GET /api/v1/health - Service health status
/// POST /api/v1/validate-email - Email validation endpoint
/// POST /api/v1/validate-iban - IBAN validation endpoint
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::configure_routes)
            .configure(email::configure_routes)
            .configure(iban::configure_routes),
    );
}
