//! Request DTOs with validation.

use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use idaas_core::error::AppError;
use idaas_core::result::AppResult;

/// Run `validator` rules and turn failures into a validation error naming
/// the offending fields.
pub fn validate_body<T: Validate>(body: &T) -> AppResult<()> {
    body.validate().map_err(|errors| {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|k| k.to_string())
            .collect();
        fields.sort();
        AppError::validation(format!("Invalid request: {errors}"))
            .with_details(json!({ "fields": fields }))
    })
}

/// Form body of `POST /oauth/token`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenRequest {
    pub grant_type: Option<String>,
}

/// Tenant creation body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTenantRequest {
    #[validate(length(min = 1, max = 255, message = "Tenant name is required"))]
    pub name: String,
}

/// User registration body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub profile: Option<serde_json::Value>,
}

/// User login body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token refresh body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Internal-service registration body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterServiceRequest {
    #[validate(length(min = 1, max = 255, message = "service_name is required"))]
    pub service_name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// Credential exchange body of the registry.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AuthenticateServiceRequest {
    #[validate(length(min = 1, message = "client_id is required"))]
    pub client_id: String,
    #[validate(length(min = 1, message = "client_secret is required"))]
    pub client_secret: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ValidateTokenRequest {
    #[validate(length(min = 1, message = "token is required"))]
    pub token: String,
}

/// Body of grant-scope, revoke-scope and check-permission.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ScopeRequest {
    #[validate(length(min = 1, message = "client_id is required"))]
    pub client_id: String,
    #[validate(length(min = 1, message = "scope_name is required"))]
    pub scope_name: String,
}

/// Partial user update from the internal API.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateUserBody {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
    pub profile: Option<serde_json::Value>,
}

/// User named by a service asking for a user access token.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct IssueUserTokenRequest {
    #[validate(length(min = 1, message = "user_id is required"))]
    pub user_id: String,
}

/// `?tenant_id=` of the internal user endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct TenantFilter {
    pub tenant_id: String,
}
