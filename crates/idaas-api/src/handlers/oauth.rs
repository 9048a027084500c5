//! OAuth2 client-credentials token endpoint.

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::{Form, Json};

use idaas_core::error::AppError;

use crate::dto::request::TokenRequest;
use crate::dto::response::OAuthTokenResponse;
use crate::extractors::auth::basic_credentials;
use crate::state::AppState;

/// The only supported grant.
pub const CLIENT_CREDENTIALS: &str = "client_credentials";

/// POST /oauth/token
///
/// Credentials are checked before the grant type.
pub async fn token(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<TokenRequest>, FormRejection>,
) -> Result<Json<OAuthTokenResponse>, AppError> {
    let (client_id, client_secret) = basic_credentials(&headers)?;
    let client = state
        .registry
        .verify_client_credentials(&client_id, &client_secret)
        .await?;

    let grant_type = form.ok().and_then(|Form(req)| req.grant_type);
    if grant_type.as_deref() != Some(CLIENT_CREDENTIALS) {
        return Err(AppError::validation("grant_type must be client_credentials"));
    }

    let issued = state
        .tokens
        .issue_service_access_token(&client, state.tokens.service_access_ttl())
        .await?;

    Ok(Json(OAuthTokenResponse {
        scope: issued.scopes.join(" "),
        access_token: issued.access_token,
        token_type: issued.token_type,
        expires_in: issued.expires_in,
    }))
}
