//! Bearer token decoding and header helpers
//!
//! Tokens are decoded for their claims only. The signature is not checked
//! here: the API verifies every request it receives, and the client only
//! needs the claims to show who is signed in and to pick a landing route.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::claims::SessionClaims;
use crate::error::SessionError;

const BEARER_PREFIX: &str = "Bearer ";

/// Decode the payload of a JWT into [`SessionClaims`] without verifying it
pub fn decode_claims(token: &str) -> Result<SessionClaims, SessionError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let decoding_key = DecodingKey::from_secret(&[]);

    let token_data = decode::<SessionClaims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!(error = %e, "Token decode failed");
        SessionError::InvalidToken
    })?;

    Ok(token_data.claims)
}

/// Format the value of an `Authorization` header for a token
pub fn bearer_header(token: &str) -> String {
    format!("{BEARER_PREFIX}{token}")
}

/// Extract bearer token from an `Authorization` header value
pub fn extract_bearer_token(header: &str) -> Result<&str, SessionError> {
    match header.strip_prefix(BEARER_PREFIX) {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(SessionError::InvalidAuthorizationFormat),
    }
}
