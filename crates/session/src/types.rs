//! Session value types
//!
//! A [`Session`] is only ever built from a token and the claims decoded from
//! that same token, so the signed-in user can never drift from the token it
//! came from.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::claims::SessionClaims;
use crate::jwt::bearer_header;
use crate::state::SessionState;

/// Identity of the signed-in user, derived from token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub name: String,
    pub email: String,
    pub role: String,
    pub profile_picture: Option<String>,
}

impl UserIdentity {
    /// Build the identity shown across the dashboard from token claims
    pub fn from_claims(claims: &SessionClaims) -> Self {
        Self {
            name: claims.name.clone().unwrap_or_default(),
            email: claims.sub.clone(),
            role: claims.role.clone().unwrap_or_default(),
            profile_picture: claims.profile_pic.clone(),
        }
    }

    /// Name for the sidebar, `"User"` when the token carries none
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "User"
        } else {
            &self.name
        }
    }

    /// Role for the sidebar, `"Role"` when the token carries none
    pub fn display_role(&self) -> &str {
        if self.role.is_empty() {
            "Role"
        } else {
            &self.role
        }
    }

    /// Avatar placeholder letter
    pub fn initial(&self) -> Option<char> {
        self.name.chars().next()
    }

    pub fn has_role(&self, role: &str) -> bool {
        !self.role.is_empty() && self.role.eq_ignore_ascii_case(role)
    }
}

/// Token plus the identity derived from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    user: Option<UserIdentity>,
    expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Session for `token`, with the user derived from its decoded `claims`
    pub(crate) fn authenticated(token: String, claims: &SessionClaims) -> Self {
        Self {
            token: Some(token),
            user: Some(UserIdentity::from_claims(claims)),
            expires_at: claims.exp.and_then(|exp| DateTime::from_timestamp(exp, 0)),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&UserIdentity> {
        self.user.as_ref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn state(&self) -> SessionState {
        if self.token.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    /// `Authorization` header value for API requests, if signed in
    pub fn authorization_header(&self) -> Option<String> {
        self.token.as_deref().map(bearer_header)
    }

    /// Whether the token's `exp` plus `leeway_secs` is at or before `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>, leeway_secs: u64) -> bool {
        let Some(expires_at) = self.expires_at else {
            return false;
        };

        // An unrepresentable leeway pushes the deadline past any `now`
        i64::try_from(leeway_secs)
            .ok()
            .and_then(chrono::TimeDelta::try_seconds)
            .and_then(|leeway| expires_at.checked_add_signed(leeway))
            .is_some_and(|deadline| deadline <= now)
    }
}
