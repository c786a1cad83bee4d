//! CRM session composition root
//!
//! Wires the file-backed token store and the logging navigator into a
//! [`SessionManager`] and implements the command line operations on top.

pub mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use crm_session::mock::encode_test_token;
use crm_session::{FileTokenStore, SessionClaims, SessionManager, TracingNavigator, UserIdentity};
use serde::Serialize;

use crate::config::Config;

/// Build the session manager and restore any persisted session
pub fn create_session_manager(config: &Config) -> SessionManager {
    let store = FileTokenStore::new(&config.store_path);
    let manager = SessionManager::new(
        config.session.clone(),
        Arc::new(store),
        Arc::new(TracingNavigator),
    );

    // Drops an expired persisted token too
    manager.initialize();

    manager
}

/// Session summary printed by `status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub state: String,
    pub user: Option<UserIdentity>,
    pub expires_at: Option<String>,
    /// Set when the last storage call failed; the session will not survive
    /// a restart until storage recovers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_error: Option<String>,
}

pub fn status(manager: &SessionManager) -> SessionStatus {
    let session = manager.snapshot();
    SessionStatus {
        state: session.state().to_string(),
        user: session.user().cloned(),
        expires_at: session.expires_at().map(|at| at.to_rfc3339()),
        storage_error: manager.storage_error().map(|e| e.to_string()),
    }
}

/// Claims for a locally minted development token
#[derive(Debug, Clone, Default)]
pub struct MintRequest {
    pub email: String,
    pub name: Option<String>,
    pub role: Option<String>,
    pub profile_pic: Option<String>,
    pub ttl_secs: Option<i64>,
}

/// Produce a token the session accepts, for local development without the
/// auth service. It is not signed with any key the API trusts.
pub fn mint_token(request: MintRequest) -> Result<String> {
    let now = chrono::Utc::now().timestamp();
    let claims = SessionClaims {
        sub: request.email,
        name: request.name,
        role: request.role,
        profile_pic: request.profile_pic,
        exp: request.ttl_secs.map(|ttl| now.saturating_add(ttl)),
        iat: Some(now),
    };

    encode_test_token(&claims).context("Failed to encode development token")
}
