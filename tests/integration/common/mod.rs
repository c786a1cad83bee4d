//! Common test utilities and fixtures for integration tests
//!
//! - On-disk session fixtures backed by a temporary directory
//! - Token minting with claims chosen per test
//! - Restart simulation against the same store file

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use crm_session::mock::{FixedClock, RecordingNavigator};
use crm_session::{FileTokenStore, SessionClaims, SessionConfig, SessionManager};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use tempfile::TempDir;

/// Issuer-side secret; the client never sees it
pub const ISSUER_SECRET: &str = "test_secret_key_for_testing_only"; // pragma: allowlist secret

/// A session store file that outlives individual managers
pub struct TestSession {
    pub dir: TempDir,
    pub config: SessionConfig,
    pub clock: FixedClock,
}

/// One "process": a manager plus the navigator it reports to
pub struct TestProcess {
    pub manager: SessionManager,
    pub navigator: RecordingNavigator,
}

impl TestSession {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
            config: SessionConfig::default(),
            clock: FixedClock::new(Utc::now()),
        })
    }

    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("crm-session.json")
    }

    /// Start a process against the shared store and run `initialize`
    pub fn start(&self) -> TestProcess {
        let navigator = RecordingNavigator::new();
        let manager = SessionManager::with_clock(
            self.config.clone(),
            Arc::new(FileTokenStore::new(self.store_path())),
            Arc::new(navigator.clone()),
            Arc::new(self.clock.clone()),
        );
        manager.initialize();
        TestProcess { manager, navigator }
    }

    /// Raw store contents, as a reloaded browser would see them
    pub fn persisted(&self) -> serde_json::Value {
        std::fs::read_to_string(self.store_path())
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or(serde_json::Value::Null)
    }
}

/// Claims fixture builder
pub struct UserFixture {
    pub claims: SessionClaims,
}

impl UserFixture {
    pub fn new(email: &str) -> Self {
        Self {
            claims: SessionClaims::new(email),
        }
    }

    pub fn asha() -> Self {
        Self::new("asha@example.com").name("Asha").role("admin")
    }

    pub fn name(mut self, name: &str) -> Self {
        self.claims.name = Some(name.to_string());
        self
    }

    pub fn role(mut self, role: &str) -> Self {
        self.claims.role = Some(role.to_string());
        self
    }

    pub fn profile_pic(mut self, url: &str) -> Self {
        self.claims.profile_pic = Some(url.to_string());
        self
    }

    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.claims.exp = Some(at.timestamp());
        self
    }

    /// Sign like the auth service does
    pub fn token(&self) -> String {
        let header = Header::new(Algorithm::HS256);
        let key = EncodingKey::from_secret(ISSUER_SECRET.as_bytes());
        jsonwebtoken::encode(&header, &self.claims, &key).expect("Failed to encode JWT")
    }
}
