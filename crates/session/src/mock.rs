//! Test doubles for the session collaborators
//!
//! Used by unit and integration tests and by the CLI's `mint` command to
//! produce tokens without a running auth service.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::claims::SessionClaims;
use crate::clock::Clock;
use crate::error::StorageError;
use crate::navigation::Navigator;
use crate::storage::TokenStore;

/// Navigator capturing every requested path
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    visits: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths visited so far, oldest first
    pub fn visits(&self) -> Vec<String> {
        self.visits
            .lock()
            .map(|visits| visits.clone())
            .unwrap_or_default()
    }

    pub fn last_visit(&self) -> Option<String> {
        self.visits().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        if let Ok(mut visits) = self.visits.lock() {
            visits.push(path.to_string());
        }
    }
}

/// Store whose every operation fails, like disabled browser storage
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingTokenStore;

impl TokenStore for FailingTokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("storage disabled".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("storage disabled".to_string()))
    }

    fn delete(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("storage disabled".to_string()))
    }
}

/// Manually advanced clock
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn advance(&self, by: chrono::TimeDelta) {
        if let Ok(mut current) = self.now.lock() {
            *current += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|now| *now).unwrap_or_else(|_| Utc::now())
    }
}

/// Sign `claims` with a throwaway HS256 key. The session never checks it.
pub fn encode_test_token(claims: &SessionClaims) -> Result<String, jsonwebtoken::errors::Error> {
    let header = jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256);
    let encoding_key = jsonwebtoken::EncodingKey::from_secret(b"crm-session-test-key");
    jsonwebtoken::encode(&header, claims, &encoding_key)
}
