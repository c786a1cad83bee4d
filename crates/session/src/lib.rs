//! Session management for the CRM dashboard
//!
//! Owns the bearer token, derives the signed-in user from its claims,
//! mirrors the token to a persistent key-value store and publishes every
//! committed session to subscribed views.

mod claims;
mod clock;
mod config;
mod error;
mod jwt;
mod manager;
pub mod mock;
mod navigation;
mod state;
mod storage;
mod types;

pub use claims::SessionClaims;
pub use clock::{Clock, SystemClock};
pub use config::SessionConfig;
pub use error::{SessionError, StorageError};
pub use jwt::{bearer_header, decode_claims, extract_bearer_token};
pub use manager::SessionManager;
pub use navigation::{Navigator, Route, TracingNavigator};
pub use state::{SessionEvent, SessionState, SessionStateMachine, StateError};
pub use storage::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use types::{Session, UserIdentity};
