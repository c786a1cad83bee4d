//! Session state machine
//!
//! Two states, no terminal state:
//! - `Anonymous --login--> Authenticated`
//! - `Authenticated --login--> Authenticated` (re-authentication)
//! - `Authenticated --logout | expired | unauthorized--> Anonymous`
//! - decode failure while restoring always lands in `Anonymous`

use thiserror::Error;

/// Errors that can occur during state transitions
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateError {
    #[error("Invalid transition: cannot transition from {from} to {to} via {event}")]
    InvalidTransition {
        from: String,
        to: String,
        event: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

impl SessionState {
    /// Get all valid next states from current state
    pub fn valid_transitions(&self) -> &'static [SessionState] {
        match self {
            Self::Anonymous => &[Self::Anonymous, Self::Authenticated],
            Self::Authenticated => &[Self::Anonymous, Self::Authenticated],
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous => write!(f, "anonymous"),
            Self::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// Events that trigger session state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A decodable credential was accepted
    Login,
    /// User signed out
    Logout,
    /// Persisted token failed to decode on startup
    DecodeFailed,
    /// Token `exp` passed
    Expired,
    /// API rejected the token with 401
    Unauthorized,
}

impl std::fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Login => write!(f, "login"),
            Self::Logout => write!(f, "logout"),
            Self::DecodeFailed => write!(f, "decode_failed"),
            Self::Expired => write!(f, "expired"),
            Self::Unauthorized => write!(f, "unauthorized"),
        }
    }
}

/// Session state machine
pub struct SessionStateMachine;

impl SessionStateMachine {
    /// Attempt a state transition
    ///
    /// Returns the new state if the transition is valid, or an error otherwise.
    pub fn transition(
        current: SessionState,
        event: SessionEvent,
    ) -> Result<SessionState, StateError> {
        let next = match (current, event) {
            (_, SessionEvent::Login) => SessionState::Authenticated,
            (_, SessionEvent::Logout) => SessionState::Anonymous,
            (_, SessionEvent::DecodeFailed) => SessionState::Anonymous,

            (SessionState::Authenticated, SessionEvent::Expired) => SessionState::Anonymous,
            (SessionState::Authenticated, SessionEvent::Unauthorized) => SessionState::Anonymous,

            // Nothing to expire or reject while signed out
            (SessionState::Anonymous, SessionEvent::Expired | SessionEvent::Unauthorized) => {
                return Err(StateError::InvalidTransition {
                    from: current.to_string(),
                    to: SessionState::Anonymous.to_string(),
                    event: event.to_string(),
                });
            }
        };

        Ok(next)
    }

    /// Check if a transition is valid without performing it
    pub fn can_transition(current: SessionState, event: SessionEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
