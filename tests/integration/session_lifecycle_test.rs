//! Session lifecycle integration tests
//!
//! Drives the session manager against the on-disk token store the CLI uses:
//! login, logout, restart, corrupt storage and expiry.

use chrono::{TimeDelta, Utc};
use crm_session::{SessionError, SessionState, UserIdentity};
use serde_json::json;

use crate::common::{TestSession, UserFixture};

mod common;

mod test_login_logout {
    use super::*;

    #[test_log::test]
    fn test_login_persists_and_navigates() {
        let session = TestSession::new().unwrap();
        let process = session.start();

        let token = UserFixture::asha().token();
        process.manager.login(&token).unwrap();

        assert_eq!(process.manager.current_token(), Some(token.clone()));
        assert_eq!(
            process.manager.current_user(),
            Some(UserIdentity {
                name: "Asha".to_string(),
                email: "asha@example.com".to_string(),
                role: "admin".to_string(),
                profile_picture: None,
            })
        );
        assert_eq!(session.persisted(), json!({ "authToken": token }));
        assert_eq!(process.navigator.visits(), vec!["/dashboard"]);
    }

    #[test_log::test]
    fn test_garbage_login_changes_nothing() {
        let session = TestSession::new().unwrap();
        let process = session.start();

        let result = process.manager.login("garbage-token");

        assert_eq!(result, Err(SessionError::InvalidCredential));
        assert_eq!(process.manager.state(), SessionState::Anonymous);
        assert_eq!(session.persisted(), serde_json::Value::Null);
        assert!(process.navigator.visits().is_empty());
    }

    #[test_log::test]
    fn test_logout_removes_persisted_token() {
        let session = TestSession::new().unwrap();
        let process = session.start();
        process.manager.login(&UserFixture::asha().token()).unwrap();

        process.manager.logout();
        process.manager.logout();

        assert_eq!(process.manager.current_token(), None);
        assert_eq!(process.manager.current_user(), None);
        assert_eq!(session.persisted(), json!({}));
        assert_eq!(
            process.navigator.visits(),
            vec!["/dashboard", "/login", "/login"]
        );
    }

    #[test_log::test]
    fn test_profile_picture_claim_is_exposed() {
        let session = TestSession::new().unwrap();
        let process = session.start();

        let token = UserFixture::new("lee@example.com")
            .name("Lee")
            .role("sales")
            .profile_pic("https://cdn.example.com/lee.png")
            .token();
        process.manager.login(&token).unwrap();

        let user = process.manager.current_user().unwrap();
        assert_eq!(
            user.profile_picture.as_deref(),
            Some("https://cdn.example.com/lee.png")
        );
        assert_eq!(user.initial(), Some('L'));
    }
}

mod test_restart {
    use super::*;

    #[test_log::test]
    fn test_restart_reconstructs_same_session() {
        let session = TestSession::new().unwrap();
        let first = session.start();
        first.manager.login(&UserFixture::asha().token()).unwrap();
        let before = first.manager.snapshot();
        drop(first);

        let second = session.start();

        assert_eq!(second.manager.snapshot(), before);
        assert!(second.navigator.visits().is_empty());
    }

    #[test_log::test]
    fn test_restart_after_logout_is_anonymous() {
        let session = TestSession::new().unwrap();
        let first = session.start();
        first.manager.login(&UserFixture::asha().token()).unwrap();
        first.manager.logout();

        let second = session.start();
        assert_eq!(second.manager.state(), SessionState::Anonymous);
    }

    #[test_log::test]
    fn test_restart_with_malformed_token_is_anonymous() {
        let session = TestSession::new().unwrap();
        std::fs::write(
            session.store_path(),
            json!({ "authToken": "x.y.z", "theme": "dark" }).to_string(),
        )
        .unwrap();

        let process = session.start();

        assert_eq!(process.manager.state(), SessionState::Anonymous);
        assert_eq!(process.manager.current_user(), None);
        // Only the session key is cleared
        assert_eq!(session.persisted(), json!({ "theme": "dark" }));
    }

    #[test_log::test]
    fn test_restart_with_corrupt_store_file_is_anonymous() {
        let session = TestSession::new().unwrap();
        std::fs::write(session.store_path(), "{ not json").unwrap();

        let process = session.start();
        assert_eq!(process.manager.state(), SessionState::Anonymous);

        // A later login rewrites the file
        let token = UserFixture::asha().token();
        process.manager.login(&token).unwrap();
        assert_eq!(session.persisted(), json!({ "authToken": token }));
    }
}

mod test_expiry {
    use super::*;

    #[test_log::test]
    fn test_expired_token_dropped_on_restart() {
        let session = TestSession::new().unwrap();
        let first = session.start();
        let token = UserFixture::asha()
            .expires_at(Utc::now() + TimeDelta::minutes(30))
            .token();
        first.manager.login(&token).unwrap();

        session.clock.advance(TimeDelta::hours(1));
        let second = session.start();

        assert_eq!(second.manager.state(), SessionState::Anonymous);
        assert_eq!(session.persisted(), json!({}));
    }

    #[test_log::test]
    fn test_expire_if_stale_while_running() {
        let session = TestSession::new().unwrap();
        let process = session.start();
        let token = UserFixture::asha()
            .expires_at(Utc::now() + TimeDelta::minutes(5))
            .token();
        process.manager.login(&token).unwrap();

        assert!(!process.manager.expire_if_stale());

        session.clock.advance(TimeDelta::minutes(6));
        assert!(process.manager.expire_if_stale());
        assert_eq!(process.manager.current_user(), None);
        assert_eq!(session.persisted(), json!({}));
    }

    #[test_log::test]
    fn test_api_rejection_ends_session() {
        let session = TestSession::new().unwrap();
        let process = session.start();
        process.manager.login(&UserFixture::asha().token()).unwrap();

        process.manager.handle_unauthorized();

        assert_eq!(process.manager.state(), SessionState::Anonymous);
        assert_eq!(process.navigator.last_visit().as_deref(), Some("/login"));
        assert_eq!(session.start().manager.state(), SessionState::Anonymous);
    }
}

mod test_subscribers {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_views_follow_login_and_logout() {
        let session = TestSession::new().unwrap();
        let process = session.start();
        let mut sidebar = process.manager.subscribe();

        process.manager.login(&UserFixture::asha().token()).unwrap();
        sidebar.changed().await.unwrap();
        let name = sidebar
            .borrow_and_update()
            .user()
            .map(|user| user.display_name().to_string());
        assert_eq!(name.as_deref(), Some("Asha"));

        process.manager.logout();
        sidebar.changed().await.unwrap();
        assert!(!sidebar.borrow_and_update().is_authenticated());
    }
}
