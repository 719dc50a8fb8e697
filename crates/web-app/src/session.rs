use fittrack_domain::{ReadError, SessionService, StorageError, User};

use crate::{Notification, Notifications};

/// Authentication state as seen by the client. Without a user nothing but the login surface is
/// accessible.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Unknown,
    SignedOut,
    SignedIn(User),
}

impl SessionState {
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::SignedIn(user) => Some(user),
            SessionState::Unknown | SessionState::SignedOut => None,
        }
    }

    #[must_use]
    pub fn requires_login(&self) -> bool {
        *self == SessionState::SignedOut
    }
}

pub async fn restore_session<S: SessionService>(
    service: &S,
    notifications: &mut Notifications,
) -> SessionState {
    match service.get_session().await {
        Ok(user) => SessionState::SignedIn(user),
        Err(ReadError::Storage(StorageError::NoSession)) => SessionState::SignedOut,
        Err(err) => {
            notifications.push(Notification::failure("restore session", &err));
            SessionState::SignedOut
        }
    }
}

pub async fn sign_in<S: SessionService>(
    service: &S,
    email: &str,
    password: &str,
    notifications: &mut Notifications,
) -> SessionState {
    match service.request_session(email, password).await {
        Ok(user) => SessionState::SignedIn(user),
        Err(ReadError::Storage(StorageError::NoSession)) => {
            notifications.push(Notification::error("Invalid email or password"));
            SessionState::SignedOut
        }
        Err(err) => {
            notifications.push(Notification::failure("sign in", &err));
            SessionState::SignedOut
        }
    }
}

pub async fn sign_out<S: SessionService>(
    service: &S,
    notifications: &mut Notifications,
) -> SessionState {
    if let Err(err) = service.delete_session().await {
        notifications.push(Notification::failure("sign out", &err));
    }
    SessionState::SignedOut
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::tests::service::{MockService, user};

    #[tokio::test]
    async fn test_restore_session_signed_out() {
        let service = MockService::default();
        let mut notifications = Notifications::default();

        let state = restore_session(&service, &mut notifications).await;

        assert_eq!(state, SessionState::SignedOut);
        assert!(state.requires_login());
        assert!(notifications.is_empty());
    }

    #[tokio::test]
    async fn test_sign_in() {
        let service = MockService::default();
        let mut notifications = Notifications::default();

        let state = sign_in(&service, "alice@example.com", "secret", &mut notifications).await;

        assert_eq!(state.user(), Some(&user()));
        assert!(!state.requires_login());
        assert_eq!(
            restore_session(&service, &mut notifications).await,
            SessionState::SignedIn(user())
        );
        assert!(notifications.is_empty());
    }

    #[tokio::test]
    async fn test_sign_in_invalid_credentials() {
        let service = MockService::default();
        let mut notifications = Notifications::default();

        let state = sign_in(&service, "alice@example.com", "wrong", &mut notifications).await;

        assert_eq!(state, SessionState::SignedOut);
        assert_eq!(
            notifications.messages().collect::<Vec<_>>(),
            vec!["Invalid email or password"]
        );
    }

    #[tokio::test]
    async fn test_sign_in_no_connection() {
        let service = MockService::default();
        service.offline.set(true);
        let mut notifications = Notifications::default();

        sign_in(&service, "alice@example.com", "secret", &mut notifications).await;

        assert_eq!(
            notifications.messages().collect::<Vec<_>>(),
            vec!["Failed to sign in: no connection"]
        );
    }

    #[tokio::test]
    async fn test_sign_out() {
        let service = MockService::default();
        let mut notifications = Notifications::default();
        sign_in(&service, "alice@example.com", "secret", &mut notifications).await;

        let state = sign_out(&service, &mut notifications).await;

        assert_eq!(state, SessionState::SignedOut);
        assert_eq!(
            restore_session(&service, &mut notifications).await,
            SessionState::SignedOut
        );
    }

    #[test]
    fn test_unknown_state() {
        let state = SessionState::default();

        assert_eq!(state.user(), None);
        assert!(!state.requires_login());
    }
}
