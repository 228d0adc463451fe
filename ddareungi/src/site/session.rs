//! Session ownership and transparent re-authentication.
//!
//! The member site's session is a short-lived cookie that can expire
//! between or during refresh cycles. The manager owns that session
//! exclusively: it logs in lazily, detects expiry signalled by an
//! operation, re-authenticates exactly once with the original credentials
//! and retries the operation exactly once. A second consecutive
//! authorization failure surfaces as [`SiteError::Auth`] instead of
//! looping against a credential the site no longer accepts.

use std::fmt;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio::sync::Mutex;

use super::client::SiteClient;
use super::error::SiteError;

/// Login capability of the underlying client.
///
/// Split out so the retry policy can be exercised without a live site.
#[async_trait]
pub trait Authenticate: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<(), SiteError>;
}

#[async_trait]
impl Authenticate for SiteClient {
    async fn login(&self, username: &str, password: &str) -> Result<(), SiteError> {
        SiteClient::login(self, username, password).await
    }
}

/// Authentication lifecycle of one configured account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Authenticated,
    Expired,
    /// Terminal: login itself was rejected. Cleared only by reconfiguring
    /// the account (which builds a fresh manager).
    LoginFailed,
}

/// Owner of the authenticated session for one configured instance.
///
/// Never shared across instances; each configured account gets its own
/// manager with its own cookie jar.
pub struct SessionManager<C = SiteClient> {
    client: C,
    username: String,
    password: String,
    state: Mutex<SessionState>,
}

impl<C> fmt::Debug for SessionManager<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Credential material stays out of debug output.
        f.debug_struct("SessionManager")
            .field("username", &"<redacted>")
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl<C: Authenticate> SessionManager<C> {
    /// Create a manager that will log in on first use.
    pub fn new(client: C, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            client,
            username: username.into(),
            password: password.into(),
            state: Mutex::new(SessionState::Unauthenticated),
        }
    }

    /// Create a manager that optimistically trusts an existing session
    /// (e.g. a seeded cookie). The first authorization failure falls back
    /// to the normal re-login path.
    pub fn assuming_session(
        client: C,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            client,
            username: username.into(),
            password: password.into(),
            state: Mutex::new(SessionState::Authenticated),
        }
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> SessionState {
        *self.state.lock().await
    }

    /// Make sure a session exists, logging in if necessary.
    ///
    /// Holding the state lock across the login serializes concurrent
    /// callers onto a single login attempt.
    pub async fn ensure_session(&self) -> Result<(), SiteError> {
        let mut state = self.state.lock().await;
        match *state {
            SessionState::Authenticated => Ok(()),
            SessionState::LoginFailed => Err(SiteError::Auth),
            _ => {
                *state = SessionState::Authenticating;
                tracing::debug!("logging in to member site");
                match self.client.login(&self.username, &self.password).await {
                    Ok(()) => {
                        *state = SessionState::Authenticated;
                        Ok(())
                    }
                    Err(SiteError::Auth) => {
                        *state = SessionState::LoginFailed;
                        Err(SiteError::Auth)
                    }
                    Err(err) => {
                        // Network trouble is not a verdict on the
                        // credentials; the next cycle retries.
                        *state = SessionState::Unauthenticated;
                        Err(err)
                    }
                }
            }
        }
    }

    async fn mark_expired(&self) {
        let mut state = self.state.lock().await;
        if *state != SessionState::LoginFailed {
            *state = SessionState::Expired;
        }
    }

    /// Run one authenticated operation with bounded re-login.
    ///
    /// If the operation reports [`SiteError::SessionExpired`], the manager
    /// re-authenticates once and retries the operation once. A second
    /// expiry in a row becomes [`SiteError::Auth`]: the credential is
    /// treated as no longer valid rather than retried indefinitely.
    pub async fn with_session<T, F>(&self, op: F) -> Result<T, SiteError>
    where
        F: for<'a> Fn(&'a C) -> BoxFuture<'a, Result<T, SiteError>>,
    {
        self.ensure_session().await?;

        match op(&self.client).await {
            Err(SiteError::SessionExpired) => {
                tracing::debug!("session expired mid-operation; re-authenticating once");
                self.mark_expired().await;
                self.ensure_session().await?;

                match op(&self.client).await {
                    Err(SiteError::SessionExpired) => {
                        self.mark_expired().await;
                        Err(SiteError::Auth)
                    }
                    other => other,
                }
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeClient {
        login_calls: AtomicUsize,
        accept_login: bool,
    }

    impl FakeClient {
        fn new(accept_login: bool) -> Self {
            Self {
                login_calls: AtomicUsize::new(0),
                accept_login,
            }
        }
    }

    #[async_trait]
    impl Authenticate for FakeClient {
        async fn login(&self, _username: &str, _password: &str) -> Result<(), SiteError> {
            self.login_calls.fetch_add(1, Ordering::SeqCst);
            if self.accept_login {
                Ok(())
            } else {
                Err(SiteError::Auth)
            }
        }
    }

    #[tokio::test]
    async fn first_use_logs_in_lazily() {
        let manager = SessionManager::new(FakeClient::new(true), "user", "pass");
        assert_eq!(manager.state().await, SessionState::Unauthenticated);

        let value = manager
            .with_session(|_c| async { Ok::<_, SiteError>(7) }.boxed())
            .await
            .unwrap();

        assert_eq!(value, 7);
        assert_eq!(manager.state().await, SessionState::Authenticated);
        assert_eq!(manager.client.login_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expiry_triggers_exactly_one_relogin_then_retry() {
        let manager = SessionManager::assuming_session(FakeClient::new(true), "user", "pass");
        let attempts = Arc::new(AtomicUsize::new(0));

        let attempts_in_op = Arc::clone(&attempts);
        let value = manager
            .with_session(move |_c| {
                let attempts = Arc::clone(&attempts_in_op);
                async move {
                    if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(SiteError::SessionExpired)
                    } else {
                        Ok(99)
                    }
                }
                .boxed()
            })
            .await
            .unwrap();

        assert_eq!(value, 99);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(manager.client.login_calls.load(Ordering::SeqCst), 1);
        assert_eq!(manager.state().await, SessionState::Authenticated);
    }

    #[tokio::test]
    async fn two_consecutive_expiries_surface_auth_error() {
        let manager = SessionManager::assuming_session(FakeClient::new(true), "user", "pass");
        let attempts = Arc::new(AtomicUsize::new(0));

        let attempts_in_op = Arc::clone(&attempts);
        let result: Result<(), SiteError> = manager
            .with_session(move |_c| {
                let attempts = Arc::clone(&attempts_in_op);
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err(SiteError::SessionExpired)
                }
                .boxed()
            })
            .await;

        assert!(matches!(result, Err(SiteError::Auth)));
        // The operation ran twice and only one re-login was attempted.
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(manager.client.login_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejected_login_is_terminal() {
        let manager = SessionManager::new(FakeClient::new(false), "user", "bad-pass");

        let first: Result<(), SiteError> = manager
            .with_session(|_c| async { Ok(()) }.boxed())
            .await;
        assert!(matches!(first, Err(SiteError::Auth)));
        assert_eq!(manager.state().await, SessionState::LoginFailed);

        // Terminal state: no further login attempts are made.
        let second: Result<(), SiteError> = manager
            .with_session(|_c| async { Ok(()) }.boxed())
            .await;
        assert!(matches!(second, Err(SiteError::Auth)));
        assert_eq!(manager.client.login_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn network_failure_during_login_is_not_terminal() {
        struct FlakyClient {
            calls: AtomicUsize,
        }

        #[async_trait]
        impl Authenticate for FlakyClient {
            async fn login(&self, _u: &str, _p: &str) -> Result<(), SiteError> {
                if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(SiteError::Api {
                        status: 502,
                        message: "bad gateway".into(),
                    })
                } else {
                    Ok(())
                }
            }
        }

        let manager = SessionManager::new(
            FlakyClient {
                calls: AtomicUsize::new(0),
            },
            "user",
            "pass",
        );

        let first: Result<(), SiteError> = manager
            .with_session(|_c| async { Ok(()) }.boxed())
            .await;
        assert!(matches!(first, Err(SiteError::Api { status: 502, .. })));
        assert_eq!(manager.state().await, SessionState::Unauthenticated);

        // The next cycle can still succeed.
        let second = manager.with_session(|_c| async { Ok(5) }.boxed()).await;
        assert_eq!(second.unwrap(), 5);
        assert_eq!(manager.state().await, SessionState::Authenticated);
    }
}
