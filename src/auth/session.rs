//! Session acquisition
//!
//! A session is reused from the login collaborator when one exists;
//! otherwise a single interactive login is performed. Nothing here retries.

use std::env;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::prompt::Prompter;
use crate::constants::env as env_constants;
use crate::errors::Result;

/// Authenticated context sent with every build service call
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    token: String,
    #[serde(default)]
    email: Option<String>,
}

impl Session {
    pub fn new(token: impl Into<String>, email: Option<String>) -> Self {
        Self {
            token: token.into(),
            email,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("email", &self.email)
            .finish()
    }
}

/// Login values supplied up front, skipping the matching prompts
#[derive(Debug, Clone, Default)]
pub struct LoginHint {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginHint {
    /// Hint from `CLOUDPACK_EMAIL` / `CLOUDPACK_PASSWORD`
    pub fn from_env() -> Self {
        Self {
            email: env::var(env_constants::EMAIL).ok().filter(|v| !v.is_empty()),
            password: env::var(env_constants::PASSWORD)
                .ok()
                .filter(|v| !v.is_empty()),
        }
    }

    /// Prefer an explicitly given email over the environment
    pub fn with_email(mut self, email: Option<String>) -> Self {
        if email.is_some() {
            self.email = email;
        }
        self
    }
}

/// The login collaborator: a session cache plus interactive authentication
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// Single attempt to fetch an existing session
    async fn retrieve_session(&self) -> Result<Option<Session>>;

    /// One interactive authentication round
    async fn login(&self, hint: &LoginHint, prompter: &mut dyn Prompter) -> Result<Session>;
}

/// Obtains the session a task runs under
pub struct SessionManager<'a> {
    source: &'a dyn SessionSource,
}

impl<'a> SessionManager<'a> {
    pub fn new(source: &'a dyn SessionSource) -> Self {
        Self { source }
    }

    /// Reuse a stored session, falling back to one login attempt
    pub async fn acquire(&self, hint: &LoginHint, prompter: &mut dyn Prompter) -> Result<Session> {
        if let Some(session) = self.source.retrieve_session().await? {
            debug!("Reusing existing session");
            return Ok(session);
        }

        println!("No previous login existed. Attempting to log in now.");
        let session = self.source.login(hint, prompter).await?;
        info!("Logged in{}", session.email().map(|e| format!(" as {}", e)).unwrap_or_default());
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::prompt::ScriptedPrompter;
    use crate::errors::{AppError, AuthError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubSource {
        stored: Option<Session>,
        reject: bool,
        logins: AtomicUsize,
    }

    #[async_trait]
    impl SessionSource for StubSource {
        async fn retrieve_session(&self) -> Result<Option<Session>> {
            Ok(self.stored.clone())
        }

        async fn login(&self, _hint: &LoginHint, _prompter: &mut dyn Prompter) -> Result<Session> {
            self.logins.fetch_add(1, Ordering::SeqCst);
            if self.reject {
                return Err(AuthError::LoginRejected { status: 401 }.into());
            }
            Ok(Session::new("fresh", Some("dev@example.com".to_string())))
        }
    }

    #[tokio::test]
    async fn test_existing_session_skips_login() {
        let source = StubSource {
            stored: Some(Session::new("cached", None)),
            reject: false,
            logins: AtomicUsize::new(0),
        };
        let mut prompter = ScriptedPrompter::default();

        let session = SessionManager::new(&source)
            .acquire(&LoginHint::default(), &mut prompter)
            .await
            .unwrap();

        assert_eq!(session.token(), "cached");
        assert_eq!(source.logins.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_session_logs_in_once() {
        let source = StubSource {
            stored: None,
            reject: false,
            logins: AtomicUsize::new(0),
        };
        let mut prompter = ScriptedPrompter::default();

        let session = SessionManager::new(&source)
            .acquire(&LoginHint::default(), &mut prompter)
            .await
            .unwrap();

        assert_eq!(session.token(), "fresh");
        assert_eq!(source.logins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejected_login_is_not_retried() {
        let source = StubSource {
            stored: None,
            reject: true,
            logins: AtomicUsize::new(0),
        };
        let mut prompter = ScriptedPrompter::default();

        let result = SessionManager::new(&source)
            .acquire(&LoginHint::default(), &mut prompter)
            .await;

        assert!(matches!(
            result,
            Err(AppError::Auth(AuthError::LoginRejected { status: 401 }))
        ));
        assert_eq!(source.logins.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_session_debug_redacts_token() {
        let session = Session::new("secret-token", None);
        assert!(!format!("{:?}", session).contains("secret-token"));
    }

    #[test]
    fn test_explicit_email_wins() {
        let hint = LoginHint {
            email: Some("env@example.com".to_string()),
            password: None,
        }
        .with_email(Some("arg@example.com".to_string()));
        assert_eq!(hint.email.as_deref(), Some("arg@example.com"));

        let hint = hint.with_email(None);
        assert_eq!(hint.email.as_deref(), Some("arg@example.com"));
    }
}
