//! File-backed session store and interactive login
//!
//! Sessions are kept in a JSON file under the user config directory with
//! owner-only permissions. Login posts the email/password pair once; there is
//! no retry on failure.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::app::client::{http, ClientConfig};
use crate::app::prompt::Prompter;
use crate::auth::session::{LoginHint, Session, SessionSource};
use crate::constants::files;
use crate::errors::{AuthError, AuthResult, ConfigError, ConfigResult, RemoteError, Result};

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// Session persistence plus the login endpoint
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
    client: reqwest::Client,
    login_url: Url,
}

impl FileSessionStore {
    /// Store at `path`, logging in against the service in `config`
    pub fn new(path: PathBuf, config: &ClientConfig) -> Result<Self> {
        let client = config.build_http_client()?;
        let login_url = config.endpoint("login")?;
        Ok(Self {
            path,
            client,
            login_url,
        })
    }

    /// `<config_dir>/cloudpack/session.json`
    pub fn default_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir
            .join(files::CONFIG_DIR_NAME)
            .join(files::SESSION_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved session, if any
    pub async fn load(&self) -> AuthResult<Option<Session>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(AuthError::SessionStorage {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let session: Session =
            serde_json::from_str(&content).map_err(|_| AuthError::CorruptSession {
                path: self.path.clone(),
            })?;

        if session.token().is_empty() {
            return Ok(None);
        }
        Ok(Some(session))
    }

    /// Persist a session with owner-only permissions
    pub async fn save(&self, session: &Session) -> AuthResult<()> {
        let storage_error = |source| AuthError::SessionStorage {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(storage_error)?;
        }

        let content = serde_json::to_string_pretty(session)
            .map_err(|e| storage_error(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(storage_error)?;

        // Set restrictive permissions (Unix-like systems only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(files::SESSION_FILE_PERMISSIONS);
            tokio::fs::set_permissions(&self.path, perms)
                .await
                .map_err(storage_error)?;
        }

        debug!("Saved session to {}", self.path.display());
        Ok(())
    }

    /// Remove the saved session; `false` when there was none
    pub async fn clear(&self) -> AuthResult<bool> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(AuthError::SessionStorage {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

/// Email and password from the hint, prompting for whatever is missing
pub fn resolve_login(hint: &LoginHint, prompter: &mut dyn Prompter) -> AuthResult<(String, String)> {
    let email = match hint.email.as_deref().filter(|e| !e.trim().is_empty()) {
        Some(email) => email.trim().to_string(),
        None => prompter
            .ask("Email:", false)
            .map_err(AuthError::Prompt)?
            .trim()
            .to_string(),
    };
    if email.is_empty() {
        return Err(AuthError::MissingEmail);
    }

    let password = match hint.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => password.to_string(),
        None => prompter.ask("Password:", true).map_err(AuthError::Prompt)?,
    };
    if password.is_empty() {
        return Err(AuthError::MissingPassword);
    }

    Ok((email, password))
}

#[async_trait]
impl SessionSource for FileSessionStore {
    async fn retrieve_session(&self) -> Result<Option<Session>> {
        Ok(self.load().await?)
    }

    async fn login(&self, hint: &LoginHint, prompter: &mut dyn Prompter) -> Result<Session> {
        let (email, password) = resolve_login(hint, prompter)?;
        info!("Logging in as {}", email);

        let response = self
            .client
            .post(self.login_url.as_str())
            .json(&LoginRequest {
                email: &email,
                password: &password,
            })
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            warn!("Login rejected for {}", email);
            return Err(AuthError::LoginRejected {
                status: status.as_u16(),
            }
            .into());
        }

        let response = http::check_status(response).await?;
        let body: LoginResponse = http::read_json(response).await?;
        if body.token.is_empty() {
            return Err(RemoteError::Malformed {
                reason: "login response has an empty token".to_string(),
            }
            .into());
        }

        let session = Session::new(body.token, Some(email));
        self.save(&session).await?;
        Ok(session)
    }
}
