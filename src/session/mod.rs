//! Authenticated session state
//!
//! The [`SessionStore`] owns the current [`Session`] and mirrors it into an
//! injected [`SessionStorage`] under two entries:
//! - `token`: the opaque bearer token
//! - `user`: the user profile serialized as JSON
//!
//! Both entries must be present for a persisted session to be restored.

mod storage;

pub use storage::{FileStorage, MemoryStorage, SessionStorage};

use crate::Result;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// User identifier as issued by the wallet API (numeric or document id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Number(u64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Number(n) => write!(f, "{}", n),
            UserId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// User profile returned on login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "_id")]
    pub id: UserId,
    pub email: String,
}

/// Authenticated user context
pub struct Session {
    token: SecretString,
    user: User,
}

impl Session {
    pub fn new(token: impl Into<String>, user: User) -> Self {
        Self {
            token: SecretString::from(token.into()),
            user,
        }
    }

    /// Bearer token for authenticated API calls
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }

    pub fn user(&self) -> &User {
        &self.user
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

/// Owns the current session and keeps storage in sync with it
pub struct SessionStore<S: SessionStorage> {
    storage: S,
    session: Option<Session>,
}

impl<S: SessionStorage> SessionStore<S> {
    /// Restore the session persisted in `storage`, if any
    ///
    /// Unreadable entries are logged and treated as "logged out".
    pub fn load(storage: S) -> Self {
        let session = match Self::read_persisted(&storage) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable persisted session");
                None
            }
        };
        if let Some(session) = &session {
            tracing::debug!(email = %session.user.email, "Restored persisted session");
        }
        Self { storage, session }
    }

    fn read_persisted(storage: &S) -> Result<Option<Session>> {
        let token = storage.get(TOKEN_KEY)?;
        let user = storage.get(USER_KEY)?;
        match (token, user) {
            (Some(token), Some(user)) if !token.is_empty() => {
                let user: User = serde_json::from_str(&user)?;
                Ok(Some(Session::new(token, user)))
            }
            _ => Ok(None),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(Session::token)
    }

    /// Adopt a freshly issued session and persist both entries
    pub fn login(&mut self, session: Session) -> Result<()> {
        let user_json = serde_json::to_string(&session.user)?;
        self.storage.set(TOKEN_KEY, session.token())?;
        self.storage.set(USER_KEY, &user_json)?;
        tracing::info!(email = %session.user.email, "Session started");
        self.session = Some(session);
        Ok(())
    }

    /// Drop the in-memory session and remove both persisted entries
    pub fn logout(&mut self) -> Result<()> {
        self.session = None;
        self.storage.clear(TOKEN_KEY)?;
        self.storage.clear(USER_KEY)?;
        tracing::info!("Session cleared");
        Ok(())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}
