//! Authenticated session.
//!
//! A `Session` is created at login and consumed at logout; hosts pass it to
//! whatever needs the bearer token instead of reaching for shared state.
//! The token is opaque to us except for its `exp` claim, decoded from the
//! JWT payload without verifying the signature (the backend does that).

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AgendaError, AgendaResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    #[serde(alias = "name")]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<SessionUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

impl Session {
    /// Start a session for `token`, decoding its expiry.
    pub fn login(token: impl Into<String>, user: Option<SessionUser>) -> AgendaResult<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(AgendaError::Session("Token is empty".into()));
        }
        let expires_at = decode_expiry(&token)?;

        tracing::debug!(?expires_at, "session started");
        Ok(Session {
            token,
            user,
            expires_at,
        })
    }

    /// Attach the user record once it is known.
    pub fn with_user(self, user: SessionUser) -> Self {
        Session {
            user: Some(user),
            ..self
        }
    }

    /// End the session, removing its stored copy at `path` if there is one.
    pub fn logout(self, path: &Path) -> AgendaResult<()> {
        match std::fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tracing::debug!("session ended");
        Ok(())
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Tokens without an `exp` claim never expire client-side.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.role == Role::Admin)
    }

    /// Default location: ~/.config/agenda/session.json
    pub fn default_path() -> AgendaResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AgendaError::Config("Could not determine config directory".into()))?
            .join("agenda");

        Ok(config_dir.join("session.json"))
    }

    pub fn save_to(&self, path: &Path) -> AgendaResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| AgendaError::Serialization(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load a stored session. `Ok(None)` when nothing is stored.
    pub fn load_from(path: &Path) -> AgendaResult<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let session = serde_json::from_str(&content).map_err(|e| {
            AgendaError::Session(format!("Could not read session at {}: {e}", path.display()))
        })?;
        Ok(Some(session))
    }
}

/// Decode the `exp` claim of a JWT. `Ok(None)` when the payload has no `exp`.
pub fn decode_expiry(token: &str) -> AgendaResult<Option<DateTime<Utc>>> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return Err(AgendaError::Session("Token is not a JWT".into())),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AgendaError::Session(format!("Token payload is not base64url: {e}")))?;
    let claims: Claims = serde_json::from_slice(&bytes)
        .map_err(|e| AgendaError::Session(format!("Token payload is not JSON: {e}")))?;

    match claims.exp {
        None => Ok(None),
        Some(exp) => DateTime::from_timestamp(exp, 0)
            .map(Some)
            .ok_or_else(|| AgendaError::Session(format!("Token expiry {exp} is out of range"))),
    }
}
