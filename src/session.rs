//! The session context: who the current viewer is and the token that proves it.
//!
//! The session has an explicit lifecycle instead of living in ambient global state:
//! [`Session::establish`] saves it on login, [`Session::load`] reads it at the start of each
//! command, and [`Session::clear`] removes it on logout or when the server answers 401.
//! It is stored at `$SPENDLOG_HOME/.secrets/session.json`.

use crate::{utils, Config, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};

/// The authenticated user's identity as the server reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl User {
    /// The name when the user gave one, the email otherwise.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

/// A bearer token plus the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    access_token: String,
    user: User,
}

impl Session {
    pub fn new(access_token: impl Into<String>, user: User) -> Self {
        Self {
            access_token: access_token.into(),
            user,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    /// Persists a freshly authenticated session.
    pub async fn establish(config: &Config, access_token: impl Into<String>, user: User) -> Result<Self> {
        let session = Session::new(access_token, user);
        let data = serde_json::to_string_pretty(&session).context("Unable to serialize session")?;
        utils::write(config.session_path(), data)
            .await
            .context("Unable to save session")?;
        Ok(session)
    }

    /// Loads the saved session, if any.
    pub async fn load(config: &Config) -> Result<Option<Self>> {
        let path = config.session_path();
        if !path.is_file() {
            return Ok(None);
        }
        let session = utils::deserialize(&path)
            .await
            .context("The saved session is unreadable, log in again")?;
        Ok(Some(session))
    }

    /// Removes the saved session. Succeeds if none exists.
    pub async fn clear(config: &Config) -> Result<()> {
        utils::remove_file(&config.session_path()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_config() -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path().join("home"), "http://localhost:5001/api", 10)
            .await
            .unwrap();
        (dir, config)
    }

    #[tokio::test]
    async fn test_establish_load_clear_roundtrip() {
        let (_dir, config) = test_config().await;
        assert!(Session::load(&config).await.unwrap().is_none());

        let user = User {
            id: 7,
            email: "me@example.com".to_string(),
            name: Some("Me".to_string()),
        };
        let established = Session::establish(&config, "token-abc", user.clone())
            .await
            .unwrap();
        assert_eq!(established.access_token(), "token-abc");

        let loaded = Session::load(&config).await.unwrap().unwrap();
        assert_eq!(loaded, established);
        assert_eq!(loaded.user(), &user);

        Session::clear(&config).await.unwrap();
        assert!(Session::load(&config).await.unwrap().is_none());

        // Clearing twice is fine.
        Session::clear(&config).await.unwrap();
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let anonymous = User {
            id: 1,
            email: "a@b.c".to_string(),
            name: None,
        };
        assert_eq!(anonymous.display_name(), "a@b.c");
        let named = User {
            id: 1,
            email: "a@b.c".to_string(),
            name: Some("Ada".to_string()),
        };
        assert_eq!(named.display_name(), "Ada");
    }
}
