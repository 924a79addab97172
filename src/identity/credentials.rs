//! Persisted provider session
//!
//! The browser SDK keeps the signed-in user in local storage; the REST provider
//! keeps it in a small JSON file instead.

use crate::error::{Error, Result};
use crate::types::Identity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Tokens are treated as expired this long before their real expiry
pub const EXPIRY_MARGIN: Duration = Duration::from_secs(5 * 60);

/// Signed-in session as issued by the identity provider
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    /// Provider user id
    pub uid: String,
    /// Account email
    pub email: Option<String>,
    /// Short-lived ID token
    pub id_token: String,
    /// Long-lived refresh token
    pub refresh_token: String,
    /// When the ID token stops being accepted
    pub expires_at: DateTime<Utc>,
}

impl StoredSession {
    /// Identity carried by this session
    pub fn identity(&self) -> Identity {
        Identity {
            uid: self.uid.clone(),
            email: self.email.clone(),
        }
    }

    /// Whether the ID token is inside the expiry margin at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.refresh_at()
    }

    /// Time left until a refresh is due (zero when already due)
    pub fn refresh_due_in(&self, now: DateTime<Utc>) -> Duration {
        (self.refresh_at() - now).to_std().unwrap_or(Duration::ZERO)
    }

    fn refresh_at(&self) -> DateTime<Utc> {
        let margin = chrono::Duration::from_std(EXPIRY_MARGIN)
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.expires_at - margin
    }
}

// Tokens stay out of logs.
impl std::fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredSession")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("id_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// JSON file holding at most one [`StoredSession`]
#[derive(Clone, Debug)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the session file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored session, `None` when nothing has been saved
    pub fn load(&self) -> Result<Option<StoredSession>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read session from {}: {}", self.path.display(), e),
            ))
        })?;

        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// Write the session with owner-only permissions (0600 on unix)
    pub fn save(&self, session: &StoredSession) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(session)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)?;
            file.write_all(contents.as_bytes())?;
        }

        #[cfg(not(unix))]
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&self.path)?;
            file.write_all(contents.as_bytes())?;
        }

        Ok(())
    }

    /// Remove the session file (missing file is fine)
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
