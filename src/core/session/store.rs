//! Persisted session file
//!
//! Keeps the signed-in session between command invocations as JSON.

use crate::adapters::backend::AuthSession;
use crate::domain::{ProntuarioError, Result};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// JSON file holding the current session
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored session, `None` if there is none
    ///
    /// # Errors
    ///
    /// Returns a `Session` error if the file exists but cannot be parsed.
    pub async fn load(&self) -> Result<Option<AuthSession>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&contents).map(Some).map_err(|e| {
            ProntuarioError::Session(format!(
                "Stored session {} is unreadable: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Writes the session, readable only by the owner on unix
    ///
    /// The file is created with mode 0600 and an existing file is
    /// narrowed to 0600 before any token is written to it.
    pub async fn save(&self, session: &AuthSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_string_pretty(session)?;

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&self.path).await?;
        restrict_permissions(&file).await?;
        file.write_all(json.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Removes the stored session; a missing file is not an error
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
async fn restrict_permissions(file: &tokio::fs::File) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))
        .await?;
    Ok(())
}

#[cfg(not(unix))]
async fn restrict_permissions(_file: &tokio::fs::File) -> Result<()> {
    Ok(())
}
